//! Per-view data loading state

use serde::Serialize;

use crate::{ClientError, ClientResult};

/// What a data-driven view currently shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState<T> {
    Loading,
    Loaded { data: T },
    /// The request failed; the view shows `message`
    Failed { message: String, retryable: bool },
    /// The API rejected the session; the view gives way to the login page
    Unauthorized,
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Loading
    }
}

impl<T> LoadState<T> {
    pub fn from_result(result: ClientResult<T>) -> Self {
        match result {
            Ok(data) => LoadState::Loaded { data },
            Err(ClientError::Unauthorized) => LoadState::Unauthorized,
            Err(e) => LoadState::Failed {
                retryable: e.is_transport(),
                message: e.to_string(),
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            LoadState::Loaded { data } => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            LoadState::Loading => LoadState::Loading,
            LoadState::Loaded { data } => LoadState::Loaded { data: f(data) },
            LoadState::Failed { message, retryable } => LoadState::Failed { message, retryable },
            LoadState::Unauthorized => LoadState::Unauthorized,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result() {
        let loaded = LoadState::from_result(Ok(vec![1, 2, 3]));
        assert!(loaded.is_loaded());
        assert_eq!(loaded.data().map(Vec::len), Some(3));

        let unauthorized: LoadState<()> = LoadState::from_result(Err(ClientError::Unauthorized));
        assert_eq!(unauthorized, LoadState::Unauthorized);

        let missing: LoadState<()> = LoadState::from_result(Err(ClientError::NotFound {
            resource: "/api/guests/G404".to_string(),
        }));
        match missing {
            LoadState::Failed { message, retryable } => {
                assert!(message.contains("/api/guests/G404"));
                assert!(!retryable);
            }
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn test_default_is_loading_and_map_keeps_state() {
        let state: LoadState<u32> = LoadState::default();
        assert!(state.is_loading());
        assert_eq!(
            LoadState::Loaded { data: 2 }.map(|n: u32| n * 10),
            LoadState::Loaded { data: 20 }
        );
        let json = serde_json::to_value(LoadState::<u32>::Unauthorized).unwrap();
        assert_eq!(json["state"], "unauthorized");
    }
}
