//! [`AuthApi`] over the REST endpoints

use async_trait::async_trait;
use hoteldesk_auth::{AuthApi, AuthError, AuthResult, AuthenticatedUser, Credential};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{ApiClient, ClientError};

pub const LOGIN_PATH: &str = "auth/login";
pub const IDENTITY_PATH: &str = "auth/me";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(alias = "access_token")]
    token: String,
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, username: &str, secret: &str) -> AuthResult<Credential> {
        let body = LoginRequest {
            username,
            password: secret,
        };

        match self
            .post_json::<_, LoginResponse>(LOGIN_PATH, &body, None)
            .await
        {
            Ok(response) if response.token.is_empty() => Err(AuthError::invalid_response(
                "Login succeeded but no token was returned",
            )),
            Ok(response) => {
                debug!(user = %username, "Login accepted");
                Ok(Credential::new(response.token))
            }
            Err(ClientError::Unauthorized) => Err(AuthError::invalid_credentials(
                "Username or password is incorrect",
            )),
            Err(ClientError::Status {
                status: 400 | 403 | 422,
                message,
                ..
            }) => Err(AuthError::invalid_credentials(message)),
            Err(e) => Err(e.into()),
        }
    }

    async fn fetch_identity(&self, token: &str) -> AuthResult<AuthenticatedUser> {
        Ok(self.get_json(IDENTITY_PATH, Some(token)).await?)
    }
}

impl From<ClientError> for AuthError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Unauthorized => AuthError::Unauthorized,
            ClientError::Transport { message, .. } => AuthError::transport(message),
            ClientError::Core(e) => AuthError::Core(e),
            other @ (ClientError::NotFound { .. }
            | ClientError::Status { .. }
            | ClientError::Decode { .. }) => AuthError::invalid_response(other.to_string()),
        }
    }
}
