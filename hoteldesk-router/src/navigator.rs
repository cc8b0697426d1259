//! Navigation state
//!
//! The [`Navigator`] owns the current [`Location`] and a bounded history.
//! Every change is broadcast so subscribers can re-resolve and re-render.

use hoteldesk_auth::Authorizer;
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::broadcast;
use tracing::debug;

use crate::resolver::normalize_path;
use crate::table::{Route, RouteTable};

/// The single piece of navigable state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub pathname: String,
}

impl Location {
    pub fn new(pathname: &str) -> Self {
        Self {
            pathname: normalize_path(pathname),
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

/// Owner of the current location
#[derive(Debug)]
pub struct Navigator {
    current: Location,
    history: VecDeque<Location>,
    history_limit: usize,
    events: broadcast::Sender<Location>,
}

impl Navigator {
    pub fn new(initial: &str, history_limit: usize) -> Self {
        let (events, _) = broadcast::channel::<Location>(32);

        Self {
            current: Location::new(initial),
            history: VecDeque::new(),
            history_limit: history_limit.max(1),
            events,
        }
    }

    pub fn location(&self) -> &Location {
        &self.current
    }

    /// Subscribe to location changes
    pub fn subscribe(&self) -> broadcast::Receiver<Location> {
        self.events.subscribe()
    }

    /// Push a new location; returns false if already there
    pub fn navigate(&mut self, pathname: &str) -> bool {
        let next = Location::new(pathname);
        if next == self.current {
            return false;
        }

        let previous = std::mem::replace(&mut self.current, next);
        self.history.push_back(previous);
        while self.history.len() > self.history_limit {
            self.history.pop_front();
        }

        self.publish();
        true
    }

    /// Swap the current location without recording history
    pub fn replace(&mut self, pathname: &str) -> bool {
        let next = Location::new(pathname);
        if next == self.current {
            return false;
        }

        self.current = next;
        self.publish();
        true
    }

    /// Return to the previous location; false when history is empty
    pub fn back(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                self.current = previous;
                self.publish();
                true
            }
            None => false,
        }
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn publish(&self) {
        debug!(pathname = %self.current.pathname, "Location changed");
        let _ = self.events.send(self.current.clone());
    }
}

/// Sidebar entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub path: String,
    pub title: String,
}

/// Sidebar entries the user may open, in table order
pub fn menu<A: Authorizer + ?Sized>(table: &RouteTable, auth: &A) -> Vec<MenuItem> {
    table
        .routes()
        .iter()
        .filter_map(|route| match route {
            Route::Page {
                path,
                view,
                permission,
                in_menu: true,
            } if permission.as_deref().map_or(true, |p| auth.has_permission(p)) => {
                Some(MenuItem {
                    path: path.clone(),
                    title: view.title(),
                })
            }
            _ => None,
        })
        .collect()
}
