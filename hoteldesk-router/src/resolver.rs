//! Route Resolver
//!
//! Total function from `(pathname, permission predicate)` to the view to
//! render. Every path yields exactly one of: a detail view, the access-denied
//! view, the matched view, or the default view.

use hoteldesk_auth::Authorizer;
use hoteldesk_core::RoutingConfig;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::table::RouteTable;
use crate::view::View;

static DETAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([^/]+)/([^/]+)$").unwrap_or_else(|e| panic!("invalid detail pattern: {e}"))
});

/// Whether `/{collection}/{id}` routes are permission checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailPolicy {
    /// Detail routes skip the permission lookup entirely
    #[default]
    Bypass,
    /// Detail routes require the permission of `/{collection}`
    InheritCollection,
}

impl From<&RoutingConfig> for DetailPolicy {
    fn from(config: &RoutingConfig) -> Self {
        if config.inherit_detail_permissions {
            DetailPolicy::InheritCollection
        } else {
            DetailPolicy::Bypass
        }
    }
}

/// Which branch of the resolver produced the view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Detail { collection: String, id: String },
    Denied { required: String },
    Matched,
    Default,
}

/// Result of resolving one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Normalised path that was resolved
    pub path: String,
    pub view: View,
    pub outcome: Outcome,
}

impl Resolution {
    pub fn is_denied(&self) -> bool {
        matches!(self.outcome, Outcome::Denied { .. })
    }
}

/// Strip query and fragment, drop a trailing slash, default to `/`
pub fn normalize_path(pathname: &str) -> String {
    let end = pathname.find(['?', '#']).unwrap_or(pathname.len());
    let path = pathname[..end].trim();

    if path.is_empty() {
        return "/".to_string();
    }

    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };

    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Route table plus detail policy; holds no state between calls
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    table: RouteTable,
    policy: DetailPolicy,
}

impl Resolver {
    pub fn new(table: RouteTable, policy: DetailPolicy) -> Self {
        Self { table, policy }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn policy(&self) -> DetailPolicy {
        self.policy
    }

    /// Pick the view for `pathname` given what `auth` allows
    pub fn resolve<A: Authorizer + ?Sized>(&self, pathname: &str, auth: &A) -> Resolution {
        let path = normalize_path(pathname);

        if let Some(resolution) = self.resolve_detail(&path, auth) {
            return resolution;
        }

        let resolution = match self.table.page(&path) {
            Some((_, Some(required))) if !auth.has_permission(required) => Resolution {
                view: View::AccessDenied,
                outcome: Outcome::Denied {
                    required: required.to_string(),
                },
                path,
            },
            Some((view, _)) => Resolution {
                view: view.clone(),
                outcome: Outcome::Matched,
                path,
            },
            None => Resolution {
                view: self.table.default_view().clone(),
                outcome: Outcome::Default,
                path,
            },
        };

        debug!(
            path = %resolution.path,
            view = %resolution.view,
            outcome = ?resolution.outcome,
            "Resolved route"
        );
        resolution
    }

    fn resolve_detail<A: Authorizer + ?Sized>(&self, path: &str, auth: &A) -> Option<Resolution> {
        let captures = DETAIL_PATTERN.captures(path)?;
        let collection = captures.get(1)?.as_str();
        let id = captures.get(2)?.as_str();
        let build = self.table.detail(collection)?;

        if self.policy == DetailPolicy::InheritCollection {
            let parent = format!("/{}", collection);
            if let Some((_, Some(required))) = self.table.page(&parent) {
                if !auth.has_permission(required) {
                    debug!(path, required, "Detail route denied by collection permission");
                    return Some(Resolution {
                        path: path.to_string(),
                        view: View::AccessDenied,
                        outcome: Outcome::Denied {
                            required: required.to_string(),
                        },
                    });
                }
            }
        }

        debug!(path, collection, id, "Resolved detail route");
        Some(Resolution {
            path: path.to_string(),
            view: build(id.to_string()),
            outcome: Outcome::Detail {
                collection: collection.to_string(),
                id: id.to_string(),
            },
        })
    }
}
