//! Static route table
//!
//! An immutable, ordered list of routes evaluated first to last. Built once at
//! startup and never mutated afterwards.

use hoteldesk_auth::tokens;
use hoteldesk_core::{validation_error, HotelDeskResult};

use crate::view::View;

/// One entry of the route table
#[derive(Debug, Clone)]
pub enum Route {
    /// Exact path match
    Page {
        path: String,
        view: View,
        permission: Option<String>,
        in_menu: bool,
    },
    /// `/{collection}/{id}` single-resource route
    Detail {
        collection: String,
        view: fn(String) -> View,
    },
}

/// Ordered, read-only list of routes plus the fallback view
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    default_view: View,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// The dashboard's route table
    pub fn standard() -> Self {
        let page = |path: &str, view: View, permission: Option<&str>, in_menu: bool| Route::Page {
            path: path.to_string(),
            view,
            permission: permission.map(str::to_string),
            in_menu,
        };

        Self {
            routes: vec![
                page("/", View::Dashboard, None, true),
                page("/login", View::Login, None, false),
                page("/guests", View::Guests, Some(tokens::VIEW_GUESTS), true),
                Route::Detail {
                    collection: "guests".to_string(),
                    view: View::guest_detail,
                },
                page("/finance", View::Finance, Some(tokens::VIEW_FINANCE), true),
                page("/hotels", View::Hotels, Some(tokens::VIEW_HOTELS), true),
                page("/contacts", View::Contacts, Some(tokens::VIEW_CONTACTS), true),
                page("/tickets", View::Tickets, Some(tokens::VIEW_TICKETS), true),
                page("/users", View::Users, Some(tokens::MANAGE_USERS), true),
                page("/bookings", View::Bookings, Some(tokens::VIEW_BOOKINGS), true),
                page("/tools", View::Tools, Some(tokens::ADMIN), true),
            ],
            default_view: View::Dashboard,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn default_view(&self) -> &View {
        &self.default_view
    }

    /// First page route whose path equals `path`
    pub fn page(&self, path: &str) -> Option<(&View, Option<&str>)> {
        self.routes.iter().find_map(|route| match route {
            Route::Page {
                path: p,
                view,
                permission,
                ..
            } if p == path => Some((view, permission.as_deref())),
            _ => None,
        })
    }

    /// Detail constructor registered for `collection`
    pub fn detail(&self, collection: &str) -> Option<fn(String) -> View> {
        self.routes.iter().find_map(|route| match route {
            Route::Detail { collection: c, view } if c == collection => Some(*view),
            _ => None,
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for custom tables; validates paths on `build`
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Route>,
    default_view: Option<View>,
}

impl RouteTableBuilder {
    pub fn page(mut self, path: &str, view: View, permission: Option<&str>) -> Self {
        self.routes.push(Route::Page {
            path: path.to_string(),
            view,
            permission: permission.map(str::to_string),
            in_menu: true,
        });
        self
    }

    pub fn hidden_page(mut self, path: &str, view: View, permission: Option<&str>) -> Self {
        self.routes.push(Route::Page {
            path: path.to_string(),
            view,
            permission: permission.map(str::to_string),
            in_menu: false,
        });
        self
    }

    pub fn detail(mut self, collection: &str, view: fn(String) -> View) -> Self {
        self.routes.push(Route::Detail {
            collection: collection.to_string(),
            view,
        });
        self
    }

    pub fn default_view(mut self, view: View) -> Self {
        self.default_view = Some(view);
        self
    }

    pub fn build(self) -> HotelDeskResult<RouteTable> {
        let mut seen = std::collections::HashSet::new();

        for route in &self.routes {
            match route {
                Route::Page { path, .. } => {
                    if !path.starts_with('/') {
                        return Err(validation_error!(
                            format!("Route path must start with '/': {}", path),
                            "path",
                            "route_table"
                        ));
                    }
                    if !seen.insert(path.clone()) {
                        return Err(validation_error!(
                            format!("Duplicate route path: {}", path),
                            "path",
                            "route_table"
                        ));
                    }
                }
                Route::Detail { collection, .. } => {
                    if collection.is_empty() || collection.contains('/') {
                        return Err(validation_error!(
                            format!("Invalid detail collection: '{}'", collection),
                            "collection",
                            "route_table"
                        ));
                    }
                }
            }
        }

        Ok(RouteTable {
            routes: self.routes,
            default_view: self.default_view.unwrap_or(View::Dashboard),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_permissions() {
        let table = RouteTable::standard();
        let expected = [
            ("/", None),
            ("/guests", Some("view:guests")),
            ("/finance", Some("view:finance")),
            ("/hotels", Some("view:hotels")),
            ("/contacts", Some("view:contacts")),
            ("/tickets", Some("view:tickets")),
            ("/users", Some("manage:users")),
            ("/bookings", Some("view:bookings")),
            ("/tools", Some("admin")),
        ];

        for (path, permission) in expected {
            let (_, required) = table.page(path).unwrap();
            assert_eq!(required, permission, "permission for {}", path);
        }
        assert!(table.detail("guests").is_some());
        assert!(table.detail("hotels").is_none());
    }

    #[test]
    fn test_builder_rejects_relative_and_duplicate_paths() {
        let err = RouteTable::builder()
            .page("hotels", View::Hotels, None)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must start with"));

        let err = RouteTable::builder()
            .page("/hotels", View::Hotels, None)
            .page("/hotels", View::Hotels, None)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));

        assert!(RouteTable::builder()
            .detail("guests/all", View::guest_detail)
            .build()
            .is_err());
    }

    #[test]
    fn test_builder_hidden_pages_resolve_but_stay_out_of_menus() {
        let table = RouteTable::builder()
            .page("/", View::Dashboard, None)
            .hidden_page("/login", View::Login, None)
            .page("/tools", View::Tools, Some(tokens::ADMIN))
            .build()
            .unwrap();

        assert_eq!(table.page("/login"), Some((&View::Login, None)));
        let in_menu: Vec<_> = table
            .routes()
            .iter()
            .filter_map(|route| match route {
                Route::Page {
                    path, in_menu: true, ..
                } => Some(path.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(in_menu, vec!["/", "/tools"]);
    }

    #[test]
    fn test_builder_default_view() {
        let table = RouteTable::builder()
            .page("/hotels", View::Hotels, None)
            .default_view(View::Hotels)
            .build()
            .unwrap();
        assert_eq!(table.default_view(), &View::Hotels);
    }
}
