//! Renderable views

use serde::Serialize;

/// Every screen the dashboard can show
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Dashboard,
    Guests,
    GuestDetail { id: String },
    Finance,
    Hotels,
    Contacts,
    Tickets,
    Users,
    Bookings,
    Tools,
    Login,
    AccessDenied,
}

impl View {
    /// Detail view constructor used by the `/guests/{id}` route
    pub fn guest_detail(id: String) -> Self {
        View::GuestDetail { id }
    }

    /// Heading shown for the view
    pub fn title(&self) -> String {
        match self {
            View::Dashboard => "Dashboard".to_string(),
            View::Guests => "Guests".to_string(),
            View::GuestDetail { id } => format!("Guest {}", id),
            View::Finance => "Finance".to_string(),
            View::Hotels => "Hotels".to_string(),
            View::Contacts => "Contacts".to_string(),
            View::Tickets => "Tickets".to_string(),
            View::Users => "Users".to_string(),
            View::Bookings => "Bookings".to_string(),
            View::Tools => "Tools".to_string(),
            View::Login => "Sign in".to_string(),
            View::AccessDenied => "Access denied".to_string(),
        }
    }

    /// API collection backing a list view
    pub fn collection(&self) -> Option<&'static str> {
        match self {
            View::Guests | View::GuestDetail { .. } => Some("guests"),
            View::Finance => Some("finance"),
            View::Hotels => Some("hotels"),
            View::Contacts => Some("contacts"),
            View::Tickets => Some("tickets"),
            View::Users => Some("users"),
            View::Bookings => Some("bookings"),
            View::Dashboard | View::Tools | View::Login | View::AccessDenied => None,
        }
    }

    /// Resource id for detail views
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            View::GuestDetail { id } => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title())
    }
}
