//! HotelDesk CLI - the dashboard shell
//!
//! [`Shell`] wires the session store, the route resolver, the navigator and
//! the guarded API client together and reacts to session events.

pub mod shell;

pub use shell::{Page, Shell};
