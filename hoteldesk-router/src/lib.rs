//! HotelDesk Router - maps locations to views
//!
//! The resolver is a pure, total function of a path, a [`RouteTable`] and a
//! permission predicate. The [`Navigator`] owns the current location and
//! publishes every change so the view layer can recompute.

pub mod navigator;
pub mod resolver;
pub mod table;
pub mod view;

pub use navigator::{menu, Location, MenuItem, Navigator};
pub use resolver::{normalize_path, DetailPolicy, Outcome, Resolution, Resolver};
pub use table::{Route, RouteTable};
pub use view::View;
