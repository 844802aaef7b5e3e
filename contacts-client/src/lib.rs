//! Client side of the contacts service: a typed HTTP wrapper, the view
//! models behind the list/add/delete screens, and plain-text rendering.

pub mod api;
pub mod app;
pub mod render;
pub mod views;

pub use api::{ClientError, ContactsApi};
pub use app::{ContactsApp, Notice};
