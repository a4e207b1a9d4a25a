//! Portfolio content: owner profile, projects, skills and the contact inbox.

pub mod api;
pub mod models;
pub mod store;

pub use api::content_router;
pub use store::ContentStore;
