//! Article browsing core for Forem-based sites such as dev.to.
//!
//! A [`Session`] owns the stores: paginated listings with one automatic
//! retry, a full-article cache, client-side tag/text filters, and a derived
//! view over what has been loaded. [`html::decorate`] prepares article HTML
//! for display.

pub mod api;
pub mod config;
pub mod html;
pub mod models;
pub mod session;
pub mod state;

pub use config::Config;
pub use session::Session;
