//! Backend for the course booking site and the playtest feedback form.
//!
//! Every endpoint is a thin translation between JSON over HTTP and range
//! reads/writes on one Google spreadsheet, which is the only storage.

pub mod booking;
pub mod config;
pub mod courses;
pub mod error;
pub mod feedback;
pub mod mapping;
pub mod server;
pub mod sheets;
pub mod types;
pub mod util;

pub use server::create_router;
