//! Spreadsheet adapter: the only persistence the service has.
//!
//! Handlers talk to a [`SheetStore`]; in production that is a [`SheetsClient`]
//! backed by the Google Sheets API.

mod auth;
mod client;
mod error;
#[cfg(test)]
pub(crate) mod memory;
mod range;

pub use auth::{normalize_private_key, ServiceAccountKey};
pub use client::SheetsClient;
pub use error::SheetsError;
pub use range::SheetRange;

use async_trait::async_trait;
use serde_json::Value;

/// A matrix of cell values, row-major, as returned by a range read.
pub type Cells = Vec<Vec<String>>;

/// Range-based access to one spreadsheet.
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// The spreadsheet being addressed, if one is configured.
    fn spreadsheet_id(&self) -> Option<&str>;

    /// Returns the populated cells of `range`. Trailing empty rows and cells are omitted.
    async fn read_range(&self, range: &SheetRange) -> Result<Cells, SheetsError>;

    /// Appends `row` after the last populated row of `range`.
    async fn append_row(&self, range: &SheetRange, row: Vec<Value>) -> Result<(), SheetsError>;

    /// Overwrites `range` with `rows`, starting at its top-left cell.
    async fn update_range(&self, range: &SheetRange, rows: Vec<Vec<Value>>)
        -> Result<(), SheetsError>;

    fn is_configured(&self) -> bool {
        self.spreadsheet_id().is_some()
    }
}
