use crate::mapping::{rows_to_records, Record};
use crate::sheets::{SheetRange, SheetStore, SheetsError};

pub const COURSE_TAB: &str = "Course";
const COURSE_CELLS: &str = "A1:ZZ999";

/// Reads every course listing.
///
/// Row 0 of the tab names the fields and row 1 is a human-readable caption
/// row, so data starts at row 2. Fewer than three rows means no courses.
pub async fn list_courses(store: &dyn SheetStore) -> Result<Vec<Record>, SheetsError> {
    let raw = store
        .read_range(&SheetRange::new(COURSE_TAB, COURSE_CELLS))
        .await?;

    if raw.len() < 3 {
        return Ok(Vec::new());
    }

    Ok(rows_to_records(&raw, 0, 2))
}
