//! Booking submissions.
//!
//! Ids are allocated optimistically: the id column is read, the maximum is
//! incremented, and the row is appended in a separate call. Nothing
//! serializes concurrent submissions, so two bookings racing each other can
//! receive the same id.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::AppError;
use crate::mapping::{record_to_row, CellDefault, Column, Record};
use crate::sheets::{SheetRange, SheetStore};
use crate::util::now_string;

pub const BOOKING_TAB: &str = "Booking";
const ID_COLUMN_CELLS: &str = "A:A";
const BOOKING_CELLS: &str = "A:I";

const REQUIRED_FIELDS: [&str; 4] = ["sessionID", "studentName", "studentEmail", "studentContact"];

/// Column layout of the booking tab.
const BOOKING_COLUMNS: [Column<'static>; 9] = [
    Column::with_default("id", CellDefault::Zero),
    Column::text("sessionID"),
    Column::text("studentName"),
    Column::text("studentEmail"),
    Column::text("studentContact"),
    Column::with_default("studentNumber", CellDefault::One),
    Column::with_default("cost", CellDefault::Zero),
    Column::text("bookingNote"),
    Column::text("bookingTime"),
];

/// Body of `POST /api/booking`. Every field is optional at the type level so
/// presence is decided by [`BookingRequest::missing_fields`].
#[derive(Debug, Default, Deserialize)]
pub struct BookingRequest {
    #[serde(rename = "sessionID")]
    pub session_id: Option<Value>,
    #[serde(rename = "studentName")]
    pub student_name: Option<Value>,
    #[serde(rename = "studentEmail")]
    pub student_email: Option<Value>,
    #[serde(rename = "studentContact")]
    pub student_contact: Option<Value>,
    #[serde(rename = "studentNumber")]
    pub student_number: Option<Value>,
    pub cost: Option<Value>,
    #[serde(rename = "bookingNote")]
    pub booking_note: Option<Value>,
}

impl BookingRequest {
    /// Names of required fields that are absent, null, false, zero or empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            &self.session_id,
            &self.student_name,
            &self.student_email,
            &self.student_contact,
        ]
        .into_iter()
        .zip(REQUIRED_FIELDS)
        .filter(|(value, _)| !is_truthy(value.as_ref()))
        .map(|(_, name)| name)
        .collect()
    }

    /// The nine cells of a booking row, in tab order.
    pub fn to_row(&self, id: u64, booking_time: &str) -> Vec<Value> {
        let mut record = Record::new();
        record.insert("id".to_string(), Value::from(id));

        let fields = [
            ("sessionID", &self.session_id),
            ("studentName", &self.student_name),
            ("studentEmail", &self.student_email),
            ("studentContact", &self.student_contact),
            ("studentNumber", &self.student_number),
            ("cost", &self.cost),
            ("bookingNote", &self.booking_note),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                record.insert(name.to_string(), value.clone());
            }
        }
        record.insert("bookingTime".to_string(), Value::from(booking_time));

        record_to_row(&record, &BOOKING_COLUMNS)
    }
}

#[derive(Debug, Serialize)]
pub struct BookingConfirmation {
    pub success: bool,
    #[serde(rename = "bookingID")]
    pub booking_id: u64,
    pub message: String,
    #[serde(rename = "bookingTime")]
    pub booking_time: String,
}

/// Loose truthiness: null, false, 0 and "" count as absent.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Computes the id following the largest positive number in an id column.
///
/// The first row is the header. Cells that do not parse as a finite positive
/// number are ignored; a fractional maximum is floored. Returns 1 when no
/// cell qualifies. Ids past `u64::MAX` saturate there.
pub fn next_booking_id(id_column: &[Vec<String>]) -> u64 {
    id_column
        .iter()
        .skip(1)
        .filter_map(|row| row.first())
        .filter_map(|cell| cell.trim().parse::<f64>().ok())
        .filter(|id| id.is_finite() && *id > 0.0)
        .fold(None, |max: Option<f64>, id| Some(max.map_or(id, |m| m.max(id))))
        .map_or(1, |max| (max.floor() as u64).saturating_add(1))
}

/// Reads the id column and picks the next id.
///
/// A failed read is logged and treated as an empty column, so the booking
/// goes ahead with id 1 and may collide with an existing row.
async fn allocate_booking_id(store: &dyn SheetStore) -> u64 {
    match store
        .read_range(&SheetRange::new(BOOKING_TAB, ID_COLUMN_CELLS))
        .await
    {
        Ok(column) => next_booking_id(&column),
        Err(e) => {
            warn!("Failed to read booking ids, falling back to id 1: {}", e);
            1
        }
    }
}

/// Validates `request`, assigns it an id and appends it to the booking tab.
pub async fn create_booking(
    store: &dyn SheetStore,
    request: &BookingRequest,
) -> Result<BookingConfirmation, AppError> {
    if !store.is_configured() {
        return Err(AppError::Configuration("SHEET_ID is not set".to_string()));
    }

    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::Validation {
            message: "Missing required fields".to_string(),
            details: format!(
                "Please provide: {} (missing: {})",
                REQUIRED_FIELDS.join(", "),
                missing.join(", ")
            ),
        });
    }

    let booking_id = allocate_booking_id(store).await;
    let booking_time = now_string();

    store
        .append_row(
            &SheetRange::new(BOOKING_TAB, BOOKING_CELLS),
            request.to_row(booking_id, &booking_time),
        )
        .await
        .map_err(|e| AppError::upstream("Failed to write booking to the spreadsheet", e))?;

    info!(booking_id, "Booking recorded");

    Ok(BookingConfirmation {
        success: true,
        booking_id,
        message: "Booking created".to_string(),
        booking_time,
    })
}
