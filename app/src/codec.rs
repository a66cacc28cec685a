//! Booking sheet row codec.
//!
//! The sheet stores one booking per row, keyed by fixed localized column
//! headers, with every value as text. [`BookingRow`] mirrors that shape
//! exactly; converting it into a [`BookingRecord`] is where the text is
//! validated and typed.

use crate::config::DEFAULT_DATE_FORMAT;
use crate::error::CodecError;
use crate::types::{BookingRecord, Money, SeatCode, TicketType};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Column header: day the booking was made
pub const BOOKING_DATE: &str = "訂票日期";
/// Column header: movie title
pub const MOVIE_NAME: &str = "電影名稱";
/// Column header: day of the screening
pub const SHOW_DATE: &str = "場次日期";
/// Column header: screening start time
pub const SHOW_TIME: &str = "場次時間";
/// Column header: number of tickets
pub const TICKET_COUNT: &str = "人數";
/// Column header: ticket type
pub const TICKET_TYPE: &str = "票種";
/// Column header: reserved seats
pub const SEATS: &str = "座位";
/// Column header: amount charged
pub const TOTAL_AMOUNT: &str = "總金額";

const TIME_FORMAT: &str = "%H:%M";

/// One booking row exactly as the sheet stores it
///
/// All eight columns are required. Unknown columns are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRow {
    /// `訂票日期`
    #[serde(rename = "訂票日期")]
    pub booking_date: String,
    /// `電影名稱`
    #[serde(rename = "電影名稱")]
    pub movie_name: String,
    /// `場次日期`
    #[serde(rename = "場次日期")]
    pub show_date: String,
    /// `場次時間`
    #[serde(rename = "場次時間")]
    pub show_time: String,
    /// `人數`
    #[serde(rename = "人數")]
    pub ticket_count: String,
    /// `票種`
    #[serde(rename = "票種")]
    pub ticket_type: String,
    /// `座位`
    #[serde(rename = "座位")]
    pub seats: String,
    /// `總金額`
    #[serde(rename = "總金額")]
    pub total_amount: String,
}

impl BookingRow {
    /// Render a record with dates in `date_format`
    ///
    /// Falls back to the default wire format if `date_format` cannot render
    /// a date.
    #[must_use]
    pub fn from_record(record: &BookingRecord, date_format: &str) -> Self {
        Self {
            booking_date: format_date(record.booking_date, date_format),
            movie_name: record.movie_name.clone(),
            show_date: format_date(record.show_date, date_format),
            show_time: record.show_time.format(TIME_FORMAT).to_string(),
            ticket_count: record.ticket_count.to_string(),
            ticket_type: record.ticket_type.label().to_string(),
            seats: SeatCode::join(&record.seats),
            total_amount: record.total_amount.to_string(),
        }
    }
}

impl From<&BookingRecord> for BookingRow {
    fn from(record: &BookingRecord) -> Self {
        Self::from_record(record, DEFAULT_DATE_FORMAT)
    }
}

impl TryFrom<BookingRow> for BookingRecord {
    type Error = CodecError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            booking_date: parse_date(BOOKING_DATE, &row.booking_date)?,
            show_date: parse_date(SHOW_DATE, &row.show_date)?,
            show_time: parse_time(&row.show_time)?,
            ticket_count: row
                .ticket_count
                .trim()
                .parse()
                .map_err(|_| invalid(TICKET_COUNT, &row.ticket_count))?,
            ticket_type: row
                .ticket_type
                .parse::<TicketType>()
                .map_err(|_| invalid(TICKET_TYPE, &row.ticket_type))?,
            seats: SeatCode::parse_list(&row.seats).map_err(|_| invalid(SEATS, &row.seats))?,
            total_amount: row
                .total_amount
                .parse::<Money>()
                .map_err(|_| invalid(TOTAL_AMOUNT, &row.total_amount))?,
            movie_name: row.movie_name,
        })
    }
}

/// Encode a record for an append request using the default date format
#[must_use]
pub fn encode_row(record: &BookingRecord) -> BookingRow {
    BookingRow::from(record)
}

/// Decode a response body into raw rows
///
/// # Errors
///
/// Returns [`CodecError::Json`] if the body is not a JSON array of objects
/// carrying all eight columns.
pub fn parse_rows(body: &[u8]) -> Result<Vec<BookingRow>, CodecError> {
    Ok(serde_json::from_slice(body)?)
}

/// Decode a response body into typed booking records
///
/// # Errors
///
/// Returns [`CodecError::Json`] for a malformed body or a missing column and
/// [`CodecError::InvalidField`] for the first value that does not parse.
pub fn decode_rows(body: &[u8]) -> Result<Vec<BookingRecord>, CodecError> {
    parse_rows(body)?
        .into_iter()
        .map(BookingRecord::try_from)
        .collect()
}

/// Format a date for the wire
///
/// Falls back to the default format if `format` cannot render a date.
#[must_use]
pub fn format_date(date: NaiveDate, format: &str) -> String {
    let mut rendered = String::new();
    if write!(rendered, "{}", date.format(format)).is_err() {
        rendered = date.format(DEFAULT_DATE_FORMAT).to_string();
    }
    rendered
}

/// Dates are written with `/` by some sheet clients and `-` by others
fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, CodecError> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .map_err(|_| invalid(field, value))
}

fn parse_time(value: &str) -> Result<NaiveTime, CodecError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| invalid(SHOW_TIME, value))
}

fn invalid(field: &'static str, value: &str) -> CodecError {
    CodecError::InvalidField {
        field,
        value: value.to_string(),
    }
}
