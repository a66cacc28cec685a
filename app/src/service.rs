//! Booking data service.
//!
//! Features depend on the [`BookingService`] trait only. The sheet-backed
//! implementation talks HTTP; the in-memory one backs tests and offline runs.

use crate::client::SheetsClient;
use crate::codec::BookingRow;
use crate::error::{BookingServiceError, ServiceResult};
use crate::types::BookingRecord;
use chrono::NaiveDate;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Boxed future returned by [`BookingService`] operations
pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send>>;

/// Booking data service
///
/// Every call is an independent round trip; implementations hold no
/// per-request state.
pub trait BookingService: Send + Sync {
    /// Bookings made on `date`
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or answers with
    /// something that is not a list of bookings
    fn fetch_bookings(&self, date: NaiveDate) -> ServiceFuture<Vec<BookingRecord>>;

    /// Record a new booking
    ///
    /// # Errors
    ///
    /// Returns error if the backend does not accept the booking
    fn add_booking(&self, record: BookingRecord) -> ServiceFuture<()>;

    /// Replace the booking identified by `record`'s date, movie and slot
    ///
    /// # Errors
    ///
    /// Returns error if no such booking exists or the backend cannot update
    fn update_booking(&self, record: BookingRecord) -> ServiceFuture<()>;

    /// Remove every booking for `movie_name` made on `booking_date`
    ///
    /// # Errors
    ///
    /// Returns error if no such booking exists or the backend cannot delete
    fn delete_booking(&self, booking_date: NaiveDate, movie_name: String) -> ServiceFuture<()>;
}

/// Booking service backed by the spreadsheet endpoint
///
/// The endpoint can only search and append, so updates and deletes are
/// rejected with [`BookingServiceError::Unsupported`].
#[derive(Clone, Debug)]
pub struct SheetsBookingService {
    client: SheetsClient,
}

impl SheetsBookingService {
    /// Creates a service over an existing client
    #[must_use]
    pub const fn new(client: SheetsClient) -> Self {
        Self { client }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared(client: SheetsClient) -> Arc<dyn BookingService> {
        Arc::new(Self::new(client))
    }
}

impl BookingService for SheetsBookingService {
    fn fetch_bookings(&self, date: NaiveDate) -> ServiceFuture<Vec<BookingRecord>> {
        let client = self.client.clone();
        Box::pin(async move {
            let rows = client.fetch_rows(date).await?;
            let records = rows
                .into_iter()
                .map(BookingRecord::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
    }

    fn add_booking(&self, record: BookingRecord) -> ServiceFuture<()> {
        let client = self.client.clone();
        Box::pin(async move {
            let row = BookingRow::from_record(&record, &client.config().date_format);
            client.append_row(&row).await
        })
    }

    fn update_booking(&self, record: BookingRecord) -> ServiceFuture<()> {
        Box::pin(async move {
            tracing::warn!(
                movie = %record.movie_name,
                booking_date = %record.booking_date,
                "Booking sheet cannot update rows"
            );
            Err(BookingServiceError::Unsupported {
                operation: "update_booking",
            })
        })
    }

    fn delete_booking(&self, booking_date: NaiveDate, movie_name: String) -> ServiceFuture<()> {
        Box::pin(async move {
            tracing::warn!(
                movie = %movie_name,
                booking_date = %booking_date,
                "Booking sheet cannot delete rows"
            );
            Err(BookingServiceError::Unsupported {
                operation: "delete_booking",
            })
        })
    }
}

/// In-process booking service
///
/// Supports every operation. Clones share the same bookings.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBookingService {
    records: Arc<RwLock<Vec<BookingRecord>>>,
}

impl InMemoryBookingService {
    /// Creates an empty service
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service seeded with `records`
    #[must_use]
    pub fn with_records(records: Vec<BookingRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Snapshot of every stored booking
    pub async fn all(&self) -> Vec<BookingRecord> {
        self.records.read().await.clone()
    }
}

impl BookingService for InMemoryBookingService {
    fn fetch_bookings(&self, date: NaiveDate) -> ServiceFuture<Vec<BookingRecord>> {
        let records = Arc::clone(&self.records);
        Box::pin(async move {
            let found: Vec<_> = records
                .read()
                .await
                .iter()
                .filter(|r| r.booking_date == date)
                .cloned()
                .collect();
            tracing::debug!(date = %date, rows = found.len(), "Fetched in-memory bookings");
            Ok(found)
        })
    }

    fn add_booking(&self, record: BookingRecord) -> ServiceFuture<()> {
        let records = Arc::clone(&self.records);
        Box::pin(async move {
            records.write().await.push(record);
            Ok(())
        })
    }

    fn update_booking(&self, record: BookingRecord) -> ServiceFuture<()> {
        let records = Arc::clone(&self.records);
        Box::pin(async move {
            let mut records = records.write().await;
            let Some(existing) = records.iter_mut().find(|r| r.same_booking(&record)) else {
                return Err(BookingServiceError::NotFound(format!(
                    "{} on {} at {} {}",
                    record.movie_name, record.booking_date, record.show_date, record.show_time
                )));
            };
            *existing = record;
            Ok(())
        })
    }

    fn delete_booking(&self, booking_date: NaiveDate, movie_name: String) -> ServiceFuture<()> {
        let records = Arc::clone(&self.records);
        Box::pin(async move {
            let mut records = records.write().await;
            let before = records.len();
            records.retain(|r| !(r.booking_date == booking_date && r.movie_name == movie_name));
            if records.len() == before {
                return Err(BookingServiceError::NotFound(format!(
                    "{movie_name} on {booking_date}"
                )));
            }
            Ok(())
        })
    }
}
