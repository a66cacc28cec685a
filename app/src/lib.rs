//! # Cinema Admin
//!
//! Data layer of the cinema administration tool: bookings kept in a
//! spreadsheet-backed REST endpoint, theaters and showtimes kept behind
//! injected repositories, and one feature store per screen.
//!
//! ## Architecture
//!
//! - [`codec`]: sheet rows (localized column headers, text values) to typed
//!   [`BookingRecord`]s and back
//! - [`client`]: search and append requests against the sheet endpoint
//! - [`service`]: [`BookingService`] facade with HTTP and in-memory backends
//! - [`repository`]: theater and showtime storage
//! - [`features`]: state, actions and reducers for the booking, showtime and
//!   theater screens
//!
//! ## Example
//!
//! ```ignore
//! let config = SheetsConfig::from_env()?;
//! let service = SheetsBookingService::shared(SheetsClient::new(config.clone())?);
//! let env = BookingListEnvironment::new(service, Arc::new(SystemClock), config.utc_offset);
//! let store = Store::new(BookingListState::new(), BookingListReducer::new(), env);
//!
//! let mut updates = store.subscribe_state();
//! store.send(BookingListAction::FetchToday).await?;
//! ```

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod features;
pub mod repository;
pub mod service;
pub mod types;

pub use client::SheetsClient;
pub use codec::{decode_rows, encode_row, BookingRow};
pub use config::{ConfigError, SheetsConfig};
pub use error::{BookingServiceError, CodecError, RepositoryError};
pub use repository::{
    InMemoryShowtimeRepository, InMemoryTheaterRepository, ShowtimeRepository, TheaterRepository,
};
pub use service::{BookingService, InMemoryBookingService, SheetsBookingService};
pub use types::{
    BookingRecord, Money, MovieShowtime, SeatCode, ShowtimeStatus, Theater, TicketType,
};
