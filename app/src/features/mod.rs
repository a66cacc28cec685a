//! Per-screen features.
//!
//! Each feature is a state type, an action type and a reducer, run by a
//! [`cinema_admin_runtime::Store`]. A presentation layer renders the state it
//! gets from [`Store::subscribe_state`](cinema_admin_runtime::Store::subscribe_state)
//! and sends actions in response to input.
//!
//! All features load the same way:
//!
//! - a fetch while one is in flight is ignored
//! - starting a fetch sets `is_loading` and clears `last_error`
//! - a successful fetch replaces the list wholesale
//! - a failed fetch keeps the list and sets `last_error` to a readable message
//!
//! Nothing is retried.

pub mod bookings;
pub mod showtimes;
pub mod theaters;

pub use bookings::{BookingListAction, BookingListEnvironment, BookingListReducer, BookingListState};
pub use showtimes::{
    ShowtimeListAction, ShowtimeListEnvironment, ShowtimeListReducer, ShowtimeListState,
    StatusFilter,
};
pub use theaters::{TheaterListAction, TheaterListEnvironment, TheaterListReducer, TheaterListState};

/// Outcome of an async operation as carried by a completion action
///
/// Errors are reduced to their message so actions stay `Clone`.
pub type Outcome<T> = Result<T, String>;

/// Begin a fetch unless one is already running
///
/// Returns `false` if the fetch must be skipped.
fn begin_fetch(is_loading: &mut bool, last_error: &mut Option<String>) -> bool {
    if *is_loading {
        tracing::debug!("Fetch already in flight, ignoring");
        return false;
    }
    *is_loading = true;
    *last_error = None;
    true
}

fn to_outcome<T, E: std::fmt::Display>(result: Result<T, E>) -> Outcome<T> {
    result.map_err(|e| e.to_string())
}
