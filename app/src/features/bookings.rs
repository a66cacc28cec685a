//! Booking list feature.
//!
//! Lists the bookings made on one day and forwards add/update/delete to the
//! [`BookingService`]. The local list is patched once the service confirms a
//! mutation.

use super::{begin_fetch, to_outcome, Outcome};
use crate::service::BookingService;
use crate::types::{BookingRecord, Money};
use chrono::{FixedOffset, NaiveDate};
use cinema_admin_core::{async_effect, effect::Effect, environment::Clock, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// State of the booking list screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingListState {
    /// Bookings of the selected day
    pub bookings: Vec<BookingRecord>,
    /// Day the list was last fetched for
    pub selected_date: Option<NaiveDate>,
    /// Whether a fetch is in flight
    pub is_loading: bool,
    /// Message of the last failed operation
    pub last_error: Option<String>,
}

impl BookingListState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bookings for one movie
    #[must_use]
    pub fn bookings_for_movie(&self, movie_name: &str) -> Vec<&BookingRecord> {
        self.bookings
            .iter()
            .filter(|b| b.movie_name == movie_name)
            .collect()
    }

    /// Tickets sold across the list
    #[must_use]
    pub fn total_tickets(&self) -> u32 {
        self.bookings
            .iter()
            .fold(0, |sum, b| sum.saturating_add(b.ticket_count))
    }

    /// Amount charged across the list
    #[must_use]
    pub fn total_revenue(&self) -> Money {
        self.bookings
            .iter()
            .fold(Money::ZERO, |sum, b| sum.saturating_add(b.total_amount))
    }
}

/// Actions of the booking list screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingListAction {
    /// Load the bookings made on `date`
    Fetch {
        /// Booking day
        date: NaiveDate,
    },
    /// Load the bookings made today in the configured offset
    FetchToday,
    /// A fetch finished
    Fetched {
        /// Day that was fetched
        date: NaiveDate,
        /// Bookings or error message
        result: Outcome<Vec<BookingRecord>>,
    },
    /// Record a new booking
    Add {
        /// Booking to add
        record: BookingRecord,
    },
    /// An add finished
    Added {
        /// The added booking or error message
        result: Outcome<BookingRecord>,
    },
    /// Replace an existing booking
    Update {
        /// Replacement, identified by date, movie and slot
        record: BookingRecord,
    },
    /// An update finished
    Updated {
        /// The new booking or error message
        result: Outcome<BookingRecord>,
    },
    /// Remove the bookings for a movie on a day
    Delete {
        /// Booking day
        booking_date: NaiveDate,
        /// Movie title
        movie_name: String,
    },
    /// A delete finished
    Deleted {
        /// The removed key or error message
        result: Outcome<(NaiveDate, String)>,
    },
}

/// Dependencies of the booking list reducer
#[derive(Clone)]
pub struct BookingListEnvironment {
    /// Booking backend
    pub service: Arc<dyn BookingService>,
    /// Clock used to decide what "today" is
    pub clock: Arc<dyn Clock>,
    /// Offset of the local calendar day
    pub utc_offset: FixedOffset,
}

impl BookingListEnvironment {
    /// Creates a new `BookingListEnvironment`
    #[must_use]
    pub fn new(service: Arc<dyn BookingService>, clock: Arc<dyn Clock>, utc_offset: FixedOffset) -> Self {
        Self {
            service,
            clock,
            utc_offset,
        }
    }

    /// Today in the configured offset
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.utc_offset).date_naive()
    }
}

/// Reducer for the booking list screen
#[derive(Clone, Debug, Default)]
pub struct BookingListReducer;

impl BookingListReducer {
    /// Creates a new `BookingListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fetch(
        state: &mut BookingListState,
        date: NaiveDate,
        env: &BookingListEnvironment,
    ) -> SmallVec<[Effect<BookingListAction>; 4]> {
        if !begin_fetch(&mut state.is_loading, &mut state.last_error) {
            return SmallVec::new();
        }

        let service = Arc::clone(&env.service);
        smallvec![async_effect! {
            let result = service.fetch_bookings(date).await;
            Some(BookingListAction::Fetched { date, result: to_outcome(result) })
        }]
    }
}

impl Reducer for BookingListReducer {
    type State = BookingListState;
    type Action = BookingListAction;
    type Environment = BookingListEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Loading ==========
            BookingListAction::Fetch { date } => Self::fetch(state, date, env),

            BookingListAction::FetchToday => Self::fetch(state, env.today(), env),

            BookingListAction::Fetched { date, result } => {
                state.is_loading = false;
                match result {
                    Ok(bookings) => {
                        state.bookings = bookings;
                        state.selected_date = Some(date);
                    },
                    Err(error) => {
                        tracing::warn!(%date, %error, "Booking fetch failed");
                        state.last_error = Some(error);
                    },
                }
                SmallVec::new()
            },

            // ========== Mutations ==========
            BookingListAction::Add { record } => {
                state.last_error = None;
                let service = Arc::clone(&env.service);
                smallvec![async_effect! {
                    let result = service.add_booking(record.clone()).await.map(|()| record);
                    Some(BookingListAction::Added { result: to_outcome(result) })
                }]
            },

            BookingListAction::Update { record } => {
                state.last_error = None;
                let service = Arc::clone(&env.service);
                smallvec![async_effect! {
                    let result = service.update_booking(record.clone()).await.map(|()| record);
                    Some(BookingListAction::Updated { result: to_outcome(result) })
                }]
            },

            BookingListAction::Delete {
                booking_date,
                movie_name,
            } => {
                state.last_error = None;
                let service = Arc::clone(&env.service);
                smallvec![async_effect! {
                    let result = service
                        .delete_booking(booking_date, movie_name.clone())
                        .await
                        .map(|()| (booking_date, movie_name));
                    Some(BookingListAction::Deleted { result: to_outcome(result) })
                }]
            },

            BookingListAction::Added { result } => {
                match result {
                    Ok(record) => {
                        // Only show it if it belongs to the day on screen and
                        // a fetch that finished first has not listed it already
                        if state.selected_date.is_none_or(|d| d == record.booking_date)
                            && !state.bookings.contains(&record)
                        {
                            state.bookings.push(record);
                        }
                    },
                    Err(error) => state.last_error = Some(error),
                }
                SmallVec::new()
            },

            BookingListAction::Updated { result } => {
                match result {
                    Ok(record) => {
                        if let Some(slot) = state.bookings.iter_mut().find(|b| b.same_booking(&record)) {
                            *slot = record;
                        }
                    },
                    Err(error) => state.last_error = Some(error),
                }
                SmallVec::new()
            },

            BookingListAction::Deleted { result } => {
                match result {
                    Ok((booking_date, movie_name)) => state
                        .bookings
                        .retain(|b| !(b.booking_date == booking_date && b.movie_name == movie_name)),
                    Err(error) => state.last_error = Some(error),
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::service::InMemoryBookingService;
    use crate::types::{SeatCode, TicketType};
    use chrono::NaiveTime;
    use cinema_admin_testing::{assertions, run_effects, test_clock, ReducerTest};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn booking(movie: &str, d: u32, tickets: u32) -> BookingRecord {
        BookingRecord {
            booking_date: day(d),
            movie_name: movie.to_string(),
            show_date: day(d),
            show_time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            ticket_count: tickets,
            ticket_type: TicketType::Full,
            seats: SeatCode::parse_list("A1").unwrap(),
            total_amount: Money::from_cents(u64::from(tickets) * 28_000),
        }
    }

    fn env_with(service: InMemoryBookingService) -> BookingListEnvironment {
        BookingListEnvironment::new(
            Arc::new(service),
            Arc::new(test_clock()),
            FixedOffset::east_opt(8 * 3600).unwrap(),
        )
    }

    #[test]
    fn fetch_starts_loading() {
        ReducerTest::new(BookingListReducer::new())
            .with_env(env_with(InMemoryBookingService::new()))
            .given_state(BookingListState {
                last_error: Some("old".to_string()),
                ..BookingListState::new()
            })
            .when_action(BookingListAction::Fetch { date: day(20) })
            .then_state(|state| {
                assert!(state.is_loading);
                assert!(state.last_error.is_none());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn fetch_while_loading_is_ignored() {
        let loading = BookingListState {
            is_loading: true,
            bookings: vec![booking("Demo", 20, 2)],
            ..BookingListState::new()
        };
        let expected = loading.clone();

        ReducerTest::new(BookingListReducer::new())
            .with_env(env_with(InMemoryBookingService::new()))
            .given_state(loading)
            .when_action(BookingListAction::Fetch { date: day(21) })
            .then_state_eq(expected)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn back_to_back_fetches_start_one_request() {
        ReducerTest::new(BookingListReducer::new())
            .with_env(env_with(InMemoryBookingService::new()))
            .given_state(BookingListState::new())
            .when_actions([BookingListAction::Fetch { date: day(20) }, BookingListAction::FetchToday])
            .then_state(|state| assert!(state.is_loading))
            .then_effects(|effects| assertions::assert_future_count(effects, 1))
            .run();
    }

    #[tokio::test]
    async fn fetch_today_uses_the_local_calendar_day() {
        // 06:00 UTC on the 20th is still the 20th at UTC+8
        let service = InMemoryBookingService::with_records(vec![booking("Demo", 20, 2), booking("Old", 19, 1)]);

        let effects = ReducerTest::new(BookingListReducer::new())
            .with_env(env_with(service))
            .given_state(BookingListState::new())
            .when_action(BookingListAction::FetchToday)
            .run_collecting_effects();

        let actions = run_effects(effects).await;
        match actions.as_slice() {
            [BookingListAction::Fetched { date, result: Ok(bookings) }] => {
                assert_eq!(*date, day(20));
                assert_eq!(bookings.len(), 1);
                assert_eq!(bookings[0].movie_name, "Demo");
            },
            other => panic!("unexpected actions: {other:?}"),
        }
    }

    #[test]
    fn failed_fetch_keeps_the_previous_list() {
        ReducerTest::new(BookingListReducer::new())
            .with_env(env_with(InMemoryBookingService::new()))
            .given_state(BookingListState {
                is_loading: true,
                bookings: vec![booking("Demo", 20, 2)],
                selected_date: Some(day(20)),
                last_error: None,
            })
            .when_action(BookingListAction::Fetched {
                date: day(21),
                result: Err("bad server response".to_string()),
            })
            .then_state(|state| {
                assert!(!state.is_loading);
                assert_eq!(state.bookings.len(), 1);
                assert_eq!(state.selected_date, Some(day(20)));
                assert_eq!(state.last_error.as_deref(), Some("bad server response"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn successful_fetch_replaces_the_list() {
        ReducerTest::new(BookingListReducer::new())
            .with_env(env_with(InMemoryBookingService::new()))
            .given_state(BookingListState {
                is_loading: true,
                bookings: vec![booking("Old", 19, 1), booking("Older", 19, 1)],
                ..BookingListState::new()
            })
            .when_action(BookingListAction::Fetched {
                date: day(20),
                result: Ok(vec![booking("Demo", 20, 2)]),
            })
            .then_state(|state| {
                assert!(!state.is_loading);
                assert_eq!(state.bookings, vec![booking("Demo", 20, 2)]);
                assert_eq!(state.selected_date, Some(day(20)));
            })
            .run();
    }

    #[tokio::test]
    async fn update_patches_the_list_after_the_service_confirms() {
        let service = InMemoryBookingService::with_records(vec![booking("Demo", 20, 2)]);
        let env = env_with(service);
        let reducer = BookingListReducer::new();
        let mut state = BookingListState {
            bookings: vec![booking("Demo", 20, 2)],
            selected_date: Some(day(20)),
            ..BookingListState::new()
        };

        let effects = reducer.reduce(
            &mut state,
            BookingListAction::Update {
                record: booking("Demo", 20, 5),
            },
            &env,
        );
        assert_eq!(state.bookings[0].ticket_count, 2);

        for action in run_effects(effects.into_vec()).await {
            let _ = reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state.bookings[0].ticket_count, 5);
        assert!(state.last_error.is_none());
    }

    #[tokio::test]
    async fn failed_delete_reports_the_error() {
        let env = env_with(InMemoryBookingService::new());
        let reducer = BookingListReducer::new();
        let mut state = BookingListState::new();

        let effects = reducer.reduce(
            &mut state,
            BookingListAction::Delete {
                booking_date: day(20),
                movie_name: "Demo".to_string(),
            },
            &env,
        );
        for action in run_effects(effects.into_vec()).await {
            let _ = reducer.reduce(&mut state, action, &env);
        }

        assert!(state.last_error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn add_confirmed_after_a_fetch_that_listed_it_is_not_duplicated() {
        let service = InMemoryBookingService::new();
        let env = env_with(service.clone());
        let reducer = BookingListReducer::new();
        let mut state = BookingListState {
            selected_date: Some(day(20)),
            ..BookingListState::new()
        };

        // The backend stores the row, but the completion is held back
        let add = reducer.reduce(
            &mut state,
            BookingListAction::Add {
                record: booking("Demo", 20, 2),
            },
            &env,
        );
        let held = run_effects(add.into_vec()).await;

        let fetch = reducer.reduce(&mut state, BookingListAction::Fetch { date: day(20) }, &env);
        for action in run_effects(fetch.into_vec()).await {
            let _ = reducer.reduce(&mut state, action, &env);
        }
        assert_eq!(state.bookings.len(), 1);

        for action in held {
            let _ = reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(service.all().await.len(), 1);
        assert_eq!(state.bookings, vec![booking("Demo", 20, 2)]);
        assert!(state.last_error.is_none());
    }

    #[test]
    fn added_booking_for_another_day_is_not_listed() {
        ReducerTest::new(BookingListReducer::new())
            .with_env(env_with(InMemoryBookingService::new()))
            .given_state(BookingListState {
                selected_date: Some(day(20)),
                ..BookingListState::new()
            })
            .when_action(BookingListAction::Added {
                result: Ok(booking("Demo", 21, 2)),
            })
            .then_state(|state| assert!(state.bookings.is_empty()))
            .run();
    }

    #[test]
    fn derived_totals() {
        let state = BookingListState {
            bookings: vec![booking("Demo", 20, 2), booking("Other", 20, 1), booking("Demo", 20, 3)],
            ..BookingListState::new()
        };

        assert_eq!(state.bookings_for_movie("Demo").len(), 2);
        assert_eq!(state.total_tickets(), 6);
        assert_eq!(state.total_revenue(), Money::from_cents(168_000));
    }
}
