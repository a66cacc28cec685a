//! Showtime list feature.
//!
//! Keeps every showtime from the [`ShowtimeRepository`] plus a `filtered`
//! view for the selected day and status. `filtered` is rebuilt inside the
//! reducer whenever its inputs change, so every published state is
//! consistent.

use super::{begin_fetch, to_outcome, Outcome};
use crate::repository::ShowtimeRepository;
use crate::types::{MovieShowtime, ShowtimeId, ShowtimeStatus, TheaterId};
use chrono::{FixedOffset, NaiveDate};
use cinema_admin_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// Status part of the showtime filter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    /// Every status
    #[default]
    Any,
    /// Exactly this status
    Only(ShowtimeStatus),
}

impl StatusFilter {
    /// Whether `status` passes the filter
    #[must_use]
    pub fn matches(self, status: ShowtimeStatus) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Whether a showtime starts on `date` in the given offset
#[must_use]
pub fn starts_on(showtime: &MovieShowtime, date: NaiveDate, offset: FixedOffset) -> bool {
    showtime.start_time.with_timezone(&offset).date_naive() == date
}

/// State of the showtime list screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShowtimeListState {
    /// Every known showtime
    pub showtimes: Vec<MovieShowtime>,
    /// Day being shown
    pub selected_date: NaiveDate,
    /// Status being shown
    pub status_filter: StatusFilter,
    /// Showtimes on `selected_date` passing `status_filter`
    pub filtered: Vec<MovieShowtime>,
    /// Whether a fetch is in flight
    pub is_loading: bool,
    /// Message of the last failed operation
    pub last_error: Option<String>,
}

impl ShowtimeListState {
    /// Empty state showing `selected_date` with no status filter
    #[must_use]
    pub const fn new(selected_date: NaiveDate) -> Self {
        Self {
            showtimes: Vec::new(),
            selected_date,
            status_filter: StatusFilter::Any,
            filtered: Vec::new(),
            is_loading: false,
            last_error: None,
        }
    }

    /// Showtimes in one theater, on any day
    #[must_use]
    pub fn for_theater(&self, theater_id: TheaterId) -> Vec<&MovieShowtime> {
        self.showtimes
            .iter()
            .filter(|s| s.theater_id == theater_id)
            .collect()
    }

    fn refilter(&mut self, offset: FixedOffset) {
        self.filtered = self
            .showtimes
            .iter()
            .filter(|s| starts_on(s, self.selected_date, offset) && self.status_filter.matches(s.status))
            .cloned()
            .collect();
    }
}

/// Actions of the showtime list screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShowtimeListAction {
    /// Load every showtime
    Fetch,
    /// A fetch finished
    Fetched {
        /// Showtimes or error message
        result: Outcome<Vec<MovieShowtime>>,
    },
    /// Show another day
    SelectDate {
        /// Day to show
        date: NaiveDate,
    },
    /// Show another status
    SelectStatus {
        /// Status filter
        filter: StatusFilter,
    },
    /// Schedule a new showtime
    Add {
        /// Showtime to add
        showtime: MovieShowtime,
    },
    /// An add finished
    Added {
        /// The added showtime or error message
        result: Outcome<MovieShowtime>,
    },
    /// Replace a showtime
    Update {
        /// Replacement with the same id
        showtime: MovieShowtime,
    },
    /// An update finished
    Updated {
        /// The new showtime or error message
        result: Outcome<MovieShowtime>,
    },
    /// Drop a showtime
    Remove {
        /// Showtime to drop
        id: ShowtimeId,
    },
    /// A removal finished
    Removed {
        /// The removed id or error message
        result: Outcome<ShowtimeId>,
    },
}

/// Dependencies of the showtime list reducer
#[derive(Clone)]
pub struct ShowtimeListEnvironment {
    /// Showtime storage
    pub repository: Arc<dyn ShowtimeRepository>,
    /// Offset that decides which day a showtime falls on
    pub utc_offset: FixedOffset,
}

impl ShowtimeListEnvironment {
    /// Creates a new `ShowtimeListEnvironment`
    #[must_use]
    pub fn new(repository: Arc<dyn ShowtimeRepository>, utc_offset: FixedOffset) -> Self {
        Self {
            repository,
            utc_offset,
        }
    }
}

/// Reducer for the showtime list screen
#[derive(Clone, Debug, Default)]
pub struct ShowtimeListReducer;

impl ShowtimeListReducer {
    /// Creates a new `ShowtimeListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for ShowtimeListReducer {
    type State = ShowtimeListState;
    type Action = ShowtimeListAction;
    type Environment = ShowtimeListEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let repository = Arc::clone(&env.repository);

        match action {
            ShowtimeListAction::Fetch => {
                if !begin_fetch(&mut state.is_loading, &mut state.last_error) {
                    return SmallVec::new();
                }
                smallvec![async_effect! {
                    let result = repository.fetch_all().await;
                    Some(ShowtimeListAction::Fetched { result: to_outcome(result) })
                }]
            },

            ShowtimeListAction::Fetched { result } => {
                state.is_loading = false;
                match result {
                    Ok(showtimes) => {
                        state.showtimes = showtimes;
                        state.refilter(env.utc_offset);
                    },
                    Err(error) => {
                        tracing::warn!(%error, "Showtime fetch failed");
                        state.last_error = Some(error);
                    },
                }
                SmallVec::new()
            },

            ShowtimeListAction::SelectDate { date } => {
                state.selected_date = date;
                state.refilter(env.utc_offset);
                SmallVec::new()
            },

            ShowtimeListAction::SelectStatus { filter } => {
                state.status_filter = filter;
                state.refilter(env.utc_offset);
                SmallVec::new()
            },

            ShowtimeListAction::Add { showtime } => {
                state.last_error = None;
                smallvec![async_effect! {
                    let result = repository.add(showtime.clone()).await.map(|()| showtime);
                    Some(ShowtimeListAction::Added { result: to_outcome(result) })
                }]
            },

            ShowtimeListAction::Update { showtime } => {
                state.last_error = None;
                smallvec![async_effect! {
                    let result = repository.update(showtime.clone()).await.map(|()| showtime);
                    Some(ShowtimeListAction::Updated { result: to_outcome(result) })
                }]
            },

            ShowtimeListAction::Remove { id } => {
                state.last_error = None;
                smallvec![async_effect! {
                    let result = repository.remove(id).await.map(|()| id);
                    Some(ShowtimeListAction::Removed { result: to_outcome(result) })
                }]
            },

            ShowtimeListAction::Added { result } => {
                match result {
                    Ok(showtime) => match state.showtimes.iter_mut().find(|s| s.id == showtime.id) {
                        Some(slot) => *slot = showtime,
                        None => state.showtimes.push(showtime),
                    },
                    Err(error) => state.last_error = Some(error),
                }
                state.refilter(env.utc_offset);
                SmallVec::new()
            },

            ShowtimeListAction::Updated { result } => {
                match result {
                    Ok(showtime) => {
                        if let Some(slot) = state.showtimes.iter_mut().find(|s| s.id == showtime.id) {
                            *slot = showtime;
                        }
                    },
                    Err(error) => state.last_error = Some(error),
                }
                state.refilter(env.utc_offset);
                SmallVec::new()
            },

            ShowtimeListAction::Removed { result } => {
                match result {
                    Ok(id) => state.showtimes.retain(|s| s.id != id),
                    Err(error) => state.last_error = Some(error),
                }
                state.refilter(env.utc_offset);
                SmallVec::new()
            },
        }
    }
}
