//! Theater list feature.

use super::{begin_fetch, to_outcome, Outcome};
use crate::repository::TheaterRepository;
use crate::types::{Theater, TheaterId, TheaterStatus, TheaterType};
use cinema_admin_core::{async_effect, effect::Effect, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// State of the theater list screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TheaterListState {
    /// Every theater
    pub theaters: Vec<Theater>,
    /// Whether a fetch is in flight
    pub is_loading: bool,
    /// Message of the last failed operation
    pub last_error: Option<String>,
}

impl TheaterListState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Theaters with one status
    #[must_use]
    pub fn by_status(&self, status: TheaterStatus) -> Vec<&Theater> {
        self.theaters.iter().filter(|t| t.status == status).collect()
    }

    /// Theaters of one kind
    #[must_use]
    pub fn by_type(&self, theater_type: TheaterType) -> Vec<&Theater> {
        self.theaters
            .iter()
            .filter(|t| t.theater_type == theater_type)
            .collect()
    }

    /// Combined advertised capacity
    #[must_use]
    pub fn total_capacity(&self) -> u64 {
        self.theaters.iter().map(|t| u64::from(t.capacity)).sum()
    }
}

/// Actions of the theater list screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TheaterListAction {
    /// Load every theater
    Fetch,
    /// A fetch finished
    Fetched {
        /// Theaters or error message
        result: Outcome<Vec<Theater>>,
    },
    /// Open a new theater
    Add {
        /// Theater to add
        theater: Theater,
    },
    /// An add finished
    Added {
        /// The added theater or error message
        result: Outcome<Theater>,
    },
    /// Replace a theater
    Update {
        /// Replacement with the same id
        theater: Theater,
    },
    /// An update finished
    Updated {
        /// The new theater or error message
        result: Outcome<Theater>,
    },
    /// Drop a theater
    Remove {
        /// Theater to drop
        id: TheaterId,
    },
    /// A removal finished
    Removed {
        /// The removed id or error message
        result: Outcome<TheaterId>,
    },
}

/// Dependencies of the theater list reducer
#[derive(Clone)]
pub struct TheaterListEnvironment {
    /// Theater storage
    pub repository: Arc<dyn TheaterRepository>,
}

impl TheaterListEnvironment {
    /// Creates a new `TheaterListEnvironment`
    #[must_use]
    pub fn new(repository: Arc<dyn TheaterRepository>) -> Self {
        Self { repository }
    }
}

/// Reducer for the theater list screen
#[derive(Clone, Debug, Default)]
pub struct TheaterListReducer;

impl TheaterListReducer {
    /// Creates a new `TheaterListReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for TheaterListReducer {
    type State = TheaterListState;
    type Action = TheaterListAction;
    type Environment = TheaterListEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let repository = Arc::clone(&env.repository);

        match action {
            TheaterListAction::Fetch => {
                if !begin_fetch(&mut state.is_loading, &mut state.last_error) {
                    return SmallVec::new();
                }
                smallvec![async_effect! {
                    let result = repository.fetch_all().await;
                    Some(TheaterListAction::Fetched { result: to_outcome(result) })
                }]
            },

            TheaterListAction::Fetched { result } => {
                state.is_loading = false;
                match result {
                    Ok(theaters) => state.theaters = theaters,
                    Err(error) => {
                        tracing::warn!(%error, "Theater fetch failed");
                        state.last_error = Some(error);
                    },
                }
                SmallVec::new()
            },

            TheaterListAction::Add { theater } => {
                if !theater.layout_matches_capacity() {
                    tracing::debug!(
                        theater = %theater.name,
                        capacity = theater.capacity,
                        seats = theater.seat_layout.seat_count(),
                        "Capacity differs from seat layout"
                    );
                }
                state.last_error = None;
                smallvec![async_effect! {
                    let result = repository.add(theater.clone()).await.map(|()| theater);
                    Some(TheaterListAction::Added { result: to_outcome(result) })
                }]
            },

            TheaterListAction::Update { theater } => {
                state.last_error = None;
                smallvec![async_effect! {
                    let result = repository.update(theater.clone()).await.map(|()| theater);
                    Some(TheaterListAction::Updated { result: to_outcome(result) })
                }]
            },

            TheaterListAction::Remove { id } => {
                state.last_error = None;
                smallvec![async_effect! {
                    let result = repository.remove(id).await.map(|()| id);
                    Some(TheaterListAction::Removed { result: to_outcome(result) })
                }]
            },

            TheaterListAction::Added { result } => {
                match result {
                    Ok(theater) => match state.theaters.iter_mut().find(|t| t.id == theater.id) {
                        Some(slot) => *slot = theater,
                        None => state.theaters.push(theater),
                    },
                    Err(error) => state.last_error = Some(error),
                }
                SmallVec::new()
            },

            TheaterListAction::Updated { result } => {
                match result {
                    Ok(theater) => {
                        if let Some(slot) = state.theaters.iter_mut().find(|t| t.id == theater.id) {
                            *slot = theater;
                        }
                    },
                    Err(error) => state.last_error = Some(error),
                }
                SmallVec::new()
            },

            TheaterListAction::Removed { result } => {
                match result {
                    Ok(id) => state.theaters.retain(|t| t.id != id),
                    Err(error) => state.last_error = Some(error),
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::repository::InMemoryTheaterRepository;
    use crate::types::SeatLayout;
    use cinema_admin_testing::{assertions, run_effects, ReducerTest};

    fn theater(name: &str, theater_type: TheaterType, status: TheaterStatus, capacity: u32) -> Theater {
        Theater {
            id: TheaterId::new(),
            name: name.to_string(),
            capacity,
            theater_type,
            status,
            seat_layout: SeatLayout::uniform(10, 10),
        }
    }

    fn env_with(repo: InMemoryTheaterRepository) -> TheaterListEnvironment {
        TheaterListEnvironment::new(Arc::new(repo))
    }

    #[test]
    fn fetch_starts_loading() {
        ReducerTest::new(TheaterListReducer::new())
            .with_env(env_with(InMemoryTheaterRepository::new()))
            .given_state(TheaterListState::new())
            .when_action(TheaterListAction::Fetch)
            .then_state(|state| assert!(state.is_loading))
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn fetch_while_loading_is_ignored() {
        ReducerTest::new(TheaterListReducer::new())
            .with_env(env_with(InMemoryTheaterRepository::new()))
            .given_state(TheaterListState {
                is_loading: true,
                ..TheaterListState::new()
            })
            .when_action(TheaterListAction::Fetch)
            .then_state(|state| assert!(state.is_loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[tokio::test]
    async fn duplicate_add_surfaces_the_conflict() {
        let hall = theater("Hall 1", TheaterType::Standard, TheaterStatus::Active, 100);
        let env = env_with(InMemoryTheaterRepository::seeded(vec![hall.clone()]));
        let reducer = TheaterListReducer::new();
        let mut state = TheaterListState {
            theaters: vec![hall.clone()],
            ..TheaterListState::new()
        };

        let effects = reducer.reduce(&mut state, TheaterListAction::Add { theater: hall }, &env);
        for action in run_effects(effects.into_vec()).await {
            let _ = reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state.theaters.len(), 1);
        assert!(state.last_error.unwrap().contains("already exists"));
    }

    #[tokio::test]
    async fn update_round_trips_through_the_repository() {
        let mut hall = theater("Hall 1", TheaterType::Standard, TheaterStatus::Active, 100);
        let repo = InMemoryTheaterRepository::seeded(vec![hall.clone()]);
        let env = env_with(repo.clone());
        let reducer = TheaterListReducer::new();
        let mut state = TheaterListState {
            theaters: vec![hall.clone()],
            ..TheaterListState::new()
        };

        hall.status = TheaterStatus::Maintenance;
        let effects = reducer.reduce(&mut state, TheaterListAction::Update { theater: hall }, &env);
        for action in run_effects(effects.into_vec()).await {
            let _ = reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state.theaters[0].status, TheaterStatus::Maintenance);
        assert_eq!(repo.fetch_all().await.unwrap()[0].status, TheaterStatus::Maintenance);
    }

    #[tokio::test]
    async fn add_confirmed_after_a_fetch_that_listed_it_is_not_duplicated() {
        let hall = theater("Hall 1", TheaterType::Standard, TheaterStatus::Active, 100);
        let env = env_with(InMemoryTheaterRepository::new());
        let reducer = TheaterListReducer::new();
        let mut state = TheaterListState::new();

        let add = reducer.reduce(&mut state, TheaterListAction::Add { theater: hall.clone() }, &env);
        let held = run_effects(add.into_vec()).await;

        let fetch = reducer.reduce(&mut state, TheaterListAction::Fetch, &env);
        for action in run_effects(fetch.into_vec()).await {
            let _ = reducer.reduce(&mut state, action, &env);
        }
        for action in held {
            let _ = reducer.reduce(&mut state, action, &env);
        }

        assert_eq!(state.theaters, vec![hall]);
    }

    #[test]
    fn derived_views() {
        let state = TheaterListState {
            theaters: vec![
                theater("Hall 1", TheaterType::Standard, TheaterStatus::Active, 100),
                theater("IMAX", TheaterType::Imax, TheaterStatus::Active, 300),
                theater("Hall 3", TheaterType::Standard, TheaterStatus::Maintenance, 80),
            ],
            ..TheaterListState::new()
        };

        assert_eq!(state.by_status(TheaterStatus::Active).len(), 2);
        assert_eq!(state.by_type(TheaterType::Standard).len(), 2);
        assert_eq!(state.by_type(TheaterType::Vip).len(), 0);
        assert_eq!(state.total_capacity(), 480);
    }
}
