//! # Cinema Admin Testing
//!
//! Testing utilities and helpers for the cinema admin feature stores.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Helpers that drive effect futures to completion without a Store
//!
//! ## Example
//!
//! ```ignore
//! use cinema_admin_testing::{assertions, ReducerTest};
//!
//! ReducerTest::new(BookingListReducer::new())
//!     .with_env(test_environment())
//!     .given_state(BookingListState::default())
//!     .when_action(BookingListAction::Fetch { date })
//!     .then_state(|state| assert!(state.is_loading))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use cinema_admin_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use cinema_admin_testing::mocks::FixedClock;
    /// use cinema_admin_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-20 06:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-20T06:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Helpers for executing effects outside a Store
pub mod helpers {
    use cinema_admin_core::effect::Effect;
    use futures::future::BoxFuture;
    use futures::FutureExt;

    /// Run every effect to completion and collect the actions they produce
    ///
    /// `Parallel` groups are awaited in declaration order, which keeps the
    /// output deterministic. Actions are not fed back into any reducer.
    pub async fn run_effects<A: Send + 'static>(effects: Vec<Effect<A>>) -> Vec<A> {
        let mut produced = Vec::new();
        for effect in effects {
            produced.extend(run_effect(effect).await);
        }
        produced
    }

    fn run_effect<A: Send + 'static>(effect: Effect<A>) -> BoxFuture<'static, Vec<A>> {
        async move {
            match effect {
                Effect::None => Vec::new(),
                Effect::Future(fut) => fut.await.into_iter().collect(),
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    let mut produced = Vec::new();
                    for effect in effects {
                        produced.extend(run_effect(effect).await);
                    }
                    produced
                },
            }
        }
        .boxed()
    }
}

// Re-export commonly used items
pub use helpers::run_effects;
pub use mocks::{test_clock, FixedClock};
