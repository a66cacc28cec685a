//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Future` from an async block
///
/// The block must evaluate to `Option<Action>`; `Some` feeds the action
/// back into the store.
///
/// # Example
///
/// ```rust,ignore
/// use cinema_admin_core::async_effect;
///
/// let service = Arc::clone(&env.service);
/// async_effect! {
///     let result = service.fetch_bookings(date).await;
///     Some(BookingListAction::FetchCompleted { result: result.map_err(|e| e.to_string()) })
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;

    #[derive(Clone, Debug)]
    enum TestAction {
        AsyncResult { value: i32 },
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::AsyncResult { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[test]
    fn test_async_effect_captures_by_move() {
        let value = String::from("captured");
        let effect: Effect<TestAction> = async_effect! {
            let _owned = value;
            None
        };

        assert!(!effect.is_noop());
    }
}
