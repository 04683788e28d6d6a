//! Given-When-Then harness for a single reducer step.
//!
//! Runs one action against a starting state and hands the resulting state
//! and effects to the registered checks, in registration order.

#![allow(clippy::module_name_repetitions)]

use verdant_core::{effect::Effect, reducer::Reducer};

type Check<S, A> = Box<dyn FnOnce(&S, &[Effect<A>])>;

/// One reducer step under test.
///
/// ```ignore
/// use verdant_testing::ReducerTest;
///
/// ReducerTest::new(SessionReducer::new())
///     .with_env(test_environment())
///     .given_state(AuthState::default())
///     .when_action(AuthAction::login("fern@example.com", "pw", "user"))
///     .then_state(|state| assert!(state.last_error.is_none()))
///     .then_effects(|effects| assert_eq!(effects.len(), 1))
///     .run();
/// ```
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    env: Option<R::Environment>,
    state: Option<R::State>,
    action: Option<R::Action>,
    checks: Vec<Check<R::State, R::Action>>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
{
    /// Start a test for `reducer`.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            env: None,
            state: None,
            action: None,
            checks: Vec::new(),
        }
    }

    /// Environment handed to the reducer.
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.env = Some(env);
        self
    }

    /// Starting state.
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.state = Some(state);
        self
    }

    /// Action to reduce.
    #[must_use]
    pub fn when_action(mut self, action: R::Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Check the state after the step.
    #[must_use]
    pub fn then_state<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.checks.push(Box::new(move |state, _| check(state)));
        self
    }

    /// Check the effects returned by the step.
    #[must_use]
    pub fn then_effects<F>(mut self, check: F) -> Self
    where
        F: FnOnce(&[Effect<R::Action>]) + 'static,
    {
        self.checks.push(Box::new(move |_, effects| check(effects)));
        self
    }

    /// Reduce the action and run every check.
    ///
    /// # Panics
    ///
    /// Panics if the environment, state or action was never given, or if a
    /// check fails.
    #[allow(clippy::panic)]
    pub fn run(self) {
        let (Some(env), Some(mut state), Some(action)) = (self.env, self.state, self.action) else {
            panic!("ReducerTest needs with_env, given_state and when_action before run");
        };

        let effects = self.reducer.reduce(&mut state, action, &env);

        for check in self.checks {
            check(&state, &effects);
        }
    }
}

/// Effect checks for use inside [`ReducerTest::then_effects`].
pub mod assertions {
    use verdant_core::effect::Effect;

    /// Nothing to run: empty, or only [`Effect::None`].
    ///
    /// # Panics
    ///
    /// Panics if any effect does work.
    pub fn assert_no_effects<A: std::fmt::Debug>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().all(Effect::is_none),
            "expected no effects, got {effects:?}"
        );
    }

    /// Exactly `expected` effects.
    ///
    /// # Panics
    ///
    /// Panics on any other count.
    pub fn assert_effects_count<A>(effects: &[Effect<A>], expected: usize) {
        assert_eq!(effects.len(), expected, "effect count");
    }

    /// At least one async effect, such as a backend call.
    ///
    /// # Panics
    ///
    /// Panics if none of the effects is a future.
    pub fn assert_has_future_effect<A>(effects: &[Effect<A>]) {
        assert!(
            effects.iter().any(|e| matches!(e, Effect::Future(_))),
            "expected a future effect"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::{smallvec, SmallVec};

    #[derive(Debug, Default)]
    struct Door {
        open: bool,
        knocks: u32,
    }

    #[derive(Debug)]
    enum DoorAction {
        Knock,
        Open,
    }

    struct DoorReducer;

    impl Reducer for DoorReducer {
        type State = Door;
        type Action = DoorAction;
        type Environment = ();

        fn reduce(
            &self,
            state: &mut Door,
            action: DoorAction,
            _env: &(),
        ) -> SmallVec<[Effect<DoorAction>; 4]> {
            match action {
                DoorAction::Knock => {
                    state.knocks += 1;
                    smallvec![Effect::send(DoorAction::Open)]
                },
                DoorAction::Open => {
                    state.open = true;
                    SmallVec::new()
                },
            }
        }
    }

    #[test]
    fn test_checks_see_state_and_effects() {
        ReducerTest::new(DoorReducer)
            .with_env(())
            .given_state(Door::default())
            .when_action(DoorAction::Knock)
            .then_state(|door| {
                assert_eq!(door.knocks, 1);
                assert!(!door.open);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn test_terminal_action_has_no_effects() {
        ReducerTest::new(DoorReducer)
            .with_env(())
            .given_state(Door::default())
            .when_action(DoorAction::Open)
            .then_state(|door| assert!(door.open))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    #[should_panic(expected = "given_state")]
    fn test_missing_state_panics() {
        ReducerTest::new(DoorReducer)
            .with_env(())
            .when_action(DoorAction::Open)
            .run();
    }
}
