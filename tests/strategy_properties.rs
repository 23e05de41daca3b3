//! Property-based tests for strategies, backoff and jitter.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use reattempt::prelude::*;
use reattempt::Strategy;
use std::cell::RefCell;
use std::time::Duration;

fn recorded(strategy: &dyn Strategy, attempt: u32) -> (bool, Vec<Duration>) {
    let slept = RefCell::new(Vec::new());
    let sleep = |duration: Duration| slept.borrow_mut().push(duration);
    let decision = strategy.should_attempt(attempt, &sleep);
    (decision, slept.into_inner())
}

proptest! {
    #[test]
    fn prop_limit_allows_exactly_below_limit(n in 0u32..1000, attempt in 0u32..2000) {
        let (decision, slept) = recorded(&limit(n), attempt);

        prop_assert_eq!(decision, attempt < n);
        prop_assert!(slept.is_empty());
    }

    #[test]
    fn prop_wait_never_sleeps_on_first_attempt(
        millis in prop::collection::vec(0u64..1000, 0..10)
    ) {
        let strategy = wait(millis.iter().copied().map(Duration::from_millis));
        let (decision, slept) = recorded(&strategy, 0);

        prop_assert!(decision);
        prop_assert!(slept.is_empty());
    }

    #[test]
    fn prop_wait_clamps_to_last_duration(
        millis in prop::collection::vec(0u64..1000, 1..10),
        attempt in 1u32..100
    ) {
        let durations: Vec<_> = millis.iter().copied().map(Duration::from_millis).collect();
        let strategy = wait(durations.clone());
        let (decision, slept) = recorded(&strategy, attempt);

        let index = ((attempt - 1) as usize).min(durations.len() - 1);
        prop_assert!(decision);
        prop_assert_eq!(slept, vec![durations[index]]);
    }

    #[test]
    fn prop_linear_backoff_sleeps_factor_times_attempt(
        factor_ms in 0u64..10_000,
        attempt in 0u32..10_000
    ) {
        let factor = Duration::from_millis(factor_ms);
        let (decision, slept) = recorded(&backoff(linear(factor)), attempt);

        prop_assert!(decision);
        if attempt == 0 {
            prop_assert!(slept.is_empty());
        } else {
            prop_assert_eq!(slept, vec![factor * attempt]);
        }
    }

    #[test]
    fn prop_fibonacci_recurrence(factor_ms in 1u64..1000, attempt in 2u32..60) {
        let algorithm = fibonacci(Duration::from_millis(factor_ms));

        prop_assert_eq!(
            algorithm.backoff(attempt),
            algorithm.backoff(attempt - 1) + algorithm.backoff(attempt - 2)
        );
    }

    #[test]
    fn prop_exponential_is_monotonic_for_base_at_least_one(
        factor_ms in 1u64..1000,
        base in 1.0f64..4.0,
        attempt in 0u32..30
    ) {
        let algorithm = exponential(Duration::from_millis(factor_ms), base);

        prop_assert!(algorithm.backoff(attempt + 1) >= algorithm.backoff(attempt));
    }

    #[test]
    fn prop_full_random_in_range(seed in any::<u64>(), nanos in 1u64..u64::MAX) {
        let jitter = FullRandom::with_rng(StdRng::seed_from_u64(seed));
        let duration = Duration::from_nanos(nanos);

        let result = jitter.jitter(duration).unwrap();
        prop_assert!(result < duration);
    }

    #[test]
    fn prop_full_random_deterministic_with_seed(seed in any::<u64>(), nanos in 1u64..1_000_000_000) {
        let first = FullRandom::with_rng(StdRng::seed_from_u64(seed));
        let second = FullRandom::with_rng(StdRng::seed_from_u64(seed));
        let duration = Duration::from_nanos(nanos);

        for _ in 0..5 {
            prop_assert_eq!(first.jitter(duration), second.jitter(duration));
        }
    }

    #[test]
    fn prop_short_circuit_skips_later_sleeps(refuse_at in 0usize..5, attempt in 1u32..10) {
        let slept = RefCell::new(Vec::new());
        let sleep = |duration: Duration| slept.borrow_mut().push(duration);
        let sleeper = wait([Duration::from_millis(1)]);
        let refuse = limit(0);

        let sleeper: &dyn Strategy = &sleeper;
        let mut strategies = vec![sleeper; 5];
        strategies.insert(refuse_at, &refuse);

        prop_assert!(!should_attempt(attempt, &sleep, &strategies));
        prop_assert_eq!(slept.into_inner().len(), refuse_at);
    }
}
