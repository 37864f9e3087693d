use buildbeacon::domain::models::{
    aggregate_verdicts, JobHealth, JobVerdict, LightState, StreakBasis, UnknownHealthPolicy,
};
use proptest::prelude::*;

fn policy() -> impl Strategy<Value = UnknownHealthPolicy> {
    prop_oneof![
        Just(UnknownHealthPolicy::FailOpen),
        Just(UnknownHealthPolicy::FailClosed),
    ]
}

fn build_number() -> impl Strategy<Value = Option<u64>> {
    prop::option::of(1u64..500)
}

proptest! {
    /// Property: a job whose last completed build is stable is always ok
    #[test]
    fn prop_stable_last_build_is_ok(
        completed in 1u64..500,
        oldest in build_number(),
        failed in build_number(),
        tolerated in 0u64..20,
        policy in policy(),
    ) {
        let health = JobHealth {
            oldest_build: oldest,
            last_completed_build: Some(completed),
            last_failed_build: failed,
            last_stable_build: Some(completed),
            claimed: false,
        };
        prop_assert!(health.last_ok());
        prop_assert!(health.ok(tolerated, policy));
    }

    /// Property: with no failure on record the streak is zero and the job is ok
    #[test]
    fn prop_no_failure_means_zero_streak(
        oldest in build_number(),
        completed in build_number(),
        stable in build_number(),
    ) {
        let health = JobHealth {
            oldest_build: oldest,
            last_completed_build: completed,
            last_failed_build: None,
            last_stable_build: stable,
            claimed: false,
        };
        prop_assert_eq!(health.streak_basis(), StreakBasis::InsufficientData);
        prop_assert_eq!(health.consecutive_failure_count(), 0);
        prop_assert!(health.ok(0, UnknownHealthPolicy::FailOpen));
    }

    /// Property: a failing job is ok exactly while its streak is tolerated
    #[test]
    fn prop_streak_threshold(
        stable in 1u64..400,
        streak in 1u64..50,
        tolerated in 0u64..60,
        policy in policy(),
    ) {
        let failed = stable + streak;
        let health = JobHealth {
            oldest_build: Some(1),
            last_completed_build: Some(failed),
            last_failed_build: Some(failed),
            last_stable_build: Some(stable),
            claimed: false,
        };
        prop_assert_eq!(health.consecutive_failure_count(), streak);
        prop_assert_eq!(health.ok(tolerated, policy), streak <= tolerated);
    }

    /// Property: raising the tolerance never turns an ok job into a failing one
    #[test]
    fn prop_tolerance_is_monotonic(
        oldest in build_number(),
        completed in build_number(),
        failed in build_number(),
        stable in build_number(),
        tolerated in 0u64..50,
        extra in 0u64..50,
        policy in policy(),
    ) {
        let health = JobHealth {
            oldest_build: oldest,
            last_completed_build: completed,
            last_failed_build: failed,
            last_stable_build: stable,
            claimed: false,
        };
        if health.ok(tolerated, policy) {
            prop_assert!(health.ok(tolerated + extra, policy));
        }
    }

    /// Property: fail-closed never accepts a job fail-open rejects
    #[test]
    fn prop_fail_closed_is_stricter(
        oldest in build_number(),
        completed in build_number(),
        failed in build_number(),
        stable in build_number(),
        tolerated in 0u64..50,
    ) {
        let health = JobHealth {
            oldest_build: oldest,
            last_completed_build: completed,
            last_failed_build: failed,
            last_stable_build: stable,
            claimed: false,
        };
        if health.ok(tolerated, UnknownHealthPolicy::FailClosed) {
            prop_assert!(health.ok(tolerated, UnknownHealthPolicy::FailOpen));
        }
    }

    /// Property: the light is alert iff some failing job is unclaimed
    #[test]
    fn prop_aggregate_alert_iff_unclaimed_failure(
        flags in prop::collection::vec((any::<bool>(), any::<bool>()), 0..12),
    ) {
        let verdicts: Vec<JobVerdict> = flags
            .iter()
            .enumerate()
            .map(|(i, &(ok, claimed))| JobVerdict { name: format!("job-{i}"), ok, claimed })
            .collect();

        let state = aggregate_verdicts(&verdicts);
        let unclaimed_failure = verdicts.iter().any(|v| !v.ok && !v.claimed);
        let any_failure = verdicts.iter().any(|v| !v.ok);

        prop_assert_eq!(state == LightState::Alert, unclaimed_failure);
        prop_assert_eq!(state == LightState::Ok, !any_failure);
    }
}

#[test]
fn test_unknown_health_follows_policy() {
    let unknown = JobHealth::unknown();
    assert!(unknown.ok(0, UnknownHealthPolicy::FailOpen));
    assert!(!unknown.ok(0, UnknownHealthPolicy::FailClosed));
}
