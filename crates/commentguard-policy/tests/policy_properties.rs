//! Property tests for the decision policy

use commentguard_core::Outcome;
use commentguard_policy::{DecisionPolicy, PolicyPreset};
use proptest::prelude::*;

fn severity(outcome: Outcome) -> u8 {
    match outcome {
        Outcome::Safe => 0,
        Outcome::Warn => 1,
        Outcome::Blocked => 2,
    }
}

proptest! {
    #[test]
    fn final_score_always_in_unit_interval(ml in -2.0f64..3.0, boost in 0.0f64..0.25) {
        for preset in [PolicyPreset::LiveStream, PolicyPreset::Coarse] {
            let decision = preset.policy().decide(ml, boost);
            prop_assert!((0.0..=1.0).contains(&decision.final_score));
        }
    }

    #[test]
    fn outcome_is_monotone_in_score(a in 0.0f64..1.0, b in 0.0f64..1.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        for policy in [DecisionPolicy::live_stream(), DecisionPolicy::coarse()] {
            prop_assert!(severity(policy.outcome_for(lo)) <= severity(policy.outcome_for(hi)));
        }
    }

    #[test]
    fn boost_never_lowers_severity(ml in 0.0f64..1.0, boost in 0.0f64..0.25) {
        let policy = DecisionPolicy::coarse();
        let without = policy.decide(ml, 0.0).outcome;
        let with = policy.decide(ml, boost).outcome;
        prop_assert!(severity(with) >= severity(without));
    }
}

#[test]
fn test_both_variants_at_literal_thresholds() {
    let live = DecisionPolicy::live_stream();
    let coarse = DecisionPolicy::coarse();

    // ml_score = 0.01 sits on the inclusive safe bound of the live-stream bands
    assert_eq!(live.decide(0.01, 0.0).outcome, Outcome::Safe);
    assert_eq!(coarse.decide(0.01, 0.0).outcome, Outcome::Safe);

    assert_eq!(live.decide(0.03, 0.0).outcome, Outcome::Blocked);
    assert_eq!(coarse.decide(0.03, 0.0).outcome, Outcome::Safe);

    assert_eq!(live.decide(0.40, 0.0).outcome, Outcome::Blocked);
    assert_eq!(coarse.decide(0.40, 0.0).outcome, Outcome::Warn);

    assert_eq!(coarse.decide(0.70, 0.0).outcome, Outcome::Blocked);
}
