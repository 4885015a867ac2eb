//! Scenario: deadline auto-resolve policies
//!
//! # Invariants under test
//!
//! 1. Before the deadline an undecided item stays InProgress under every
//!    policy.
//! 2. At or after the deadline an undecided item follows the configured
//!    policy: Escalate, ExtendByHours, AutoAccept, AutoReject.
//! 3. ExtendByHours reports the new deadline and keeps the item pending.
//! 4. A quorum that never formed still resolves by policy at the deadline,
//!    with `quorum_met == false` recorded.
//! 5. A decided item is never touched by the policy.

use modr_config::{AutoResolvePolicy, ConfigParams};
use modr_consensus::{evaluate, DecisionContext};
use modr_types::{Atto, PendingReason, ResolutionStatus};

const DEADLINE: i64 = 1_700_604_800;

fn ctx(accept: u64, reject: u64, now: i64) -> DecisionContext {
    DecisionContext {
        accept_votes: accept,
        reject_votes: reject,
        stake_accept: Atto::from_units(accept),
        stake_reject: Atto::from_units(reject),
        mint_price: Atto::from_units(10),
        now,
        deadline: DEADLINE,
        winc_per_reference_unit: Atto::ONE,
    }
}

fn with_policy(policy: AutoResolvePolicy) -> ConfigParams {
    ConfigParams {
        auto_resolve_policy: policy,
        ..ConfigParams::default()
    }
}

const ALL_POLICIES: [AutoResolvePolicy; 4] = [
    AutoResolvePolicy::Escalate,
    AutoResolvePolicy::ExtendByHours(24),
    AutoResolvePolicy::AutoAccept,
    AutoResolvePolicy::AutoReject,
];

#[test]
fn undecided_before_deadline_is_in_progress_under_every_policy() {
    for policy in ALL_POLICIES {
        let r = evaluate(&ctx(20, 20, DEADLINE - 1), &with_policy(policy)).unwrap();
        assert_eq!(r.status, ResolutionStatus::InProgress, "{policy:?}");
    }
}

#[test]
fn escalate_at_deadline() {
    let r = evaluate(
        &ctx(20, 20, DEADLINE),
        &with_policy(AutoResolvePolicy::Escalate),
    )
    .unwrap();
    assert_eq!(r.status, ResolutionStatus::RequiresEscalation);
    assert!(r.quorum_met);
}

#[test]
fn auto_accept_and_auto_reject_at_deadline() {
    let accept = evaluate(
        &ctx(20, 20, DEADLINE + 10),
        &with_policy(AutoResolvePolicy::AutoAccept),
    )
    .unwrap();
    assert_eq!(accept.status, ResolutionStatus::Validated);

    let reject = evaluate(
        &ctx(20, 20, DEADLINE + 10),
        &with_policy(AutoResolvePolicy::AutoReject),
    )
    .unwrap();
    assert_eq!(reject.status, ResolutionStatus::Rejected);
}

#[test]
fn extension_reports_new_deadline() {
    let r = evaluate(
        &ctx(20, 20, DEADLINE),
        &with_policy(AutoResolvePolicy::ExtendByHours(24)),
    )
    .unwrap();
    assert_eq!(r.status, ResolutionStatus::PendingRequirements);
    assert_eq!(
        r.reason,
        Some(PendingReason::DeadlineExtended {
            hours: 24,
            new_deadline: DEADLINE + 24 * 3_600,
        })
    );
}

#[test]
fn late_evaluation_extends_from_now() {
    let late = DEADLINE + 7_200;
    let r = evaluate(
        &ctx(20, 20, late),
        &with_policy(AutoResolvePolicy::ExtendByHours(1)),
    )
    .unwrap();
    assert_eq!(
        r.reason,
        Some(PendingReason::DeadlineExtended {
            hours: 1,
            new_deadline: late + 3_600,
        })
    );
}

#[test]
fn missing_quorum_resolves_by_policy_at_deadline() {
    // 10 votes never reach the default quorum of 22.
    let r = evaluate(
        &ctx(10, 0, DEADLINE),
        &with_policy(AutoResolvePolicy::AutoAccept),
    )
    .unwrap();
    assert_eq!(r.status, ResolutionStatus::Validated);
    assert!(!r.quorum_met);

    let before = evaluate(
        &ctx(10, 0, DEADLINE - 1),
        &with_policy(AutoResolvePolicy::AutoAccept),
    )
    .unwrap();
    assert_eq!(before.status, ResolutionStatus::PendingRequirements);
}

#[test]
fn decided_items_ignore_the_policy() {
    for policy in ALL_POLICIES {
        let r = evaluate(&ctx(30, 10, DEADLINE + 1), &with_policy(policy)).unwrap();
        assert_eq!(r.status, ResolutionStatus::Validated, "{policy:?}");
        assert_eq!(r.reason, None);
    }
}
