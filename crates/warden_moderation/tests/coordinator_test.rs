//! End-to-end tests for the enforcement state machine.

mod test_helpers;

use test_helpers::{
    BUS_GROUP, DETECTOR, ENFORCER, Harness, MemoryLedger, MockTransport, dual_policy, invite,
    notice, single_policy,
};
use warden_core::{
    EventClass, GroupId, GroupMessage, InviteEvent, MemberRole, PeerId, PluginPolicy,
    UNKNOWN_GROUP_NAME, UserId, wire,
};
use warden_moderation::{DropReason, Outcome, RejectReason, Stage};

fn plain_member() -> MockTransport {
    MockTransport::new()
        .with_member(100, 42, MemberRole::Member, "Spammer")
        .with_group(200, "Deals")
}

#[tokio::test]
async fn test_single_identity_scenario() {
    let harness = Harness::new(single_policy());
    let peer = harness.connect(DETECTOR, plain_member());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    let report = match outcome {
        Outcome::Logged(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(*report.ledger_written());
    assert!(*report.notice_sent());
    assert_eq!(report.request_rejected(), &None);

    assert_eq!(peer.kicks(), vec![(GroupId(100), UserId(42))]);
    let messages = peer.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, GroupId(100));
    assert!(messages[0].1.contains("42"));
    assert!(messages[0].1.contains("200"));
    assert!(messages[0].1.contains("Deals"));

    let entries = harness.ledger.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].group_id(), &GroupId(100));
    assert_eq!(entries[0].user_id(), &UserId(42));
    assert_eq!(entries[0].target_group_id(), &GroupId(200));
    assert_eq!(harness.metrics.snapshot().enforced, 1);
}

#[tokio::test]
async fn test_kick_failure_stops_everything() {
    let policy = PluginPolicy::builder()
        .detector_identity(DETECTOR)
        .enforcer_identity(DETECTOR)
        .watched_groups(vec![GroupId(100)])
        .enabled(true)
        .reject_on_detect(true)
        .build()
        .unwrap();
    let harness = Harness::new(policy);
    let peer = harness.connect(DETECTOR, plain_member().failing_kick());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    assert!(matches!(
        outcome,
        Outcome::Failed {
            stage: Stage::Enforced,
            ..
        }
    ));
    assert_eq!(peer.kicks().len(), 1);
    assert!(peer.messages().is_empty(), "no notice after a failed kick");
    assert!(peer.rejects().is_empty(), "pending request left untouched");
    assert!(harness.ledger.entries().is_empty());
    assert_eq!(harness.metrics.snapshot().failed, 1);
}

#[tokio::test]
async fn test_notice_failure_still_writes_ledger() {
    let harness = Harness::new(single_policy());
    let peer = harness.connect(DETECTOR, plain_member().failing_send());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    let report = match outcome {
        Outcome::Logged(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(!*report.notice_sent());
    assert!(*report.ledger_written());
    assert_eq!(peer.kicks().len(), 1);
    assert_eq!(harness.ledger.entries().len(), 1);
    assert_eq!(harness.metrics.snapshot().notice_failures, 1);
}

#[tokio::test]
async fn test_ledger_failure_still_sends_notice() {
    let harness = Harness::with_ledger(single_policy(), MemoryLedger::failing());
    let peer = harness.connect(DETECTOR, plain_member());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    let report = match outcome {
        Outcome::Logged(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(!*report.ledger_written());
    assert!(*report.notice_sent());
    assert_eq!(peer.messages().len(), 1);
}

#[tokio::test]
async fn test_single_mode_rejects_after_kick() {
    let policy = PluginPolicy::builder()
        .detector_identity(DETECTOR)
        .enforcer_identity(DETECTOR)
        .watched_groups(vec![GroupId(100)])
        .enabled(true)
        .reject_on_detect(true)
        .build()
        .unwrap();
    let harness = Harness::new(policy);
    let peer = harness.connect(DETECTOR, plain_member());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    match outcome {
        Outcome::Logged(report) => assert_eq!(report.request_rejected(), &Some(true)),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(peer.rejects(), vec!["flag-1".to_string()]);
}

#[tokio::test]
async fn test_target_name_falls_back_to_placeholder() {
    let harness = Harness::new(single_policy());
    let peer = harness.connect(
        DETECTOR,
        MockTransport::new().with_member(100, 42, MemberRole::Member, "Spammer"),
    );

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    match outcome {
        Outcome::Logged(report) => {
            assert_eq!(report.record().target_group_name(), UNKNOWN_GROUP_NAME)
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(peer.kicks().len(), 1);
}

#[tokio::test]
async fn test_administrator_is_exempt() {
    let harness = Harness::new(single_policy());
    let peer = harness.connect(
        DETECTOR,
        MockTransport::new().with_member(100, 42, MemberRole::Admin, "Mod"),
    );

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    assert!(matches!(
        outcome,
        Outcome::Dropped(DropReason::Filtered(RejectReason::Exempt { .. }))
    ));
    assert!(peer.kicks().is_empty());
    assert!(peer.messages().is_empty());
}

#[tokio::test]
async fn test_unresolvable_inviter_is_still_removed() {
    let harness = Harness::new(single_policy());
    let peer = harness.connect(DETECTOR, MockTransport::new());

    let outcome = harness.coordinator.handle_invite(&notice(DETECTOR)).await;

    let report = match outcome {
        Outcome::Logged(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(peer.kicks(), vec![(GroupId(100), UserId(42))]);
    assert_eq!(report.record().display_card(), "42");
    assert!(report.record().nickname().is_empty());
    let entries = harness.ledger.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].group_id(), &GroupId(100));
}

#[tokio::test]
async fn test_request_from_outsider_is_dropped() {
    let harness = Harness::new(single_policy());
    let peer = harness.connect(DETECTOR, MockTransport::new());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    assert!(matches!(
        outcome,
        Outcome::Dropped(DropReason::Filtered(RejectReason::NoHomeGroup(UserId(42))))
    ));
    assert!(peer.kicks().is_empty());
}

#[tokio::test]
async fn test_join_request_is_ignored() {
    let harness = Harness::new(single_policy());
    let peer = harness.connect(DETECTOR, plain_member());
    let event = InviteEvent::builder()
        .self_id(DETECTOR)
        .class(EventClass::JoinRequest)
        .group_id(GroupId(100))
        .user_id(UserId(42))
        .build()
        .unwrap();

    let outcome = harness.coordinator.handle_invite(&event).await;

    assert!(matches!(
        outcome,
        Outcome::Dropped(DropReason::Filtered(RejectReason::NotInvitation(_)))
    ));
    assert!(peer.calls().is_empty());
}

#[tokio::test]
async fn test_offline_enforcer_drops_event() {
    let policy = PluginPolicy::builder()
        .detector_identity(DETECTOR)
        .enforcer_identity(ENFORCER)
        .watched_groups(vec![GroupId(100)])
        .enabled(true)
        .build()
        .unwrap();
    let harness = Harness::new(policy);
    let peer = harness.connect(DETECTOR, plain_member());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    assert!(matches!(
        outcome,
        Outcome::Dropped(DropReason::Unreachable(_))
    ));
    assert!(peer.kicks().is_empty());
}

#[tokio::test]
async fn test_dual_identity_bus_scenario() {
    let harness = Harness::new(dual_policy());
    let detector = harness.connect(DETECTOR, plain_member());
    let enforcer = harness.connect(
        ENFORCER,
        MockTransport::new().with_member(100, 42, MemberRole::Member, "Spammer"),
    );

    let published = harness.coordinator.handle_invite(&invite(DETECTOR)).await;
    let (record, request_held) = match published {
        Outcome::Published {
            record,
            request_held,
        } => (record, request_held),
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert!(request_held);
    assert!(detector.rejects().is_empty(), "no reject before the kick");
    assert!(detector.kicks().is_empty(), "detector never kicks");
    assert_eq!(harness.coordinator.held_requests(), 1);

    let bus = detector.messages();
    assert_eq!(bus.len(), 1);
    assert_eq!(bus[0].0, GroupId(BUS_GROUP));
    assert_eq!(wire::decode(&bus[0].1).unwrap(), record);

    let message = GroupMessage::new(
        PeerId::new(ENFORCER),
        GroupId(BUS_GROUP),
        UserId(10001),
        bus[0].1.clone(),
    );
    let outcome = harness.coordinator.handle_bus_message(&message).await;

    let report = match outcome {
        Outcome::Logged(report) => report,
        other => panic!("unexpected outcome: {:?}", other),
    };
    assert_eq!(report.request_rejected(), &Some(true));
    assert_eq!(detector.rejects(), vec!["flag-1".to_string()]);
    assert!(enforcer.rejects().is_empty(), "the detector holds the request");
    assert_eq!(harness.coordinator.held_requests(), 0);
    assert_eq!(enforcer.kicks(), vec![(GroupId(100), UserId(42))]);
    let notices = enforcer.messages();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, GroupId(100));
    assert!(notices[0].1.contains("42"));
    assert!(notices[0].1.contains("200"));
    assert_eq!(harness.ledger.entries().len(), 1);
}

#[tokio::test]
async fn test_dual_mode_kick_failure_leaves_request_pending() {
    let harness = Harness::new(dual_policy());
    let detector = harness.connect(DETECTOR, plain_member());
    let enforcer = harness.connect(ENFORCER, plain_member().failing_kick());

    harness.coordinator.handle_invite(&invite(DETECTOR)).await;
    let line = detector.messages()[0].1.clone();
    let message = GroupMessage::new(PeerId::new(ENFORCER), GroupId(BUS_GROUP), UserId(10001), line);

    let outcome = harness.coordinator.handle_bus_message(&message).await;

    assert!(matches!(
        outcome,
        Outcome::Failed {
            stage: Stage::Enforced,
            ..
        }
    ));
    assert_eq!(enforcer.kicks().len(), 1);
    assert!(detector.rejects().is_empty());
    assert!(enforcer.rejects().is_empty());
    assert_eq!(harness.coordinator.held_requests(), 0);
}

#[tokio::test]
async fn test_dual_mode_ignores_invite_at_enforcer() {
    let harness = Harness::new(dual_policy());
    let enforcer = harness.connect(ENFORCER, plain_member());

    let outcome = harness.coordinator.handle_invite(&invite(ENFORCER)).await;

    assert!(matches!(
        outcome,
        Outcome::Dropped(DropReason::Filtered(RejectReason::WrongReceiver { .. }))
    ));
    assert!(enforcer.calls().is_empty());
}

#[tokio::test]
async fn test_bus_publish_failure() {
    let harness = Harness::new(dual_policy());
    let detector = harness.connect(DETECTOR, plain_member().failing_send());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    assert!(matches!(
        outcome,
        Outcome::Failed {
            stage: Stage::Published,
            ..
        }
    ));
    assert!(detector.rejects().is_empty());
}

#[tokio::test]
async fn test_truncated_wire_line_takes_no_action() {
    let harness = Harness::new(dual_policy());
    let enforcer = harness.connect(ENFORCER, plain_member());
    let message = GroupMessage::new(
        PeerId::new(ENFORCER),
        GroupId(BUS_GROUP),
        UserId(10001),
        "InvalidGroupInvitationDetect | Time: 2024-01-01 00:00:00 | MonitorGroup: 100 | User: 42",
    );

    let outcome = harness.coordinator.handle_bus_message(&message).await;

    assert!(matches!(outcome, Outcome::Dropped(DropReason::Decode(_))));
    assert!(enforcer.calls().is_empty());
    assert!(harness.ledger.entries().is_empty());
    assert_eq!(harness.metrics.snapshot().decode_failures, 1);
}

#[tokio::test]
async fn test_bus_message_from_stranger_is_ignored() {
    let harness = Harness::new(dual_policy());
    let enforcer = harness.connect(ENFORCER, plain_member());
    let detector = harness.connect(DETECTOR, plain_member());

    harness.coordinator.handle_invite(&invite(DETECTOR)).await;
    let line = detector.messages()[0].1.clone();
    let forged = GroupMessage::new(PeerId::new(ENFORCER), GroupId(BUS_GROUP), UserId(555), line);

    let outcome = harness.coordinator.handle_bus_message(&forged).await;

    assert!(matches!(
        outcome,
        Outcome::Dropped(DropReason::UntrustedSender(UserId(555)))
    ));
    assert!(enforcer.kicks().is_empty());
}

#[tokio::test]
async fn test_bus_revalidation_skips_administrator() {
    let harness = Harness::new(dual_policy());
    let detector = harness.connect(DETECTOR, plain_member());
    // Promoted between detection and enforcement.
    let enforcer = harness.connect(
        ENFORCER,
        MockTransport::new().with_member(100, 42, MemberRole::Admin, "Spammer"),
    );

    harness.coordinator.handle_invite(&invite(DETECTOR)).await;
    let line = detector.messages()[0].1.clone();
    let message = GroupMessage::new(PeerId::new(ENFORCER), GroupId(BUS_GROUP), UserId(10001), line);

    let outcome = harness.coordinator.handle_bus_message(&message).await;

    assert!(matches!(
        outcome,
        Outcome::Dropped(DropReason::Administrator { .. })
    ));
    assert!(enforcer.kicks().is_empty());
}

#[tokio::test]
async fn test_bus_revalidation_fails_open_on_lookup_error() {
    let harness = Harness::new(dual_policy());
    let detector = harness.connect(DETECTOR, plain_member());
    let enforcer = harness.connect(ENFORCER, MockTransport::new());

    harness.coordinator.handle_invite(&invite(DETECTOR)).await;
    let line = detector.messages()[0].1.clone();
    let message = GroupMessage::new(PeerId::new(ENFORCER), GroupId(BUS_GROUP), UserId(10001), line);

    let outcome = harness.coordinator.handle_bus_message(&message).await;

    assert!(outcome.is_enforced());
    assert_eq!(enforcer.kicks().len(), 1);
}

#[tokio::test]
async fn test_disabled_policy_never_acts() {
    let policy = PluginPolicy::builder()
        .detector_identity(DETECTOR)
        .enforcer_identity(DETECTOR)
        .watched_groups(vec![GroupId(100)])
        .enabled(false)
        .build()
        .unwrap();
    let harness = Harness::new(policy);
    let peer = harness.connect(DETECTOR, plain_member());

    let outcome = harness.coordinator.handle_invite(&invite(DETECTOR)).await;

    assert!(matches!(
        outcome,
        Outcome::Dropped(DropReason::Filtered(RejectReason::Disabled))
    ));
    assert!(peer.calls().is_empty());
}
