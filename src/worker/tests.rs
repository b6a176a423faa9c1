use std::fmt;
use std::sync::Mutex;

use crate::classify::Tier;
use crate::effects::{GerritEffect, GerritInterpreter, GerritResponse};
use crate::events::PatchsetCreatedEvent;
use crate::types::{ChangeId, GroupName, RevisionId, Username};

use super::{DispatchConfig, DispatchOutcome, Dispatcher};

#[derive(Debug)]
struct MockError(&'static str);

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recording interpreter: returns canned data and keeps every effect it was
/// asked to run, in order.
struct MockGerrit {
    /// `None` makes the count query fail.
    change_count: Option<u64>,
    reviewers: Vec<Username>,
    members: Vec<Username>,
    fail_welcome: bool,
    /// Answer listing effects with `Done` instead of their list variant.
    garble_listings: bool,
    calls: Mutex<Vec<GerritEffect>>,
}

impl MockGerrit {
    fn with_count(count: u64) -> Self {
        MockGerrit {
            change_count: Some(count),
            reviewers: Vec::new(),
            members: Vec::new(),
            fail_welcome: false,
            garble_listings: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_query() -> Self {
        MockGerrit {
            change_count: None,
            ..Self::with_count(0)
        }
    }

    fn calls(&self) -> Vec<GerritEffect> {
        self.calls.lock().unwrap().clone()
    }
}

impl GerritInterpreter for MockGerrit {
    type Error = MockError;

    async fn interpret(&self, effect: GerritEffect) -> Result<GerritResponse, Self::Error> {
        self.calls.lock().unwrap().push(effect.clone());
        match effect {
            GerritEffect::CountOwnedChanges { .. } => self
                .change_count
                .map(GerritResponse::ChangeCount)
                .ok_or(MockError("count query exploded")),
            GerritEffect::ListChangeReviewers { .. } => {
                if self.garble_listings {
                    Ok(GerritResponse::Done)
                } else {
                    Ok(GerritResponse::Reviewers(self.reviewers.clone()))
                }
            }
            GerritEffect::PostWelcomeReview { .. } => {
                if self.fail_welcome {
                    Err(MockError("review call exploded"))
                } else {
                    Ok(GerritResponse::Done)
                }
            }
            GerritEffect::ListGroupMembers { .. } => {
                if self.garble_listings {
                    Ok(GerritResponse::Done)
                } else {
                    Ok(GerritResponse::Members(self.members.clone()))
                }
            }
            GerritEffect::EnsureGroup { .. }
            | GerritEffect::AddGroupMember { .. }
            | GerritEffect::RemoveGroupMember { .. } => Ok(GerritResponse::Done),
        }
    }
}

fn config() -> DispatchConfig {
    DispatchConfig {
        newcomer_group: GroupName::new("Newcomers"),
        greeter: Username::new("first-time-greeter"),
        welcome_message: "Welcome, and thank you for your first contribution!".to_string(),
    }
}

fn event_from(uploader: &str) -> PatchsetCreatedEvent {
    PatchsetCreatedEvent {
        uploader: Username::new(uploader),
        change: ChangeId::new("I8437bfbb"),
        revision: RevisionId::new("674ac754"),
    }
}

/// Shorthand: the variant name of each recorded effect, for order checks.
fn effect_names(calls: &[GerritEffect]) -> Vec<&'static str> {
    calls
        .iter()
        .map(|e| match e {
            GerritEffect::CountOwnedChanges { .. } => "count",
            GerritEffect::ListChangeReviewers { .. } => "list_reviewers",
            GerritEffect::PostWelcomeReview { .. } => "welcome",
            GerritEffect::EnsureGroup { .. } => "ensure_group",
            GerritEffect::AddGroupMember { .. } => "add_member",
            GerritEffect::ListGroupMembers { .. } => "list_members",
            GerritEffect::RemoveGroupMember { .. } => "remove_member",
        })
        .collect()
}

#[tokio::test]
async fn first_time_contributor_is_welcomed_then_grouped() {
    let gerrit = MockGerrit::with_count(1);
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("alice")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            tier: Tier::FirstTime,
            actions: 2
        }
    );
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec![
            "count",
            "list_reviewers",
            "welcome",
            "ensure_group",
            "add_member"
        ]
    );
}

#[tokio::test]
async fn already_welcomed_contributor_is_not_welcomed_again() {
    let mut gerrit = MockGerrit::with_count(1);
    gerrit.reviewers = vec![Username::new("first-time-greeter")];
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("alice")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            tier: Tier::FirstTime,
            actions: 1
        }
    );
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count", "list_reviewers", "ensure_group", "add_member"]
    );
}

#[tokio::test]
async fn new_contributor_is_only_added_to_group() {
    let gerrit = MockGerrit::with_count(3);
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("bob")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            tier: Tier::New,
            actions: 1
        }
    );
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count", "ensure_group", "add_member"]
    );
}

#[tokio::test]
async fn rising_contributor_is_removed_from_group() {
    let mut gerrit = MockGerrit::with_count(7);
    gerrit.members = vec![Username::new("carol"), Username::new("dave")];
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("carol")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            tier: Tier::Rising,
            actions: 1
        }
    );
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count", "list_members", "remove_member"]
    );
}

#[tokio::test]
async fn rising_non_member_triggers_no_removal_call() {
    let gerrit = MockGerrit::with_count(9);
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("erin")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::Completed {
            tier: Tier::Rising,
            actions: 0
        }
    );
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count", "list_members"]
    );
}

#[tokio::test]
async fn zero_count_takes_no_action() {
    let gerrit = MockGerrit::with_count(0);
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("ghost")).await;

    assert_eq!(outcome, DispatchOutcome::NoAction(Tier::None));
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count"]
    );
}

#[tokio::test]
async fn query_failure_is_consumed_without_actions() {
    let gerrit = MockGerrit::failing_query();
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("frank")).await;

    assert_eq!(outcome, DispatchOutcome::QueryFailed);
    assert!(outcome.is_failure());
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count"]
    );
}

#[tokio::test]
async fn garbled_reviewer_listing_fails_the_welcome_sequence() {
    let mut gerrit = MockGerrit::with_count(1);
    gerrit.garble_listings = true;
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("alice")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::ActionFailed {
            tier: Tier::FirstTime
        }
    );
    // No welcome goes out on the strength of a listing we could not read.
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count", "list_reviewers"]
    );
}

#[tokio::test]
async fn garbled_member_listing_fails_the_removal_sequence() {
    let mut gerrit = MockGerrit::with_count(7);
    gerrit.garble_listings = true;
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("carol")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::ActionFailed { tier: Tier::Rising }
    );
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count", "list_members"]
    );
}

#[tokio::test]
async fn welcome_failure_abandons_the_group_add() {
    let mut gerrit = MockGerrit::with_count(1);
    gerrit.fail_welcome = true;
    let dispatcher = Dispatcher::new(gerrit, config());

    let outcome = dispatcher.handle_event(&event_from("alice")).await;

    assert_eq!(
        outcome,
        DispatchOutcome::ActionFailed {
            tier: Tier::FirstTime
        }
    );
    assert_eq!(
        effect_names(&dispatcher.gerrit_for_tests().calls()),
        vec!["count", "list_reviewers", "welcome"]
    );
}
