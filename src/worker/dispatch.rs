//! Contributor classification and action dispatch.
//!
//! One event at a time: query the uploader's historical change count,
//! compute the tier, and run the tier's action sequence through the injected
//! interpreter. Failures are logged and abandon the rest of the sequence;
//! nothing is rolled back, nothing is retried, and no failure is fatal to
//! the loop.
//!
//! Per-event state machine:
//! received → classified → { no_action | acting → done }, terminal on
//! either branch.

use std::fmt;

use tracing::{error, info, instrument};

use crate::classify::Tier;
use crate::effects::{GerritEffect, GerritInterpreter, GerritResponse};
use crate::events::PatchsetCreatedEvent;
use crate::types::{GroupName, Username};

/// The fixed identities and text the dispatcher acts with.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Group that tags first-time and new contributors.
    pub newcomer_group: GroupName,

    /// Account registered as reviewer on first-time changes.
    pub greeter: Username,

    /// Welcome text posted on a first-time contributor's change.
    pub welcome_message: String,
}

/// What handling an event amounted to. Returned so the consumer loop can
/// decide whether to raise a best-effort alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The tier required no action.
    NoAction(Tier),

    /// The whole action sequence ran; `actions` counts the mutating calls
    /// actually issued (idempotency checks can legitimately make it zero).
    Completed { tier: Tier, actions: usize },

    /// The history query failed; the event was consumed with no actions.
    QueryFailed,

    /// An action failed partway; earlier actions in the sequence stand.
    ActionFailed { tier: Tier },
}

impl DispatchOutcome {
    /// True when the consumer loop should raise an alert.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            DispatchOutcome::QueryFailed | DispatchOutcome::ActionFailed { .. }
        )
    }
}

/// Why an action sequence stopped: the interpreter failed, or it answered a
/// call with a response variant that call can never produce.
#[derive(Debug)]
enum ActionError<E> {
    Api(E),
    UnexpectedResponse {
        call: &'static str,
        response: GerritResponse,
    },
}

impl<E> From<E> for ActionError<E> {
    fn from(e: E) -> Self {
        ActionError::Api(e)
    }
}

impl<E: fmt::Display> fmt::Display for ActionError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Api(e) => e.fmt(f),
            ActionError::UnexpectedResponse { call, response } => {
                write!(f, "unexpected response to {call}: {response:?}")
            }
        }
    }
}

/// Classifies uploaders and issues their tier's remote actions.
pub struct Dispatcher<I> {
    gerrit: I,
    config: DispatchConfig,
}

impl<I> Dispatcher<I>
where
    I: GerritInterpreter,
    I::Error: fmt::Display,
{
    pub fn new(gerrit: I, config: DispatchConfig) -> Self {
        Dispatcher { gerrit, config }
    }

    #[cfg(test)]
    pub(crate) fn gerrit_for_tests(&self) -> &I {
        &self.gerrit
    }

    /// Handles one patchset-created event to completion.
    #[instrument(skip(self, event), fields(uploader = %event.uploader, change = %event.change))]
    pub async fn handle_event(&self, event: &PatchsetCreatedEvent) -> DispatchOutcome {
        let count = match self
            .gerrit
            .interpret(GerritEffect::CountOwnedChanges {
                owner: event.uploader.clone(),
            })
            .await
        {
            Ok(GerritResponse::ChangeCount(n)) => n,
            Ok(other) => {
                error!(?other, "unexpected response to change count query");
                return DispatchOutcome::QueryFailed;
            }
            Err(e) => {
                error!(error = %e, "change count query failed");
                return DispatchOutcome::QueryFailed;
            }
        };

        let tier = Tier::from_patch_count(count);
        info!(count, %tier, "classified uploader");

        let result = match tier {
            Tier::None => return DispatchOutcome::NoAction(tier),
            Tier::FirstTime => self.welcome_and_group(event).await,
            Tier::New => self.join_newcomers(&event.uploader).await,
            Tier::Rising => self.leave_newcomers(&event.uploader).await,
        };

        match result {
            Ok(actions) => DispatchOutcome::Completed { tier, actions },
            Err(e) => {
                error!(error = %e, %tier, "action failed; abandoning remaining actions");
                DispatchOutcome::ActionFailed { tier }
            }
        }
    }

    /// First-time contributors: the welcome review, then group membership.
    async fn welcome_and_group(
        &self,
        event: &PatchsetCreatedEvent,
    ) -> Result<usize, ActionError<I::Error>> {
        let mut actions = 0;

        // The welcome must land at most once ever, so check whether the
        // greeter is already on the change before posting.
        let reviewers = match self
            .gerrit
            .interpret(GerritEffect::ListChangeReviewers {
                change: event.change.clone(),
            })
            .await?
        {
            GerritResponse::Reviewers(reviewers) => reviewers,
            response => {
                return Err(ActionError::UnexpectedResponse {
                    call: "reviewer listing",
                    response,
                })
            }
        };

        if reviewers.contains(&self.config.greeter) {
            info!(change = %event.change, "greeter already on change; skipping welcome");
        } else {
            self.gerrit
                .interpret(GerritEffect::PostWelcomeReview {
                    change: event.change.clone(),
                    revision: event.revision.clone(),
                    message: self.config.welcome_message.clone(),
                    reviewer: self.config.greeter.clone(),
                })
                .await?;
            info!(change = %event.change, "posted welcome review");
            actions += 1;
        }

        actions += self.join_newcomers(&event.uploader).await?;
        Ok(actions)
    }

    /// Adds the uploader to the newcomer group, creating the group first.
    /// Both calls tolerate already-exists on the platform side.
    async fn join_newcomers(&self, member: &Username) -> Result<usize, ActionError<I::Error>> {
        self.gerrit
            .interpret(GerritEffect::EnsureGroup {
                group: self.config.newcomer_group.clone(),
            })
            .await?;

        self.gerrit
            .interpret(GerritEffect::AddGroupMember {
                group: self.config.newcomer_group.clone(),
                member: member.clone(),
            })
            .await?;
        info!(%member, group = %self.config.newcomer_group, "added to newcomer group");
        Ok(1)
    }

    /// Removes the uploader from the newcomer group, but only after the
    /// platform confirms membership; no spurious removal call.
    async fn leave_newcomers(&self, member: &Username) -> Result<usize, ActionError<I::Error>> {
        let members = match self
            .gerrit
            .interpret(GerritEffect::ListGroupMembers {
                group: self.config.newcomer_group.clone(),
            })
            .await?
        {
            GerritResponse::Members(members) => members,
            response => {
                return Err(ActionError::UnexpectedResponse {
                    call: "group member listing",
                    response,
                })
            }
        };

        if !members.contains(member) {
            return Ok(0);
        }

        self.gerrit
            .interpret(GerritEffect::RemoveGroupMember {
                group: self.config.newcomer_group.clone(),
                member: member.clone(),
            })
            .await?;
        info!(%member, group = %self.config.newcomer_group, "removed from newcomer group");
        Ok(1)
    }
}
