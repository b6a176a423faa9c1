//! Gerrit effect interpreter backed by the REST client.

use tracing::debug;

use crate::effects::{GerritEffect, GerritInterpreter, GerritResponse};

use super::client::GerritClient;
use super::error::GerritApiError;

impl GerritInterpreter for GerritClient {
    type Error = GerritApiError;

    async fn interpret(&self, effect: GerritEffect) -> Result<GerritResponse, Self::Error> {
        debug!(?effect, "interpreting Gerrit effect");
        match effect {
            GerritEffect::CountOwnedChanges { owner } => self
                .count_owned_changes(&owner)
                .await
                .map(GerritResponse::ChangeCount),
            GerritEffect::ListChangeReviewers { change } => self
                .list_change_reviewers(&change)
                .await
                .map(GerritResponse::Reviewers),
            GerritEffect::PostWelcomeReview {
                change,
                revision,
                message,
                reviewer,
            } => self
                .post_review(&change, &revision, &message, &reviewer)
                .await
                .map(|()| GerritResponse::Done),
            GerritEffect::EnsureGroup { group } => {
                self.ensure_group(&group).await.map(|()| GerritResponse::Done)
            }
            GerritEffect::AddGroupMember { group, member } => self
                .add_group_member(&group, &member)
                .await
                .map(|()| GerritResponse::Done),
            GerritEffect::ListGroupMembers { group } => self
                .list_group_members(&group)
                .await
                .map(GerritResponse::Members),
            GerritEffect::RemoveGroupMember { group, member } => self
                .remove_group_member(&group, &member)
                .await
                .map(|()| GerritResponse::Done),
        }
    }
}
