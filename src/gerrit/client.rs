//! Gerrit REST client.
//!
//! A thin wrapper around a `reqwest::Client` holding the base URL and HTTP
//! credentials. All calls go through the authenticated `/a/` prefix, and all
//! JSON responses are stripped of Gerrit's `)]}'` cross-site-scripting guard
//! before decoding.

use std::borrow::Cow;
use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{ChangeId, GroupName, RevisionId, Username};

use super::error::GerritApiError;

/// How many changes to request when counting an account's history.
///
/// Tier classification only distinguishes counts up to six, so a short first
/// page is enough; there is no need to walk the full history of a prolific
/// contributor.
const CHANGE_QUERY_LIMIT: u32 = 10;

/// Gerrit prepends this to every JSON response body.
const XSSI_PREFIX: &str = ")]}'";

/// Per-request timeout for query/action calls. The streaming event
/// connection uses its own client without a whole-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// An authenticated Gerrit REST API client.
#[derive(Clone)]
pub struct GerritClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
}

impl std::fmt::Debug for GerritClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GerritClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Characters that must be escaped inside a single URL path segment.
/// Notably `/` and `%`, so that group names and usernames containing them
/// cannot change the shape of the request path.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%')
    .add(b'\\')
    .add(b'^')
    .add(b'|');

/// Percent-encodes one path segment.
fn path_segment(segment: &str) -> Cow<'_, str> {
    utf8_percent_encode(segment, PATH_SEGMENT).into()
}

/// Strips Gerrit's XSSI guard prefix and surrounding whitespace.
pub(crate) fn strip_xssi_prefix(body: &str) -> &str {
    body.trim_start()
        .strip_prefix(XSSI_PREFIX)
        .unwrap_or(body)
        .trim_start()
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    username: Option<String>,
}

#[derive(Debug, Serialize)]
struct ReviewInput<'a> {
    message: &'a str,
    reviewers: Vec<ReviewerInput<'a>>,
}

#[derive(Debug, Serialize)]
struct ReviewerInput<'a> {
    reviewer: &'a str,
}

impl GerritClient {
    /// Creates a client for the Gerrit instance at `base_url`, e.g.
    /// `https://gerrit.example.org`.
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            username: username.into(),
            password: password.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/a/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .basic_auth(&self.username, Some(&self.password))
    }

    /// Reads a JSON response body, checking the status first.
    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, GerritApiError> {
        let status = response.status();
        let body = response.text().await.map_err(GerritApiError::transport)?;
        if !status.is_success() {
            return Err(GerritApiError::http(status.as_u16(), &body));
        }
        serde_json::from_str(strip_xssi_prefix(&body)).map_err(GerritApiError::decode)
    }

    /// Checks the status of a response whose body we do not need.
    async fn expect_success(response: Response) -> Result<(), GerritApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(GerritApiError::http(status.as_u16(), &body))
    }

    /// Counts the changes owned by `owner`, saturating at
    /// [`CHANGE_QUERY_LIMIT`].
    pub async fn count_owned_changes(&self, owner: &Username) -> Result<u64, GerritApiError> {
        let response = self
            .request(reqwest::Method::GET, "changes/")
            .query(&[
                ("q", format!("owner:{}", owner)),
                ("n", CHANGE_QUERY_LIMIT.to_string()),
            ])
            .send()
            .await
            .map_err(GerritApiError::transport)?;
        let changes: Vec<serde_json::Value> = Self::read_json(response).await?;
        debug!(owner = %owner, count = changes.len(), "counted owned changes");
        Ok(changes.len() as u64)
    }

    /// Lists the handles of the reviewers registered on a change. Accounts
    /// without a username (service accounts identified only by id) are
    /// skipped.
    pub async fn list_change_reviewers(
        &self,
        change: &ChangeId,
    ) -> Result<Vec<Username>, GerritApiError> {
        let path = format!("changes/{}/reviewers/", path_segment(change.as_str()));
        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .map_err(GerritApiError::transport)?;
        let reviewers: Vec<AccountInfo> = Self::read_json(response).await?;
        Ok(reviewers
            .into_iter()
            .filter_map(|a| a.username)
            .filter(|u| !u.is_empty())
            .map(Username::new)
            .collect())
    }

    /// Posts `message` as a review on the given revision and registers
    /// `reviewer` on the change, in a single review call.
    pub async fn post_review(
        &self,
        change: &ChangeId,
        revision: &RevisionId,
        message: &str,
        reviewer: &Username,
    ) -> Result<(), GerritApiError> {
        let path = format!(
            "changes/{}/revisions/{}/review",
            path_segment(change.as_str()),
            path_segment(revision.as_str())
        );
        let input = ReviewInput {
            message,
            reviewers: vec![ReviewerInput {
                reviewer: reviewer.as_str(),
            }],
        };
        let response = self
            .request(reqwest::Method::POST, &path)
            .json(&input)
            .send()
            .await
            .map_err(GerritApiError::transport)?;
        Self::expect_success(response).await
    }

    /// Creates the group if it does not exist. HTTP 409 means the group is
    /// already there and is treated as success.
    pub async fn ensure_group(&self, group: &GroupName) -> Result<(), GerritApiError> {
        let path = format!("groups/{}", path_segment(group.as_str()));
        let response = self
            .request(reqwest::Method::PUT, &path)
            .send()
            .await
            .map_err(GerritApiError::transport)?;
        if response.status() == StatusCode::CONFLICT {
            debug!(group = %group, "group already exists");
            return Ok(());
        }
        Self::expect_success(response).await
    }

    /// Adds `member` to `group`. Gerrit treats re-adding an existing member
    /// as success, so no pre-check is needed here.
    pub async fn add_group_member(
        &self,
        group: &GroupName,
        member: &Username,
    ) -> Result<(), GerritApiError> {
        let path = format!(
            "groups/{}/members/{}",
            path_segment(group.as_str()),
            path_segment(member.as_str())
        );
        let response = self
            .request(reqwest::Method::PUT, &path)
            .send()
            .await
            .map_err(GerritApiError::transport)?;
        Self::expect_success(response).await
    }

    /// Lists the member handles of `group`.
    pub async fn list_group_members(
        &self,
        group: &GroupName,
    ) -> Result<Vec<Username>, GerritApiError> {
        let path = format!("groups/{}/members/", path_segment(group.as_str()));
        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .map_err(GerritApiError::transport)?;
        let members: Vec<AccountInfo> = Self::read_json(response).await?;
        Ok(members
            .into_iter()
            .filter_map(|a| a.username)
            .filter(|u| !u.is_empty())
            .map(Username::new)
            .collect())
    }

    /// Removes `member` from `group`.
    pub async fn remove_group_member(
        &self,
        group: &GroupName,
        member: &Username,
    ) -> Result<(), GerritApiError> {
        let path = format!(
            "groups/{}/members/{}",
            path_segment(group.as_str()),
            path_segment(member.as_str())
        );
        let response = self
            .request(reqwest::Method::DELETE, &path)
            .send()
            .await
            .map_err(GerritApiError::transport)?;
        Self::expect_success(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xssi_prefix_is_stripped() {
        assert_eq!(strip_xssi_prefix(")]}'\n[{\"id\":1}]"), "[{\"id\":1}]");
        assert_eq!(strip_xssi_prefix("[1,2,3]"), "[1,2,3]");
        assert_eq!(strip_xssi_prefix(")]}'{}"), "{}");
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = GerritClient::new("https://gerrit.example.org/", "bot", "secret").unwrap();
        assert_eq!(
            client.url("changes/?q=owner:alice&n=10"),
            "https://gerrit.example.org/a/changes/?q=owner:alice&n=10"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        assert_eq!(path_segment("alice"), "alice");
        assert_eq!(path_segment("New Comers"), "New%20Comers");
        assert_eq!(path_segment("a/b"), "a%2Fb");
        assert_eq!(path_segment("100%"), "100%25");
        assert_eq!(path_segment("tick?ed"), "tick%3Fed");
    }
}
