//! Posting the report as a pull-request comment.
//!
//! The report is kept to a single comment per PR: earlier runs are found by
//! the footer marker and edited in place, so a busy PR does not accumulate a
//! report per push.

use crate::report::COMMENT_FOOTER;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header;
use serde::Deserialize;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = "autometrics/diff-metrics v1";

#[derive(Debug, Deserialize)]
struct IssueComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    user: Option<CommentUser>,
}

#[derive(Debug, Deserialize)]
struct CommentUser {
    #[serde(rename = "type")]
    kind: String,
}

/// Client for the issue-comment endpoints of one repository.
pub struct CommentClient {
    http: Client,
    api_base: String,
    repo: String,
}

impl CommentClient {
    /// `repo` is the `owner/name` slug; the token needs `issues: write`.
    pub fn new(repo: String, token: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {token}"))
            .context("github token is not a valid header value")?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("failed to build the GitHub client")?;

        Ok(Self {
            http,
            api_base: API_BASE.to_string(),
            repo,
        })
    }

    /// Edit our previous comment on the PR, or post a new one.
    pub fn update_or_post(&self, pr_number: u64, body: &str) -> Result<()> {
        let previous = match self.find_previous_comment(pr_number) {
            Ok(found) => found,
            Err(e) => {
                log::error!("error checking for previous comments: {e:#}");
                None
            }
        };

        if let Some(comment_id) = previous {
            log::info!("updating previous comment #{comment_id}");
            match self.update_comment(comment_id, body) {
                Ok(()) => return Ok(()),
                Err(e) => log::error!("error editing previous comment: {e:#}"),
            }
        }

        log::info!("creating new comment");
        self.create_comment(pr_number, body)
    }

    /// Most recent bot comment carrying the report footer, if any.
    fn find_previous_comment(&self, pr_number: u64) -> Result<Option<u64>> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments?per_page=100",
            self.api_base, self.repo, pr_number
        );
        let comments: Vec<IssueComment> = self
            .http
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("failed to list comments on PR {pr_number}"))?
            .json()
            .context("failed to decode the comment listing")?;

        let found = comments.iter().rev().find(|comment| {
            let is_bot = comment
                .user
                .as_ref()
                .is_some_and(|user| user.kind == "Bot");
            let has_marker = comment
                .body
                .as_deref()
                .is_some_and(|body| body.contains(COMMENT_FOOTER));
            is_bot && has_marker
        });
        Ok(found.map(|comment| comment.id))
    }

    fn update_comment(&self, comment_id: u64, body: &str) -> Result<()> {
        let url = format!(
            "{}/repos/{}/issues/comments/{}",
            self.api_base, self.repo, comment_id
        );
        self.http
            .patch(url)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("failed to update comment {comment_id}"))?;
        Ok(())
    }

    fn create_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        let url = format!(
            "{}/repos/{}/issues/{}/comments",
            self.api_base, self.repo, pr_number
        );
        self.http
            .post(url)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .and_then(|response| response.error_for_status())
            .with_context(|| format!("failed to comment on PR {pr_number}"))?;
        Ok(())
    }
}
