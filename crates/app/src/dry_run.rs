//! Dry-run GitHub client.
//!
//! Implements [`GitHubClient`] without touching the network: every call is
//! logged and recorded, and answered with a canned JSON value. Used by the
//! `test` command and as a spy in tests.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};

use gitautomata_domain::error::GitAutomataError;

use crate::ports::{GitHubClient, MergeOptions};

/// One recorded client call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Port method name, e.g. `"add_labels"`.
    pub operation: &'static str,
    /// Arguments as JSON.
    pub args: Value,
}

/// Error returned for operations configured to fail with
/// [`DryRunClient::fail_on`].
#[derive(Debug, Clone, thiserror::Error)]
#[error("dry-run failure injected for {operation}")]
pub struct InjectedFailure {
    pub operation: String,
}

/// Recording [`GitHubClient`] that never contacts GitHub.
#[derive(Debug, Default)]
pub struct DryRunClient {
    calls: Mutex<Vec<RecordedCall>>,
    responses: BTreeMap<&'static str, Value>,
    failures: BTreeSet<&'static str>,
}

impl DryRunClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `operation` with `response` instead of the canned value.
    #[must_use]
    pub fn with_response(mut self, operation: &'static str, response: Value) -> Self {
        self.responses.insert(operation, response);
        self
    }

    /// Make `operation` fail with a client error.
    #[must_use]
    pub fn fail_on(mut self, operation: &'static str) -> Self {
        self.failures.insert(operation);
        self
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls made to `operation`, in order.
    #[must_use]
    pub fn calls_to(&self, operation: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation == operation)
            .collect()
    }

    fn record(
        &self,
        operation: &'static str,
        args: Value,
        canned: impl FnOnce() -> Value,
    ) -> Result<Value, GitAutomataError> {
        tracing::info!(operation, args = %args, "dry-run github call");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall { operation, args });

        if self.failures.contains(operation) {
            return Err(GitAutomataError::client(InjectedFailure {
                operation: operation.to_string(),
            }));
        }
        Ok(self
            .responses
            .get(operation)
            .cloned()
            .unwrap_or_else(canned))
    }
}

#[async_trait]
impl GitHubClient for DryRunClient {
    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Value, GitAutomataError> {
        self.record("get_repo", json!({ "owner": owner, "repo": repo }), || {
            json!({ "name": repo, "full_name": format!("{owner}/{repo}"), "owner": { "login": owner } })
        })
    }

    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Value, GitAutomataError> {
        self.record(
            "get_issue",
            json!({ "owner": owner, "repo": repo, "number": number }),
            || json!({ "number": number, "title": "", "body": null }),
        )
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<Value, GitAutomataError> {
        self.record(
            "create_issue",
            json!({ "owner": owner, "repo": repo, "title": title, "body": body }),
            || json!({ "number": 0, "title": title }),
        )
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
        body: Option<&str>,
    ) -> Result<Value, GitAutomataError> {
        self.record(
            "create_pull_request",
            json!({
                "owner": owner,
                "repo": repo,
                "title": title,
                "head": head,
                "base": base,
                "body": body,
            }),
            || json!({ "number": 0, "title": title }),
        )
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<Value, GitAutomataError> {
        self.record(
            "add_labels",
            json!({ "owner": owner, "repo": repo, "number": number, "labels": labels }),
            || Value::Array(labels.iter().map(|name| json!({ "name": name })).collect()),
        )
    }

    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        name: Option<&str>,
        body: Option<&str>,
    ) -> Result<Value, GitAutomataError> {
        self.record(
            "create_release",
            json!({ "owner": owner, "repo": repo, "tag": tag, "name": name, "body": body }),
            || json!({ "tag_name": tag, "name": name.unwrap_or(tag) }),
        )
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        options: MergeOptions,
    ) -> Result<Value, GitAutomataError> {
        self.record(
            "merge_pull_request",
            json!({
                "owner": owner,
                "repo": repo,
                "number": number,
                "commit_title": options.commit_title,
                "commit_message": options.commit_message,
                "merge_method": options.method.as_str(),
            }),
            || json!({ "merged": true }),
        )
    }

    async fn add_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<Value, GitAutomataError> {
        self.record(
            "add_comment",
            json!({ "owner": owner, "repo": repo, "number": number, "body": body }),
            || json!({ "body": body }),
        )
    }

    async fn list_commit_checks(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<Value, GitAutomataError> {
        self.record(
            "list_commit_checks",
            json!({ "owner": owner, "repo": repo, "ref": git_ref }),
            || json!({ "total_count": 0, "check_runs": [] }),
        )
    }

    async fn get_authenticated_user(&self) -> Result<Value, GitAutomataError> {
        self.record("get_authenticated_user", json!({}), || {
            json!({ "login": "dry-run" })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_record_calls_in_order() {
        let client = DryRunClient::new();

        client.get_repo("octo", "hello").await.unwrap();
        client
            .add_labels("octo", "hello", 3, &["bug".to_string()])
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operation, "get_repo");
        assert_eq!(calls[1].operation, "add_labels");
        assert_eq!(calls[1].args["labels"], json!(["bug"]));
        assert_eq!(calls[1].args["number"], 3);
    }

    #[tokio::test]
    async fn should_answer_with_canned_user() {
        let client = DryRunClient::new();
        let user = client.get_authenticated_user().await.unwrap();
        assert_eq!(user["login"], "dry-run");
    }

    #[tokio::test]
    async fn should_answer_with_configured_response() {
        let client = DryRunClient::new()
            .with_response("get_issue", json!({ "title": "fix: crash", "pull_request": {} }));

        let issue = client.get_issue("octo", "hello", 1).await.unwrap();

        assert_eq!(issue["title"], "fix: crash");
    }

    #[tokio::test]
    async fn should_fail_configured_operation_and_still_record_it() {
        let client = DryRunClient::new().fail_on("add_comment");

        let err = client.add_comment("octo", "hello", 1, "hi").await.unwrap_err();

        assert!(matches!(err, GitAutomataError::Client(_)));
        assert_eq!(client.calls_to("add_comment").len(), 1);
    }

    #[tokio::test]
    async fn should_default_release_name_to_tag() {
        let client = DryRunClient::new();
        let release = client
            .create_release("octo", "hello", "v1.0.0", None, None)
            .await
            .unwrap();
        assert_eq!(release["name"], "v1.0.0");
    }
}
