//! GitHub client port — the capability object handed to automations.
//!
//! Automations never build HTTP requests themselves; they call this trait.
//! The production implementation lives in `gitautomata-adapter-github-reqwest`.
//! Every operation returns the API's JSON response as-is.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use gitautomata_domain::error::GitAutomataError;

/// How a pull request is merged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    #[default]
    Merge,
    Squash,
    Rebase,
}

impl MergeMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Squash => "squash",
            Self::Rebase => "rebase",
        }
    }
}

/// Optional parameters for [`GitHubClient::merge_pull_request`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub commit_title: Option<String>,
    pub commit_message: Option<String>,
    pub method: MergeMethod,
}

/// Remote operations available to automations.
///
/// The trait is object-safe so a single `Arc<dyn GitHubClient>` can be shared
/// by every automation in the registry.
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Fetch a repository.
    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Value, GitAutomataError>;

    /// Fetch an issue (or pull request, which GitHub also serves as an issue).
    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Value, GitAutomataError>;

    /// Open a new issue.
    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<Value, GitAutomataError>;

    /// Open a pull request from `head` into `base`.
    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
        body: Option<&str>,
    ) -> Result<Value, GitAutomataError>;

    /// Add labels to an issue or pull request.
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<Value, GitAutomataError>;

    /// Publish a release for `tag`. The release name defaults to the tag.
    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        name: Option<&str>,
        body: Option<&str>,
    ) -> Result<Value, GitAutomataError>;

    /// Merge a pull request.
    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        options: MergeOptions,
    ) -> Result<Value, GitAutomataError>;

    /// Comment on an issue or pull request.
    async fn add_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<Value, GitAutomataError>;

    /// List check runs for a commit ref.
    async fn list_commit_checks(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<Value, GitAutomataError>;

    /// The user the client is authenticated as.
    async fn get_authenticated_user(&self) -> Result<Value, GitAutomataError>;
}
