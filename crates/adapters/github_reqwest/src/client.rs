//! [`RestGitHubClient`] — `GitHubClient` over the GitHub REST API.

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Serialize;
use serde_json::Value;

use gitautomata_app::ports::{GitHubClient, MergeOptions};
use gitautomata_domain::error::GitAutomataError;

use crate::config::GitHubConfig;
use crate::error::GitHubError;

const API_VERSION_HEADER: &str = "x-github-api-version";

/// REST client sharing one connection pool across every automation.
#[derive(Debug, Clone)]
pub struct RestGitHubClient {
    http: reqwest::Client,
    api_url: Url,
}

impl RestGitHubClient {
    /// Build a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidUrl`] if the API base URL cannot be
    /// parsed, [`GitHubError::InvalidHeader`] if the token or API version
    /// cannot be sent as a header, or [`GitHubError::Build`] if the HTTP
    /// client cannot be created.
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let api_url = Url::parse(&config.api_url).map_err(|err| GitHubError::InvalidUrl {
            url: config.api_url.clone(),
            reason: err.to_string(),
        })?;
        if api_url.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl {
                url: config.api_url.clone(),
                reason: "cannot be used as a base url".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("gitautomata/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            API_VERSION_HEADER,
            HeaderValue::from_str(&config.api_version).map_err(|source| {
                GitHubError::InvalidHeader {
                    name: API_VERSION_HEADER,
                    source,
                }
            })?,
        );
        if let Some(token) = config.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|source| {
                GitHubError::InvalidHeader {
                    name: "authorization",
                    source,
                }
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(GitHubError::Build)?;

        Ok(Self { http, api_url })
    }

    /// Append `segments` to the API base URL. Each segment is
    /// percent-encoded, so a `/` or `?` inside an owner, repository or ref
    /// stays within its own segment.
    fn url<I>(&self, segments: I) -> Url
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    #[tracing::instrument(skip(self, request))]
    async fn request_json(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value, GitHubError> {
        let response = request
            .send()
            .await
            .map_err(|source| GitHubError::Transport { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "github api returned an error");
            return Err(GitHubError::status(operation, status.as_u16(), &body));
        }

        tracing::debug!(status = status.as_u16(), "github api call succeeded");
        response
            .json::<Value>()
            .await
            .map_err(|source| GitHubError::Decode { operation, source })
    }
}

#[derive(Serialize)]
struct NewIssue<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

#[derive(Serialize)]
struct NewPullRequest<'a> {
    title: &'a str,
    head: &'a str,
    base: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

#[derive(Serialize)]
struct NewLabels<'a> {
    labels: &'a [String],
}

#[derive(Serialize)]
struct NewRelease<'a> {
    tag_name: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<&'a str>,
}

#[derive(Serialize)]
struct MergeRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit_message: Option<&'a str>,
    merge_method: &'static str,
}

#[derive(Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

#[async_trait]
impl GitHubClient for RestGitHubClient {
    async fn get_repo(&self, owner: &str, repo: &str) -> Result<Value, GitAutomataError> {
        let request = self.http.get(self.url(["repos", owner, repo]));
        Ok(self.request_json("get repository", request).await?)
    }

    async fn get_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Value, GitAutomataError> {
        let number = number.to_string();
        let request = self
            .http
            .get(self.url(["repos", owner, repo, "issues", number.as_str()]));
        Ok(self.request_json("get issue", request).await?)
    }

    async fn create_issue(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        body: Option<&str>,
    ) -> Result<Value, GitAutomataError> {
        let request = self
            .http
            .post(self.url(["repos", owner, repo, "issues"]))
            .json(&NewIssue { title, body });
        Ok(self.request_json("create issue", request).await?)
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
        let request = self
            .http
            .post(self.url(["repos", owner, repo, "pulls"]))
            .json(&NewPullRequest {
                title,
                head,
                base,
                body,
            });
        Ok(self.request_json("create pull request", request).await?)
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<Value, GitAutomataError> {
        let number = number.to_string();
        let request = self
            .http
            .post(self.url(["repos", owner, repo, "issues", number.as_str(), "labels"]))
            .json(&NewLabels { labels });
        Ok(self.request_json("add labels", request).await?)
    }

    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
        name: Option<&str>,
        body: Option<&str>,
    ) -> Result<Value, GitAutomataError> {
        let request = self
            .http
            .post(self.url(["repos", owner, repo, "releases"]))
            .json(&NewRelease {
                tag_name: tag,
                name: name.unwrap_or(tag),
                body,
            });
        Ok(self.request_json("create release", request).await?)
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        options: MergeOptions,
    ) -> Result<Value, GitAutomataError> {
        let number = number.to_string();
        let request = self
            .http
            .put(self.url(["repos", owner, repo, "pulls", number.as_str(), "merge"]))
            .json(&MergeRequest {
                commit_title: options.commit_title.as_deref(),
                commit_message: options.commit_message.as_deref(),
                merge_method: options.method.as_str(),
            });
        Ok(self.request_json("merge pull request", request).await?)
    }

    async fn add_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<Value, GitAutomataError> {
        let number = number.to_string();
        let request = self
            .http
            .post(self.url(["repos", owner, repo, "issues", number.as_str(), "comments"]))
            .json(&NewComment { body });
        Ok(self.request_json("add comment", request).await?)
    }

    async fn list_commit_checks(
        &self,
        owner: &str,
        repo: &str,
        git_ref: &str,
    ) -> Result<Value, GitAutomataError> {
        let request = self
            .http
            .get(self.url(["repos", owner, repo, "commits", git_ref, "check-runs"]));
        Ok(self.request_json("list commit checks", request).await?)
    }

    async fn get_authenticated_user(&self) -> Result<Value, GitAutomataError> {
        let request = self.http.get(self.url(["user"]));
        Ok(self.request_json("get authenticated user", request).await?)
    }
}
