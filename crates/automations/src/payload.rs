//! Typed views over the parts of webhook payloads the automations read.
//!
//! Payloads stay `serde_json::Value` end to end; these structs are pulled
//! out on demand with [`field`] and tolerate missing optional keys.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use gitautomata_domain::error::ValidationError;

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub owner: Account,
}

impl Repository {
    /// `owner/name`, computed when the payload omits `full_name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.full_name
            .clone()
            .unwrap_or_else(|| format!("{}/{}", self.owner.login, self.name))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Head {
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
}

/// An issue or a pull request; GitHub shares most of the shape.
#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub user: Option<Account>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub head: Option<Head>,
}

impl Item {
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn author(&self) -> &str {
        self.user.as_ref().map_or("unknown", |user| user.login.as_str())
    }

    /// Source branch of a pull request.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.head.as_ref().and_then(|head| head.git_ref.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRun {
    pub name: String,
    #[serde(default)]
    pub conclusion: Option<String>,
    #[serde(default)]
    pub head_sha: Option<String>,
}

/// Deserialize `payload[key]`, or `None` when absent or of the wrong shape.
#[must_use]
pub fn field<T: DeserializeOwned>(payload: &Value, key: &str) -> Option<T> {
    payload.get(key).and_then(|value| T::deserialize(value).ok())
}

/// `(owner, repo, number)` taken from manual-run arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl IssueRef {
    /// Parse `[owner, repo, number]`. The number may be given as a JSON
    /// number or a numeric string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] naming the first
    /// argument that is missing or malformed.
    pub fn from_args(args: &[Value]) -> Result<Self, ValidationError> {
        let text = |index: usize, name: &'static str| {
            args.get(index)
                .and_then(Value::as_str)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ValidationError::InvalidArgument {
                    name,
                    reason: "expected a non-empty string".to_string(),
                })
        };
        let owner = text(0, "owner")?;
        let repo = text(1, "repo")?;
        let number = match args.get(2) {
            Some(Value::Number(number)) => number.as_u64(),
            Some(Value::String(number)) => number.trim().parse().ok(),
            _ => None,
        }
        .ok_or_else(|| ValidationError::InvalidArgument {
            name: "number",
            reason: "expected a positive integer".to_string(),
        })?;
        Ok(Self {
            owner,
            repo,
            number,
        })
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
