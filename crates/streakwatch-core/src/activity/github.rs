//! GitHub integration -- read the user's public event feed.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use super::{keyring_store, ActivityResult, ActivitySource};
use crate::clock::DayZone;
use crate::error::ActivityError;
use crate::storage::Config;

const USER_AGENT: &str = "streakwatch";
const ACCEPT: &str = "application/vnd.github+json";
const EVENTS_PER_PAGE: &str = "100";

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Event categories that count towards a streak.
pub const QUALIFYING_EVENT_TYPES: &[&str] = &[
    "PushEvent",
    "PullRequestEvent",
    "IssuesEvent",
    "CreateEvent",
    "CommitCommentEvent",
];

/// The subset of a GitHub event we look at.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
}

impl FeedEvent {
    pub fn is_qualifying_on(&self, today: NaiveDate, zone: DayZone) -> bool {
        QUALIFYING_EVENT_TYPES.contains(&self.kind.as_str()) && zone.date_of(&self.created_at) == today
    }
}

/// Whether any event in `events` is a qualifying event dated `today`.
pub fn has_qualifying_event(events: &[FeedEvent], today: NaiveDate, zone: DayZone) -> bool {
    events.iter().any(|event| {
        let hit = event.is_qualifying_on(today, zone);
        debug!(kind = %event.kind, created_at = %event.created_at, hit, "classified event");
        hit
    })
}

pub struct GitHubActivitySource {
    client: Client,
    base_url: Url,
    username: String,
    token: Option<String>,
    zone: DayZone,
}

impl GitHubActivitySource {
    pub fn new(
        username: &str,
        token: Option<String>,
        zone: DayZone,
        timeout: Duration,
    ) -> Result<Self, ActivityError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: parse_base(DEFAULT_API_BASE)?,
            username: username.to_string(),
            token: token.filter(|t| !t.is_empty()),
            zone,
        })
    }

    /// Build from configuration, falling back to the OS keyring for the token.
    pub fn from_config(config: &Config) -> Result<Self, ActivityError> {
        let token = resolve_token(config);
        Self::new(
            &config.username,
            token,
            config.github.day_zone,
            Duration::from_secs(config.github.request_timeout_secs),
        )?
        .with_base_url(&config.github.api_base_url)
    }

    /// Point at a different API root (GitHub Enterprise, test servers).
    pub fn with_base_url(mut self, base: &str) -> Result<Self, ActivityError> {
        self.base_url = parse_base(base)?;
        Ok(self)
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ActivityError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ActivityError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "URL cannot be a base".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header("Accept", ACCEPT);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch the most recent page of the user's events.
    pub async fn fetch_events(&self) -> Result<Vec<FeedEvent>, ActivityError> {
        let mut url = self.endpoint(&["users", &self.username, "events"])?;
        url.query_pairs_mut().append_pair("per_page", EVENTS_PER_PAGE);

        let resp = self.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ActivityError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| ActivityError::Decode(e.to_string()))
    }

    /// Check the token against `GET /user` and return the login it belongs to.
    pub async fn verify(&self) -> Result<String, ActivityError> {
        let resp = self.get(self.endpoint(&["user"])?).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ActivityError::Status {
                status: status.as_u16(),
            });
        }

        let user: serde_json::Value = resp.json().await?;
        user["login"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ActivityError::Decode("missing 'login' in /user response".into()))
    }
}

impl ActivitySource for GitHubActivitySource {
    async fn check_activity(&self, today: NaiveDate) -> ActivityResult {
        match self.fetch_events().await {
            Ok(events) => {
                let found = has_qualifying_event(&events, today, self.zone);
                info!(user = %self.username, %today, events = events.len(), found, "checked GitHub activity");
                ActivityResult::from_found(found)
            }
            Err(e) => {
                warn!(user = %self.username, "error checking GitHub: {e}");
                ActivityResult::Unknown
            }
        }
    }
}

/// Token from config if set, else from the OS keyring.
pub fn resolve_token(config: &Config) -> Option<String> {
    if !config.token.is_empty() {
        return Some(config.token.clone());
    }
    match keyring_store::get(keyring_store::GITHUB_TOKEN) {
        Ok(token) => token.filter(|t| !t.is_empty()),
        Err(e) => {
            debug!("keyring unavailable: {e}");
            None
        }
    }
}

fn parse_base(base: &str) -> Result<Url, ActivityError> {
    let trimmed = base.trim_end_matches('/');
    Url::parse(&format!("{trimmed}/")).map_err(|e| ActivityError::InvalidUrl {
        url: base.to_string(),
        message: e.to_string(),
    })
}
