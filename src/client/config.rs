use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// How realtime inserts are merged into an already loaded feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Always prepend. An event for a post the feed already holds shows up twice.
    #[default]
    Prepend,
    /// Skip events whose post id is already listed.
    DedupeById,
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prepend" => Ok(MergePolicy::Prepend),
            "dedupe" | "dedupe_by_id" => Ok(MergePolicy::DedupeById),
            other => Err(format!("unknown feed merge policy: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
    pub merge_policy: MergePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        let api_url = env::var("LULUTONG_API_URL")
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_secs = env::var("LULUTONG_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let merge_policy = match env::var("LULUTONG_FEED_MERGE") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to prepend", e);
                MergePolicy::Prepend
            }),
            Err(_) => MergePolicy::Prepend,
        };

        Self {
            api_url,
            timeout: Duration::from_secs(timeout_secs),
            merge_policy,
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }
}
