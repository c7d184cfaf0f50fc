use serde::Deserialize;

/// Main configuration structure for Dilbert Feed
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
}

/// Strip site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Base URL the strip pages are served from (`{base-url}/strip/{date}`)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout for the strip page and image requests (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with every outbound request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Object storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Bucket holding both the strips and the feed document
    pub bucket: String,

    /// Key prefix for strip images
    #[serde(default = "default_strips_dir")]
    pub strips_dir: String,

    /// AWS region; falls back to the SDK's default provider chain
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores
    pub endpoint_url: Option<String>,

    /// Public base URL objects are reachable at
    pub public_url: Option<String>,
}

/// Feed generation configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FeedConfig {
    /// Key the feed document is written to
    #[serde(default = "default_feed_path")]
    pub path: String,

    /// Number of days covered by the feed
    #[serde(default = "default_feed_length")]
    pub length: u32,

    /// Maximum number of metadata lookups in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_channel_title")]
    pub title: String,

    #[serde(default = "default_base_url")]
    pub link: String,

    #[serde(default = "default_channel_description")]
    pub description: String,
}

/// Per-invocation limits
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RunConfig {
    /// Overall time budget for one invocation (seconds)
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

/// Heartbeat configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HeartbeatConfig {
    pub endpoint: Option<String>,
}

impl StorageConfig {
    /// Strips directory without surrounding slashes
    pub fn strips_prefix(&self) -> &str {
        self.strips_dir.trim_matches('/')
    }

    /// Public base URL, defaulting to the bucket's virtual-hosted S3 address
    pub fn public_base_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.s3.amazonaws.com", self.bucket),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: default_feed_path(),
            length: default_feed_length(),
            concurrency: default_concurrency(),
            title: default_channel_title(),
            link: default_base_url(),
            description: default_channel_description(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://dilbert.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "dilbert-feed".to_string()
}

fn default_strips_dir() -> String {
    "strips".to_string()
}

fn default_feed_path() -> String {
    "v0/rss.xml".to_string()
}

fn default_feed_length() -> u32 {
    30
}

fn default_concurrency() -> usize {
    8
}

fn default_channel_title() -> String {
    "Dilbert".to_string()
}

fn default_channel_description() -> String {
    "Dilbert Daily Strip".to_string()
}

fn default_deadline_secs() -> u64 {
    60
}
