//! Runtime configuration for the scraper and the raw export cleaner.
//!
//! A single `Config` is built at startup and passed by reference to every
//! component that needs the target site, the category table or the fetch
//! settings. `Config::from_env` layers environment overrides on top of
//! defaults that point at the live site.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use url::Url;

/// Environment variable names.
pub const ENV_BASE_URL: &str = "VITRINE_BASE_URL";
pub const ENV_RAW_DIR: &str = "VITRINE_RAW_DIR";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "VITRINE_FETCH_TIMEOUT_SECS";
pub const ENV_USER_AGENT: &str = "VITRINE_USER_AGENT";

const DEFAULT_BASE_URL: &str = "https://sn.coinafrique.com";
const DEFAULT_RAW_DIR: &str = "data_raw";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Path prefix of ad detail pages on the target site.
pub const AD_PATH_PREFIX: &str = "/annonce/";

/// The fixed set of categories the operator can explore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    MenClothing,
    MenShoes,
    KidsClothing,
    KidsShoes,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::MenClothing,
        Category::MenShoes,
        Category::KidsClothing,
        Category::KidsShoes,
    ];

    /// Human-facing label, as shown in the category picker.
    pub fn label(self) -> &'static str {
        match self {
            Category::MenClothing => "Vêtements Homme",
            Category::MenShoes => "Chaussures Homme",
            Category::KidsClothing => "Vêtements Enfants",
            Category::KidsShoes => "Chaussures Enfants",
        }
    }

    /// URL path segment under `/categorie/`.
    pub fn slug(self) -> &'static str {
        match self {
            Category::MenClothing => "vetements-homme",
            Category::MenShoes => "chaussures-homme",
            Category::KidsClothing => "vetements-enfants",
            Category::KidsShoes => "chaussures-enfants",
        }
    }

    fn raw_file_name(self) -> String {
        format!("{}_raw.csv", self.slug().replace('-', "_"))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    /// Accepts either the label or the slug, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == wanted || c.slug() == wanted)
            .ok_or_else(|| ConfigError::UnknownCategory(s.to_string()))
    }
}

/// Number of listing pages to walk, always within `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCount(u32);

impl PageCount {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 100;

    pub fn clamped(requested: u32) -> Self {
        Self(requested.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// 1-based page indices, inclusive.
    pub fn pages(self) -> RangeInclusive<u32> {
        1..=self.0
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    base_url: Url,
    raw_dir: PathBuf,
    fetch_timeout: Duration,
    user_agent: String,
}

impl Config {
    /// Create a config for an explicit site and raw-data directory, with the
    /// default fetch settings.
    pub fn new(base_url: Url, raw_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        if base_url.cannot_be_a_base() || base_url.host_str().is_none() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: format!("`{}` is not a site root", base_url),
            });
        }
        Ok(Self {
            base_url,
            raw_dir: raw_dir.into(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        })
    }

    /// Load from environment variables, falling back to the live-site defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let base_url = Url::parse(&base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url",
            reason: e.to_string(),
        })?;
        let raw_dir = env::var(ENV_RAW_DIR).unwrap_or_else(|_| DEFAULT_RAW_DIR.to_string());

        let mut config = Self::new(base_url, raw_dir)?;

        if let Ok(secs) = env::var(ENV_FETCH_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| ConfigError::InvalidValue {
                field: "fetch_timeout",
                reason: format!("`{}` is not a whole number of seconds", secs),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "fetch_timeout",
                    reason: "must be at least one second".to_string(),
                });
            }
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Ok(user_agent) = env::var(ENV_USER_AGENT)
            && !user_agent.trim().is_empty()
        {
            config.user_agent = user_agent;
        }

        Ok(config)
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Root of the target site; relative links are resolved against it.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Directory holding the raw web-scraper exports.
    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Total time budget for one page request.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Listing URL for a category, without pagination.
    pub fn category_url(&self, category: Category) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("categorie/{}", category.slug()));
        url.set_query(None);
        url.set_fragment(None);
        url
    }

    /// Location of the raw export for a category.
    pub fn raw_file(&self, category: Category) -> PathBuf {
        self.raw_dir.join(category.raw_file_name())
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
    UnknownCategory(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
            ConfigError::UnknownCategory(name) => {
                let known: Vec<&str> = Category::ALL.iter().map(|c| c.slug()).collect();
                write!(f, "unknown category '{}' (expected one of: {})", name, known.join(", "))
            }
        }
    }
}

impl Error for ConfigError {}
