//! Resolver configuration with ergonomic defaults.

use std::time::Duration;

use crate::error::AdreskaError;
use crate::normalize::COUNTRY;
use crate::rank::MAX_SUGGESTIONS;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// Configuration for address resolution.
///
/// Use [`ResolverConfigBuilder`] for an ergonomic way to create
/// configurations with sensible defaults.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Quiet period after the last keystroke before a search is issued.
    pub debounce_window: Duration,
    /// Queries shorter than this never reach the network.
    pub min_query_len: usize,
    /// ISO country code sent as the provider-side country filter.
    pub country_code: String,
    /// Country name the ranker matches against candidate breakdowns. Must
    /// agree with `country_code` and `language`, or every hinted candidate
    /// gets filtered out.
    pub country_name: String,
    /// Preferred-language hint for provider responses.
    pub language: String,
    /// Suggestion list cap.
    pub max_suggestions: usize,
    /// Geocoding provider base URL.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl ResolverConfig {
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            // The defensive window: the profile editor wants recall over
            // snappiness, and the public provider is rate-sensitive.
            debounce_window: Duration::from_millis(1000),
            min_query_len: 2,
            country_code: "ru".to_string(),
            country_name: COUNTRY.to_string(),
            language: "ru".to_string(),
            max_suggestions: MAX_SUGGESTIONS,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Builder for creating resolver configurations.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// Create a new builder with the default (edit-mode) settings.
    pub fn new() -> Self {
        Self {
            config: ResolverConfig::default(),
        }
    }

    /// Preset for the profile-editing widget: the defensive 1s window.
    pub fn edit() -> Self {
        Self::new()
    }

    /// Preset for the read-only map widget: a shorter window, since view
    /// mode resolves a stored address once rather than per keystroke.
    pub fn view() -> Self {
        let mut builder = Self::new();
        builder.config.debounce_window = Duration::from_millis(400);
        builder
    }

    /// Set the quiet period after the last keystroke.
    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.config.debounce_window = window;
        self
    }

    /// Set the minimum query length that triggers a search.
    pub fn min_query_len(mut self, len: usize) -> Self {
        self.config.min_query_len = len;
        self
    }

    /// Set the provider-side country filter (ISO code).
    pub fn country_code(mut self, code: &str) -> Self {
        self.config.country_code = code.to_string();
        self
    }

    /// Set the country name the ranker matches candidate hints against.
    pub fn country_name(mut self, name: &str) -> Self {
        self.config.country_name = name.to_string();
        self
    }

    /// Set the suggestion list cap.
    pub fn max_suggestions(mut self, cap: usize) -> Self {
        self.config.max_suggestions = cap;
        self
    }

    /// Set the preferred-language hint.
    pub fn language(mut self, language: &str) -> Self {
        self.config.language = language.to_string();
        self
    }

    /// Point the resolver at a different provider instance.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<ResolverConfig, AdreskaError> {
        if self.config.min_query_len == 0 {
            return Err(AdreskaError::Config(
                "min_query_len must be at least 1".to_string(),
            ));
        }
        if self.config.timeout_secs == 0 {
            return Err(AdreskaError::Config(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.config.max_suggestions == 0 {
            return Err(AdreskaError::Config(
                "max_suggestions must be at least 1".to_string(),
            ));
        }
        Ok(self.config)
    }
}
