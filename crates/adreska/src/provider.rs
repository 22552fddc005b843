//! HTTP client for the Nominatim geocoding API.
//!
//! Wraps `reqwest` with typed response deserialization for the two
//! endpoints this library consumes: forward search (free text →
//! candidates) and reverse lookup (coordinates → address). The provider is
//! a free, rate-sensitive public service, so the client stays deliberately
//! thin: one GET per call, explicit timeouts, a proper user agent, and no
//! retries of its own (the fallback cascade owns retry policy).
//!
//! [`GeocodeProvider`] is the seam the rest of the crate is written
//! against; tests substitute a scripted implementation or point
//! [`NominatimClient`] at a wiremock server via
//! [`NominatimClient::with_base_url`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::normalize::display_has_house_number;

const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";
const USER_AGENT: &str = concat!("adreska/", env!("CARGO_PKG_VERSION"), " (address widget)");

/// How many candidates to request per search. More than the suggestion cap
/// so the ranker has something to filter.
const RESULT_LIMIT: usize = 10;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to deserialize response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}

/// Structured address breakdown the provider optionally attaches to a
/// candidate. Forwarded to callers on selection so they can prefill
/// profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
pub struct AddressDetails {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "town", alias = "village")]
    pub city: Option<String>,
    #[serde(default)]
    pub road: Option<String>,
    #[serde(default)]
    pub house_number: Option<String>,
}

/// One unconfirmed geocoding result, after coordinate parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Provider-reported relevance in `0..=1`; `0.0` when omitted.
    pub importance: f64,
    pub details: Option<AddressDetails>,
}

impl Candidate {
    /// Country name the provider attached to this candidate, if any.
    pub fn country_hint(&self) -> Option<&str> {
        self.details.as_ref()?.country.as_deref()
    }

    /// Whether the candidate resolves down to a specific building: either
    /// the structured field is populated or the display name carries a
    /// house-number segment.
    pub fn has_house_number(&self) -> bool {
        let structured = self
            .details
            .as_ref()
            .is_some_and(|details| details.house_number.is_some());
        structured || display_has_house_number(&self.display_name)
    }
}

/// Raw wire shape: Nominatim sends coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    importance: Option<f64>,
    #[serde(default)]
    address: Option<AddressDetails>,
}

impl NominatimPlace {
    /// Candidates with unparseable coordinates are dropped, not fatal.
    fn into_candidate(self) -> Option<Candidate> {
        let latitude: f64 = self.lat.parse().ok()?;
        let longitude: f64 = self.lon.parse().ok()?;
        Some(Candidate {
            display_name: self.display_name,
            latitude,
            longitude,
            importance: self.importance.unwrap_or(0.0),
            details: self.address,
        })
    }
}

/// The narrow interface the resolution pipeline is written against.
///
/// Implementations must treat failure as their own problem only to the
/// extent of returning an error; callers recover by treating any error as
/// an empty result set.
// Single-threaded cooperative model throughout; futures never cross threads.
#[allow(async_fn_in_trait)]
pub trait GeocodeProvider {
    /// Forward geocoding: one request, free text in, candidates out.
    async fn forward_search(
        &self,
        query: &str,
        country_filter: &str,
    ) -> Result<Vec<Candidate>, ProviderError>;

    /// Reverse geocoding: coordinates in, containing address out.
    /// `Ok(None)` is the "nothing there" outcome.
    async fn reverse_lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Candidate>, ProviderError>;
}

/// Client for the Nominatim HTTP API.
pub struct NominatimClient {
    client: Client,
    base_url: Url,
    /// Preferred-language hint sent with every request.
    language: String,
}

impl NominatimClient {
    /// Creates a client pointed at the public Nominatim instance.
    pub fn new(timeout_secs: u64, language: &str) -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout_secs, language)
    }

    /// Creates a client with a custom base URL (for testing with wiremock,
    /// or for self-hosted Nominatim instances).
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        language: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()?;

        // Normalise: exactly one trailing slash so Url::join keeps the path.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|_| ProviderError::InvalidBaseUrl(base_url.to_string()))?;

        Ok(Self {
            client,
            base_url,
            language: language.to_string(),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ProviderError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|_| ProviderError::InvalidBaseUrl(self.base_url.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("format", "json");
            pairs.append_pair("addressdetails", "1");
            pairs.append_pair("accept-language", &self.language);
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn request_json(&self, url: Url) -> Result<serde_json::Value, ProviderError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| ProviderError::Deserialize {
            context: url.to_string(),
            source,
        })
    }
}

impl GeocodeProvider for NominatimClient {
    async fn forward_search(
        &self,
        query: &str,
        country_filter: &str,
    ) -> Result<Vec<Candidate>, ProviderError> {
        let limit = RESULT_LIMIT.to_string();
        let url = self.endpoint(
            "search",
            &[
                ("q", query),
                ("limit", &limit),
                ("countrycodes", country_filter),
            ],
        )?;
        debug!(%query, "forward geocode request");

        let body = self.request_json(url).await?;
        let places: Vec<NominatimPlace> =
            serde_json::from_value(body).map_err(|source| ProviderError::Deserialize {
                context: format!("search(q={query})"),
                source,
            })?;

        let total = places.len();
        let candidates: Vec<Candidate> = places
            .into_iter()
            .filter_map(NominatimPlace::into_candidate)
            .collect();
        if candidates.len() < total {
            warn!(
                dropped = total - candidates.len(),
                %query,
                "dropped candidates with malformed coordinates"
            );
        }
        Ok(candidates)
    }

    async fn reverse_lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Candidate>, ProviderError> {
        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let url = self.endpoint("reverse", &[("lat", &lat), ("lon", &lon)])?;
        debug!(latitude, longitude, "reverse geocode request");

        let body = self.request_json(url).await?;
        // Nominatim reports "nothing here" as {"error": ...} with a 200.
        if body.get("error").is_some() {
            return Ok(None);
        }
        let place: NominatimPlace =
            serde_json::from_value(body).map_err(|source| ProviderError::Deserialize {
                context: format!("reverse(lat={latitude}, lon={longitude})"),
                source,
            })?;
        Ok(place.into_candidate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> NominatimClient {
        NominatimClient::with_base_url(base_url, 30, "ru").expect("client construction")
    }

    #[test]
    fn endpoint_builds_search_url() {
        let client = test_client("https://nominatim.openstreetmap.org");
        let url = client
            .endpoint("search", &[("q", "Москва"), ("countrycodes", "ru")])
            .expect("url");
        assert!(url.as_str().starts_with("https://nominatim.openstreetmap.org/search?"));
        assert!(url.query_pairs().any(|(k, _)| k == "q"));
        assert!(
            url.query_pairs()
                .any(|(k, v)| k == "accept-language" && v == "ru")
        );
        assert!(url.query_pairs().any(|(k, v)| k == "addressdetails" && v == "1"));
    }

    #[test]
    fn endpoint_percent_encodes_query() {
        let client = test_client("https://nominatim.openstreetmap.org");
        let url = client
            .endpoint("search", &[("q", "Дзержинск, улица Петрищева, 29а")])
            .expect("url");
        assert!(!url.as_str().contains(' '), "spaces must be encoded: {url}");
    }

    #[test]
    fn malformed_coordinates_are_dropped() {
        let place = NominatimPlace {
            lat: "not-a-number".into(),
            lon: "37.61".into(),
            display_name: "nowhere".into(),
            importance: Some(0.5),
            address: None,
        };
        assert!(place.into_candidate().is_none());
    }

    #[test]
    fn missing_importance_defaults_to_zero() {
        let place = NominatimPlace {
            lat: "55.75".into(),
            lon: "37.61".into(),
            display_name: "Москва".into(),
            importance: None,
            address: None,
        };
        let candidate = place.into_candidate().expect("valid coordinates");
        assert_eq!(candidate.importance, 0.0);
    }

    #[test]
    fn house_number_from_structured_field() {
        let candidate = Candidate {
            display_name: "улица Петрищева, Дзержинск, Россия".into(),
            latitude: 56.23,
            longitude: 43.44,
            importance: 0.4,
            details: Some(AddressDetails {
                house_number: Some("29а".into()),
                ..AddressDetails::default()
            }),
        };
        assert!(candidate.has_house_number());
    }

    #[test]
    fn house_number_from_display_name() {
        let candidate = Candidate {
            display_name: "улица Петрищева, 29а, Дзержинск, Россия".into(),
            latitude: 56.23,
            longitude: 43.44,
            importance: 0.4,
            details: None,
        };
        assert!(candidate.has_house_number());
    }

    #[test]
    fn address_details_city_aliases() {
        let details: AddressDetails =
            serde_json::from_str(r#"{"town": "Дзержинск", "country": "Россия"}"#).expect("parse");
        assert_eq!(details.city.as_deref(), Some("Дзержинск"));
        assert_eq!(details.country.as_deref(), Some("Россия"));
    }
}
