//! The shared address-resolution pipeline.
//!
//! One [`AddressResolver`] serves both widget façades. A raw query flows
//! through normalization, a direct forward search, the fallback cascade
//! when the direct attempt comes back empty, and ranking down to the
//! suggestion list. Selection and reverse lookup turn candidates into the
//! durable `(address, latitude, longitude)` triple.
//!
//! Nothing here is fatal: provider failures are logged and surface as an
//! empty suggestion list, never as an error reaching the widget.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::cascade::fallback_search;
use crate::config::ResolverConfig;
use crate::error::AdreskaError;
use crate::maplink::{MapLinkSet, build_links};
use crate::normalize::{has_house_number, normalize};
use crate::provider::{AddressDetails, Candidate, GeocodeProvider, NominatimClient};
use crate::rank::rank;

/// A latitude/longitude pair. The two axes always travel together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// The durable output of address resolution, persisted on the owning
/// profile and re-hydrated on later views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl ResolvedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Emitted when the user picks a suggestion, so the caller can populate
/// profile fields and mark the address as validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionEvent {
    pub address: String,
    pub coordinates: Option<Coordinates>,
    /// Structured breakdown, when the provider supplied one.
    pub details: Option<AddressDetails>,
}

/// Resolution pipeline over a [`GeocodeProvider`].
pub struct AddressResolver<P> {
    provider: P,
    config: ResolverConfig,
}

impl AddressResolver<NominatimClient> {
    /// Resolver backed by the Nominatim instance named in `config`.
    pub fn nominatim(config: ResolverConfig) -> Result<Self, AdreskaError> {
        let provider =
            NominatimClient::with_base_url(&config.base_url, config.timeout_secs, &config.language)?;
        Ok(Self::new(provider, config))
    }
}

impl<P: GeocodeProvider> AddressResolver<P> {
    pub fn new(provider: P, config: ResolverConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Produce the ranked suggestion list for a raw query.
    ///
    /// The worst outcome is an empty list; provider failures never
    /// propagate.
    #[instrument(name = "Suggest addresses", level = "debug", skip(self))]
    pub async fn suggest(&self, raw_query: &str) -> Vec<Candidate> {
        let normalized = normalize(raw_query);
        let query_had_house_number = has_house_number(raw_query);
        debug!(%normalized, query_had_house_number, "normalized query");

        let direct = match self
            .provider
            .forward_search(&normalized, &self.config.country_code)
            .await
        {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!(%error, "direct forward search failed, entering cascade");
                Vec::new()
            }
        };

        let candidates = if direct.is_empty() {
            fallback_search(&self.provider, raw_query, &self.config.country_code).await
        } else {
            direct
        };

        rank(
            candidates,
            query_had_house_number,
            &self.config.country_name,
            self.config.max_suggestions,
        )
    }

    /// Resolve a stored address string to a location in one shot: the
    /// top-ranked suggestion wins. Used by the view widget, which has an
    /// address but no coordinates.
    pub async fn resolve_address(&self, raw_query: &str) -> Option<ResolvedLocation> {
        let candidate = self.suggest(raw_query).await.into_iter().next()?;
        Some(ResolvedLocation {
            address: candidate.display_name,
            latitude: candidate.latitude,
            longitude: candidate.longitude,
        })
    }

    /// Reverse-geocode a map click. The clicked coordinates are kept as
    /// the resolved pair; the provider contributes the address text and,
    /// when available, the structured breakdown. `None` on any failure or
    /// when nothing is there.
    pub async fn resolve_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Option<(ResolvedLocation, Option<AddressDetails>)> {
        match self.provider.reverse_lookup(latitude, longitude).await {
            Ok(Some(candidate)) => Some((
                ResolvedLocation {
                    address: candidate.display_name,
                    latitude,
                    longitude,
                },
                candidate.details,
            )),
            Ok(None) => None,
            Err(error) => {
                warn!(%error, latitude, longitude, "reverse lookup failed");
                None
            }
        }
    }

    /// Turn a picked suggestion into the event handed to the caller.
    /// Pure: picking the same candidate twice yields the same payload.
    pub fn select(&self, candidate: &Candidate) -> SelectionEvent {
        SelectionEvent {
            address: candidate.display_name.clone(),
            coordinates: Some(Coordinates {
                latitude: candidate.latitude,
                longitude: candidate.longitude,
            }),
            details: candidate.details.clone(),
        }
    }

    /// Map links for a resolved location. Pure passthrough to
    /// [`build_links`].
    pub fn map_links(&self, location: &ResolvedLocation) -> MapLinkSet {
        build_links(location.latitude, location.longitude)
    }
}
