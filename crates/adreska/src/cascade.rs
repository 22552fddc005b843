//! Progressive query relaxation for stubborn addresses.
//!
//! The provider does literal-ish matching, and Russian postal addresses
//! arrive with inconsistent abbreviations, word order, and optional house
//! numbers. When the direct search comes back empty, this module decomposes
//! the raw input and retries with an ordered list of variants, most
//! specific first, trading extra round-trips for recall.
//!
//! Attempts run strictly sequentially. The provider is a rate-limited free
//! service and the debounce window upstream is the only throughput control,
//! so the cascade must never multiply in-flight requests.

use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::normalize::{AddressComponents, COUNTRY, decompose, normalize};
use crate::provider::{Candidate, GeocodeProvider};

/// Ordered query variants for a raw address, most specific first.
///
/// Variants requiring a component the address lacks are skipped; duplicates
/// are removed with first-occurrence order preserved. The cleaned original
/// plus country suffix is always the last resort, so the list is never
/// empty.
pub fn build_variants(raw_query: &str) -> Vec<String> {
    let mut variants = Vec::new();

    if let Some(components) = decompose(raw_query) {
        push_component_variants(&mut variants, &components);
    }
    variants.push(normalize(raw_query));

    variants.into_iter().unique().collect()
}

fn push_component_variants(variants: &mut Vec<String>, components: &AddressComponents) {
    let city = &components.city;
    let street = components.street.as_deref();
    let kind_street = components.street_with_kind();
    let kind_street = kind_street.as_deref().filter(|_| {
        // Only a distinct variant when a type keyword was recognized.
        components.street_kind.is_some()
    });
    let house = components.house_number.as_deref();

    if let (Some(ks), Some(h)) = (kind_street, house) {
        variants.push(format!("{city}, {ks}, {h}, {COUNTRY}"));
        variants.push(format!("{ks}, {h}, {city}, {COUNTRY}"));
    }
    if let (Some(s), Some(h)) = (street, house) {
        variants.push(format!("{city}, {s}, {h}, {COUNTRY}"));
    }
    if let Some(ks) = kind_street {
        variants.push(format!("{city}, {ks}, {COUNTRY}"));
    }
    if let Some(s) = street {
        variants.push(format!("{city}, {s}, {COUNTRY}"));
    }
    variants.push(format!("{city}, {COUNTRY}"));
}

/// Try each variant in order until one returns candidates.
///
/// A provider error for one variant is logged and treated as an empty
/// result for that variant. Exhausting every variant is the normal
/// "no results" outcome, not a failure.
#[instrument(name = "Fallback cascade", level = "debug", skip(provider))]
pub async fn fallback_search<P: GeocodeProvider>(
    provider: &P,
    raw_query: &str,
    country_filter: &str,
) -> Vec<Candidate> {
    for variant in build_variants(raw_query) {
        match provider.forward_search(&variant, country_filter).await {
            Ok(candidates) if !candidates.is_empty() => {
                debug!(%variant, count = candidates.len(), "cascade variant matched");
                return candidates;
            }
            Ok(_) => debug!(%variant, "cascade variant empty"),
            Err(error) => {
                warn!(%variant, %error, "provider error during cascade, trying next variant");
            }
        }
    }
    debug!(%raw_query, "cascade exhausted without candidates");
    Vec::new()
}
