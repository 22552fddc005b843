//! Adreska - Russian postal-address resolution
//!
//! Adreska turns free-form, often malformed Russian postal addresses into
//! verified `(address, latitude, longitude)` triples through a best-effort
//! geocoding provider. It powers an address input widget: keystrokes are
//! debounced, queries are normalized and reformulated through a fallback
//! cascade when the provider comes back empty, candidates are ranked, and
//! a confirmed selection yields map links and a durable location triple.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use adreska::{AddressResolver, ResolverConfig};
//!
//! # async fn run() -> Result<(), adreska::error::AdreskaError> {
//! let resolver = AddressResolver::nominatim(ResolverConfig::default())?;
//!
//! // Ranked suggestions for a raw, abbreviated query
//! let suggestions = resolver.suggest("Дзержинск ул Петрищева 29а").await;
//! if let Some(best) = suggestions.first() {
//!     println!("{} @ {}, {}", best.display_name, best.latitude, best.longitude);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//!
//! - **Normalization is deterministic**: the same raw input always yields
//!   the same query text, ending with the country suffix.
//! - **Nothing is fatal**: provider failures, malformed candidates, and
//!   undecomposable addresses all degrade to an empty or less-specific
//!   suggestion list, never to an error reaching the widget.
//! - **Last query wins**: a response arriving for a superseded keystroke
//!   is discarded on arrival.
//! - **The provider is an unreliable collaborator**: one narrow trait,
//!   sequential cascade attempts, debounce as the throughput ceiling.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod cascade;
mod config;
mod core;
mod debounce;
pub mod error;
mod maplink;
mod normalize;
mod provider;
mod rank;
mod widget;

pub use cascade::{build_variants, fallback_search};
pub use config::{ResolverConfig, ResolverConfigBuilder};
pub use self::core::{AddressResolver, Coordinates, ResolvedLocation, SelectionEvent};
pub use debounce::{Debounced, QueryToken, SearchDebouncer};
pub use maplink::{MapLinkSet, build_links};
pub use normalize::{AddressComponents, COUNTRY, decompose, has_house_number, normalize};
pub use provider::{
    AddressDetails, Candidate, GeocodeProvider, NominatimClient, ProviderError,
};
pub use rank::{MAX_SUGGESTIONS, rank};
pub use widget::{AddressWidget, ProfileStore, StoredLocation, WidgetMode};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the library.
///
/// Sets up structured logging with configurable levels and filtering.
/// Call once at the start of your application to enable detailed logging
/// output from resolution operations.
///
/// # Arguments
///
/// * `level` - The minimum log level to display
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::AdreskaError> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}
