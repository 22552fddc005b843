//! The two address-widget façades over one shared resolver.
//!
//! The product renders this twice: an editable profile field with live
//! suggestions, and a read-only profile view that shows a map for the
//! stored address. Both are thin mode-tagged wrappers around
//! [`AddressResolver`]; the mode only picks the debounce preset and gates
//! the keystroke path.
//!
//! The widget owns the validity signal: it reports `true` only while the
//! input text exactly reflects a provider-confirmed selection, and flips
//! to `false` the moment the text is edited.

use tracing::{debug, instrument};

use crate::config::{ResolverConfig, ResolverConfigBuilder};
use crate::core::{AddressResolver, ResolvedLocation, SelectionEvent};
use crate::debounce::{Debounced, SearchDebouncer};
use crate::error::Result;
use crate::maplink::MapLinkSet;
use crate::provider::{Candidate, GeocodeProvider};

/// Which façade this widget instance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetMode {
    /// Profile editing: live suggestions, selection, save.
    Edit,
    /// Read-only profile view: hydrate a stored triple, show a map.
    View,
}

/// The `{location, latitude, longitude}` triple as the profile service
/// stores it. The address string round-trips verbatim; this crate never
/// reformats a previously stored value.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StoredLocation {
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Narrow seam to the external profile service. The widget only ever
/// reads and writes the location triple.
// Single-threaded cooperative model throughout; futures never cross threads.
#[allow(async_fn_in_trait)]
pub trait ProfileStore {
    async fn load_location(&self) -> anyhow::Result<StoredLocation>;
    async fn save_location(&self, stored: &StoredLocation) -> anyhow::Result<()>;
}

/// One address input widget: resolver, debouncer, and selection state.
pub struct AddressWidget<P> {
    mode: WidgetMode,
    resolver: AddressResolver<P>,
    debouncer: SearchDebouncer,
    input: String,
    resolved: Option<ResolvedLocation>,
    validated: bool,
    suggestions: Vec<Candidate>,
}

impl<P: GeocodeProvider> AddressWidget<P> {
    /// Widget with the mode's preset configuration.
    pub fn new(provider: P, mode: WidgetMode) -> Result<Self> {
        let config = match mode {
            WidgetMode::Edit => ResolverConfigBuilder::edit().build()?,
            WidgetMode::View => ResolverConfigBuilder::view().build()?,
        };
        Ok(Self::with_config(provider, mode, config))
    }

    pub fn with_config(provider: P, mode: WidgetMode, config: ResolverConfig) -> Self {
        let debouncer = SearchDebouncer::new(config.debounce_window, config.min_query_len);
        Self {
            mode,
            resolver: AddressResolver::new(provider, config),
            debouncer,
            input: String::new(),
            resolved: None,
            validated: false,
            suggestions: Vec::new(),
        }
    }

    pub fn mode(&self) -> WidgetMode {
        self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// True only while the text exactly reflects a provider-confirmed
    /// selection.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn location(&self) -> Option<&ResolvedLocation> {
        self.resolved.as_ref()
    }

    /// Record a text edit. Validity drops immediately unless the new text
    /// is exactly the confirmed address.
    pub fn on_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.validated = self
            .resolved
            .as_ref()
            .is_some_and(|location| location.address == text);
    }

    /// The debounced keystroke path: record the edit, wait out the quiet
    /// window, search, rank, and apply — unless a newer keystroke has
    /// taken over, in which case the stale response is discarded and the
    /// current list stands.
    ///
    /// View mode has no suggestion list and returns nothing.
    #[instrument(name = "Widget suggestions", level = "debug", skip(self))]
    pub async fn suggestions(&mut self, text: &str) -> Vec<Candidate> {
        self.on_input(text);
        if self.mode == WidgetMode::View {
            return Vec::new();
        }

        match self.debouncer.debounce(text).await {
            Debounced::Emit { query, token } => {
                let found = self.resolver.suggest(&query).await;
                if self.debouncer.is_current(token) {
                    self.suggestions = found;
                } else {
                    debug!(%query, "discarding stale suggestion response");
                }
                self.suggestions.clone()
            }
            Debounced::TooShort => {
                self.suggestions.clear();
                Vec::new()
            }
            Debounced::Duplicate | Debounced::Superseded => self.suggestions.clone(),
        }
    }

    /// Confirm a suggestion. Sets the resolved triple (both axes
    /// together), syncs the input text, and reports validity. Choosing the
    /// same candidate twice emits the same payload.
    pub fn choose(&mut self, candidate: &Candidate) -> SelectionEvent {
        let event = self.resolver.select(candidate);
        self.resolved = Some(ResolvedLocation {
            address: candidate.display_name.clone(),
            latitude: candidate.latitude,
            longitude: candidate.longitude,
        });
        self.input = candidate.display_name.clone();
        self.validated = true;
        self.suggestions.clear();
        event
    }

    /// Map-click selection: reverse-geocode the clicked point. On success
    /// behaves exactly like picking a suggestion.
    pub async fn choose_coordinates(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Option<SelectionEvent> {
        let (location, details) = self.resolver.resolve_coordinates(latitude, longitude).await?;
        self.input = location.address.clone();
        self.validated = true;
        let event = SelectionEvent {
            address: location.address.clone(),
            coordinates: Some(location.coordinates()),
            details,
        };
        self.resolved = Some(location);
        Some(event)
    }

    /// Drop the resolved location. Both coordinate axes clear together;
    /// the input text is left alone.
    pub fn clear_location(&mut self) {
        self.resolved = None;
        self.validated = false;
    }

    /// Map links for the current location, when there is one. Without
    /// coordinates there is no map view.
    pub fn map_links(&self) -> Option<MapLinkSet> {
        self.resolved
            .as_ref()
            .map(|location| self.resolver.map_links(location))
    }

    /// View-mode path for profiles that stored an address string before
    /// coordinates existed: resolve it once, keep the stored text intact.
    pub async fn ensure_location(&mut self) -> Option<&ResolvedLocation> {
        if self.resolved.is_none() && !self.input.trim().is_empty() {
            self.resolved = self.resolver.resolve_address(&self.input).await;
        }
        self.resolved.as_ref()
    }

    /// Hydrate from the profile service. A stored coordinate pair was
    /// provider-confirmed when saved, so it counts as validated until the
    /// text is edited.
    pub async fn hydrate_from(&mut self, store: &impl ProfileStore) -> Result<()> {
        let stored = store.load_location().await?;
        self.input = stored.location.clone().unwrap_or_default();
        self.resolved = match (stored.location, stored.latitude, stored.longitude) {
            (Some(address), Some(latitude), Some(longitude)) => {
                self.validated = true;
                Some(ResolvedLocation {
                    address,
                    latitude,
                    longitude,
                })
            }
            _ => {
                self.validated = false;
                None
            }
        };
        Ok(())
    }

    /// Write the triple back verbatim: the current input text and the
    /// resolved pair, if any.
    pub async fn save_to(&self, store: &impl ProfileStore) -> Result<()> {
        let stored = StoredLocation {
            location: (!self.input.is_empty()).then(|| self.input.clone()),
            latitude: self.resolved.as_ref().map(|location| location.latitude),
            longitude: self.resolved.as_ref().map(|location| location.longitude),
        };
        store.save_location(&stored).await?;
        Ok(())
    }
}
