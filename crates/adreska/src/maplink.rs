//! Map URL synthesis from resolved coordinates.
//!
//! Pure string building, no network. Each map service has its own
//! coordinate-order convention: the OSM embed bbox and the Yandex point
//! parameter want `lon,lat`, everything else wants `lat,lon`. Links are
//! recomputed on demand and never persisted.

/// Half-width of the embed bounding box, in degrees.
const BBOX_HALF: f64 = 0.01;

/// Zoom level for the external deep links.
const DEEP_LINK_ZOOM: u8 = 17;

/// Embeddable map URL plus external deep links for one coordinate pair.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MapLinkSet {
    /// Iframe-friendly OSM embed centered on the point, with a marker.
    pub embed_url: String,
    pub openstreetmap_url: String,
    pub yandex_url: String,
    pub google_url: String,
}

/// Build the full link set for a coordinate pair.
///
/// Pure and total for any finite pair: identical input yields
/// byte-identical URLs. Bbox corners are clamped to four decimals, which is
/// ample for a ±0.01° box; the marker and deep links carry the coordinates
/// verbatim.
pub fn build_links(latitude: f64, longitude: f64) -> MapLinkSet {
    let west = longitude - BBOX_HALF;
    let south = latitude - BBOX_HALF;
    let east = longitude + BBOX_HALF;
    let north = latitude + BBOX_HALF;

    MapLinkSet {
        embed_url: format!(
            "https://www.openstreetmap.org/export/embed.html?bbox={west:.4},{south:.4},{east:.4},{north:.4}&layer=mapnik&marker={latitude},{longitude}"
        ),
        openstreetmap_url: format!(
            "https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map={DEEP_LINK_ZOOM}/{latitude}/{longitude}"
        ),
        yandex_url: format!(
            "https://yandex.ru/maps/?pt={longitude},{latitude}&z={DEEP_LINK_ZOOM}&l=map"
        ),
        google_url: format!(
            "https://www.google.com/maps/search/?api=1&query={latitude},{longitude}"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moscow_bounding_box() {
        let links = build_links(55.7558, 37.6173);
        assert_eq!(
            links.embed_url,
            "https://www.openstreetmap.org/export/embed.html?bbox=37.6073,55.7458,37.6273,55.7658&layer=mapnik&marker=55.7558,37.6173"
        );
    }

    #[test]
    fn deep_links_use_provider_specific_coordinate_order() {
        let links = build_links(55.7558, 37.6173);
        // Yandex wants lon,lat; OSM and Google want lat,lon.
        assert!(links.yandex_url.contains("pt=37.6173,55.7558"));
        assert!(links.openstreetmap_url.contains("mlat=55.7558"));
        assert!(links.openstreetmap_url.contains("mlon=37.6173"));
        assert!(links.google_url.contains("query=55.7558,37.6173"));
    }

    #[test]
    fn build_links_is_pure() {
        assert_eq!(build_links(56.2389, 43.4618), build_links(56.2389, 43.4618));
    }

    #[test]
    fn negative_coordinates_are_formatted_plainly() {
        let links = build_links(-33.8688, 151.2093);
        assert!(links.embed_url.contains("bbox=151.1993,-33.8788,151.2193,-33.8588"));
        assert!(links.google_url.contains("query=-33.8688,151.2093"));
    }
}
