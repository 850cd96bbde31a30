//! Answer post-processing
//!
//! The model is asked to mark locations inline as `@map:城市:景点`. Each marker
//! runs up to the next space and is rewritten into a map link label:
//!
//! ```text
//! 见@map:烟台:张裕酒文化博物馆 推荐游览
//! 见🔍 地图跳转：https://uri.amap.com/search?keywords=张裕酒文化博物馆&city=烟台&callnative=1 推荐游览
//! ```

use tracing::{debug, warn};

use crate::map_link::MapLinkResolver;

/// Inline token the model emits to request a map link
pub const MARKER_TOKEN: &str = "@map";

/// Text substituted in front of every resolved link
pub const LINK_LABEL: &str = "🔍 地图跳转：";

/// Location fields read from the text following a marker token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFields<'a> {
    pub city: &'a str,
    pub poi: Option<&'a str>,
    /// Text after the first space following the token, kept verbatim.
    /// Empty when there is no space: everything after the marker is consumed.
    pub rest: &'a str,
}

/// Parse the text that follows a `@map` token.
///
/// With a `:` anywhere in `remaining`, the location is what follows the first
/// `:`, cut at the first space, then split once more on `:` into city and
/// point of interest. Without any `:`, the city is everything up to the first
/// space.
#[must_use]
pub fn parse_marker(remaining: &str) -> MarkerFields<'_> {
    let (head, rest) = remaining.split_once(' ').unwrap_or((remaining, ""));

    let (city, poi) = match remaining.split_once(':') {
        Some((_, location)) => {
            let location = location.split_once(' ').map_or(location, |(l, _)| l);
            let (city, poi) = location.split_once(':').unwrap_or((location, ""));
            (city.trim(), Some(poi.trim()).filter(|p| !p.is_empty()))
        }
        None => (head.trim(), None),
    };

    MarkerFields { city, poi, rest }
}

/// Upper bound on rewrites for one answer. Only reachable when a location
/// field itself contains the marker token, so that every emitted link carries
/// a fresh marker.
const MAX_REWRITES: usize = 256;

/// Rewrite every `@map` marker in `answer` into a labelled map link.
///
/// Markers are resolved left to right and the rewritten text is scanned again,
/// including the link just emitted, until no token remains or the rewrite cap
/// is reached. Only a location field that itself contains `@map` can hit the
/// cap; the returned text then still contains the token.
#[must_use]
pub fn rewrite_markers(answer: &str, resolver: &MapLinkResolver) -> String {
    let mut text = answer.to_string();
    // Text before `scan_from` holds no marker and is never rewritten.
    let mut scan_from = 0;
    let mut rewrites = 0;

    while let Some(offset) = text[scan_from..].find(MARKER_TOKEN) {
        if rewrites == MAX_REWRITES {
            warn!("Stopped rewriting map markers after {} rewrites", rewrites);
            break;
        }

        let pos = scan_from + offset;
        let fields = parse_marker(&text[pos + MARKER_TOKEN.len()..]);
        let link = resolver.build_link(fields.city, fields.poi);
        debug!(
            city = fields.city,
            poi = ?fields.poi,
            "Resolved map marker to {}",
            link
        );

        let mut rewritten = String::with_capacity(
            pos + LINK_LABEL.len() + link.len() + 1 + fields.rest.len(),
        );
        rewritten.push_str(&text[..pos]);
        rewritten.push_str(LINK_LABEL);
        rewritten.push_str(&link);
        rewritten.push(' ');
        rewritten.push_str(fields.rest);

        text = rewritten;
        scan_from = pos;
        rewrites += 1;
    }

    text
}
