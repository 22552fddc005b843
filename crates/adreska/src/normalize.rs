//! Address query normalization.
//!
//! Turns free-form, often malformed Russian postal addresses into
//! provider-friendly query text: strips filler phrases, expands common
//! abbreviations, pulls out a `{city, street, house number}` structure when
//! the text has a recognizable shape, and re-emits the pieces in the
//! canonical `"City, улица Name, 29а, Россия"` order.
//!
//! Normalization is a pure function of its input and never fails: when the
//! text refuses to decompose, the best cleaned string so far is returned
//! with the country suffix appended.
//!
//! The extraction heuristics assume the common "City, street type + name,
//! number" shape. Addresses outside it (named buildings, корпус/строение
//! suffixes, village addressing) decompose poorly and fall through to the
//! least-structured form. That is a deliberate recall/precision tradeoff
//! inherited from the product this library grew out of.

use once_cell::sync::Lazy;
use regex::Regex;

/// Country token appended to every normalized query.
pub const COUNTRY: &str = "Россия";

/// Street-type keywords recognized after abbreviation expansion.
const STREET_KINDS: &[&str] = &[
    "улица",
    "проспект",
    "переулок",
    "бульвар",
    "шоссе",
    "набережная",
    "площадь",
    "проезд",
    "тупик",
    "аллея",
    "линия",
];

/// Abbreviation expansions, applied case-insensitively at word boundaries.
/// Ordered so that longer forms win over their prefixes ("пр-т" before "пр").
/// The `regex` crate has no look-ahead, so each pattern captures its
/// delimiter (space, comma, or end of text) and the replacement re-emits it.
static ABBREVIATIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bул\.?([\s,]|$)", "улица${1}"),
        (r"(?i)\bпр-кт\.?([\s,]|$)", "проспект${1}"),
        (r"(?i)\bпр-т\.?([\s,]|$)", "проспект${1}"),
        (r"(?i)\bпросп\.?([\s,]|$)", "проспект${1}"),
        (r"(?i)\bпер\.?([\s,]|$)", "переулок${1}"),
        (r"(?i)\bб-р\.?([\s,]|$)", "бульвар${1}"),
        (r"(?i)\bбул\.?([\s,]|$)", "бульвар${1}"),
        (r"(?i)\bш\.([\s,]|$)", "шоссе${1}"),
        (r"(?i)\bнаб\.?([\s,]|$)", "набережная${1}"),
        (r"(?i)\bпл\.?([\s,]|$)", "площадь${1}"),
        (r"(?i)\bпр-д\.?([\s,]|$)", "проезд${1}"),
        (r"(?i)\bобл\.?([\s,]|$)", "область${1}"),
        (r"(?i)\bг\.([\s,]|$)", "город${1}"),
    ]
    .iter()
    .map(|(pattern, full)| (Regex::new(pattern).expect("static regex"), *full))
    .collect()
});

/// Leading filler phrases users type before the actual address.
static FILLER_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:место работы|адрес работы|адрес|работаю в|расположен(?:а|о)? по адресу)\s*[:\-–]?\s*")
        .expect("static regex")
});

/// Bare filler tokens, removed individually in the conservative fallback pass.
static FILLER_TOKENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:место работы|адрес работы|адрес|работаю в)\b\s*[:\-–]?")
        .expect("static regex")
});

/// Embedded country mentions; stripped so the suffix is not duplicated.
static COUNTRY_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*,?\s*\b(?:российская федерация|россия|рф)\b\s*,?").expect("static regex")
});

/// House-number prefix ("д. 29а", "дом 29а") collapsed to the bare number.
/// The leading digit is captured and re-emitted in place of the prefix.
static HOUSE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:д\.|дом)\s*(\d)").expect("static regex"));

/// Trailing house number: digits with an optional single-letter suffix.
static TRAILING_HOUSE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+\s*[а-яёa-z]?)\s*$").expect("static regex"));

/// A comma-separated segment that is nothing but a house number.
static HOUSE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\d+\s*[а-яёa-z]?$").expect("static regex"));

/// Structured pieces of an address, extracted by pattern matching.
///
/// `street` holds the bare name; the recognized type keyword, if any, lives
/// in `street_kind` so the fallback cascade can emit variants with and
/// without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressComponents {
    pub city: String,
    pub street: Option<String>,
    pub street_kind: Option<String>,
    pub house_number: Option<String>,
}

impl AddressComponents {
    /// Street with its type keyword, e.g. `"улица Петрищева"`.
    pub fn street_with_kind(&self) -> Option<String> {
        let street = self.street.as_deref()?;
        Some(match self.street_kind.as_deref() {
            Some(kind) => format!("{kind} {street}"),
            None => street.to_string(),
        })
    }
}

/// Normalize a raw address into provider-friendly query text.
///
/// Deterministic and total: the output always ends with [`COUNTRY`], and an
/// input that cleans down to nothing yields the bare country token.
///
/// ```rust
/// use adreska::normalize;
///
/// assert_eq!(
///     normalize("Дзержинск ул Петрищева 29а"),
///     "Дзержинск, улица Петрищева, 29а, Россия"
/// );
/// ```
pub fn normalize(raw: &str) -> String {
    let cleaned = clean(raw);

    // Aggressive filler stripping can eat a short but legitimate address;
    // fall back to removing only the literal filler tokens.
    let cleaned = if cleaned.chars().count() < 3 {
        let conservative = FILLER_TOKENS.replace_all(raw, " ");
        let conservative = COUNTRY_TOKEN.replace_all(&conservative, " ");
        tidy(&conservative)
    } else {
        cleaned
    };

    if cleaned.is_empty() {
        return COUNTRY.to_string();
    }

    match extract(&cleaned) {
        Some(components) => emit(&components),
        None => format!("{cleaned}, {COUNTRY}"),
    }
}

/// Extract structured components from a raw address string.
///
/// Runs the same cleanup as [`normalize`] first, then pattern-matches the
/// result. Returns `None` when no city-shaped leading token can be found.
pub fn decompose(raw: &str) -> Option<AddressComponents> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return None;
    }
    extract(&cleaned)
}

/// Whether the query text carries a trailing house number.
pub fn has_house_number(raw: &str) -> bool {
    let cleaned = clean(raw);
    TRAILING_HOUSE.is_match(&cleaned)
}

/// Whether a provider display name carries a house-number segment,
/// e.g. the `"29а"` in `"улица Петрищева, 29а, Дзержинск, Россия"`.
pub(crate) fn display_has_house_number(display_name: &str) -> bool {
    display_name
        .split(',')
        .any(|segment| HOUSE_SEGMENT.is_match(segment.trim()))
}

/// Full cleanup pass: fillers, country mentions, abbreviations, separators.
fn clean(raw: &str) -> String {
    let text = FILLER_PREFIX.replace(raw, "");
    let text = COUNTRY_TOKEN.replace_all(&text, " ");
    let text = HOUSE_PREFIX.replace_all(&text, "${1}");

    let mut text = text.into_owned();
    for (pattern, full) in ABBREVIATIONS.iter() {
        text = pattern.replace_all(&text, *full).into_owned();
    }

    tidy(&text)
}

/// Collapse whitespace, drop empty comma segments and stray edge commas.
fn tidy(text: &str) -> String {
    let segments: Vec<String> = text
        .split(',')
        .map(|segment| segment.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|segment| !segment.is_empty())
        .collect();
    segments.join(", ")
}

/// Pattern-match a cleaned string into [`AddressComponents`].
fn extract(cleaned: &str) -> Option<AddressComponents> {
    let (body, house_number) = split_house(cleaned);
    if body.is_empty() {
        return None;
    }

    let segments: Vec<&str> = body
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    // Comma-separated input is the reliable case: first segment is the
    // city, the second the street.
    if segments.len() >= 2 {
        let city = strip_city_marker(segments[0]);
        if !starts_capitalized(&city) {
            return extract_flat(&body, house_number);
        }
        let (street_kind, street) = split_street(segments[1]);
        return Some(AddressComponents {
            city,
            street,
            street_kind,
            house_number,
        });
    }

    extract_flat(&body, house_number)
}

/// The no-commas heuristic: leading capitalized word(s) form the city, a
/// street-type keyword (or position) marks where the street begins.
fn extract_flat(body: &str, house_number: Option<String>) -> Option<AddressComponents> {
    let words: Vec<&str> = body
        .split([' ', ','])
        .filter(|word| !word.is_empty())
        .collect();
    let words: Vec<&str> = match words.first() {
        Some(&marker) if is_city_marker(marker) => words[1..].to_vec(),
        _ => words,
    };
    let first = words.first()?;
    if !starts_capitalized(first) {
        return None;
    }

    if let Some(kind_idx) = words.iter().position(|word| is_street_kind(word)) {
        if kind_idx == 0 {
            // Street with no city in front of it; nothing to anchor on.
            return None;
        }
        // "Москва улица Тверская" puts the name after the keyword;
        // "Москва Тверская улица" puts it before. When the keyword ends the
        // text, the name sits between the city and the keyword.
        let (city_words, street_name) = if kind_idx == words.len() - 1 {
            let city_len = if kind_idx >= 3 && starts_capitalized(words[1]) {
                2
            } else {
                1
            };
            (&words[..city_len], words[city_len..kind_idx].join(" "))
        } else {
            (&words[..kind_idx.min(2)], words[kind_idx + 1..].join(" "))
        };
        let street = (!street_name.is_empty()).then_some(street_name);
        return Some(AddressComponents {
            city: city_words.join(" "),
            street,
            street_kind: Some(words[kind_idx].to_lowercase()),
            house_number,
        });
    }

    // No keyword: one or two capitalized words of city, then up to two
    // words of street.
    let city_len = if words.len() > 2 && starts_capitalized(words[1]) {
        2
    } else {
        1
    };
    let city = words[..city_len.min(words.len())].join(" ");
    let street_words = &words[city_len.min(words.len())..];
    let street = match street_words {
        [] => None,
        rest => Some(rest[..rest.len().min(2)].join(" ")),
    };

    Some(AddressComponents {
        city,
        street,
        street_kind: None,
        house_number,
    })
}

/// Pull a trailing house number off the text, returning (body, house).
fn split_house(text: &str) -> (String, Option<String>) {
    match TRAILING_HOUSE.captures(text) {
        Some(caps) => {
            let full = caps.get(0).expect("whole match");
            let house: String = caps[1].split_whitespace().collect();
            let body = text[..full.start()].trim_end_matches([' ', ',']).to_string();
            (body, Some(house))
        }
        None => (text.trim_end_matches([' ', ',']).to_string(), None),
    }
}

/// Split a street segment into (kind, name), e.g. `"улица Петрищева"` →
/// `(Some("улица"), Some("Петрищева"))`.
fn split_street(segment: &str) -> (Option<String>, Option<String>) {
    let words: Vec<&str> = segment.split_whitespace().collect();
    if let Some(kind_idx) = words.iter().position(|word| is_street_kind(word)) {
        let name: Vec<&str> = words
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != kind_idx)
            .map(|(_, word)| *word)
            .collect();
        let name = name.join(" ");
        (
            Some(words[kind_idx].to_lowercase()),
            (!name.is_empty()).then_some(name),
        )
    } else if words.is_empty() {
        (None, None)
    } else {
        (None, Some(words.join(" ")))
    }
}

fn is_street_kind(word: &str) -> bool {
    let lowered = word.to_lowercase();
    STREET_KINDS.contains(&lowered.as_str())
}

fn is_city_marker(word: &str) -> bool {
    word.to_lowercase() == "город"
}

fn strip_city_marker(segment: &str) -> String {
    let words: Vec<&str> = segment.split_whitespace().collect();
    match words.split_first() {
        Some((first, rest)) if is_city_marker(first) && !rest.is_empty() => rest.join(" "),
        _ => words.join(" "),
    }
}

fn starts_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

/// Re-emit components in the canonical query order.
fn emit(components: &AddressComponents) -> String {
    let mut parts = vec![components.city.clone()];
    if let Some(street) = components.street_with_kind() {
        parts.push(street);
    }
    if let Some(house) = &components.house_number {
        parts.push(house.clone());
    }
    parts.push(COUNTRY.to_string());
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_flat_address() {
        assert_eq!(
            normalize("Дзержинск ул Петрищева 29а"),
            "Дзержинск, улица Петрищева, 29а, Россия"
        );
    }

    #[test]
    fn normalize_is_deterministic() {
        let inputs = [
            "Дзержинск ул Петрищева 29а",
            "адрес: Москва, Тверская ул., 7",
            "просто текст",
            "",
        ];
        for input in inputs {
            assert_eq!(normalize(input), normalize(input), "input: {input}");
        }
    }

    #[test]
    fn output_always_ends_with_country() {
        let inputs = [
            "Дзержинск ул Петрищева 29а",
            "Москва",
            "нижний регистр без структуры",
            "адрес:",
            "Санкт-Петербург, Невский проспект, 28, Россия",
        ];
        for input in inputs {
            let normalized = normalize(input);
            assert!(
                normalized.ends_with(COUNTRY),
                "'{input}' -> '{normalized}'"
            );
        }
    }

    #[test]
    fn empty_input_yields_bare_country() {
        assert_eq!(normalize(""), COUNTRY);
        assert_eq!(normalize("   "), COUNTRY);
        assert_eq!(normalize("Россия"), COUNTRY);
    }

    #[test]
    fn strips_filler_prefix() {
        assert_eq!(
            normalize("место работы: Дзержинск ул Петрищева 29а"),
            "Дзержинск, улица Петрищева, 29а, Россия"
        );
        assert_eq!(
            normalize("адрес - Москва, Тверская улица, 7"),
            "Москва, улица Тверская, 7, Россия"
        );
    }

    #[test]
    fn embedded_country_is_not_duplicated() {
        let normalized = normalize("Москва, Тверская улица, 7, Россия");
        assert_eq!(normalized.matches(COUNTRY).count(), 1);
        assert_eq!(normalized, "Москва, улица Тверская, 7, Россия");
    }

    #[test]
    fn expands_abbreviations() {
        assert_eq!(
            normalize("Нижний Новгород пр-т Гагарина 23"),
            "Нижний Новгород, проспект Гагарина, 23, Россия"
        );
        assert_eq!(
            normalize("Казань пер Катановский 4"),
            "Казань, переулок Катановский, 4, Россия"
        );
    }

    #[test]
    fn every_street_abbreviation_expands() {
        let cases = [
            ("ул", "улица"),
            ("пр-кт", "проспект"),
            ("пр-т", "проспект"),
            ("просп", "проспект"),
            ("пер", "переулок"),
            ("б-р", "бульвар"),
            ("бул", "бульвар"),
            ("ш.", "шоссе"),
            ("наб", "набережная"),
            ("пл", "площадь"),
            ("пр-д", "проезд"),
        ];
        for (abbreviated, full) in cases {
            let normalized = normalize(&format!("Дзержинск {abbreviated} Пушкина 5"));
            assert!(
                normalized.contains(full),
                "'{abbreviated}' -> '{normalized}'"
            );
        }
    }

    #[test]
    fn abbreviation_expands_before_comma_and_at_end_of_text() {
        assert_eq!(
            normalize("Москва, Тверская ул, 7"),
            "Москва, улица Тверская, 7, Россия"
        );
        assert_eq!(normalize("Москва Тверская ул"), "Москва, улица Тверская, Россия");
    }

    #[test]
    fn abbreviation_inside_a_longer_word_is_left_alone() {
        // "пер" must not fire inside "Петрищева" or a spelled-out "переулок".
        assert_eq!(
            normalize("Дзержинск переулок Жуковского 3"),
            "Дзержинск, переулок Жуковского, 3, Россия"
        );
    }

    #[test]
    fn house_prefix_collapsed() {
        assert_eq!(
            normalize("Дзержинск, ул. Петрищева, д. 29а"),
            "Дзержинск, улица Петрищева, 29а, Россия"
        );
    }

    #[test]
    fn city_marker_stripped_from_city_slot() {
        assert_eq!(
            normalize("г. Дзержинск ул Петрищева 29а"),
            "Дзержинск, улица Петрищева, 29а, Россия"
        );
    }

    #[test]
    fn two_word_city_without_keyword() {
        let components = decompose("Нижний Новгород Ленина 5").expect("should decompose");
        assert_eq!(components.city, "Нижний Новгород");
        assert_eq!(components.street.as_deref(), Some("Ленина"));
        assert_eq!(components.house_number.as_deref(), Some("5"));
    }

    #[test]
    fn decompose_components() {
        let components = decompose("Дзержинск ул Петрищева 29а").expect("should decompose");
        assert_eq!(components.city, "Дзержинск");
        assert_eq!(components.street.as_deref(), Some("Петрищева"));
        assert_eq!(components.street_kind.as_deref(), Some("улица"));
        assert_eq!(components.house_number.as_deref(), Some("29а"));
        assert_eq!(
            components.street_with_kind().as_deref(),
            Some("улица Петрищева")
        );
    }

    #[test]
    fn decompose_fails_on_shapeless_text() {
        assert!(decompose("").is_none());
        assert!(decompose("просто слова без города").is_none());
    }

    #[test]
    fn shapeless_text_still_gets_country_suffix() {
        assert_eq!(
            normalize("просто слова без города"),
            "просто слова без города, Россия"
        );
    }

    #[test]
    fn detects_trailing_house_number() {
        assert!(has_house_number("Дзержинск ул Петрищева 29а"));
        assert!(has_house_number("Москва Тверская 7"));
        assert!(!has_house_number("Москва Тверская"));
    }

    #[test]
    fn display_house_number_segments() {
        assert!(display_has_house_number(
            "улица Петрищева, 29а, Дзержинск, Нижегородская область, Россия"
        ));
        assert!(!display_has_house_number(
            "улица Петрищева, Дзержинск, Нижегородская область, Россия"
        ));
    }

    #[test]
    fn comma_separated_segments_are_taken_literally() {
        let components = decompose("Дзержинск, проспект Циолковского, 15").expect("decompose");
        assert_eq!(components.city, "Дзержинск");
        assert_eq!(components.street_kind.as_deref(), Some("проспект"));
        assert_eq!(components.street.as_deref(), Some("Циолковского"));
        assert_eq!(components.house_number.as_deref(), Some("15"));
    }
}
