//! Candidate filtering and ordering.
//!
//! The provider already applies a country restriction server-side, but
//! sometimes returns results with no country in the breakdown and, rarely,
//! results that slipped the filter. Ranking enforces the target country,
//! prefers building-precise candidates when the user typed a house number,
//! and orders by provider-reported importance with stable ties.

use crate::provider::Candidate;

/// Default suggestion list cap.
pub const MAX_SUGGESTIONS: usize = 5;

/// Filter, partition, and order candidates for the suggestion list.
///
/// - Candidates whose country hint positively contradicts `target_country`
///   are dropped; an absent hint passes.
/// - If `query_had_house_number` and any candidate carries a house number,
///   only those candidates are returned.
/// - Otherwise house-numbered candidates precede the rest.
/// - Both partitions are sorted by descending importance; equal importance
///   preserves provider response order. At most `limit` items.
pub fn rank(
    candidates: Vec<Candidate>,
    query_had_house_number: bool,
    target_country: &str,
    limit: usize,
) -> Vec<Candidate> {
    let in_country = candidates
        .into_iter()
        .filter(|candidate| country_matches(candidate, target_country));

    let (mut with_house, mut without_house): (Vec<Candidate>, Vec<Candidate>) =
        in_country.partition(Candidate::has_house_number);

    sort_by_importance(&mut with_house);
    sort_by_importance(&mut without_house);

    let ordered = if query_had_house_number && !with_house.is_empty() {
        with_house
    } else {
        with_house.into_iter().chain(without_house).collect()
    };

    ordered.into_iter().take(limit).collect()
}

fn country_matches(candidate: &Candidate, target: &str) -> bool {
    candidate.country_hint().is_none_or(|hint| hint == target)
}

/// Descending importance, stable so provider order breaks ties.
fn sort_by_importance(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::COUNTRY;
    use crate::provider::AddressDetails;

    fn rank_ru(candidates: Vec<Candidate>, query_had_house_number: bool) -> Vec<Candidate> {
        rank(candidates, query_had_house_number, COUNTRY, MAX_SUGGESTIONS)
    }

    fn candidate(display_name: &str, importance: f64, country: Option<&str>) -> Candidate {
        Candidate {
            display_name: display_name.to_string(),
            latitude: 56.2389,
            longitude: 43.4618,
            importance,
            details: country.map(|name| AddressDetails {
                country: Some(name.to_string()),
                ..AddressDetails::default()
            }),
        }
    }

    fn with_house(display_name: &str, importance: f64) -> Candidate {
        let mut candidate = candidate(display_name, importance, Some("Россия"));
        if let Some(details) = candidate.details.as_mut() {
            details.house_number = Some("29а".to_string());
        }
        candidate
    }

    #[test]
    fn caps_output_at_five() {
        let candidates = (0..10)
            .map(|i| candidate(&format!("место {i}"), 0.5, Some("Россия")))
            .collect();
        assert_eq!(rank_ru(candidates, false).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn foreign_candidates_are_dropped() {
        let candidates = vec![
            candidate("Dserschinsk, Deutschland", 0.9, Some("Deutschland")),
            candidate("Дзержинск, Россия", 0.5, Some("Россия")),
        ];
        let ranked = rank_ru(candidates, false);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].display_name, "Дзержинск, Россия");
    }

    #[test]
    fn missing_country_hint_passes() {
        let candidates = vec![candidate("где-то", 0.5, None)];
        assert_eq!(rank_ru(candidates, false).len(), 1);
    }

    #[test]
    fn house_number_partition_wins_when_query_had_one() {
        // Importance 0.8 without a house number loses to 0.6 with one.
        let candidates = vec![
            candidate("улица Петрищева, Дзержинск, Россия", 0.8, Some("Россия")),
            with_house("улица Петрищева, 29а, Дзержинск, Россия", 0.6),
        ];
        let ranked = rank_ru(candidates, true);
        assert_eq!(ranked.len(), 1);
        assert_eq!(
            ranked[0].display_name,
            "улица Петрищева, 29а, Дзержинск, Россия"
        );
    }

    #[test]
    fn house_numbered_candidates_lead_without_query_house() {
        let candidates = vec![
            candidate("улица Петрищева, Дзержинск, Россия", 0.9, Some("Россия")),
            with_house("улица Петрищева, 29а, Дзержинск, Россия", 0.3),
        ];
        let ranked = rank_ru(candidates, false);
        assert_eq!(ranked.len(), 2);
        assert!(ranked[0].has_house_number());
        assert!(!ranked[1].has_house_number());
    }

    #[test]
    fn query_house_with_no_matching_partition_keeps_everything() {
        let candidates = vec![
            candidate("улица Петрищева, Дзержинск, Россия", 0.7, Some("Россия")),
            candidate("Петрищева, Дзержинск, Россия", 0.4, Some("Россия")),
        ];
        let ranked = rank_ru(candidates, true);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn target_country_is_honoured() {
        let candidates = vec![
            candidate("Алматы, Қазақстан", 0.8, Some("Қазақстан")),
            candidate("Дзержинск, Россия", 0.5, Some("Россия")),
        ];
        let ranked = rank(candidates, false, "Қазақстан", MAX_SUGGESTIONS);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].display_name, "Алматы, Қазақстан");
    }

    #[test]
    fn custom_limit_is_honoured() {
        let candidates = (0..10)
            .map(|i| candidate(&format!("место {i}"), 0.5, Some("Россия")))
            .collect();
        assert_eq!(rank(candidates, false, COUNTRY, 3).len(), 3);
    }

    #[test]
    fn sorted_by_descending_importance_with_stable_ties() {
        let candidates = vec![
            candidate("первый из равных", 0.5, Some("Россия")),
            candidate("важный", 0.9, Some("Россия")),
            candidate("второй из равных", 0.5, Some("Россия")),
        ];
        let ranked = rank_ru(candidates, false);
        let names: Vec<&str> = ranked
            .iter()
            .map(|candidate| candidate.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["важный", "первый из равных", "второй из равных"]);
    }
}
