use pretty_assertions::assert_eq;
use proptest::prelude::*;
use roster_model::{Candidate, Category};
use rstest::rstest;

use super::*;

fn roster() -> Vec<Candidate> {
	vec![
		Candidate::new("12345", "Max", "Mustermann", Category::Advisor),
		Candidate::new("11111", "Herrmann", "Hans", Category::Advisor),
		Candidate::new("999999", "Auch von Immer", "Was", Category::Advisor),
	]
}

fn ids(candidates: &[Candidate]) -> Vec<&str> {
	candidates.iter().map(|c| c.identifier.as_str()).collect()
}

#[rstest]
#[case::last_name("han", &["11111"])]
#[case::upper_case_query("HAN", &["11111"])]
#[case::first_name("max", &["12345"])]
#[case::identifier_prefix("111", &["11111"])]
#[case::identifier_infix("234", &["12345"])]
#[case::across_name_boundary("max must", &["12345"])]
#[case::multi_word_first_name("von immer w", &["999999"])]
#[case::shared_letters("ma", &["12345", "11111"])]
#[case::no_match("zzz", &[])]
#[case::empty_query("", &["12345", "11111", "999999"])]
fn query_matches_any_field(#[case] query: &str, #[case] expected: &[&str]) {
	let visible = compute_visible(&roster(), query, None);
	assert_eq!(ids(&visible), expected);
}

#[test]
fn allow_list_restricts_before_query() {
	let allow = vec!["12345".to_owned()];
	let visible = compute_visible(&roster(), "", Some(&allow));
	assert_eq!(visible, vec![Candidate::new("12345", "Max", "Mustermann", Category::Advisor)]);

	let visible = compute_visible(&roster(), "han", Some(&allow));
	assert!(visible.is_empty());
}

#[test]
fn allow_list_keeps_candidate_order() {
	let allow = vec!["999999".to_owned(), "12345".to_owned()];
	let visible = compute_visible(&roster(), "", Some(&allow));
	assert_eq!(ids(&visible), ["12345", "999999"]);
}

#[test]
fn empty_allow_list_is_no_restriction() {
	let visible = compute_visible(&roster(), "", Some(&[]));
	assert_eq!(visible, roster());
}

#[test]
fn duplicate_identifiers_are_kept() {
	let mut candidates = roster();
	candidates.push(Candidate::new("12345", "Maxi", "Muster", Category::Advisor));
	let allow = vec!["12345".to_owned()];
	let visible = compute_visible(&candidates, "", Some(&allow));
	assert_eq!(ids(&visible), ["12345", "12345"]);
}

#[test]
fn single_candidate_match_helper() {
	let candidate = Candidate::new("11111", "Herrmann", "Hans", Category::Advisor);
	assert!(matches(&candidate, "rmann h"));
	assert!(matches(&candidate, ""));
	assert!(!matches(&candidate, "hanz"));
}

fn candidate_strategy() -> impl Strategy<Value = Candidate> {
	("[0-9]{1,6}", "[A-Za-z]{0,8}", "[A-Za-z]{0,8}")
		.prop_map(|(identifier, first, last)| Candidate::new(identifier, first, last, Category::Advisor))
}

fn oracle(candidate: &Candidate, query: &str) -> bool {
	let q = query.to_ascii_lowercase();
	let fields = [
		candidate.first_name.to_ascii_lowercase(),
		candidate.last_name.to_ascii_lowercase(),
		candidate.identifier.to_ascii_lowercase(),
		format!("{} {}", candidate.first_name, candidate.last_name).to_ascii_lowercase(),
	];
	fields.iter().any(|field| field.contains(&q))
}

proptest! {
	#[test]
	fn single_candidate_visibility_matches_oracle(candidate in candidate_strategy(), query in "[A-Za-z0-9 ]{0,4}") {
		let visible = compute_visible(std::slice::from_ref(&candidate), &query, None);
		prop_assert_eq!(visible.len() == 1, oracle(&candidate, &query));
	}

	#[test]
	fn allow_list_bounds_every_visible_identifier(
		candidates in prop::collection::vec(candidate_strategy(), 0..12),
		allow in prop::collection::vec("[0-9]{1,6}", 1..4),
		query in "[A-Za-z0-9]{0,2}",
	) {
		for candidate in compute_visible(&candidates, &query, Some(&allow)) {
			prop_assert!(allow.contains(&candidate.identifier));
		}
	}

	#[test]
	fn empty_query_without_allow_list_is_identity(candidates in prop::collection::vec(candidate_strategy(), 0..12)) {
		prop_assert_eq!(compute_visible(&candidates, "", None), candidates);
	}

	#[test]
	fn visible_is_an_ordered_subsequence(
		candidates in prop::collection::vec(candidate_strategy(), 0..12),
		query in "[A-Za-z]{0,2}",
	) {
		let visible = compute_visible(&candidates, &query, None);
		let mut rest = candidates.iter();
		for candidate in &visible {
			prop_assert!(rest.any(|c| c == candidate));
		}
	}
}
