//! Visible-option filtering for the roster search-select control.
//!
//! Two stages, applied in order:
//!
//! 1. Allow-list restriction. A present, non-empty allow-list keeps only
//!    candidates whose identifier it contains. Candidate order wins over
//!    allow-list order.
//! 2. Query match. An empty query keeps everything. Otherwise the lower-cased
//!    query must be a substring of the lower-cased first name, last name,
//!    identifier, or display text (`"first last"`).
//!
//! Everything here is pure and linear in the number of candidates, so it is
//! cheap enough to run on every keystroke.

use std::collections::HashSet;

use roster_model::Candidate;

/// Precomputed filter for one `(query, allow_list)` pair.
pub struct VisibleFilter<'a> {
	needle: String,
	allowed: Option<HashSet<&'a str>>,
}

impl<'a> VisibleFilter<'a> {
	pub fn new(query: &str, allow_list: Option<&'a [String]>) -> Self {
		let allowed = allow_list
			.filter(|list| !list.is_empty())
			.map(|list| list.iter().map(String::as_str).collect());

		Self {
			needle: query.to_lowercase(),
			allowed,
		}
	}

	/// Returns true when the allow-list stage would keep `candidate`.
	#[inline]
	pub fn permits(&self, candidate: &Candidate) -> bool {
		self.allowed
			.as_ref()
			.is_none_or(|allowed| allowed.contains(candidate.identifier.as_str()))
	}

	/// Returns true when the query stage would keep `candidate`.
	#[inline]
	pub fn matches(&self, candidate: &Candidate) -> bool {
		self.needle.is_empty() || matches_needle(candidate, &self.needle)
	}

	#[inline]
	pub fn allows(&self, candidate: &Candidate) -> bool {
		self.permits(candidate) && self.matches(candidate)
	}

	/// Applies both stages, preserving input order.
	pub fn apply(&self, candidates: &[Candidate]) -> Vec<Candidate> {
		candidates.iter().filter(|candidate| self.allows(candidate)).cloned().collect()
	}
}

/// Computes the visible subset of `candidates` for `query` and `allow_list`.
pub fn compute_visible(candidates: &[Candidate], query: &str, allow_list: Option<&[String]>) -> Vec<Candidate> {
	VisibleFilter::new(query, allow_list).apply(candidates)
}

/// Single-candidate query match, case-insensitive.
pub fn matches(candidate: &Candidate, query: &str) -> bool {
	VisibleFilter::new(query, None).matches(candidate)
}

fn matches_needle(candidate: &Candidate, needle: &str) -> bool {
	candidate.first_name.to_lowercase().contains(needle)
		|| candidate.last_name.to_lowercase().contains(needle)
		|| candidate.identifier.to_lowercase().contains(needle)
		|| candidate.display_text().to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests;
