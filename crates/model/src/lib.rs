//! Candidate data model shared by the filter engine and the select control.
//!
//! A [`Candidate`] is one selectable staff member. Candidates are fetched per
//! [`Category`] and never mutated after they arrive; the control only ever
//! replaces whole candidate sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Display text used when nothing is selected.
pub const EMPTY_DISPLAY: &str = "-";

/// Data set a candidate source is queried for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
	/// Staff responsible for advising customers.
	#[default]
	Advisor,
	/// Back-office staff assisting advisors.
	Assistant,
}

impl Category {
	/// Every known category, in declaration order.
	pub const ALL: [Category; 2] = [Category::Advisor, Category::Assistant];

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Advisor => "advisor",
			Self::Assistant => "assistant",
		}
	}
}

impl fmt::Display for Category {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A selectable staff member.
///
/// `identifier` is unique within one category's candidate set. Nothing in the
/// control enforces that, so duplicate identifiers are carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
	pub identifier: String,
	pub first_name: String,
	pub last_name: String,
	#[serde(default)]
	pub category: Category,
}

impl Candidate {
	pub fn new(identifier: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>, category: Category) -> Self {
		Self {
			identifier: identifier.into(),
			first_name: first_name.into(),
			last_name: last_name.into(),
			category,
		}
	}

	/// Renders `"<first> <last>"`.
	pub fn display_text(&self) -> String {
		format!("{} {}", self.first_name, self.last_name)
	}
}

impl fmt::Display for Candidate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.first_name, self.last_name)
	}
}

/// Renders an optional selection, falling back to [`EMPTY_DISPLAY`].
pub fn display_text(candidate: Option<&Candidate>) -> String {
	candidate.map_or_else(|| EMPTY_DISPLAY.to_owned(), Candidate::display_text)
}
