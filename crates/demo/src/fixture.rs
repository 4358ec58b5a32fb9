//! Demo input file and the built-in roster.

use std::path::Path;

use roster_model::{Candidate, Category};
use roster_select::{ControlConfig, StaticSource};
use serde::Deserialize;

/// Demo TOML: a `[control]` table plus optional `[[candidates]]` rows.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoFile {
	pub control: ControlConfig,
	pub candidates: Vec<Candidate>,
}

impl DemoFile {
	pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(input)
	}

	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let input = std::fs::read_to_string(path)?;
		Ok(Self::from_toml_str(&input)?)
	}

	/// File candidates, or the built-in roster when the file has none.
	pub fn roster(&self) -> Vec<Candidate> {
		if self.candidates.is_empty() {
			builtin_roster()
		} else {
			self.candidates.clone()
		}
	}
}

pub fn builtin_roster() -> Vec<Candidate> {
	vec![
		Candidate::new("12345", "Max", "Mustermann", Category::Advisor),
		Candidate::new("11111", "Herrmann", "Hans", Category::Advisor),
		Candidate::new("999999", "Auch von Immer", "Was", Category::Advisor),
	]
}

/// Builds a source serving each candidate under its own category.
pub fn source_for(roster: &[Candidate]) -> StaticSource {
	Category::ALL.into_iter().fold(StaticSource::new(), |source, category| {
		let members: Vec<_> = roster.iter().filter(|c| c.category == category).cloned().collect();
		if members.is_empty() {
			source
		} else {
			source.with_candidates(category, members)
		}
	})
}
