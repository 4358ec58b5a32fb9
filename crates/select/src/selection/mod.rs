//! Single-value selection state machine.
//!
//! Two phases, [`SelectionPhase::Empty`] and [`SelectionPhase::Selected`].
//! Every mutation recomputes `display_text` and `valid` from `selected` and
//! `required`, so the two derived fields can never drift from their inputs.
//!
//! # Invariants
//!
//! * `valid == false` whenever `required` and nothing is selected.
//! * A preselect identifier is applied at most once; repeating it is a no-op.

use roster_model::{Candidate, display_text};

use crate::adapter::{Validatable, ValidationError, ValidationErrors};

/// Observable selection snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
	pub selected: Option<Candidate>,
	pub display_text: String,
	pub valid: bool,
	pub required: bool,
}

impl SelectionState {
	fn empty(required: bool) -> Self {
		Self {
			selected: None,
			display_text: display_text(None),
			valid: !required,
			required,
		}
	}

	pub fn phase(&self) -> SelectionPhase {
		if self.selected.is_some() {
			SelectionPhase::Selected
		} else {
			SelectionPhase::Empty
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
	Empty,
	Selected,
}

/// Outcome of [`SelectionMachine::try_preselect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreselectOutcome {
	/// No matching candidate, empty identifier, or identifier already applied.
	Ignored,
	/// The match was written. `changed` is false when it was already selected.
	Applied { changed: bool },
}

#[derive(Debug, Clone)]
pub struct SelectionMachine {
	state: SelectionState,
	preselected: Option<String>,
}

impl Default for SelectionMachine {
	fn default() -> Self {
		Self::new(true)
	}
}

impl SelectionMachine {
	pub fn new(required: bool) -> Self {
		Self {
			state: SelectionState::empty(required),
			preselected: None,
		}
	}

	pub fn state(&self) -> &SelectionState {
		&self.state
	}

	pub fn selected(&self) -> Option<&Candidate> {
		self.state.selected.as_ref()
	}

	pub fn phase(&self) -> SelectionPhase {
		self.state.phase()
	}

	/// Replaces the selection. Returns true when `selected` changed.
	pub fn write_external_value(&mut self, value: Option<Candidate>) -> bool {
		if self.state.selected == value {
			return false;
		}
		self.state.display_text = display_text(value.as_ref());
		self.state.selected = value;
		self.refresh_validity();
		true
	}

	/// User pick from the visible options. Callers only pass visible members.
	pub fn choose(&mut self, candidate: Candidate) -> bool {
		self.write_external_value(Some(candidate))
	}

	/// Returns true when the snapshot changed.
	pub fn set_required(&mut self, required: bool) -> bool {
		if self.state.required == required {
			return false;
		}
		self.state.required = required;
		self.refresh_validity();
		true
	}

	/// Selects the candidate whose identifier equals `identifier`, once.
	pub fn try_preselect(&mut self, identifier: &str, candidates: &[Candidate]) -> PreselectOutcome {
		if identifier.is_empty() || self.preselected.as_deref() == Some(identifier) {
			return PreselectOutcome::Ignored;
		}
		let Some(found) = candidates.iter().find(|candidate| candidate.identifier == identifier) else {
			return PreselectOutcome::Ignored;
		};

		self.preselected = Some(identifier.to_owned());
		let changed = self.write_external_value(Some(found.clone()));
		tracing::debug!(identifier, changed, "select.preselect.applied");
		PreselectOutcome::Applied { changed }
	}

	fn refresh_validity(&mut self) {
		self.state.valid = !(self.state.required && self.state.selected.is_none());
	}
}

impl Validatable for SelectionMachine {
	fn validate(&self) -> Option<ValidationErrors> {
		let mut errors = Vec::new();
		if !self.state.valid {
			errors.push(ValidationError::Required);
		}
		ValidationErrors::from_errors(errors)
	}
}
