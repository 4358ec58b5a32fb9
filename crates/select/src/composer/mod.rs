//! Reactive composer for the search-select control.
//!
//! # Purpose
//!
//! * Merges query text, loaded candidates, the allow-list and the preselect
//!   request into one consistent output tuple: visible options, loading flag,
//!   selection snapshot.
//! * Decides when a fetch starts and which fetch results are still current.
//!
//! # Mental model
//!
//! * [`Composer`] is a deterministic reducer. [`Composer::apply`] takes one
//!   [`Input`] and returns a [`Transition`] naming which outputs changed and
//!   which side effects (fetch start, change notification, surfaced error)
//!   the caller has to perform.
//! * The composer never performs I/O. The control owns the async side and
//!   feeds settled fetches back in as `CandidatesLoaded` / `FetchFailed`.
//! * Every fetch belongs to a generation. Category changes and refreshes
//!   begin a new generation; settles from any other generation are stale.
//!
//! # Invariants
//!
//! * Visible options are a subset of the active generation's candidate set.
//! * With a non-empty allow-list every visible identifier is allow-listed.
//! * `loading` is true from fetch begin until the active generation settles.
//! * A failed fetch keeps the previous candidate set.
//! * `visible_changed` is only reported when the recomputed list differs by
//!   value from the last published list.
//! * A preselect request fires once per identifier, and never after a newer
//!   user pick or non-null external write.
//! * Committing a selection rewrites the query to the selection's display
//!   text (empty text when cleared).
//!
//! # Data flow
//!
//! 1. `CategoryChanged` / `Refresh` bump the generation, set `loading`, and
//!    return a [`FetchRequest`].
//! 2. The control runs the fetch and applies `CandidatesLoaded` or
//!    `FetchFailed` with the request's generation.
//! 3. Query, candidate or allow-list changes recompute visible options.
//! 4. Preselect request or candidate changes re-evaluate the preselect.

use std::sync::Arc;

use roster_filter::compute_visible;
use roster_model::{Candidate, Category};

use crate::adapter::{Validatable, ValidationErrors};
use crate::selection::{PreselectOutcome, SelectionMachine, SelectionState};
use crate::source::SourceError;

/// Events accepted by [`Composer::apply`].
#[derive(Debug, Clone)]
pub enum Input {
	/// User edited the search text.
	QueryChanged(String),
	/// A fetch settled successfully.
	CandidatesLoaded { generation: u64, candidates: Arc<[Candidate]> },
	/// A fetch settled with an error.
	FetchFailed { generation: u64, error: SourceError },
	AllowListChanged(Option<Vec<String>>),
	/// Identifier to select automatically once available.
	PreselectRequested(Option<String>),
	CategoryChanged(Category),
	/// Re-fetch the active category.
	Refresh,
	/// Value written by the host form.
	WriteValue(Option<Candidate>),
	/// User picked one of the visible options.
	Choose(Candidate),
	SetRequired(bool),
	SetDisabled(bool),
}

/// Fetch the caller has to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
	pub generation: u64,
	pub category: Category,
}

/// Committed change of the selected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChange {
	pub value: Option<Candidate>,
}

/// Result of applying one [`Input`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
	pub query_changed: bool,
	pub visible_changed: bool,
	pub loading_changed: bool,
	pub selection_changed: bool,
	pub value_change: Option<ValueChange>,
	pub fetch: Option<FetchRequest>,
	pub error: Option<SourceError>,
}

impl Transition {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

#[derive(Debug, Clone)]
pub struct Composer {
	category: Option<Category>,
	generation: u64,
	loading: bool,
	candidates: Arc<[Candidate]>,
	query: String,
	allow_list: Option<Vec<String>>,
	visible: Arc<[Candidate]>,
	preselect: Option<String>,
	preselect_settled: bool,
	selection: SelectionMachine,
	disabled: bool,
}

impl Default for Composer {
	fn default() -> Self {
		Self::new(true)
	}
}

impl Composer {
	pub fn new(required: bool) -> Self {
		Self {
			category: None,
			generation: 0,
			loading: false,
			candidates: Arc::from(Vec::new()),
			query: String::new(),
			allow_list: None,
			visible: Arc::from(Vec::new()),
			preselect: None,
			preselect_settled: false,
			selection: SelectionMachine::new(required),
			disabled: false,
		}
	}

	pub fn category(&self) -> Option<Category> {
		self.category
	}

	/// Generation of the most recently started fetch.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	pub fn is_loading(&self) -> bool {
		self.loading
	}

	pub fn candidates(&self) -> &Arc<[Candidate]> {
		&self.candidates
	}

	pub fn visible(&self) -> &Arc<[Candidate]> {
		&self.visible
	}

	pub fn query(&self) -> &str {
		&self.query
	}

	pub fn allow_list(&self) -> Option<&[String]> {
		self.allow_list.as_deref()
	}

	pub fn preselect(&self) -> Option<&str> {
		self.preselect.as_deref()
	}

	pub fn selection(&self) -> &SelectionState {
		self.selection.state()
	}

	pub fn is_disabled(&self) -> bool {
		self.disabled
	}

	pub fn apply(&mut self, input: Input) -> Transition {
		let mut t = Transition::default();
		match input {
			Input::QueryChanged(query) => {
				if self.disabled {
					tracing::trace!("select.query.ignored_disabled");
				} else {
					self.replace_query(query, &mut t);
				}
			}
			Input::CandidatesLoaded { generation, candidates } => self.settle_loaded(generation, candidates, &mut t),
			Input::FetchFailed { generation, error } => self.settle_failed(generation, error, &mut t),
			Input::AllowListChanged(allow_list) => {
				if self.allow_list != allow_list {
					self.allow_list = allow_list;
					self.recompute_visible(&mut t);
				}
			}
			Input::PreselectRequested(identifier) => {
				let identifier = identifier.filter(|id| !id.is_empty());
				if self.preselect != identifier {
					self.preselect = identifier;
					self.preselect_settled = false;
					self.evaluate_preselect(&mut t);
				}
			}
			Input::CategoryChanged(category) => self.activate(category, &mut t),
			Input::Refresh => {
				if let Some(category) = self.category {
					self.begin_fetch(category, &mut t);
				}
			}
			Input::WriteValue(value) => {
				if value.is_some() {
					self.preselect_settled = true;
				}
				self.commit(value, &mut t);
			}
			Input::Choose(candidate) => {
				if self.disabled {
					tracing::trace!(identifier = %candidate.identifier, "select.choose.ignored_disabled");
				} else {
					self.preselect_settled = true;
					self.commit(Some(candidate), &mut t);
				}
			}
			Input::SetRequired(required) => t.selection_changed = self.selection.set_required(required),
			Input::SetDisabled(disabled) => self.disabled = disabled,
		}
		t
	}

	fn activate(&mut self, category: Category, t: &mut Transition) {
		if self.category == Some(category) {
			return;
		}
		let previous = self.category.replace(category);
		if let Some(previous) = previous {
			tracing::debug!(from = %previous, to = %category, "select.category.switch");
			self.candidates = Arc::from(Vec::new());
			self.commit(None, t);
			self.recompute_visible(t);
		}
		self.begin_fetch(category, t);
	}

	fn begin_fetch(&mut self, category: Category, t: &mut Transition) {
		self.generation = self.generation.wrapping_add(1);
		if !self.loading {
			self.loading = true;
			t.loading_changed = true;
		}
		tracing::debug!(generation = self.generation, category = %category, "select.fetch.begin");
		t.fetch = Some(FetchRequest {
			generation: self.generation,
			category,
		});
	}

	fn is_current(&self, generation: u64) -> bool {
		if generation == self.generation && self.loading {
			return true;
		}
		tracing::debug!(generation, active = self.generation, "select.fetch.stale");
		false
	}

	fn settle_loaded(&mut self, generation: u64, candidates: Arc<[Candidate]>, t: &mut Transition) {
		if !self.is_current(generation) {
			return;
		}
		self.loading = false;
		t.loading_changed = true;
		tracing::debug!(generation, count = candidates.len(), "select.fetch.loaded");
		self.candidates = candidates;
		self.recompute_visible(t);
		self.evaluate_preselect(t);
	}

	fn settle_failed(&mut self, generation: u64, error: SourceError, t: &mut Transition) {
		if !self.is_current(generation) {
			return;
		}
		self.loading = false;
		t.loading_changed = true;
		tracing::warn!(generation, category = %error.category(), error = %error, "select.fetch.failed");
		t.error = Some(error);
	}

	fn evaluate_preselect(&mut self, t: &mut Transition) {
		if self.preselect_settled || self.candidates.is_empty() {
			return;
		}
		let Some(identifier) = self.preselect.as_deref() else {
			return;
		};
		match self.selection.try_preselect(identifier, &self.candidates) {
			PreselectOutcome::Ignored => {}
			PreselectOutcome::Applied { changed } => {
				self.preselect_settled = true;
				self.after_commit(changed, t);
			}
		}
	}

	fn commit(&mut self, value: Option<Candidate>, t: &mut Transition) {
		let changed = self.selection.write_external_value(value);
		self.after_commit(changed, t);
	}

	fn after_commit(&mut self, changed: bool, t: &mut Transition) {
		if changed {
			t.selection_changed = true;
			t.value_change = Some(ValueChange {
				value: self.selection.selected().cloned(),
			});
		}
		let text = self.selection.selected().map(Candidate::display_text).unwrap_or_default();
		self.replace_query(text, t);
	}

	fn replace_query(&mut self, query: String, t: &mut Transition) {
		if self.query == query {
			return;
		}
		self.query = query;
		t.query_changed = true;
		self.recompute_visible(t);
	}

	fn recompute_visible(&mut self, t: &mut Transition) {
		let next = compute_visible(&self.candidates, &self.query, self.allow_list.as_deref());
		if *self.visible == *next.as_slice() {
			tracing::trace!(query = %self.query, "select.visible.unchanged");
			return;
		}
		self.visible = next.into();
		t.visible_changed = true;
	}
}

impl Validatable for Composer {
	fn validate(&self) -> Option<ValidationErrors> {
		self.selection.validate()
	}
}
