//! Search-select control handle.
//!
//! [`SearchSelect`] wraps a [`Composer`] behind one mutex and runs candidate
//! fetches as tokio tasks. Each fetch carries a [`FetchTicket`]; beginning a
//! newer fetch cancels the previous ticket, and the composer rejects settles
//! from any generation but the active one.
//!
//! Outputs are published through `watch` channels (latest value only) and
//! host-facing events through a `broadcast` channel. Change and touch
//! listeners run after the state lock is released, so they may call back
//! into the control.
//!
//! Follow-up work of each transition is queued under the state lock and
//! drained by one delivering thread at a time, so listeners and events
//! observe changes in commit order even when a fetch settles on another
//! thread. A call made while another thread (or an enclosing listener) is
//! delivering returns once its transition is committed; its notifications
//! are delivered by the thread already draining.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use roster_model::{Candidate, Category};
use tokio::sync::{broadcast, watch};

use crate::adapter::{ControlValueAccessor, Validatable, ValidationErrors};
use crate::composer::{Composer, Input, Transition};
use crate::config::ControlConfig;
use crate::fetch::{self, FetchTicket};
use crate::selection::SelectionState;
use crate::source::{CandidateSource, SourceError};

const EVENT_CAPACITY: usize = 64;

type ChangeListener = Arc<dyn Fn(Option<&Candidate>) + Send + Sync>;
type TouchListener = Arc<dyn Fn() + Send + Sync>;

/// Host-facing notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEvent {
	/// The committed value changed.
	ValueChanged(Option<Candidate>),
	/// The active fetch failed. Previous candidates are still in place.
	FetchFailed(SourceError),
	/// First user interaction.
	Touched,
}

struct ControlState {
	composer: Composer,
	label: String,
	active_fetch: Option<FetchTicket>,
	last_error: Option<SourceError>,
	touched: bool,
	on_change: Vec<ChangeListener>,
	on_touched: Vec<TouchListener>,
	pending: VecDeque<Followup>,
	delivering: bool,
}

struct Shared {
	source: Arc<dyn CandidateSource>,
	state: Mutex<ControlState>,
	query_tx: watch::Sender<String>,
	visible_tx: watch::Sender<Arc<[Candidate]>>,
	loading_tx: watch::Sender<bool>,
	selection_tx: watch::Sender<SelectionState>,
	events_tx: broadcast::Sender<ControlEvent>,
}

/// Work left to do once the state lock is released.
#[derive(Default)]
struct Followup {
	touched: Option<Vec<TouchListener>>,
	fetch: Option<FetchTicket>,
	change: Option<(Option<Candidate>, Vec<ChangeListener>)>,
	error: Option<SourceError>,
}

impl Shared {
	fn dispatch(self: &Arc<Self>, input: Input) {
		{
			let mut state = self.state.lock();
			self.commit(&mut state, input);
		}
		self.drain();
	}

	/// User-driven input. Ignored entirely while disabled; otherwise marks
	/// the control touched before applying `input`.
	fn interact(self: &Arc<Self>, input: Option<Input>) {
		{
			let mut state = self.state.lock();
			if state.composer.is_disabled() {
				tracing::trace!("select.input.ignored_disabled");
				return;
			}
			if !state.touched {
				state.touched = true;
				let listeners = state.on_touched.clone();
				state.pending.push_back(Followup {
					touched: Some(listeners),
					..Followup::default()
				});
			}
			if let Some(input) = input {
				self.commit(&mut state, input);
			}
		}
		self.drain();
	}

	fn commit(&self, state: &mut ControlState, input: Input) {
		let transition = state.composer.apply(input);
		self.publish(&state.composer, &transition);
		let followup = Self::plan(state, transition);
		state.pending.push_back(followup);
	}

	/// Runs queued follow-ups in commit order unless another caller is
	/// already doing so.
	fn drain(self: &Arc<Self>) {
		{
			let mut state = self.state.lock();
			if state.delivering {
				return;
			}
			state.delivering = true;
		}
		let _guard = DeliveryGuard(self);
		loop {
			let next = {
				let mut state = self.state.lock();
				let next = state.pending.pop_front();
				if next.is_none() {
					state.delivering = false;
				}
				next
			};
			let Some(followup) = next else {
				break;
			};
			self.run(followup);
		}
	}

	fn publish(&self, composer: &Composer, t: &Transition) {
		if t.query_changed {
			self.query_tx.send_replace(composer.query().to_owned());
		}
		if t.visible_changed {
			self.visible_tx.send_replace(Arc::clone(composer.visible()));
		}
		if t.loading_changed {
			self.loading_tx.send_replace(composer.is_loading());
		}
		if t.selection_changed {
			self.selection_tx.send_replace(composer.selection().clone());
		}
	}

	fn plan(state: &mut ControlState, t: Transition) -> Followup {
		let mut followup = Followup::default();
		if let Some(request) = t.fetch {
			if let Some(previous) = state.active_fetch.take() {
				previous.cancel();
			}
			let ticket = FetchTicket::new(request.generation, request.category);
			state.active_fetch = Some(ticket.clone());
			followup.fetch = Some(ticket);
		}
		if t.loading_changed && t.error.is_none() && !state.composer.is_loading() {
			state.last_error = None;
			state.active_fetch = None;
		}
		if let Some(error) = t.error {
			state.last_error = Some(error.clone());
			state.active_fetch = None;
			followup.error = Some(error);
		}
		if let Some(change) = t.value_change {
			followup.change = Some((change.value, state.on_change.clone()));
		}
		followup
	}

	fn run(self: &Arc<Self>, followup: Followup) {
		if let Some(listeners) = followup.touched {
			for listener in &listeners {
				listener();
			}
			let _ = self.events_tx.send(ControlEvent::Touched);
		}
		if let Some(ticket) = followup.fetch {
			self.spawn_fetch(ticket);
		}
		if let Some((value, listeners)) = followup.change {
			for listener in &listeners {
				listener(value.as_ref());
			}
			let _ = self.events_tx.send(ControlEvent::ValueChanged(value));
		}
		if let Some(error) = followup.error {
			let _ = self.events_tx.send(ControlEvent::FetchFailed(error));
		}
	}

	fn spawn_fetch(self: &Arc<Self>, ticket: FetchTicket) {
		let source = Arc::clone(&self.source);
		let shared: Weak<Self> = Arc::downgrade(self);
		let task_ticket = ticket.clone();
		fetch::spawn(&ticket, async move {
			let ticket = task_ticket;
			let outcome = tokio::select! {
				biased;
				_ = ticket.cancelled() => {
					tracing::debug!(generation = ticket.generation(), "select.fetch.cancelled");
					return;
				}
				outcome = source.fetch(ticket.category()) => outcome,
			};
			if ticket.is_cancelled() {
				tracing::debug!(generation = ticket.generation(), "select.fetch.cancelled");
				return;
			}
			let Some(shared) = shared.upgrade() else {
				return;
			};
			let generation = ticket.generation();
			let input = match outcome {
				Ok(candidates) => Input::CandidatesLoaded {
					generation,
					candidates: candidates.into(),
				},
				Err(error) => Input::FetchFailed { generation, error },
			};
			shared.dispatch(input);
		});
	}
}

/// Releases the delivery slot if a listener panics mid-drain.
struct DeliveryGuard<'a>(&'a Shared);

impl Drop for DeliveryGuard<'_> {
	fn drop(&mut self) {
		if std::thread::panicking() {
			self.0.state.lock().delivering = false;
		}
	}
}

/// Embeddable search-select control.
///
/// Dropping the handle cancels any in-flight fetch.
pub struct SearchSelect {
	inner: Arc<Shared>,
}

impl SearchSelect {
	/// Creates a control with default configuration and activates its category.
	pub fn new(source: Arc<dyn CandidateSource>) -> Self {
		Self::with_config(source, ControlConfig::default())
	}

	/// Creates a control from `config` and activates its category, which
	/// starts the first fetch.
	pub fn with_config(source: Arc<dyn CandidateSource>, config: ControlConfig) -> Self {
		let composer = Composer::new(config.required);
		let (query_tx, _) = watch::channel(composer.query().to_owned());
		let (visible_tx, _) = watch::channel(Arc::clone(composer.visible()));
		let (loading_tx, _) = watch::channel(composer.is_loading());
		let (selection_tx, _) = watch::channel(composer.selection().clone());
		let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

		let control = Self {
			inner: Arc::new(Shared {
				source,
				state: Mutex::new(ControlState {
					composer,
					label: config.label,
					active_fetch: None,
					last_error: None,
					touched: false,
					on_change: Vec::new(),
					on_touched: Vec::new(),
					pending: VecDeque::new(),
					delivering: false,
				}),
				query_tx,
				visible_tx,
				loading_tx,
				selection_tx,
				events_tx,
			}),
		};

		tracing::debug!(category = %config.category, required = config.required, "select.control.init");
		control.inner.dispatch(Input::AllowListChanged(config.allow_list));
		control.inner.dispatch(Input::PreselectRequested(config.initial_identifier));
		control.inner.dispatch(Input::CategoryChanged(config.category));
		control
	}

	pub fn label(&self) -> String {
		self.inner.state.lock().label.clone()
	}

	pub fn set_label(&self, label: impl Into<String>) {
		self.inner.state.lock().label = label.into();
	}

	pub fn category(&self) -> Option<Category> {
		self.inner.state.lock().composer.category()
	}

	/// Switches the data set. Clears candidates and selection and refetches.
	pub fn set_category(&self, category: Category) {
		self.inner.dispatch(Input::CategoryChanged(category));
	}

	pub fn set_required(&self, required: bool) {
		self.inner.dispatch(Input::SetRequired(required));
	}

	/// Requests automatic selection of `identifier` once it is loaded.
	pub fn set_initial_identifier(&self, identifier: Option<String>) {
		self.inner.dispatch(Input::PreselectRequested(identifier));
	}

	pub fn set_allow_list(&self, allow_list: Option<Vec<String>>) {
		self.inner.dispatch(Input::AllowListChanged(allow_list));
	}

	/// Re-fetches the active category. Candidates stay visible until it settles.
	pub fn refresh(&self) {
		self.inner.dispatch(Input::Refresh);
	}

	/// User edit of the search text. Ignored while disabled.
	pub fn set_query(&self, query: impl Into<String>) {
		self.inner.interact(Some(Input::QueryChanged(query.into())));
	}

	/// User pick from the visible options. Ignored while disabled.
	pub fn choose(&self, candidate: Candidate) {
		self.inner.interact(Some(Input::Choose(candidate)));
	}

	/// Marks the control as touched (focus or click). Ignored while disabled.
	pub fn touch(&self) {
		self.inner.interact(None);
	}

	pub fn query(&self) -> String {
		self.inner.state.lock().composer.query().to_owned()
	}

	pub fn visible(&self) -> Arc<[Candidate]> {
		Arc::clone(self.inner.state.lock().composer.visible())
	}

	pub fn is_loading(&self) -> bool {
		self.inner.state.lock().composer.is_loading()
	}

	pub fn selection(&self) -> SelectionState {
		self.inner.state.lock().composer.selection().clone()
	}

	pub fn value(&self) -> Option<Candidate> {
		self.inner.state.lock().composer.selection().selected.clone()
	}

	pub fn is_disabled(&self) -> bool {
		self.inner.state.lock().composer.is_disabled()
	}

	pub fn is_touched(&self) -> bool {
		self.inner.state.lock().touched
	}

	/// Error of the most recent fetch, cleared by the next successful load.
	pub fn last_error(&self) -> Option<SourceError> {
		self.inner.state.lock().last_error.clone()
	}

	pub fn subscribe_query(&self) -> watch::Receiver<String> {
		self.inner.query_tx.subscribe()
	}

	pub fn subscribe_visible(&self) -> watch::Receiver<Arc<[Candidate]>> {
		self.inner.visible_tx.subscribe()
	}

	pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
		self.inner.loading_tx.subscribe()
	}

	pub fn subscribe_selection(&self) -> watch::Receiver<SelectionState> {
		self.inner.selection_tx.subscribe()
	}

	pub fn subscribe_events(&self) -> broadcast::Receiver<ControlEvent> {
		self.inner.events_tx.subscribe()
	}
}

impl Drop for SearchSelect {
	fn drop(&mut self) {
		if let Some(ticket) = self.inner.state.lock().active_fetch.take() {
			ticket.cancel();
		}
	}
}

impl ControlValueAccessor for SearchSelect {
	type Value = Candidate;

	fn write_value(&self, value: Option<Candidate>) {
		self.inner.dispatch(Input::WriteValue(value));
	}

	fn set_disabled(&self, disabled: bool) {
		self.inner.dispatch(Input::SetDisabled(disabled));
	}

	fn register_on_change<F>(&self, listener: F)
	where
		F: Fn(Option<&Candidate>) + Send + Sync + 'static,
	{
		self.inner.state.lock().on_change.push(Arc::new(listener));
	}

	fn register_on_touched<F>(&self, listener: F)
	where
		F: Fn() + Send + Sync + 'static,
	{
		self.inner.state.lock().on_touched.push(Arc::new(listener));
	}
}

impl Validatable for SearchSelect {
	fn validate(&self) -> Option<ValidationErrors> {
		self.inner.state.lock().composer.validate()
	}
}
