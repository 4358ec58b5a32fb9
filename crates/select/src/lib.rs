//! Search-select control for roster candidates.
//!
//! Given free-text input the control loads candidates asynchronously from a
//! [`CandidateSource`], filters them against the query and an optional
//! allow-list, and exposes one selected value plus validation state to a host
//! form through [`ControlValueAccessor`] and [`Validatable`].
//!
//! Layers, leaves first:
//!
//! * [`selection`]: single-value state machine with validity.
//! * [`composer`]: deterministic reducer merging query, candidates,
//!   allow-list and preselect request into visible options, loading flag and
//!   selection.
//! * [`SearchSelect`]: async handle running fetches and fanning out outputs.

pub mod adapter;
pub mod composer;
pub mod config;
mod control;
mod fetch;
pub mod selection;
pub mod source;

pub use adapter::{ControlValueAccessor, Validatable, ValidationError, ValidationErrors};
pub use composer::{Composer, Input, Transition};
pub use config::{ConfigError, ControlConfig};
pub use control::{ControlEvent, SearchSelect};
pub use selection::{SelectionMachine, SelectionPhase, SelectionState};
pub use source::{CandidateSource, SourceError, StaticSource};
