//! Candidate source contract and an in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use roster_model::{Candidate, Category};
use thiserror::Error;

/// Failure reported by a [`CandidateSource`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
	/// The backing service rejected or failed the lookup.
	#[error("candidate source unavailable for {category}: {message}")]
	Unavailable { category: Category, message: String },

	/// The source has no data set for this category.
	#[error("unknown category: {0}")]
	UnknownCategory(Category),
}

impl SourceError {
	pub fn unavailable(category: Category, message: impl Into<String>) -> Self {
		Self::Unavailable {
			category,
			message: message.into(),
		}
	}

	pub const fn category(&self) -> Category {
		match self {
			Self::Unavailable { category, .. } => *category,
			Self::UnknownCategory(category) => *category,
		}
	}
}

/// Asynchronous lookup of the candidates belonging to one category.
///
/// Implementations are called at most once per fetch generation and are never
/// retried by the control.
#[async_trait::async_trait]
pub trait CandidateSource: Send + Sync + 'static {
	async fn fetch(&self, category: Category) -> Result<Vec<Candidate>, SourceError>;
}

/// In-memory source with optional artificial latency.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
	roster: HashMap<Category, Arc<[Candidate]>>,
	latency: Duration,
}

impl StaticSource {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the candidate set served for `category`.
	pub fn with_candidates(mut self, category: Category, candidates: Vec<Candidate>) -> Self {
		self.roster.insert(category, candidates.into());
		self
	}

	/// Delays every fetch by `latency`.
	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = latency;
		self
	}
}

#[async_trait::async_trait]
impl CandidateSource for StaticSource {
	async fn fetch(&self, category: Category) -> Result<Vec<Candidate>, SourceError> {
		if !self.latency.is_zero() {
			tokio::time::sleep(self.latency).await;
		}
		self.roster
			.get(&category)
			.map(|candidates| candidates.to_vec())
			.ok_or(SourceError::UnknownCategory(category))
	}
}
