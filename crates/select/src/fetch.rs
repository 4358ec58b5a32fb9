use std::future::Future;
use std::sync::OnceLock;

use roster_model::Category;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Generation-scoped cancellation handle for one candidate fetch.
///
/// A ticket is superseded as soon as the composer begins a newer generation;
/// the superseded ticket is cancelled so its task drops the result.
#[derive(Debug, Clone)]
pub(crate) struct FetchTicket {
	generation: u64,
	category: Category,
	cancel: CancellationToken,
}

impl FetchTicket {
	pub fn new(generation: u64, category: Category) -> Self {
		Self {
			generation,
			category,
			cancel: CancellationToken::new(),
		}
	}

	pub const fn generation(&self) -> u64 {
		self.generation
	}

	pub const fn category(&self) -> Category {
		self.category
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Future resolving when cancellation is requested.
	pub async fn cancelled(&self) {
		self.cancel.cancelled().await;
	}
}

fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("roster-fetch")
			.build()
			.expect("failed to build roster-select fetch runtime")
	});
	runtime.handle().clone()
}

/// Spawns a fetch task on the current runtime, or on a shared fallback
/// runtime when called outside of one.
pub(crate) fn spawn<F>(ticket: &FetchTicket, fut: F) -> JoinHandle<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	tracing::trace!(generation = ticket.generation(), category = %ticket.category(), "select.fetch.spawn");
	runtime_handle().spawn(fut)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn cancelled_resolves_after_cancel() {
		let ticket = FetchTicket::new(3, Category::Advisor);
		let observer = ticket.clone();
		assert!(!observer.is_cancelled());

		ticket.cancel();
		observer.cancelled().await;
		assert!(observer.is_cancelled());
		assert_eq!(observer.generation(), 3);
		assert_eq!(observer.category(), Category::Advisor);
	}

	#[test]
	fn spawn_outside_runtime_uses_fallback() {
		let ticket = FetchTicket::new(1, Category::Assistant);
		let (tx, rx) = std::sync::mpsc::channel();
		let handle = spawn(&ticket, async move {
			let _ = tx.send(42u32);
		});
		assert_eq!(rx.recv_timeout(std::time::Duration::from_secs(2)), Ok(42));
		drop(handle);
	}
}
