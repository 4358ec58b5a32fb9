//! Roster demo host.
//!
//! Plays the part of a host form: builds a search-select control over an
//! in-memory roster, waits for the initial load, replays queries from the
//! command line and prints what the form would render.

mod fixture;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use roster_model::display_text;
use roster_select::{ControlEvent, ControlValueAccessor, SearchSelect, Validatable};
use tracing::{info, warn};

/// Demo command line arguments.
#[derive(Parser, Debug)]
#[command(name = "roster-demo")]
#[command(about = "Drive the roster search-select control from the command line")]
struct Args {
	/// TOML file with a `[control]` table and optional `[[candidates]]`
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Artificial fetch latency in milliseconds
	#[arg(long, value_name = "MS", default_value_t = 250)]
	latency_ms: u64,

	/// Search text to apply, in order (repeatable)
	#[arg(short, long = "query", value_name = "TEXT")]
	queries: Vec<String>,

	/// Identifier to pick from the visible options after the last query
	#[arg(short, long, value_name = "ID")]
	pick: Option<String>,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	setup_tracing(args.verbose);

	let demo = match &args.config {
		Some(path) => fixture::DemoFile::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => fixture::DemoFile::default(),
	};
	let roster = demo.roster();
	info!(
		category = %demo.control.category,
		candidates = roster.len(),
		latency_ms = args.latency_ms,
		"starting roster demo"
	);

	let source = fixture::source_for(&roster).with_latency(Duration::from_millis(args.latency_ms));
	let control = SearchSelect::with_config(Arc::new(source), demo.control);
	control.register_on_change(|value| info!(value = %display_text(value), "value changed"));
	let mut events = control.subscribe_events();

	let label = control.label();
	if !label.is_empty() {
		println!("[{label}]");
	}
	println!("loading...");
	let mut loading = control.subscribe_loading();
	loading.wait_for(|busy| !*busy).await.context("control dropped while loading")?;
	print_visible(&control);

	for query in &args.queries {
		control.set_query(query.as_str());
		println!("query {query:?}");
		print_visible(&control);
	}

	if let Some(identifier) = args.pick {
		match control.visible().iter().find(|c| c.identifier == identifier) {
			Some(candidate) => control.choose(candidate.clone()),
			None => warn!(identifier, "pick is not among the visible options"),
		}
	}

	while let Ok(event) = events.try_recv() {
		if let ControlEvent::FetchFailed(error) = event {
			eprintln!("fetch failed: {error}");
		}
	}

	let selection = control.selection();
	println!("selected: {}", selection.display_text);
	match control.validate() {
		None => println!("valid"),
		Some(errors) => println!("invalid: {errors}"),
	}
	Ok(())
}

fn print_visible(control: &SearchSelect) {
	let visible = control.visible();
	if visible.is_empty() {
		println!("  (no options)");
	}
	for candidate in visible.iter() {
		println!("  {:>8}  {}", candidate.identifier, candidate.display_text());
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("roster_select=debug,roster_demo=debug,info")
		} else {
			EnvFilter::new("roster_select=info,roster_demo=info,warn")
		}
	});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
