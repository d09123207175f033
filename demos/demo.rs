//! Demo application: hammer a few striped counters from many threads and
//! print what they hold.
//!
//! Run with:
//! ```bash
//! RUST_LOG=stripe_adder=debug cargo run --example demo --features demo -- --help
//! ```

use clap::{Parser, ValueEnum};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Instant;
use stripe_adder::counters::long_accumulator::LongAccumulator;
use stripe_adder::counters::long_adder::LongAdder;
use stripe_adder::counters::Observable;
use stripe_adder::observers::json::JsonObserver;
use stripe_adder::observers::table::{TableObserver, TableStyle};
use stripe_adder::observers::Result;
use stripe_adder::striped::probe::Probe;
use tracing_subscriber::EnvFilter;

/// Output format for the final report.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Pretty ASCII table
    Table,
    /// Compact table with multiple columns
    Compact,
    /// JSON format
    Json,
}

/// Table style selection.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StyleChoice {
    Ascii,
    #[default]
    Rounded,
    Sharp,
    Modern,
    Markdown,
    Blank,
}

impl From<StyleChoice> for TableStyle {
    fn from(choice: StyleChoice) -> Self {
        match choice {
            StyleChoice::Ascii => TableStyle::Ascii,
            StyleChoice::Rounded => TableStyle::Rounded,
            StyleChoice::Sharp => TableStyle::Sharp,
            StyleChoice::Modern => TableStyle::Modern,
            StyleChoice::Markdown => TableStyle::Markdown,
            StyleChoice::Blank => TableStyle::Blank,
        }
    }
}

/// Demo application for stripe-adder.
///
/// Spawns writer threads that each own a probe and update a shared adder and
/// two accumulators, then prints the counters in the requested format.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Table style (for table/compact formats)
    #[arg(short, long, value_enum, default_value = "rounded")]
    style: StyleChoice,

    /// Number of columns (for compact format)
    #[arg(short, long, default_value = "3")]
    columns: usize,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,

    /// Number of writer threads
    #[arg(short, long, default_value = "8")]
    threads: usize,

    /// Updates per writer thread
    #[arg(short, long, default_value = "1000000")]
    iterations: usize,

    /// Cap on the number of cells (defaults to the available parallelism)
    #[arg(long)]
    max_stripes: Option<usize>,

    /// Use detached probes, which never remember their stripe
    #[arg(long)]
    detached: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_names(true)
        .init();

    let args = Args::parse();

    let mut events = LongAdder::new().with_name("events");
    if let Some(stripes) = args.max_stripes {
        events = events.with_max_stripes(stripes);
    }
    let events = Arc::new(events);
    let peak = Arc::new(LongAccumulator::max().with_name("peak_iteration"));
    let floor = Arc::new(LongAccumulator::min().with_name("floor_thread"));

    let barrier = Arc::new(Barrier::new(args.threads));
    let started = Instant::now();
    let handles: Vec<_> = (0..args.threads)
        .map(|t| {
            let events = Arc::clone(&events);
            let peak = Arc::clone(&peak);
            let floor = Arc::clone(&floor);
            let barrier = Arc::clone(&barrier);
            let detached = args.detached;
            let iterations = args.iterations;
            thread::Builder::new()
                .name(format!("writer-{t}"))
                .spawn(move || {
                    let mut probe = if detached {
                        Probe::detached()
                    } else {
                        Probe::new()
                    };
                    barrier.wait();
                    for i in 0..iterations {
                        events.increment(&mut probe);
                        peak.accumulate(&mut probe, i as i64);
                    }
                    floor.accumulate(&mut probe, t as i64);
                })
        })
        .collect::<std::io::Result<_>>()?;

    for handle in handles {
        if handle.join().is_err() {
            tracing::error!("writer thread panicked");
        }
    }
    let elapsed = started.elapsed();

    tracing::info!(
        threads = args.threads,
        iterations = args.iterations,
        stripes = events.stripes(),
        max_stripes = events.max_stripes(),
        elapsed_ms = elapsed.as_millis() as u64,
        "writers finished"
    );

    let counters: Vec<&dyn Observable> = vec![events.as_ref(), peak.as_ref(), floor.as_ref()];
    let stdout = std::io::stdout();
    match args.format {
        OutputFormat::Table => TableObserver::new()
            .with_style(args.style.into())
            .with_title(format!("{} threads x {} updates", args.threads, args.iterations))
            .write_to(stdout.lock(), counters.into_iter()),
        OutputFormat::Compact => TableObserver::new()
            .compact(true)
            .columns(args.columns)
            .with_style(args.style.into())
            .write_to(stdout.lock(), counters.into_iter()),
        OutputFormat::Json => JsonObserver::new()
            .pretty(args.pretty)
            .wrap_in_snapshot(true)
            .include_timestamp(true)
            .write_to(stdout.lock(), counters.into_iter()),
    }
}
