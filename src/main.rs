//! brc - per-station min/mean/max over a measurements file
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use brc_pipeline::report::{Order, write_report};
use brc_pipeline::{CliArgs, Pipeline, PipelineConfig};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose);

    let config = PipelineConfig::from_args(&args).context("Invalid configuration")?;
    let pipeline = Pipeline::new(config).context("Invalid configuration")?;

    let input = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let profiler = match &args.cpuprofile {
        Some(path) => Some(profiling::start(path)?),
        None => None,
    };

    let result = pipeline
        .run(input)
        .with_context(|| format!("Failed to aggregate {}", args.input.display()))?;

    if let Some(profiler) = profiler {
        profiler.finish()?;
    }

    if result.stats.skipped > 0 {
        warn!(skipped = result.stats.skipped, "Malformed records were skipped");
    }

    let order = if args.unsorted {
        Order::Unsorted
    } else {
        Order::Sorted
    };

    write_output(&args.output, &result.stations, order)?;

    info!(
        stations = result.stations.len(),
        output = %args.output.display(),
        "Report written"
    );

    Ok(())
}

fn write_output(path: &Path, stations: &brc_pipeline::StationMap, order: Order) -> Result<()> {
    if path == Path::new("-") {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        write_report(&mut out, stations, order).context("Failed to write report to stdout")?;
        return Ok(());
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_report(&mut out, stations, order)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("brc_pipeline=debug,brc=debug,warn")
    } else {
        EnvFilter::new("brc_pipeline=info,brc=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(verbose)
        .init();
}

#[cfg(unix)]
mod profiling {
    use anyhow::{Context, Result};
    use pprof::ProfilerGuard;
    use std::fs::File;
    use std::path::{Path, PathBuf};
    use tracing::info;

    const FREQUENCY_HZ: i32 = 997;

    pub struct CpuProfiler {
        guard: ProfilerGuard<'static>,
        path: PathBuf,
    }

    pub fn start(path: &Path) -> Result<CpuProfiler> {
        let guard = pprof::ProfilerGuardBuilder::default()
            .frequency(FREQUENCY_HZ)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()
            .context("Could not start CPU profile")?;

        info!(path = %path.display(), "CPU profiling enabled");

        Ok(CpuProfiler {
            guard,
            path: path.to_path_buf(),
        })
    }

    impl CpuProfiler {
        pub fn finish(self) -> Result<()> {
            let report = self
                .guard
                .report()
                .build()
                .context("Could not build CPU profile")?;

            let file = File::create(&self.path)
                .with_context(|| format!("Could not create {}", self.path.display()))?;

            report
                .flamegraph(file)
                .context("Could not write CPU profile")?;

            info!(path = %self.path.display(), "CPU profile written");
            Ok(())
        }
    }
}

#[cfg(not(unix))]
mod profiling {
    use anyhow::{Result, bail};
    use std::path::Path;

    pub struct CpuProfiler;

    pub fn start(_path: &Path) -> Result<CpuProfiler> {
        bail!("CPU profiling is only supported on unix")
    }

    impl CpuProfiler {
        pub fn finish(self) -> Result<()> {
            Ok(())
        }
    }
}
