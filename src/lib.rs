//! brc_pipeline - per-station min/mean/max over very large measurement files
//!
//! The input is a text file of `<station>;<temperature>\n` records, the
//! temperature always written with exactly one decimal. Aggregation happens
//! in a single pass through a split-parse-reduce pipeline:
//!
//! - [`splitter`] reads fixed-size blocks and cuts them into whole-line chunks
//! - [`worker`] threads parse chunks into private per-station maps, using
//!   fixed-point tenths instead of floats
//! - [`reducer`] folds the partial maps into one global map
//! - [`pipeline`] wires them with bounded queues and sequences shutdown
//!
//! # Example
//!
//! ```no_run
//! use brc_pipeline::{Order, Pipeline, PipelineConfig, write_report};
//! use std::fs::File;
//!
//! let pipeline = Pipeline::new(PipelineConfig::default())?;
//! let result = pipeline.run(File::open("measurements.txt")?)?;
//! write_report(&mut std::io::stdout(), &result.stations, Order::Sorted)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod byte_buffer;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reducer;
pub mod report;
pub mod splitter;
pub mod station_map;
pub mod temperature;
pub mod worker;

pub use aggregate::StationAggregate;
pub use config::{CliArgs, MalformedPolicy, PipelineConfig};
pub use error::{PipelineError, Result};
pub use pipeline::{Aggregation, Pipeline, RunStats};
pub use report::{Order, write_report};
pub use station_map::StationMap;
