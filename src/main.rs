//! # AgFlight CLI
//!
//! Decode captured flight-record blobs into GeoJSON files.
//!
//! Each input file is decoded on its own blocking task under a wall-clock
//! limit, so one pathological blob can neither hang nor kill a batch run.
//! Every record that decodes gets a `<stem>.geojson` next to the others in
//! the output directory, and the run finishes with a `decode_summary.json`
//! listing what was produced.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Set up logging with tracing subscriber
//!    - Load the TOML configuration (defaults when none is given)
//!    - Load optional caller metadata to merge into every GeoJSON
//!
//! 2. **Decode**
//!    - Spawn one task per input file
//!    - Each task reads the blob, decodes it under the timeout, and
//!      writes the GeoJSON output
//!
//! 3. **Summary**
//!    - Write `decode_summary.json` with one entry per decoded record
//!    - Exit non-zero if any record failed
//!
//! # Examples
//!
//! Run against captured blobs:
//! ```bash
//! agflight --out-dir out --pretty captures/*.bin
//! ```
//!
//! Expected output:
//! ```text
//! INFO agflight: AgFlight v0.1.0 starting...
//! INFO agflight: captures/FL001.bin: 48212 bytes
//! INFO agflight: captures/FL001.bin -> out/FL001.geojson (412 points)
//! INFO agflight: Decoded 1 of 1 records
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use bytes::Bytes;
use clap::Parser;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::time::{timeout, Duration};
use tracing::{info, warn};

use agflight::config::DecoderConfig;
use agflight::decoder::FlightDecoder;

/// Decode agricultural drone flight-record blobs into GeoJSON
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Raw record blobs to decode
    #[arg(required = true, value_name = "RECORD")]
    inputs: Vec<PathBuf>,

    /// TOML configuration file (built-in defaults when omitted)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON object merged into every GeoJSON's collection properties
    #[arg(long, value_name = "FILE")]
    metadata: Option<PathBuf>,

    /// Directory for .geojson outputs and the run summary
    #[arg(long, default_value = ".", value_name = "DIR")]
    out_dir: PathBuf,

    /// Pretty-print the GeoJSON output
    #[arg(long)]
    pretty: bool,

    /// Wall-clock limit per record decode, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

/// One line of the run summary
#[derive(Debug, Serialize)]
struct RecordSummary {
    input: String,
    output: String,
    points: usize,
}

#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    generated_at: String,
    records: &'a [RecordSummary],
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into())
        )
        .init();

    let cli = Cli::parse();

    info!("AgFlight v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => DecoderConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DecoderConfig::default(),
    };
    let decoder = Arc::new(FlightDecoder::new(config).context("invalid decoder configuration")?);

    let metadata = match &cli.metadata {
        Some(path) => Some(Arc::new(load_metadata(path)?)),
        None => None,
    };

    tokio::fs::create_dir_all(&cli.out_dir)
        .await
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;

    let limit = Duration::from_secs(cli.timeout_secs);
    let mut handles = Vec::with_capacity(cli.inputs.len());
    for input in &cli.inputs {
        let decoder = Arc::clone(&decoder);
        let metadata = metadata.clone();
        let input = input.clone();
        let out_dir = cli.out_dir.clone();
        let pretty = cli.pretty;

        handles.push(tokio::spawn(async move {
            let outcome = process_record(
                decoder,
                &input,
                &out_dir,
                metadata.as_deref(),
                pretty,
                limit,
            )
            .await;
            (input, outcome)
        }));
    }

    let total = handles.len();
    let mut summaries = Vec::with_capacity(total);
    let mut failures = 0usize;
    for handle in handles {
        let (input, outcome) = handle.await.context("decode task panicked")?;
        match outcome {
            Ok(summary) => {
                info!(
                    "{} -> {} ({} points)",
                    summary.input, summary.output, summary.points
                );
                summaries.push(summary);
            }
            Err(e) => {
                failures += 1;
                warn!("Failed to process {}: {:#}", input.display(), e);
            }
        }
    }

    write_summary(&cli.out_dir, &summaries).await?;
    info!("Decoded {} of {} records", summaries.len(), total);

    if failures > 0 {
        bail!("{} of {} records failed", failures, total);
    }
    Ok(())
}

/// Decodes one record file and writes its GeoJSON output.
async fn process_record(
    decoder: Arc<FlightDecoder>,
    input: &Path,
    out_dir: &Path,
    metadata: Option<&Map<String, Value>>,
    pretty: bool,
    limit: Duration,
) -> Result<RecordSummary> {
    let raw = tokio::fs::read(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let buffer = Bytes::from(raw);
    info!("{}: {} bytes", input.display(), buffer.len());

    // Decoding is pure CPU work; run it off the async runtime. On timeout
    // the blocking task is abandoned to finish on its own, only the wait
    // is cancelled.
    let task_decoder = Arc::clone(&decoder);
    let task_buffer = buffer.clone();
    let flight = timeout(
        limit,
        tokio::task::spawn_blocking(move || task_decoder.decode(&task_buffer)),
    )
    .await
    .map_err(|_| anyhow::anyhow!("decode timed out after {}s", limit.as_secs()))?
    .context("decode task panicked")?;

    let geojson = decoder.to_geojson(&flight, metadata);
    let out_path = output_path(input, out_dir);
    let body = if pretty {
        serde_json::to_vec_pretty(&geojson)?
    } else {
        serde_json::to_vec(&geojson)?
    };
    tokio::fs::write(&out_path, body)
        .await
        .with_context(|| format!("writing {}", out_path.display()))?;

    Ok(RecordSummary {
        input: input.display().to_string(),
        output: out_path.display().to_string(),
        points: flight.total_points(),
    })
}

/// `<out_dir>/<input stem>.geojson`
fn output_path(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("record");
    out_dir.join(format!("{stem}.geojson"))
}

/// Reads the metadata file, which must hold a single JSON object.
fn load_metadata(path: &Path) -> Result<Map<String, Value>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading metadata from {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("metadata file {} must contain a JSON object", path.display()),
    }
}

/// Writes `decode_summary.json` describing the run.
async fn write_summary(out_dir: &Path, records: &[RecordSummary]) -> Result<()> {
    let summary = RunSummary {
        generated_at: chrono::Utc::now().to_rfc3339(),
        records,
    };
    let path = out_dir.join("decode_summary.json");
    tokio::fs::write(&path, serde_json::to_vec_pretty(&summary)?)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Run summary written to {}", path.display());
    Ok(())
}
