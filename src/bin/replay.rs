use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lob_engine::config::{LogConfig, LogFormat, Settings};
use lob_engine::engine::{Sequencer, state_digest};
use lob_engine::metrics::install_recorder;
use lob_engine::{Command, EngineError};

#[derive(Parser, Debug)]
#[command(name = "replay")]
struct Args {
    #[arg(long, default_value = "config/example.yaml")]
    config: String,
    /// JSON-lines command file; blank lines and `#` comments are skipped.
    #[arg(long)]
    script: PathBuf,
    /// Print the Prometheus exposition after the run.
    #[arg(long)]
    metrics: bool,
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load(&args.config)?;
    init_tracing(&settings.log);
    let prom = install_recorder()?;

    let script = tokio::fs::read_to_string(&args.script)
        .await
        .with_context(|| format!("reading {}", args.script.display()))?;

    let (sequencer, handle) = Sequencer::spawn(settings.engine(), settings.sequencer.queue_capacity);
    let mut applied = 0usize;
    for (line_no, line) in script.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command: Command =
            serde_json::from_str(line).with_context(|| format!("line {}: invalid command", line_no + 1))?;
        match sequencer.submit(command).await {
            Ok(outcome) => println!("{}", serde_json::to_string(&outcome)?),
            Err(EngineError::EngineStopped) => anyhow::bail!("sequencer stopped at line {}", line_no + 1),
            Err(err) => println!(
                "{}",
                serde_json::json!({ "status": "rejected", "reason": err.kind(), "message": err.to_string() })
            ),
        }
        applied += 1;
    }

    let depth = sequencer.depth(settings.snapshot_depth).await?;
    println!("{}", serde_json::to_string(&depth)?);

    drop(sequencer);
    let engine = handle.await?;
    let snapshot = engine.snapshot();
    info!(market = %engine.market(), applied, resting = engine.len(), "replay finished");
    println!("state_hash={}", state_digest(&snapshot)?);

    if args.metrics {
        print!("{}", prom.render());
    }
    Ok(())
}
