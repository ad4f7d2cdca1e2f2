use clap::{Parser, Subcommand};
use sabridge_core::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sabridge")]
#[command(about = "Analytics event bridge replay tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSONL script of bridge calls against the in-memory engine
    Replay {
        /// Script with one `{"method": ..., "args": [...]}` call per line
        script: PathBuf,

        /// Append emitted events to this JSONL file
        #[arg(long)]
        events_out: Option<PathBuf>,

        /// Fixed anonymous id for the engine
        #[arg(long)]
        anonymous_id: Option<String>,
    },

    /// Show the module name and version
    Info,
}

fn main() -> Result<()> {
    let log_level = sabridge_core::logging::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    log_level.set_default_level(&config.bridge.log_level)?;

    match cli.command {
        Commands::Replay {
            script,
            events_out,
            anonymous_id,
        } => cmd_replay(config, script, events_out, anonymous_id),
        Commands::Info => {
            println!("{} {}", MODULE_NAME, MODULE_VERSION);
            Ok(())
        }
    }
}

fn cmd_replay(
    mut config: Config,
    script: PathBuf,
    events_out: Option<PathBuf>,
    anonymous_id: Option<String>,
) -> Result<()> {
    if events_out.is_some() {
        config.engine.events_path = events_out;
    }
    if anonymous_id.is_some() {
        config.engine.anonymous_id = anonymous_id;
    }

    let engine = Arc::new(MemoryEngine::from_config(&config)?);
    let bridge = Bridge::with_config(engine, &config.bridge);

    let reader = BufReader::new(File::open(&script)?);
    let mut invoked = 0;
    let mut rejected = 0;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        let call = match BridgeCall::parse(&line) {
            Ok(call) => call,
            Err(e) => {
                eprintln!("line {}: {}", line_num + 1, e);
                rejected += 1;
                continue;
            }
        };

        tracing::debug!("Invoking {} from line {}", call.method(), line_num + 1);
        match bridge.invoke(&call) {
            CallOutcome::Completed => {}
            CallOutcome::DistinctId(id) => println!("distinct_id: {}", id),
            CallOutcome::DistinctIdError(msg) => println!("distinct_id error: {}", msg),
        }
        invoked += 1;
    }

    println!("✓ {} calls replayed ({} rejected)", invoked, rejected);
    println!("✓ {} events recorded", bridge.engine().events().len());
    println!("profile: {}", serde_json::to_string(&bridge.engine().profile())?);

    Ok(())
}
