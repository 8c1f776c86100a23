//! `jdm` CLI: reads a JDM document and an input record from disk (or
//! stdin) and prints the evaluated output. The evaluator's own host is an
//! HTTP service (spec.md §1, out of scope here); this binary is the
//! minimal non-HTTP harness for exercising `compile`/`evaluate` directly.

use std::fs;
use std::io::{self, Read as _};
use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "jdm")]
#[command(about = "Compile and evaluate a JSON Decision Model document", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the JDM document (JSON).
    #[arg(long)]
    pub document: PathBuf,

    /// Path to the input record (JSON). Reads stdin if omitted.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Pretty-print the resulting output.
    #[arg(long)]
    pub pretty: bool,
}

pub fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let doc_raw = fs::read_to_string(&cli.document)
        .map_err(|e| anyhow::anyhow!("failed to read document {}: {e}", cli.document.display()))?;
    let doc: crate::Document = serde_json::from_str(&doc_raw)?;

    let input: Value = match &cli.input {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|e| anyhow::anyhow!("failed to read input {}: {e}", path.display()))?;
            serde_json::from_str(&raw)?
        }
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            serde_json::from_str(&raw)?
        }
    };

    let plan = crate::compile(&doc).map_err(|e| anyhow::anyhow!("compile error: {e}"))?;
    let output = crate::evaluate(&plan, &input);

    if cli.pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}
