use clap::{Parser, ValueEnum};
use serde::Serialize;

#[derive(ValueEnum, Clone, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
  Text,
  Binary,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
  /// Path to the layout file ('_' = open cell, 'X' = wall).
  pub structure: String,

  /// Path to the word list, one word per line.
  pub words: String,

  /// Write the solved grid here instead of stdout.
  #[arg(long)]
  pub output: Option<String>,

  #[arg(long, default_value = "text")]
  pub format: OutputFormat,

  /// Search in plain order instead of MRV/LCV order.
  #[arg(long)]
  pub no_heuristics: bool,
}
