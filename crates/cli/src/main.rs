#![forbid(unsafe_code)]

//! `smiles-onehot`: read SMILES from stdin, one per line, and print their
//! one-hot encoding as JSON.
//!
//! ```bash
//! # fit a charset on the input and save it for later runs
//! printf 'CC1\nCCO\n' | smiles-onehot --max-length 8 --save-config enc.json
//!
//! # encode new strings with the saved charset
//! echo 'CCN' | smiles-onehot --config enc.json --dense
//! ```

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use onehot::{one_hot_indices, EncoderConfig};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "smiles-onehot",
    about = "Encode SMILES read from stdin as fixed-length one-hot tensors"
)]
struct Args {
    /// Positions per string; defaults to the longest input (or the saved config)
    #[arg(long)]
    max_length: Option<usize>,

    /// Load a saved encoder config instead of fitting a charset on the input
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the encoder config used for this run as JSON
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Print the full 0/1 tensor instead of one index per position
    #[arg(long)]
    dense: bool,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    charset: &'a [String],
    shape: [usize; 3],
    #[serde(skip_serializing_if = "Option::is_none")]
    indices: Option<Vec<Vec<usize>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    one_hot: Option<Vec<Vec<Vec<u8>>>>,
}

/// Non-empty trimmed lines.
fn read_smiles(input: impl BufRead) -> io::Result<Vec<String>> {
    let mut smiles = Vec::new();
    for line in input.lines() {
        let line = line?;
        let s = line.trim();
        if !s.is_empty() {
            smiles.push(s.to_string());
        }
    }
    Ok(smiles)
}

fn resolve_config(args: &Args, smiles: &[String]) -> Result<EncoderConfig> {
    let Some(path) = &args.config else {
        let longest = smiles.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        return Ok(EncoderConfig::fit(smiles, args.max_length.unwrap_or(longest)));
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let mut cfg: EncoderConfig = serde_json::from_str(&text)
        .with_context(|| format!("invalid encoder config {}", path.display()))?;
    if let Some(max_length) = args.max_length {
        cfg.max_length = max_length;
    }
    Ok(cfg)
}

fn build_report<'a>(cfg: &'a EncoderConfig, smiles: &[String], dense: bool) -> Result<Report<'a>> {
    let x = cfg.encode(smiles);
    let (batch, length, width) = x.dim();
    let (indices, one_hot) = if dense {
        let rows: Vec<Vec<Vec<u8>>> = x
            .outer_iter()
            .map(|sample| sample.outer_iter().map(|row| row.to_vec()).collect())
            .collect();
        (None, Some(rows))
    } else {
        let rows: Vec<Vec<usize>> = one_hot_indices(&x)?
            .outer_iter()
            .map(|sample| sample.to_vec())
            .collect();
        (Some(rows), None)
    };
    Ok(Report {
        charset: cfg.charset.tokens(),
        shape: [batch, length, width],
        indices,
        one_hot,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let smiles = read_smiles(io::stdin().lock()).context("failed to read SMILES from stdin")?;
    if smiles.is_empty() {
        warn!("no SMILES on stdin");
    }
    let cfg = resolve_config(&args, &smiles)?;
    info!(
        "encoding {} SMILES over {} tokens at length {}",
        smiles.len(),
        cfg.charset.size(),
        cfg.max_length
    );

    if let Some(path) = &args.save_config {
        let json = serde_json::to_string_pretty(&cfg)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        info!("saved encoder config to {}", path.display());
    }

    let report = build_report(&cfg, &smiles, args.dense)?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}
