// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! repominer: mine per-author commit and diff history from a repository
//!
//! This binary crate drives one mining run of the repominer-git engine and
//! emits the resulting report as JSON for whatever stores it downstream.

use anyhow::{Context, Result};
use clap::Parser;
use repominer_git::{GitCli, Miner, MinerOptions, MiningReport};
use tracing::info;

mod config;

use config::Config;

fn main() -> Result<()> {
    let config = Config::parse();

    // Logs go to stderr so the report on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;

    let options = build_options(&config)?;
    let source = GitCli::new(&config.repo);

    info!(repo = %config.repo.display(), "mining repository");
    let report = Miner::with_options(&source, options).mine()?;
    info!(
        authors = report.ledger.author_count(),
        commits = report.ledger.total_commits(),
        issues = report.issues.len(),
        "mining finished"
    );

    write_report(&config, &report)
}

fn build_options(config: &Config) -> Result<MinerOptions> {
    let mut options = MinerOptions::default();
    if let Some(path) = config.releases_path() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("reading release manifest {}", path.display()))?;
        options = options.with_manifest(content);
    }
    if let Some(ref since) = config.since {
        options = options.since(since);
    }
    if config.branches {
        options = options.with_branches();
    }
    Ok(options)
}

fn write_report(config: &Config, report: &MiningReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("serializing report")?;
    match config.output {
        Some(ref path) => std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
