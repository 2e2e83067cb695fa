// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! Mining pipeline
//!
//! Drives one repository end to end: enumerate checkpoints, check each one
//! out, stream and parse its log, optionally enrich commits with branch
//! membership, and accumulate everything into a single [`MiningReport`]. A
//! failing checkpoint is recorded and skipped; its siblings still contribute.

use crate::branch::BranchResolver;
use crate::checkpoint::{self, Checkpoint};
use crate::error::MineError;
use crate::history::HistorySource;
use crate::parser::CommitStream;
use crate::report::{MiningReport, ParseIssue};
use tracing::{info, warn};

/// Configuration for one mining run
#[derive(Debug, Clone, Default)]
pub struct MinerOptions {
    /// Release manifest content, one identifier per line; `None` triggers
    /// the yearly sweep
    pub manifest: Option<String>,
    /// ISO date lower bound forwarded to the log query
    pub since: Option<String>,
    /// Run the per-commit branch containment query
    pub resolve_branches: bool,
}

impl MinerOptions {
    /// Use an explicit release manifest
    #[must_use]
    pub fn with_manifest(mut self, content: impl Into<String>) -> Self {
        self.manifest = Some(content.into());
        self
    }

    /// Only mine commits at or after this ISO date
    #[must_use]
    pub fn since(mut self, date: impl Into<String>) -> Self {
        self.since = Some(date.into());
        self
    }

    /// Enable branch attribution
    #[must_use]
    pub fn with_branches(mut self) -> Self {
        self.resolve_branches = true;
        self
    }
}

/// One repository's mining pipeline over a [`HistorySource`]
pub struct Miner<'a, S: HistorySource> {
    source: &'a S,
    options: MinerOptions,
}

impl<'a, S: HistorySource> Miner<'a, S> {
    /// Pipeline with default options (yearly sweep, no branch attribution)
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            options: MinerOptions::default(),
        }
    }

    /// Pipeline with caller-supplied options
    #[must_use]
    pub fn with_options(source: &'a S, options: MinerOptions) -> Self {
        Self { source, options }
    }

    /// Run the pipeline and return whatever ledger it managed to build.
    ///
    /// An empty checkpoint list (an empty manifest, or a sweep that found
    /// nothing) degrades to a single pass over the current checkout.
    ///
    /// # Errors
    ///
    /// Returns `MineError::RepositoryUnreadable` when checkpoint enumeration
    /// itself fails; per-checkpoint failures become issues instead.
    pub fn mine(&self) -> Result<MiningReport, MineError> {
        let checkpoints =
            checkpoint::enumerate(self.source, self.options.manifest.as_deref())?;
        let mut report = MiningReport::default();

        if checkpoints.is_empty() {
            info!("no checkpoints; mining current checkout");
            self.mine_pass(None, &mut report);
            return Ok(report);
        }

        info!(count = checkpoints.len(), "replaying checkpoints");
        for checkpoint in &checkpoints {
            if let Err(err) = self.source.checkout(&checkpoint.rev()) {
                warn!(
                    checkpoint = %checkpoint.label(),
                    error = %err,
                    "checkout failed; checkpoint abandoned"
                );
                report.issues.push(ParseIssue::checkpoint_abandoned(
                    &checkpoint.label(),
                    err.to_string(),
                ));
                continue;
            }
            self.mine_pass(Some(checkpoint), &mut report);
        }

        Ok(report)
    }

    /// Parse one checkout's log stream into the shared report
    fn mine_pass(&self, checkpoint: Option<&Checkpoint>, report: &mut MiningReport) {
        let label = checkpoint.map_or_else(|| "working-tree".to_string(), Checkpoint::label);

        let mut lines = match self.source.log_stream(self.options.since.as_deref()) {
            Ok(lines) => lines,
            Err(err) => {
                warn!(checkpoint = %label, error = %err, "log query failed; checkpoint abandoned");
                report
                    .issues
                    .push(ParseIssue::checkpoint_abandoned(&label, err.to_string()));
                return;
            }
        };

        let resolver = BranchResolver::new(self.source);
        let mut stream = CommitStream::new(&mut lines);
        let mut commit_count = 0usize;
        for mut commit in stream.by_ref() {
            if self.options.resolve_branches {
                commit.branches = resolver.resolve(&commit.id, &mut report.issues);
            }
            commit_count += 1;
            report.ledger.record(commit);
        }
        report.issues.extend(stream.into_issues());

        let decode_failures = lines.decode_failures();
        if decode_failures > 0 {
            report
                .issues
                .push(ParseIssue::decode_failures(decode_failures));
        }

        info!(checkpoint = %label, commits = commit_count, "checkpoint mined");
    }
}
