// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! Best-effort branch attribution
//!
//! For each commit the caller opted in on, one secondary containment query
//! lists the branches holding it. Failures shrink to an empty set; branch
//! attribution is enrichment, never load-bearing.

use crate::history::HistorySource;
use crate::report::ParseIssue;
use std::collections::BTreeSet;
use tracing::warn;

/// Resolves branch membership through a [`HistorySource`]
pub struct BranchResolver<'a, S: HistorySource> {
    source: &'a S,
}

impl<'a, S: HistorySource> BranchResolver<'a, S> {
    /// Create a resolver over a source
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Branches containing the commit; empty on query failure, with the
    /// failure recorded as a non-fatal issue
    pub fn resolve(&self, commit_id: &str, issues: &mut Vec<ParseIssue>) -> BTreeSet<String> {
        match self.source.branches_containing(commit_id) {
            Ok(lines) => clean_branch_listing(&lines),
            Err(err) => {
                warn!(commit = commit_id, error = %err, "branch containment query failed");
                issues.push(ParseIssue::branch_resolution(commit_id, err.to_string()));
                BTreeSet::new()
            }
        }
    }
}

/// Normalize raw branch-listing lines into a set of branch names.
///
/// Drops the current-branch marker, symbolic-ref arrows, and detached-HEAD
/// entries; keeps remote-tracking names as listed.
#[must_use]
pub fn clean_branch_listing(lines: &[String]) -> BTreeSet<String> {
    lines
        .iter()
        .map(|l| l.trim())
        .map(|l| l.strip_prefix("* ").unwrap_or(l))
        .filter(|l| !l.is_empty())
        .filter(|l| !l.contains("->"))
        .filter(|l| !l.starts_with('('))
        .map(str::to_string)
        .collect()
}
