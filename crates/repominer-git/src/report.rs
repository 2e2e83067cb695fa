// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! Mining run output: the author ledger plus non-fatal issue observability

use crate::ledger::AuthorLedger;
use serde::{Deserialize, Serialize};

/// Category of a non-fatal issue encountered during a mining pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A header line (commit, date, or diff marker) did not match the
    /// expected shape; a best-effort record was emitted instead
    MalformedHeader,
    /// Bytes in the stream were not valid UTF-8 and were replaced
    DecodeFailure,
    /// A branch containment query failed; the commit kept an empty branch set
    BranchResolution,
    /// A checkpoint's checkout or log query failed; its contribution was
    /// skipped while sibling checkpoints proceeded
    CheckpointAbandoned,
}

/// A recovered, non-fatal problem observed while mining
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseIssue {
    /// Issue category
    pub kind: IssueKind,
    /// Human-readable description
    pub detail: String,
    /// 1-based line number in the source stream, where known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

impl ParseIssue {
    /// Issue for a header line that did not match its expected shape
    #[must_use]
    pub fn malformed(detail: impl Into<String>, line: u64) -> Self {
        Self {
            kind: IssueKind::MalformedHeader,
            detail: detail.into(),
            line: Some(line),
        }
    }

    /// Issue summarizing lossy decoding over a whole stream
    #[must_use]
    pub fn decode_failures(count: usize) -> Self {
        Self {
            kind: IssueKind::DecodeFailure,
            detail: format!("{count} line(s) contained bytes replaced during decoding"),
            line: None,
        }
    }

    /// Issue for a failed branch containment query
    #[must_use]
    pub fn branch_resolution(commit_id: &str, detail: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::BranchResolution,
            detail: format!("{}: {}", commit_id, detail.into()),
            line: None,
        }
    }

    /// Issue for a checkpoint whose contribution was abandoned
    #[must_use]
    pub fn checkpoint_abandoned(checkpoint: &str, detail: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::CheckpointAbandoned,
            detail: format!("{}: {}", checkpoint, detail.into()),
            line: None,
        }
    }
}

/// Everything one mining run produced: the ledger that was built plus the
/// non-fatal issues encountered along the way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiningReport {
    /// Per-author aggregation of parsed commits
    pub ledger: AuthorLedger,
    /// Non-fatal issues, in encounter order
    pub issues: Vec<ParseIssue>,
}

impl MiningReport {
    /// Whether the run finished without recovered issues
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Count issues of one category
    #[must_use]
    pub fn issue_count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}
