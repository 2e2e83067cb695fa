// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! repominer-git: commit-diff mining for repominer
//!
//! This library crate walks the line-oriented output of a history-log query
//! and reconstructs structured per-author commit records, each carrying its
//! per-file diff payload, while tolerating the irregular shapes real history
//! streams produce.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use repominer_git::{GitCli, Miner, MinerOptions};
//!
//! let source = GitCli::new("/tmp/scratch/somerepo");
//! let report = Miner::with_options(&source, MinerOptions::default().with_branches())
//!     .mine()
//!     .expect("mine repository");
//!
//! for (author, activity) in report.ledger.authors() {
//!     println!("{author}: {} commit(s)", activity.total_commits);
//! }
//! ```

pub mod branch;
pub mod checkpoint;
pub mod commit;
pub mod diff;
pub mod error;
pub mod history;
pub mod ledger;
pub mod miner;
pub mod parser;
pub mod report;

pub use branch::BranchResolver;
pub use checkpoint::Checkpoint;
pub use commit::{AuthorIdentity, CommitDate, CommitRecord};
pub use diff::{ChangeKind, DiffRecord, HunkLine, HunkSign};
pub use error::MineError;
pub use history::{GitCli, HistorySource, LogLines};
pub use ledger::{AuthorActivity, AuthorLedger};
pub use miner::{Miner, MinerOptions};
pub use parser::{CommitStream, Markers, ParsedLog, parse_log, parse_log_with};
pub use report::{IssueKind, MiningReport, ParseIssue};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::commit::{AuthorIdentity, CommitRecord};
    pub use crate::diff::{ChangeKind, DiffRecord};
    pub use crate::error::MineError;
    pub use crate::history::{GitCli, HistorySource};
    pub use crate::ledger::AuthorLedger;
    pub use crate::miner::{Miner, MinerOptions};
    pub use crate::parser::parse_log;
    pub use crate::report::MiningReport;
}
