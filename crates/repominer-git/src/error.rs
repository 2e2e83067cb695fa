// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! Error types for repominer-git

use thiserror::Error;

/// Errors that can abort a mining pass
#[derive(Debug, Error)]
pub enum MineError {
    /// The repository produced no usable history bounds; the pass for this
    /// repository or checkpoint is abandoned
    #[error("Repository history unreadable: {reason}")]
    RepositoryUnreadable {
        /// What the failed query was after
        reason: String,
    },

    /// The history tool exited non-zero or could not be spawned
    #[error("History command failed ({command}): {detail}")]
    CommandFailed {
        /// The command line that was run
        command: String,
        /// Exit status and captured stderr, where available
        detail: String,
    },

    /// I/O error talking to the history tool
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
