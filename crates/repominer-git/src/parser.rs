// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! Log line parsing
//!
//! This module walks the line-oriented output of a history-log query and
//! reconstructs typed [`CommitRecord`]s. The machine starts awaiting a commit
//! header, collects the author/date/message block, then hands each file
//! section to the diff scanner. Exhaustion of the line source in any state is
//! a normal termination signal and flushes whatever was accumulated.

use crate::commit::{AuthorIdentity, CommitDate, CommitRecord};
use crate::diff;
use crate::report::ParseIssue;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Marker strings that delimit the history stream.
///
/// These are configuration constants of the consumed format, not protocol the
/// engine defines; the defaults match the stock output of `git log -p`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers {
    /// Starts a commit header line
    pub commit: String,
    /// Starts the author line inside a commit header
    pub author: String,
    /// Starts the date line inside a commit header
    pub date: String,
    /// Starts the merge header of a merge commit
    pub merge: String,
    /// Starts a file section
    pub diff: String,
    /// Full prefix in front of the old-side path on a file marker line
    pub diff_path_prefix: String,
    /// Separator between the old-side and new-side paths
    pub path_separator: String,
    /// Announces a file introduced by the commit
    pub new_file: String,
    /// Announces a file removed by the commit
    pub deleted_file: String,
    /// Announces a mode-only change
    pub old_mode: String,
    /// Carries the pre-rename path
    pub rename_from: String,
    /// Carries the post-rename path
    pub rename_to: String,
    /// One-character marker of the "no newline at end of file" note
    pub no_newline: String,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            commit: "commit ".to_string(),
            author: "Author: ".to_string(),
            date: "Date:".to_string(),
            merge: "Merge: ".to_string(),
            diff: "diff ".to_string(),
            diff_path_prefix: "diff --git a/".to_string(),
            path_separator: " b/".to_string(),
            new_file: "new file mode".to_string(),
            deleted_file: "deleted file mode".to_string(),
            old_mode: "old mode".to_string(),
            rename_from: "rename from ".to_string(),
            rename_to: "rename to ".to_string(),
            no_newline: "\\".to_string(),
        }
    }
}

/// Peekable line source with explicit end-of-stream and line numbering.
///
/// Every consumer checks the returned `Option` instead of treating
/// exhaustion as an error; line numbers are 1-based and count consumed lines.
pub(crate) struct LineCursor<I: Iterator<Item = String>> {
    source: I,
    peeked: Option<Option<String>>,
    line_number: u64,
}

impl<I: Iterator<Item = String>> LineCursor<I> {
    pub(crate) fn new(source: I) -> Self {
        Self {
            source,
            peeked: None,
            line_number: 0,
        }
    }

    /// Look at the next line without consuming it
    pub(crate) fn peek(&mut self) -> Option<&str> {
        if self.peeked.is_none() {
            self.peeked = Some(self.source.next());
        }
        self.peeked.as_ref().and_then(|l| l.as_deref())
    }

    /// Consume and return the next line
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let line = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.source.next(),
        };
        if line.is_some() {
            self.line_number += 1;
        }
        line
    }

    /// Number of the most recently consumed line (1-based)
    pub(crate) fn line_number(&self) -> u64 {
        self.line_number
    }
}

/// What the line after a commit header turned out to be
enum HeaderShape {
    Author,
    Merge,
    Other,
    End,
}

/// Lazy stream of commits parsed from a line source.
///
/// Lines are pulled on demand, so memory stays bounded by one commit's
/// buffers rather than the whole history. Non-fatal issues accumulate and
/// are retrieved after exhaustion via [`CommitStream::into_issues`].
pub struct CommitStream<I: Iterator<Item = String>> {
    cursor: LineCursor<I>,
    markers: Markers,
    issues: Vec<ParseIssue>,
}

impl<I: Iterator<Item = String>> CommitStream<I> {
    /// Create a stream over a line source with the stock markers
    #[must_use]
    pub fn new(lines: I) -> Self {
        Self::with_markers(lines, Markers::default())
    }

    /// Create a stream with caller-supplied marker configuration
    #[must_use]
    pub fn with_markers(lines: I, markers: Markers) -> Self {
        Self {
            cursor: LineCursor::new(lines),
            markers,
            issues: Vec::new(),
        }
    }

    /// Issues recorded so far
    #[must_use]
    pub fn issues(&self) -> &[ParseIssue] {
        &self.issues
    }

    /// Consume the stream, returning all recorded issues
    #[must_use]
    pub fn into_issues(self) -> Vec<ParseIssue> {
        self.issues
    }

    fn header_shape(&mut self) -> HeaderShape {
        match self.cursor.peek() {
            None => HeaderShape::End,
            Some(l) if l.starts_with(&self.markers.author) => HeaderShape::Author,
            Some(l) if l.starts_with(&self.markers.merge) => HeaderShape::Merge,
            Some(_) => HeaderShape::Other,
        }
    }

    /// Parse one commit body; the header line has already been consumed
    fn parse_commit(&mut self, id: String) -> CommitRecord {
        let mut commit = CommitRecord::new(id);

        match self.header_shape() {
            HeaderShape::End => commit,
            HeaderShape::Author => {
                if let Some(line) = self.cursor.next_line() {
                    let payload = line.strip_prefix(&self.markers.author).unwrap_or(&line);
                    commit.author = AuthorIdentity::parse(payload);
                }
                self.parse_date(&mut commit);
                self.parse_message(&mut commit);
                self.parse_diffs(&mut commit);
                commit
            }
            HeaderShape::Merge => {
                // The merge header and the line after it are skipped; no diff
                // section follows in this mode. The commit itself is kept.
                self.cursor.next_line();
                self.cursor.next_line();
                debug!(commit = %commit.short_id(), "merge commit retained without diffs");
                commit
            }
            HeaderShape::Other => {
                self.issues.push(ParseIssue::malformed(
                    format!("commit {} has no author line", commit.short_id()),
                    self.cursor.line_number(),
                ));
                commit
            }
        }
    }

    /// The line after the author line is the date line
    fn parse_date(&mut self, commit: &mut CommitRecord) {
        if self
            .cursor
            .peek()
            .is_none_or(|l| l.starts_with(&self.markers.commit))
        {
            return;
        }
        let Some(line) = self.cursor.next_line() else {
            return;
        };
        match line.strip_prefix(&self.markers.date) {
            Some(payload) => {
                commit.date = CommitDate::parse(payload);
                if !commit.date.is_parsed() {
                    warn!(line = self.cursor.line_number(), "unparseable commit date");
                    self.issues.push(ParseIssue::malformed(
                        format!("unparseable date: {}", payload.trim()),
                        self.cursor.line_number(),
                    ));
                }
            }
            None => {
                commit.date = CommitDate::Opaque(line.clone());
                self.issues.push(ParseIssue::malformed(
                    format!("expected date line, got: {line}"),
                    self.cursor.line_number(),
                ));
            }
        }
    }

    /// Accumulate message lines until a blank line or a section marker
    fn parse_message(&mut self, commit: &mut CommitRecord) {
        // Blank separator between the header block and the message body
        if self.cursor.peek().is_some_and(|l| l.len() < 2) {
            self.cursor.next_line();
        }
        loop {
            enum Step {
                Take,
                ConsumeBlank,
                Stop,
            }
            let step = match self.cursor.peek() {
                None => Step::Stop,
                Some(l)
                    if l.starts_with(&self.markers.commit)
                        || l.starts_with(&self.markers.diff) =>
                {
                    Step::Stop
                }
                Some(l) if l.len() < 2 => Step::ConsumeBlank,
                Some(_) => Step::Take,
            };
            match step {
                Step::Take => {
                    if let Some(line) = self.cursor.next_line() {
                        commit.message.push_str(&line);
                        commit.message.push('\n');
                    }
                }
                Step::ConsumeBlank => {
                    self.cursor.next_line();
                    break;
                }
                Step::Stop => break,
            }
        }
    }

    /// Walk file sections until the commit's diff block ends
    fn parse_diffs(&mut self, commit: &mut CommitRecord) {
        loop {
            enum Step {
                Scan,
                Skip,
                Stop,
            }
            let step = match self.cursor.peek() {
                None => Step::Stop,
                Some(l)
                    if l.starts_with(&self.markers.commit)
                        || l.starts_with(&self.markers.no_newline)
                        || l.len() < 2 =>
                {
                    Step::Stop
                }
                Some(l) if l.starts_with(&self.markers.diff) => Step::Scan,
                Some(_) => Step::Skip,
            };
            match step {
                Step::Scan => {
                    let record =
                        diff::scan_section(&mut self.cursor, &self.markers, &mut self.issues);
                    commit.diffs.push(record);
                }
                Step::Skip => {
                    self.cursor.next_line();
                }
                Step::Stop => break,
            }
        }
    }
}

impl<I: Iterator<Item = String>> Iterator for CommitStream<I> {
    type Item = CommitRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.cursor.next_line()?;
            if let Some(rest) = line.strip_prefix(&self.markers.commit) {
                let id = rest.split_whitespace().next().unwrap_or("").to_string();
                if id.is_empty() {
                    self.issues.push(ParseIssue::malformed(
                        "commit marker without a hash",
                        self.cursor.line_number(),
                    ));
                }
                return Some(self.parse_commit(id));
            }
            // Anything else while awaiting a header is ignored
        }
    }
}

/// Result of a one-shot parse over a full line source
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLog {
    /// Commits in stream order
    pub commits: Vec<CommitRecord>,
    /// Non-fatal issues recorded while parsing
    pub issues: Vec<ParseIssue>,
}

/// Parse an entire line source in one call.
///
/// Convenience over [`CommitStream`] for callers that want the collected
/// commits and issues together.
#[must_use]
pub fn parse_log<I>(lines: I) -> ParsedLog
where
    I: IntoIterator<Item = String>,
{
    parse_log_with(lines, Markers::default())
}

/// [`parse_log`] with caller-supplied markers
#[must_use]
pub fn parse_log_with<I>(lines: I, markers: Markers) -> ParsedLog
where
    I: IntoIterator<Item = String>,
{
    let mut stream = CommitStream::with_markers(lines.into_iter(), markers);
    let commits: Vec<CommitRecord> = stream.by_ref().collect();
    ParsedLog {
        commits,
        issues: stream.into_issues(),
    }
}
