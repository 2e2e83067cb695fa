// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! Per-file diff sections: typed records and the section scanner
//!
//! The scanner consumes one `diff --git` section of the history stream,
//! classifying its pseudo-headers (new/deleted file, mode change, rename)
//! and extracting the added/removed hunk lines. It is invoked by the log
//! parser once per file marker and leaves the cursor on the line that ended
//! the section.

use crate::parser::{LineCursor, Markers};
use crate::report::ParseIssue;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Structural classification of a file section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Content change to an existing file
    Modified,
    /// File introduced by this commit
    Added,
    /// File removed by this commit (hunks are never recorded)
    Deleted,
    /// File moved; carries the pre-rename path
    RenamedFrom(String),
}

/// Whether a hunk line was added or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HunkSign {
    /// Line added (`+` prefix)
    Add,
    /// Line removed (`-` prefix)
    Remove,
}

/// A single added/removed line inside a file section, sign stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HunkLine {
    /// Direction of the change
    pub sign: HunkSign,
    /// Line content without its sign character
    pub text: String,
}

impl HunkLine {
    /// An added line
    #[must_use]
    pub fn add(text: impl Into<String>) -> Self {
        Self {
            sign: HunkSign::Add,
            text: text.into(),
        }
    }

    /// A removed line
    #[must_use]
    pub fn remove(text: impl Into<String>) -> Self {
        Self {
            sign: HunkSign::Remove,
            text: text.into(),
        }
    }
}

/// One file's worth of change inside a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord {
    /// Path of the file, empty when the marker line was unparseable
    pub file_path: String,
    /// Structural classification of the section
    pub change_kind: ChangeKind,
    /// Added/removed lines in stream order
    pub hunk_lines: Vec<HunkLine>,
}

impl DiffRecord {
    /// Count of added lines
    #[must_use]
    pub fn added(&self) -> usize {
        self.hunk_lines
            .iter()
            .filter(|h| h.sign == HunkSign::Add)
            .count()
    }

    /// Count of removed lines
    #[must_use]
    pub fn removed(&self) -> usize {
        self.hunk_lines
            .iter()
            .filter(|h| h.sign == HunkSign::Remove)
            .count()
    }
}

/// Pseudo-header classification outcome, owned so the cursor can advance
enum PseudoHeader {
    NewFile,
    DeletedFile,
    OldMode,
    RenameFrom(String),
    RenameTo(String),
    Index,
    HunkContent,
}

fn classify_pseudo_header(line: &str, markers: &Markers) -> PseudoHeader {
    if line.starts_with(&markers.new_file) {
        PseudoHeader::NewFile
    } else if line.starts_with(&markers.deleted_file) {
        PseudoHeader::DeletedFile
    } else if line.starts_with(&markers.old_mode) {
        PseudoHeader::OldMode
    } else if let Some(path) = line.strip_prefix(&markers.rename_from) {
        PseudoHeader::RenameFrom(path.to_string())
    } else if let Some(path) = line.strip_prefix(&markers.rename_to) {
        PseudoHeader::RenameTo(path.to_string())
    } else if line.starts_with("similarity index")
        || line.starts_with("dissimilarity index")
        || line.starts_with("index ")
    {
        PseudoHeader::Index
    } else {
        PseudoHeader::HunkContent
    }
}

/// True for lines that end a section without being hunk content: the next
/// file marker, the next commit header, the no-newline marker, or a blank
fn ends_section(line: &str, markers: &Markers) -> bool {
    line.starts_with(&markers.diff)
        || line.starts_with(&markers.commit)
        || line.starts_with(&markers.no_newline)
        || line.len() < 2
}

/// Scan one file section starting at its `diff` marker line.
///
/// Always produces a `DiffRecord`; a malformed marker line yields an empty
/// file path and a recorded issue rather than aborting the commit. On return
/// the cursor rests on the line that terminated the section (or at end of
/// stream).
pub(crate) fn scan_section<I>(
    cursor: &mut LineCursor<I>,
    markers: &Markers,
    issues: &mut Vec<ParseIssue>,
) -> DiffRecord
where
    I: Iterator<Item = String>,
{
    let Some(marker_line) = cursor.next_line() else {
        return DiffRecord {
            file_path: String::new(),
            change_kind: ChangeKind::Modified,
            hunk_lines: Vec::new(),
        };
    };

    let file_path = match marker_line
        .strip_prefix(&markers.diff_path_prefix)
        .and_then(|rest| {
            rest.find(&markers.path_separator)
                .map(|idx| rest[..idx].to_string())
        }) {
        Some(path) => path,
        None => {
            warn!(line = cursor.line_number(), "unparseable diff marker line");
            issues.push(ParseIssue::malformed(
                format!("unparseable diff marker: {marker_line}"),
                cursor.line_number(),
            ));
            String::new()
        }
    };

    let mut record = DiffRecord {
        file_path,
        change_kind: ChangeKind::Modified,
        hunk_lines: Vec::new(),
    };

    // Pseudo-headers come before any hunk content
    loop {
        let Some(line) = cursor.peek() else {
            return record;
        };
        match classify_pseudo_header(line, markers) {
            PseudoHeader::NewFile => {
                record.change_kind = ChangeKind::Added;
                cursor.next_line();
                // One extra header line sits between the mode line and the
                // hunks; never consume a marker that starts something new
                if cursor
                    .peek()
                    .is_some_and(|l| !l.starts_with(&markers.diff) && !l.starts_with(&markers.commit))
                {
                    cursor.next_line();
                }
                break;
            }
            PseudoHeader::DeletedFile => {
                record.change_kind = ChangeKind::Deleted;
                cursor.next_line();
                skip_section(cursor, markers);
                return record;
            }
            PseudoHeader::OldMode => {
                // Mode-only change; the section carries no content hunks
                cursor.next_line();
                skip_section(cursor, markers);
                return record;
            }
            PseudoHeader::RenameFrom(path) => {
                record.change_kind = ChangeKind::RenamedFrom(path);
                cursor.next_line();
            }
            PseudoHeader::RenameTo(path) => {
                record.file_path = path;
                cursor.next_line();
            }
            PseudoHeader::Index => {
                cursor.next_line();
            }
            PseudoHeader::HunkContent => break,
        }
    }

    // Hunt: skip everything up to the first +/- line that is not a
    // +++/--- file marker, stopping if the section ends first
    loop {
        let Some(line) = cursor.peek() else {
            return record;
        };
        let signed = line.starts_with('+') || line.starts_with('-');
        if signed && !line.starts_with("+++") && !line.starts_with("---") {
            break;
        }
        if ends_section(line, markers) {
            return record;
        }
        cursor.next_line();
    }

    // Collect: consecutive +/- lines are hunk content; the first line that
    // carries neither sign ends the section
    while cursor
        .peek()
        .is_some_and(|l| l.starts_with('+') || l.starts_with('-'))
    {
        if let Some(line) = cursor.next_line() {
            let sign = if line.starts_with('+') {
                HunkSign::Add
            } else {
                HunkSign::Remove
            };
            record.hunk_lines.push(HunkLine {
                sign,
                text: line[1..].to_string(),
            });
        }
    }

    record
}

/// Skip the remainder of a section whose hunks are not recorded
fn skip_section<I>(cursor: &mut LineCursor<I>, markers: &Markers)
where
    I: Iterator<Item = String>,
{
    while cursor.peek().is_some_and(|l| !ends_section(l, markers)) {
        cursor.next_line();
    }
}
