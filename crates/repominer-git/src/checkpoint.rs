// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! Checkpoint enumeration
//!
//! Decides the ordered sequence of historical positions a mining run
//! replays: either the caller's release manifest verbatim, or a synthesized
//! yearly sweep bisected from the repository's earliest and latest commit
//! dates.

use crate::error::MineError;
use crate::history::HistorySource;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Oldest year the backward sweep will scan down to
pub const SWEEP_FLOOR_YEAR: i32 = 2000;

/// A historical position the history tool can check out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Checkpoint {
    /// A release identifier from the manifest, checked out under the tag
    /// namespace
    Release(String),
    /// The last commit the bounded query returned for a calendar year
    Yearly {
        /// Calendar year the bounded query covered
        year: i32,
        /// Resolved commit id
        commit: String,
    },
}

impl Checkpoint {
    /// Revision string to hand to the checkout command
    #[must_use]
    pub fn rev(&self) -> String {
        match self {
            Self::Release(name) => format!("tags/{name}"),
            Self::Yearly { commit, .. } => commit.clone(),
        }
    }

    /// Short label for logs and issue reports
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Release(name) => name.clone(),
            Self::Yearly { year, commit } => {
                format!("{year}@{}", &commit[..7.min(commit.len())])
            }
        }
    }
}

/// Parse a release manifest: one identifier per line, file order kept
#[must_use]
pub fn from_manifest(content: &str) -> Vec<Checkpoint> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| Checkpoint::Release(l.to_string()))
        .collect()
}

/// Enumerate the checkpoints one mining run will replay.
///
/// A supplied manifest wins; otherwise the yearly sweep runs against the
/// source's date bounds.
///
/// # Errors
///
/// Returns `MineError::RepositoryUnreadable` when the sweep's date bound
/// queries return no usable output.
pub fn enumerate<S: HistorySource>(
    source: &S,
    manifest: Option<&str>,
) -> Result<Vec<Checkpoint>, MineError> {
    match manifest {
        Some(content) => Ok(from_manifest(content)),
        None => yearly_sweep(source),
    }
}

/// Pull a year out of a raw date line: the second-to-last whitespace token
/// (`… 2024 +0200`), falling back to a leading ISO `YYYY-` prefix.
fn year_of(date_text: &str) -> Option<i32> {
    let tokens: Vec<&str> = date_text.split_whitespace().collect();
    if tokens.len() >= 2 {
        if let Ok(year) = tokens[tokens.len() - 2].parse::<i32>() {
            return Some(year);
        }
    }
    let head = date_text.trim().get(..4)?;
    match date_text.trim().as_bytes().get(4) {
        Some(b'-') => head.parse().ok(),
        _ => None,
    }
}

fn yearly_sweep<S: HistorySource>(source: &S) -> Result<Vec<Checkpoint>, MineError> {
    let first = source
        .first_commit_date()
        .map_err(|err| MineError::RepositoryUnreadable {
            reason: format!("earliest commit date query failed: {err}"),
        })?;
    let last = source
        .last_commit_date()
        .map_err(|err| MineError::RepositoryUnreadable {
            reason: format!("latest commit date query failed: {err}"),
        })?;

    let (Some(first), Some(last)) = (first, last) else {
        return Err(MineError::RepositoryUnreadable {
            reason: "history date bounds returned no output".to_string(),
        });
    };

    let Some(last_year) = year_of(&last) else {
        return Err(MineError::RepositoryUnreadable {
            reason: format!("latest commit date unparseable: {last}"),
        });
    };
    let first_year = year_of(&first);
    if first_year.is_none() {
        warn!(date = %first, "earliest commit date unparseable; forward sweep skipped");
    }

    let mut checkpoints = Vec::new();
    if let Some(first_year) = first_year {
        for year in first_year..=last_year {
            push_year(source, year, &mut checkpoints);
        }
    }

    // Forward bounds were unusable; recover a coarse list scanning backward
    if checkpoints.is_empty() {
        for year in ((SWEEP_FLOOR_YEAR + 1)..=last_year).rev() {
            push_year(source, year, &mut checkpoints);
        }
    }

    debug!(count = checkpoints.len(), "yearly sweep finished");
    Ok(checkpoints)
}

fn push_year<S: HistorySource>(source: &S, year: i32, checkpoints: &mut Vec<Checkpoint>) {
    match source.last_commit_in_year(year) {
        Ok(Some(commit)) => checkpoints.push(Checkpoint::Yearly { year, commit }),
        Ok(None) => {}
        Err(err) => warn!(year, error = %err, "bounded year query failed; year skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::LogLines;
    use similar_asserts::assert_eq;
    use std::collections::BTreeMap;

    /// Source whose answers are scripted per query
    struct SweepSource {
        first: Option<String>,
        last: Option<String>,
        years: BTreeMap<i32, String>,
    }

    impl SweepSource {
        fn new(first: Option<&str>, last: Option<&str>, years: &[(i32, &str)]) -> Self {
            Self {
                first: first.map(str::to_string),
                last: last.map(str::to_string),
                years: years
                    .iter()
                    .map(|(y, c)| (*y, (*c).to_string()))
                    .collect(),
            }
        }
    }

    impl HistorySource for SweepSource {
        fn checkout(&self, _rev: &str) -> Result<(), MineError> {
            Ok(())
        }

        fn log_stream(&self, _since: Option<&str>) -> Result<LogLines, MineError> {
            Ok(LogLines::from_lines(Vec::new()))
        }

        fn first_commit_date(&self) -> Result<Option<String>, MineError> {
            Ok(self.first.clone())
        }

        fn last_commit_date(&self) -> Result<Option<String>, MineError> {
            Ok(self.last.clone())
        }

        fn last_commit_in_year(&self, year: i32) -> Result<Option<String>, MineError> {
            Ok(self.years.get(&year).cloned())
        }

        fn branches_containing(&self, _commit_id: &str) -> Result<Vec<String>, MineError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_manifest_wins_and_keeps_file_order() {
        let source = SweepSource::new(None, None, &[]);
        let manifest = "v2.0\n\n  v1.0  \nv1.5\n";
        let checkpoints = enumerate(&source, Some(manifest)).expect("enumerate");
        assert_eq!(
            checkpoints,
            vec![
                Checkpoint::Release("v2.0".to_string()),
                Checkpoint::Release("v1.0".to_string()),
                Checkpoint::Release("v1.5".to_string()),
            ]
        );
        assert_eq!(checkpoints[0].rev(), "tags/v2.0");
    }

    #[test]
    fn test_sweep_emits_only_years_with_commits() {
        let source = SweepSource::new(
            Some("Mon Mar 1 10:00:00 2010 +0000"),
            Some("Fri Nov 30 10:00:00 2012 +0000"),
            &[(2011, "abc1234def")],
        );
        let checkpoints = enumerate(&source, None).expect("enumerate");
        assert_eq!(
            checkpoints,
            vec![Checkpoint::Yearly {
                year: 2011,
                commit: "abc1234def".to_string()
            }]
        );
    }

    #[test]
    fn test_sweep_forward_order() {
        let source = SweepSource::new(
            Some("Mon Mar 1 10:00:00 2010 +0000"),
            Some("Fri Nov 30 10:00:00 2012 +0000"),
            &[(2010, "aaa"), (2011, "bbb"), (2012, "ccc")],
        );
        let checkpoints = enumerate(&source, None).expect("enumerate");
        let years: Vec<i32> = checkpoints
            .iter()
            .map(|c| match c {
                Checkpoint::Yearly { year, .. } => *year,
                Checkpoint::Release(_) => panic!("unexpected release checkpoint"),
            })
            .collect();
        assert_eq!(years, vec![2010, 2011, 2012]);
    }

    #[test]
    fn test_sweep_backward_fallback_when_forward_unparseable() {
        let source = SweepSource::new(
            Some("???"),
            Some("Fri Nov 30 10:00:00 2004 +0000"),
            &[(2002, "old123"), (2004, "new456")],
        );
        let checkpoints = enumerate(&source, None).expect("enumerate");
        assert_eq!(
            checkpoints,
            vec![
                Checkpoint::Yearly {
                    year: 2004,
                    commit: "new456".to_string()
                },
                Checkpoint::Yearly {
                    year: 2002,
                    commit: "old123".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_sweep_backward_fallback_respects_floor() {
        let source = SweepSource::new(
            Some("garbage"),
            Some("Fri Nov 30 10:00:00 2003 +0000"),
            &[(1999, "too-old"), (2000, "at-floor"), (2001, "kept")],
        );
        let checkpoints = enumerate(&source, None).expect("enumerate");
        assert_eq!(
            checkpoints,
            vec![Checkpoint::Yearly {
                year: 2001,
                commit: "kept".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_date_bounds_is_unreadable() {
        let source = SweepSource::new(None, None, &[]);
        let result = enumerate(&source, None);
        assert!(matches!(
            result,
            Err(MineError::RepositoryUnreadable { .. })
        ));
    }

    #[test]
    fn test_unparseable_latest_is_unreadable() {
        let source = SweepSource::new(
            Some("Mon Mar 1 10:00:00 2010 +0000"),
            Some("not a date"),
            &[],
        );
        let result = enumerate(&source, None);
        assert!(matches!(
            result,
            Err(MineError::RepositoryUnreadable { .. })
        ));
    }

    #[test]
    fn test_year_of_formats() {
        assert_eq!(year_of("Tue Aug 6 12:30:05 2024 +0200"), Some(2024));
        assert_eq!(year_of("2021-06-23T11:21:13-06:00"), Some(2021));
        assert_eq!(year_of("nonsense"), None);
        assert_eq!(year_of(""), None);
    }

    #[test]
    fn test_checkpoint_labels() {
        let release = Checkpoint::Release("v1.0".to_string());
        assert_eq!(release.label(), "v1.0");

        let yearly = Checkpoint::Yearly {
            year: 2011,
            commit: "abc1234def5678".to_string(),
        };
        assert_eq!(yearly.label(), "2011@abc1234");
        assert_eq!(yearly.rev(), "abc1234def5678");
    }
}
