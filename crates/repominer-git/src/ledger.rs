// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! Per-author aggregation of parsed commits

use crate::commit::{AuthorIdentity, CommitRecord};
use serde::de::{Deserializer, Error as DeError};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One author's bucket: commit count plus the commits in encounter order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorActivity {
    /// Number of commits recorded for this author
    pub total_commits: usize,
    /// The commits themselves, insertion order preserved
    pub commits: Vec<CommitRecord>,
}

/// Append-only accumulator mapping author identities to their commits.
///
/// No commit deduplication happens here; replaying overlapping checkpoints
/// records a commit once per encounter and the persistence collaborator
/// dedupes on commit id. Serializes as a map keyed by the rendered
/// `Name <email>` identity so the output is stable across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorLedger {
    authors: BTreeMap<AuthorIdentity, AuthorActivity>,
}

impl AuthorLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one commit under its author, creating the bucket on first sight
    pub fn record(&mut self, commit: CommitRecord) {
        let activity = self.authors.entry(commit.author.clone()).or_default();
        activity.total_commits += 1;
        activity.commits.push(commit);
    }

    /// Bucket for one author, if any commits were recorded for them
    #[must_use]
    pub fn get(&self, author: &AuthorIdentity) -> Option<&AuthorActivity> {
        self.authors.get(author)
    }

    /// Iterate authors with their buckets, in identity order
    pub fn authors(&self) -> impl Iterator<Item = (&AuthorIdentity, &AuthorActivity)> {
        self.authors.iter()
    }

    /// Number of distinct authors
    #[must_use]
    pub fn author_count(&self) -> usize {
        self.authors.len()
    }

    /// Whether no commits were recorded at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Total commits across all authors
    #[must_use]
    pub fn total_commits(&self) -> usize {
        self.authors.values().map(|a| a.total_commits).sum()
    }

    /// Flat view of every recorded commit, grouped by author with each
    /// author's commits in encounter order
    #[must_use]
    pub fn all_commits(&self) -> Vec<&CommitRecord> {
        self.authors
            .values()
            .flat_map(|a| a.commits.iter())
            .collect()
    }
}

impl Serialize for AuthorLedger {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.authors.len()))?;
        for (author, activity) in &self.authors {
            map.serialize_entry(&author.to_string(), activity)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AuthorLedger {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: BTreeMap<String, AuthorActivity> = BTreeMap::deserialize(deserializer)?;
        let mut authors = BTreeMap::new();
        for (key, activity) in raw {
            if authors
                .insert(AuthorIdentity::parse(&key), activity)
                .is_some()
            {
                return Err(D::Error::custom(format!(
                    "duplicate author key after parsing: {key}"
                )));
            }
        }
        Ok(Self { authors })
    }
}
