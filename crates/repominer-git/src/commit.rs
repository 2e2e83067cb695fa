//! Commit record types and author identity handling

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An author identity as printed on a history header line: `Name <email>`.
///
/// Two identities are equal iff both fields match exactly. Merging aliases of
/// the same person is a downstream concern.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AuthorIdentity {
    /// Display name as it appears in the stream
    pub display_name: String,
    /// Email address, empty when the header carried none
    pub email: String,
}

impl AuthorIdentity {
    /// Create an identity from its two parts
    #[must_use]
    pub fn new(display_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// Sentinel identity used when a commit header carries no author line
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            display_name: "Unknown".to_string(),
            email: String::new(),
        }
    }

    /// Parse a `Name <email>` header payload.
    ///
    /// The angle brackets are optional; without them the whole payload becomes
    /// the display name and the email stays empty. The last `<` wins, so a
    /// display name containing literal brackets still resolves the email.
    #[must_use]
    pub fn parse(payload: &str) -> Self {
        let payload = payload.trim();
        if let Some(open) = payload.rfind('<') {
            let email = payload[open + 1..].trim_end_matches('>').trim().to_string();
            let display_name = payload[..open].trim().to_string();
            Self {
                display_name,
                email,
            }
        } else {
            Self {
                display_name: payload.to_string(),
                email: String::new(),
            }
        }
    }

    /// Whether this is the sentinel produced for header shapes with no author
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.display_name == "Unknown" && self.email.is_empty()
    }
}

impl fmt::Display for AuthorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.email.is_empty() {
            write!(f, "{}", self.display_name)
        } else {
            write!(f, "{} <{}>", self.display_name, self.email)
        }
    }
}

/// A commit date, degraded gracefully when the stream carries a shape the
/// date parser does not recognize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CommitDate {
    /// Successfully parsed timestamp (offset preserved from the stream)
    Timestamp(DateTime<FixedOffset>),
    /// Raw date text retained verbatim after a parse failure
    Opaque(String),
    /// No date line was present for this commit
    Missing,
}

impl CommitDate {
    /// Parse a date payload, trying the ISO form first, then the default
    /// history-tool form, degrading to `Opaque` on failure.
    #[must_use]
    pub fn parse(payload: &str) -> Self {
        let payload = payload.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(payload) {
            return Self::Timestamp(ts);
        }
        // Stock output: "Tue Aug 6 12:30:05 2024 +0200"
        if let Ok(ts) = DateTime::parse_from_str(payload, "%a %b %e %H:%M:%S %Y %z") {
            return Self::Timestamp(ts);
        }
        Self::Opaque(payload.to_string())
    }

    /// Whether the date carries a parsed timestamp
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Timestamp(_))
    }
}

/// A fully assembled commit as reconstructed from the history stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Opaque hash string extracted from the commit header
    pub id: String,
    /// Author identity, `AuthorIdentity::unknown()` when the header had none
    pub author: AuthorIdentity,
    /// Commit date
    pub date: CommitDate,
    /// Commit message, lines joined with `\n`, indentation preserved
    pub message: String,
    /// File sections in encounter order
    pub diffs: Vec<crate::diff::DiffRecord>,
    /// Branches containing this commit, populated only when branch
    /// attribution was requested
    #[serde(default, skip_serializing_if = "std::collections::BTreeSet::is_empty")]
    pub branches: std::collections::BTreeSet<String>,
}

impl CommitRecord {
    /// Create an empty record for a freshly seen commit header
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: AuthorIdentity::unknown(),
            date: CommitDate::Missing,
            message: String::new(),
            diffs: Vec::new(),
            branches: std::collections::BTreeSet::new(),
        }
    }

    /// First 7 characters of the id (or the whole id when shorter)
    #[must_use]
    pub fn short_id(&self) -> &str {
        &self.id[..7.min(self.id.len())]
    }

    /// First line of the commit message
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    /// Total number of hunk lines across all file sections
    #[must_use]
    pub fn hunk_line_count(&self) -> usize {
        self.diffs.iter().map(|d| d.hunk_lines.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn sample_commit() -> CommitRecord {
        CommitRecord {
            id: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".to_string(),
            author: AuthorIdentity::new("Test Author", "test@example.com"),
            date: CommitDate::Timestamp(
                FixedOffset::east_opt(0)
                    .unwrap()
                    .with_ymd_and_hms(2024, 8, 6, 2, 33, 6)
                    .unwrap(),
            ),
            message: "    fix: handle empty sections\n".to_string(),
            diffs: Vec::new(),
            branches: std::collections::BTreeSet::new(),
        }
    }

    #[test]
    fn test_identity_parse_standard() {
        let id = AuthorIdentity::parse("Ada Lovelace <ada@example.com>");
        assert_eq!(id.display_name, "Ada Lovelace");
        assert_eq!(id.email, "ada@example.com");
    }

    #[test]
    fn test_identity_parse_no_email() {
        let id = AuthorIdentity::parse("buildbot");
        assert_eq!(id.display_name, "buildbot");
        assert_eq!(id.email, "");
    }

    #[test]
    fn test_identity_parse_brackets_in_name() {
        let id = AuthorIdentity::parse("CI <bot> <ci@example.com>");
        assert_eq!(id.display_name, "CI <bot>");
        assert_eq!(id.email, "ci@example.com");
    }

    #[test]
    fn test_identity_parse_whitespace() {
        let id = AuthorIdentity::parse("  Ada Lovelace   <ada@example.com> ");
        assert_eq!(id.display_name, "Ada Lovelace");
        assert_eq!(id.email, "ada@example.com");
    }

    #[test]
    fn test_identity_display_roundtrip() {
        let id = AuthorIdentity::new("Ada Lovelace", "ada@example.com");
        assert_eq!(AuthorIdentity::parse(&id.to_string()), id);
    }

    #[test]
    fn test_identity_unknown_sentinel() {
        assert!(AuthorIdentity::unknown().is_unknown());
        assert!(!AuthorIdentity::new("Unknown", "u@x.com").is_unknown());
    }

    #[test]
    fn test_identity_equality_is_exact() {
        let a = AuthorIdentity::new("Ada", "ada@example.com");
        let b = AuthorIdentity::new("Ada L.", "ada@example.com");
        assert_ne!(a, b);
    }

    #[test]
    fn test_date_parse_iso_strict() {
        let date = CommitDate::parse("2021-06-23T11:21:13-06:00");
        assert!(date.is_parsed());
    }

    #[test]
    fn test_date_parse_default_format() {
        let date = CommitDate::parse("Tue Aug 6 12:30:05 2024 +0200");
        assert!(date.is_parsed());
    }

    #[test]
    fn test_date_parse_garbage_is_opaque() {
        let date = CommitDate::parse("sometime last tuesday");
        assert_eq!(date, CommitDate::Opaque("sometime last tuesday".to_string()));
    }

    #[test]
    fn test_commit_short_id() {
        let commit = sample_commit();
        assert_eq!(commit.short_id(), "1945ab9");
    }

    #[test]
    fn test_commit_short_id_handles_short_input() {
        let mut commit = sample_commit();
        commit.id = "abc".to_string();
        assert_eq!(commit.short_id(), "abc");
    }

    #[test]
    fn test_commit_subject_trims_indent() {
        let commit = sample_commit();
        assert_eq!(commit.subject(), "fix: handle empty sections");
    }

    #[test]
    fn test_commit_subject_empty_message() {
        let commit = CommitRecord::new("deadbeef");
        assert_eq!(commit.subject(), "");
    }

    #[test]
    fn test_new_commit_is_skeleton() {
        let commit = CommitRecord::new("deadbeef");
        assert!(commit.author.is_unknown());
        assert_eq!(commit.date, CommitDate::Missing);
        assert!(commit.diffs.is_empty());
        assert!(commit.branches.is_empty());
    }

    #[test]
    fn test_commit_serialization_roundtrip() {
        let commit = sample_commit();
        let json = serde_json::to_string(&commit).expect("serialize");
        let deserialized: CommitRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(commit, deserialized);
    }

    #[test]
    fn test_branches_omitted_when_empty() {
        let commit = sample_commit();
        let json = serde_json::to_string(&commit).expect("serialize");
        assert!(!json.contains("branches"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy to generate valid 40-character hex id strings
    fn id_strategy() -> impl Strategy<Value = String> {
        proptest::string::string_regex("[0-9a-f]{40}").expect("valid regex")
    }

    /// Strategy to generate author identities with well-formed emails
    fn identity_strategy() -> impl Strategy<Value = AuthorIdentity> {
        ("[A-Za-z][A-Za-z ]{0,30}", "[a-z]+@[a-z]+\\.[a-z]+")
            .prop_map(|(name, email)| AuthorIdentity::new(name.trim(), email))
    }

    proptest! {
        /// Property: Display + parse round-trips any bracket-free identity
        #[test]
        fn prop_identity_display_parse_roundtrip(identity in identity_strategy()) {
            prop_assert_eq!(AuthorIdentity::parse(&identity.to_string()), identity);
        }

        /// Property: parse never panics on arbitrary payloads
        #[test]
        fn prop_identity_parse_total(payload in ".*") {
            let _ = AuthorIdentity::parse(&payload);
        }

        /// Property: date parsing never panics and opaque retains input
        #[test]
        fn prop_date_parse_total(payload in "[^\\r\\n]*") {
            match CommitDate::parse(&payload) {
                CommitDate::Opaque(raw) => prop_assert_eq!(raw, payload.trim().to_string()),
                CommitDate::Timestamp(_) | CommitDate::Missing => {}
            }
        }

        /// Property: short_id returns at most 7 characters
        #[test]
        fn prop_short_id_length(id in id_strategy()) {
            let commit = CommitRecord::new(id);
            prop_assert!(commit.short_id().len() <= 7);
        }

        /// Property: subject is a trimmed prefix line of the message
        #[test]
        fn prop_subject_from_first_line(message in "[^\\r\\n]{0,40}(\\n[^\\r\\n]{0,40}){0,3}") {
            let mut commit = CommitRecord::new("deadbeef");
            commit.message = message.clone();
            let subject = commit.subject();
            prop_assert_eq!(subject, message.lines().next().unwrap_or("").trim());
        }
    }
}
