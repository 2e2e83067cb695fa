//! Configuration for the repominer command line
//!
//! This module provides the argument surface of one mining run: which
//! checkout to mine, where the release manifest lives, and how the report
//! should be emitted.

use std::path::PathBuf;

use clap::Parser;

/// Repominer - mine per-author commit and diff history from a repository
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "repominer")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Path to the repository checkout to mine
    ///
    /// Checkpoints are checked out in place, so point this at a scratch
    /// clone rather than a working copy you care about.
    #[arg(env = "REPOMINER_REPO", default_value = ".")]
    pub repo: PathBuf,

    /// Release manifest file, one release identifier per line
    ///
    /// When omitted, `<repo>/Releases.txt` is used if it exists; otherwise
    /// checkpoints are synthesized with the yearly sweep.
    #[arg(short, long, env = "REPOMINER_RELEASES")]
    pub releases: Option<PathBuf>,

    /// Only mine commits at or after this ISO date
    #[arg(short, long)]
    pub since: Option<String>,

    /// Attribute each commit to the branches containing it
    ///
    /// Runs one extra containment query per commit; attribution failures
    /// degrade to an empty branch set.
    #[arg(short, long, default_value = "false")]
    pub branches: bool,

    /// Write the JSON report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so the report on stdout stays parseable.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Config {
    /// Resolve the manifest path: the explicit flag, or the conventional
    /// `Releases.txt` next to the repository when present
    #[must_use]
    pub fn releases_path(&self) -> Option<PathBuf> {
        self.releases.clone().or_else(|| {
            let fallback = self.repo.join("Releases.txt");
            fallback.is_file().then_some(fallback)
        })
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository path doesn't exist or isn't a directory
    /// - An explicitly given release manifest doesn't exist
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.repo.exists() {
            return Err(ConfigError::RepoNotFound(self.repo.clone()));
        }
        if !self.repo.is_dir() {
            return Err(ConfigError::RepoNotDirectory(self.repo.clone()));
        }
        if let Some(ref releases) = self.releases {
            if !releases.is_file() {
                return Err(ConfigError::ManifestNotFound(releases.clone()));
            }
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepoNotFound(PathBuf),

    /// Repository path is not a directory
    #[error("Repository path is not a directory: {0}")]
    RepoNotDirectory(PathBuf),

    /// Release manifest file not found
    #[error("Release manifest not found: {0}")]
    ManifestNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.releases.is_none());
        assert!(config.since.is_none());
        assert!(config.output.is_none());
        assert!(!config.branches);
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_releases_path_explicit_wins() {
        let config = Config {
            releases: Some(PathBuf::from("/somewhere/Releases.txt")),
            ..Default::default()
        };
        assert_eq!(
            config.releases_path(),
            Some(PathBuf::from("/somewhere/Releases.txt"))
        );
    }

    #[test]
    fn test_releases_path_none_without_fallback() {
        let config = Config {
            repo: PathBuf::from("/nonexistent/path/12345"),
            ..Default::default()
        };
        assert_eq!(config.releases_path(), None);
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_nonexistent_repo() {
        let config = Config {
            repo: PathBuf::from("/nonexistent/path/12345"),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::RepoNotFound(_))));
    }

    #[test]
    fn test_validate_valid_repo() {
        let config = Config {
            repo: PathBuf::from("/tmp"),
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_missing_manifest() {
        let config = Config {
            repo: PathBuf::from("/tmp"),
            releases: Some(PathBuf::from("/nonexistent/Releases.txt")),
            ..Default::default()
        };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::ManifestNotFound(_))));
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
