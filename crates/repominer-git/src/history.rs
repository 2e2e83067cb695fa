// Copyright (c) 2026 - present Evan Marsh
// SPDX-License-Identifier: MIT

//! History tool boundary
//!
//! Everything that talks to the external history tool lives here: the
//! [`HistorySource`] trait the rest of the engine is written against, the
//! [`LogLines`] line stream with lossy decoding, and the [`GitCli`]
//! implementation that spawns `git`. Tests inject lines directly through
//! [`LogLines::from_lines`] and never touch a real repository.

use crate::error::MineError;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, Stdio};
use tracing::{debug, warn};

/// Queries the engine needs from the history tool.
///
/// One implementor wraps one working-directory checkout; checkpoints mutate
/// that checkout, so two checkpoints of the same clone must not be mined
/// concurrently.
pub trait HistorySource {
    /// Move the working tree to the given revision
    ///
    /// # Errors
    ///
    /// Returns `MineError::CommandFailed` when the tool rejects the revision.
    fn checkout(&self, rev: &str) -> Result<(), MineError>;

    /// Start the combined log+diff query, optionally bounded below by an ISO
    /// date, and return its output as a line stream
    ///
    /// # Errors
    ///
    /// Returns `MineError` when the tool cannot be spawned.
    fn log_stream(&self, since: Option<&str>) -> Result<LogLines, MineError>;

    /// Raw date text of the repository's earliest commit, `None` when the
    /// query produced no output
    ///
    /// # Errors
    ///
    /// Returns `MineError::CommandFailed` when the query itself fails.
    fn first_commit_date(&self) -> Result<Option<String>, MineError>;

    /// Raw date text of the repository's latest commit
    ///
    /// # Errors
    ///
    /// Returns `MineError::CommandFailed` when the query itself fails.
    fn last_commit_date(&self) -> Result<Option<String>, MineError>;

    /// Id of the last-listed commit between Jan 1 and Dec 31 of a year
    ///
    /// # Errors
    ///
    /// Returns `MineError::CommandFailed` when the query itself fails.
    fn last_commit_in_year(&self, year: i32) -> Result<Option<String>, MineError>;

    /// Raw listing lines of branches containing a commit
    ///
    /// # Errors
    ///
    /// Returns `MineError::CommandFailed` when the query itself fails.
    fn branches_containing(&self, commit_id: &str) -> Result<Vec<String>, MineError>;
}

enum LineInner {
    Memory(std::vec::IntoIter<String>),
    Process {
        reader: BufReader<ChildStdout>,
        child: Child,
        finished: bool,
    },
}

/// A pull-based stream of decoded lines from the history tool.
///
/// Bytes that are not valid UTF-8 are replaced rather than aborting the
/// stream; the number of affected lines is available afterwards through
/// [`LogLines::decode_failures`].
pub struct LogLines {
    inner: LineInner,
    decode_failures: usize,
}

impl LogLines {
    /// Stream over lines already held in memory (test injection)
    #[must_use]
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self {
            inner: LineInner::Memory(lines.into_iter()),
            decode_failures: 0,
        }
    }

    /// Stream over a string, split on line breaks (test injection)
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_lines(text.lines().map(str::to_string).collect())
    }

    fn from_child(mut child: Child) -> Result<Self, MineError> {
        let stdout = child.stdout.take().ok_or_else(|| MineError::CommandFailed {
            command: "log".to_string(),
            detail: "child process has no captured stdout".to_string(),
        })?;
        Ok(Self {
            inner: LineInner::Process {
                reader: BufReader::new(stdout),
                child,
                finished: false,
            },
            decode_failures: 0,
        })
    }

    /// Number of lines that required lossy replacement while decoding
    #[must_use]
    pub fn decode_failures(&self) -> usize {
        self.decode_failures
    }
}

impl Iterator for LogLines {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match &mut self.inner {
            LineInner::Memory(lines) => lines.next(),
            LineInner::Process {
                reader,
                child,
                finished,
            } => {
                let mut buf = Vec::new();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => {
                        if !*finished {
                            let _ = child.wait();
                            *finished = true;
                        }
                        None
                    }
                    Ok(_) => {
                        while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
                            buf.pop();
                        }
                        match String::from_utf8(buf) {
                            Ok(line) => Some(line),
                            Err(err) => {
                                self.decode_failures += 1;
                                warn!("replaced undecodable bytes in history output line");
                                Some(String::from_utf8_lossy(err.as_bytes()).into_owned())
                            }
                        }
                    }
                    Err(err) => {
                        warn!(error = %err, "history output stream ended abnormally");
                        None
                    }
                }
            }
        }
    }
}

impl Drop for LogLines {
    fn drop(&mut self) {
        if let LineInner::Process {
            child, finished, ..
        } = &mut self.inner
        {
            if !*finished {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

/// Process-backed [`HistorySource`] driving the `git` executable against one
/// working-directory checkout
pub struct GitCli {
    workdir: PathBuf,
    program: String,
}

impl GitCli {
    /// Wrap an existing checkout
    #[must_use]
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            program: "git".to_string(),
        }
    }

    /// Use an alternative executable name or path
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Working directory of this checkout
    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Clone a repository into `dir`, or update it when already cloned.
    ///
    /// # Errors
    ///
    /// Returns `MineError::CommandFailed` when the clone or update fails.
    pub fn clone_or_update(url: &str, dir: impl Into<PathBuf>) -> Result<Self, MineError> {
        let dir: PathBuf = dir.into();
        if dir.join(".git").exists() {
            let cli = Self::new(dir);
            cli.run(&["pull", "--ff-only"])?;
            return Ok(cli);
        }
        let output = Command::new("git")
            .arg("clone")
            .arg(url)
            .arg(&dir)
            .output()?;
        if !output.status.success() {
            return Err(MineError::CommandFailed {
                command: format!("git clone {url}"),
                detail: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(Self::new(dir))
    }

    /// Run a subcommand to completion and capture its stdout lossily
    fn run(&self, args: &[&str]) -> Result<String, MineError> {
        debug!(program = %self.program, ?args, "running history command");
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .output()?;
        if !output.status.success() {
            return Err(MineError::CommandFailed {
                command: format!("{} {}", self.program, args.join(" ")),
                detail: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn first_line(output: &str) -> Option<String> {
        output
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(str::to_string)
    }

    fn last_line(output: &str) -> Option<String> {
        output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .next_back()
            .map(str::to_string)
    }
}

impl HistorySource for GitCli {
    fn checkout(&self, rev: &str) -> Result<(), MineError> {
        self.run(&["checkout", rev]).map(|_| ())
    }

    fn log_stream(&self, since: Option<&str>) -> Result<LogLines, MineError> {
        let mut command = Command::new(&self.program);
        command
            .args(["log", "-p", "--date=iso-strict-local", "--function-context"])
            .current_dir(&self.workdir)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .stdin(Stdio::null());
        if let Some(since) = since {
            command.arg(format!("--since={since}"));
        }
        let child = command.spawn()?;
        LogLines::from_child(child)
    }

    fn first_commit_date(&self) -> Result<Option<String>, MineError> {
        let output = self.run(&["log", "--reverse", "--format=%ad"])?;
        Ok(Self::first_line(&output))
    }

    fn last_commit_date(&self) -> Result<Option<String>, MineError> {
        let output = self.run(&["log", "-1", "--format=%ad"])?;
        Ok(Self::first_line(&output))
    }

    fn last_commit_in_year(&self, year: i32) -> Result<Option<String>, MineError> {
        let since = format!("1 January {year}");
        let before = format!("31 December {year}");
        let output = self.run(&["log", "--since", &since, "--before", &before, "--format=%H"])?;
        Ok(Self::last_line(&output))
    }

    fn branches_containing(&self, commit_id: &str) -> Result<Vec<String>, MineError> {
        let output = self.run(&["branch", "-a", "--contains", commit_id])?;
        Ok(output.lines().map(str::to_string).collect())
    }
}
