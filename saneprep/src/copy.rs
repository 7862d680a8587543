// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    error::Error,
    ffi::OsString,
    fmt::{self, Display, Formatter},
    io,
    path::PathBuf,
    process::{Command, ExitStatus},
};

use tracing::info;

use crate::manifest::CopyEntry;

const COPY_PROGRAM: &str = "cp";

/// Copies files out of the source tree into the generation directory.
///
/// Each copy is one blocking invocation of the external `cp` utility.
/// Existing destination files are overwritten without prompting; destination
/// directories are never created, they must already exist.
pub struct FileCopier {
    source_dir: PathBuf,
    gen_dir: PathBuf,
    program: OsString,
}

/// An error indicating that a copy did not complete.
#[derive(Debug)]
pub enum CopyError {
    /// The copy program could not be run
    Spawn {
        /// File that was being copied
        from: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },
    /// The copy program exited unsuccessfully
    Failed {
        /// File that was being copied
        from: PathBuf,
        /// Destination it was being copied to
        to: PathBuf,
        /// Exit status of the invocation
        status: ExitStatus,
    },
}

impl Display for CopyError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            CopyError::Spawn { from, source } => {
                write!(
                    f,
                    "failed to run copy program for '{}': {source}",
                    from.display(),
                )
            }
            CopyError::Failed { from, to, status } => {
                write!(
                    f,
                    "copying '{}' to '{}' failed ({status})",
                    from.display(),
                    to.display(),
                )
            }
        }
    }
}

impl Error for CopyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CopyError::Spawn { source, .. } => Some(source),
            CopyError::Failed { .. } => None,
        }
    }
}

impl FileCopier {
    /// Creates a copier reading from `source_dir` and writing into
    /// `gen_dir`.
    pub fn new(source_dir: impl Into<PathBuf>, gen_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            gen_dir: gen_dir.into(),
            program: COPY_PROGRAM.into(),
        }
    }

    /// Overrides the copy program to invoke.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Copies one manifest entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the copy program cannot be run or exits
    /// unsuccessfully, e.g. because the source file is missing or the
    /// destination directory does not exist.
    pub fn copy(&self, entry: &CopyEntry) -> Result<(), CopyError> {
        let from = entry.source_path(&self.source_dir);
        let to = entry.dest_path(&self.gen_dir);

        let status = Command::new(&self.program)
            .arg(&from)
            .arg(&to)
            .status()
            .map_err(|source| CopyError::Spawn {
                from: from.clone(),
                source,
            })?;
        if status.success() {
            info!("copied '{}' to '{}'", from.display(), to.display());
            Ok(())
        } else {
            Err(CopyError::Failed { from, to, status })
        }
    }
}
