// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
    path::{Path, PathBuf},
};

use crate::{
    copy::{CopyError, FileCopier},
    manifest::Manifest,
    patch::{PatchApplier, PatchError, PatchOutcome},
};

/// Runs a manifest against a source tree and a generation directory.
///
/// Steps execute strictly in order, one blocking external invocation at a
/// time: every patch first, then every copy. Only patch steps have a
/// recovery path (the reverse apply); the first copy failure or reverse
/// failure aborts the run, leaving any files already copied in place.
pub struct Installer {
    applier: PatchApplier,
    copier: FileCopier,
}

/// The typed result of one completed step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// A patch was forward-applied to the source tree
    Applied {
        /// Name of the patch file
        patch: String,
    },
    /// A patch's forward apply failed and the reverse apply restored the
    /// tree to its pre-patch state
    Reverted {
        /// Name of the patch file
        patch: String,
    },
    /// A file was copied into the generation directory
    Copied {
        /// Destination path relative to the generation directory
        dest: PathBuf,
    },
}

/// Summary of a completed run, one outcome per step in execution order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    /// Outcomes of every step, in the order they ran.
    pub outcomes: Vec<StepOutcome>,
}

impl Report {
    /// Number of files copied into the generation directory.
    pub fn copied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StepOutcome::Copied { .. }))
            .count()
    }

    /// Number of patches handled by the reverse-apply fallback.
    pub fn reverted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, StepOutcome::Reverted { .. }))
            .count()
    }
}

/// An error indicating that a run aborted partway through.
#[derive(Debug)]
pub enum InstallError {
    /// A patch step failed beyond recovery
    Patch(PatchError),
    /// A copy step failed
    Copy(CopyError),
}

impl Display for InstallError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            InstallError::Patch(e) => write!(f, "patch step failed: {e}"),
            InstallError::Copy(e) => write!(f, "copy step failed: {e}"),
        }
    }
}

impl Error for InstallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            InstallError::Patch(e) => Some(e),
            InstallError::Copy(e) => Some(e),
        }
    }
}

impl From<PatchError> for InstallError {
    fn from(value: PatchError) -> Self {
        InstallError::Patch(value)
    }
}

impl From<CopyError> for InstallError {
    fn from(value: CopyError) -> Self {
        InstallError::Copy(value)
    }
}

impl Installer {
    /// Creates an installer for the given source tree and generation
    /// directory.
    pub fn new(source_dir: impl Into<PathBuf>, gen_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        Self {
            applier: PatchApplier::new(&source_dir),
            copier: FileCopier::new(source_dir, gen_dir),
        }
    }

    /// Overrides the patch program the patch steps invoke.
    pub fn with_patch_program(mut self, program: impl Into<std::ffi::OsString>) -> Self {
        self.applier = self.applier.with_program(program);
        self
    }

    /// Overrides the copy program the copy steps invoke.
    pub fn with_copy_program(mut self, program: impl Into<std::ffi::OsString>) -> Self {
        self.copier = self.copier.with_program(program);
        self
    }

    /// Executes every step of `manifest` in order.
    ///
    /// # Errors
    ///
    /// Returns the first unrecovered step error. Patches handled by the
    /// reverse-apply fallback do not abort the run; they are reported as
    /// [`StepOutcome::Reverted`].
    pub fn run(&self, manifest: &Manifest) -> Result<Report, InstallError> {
        let mut outcomes = Vec::with_capacity(manifest.patches.len() + manifest.copies.len());

        for patch in &manifest.patches {
            let outcome = match self.applier.apply(patch)? {
                PatchOutcome::Applied => StepOutcome::Applied {
                    patch: patch.name.clone(),
                },
                PatchOutcome::Reverted => StepOutcome::Reverted {
                    patch: patch.name.clone(),
                },
            };
            outcomes.push(outcome);
        }

        for entry in &manifest.copies {
            self.copier.copy(entry)?;
            outcomes.push(StepOutcome::Copied {
                dest: entry.dest.clone(),
            });
        }

        Ok(Report { outcomes })
    }
}

/// Runs `manifest` against `source_dir` and `gen_dir` with the default
/// external tools.
///
/// This is a convenience method for creating an [`Installer`] and calling
/// [`Installer::run()`].
///
/// # Errors
///
/// Returns the first unrecovered step error; see [`Installer::run()`].
pub fn install(
    manifest: &Manifest,
    source_dir: &Path,
    gen_dir: &Path,
) -> Result<Report, InstallError> {
    Installer::new(source_dir, gen_dir).run(manifest)
}
