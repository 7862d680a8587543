// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    error::Error,
    ffi::OsString,
    fmt::{self, Display, Formatter},
    io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use tracing::{info, warn};

use crate::manifest::PatchFile;

const PATCH_PROGRAM: &str = "patch";
const PATCH_FLAGS: [&str; 3] = ["-p1", "--fuzz=0", "--no-backup-if-mismatch"];

/// Applies unified-diff patches to a vendored source tree.
///
/// Patches are applied by invoking the external `patch` utility with the
/// source directory as its working root, stripping one leading path
/// component and tolerating no fuzz. The tool's own output goes straight to
/// the inherited stdio.
///
/// When a forward apply fails the applier immediately attempts a reverse
/// apply of the same patch to undo any partial change. A tree that already
/// carries the patch therefore comes back out in its pre-patch state rather
/// than half-patched.
///
/// # Examples
///
/// ```no_run
/// use saneprep::{Manifest, PatchApplier};
///
/// # fn main() -> Result<(), saneprep::PatchError> {
/// let manifest = Manifest::sane_backends();
/// let applier = PatchApplier::new("/vendor/backends");
///
/// for patch in &manifest.patches {
///     applier.apply(patch)?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct PatchApplier {
    source_dir: PathBuf,
    program: OsString,
}

/// How a patch ended up handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The forward apply succeeded and the tree now carries the patch.
    Applied,
    /// The forward apply failed and the reverse apply restored the tree to
    /// its pre-patch state.
    Reverted,
}

/// An error indicating that a patch could not be handled.
///
/// Forward-apply failures are recovered internally by the reverse apply and
/// never surface here; this error means the reverse path failed too.
#[derive(Debug)]
pub enum PatchError {
    /// The reverse invocation of the patch program could not be run
    Spawn {
        /// Patch file being applied when the spawn failed
        patch: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },
    /// The reverse apply exited unsuccessfully after a failed forward apply
    ReverseFailed {
        /// Patch file that could be applied in neither direction
        patch: PathBuf,
        /// Exit status of the reverse invocation
        status: ExitStatus,
    },
}

impl Display for PatchError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            PatchError::Spawn { patch, source } => {
                write!(
                    f,
                    "failed to run patch program for '{}': {source}",
                    patch.display(),
                )
            }
            PatchError::ReverseFailed { patch, status } => {
                write!(f, "reverse apply of '{}' failed ({status})", patch.display())
            }
        }
    }
}

impl Error for PatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PatchError::Spawn { source, .. } => Some(source),
            PatchError::ReverseFailed { .. } => None,
        }
    }
}

impl PatchApplier {
    /// Creates an applier that patches the tree rooted at `source_dir`.
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            program: PATCH_PROGRAM.into(),
        }
    }

    /// Overrides the patch program to invoke.
    pub fn with_program(mut self, program: impl Into<OsString>) -> Self {
        self.program = program.into();
        self
    }

    /// Applies `patch` to the source tree, reverse-applying it if the
    /// forward apply fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the reverse apply exits unsuccessfully or its
    /// invocation cannot be run at all. A failed forward apply on its own is
    /// not an error; it is answered by the reverse apply.
    pub fn apply(&self, patch: &PatchFile) -> Result<PatchOutcome, PatchError> {
        let patch_path = patch.path(&self.source_dir);

        match self.run(&patch_path, false) {
            Ok(status) if status.success() => {
                info!("applied '{}'", patch_path.display());
                return Ok(PatchOutcome::Applied);
            }
            Ok(status) => warn!(
                "forward apply of '{}' failed ({status}), attempting reverse apply",
                patch_path.display()
            ),
            Err(e) => warn!(
                "forward apply of '{}' failed ({e}), attempting reverse apply",
                patch_path.display()
            ),
        }

        let status = self
            .run(&patch_path, true)
            .map_err(|source| PatchError::Spawn {
                patch: patch_path.clone(),
                source,
            })?;
        if status.success() {
            info!("reverse-applied '{}'", patch_path.display());
            Ok(PatchOutcome::Reverted)
        } else {
            Err(PatchError::ReverseFailed {
                patch: patch_path,
                status,
            })
        }
    }

    fn run(&self, patch_path: &Path, reverse: bool) -> io::Result<ExitStatus> {
        let mut command = Command::new(&self.program);
        if reverse {
            command.arg("-R");
        }
        // patch prompts on stdin when a hunk looks already applied; starve it
        // so it takes its non-interactive default instead
        command
            .args(PATCH_FLAGS)
            .arg("-i")
            .arg(patch_path)
            .arg("-d")
            .arg(&self.source_dir)
            .stdin(Stdio::null())
            .status()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    // Stand-in for the patch program so exit behavior is deterministic.
    fn stub_tool(dir: &Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-patch");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn forward_success_is_applied() {
        let dir = TempDir::new().unwrap();
        let tool = stub_tool(dir.path(), "exit 0");
        let applier = PatchApplier::new(dir.path()).with_program(tool);

        let outcome = applier.apply(&PatchFile::new("usbmanager.patch")).unwrap();

        assert_eq!(outcome, PatchOutcome::Applied);
    }

    #[test]
    fn forward_failure_falls_back_to_reverse() {
        let dir = TempDir::new().unwrap();
        let tool = stub_tool(dir.path(), r#"case "$1" in -R) exit 0 ;; *) exit 1 ;; esac"#);
        let applier = PatchApplier::new(dir.path()).with_program(tool);

        let outcome = applier.apply(&PatchFile::new("usbmanager.patch")).unwrap();

        assert_eq!(outcome, PatchOutcome::Reverted);
    }

    #[test]
    fn reverse_failure_is_fatal() {
        let dir = TempDir::new().unwrap();
        let tool = stub_tool(dir.path(), "exit 1");
        let applier = PatchApplier::new(dir.path()).with_program(tool);

        let err = applier
            .apply(&PatchFile::new("usbmanager.patch"))
            .unwrap_err();

        assert!(matches!(
            err,
            PatchError::ReverseFailed { status, .. } if status.code() == Some(1),
        ));
    }

    #[test]
    fn missing_tool_is_a_spawn_error() {
        let dir = TempDir::new().unwrap();
        let applier = PatchApplier::new(dir.path()).with_program(dir.path().join("no-such-tool"));

        let err = applier
            .apply(&PatchFile::new("usbmanager.patch"))
            .unwrap_err();

        assert!(matches!(err, PatchError::Spawn { .. }));
    }

    #[test]
    fn forward_invocation_passes_expected_flags() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("args.log");
        let tool = stub_tool(
            dir.path(),
            &format!(r#"printf '%s\n' "$@" > "{}""#, log.display()),
        );
        let applier = PatchApplier::new(dir.path()).with_program(tool);
        let patch = PatchFile::new("usbmanager.patch");

        applier.apply(&patch).unwrap();

        let args = fs::read_to_string(&log).unwrap();
        let expected = format!(
            "-p1\n--fuzz=0\n--no-backup-if-mismatch\n-i\n{}\n-d\n{}\n",
            patch.path(dir.path()).display(),
            dir.path().display(),
        );
        assert_eq!(args, expected);
    }
}
