// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

//! Build-tree preparation for a vendored SANE backend.
//!
//! This crate readies a vendored scanner backend source tree for an
//! out-of-tree build in two sequential actions: apply the tree's shipped
//! patches, then copy a fixed set of sources and headers into the build's
//! generation directory. Both actions shell out to the ordinary external
//! tools (`patch` and `cp`), so their output lands on the inherited stdio
//! exactly as it would in a shell script.
//!
//! A failed forward patch is answered by a reverse apply of the same patch,
//! so running twice against the same tree never leaves it half-patched.
//!
//! # Examples
//!
//! Preparing a generation directory from a vendored tree:
//!
//! ```no_run
//! use std::path::Path;
//! use saneprep::Manifest;
//!
//! # fn main() -> Result<(), saneprep::InstallError> {
//! let manifest = Manifest::sane_backends();
//! let report = saneprep::install(
//!     &manifest,
//!     Path::new("/vendor/backends"),
//!     Path::new("out/gen/sane"),
//! )?;
//!
//! assert_eq!(report.copied(), manifest.copies.len());
//! # Ok(())
//! # }
//! ```

mod copy;
mod install;
mod manifest;
mod patch;

pub use copy::{CopyError, FileCopier};
pub use install::{install, InstallError, Installer, Report, StepOutcome};
pub use manifest::{CopyEntry, Manifest, PatchFile};
pub use patch::{PatchApplier, PatchError, PatchOutcome};
