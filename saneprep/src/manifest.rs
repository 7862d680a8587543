// Copyright 2025 Logan Magee
//
// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

/// The set of patches to apply and files to copy for one preparation run.
///
/// A manifest is plain data. The steps it describes are executed in order by
/// an [`Installer`](crate::Installer): every patch first, then every copy.
///
/// # Examples
///
/// ```
/// use saneprep::Manifest;
///
/// let manifest = Manifest::sane_backends();
///
/// assert_eq!(manifest.patches.len(), 1);
/// assert_eq!(manifest.copies.len(), 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    /// Patches to apply to the source tree, in order.
    pub patches: Vec<PatchFile>,
    /// Files to copy into the generation directory, in order.
    pub copies: Vec<CopyEntry>,
}

/// A unified-diff patch file shipped in the source tree's `patches/`
/// directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatchFile {
    /// File name of the patch under `patches/`.
    pub name: String,
}

/// A single file to copy out of the source tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyEntry {
    /// Path of the file to copy, relative to the source directory.
    pub source: PathBuf,
    /// Destination path, relative to the generation directory. The parent
    /// directory must already exist.
    pub dest: PathBuf,
}

impl Manifest {
    /// Returns the manifest for the vendored SANE backend tree.
    ///
    /// This covers the USB manager patch and the four sources the build
    /// consumes out of `sanei/` and `include/sane/`.
    pub fn sane_backends() -> Self {
        Self {
            patches: vec![PatchFile::new("usbmanager.patch")],
            copies: vec![
                CopyEntry::new("sanei/usb_manager.cpp", "src/usb_manager.cpp"),
                CopyEntry::new("sanei/sanei_usb.c", "src/sanei_usb.c"),
                CopyEntry::new("include/sane/usb_manager.h", "include/usb_manager.h"),
                CopyEntry::new("include/sane/config.h", "include/config.h"),
            ],
        }
    }
}

impl PatchFile {
    /// Creates a patch entry for the named file under `patches/`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Resolves the patch file's location under `source_dir`.
    pub fn path(&self, source_dir: &Path) -> PathBuf {
        source_dir.join("patches").join(&self.name)
    }
}

impl CopyEntry {
    /// Creates a copy entry from a source-relative path to a
    /// generation-relative path.
    pub fn new(source: impl Into<PathBuf>, dest: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
        }
    }

    /// Resolves the file to copy under `source_dir`.
    pub fn source_path(&self, source_dir: &Path) -> PathBuf {
        source_dir.join(&self.source)
    }

    /// Resolves the copy destination under `gen_dir`.
    pub fn dest_path(&self, gen_dir: &Path) -> PathBuf {
        gen_dir.join(&self.dest)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn patch_resolves_under_patches_dir() {
        let patch = PatchFile::new("usbmanager.patch");

        assert_eq!(
            patch.path(Path::new("/vendor/backends")),
            Path::new("/vendor/backends/patches/usbmanager.patch"),
        );
    }

    #[test]
    fn copy_entry_resolves_both_roots() {
        let entry = CopyEntry::new("sanei/sanei_usb.c", "src/sanei_usb.c");

        assert_eq!(
            entry.source_path(Path::new("/vendor/backends")),
            Path::new("/vendor/backends/sanei/sanei_usb.c"),
        );
        assert_eq!(
            entry.dest_path(Path::new("/out/gen/sane")),
            Path::new("/out/gen/sane/src/sanei_usb.c"),
        );
    }

    #[test]
    fn sane_backends_lists_headers_after_sources() {
        let manifest = Manifest::sane_backends();

        let dests: Vec<_> = manifest.copies.iter().map(|c| c.dest.as_path()).collect();
        assert_eq!(
            dests,
            [
                Path::new("src/usb_manager.cpp"),
                Path::new("src/sanei_usb.c"),
                Path::new("include/usb_manager.h"),
                Path::new("include/config.h"),
            ],
        );
    }
}
