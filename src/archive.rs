//! Transport archive packing and unpacking.
//!
//! Transport archives are plain tar containers with flat member names.
//! Member stems encode host identity, so packing always preserves the
//! source filename and unpacking flattens members to their basename.
//! Entry paths are validated against traversal before extraction.

use crate::error::{FerryError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::path::{Component, Path};

/// Pack the given files into a tar archive at `output`.
///
/// Each entry is a `(source_path, member_name)` pair; the member name
/// determines the filename inside the archive.
///
/// # Errors
///
/// Returns [`FerryError::ArchivePack`] if any source cannot be read or
/// the archive cannot be written. Pack failures are fatal for a phase.
pub fn pack_files(output: &Utf8Path, files: &[(Utf8PathBuf, String)]) -> Result<()> {
    let pack = || -> std::io::Result<()> {
        let output_file = fs::File::create(output)?;
        let mut archive = tar::Builder::new(output_file);
        for (source_path, member_name) in files {
            archive.append_path_with_name(source_path, member_name)?;
        }
        archive.finish()
    };
    pack().map_err(|e| FerryError::ArchivePack {
        path: output.to_owned(),
        reason: e.to_string(),
    })
}

/// Pack every regular file directly under `dir` into `output`, keeping
/// each file's own name as the member name.
///
/// Members are sorted by name so archive contents are reproducible for
/// a given directory state.
///
/// # Errors
///
/// Returns [`FerryError::ArchivePack`] on any read or write failure.
pub fn pack_dir(dir: &Utf8Path, output: &Utf8Path) -> Result<()> {
    let mut files = Vec::new();
    let entries = fs::read_dir(dir).map_err(|e| FerryError::ArchivePack {
        path: output.to_owned(),
        reason: format!("cannot read {dir}: {e}"),
    })?;
    for entry in entries {
        let entry = entry.map_err(|e| FerryError::ArchivePack {
            path: output.to_owned(),
            reason: e.to_string(),
        })?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.path()).map_err(|p| {
            FerryError::ArchivePack {
                path: output.to_owned(),
                reason: format!("non-UTF-8 filename: {}", p.display()),
            }
        })?;
        let name = path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default();
        files.push((path, name));
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));
    pack_files(output, &files)
}

/// Unpack a tar archive into `dest`, flattening members to their
/// basename. Returns the extracted paths in archive order.
///
/// # Errors
///
/// Returns [`FerryError::ArchiveUnpack`] if the archive cannot be read
/// or an entry cannot be written, and [`FerryError::PathTraversal`] if
/// an entry path is absolute or contains `..`. Unpack failures are
/// fatal for a phase.
pub fn unpack(archive_path: &Utf8Path, dest: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    let file = fs::File::open(archive_path).map_err(|e| FerryError::ArchiveUnpack {
        path: archive_path.to_owned(),
        reason: e.to_string(),
    })?;
    let mut archive = tar::Archive::new(file);
    let mut extracted = Vec::new();

    let entries = archive.entries().map_err(|e| FerryError::ArchiveUnpack {
        path: archive_path.to_owned(),
        reason: e.to_string(),
    })?;
    for entry_result in entries {
        let mut entry = entry_result.map_err(|e| FerryError::ArchiveUnpack {
            path: archive_path.to_owned(),
            reason: e.to_string(),
        })?;
        let entry_path = entry
            .path()
            .map_err(|e| FerryError::ArchiveUnpack {
                path: archive_path.to_owned(),
                reason: e.to_string(),
            })?
            .into_owned();

        validate_entry_path(&entry_path)?;

        if entry.header().entry_type().is_dir() {
            continue;
        }
        let Some(name) = entry_path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let dest_path = dest.join(name);
        entry
            .unpack(&dest_path)
            .map_err(|e| FerryError::ArchiveUnpack {
                path: archive_path.to_owned(),
                reason: e.to_string(),
            })?;
        extracted.push(dest_path);
    }
    Ok(extracted)
}

/// Remove and recreate a scratch directory, so a rerun never sees a
/// previous run's partial output.
///
/// # Errors
///
/// Returns [`FerryError::Io`] if the directory cannot be removed or
/// created.
pub fn recreate_dir(dir: &Utf8Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Reject tar entry paths that would escape the destination directory.
fn validate_entry_path(path: &Path) -> Result<()> {
    if path.is_absolute() || path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(FerryError::PathTraversal {
            entry: path.display().to_string(),
        });
    }
    Ok(())
}
