//! Jar archive listing.

use std::fs::File;
use std::path::Path;

use porcupine_core::class_space::{ArchiveEntry, ArchiveListing};
use zip::ZipArchive;

use crate::error::{LoadError, Result};

/// Read the central directory of the archive at `path`.
///
/// Entry data is never decompressed. The file handle is closed before
/// returning on every path.
pub fn read_listing(path: &Path) -> Result<ArchiveListing> {
    if !path.is_file() {
        return Err(LoadError::InvalidPath(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|source| LoadError::ArchiveIo {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(|source| LoadError::ArchiveFormat {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|source| LoadError::ArchiveFormat {
                path: path.to_path_buf(),
                source,
            })?;
        entries.push(ArchiveEntry {
            name: entry.name().to_string(),
            is_dir: entry.is_dir(),
        });
    }

    tracing::debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(ArchiveListing::new(path, entries))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use porcupine_test_utils::mod_folder::write_jar;

    use super::*;

    #[test]
    fn test_listing_preserves_entry_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mod.jar");
        write_jar(
            &path,
            &["org/", "org/example/Foo.class", "META-INF/MANIFEST.MF"],
        )
        .unwrap();

        let listing = read_listing(&path).unwrap();

        assert_eq!(listing.name, "mod.jar");
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["org/", "org/example/Foo.class", "META-INF/MANIFEST.MF"]);
        assert!(listing.entries[0].is_dir);
        assert_eq!(
            listing.class_names().collect::<Vec<_>>(),
            vec!["org.example.Foo"]
        );
    }

    #[test]
    fn test_not_a_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jar");
        fs::write(&path, b"nope").unwrap();
        assert!(matches!(
            read_listing(&path),
            Err(LoadError::ArchiveFormat { .. })
        ));
    }

    #[test]
    fn test_directory_is_invalid_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_listing(dir.path()),
            Err(LoadError::InvalidPath(_))
        ));
    }
}
