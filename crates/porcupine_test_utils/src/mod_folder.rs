//! Real mod folders on disk.
//!
//! Builds the layout the loader expects under a temporary directory:
//!
//! ```text
//! <root>/<mod>/mod.ron
//! <root>/<mod>/V63/saves/<name>.properties
//! <root>/<mod>/V63/script/jar/<file>.jar
//! ```

use std::collections::HashMap;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Game version tag used by fixture folders.
pub const FIXTURE_TAG: &str = "V63";

/// A temporary mods root.
pub struct ModsRoot {
    dir: TempDir,
}

impl ModsRoot {
    /// Create an empty mods root.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Root path.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory of mod `name`, created if missing.
    pub fn mod_dir(&self, name: &str) -> io::Result<PathBuf> {
        let dir = self.path().join(name);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Scripts directory of mod `name`, created if missing.
    pub fn scripts_dir(&self, name: &str) -> io::Result<PathBuf> {
        let dir = self.mod_dir(name)?.join(FIXTURE_TAG).join("script").join("jar");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Saves directory of mod `name`, created if missing.
    pub fn saves_dir(&self, name: &str) -> io::Result<PathBuf> {
        let dir = self.mod_dir(name)?.join(FIXTURE_TAG).join("saves");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write `mod.ron` for mod `name`.
    pub fn write_manifest(
        &self,
        name: &str,
        display_name: &str,
        version: &str,
        author: &str,
    ) -> io::Result<PathBuf> {
        let path = self.mod_dir(name)?.join("mod.ron");
        let text = format!(
            "(\n    name: {},\n    description: \"Fixture mod\",\n    author: {},\n    version: {},\n)\n",
            ron_string(display_name)?,
            ron_string(author)?,
            ron_string(version)?,
        );
        fs::write(&path, text)?;
        Ok(path)
    }

    /// Write a jar named `file_name` into mod `name`'s scripts directory.
    ///
    /// Entries ending in `/` become directories.
    pub fn write_jar(&self, name: &str, file_name: &str, entries: &[&str]) -> io::Result<PathBuf> {
        let path = self.scripts_dir(name)?.join(file_name);
        write_jar(&path, entries)?;
        Ok(path)
    }

    /// Write a file with a `.jar` name that is not a zip archive.
    pub fn write_corrupt_jar(&self, name: &str, file_name: &str) -> io::Result<PathBuf> {
        let path = self.scripts_dir(name)?.join(file_name);
        fs::write(&path, b"definitely not a zip archive")?;
        Ok(path)
    }

    /// Write `saves/<file_name>` for mod `name`.
    pub fn write_config(
        &self,
        name: &str,
        file_name: &str,
        pairs: &[(&str, &str)],
    ) -> io::Result<PathBuf> {
        let path = self.saves_dir(name)?.join(file_name);
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let file = File::create(&path)?;
        java_properties::write(file, &map).map_err(io::Error::other)?;
        Ok(path)
    }
}

/// Write a stored (uncompressed) zip archive at `path`.
pub fn write_jar(path: &Path, entries: &[&str]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for entry in entries {
        if entry.ends_with('/') {
            zip.add_directory(*entry, options).map_err(io::Error::other)?;
        } else {
            zip.start_file(*entry, options).map_err(io::Error::other)?;
            io::Write::write_all(&mut zip, b"\xCA\xFE\xBA\xBE")?;
        }
    }

    zip.finish().map_err(io::Error::other)?;
    Ok(())
}

/// `.class` entry path for a dotted class name.
#[must_use]
pub fn class_entry(class_name: &str) -> String {
    format!("{}.class", class_name.replace('.', "/"))
}

fn ron_string(value: &str) -> io::Result<String> {
    ron::to_string(value).map_err(io::Error::other)
}
