//! Config file checker.

use std::fs;
use std::path::Path;

use clap::ValueEnum;
use porcupine_core::raid::{ArmyComposer, RaidConfig};
use porcupine_loader::LoaderConfig;

use crate::error::{Result, ToolError};

/// Which config format a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKind {
    /// Loader settings.
    Loader,
    /// Raid event settings.
    Raid,
}

/// Parse and validate the file at `path`, returning a one-line summary.
pub fn check_config(path: &Path, kind: ConfigKind) -> Result<String> {
    let text = fs::read_to_string(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |source| ToolError::Parse {
        path: path.to_path_buf(),
        source,
    };

    match kind {
        ConfigKind::Loader => {
            let config = LoaderConfig::from_ron(&text).map_err(parse_error)?;
            for root in config.mod_roots.iter().filter(|root| !root.is_dir()) {
                tracing::warn!("Mods root {} does not exist", root.display());
            }
            Ok(format!(
                "loader config ok: {} roots, tag {}, {} class space",
                config.mod_roots.len(),
                config.game_version_tag,
                if config.shared_class_space { "shared" } else { "isolated" }
            ))
        }
        ConfigKind::Raid => {
            let config = RaidConfig::from_ron(&text).map_err(parse_error)?;
            ArmyComposer::new(config.composer.clone())?;
            if config.chance_per_second <= 0.0 {
                tracing::warn!("Raids are disabled (chance_per_second is {})", config.chance_per_second);
            }
            Ok(format!(
                "raid config ok: chance {}/s, divisions of {}, minimum army {}",
                config.chance_per_second,
                config.composer.pawns_per_division,
                config.composer.min_army_size
            ))
        }
    }
}
