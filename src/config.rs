use directories::ProjectDirs;
use gridcalc_core::{DependencyPolicy, EngineOptions};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    engine: Option<EngineSection>,
    workbook: Option<WorkbookSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineSection {
    dependency_policy: Option<DependencyPolicy>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkbookSection {
    default_sheet: Option<String>,
}

pub(crate) fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("me", "shoryuken", "gridcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Build engine options from the config file, collecting warnings instead of failing.
///
/// An explicit `config_file` that is missing is reported; a missing user
/// config is not.
pub fn load_options(config_file: Option<&Path>, no_config: bool) -> (EngineOptions, Vec<String>) {
    let mut warnings = Vec::new();
    let path = match config_file {
        Some(p) => Some(p.to_path_buf()),
        None if no_config => None,
        None => user_config_path(),
    };

    let mut file = ConfigFile::default();
    if let Some(path) = path.as_ref() {
        if path.exists() {
            match read_config(path) {
                Ok(parsed) => file = parsed,
                Err(warning) => warnings.push(warning),
            }
        } else if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
    }

    let mut options = EngineOptions::default();
    if let Some(policy) = file.engine.and_then(|e| e.dependency_policy) {
        options.dependency_policy = policy;
    }
    match file.workbook.and_then(|w| w.default_sheet) {
        Some(name) if name.trim().is_empty() => {
            warnings.push("Ignoring empty workbook.default_sheet".to_string())
        }
        Some(name) => options.default_sheet = name,
        None => {}
    }
    (options, warnings)
}

fn read_config(path: &Path) -> Result<ConfigFile, String> {
    let meta = std::fs::metadata(path)
        .map_err(|err| format!("Failed to read metadata for {}: {}", path.display(), err))?;
    if meta.len() > MAX_CONFIG_FILE_BYTES {
        return Err(format!(
            "Refusing to read {}: file too large ({} bytes, max {})",
            path.display(),
            meta.len(),
            MAX_CONFIG_FILE_BYTES
        ));
    }
    let content = std::fs::read_to_string(path)
        .map_err(|err| format!("Failed to read {}: {}", path.display(), err))?;
    toml::from_str(&content).map_err(|err| format!("Failed to parse {}: {}", path.display(), err))
}
