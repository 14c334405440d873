//! Locating and loading the configuration of a run.
//!
//! Lookup order:
//!
//! 1. `--config` / `KTSCAN_CONFIG`
//! 2. `ktscan.toml` or `.ktscan.toml` in the start directory or the nearest
//!    ancestor that has one, without crossing a Gradle or git project root
//! 3. `config.toml` in the global directory (`$KTSCAN_CONFIG_DIR` or `~/.ktscan`)
//! 4. Built-in defaults
//!
//! A relative `analyzer.root` is resolved against the directory of the
//! explicit or project config file that set it.

use anyhow::{Context, Result};
use ktscan_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order.
const PROJECT_CONFIG_NAMES: &[&str] = &["ktscan.toml", ".ktscan.toml"];

/// Entries marking the top of a project; the upward search stops there.
const PROJECT_ROOT_MARKERS: &[&str] = &["settings.gradle.kts", "settings.gradle", ".git"];

/// Config file name within the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// A loaded configuration and where it came from.
#[derive(Debug, Default)]
pub struct ResolvedConfig {
    /// The configuration, or defaults when no file was found.
    pub config: Config,
    /// File the configuration was read from.
    pub origin: Option<PathBuf>,
    /// Directory a relative `analyzer.root` is resolved against.
    base: Option<PathBuf>,
}

impl ResolvedConfig {
    /// Directory or file to analyze.
    ///
    /// A path given on the command line wins over `analyzer.root`.
    #[must_use]
    pub fn analysis_root(&self, cli_path: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_path {
            return path.to_path_buf();
        }
        let root = &self.config.analyzer.root;
        match &self.base {
            Some(base) if root.is_relative() => base.join(root),
            _ => root.clone(),
        }
    }
}

/// Loads the configuration for a run started at `start`.
///
/// # Errors
///
/// Returns an error if the selected config file cannot be read or parsed.
pub fn load(start: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    load_with_global(start, explicit, global_config_dir().as_deref())
}

fn load_with_global(
    start: &Path,
    explicit: Option<&Path>,
    global_dir: Option<&Path>,
) -> Result<ResolvedConfig> {
    if let Some(path) = explicit {
        return read(path, true);
    }

    if let Some(path) = find_project_config(start) {
        tracing::debug!("Found project config: {}", path.display());
        return read(&path, true);
    }

    let global = global_dir
        .map(|dir| dir.join(GLOBAL_CONFIG_NAME))
        .filter(|path| path.is_file());
    if let Some(path) = global {
        tracing::info!("Using global config: {}", path.display());
        return read(&path, false);
    }

    Ok(ResolvedConfig::default())
}

fn read(path: &Path, anchors_root: bool) -> Result<ResolvedConfig> {
    let config = Config::from_file(path)
        .with_context(|| format!("Failed to load config: {}", path.display()))?;
    let base = if anchors_root {
        path.parent().map(Path::to_path_buf)
    } else {
        None
    };
    Ok(ResolvedConfig {
        config,
        origin: Some(path.to_path_buf()),
        base,
    })
}

/// Searches `start` and its ancestors for a project config file.
fn find_project_config(start: &Path) -> Option<PathBuf> {
    let dir = match start.parent() {
        Some(parent) if start.is_file() => parent,
        _ => start,
    };
    let dir = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(dir)
    };

    for ancestor in dir.ancestors() {
        let found = PROJECT_CONFIG_NAMES
            .iter()
            .map(|name| ancestor.join(name))
            .find(|candidate| candidate.is_file());
        if found.is_some() {
            return found;
        }
        if PROJECT_ROOT_MARKERS
            .iter()
            .any(|marker| ancestor.join(marker).exists())
        {
            break;
        }
    }
    None
}

/// Returns the global config directory path.
///
/// Resolution: `$KTSCAN_CONFIG_DIR` > `~/.ktscan/`
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("KTSCAN_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".ktscan"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// A temporary git project, so the upward search stops inside it.
    fn project() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".git")).unwrap();
        fs::create_dir_all(tmp.path().join("app/src")).unwrap();
        tmp
    }

    #[test]
    fn explicit_wins_over_project_config() {
        let tmp = project();
        fs::write(tmp.path().join("ktscan.toml"), "preset = \"rules\"").unwrap();
        let explicit = tmp.path().join("custom.toml");
        fs::write(&explicit, "preset = \"metrics\"").unwrap();

        let resolved = load_with_global(tmp.path(), Some(&explicit), None).unwrap();
        assert_eq!(resolved.origin, Some(explicit));
        assert_eq!(resolved.config.preset.as_deref(), Some("metrics"));
    }

    #[test]
    fn finds_config_in_an_ancestor() {
        let tmp = project();
        fs::write(tmp.path().join(".ktscan.toml"), "").unwrap();

        let resolved = load_with_global(&tmp.path().join("app/src"), None, None).unwrap();
        assert_eq!(resolved.origin, Some(tmp.path().join(".ktscan.toml")));
    }

    #[test]
    fn plain_name_preferred_over_dot_prefix() {
        let tmp = project();
        fs::write(tmp.path().join("ktscan.toml"), "").unwrap();
        fs::write(tmp.path().join(".ktscan.toml"), "").unwrap();

        let resolved = load_with_global(tmp.path(), None, None).unwrap();
        assert_eq!(resolved.origin, Some(tmp.path().join("ktscan.toml")));
    }

    #[test]
    fn search_stops_at_gradle_root() {
        let tmp = project();
        fs::write(tmp.path().join("ktscan.toml"), "").unwrap();
        fs::write(tmp.path().join("app/settings.gradle.kts"), "").unwrap();

        let resolved = load_with_global(&tmp.path().join("app/src"), None, None).unwrap();
        assert!(resolved.origin.is_none());
    }

    #[test]
    fn file_start_searches_from_its_directory() {
        let tmp = project();
        fs::write(tmp.path().join("app/ktscan.toml"), "").unwrap();
        let file = tmp.path().join("app/src/Main.kt");
        fs::write(&file, "").unwrap();

        let resolved = load_with_global(&file, None, None).unwrap();
        assert_eq!(resolved.origin, Some(tmp.path().join("app/ktscan.toml")));
    }

    #[test]
    fn global_config_used_without_project_config() {
        let tmp = project();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "preset = \"rules\"").unwrap();

        let resolved = load_with_global(tmp.path(), None, Some(global.path())).unwrap();
        assert_eq!(resolved.origin, Some(global.path().join("config.toml")));
        assert_eq!(resolved.config.preset.as_deref(), Some("rules"));
    }

    #[test]
    fn defaults_when_nothing_is_found() {
        let tmp = project();
        let empty_global = TempDir::new().unwrap();

        let resolved = load_with_global(tmp.path(), None, Some(empty_global.path())).unwrap();
        assert!(resolved.origin.is_none());
        assert_eq!(resolved.analysis_root(None), PathBuf::from("."));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let tmp = project();
        fs::write(tmp.path().join("ktscan.toml"), "analyzer = 3").unwrap();

        assert!(load_with_global(tmp.path(), None, None).is_err());
    }

    #[test]
    fn analyzer_root_is_relative_to_project_config() {
        let tmp = project();
        fs::write(tmp.path().join("ktscan.toml"), "[analyzer]\nroot = \"app/src\"\n").unwrap();

        let resolved = load_with_global(tmp.path(), None, None).unwrap();
        assert_eq!(resolved.analysis_root(None), tmp.path().join("app/src"));
        assert_eq!(
            resolved.analysis_root(Some(Path::new("other"))),
            PathBuf::from("other")
        );
    }

    #[test]
    fn global_root_stays_relative_to_working_directory() {
        let tmp = project();
        let global = TempDir::new().unwrap();
        fs::write(global.path().join("config.toml"), "[analyzer]\nroot = \"src\"\n").unwrap();

        let resolved = load_with_global(tmp.path(), None, Some(global.path())).unwrap();
        assert_eq!(resolved.analysis_root(None), PathBuf::from("src"));
    }
}
