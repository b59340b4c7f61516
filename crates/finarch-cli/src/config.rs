use std::path::Path;

use anyhow::Context;
use finarch_sdk::FinArchConfig;
use tracing::Level;

/// Log to stderr so `--format json` output stays parseable.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Configuration for this run: the file when given, otherwise defaults.
///
/// An explicitly named file must exist.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<FinArchConfig> {
    let Some(path) = path else {
        return Ok(FinArchConfig::default());
    };
    anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
    FinArchConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn no_path_gives_defaults() {
        assert_eq!(load_config(None).unwrap(), FinArchConfig::default());
    }

    #[test]
    fn missing_named_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn file_values_are_applied() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "screening = true\n\n[chain]\ndifficulty = 2\nworkers = 3").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!(config.screening);
        assert_eq!(config.chain.difficulty, 2);
        assert_eq!(config.chain.workers, 3);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chain\ndifficulty = ").unwrap();
        assert!(load_config(Some(file.path())).is_err());
    }
}
