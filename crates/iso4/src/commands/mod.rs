//! Command implementations.

use anyhow::Context;
use camino::Utf8Path;
use iso4_core::{Abbreviator, Config, Lexicon};

pub mod abbreviate;
pub mod doctor;
pub mod info;
pub mod lexicon;
pub mod lookup;
#[cfg(feature = "mcp")]
pub mod serve;

/// Read a file and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    if let Some(max) = max_bytes {
        let size = metadata.len() as usize;
        if size > max {
            anyhow::bail!("input too large: {path} is {size} bytes (limit: {max} bytes)");
        }
    }

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

/// Load the configured lexicon.
pub fn load_lexicon(config: &Config) -> anyhow::Result<std::sync::Arc<Lexicon>> {
    Lexicon::from_config(config).context("failed to load LTWA lexicon")
}

/// Build the abbreviator described by a configuration.
pub fn load_abbreviator(config: &Config) -> anyhow::Result<Abbreviator> {
    let lexicon = load_lexicon(config)?;
    Ok(Abbreviator::new(lexicon).with_conflict_scan(config.conflict_scan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(path: std::path::PathBuf) -> camino::Utf8PathBuf {
        camino::Utf8PathBuf::try_from(path).unwrap()
    }

    #[test]
    fn reads_file_within_limit() {
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("titles.txt"));
        std::fs::write(&path, "Journal of Applied Physics\n").unwrap();

        let content = read_input_file(&path, Some(1024)).unwrap();
        assert_eq!(content, "Journal of Applied Physics\n");
    }

    #[test]
    fn rejects_file_over_limit() {
        let tmp = TempDir::new().unwrap();
        let path = utf8(tmp.path().join("titles.txt"));
        std::fs::write(&path, "Journal of Applied Physics\n").unwrap();

        let err = read_input_file(&path, Some(4)).unwrap_err();
        assert!(err.to_string().contains("input too large"));
    }

    #[test]
    fn missing_file_names_path() {
        let err = read_input_file(Utf8Path::new("/nonexistent/titles.txt"), None).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/titles.txt"));
    }

    #[test]
    fn default_config_uses_bundled_lexicon() {
        let abbreviator = load_abbreviator(&Config::default()).unwrap();
        assert!(std::sync::Arc::ptr_eq(
            abbreviator.lexicon(),
            &Lexicon::bundled()
        ));
    }
}
