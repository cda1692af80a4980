//! Loading of the static metadata pool (`pairs_list.json`).

use std::path::{Path, PathBuf};

use survey_core::model::MetadataPool;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MetadataError {
    #[error("failed to read metadata file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed metadata file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads the slot list from a JSON file.
///
/// A blank file yields an empty pool, the same as `[]`. A `null` slot is an
/// empty slot.
///
/// # Errors
///
/// Returns `MetadataError` if the file cannot be read or is not a list of
/// slots of `[groundTruth, optionA, optionB]` triples.
pub fn load_pool(path: impl AsRef<Path>) -> Result<MetadataPool, MetadataError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_pool(path, &raw)
}

fn parse_pool(path: &Path, raw: &str) -> Result<MetadataPool, MetadataError> {
    if raw.trim().is_empty() {
        return Ok(MetadataPool::empty());
    }
    serde_json::from_str(raw).map_err(|source| MetadataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_slots_from_file() {
        let file = write_temp(r#"[[["g0","a0","b0"]],[],[["g2","a2","b2"],["g3","a3","b3"]]]"#);
        let pool = load_pool(file.path()).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.populated_slots(), 2);
        assert_eq!(pool.slot(2).unwrap().len(), 2);
    }

    #[test]
    fn null_slots_are_kept_as_empty_positions() {
        let file = write_temp(r#"[[["g0","a0","b0"]],null,[["g2","a2","b2"]]]"#);
        let pool = load_pool(file.path()).unwrap();
        assert_eq!(pool.len(), 3);
        assert!(pool.slot(1).unwrap().is_empty());
        assert_eq!(pool.populated_slots(), 2);
        assert_eq!(pool.slot(2).unwrap().get(0).unwrap().ground_truth(), "g2");
    }

    #[test]
    fn blank_file_is_empty_pool() {
        let file = write_temp("  \n");
        assert!(load_pool(file.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_pool(dir.path().join("pairs_list.json")).unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let file = write_temp(r#"[[["only-two","refs"]]]"#);
        let err = load_pool(file.path()).unwrap_err();
        assert!(matches!(err, MetadataError::Parse { .. }));
    }
}
