//! Dataset and diff persistence.
//!
//! Each artifact is a directory named after the commits involved, holding a
//! single pretty-printed JSON file. The CI workflow is expected to upload
//! the whole artifact directory; this tool only materializes it.

use crate::core::DatasetMap;
use crate::diff::DatasetDiffMap;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

const DATASET_ARTIFACT_FILE: &str = "dataset.json";
const DIFF_ARTIFACT_FILE: &str = "diff.json";

/// Artifact name for the head-state dataset map.
pub fn head_artifact_name(head_sha: &str) -> String {
    format!("autometrics-after-{head_sha}")
}

/// Artifact name for the base-state dataset map.
pub fn base_artifact_name(base_sha: &str) -> String {
    format!("autometrics-before-{base_sha}")
}

/// Artifact name for the diff between the two states.
pub fn diff_artifact_name(base_sha: &str, head_sha: &str) -> String {
    format!("autometrics-diff-{base_sha}-{head_sha}")
}

/// Write a dataset map artifact, returning the path of the JSON file.
pub fn store_dataset_map(dir: &Path, name: &str, data: &DatasetMap) -> Result<PathBuf> {
    store_json_artifact(dir, name, DATASET_ARTIFACT_FILE, data)
}

/// Write a diff map artifact, returning the path of the JSON file.
pub fn store_diff_map(dir: &Path, name: &str, data: &DatasetDiffMap) -> Result<PathBuf> {
    store_json_artifact(dir, name, DIFF_ARTIFACT_FILE, data)
}

fn store_json_artifact<T: Serialize>(
    dir: &Path,
    name: &str,
    file_name: &str,
    data: &T,
) -> Result<PathBuf> {
    let artifact_dir = dir.join(name);
    fs::create_dir_all(&artifact_dir)
        .with_context(|| format!("failed to create artifact directory {}", artifact_dir.display()))?;

    let path = artifact_dir.join(file_name);
    let json = serde_json::to_string_pretty(data)?;
    fs::write(&path, json)
        .with_context(|| format!("failed to write artifact {}", path.display()))?;
    log::info!("stored artifact {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Dataset, FunctionId};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn artifact_names_follow_the_commit_scheme() {
        assert_eq!(head_artifact_name("abc"), "autometrics-after-abc");
        assert_eq!(base_artifact_name("def"), "autometrics-before-def");
        assert_eq!(diff_artifact_name("def", "abc"), "autometrics-diff-def-abc");
    }

    #[test]
    fn stored_dataset_map_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut map = DatasetMap::new();
        map.insert(
            ".".into(),
            Dataset {
                instrumented: vec![FunctionId::new("main", "main")],
                uninstrumented: vec![],
            },
        );

        let path = store_dataset_map(dir.path(), &head_artifact_name("abc"), &map).unwrap();
        assert!(path.ends_with("autometrics-after-abc/dataset.json"));

        let loaded: DatasetMap =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, map);
    }

    #[test]
    fn diff_artifact_lands_in_its_own_directory() {
        let dir = TempDir::new().unwrap();
        let diff = DatasetDiffMap::new();
        let path = store_diff_map(dir.path(), &diff_artifact_name("b", "h"), &diff).unwrap();
        assert!(path.ends_with("autometrics-diff-b-h/diff.json"));
    }
}
