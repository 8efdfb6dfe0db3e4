//! Invocation of the `am_list` static analyzer.
//!
//! `am_list` walks a source root and lists every function it finds, together
//! with the location of its autometrics annotation when there is one. This
//! module locates the binary, runs it per configured root and splits its
//! JSON output into a [`Dataset`].

use crate::core::{Dataset, DatasetMap, FunctionId};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

/// Name the analyzer binary is looked up under on PATH.
pub const AM_LIST_BIN: &str = "am_list";

/// Languages the analyzer understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
    Rust,
    Typescript,
    Go,
    Python,
}

impl Language {
    /// Value passed to `am_list -l`.
    pub fn as_arg(self) -> &'static str {
        match self {
            Language::Rust => "rust",
            Language::Typescript => "typescript",
            Language::Go => "go",
            Language::Python => "python",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// One source root to analyze, with the language to analyze it as.
#[derive(Clone, Debug)]
pub struct AnalysisRoot {
    pub root: String,
    pub language: Language,
}

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("{AM_LIST_BIN} not found in PATH (pass --am-list to point at a binary)")]
    BinaryNotFound(#[source] which::Error),
    #[error("{AM_LIST_BIN} exited with {status} while listing {root}: {stderr}")]
    Failed {
        status: ExitStatus,
        root: String,
        stderr: String,
    },
    #[error("failed to parse {AM_LIST_BIN} output for {root}")]
    Parse {
        root: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One entry of `am_list list -a` JSON output.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ListedFunction {
    id: FunctionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    definition: Option<SourceLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instrumentation: Option<SourceLocation>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SourceLocation {
    file: String,
    range: SourceRange,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SourceRange {
    start: SourcePosition,
    end: SourcePosition,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct SourcePosition {
    line: u32,
    column: u32,
}

/// Handle on a located `am_list` binary.
pub struct AmList {
    binary: PathBuf,
}

impl AmList {
    /// Use the given binary, or find one on PATH.
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self> {
        let binary = match explicit {
            Some(path) => path,
            None => which::which(AM_LIST_BIN).map_err(AnalyzerError::BinaryNotFound)?,
        };
        log::debug!("using analyzer binary at {}", binary.display());
        Ok(Self { binary })
    }

    /// Run the analyzer over one source root and classify its functions.
    pub fn compute_dataset(&self, root: &Path, language: Language) -> Result<Dataset> {
        let output = Command::new(&self.binary)
            .args(["list", "-a", "-l", language.as_arg()])
            .arg(root)
            .output()
            .with_context(|| format!("failed to run {}", self.binary.display()))?;

        if !output.status.success() {
            return Err(AnalyzerError::Failed {
                status: output.status,
                root: root.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }

        parse_listing(&output.stdout).map_err(|source| {
            AnalyzerError::Parse {
                root: root.display().to_string(),
                source,
            }
            .into()
        })
    }
}

/// Build the dataset map for every configured root in the current tree.
pub fn compute_dataset_map(am_list: &AmList, roots: &[AnalysisRoot]) -> Result<DatasetMap> {
    let mut map = DatasetMap::new();
    for spec in roots {
        log::info!("analyzing {} ({})", spec.root, spec.language);
        let dataset = am_list.compute_dataset(Path::new(&spec.root), spec.language)?;
        log::debug!(
            "{}: {} instrumented / {} functions",
            spec.root,
            dataset.instrumented.len(),
            dataset.total()
        );
        map.insert(spec.root.clone(), dataset);
    }
    Ok(map)
}

/// Pure: split the analyzer listing into instrumented and other functions.
/// A function is instrumented iff the analyzer reports an annotation site.
fn parse_listing(raw: &[u8]) -> serde_json::Result<Dataset> {
    let functions: Vec<ListedFunction> = serde_json::from_slice(raw)?;
    let mut dataset = Dataset::default();
    for function in functions {
        if function.instrumentation.is_some() {
            dataset.instrumented.push(function.id);
        } else {
            dataset.uninstrumented.push(function.id);
        }
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LISTING: &str = r#"[
        {
            "id": {"module": "main", "function": "main"},
            "definition": {
                "file": "src/main.rs",
                "range": {"start": {"line": 10, "column": 0}, "end": {"line": 20, "column": 1}}
            },
            "instrumentation": {
                "file": "src/main.rs",
                "range": {"start": {"line": 9, "column": 0}, "end": {"line": 9, "column": 14}}
            }
        },
        {
            "id": {"module": "main::db", "function": "add_user"},
            "definition": {
                "file": "src/db.rs",
                "range": {"start": {"line": 4, "column": 0}, "end": {"line": 9, "column": 1}}
            }
        }
    ]"#;

    #[test]
    fn annotated_functions_are_classified_as_instrumented() {
        let dataset = parse_listing(LISTING.as_bytes()).unwrap();
        assert_eq!(dataset.instrumented, vec![FunctionId::new("main", "main")]);
        assert_eq!(
            dataset.uninstrumented,
            vec![FunctionId::new("main::db", "add_user")]
        );
    }

    #[test]
    fn empty_listing_yields_empty_dataset() {
        let dataset = parse_listing(b"[]").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn malformed_listing_is_a_parse_error() {
        assert!(parse_listing(b"not json").is_err());
    }

    #[test]
    fn language_args_match_am_list_cli() {
        assert_eq!(Language::Rust.as_arg(), "rust");
        assert_eq!(Language::Typescript.as_arg(), "typescript");
        assert_eq!(Language::Go.as_arg(), "go");
        assert_eq!(Language::Python.as_arg(), "python");
    }
}
