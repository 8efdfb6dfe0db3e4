//! `snapshot`: analyze the working tree and write the dataset map.

use crate::analyzer::{compute_dataset_map, AmList, AnalysisRoot};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

pub struct SnapshotConfig {
    pub roots: Vec<AnalysisRoot>,
    pub am_list: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub fn run(config: SnapshotConfig) -> Result<()> {
    let am_list = AmList::locate(config.am_list)?;
    let datasets = compute_dataset_map(&am_list, &config.roots)?;

    let json = serde_json::to_string_pretty(&datasets)?;
    match &config.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write snapshot to {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout();
            stdout.write_all(json.as_bytes())?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
