//! `diff`: the full pull-request workflow.
//!
//! Snapshots the head state, flips the working tree to the base state for a
//! second snapshot, restores the tree, then diffs and reports. Artifacts for
//! both snapshots and the diff are written along the way so the CI workflow
//! can upload them.

use crate::analyzer::{compute_dataset_map, AmList, AnalysisRoot};
use crate::artifact;
use crate::cli::{repo_display_name, ReportFormat};
use crate::github::CommentClient;
use crate::gitops::GitWorkspace;
use crate::report::{render_comment, DiffReport};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub struct DiffConfig {
    pub roots: Vec<AnalysisRoot>,
    pub am_list: Option<PathBuf>,
    pub base_ref: Option<String>,
    pub base_sha: Option<String>,
    pub artifact_dir: PathBuf,
    pub format: ReportFormat,
    pub output: Option<PathBuf>,
    pub post_comment: bool,
    pub repo: Option<String>,
    pub pr: Option<u64>,
    pub github_token: Option<String>,
}

pub fn run(config: DiffConfig) -> Result<()> {
    let am_list = AmList::locate(config.am_list.clone())?;
    let workspace = GitWorkspace::discover(Path::new("."))?;
    let head_sha = workspace.head_commit()?;

    log::info!("[head] building datasets at {head_sha}");
    let head_map = compute_dataset_map(&am_list, &config.roots)?;
    artifact::store_dataset_map(
        &config.artifact_dir,
        &artifact::head_artifact_name(&head_sha),
        &head_map,
    )?;

    let base_sha =
        workspace.checkout_base(config.base_ref.as_deref(), config.base_sha.as_deref())?;

    log::info!("[base] building datasets at {base_sha}");
    let base_result = compute_dataset_map(&am_list, &config.roots);
    // The tree must come back to the head state even when the base snapshot
    // failed, so restore before propagating.
    let restore_result = workspace.reset_to(&head_sha);
    let base_map = base_result?;
    restore_result.context("failed to restore the head state after the base snapshot")?;

    artifact::store_dataset_map(
        &config.artifact_dir,
        &artifact::base_artifact_name(&base_sha),
        &base_map,
    )?;

    let report = DiffReport::new(head_map, base_map);
    artifact::store_diff_map(
        &config.artifact_dir,
        &artifact::diff_artifact_name(&base_sha, &head_sha),
        &report.diff,
    )?;

    let repo_name = repo_display_name(config.repo.as_deref());
    super::write_report(&report, &repo_name, config.format, config.output.as_deref())?;
    if config.output.is_some() {
        super::compare::print_terminal_summary(&report);
    }

    if config.post_comment {
        post_comment(&config, &report, &repo_name)?;
    }
    Ok(())
}

fn post_comment(config: &DiffConfig, report: &DiffReport, repo_name: &str) -> Result<()> {
    let repo = config
        .repo
        .as_ref()
        .context("--repo (or GITHUB_REPOSITORY) is required to post a comment")?;
    let pr_number = config
        .pr
        .context("--pr is required to post a comment")?;
    let token = config
        .github_token
        .as_ref()
        .context("--github-token (or GITHUB_TOKEN) is required to post a comment")?;

    let client = CommentClient::new(repo.clone(), token)?;
    client.update_or_post(pr_number, &render_comment(report, repo_name))
}
