//! Working-tree manipulation for base-state snapshots.
//!
//! The diff workflow needs the repository at two commits in one run: the
//! head it was invoked on and the base it compares against. libgit2 does the
//! fetching and hard resets; a new `Repository` is opened per operation so
//! the wrapper holds no libgit2 state between calls.

use anyhow::{Context, Result};
use git2::{Repository, ResetType};
use std::path::{Path, PathBuf};

/// Handle on the repository containing the analyzed roots.
pub struct GitWorkspace {
    repo_path: PathBuf,
}

impl GitWorkspace {
    /// Open a repository, discovering the root from any subdirectory.
    pub fn discover(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("no git repository found at {}", path.display()))?;
        Ok(Self {
            repo_path: repo.path().to_path_buf(),
        })
    }

    fn open(&self) -> Result<Repository> {
        Repository::open(&self.repo_path)
            .with_context(|| format!("failed to open repository at {}", self.repo_path.display()))
    }

    /// Commit id the working tree is currently on.
    pub fn head_commit(&self) -> Result<String> {
        let repo = self.open()?;
        let head = repo
            .head()
            .context("repository has no HEAD")?
            .peel_to_commit()
            .context("HEAD does not point at a commit")?;
        Ok(head.id().to_string())
    }

    /// Put the working tree into the base state and return the resolved
    /// base commit id.
    ///
    /// Fetching is best effort with the same fallback chain as the original
    /// workflow: the base ref first, then the raw sha, then a bare fetch —
    /// the commit is often already present locally. The hard reset also
    /// clears files the head state added.
    pub fn checkout_base(&self, base_ref: Option<&str>, base_sha: Option<&str>) -> Result<String> {
        let repo = self.open()?;
        self.fetch_base(&repo, base_ref, base_sha);

        let mut candidates = Vec::new();
        if let Some(reference) = base_ref {
            candidates.push(reference);
        }
        if let Some(sha) = base_sha {
            candidates.push(sha);
        }
        if candidates.is_empty() {
            anyhow::bail!("cannot check out the base state: neither a base ref nor a base sha was provided");
        }

        for target in &candidates {
            match repo.revparse_single(target).and_then(|obj| obj.peel_to_commit()) {
                Ok(commit) => {
                    repo.reset(commit.as_object(), ResetType::Hard, None)
                        .with_context(|| format!("failed to reset the working tree to {target}"))?;
                    log::info!("checked out base state at {}", commit.id());
                    return Ok(commit.id().to_string());
                }
                Err(e) => log::warn!("could not resolve base state {target}: {e}"),
            }
        }
        anyhow::bail!("none of the base state candidates {candidates:?} resolve to a commit")
    }

    /// Hard-reset back to a commit, restoring the state the run started on.
    pub fn reset_to(&self, sha: &str) -> Result<()> {
        let repo = self.open()?;
        let commit = repo
            .revparse_single(sha)
            .and_then(|obj| obj.peel_to_commit())
            .with_context(|| format!("failed to resolve commit {sha}"))?;
        repo.reset(commit.as_object(), ResetType::Hard, None)
            .with_context(|| format!("failed to reset the working tree to {sha}"))?;
        Ok(())
    }

    fn fetch_base(&self, repo: &Repository, base_ref: Option<&str>, base_sha: Option<&str>) {
        let mut remote = match repo.find_remote("origin") {
            Ok(remote) => remote,
            Err(e) => {
                log::warn!("no origin remote, skipping fetch: {e}");
                return;
            }
        };

        if let Some(reference) = base_ref {
            match remote.fetch(&[reference], None, None) {
                Ok(()) => return,
                Err(e) => log::warn!("fetching base ref {reference} failed: {e}"),
            }
        }
        if let Some(sha) = base_sha {
            match remote.fetch(&[sha], None, None) {
                Ok(()) => return,
                Err(e) => log::warn!("fetching base sha {sha} failed: {e}"),
            }
        }
        if let Err(e) = remote.fetch(&[] as &[&str], None, None) {
            log::warn!("fetch failed: {e}");
        }
    }
}
