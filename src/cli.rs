use crate::analyzer::{AnalysisRoot, Language};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Raw diff map as JSON
    Json,
    /// PR comment body
    Markdown,
}

#[derive(Parser, Debug)]
#[command(name = "diff-metrics")]
#[command(about = "Compare autometrics instrumentation coverage between pull request states", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Source roots to analyze, one list per language, plus the analyzer binary.
#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    /// Rust roots to analyze (comma separated)
    #[arg(long = "rs-roots", value_delimiter = ',', env = "DIFF_METRICS_RS_ROOTS")]
    pub rs_roots: Vec<String>,

    /// TypeScript roots to analyze (comma separated)
    #[arg(long = "ts-roots", value_delimiter = ',', env = "DIFF_METRICS_TS_ROOTS")]
    pub ts_roots: Vec<String>,

    /// Go roots to analyze (comma separated)
    #[arg(long = "go-roots", value_delimiter = ',', env = "DIFF_METRICS_GO_ROOTS")]
    pub go_roots: Vec<String>,

    /// Python roots to analyze (comma separated)
    #[arg(long = "py-roots", value_delimiter = ',', env = "DIFF_METRICS_PY_ROOTS")]
    pub py_roots: Vec<String>,

    /// Path to the am_list binary (defaults to looking it up on PATH)
    #[arg(long = "am-list")]
    pub am_list: Option<PathBuf>,
}

impl RootArgs {
    /// Flatten the per-language lists into analysis jobs.
    pub fn analysis_roots(&self) -> Vec<AnalysisRoot> {
        let tagged = [
            (&self.go_roots, Language::Go),
            (&self.ts_roots, Language::Typescript),
            (&self.rs_roots, Language::Rust),
            (&self.py_roots, Language::Python),
        ];
        tagged
            .into_iter()
            .flat_map(|(roots, language)| {
                roots.iter().map(move |root| AnalysisRoot {
                    root: root.clone(),
                    language,
                })
            })
            .collect()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze the working tree and write the dataset map as JSON
    Snapshot {
        #[command(flatten)]
        roots: RootArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Diff two stored dataset snapshots
    Compare {
        /// Snapshot of the head (new) state
        head: PathBuf,

        /// Snapshot of the base (old) state
        base: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: ReportFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// GitHub repository (owner/name), used to render root paths
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: Option<String>,
    },

    /// Full pull-request workflow: snapshot head and base, diff, report
    Diff {
        #[command(flatten)]
        roots: RootArgs,

        /// Base branch or tag to compare against
        #[arg(long, env = "DIFF_METRICS_BASE_REF")]
        base_ref: Option<String>,

        /// Base commit sha to compare against
        #[arg(long, env = "DIFF_METRICS_BASE_SHA")]
        base_sha: Option<String>,

        /// Directory the dataset and diff artifacts are written to
        #[arg(long, default_value = "diff-metrics-artifacts")]
        artifact_dir: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value = "markdown")]
        format: ReportFormat,

        /// Report output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Post (or update) the report as a PR comment
        #[arg(long)]
        post_comment: bool,

        /// GitHub repository (owner/name)
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: Option<String>,

        /// Pull request number to comment on
        #[arg(long, env = "DIFF_METRICS_PR_NUMBER")]
        pr: Option<u64>,

        /// GitHub API token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },
}

/// Short repository name used when rendering root paths, from the
/// `owner/name` slug. Falls back to `"."` so a missing repo still renders.
pub fn repo_display_name(repo: Option<&str>) -> String {
    repo.and_then(|slug| slug.rsplit('/').next())
        .unwrap_or(".")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_roots_flatten_in_language_order() {
        let args = RootArgs {
            rs_roots: vec!["api".into()],
            ts_roots: vec!["web".into()],
            go_roots: vec![".".into()],
            py_roots: vec![],
            am_list: None,
        };
        let roots = args.analysis_roots();
        let summary: Vec<(String, Language)> =
            roots.into_iter().map(|r| (r.root, r.language)).collect();
        assert_eq!(
            summary,
            vec![
                (".".to_string(), Language::Go),
                ("web".to_string(), Language::Typescript),
                ("api".to_string(), Language::Rust),
            ]
        );
    }

    #[test]
    fn repo_display_name_uses_the_short_name() {
        assert_eq!(repo_display_name(Some("autometrics-dev/diff-metrics")), "diff-metrics");
        assert_eq!(repo_display_name(None), ".");
    }

    #[test]
    fn cli_parses_the_diff_subcommand() {
        let cli = Cli::try_parse_from([
            "diff-metrics",
            "diff",
            "--rs-roots",
            ".,api",
            "--base-ref",
            "main",
        ])
        .unwrap();
        match cli.command {
            Commands::Diff {
                roots, base_ref, ..
            } => {
                assert_eq!(roots.rs_roots, vec![".", "api"]);
                assert_eq!(base_ref.as_deref(), Some("main"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
