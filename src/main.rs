use anyhow::Result;
use clap::Parser;
use diff_metrics::cli::{Cli, Commands};
use diff_metrics::commands;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Snapshot { roots, output } => {
            commands::snapshot::run(commands::snapshot::SnapshotConfig {
                am_list: roots.am_list.clone(),
                roots: roots.analysis_roots(),
                output,
            })
        }
        Commands::Compare {
            head,
            base,
            format,
            output,
            repo,
        } => commands::compare::run(commands::compare::CompareConfig {
            head_path: head,
            base_path: base,
            format,
            output,
            repo,
        }),
        Commands::Diff {
            roots,
            base_ref,
            base_sha,
            artifact_dir,
            format,
            output,
            post_comment,
            repo,
            pr,
            github_token,
        } => commands::diff::run(commands::diff::DiffConfig {
            am_list: roots.am_list.clone(),
            roots: roots.analysis_roots(),
            base_ref,
            base_sha,
            artifact_dir,
            format,
            output,
            post_comment,
            repo,
            pr,
            github_token,
        }),
    }
}
