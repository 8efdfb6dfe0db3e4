// Integration tests for the compare command
// These tests verify the end-to-end workflow of diffing stored snapshots.

use anyhow::Result;
use diff_metrics::cli::ReportFormat;
use diff_metrics::commands::compare::{run, CompareConfig};
use diff_metrics::report::render_comment;
use diff_metrics::{DatasetDiffMap, DatasetMap, DiffReport, FunctionId};
use std::fs;
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from("tests/data/fixtures").join(name)
}

fn load_fixture(name: &str) -> Result<DatasetMap> {
    Ok(serde_json::from_str(&fs::read_to_string(fixture(name))?)?)
}

#[test]
fn test_compare_fixture_snapshots() -> Result<()> {
    let head = load_fixture("head.json")?;
    let base = load_fixture("base.json")?;
    let report = DiffReport::new(head, base);

    // Every root of either side is covered.
    let roots: Vec<&String> = report.diff.keys().collect();
    assert_eq!(roots, vec![".", "db", "web"]);

    // Repository root: a flip, an addition pair and a deletion.
    let root = &report.diff["."];
    assert_eq!(
        root.newly_instrumented,
        vec![FunctionId::new("main", "helper")]
    );
    assert_eq!(
        root.added_instrumented,
        vec![FunctionId::new("api", "get_user")]
    );
    assert_eq!(
        root.added_uninstrumented,
        vec![FunctionId::new("api", "post_user")]
    );
    assert_eq!(root.deleted, vec![FunctionId::new("main::db", "add_user")]);
    assert!(root.no_longer_instrumented.is_empty());
    let delta = root.coverage_ratio_delta.expect("both sides have functions");
    assert!((delta - (3.0 / 4.0 - 1.0 / 3.0)).abs() < 1e-12);

    // "db" disappeared from head: everything deleted, delta undefined.
    let db = &report.diff["db"];
    assert_eq!(db.deleted, vec![FunctionId::new("db", "query")]);
    assert_eq!(db.coverage_ratio_delta, None);

    // "web" is new in head: everything added, delta undefined.
    let web = &report.diff["web"];
    assert_eq!(
        web.added_uninstrumented,
        vec![FunctionId::new("web", "render")]
    );
    assert_eq!(web.coverage_ratio_delta, None);

    Ok(())
}

#[test]
fn test_compare_summary_statistics() -> Result<()> {
    let head = load_fixture("head.json")?;
    let base = load_fixture("base.json")?;
    let report = DiffReport::new(head, base);
    let summary = report.summary();

    // helper flipped + get_user arrived instrumented.
    assert_eq!(summary.instrumented_added, 2);
    assert_eq!(summary.instrumented_removed, 0);
    // add_user and the whole "db" root are gone.
    assert_eq!(summary.functions_deleted, 2);
    assert_eq!(summary.added_with_instrumentation, 1);
    assert_eq!(summary.added_without_instrumentation, 2);
    assert_eq!(summary.new_function_coverage, Some(1.0 / 3.0));
    // base: 2 instrumented of 4; head: 3 of 5.
    assert_eq!(summary.base_coverage, Some(0.5));
    assert_eq!(summary.head_coverage, Some(0.6));

    Ok(())
}

#[test]
fn test_compare_command_writes_diff_json() -> Result<()> {
    let out_dir = tempfile::tempdir()?;
    let output = out_dir.path().join("diff.json");

    run(CompareConfig {
        head_path: fixture("head.json"),
        base_path: fixture("base.json"),
        format: ReportFormat::Json,
        output: Some(output.clone()),
        repo: Some("autometrics-dev/diff-metrics".to_string()),
    })?;

    let diff: DatasetDiffMap = serde_json::from_str(&fs::read_to_string(&output)?)?;
    assert_eq!(diff.len(), 3);
    assert_eq!(
        diff["."].deleted,
        vec![FunctionId::new("main::db", "add_user")]
    );
    Ok(())
}

#[test]
fn test_compare_command_rejects_malformed_snapshot() -> Result<()> {
    let out_dir = tempfile::tempdir()?;
    let bogus = out_dir.path().join("bogus.json");
    fs::write(&bogus, "not json")?;

    let result = run(CompareConfig {
        head_path: bogus,
        base_path: fixture("base.json"),
        format: ReportFormat::Json,
        output: None,
        repo: None,
    });
    assert!(result.is_err());
    Ok(())
}

#[test]
fn test_rendered_comment_for_fixture_diff() -> Result<()> {
    let head = load_fixture("head.json")?;
    let base = load_fixture("base.json")?;
    let report = DiffReport::new(head, base);

    let comment = render_comment(&report, "diff-metrics");
    assert!(comment.starts_with("# ![Autometrics logo]"));
    // The repository root renders under the repo name.
    assert!(comment.contains("### In `diff-metrics`"));
    assert!(comment.contains("### In `web`"));
    assert!(comment.contains("|api|get_user|"));
    assert!(comment.contains("2 functions deleted"));
    assert!(comment.ends_with("<sub>Autometrics diff-metrics</sub></a>"));
    Ok(())
}
