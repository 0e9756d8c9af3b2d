use duplicati_log_viewer::parser::{
    BackupRun, IngestMode, IngestOptions, ingest_file, ingest_lines,
};
use duplicati_log_viewer::{IgnoreFilter, ViewerConfig};
use std::io::Write;

const SAMPLE_LOG: &str = "\
2023-01-01 10:00:00 +01:00 - [Information-Duplicati.Library.Main.Controller-StartingOperation]: Running Backup
2023-01-01 10:00:01 +01:00 - [Verbose-Duplicati.Library.Main.Operation.Backup.FileBlockProcessor.FileEntry-ExcludingPath]: Excluding path due to filter: /home/user/cache/tmp => (*/cache/*)
2023-01-01 10:00:02 +01:00 - [Verbose-Duplicati.Library.Main.Operation.Backup.FileBlockProcessor.FileEntry-ExcludingPath]: Excluding path due to filter: /home/user/secret.txt => ([^/]*secret.*)
garbage line that matches nothing
2023-01-01 10:00:03 +01:00 - [Information-Duplicati.Library.Main.Operation.BackupHandler-FinishedBackup]: Backup completed
";

fn lazy_options(max_runs: Option<usize>) -> IngestOptions {
    IngestOptions {
        max_runs,
        mode: IngestMode::Lazy,
    }
}

fn eager_options(max_runs: Option<usize>) -> IngestOptions {
    IngestOptions {
        max_runs,
        mode: IngestMode::Eager,
    }
}

#[test]
fn starting_operation_marker_opens_a_run() {
    let ignore = IgnoreFilter::default();
    let history = ingest_lines(SAMPLE_LOG.lines(), lazy_options(None), &ignore);
    assert_eq!(history.len(), 1);
    let labels: Vec<&str> = history.iter().map(BackupRun::label).collect();
    assert_eq!(labels, vec!["2023-01-01 10:00:00 +01:00: Running Backup"]);
}

#[test]
fn bounded_history_keeps_the_most_recent_runs_in_order() {
    let lines = [
        "2023-01-01 - [Information-Op-StartingOperation]: Backup",
        "2023-01-02 - [Information-Op-StartingOperation]: Backup",
        "2023-01-03 - [Information-Op-StartingOperation]: Backup",
    ];
    let ignore = IgnoreFilter::default();
    let history = ingest_lines(lines, lazy_options(Some(2)), &ignore);
    let labels: Vec<&str> = history.iter().map(BackupRun::label).collect();
    assert_eq!(labels, vec!["2023-01-02: Backup", "2023-01-03: Backup"]);
}

#[test]
fn lazy_tags_materialize_once_and_stay_cached() {
    let ignore = IgnoreFilter::default();
    let mut history = ingest_lines(SAMPLE_LOG.lines(), lazy_options(None), &ignore);
    let run = history.current_mut().unwrap();
    assert!(!run.is_materialized());

    let first = run.tags(&ignore).clone();
    assert!(run.is_materialized());
    assert_eq!(first.len(), 2);

    let excluding = &first
        ["Verbose-Duplicati.Library.Main.Operation.Backup.FileBlockProcessor.FileEntry-ExcludingPath"];
    assert_eq!(excluding.len(), 2);

    // Second query returns the cached index.
    assert_eq!(run.tags(&ignore), &first);
}

#[test]
fn eager_mode_builds_tags_while_streaming() {
    let ignore = IgnoreFilter::default();
    let mut history = ingest_lines(SAMPLE_LOG.lines(), eager_options(None), &ignore);
    let run = history.current_mut().unwrap();
    assert!(run.is_materialized());
    let tags = run.tags(&ignore);
    assert!(
        tags.contains_key(
            "Information-Duplicati.Library.Main.Operation.BackupHandler-FinishedBackup"
        )
    );
}

#[test]
fn eager_mode_drops_suppressed_values() {
    let config: ViewerConfig = toml::from_str(r#"ignore-exclude = ["/home/user/cache.*"]"#).unwrap();
    let ignore = IgnoreFilter::new(&config.ignore_exclude).unwrap();
    let mut history = ingest_lines(SAMPLE_LOG.lines(), eager_options(None), &ignore);
    let tags = history.current_mut().unwrap().tags(&ignore);
    let excluding = &tags
        ["Verbose-Duplicati.Library.Main.Operation.Backup.FileBlockProcessor.FileEntry-ExcludingPath"];
    assert_eq!(excluding.len(), 1);
    assert!(
        excluding
            .iter()
            .all(|value| !value.contains("/home/user/cache/tmp"))
    );
}

#[test]
fn lazy_materialization_also_applies_suppression() {
    let ignore = IgnoreFilter::new(&["/home/user/cache.*".to_string()]).unwrap();
    let mut history = ingest_lines(SAMPLE_LOG.lines(), lazy_options(None), &ignore);
    let tags = history.current_mut().unwrap().tags(&ignore);
    let excluding = &tags
        ["Verbose-Duplicati.Library.Main.Operation.Backup.FileBlockProcessor.FileEntry-ExcludingPath"];
    assert_eq!(excluding.len(), 1);
}

#[test]
fn duplicate_labels_resolve_to_the_latest_run() {
    let lines = [
        "2023-01-01 - [Information-Op-StartingOperation]: Backup",
        "[OldTag]: old value",
        "2023-01-01 - [Information-Op-StartingOperation]: Backup",
        "[NewTag]: new value",
    ];
    let ignore = IgnoreFilter::default();
    let mut history = ingest_lines(lines, lazy_options(None), &ignore);
    assert_eq!(history.len(), 2);
    let run = history.find_mut("2023-01-01: Backup").unwrap();
    let tags = run.tags(&ignore);
    assert!(tags.contains_key("NewTag"));
    assert!(!tags.contains_key("OldTag"));
}

#[test]
fn ingests_from_a_file_on_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE_LOG.as_bytes()).unwrap();

    let ignore = IgnoreFilter::default();
    let history = ingest_file(file.path(), lazy_options(None), &ignore).unwrap();
    assert_eq!(history.len(), 1);
}

#[test]
fn missing_file_is_fatal() {
    let ignore = IgnoreFilter::default();
    let result = ingest_file(
        "/definitely/not/a/real/duplicati.log",
        lazy_options(None),
        &ignore,
    );
    assert!(result.is_err());
}
