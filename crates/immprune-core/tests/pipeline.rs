use std::cell::Cell;
use std::sync::Mutex;

use immprune_core::immich::SearchRequest;
use immprune_core::{
    compare, BatchOptions, CompareObserver, CompareOptions, ImmpruneError, InventorySource,
    LocalAsset, Quiet, RemoteAsset, ReportPlan, SearchPages, Stage,
};

struct Catalog {
    assets: Vec<RemoteAsset>,
    calls: Cell<u32>,
    fail: bool,
}

impl Catalog {
    fn new(assets: Vec<RemoteAsset>) -> Self {
        Self { assets, calls: Cell::new(0), fail: false }
    }
}

impl SearchPages for Catalog {
    fn search_page(&self, request: &SearchRequest) -> anyhow::Result<Vec<RemoteAsset>> {
        self.calls.set(self.calls.get() + 1);
        if self.fail {
            return Err(ImmpruneError::Network("connection refused".into()).into());
        }
        Ok(if request.page == 1 { self.assets.clone() } else { vec![] })
    }
}

struct Library(&'static str);

impl InventorySource for Library {
    fn read_assets(&self, only_videos: bool) -> anyhow::Result<Vec<LocalAsset>> {
        Ok(immprune_core::photos::parse_inventory(self.0.as_bytes(), only_videos)?)
    }
}

fn remote(name: &str, size: u64, date: &str) -> RemoteAsset {
    serde_json::from_value(serde_json::json!({
        "originalFileName": name,
        "fileSizeInByte": size,
        "dateTimeOriginal": date,
        "checksum": "Y2hlY2tzdW0="
    }))
    .unwrap()
}

#[derive(Default)]
struct Recorder(Mutex<Vec<(Stage, bool)>>);

impl CompareObserver for Recorder {
    fn stage_finished(&self, stage: Stage, ok: bool) {
        self.0.lock().unwrap().push((stage, ok));
    }
}

#[test]
fn case_insensitive_match_lands_in_report() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("safe_to_delete.txt");
    let catalog = Catalog::new(vec![remote("A.JPG", 1000, "2021-05-01T10:00:00Z")]);
    let library = Library(
        r#"[{"uuid":"1","original_filename":"a.jpg","original_filesize":1000,"date":"2021-05-01T10:00:00Z","ismovie":false,"path":"/p/a.jpg"}]"#,
    );
    let options = CompareOptions { output: output.clone(), ..CompareOptions::default() };

    let recorder = Recorder::default();
    let result = compare(&options, &catalog, &library, &recorder).unwrap();

    assert_eq!(result.matched, 1);
    assert_eq!(result.reported(), 1);
    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("2021-05-01 | 0 MB | a.jpg | PHOTO | /p/a.jpg"));
    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec![(Stage::Remote, true), (Stage::Local, true), (Stage::Match, true)]
    );
}

#[test]
fn limit_keeps_newest() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    let catalog = Catalog::new(vec![
        remote("old.jpg", 10, "2021-01-01T00:00:00Z"),
        remote("new.jpg", 10, "2022-01-01T00:00:00Z"),
    ]);
    let library = Library(
        r#"[
        {"uuid":"o","original_filename":"old.jpg","original_filesize":10,"date":"2021-01-01T00:00:00Z","ismovie":false},
        {"uuid":"n","original_filename":"new.jpg","original_filesize":10,"date":"2022-01-01T00:00:00Z","ismovie":false}
        ]"#,
    );
    let options = CompareOptions { limit: 1, output: output.clone(), ..CompareOptions::default() };

    let result = compare(&options, &catalog, &library, &Quiet).unwrap();
    assert_eq!(result.matched, 2);

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("2022-01-01 | 0 MB | new.jpg"));
    assert!(!text.contains("old.jpg"));
}

#[test]
fn batched_run_filters_years_and_writes_sections() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    let catalog = Catalog::new(vec![
        remote("2019.jpg", 1, "2019-06-01T00:00:00Z"),
        remote("2021.jpg", 1, "2021-06-01T00:00:00Z"),
        remote("2023.jpg", 1, "2023-06-01T00:00:00Z"),
    ]);
    let library = Library(
        r#"[
        {"uuid":"a","original_filename":"2019.jpg","original_filesize":1,"date":"2019-06-01T00:00:00Z","ismovie":false},
        {"uuid":"b","original_filename":"2021.jpg","original_filesize":1,"date":"2021-06-01T00:00:00Z","ismovie":false},
        {"uuid":"c","original_filename":"2023.jpg","original_filesize":1,"date":"2023-06-01T00:00:00Z","ismovie":false}
        ]"#,
    );
    let options = CompareOptions {
        output: output.clone(),
        batch: Some(BatchOptions { start_year: 2020, end_year: 2023, batch_years: 2, limit_per_batch: 0 }),
        ..CompareOptions::default()
    };

    let result = compare(&options, &catalog, &library, &Quiet).unwrap();
    assert_eq!(result.matched, 2);
    let ReportPlan::Batched(groups) = &result.plan else {
        panic!("expected batches");
    };
    assert_eq!(groups.len(), 2);

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("📦 Batch 2022-2023 | 1 candidates"));
    assert!(text.contains("📦 Batch 2020-2021 | 1 candidates"));
    assert!(!text.contains("2019.jpg"));
}

#[test]
fn invalid_input_aborts_before_fetch() {
    let catalog = Catalog::new(vec![]);
    let options = CompareOptions {
        batch: Some(BatchOptions { start_year: 2023, end_year: 2020, batch_years: 1, limit_per_batch: 0 }),
        ..CompareOptions::default()
    };
    let err = compare(&options, &catalog, &Library("[]"), &Quiet).unwrap_err();
    assert!(err.downcast_ref::<ImmpruneError>().is_some_and(ImmpruneError::is_input));
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn remote_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    let mut catalog = Catalog::new(vec![]);
    catalog.fail = true;
    let options = CompareOptions { output: output.clone(), ..CompareOptions::default() };

    let recorder = Recorder::default();
    assert!(compare(&options, &catalog, &Library("[]"), &recorder).is_err());
    assert!(!output.exists());
    assert_eq!(*recorder.0.lock().unwrap(), vec![(Stage::Remote, false)]);
}

#[test]
fn malformed_local_inventory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let options = CompareOptions { output: dir.path().join("out.txt"), ..CompareOptions::default() };
    let err = compare(&options, &Catalog::new(vec![]), &Library("{not json"), &Quiet).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ImmpruneError>(),
        Some(ImmpruneError::Parse { source_name: "Photos", .. })
    ));
}
