//! Workbook loading and export against real .xlsx files.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use rust_xlsxwriter::Workbook;

use apisheet::{Exporter, Method, NormalizedRecord};
use apisheet_cli::workbook::{load_jobs, read_jobs, WorkbookError, XlsxExporter};

// ─────────────────────── helpers ───────────────────────

/// Write a single-sheet workbook of string cells; `None` leaves a cell blank.
fn write_fixture(path: &Path, rows: &[Vec<Option<&str>>]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Some(text) = cell {
                sheet.write_string(r as u32, c as u16, *text).unwrap();
            }
        }
    }
    workbook.save(path).unwrap();
}

fn read_back(path: &Path) -> Vec<Vec<Data>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    range.rows().map(|row| row.to_vec()).collect()
}

fn record(status: u16, request: &str, response: &str) -> NormalizedRecord {
    NormalizedRecord {
        status_code: status,
        request_parameters: request.to_string(),
        response_parameters: response.to_string(),
        endpoint: "http://x/ep".to_string(),
    }
}

// ─────────────────────── loading ───────────────────────

#[test]
fn test_load_turkish_headers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datas.xlsx");
    write_fixture(
        &path,
        &[
            vec![
                Some("dns"),
                Some("uygulamaadi"),
                Some("endpoint"),
                Some("postOrnek"),
                Some("requestType"),
            ],
            vec![
                Some("api.local"),
                Some("svc1"),
                Some("http://x/ep"),
                Some(r#"{"k":1},{"k":2}"#),
                Some("POST"),
            ],
            vec![Some("api.local"), Some("svc2"), Some("http://x/health"), None, Some("GET")],
        ],
    );

    let jobs = read_jobs(&path).unwrap();
    assert_eq!(jobs.len(), 2);

    assert_eq!(jobs[0].host, "api.local");
    assert_eq!(jobs[0].label, "svc1");
    assert_eq!(jobs[0].endpoint, "http://x/ep");
    assert_eq!(jobs[0].sample_payload, r#"{"k":1},{"k":2}"#);
    assert_eq!(jobs[0].method, Method::Post);

    assert_eq!(jobs[1].label, "svc2");
    assert_eq!(jobs[1].sample_payload, "");
    assert_eq!(jobs[1].method, Method::Get);
}

#[test]
fn test_load_english_headers_in_any_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jobs.xlsx");
    write_fixture(
        &path,
        &[
            vec![Some("method"), Some("endpoint"), Some("label")],
            vec![Some("GET"), Some("http://x/a"), Some("svc1")],
        ],
    );

    let jobs = read_jobs(&path).unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].label, "svc1");
    assert_eq!(jobs[0].endpoint, "http://x/a");
    assert_eq!(jobs[0].method, Method::Get);
    assert_eq!(jobs[0].host, "");
}

#[test]
fn test_missing_workbook_yields_no_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.xlsx");

    assert!(matches!(read_jobs(&path), Err(WorkbookError::Load(_))));
    assert!(load_jobs(&path).is_empty());
}

#[test]
fn test_malformed_workbook_yields_no_jobs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"this is not a zip archive").unwrap();

    assert!(load_jobs(&path).is_empty());
}

// ─────────────────────── export ───────────────────────

#[test]
fn test_export_writes_columns_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("svc1.xlsx");

    let records = vec![record(200, "k: 1", "r: 1"), record(404, "k: 2", "")];
    assert!(XlsxExporter.export(&records, &target, "svc1"));

    let rows = read_back(&target);
    assert_eq!(rows.len(), 3);

    let header: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
    assert_eq!(
        header,
        vec!["StatusCode", "RequestParameters", "ResponseParameters", "EndPoint"]
    );

    assert_eq!(rows[1][0], Data::Float(200.0));
    assert_eq!(rows[1][1], Data::String("k: 1".into()));
    assert_eq!(rows[1][2], Data::String("r: 1".into()));
    assert_eq!(rows[1][3], Data::String("http://x/ep".into()));
    assert_eq!(rows[2][0], Data::Float(404.0));
    assert_eq!(rows[2][1], Data::String("k: 2".into()));
}

#[test]
fn test_export_refuses_empty_records() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("svc1.xlsx");

    assert!(!XlsxExporter.export(&[], &target, "svc1"));
    assert!(!target.exists());
}

#[test]
fn test_export_to_unwritable_target_returns_false() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing-dir").join("svc1.xlsx");

    assert!(!XlsxExporter.export(&[record(200, "", "")], &target, "svc1"));
}

#[test]
fn test_export_clips_oversized_cells() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("big.xlsx");
    let huge = "x".repeat(40_000);

    assert!(XlsxExporter.export(&[record(200, "", &huge)], &target, "big"));

    let rows = read_back(&target);
    assert_eq!(rows[1][2].to_string().len(), 32_767);
}
