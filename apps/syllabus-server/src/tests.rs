//! Router-level tests for the syllabus server
//!
//! Each test writes a real template into a temp directory and drives the
//! router through axum-test.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use pretty_assertions::assert_eq;
use syllabus_core::{DocxPackage, DOCX_MIME_TYPE};
use tempfile::TempDir;

use crate::api::router;
use crate::error::TEMPLATE_NOT_FOUND_MESSAGE;
use crate::recorder::{FileRecorder, TracingRecorder};
use crate::AppState;

const SYLLABUS_BODY: &str = concat!(
    r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>{Course</w:t></w:r><w:r><w:t>Title}</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:t xml:space="preserve">Instructor: {Instructor}</w:t></w:r></w:p>"#,
    r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>Office hours</w:t></w:r></w:p></w:tc>"#,
    r#"<w:tc><w:p><w:r><w:t>{OfficeHours}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
    r#"<w:p><w:r><w:rPr><w:i/></w:rPr><w:t>{Objectives}</w:t></w:r></w:p>"#,
    r#"<w:p><w:r><w:t>{Unknown}</w:t></w:r></w:p>"#,
);

fn write_template(dir: &Path) -> PathBuf {
    let path = dir.join("template.docx");
    let bytes = DocxPackage::from_body_xml(SYLLABUS_BODY)
        .unwrap()
        .to_bytes()
        .unwrap();
    std::fs::write(&path, bytes).unwrap();
    path
}

fn server_with_template(template_path: PathBuf) -> TestServer {
    let state = AppState {
        template_path,
        recorder: Arc::new(TracingRecorder),
    };
    TestServer::new(router(state)).unwrap()
}

fn setup() -> (TempDir, TestServer) {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path());
    (dir, server_with_template(template))
}

fn document_text(bytes: &[u8]) -> String {
    DocxPackage::from_bytes(bytes).unwrap().document().text()
}

#[tokio::test]
async fn test_health() {
    let (_dir, server) = setup();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "syllabus-server");
}

#[tokio::test]
async fn test_index_serves_form() {
    let (_dir, server) = setup();
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("<form"));
}

#[tokio::test]
async fn test_generate_without_objectives() {
    let (_dir, server) = setup();
    let response = server
        .post("/generate")
        .form(&[("CourseTitle", "Intro to Systems")])
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-disposition"),
        r#"attachment; filename="Course_Syllabus.docx""#
    );
    assert_eq!(response.header("content-type"), DOCX_MIME_TYPE);

    let text = document_text(response.as_bytes());
    assert!(text.contains("Intro to Systems"));
    assert!(text.contains("No objectives provided"));
}

#[tokio::test]
async fn test_generate_fills_fields_tables_and_objectives() {
    let (_dir, server) = setup();
    let response = server
        .post("/generate")
        .form(&[
            ("CourseTitle", "  Operating Systems  "),
            ("Instructor", "Dr. Hopper"),
            ("OfficeHours", "Mon 10-12\nWed 2-4"),
            ("objective", "Understand X"),
            ("objective", "Apply Y"),
        ])
        .await;

    response.assert_status_ok();
    assert_eq!(
        document_text(response.as_bytes()),
        [
            "Operating Systems",
            "Instructor: Dr. Hopper",
            "Office hours",
            "Mon 10-12 Wed 2-4",
            "1. Understand X\n2. Apply Y",
            "{Unknown}",
        ]
        .join("\n")
    );
}

#[tokio::test]
async fn test_generate_objectives_keep_run_formatting() {
    let (_dir, server) = setup();
    let response = server
        .post("/generate")
        .form(&[("objective", "Understand X")])
        .await;

    let mut package = DocxPackage::from_bytes(response.as_bytes()).unwrap();
    let mut paragraphs = package.document_mut().paragraphs_mut();
    let objectives = paragraphs
        .iter_mut()
        .find(|p| p.text() == "1. Understand X")
        .unwrap();
    let runs = objectives.runs_mut();

    assert_eq!(runs.len(), 1);
    assert!(runs[0].properties().unwrap().find_child("w:i").is_some());
}

#[tokio::test]
async fn test_generate_missing_template_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let server = server_with_template(dir.path().join("template.docx"));

    let response = server
        .post("/generate")
        .form(&[("CourseTitle", "Intro to Systems")])
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), TEMPLATE_NOT_FOUND_MESSAGE);
    assert!(response.headers().get("content-disposition").is_none());
}

#[tokio::test]
async fn test_generate_corrupt_template_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("template.docx");
    std::fs::write(&path, b"not a docx").unwrap();
    let server = server_with_template(path);

    let response = server.post("/generate").form(&[("A", "b")]).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_generate_control_character_returns_500() {
    let (_dir, server) = setup();
    let response = server
        .post("/generate")
        .form(&[("CourseTitle", "A\u{1}B")])
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get("content-disposition").is_none());
    assert!(response.text().contains("U+0001"));
}

#[tokio::test]
async fn test_generate_records_submitted_fields() {
    let dir = tempfile::tempdir().unwrap();
    let template_path = write_template(dir.path());
    let dump = dir.path().join("form_data.txt");

    let state = AppState {
        template_path,
        recorder: Arc::new(FileRecorder::new(&dump)),
    };
    let server = TestServer::new(router(state)).unwrap();

    server
        .post("/generate")
        .form(&[("CourseTitle", "Intro\nto Systems"), ("Instructor", "Ada")])
        .await
        .assert_status_ok();

    assert_eq!(
        std::fs::read_to_string(&dump).unwrap(),
        "CourseTitle: Intro to Systems\nInstructor: Ada\n"
    );
}

#[tokio::test]
async fn test_template_is_reloaded_per_request() {
    let (dir, server) = setup();

    let first = server.post("/generate").form(&[("CourseTitle", "First")]).await;
    let second = server.post("/generate").form(&[("CourseTitle", "Second")]).await;
    assert!(document_text(first.as_bytes()).contains("First"));
    assert!(!document_text(second.as_bytes()).contains("First"));

    std::fs::remove_file(dir.path().join("template.docx")).unwrap();
    server
        .post("/generate")
        .form(&[("CourseTitle", "Third")])
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        /// Property: any plain course title ends up in the generated document
        #[test]
        fn course_title_round_trips(title in "[A-Za-z][A-Za-z0-9 ]{0,40}") {
            let runtime = tokio::runtime::Runtime::new().unwrap();
            let text = runtime.block_on(async {
                let (_dir, server) = setup();
                let response = server
                    .post("/generate")
                    .form(&[("CourseTitle", title.as_str())])
                    .await;
                document_text(response.as_bytes())
            });

            let first_line = text.lines().next().unwrap_or_default().to_string();
            prop_assert_eq!(first_line, title.trim().to_string());
        }
    }
}
