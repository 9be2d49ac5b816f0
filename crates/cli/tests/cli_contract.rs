use assert_cmd::cargo::cargo_bin_cmd;
use folio_engine::testing::{build_pdf, TestPage};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn write_pdf(dir: &Path, name: &str, pages: &[TestPage]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, build_pdf(pages)).expect("fixture pdf should be written");
    path
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout should contain valid json")
}

#[test]
fn info_emits_stable_json_contract() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let pdf = write_pdf(
        temp.path(),
        "small.pdf",
        &[TestPage::new(612.0, 792.0), TestPage::new(842.0, 595.0).rotated(90)],
    );

    let output =
        cargo_bin_cmd!("folio-cli").arg("info").arg(&pdf).assert().success().get_output().stdout.clone();

    let value = stdout_json(&output);
    assert_eq!(value["page_count"], 2);
    assert_eq!(value["pages"][0]["page"], 1);
    assert_eq!(value["pages"][0]["width"], 612.0);
    assert_eq!(value["pages"][0]["height"], 792.0);
    assert_eq!(value["pages"][1]["rotation"], 90);
}

#[test]
fn render_thumb_writes_png_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "medium.pdf", &[TestPage::new(612.0, 792.0); 2]);
    let output_path = temp.path().join("thumbs").join("thumb.png");

    cargo_bin_cmd!("folio-cli")
        .arg("render-thumb")
        .arg(&pdf)
        .arg("--page")
        .arg("2")
        .arg("--width")
        .arg("120")
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    assert!(output_path.exists(), "thumbnail output file should exist");

    let image = image::open(&output_path).expect("thumbnail should be readable image");
    assert_eq!(image.width(), 120);
    assert!(image.height() > image.width());
}

#[test]
fn render_thumb_rejects_page_zero() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let pdf = write_pdf(temp.path(), "one.pdf", &[TestPage::new(612.0, 792.0)]);

    cargo_bin_cmd!("folio-cli")
        .arg("render-thumb")
        .arg(&pdf)
        .arg("--page")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("1-based"));
}

#[test]
fn info_fails_for_missing_file() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cargo_bin_cmd!("folio-cli")
        .arg("info")
        .arg(temp.path().join("missing.pdf"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn info_fails_for_invalid_pdf() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = temp.path().join("invalid.pdf");
    fs::write(&path, "this is not a pdf").expect("fixture should be written");

    cargo_bin_cmd!("folio-cli")
        .arg("info")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to open PDF"));
}

#[test]
fn info_fails_for_encrypted_marker_pdf() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let path = temp.path().join("encrypted-marker.pdf");
    let mut bytes = build_pdf(&[TestPage::new(612.0, 792.0)]);
    bytes.extend_from_slice(b"\n% /Encrypt\n");
    fs::write(&path, bytes).expect("fixture should be written");

    cargo_bin_cmd!("folio-cli")
        .arg("info")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("encrypted PDFs are not supported"));
}

#[test]
fn export_composes_session_into_pdf() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    write_pdf(temp.path(), "vertrag.pdf", &[TestPage::new(612.0, 792.0); 3]);
    write_pdf(temp.path(), "anlage.pdf", &[TestPage::new(595.0, 842.0)]);

    let session = temp.path().join("session.json");
    fs::write(
        &session,
        r##"{
            "sources": ["vertrag.pdf", "anlage.pdf"],
            "pages": [
                { "source": 1, "page": 1, "rotation": 90 },
                { "source": 0, "page": 2, "elements": [
                    { "type": "text", "id": "text-1", "text": "Geprüft", "x": 10, "y": 12,
                      "font_size": 16, "color": "#c00000", "font_family": "Helvetica" },
                    { "type": "symbol", "id": "symbol-1", "shape": "square", "x": 20, "y": 20,
                      "width": 30, "height": 10, "color": "#0000ff", "stroke_width": 2 }
                ] }
            ]
        }"##,
    )
    .expect("session should be written");
    let output_path = temp.path().join("out").join("result.pdf");

    let output = cargo_bin_cmd!("folio-cli")
        .arg("export")
        .arg("--session")
        .arg(&session)
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value = stdout_json(&output);
    assert_eq!(value["pages_written"], 2);
    assert_eq!(value["skipped"].as_array().map(Vec::len), Some(0));

    let doc = lopdf::Document::load(&output_path).expect("exported pdf should parse");
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 2);

    let first = doc.get_dictionary(pages[&1]).expect("first page dictionary");
    let rotation = first.get(b"Rotate").and_then(|rotate| rotate.as_i64()).expect("rotation");
    assert_eq!(rotation, 90);
}

#[test]
fn export_defaults_to_edited_name_next_to_session() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    write_pdf(temp.path(), "angebot.pdf", &[TestPage::new(612.0, 792.0)]);
    let session = temp.path().join("session.json");
    fs::write(&session, r#"{ "sources": ["angebot.pdf"] }"#).expect("session should be written");

    cargo_bin_cmd!("folio-cli")
        .arg("export")
        .arg("--session")
        .arg(&session)
        .assert()
        .success()
        .stdout(predicate::str::contains("angebot_edited.pdf"));

    assert!(temp.path().join("angebot_edited.pdf").exists());
}

#[test]
fn export_reports_broken_images_and_keeps_going() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    write_pdf(temp.path(), "a.pdf", &[TestPage::new(612.0, 792.0)]);
    let session = temp.path().join("session.json");
    fs::write(
        &session,
        r#"{
            "sources": ["a.pdf"],
            "pages": [{ "source": 0, "page": 1, "elements": [
                { "type": "image", "id": "image-1", "image_data": "data:image/png;base64,AAAA",
                  "x": 10, "y": 10, "width": 20, "height": 20 }
            ] }]
        }"#,
    )
    .expect("session should be written");

    let output = cargo_bin_cmd!("folio-cli")
        .arg("export")
        .arg("--session")
        .arg(&session)
        .arg("--output")
        .arg(temp.path().join("out.pdf"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let value = stdout_json(&output);
    assert_eq!(value["pages_written"], 1);
    assert_eq!(value["skipped"].as_array().map(Vec::len), Some(1));
}

#[test]
fn export_fails_for_unknown_page() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    write_pdf(temp.path(), "a.pdf", &[TestPage::new(612.0, 792.0)]);
    let session = temp.path().join("session.json");
    fs::write(&session, r#"{ "sources": ["a.pdf"], "pages": [{ "source": 0, "page": 4 }] }"#)
        .expect("session should be written");

    cargo_bin_cmd!("folio-cli")
        .arg("export")
        .arg("--session")
        .arg(&session)
        .assert()
        .failure()
        .stderr(predicate::str::contains("source 0 has no page 4"));
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("folio-cli")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
