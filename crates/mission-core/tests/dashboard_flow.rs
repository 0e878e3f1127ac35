use std::fs;

use chrono::{NaiveDate, TimeZone, Utc};
use mission_core::config::Config;
use mission_core::render::Renderer;
use mission_core::source::{DocumentOrigin, load_document};
use mission_core::{DocumentError, MissionControlParser, Task};
use tempfile::tempdir;

const TEMPLATE: &str = "# 🚀 Mission Control

_Last updated: 2024-01-16_

## 🔴 Active Tasks
- [ ] _(Tasks currently being worked on)_

## 🟡 Waiting for Owner Review
- [ ] _(Completed work pending approval before use)_

## ✅ Completed (last 7 days)
- [x] _(Finished and approved items)_

## 📋 Backlog
- [ ] _(Queued work not yet started)_

## 🚫 Blocked
- [ ] Nothing blocked.

## 📝 Notes & Decisions Log

| Date | Item | Decision/Note |
|------|------|---------------|
";

#[test]
fn untouched_template_renders_as_empty_dashboard() {
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("MISSION_CONTROL.md");
    fs::write(&path, TEMPLATE).expect("write document");

    let text = load_document(&DocumentOrigin::Path(path)).expect("load document");
    let data = MissionControlParser::new().expect("parser").parse(&text);

    assert!(data.is_empty());
    assert_eq!(data.last_updated, "2024-01-16");
}

#[test]
fn filled_document_flows_to_json() {
    let document = TEMPLATE
        .replace(
            "- [ ] _(Tasks currently being worked on)_",
            "- [ ] Fix bug\n- [x] Ship release",
        )
        .replace(
            "- [x] _(Finished and approved items)_",
            "- [x] [2024-01-15] Deploy v2",
        )
        + "| 2024-01-10 | Schema | Use UUIDs |\n";

    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("MISSION_CONTROL.md");
    fs::write(&path, document).expect("write document");

    let text = load_document(&DocumentOrigin::Path(path)).expect("load document");
    let data = MissionControlParser::new().expect("parser").parse(&text);

    assert_eq!(
        data.active,
        vec![Task::new("Fix bug"), Task::new("Ship release")]
    );
    assert_eq!(data.completed, vec![Task::dated("Deploy v2", "2024-01-15")]);
    assert!(data.waiting.is_empty());
    assert!(data.blocked.is_empty());
    assert_eq!(data.notes.len(), 1);

    let mut cfg = Config::default();
    cfg.apply_overrides(vec![("color".to_string(), "off".to_string())]);
    let renderer = Renderer::new(&cfg).expect("renderer");

    let now = Utc
        .with_ymd_and_hms(2024, 1, 16, 8, 0, 0)
        .single()
        .expect("valid now");
    let mut json = Vec::new();
    renderer
        .write_json(&mut json, &data, now)
        .expect("render json");
    let value: serde_json::Value = serde_json::from_slice(&json).expect("valid json");
    assert_eq!(value["stats"]["active"], 2);
    assert_eq!(value["dashboard"]["notes"][0]["note"], "Use UUIDs");

    let mut out = Vec::new();
    renderer
        .write_text(
            &mut out,
            &data,
            NaiveDate::from_ymd_opt(2024, 1, 16).expect("valid date"),
        )
        .expect("render text");
    let out = String::from_utf8(out).expect("utf8");
    assert!(out.contains("Active Tasks (2)"));
    assert!(out.contains("Nothing waiting for review"));
    assert!(out.contains("2024-01-10 — Schema"));
}

#[test]
fn unreadable_document_is_reported_at_the_source() {
    let temp = tempdir().expect("tempdir");
    let origin = DocumentOrigin::Path(temp.path().join("missing.md"));

    match load_document(&origin) {
        Err(DocumentError::Unavailable { origin: reported, .. }) => {
            assert_eq!(reported, origin);
        }
        Ok(_) => panic!("missing document must not load"),
    }
}
