// tests/time_prog_api.rs


use axum::http::StatusCode;
use htrest::device::TimeProgram;
use serde_json::{Value, json};
use test_helpers::app;

fn week(ead: usize, nod: usize, entry: Value) -> Value {
    Value::Array(vec![Value::Array(vec![entry; ead]); nod])
}

#[tokio::test]
async fn test_list_time_progs_has_no_entries() {
    let app = app().build();

    let (status, body) = app.get("/api/v1/timeprog/").await;
    assert_eq!(status, StatusCode::OK);
    let progs: Vec<TimeProgram> = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(progs.len(), 3);
    assert_eq!(progs[0].name, "Warmwasser");
    assert!(progs.iter().all(|p| p.entries.is_none()));
    assert!(body[0].get("entries").is_none());
}

#[tokio::test]
async fn test_get_time_prog_with_entries() {
    let app = app().build();

    let (status, body) = app.get("/api/v1/timeprog/1").await;
    assert_eq!(status, StatusCode::OK);
    let prog: TimeProgram = serde_json::from_value(body).unwrap();
    assert_eq!(prog.index, 1);
    let entries = prog.entries.unwrap();
    assert_eq!(entries.len(), prog.nod);
    assert!(entries.iter().all(|day| day.len() == prog.ead));
    app.assert_balanced_sessions(1);
}

#[tokio::test]
async fn test_unknown_time_prog_is_404() {
    let app = app().build();

    let (status, body) = app.get("/api/v1/timeprog/3").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Time program #3 not found");

    let (status, _) = app.get("/api/v1/timeprog/9/0/0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    app.assert_balanced_sessions(2);
}

#[tokio::test]
async fn test_entry_slot_bounds() {
    let app = app().build();

    let (status, body) = app.get("/api/v1/timeprog/0/6/6").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "state": 0, "start": "00:00", "end": "00:00" }));

    let (status, _) = app.get("/api/v1/timeprog/0/7/0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/api/v1/timeprog/0/0/7").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_entry_then_get() {
    let app = app().build();
    let entry = json!({ "state": 1, "start": "06:00", "end": "22:30" });

    let (status, body) = app.put("/api/v1/timeprog/0/2/1", entry.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, entry);

    let (_, body) = app.get("/api/v1/timeprog/0/2/1").await;
    assert_eq!(body, entry);

    let (_, prog) = app.get("/api/v1/timeprog/0").await;
    assert_eq!(prog["entries"][2][1], entry);
    assert_eq!(app.probe.writes(), 1);
}

#[tokio::test]
async fn test_invalid_entries_are_rejected() {
    let app = app().build();

    // state out of range
    let (status, _) = app
        .put(
            "/api/v1/timeprog/1/0/0",
            json!({ "state": 2, "start": "06:00", "end": "07:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // not on the 15 minute grid
    let (status, _) = app
        .put(
            "/api/v1/timeprog/0/0/0",
            json!({ "state": 1, "start": "06:10", "end": "07:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let (status, _) = app
        .put(
            "/api/v1/timeprog/0/0/0",
            json!({ "state": 1, "start": "25:00", "end": "07:00" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.probe.writes(), 0);
}

#[tokio::test]
async fn test_replace_time_prog() {
    let app = app().build();
    let entry = json!({ "state": 2, "start": "05:45", "end": "24:00" });

    let (status, body) = app
        .put("/api/v1/timeprog/2", json!({ "entries": week(7, 7, entry.clone()) }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Heizung");
    assert_eq!(body["entries"][6][6], entry);

    let (_, body) = app.get("/api/v1/timeprog/2/3/4").await;
    assert_eq!(body, entry);
}

#[tokio::test]
async fn test_replace_time_prog_wrong_dimensions() {
    let app = app().build();
    let entry = json!({ "state": 0, "start": "00:00", "end": "00:00" });

    let (status, _) = app
        .put("/api/v1/timeprog/0", json!({ "entries": week(7, 6, entry) }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.probe.writes(), 0);
    app.assert_balanced_sessions(1);
}

#[tokio::test]
async fn test_read_only_time_prog_is_echoed() {
    let app = app().read_only().build();
    let entry = json!({ "state": 1, "start": "08:00", "end": "09:00" });

    let (status, body) = app.put("/api/v1/timeprog/0/0/0", entry.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, entry);

    let (_, body) = app.get("/api/v1/timeprog/0/0/0").await;
    assert_eq!(body["state"], 0);
    assert_eq!(app.probe.writes(), 0);
}
