//! Tests of the REST client, against a local HTTP server that records the requests it receives

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::Router;
use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};

use wall_calendar::client::Client;
use wall_calendar::config::StoreSettings;
use wall_calendar::status::{status_channel, StatusLevel};
use wall_calendar::traits::EventStore;
use wall_calendar::{CalendarError, CalendarEvent, DisplayedMonth, EventDraft, EventId, RemoteCalendarController};


/// A request, as received by the test server
#[derive(Clone, Debug, PartialEq)]
struct Received {
    method: String,
    path: String,
    body: String,
}

impl Received {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct ServerState {
    received: Arc<Mutex<Vec<Received>>>,
    /// Replies to the next requests, in order. When empty, an empty list is returned
    replies: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl ServerState {
    fn reply(&self, status: StatusCode, body: &str) {
        self.replies.lock().unwrap().push_back((status, body.to_string()));
    }

    fn reply_json(&self, body: Value) {
        self.reply(StatusCode::OK, &body.to_string());
    }

    fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

async fn record(State(state): State<ServerState>, method: Method, uri: Uri, body: String) -> (StatusCode, String) {
    state.received.lock().unwrap().push(Received {
        method: method.to_string(),
        path: uri.path().to_string(),
        body,
    });

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let reply = state.replies.lock().unwrap().pop_front();
    reply.unwrap_or_else(|| (StatusCode::OK, "[]".to_string()))
}

/// Start a server on a random port, and return its base URL
async fn start_server(state: ServerState) -> String {
    let app = Router::new().fallback(record).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", address)
}

async fn client_and_server() -> (Client, ServerState) {
    let _ = env_logger::builder().is_test(true).try_init();
    let state = ServerState::default();
    let url = start_server(state.clone()).await;
    let client = Client::new(StoreSettings::new(url, Duration::from_secs(5)).unwrap()).unwrap();
    (client, state)
}

fn lunch() -> CalendarEvent {
    CalendarEvent::new("Lunch", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), NaiveTime::from_hms_opt(12, 0, 0).unwrap())
        .with_description("with Alice")
        .with_color("#ff006e")
}


#[tokio::test]
async fn listing_events() {
    let (client, server) = client_and_server().await;
    server.reply_json(json!([
        {"id": 1, "title": "Standup", "date": "2024-03-05", "time": "09:00:00", "description": "", "color": "#3a86ff"},
        {"id": "b2", "title": "Old one", "date": "Tue, 05 Mar 2024 00:00:00 GMT", "time": "14:30:00", "desc": "legacy", "color": ""},
        {"id": 3, "title": "Broken", "date": "someday"}
    ]));

    let events = client.list().await.unwrap().events;

    assert_eq!(server.received(), vec![Received { method: "GET".into(), path: "/events".into(), body: String::new() }]);
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].id(), Some(&EventId::Number(1)));
    assert_eq!(
        events[1].normalized().unwrap(),
        (NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), NaiveTime::from_hms_opt(14, 30, 0).unwrap())
    );
    assert_eq!(events[1].description(), "legacy");
    assert!(events[1].color().is_empty() == false);
    assert!(events[2].when().is_malformed());
}

#[tokio::test]
async fn creating_an_event() {
    let (client, server) = client_and_server().await;
    server.reply(StatusCode::CREATED, r#"{"message": "Event created", "id": "a7f3"}"#);

    let saved = client.upsert(&lunch()).await.unwrap();
    assert_eq!(saved, lunch().with_id("a7f3"));

    let received = server.received();
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].path, "/events");
    assert_eq!(received[0].json(), json!({
        "title": "Lunch",
        "date": "2024-03-05",
        "time": "12:00",
        "description": "with Alice",
        "color": "#ff006e",
    }));
}

#[tokio::test]
async fn updating_an_event() {
    let (client, server) = client_and_server().await;
    server.reply_json(json!({"message": "Event updated"}));

    let saved = client.upsert(&lunch().with_id(7i64)).await.unwrap();
    assert_eq!(saved.id(), Some(&EventId::Number(7)));

    let received = server.received();
    assert_eq!(received[0].method, "PUT");
    assert_eq!(received[0].path, "/events/7");
    assert_eq!(received[0].json()["id"], json!(7));
}

#[tokio::test]
async fn deleting_an_event() {
    let (client, server) = client_and_server().await;
    server.reply_json(json!({"message": "Event deleted"}));

    client.delete(&EventId::from("a7f3")).await.unwrap();
    assert_eq!(server.received()[0].method, "DELETE");
    assert_eq!(server.received()[0].path, "/events/a7f3");
}

#[tokio::test]
async fn syncing_local_events() {
    let (client, server) = client_and_server().await;
    server.reply_json(json!([
        {"id": 1, "title": "Lunch", "date": "2024-03-05", "time": "12:00"},
        {"id": 2, "title": "Dinner", "date": "2024-03-05", "time": "20:00"}
    ]));

    let dinner = CalendarEvent::new("Dinner", NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
    let merged = client.bulk_sync(&[lunch(), dinner]).await.unwrap();

    assert_eq!(merged.len(), 2);
    let received = server.received();
    assert_eq!(received[0].method, "POST");
    assert_eq!(received[0].path, "/events/sync");
    assert_eq!(received[0].json().as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn error_statuses_are_reported() {
    let (client, server) = client_and_server().await;
    server.reply(StatusCode::NOT_FOUND, r#"{"error": "Event not found"}"#);
    server.reply(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");

    let err = client.delete(&EventId::from("ghost")).await.unwrap_err();
    assert!(err.is_not_found());

    let err = client.list().await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    assert!(err.to_string().starts_with("HTTP error! status: 500"));
}

#[tokio::test]
async fn odd_collections() {
    let (client, server) = client_and_server().await;
    server.reply_json(json!({"events": []}));
    server.reply(StatusCode::OK, "<html>oops</html>");

    let listing = client.list().await.unwrap();
    assert_eq!(listing.events, Vec::new());
    assert_eq!(listing.unexpected_payload.as_deref(), Some("an object"));
    let err = client.list().await.unwrap_err();
    assert!(matches!(err, CalendarError::Transport { status: None, .. }));
}

#[tokio::test]
async fn base_url_with_a_prefix() {
    let _ = env_logger::builder().is_test(true).try_init();
    let state = ServerState::default();
    let url = start_server(state.clone()).await;
    let client = Client::new(StoreSettings::new(format!("{}/api/", url), Duration::from_secs(5)).unwrap()).unwrap();

    client.list().await.unwrap();
    assert_eq!(state.received()[0].path, "/api/events");
}

#[tokio::test]
async fn slow_stores_time_out() {
    let _ = env_logger::builder().is_test(true).try_init();
    let state = ServerState::default();
    *state.delay.lock().unwrap() = Some(Duration::from_millis(500));
    let url = start_server(state.clone()).await;
    let client = Client::new(StoreSettings::new(url, Duration::from_millis(50)).unwrap()).unwrap();

    let err = client.list().await.unwrap_err();
    assert!(matches!(err, CalendarError::Transport { status: None, .. }));
}

#[tokio::test]
async fn unreachable_stores() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = Client::new(StoreSettings::new(format!("http://{}", address), Duration::from_secs(1)).unwrap()).unwrap();
    let err = client.list().await.unwrap_err();
    assert_eq!(err.status(), None);
    assert!(err.to_string().starts_with("Request failed"));
}

#[tokio::test]
async fn controller_over_http() {
    let (client, server) = client_and_server().await;
    let controller = RemoteCalendarController::new(client, DisplayedMonth::new(2024, 3).unwrap());

    server.reply_json(json!([]));
    controller.initialize().await.unwrap();
    assert_eq!(controller.events_on_day(5), Vec::new());

    server.reply(StatusCode::CREATED, r#"{"message": "Event created", "id": "a7f3"}"#);
    server.reply_json(json!([
        {"id": "a7f3", "title": "Lunch", "date": "2024-03-05", "time": "12:00", "description": "", "color": "#3a86ff"}
    ]));
    let draft = EventDraft::from_form("Lunch", "2024-03-05", "12:00", "", "").unwrap();
    controller.submit(&draft).await.unwrap();

    let requests: Vec<(String, String)> = server.received().into_iter().map(|r| (r.method, r.path)).collect();
    assert_eq!(requests, vec![
        ("GET".to_string(), "/events".to_string()),
        ("POST".to_string(), "/events".to_string()),
        ("GET".to_string(), "/events".to_string()),
    ]);
    assert_eq!(controller.events_on_day(5).len(), 1);
    assert_eq!(controller.events_on_day(5)[0].id(), Some(&EventId::from("a7f3")));
}

#[tokio::test]
async fn loads_that_are_not_lists_are_errors() {
    let (client, server) = client_and_server().await;
    let (sender, receiver) = status_channel();
    let controller = RemoteCalendarController::new_with_status(client, DisplayedMonth::new(2024, 3).unwrap(), sender);

    server.reply_json(json!([
        {"id": 1, "title": "Standup", "date": "2024-03-05", "time": "09:00"}
    ]));
    controller.initialize().await.unwrap();
    assert_eq!(controller.events().len(), 1);
    assert_eq!(receiver.borrow().clone().map(|r| r.level), Some(StatusLevel::Info));

    server.reply_json(json!({"error": "db down"}));
    let report = controller.initialize().await.unwrap();
    assert_eq!(report.total, 0);
    assert_eq!(report.unexpected_payload.as_deref(), Some("an object"));
    assert_eq!(controller.events(), Vec::new());
    assert_eq!(controller.events_on_day(5), Vec::new());
    assert_eq!(receiver.borrow().clone().map(|r| r.level), Some(StatusLevel::Error));
}
