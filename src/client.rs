//! This module provides a client to connect to a remote event store over HTTP

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use crate::config::StoreSettings;
use crate::error::{CalendarError, CalendarResult};
use crate::event::{CalendarEvent, EventId};
use crate::traits::{EventStore, Listing};


/// An [`EventStore`] that talks to a REST server:
///
/// | operation | request                |
/// |-----------|------------------------|
/// | list      | `GET /events`          |
/// | create    | `POST /events`         |
/// | update    | `PUT /events/{id}`     |
/// | delete    | `DELETE /events/{id}`  |
/// | bulk sync | `POST /events/sync`    |
pub struct Client {
    settings: StoreSettings,
    http: reqwest::Client,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new(settings: StoreSettings) -> CalendarResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|err| CalendarError::Config(format!("unable to build an HTTP client: {}", err)))?;

        Ok(Self { settings, http })
    }

    /// Create a client for the default store (see [`crate::config`])
    pub fn from_env() -> CalendarResult<Self> {
        Self::new(StoreSettings::from_env()?)
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.settings.endpoint(segments);
        log::debug!("{} {}", method, url);
        self.http.request(method, url)
    }

    fn json_request<B: Serialize + ?Sized>(&self, method: Method, segments: &[&str], body: &B) -> CalendarResult<RequestBuilder> {
        let body = serde_json::to_string(body)
            .map_err(|err| CalendarError::validation(format!("unable to serialize the request: {}", err)))?;

        Ok(self.request(method, segments)
            .header(CONTENT_TYPE, "application/json")
            .body(body))
    }

    /// Send a request, and return the body of a successful response
    async fn send(&self, request: RequestBuilder, descr: &str) -> CalendarResult<String> {
        let result = send_request(request, descr).await;
        if let Err(err) = &result {
            log::error!("Error while trying to {}: {}", descr, err);
        }
        result
    }
}

#[async_trait]
impl EventStore for Client {
    async fn list(&self) -> CalendarResult<Listing> {
        let request = self.request(Method::GET, &["events"]);
        let text = self.send(request, "fetch events").await?;
        parse_collection(&text)
    }

    async fn upsert(&self, event: &CalendarEvent) -> CalendarResult<CalendarEvent> {
        let request = match event.id() {
            Some(id) => {
                let id = id.to_string();
                self.json_request(Method::PUT, &["events", &id], event)?
            },
            None => self.json_request(Method::POST, &["events"], event)?,
        };

        let text = self.send(request, "save event").await?;
        canonical_reply(event, &text)
    }

    async fn delete(&self, id: &EventId) -> CalendarResult<()> {
        let id = id.to_string();
        let request = self.request(Method::DELETE, &["events", &id]);
        self.send(request, "delete event").await?;
        Ok(())
    }

    async fn bulk_sync(&self, events: &[CalendarEvent]) -> CalendarResult<Vec<CalendarEvent>> {
        let request = self.json_request(Method::POST, &["events", "sync"], events)?;
        let text = self.send(request, "sync events").await?;
        Ok(parse_collection(&text)?.events)
    }
}


async fn send_request(request: RequestBuilder, descr: &str) -> CalendarResult<String> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() == false {
        return Err(CalendarError::transport(Some(status), format!("unable to {}", descr)));
    }
    Ok(response.text().await?)
}

fn parse_json(text: &str) -> CalendarResult<Value> {
    serde_json::from_str(text)
        .map_err(|err| CalendarError::transport(None, format!("invalid JSON in response: {}", err)))
}

/// Parse a list of events.
///
/// Anything else than a JSON array is considered as an empty list, and flagged as such. Items that are not events are skipped.
pub(crate) fn parse_collection(text: &str) -> CalendarResult<Listing> {
    let items = match parse_json(text)? {
        Value::Array(items) => items,
        other => {
            log::warn!("Expected a list of events, got {}. Considering it is empty.", kind_of(&other));
            return Ok(Listing::unexpected(kind_of(&other)));
        },
    };

    let mut events = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<CalendarEvent>(item) {
            Ok(event) => events.push(event),
            Err(err) => log::warn!("Ignoring an invalid event from the store: {}", err),
        }
    }
    Ok(Listing::from(events))
}

/// Returns the store's version of an event we have just sent.
///
/// Some stores reply with the full event, others only acknowledge it (e.g. `{"message": "...", "id": "..."}`).
/// In the latter case, the sent event is returned, with the ID from the reply if any.
pub(crate) fn canonical_reply(sent: &CalendarEvent, text: &str) -> CalendarResult<CalendarEvent> {
    if text.trim().is_empty() {
        return Ok(sent.clone());
    }

    let reply = parse_json(text)?;
    let is_full_event = reply.get("title").map(Value::is_string).unwrap_or(false);
    if is_full_event {
        if let Ok(event) = serde_json::from_value::<CalendarEvent>(reply.clone()) {
            return Ok(event);
        }
    }

    let mut canonical = sent.clone();
    if let Some(id) = reply.get("id").and_then(|id| serde_json::from_value::<EventId>(id.clone()).ok()) {
        canonical.set_id(Some(id));
    }
    Ok(canonical)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
