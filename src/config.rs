//! Support for library configuration options

use std::sync::{Arc, Mutex};
use std::time::Duration;

use once_cell::sync::Lazy;
use url::Url;

use crate::error::CalendarResult;

/// Environment variable that overrides [`DEFAULT_BASE_URL`]
pub const BASE_URL_ENV_VAR: &str = "WALL_CALENDAR_API_URL";

/// The address of the event store, when nothing else is specified.
/// It can be overridden with the `WALL_CALENDAR_API_URL` environment variable, or at runtime.
pub static DEFAULT_BASE_URL: Lazy<Arc<Mutex<String>>> = Lazy::new(|| {
    let url = std::env::var(BASE_URL_ENV_VAR).unwrap_or_else(|_| "http://localhost:5000".to_string());
    Arc::new(Mutex::new(url))
});

/// The accent color given to events that do not have one.
/// Feel free to override it when initing this library.
pub static DEFAULT_COLOR: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("#3a86ff".to_string())));

/// How long a single request to the store may take
pub static DEFAULT_TIMEOUT: Lazy<Arc<Mutex<Duration>>> = Lazy::new(|| Arc::new(Mutex::new(Duration::from_secs(10))));

/// The time of day a new event starts at
pub const DEFAULT_EVENT_HOUR: u32 = 12;

pub fn default_color() -> String {
    read(&DEFAULT_COLOR)
}

fn read<T: Clone>(value: &Lazy<Arc<Mutex<T>>>) -> T {
    value.lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}


/// Where and how to reach the remote event store
#[derive(Clone, Debug, PartialEq)]
pub struct StoreSettings {
    base_url: Url,
    timeout: Duration,
}

impl StoreSettings {
    pub fn new<S: AsRef<str>>(base_url: S, timeout: Duration) -> CalendarResult<Self> {
        let base_url = Url::parse(base_url.as_ref())?;
        Ok(Self { base_url, timeout })
    }

    /// Build settings from the library defaults (see [`DEFAULT_BASE_URL`] and [`DEFAULT_TIMEOUT`])
    pub fn from_env() -> CalendarResult<Self> {
        Self::new(read(&DEFAULT_BASE_URL), read(&DEFAULT_TIMEOUT))
    }

    pub fn base_url(&self) -> &Url { &self.base_url }
    pub fn timeout(&self) -> Duration { self.timeout }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the URL of an endpoint, relative to the base URL.
    ///
    /// The base URL may or may not end with a slash, and may contain a path prefix (e.g. `http://host/api`).
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }
}
