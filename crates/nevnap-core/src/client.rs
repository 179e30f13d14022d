//! The name day client: cursor ownership and the date-keyed fetch pipeline.
//!
//! One client owns exactly one piece of long-lived mutable state, the
//! cursor (plus the result it last published). Navigation replaces the
//! cursor before the corresponding fetch begins, and every fetch snapshots
//! a generation counter so that a slow response issued for an older cursor
//! is discarded on arrival instead of overwriting newer state. The state
//! mutex is never held across the network await.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::core_types::{DateLabel, FetchPhase, NameList};
use crate::date_key;
use crate::errors::NameDayError;
use crate::handler::{NameDayHandlerArc, NoopHandler};

struct CursorState {
    cursor: NaiveDate,
    generation: u64,
    phase: FetchPhase,
    last_names: Option<NameList>,
}

pub struct NameDayClient {
    http: reqwest::Client,
    config: ClientConfig,
    state: Arc<Mutex<CursorState>>,
    handler: NameDayHandlerArc,
}

impl NameDayClient {
    /// Client with the cursor on today's date. No fetch is issued; the
    /// first refresh is explicitly triggered by the caller.
    pub fn new(config: ClientConfig) -> Self {
        Self::starting_at(config, date_key::today())
    }

    /// Client with the cursor on an explicit start date.
    pub fn starting_at(config: ClientConfig, start: NaiveDate) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            state: Arc::new(Mutex::new(CursorState {
                cursor: start,
                generation: 0,
                phase: FetchPhase::Idle,
                last_names: None,
            })),
            handler: Arc::new(NoopHandler),
        }
    }

    /// Attach the presentation-side collaborator that receives published
    /// results and errors.
    pub fn with_handler(mut self, handler: NameDayHandlerArc) -> Self {
        self.handler = handler;
        self
    }

    pub async fn cursor(&self) -> NaiveDate {
        self.state.lock().await.cursor
    }

    pub async fn phase(&self) -> FetchPhase {
        self.state.lock().await.phase
    }

    /// The last successfully published list, if any. Errors never clear it.
    pub async fn last_names(&self) -> Option<NameList> {
        self.state.lock().await.last_names.clone()
    }

    /// Header strings for the active cursor date.
    pub async fn current_label(&self) -> DateLabel {
        let cursor = self.state.lock().await.cursor;
        DateLabel {
            long_date: date_key::format_long_date(cursor),
            weekday: date_key::format_weekday(cursor, self.config.locale).to_string(),
        }
    }

    /// Fetch the name list for the current cursor and publish the outcome.
    ///
    /// If a navigation call moves the cursor while this request is in
    /// flight, the response is returned to this caller but not published:
    /// the client's state and the collaborator only ever see results for
    /// the newest cursor.
    pub async fn refresh(&self) -> Result<NameList, NameDayError> {
        let (date, generation) = {
            let mut state = self.state.lock().await;
            state.phase = FetchPhase::InFlight;
            (state.cursor, state.generation)
        };
        let key = date_key::encode(date);
        let outcome = self.fetch_names(&key).await;
        self.settle(generation, &key, outcome).await
    }

    /// Move the cursor one day forward and refresh.
    pub async fn go_to_next_day(&self) -> Result<NameList, NameDayError> {
        self.shift_cursor(1).await;
        self.refresh().await
    }

    /// Move the cursor one day back and refresh.
    pub async fn go_to_previous_day(&self) -> Result<NameList, NameDayError> {
        self.shift_cursor(-1).await;
        self.refresh().await
    }

    /// Reset the cursor to today, regardless of prior navigation, and
    /// refresh.
    pub async fn jump_to_today(&self) -> Result<NameList, NameDayError> {
        {
            let mut state = self.state.lock().await;
            state.cursor = date_key::today();
            state.generation += 1;
        }
        self.refresh().await
    }

    async fn shift_cursor(&self, days: i64) {
        let mut state = self.state.lock().await;
        state.cursor = date_key::add_days(state.cursor, days);
        state.generation += 1;
    }

    async fn fetch_names(&self, key: &str) -> Result<NameList, NameDayError> {
        let url = format!("{}/nap/{}", self.config.api_base, key);
        log::debug!("fetching name days from {}", url);

        let response = self
            .http
            .get(&url)
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NameDayError::HttpStatus {
                status: status.as_u16(),
                key: key.to_string(),
            });
        }

        let body = response.text().await?;
        parse_name_list(&body, key)
    }

    async fn settle(
        &self,
        generation: u64,
        key: &str,
        outcome: Result<NameList, NameDayError>,
    ) -> Result<NameList, NameDayError> {
        {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                log::debug!("discarding superseded response for key {}", key);
                return outcome;
            }
            state.phase = FetchPhase::Settled;
            if let Ok(names) = &outcome {
                state.last_names = Some(names.clone());
            }
        }

        match &outcome {
            Ok(names) => self.handler.on_names_changed(names).await,
            Err(err) => {
                log::warn!("name day lookup for key {} failed: {}", key, err);
                self.handler.on_fetch_error(err).await;
            }
        }

        outcome
    }
}

/// Extract the name list stored under `key` from a body shaped like
/// `{"03-15": ["Kristóf", "Mira"], ...}`. Keys other than the requested
/// one are ignored.
fn parse_name_list(body: &str, key: &str) -> Result<NameList, NameDayError> {
    let json: Value = serde_json::from_str(body)
        .map_err(|err| NameDayError::MalformedResponse(err.to_string()))?;
    let entries = json.as_object().ok_or_else(|| {
        NameDayError::MalformedResponse("top-level value is not an object".to_string())
    })?;
    let names = entries
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| NameDayError::MissingKey(key.to_string()))?;
    names
        .iter()
        .map(|value| {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| NameDayError::MissingKey(key.to_string()))
        })
        .collect()
}

impl Clone for NameDayClient {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            config: self.config.clone(),
            state: self.state.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl fmt::Debug for NameDayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameDayClient")
            .field("http", &"<reqwest::Client>")
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::handler::NameDayHandler;
    use crate::test_utils::MockNameDayServer;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingHandler {
        published: StdMutex<Vec<NameList>>,
        errors: StdMutex<Vec<NameDayError>>,
    }

    #[async_trait]
    impl NameDayHandler for RecordingHandler {
        async fn on_names_changed(&self, names: &NameList) {
            self.published.lock().unwrap().push(names.clone());
        }

        async fn on_fetch_error(&self, error: &NameDayError) {
            self.errors.lock().unwrap().push(error.clone());
        }
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn client_for(server: &MockNameDayServer, start: NaiveDate) -> (NameDayClient, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::default());
        let config = ClientConfig::default().with_api_base(server.address());
        let client = NameDayClient::starting_at(config, start).with_handler(handler.clone());
        (client, handler)
    }

    #[tokio::test]
    async fn test_successful_refresh_publishes_names() {
        let server = MockNameDayServer::start().await;
        server.stub("03-15", r#"{"03-15": ["Kristóf", "Mira"]}"#);

        let (client, handler) = client_for(&server, date(2024, 3, 15));
        assert_eq!(client.phase().await, FetchPhase::Idle);

        let names = client.refresh().await.unwrap();
        assert_eq!(names, vec!["Kristóf", "Mira"]);
        assert_eq!(client.last_names().await, Some(names.clone()));
        assert_eq!(client.phase().await, FetchPhase::Settled);
        assert_eq!(handler.published.lock().unwrap().as_slice(), &[names]);
        assert!(handler.errors.lock().unwrap().is_empty());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_list_is_a_result_not_an_error() {
        let server = MockNameDayServer::start().await;
        server.stub("07-01", r#"{"07-01": []}"#);

        let (client, handler) = client_for(&server, date(2024, 7, 1));
        let names = client.refresh().await.unwrap();
        assert!(names.is_empty());
        assert_eq!(client.last_names().await, Some(vec![]));
        assert!(handler.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_replaces_the_previous_list_wholesale() {
        let server = MockNameDayServer::start().await;
        server.stub("03-15", r#"{"03-15": ["Kristóf", "Mira"]}"#);
        server.stub("03-16", r#"{"03-16": ["Henrietta"]}"#);

        let (client, handler) = client_for(&server, date(2024, 3, 15));
        client.refresh().await.unwrap();
        let names = client.go_to_next_day().await.unwrap();

        assert_eq!(client.cursor().await, date(2024, 3, 16));
        assert_eq!(names, vec!["Henrietta"]);
        // Replaced, not appended.
        assert_eq!(client.last_names().await, Some(vec!["Henrietta".to_string()]));
        assert_eq!(handler.published.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_previous_day_moves_cursor_back() {
        let server = MockNameDayServer::start().await;
        server.stub("02-29", r#"{"02-29": ["Elemér"]}"#);

        let (client, _handler) = client_for(&server, date(2024, 3, 1));
        let names = client.go_to_previous_day().await.unwrap();
        assert_eq!(client.cursor().await, date(2024, 2, 29));
        assert_eq!(names, vec!["Elemér"]);
    }

    #[tokio::test]
    async fn test_http_error_keeps_previous_names() {
        let server = MockNameDayServer::start().await;
        server.stub("03-15", r#"{"03-15": ["Kristóf", "Mira"]}"#);
        server.stub_with_status("03-16", 500, "internal error");

        let (client, handler) = client_for(&server, date(2024, 3, 15));
        client.refresh().await.unwrap();

        let err = client.go_to_next_day().await.unwrap_err();
        assert!(matches!(err, NameDayError::HttpStatus { status: 500, .. }));
        assert_eq!(
            client.last_names().await,
            Some(vec!["Kristóf".to_string(), "Mira".to_string()])
        );
        assert_eq!(handler.errors.lock().unwrap().len(), 1);
        assert_eq!(handler.published.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_keeps_previous_names() {
        let server = MockNameDayServer::start().await;
        server.stub("03-15", r#"{"03-15": ["Kristóf", "Mira"]}"#);
        server.stub("03-16", "definitely not json");

        let (client, handler) = client_for(&server, date(2024, 3, 15));
        client.refresh().await.unwrap();

        let err = client.go_to_next_day().await.unwrap_err();
        assert!(matches!(err, NameDayError::MalformedResponse(_)));
        assert_eq!(
            client.last_names().await,
            Some(vec!["Kristóf".to_string(), "Mira".to_string()])
        );
        assert!(matches!(
            handler.errors.lock().unwrap()[0],
            NameDayError::MalformedResponse(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_key_is_an_error() {
        let server = MockNameDayServer::start().await;
        // Valid object, but the requested key is absent.
        server.stub("03-15", r#"{"01-01": ["Fruzsina"]}"#);

        let (client, _handler) = client_for(&server, date(2024, 3, 15));
        let err = client.refresh().await.unwrap_err();
        assert!(matches!(err, NameDayError::MissingKey(key) if key == "03-15"));
        assert_eq!(client.last_names().await, None);
    }

    #[tokio::test]
    async fn test_non_string_entry_is_an_error() {
        let server = MockNameDayServer::start().await;
        server.stub("03-15", r#"{"03-15": ["Kristóf", 42]}"#);

        let (client, _handler) = client_for(&server, date(2024, 3, 15));
        let err = client.refresh().await.unwrap_err();
        assert!(matches!(err, NameDayError::MissingKey(_)));
    }

    #[tokio::test]
    async fn test_superseded_response_is_not_published() {
        let server = MockNameDayServer::start().await;
        server.stub("03-15", r#"{"03-15": ["Kristóf", "Mira"]}"#);
        server.stub("03-16", r#"{"03-16": ["Henrietta"]}"#);
        let gate = server.hold("03-15");

        let (client, handler) = client_for(&server, date(2024, 3, 15));

        let slow = tokio::spawn({
            let client = client.clone();
            async move { client.refresh().await }
        });
        // Navigate away only once the first request is actually in flight.
        gate.wait_arrived().await;
        let names = client.go_to_next_day().await.unwrap();
        assert_eq!(names, vec!["Henrietta"]);

        gate.release();
        let stale = slow.await.unwrap().unwrap();
        // The superseded caller still sees its own outcome...
        assert_eq!(stale, vec!["Kristóf", "Mira"]);
        // ...but the published state belongs to the newest navigation.
        assert_eq!(client.last_names().await, Some(vec!["Henrietta".to_string()]));
        assert_eq!(
            handler.published.lock().unwrap().as_slice(),
            &[vec!["Henrietta".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_jump_to_today_resets_cursor_after_errors() {
        let server = MockNameDayServer::start().await;
        let today = date_key::today();
        server.stub(
            &date_key::encode(today),
            &format!(r#"{{"{}": ["Gergely"]}}"#, date_key::encode(today)),
        );

        let start = date_key::add_days(today, -40);
        let (client, _handler) = client_for(&server, start);

        // Unstubbed days answer 404; the client must stay usable.
        let _ = client.go_to_previous_day().await;
        let _ = client.go_to_previous_day().await;
        assert_eq!(client.cursor().await, date_key::add_days(start, -2));

        let names = client.jump_to_today().await.unwrap();
        assert_eq!(client.cursor().await, today);
        assert_eq!(names, vec!["Gergely"]);
    }

    #[tokio::test]
    async fn test_current_label_tracks_the_cursor() {
        let server = MockNameDayServer::start().await;
        let config = ClientConfig::default()
            .with_api_base(server.address())
            .with_locale(Locale::Hungarian);
        let client = NameDayClient::starting_at(config, date(2020, 11, 20));

        let label = client.current_label().await;
        assert_eq!(label.long_date, "2020. 11. 20.");
        assert_eq!(label.weekday, "péntek");
    }

    #[test]
    fn test_parse_extracts_the_requested_key_only() {
        let body = r#"{"03-15": ["Kristóf", "Mira"], "03-16": ["Henrietta"]}"#;
        let names = parse_name_list(body, "03-15").unwrap();
        assert_eq!(names, vec!["Kristóf", "Mira"]);
    }

    #[test]
    fn test_parse_rejects_non_object_bodies() {
        assert!(matches!(
            parse_name_list("[1, 2, 3]", "03-15"),
            Err(NameDayError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_name_list("", "03-15"),
            Err(NameDayError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_array_values() {
        assert!(matches!(
            parse_name_list(r#"{"03-15": "Kristóf"}"#, "03-15"),
            Err(NameDayError::MissingKey(_))
        ));
    }
}
