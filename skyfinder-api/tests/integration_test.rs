use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use skyfinder_api::client::{SearchClientError, SearchService};
use skyfinder_api::state::SearchSettings;
use skyfinder_api::{app, AppState};
use skyfinder_core::repository::{SearchSession, SearchSessionRepository};
use skyfinder_core::search::{SearchRequest, SearchResponse};
use skyfinder_core::{CoreError, CoreResult};
use skyfinder_store::InMemorySessionStore;

/// Records every request and answers with a fixed body, or fails.
struct StubSearch {
    body: Option<Value>,
    calls: AtomicUsize,
    last_request: Mutex<Option<SearchRequest>>,
}

impl StubSearch {
    fn answering(body: Value) -> Arc<Self> {
        Arc::new(Self { body: Some(body), calls: AtomicUsize::new(0), last_request: Mutex::new(None) })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self { body: None, calls: AtomicUsize::new(0), last_request: Mutex::new(None) })
    }
}

#[async_trait]
impl SearchService for StubSearch {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        match &self.body {
            Some(body) => Ok(serde_json::from_value(body.clone()).unwrap()),
            None => Err(SearchClientError::Status(500)),
        }
    }
}

/// A session store whose backend is always down.
struct BrokenSessions;

#[async_trait]
impl SearchSessionRepository for BrokenSessions {
    async fn save_session(&self, _session: SearchSession) -> CoreResult<uuid::Uuid> {
        Err(CoreError::InternalError("store offline".to_string()))
    }

    async fn get_session(&self, _id: uuid::Uuid) -> CoreResult<Option<SearchSession>> {
        Err(CoreError::InternalError("store offline".to_string()))
    }

    async fn session_count(&self) -> CoreResult<usize> {
        Ok(0)
    }
}

fn state_with(stub: Arc<StubSearch>, fallback_to_examples: bool) -> AppState {
    AppState {
        search: stub,
        sessions: Arc::new(InMemorySessionStore::new(16)),
        settings: SearchSettings { user_age: 30, fallback_to_examples },
    }
}

fn trip_form() -> Value {
    json!({
        "origin": "Новосибирск",
        "destination": "Санкт-Петербург",
        "departDate": "2025-04-07",
        "passengers": 2,
        "baggage": true
    })
}

fn post_search(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn upstream_offers() -> Value {
    json!({
        "results": [
            { "id": 10, "flightNumber": "S7 100", "originCode": "OVB", "destinationCode": "LED",
              "departureTime": "09:00", "arrivalTime": "10:00", "duration": "5ч 00м",
              "direct": true, "price": 15000 },
            { "id": 11, "flightNumber": "S7 101", "originCode": "OVB", "destinationCode": "LED",
              "departureTime": "06:30", "arrivalTime": "11:00", "duration": "7ч 30м",
              "direct": false, "connections": [{ "airport": "Москва", "code": "SVO", "waitTime": "1ч 00м" }],
              "price": 9800 }
        ]
    })
}

#[tokio::test]
async fn test_empty_origin_is_rejected_without_calling_search() {
    let stub = StubSearch::answering(upstream_offers());
    let app = app(state_with(stub.clone(), true));

    let mut form = trip_form();
    form["origin"] = json!("");
    let response = app.oneshot(post_search("/v1/search", &form)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json(response).await;
    assert_eq!(body["fields"]["origin"], "Укажите город отправления");
    assert!(body["fields"].get("destination").is_none());
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_valid_form_calls_search_exactly_once() {
    let stub = StubSearch::answering(upstream_offers());
    let app = app(state_with(stub.clone(), true));

    let response = app.oneshot(post_search("/v1/search", &trip_form())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

    let request = stub.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(request.user_age, 30);
    assert_eq!(request.user_location, "Новосибирск");
    assert_eq!(
        request.user_query,
        "Найти рейсы из Новосибирск в Санкт-Петербург на 2025-04-07 для 2 пассажиров с багажом"
    );

    let body = read_json(response).await;
    assert_eq!(body["fallback"], false);
    assert_eq!(body["results"]["state"], "offers");
    assert_eq!(body["results"]["header"]["passengers_label"], "2 пассажира");
    let cards = body["results"]["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 2);
    // default sort is by price
    assert_eq!(cards[0]["flight_number"], "S7 101");
    assert_eq!(cards[0]["connections"][0], "Пересадка в Москва (SVO), 1ч 00м");
}

#[tokio::test]
async fn test_stored_search_can_be_refiltered() {
    let stub = StubSearch::answering(upstream_offers());
    let state = state_with(stub.clone(), true);

    let response = app(state.clone()).oneshot(post_search("/v1/search", &trip_form())).await.unwrap();
    let body = read_json(response).await;
    let id = body["search_id"].as_str().unwrap().to_string();

    let response = app(state.clone())
        .oneshot(get(&format!("/v1/searches/{}?filter=direct&sort=departure", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["results"]["filter"], "direct");
    let cards = body["results"]["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["flight_number"], "S7 100");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_filter_result_is_no_results_state() {
    let body = json!({ "results": [
        { "id": 1, "departureTime": "10:00", "duration": "2ч 00м", "direct": true, "price": 5000 }
    ]});
    let app = app(state_with(StubSearch::answering(body), true));

    let response = app
        .oneshot(post_search("/v1/search?filter=connections", &trip_form()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["results"]["state"], "no_results");
    assert_eq!(body["results"]["title"], "Рейсы не найдены");
}

#[tokio::test]
async fn test_absent_results_fall_back_to_examples() {
    let app = app(state_with(StubSearch::answering(json!({ "status": "ok" })), true));

    let response = app.oneshot(post_search("/v1/search", &trip_form())).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["fallback"], true);
    let cards = body["results"]["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 4);
    assert_eq!(cards[0]["flight_number"], "S7 2066");
}

#[tokio::test]
async fn test_empty_results_are_not_replaced() {
    let app = app(state_with(StubSearch::answering(json!({ "results": [] })), true));

    let response = app.oneshot(post_search("/v1/search", &trip_form())).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["fallback"], false);
    assert_eq!(body["results"]["state"], "no_results");
}

#[tokio::test]
async fn test_fallback_disabled_shows_no_results() {
    let app = app(state_with(StubSearch::answering(json!({})), false));

    let response = app.oneshot(post_search("/v1/search", &trip_form())).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["fallback"], false);
    assert_eq!(body["results"]["state"], "no_results");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let stub = StubSearch::failing();
    let app = app(state_with(stub.clone(), true));

    let response = app.oneshot(post_search("/v1/search", &trip_form())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Search service unavailable");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_passengers_sent_as_text() {
    let stub = StubSearch::answering(upstream_offers());
    let app = app(state_with(stub.clone(), true));

    let mut form = trip_form();
    form["passengers"] = json!("3");
    let response = app.oneshot(post_search("/v1/search", &form)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["results"]["header"]["passengers_label"], "3 пассажира");
    let request = stub.last_request.lock().unwrap().clone().unwrap();
    assert!(request.user_query.ends_with("для 3 пассажиров с багажом"));
}

#[tokio::test]
async fn test_float_prices_are_not_replaced_by_examples() {
    let body = json!({ "results": [
        { "id": 1, "departureTime": "10:00", "duration": "2ч 00м", "direct": true, "price": 11499.0 }
    ]});
    let app = app(state_with(StubSearch::answering(body), true));

    let response = app.oneshot(post_search("/v1/search", &trip_form())).await.unwrap();
    let body = read_json(response).await;
    assert_eq!(body["fallback"], false);
    let cards = body["results"]["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0]["price_label"], "11\u{a0}499 ₽");
}

#[tokio::test]
async fn test_session_store_failure_is_internal_error() {
    let stub = StubSearch::answering(upstream_offers());
    let state = AppState {
        search: stub,
        sessions: Arc::new(BrokenSessions),
        settings: SearchSettings { user_age: 30, fallback_to_examples: true },
    };

    let response = app(state.clone()).oneshot(post_search("/v1/search", &trip_form())).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["error"], "Internal Server Error");

    let response = app(state)
        .oneshot(get("/v1/searches/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unknown_search_is_not_found() {
    let app = app(state_with(StubSearch::answering(upstream_offers()), true));
    let response = app
        .oneshot(get("/v1/searches/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_sort_key_is_bad_request() {
    let stub = StubSearch::answering(upstream_offers());
    let app = app(state_with(stub.clone(), true));
    let response = app.oneshot(post_search("/v1/search?sort=rating", &trip_form())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_examples_endpoint_sorted_by_duration() {
    let app = app(state_with(StubSearch::failing(), true));
    let response = app.oneshot(get("/v1/examples?sort=duration")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    let durations: Vec<&str> = body["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["duration"].as_str().unwrap())
        .collect();
    assert_eq!(durations, vec!["4ч 35м", "4ч 40м", "6ч 50м", "8ч 15м"]);
}

#[tokio::test]
async fn test_health() {
    let app = app(state_with(StubSearch::failing(), true));
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
