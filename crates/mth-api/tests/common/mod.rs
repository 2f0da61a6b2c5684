use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use mth_api::{
    ApiState, ControlledClock, config::Environment, middleware::ReviewThrottle, router,
};
use mth_db::{
    MemoryStore, SrsStore,
    models::{Card, NewCard, NewDeck},
};
use mth_srs::{SessionLimits, SrsParams};
use serde::Deserialize;
use tower::ServiceExt;

/// Throttle loose enough that functional tests never hit it
pub const NO_THROTTLE: ReviewThrottle = ReviewThrottle {
    per_second: 1000,
    burst: 1000,
};

/// Fixed start time of every test clock
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 7, 9, 0, 0).unwrap()
}

/// In-memory application with a controlled clock
pub struct TestApp {
    pub store: MemoryStore,
    pub clock: ControlledClock,
    pub client: TestClient,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_throttle(NO_THROTTLE)
    }

    pub fn with_throttle(throttle: ReviewThrottle) -> Self {
        let params = SrsParams::default();
        let store = MemoryStore::new(params);
        let clock = ControlledClock::new(t0());
        let state = ApiState::with_clock(
            store.clone(),
            params,
            SessionLimits::default(),
            Environment::Development,
            Arc::new(clock.clone()),
        );

        let app = router::router(throttle).with_state(state);

        Self {
            store,
            clock,
            client: TestClient::new(app),
        }
    }

    pub async fn create_deck(&self, name: &str) -> i64 {
        self.store
            .create_deck(
                NewDeck {
                    user_id: 1,
                    name: name.to_string(),
                    description: None,
                },
                self.clock_now(),
            )
            .await
            .expect("Failed to create deck")
            .id
    }

    pub async fn create_card(&self, deck_id: i64, front: &str) -> Card {
        self.store
            .create_card(
                NewCard {
                    deck_id,
                    front: front.to_string(),
                    back: format!("back of {front}"),
                    example: None,
                    notes: None,
                },
                self.clock_now(),
            )
            .await
            .expect("Failed to create card")
    }

    fn clock_now(&self) -> DateTime<Utc> {
        use mth_api::Clock;
        self.clock.now()
    }
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Send a request and get the response
    pub async fn request(&self, mut request: Request<Body>) -> TestResponse {
        use axum::extract::ConnectInfo;
        use std::net::{IpAddr, Ipv4Addr, SocketAddr};

        let test_addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080);
        request.extensions_mut().insert(ConnectInfo(test_addr));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    /// Send a GET request
    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .header("x-forwarded-for", "127.0.0.1")
            .body(Body::empty())
            .expect("Failed to build request");

        self.request(request).await
    }

    /// Send a POST request with JSON body
    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        let json_body = serde_json::to_string(body).expect("Failed to serialize body");

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-forwarded-for", "127.0.0.1")
            .body(Body::from(json_body))
            .expect("Failed to build request");

        self.request(request).await
    }
}

/// Test response wrapper
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    #[allow(dead_code)]
    pub headers: axum::http::HeaderMap,
}

impl TestResponse {
    /// Get response body as string
    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("Response body is not valid UTF-8")
    }

    /// Parse response body as JSON
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Assert status code
    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
    }
}
