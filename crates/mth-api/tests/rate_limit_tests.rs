use crate::common::TestApp;
use axum::http::StatusCode;
use mth_api::middleware::ReviewThrottle;
use serde_json::json;

#[tokio::test]
async fn test_review_submission_is_throttled() {
    let app = TestApp::with_throttle(ReviewThrottle {
        per_second: 1,
        burst: 2,
    });
    let deck_id = app.create_deck("Throttled").await;
    let card = app.create_card(deck_id, "rapid").await;
    let uri = format!("/cards/{}/review", card.id);

    let mut statuses = Vec::new();
    for _ in 0..5 {
        let response = app
            .client
            .post_json(&uri, &json!({ "user_id": 1, "quality": 0 }))
            .await;
        statuses.push(response.status);
    }

    let limited = statuses
        .iter()
        .filter(|&&status| status == StatusCode::TOO_MANY_REQUESTS)
        .count();
    let succeeded = statuses
        .iter()
        .filter(|&&status| status == StatusCode::OK)
        .count();

    assert!(limited > 0, "Reviews past the burst should be throttled: {statuses:?}");
    assert_eq!(succeeded + limited, statuses.len());
    assert!(succeeded >= 2, "The burst should be served: {statuses:?}");
}

#[tokio::test]
async fn test_reads_are_not_throttled() {
    let app = TestApp::with_throttle(ReviewThrottle {
        per_second: 1,
        burst: 1,
    });
    let deck_id = app.create_deck("Reads").await;

    for _ in 0..5 {
        app.client
            .get(&format!("/decks/{deck_id}/stats"))
            .await
            .assert_status(StatusCode::OK);
    }
}
