//! HTTP-level tests for the backend client against a mock server.

use parlay_client::{
    ApiClient, ApiClientConfig, ApiError, BearerAuth, EventFilters, NewRecommendation,
    NewTipsterTier, RandomEventSupplier, RecommendationUpdate, TipsterTierUpdate,
};
use parlay_core::{BettingEvent, EventSelectionManager, SelectionError, WorkingSet};
use rust_decimal_macros::dec;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(ApiClientConfig::default().with_base_url(server.uri())).unwrap()
}

fn authed_client(server: &MockServer) -> ApiClient {
    let config = ApiClientConfig::default()
        .with_base_url(server.uri())
        .with_auth(BearerAuth::new("test-token").unwrap());
    ApiClient::new(config).unwrap()
}

fn event_json(id: i64, odds: f64) -> serde_json::Value {
    json!({
        "id": id,
        "odds": odds,
        "event": format!("Market {id}"),
        "game": {
            "id": id * 10,
            "home_team": "Home",
            "away_team": "Away",
            "datetime": "2025-10-13T18:00:00"
        }
    })
}

// ==================== Bet Event Tests ====================

#[tokio::test]
async fn test_random_events_sends_filters_and_exclusions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bet-events/random"))
        .and(query_param("limit", "2"))
        .and(query_param("league_id", "7"))
        .and(query_param("min_odds", "1.5"))
        .and(query_param("exclude_ids", "1,2,3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            event_json(10, 1.8),
            event_json(11, 2.25)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let filters = EventFilters {
        league_id: Some(7),
        min_odds: Some(dec!(1.5)),
        ..Default::default()
    };
    let events = client(&server)
        .random_events(2, &filters, &[1, 2, 3])
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[1].odds, dec!(2.25));
    assert!(events[0].starts_at().is_some());
}

#[tokio::test]
async fn test_random_events_omits_unset_params() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bet-events/random"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    client(&server)
        .random_events(4, &EventFilters::default(), &[])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("limit=4"));
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_bet_event_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bet-events/99"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Bet event not found"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).bet_event(99).await.unwrap_err();
    match err {
        ApiError::NotFound(message) => assert_eq!(message, "Bet event not found"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sports/"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "17"))
        .mount(&server)
        .await;

    let err = client(&server).sports().await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimit { retry_after_secs: 17 }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_leagues_by_sport() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/leagues/"))
        .and(query_param("sport_id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 3, "sport_id": 1, "name": "Ekstraklasa", "country_code": "PL"}
        ])))
        .mount(&server)
        .await;

    let leagues = client(&server).leagues(Some(1)).await.unwrap();
    assert_eq!(leagues[0].name, "Ekstraklasa");
}

// ==================== Session Tests ====================

#[tokio::test]
async fn test_current_user_maps_subscription() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriptions/me"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 4,
            "email": "ann@example.com",
            "is_active": true,
            "is_admin": false,
            "is_expert": true,
            "created_at": "2025-01-01T00:00:00",
            "subscription": {
                "id": 1, "user_id": 4, "plan_id": 2, "status": "active",
                "current_period_start": "2025-01-01T00:00:00",
                "current_period_end": "2025-02-01T00:00:00",
                "plan": {
                    "id": 2, "name": "Premium", "price_monthly": 29.99, "price_yearly": 299.0,
                    "features": {"ai_predictions": true}, "is_active": true,
                    "sort_order": 1, "hierarchy_order": 2
                }
            }
        })))
        .mount(&server)
        .await;

    let session = authed_client(&server).current_user().await.unwrap().unwrap();
    assert!(session.is_expert);
    assert!(session.meets_hierarchy(2));
    assert!(!session.meets_hierarchy(3));
    assert!(session.has_feature("ai_predictions"));
}

#[tokio::test]
async fn test_current_user_sends_session_cookie() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriptions/me"))
        .and(header("cookie", "access_token=tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "email": "bo@example.com",
            "is_active": true,
            "is_admin": true,
            "is_expert": false,
            "created_at": "2025-01-01T00:00:00",
            "subscription": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(
        ApiClientConfig::default()
            .with_base_url(server.uri())
            .with_auth(BearerAuth::new("tok").unwrap()),
    )
    .unwrap();
    let session = client.current_user().await.unwrap().unwrap();
    assert!(session.is_admin);
}

#[tokio::test]
async fn test_current_user_rejected_token_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriptions/me"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Could not validate credentials"})),
        )
        .mount(&server)
        .await;

    assert!(authed_client(&server).current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn test_current_user_server_error_propagates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriptions/me"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = authed_client(&server).current_user().await.unwrap_err();
    assert!(err.is_transient());
}

// ==================== Coupon Tests ====================

#[tokio::test]
async fn test_create_coupon_posts_draft() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/coupons/"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(json!({"name": "Weekend", "bet_event_ids": [1, 4]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 8, "user_id": 4, "name": "Weekend",
            "created_at": "2025-10-10T12:00:00",
            "bet_events": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = EventSelectionManager::new(4).with_working_set(WorkingSet::new(vec![
        BettingEvent::new(1, dec!(2.0), "A"),
        BettingEvent::new(4, dec!(4.0), "D"),
    ]));
    let draft = manager.coupon_draft("  Weekend ").unwrap();

    let coupon = authed_client(&server).create_coupon(&draft).await.unwrap();
    assert_eq!(coupon.id, 8);
}

#[tokio::test]
async fn test_coupons_require_token() {
    let server = MockServer::start().await;

    let err = client(&server).my_coupons().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ==================== Tipster Tests ====================

#[tokio::test]
async fn test_follow_and_followed_ids() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tipsters/5/follow"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"detail": "Followed tipster"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tipsters/following/ids"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([5, 9])))
        .mount(&server)
        .await;

    let client = authed_client(&server);
    assert_eq!(client.follow(5).await.unwrap(), "Followed tipster");
    assert_eq!(client.followed_ids().await.unwrap(), vec![5, 9]);
}

#[tokio::test]
async fn test_invalid_tier_is_not_sent() {
    let server = MockServer::start().await;

    let err = authed_client(&server)
        .create_tier(NewTipsterTier::paid(1, "Gold", dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_tier_sends_only_set_fields() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/tipsters/me/tiers/2"))
        .and(header("cookie", "access_token=test-token"))
        .and(body_json(json!({"price_monthly": "12.5"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 2, "tipster_id": 1, "level": 1, "name": "Gold", "price_monthly": "12.5"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = TipsterTierUpdate {
        price_monthly: Some(dec!(12.5)),
        ..Default::default()
    };
    let tier = authed_client(&server).update_tier(2, &update).await.unwrap();
    assert_eq!(tier.price_monthly, Some(dec!(12.5)));
}

#[tokio::test]
async fn test_empty_tier_update_is_not_sent() {
    let server = MockServer::start().await;

    let err = authed_client(&server)
        .update_tier(2, &TipsterTierUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_recommendation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tipsters/me/recommendations"))
        .and(body_json(json!({"bet_event_id": 40, "stake": "2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "bet_event_id": 40, "tipster_id": 1, "stake": "2"
        })))
        .mount(&server)
        .await;

    let rec = authed_client(&server)
        .create_recommendation(&NewRecommendation::new(40).with_stake(dec!(2)))
        .await
        .unwrap();
    assert_eq!(rec.stake, Some(dec!(2)));
}

#[tokio::test]
async fn test_update_recommendation() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/tipsters/me/recommendations/3"))
        .and(body_json(json!({"tipster_tier_id": 2, "stake": "1.5"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "bet_event_id": 40, "tipster_id": 1, "tipster_tier_id": 2, "stake": "1.5"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let update = RecommendationUpdate {
        tipster_tier_id: Some(2),
        stake: Some(dec!(1.5)),
        ..Default::default()
    };
    let rec = authed_client(&server)
        .update_recommendation(3, &update)
        .await
        .unwrap();
    assert_eq!(rec.tipster_tier_id, Some(2));
}

#[tokio::test]
async fn test_delete_recommendation() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/tipsters/me/recommendations/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    authed_client(&server).delete_recommendation(3).await.unwrap();
}

// ==================== Supplier Tests ====================

#[tokio::test]
async fn test_supplier_drives_regenerate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bet-events/random"))
        .and(query_param("limit", "1"))
        .and(query_param("exclude_ids", "1,2,3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([event_json(4, 4.0)])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let supplier = RandomEventSupplier::new(&client);
    let mut manager = EventSelectionManager::new(2).with_working_set(WorkingSet::from_parts(
        vec![
            BettingEvent::new(1, dec!(2.0), "A"),
            BettingEvent::new(2, dec!(3.0), "B"),
            BettingEvent::new(3, dec!(1.5), "C"),
        ],
        [1],
    ));

    let outcome = manager.regenerate(2, &supplier).await.unwrap();
    assert_eq!(outcome.kept, 1);
    assert_eq!(outcome.received, 1);
    assert_eq!(manager.working_set().ids(), vec![1, 4]);
    assert_eq!(manager.summary().total_odds, dec!(8.0));
}

#[tokio::test]
async fn test_supplier_failure_leaves_working_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bet-events/random"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client(&server);
    let supplier = RandomEventSupplier::new(&client);
    let before = WorkingSet::new(vec![BettingEvent::new(1, dec!(2.0), "A")]);
    let mut manager = EventSelectionManager::new(3).with_working_set(before.clone());

    let err = manager.regenerate(3, &supplier).await.unwrap_err();
    assert!(matches!(err, SelectionError::Supplier(_)));
    assert_eq!(manager.working_set(), &before);
}
