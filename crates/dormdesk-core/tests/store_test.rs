#![allow(clippy::unwrap_used)]
// Integration tests for the stores, driven through the `Client` facade
// against a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dormdesk_api::{
    ACCESS_TOKEN_KEY, ApplicationCreateRequest, ApplicationDecideRequest, ApplicationListFilters,
    ApplicationStatus, BookingCreateRequest, BookingStatus, DocumentUpload, MemoryStorage,
    MyBookingsFilters, SessionIds, Storage,
};
use dormdesk_core::{Client, ClientConfig, RouteName};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, Client, Arc<MemoryStorage>) {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new().with_entry(ACCESS_TOKEN_KEY, "tok"));
    let config = ClientConfig {
        api_url: server.uri(),
        timeout: Duration::from_secs(5),
    };
    let client = Client::builder(config, storage.clone())
        .session_ids(Arc::new(SessionIds::fixed("trace-1", "corr-1")))
        .build()
        .unwrap();
    (server, client, storage)
}

fn application_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "user_id": "u1",
        "is_minor": true,
        "leave_time": "2025-03-01T10:00:00",
        "return_time": "2025-03-03T18:00:00",
        "reason": "Family visit",
        "contact_phone": "+79990000000",
        "status": status,
        "decided_by": null,
        "decided_at": null,
        "reject_reason": null,
        "created_at": "2025-02-20T09:00:00",
        "updated_at": "2025-02-20T09:00:00"
    })
}

fn document_json(id: &str, application_id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "application_id": application_id,
        "document_type": "voice_message",
        "file_url": format!("https://files/{id}.ogg"),
        "uploaded_by": "u1",
        "created_at": "2025-02-20T09:05:00"
    })
}

fn booking_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "student_id": "s1",
        "coworking_id": "C1",
        "taken_from": "2025-03-01T10:00:00",
        "returned_back": "2025-03-01T12:00:00",
        "status": status
    })
}

fn booking_detail_json(id: &str, status: &str) -> serde_json::Value {
    let mut raw = booking_json(id, status);
    raw["student"] = json!({
        "user_id": "s1",
        "last_name": "Petrova",
        "first_name": "Anna",
        "patronymic": null,
        "building": 1,
        "entrance": 2,
        "room": "412"
    });
    raw["coworking"] = json!({
        "id": "C1", "name": "Room A", "building": 1, "entrance": 2,
        "number": 101, "available": false
    });
    raw
}

// ── Applications ────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_list_uses_store_cursor_and_adopts_response() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [application_json("a1", "pending"), application_json("a2", "approved")],
            "total": 45, "page": 1, "size": 20, "pages": 3
        })))
        .mount(&server)
        .await;

    let store = client.applications();
    let page = store
        .fetch_list(ApplicationListFilters {
            status: Some(ApplicationStatus::Pending),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("page=1&size=20&status=pending"));

    let state = store.state();
    assert_eq!(state.total, 45);
    assert_eq!(state.pages, 3);
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.pending_count(), 1);
    assert!(!state.loading);
    assert_eq!(state.error, None);
}

#[tokio::test]
async fn test_create_prepends_to_items() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [application_json("a1", "approved")],
            "total": 1, "page": 1, "size": 20, "pages": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/applications"))
        .respond_with(ResponseTemplate::new(201).set_body_json(application_json("a9", "pending")))
        .mount(&server)
        .await;

    let store = client.applications();
    store.fetch_list(ApplicationListFilters::default()).await.unwrap();
    let created = store
        .create(&ApplicationCreateRequest {
            leave_time: "2025-03-01T10:00:00".into(),
            return_time: "2025-03-03T18:00:00".into(),
            reason: "Family visit".into(),
            contact_phone: "+79990000000".into(),
        })
        .await
        .unwrap();

    assert_eq!(created.id, "a9");
    let ids: Vec<_> = store.state().items.into_iter().map(|a| a.id).collect();
    assert_eq!(ids, vec!["a9".to_owned(), "a1".to_owned()]);
}

#[tokio::test]
async fn test_decide_patches_list_and_merges_detail() {
    let (server, client, _) = setup().await;

    let mut detail = application_json("a1", "pending");
    detail["documents"] = json!([document_json("d1", "a1")]);
    detail["user_name"] = json!("Ivanov Ivan");

    Mock::given(method("GET"))
        .and(path("/api/v1/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [application_json("a1", "pending"), application_json("a2", "pending")],
            "total": 2, "page": 1, "size": 20, "pages": 1
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail))
        .mount(&server)
        .await;

    let mut decided = application_json("a1", "rejected");
    decided["reject_reason"] = json!("Exams");
    decided["decided_by"] = json!("staff-1");
    Mock::given(method("PATCH"))
        .and(path("/api/v1/applications/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(decided))
        .mount(&server)
        .await;

    let store = client.applications();
    store.fetch_list(ApplicationListFilters::default()).await.unwrap();
    store.fetch_one("a1").await.unwrap();
    store
        .decide("a1", &ApplicationDecideRequest::reject("Exams"))
        .await
        .unwrap();

    let state = store.state();
    assert_eq!(state.items[0].status, ApplicationStatus::Rejected);
    assert_eq!(state.items[0].reject_reason.as_deref(), Some("Exams"));
    assert_eq!(state.items[1].status, ApplicationStatus::Pending);

    let detail = state.current_detail.as_ref().unwrap();
    assert_eq!(detail.application.status, ApplicationStatus::Rejected);
    assert_eq!(detail.application.decided_by.as_deref(), Some("staff-1"));
    assert_eq!(detail.application.user_name.as_deref(), Some("Ivanov Ivan"));
    assert_eq!(detail.documents.len(), 1);
    assert_eq!(state.pending_count(), 1);
}

#[tokio::test]
async fn test_upload_appends_to_matching_detail_only() {
    let (server, client, _) = setup().await;

    let mut detail = application_json("a1", "pending");
    detail["documents"] = json!([]);
    Mock::given(method("GET"))
        .and(path("/api/v1/applications/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/applications/a1/documents"))
        .respond_with(ResponseTemplate::new(201).set_body_json(document_json("d1", "a1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/applications/a2/documents"))
        .respond_with(ResponseTemplate::new(201).set_body_json(document_json("d2", "a2")))
        .mount(&server)
        .await;

    let store = client.applications();
    store.fetch_one("a1").await.unwrap();

    store
        .upload_document("a1", "voice_message", DocumentUpload::new("v.ogg", vec![1, 2, 3]))
        .await
        .unwrap();
    store
        .upload_document("a2", "voice_message", DocumentUpload::new("w.ogg", vec![4]))
        .await
        .unwrap();

    let docs = store.state().current_detail.unwrap().documents;
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "d1");
}

#[tokio::test]
async fn test_application_errors_are_localized() {
    let (server, client, _) = setup().await;

    Mock::given(method("PATCH"))
        .and(path("/api/v1/applications/a1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "code": "APP_ALREADY_DECIDED", "message": "Already decided" }
        })))
        .mount(&server)
        .await;

    let store = client.applications();
    let err = store
        .decide("a1", &ApplicationDecideRequest::approve())
        .await
        .unwrap_err();

    assert_eq!(err.message, "Решение по заявлению уже принято");
    assert_eq!(err.code(), Some("APP_ALREADY_DECIDED"));
    assert_eq!(store.state().error.as_deref(), Some("Решение по заявлению уже принято"));
    assert!(!store.state().loading);
}

// ── Bookings ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_booking_conflict_sets_localized_error() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/bookings"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {
                "code": "STUDENT_ALREADY_HAS_ACTIVE_BOOKING",
                "message": "Student already has an active booking"
            }
        })))
        .mount(&server)
        .await;

    let store = client.coworkings();
    let err = store
        .create_booking(&BookingCreateRequest {
            coworking_id: "C1".into(),
            taken_from: "2025-03-01T10:00:00".into(),
            returned_back: "2025-03-01T12:00:00".into(),
        })
        .await
        .unwrap_err();

    let expected = "У вас уже есть активное или ожидающее бронирование";
    assert_eq!(err.message, expected);
    assert_eq!(err.status(), Some(409));

    let state = store.state();
    assert_eq!(state.error.as_deref(), Some(expected));
    assert!(!state.loading);
}

#[tokio::test]
async fn test_my_bookings_fill_offset_cursor() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/my"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [booking_detail_json("b1", "created")],
            "total": 21, "limit": 10, "offset": 10
        })))
        .mount(&server)
        .await;

    let store = client.coworkings();
    store
        .fetch_my_bookings(&MyBookingsFilters {
            limit: Some(10),
            offset: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();

    let state = store.state();
    assert_eq!(state.bookings.len(), 1);
    assert_eq!(state.total, 21);
    assert_eq!(state.limit, 10);
    assert_eq!(state.offset, 10);
}

#[tokio::test]
async fn test_transition_merges_into_detail_and_lists() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/b1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_detail_json("b1", "created")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/active"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([booking_detail_json("b1", "created")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/v1/bookings/b1/confirm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_json("b1", "active")))
        .expect(1)
        .mount(&server)
        .await;

    let store = client.coworkings();
    store.fetch_booking("b1").await.unwrap();
    store.fetch_active_bookings().await.unwrap();
    let updated = store.confirm_booking("b1").await.unwrap();
    assert_eq!(updated.status, BookingStatus::Active);

    let state = store.state();
    let current = state.current_booking.unwrap();
    assert_eq!(current.booking.status, BookingStatus::Active);
    assert_eq!(current.student.unwrap().last_name, "Petrova");
    assert_eq!(current.coworking.unwrap().name, "Room A");
    assert_eq!(state.active_bookings[0].booking.status, BookingStatus::Active);
    assert!(state.active_bookings[0].coworking.is_some());
}

// ── Concurrency ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_stale_fetch_does_not_overwrite_newer_one() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/b-slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(booking_detail_json("b-slow", "created"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/b-fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_detail_json("b-fast", "active")))
        .mount(&server)
        .await;

    let store = client.coworkings();
    let (slow, fast) = tokio::join!(store.fetch_booking("b-slow"), store.fetch_booking("b-fast"));

    // Both callers get their own data back.
    assert_eq!(slow.unwrap().id(), "b-slow");
    assert_eq!(fast.unwrap().id(), "b-fast");

    // The later-issued fetch owns the slot.
    let state = store.state();
    assert_eq!(state.current_booking.unwrap().id(), "b-fast");
    assert!(!state.loading);
}

#[tokio::test]
async fn test_stale_fetch_failure_leaves_newer_state_alone() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/b-slow"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({
                    "error": { "code": "BOOKING_NOT_FOUND", "message": "not found" }
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/b-fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(booking_detail_json("b-fast", "active")))
        .mount(&server)
        .await;

    let store = client.coworkings();
    let (slow, fast) = tokio::join!(store.fetch_booking("b-slow"), store.fetch_booking("b-fast"));

    // The superseded caller still sees its own failure.
    assert_eq!(slow.unwrap_err().message, "Бронирование не найдено");
    assert_eq!(fast.unwrap().id(), "b-fast");

    let state = store.state();
    assert_eq!(state.current_booking.unwrap().id(), "b-fast");
    assert_eq!(state.error, None);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_dropped_action_releases_loading() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/active"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let store = client.coworkings();
    let mut updates = store.subscribe();

    let result =
        tokio::time::timeout(Duration::from_millis(100), store.fetch_active_bookings()).await;
    assert!(result.is_err(), "fetch should have been cut off");

    assert!(!store.state().loading);
    assert!(!updates.latest().loading);
    assert!(updates.changed().await.is_some());
}

#[tokio::test]
async fn test_state_stream_follows_fetch() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/coworkings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{
                    "id": "C1", "name": "Room A", "building": 1, "entrance": 2,
                    "number": 101, "available": true
                }]))
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let store = client.coworkings();
    let mut stream = store.subscribe().into_stream();

    let initial = stream.next().await.unwrap();
    assert!(!initial.loading);
    assert!(initial.coworkings.is_empty());

    let filters = Default::default();
    let (fetched, (loading, settled)) = tokio::join!(
        store.fetch_coworkings(&filters),
        async {
            let loading = stream.next().await.unwrap();
            let settled = stream.next().await.unwrap();
            (loading, settled)
        }
    );
    assert_eq!(fetched.unwrap().len(), 1);

    assert!(loading.loading);
    assert!(loading.coworkings.is_empty());

    assert!(!settled.loading);
    assert_eq!(settled.coworkings[0].id, "C1");
}

#[tokio::test]
async fn test_reset_discards_in_flight_fetch() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/bookings/my"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "items": [booking_detail_json("b1", "created")],
                    "total": 1, "limit": 20, "offset": 0
                }))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let store = client.coworkings();
    let filters = MyBookingsFilters::default();
    let fetch = store.fetch_my_bookings(&filters);
    let reset = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        store.reset();
    };
    let (page, ()) = tokio::join!(fetch, reset);

    assert_eq!(page.unwrap().items.len(), 1);
    let state = store.state();
    assert!(state.bookings.is_empty());
    assert_eq!(state.total, 0);
    assert!(!state.loading);
}

// ── Session ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_clears_token_and_routes_to_login() {
    let (server, client, storage) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/coworkings"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    client.router().navigate("/coworkings").unwrap();
    let err = client
        .coworkings()
        .fetch_coworkings(&Default::default())
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.message, "Необходимо авторизоваться");
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
    assert!(!client.is_authenticated());
    assert_eq!(
        client.router().current().map(|m| m.name),
        Some(RouteName::Login)
    );
}

#[tokio::test]
async fn test_logout_resets_stores() {
    let (server, client, storage) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/coworkings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "C1", "name": "Room A", "building": 1, "entrance": 2,
            "number": 101, "available": true
        }])))
        .mount(&server)
        .await;

    client
        .coworkings()
        .fetch_coworkings(&Default::default())
        .await
        .unwrap();
    assert_eq!(client.coworkings().state().coworkings.len(), 1);

    client.logout().unwrap();
    assert!(client.coworkings().state().coworkings.is_empty());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(client.router().current().map(|m| m.name), Some(RouteName::Login));
}
