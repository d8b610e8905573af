mod common;

use serde_json::json;

use teamflow::client::ApiError;
use teamflow::forms::auth::{LoginForm, OAuthForm};
use teamflow::forms::authorities::AuthorityForm;
use teamflow::forms::filter_builder::FilterBuilderForm;
use teamflow::forms::list::ListQueryForm;
use teamflow::services::ServiceError;
use teamflow::services::{auth, authorities, tickets, users};
use teamflow::{SERVICE_ACCESS_AUTHORITY, SERVICE_ADMIN_AUTHORITY};

use common::{RecordingSink, SECRET, StubBackend, TestSession, user};

fn one_ticket_page() -> serde_json::Value {
    json!({
        "content": [{"id": 11, "requestTitle": "VPN is down", "requestUserEmail": "agent@example.com"}],
        "totalElements": 1,
        "totalPages": 1
    })
}

#[actix_web::test]
async fn list_search_becomes_like_filter_on_compound_field() {
    let backend = StubBackend::start(|_| {
        common::json(200, json!({"content": [], "totalElements": 0, "totalPages": 0}))
    })
    .await;
    let session = TestSession::new("token");
    let sink = RecordingSink::default();
    let form = ListQueryForm {
        q: Some("smith".to_string()),
        sort: Some("firstName,desc".to_string()),
        page: Some(2),
    };

    let data = users::list_users(
        &backend.client(),
        &user(&[SERVICE_ADMIN_AUTHORITY]),
        &session,
        &sink,
        form,
    )
    .await
    .unwrap();

    assert_eq!(data.search_query.as_deref(), Some("smith"));
    assert_eq!(data.sort, "firstName,desc");
    assert!(data.items.items.is_empty());

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/api/users/search");
    assert_eq!(request.query, "page=2&size=10&sort=firstName%2Cdesc");
    assert_eq!(
        request.json(),
        json!({"filters": [{"field": "email,firstName,lastName", "operator": "lk", "value": "%smith%"}]})
    );
    assert!(sink.errors().is_empty());
    backend.stop().await;
}

#[actix_web::test]
async fn list_requires_admin_authority() {
    let backend = StubBackend::start(|_| common::json(200, json!({}))).await;
    let session = TestSession::new("token");

    let result = users::list_users(
        &backend.client(),
        &user(&[SERVICE_ACCESS_AUTHORITY]),
        &session,
        &RecordingSink::default(),
        ListQueryForm::default(),
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Unauthorized)));
    assert!(backend.requests().is_empty());
    backend.stop().await;
}

#[actix_web::test]
async fn my_tickets_are_narrowed_to_the_requester() {
    let backend = StubBackend::start(|_| common::json(200, one_ticket_page())).await;
    let session = TestSession::new("token");
    let sink = RecordingSink::default();
    let form = FilterBuilderForm {
        field: vec!["requestTitle".to_string()],
        operator: vec!["lk".to_string()],
        value: vec!["vpn".to_string()],
        ..FilterBuilderForm::default()
    };

    let data = tickets::search_my_tickets(
        &backend.client(),
        &user(&[SERVICE_ACCESS_AUTHORITY]),
        &session,
        &sink,
        form,
    )
    .await
    .unwrap();

    assert!(data.searched);
    assert_eq!(data.build_error, None);
    assert_eq!(data.tickets.items.len(), 1);
    assert_eq!(data.tickets.next, None);

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/api/tickets/search");
    assert_eq!(request.query, "page=1&size=10&sort=createdAt%2Cdesc");
    assert_eq!(
        request.json(),
        json!({
            "filters": [{"field": "requestUserEmail", "operator": "eq", "value": "agent@example.com"}],
            "groups": [{
                "logicalOperator": "AND",
                "filters": [{"field": "requestTitle", "operator": "lk", "value": "%vpn%"}]
            }]
        })
    );
    backend.stop().await;
}

#[actix_web::test]
async fn invalid_builder_sends_nothing() {
    let backend = StubBackend::start(|_| common::json(200, one_ticket_page())).await;
    let session = TestSession::new("token");
    let form = FilterBuilderForm {
        field: vec!["id".to_string()],
        operator: vec!["gt".to_string()],
        value: vec!["seven".to_string()],
        ..FilterBuilderForm::default()
    };

    let data = tickets::search_my_tickets(
        &backend.client(),
        &user(&[SERVICE_ACCESS_AUTHORITY]),
        &session,
        &RecordingSink::default(),
        form,
    )
    .await
    .unwrap();

    assert!(!data.searched);
    assert!(data.build_error.unwrap().contains("Filter #1"));
    assert_eq!(data.rows.len(), 1);
    assert!(backend.requests().is_empty());
    backend.stop().await;
}

#[actix_web::test]
async fn editing_the_builder_sends_nothing() {
    let backend = StubBackend::start(|_| common::json(200, one_ticket_page())).await;
    let session = TestSession::new("token");
    let form = FilterBuilderForm {
        field: vec!["isCompleted".to_string()],
        operator: vec!["lk".to_string()],
        value: vec!["printer".to_string()],
        changed: Some(0),
        ..FilterBuilderForm::default()
    };

    let data = tickets::search_my_tickets(
        &backend.client(),
        &user(&[SERVICE_ACCESS_AUTHORITY]),
        &session,
        &RecordingSink::default(),
        form,
    )
    .await
    .unwrap();

    assert!(!data.searched);
    assert_eq!(data.rows[0].operator, Some("eq"));
    assert_eq!(data.rows[0].value, "false");
    assert!(backend.requests().is_empty());
    backend.stop().await;
}

#[actix_web::test]
async fn missing_ticket_is_not_found_without_alert() {
    let backend = StubBackend::start(|_| common::json(404, json!({"message": "no such ticket"}))).await;
    let session = TestSession::new("token");
    let sink = RecordingSink::default();

    let result = tickets::load_ticket(
        &backend.client(),
        &user(&[SERVICE_ACCESS_AUTHORITY]),
        &session,
        &sink,
        99,
    )
    .await;

    assert!(matches!(result, Err(ServiceError::NotFound)));
    assert!(sink.errors().is_empty());
    assert_eq!(backend.requests()[0].path, "/api/tickets/99");
    backend.stop().await;
}

#[actix_web::test]
async fn ticket_page_resolves_available_transitions() {
    let backend = StubBackend::start(|request| {
        if request.path == "/api/tickets/5" {
            common::json(
                200,
                json!({"id": 5, "requestTitle": "Laptop", "workflowId": 2, "currentStateId": 1}),
            )
        } else {
            common::json(
                200,
                json!({
                    "id": 2,
                    "name": "Support",
                    "states": [
                        {"id": 1, "stateName": "Open", "isInitial": true},
                        {"id": 2, "stateName": "Closed", "isFinal": true}
                    ],
                    "transitions": [
                        {"id": 1, "eventName": "close", "sourceStateId": 1, "targetStateId": 2}
                    ]
                }),
            )
        }
    })
    .await;
    let session = TestSession::new("token");

    let data = tickets::load_ticket(
        &backend.client(),
        &user(&[SERVICE_ACCESS_AUTHORITY]),
        &session,
        &RecordingSink::default(),
        5,
    )
    .await
    .unwrap();

    assert_eq!(data.transitions.len(), 1);
    assert_eq!(data.transitions[0].target_state_name, "Closed");
    let paths: Vec<String> = backend.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/tickets/5", "/api/workflows/2"]);
    backend.stop().await;
}

#[actix_web::test]
async fn expired_session_during_search_signs_out() {
    let backend = StubBackend::start(|_| common::json(401, json!({}))).await;
    let session = TestSession::new("token");
    let sink = RecordingSink::default();

    let result = tickets::list_tickets(
        &backend.client(),
        &user(&[SERVICE_ADMIN_AUTHORITY]),
        &session,
        &sink,
        ListQueryForm::default(),
    )
    .await;

    let err = result.unwrap_err();
    assert!(err.is_signed_out());
    assert!(session.signed_out());
    assert!(sink.errors().is_empty());
    backend.stop().await;
}

#[actix_web::test]
async fn authority_changes_use_the_right_methods() {
    let backend = StubBackend::start(|request| {
        if request.method == "DELETE" {
            actix_web::HttpResponse::NoContent().finish()
        } else {
            common::json(200, json!({"id": 3, "name": "Auditors"}))
        }
    })
    .await;
    let api = backend.client();
    let admin = user(&[SERVICE_ADMIN_AUTHORITY]);
    let session = TestSession::new("token");
    let sink = RecordingSink::default();
    let form = || AuthorityForm {
        name: "Auditors".to_string(),
        description: "Read-only access".to_string(),
    };

    authorities::create_authority(&api, &admin, &session, &sink, form())
        .await
        .unwrap();
    authorities::update_authority(&api, &admin, &session, &sink, 3, form())
        .await
        .unwrap();
    authorities::delete_authority(&api, &admin, &session, &sink, 3)
        .await
        .unwrap();

    let calls: Vec<(String, String)> = backend
        .requests()
        .into_iter()
        .map(|r| (r.method, r.path))
        .collect();
    assert_eq!(
        calls,
        vec![
            ("POST".to_string(), "/api/authorities".to_string()),
            ("PUT".to_string(), "/api/authorities/3".to_string()),
            ("DELETE".to_string(), "/api/authorities/3".to_string()),
        ]
    );
    assert_eq!(
        backend.requests()[0].json(),
        json!({"name": "Auditors", "description": "Read-only access"})
    );
    assert!(sink.errors().is_empty());
    backend.stop().await;
}

#[actix_web::test]
async fn regular_users_cannot_manage_authorities() {
    let backend = StubBackend::start(|_| common::json(200, json!({}))).await;

    let result = authorities::delete_authority(
        &backend.client(),
        &user(&[SERVICE_ACCESS_AUTHORITY]),
        &TestSession::new("token"),
        &RecordingSink::default(),
        3,
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Unauthorized)));
    assert!(backend.requests().is_empty());
    backend.stop().await;
}

#[actix_web::test]
async fn sign_in_accepts_a_readable_token() {
    let token = user(&[SERVICE_ACCESS_AUTHORITY]).to_jwt(SECRET).unwrap();
    let issued = token.clone();
    let backend =
        StubBackend::start(move |_| common::json(200, json!({"accessToken": issued.as_str()}))).await;
    let sink = RecordingSink::default();

    let signed_in = auth::sign_in(
        &backend.client(),
        SECRET,
        &sink,
        LoginForm {
            email: "Agent@Example.com".to_string(),
            password: "hunter2".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(signed_in.token, token);
    assert_eq!(signed_in.user.email, "agent@example.com");

    let request = &backend.requests()[0];
    assert_eq!(request.path, "/api/auth/login");
    assert_eq!(request.authorization, None);
    assert_eq!(request.json()["email"], "agent@example.com");
    backend.stop().await;
}

#[actix_web::test]
async fn sign_in_rejects_a_foreign_token() {
    let token = user(&[]).to_jwt("some-other-secret").unwrap();
    let backend = StubBackend::start(move |_| common::json(200, json!({"token": token.as_str()}))).await;
    let sink = RecordingSink::default();

    let result = auth::sign_in(
        &backend.client(),
        SECRET,
        &sink,
        LoginForm {
            email: "agent@example.com".to_string(),
            password: "hunter2".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Api(ApiError::Decode(_)))));
    assert_eq!(sink.errors().len(), 1);
    backend.stop().await;
}

#[actix_web::test]
async fn unknown_provider_is_refused_locally() {
    let backend = StubBackend::start(|_| common::json(200, json!({}))).await;

    let result = auth::exchange_provider_token(
        &backend.client(),
        SECRET,
        &["google".to_string()],
        &RecordingSink::default(),
        OAuthForm {
            provider: "github".to_string(),
            access_token: "provider-token".to_string(),
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Form(_))));
    assert!(backend.requests().is_empty());
    backend.stop().await;
}
