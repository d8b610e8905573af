mod common;

use actix_web::body::to_bytes;
use actix_web::http::{StatusCode, header};
use actix_web_flash_messages::Level;
use serde_json::json;
use tera::{Context, Tera};

use teamflow::domain::pageable::SortKey;
use teamflow::dto::{FieldView, FilterRowView, ListPageData};
use teamflow::forms::filter_builder::{FieldCatalog, FilterBuilderForm};
use teamflow::pagination::Paginated;
use teamflow::routes::{alert_level_to_str, redirect, render_template};

fn tera() -> Tera {
    Tera::new("templates/**/*").unwrap()
}

#[test]
fn test_alert_level_to_str_mappings() {
    assert_eq!(alert_level_to_str(&Level::Error), "danger");
    assert_eq!(alert_level_to_str(&Level::Warning), "warning");
    assert_eq!(alert_level_to_str(&Level::Success), "success");
    assert_eq!(alert_level_to_str(&Level::Info), "info");
    assert_eq!(alert_level_to_str(&Level::Debug), "info");
}

#[test]
fn redirect_is_see_other() {
    let response = redirect("/tickets/mine");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/tickets/mine"
    );
}

#[actix_web::test]
async fn list_page_keeps_search_in_page_links() {
    let users = vec![
        json!({"id": 1, "email": "ann@example.com", "firstName": "Ann", "authorities": ["ticketing"]}),
        json!({"id": 2, "email": "bob@example.com", "authorities": []}),
    ];

    let mut context = Context::new();
    context.insert("alerts", &vec![("Backend is slow".to_string(), "warning")]);
    context.insert("current_user", &common::user(&["ticketing", "ticketing_admin"]));
    context.insert("current_page", "users");
    context.insert("items", &Paginated::new(users, 2, 3));
    context.insert("search_query", &Some("example"));
    context.insert("sort", "email,asc");
    context.insert("page_query", "&q=example&sort=email%2Casc");

    let response = render_template(&tera(), "users/index.html", &context);
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body()).await.unwrap();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("ann@example.com"));
    assert!(html.contains("Backend is slow"));
    assert!(html.contains(r#"href="?page=3&amp;q=example&amp;sort=email%2Casc""#));
    assert!(html.contains(r#"href="/authorities""#));
}

#[actix_web::test]
async fn filter_builder_rows_render_with_their_field_type() {
    let form = FilterBuilderForm {
        field: vec!["isCompleted".to_string(), "salary".to_string()],
        operator: vec!["eq".to_string(), String::new()],
        value: vec!["true".to_string(), "10".to_string()],
        ..FilterBuilderForm::default()
    };
    let builder = form.into_builder(FieldCatalog::my_tickets());
    let rows: Vec<FilterRowView> = builder
        .rows()
        .iter()
        .map(|row| FilterRowView::new(row, builder.catalog()))
        .collect();
    let fields: Vec<FieldView> = builder.catalog().fields().iter().map(FieldView::from).collect();

    let mut context = Context::new();
    context.insert("alerts", &Vec::<(String, &str)>::new());
    context.insert("current_user", &common::user(&["ticketing"]));
    context.insert("current_page", "my_tickets");
    context.insert("rows", &rows);
    context.insert("fields", &fields);
    context.insert("items", &Paginated::<serde_json::Value>::empty());
    context.insert("page_query", "");
    context.insert("searched", &false);

    let response = render_template(&tera(), "tickets/mine.html", &context);
    assert_eq!(response.status(), StatusCode::OK);

    let html = String::from_utf8(to_bytes(response.into_body()).await.unwrap().to_vec()).unwrap();
    assert!(html.contains(r#"<option value="true" selected>Yes</option>"#));
    assert!(html.contains("Press Search to apply the filters."));
    assert!(!html.contains(r#"href="/authorities""#));
}

#[actix_web::test]
async fn sort_headers_keep_the_search_text() {
    let data = ListPageData::new(
        Paginated::new(vec![json!({"id": 1, "email": "smith@example.com", "authorities": []})], 1, 1),
        Some("smith".to_string()),
        &SortKey::asc("email"),
        &["email", "firstName", "lastName"],
        &SortKey::asc("email"),
    );

    let mut context = Context::new();
    context.insert("current_user", &common::user(&["ticketing", "ticketing_admin"]));
    context.insert("current_page", "users");
    context.insert("items", &data.items);
    context.insert("search_query", &data.search_query);
    context.insert("sort", &data.sort);
    context.insert("sort_links", &data.sort_links);
    context.insert("page_query", "");

    let response = render_template(&tera(), "users/index.html", &context);
    let html = String::from_utf8(to_bytes(response.into_body()).await.unwrap().to_vec()).unwrap();

    assert!(html.contains(r#"href="?q=smith&amp;sort=email%2Cdesc""#));
    assert!(html.contains(r#"href="?q=smith&amp;sort=firstName%2Casc""#));
    assert!(html.contains(r#"href="?q=smith&amp;sort=lastName%2Casc""#));
    assert!(!html.contains(r#"href="?sort="#));
}

#[test]
fn sort_links_without_search_flip_only_the_active_column() {
    let data = ListPageData::new(
        Paginated::<serde_json::Value>::empty(),
        None,
        &SortKey::asc("id"),
        &["id", "createdAt"],
        &SortKey::desc("createdAt"),
    );

    assert_eq!(data.sort_links["id"], "?sort=id%2Cdesc");
    assert_eq!(data.sort_links["createdAt"], "?sort=createdAt%2Cdesc");
}

#[test]
fn missing_template_is_a_server_error() {
    let response = render_template(&tera(), "nope.html", &Context::new());
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
