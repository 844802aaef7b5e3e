use actix_web::{web, HttpResponse};
use serde::Deserialize;
use shared_types::{validation, ContactsResponse, MessageResponse, DEFAULT_LIMIT, DEFAULT_PAGE};
use std::sync::Arc;
use tracing::info;

use crate::database::contacts::{self as contacts_db, ContactListQuery};
use crate::database::Database;
use crate::error::ApiError;

/// Raw query string values. `page` and `limit` fall back to their defaults
/// unless they start with a positive integer.
#[derive(Debug, Deserialize)]
pub struct ListContactsParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl ListContactsParams {
    pub fn into_query(self) -> ContactListQuery {
        ContactListQuery {
            page: positive_or(self.page.as_deref(), DEFAULT_PAGE),
            limit: positive_or(self.limit.as_deref(), DEFAULT_LIMIT),
            search: self.search.filter(|s| !s.is_empty()),
        }
    }
}

/// Reads the leading integer of `value` (`"2abc"` is 2) and keeps it only
/// when positive.
fn positive_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| {
            let v = v.trim_start();
            let digits = v
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                .map_or(v.len(), |(i, _)| i);
            v[..digits].parse::<i64>().ok()
        })
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

pub async fn create_contact(
    db: web::Data<Arc<Database>>,
    payload: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ApiError> {
    let new_contact = validation::validate_create(&payload)?;

    let contact = contacts_db::insert_contact(db.async_connection.clone(), &new_contact).await?;
    info!("Created contact {}", contact.id);

    Ok(HttpResponse::Created().json(contact))
}

pub async fn list_contacts(
    db: web::Data<Arc<Database>>,
    params: web::Query<ListContactsParams>,
) -> Result<HttpResponse, ApiError> {
    let query = params.into_inner().into_query();

    let page = contacts_db::list_contacts(db.async_connection.clone(), &query).await?;

    Ok(HttpResponse::Ok().json(ContactsResponse {
        data: page.data,
        meta: page.meta,
    }))
}

pub async fn get_contact(
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let contact_id = path.into_inner();

    let contact = contacts_db::get_contact(db.async_connection.clone(), contact_id)
        .await?
        .ok_or_else(ApiError::contact_not_found)?;

    Ok(HttpResponse::Ok().json(contact))
}

pub async fn update_contact(
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    payload: web::Json<serde_json::Value>,
) -> Result<HttpResponse, ApiError> {
    let contact_id = path.into_inner();
    let changes = validation::validate_update(&payload)?;

    let contact = contacts_db::update_contact(db.async_connection.clone(), contact_id, &changes)
        .await?
        .ok_or_else(ApiError::contact_not_found)?;
    info!("Updated contact {}", contact_id);

    Ok(HttpResponse::Ok().json(contact))
}

pub async fn delete_contact(
    db: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let contact_id = path.into_inner();

    contacts_db::delete_contact(db.async_connection.clone(), contact_id)
        .await?
        .ok_or_else(ApiError::contact_not_found)?;
    info!("Deleted contact {}", contact_id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Contact deleted successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use shared_types::Contact;

    fn database() -> Arc<Database> {
        Arc::new(Database::in_memory().unwrap())
    }

    macro_rules! app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($db.clone()))
                    .configure(crate::configure)
                    .default_service(web::to(crate::error::not_found)),
            )
            .await
        };
    }

    fn ann() -> Value {
        json!({ "name": "Ann Lee", "email": "ann@x.com", "phone": "555-1111" })
    }

    #[actix_web::test]
    async fn test_create_returns_201_with_defaults() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .set_json(ann())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert!(body["id"].as_i64().unwrap() > 0);
        assert_eq!(body["isFavorite"], false);
        assert!(body["createdAt"].is_string());
        assert!(body["updatedAt"].is_string());

        let req = test::TestRequest::get()
            .uri(&format!("/api/contacts/{}", body["id"]))
            .to_request();
        let fetched: Contact = test::call_and_read_body_json(&app, req).await;
        assert_eq!(fetched.name, "Ann Lee");
        assert!(!fetched.is_favorite);
    }

    #[actix_web::test]
    async fn test_create_invalid_lists_fields() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .set_json(json!({ "name": "", "email": "bad", "phone": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        let fields: Vec<&str> = body["details"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["name", "email", "phone"]);
    }

    #[actix_web::test]
    async fn test_create_duplicate_email_conflicts_without_new_row() {
        let db = database();
        let app = app!(db);

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = test::TestRequest::post()
                .uri("/api/contacts")
                .set_json(ann())
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }

        let req = test::TestRequest::get().uri("/api/contacts").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["meta"]["total"], 1);
    }

    #[actix_web::test]
    async fn test_malformed_json_is_400() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid JSON body");
    }

    #[actix_web::test]
    async fn test_list_twelve_contacts() {
        let db = database();
        let app = app!(db);

        for i in 0..12 {
            let req = test::TestRequest::post()
                .uri("/api/contacts")
                .set_json(json!({
                    "name": format!("Person {i}"),
                    "email": format!("p{i}@x.com"),
                    "phone": "555"
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/contacts?limit=10&page=1")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["meta"]["totalPages"], 2);
        assert_eq!(body["meta"]["total"], 12);
        assert_eq!(body["meta"]["page"], 1);
        assert_eq!(body["meta"]["limit"], 10);
        assert_eq!(body["data"].as_array().unwrap().len(), 10);
        assert_eq!(body["data"][0]["name"], "Person 0");
    }

    #[actix_web::test]
    async fn test_list_falls_back_on_bad_numbers() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::get()
            .uri("/api/contacts?page=abc&limit=-5")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["meta"]["page"], 1);
        assert_eq!(body["meta"]["limit"], 10);
        assert_eq!(body["meta"]["totalPages"], 0);
        assert_eq!(body["data"], json!([]));
    }

    #[actix_web::test]
    async fn test_list_with_largest_limit() {
        let db = database();
        let app = app!(db);

        for (name, email) in [("Ann", "ann@x.com"), ("Bob", "bob@x.com")] {
            let req = test::TestRequest::post()
                .uri("/api/contacts")
                .set_json(json!({ "name": name, "email": email, "phone": "1" }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/contacts?limit=9223372036854775807")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(body["meta"]["totalPages"], 1);
        assert_eq!(body["meta"]["limit"], i64::MAX);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    }

    #[actix_web::test]
    async fn test_search_by_company() {
        let db = database();
        let app = app!(db);

        let payloads = [
            json!({ "name": "Ann", "email": "ann@x.com", "phone": "1", "company": "Acme Corp" }),
            json!({ "name": "Bob", "email": "bob@x.com", "phone": "2", "company": "Globex" }),
            json!({ "name": "Cy", "email": "cy@x.com", "phone": "3" }),
        ];
        for payload in payloads {
            let req = test::TestRequest::post()
                .uri("/api/contacts")
                .set_json(payload)
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/contacts?search=ACME")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["name"], "Ann");
    }

    #[actix_web::test]
    async fn test_get_missing_is_404() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::get().uri("/api/contacts/99999").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Contact not found" }));
    }

    #[actix_web::test]
    async fn test_non_numeric_id_is_400() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::get().uri("/api/contacts/abc").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Invalid contact id");
    }

    #[actix_web::test]
    async fn test_update_single_field() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .set_json(json!({
                "name": "Ann Lee",
                "email": "ann@x.com",
                "phone": "555-1111",
                "company": "Acme"
            }))
            .to_request();
        let created: Contact = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/contacts/{}", created.id))
            .set_json(json!({ "isFavorite": true }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let updated: Contact = test::read_body_json(resp).await;
        assert!(updated.is_favorite);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.email, created.email);
        assert_eq!(updated.phone, created.phone);
        assert_eq!(updated.company, created.company);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[actix_web::test]
    async fn test_update_missing_is_404() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::put()
            .uri("/api/contacts/99999")
            .set_json(json!({ "name": "Nobody" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/contacts").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["meta"]["total"], 0);
    }

    #[actix_web::test]
    async fn test_update_invalid_is_400() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .set_json(ann())
            .to_request();
        let created: Contact = test::call_and_read_body_json(&app, req).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/contacts/{}", created.id))
            .set_json(json!({ "email": "not-an-email" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_delete_then_get_is_404() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::post()
            .uri("/api/contacts")
            .set_json(ann())
            .to_request();
        let created: Contact = test::call_and_read_body_json(&app, req).await;
        let uri = format!("/api/contacts/{}", created.id);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": "Contact deleted successfully" }));

        let req = test::TestRequest::get().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri(&uri).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_health_and_unknown_route() {
        let db = database();
        let app = app!(db);

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "status": "ok", "message": "Server is running" }));

        let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_positive_or() {
        assert_eq!(positive_or(None, 10), 10);
        assert_eq!(positive_or(Some("25"), 10), 25);
        assert_eq!(positive_or(Some(" 3 "), 10), 3);
        assert_eq!(positive_or(Some("2abc"), 10), 2);
        assert_eq!(positive_or(Some("+4"), 10), 4);
        assert_eq!(positive_or(Some("0"), 10), 10);
        assert_eq!(positive_or(Some("-2"), 10), 10);
        assert_eq!(positive_or(Some("ten"), 10), 10);
        assert_eq!(positive_or(Some(""), 10), 10);
        assert_eq!(positive_or(Some("99999999999999999999"), 10), 10);
    }
}
