pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::identity::handlers as identity;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Identity
        .route(
            "/register/candidate",
            post(identity::handle_register_candidate),
        )
        .route("/register/employer", post(identity::handle_register_employer))
        .route("/api/login", post(identity::handle_login))
        .route("/candidates", get(identity::handle_list_candidates))
        .route(
            "/candidates/:email",
            get(identity::handle_get_candidate).put(identity::handle_update_candidate),
        )
        // Job catalog
        .route(
            "/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        // Application ledger
        .route(
            "/applications",
            get(applications::handle_list_active).post(applications::handle_submit),
        )
        .route(
            "/applications/reconcile",
            post(applications::handle_reconcile),
        )
        .route(
            "/applications/:id/approve",
            post(applications::handle_approve),
        )
        .route(
            "/applications/:id/reject",
            post(applications::handle_reject),
        )
        .route(
            "/rejected_applications",
            get(applications::handle_list_rejected),
        )
        .route("/application", get(applications::handle_list_by_email))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::build_router;
    use crate::models::user::Role;
    use crate::state::AppState;
    use crate::store::memory::MemoryStore;

    fn app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (build_router(AppState::from_store(store.clone())), store)
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        router.clone().oneshot(request).await.expect("route executes")
    }

    async fn send_raw(
        router: &Router,
        uri: &str,
        content_type: Option<&str>,
        body: &'static str,
    ) -> Response {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        router
            .clone()
            .oneshot(builder.body(Body::from(body)).unwrap())
            .await
            .expect("route executes")
    }

    async fn read_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app();
        let response = send(&router, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_submit_approve_reject_over_http() {
        let (router, store) = app();
        store.seed_user("a@x.com", Role::Candidate);

        let response = send(
            &router,
            Method::POST,
            "/applications",
            Some(json!({"email": "a@x.com", "job_id": 7, "cover_letter": "Hi"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = read_json(response).await;
        assert_eq!(created["status"], "Applied");
        let id = created["id"].as_str().unwrap().to_string();

        let response = send(
            &router,
            Method::POST,
            &format!("/applications/{id}/approve"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["message"], "Application approved");
        assert_eq!(body["application"]["status"], "Approved");

        let response = send(
            &router,
            Method::POST,
            &format!("/applications/{id}/reject"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let rejected = read_json(send(&router, Method::GET, "/rejected_applications", None).await).await;
        assert_eq!(rejected.as_array().unwrap().len(), 1);
        assert_eq!(rejected[0]["id"], id.as_str());
        assert_eq!(rejected[0]["status"], "Rejected");
        assert_eq!(rejected[0]["cover_letter"], "Hi");

        let active = read_json(send(&router, Method::GET, "/applications", None).await).await;
        assert_eq!(active, json!([]));

        let response = send(
            &router,
            Method::POST,
            &format!("/applications/{id}/reject"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_submit_validation_errors_are_400() {
        let (router, store) = app();
        store.seed_user("a@x.com", Role::Candidate);

        let missing = send(
            &router,
            Method::POST,
            "/applications",
            Some(json!({"email": "a@x.com", "job_id": 7})),
        )
        .await;
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(missing).await["error"]["code"], "VALIDATION_ERROR");

        let ghost = send(
            &router,
            Method::POST,
            "/applications",
            Some(json!({"email": "ghost@x.com", "job_id": 7, "cover_letter": "Hi"})),
        )
        .await;
        assert_eq!(ghost.status(), StatusCode::BAD_REQUEST);
        assert!(store.active_ids().is_empty());
    }

    #[tokio::test]
    async fn test_numeric_text_job_id_is_accepted() {
        let (router, store) = app();
        store.seed_user("a@x.com", Role::Candidate);

        let response = send(
            &router,
            Method::POST,
            "/applications",
            Some(json!({"email": "a@x.com", "job_id": "7", "cover_letter": "Hi"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["job_id"], 7);
    }

    #[tokio::test]
    async fn test_malformed_bodies_get_error_envelope() {
        let (router, store) = app();
        store.seed_user("a@x.com", Role::Candidate);

        let cases = [
            (
                "/applications",
                Some("application/json"),
                r#"{"email":"a@x.com","job_id":"seven","cover_letter":"Hi"}"#,
            ),
            (
                "/applications",
                None,
                r#"{"email":"a@x.com","job_id":7,"cover_letter":"Hi"}"#,
            ),
            ("/applications", Some("application/json"), "not json"),
            ("/register/candidate", Some("application/json"), "{"),
            ("/api/login", Some("text/plain"), r#"{"email":"a@x.com"}"#),
            ("/jobs", Some("application/json"), "[1,"),
        ];
        for (uri, content_type, body) in cases {
            let response = send_raw(&router, uri, content_type, body).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
            let envelope = read_json(response).await;
            assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR", "{uri} {body}");
            assert!(envelope["error"]["message"].is_string());
        }
        assert!(store.active_ids().is_empty());
    }

    #[tokio::test]
    async fn test_transitions_on_unknown_ids_are_404() {
        let (router, _) = app();
        for uri in [
            "/applications/not-a-uuid/approve",
            "/applications/00000000-0000-0000-0000-000000000000/approve",
            "/applications/00000000-0000-0000-0000-000000000000/reject",
        ] {
            let response = send(&router, Method::POST, uri, None).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_list_by_email() {
        let (router, store) = app();
        store.seed_user("a@x.com", Role::Candidate);
        store.seed_user("b@x.com", Role::Candidate);
        for email in ["a@x.com", "b@x.com"] {
            let response = send(
                &router,
                Method::POST,
                "/applications",
                Some(json!({"email": email, "job_id": 3, "cover_letter": "Hello"})),
            )
            .await;
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let mine = read_json(send(&router, Method::GET, "/application?email=a@x.com", None).await).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);

        let ghost =
            send(&router, Method::GET, "/application?email=ghost@x.com", None).await;
        assert_eq!(ghost.status(), StatusCode::OK);
        assert_eq!(read_json(ghost).await, json!([]));

        let all = read_json(send(&router, Method::GET, "/application", None).await).await;
        assert_eq!(all.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_partial_move_surfaces_and_reconcile_repairs() {
        let (router, store) = app();
        store.seed_user("a@x.com", Role::Candidate);
        let created = read_json(
            send(
                &router,
                Method::POST,
                "/applications",
                Some(json!({"email": "a@x.com", "job_id": 7, "cover_letter": "Hi"})),
            )
            .await,
        )
        .await;
        let id = created["id"].as_str().unwrap().to_string();

        store.fail_active_deletes(true);
        let response = send(
            &router,
            Method::POST,
            &format!("/applications/{id}/reject"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(read_json(response).await["error"]["code"], "PARTIAL_MOVE");

        store.fail_active_deletes(false);
        let response = send(&router, Method::POST, "/applications/reconcile", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["repaired"], json!([id]));
        assert!(store.active_ids().is_empty());
    }

    #[tokio::test]
    async fn test_register_login_and_profile_roundtrip() {
        let (router, _) = app();

        let response = send(
            &router,
            Method::POST,
            "/register/candidate",
            Some(json!({"name": "Ada Lovelace", "email": "ada@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(
            &router,
            Method::POST,
            "/api/login",
            Some(json!({"email": "ada@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["role"], "candidate");

        let response = send(
            &router,
            Method::POST,
            "/api/login",
            Some(json!({"email": "ada@x.com", "password": "nope"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(
            &router,
            Method::PUT,
            "/candidates/ada@x.com",
            Some(json!({"skills": "analytical engines"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let profile = read_json(send(&router, Method::GET, "/candidates/ada@x.com", None).await).await;
        assert_eq!(profile["skills"], "analytical engines");
        assert_eq!(profile["name"], "Ada Lovelace");

        let missing = send(&router, Method::GET, "/candidates/ghost@x.com", None).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let response = send(
            &router,
            Method::POST,
            "/register/employer",
            Some(json!({"companyName": "Acme", "email": "ada@x.com", "password": "pw"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_job_catalog_routes() {
        let (router, _) = app();

        let response = send(
            &router,
            Method::POST,
            "/jobs",
            Some(json!({"title": "Backend Engineer", "location": "Remote"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let job = read_json(response).await;
        assert_eq!(job["id"], 1);
        assert_eq!(job["title"], "Backend Engineer");

        let bad = send(&router, Method::POST, "/jobs", Some(json!("just a string"))).await;
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let jobs = read_json(send(&router, Method::GET, "/jobs", None).await).await;
        assert_eq!(jobs.as_array().unwrap().len(), 1);
        assert_eq!(jobs[0]["location"], "Remote");
    }
}
