mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use geofence_service::app;
use common::{day, sample_collection, seed_locations, state, token};

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

#[tokio::test]
async fn health_is_public() {
    let (state, _logs) = state();
    let (status, body) = call(&app(state), Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn api_rejects_missing_and_bad_tokens() {
    let (state, _logs) = state();
    let app = app(state);

    let (status, body) = call(&app, Method::GET, "/api/geofences", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "status": "fail", "message": "You are not logged in, please provide token" }));

    let (status, body) = call(&app, Method::GET, "/api/geofences", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn token_can_come_from_query() {
    let (state, _logs) = state();
    let uri = format!("/api/geofences?access_token={}", token(None));
    let (status, body) = call(&app(state), Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn invalid_geofence_is_not_saved() {
    let (state, _logs) = state();
    let app = app(state);
    let token = token(None);

    for (draft, message) in [
        (json!({ "latitude": 91.0, "longitude": 0.0, "radius": 1.0 }), "Latitude must be between -90 and 90 degrees"),
        (
            json!({ "latitude": 0.0, "longitude": -181.0, "radius": 1.0 }),
            "Longitude must be between -180 and 180 degrees",
        ),
        (json!({ "latitude": 0.0, "longitude": 0.0, "radius": -5.0 }), "Radius must be greater than 0"),
        (json!({ "latitude": 0.0, "longitude": 0.0 }), "Radius is required"),
    ] {
        let (status, body) = call(&app, Method::PUT, "/api/geofences/HQ", Some(&token), Some(draft)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["message"], message);
    }

    let (status, body) = call(&app, Method::GET, "/api/geofences/HQ", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Geofence HQ not found");
}

#[tokio::test]
async fn malformed_input_gets_error_envelope() {
    let (state, _logs) = state();
    let app = app(state);
    let token = token(Some("EMP-1"));

    let draft = json!({ "latitude": "north", "longitude": 0.0, "radius": 1.0 });
    let (status, body) = call(&app, Method::PUT, "/api/geofences/HQ", Some(&token), Some(draft)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert!(body["message"].as_str().unwrap().contains("expected f64"));

    let upload = json!({ "location": sample_collection(), "date": "2024-13-45" });
    let (status, body) = call(&app, Method::POST, "/api/location", Some(&token), Some(upload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");

    let (status, body) =
        call(&app, Method::GET, "/api/employees/EMP-1/location?date=yesterday", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    assert!(body["message"].is_string());

    let (status, _) = call(&app, Method::GET, "/api/geofences/HQ", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn saved_geofence_answers_membership() {
    let (state, _logs) = state();
    let app = app(state);
    let token = token(None);

    let draft = json!({ "latitude": 0.0, "longitude": 0.0, "radius": 10.0 });
    let (status, record) = call(&app, Method::PUT, "/api/geofences/HQ", Some(&token), Some(draft)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        record,
        json!({ "name": "HQ", "latitude": 0.0, "longitude": 0.0, "radius": 10.0, "location_history": null })
    );

    let near = json!({ "latitude": 0.0, "longitude": 0.05 });
    let (status, body) = call(&app, Method::POST, "/api/geofences/HQ/contains", Some(&token), Some(near)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inside"], true);
    assert!((body["distance"]["km"].as_f64().unwrap() - 5.56).abs() < 0.01);

    let far = json!({ "latitude": 0.0, "longitude": 0.2 });
    let (_, body) = call(&app, Method::POST, "/api/geofences/HQ/contains", Some(&token), Some(far)).await;
    assert_eq!(body["inside"], false);

    let (_, list) = call(&app, Method::GET, "/api/geofences", Some(&token), None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn membership_rejects_out_of_range_point() {
    let (state, _logs) = state();
    let app = app(state);
    let token = token(None);

    let draft = json!({ "latitude": 0.0, "longitude": 0.0, "radius": 10.0 });
    call(&app, Method::PUT, "/api/geofences/HQ", Some(&token), Some(draft)).await;

    let point = json!({ "latitude": 95.0, "longitude": 0.0 });
    let (status, _) = call(&app, Method::POST, "/api/geofences/HQ/contains", Some(&token), Some(point)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn uploaded_locations_feed_both_lookups() {
    let (state, mut logs) = state();
    let app = app(state);
    let token = token(Some("EMP-1"));

    let upload = json!({ "location": sample_collection().to_string(), "date": "2024-03-01" });
    let (status, body) = call(&app, Method::POST, "/api/location", Some(&token), Some(upload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Location updated successfully.");

    let audit = logs.recv().await.unwrap();
    assert_eq!(audit.employee, "EMP-1");
    assert_eq!(audit.date, day(1));
    assert_eq!(audit.points.len(), 3);

    let (status, history) = call(&app, Method::GET, "/api/location?date=2024-03-01", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["type"], "FeatureCollection");
    assert!(history["features"][0]["properties"]["timestamp"].is_string());

    let (status, trail) =
        call(&app, Method::GET, "/api/employees/EMP-1/location?date=2024-03-01", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let trail = trail.as_array().unwrap();
    assert_eq!(trail.len(), 3);
    assert_eq!(trail[0]["latitude"], 19.080709);
    assert_eq!(trail[0]["longitude"], 72.855663);
}

#[tokio::test]
async fn lookups_for_unrecorded_days() {
    let (state, _logs) = state();
    seed_locations(&state, "EMP-1", day(1));
    let app = app(state);
    let token = token(Some("EMP-1"));

    let (status, history) = call(&app, Method::GET, "/api/location?date=2024-03-02", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history, Value::Null);

    let (status, body) =
        call(&app, Method::GET, "/api/employees/EMP-1/location?date=2024-03-02", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Location details not found for employee");

    let (status, body) = call(&app, Method::GET, "/api/employees/EMP-1/location", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "date is required");
}

#[tokio::test]
async fn upload_rejections() {
    let (state, _logs) = state();
    let app = app(state);

    let (status, body) = call(&app, Method::POST, "/api/location", Some(&token(Some("EMP-1"))), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "location is required.");

    let upload = json!({ "location": sample_collection() });
    let (status, body) = call(&app, Method::POST, "/api/location", Some(&token(None)), Some(upload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Employee not found for current user");

    let upload = json!({ "location": "{broken" });
    let (status, body) = call(&app, Method::POST, "/api/location", Some(&token(Some("EMP-1"))), Some(upload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid JSON format in location data");
}
