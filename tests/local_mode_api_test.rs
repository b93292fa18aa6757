// Fluxo completo da API no modo local (sem banco), via tower::ServiceExt::oneshot

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use solo_agent_crm::config::{AppState, Settings};

async fn local_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solo_agent_crm_data.json");
    let settings = Settings::from_lookup(|key| match key {
        "LOCAL_DATA_PATH" => Some(path.to_string_lossy().into_owned()),
        _ => None,
    })
    .unwrap();

    let state = AppState::from_settings(settings).await.unwrap();
    (solo_agent_crm::app(state), dir)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_lead(app: &Router, name: &str, budget: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/leads",
        Some(json!({
            "fullName": name,
            "phone": "+91 98200 12345",
            "interestType": "Buy",
            "budget": budget,
            "area": "Bandra West",
            "notes": "Wants a sea-facing 2BHK"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["lead"]["id"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn health_check_answers_ok() {
    let (app, _dir) = local_app().await;
    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn new_lead_starts_without_a_plan() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Rohan Mehta", 8_500_000).await;

    let (status, detail) = send(&app, "GET", &format!("/api/leads/{}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["state"], "noPlan");
    assert_eq!(detail["promptSchedule"], true);
    assert_eq!(detail["lead"]["status"], "New");
    assert_eq!(detail["lead"]["notes"].as_array().unwrap().len(), 1);
    assert!(detail["lead"]["followUps"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn lead_requires_name_and_phone() {
    let (app, _dir) = local_app().await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/leads",
        Some(json!({ "fullName": "Only Name", "phone": "", "interestType": "Rent" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/leads",
        Some(json!({ "fullName": "   ", "phone": "+91 98200 12345", "interestType": "Rent" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, leads) = send(&app, "GET", "/api/leads", None).await;
    assert_eq!(leads.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn negative_budget_is_rejected() {
    let (app, _dir) = local_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/leads",
        Some(json!({
            "fullName": "Kabir Shah",
            "phone": "+91 98200 12345",
            "interestType": "Buy",
            "budget": -5000
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["budget"][0], "Budget cannot be negative.");
}

#[tokio::test]
async fn blank_note_is_not_appended() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Ishaan Verma", 4_500_000).await;

    let (status, _) = send(&app, "POST", &format!("/api/leads/{}/notes", id), Some(json!({ "text": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, detail) = send(&app, "GET", &format!("/api/leads/{}", id), None).await;
    assert_eq!(detail["lead"]["notes"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn scheduling_twice_keeps_a_single_pending_follow_up() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Sneha Kulkarni", 12_000_000).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/leads/{}/follow-ups", id),
        Some(json!({ "preset": "tomorrow", "type": "Call" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, detail) = send(
        &app,
        "POST",
        &format!("/api/leads/{}/follow-ups", id),
        Some(json!({ "preset": "3d", "type": "Visit", "notes": "Site visit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(detail["state"], "upcoming");

    let follow_ups = detail["lead"]["followUps"].as_array().unwrap();
    assert_eq!(follow_ups.len(), 2);
    let pending: Vec<_> = follow_ups.iter().filter(|f| f["completed"] == false).collect();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0]["type"], "Visit");
    assert_eq!(detail["nextAction"]["id"], pending[0]["id"]);
    // Mais novo primeiro
    assert_eq!(follow_ups[0]["id"], pending[0]["id"]);
}

#[tokio::test]
async fn schedule_without_date_or_preset_is_rejected() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Arjun Rao", 0).await;

    let (status, _) = send(&app, "POST", &format!("/api/leads/{}/follow-ups", id), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn completing_records_the_outcome_and_prompts_a_new_plan() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Meera Nair", 6_000_000).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/leads/{}/follow-ups/complete", id),
        Some(json!({ "outcome": "No Answer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(
        &app,
        "POST",
        &format!("/api/leads/{}/follow-ups", id),
        Some(json!({ "preset": "2h" })),
    )
    .await;

    let (status, detail) = send(
        &app,
        "POST",
        &format!("/api/leads/{}/follow-ups/complete", id),
        Some(json!({ "outcome": "Spoke - Interested" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["state"], "noPlan");
    assert_eq!(detail["promptSchedule"], true);
    assert_eq!(detail["pastInteractions"][0]["outcome"], "Spoke - Interested");
}

#[tokio::test]
async fn dashboard_splits_overdue_from_due_today() {
    let (app, _dir) = local_app().await;
    let late = create_lead(&app, "Late Lead", 5_000_000).await;
    let idle = create_lead(&app, "Idle Lead", 2_500_000).await;

    let yesterday = Utc::now() - Duration::days(1);
    send(
        &app,
        "POST",
        &format!("/api/leads/{}/follow-ups", late),
        Some(json!({ "date": yesterday.to_rfc3339() })),
    )
    .await;

    let (status, summary) = send(&app, "GET", "/api/dashboard", None).await;

    assert_eq!(status, StatusCode::OK);
    let overdue = summary["overdue"].as_array().unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0]["leadId"], late.as_str());
    assert!(summary["dueToday"].as_array().unwrap().iter().all(|i| i["leadId"] != late.as_str()));
    assert!(overdue.iter().all(|i| i["leadId"] != idle.as_str()));
    assert_eq!(summary["activeLeads"], 2);
    assert_eq!(summary["pipelineValue"].as_f64().unwrap(), 7_500_000.0);
    assert_eq!(summary["banner"]["visible"], false);
}

#[tokio::test]
async fn closed_leads_leave_the_pipeline() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Vikram Shah", 9_000_000).await;

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/leads/{}/status", id),
        Some(json!({ "status": "Closed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = send(&app, "GET", "/api/dashboard", None).await;
    assert_eq!(summary["activeLeads"], 0);
    assert_eq!(summary["pipelineValue"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn list_filters_by_search_and_status() {
    let (app, _dir) = local_app().await;
    create_lead(&app, "Pooja Verma", 1_000_000).await;
    let other = create_lead(&app, "Kabir Singh", 1_000_000).await;
    send(
        &app,
        "PATCH",
        &format!("/api/leads/{}/status", other),
        Some(json!({ "status": "Negotiation" })),
    )
    .await;

    let (_, all) = send(&app, "GET", "/api/leads?status=All", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, found) = send(&app, "GET", "/api/leads?search=pooja", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["fullName"], "Pooja Verma");

    let (_, negotiating) = send(&app, "GET", "/api/leads?status=Negotiation", None).await;
    assert_eq!(negotiating.as_array().unwrap().len(), 1);
    assert_eq!(negotiating[0]["id"], other.as_str());

    let (status, _) = send(&app, "GET", "/api/leads?status=Bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleted_lead_is_gone() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Temp Lead", 0).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/leads/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/api/leads/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn whatsapp_link_is_never_gated_locally() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Asha", 0).await;

    let (status, link) = send(&app, "GET", &format!("/api/leads/{}/whatsapp", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(link["url"].as_str().unwrap().starts_with("https://wa.me/919820012345?text=Hi%20Asha"));
}

#[tokio::test]
async fn session_opens_the_requested_lead_without_paywall() {
    let (app, _dir) = local_app().await;
    let id = create_lead(&app, "Neha Joshi", 4_000_000).await;

    let (status, session) = send(&app, "GET", &format!("/api/session?leadId={}", id), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(session["screen"], "app");
    assert_eq!(session["view"], "lead-detail");
    assert_eq!(session["localMode"], true);
    assert_eq!(session["hasAccess"], true);
    assert!(session["paywall"].is_null());
    assert_eq!(session["leadCount"], 1);
    assert_eq!(session["selectedLead"]["lead"]["id"], id.as_str());
}

#[tokio::test]
async fn feedback_and_auth_are_unavailable_locally() {
    let (app, _dir) = local_app().await;

    let (status, _) = send(&app, "POST", "/api/feedback", Some(json!({ "message": "Great app" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": "agent@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn payment_success_extends_paid_until() {
    let (app, _dir) = local_app().await;

    let (status, subscription) = send(
        &app,
        "POST",
        "/api/billing/payment-success",
        Some(json!({ "paymentId": "pay_local_1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(subscription["isActive"], true);
    assert!(subscription["paidUntil"].is_string());

    let (status, checkout) = send(&app, "GET", "/api/billing/checkout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(checkout["amount"], 49900);
    assert_eq!(checkout["currency"], "INR");
}

#[tokio::test]
async fn leads_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crm.json");
    let path_str = path.to_string_lossy().into_owned();
    let lookup = |key: &str| (key == "LOCAL_DATA_PATH").then(|| path_str.clone());

    let first = solo_agent_crm::app(
        AppState::from_settings(Settings::from_lookup(lookup).unwrap())
            .await
            .unwrap(),
    );
    let id = create_lead(&first, "Persisted Lead", 3_000_000).await;
    drop(first);

    let second = solo_agent_crm::app(
        AppState::from_settings(Settings::from_lookup(lookup).unwrap())
            .await
            .unwrap(),
    );
    let (status, detail) = send(&second, "GET", &format!("/api/leads/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["lead"]["fullName"], "Persisted Lead");
}
