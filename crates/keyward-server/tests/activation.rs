use keyward_test_utils::*;
use serde_json::json;

async fn add_code(router: &axum::Router, token: &str, code: &str) {
    let (status, body) = send_request(
        router,
        "POST",
        "/api/admin/codes",
        Some(token),
        Some(json!({ "code": code })),
    )
    .await;
    assert_eq!(status, 201, "add_code failed: {body}");
}

// ── activate ────────────────────────────────────────────────────────────

#[tokio::test]
async fn activate_binds_an_unused_code() {
    let (router, _stores) = create_test_router_and_stores().await;
    let token = login_via_api(&router).await;
    add_code(&router, &token, "PROMO-2024").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "promo-2024", "deviceId": "device-A" })),
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["bound"], true);
    assert_eq!(body["code"], "PROMO-2024");
    assert!(body["activatedAt"].as_str().is_some());
}

#[tokio::test]
async fn activate_replay_returns_the_original_timestamp() {
    let (router, _stores) = create_test_router_and_stores().await;
    let token = login_via_api(&router).await;
    add_code(&router, &token, "REPLAY-9").await;

    let (status, first) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "REPLAY-9", "deviceId": "device-A" })),
    )
    .await;
    assert_api_ok(status, &first);

    tokio::time::sleep(std::time::Duration::from_millis(15)).await;

    let (status, replay) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "  replay-9  ", "deviceId": "device-A" })),
    )
    .await;
    assert_api_ok(status, &replay);
    assert_eq!(replay["bound"], true);
    assert_eq!(replay["activatedAt"], first["activatedAt"]);
}

#[tokio::test]
async fn activate_other_device_is_a_conflict() {
    let (router, _stores) = create_test_router_and_stores().await;
    let token = login_via_api(&router).await;
    add_code(&router, &token, "TAKEN-1").await;

    let (status, _) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "TAKEN-1", "deviceId": "device-A" })),
    )
    .await;
    assert_eq!(status, 200);

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "TAKEN-1", "deviceId": "device-B" })),
    )
    .await;
    assert_api_error(status, &body, 403, "DeviceConflict");
}

#[tokio::test]
async fn activate_unknown_code_is_a_soft_200() {
    let (router, _stores) = create_test_router_and_stores().await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "NEVER-ISSUED", "deviceId": "device-A" })),
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["bound"], false);
    assert_eq!(body["error"], "UnknownCode");
}

#[tokio::test]
async fn activate_rejects_missing_fields() {
    let (router, _stores) = create_test_router_and_stores().await;

    let (status, body) = send_request(&router, "POST", "/api/activate", None, Some(json!({}))).await;
    assert_api_error(status, &body, 400, "InvalidRequest");

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "ABC-1" })),
    )
    .await;
    assert_api_error(status, &body, 400, "InvalidRequest");

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "deviceId": "device-A" })),
    )
    .await;
    assert_api_error(status, &body, 400, "InvalidRequest");
}

#[tokio::test]
async fn activate_rejects_overlong_device_id() {
    let (router, _stores) = create_test_router_and_stores().await;
    let token = login_via_api(&router).await;
    add_code(&router, &token, "LONG-1").await;

    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "LONG-1", "deviceId": "d".repeat(101) })),
    )
    .await;
    assert_api_error(status, &body, 400, "InvalidRequest");
}

#[tokio::test]
async fn activate_needs_no_session() {
    let (router, _stores) = create_test_router_and_stores().await;
    let token = login_via_api(&router).await;
    add_code(&router, &token, "OPEN-1").await;

    // No Authorization header at all.
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "OPEN-1", "deviceId": "device-A" })),
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["bound"], true);
}

// ── end to end ──────────────────────────────────────────────────────────

#[tokio::test]
async fn full_activation_lifecycle_over_http() {
    let (router, _stores) = create_test_router_and_stores().await;
    let token = login_via_api(&router).await;
    add_code(&router, &token, "LIFE-2024").await;

    // Device A claims the code.
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "life-2024", "deviceId": "device-A" })),
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["bound"], true);

    // Device B is turned away.
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "LIFE-2024", "deviceId": "device-B" })),
    )
    .await;
    assert_api_error(status, &body, 403, "DeviceConflict");

    // Admin inspects and then deletes the binding.
    let (status, body) = send_request(
        &router,
        "GET",
        "/api/admin/codes/LIFE-2024",
        Some(&token),
        None,
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["used"], true);
    assert_eq!(body["boundDevice"], "device-A");

    let (status, body) = send_request(
        &router,
        "DELETE",
        "/api/admin/codes/LIFE-2024",
        Some(&token),
        None,
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["wasUsed"], true);
    assert_eq!(body["deviceId"], "device-A");

    // The deleted code no longer activates anything.
    let (status, body) = send_request(
        &router,
        "POST",
        "/api/activate",
        None,
        Some(json!({ "code": "LIFE-2024", "deviceId": "device-A" })),
    )
    .await;
    assert_api_ok(status, &body);
    assert_eq!(body["bound"], false);
    assert_eq!(body["error"], "UnknownCode");
}
