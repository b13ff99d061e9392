use std::sync::Arc;

use eyre::Result;
use relay::config::PayloadKeys;
use relay_tests::{
    mock_traccar::{start_mock_traccar, MockTraccarState},
    utils::{relay_config, setup_test_env, start_relay, TEST_PASSWORD, TEST_USERNAME},
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

fn pairs(expected: &[(&str, &str)]) -> Vec<(String, String)> {
    expected.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

async fn post_uplink(url: &str, body: &Value) -> Result<(StatusCode, Value)> {
    let resp = Client::new()
        .post(url)
        .basic_auth(TEST_USERNAME, Some(TEST_PASSWORD))
        .json(body)
        .send()
        .await?;
    let status = resp.status();
    Ok((status, resp.json().await?))
}

#[tokio::test]
async fn test_forwards_all_fields() -> Result<()> {
    setup_test_env();
    let traccar = Arc::new(MockTraccarState::new());
    let relay_url = start_relay(relay_config(start_mock_traccar(traccar.clone()).await?)).await?;

    let body = json!({
        "end_device_ids": { "device_id": "tracker-01", "dev_eui": "70B3D57ED0000001" },
        "received_at": "2024-05-01T12:00:00Z",
        "uplink_message": {
            "f_port": 2,
            "decoded_payload": {
                "latitude": 52.52,
                "longitude": 13.405,
                "battery": 3.9,
                "speed": 0
            }
        }
    });

    let (status, response) = post_uplink(&relay_url, &body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "message": "Data forwarded successfully" }));

    assert_eq!(traccar.received_positions(), 1);
    assert_eq!(
        traccar.positions()[0],
        pairs(&[("id", "tracker-01"), ("lat", "52.52"), ("lon", "13.405"), ("batt", "3.9")])
    );

    Ok(())
}

#[tokio::test]
async fn test_missing_battery_is_omitted() -> Result<()> {
    setup_test_env();
    let traccar = Arc::new(MockTraccarState::new());
    let relay_url = start_relay(relay_config(start_mock_traccar(traccar.clone()).await?)).await?;

    let body = json!({
        "end_device_ids": { "device_id": "dev1" },
        "uplink_message": { "decoded_payload": { "latitude": 12.3, "longitude": 45.6 } }
    });

    let (status, response) = post_uplink(&relay_url, &body).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({ "message": "Data forwarded successfully" }));
    assert_eq!(
        traccar.positions(),
        vec![pairs(&[("id", "dev1"), ("lat", "12.3"), ("lon", "45.6")])]
    );

    Ok(())
}

#[tokio::test]
async fn test_null_fields_and_missing_payload() -> Result<()> {
    setup_test_env();
    let traccar = Arc::new(MockTraccarState::new());
    let relay_url = start_relay(relay_config(start_mock_traccar(traccar.clone()).await?)).await?;

    let with_nulls = json!({
        "end_device_ids": { "device_id": "dev2" },
        "uplink_message": {
            "decoded_payload": { "latitude": null, "longitude": 45.6, "battery": null }
        }
    });
    let without_payload = json!({ "end_device_ids": { "device_id": "dev3" } });

    let (_, response) = post_uplink(&relay_url, &with_nulls).await?;
    assert_eq!(response["message"], "Data forwarded successfully");
    let (_, response) = post_uplink(&relay_url, &without_payload).await?;
    assert_eq!(response["message"], "Data forwarded successfully");

    assert_eq!(
        traccar.positions(),
        vec![pairs(&[("id", "dev2"), ("lon", "45.6")]), pairs(&[("id", "dev3")])]
    );

    Ok(())
}

#[tokio::test]
async fn test_custom_battery_key() -> Result<()> {
    setup_test_env();
    let traccar = Arc::new(MockTraccarState::new());
    let mut config = relay_config(start_mock_traccar(traccar.clone()).await?);
    config.payload_keys = PayloadKeys { battery: "batV".to_string(), ..PayloadKeys::default() };
    let relay_url = start_relay(config).await?;

    let body = json!({
        "end_device_ids": { "device_id": "dev1" },
        "uplink_message": {
            "decoded_payload": { "latitude": 1.5, "longitude": 2.5, "battery": 99, "batV": 3.62 }
        }
    });

    let (_, response) = post_uplink(&relay_url, &body).await?;
    assert_eq!(response, json!({ "message": "Data forwarded successfully" }));
    assert_eq!(
        traccar.positions(),
        vec![pairs(&[("id", "dev1"), ("lat", "1.5"), ("lon", "2.5"), ("batt", "3.62")])]
    );

    Ok(())
}

#[tokio::test]
async fn test_device_id_missing_not_forwarded() -> Result<()> {
    setup_test_env();
    let traccar = Arc::new(MockTraccarState::new());
    let relay_url = start_relay(relay_config(start_mock_traccar(traccar.clone()).await?)).await?;

    for body in [
        json!({ "uplink_message": { "decoded_payload": { "latitude": 1.0, "longitude": 2.0 } } }),
        json!({ "end_device_ids": {} }),
        json!({ "end_device_ids": { "device_id": "" } }),
    ] {
        let (status, response) = post_uplink(&relay_url, &body).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, json!({ "error": "Device ID missing" }));
    }

    assert_eq!(traccar.received_positions(), 0);
    Ok(())
}

#[tokio::test]
async fn test_downstream_error_status_reported_with_ok() -> Result<()> {
    setup_test_env();
    let traccar = Arc::new(MockTraccarState::new());
    traccar.set_response_override(StatusCode::BAD_REQUEST);
    let relay_url = start_relay(relay_config(start_mock_traccar(traccar.clone()).await?)).await?;

    let body = json!({
        "end_device_ids": { "device_id": "unknown-device" },
        "uplink_message": {
            "decoded_payload": { "latitude": 1.0, "longitude": 2.0, "battery": 50 }
        }
    });

    let (status, response) = post_uplink(&relay_url, &body).await?;
    assert_eq!(status, StatusCode::OK);
    let error = response["error"].as_str().expect("error message");
    assert!(error.contains("400"), "{error}");
    assert_eq!(traccar.received_positions(), 1);

    Ok(())
}

#[tokio::test]
async fn test_redirect_is_not_followed() -> Result<()> {
    setup_test_env();
    let traccar = Arc::new(MockTraccarState::new());
    traccar.set_redirect("/elsewhere");
    let relay_url = start_relay(relay_config(start_mock_traccar(traccar.clone()).await?)).await?;

    let body = json!({
        "end_device_ids": { "device_id": "dev1" },
        "uplink_message": {
            "decoded_payload": { "latitude": 1.0, "longitude": 2.0, "battery": 50 }
        }
    });

    let (status, response) = post_uplink(&relay_url, &body).await?;
    assert_eq!(status, StatusCode::OK);
    let error = response["error"].as_str().expect("error message");
    assert!(error.contains("302"), "{error}");
    assert_eq!(traccar.received_positions(), 1);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_traccar_reported_with_ok() -> Result<()> {
    setup_test_env();
    // Reserve a port, then free it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let unused = listener.local_addr()?;
    drop(listener);

    let relay_url = start_relay(relay_config(unused)).await?;
    let body = json!({ "end_device_ids": { "device_id": "dev1" } });

    let (status, response) = post_uplink(&relay_url, &body).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(response["error"].as_str().is_some_and(|e| e.contains("/api/positions")));

    Ok(())
}

#[tokio::test]
async fn test_malformed_body_not_forwarded() -> Result<()> {
    setup_test_env();
    let traccar = Arc::new(MockTraccarState::new());
    let relay_url = start_relay(relay_config(start_mock_traccar(traccar.clone()).await?)).await?;

    for raw in ["{not json", "[]", "\"dev1\""] {
        let resp = Client::new()
            .post(&relay_url)
            .basic_auth(TEST_USERNAME, Some(TEST_PASSWORD))
            .header("content-type", "application/json")
            .body(raw)
            .send()
            .await?;
        assert_eq!(resp.status(), StatusCode::OK);
        let response: Value = resp.json().await?;
        assert!(response["error"].is_string(), "{raw}: {response}");
    }

    assert_eq!(traccar.received_positions(), 0);
    Ok(())
}
