use std::sync::Arc;
use std::time::Duration;

use evohome_tcc::{
    Broker, Error, HeatingZone, HttpBroker, MessageLogMode, ZoneContext, ZoneEntity,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn broker(server: &MockServer) -> HttpBroker {
    HttpBroker::builder("access-token")
        .base_url(format!("{}/WebAPI/emea/api/v1/", server.uri()))
        .timeout(Duration::from_secs(5))
        .user_agent("evohome-tcc-tests")
        .build()
        .expect("build broker")
}

#[tokio::test]
async fn get_sends_bearer_token_to_relative_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/WebAPI/emea/api/v1/temperatureZone/3432521/status"))
        .and(header("Authorization", "Bearer access-token"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"zoneId": "3432521"})))
        .expect(1)
        .mount(&server)
        .await;

    let body = broker(&server)
        .get("temperatureZone/3432521/status")
        .await
        .expect("get should succeed");
    assert_eq!(body, json!({"zoneId": "3432521"}));
}

#[tokio::test]
async fn put_sends_json_body() {
    let server = MockServer::start().await;
    let command = json!({"Mode": "FollowSchedule", "State": "", "UntilTime": null});
    Mock::given(method("PUT"))
        .and(path("/WebAPI/emea/api/v1/domesticHotWater/3933910/state"))
        .and(body_json(&command))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "840367013"})))
        .expect(1)
        .mount(&server)
        .await;

    let reply = broker(&server)
        .put("domesticHotWater/3933910/state", &command)
        .await
        .expect("put should succeed");
    assert_eq!(reply["id"], "840367013");
}

#[tokio::test]
async fn empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let reply = broker(&server)
        .put("temperatureZone/1/heatSetpoint", &json!({}))
        .await
        .unwrap();
    assert_eq!(reply, Value::Null);
}

#[tokio::test]
async fn http_error_status_is_remote_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let err = broker(&server)
        .get("temperatureZone/1/status")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http(_)), "got {err:?}");
    assert!(err.is_remote_request());
}

#[tokio::test]
async fn non_json_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = broker(&server)
        .get("temperatureZone/1/status")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn zone_refresh_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/WebAPI/emea/api/v1/temperatureZone/3432521/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "zoneId": "3432521",
            "temperatureStatus": {"temperature": 19.0, "isAvailable": true},
            "setpointStatus": {
                "targetHeatTemperature": 22.0,
                "setpointMode": "TemporaryOverride",
                "until": "2024-01-08T22:00:00Z"
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/WebAPI/emea/api/v1/temperatureZone/3432521/heatSetpoint"))
        .and(body_json(json!({
            "SetpointMode": "FollowSchedule",
            "HeatSetpointValue": 0.0,
            "TimeUntil": null
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "1"})))
        .expect(1)
        .mount(&server)
        .await;

    let ctx = ZoneContext::new(Arc::new(broker(&server)));
    let config = json!({
        "zoneId": "3432521",
        "modelType": "HeatingZone",
        "setpointCapabilities": {
            "maxHeatSetpoint": 35.0,
            "minHeatSetpoint": 5.0,
            "valueResolution": 0.5,
            "canControlHeat": true,
            "canControlCool": false,
            "allowedSetpointModes": ["PermanentOverride", "FollowSchedule", "TemporaryOverride"],
            "maxDuration": "1.00:00:00",
            "timingResolution": "00:10:00"
        },
        "scheduleCapabilities": {
            "maxSwitchpointsPerDay": 6,
            "minSwitchpointsPerDay": 1,
            "timingResolution": "00:10:00",
            "setpointValueResolution": 0.5
        },
        "name": "Bathroom",
        "zoneType": "RadiatorZone"
    });
    let zone = HeatingZone::new(&ctx, &config).unwrap();

    zone.refresh().await.unwrap();
    assert_eq!(zone.temperature(), Some(19.0));
    assert_eq!(
        zone.setpoint_status().unwrap().until.as_deref(),
        Some("2024-01-08T22:00:00Z")
    );
    zone.cancel_override().await.unwrap();
}

#[tokio::test]
async fn message_log_records_traffic() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"zoneId": "1"})))
        .mount(&server)
        .await;

    let log = tempfile::NamedTempFile::new().unwrap();
    let broker = HttpBroker::builder("access-token")
        .base_url(server.uri())
        .message_log(MessageLogMode::Diffed, log.path().to_str().unwrap())
        .build()
        .unwrap();

    broker.get("temperatureZone/1/status").await.unwrap();
    broker.get("temperatureZone/1/status").await.unwrap();

    let lines: Vec<Value> = std::fs::read_to_string(log.path())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["dir"], "req");
    assert_eq!(lines[0]["method"], "GET");
    assert_eq!(lines[1]["full"], true);
    assert_eq!(lines[3]["changes"], json!([]));
}
