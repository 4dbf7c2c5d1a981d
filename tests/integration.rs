use std::sync::Arc;

use evohome_tcc::{Broker, ControlSystem, HttpBroker, ZoneContext, ZoneEntity};
use serde_json::Value;

/// Run with: cargo test --test integration -- --ignored
/// Requires a live account:
///   EVOHOME_ACCESS_TOKEN  bearer token from the vendor's OAuth endpoint
///   EVOHOME_USER_ID       account user id, used to discover installations
fn live_broker() -> Arc<HttpBroker> {
    let token = std::env::var("EVOHOME_ACCESS_TOKEN").expect("EVOHOME_ACCESS_TOKEN not set");
    let mut builder = HttpBroker::builder(token);
    if let Ok(url) = std::env::var("EVOHOME_BASE_URL") {
        builder = builder.base_url(url);
    }
    Arc::new(builder.build().expect("build broker"))
}

async fn first_control_system(broker: &Arc<HttpBroker>) -> ControlSystem {
    let user_id = std::env::var("EVOHOME_USER_ID").expect("EVOHOME_USER_ID not set");
    let installation = broker
        .get(&format!(
            "location/installationInfo?userId={user_id}&includeTemperatureControlSystems=True"
        ))
        .await
        .expect("installation info");

    let tcs: &Value = &installation[0]["gateways"][0]["temperatureControlSystems"][0];
    ControlSystem::new(&ZoneContext::new(broker.clone()), tcs).expect("control system config")
}

#[tokio::test]
#[ignore]
async fn refresh_and_read_schedules() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let broker = live_broker();
    let tcs = first_control_system(&broker).await;

    let temps = tcs.temperatures().await.expect("temperatures");
    assert!(!temps.is_empty(), "should have at least one zone");

    for zone in tcs.zones() {
        let schedule = zone
            .get_schedule()
            .await
            .unwrap_or_else(|e| panic!("schedule of {} failed: {e}", zone.name()));
        assert_eq!(schedule.daily_schedules.len(), 7);
    }
    if let Some(dhw) = tcs.hotwater() {
        dhw.get_schedule().await.expect("dhw schedule");
    }
}

#[tokio::test]
#[ignore]
async fn backup_schedules_to_file() {
    let broker = live_broker();
    let tcs = first_control_system(&broker).await;
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("backup.json");

    tcs.backup_schedules(&file).await.expect("backup");
    let backup: Value = serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
    assert_eq!(
        backup.as_object().unwrap().len(),
        tcs.zones().len() + usize::from(tcs.hotwater().is_some())
    );
}
