#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use evohome_tcc::{Broker, Error, Result, ZoneContext};
use serde_json::{Value, json};

pub const WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

/// In-memory broker: canned GET responses per path, every call recorded.
#[derive(Default)]
pub struct RecordingBroker {
    responses: Mutex<HashMap<String, Value>>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(path.to_string(), body);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == "PUT")
            .collect()
    }
}

#[async_trait]
impl Broker for RecordingBroker {
    async fn get(&self, path: &str) -> Result<Value> {
        self.calls.lock().unwrap().push(Call {
            method: "GET",
            path: path.to_string(),
            body: None,
        });
        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::Remote(format!("404 Not Found: {path}").into()))
    }

    async fn put(&self, path: &str, body: &Value) -> Result<Value> {
        self.calls.lock().unwrap().push(Call {
            method: "PUT",
            path: path.to_string(),
            body: Some(body.clone()),
        });
        Ok(json!([{"id": "840367013"}]))
    }
}

pub fn context(broker: &Arc<RecordingBroker>) -> ZoneContext {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    ZoneContext::new(broker.clone())
}

pub fn zone_config(id: &str, name: &str) -> Value {
    json!({
        "zoneId": id,
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
        "name": name,
        "zoneType": "RadiatorZone"
    })
}

pub fn dhw_config(id: &str) -> Value {
    json!({
        "dhwId": id,
        "dhwStateCapabilitiesResponse": {
            "allowedStates": ["On", "Off"],
            "allowedModes": ["FollowSchedule", "PermanentOverride", "TemporaryOverride"],
            "maxDuration": "1.00:00:00",
            "timingResolution": "00:10:00"
        },
        "scheduleCapabilitiesResponse": {
            "maxSwitchpointsPerDay": 6,
            "minSwitchpointsPerDay": 1,
            "timingResolution": "00:10:00"
        }
    })
}

pub fn tcs_config() -> Value {
    json!({
        "systemId": "3432522",
        "modelType": "EvoTouch",
        "allowedSystemModes": [
            {"systemMode": "Auto", "canBePermanent": true, "canBeTemporary": false},
            {
                "systemMode": "Away",
                "canBePermanent": true,
                "canBeTemporary": true,
                "maxDuration": "99.00:00:00",
                "timingResolution": "1.00:00:00",
                "timingMode": "Period"
            }
        ],
        "zones": [
            zone_config("3432521", "Lounge"),
            zone_config("3432576", "Kitchen"),
        ],
        "dhw": dhw_config("3933910")
    })
}

pub fn tcs_status() -> Value {
    json!({
        "systemId": "3432522",
        "zones": [zone_status("3432521"), zone_status("3432576")],
        "dhw": dhw_status("3933910"),
        "activeFaults": [
            {"faultType": "TempZoneActuatorLowBattery", "since": "2024-01-07T18:12:00"}
        ],
        "systemModeStatus": {"mode": "AutoWithEco", "isPermanent": true}
    })
}

pub fn zone_status(id: &str) -> Value {
    json!({
        "zoneId": id,
        "name": "Lounge",
        "temperatureStatus": {"temperature": 20.5, "isAvailable": true},
        "setpointStatus": {"targetHeatTemperature": 21.0, "setpointMode": "FollowSchedule"},
        "activeFaults": []
    })
}

pub fn dhw_status(id: &str) -> Value {
    json!({
        "dhwId": id,
        "temperatureStatus": {"temperature": 55.0, "isAvailable": true},
        "stateStatus": {"state": "On", "mode": "FollowSchedule"},
        "activeFaults": []
    })
}

/// A remote heating schedule; day `i` starts at `18 + i` degrees.
pub fn remote_zone_schedule() -> Value {
    let days: Vec<Value> = WEEK
        .iter()
        .enumerate()
        .map(|(i, day)| {
            json!({
                "dayOfWeek": day,
                "switchpoints": [
                    {"heatSetpoint": 18.0 + i as f64, "timeOfDay": "06:30:00"},
                    {"heatSetpoint": 16.0, "timeOfDay": "08:30:00"},
                    {"heatSetpoint": 15.0, "timeOfDay": "22:30:00"}
                ]
            })
        })
        .collect();
    json!({ "dailySchedules": days })
}

pub fn remote_dhw_schedule() -> Value {
    let days: Vec<Value> = WEEK
        .iter()
        .map(|day| {
            json!({
                "dayOfWeek": day,
                "switchpoints": [
                    {"dhwState": "On", "timeOfDay": "06:30:00"},
                    {"dhwState": "Off", "timeOfDay": "08:30:00"}
                ]
            })
        })
        .collect();
    json!({ "dailySchedules": days })
}
