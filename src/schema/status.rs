use chrono::DateTime;
use serde::{Deserialize, Serialize};

use super::{Checked, Violation};
use crate::types::{DhwId, DhwState, SystemId, SystemMode, ZoneId, ZoneMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureStatus {
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl TemperatureStatus {
    /// Measured temperature, only when the sensor reports it as available.
    pub fn reading(&self) -> Option<f64> {
        if self.is_available {
            self.temperature
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetpointStatus {
    pub target_heat_temperature: f64,
    pub setpoint_mode: ZoneMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateStatus {
    pub state: DhwState,
    pub mode: ZoneMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFault {
    pub fault_type: String,
    pub since: String,
}

/// Latest operational state of a heating zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStatus {
    pub zone_id: ZoneId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_status: Option<TemperatureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint_status: Option<SetpointStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_faults: Option<Vec<ActiveFault>>,
}

/// Latest operational state of the hot water.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhwStatus {
    pub dhw_id: DhwId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature_status: Option<TemperatureStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_status: Option<StateStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_faults: Option<Vec<ActiveFault>>,
}

/// Mode of a temperature control system and how long it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemModeStatus {
    pub mode: SystemMode,
    pub is_permanent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_until: Option<String>,
}

/// Latest state of a temperature control system. The per-zone entries it
/// also carries are refreshed through each entity instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSystemStatus {
    pub system_id: SystemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_mode_status: Option<SystemModeStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_faults: Option<Vec<ActiveFault>>,
}

/// Status fields shared by both zone variants.
pub trait StatusFields {
    fn active_faults(&self) -> Option<&[ActiveFault]>;
    fn temperature_status(&self) -> Option<&TemperatureStatus>;
}

impl StatusFields for ZoneStatus {
    fn active_faults(&self) -> Option<&[ActiveFault]> {
        self.active_faults.as_deref()
    }

    fn temperature_status(&self) -> Option<&TemperatureStatus> {
        self.temperature_status.as_ref()
    }
}

impl StatusFields for DhwStatus {
    fn active_faults(&self) -> Option<&[ActiveFault]> {
        self.active_faults.as_deref()
    }

    fn temperature_status(&self) -> Option<&TemperatureStatus> {
        self.temperature_status.as_ref()
    }
}

fn check_temperature(ts: Option<&TemperatureStatus>) -> Checked {
    match ts {
        Some(t) if t.is_available && t.temperature.is_none() => Err(Violation::new(
            "temperatureStatus.temperature",
            "missing while isAvailable is true",
        )),
        _ => Ok(()),
    }
}

fn check_until(path: &str, mode: ZoneMode, until: Option<&str>) -> Checked {
    if mode == ZoneMode::TemporaryOverride && until.is_none() {
        return Err(Violation::new(path, "required for TemporaryOverride"));
    }
    Ok(())
}

impl ZoneStatus {
    pub(crate) fn check(&self) -> Checked {
        check_temperature(self.temperature_status.as_ref())?;
        if let Some(sp) = &self.setpoint_status {
            check_until("setpointStatus.until", sp.setpoint_mode, sp.until.as_deref())?;
        }
        Ok(())
    }
}

impl DhwStatus {
    pub(crate) fn check(&self) -> Checked {
        check_temperature(self.temperature_status.as_ref())?;
        if let Some(st) = &self.state_status {
            check_until("stateStatus.until", st.mode, st.until.as_deref())?;
        }
        Ok(())
    }
}

impl ControlSystemStatus {
    pub(crate) fn check(&self) -> Checked {
        if let Some(until) = self
            .system_mode_status
            .as_ref()
            .and_then(|m| m.time_until.as_deref())
            && DateTime::parse_from_rfc3339(until).is_err()
        {
            return Err(Violation::new(
                "systemModeStatus.timeUntil",
                format!("{until:?} is not a timestamp"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{SchemaValidator, Shape, Validator};
    use crate::types::ZoneKind;

    const ZONE: Shape = Shape::Status(ZoneKind::TemperatureZone);
    const DHW: Shape = Shape::Status(ZoneKind::DomesticHotWater);

    #[test]
    fn zone_status_with_optional_fields_absent() {
        let payload = json!({"zoneId": "3432576"});
        assert!(SchemaValidator.validate(ZONE, &payload).is_ok());
        let status: ZoneStatus = serde_json::from_value(payload).unwrap();
        assert!(status.active_faults.is_none());
        assert!(status.setpoint_status.is_none());
    }

    #[test]
    fn temporary_override_requires_until() {
        let payload = json!({
            "zoneId": "3432576",
            "setpointStatus": {"targetHeatTemperature": 21.0, "setpointMode": "TemporaryOverride"}
        });
        let err = SchemaValidator.validate(ZONE, &payload).unwrap_err();
        assert_eq!(err.path(), "setpointStatus.until");
    }

    #[test]
    fn available_temperature_requires_value() {
        let payload = json!({
            "dhwId": "3933910",
            "temperatureStatus": {"isAvailable": true}
        });
        let err = SchemaValidator.validate(DHW, &payload).unwrap_err();
        assert_eq!(err.path(), "temperatureStatus.temperature");
    }

    #[test]
    fn dhw_status_rejects_unknown_state() {
        let payload = json!({
            "dhwId": "3933910",
            "stateStatus": {"state": "Boost", "mode": "FollowSchedule"}
        });
        let err = SchemaValidator.validate(DHW, &payload).unwrap_err();
        assert_eq!(err.path(), "stateStatus.state");
    }

    #[test]
    fn control_system_status() {
        let shape = Shape::ControlSystemStatus;
        let payload = json!({
            "systemId": "3432522",
            "zones": [],
            "activeFaults": [],
            "systemModeStatus": {"mode": "Away", "isPermanent": false, "timeUntil": "2024-03-10T00:00:00Z"}
        });
        assert!(SchemaValidator.validate(shape, &payload).is_ok());

        let bad = json!({
            "systemId": "3432522",
            "systemModeStatus": {"mode": "Away", "isPermanent": false, "timeUntil": "tomorrow"}
        });
        let err = SchemaValidator.validate(shape, &bad).unwrap_err();
        assert_eq!(err.path(), "systemModeStatus.timeUntil");

        let unknown = json!({
            "systemId": "3432522",
            "systemModeStatus": {"mode": "Holiday", "isPermanent": true}
        });
        let err = SchemaValidator.validate(shape, &unknown).unwrap_err();
        assert_eq!(err.path(), "systemModeStatus.mode");
    }

    #[test]
    fn reading_respects_availability() {
        let ts = TemperatureStatus {
            is_available: false,
            temperature: Some(19.5),
        };
        assert_eq!(ts.reading(), None);
    }
}
