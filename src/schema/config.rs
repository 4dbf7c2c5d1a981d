use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Checked, Violation, check_duration, check_timing_resolution};
use crate::types::{
    DhwId, DhwState, SystemId, SystemMode, ZoneId, ZoneMode, ZoneModelType, ZoneType,
};

/// Discovery config of a heating zone. Immutable once the zone is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    pub zone_id: ZoneId,
    pub model_type: ZoneModelType,
    pub name: String,
    pub setpoint_capabilities: SetpointCapabilities,
    pub schedule_capabilities: ScheduleCapabilities,
    pub zone_type: ZoneType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetpointCapabilities {
    pub max_heat_setpoint: f64,
    pub min_heat_setpoint: f64,
    pub value_resolution: f64,
    pub can_control_heat: bool,
    pub can_control_cool: bool,
    pub allowed_setpoint_modes: Vec<ZoneMode>,
    pub max_duration: String,
    pub timing_resolution: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCapabilities {
    pub max_switchpoints_per_day: u32,
    pub min_switchpoints_per_day: u32,
    pub timing_resolution: String,
    /// Present for heating zones only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setpoint_value_resolution: Option<f64>,
}

/// Discovery config of the hot water subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhwConfig {
    pub dhw_id: DhwId,
    #[serde(rename = "dhwStateCapabilitiesResponse")]
    pub dhw_state_capabilities: DhwStateCapabilities,
    #[serde(rename = "scheduleCapabilitiesResponse")]
    pub schedule_capabilities: ScheduleCapabilities,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhwStateCapabilities {
    pub allowed_states: Vec<DhwState>,
    pub allowed_modes: Vec<ZoneMode>,
    pub max_duration: String,
    pub timing_resolution: String,
}

/// Config of a temperature control system. Zones and hot water stay raw so
/// each entity validates its own slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlSystemConfig {
    pub system_id: SystemId,
    pub model_type: String,
    #[serde(default)]
    pub allowed_system_modes: Vec<AllowedSystemMode>,
    pub zones: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhw: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedSystemMode {
    pub system_mode: SystemMode,
    pub can_be_permanent: bool,
    pub can_be_temporary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_resolution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing_mode: Option<String>,
}

impl ZoneConfig {
    pub(crate) fn check(&self) -> Checked {
        self.setpoint_capabilities.check("setpointCapabilities")?;
        self.schedule_capabilities.check("scheduleCapabilities")?;
        if self.schedule_capabilities.setpoint_value_resolution.is_none() {
            return Err(Violation::new(
                "scheduleCapabilities.setpointValueResolution",
                "missing field",
            ));
        }
        Ok(())
    }
}

impl SetpointCapabilities {
    fn check(&self, at: &str) -> Checked {
        if self.min_heat_setpoint > self.max_heat_setpoint {
            return Err(Violation::new(
                format!("{at}.minHeatSetpoint"),
                format!(
                    "{} exceeds maxHeatSetpoint {}",
                    self.min_heat_setpoint, self.max_heat_setpoint
                ),
            ));
        }
        if self.value_resolution <= 0.0 {
            return Err(Violation::new(
                format!("{at}.valueResolution"),
                "must be positive",
            ));
        }
        check_duration(&format!("{at}.maxDuration"), &self.max_duration)?;
        check_timing_resolution(&format!("{at}.timingResolution"), &self.timing_resolution)
    }
}

impl ScheduleCapabilities {
    fn check(&self, at: &str) -> Checked {
        if self.min_switchpoints_per_day > self.max_switchpoints_per_day {
            return Err(Violation::new(
                format!("{at}.minSwitchpointsPerDay"),
                format!(
                    "{} exceeds maxSwitchpointsPerDay {}",
                    self.min_switchpoints_per_day, self.max_switchpoints_per_day
                ),
            ));
        }
        check_timing_resolution(&format!("{at}.timingResolution"), &self.timing_resolution)
    }
}

impl DhwConfig {
    pub(crate) fn check(&self) -> Checked {
        let caps = &self.dhw_state_capabilities;
        if caps.allowed_states.is_empty() {
            return Err(Violation::new(
                "dhwStateCapabilitiesResponse.allowedStates",
                "must not be empty",
            ));
        }
        check_duration(
            "dhwStateCapabilitiesResponse.maxDuration",
            &caps.max_duration,
        )?;
        check_timing_resolution(
            "dhwStateCapabilitiesResponse.timingResolution",
            &caps.timing_resolution,
        )?;
        self.schedule_capabilities
            .check("scheduleCapabilitiesResponse")
    }
}

impl ControlSystemConfig {
    pub(crate) fn check(&self) -> Checked {
        for (i, mode) in self.allowed_system_modes.iter().enumerate() {
            if let Some(d) = &mode.max_duration {
                check_duration(&format!("allowedSystemModes[{i}].maxDuration"), d)?;
            }
        }
        if self.zones.is_empty() || self.zones.len() > 12 {
            return Err(Violation::new(
                "zones",
                format!("expected 1 to 12 zones, found {}", self.zones.len()),
            ));
        }
        Ok(())
    }
}
