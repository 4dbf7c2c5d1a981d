use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{DhwState, SystemMode, ZoneMode};
use crate::{Error, Result};

/// Timestamp format used for every `until` sent to the API.
pub const API_STRFTIME: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_until(until: DateTime<Utc>) -> String {
    until.format(API_STRFTIME).to_string()
}

/// A request body, checked before it is encoded and sent.
pub(crate) trait Command: Serialize + Sync {
    fn check(&self) -> Result<()> {
        Ok(())
    }
}

/// Body of `PUT temperatureZone/{id}/heatSetpoint`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatSetpointCommand {
    #[serde(rename = "SetpointMode")]
    pub setpoint_mode: ZoneMode,
    #[serde(rename = "HeatSetpointValue")]
    pub heat_setpoint_value: f64,
    #[serde(rename = "TimeUntil")]
    pub time_until: Option<String>,
}

impl HeatSetpointCommand {
    /// Hold `temperature` permanently, or until `until`.
    pub fn set_temperature(temperature: f64, until: Option<DateTime<Utc>>) -> Self {
        match until {
            None => Self {
                setpoint_mode: ZoneMode::PermanentOverride,
                heat_setpoint_value: temperature,
                time_until: None,
            },
            Some(t) => Self {
                setpoint_mode: ZoneMode::TemporaryOverride,
                heat_setpoint_value: temperature,
                time_until: Some(format_until(t)),
            },
        }
    }

    pub fn cancel_override() -> Self {
        Self {
            setpoint_mode: ZoneMode::FollowSchedule,
            heat_setpoint_value: 0.0,
            time_until: None,
        }
    }
}

impl Command for HeatSetpointCommand {
    fn check(&self) -> Result<()> {
        if !self.heat_setpoint_value.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "setpoint {} is not a finite number",
                self.heat_setpoint_value
            )));
        }
        Ok(())
    }
}

/// Body of `PUT domesticHotWater/{id}/state`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DhwStateCommand {
    #[serde(rename = "Mode")]
    pub mode: ZoneMode,
    /// Empty when following the schedule.
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "UntilTime")]
    pub until_time: Option<String>,
}

impl DhwStateCommand {
    pub fn set_state(state: DhwState, until: Option<DateTime<Utc>>) -> Self {
        let state = state.as_api_str().to_string();
        match until {
            None => Self {
                mode: ZoneMode::PermanentOverride,
                state,
                until_time: None,
            },
            Some(t) => Self {
                mode: ZoneMode::TemporaryOverride,
                state,
                until_time: Some(format_until(t)),
            },
        }
    }

    pub fn set_on(until: Option<DateTime<Utc>>) -> Self {
        Self::set_state(DhwState::On, until)
    }

    pub fn set_off(until: Option<DateTime<Utc>>) -> Self {
        Self::set_state(DhwState::Off, until)
    }

    pub fn set_auto() -> Self {
        Self {
            mode: ZoneMode::FollowSchedule,
            state: String::new(),
            until_time: None,
        }
    }
}

impl Command for DhwStateCommand {}

/// Body of `PUT temperatureControlSystem/{id}/mode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemModeCommand {
    pub system_mode: SystemMode,
    pub permanent: bool,
    pub time_until: Option<String>,
}

impl SystemModeCommand {
    /// Switch to `mode` permanently, or until `until`.
    pub fn set_mode(mode: SystemMode, until: Option<DateTime<Utc>>) -> Self {
        Self {
            system_mode: mode,
            permanent: until.is_none(),
            time_until: until.map(format_until),
        }
    }
}

impl Command for SystemModeCommand {}
