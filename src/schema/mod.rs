//! Payload shapes and the validator applied at every trust boundary.
//!
//! Inbound payloads (config, status, schedules) and outbound schedule uploads
//! are checked against a [`Shape`] before they are accepted or sent. The
//! default [`SchemaValidator`] deserializes into the typed shape and then
//! applies value constraints (id patterns, ranges, fixed time formats). Any
//! other [`Validator`] can be plugged in through
//! [`ZoneContext::with_validator`](crate::ZoneContext::with_validator), on
//! top of the typed deserialization that always follows it.

mod config;
mod schedule;
mod status;

use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::schedule::Schedule;
use crate::types::ZoneKind;

pub use config::{
    AllowedSystemMode, ControlSystemConfig, DhwConfig, DhwStateCapabilities,
    ScheduleCapabilities, SetpointCapabilities, ZoneConfig,
};
pub(crate) use schedule::RemoteSchedule;
pub use status::{
    ActiveFault, ControlSystemStatus, DhwStatus, SetpointStatus, StateStatus, StatusFields,
    SystemModeStatus, TemperatureStatus, ZoneStatus,
};

pub const MIN_HEAT_SETPOINT: f64 = 5.0;
pub const MAX_HEAT_SETPOINT: f64 = 35.0;

/// A payload contract known to the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Config(ZoneKind),
    Status(ZoneKind),
    /// Schedule as returned by the API (`dailySchedules`, weekday names).
    RemoteSchedule(ZoneKind),
    /// Schedule as uploaded (`DailySchedules`, ordinal `DayOfWeek`).
    UploadSchedule(ZoneKind),
    ControlSystemConfig,
    ControlSystemStatus,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Config(kind) => write!(f, "{kind} config"),
            Shape::Status(kind) => write!(f, "{kind} status"),
            Shape::RemoteSchedule(kind) => write!(f, "{kind} schedule"),
            Shape::UploadSchedule(kind) => write!(f, "{kind} schedule upload"),
            Shape::ControlSystemConfig => f.write_str("temperatureControlSystem config"),
            Shape::ControlSystemStatus => f.write_str("temperatureControlSystem status"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaError {
    shape: Shape,
    path: String,
    message: String,
}

impl SchemaError {
    pub fn new(shape: Shape, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            shape,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Dotted JSON path of the offending field, empty for the document root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.shape, self.message)
        } else {
            write!(f, "{} at {}: {}", self.shape, self.path, self.message)
        }
    }
}

impl std::error::Error for SchemaError {}

/// Checks a payload against a [`Shape`] before it is accepted or sent.
///
/// Entities still deserialize an accepted payload into its typed shape, so a
/// replacement validator can add constraints but cannot admit a payload the
/// typed shape rejects; such a payload fails with a [`SchemaError`] from that
/// deserialization step.
pub trait Validator: Send + Sync {
    fn validate(&self, shape: Shape, payload: &Value) -> Result<(), SchemaError>;
}

/// Structural validator backed by the typed shapes in this module.
#[derive(Debug, Default, Clone, Copy)]
pub struct SchemaValidator;

impl Validator for SchemaValidator {
    fn validate(&self, shape: Shape, payload: &Value) -> Result<(), SchemaError> {
        let checked = match shape {
            Shape::Config(ZoneKind::TemperatureZone) => {
                parse::<ZoneConfig>(shape, payload)?.check()
            }
            Shape::Config(ZoneKind::DomesticHotWater) => {
                parse::<DhwConfig>(shape, payload)?.check()
            }
            Shape::Status(ZoneKind::TemperatureZone) => {
                parse::<ZoneStatus>(shape, payload)?.check()
            }
            Shape::Status(ZoneKind::DomesticHotWater) => {
                parse::<DhwStatus>(shape, payload)?.check()
            }
            Shape::RemoteSchedule(kind) => parse::<RemoteSchedule>(shape, payload)?.check(kind),
            Shape::UploadSchedule(kind) => {
                schedule::check_upload(&parse::<Schedule>(shape, payload)?, kind)
            }
            Shape::ControlSystemConfig => parse::<ControlSystemConfig>(shape, payload)?.check(),
            Shape::ControlSystemStatus => parse::<ControlSystemStatus>(shape, payload)?.check(),
        };
        checked.map_err(|v| SchemaError::new(shape, v.path, v.message))
    }
}

/// Deserialize `payload` into `T`, reporting the failing field path.
pub(crate) fn parse<T: DeserializeOwned>(shape: Shape, payload: &Value) -> Result<T, SchemaError> {
    serde_path_to_error::deserialize(payload).map_err(|e| {
        let path = e.path().to_string();
        let path = if path == "." { String::new() } else { path };
        SchemaError::new(shape, path, e.inner().to_string())
    })
}

/// A value constraint broken inside an otherwise well-typed payload.
#[derive(Debug)]
pub(crate) struct Violation {
    path: String,
    message: String,
}

impl Violation {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub(crate) type Checked = Result<(), Violation>;

/// `HH:MM:SS`, as used by switchpoints.
pub(crate) fn check_time_of_day(path: &str, s: &str) -> Checked {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .map(|_| ())
        .map_err(|_| Violation::new(path, format!("{s:?} is not a HH:MM:SS time of day")))
}

/// `00:MM:00`, a whole number of minutes under one hour.
pub(crate) fn check_timing_resolution(path: &str, s: &str) -> Checked {
    match NaiveTime::parse_from_str(s, "%H:%M:%S") {
        Ok(t) if t.hour() == 0 && t.second() == 0 && t.minute() > 0 => Ok(()),
        _ => Err(Violation::new(
            path,
            format!("{s:?} is not a 00:MM:00 timing resolution"),
        )),
    }
}

/// `[d.]hh:mm:ss`, e.g. `1.00:00:00` or `99.00:00:00`.
pub(crate) fn check_duration(path: &str, s: &str) -> Checked {
    let (days, clock) = match s.split_once('.') {
        Some((days, clock)) => (Some(days), clock),
        None => (None, s),
    };
    let days_ok = days.is_none_or(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()));
    if days_ok && NaiveTime::parse_from_str(clock, "%H:%M:%S").is_ok() {
        Ok(())
    } else {
        Err(Violation::new(path, format!("{s:?} is not a d.hh:mm:ss duration")))
    }
}
