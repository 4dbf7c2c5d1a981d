//! Schedule codec.
//!
//! The API returns schedules with camelCase keys (`dailySchedules`,
//! `dayOfWeek: "Monday"`, `timeOfDay`, ...) but expects uploads in the
//! capitalized form (`DailySchedules`, `DayOfWeek: 0`, `TimeOfDay`, ...).
//! The heat setpoint is the exception: it goes back up as `heatSetpoint`,
//! or as `Temperature` when it arrived under the legacy `temperature` key.
//! [`decode`] renames the known keys structurally (object keys only, never
//! string values) and replaces each day name with its ordinal position.

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::Shape;
use crate::types::{DhwState, ZoneKind};
use crate::{Error, Result};

/// Keys the API sends in camelCase but which are used capitalized internally.
const CAPITALIZED_KEYS: &[(&str, &str)] = &[
    ("dailySchedules", "DailySchedules"),
    ("dayOfWeek", "DayOfWeek"),
    ("dhwState", "DhwState"),
    ("switchpoints", "Switchpoints"),
    ("temperature", "Temperature"),
    ("timeOfDay", "TimeOfDay"),
];

const DAILY_SCHEDULES: &str = "DailySchedules";
const DAY_OF_WEEK: &str = "DayOfWeek";

/// A week of switchpoints, Monday first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(rename = "DailySchedules")]
    pub daily_schedules: Vec<DailySchedule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySchedule {
    /// 0 = Monday .. 6 = Sunday.
    #[serde(rename = "DayOfWeek")]
    pub day_of_week: u8,
    #[serde(rename = "Switchpoints")]
    pub switchpoints: Vec<Switchpoint>,
}

/// A time of day paired with a heat setpoint (zones) or a state (hot water).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSwitchpoint", into = "WireSwitchpoint")]
pub struct Switchpoint {
    pub time_of_day: String,
    pub heat_setpoint: Option<f64>,
    /// The key the setpoint travels under, kept as received.
    pub setpoint_key: SetpointKey,
    pub dhw_state: Option<DhwState>,
}

/// Name of the heat setpoint field in the upload form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetpointKey {
    #[default]
    HeatSetpoint,
    /// Legacy `temperature` key, uploaded as `Temperature`.
    Temperature,
}

impl SetpointKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetpointKey::HeatSetpoint => "heatSetpoint",
            SetpointKey::Temperature => "Temperature",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct WireSwitchpoint {
    #[serde(rename = "TimeOfDay")]
    time_of_day: String,
    #[serde(
        rename = "heatSetpoint",
        alias = "HeatSetpoint",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    heat_setpoint: Option<f64>,
    #[serde(rename = "Temperature", default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "DhwState", default, skip_serializing_if = "Option::is_none")]
    dhw_state: Option<DhwState>,
}

impl From<WireSwitchpoint> for Switchpoint {
    fn from(wire: WireSwitchpoint) -> Self {
        let (heat_setpoint, setpoint_key) = match (wire.heat_setpoint, wire.temperature) {
            (None, Some(t)) => (Some(t), SetpointKey::Temperature),
            (sp, _) => (sp, SetpointKey::HeatSetpoint),
        };
        Self {
            time_of_day: wire.time_of_day,
            heat_setpoint,
            setpoint_key,
            dhw_state: wire.dhw_state,
        }
    }
}

impl From<Switchpoint> for WireSwitchpoint {
    fn from(sp: Switchpoint) -> Self {
        let (heat_setpoint, temperature) = match sp.setpoint_key {
            SetpointKey::HeatSetpoint => (sp.heat_setpoint, None),
            SetpointKey::Temperature => (None, sp.heat_setpoint),
        };
        Self {
            time_of_day: sp.time_of_day,
            heat_setpoint,
            temperature,
            dhw_state: sp.dhw_state,
        }
    }
}

impl Switchpoint {
    pub fn heat(time_of_day: impl Into<String>, setpoint: f64) -> Self {
        Self {
            time_of_day: time_of_day.into(),
            heat_setpoint: Some(setpoint),
            setpoint_key: SetpointKey::default(),
            dhw_state: None,
        }
    }

    pub fn dhw(time_of_day: impl Into<String>, state: DhwState) -> Self {
        Self {
            time_of_day: time_of_day.into(),
            heat_setpoint: None,
            setpoint_key: SetpointKey::default(),
            dhw_state: Some(state),
        }
    }
}

impl DailySchedule {
    pub fn weekday(&self) -> Option<Weekday> {
        Weekday::try_from(self.day_of_week).ok()
    }
}

impl Schedule {
    pub fn day(&self, weekday: Weekday) -> Option<&DailySchedule> {
        let ordinal = weekday.num_days_from_monday() as u8;
        self.daily_schedules
            .iter()
            .find(|d| d.day_of_week == ordinal)
    }

    pub fn switchpoint_count(&self) -> usize {
        self.daily_schedules
            .iter()
            .map(|d| d.switchpoints.len())
            .sum()
    }

    /// Serialize for upload. Fails on values JSON cannot carry.
    pub(crate) fn to_json(&self) -> Result<Value> {
        for day in &self.daily_schedules {
            for sp in &day.switchpoints {
                if let Some(v) = sp.heat_setpoint
                    && !v.is_finite()
                {
                    return Err(Error::InvalidSchedule(format!(
                        "day {} switchpoint {}: setpoint {v} is not a finite number",
                        day.day_of_week, sp.time_of_day
                    )));
                }
            }
        }
        serde_json::to_value(self).map_err(|e| Error::InvalidSchedule(e.to_string()))
    }
}

/// Accepted forms of a schedule to upload.
#[derive(Debug, Clone)]
pub enum ScheduleInput {
    Structured(Schedule),
    Json(Value),
    Text(String),
}

impl ScheduleInput {
    /// Resolve to a JSON body. Runs before any network I/O.
    pub(crate) fn into_json(self) -> Result<Value> {
        match self {
            ScheduleInput::Structured(schedule) => schedule.to_json(),
            ScheduleInput::Json(value) => Ok(value),
            ScheduleInput::Text(text) => {
                serde_json::from_str(&text).map_err(|e| Error::InvalidSchedule(e.to_string()))
            }
        }
    }
}

impl From<Schedule> for ScheduleInput {
    fn from(s: Schedule) -> Self {
        ScheduleInput::Structured(s)
    }
}

impl From<Value> for ScheduleInput {
    fn from(v: Value) -> Self {
        ScheduleInput::Json(v)
    }
}

impl From<String> for ScheduleInput {
    fn from(s: String) -> Self {
        ScheduleInput::Text(s)
    }
}

impl From<&str> for ScheduleInput {
    fn from(s: &str) -> Self {
        ScheduleInput::Text(s.to_string())
    }
}

/// Rename the known camelCase keys to their capitalized form, recursively.
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (capitalized(k), normalize_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        other => other,
    }
}

fn capitalized(key: String) -> String {
    CAPITALIZED_KEYS
        .iter()
        .find(|(from, _)| *from == key)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(key)
}

/// Convert a validated remote schedule into a [`Schedule`].
///
/// Entries are numbered in the order received (first = Monday), whatever
/// day names they carry.
pub fn decode(remote: Value, kind: ZoneKind) -> Result<Schedule> {
    let mut value = normalize_keys(remote);
    if let Some(Value::Array(days)) = value.get_mut(DAILY_SCHEDULES) {
        for (ordinal, day) in days.iter_mut().enumerate() {
            if let Value::Object(entry) = day {
                entry.insert(DAY_OF_WEEK.to_string(), Value::from(ordinal));
            }
        }
    }
    crate::schema::parse::<Schedule>(Shape::RemoteSchedule(kind), &value).map_err(Error::Schema)
}
