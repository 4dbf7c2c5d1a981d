use chrono::Weekday;
use serde::Deserialize;

use super::{Checked, MAX_HEAT_SETPOINT, MIN_HEAT_SETPOINT, Violation, check_time_of_day};
use crate::schedule::Schedule;
use crate::types::{DhwState, ZoneKind};

const DAYS_PER_WEEK: usize = 7;

/// Schedule exactly as the API returns it: camelCase keys, weekday names.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RemoteSchedule {
    daily_schedules: Vec<RemoteDailySchedule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteDailySchedule {
    day_of_week: String,
    switchpoints: Vec<RemoteSwitchpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteSwitchpoint {
    time_of_day: String,
    #[serde(default)]
    heat_setpoint: Option<f64>,
    /// Older firmware sends the setpoint as `temperature`.
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    dhw_state: Option<DhwState>,
}

impl RemoteSwitchpoint {
    /// The setpoint and the key it arrived under.
    fn setpoint(&self) -> (&'static str, Option<f64>) {
        match (self.heat_setpoint, self.temperature) {
            (None, Some(t)) => ("temperature", Some(t)),
            (sp, _) => ("heatSetpoint", sp),
        }
    }
}

impl RemoteSchedule {
    pub(crate) fn check(&self, kind: ZoneKind) -> Checked {
        check_week_len("dailySchedules", self.daily_schedules.len())?;
        for (i, day) in self.daily_schedules.iter().enumerate() {
            let at = format!("dailySchedules[{i}]");
            if day.day_of_week.parse::<Weekday>().is_err() {
                return Err(Violation::new(
                    format!("{at}.dayOfWeek"),
                    format!("{:?} is not a day name", day.day_of_week),
                ));
            }
            for (j, sp) in day.switchpoints.iter().enumerate() {
                let (setpoint_key, setpoint) = sp.setpoint();
                check_switchpoint(
                    &format!("{at}.switchpoints[{j}]"),
                    ["timeOfDay", setpoint_key, "dhwState"],
                    kind,
                    &sp.time_of_day,
                    setpoint,
                    sp.dhw_state,
                )?;
            }
        }
        Ok(())
    }
}

/// Constraints on a schedule about to be uploaded.
pub(crate) fn check_upload(schedule: &Schedule, kind: ZoneKind) -> Checked {
    check_week_len("DailySchedules", schedule.daily_schedules.len())?;
    let mut seen = [false; DAYS_PER_WEEK];
    for (i, day) in schedule.daily_schedules.iter().enumerate() {
        let at = format!("DailySchedules[{i}]");
        let ordinal = day.day_of_week as usize;
        if ordinal >= DAYS_PER_WEEK {
            return Err(Violation::new(
                format!("{at}.DayOfWeek"),
                format!("{ordinal} is not an ordinal in 0..=6"),
            ));
        }
        if std::mem::replace(&mut seen[ordinal], true) {
            return Err(Violation::new(
                format!("{at}.DayOfWeek"),
                format!("day {ordinal} appears more than once"),
            ));
        }
        for (j, sp) in day.switchpoints.iter().enumerate() {
            check_switchpoint(
                &format!("{at}.Switchpoints[{j}]"),
                ["TimeOfDay", sp.setpoint_key.as_str(), "DhwState"],
                kind,
                &sp.time_of_day,
                sp.heat_setpoint,
                sp.dhw_state,
            )?;
        }
    }
    Ok(())
}

fn check_week_len(path: &str, len: usize) -> Checked {
    if len != DAYS_PER_WEEK {
        return Err(Violation::new(
            path,
            format!("expected {DAYS_PER_WEEK} daily schedules, found {len}"),
        ));
    }
    Ok(())
}

/// `keys` names the time, setpoint and state fields in the payload's casing.
fn check_switchpoint(
    at: &str,
    keys: [&str; 3],
    kind: ZoneKind,
    time_of_day: &str,
    heat_setpoint: Option<f64>,
    dhw_state: Option<DhwState>,
) -> Checked {
    let [time_key, setpoint_key, state_key] = keys;
    check_time_of_day(&format!("{at}.{time_key}"), time_of_day)?;
    match kind {
        ZoneKind::TemperatureZone => {
            let value = heat_setpoint
                .ok_or_else(|| Violation::new(format!("{at}.{setpoint_key}"), "missing field"))?;
            if !(MIN_HEAT_SETPOINT..=MAX_HEAT_SETPOINT).contains(&value) {
                return Err(Violation::new(
                    format!("{at}.{setpoint_key}"),
                    format!("{value} outside {MIN_HEAT_SETPOINT}..={MAX_HEAT_SETPOINT}"),
                ));
            }
            if dhw_state.is_some() {
                return Err(Violation::new(
                    format!("{at}.{state_key}"),
                    "not valid for a heating zone",
                ));
            }
        }
        ZoneKind::DomesticHotWater => {
            if dhw_state.is_none() {
                return Err(Violation::new(format!("{at}.{state_key}"), "missing field"));
            }
            if heat_setpoint.is_some() {
                return Err(Violation::new(
                    format!("{at}.{setpoint_key}"),
                    "not valid for hot water",
                ));
            }
        }
    }
    Ok(())
}
