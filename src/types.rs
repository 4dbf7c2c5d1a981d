use std::fmt;

use serde::{Deserialize, Serialize};

/// Remote resource type of a zone entity, used as the first path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ZoneKind {
    TemperatureZone,
    DomesticHotWater,
}

impl ZoneKind {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ZoneKind::TemperatureZone => "temperatureZone",
            ZoneKind::DomesticHotWater => "domesticHotWater",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "temperatureZone" => Some(ZoneKind::TemperatureZone),
            "domesticHotWater" => Some(ZoneKind::DomesticHotWater),
            _ => None,
        }
    }

    /// Path segment that receives mode commands for this kind.
    pub fn command_segment(&self) -> &'static str {
        match self {
            ZoneKind::TemperatureZone => "heatSetpoint",
            ZoneKind::DomesticHotWater => "state",
        }
    }
}

impl fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

fn check_numeric_id(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("identifier is empty".to_string());
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("identifier {s:?} is not numeric"));
    }
    Ok(())
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = String;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                check_numeric_id(&s)?;
                Ok(Self(s))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = String;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::try_from(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

numeric_id!(
    /// Heating zone identifier (`zoneId`), a non-empty string of digits.
    ZoneId
);
numeric_id!(
    /// Hot water identifier (`dhwId`), a non-empty string of digits.
    DhwId
);
numeric_id!(
    /// Temperature control system identifier (`systemId`).
    SystemId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DhwState {
    On,
    Off,
}

impl DhwState {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            DhwState::On => "On",
            DhwState::Off => "Off",
        }
    }
}

/// Setpoint mode of a zone, or state mode of the hot water.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneMode {
    FollowSchedule,
    PermanentOverride,
    TemporaryOverride,
}

impl ZoneMode {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            ZoneMode::FollowSchedule => "FollowSchedule",
            ZoneMode::PermanentOverride => "PermanentOverride",
            ZoneMode::TemporaryOverride => "TemporaryOverride",
        }
    }
}

/// Operating mode of a temperature control system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemMode {
    Auto,
    AutoWithEco,
    /// Auto, with every zone and the hot water reset to their schedules.
    AutoWithReset,
    Away,
    Custom,
    DayOff,
    HeatingOff,
    Off,
    Heat,
    Cool,
}

impl SystemMode {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            SystemMode::Auto => "Auto",
            SystemMode::AutoWithEco => "AutoWithEco",
            SystemMode::AutoWithReset => "AutoWithReset",
            SystemMode::Away => "Away",
            SystemMode::Custom => "Custom",
            SystemMode::DayOff => "DayOff",
            SystemMode::HeatingOff => "HeatingOff",
            SystemMode::Off => "Off",
            SystemMode::Heat => "Heat",
            SystemMode::Cool => "Cool",
        }
    }
}

impl fmt::Display for SystemMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneModelType {
    HeatingZone,
    RoundModulation,
    RoundWireless,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneType {
    MixingValve,
    RadiatorZone,
    Thermostat,
    UnderfloorHeating,
    Unknown,
    ZoneTemperatureControl,
    ZoneValves,
}
