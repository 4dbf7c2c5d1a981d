mod broker;
mod command;
mod controlsystem;
mod diff;
mod entity;
mod error;
mod hotwater;
mod logger;
pub mod schedule;
pub mod schema;
mod types;
mod zone;

pub use broker::{Broker, DEFAULT_BASE_URL, HttpBroker, HttpBrokerBuilder};
pub use command::{
    API_STRFTIME, DhwStateCommand, HeatSetpointCommand, SystemModeCommand, format_until,
};
pub use controlsystem::{ControlSystem, ZoneTemperature};
pub use entity::{ZoneContext, ZoneEntity};
pub use error::{Error, Result};
pub use hotwater::{DHW_NAME, HotWater};
pub use logger::MessageLogMode;
pub use schedule::{DailySchedule, Schedule, ScheduleInput, SetpointKey, Switchpoint};
pub use schema::{SchemaError, SchemaValidator, Shape, Validator};
pub use types::*;
pub use zone::HeatingZone;
