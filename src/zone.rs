use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::command::HeatSetpointCommand;
use crate::entity::{ZoneContext, ZoneCore, ZoneEntity};
use crate::schedule::{Schedule, ScheduleInput};
use crate::schema::{
    ScheduleCapabilities, SetpointCapabilities, SetpointStatus, Shape, ZoneConfig, ZoneStatus,
};
use crate::types::{ZoneId, ZoneKind, ZoneModelType, ZoneType};
use crate::{Error, Result};

/// A heating zone (`temperatureZone`).
pub struct HeatingZone {
    config: ZoneConfig,
    core: ZoneCore<ZoneStatus>,
}

impl HeatingZone {
    /// Build from the zone's discovery config. Fails with
    /// [`Error::ConfigIntegrity`] when `zoneId` is missing or empty.
    pub fn new(ctx: &ZoneContext, config: &Value) -> Result<Self> {
        let kind = ZoneKind::TemperatureZone;
        let config: ZoneConfig = ctx.accept_config(Shape::Config(kind), "zoneId", config)?;
        let core = ZoneCore::new(config.zone_id.as_str(), kind, ctx);
        Ok(Self { config, core })
    }

    pub fn zone_id(&self) -> &ZoneId {
        &self.config.zone_id
    }

    pub fn model_type(&self) -> ZoneModelType {
        self.config.model_type
    }

    pub fn zone_type(&self) -> ZoneType {
        self.config.zone_type
    }

    pub fn setpoint_capabilities(&self) -> &SetpointCapabilities {
        &self.config.setpoint_capabilities
    }

    pub fn schedule_capabilities(&self) -> &ScheduleCapabilities {
        &self.config.schedule_capabilities
    }

    pub fn config(&self) -> &ZoneConfig {
        &self.config
    }

    pub fn setpoint_status(&self) -> Option<SetpointStatus> {
        self.core.status()?.setpoint_status.clone()
    }

    /// Target temperature from the latest status.
    pub fn target_heat_temperature(&self) -> Option<f64> {
        self.setpoint_status().map(|s| s.target_heat_temperature)
    }

    /// Hold `temperature` until `until`, or indefinitely when `until` is `None`.
    pub async fn set_temperature(
        &self,
        temperature: f64,
        until: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.set_mode(&HeatSetpointCommand::set_temperature(temperature, until))
            .await
    }

    /// Return to the schedule.
    pub async fn cancel_override(&self) -> Result<()> {
        self.set_mode(&HeatSetpointCommand::cancel_override()).await
    }

    /// Send a prebuilt command to `temperatureZone/{id}/heatSetpoint`.
    pub async fn set_mode(&self, command: &HeatSetpointCommand) -> Result<()> {
        self.core.put_command(command).await
    }

    #[deprecated(note = "use ZoneEntity::get_schedule")]
    pub async fn schedule(&self) -> Result<Schedule> {
        Err(Error::Deprecated {
            operation: "HeatingZone::schedule",
            replacement: "get_schedule",
        })
    }

    #[deprecated(note = "use HeatingZone::cancel_override")]
    pub async fn cancel_temp_override(&self) -> Result<()> {
        Err(Error::Deprecated {
            operation: "HeatingZone::cancel_temp_override",
            replacement: "cancel_override",
        })
    }
}

#[async_trait]
impl ZoneEntity for HeatingZone {
    type Status = ZoneStatus;

    fn id(&self) -> &str {
        self.config.zone_id.as_str()
    }

    fn kind(&self) -> ZoneKind {
        ZoneKind::TemperatureZone
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    async fn refresh(&self) -> Result<Arc<ZoneStatus>> {
        self.core.refresh().await
    }

    fn status(&self) -> Option<Arc<ZoneStatus>> {
        self.core.status()
    }

    async fn get_schedule(&self) -> Result<Schedule> {
        self.core.get_schedule().await
    }

    async fn set_schedule(&self, schedule: ScheduleInput) -> Result<()> {
        self.core.set_schedule(schedule).await
    }
}
