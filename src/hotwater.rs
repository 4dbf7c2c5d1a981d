use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::command::DhwStateCommand;
use crate::entity::{ZoneContext, ZoneCore, ZoneEntity};
use crate::schedule::{Schedule, ScheduleInput};
use crate::schema::{
    DhwConfig, DhwStateCapabilities, DhwStatus, ScheduleCapabilities, Shape, StateStatus,
};
use crate::types::{DhwId, DhwState, ZoneKind};
use crate::{Error, Result};

/// The API has no name for the hot water, so every installation uses this one.
pub const DHW_NAME: &str = "Domestic Hot Water";

/// The hot water subsystem (`domesticHotWater`).
pub struct HotWater {
    config: DhwConfig,
    core: ZoneCore<DhwStatus>,
}

impl HotWater {
    /// Build from the `dhw` discovery config. Fails with
    /// [`Error::ConfigIntegrity`] when `dhwId` is missing or empty.
    pub fn new(ctx: &ZoneContext, config: &Value) -> Result<Self> {
        let kind = ZoneKind::DomesticHotWater;
        let config: DhwConfig = ctx.accept_config(Shape::Config(kind), "dhwId", config)?;
        let core = ZoneCore::new(config.dhw_id.as_str(), kind, ctx);
        Ok(Self { config, core })
    }

    pub fn dhw_id(&self) -> &DhwId {
        &self.config.dhw_id
    }

    pub fn dhw_state_capabilities(&self) -> &DhwStateCapabilities {
        &self.config.dhw_state_capabilities
    }

    pub fn schedule_capabilities(&self) -> &ScheduleCapabilities {
        &self.config.schedule_capabilities
    }

    pub fn config(&self) -> &DhwConfig {
        &self.config
    }

    pub fn state_status(&self) -> Option<StateStatus> {
        self.core.status()?.state_status.clone()
    }

    pub fn state(&self) -> Option<DhwState> {
        self.state_status().map(|s| s.state)
    }

    pub async fn set_on(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        self.set_mode(&DhwStateCommand::set_on(until)).await
    }

    pub async fn set_off(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        self.set_mode(&DhwStateCommand::set_off(until)).await
    }

    /// Return to the schedule.
    pub async fn set_auto(&self) -> Result<()> {
        self.set_mode(&DhwStateCommand::set_auto()).await
    }

    /// Send a prebuilt command to `domesticHotWater/{id}/state`.
    pub async fn set_mode(&self, command: &DhwStateCommand) -> Result<()> {
        self.core.put_command(command).await
    }

    #[deprecated(note = "use ZoneEntity::get_schedule")]
    pub async fn schedule(&self) -> Result<Schedule> {
        Err(Error::Deprecated {
            operation: "HotWater::schedule",
            replacement: "get_schedule",
        })
    }

    #[deprecated(note = "use HotWater::set_on")]
    pub async fn set_dhw_on(&self, _until: Option<DateTime<Utc>>) -> Result<()> {
        Err(Error::Deprecated {
            operation: "HotWater::set_dhw_on",
            replacement: "set_on",
        })
    }

    #[deprecated(note = "use HotWater::set_off")]
    pub async fn set_dhw_off(&self, _until: Option<DateTime<Utc>>) -> Result<()> {
        Err(Error::Deprecated {
            operation: "HotWater::set_dhw_off",
            replacement: "set_off",
        })
    }

    #[deprecated(note = "use HotWater::set_auto")]
    pub async fn set_dhw_auto(&self) -> Result<()> {
        Err(Error::Deprecated {
            operation: "HotWater::set_dhw_auto",
            replacement: "set_auto",
        })
    }
}

#[async_trait]
impl ZoneEntity for HotWater {
    type Status = DhwStatus;

    fn id(&self) -> &str {
        self.config.dhw_id.as_str()
    }

    fn kind(&self) -> ZoneKind {
        ZoneKind::DomesticHotWater
    }

    fn name(&self) -> &str {
        DHW_NAME
    }

    async fn refresh(&self) -> Result<Arc<DhwStatus>> {
        self.core.refresh().await
    }

    fn status(&self) -> Option<Arc<DhwStatus>> {
        self.core.status()
    }

    async fn get_schedule(&self) -> Result<Schedule> {
        self.core.get_schedule().await
    }

    async fn set_schedule(&self, schedule: ScheduleInput) -> Result<()> {
        self.core.set_schedule(schedule).await
    }
}
