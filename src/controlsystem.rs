use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::command::{Command, SystemModeCommand};
use crate::entity::{ZoneContext, ZoneEntity};
use crate::hotwater::HotWater;
use crate::schedule::{Schedule, ScheduleInput};
use crate::schema::{
    self, ActiveFault, AllowedSystemMode, ControlSystemConfig, ControlSystemStatus, Shape,
    SystemModeStatus,
};
use crate::types::{SystemId, SystemMode, ZoneKind};
use crate::zone::HeatingZone;
use crate::{Error, Result};

/// One line of [`ControlSystem::temperatures`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneTemperature {
    pub kind: ZoneKind,
    pub id: String,
    pub name: String,
    /// Target temperature; always `None` for hot water.
    pub setpoint: Option<f64>,
    pub temperature: Option<f64>,
}

/// A backed-up schedule, keyed by entity id in the backup file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BackupEntry {
    name: String,
    schedule: Value,
}

/// A temperature control system with its zones and optional hot water.
pub struct ControlSystem {
    system_id: SystemId,
    model_type: String,
    allowed_system_modes: Vec<AllowedSystemMode>,
    zones: Vec<HeatingZone>,
    hotwater: Option<HotWater>,
    ctx: ZoneContext,
    status: RwLock<Option<Arc<ControlSystemStatus>>>,
}

impl ControlSystem {
    /// Build from a `temperatureControlSystem` config, creating every zone
    /// and the hot water it lists.
    pub fn new(ctx: &ZoneContext, config: &Value) -> Result<Self> {
        let config: ControlSystemConfig =
            ctx.accept_config(Shape::ControlSystemConfig, "systemId", config)?;

        let zones = config
            .zones
            .iter()
            .map(|z| HeatingZone::new(ctx, z))
            .collect::<Result<Vec<_>>>()?;
        let hotwater = config
            .dhw
            .as_ref()
            .map(|d| HotWater::new(ctx, d))
            .transpose()?;

        debug!(
            system = %config.system_id,
            zones = zones.len(),
            hotwater = hotwater.is_some(),
            "built control system"
        );
        Ok(Self {
            system_id: config.system_id,
            model_type: config.model_type,
            allowed_system_modes: config.allowed_system_modes,
            zones,
            hotwater,
            ctx: ctx.clone(),
            status: RwLock::new(None),
        })
    }

    pub fn system_id(&self) -> &SystemId {
        &self.system_id
    }

    pub fn model_type(&self) -> &str {
        &self.model_type
    }

    pub fn allowed_system_modes(&self) -> &[AllowedSystemMode] {
        &self.allowed_system_modes
    }

    pub fn zones(&self) -> &[HeatingZone] {
        &self.zones
    }

    pub fn hotwater(&self) -> Option<&HotWater> {
        self.hotwater.as_ref()
    }

    pub fn zone_by_id(&self, id: &str) -> Option<&HeatingZone> {
        self.zones.iter().find(|z| z.id() == id)
    }

    /// First zone with this name. Names are not guaranteed unique.
    pub fn zone_by_name(&self, name: &str) -> Option<&HeatingZone> {
        self.zones.iter().find(|z| z.name() == name)
    }

    fn path(&self, leaf: &str) -> String {
        format!("temperatureControlSystem/{}/{leaf}", self.system_id)
    }

    /// Refresh the system's own status, then every zone, then the hot water.
    pub async fn refresh_status(&self) -> Result<()> {
        let path = self.path("status");
        debug!(system = %self.system_id, path = %path, "refreshing status");

        let payload = self.ctx.broker.get(&path).await?;
        let shape = Shape::ControlSystemStatus;
        self.ctx.validate(shape, &payload)?;
        let status = Arc::new(schema::parse::<ControlSystemStatus>(shape, &payload)?);
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = Some(status);

        for zone in &self.zones {
            zone.refresh().await?;
        }
        if let Some(dhw) = &self.hotwater {
            dhw.refresh().await?;
        }
        Ok(())
    }

    /// Latest system status, `None` before the first refresh.
    pub fn status(&self) -> Option<Arc<ControlSystemStatus>> {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn system_mode_status(&self) -> Option<SystemModeStatus> {
        self.status()?.system_mode_status.clone()
    }

    pub fn active_faults(&self) -> Option<Vec<ActiveFault>> {
        self.status()?.active_faults.clone()
    }

    pub fn system_mode(&self) -> Option<SystemMode> {
        Some(self.status()?.system_mode_status.as_ref()?.mode)
    }

    /// Switch the system to `mode`, permanently or until `until`. Modes
    /// missing from the config's `allowedSystemModes` are refused locally.
    pub async fn set_mode(&self, mode: SystemMode, until: Option<DateTime<Utc>>) -> Result<()> {
        if !self.allowed_system_modes.iter().any(|m| m.system_mode == mode) {
            return Err(Error::InvalidParameter(format!(
                "system {} does not support mode {mode}",
                self.system_id
            )));
        }
        let command = SystemModeCommand::set_mode(mode, until);
        command.check()?;
        let body = serde_json::to_value(&command)
            .map_err(|e| Error::Protocol(format!("cannot encode command: {e}")))?;

        let path = self.path("mode");
        info!(system = %self.system_id, %mode, permanent = command.permanent, "setting mode");
        self.ctx.broker.put(&path, &body).await?;
        Ok(())
    }

    /// Auto, with every zone and the hot water returned to their schedules.
    pub async fn reset_mode(&self) -> Result<()> {
        self.set_mode(SystemMode::AutoWithReset, None).await
    }

    pub async fn set_auto(&self) -> Result<()> {
        self.set_mode(SystemMode::Auto, None).await
    }

    pub async fn set_away(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        self.set_mode(SystemMode::Away, until).await
    }

    pub async fn set_custom(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        self.set_mode(SystemMode::Custom, until).await
    }

    pub async fn set_dayoff(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        self.set_mode(SystemMode::DayOff, until).await
    }

    pub async fn set_eco(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        self.set_mode(SystemMode::AutoWithEco, until).await
    }

    pub async fn set_heatingoff(&self, until: Option<DateTime<Utc>>) -> Result<()> {
        self.set_mode(SystemMode::HeatingOff, until).await
    }

    /// Refresh everything and report the latest readings, hot water first.
    pub async fn temperatures(&self) -> Result<Vec<ZoneTemperature>> {
        self.refresh_status().await?;

        let mut result = Vec::with_capacity(self.zones.len() + 1);
        if let Some(dhw) = &self.hotwater {
            result.push(ZoneTemperature {
                kind: dhw.kind(),
                id: dhw.id().to_string(),
                name: dhw.name().to_string(),
                setpoint: None,
                temperature: dhw.temperature(),
            });
        }
        for zone in &self.zones {
            result.push(ZoneTemperature {
                kind: zone.kind(),
                id: zone.id().to_string(),
                name: zone.name().to_string(),
                setpoint: zone.target_heat_temperature(),
                temperature: zone.temperature(),
            });
        }
        Ok(result)
    }

    /// Write every schedule to `path` as `{id: {name, schedule}}`.
    pub async fn backup_schedules(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        info!(system = %self.system_id, path = %path.display(), "backing up schedules");

        let mut entries = BTreeMap::new();
        for zone in &self.zones {
            let schedule = zone.get_schedule().await?;
            entries.insert(zone.id().to_string(), backup_entry(zone.name(), schedule)?);
        }
        if let Some(dhw) = &self.hotwater {
            let schedule = dhw.get_schedule().await?;
            entries.insert(dhw.id().to_string(), backup_entry(dhw.name(), schedule)?);
        }

        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| Error::InvalidSchedule(e.to_string()))?;
        std::fs::write(path, json)?;

        info!(count = entries.len(), "backup completed");
        Ok(())
    }

    /// Upload the schedules in a backup file, matched to entities by id or
    /// by name. Returns `false` if any entry matched nothing; those entries
    /// are skipped.
    pub async fn restore_schedules(
        &self,
        path: impl AsRef<Path>,
        match_by_name: bool,
    ) -> Result<bool> {
        let path = path.as_ref();
        let by = if match_by_name { "name" } else { "id" };
        info!(system = %self.system_id, path = %path.display(), by, "restoring schedules");

        let text = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, BackupEntry> =
            serde_json::from_str(&text).map_err(|e| Error::InvalidSchedule(e.to_string()))?;

        let mut all_matched = true;
        for (id, entry) in entries {
            let schedule = ScheduleInput::Text(entry.schedule.to_string());
            let dhw = self.hotwater.as_ref().filter(|d| {
                if match_by_name {
                    d.name() == entry.name
                } else {
                    d.id() == id
                }
            });
            let zone = if match_by_name {
                self.zone_by_name(&entry.name)
            } else {
                self.zone_by_id(&id)
            };

            if let Some(dhw) = dhw {
                dhw.set_schedule(schedule).await?;
            } else if let Some(zone) = zone {
                zone.set_schedule(schedule).await?;
            } else {
                warn!(
                    id = %id,
                    name = %entry.name,
                    "ignoring schedule: no entity with this {by}"
                );
                all_matched = false;
            }
        }

        info!(all_matched, "restore completed");
        Ok(all_matched)
    }

    #[deprecated(note = "use ControlSystem::reset_mode")]
    pub async fn set_status_reset(&self) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::set_status_reset",
            replacement: "reset_mode",
        })
    }

    #[deprecated(note = "use ControlSystem::set_mode")]
    pub async fn set_status(
        &self,
        _mode: SystemMode,
        _until: Option<DateTime<Utc>>,
    ) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::set_status",
            replacement: "set_mode",
        })
    }

    #[deprecated(note = "use ControlSystem::set_auto")]
    pub async fn set_status_normal(&self) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::set_status_normal",
            replacement: "set_auto",
        })
    }

    #[deprecated(note = "use ControlSystem::set_away")]
    pub async fn set_status_away(&self, _until: Option<DateTime<Utc>>) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::set_status_away",
            replacement: "set_away",
        })
    }

    #[deprecated(note = "use ControlSystem::set_custom")]
    pub async fn set_status_custom(&self, _until: Option<DateTime<Utc>>) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::set_status_custom",
            replacement: "set_custom",
        })
    }

    #[deprecated(note = "use ControlSystem::set_dayoff")]
    pub async fn set_status_dayoff(&self, _until: Option<DateTime<Utc>>) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::set_status_dayoff",
            replacement: "set_dayoff",
        })
    }

    #[deprecated(note = "use ControlSystem::set_eco")]
    pub async fn set_status_eco(&self, _until: Option<DateTime<Utc>>) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::set_status_eco",
            replacement: "set_eco",
        })
    }

    #[deprecated(note = "use ControlSystem::set_heatingoff")]
    pub async fn set_status_heatingoff(&self, _until: Option<DateTime<Utc>>) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::set_status_heatingoff",
            replacement: "set_heatingoff",
        })
    }

    #[deprecated(note = "use ControlSystem::backup_schedules")]
    pub async fn zone_schedules_backup(&self, _path: impl AsRef<Path>) -> Result<()> {
        Err(Error::Deprecated {
            operation: "ControlSystem::zone_schedules_backup",
            replacement: "backup_schedules",
        })
    }

    #[deprecated(note = "use ControlSystem::restore_schedules")]
    pub async fn zone_schedules_restore(&self, _path: impl AsRef<Path>) -> Result<bool> {
        Err(Error::Deprecated {
            operation: "ControlSystem::zone_schedules_restore",
            replacement: "restore_schedules",
        })
    }
}

fn backup_entry(name: &str, schedule: Schedule) -> Result<BackupEntry> {
    Ok(BackupEntry {
        name: name.to_string(),
        schedule: schedule.to_json()?,
    })
}
