use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};

use crate::broker::Broker;
use crate::command::Command;
use crate::schedule::{self, Schedule, ScheduleInput};
use crate::schema::{
    self, ActiveFault, SchemaValidator, Shape, StatusFields, TemperatureStatus, Validator,
};
use crate::types::ZoneKind;
use crate::{Error, Result};

/// Collaborators shared by every entity of one installation.
#[derive(Clone)]
pub struct ZoneContext {
    pub(crate) broker: Arc<dyn Broker>,
    pub(crate) validator: Arc<dyn Validator>,
}

impl ZoneContext {
    pub fn new(broker: Arc<dyn Broker>) -> Self {
        Self {
            broker,
            validator: Arc::new(SchemaValidator),
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = validator;
        self
    }

    pub(crate) fn validate(&self, shape: Shape, payload: &Value) -> Result<()> {
        self.validator.validate(shape, payload)?;
        Ok(())
    }

    /// Validate `config` and deserialize it, after checking that the
    /// identifier field `id_field` is present and non-empty.
    pub(crate) fn accept_config<T: DeserializeOwned>(
        &self,
        shape: Shape,
        id_field: &str,
        config: &Value,
    ) -> Result<T> {
        match config.get(id_field) {
            None | Some(Value::Null) => {
                return Err(Error::ConfigIntegrity(format!("{shape} has no {id_field}")));
            }
            Some(Value::String(s)) if s.is_empty() => {
                return Err(Error::ConfigIntegrity(format!("{shape} has an empty {id_field}")));
            }
            _ => {}
        }
        self.validate(shape, config)?;
        Ok(schema::parse(shape, config)?)
    }
}

/// Refresh, schedule and command plumbing shared by both entity variants.
///
/// The status cache holds an `Arc` that is swapped whole on refresh, so a
/// reader sees either the previous snapshot or the new one.
pub(crate) struct ZoneCore<S> {
    id: String,
    kind: ZoneKind,
    ctx: ZoneContext,
    status: RwLock<Option<Arc<S>>>,
}

impl<S: DeserializeOwned + Send + Sync> ZoneCore<S> {
    pub fn new(id: impl Into<String>, kind: ZoneKind, ctx: &ZoneContext) -> Self {
        Self {
            id: id.into(),
            kind,
            ctx: ctx.clone(),
            status: RwLock::new(None),
        }
    }

    pub fn path(&self, leaf: &str) -> String {
        format!("{}/{}/{}", self.kind, self.id, leaf)
    }

    pub async fn refresh(&self) -> Result<Arc<S>> {
        let path = self.path("status");
        debug!(zone = %self.id, path = %path, "refreshing status");

        let payload = self.ctx.broker.get(&path).await?;
        let shape = Shape::Status(self.kind);
        self.ctx.validate(shape, &payload)?;
        let status = Arc::new(schema::parse::<S>(shape, &payload)?);

        *self.status.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&status));
        Ok(status)
    }

    pub fn status(&self) -> Option<Arc<S>> {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn get_schedule(&self) -> Result<Schedule> {
        let path = self.path("schedule");
        debug!(zone = %self.id, path = %path, "reading schedule");

        let payload = self.ctx.broker.get(&path).await?;
        self.ctx.validate(Shape::RemoteSchedule(self.kind), &payload)?;
        schedule::decode(payload, self.kind)
    }

    pub async fn set_schedule(&self, schedule: ScheduleInput) -> Result<()> {
        let body = schedule.into_json()?;
        self.ctx.validate(Shape::UploadSchedule(self.kind), &body)?;

        let path = self.path("schedule");
        debug!(zone = %self.id, path = %path, "writing schedule");
        trace!(body = %body, "schedule upload");
        self.ctx.broker.put(&path, &body).await?;
        Ok(())
    }

    pub async fn put_command<T: Command>(&self, command: &T) -> Result<()> {
        command.check()?;
        let body = serde_json::to_value(command)
            .map_err(|e| Error::Protocol(format!("cannot encode command: {e}")))?;

        let path = self.path(self.kind.command_segment());
        debug!(zone = %self.id, path = %path, body = %body, "sending command");
        self.ctx.broker.put(&path, &body).await?;
        Ok(())
    }
}

/// Operations common to heating zones and hot water.
///
/// Status accessors read the latest snapshot and return `None` before the
/// first refresh or when the API omitted the field.
#[async_trait]
pub trait ZoneEntity: Send + Sync {
    type Status: StatusFields + Send + Sync;

    fn id(&self) -> &str;

    fn kind(&self) -> ZoneKind;

    fn name(&self) -> &str;

    /// Fetch `{kind}/{id}/status` and replace the cached status.
    async fn refresh(&self) -> Result<Arc<Self::Status>>;

    fn status(&self) -> Option<Arc<Self::Status>>;

    /// Fetch `{kind}/{id}/schedule` in the internal form.
    async fn get_schedule(&self) -> Result<Schedule>;

    /// Upload a schedule. Malformed input is rejected before any request.
    async fn set_schedule(&self, schedule: ScheduleInput) -> Result<()>;

    fn active_faults(&self) -> Option<Vec<ActiveFault>> {
        self.status()?.active_faults().map(<[ActiveFault]>::to_vec)
    }

    fn temperature_status(&self) -> Option<TemperatureStatus> {
        self.status()?.temperature_status().cloned()
    }

    /// Measured temperature, if the sensor reported one.
    fn temperature(&self) -> Option<f64> {
        self.temperature_status()?.reading()
    }
}
