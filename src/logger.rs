use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::diff::{Change, diff_json};

/// How response bodies are written to the message log.
pub enum MessageLogMode {
    /// Every response body in full.
    Full,
    /// The first response per path in full, later ones as changed leaves.
    Diffed,
}

/// NDJSON trace of broker traffic, one line per request and per response.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    out: File,
    last_seen: HashMap<String, Value>,
}

impl MessageLogger {
    pub fn open(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        Ok(Self {
            mode,
            out: OpenOptions::new().create(true).append(true).open(path)?,
            last_seen: HashMap::new(),
        })
    }

    pub fn request(&mut self, method: &str, path: &str, body: Option<&Value>) {
        let mut fields = Map::new();
        fields.insert("method".into(), method.into());
        fields.insert("body".into(), body.cloned().unwrap_or(Value::Null));
        self.record("req", path, fields);
    }

    pub fn response(&mut self, path: &str, status: u16, body: &Value) {
        let mut fields = Map::new();
        fields.insert("status".into(), status.into());

        let previous = match self.mode {
            MessageLogMode::Full => None,
            MessageLogMode::Diffed => self.last_seen.insert(path.to_string(), body.clone()),
        };
        match previous {
            Some(previous) => {
                let mut changes = Vec::new();
                diff_json(&previous, body, "", &mut changes);
                fields.insert(
                    "changes".into(),
                    changes.into_iter().map(change_entry).collect(),
                );
            }
            None => {
                if matches!(self.mode, MessageLogMode::Diffed) {
                    fields.insert("full".into(), true.into());
                }
                fields.insert("body".into(), body.clone());
            }
        }
        self.record("resp", path, fields);
    }

    fn record(&mut self, dir: &str, path: &str, fields: Map<String, Value>) {
        let mut line = Map::new();
        line.insert("ts".into(), Utc::now().to_rfc3339().into());
        line.insert("dir".into(), dir.into());
        line.insert("path".into(), path.into());
        line.extend(fields);

        let written = serde_json::to_string(&line)
            .map_err(std::io::Error::from)
            .and_then(|text| writeln!(self.out, "{text}"));
        if let Err(e) = written {
            warn!(path, "message log write failed: {e}");
        }
    }
}

fn change_entry(change: Change) -> Value {
    json!({ "path": change.path, "old": change.old, "new": change.new })
}
