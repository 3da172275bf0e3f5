use std::fmt;

use serde::Serialize;

use crate::models::{Entity, Stamp};

/// Which side an action changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncTarget {
    Document,
    Store,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncVerb {
    Add,
    Update,
    Delete,
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncTarget::Document => "Org",
            SyncTarget::Store => "Store",
        })
    }
}

impl fmt::Display for SyncVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncVerb::Add => "Add",
            SyncVerb::Update => "Update",
            SyncVerb::Delete => "Delete",
        })
    }
}

/// One change made, or about to be made, to either side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncAction {
    pub at: Stamp,
    pub target: SyncTarget,
    pub verb: SyncVerb,
    pub entity: Entity,
}

impl SyncAction {
    pub fn new(at: Stamp, target: SyncTarget, verb: SyncVerb, entity: impl Into<Entity>) -> Self {
        Self {
            at,
            target,
            verb,
            entity: entity.into(),
        }
    }
}

/// An action that could not be completed. The pass carries on without it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncFailure {
    pub at: Stamp,
    pub target: SyncTarget,
    pub verb: SyncVerb,
    pub entity: Entity,
    pub reason: String,
}

pub trait SyncReporter {
    fn action(&mut self, action: &SyncAction);

    fn failure(&mut self, failure: &SyncFailure);
}

/// Reports through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl SyncReporter for LogReporter {
    fn action(&mut self, action: &SyncAction) {
        log::info!(
            "[{}][{}][{}][{}][{}]",
            action.at,
            action.target,
            action.entity.kind_name(),
            action.verb,
            action.entity.key().unwrap_or_default()
        );
        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string_pretty(&action.entity) {
                Ok(json) => log::debug!("{json}"),
                Err(e) => log::debug!("Could not serialize {:?}: {e}", action.entity.title()),
            }
        }
    }

    fn failure(&mut self, failure: &SyncFailure) {
        log::warn!(
            "[{}][{}][{}][{}] {:?} failed: {}",
            failure.at,
            failure.target,
            failure.entity.kind_name(),
            failure.verb,
            failure.entity.title(),
            failure.reason
        );
    }
}

/// Keeps everything it is told, optionally passing it on.
#[derive(Default)]
pub struct RecordingReporter {
    pub actions: Vec<SyncAction>,
    pub failures: Vec<SyncFailure>,
    forward: Option<Box<dyn SyncReporter + Send>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and also hand every report to `inner`.
    pub fn forwarding(inner: impl SyncReporter + Send + 'static) -> Self {
        Self {
            forward: Some(Box::new(inner)),
            ..Self::default()
        }
    }

    /// Actions as `(target, verb, title)`, for compact assertions.
    pub fn summary(&self) -> Vec<(SyncTarget, SyncVerb, String)> {
        self.actions
            .iter()
            .map(|a| (a.target, a.verb, a.entity.title().to_string()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
        self.failures.clear();
    }
}

impl SyncReporter for RecordingReporter {
    fn action(&mut self, action: &SyncAction) {
        if let Some(inner) = &mut self.forward {
            inner.action(action);
        }
        self.actions.push(action.clone());
    }

    fn failure(&mut self, failure: &SyncFailure) {
        if let Some(inner) = &mut self.forward {
            inner.failure(failure);
        }
        self.failures.push(failure.clone());
    }
}
