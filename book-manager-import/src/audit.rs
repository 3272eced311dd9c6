//! Structured audit events for entity creation and updates.

use std::fmt;

/// Name the importer reports itself as in audit events.
pub const IMPORTER_NAME: &str = "GoodreadsImporter";

/// What happened to an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Created,
    Updated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

/// The kind of entity an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Binding,
    Publisher,
    Author,
    Book,
    Shelf,
    Reading,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Binding => "binding",
            Self::Publisher => "publisher",
            Self::Author => "author",
            Self::Book => "book",
            Self::Shelf => "shelf",
            Self::Reading => "reading",
        }
    }
}

/// One auditable change made by an importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub actor: &'static str,
    pub action: AuditAction,
    pub entity: EntityKind,
    /// Human-readable natural key, e.g. `title="Dune"`.
    pub key: String,
}

impl AuditEvent {
    pub fn new(action: AuditAction, entity: EntityKind, key: impl Into<String>) -> Self {
        Self {
            actor: IMPORTER_NAME,
            action,
            entity,
            key: key.into(),
        }
    }

    pub fn created(entity: EntityKind, key: impl Into<String>) -> Self {
        Self::new(AuditAction::Created, entity, key)
    }

    pub fn updated(entity: EntityKind, key: impl Into<String>) -> Self {
        Self::new(AuditAction::Updated, entity, key)
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{} {}",
            self.actor,
            self.entity.as_str(),
            self.action.as_str(),
            self.key
        )
    }
}

/// Trait for receiving audit events.
pub trait AuditSink {
    fn record(&self, event: &AuditEvent);
}

/// An audit sink that discards all events.
pub struct SilentAudit;

impl AuditSink for SilentAudit {
    fn record(&self, _event: &AuditEvent) {}
}

/// An audit sink that logs each event to the `log` crate at info level.
pub struct LogAudit;

impl AuditSink for LogAudit {
    fn record(&self, event: &AuditEvent) {
        log::info!(target: "book_manager::audit", "{}", event);
    }
}

/// Render a key/value pair the way audit keys are written: `name="value"`.
pub(crate) fn quoted(name: &str, value: &str) -> String {
    format!("{name}=\"{value}\"")
}
