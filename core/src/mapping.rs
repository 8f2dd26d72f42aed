//! Field-name translation between the client's model shape and the
//! backend DTO shape.
//!
//! # Design
//! Each entity has a fixed rename table, selected by `EntityKind`. Adding a
//! kind forces every `match` below to handle it, so a rename can't be
//! skipped by a misspelled tag. The string-tag entry points keep the old
//! behaviour for callers that only have a tag: unknown tags pass the record
//! through unchanged.
//!
//! | kind | client | backend | notes |
//! |---|---|---|---|
//! | quiz | `name` | `title` | to backend only, when `title` is absent |
//! | question | `content` | `questionText` | both ways, source removed |
//! | answer | `text` | `answerText` | to backend only, when `answerText` is absent |
//! | category | `name` | `title` | both ways, when the target is absent |
//! | review | | | no renames |
//!
//! Inputs are never mutated. Anything that is not a JSON object, `null`
//! included, is returned as is.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Quiz,
    Question,
    Answer,
    Category,
    Review,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Quiz,
        EntityKind::Question,
        EntityKind::Answer,
        EntityKind::Category,
        EntityKind::Review,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Quiz => "quiz",
            EntityKind::Question => "question",
            EntityKind::Answer => "answer",
            EntityKind::Category => "category",
            EntityKind::Review => "review",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown entity kind: {0}")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownEntityKind(s.to_string()))
    }
}

/// Rename client fields to the names the backend expects.
pub fn map_to_backend(data: &Value, kind: EntityKind) -> Value {
    let Some(record) = data.as_object() else {
        return data.clone();
    };
    let mut mapped = record.clone();
    match kind {
        EntityKind::Quiz => rename_if_absent(&mut mapped, "name", "title"),
        EntityKind::Question => rename(&mut mapped, "content", "questionText"),
        EntityKind::Answer => rename_if_absent(&mut mapped, "text", "answerText"),
        EntityKind::Category => rename_if_absent(&mut mapped, "name", "title"),
        EntityKind::Review => {}
    }
    Value::Object(mapped)
}

/// Rename backend fields to the names the client models use.
pub fn map_to_frontend(data: &Value, kind: EntityKind) -> Value {
    let Some(record) = data.as_object() else {
        return data.clone();
    };
    let mut mapped = record.clone();
    match kind {
        EntityKind::Question => rename_if_absent(&mut mapped, "questionText", "content"),
        EntityKind::Category => rename_if_absent(&mut mapped, "title", "name"),
        EntityKind::Quiz | EntityKind::Answer | EntityKind::Review => {}
    }
    Value::Object(mapped)
}

/// `map_to_backend` keyed by a string tag; unknown tags pass through.
pub fn map_to_backend_tagged(data: &Value, tag: &str) -> Value {
    match tag.parse() {
        Ok(kind) => map_to_backend(data, kind),
        Err(e) => {
            log::warn!("{e}; passing record through unchanged");
            data.clone()
        }
    }
}

/// `map_to_frontend` keyed by a string tag; unknown tags pass through.
pub fn map_to_frontend_tagged(data: &Value, tag: &str) -> Value {
    match tag.parse() {
        Ok(kind) => map_to_frontend(data, kind),
        Err(e) => {
            log::warn!("{e}; passing record through unchanged");
            data.clone()
        }
    }
}

fn rename(record: &mut Map<String, Value>, from: &str, to: &str) {
    if let Some(value) = record.remove(from) {
        record.insert(to.to_string(), value);
    }
}

fn rename_if_absent(record: &mut Map<String, Value>, from: &str, to: &str) {
    if !record.contains_key(to) {
        rename(record, from, to);
    }
}
