//! Watch events
//!
//! Typed view of the notifications delivered by `notify`.

use notify::event::{ModifyKind, RenameMode};
use std::path::PathBuf;

/// Operation reported for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A new entry appeared, including files moved into the directory
    Create,
    /// File contents changed
    Write,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    pub path: PathBuf,
    pub kind: EventKind,
}

impl WatchEvent {
    pub fn new(path: impl Into<PathBuf>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn created(path: impl Into<PathBuf>) -> Self {
        Self::new(path, EventKind::Create)
    }

    pub fn written(path: impl Into<PathBuf>) -> Self {
        Self::new(path, EventKind::Write)
    }

    pub fn is_create(&self) -> bool {
        self.kind == EventKind::Create
    }

    /// Splits one notification into one event per affected path.
    pub fn from_notify(event: notify::Event) -> Vec<WatchEvent> {
        use notify::EventKind as Raw;

        match event.kind {
            Raw::Create(_) | Raw::Modify(ModifyKind::Name(RenameMode::To)) => {
                with_kind(event.paths, EventKind::Create)
            }
            // Rename inside a watched directory: [from, to]
            Raw::Modify(ModifyKind::Name(RenameMode::Both)) => {
                let last = event.paths.len().saturating_sub(1);
                event
                    .paths
                    .into_iter()
                    .enumerate()
                    .map(|(i, path)| {
                        let kind = if i == last {
                            EventKind::Create
                        } else {
                            EventKind::Other
                        };
                        WatchEvent::new(path, kind)
                    })
                    .collect()
            }
            Raw::Modify(ModifyKind::Data(_)) | Raw::Modify(ModifyKind::Any) => {
                with_kind(event.paths, EventKind::Write)
            }
            _ => with_kind(event.paths, EventKind::Other),
        }
    }
}

fn with_kind(paths: Vec<PathBuf>, kind: EventKind) -> Vec<WatchEvent> {
    paths
        .into_iter()
        .map(|path| WatchEvent::new(path, kind))
        .collect()
}
