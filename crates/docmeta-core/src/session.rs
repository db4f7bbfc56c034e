//! Viewing/editing state machine over a [`MetadataSnapshot`].

use std::fmt;

use log::{debug, info};

use crate::error::{MetaError, Result};
use crate::fields::find_field;
use crate::snapshot::MetadataSnapshot;
use crate::writer::{PackageWriter, WrittenPackage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Viewing,
    Editing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Viewing => write!(f, "viewing"),
            SessionState::Editing => write!(f, "editing"),
        }
    }
}

/// Result of leaving edit mode through save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing differed from the original values; no package was produced.
    Unchanged,
    /// The package was regenerated.
    Saved {
        package: WrittenPackage,
        changed: Vec<&'static str>,
    },
}

/// Edit session for one open document.
#[derive(Debug, Clone)]
pub struct EditSession {
    state: SessionState,
    snapshot: MetadataSnapshot,
}

impl EditSession {
    pub fn new(snapshot: MetadataSnapshot) -> Self {
        Self {
            state: SessionState::Viewing,
            snapshot,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn snapshot(&self) -> &MetadataSnapshot {
        &self.snapshot
    }

    /// Viewing → Editing. Entering edit mode twice is harmless.
    pub fn begin_edit(&mut self) {
        if self.state == SessionState::Viewing {
            debug!("Entering edit mode");
            self.state = SessionState::Editing;
        }
    }

    /// Record a user-entered value for the field named by `key`.
    pub fn stage(&mut self, key: &str, value: &str) -> Result<()> {
        self.require_editing("stage a value")?;
        let field = find_field(key)?;
        self.snapshot
            .set_current(field.id, value.trim().to_string());
        Ok(())
    }

    /// Editing → Viewing, writing the package through `writer` when any
    /// field changed.
    ///
    /// Every held value is trimmed first. On writer failure the session stays
    /// in edit mode with the entered values intact so the save can be retried.
    pub fn save<W>(&mut self, writer: &mut W) -> Result<SaveOutcome>
    where
        W: PackageWriter + ?Sized,
    {
        self.require_editing("save")?;
        self.snapshot.trim_current();

        let changed: Vec<&'static str> = self
            .snapshot
            .changed_fields()
            .iter()
            .map(|f| f.id)
            .collect();

        if changed.is_empty() {
            info!("No metadata changes; nothing to write");
            self.state = SessionState::Viewing;
            return Ok(SaveOutcome::Unchanged);
        }

        info!("Saving {} changed field(s): {}", changed.len(), changed.join(", "));
        let package = writer.write_package(&self.snapshot).map_err(|e| match e {
            MetaError::Serialization(_) => e,
            other => MetaError::Serialization(other.to_string()),
        })?;

        self.snapshot.commit();
        self.state = SessionState::Viewing;
        Ok(SaveOutcome::Saved { package, changed })
    }

    /// Editing → Viewing, discarding uncommitted edits.
    pub fn cancel_edit(&mut self) {
        self.snapshot.revert();
        self.state = SessionState::Viewing;
    }

    fn require_editing(&self, action: &str) -> Result<()> {
        if self.state == SessionState::Editing {
            Ok(())
        } else {
            Err(MetaError::InvalidState(format!(
                "cannot {} while {}",
                action, self.state
            )))
        }
    }
}
