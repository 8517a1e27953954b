//! Record kept across deep power-down and the file that stands in for
//! retained memory on a host build

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{PersistentState, TimerState};
use crate::{config::TimerConfig, error::RetainedError};

/// Serialized contents of the retained region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetainedImage {
    pub timer: TimerState,
    pub idle_counter: u32,
    /// Input line armed to wake the device; `None` means no power-down happened
    pub wake_pin: Option<u8>,
    pub written_at: DateTime<Utc>,
}

impl RetainedImage {
    /// Capture the current state for power-down
    pub fn capture(state: &PersistentState, wake_pin: Option<u8>) -> Self {
        Self {
            timer: state.snapshot(),
            idle_counter: state.idle_count(),
            wake_pin,
            written_at: Utc::now(),
        }
    }

    /// Whether `remaining` fits inside its phase's configured duration
    pub fn is_consistent_with(&self, config: &TimerConfig) -> bool {
        self.timer.remaining <= config.phase_duration(self.timer.phase)
    }
}

/// File-backed retained region
#[derive(Debug, Clone)]
pub struct RetainedStore {
    path: PathBuf,
}

impl RetainedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the image, if one was written
    pub fn load(&self) -> Result<Option<RetainedImage>, RetainedError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No retained image at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    pub fn store(&self, image: &RetainedImage) -> Result<(), RetainedError> {
        let bytes = serde_json::to_vec_pretty(image)?;
        let staging = self.path.with_extension("tmp");
        fs::write(&staging, bytes)?;
        fs::rename(&staging, &self.path)?;
        info!("Retained image written to {}", self.path.display());
        Ok(())
    }

    /// Read the image and remove it, so a later power loss cold-starts.
    ///
    /// An unreadable image is removed as well and reads as no image; only
    /// I/O failures are returned.
    pub fn take(&self) -> Result<Option<RetainedImage>, RetainedError> {
        let image = match self.load() {
            Ok(image) => image,
            Err(RetainedError::Format(e)) => {
                warn!("Discarding unreadable retained image {}: {}", self.path.display(), e);
                self.remove()?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        if image.is_some() {
            self.remove()?;
        }
        Ok(image)
    }

    fn remove(&self) -> Result<(), RetainedError> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}
