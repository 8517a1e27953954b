//! Wake and power subsystem

use tracing::{info, warn};

use crate::{
    error::{DriverError, RetainedError},
    state::{RetainedImage, RetainedStore},
};

/// Deep power-down control and boot-cause query
pub trait PowerControl: Send {
    /// Whether this boot was caused by the armed wake source
    fn was_resume_from_low_power(&self) -> bool;
    /// Hand over what the retained region held at boot
    fn take_retained(&mut self) -> Option<RetainedImage>;
    fn arm_wake_on_edge(&mut self, pin: u8) -> Result<(), DriverError>;
    /// Write `image` to the retained region and drop to the lowest power state.
    ///
    /// On hardware this does not return. On a host build it returns once the
    /// image is safe and the caller ends the process.
    fn enter_lowest_power_retained_state(
        &mut self,
        image: &RetainedImage,
    ) -> Result<(), DriverError>;
}

/// Host power subsystem: the retained region is a file and a process restart
/// after a power-down counts as the wake edge
#[derive(Debug)]
pub struct FilePower {
    store: RetainedStore,
    boot_image: Option<RetainedImage>,
    armed_pin: Option<u8>,
}

impl FilePower {
    /// Consume whatever the previous power cycle left behind
    pub fn open(store: RetainedStore) -> Result<Self, RetainedError> {
        let boot_image = store.take()?;
        if let Some(image) = &boot_image {
            info!("Found retained image from {}", image.written_at);
        }
        Ok(Self { store, boot_image, armed_pin: None })
    }
}

impl PowerControl for FilePower {
    fn was_resume_from_low_power(&self) -> bool {
        self.boot_image
            .as_ref()
            .is_some_and(|image| image.wake_pin.is_some())
    }

    fn take_retained(&mut self) -> Option<RetainedImage> {
        self.boot_image.take()
    }

    fn arm_wake_on_edge(&mut self, pin: u8) -> Result<(), DriverError> {
        info!("Wake armed on pin {}", pin);
        self.armed_pin = Some(pin);
        Ok(())
    }

    fn enter_lowest_power_retained_state(
        &mut self,
        image: &RetainedImage,
    ) -> Result<(), DriverError> {
        if self.armed_pin.is_none() {
            warn!("Refusing to power down without a wake source");
            return Err(DriverError::io("power", "no wake source armed"));
        }
        self.store
            .store(image)
            .map_err(|e| DriverError::io("power", e.to_string()))?;
        info!("Entering deep power-down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Phase, TimerState};
    use chrono::Utc;

    fn image(wake_pin: Option<u8>) -> RetainedImage {
        RetainedImage {
            timer: TimerState::stopped(Phase::Break, 120),
            idle_counter: 0,
            wake_pin,
            written_at: Utc::now(),
        }
    }

    #[test]
    fn fresh_directory_is_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        let mut power = FilePower::open(RetainedStore::new(dir.path().join("r.json"))).unwrap();
        assert!(!power.was_resume_from_low_power());
        assert!(power.take_retained().is_none());
    }

    #[test]
    fn power_down_then_reopen_is_resume() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetainedStore::new(dir.path().join("r.json"));

        let mut power = FilePower::open(store.clone()).unwrap();
        power.arm_wake_on_edge(39).unwrap();
        power.enter_lowest_power_retained_state(&image(Some(39))).unwrap();

        let mut resumed = FilePower::open(store.clone()).unwrap();
        assert!(resumed.was_resume_from_low_power());
        assert_eq!(resumed.take_retained().map(|i| i.timer.remaining), Some(120));
        // Consumed at boot: a crash now would cold-start.
        assert!(!store.path().exists());
    }

    #[test]
    fn image_without_wake_pin_is_not_a_resume() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetainedStore::new(dir.path().join("r.json"));
        store.store(&image(None)).unwrap();
        assert!(!FilePower::open(store).unwrap().was_resume_from_low_power());
    }

    #[test]
    fn unreadable_image_cold_starts_every_time() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetainedStore::new(dir.path().join("retained.json"));
        std::fs::write(store.path(), br#"{"timer": garbage"#).unwrap();

        for _ in 0..3 {
            let mut power = FilePower::open(store.clone()).unwrap();
            assert!(!power.was_resume_from_low_power());
            assert!(power.take_retained().is_none());
            assert!(!store.path().exists());
        }
    }

    #[test]
    fn power_down_requires_armed_wake() {
        let dir = tempfile::tempdir().unwrap();
        let store = RetainedStore::new(dir.path().join("r.json"));
        let mut power = FilePower::open(store.clone()).unwrap();
        assert!(power.enter_lowest_power_retained_state(&image(Some(39))).is_err());
        assert!(!store.path().exists());
    }
}
