//! Shared handle to the calibration parameters in use.
//!
//! Calibration may finish on another thread while the tracking loop keeps
//! running. The writer publishes a complete [`CalibrationParams`] in one
//! step; readers take an `Arc` snapshot and never observe a half-updated set.

use std::sync::{Arc, PoisonError, RwLock};

use crate::session::CalibrationParams;

#[derive(Debug, Clone, Default)]
pub struct ActiveCalibration {
    inner: Arc<RwLock<Option<Arc<CalibrationParams>>>>,
}

impl ActiveCalibration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active parameter set.
    pub fn publish(&self, params: CalibrationParams) {
        let params = Arc::new(params);
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(params);
        tracing::info!("Published calibration parameters");
    }

    /// Drop the active parameter set, reverting to uncalibrated behavior.
    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Current parameter set, if any.
    pub fn snapshot(&self) -> Option<Arc<CalibrationParams>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
