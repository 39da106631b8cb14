//! Wall-clock anchor for a tracking session.
//!
//! Frame timestamps come from the detector as nanoseconds since its own
//! start. The action log header records when the session began so those
//! offsets can be placed on a calendar.

use chrono::{DateTime, SecondsFormat, Utc};

#[derive(Debug, Clone)]
pub struct SessionClock {
    started_at: DateTime<Utc>,
    epoch_wall: String,
}

impl SessionClock {
    pub fn start() -> Self {
        Self::at(Utc::now())
    }

    /// A clock anchored to a fixed instant, for reproducible headers.
    pub fn at(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            epoch_wall: started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Session start as RFC 3339, millisecond precision, `Z` suffix.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}
