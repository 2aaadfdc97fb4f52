//! Timestamp source for new version identities

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use chrono::{DateTime, Duration, Utc};

use crate::version::{DictionaryVersion, VersionId, VersionRegistry};

/// Source of UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Block until `now() >= target`.
    fn wait_until(&self, target: DateTime<Utc>);
}

/// UTC wall clock that never goes backwards.
///
/// Every reading is taken from the system clock and raised to the last
/// reading returned, so forward NTP corrections and time spent suspended are
/// followed while a backward step is held until the wall clock catches up.
#[derive(Debug)]
pub struct SystemClock {
    last: Mutex<DateTime<Utc>>,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Mutex::new(Utc::now()),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *last = (*last).max(Utc::now());
        *last
    }

    fn wait_until(&self, target: DateTime<Utc>) {
        while let Ok(remaining) = (target - self.now()).to_std() {
            if remaining.is_zero() {
                break;
            }
            thread::sleep(remaining);
        }
    }
}

/// Clock that only moves when told to. `wait_until` jumps straight to the
/// target.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now = *now + by;
    }

    fn lock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.now.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }

    fn wait_until(&self, target: DateTime<Utc>) {
        let mut now = self.lock();
        if *now < target {
            *now = target;
        }
    }
}

/// Reserve the identity of a new version.
///
/// Takes the first id read from `clock` that is strictly after `after` and
/// claims it in `registry` atomically, so concurrent builds always receive
/// distinct identities. When the id is taken the clock waits for the next
/// free second instead of polling.
pub fn reserve_version_id(
    clock: &dyn Clock,
    after: Option<VersionId>,
    registry: &VersionRegistry,
) -> Arc<DictionaryVersion> {
    loop {
        let candidate = VersionId::from(clock.now());
        let taken = match after {
            Some(after) if candidate <= after => after,
            _ => match registry.reserve(candidate) {
                Some(version) => return version,
                None => candidate,
            },
        };
        clock.wait_until(taken.next().datetime().and_utc());
    }
}
