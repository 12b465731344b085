use std::sync::Mutex;

use tus_protocol::UploadProgress;

/// Callback invoked with upload progress.
pub type ProgressCallback = Box<dyn Fn(UploadProgress) + Send + Sync>;

/// Forwards progress to a callback, enforcing the delivery contract:
/// values are capped at the total and strictly increase across the
/// lifetime of the reporter. Anything else is dropped.
///
/// One reporter covers one upload call. Offsets re-queried after a
/// connection reset may move backwards; the reporter hides that from the
/// callback until transfer passes the previous high-water mark again.
pub struct ProgressReporter {
    total: u64,
    last: Mutex<Option<u64>>,
    callback: Option<ProgressCallback>,
}

impl ProgressReporter {
    pub fn new(total: u64, callback: Option<ProgressCallback>) -> Self {
        Self {
            total,
            last: Mutex::new(None),
            callback,
        }
    }

    /// Reporter that tracks the high-water mark but notifies no one.
    pub fn silent(total: u64) -> Self {
        Self::new(total, None)
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Highest value delivered so far.
    pub fn last_reported(&self) -> Option<u64> {
        match self.last.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Reports `transferred` bytes. Returns `true` if the callback fired.
    pub fn report(&self, transferred: u64) -> bool {
        let value = transferred.min(self.total);
        // Held across the callback so concurrent reports cannot reorder.
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if last.is_some_and(|prev| value <= prev) {
            return false;
        }
        *last = Some(value);
        if let Some(cb) = &self.callback {
            cb(UploadProgress::new(value, self.total));
        }
        true
    }
}
