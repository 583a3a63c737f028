use crate::error::StateError;
use crate::record::{Record, Snapshot};

/// Outcome of asking for a flush after a committed change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FlushRequest {
    /// A flush is already pending; this change joins it.
    Joined,
    /// First change of a new batch; the caller must schedule a flush.
    Schedule,
    /// First change of a new batch made while a delivery is running. The
    /// flush is scheduled when that delivery finishes.
    Deferred,
}

/// Mutable state shared by the interceptor, accumulator and flush.
#[derive(Debug)]
pub(crate) struct BatchState {
    /// Current truth.
    pub(crate) record: Record,
    /// State as of the last delivered notification; set by the first change
    /// of a batch and taken by the flush.
    baseline: Option<Record>,
    /// A flush is pending.
    pending: bool,
    /// Subscribers are being notified.
    delivering: bool,
    /// A batch opened during delivery is waiting for its flush.
    rearm: bool,
    flushes: u64,
}

impl BatchState {
    pub(crate) fn new(record: Record) -> Self {
        Self {
            record,
            baseline: None,
            pending: false,
            delivering: false,
            rearm: false,
            flushes: 0,
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.pending
    }

    pub(crate) fn is_delivering(&self) -> bool {
        self.delivering
    }

    pub(crate) fn flushes(&self) -> u64 {
        self.flushes
    }

    /// Apply a change that is known to differ from the live value.
    ///
    /// The baseline is copied before `apply` runs but only kept once `apply`
    /// succeeds, so a rejected commit leaves no trace.
    pub(crate) fn commit<F>(&mut self, apply: F) -> Result<FlushRequest, StateError>
    where
        F: FnOnce(&mut Record) -> Result<(), StateError>,
    {
        let baseline = (!self.pending).then(|| self.record.clone());
        apply(&mut self.record)?;
        if baseline.is_some() {
            self.baseline = baseline;
        }
        Ok(self.request_flush())
    }

    fn request_flush(&mut self) -> FlushRequest {
        if self.pending {
            return FlushRequest::Joined;
        }
        self.pending = true;
        if self.delivering {
            self.rearm = true;
            return FlushRequest::Deferred;
        }
        FlushRequest::Schedule
    }

    /// Start a flush: hand out `(fresh, stale)` snapshots and return to idle.
    ///
    /// Until [`BatchState::finish_delivery`] runs, new batches are armed
    /// instead of scheduled.
    pub(crate) fn begin_delivery(&mut self) -> (Snapshot, Snapshot) {
        let fresh = Snapshot::capture(&self.record);
        let stale = self
            .baseline
            .take()
            .map(|baseline| Snapshot::capture(&baseline))
            .unwrap_or_default();
        self.pending = false;
        self.delivering = true;
        self.flushes += 1;
        (fresh, stale)
    }

    /// End a flush. Returns `true` if a batch opened during delivery now
    /// needs its flush scheduled.
    pub(crate) fn finish_delivery(&mut self) -> bool {
        self.delivering = false;
        std::mem::take(&mut self.rearm)
    }
}
