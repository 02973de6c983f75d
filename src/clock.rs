use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Source of "now" for the date condition sets.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The offset of the server's local timezone at the current instant.
    fn local_offset(&self) -> FixedOffset;
}

/// Reads the system clock and the server's local timezone.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn local_offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// A clock frozen at one instant, as seen from a server in a fixed timezone.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    now: DateTime<Utc>,
    local_offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, local_offset: FixedOffset) -> Self {
        FixedClock { now, local_offset }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn local_offset(&self) -> FixedOffset {
        self.local_offset
    }
}
