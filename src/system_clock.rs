use crate::{clock::Clock, timestamp::Timestamp};

/**
The real system clock.

A zero-sized handle over [`std::time::SystemTime`]. It's stateless and can be
read concurrently from any number of threads without coordination.
*/
#[derive(Default, Debug, Clone, Copy)]
pub struct SystemClock {}

impl SystemClock {
    pub const fn new() -> Self {
        SystemClock {}
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Option<Timestamp> {
        // A host clock sitting before the epoch is broken; report the failed
        // read instead of substituting a default
        std::time::UNIX_EPOCH.elapsed().ok().map(Timestamp::from_unix)
    }
}
