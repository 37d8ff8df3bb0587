/*!
The [`Clock`] trait and deterministic clocks for testing.

A [`Clock`] is a source of [`Timestamp`]s. The process-wide real clock is
[`crate::SystemClock`]; code that wants deterministic time can accept any
`Clock` and be handed a [`FixedClock`] or [`AdvancingClock`] in tests.
*/

use core::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use crate::{empty::Empty, timestamp::Timestamp};

/**
A source of the current UTC time.

`now` returns `None` when the source can't produce a reading. No implementation
substitutes a fallback value; a wrong time would silently corrupt any
ordering, expiry, or auditing built on top of it.
*/
pub trait Clock {
    fn now(&self) -> Option<Timestamp>;
}

impl<'a, T: Clock + ?Sized> Clock for &'a T {
    fn now(&self) -> Option<Timestamp> {
        (**self).now()
    }
}

impl<T: Clock> Clock for Option<T> {
    fn now(&self) -> Option<Timestamp> {
        if let Some(clock) = self {
            clock.now()
        } else {
            Empty.now()
        }
    }
}

#[cfg(feature = "alloc")]
impl<'a, T: Clock + ?Sized + 'a> Clock for alloc::boxed::Box<T> {
    fn now(&self) -> Option<Timestamp> {
        (**self).now()
    }
}

#[cfg(feature = "alloc")]
impl<'a, T: Clock + ?Sized + 'a> Clock for alloc::sync::Arc<T> {
    fn now(&self) -> Option<Timestamp> {
        (**self).now()
    }
}

impl Clock for Empty {
    fn now(&self) -> Option<Timestamp> {
        None
    }
}

/**
A timestamp is a clock that's permanently stuck at itself.
*/
impl Clock for Timestamp {
    fn now(&self) -> Option<Timestamp> {
        Some(*self)
    }
}

/**
The error produced when the current time can't be read.

There's no retry and no fallback time source; the operation that asked for a
timestamp fails.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockUnavailable;

impl fmt::Display for ClockUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("the current time could not be read from the clock")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ClockUnavailable {}

/**
A clock that always reads the same instant.
*/
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    pub const fn new(now: Timestamp) -> Self {
        FixedClock(now)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Option<Timestamp> {
        Some(self.0)
    }
}

/**
A clock that only moves when told to.

Readings start at the instant given to [`AdvancingClock::starting_at`] and
move forward by exactly the amount passed to [`AdvancingClock::advance`].
The clock is shareable across threads.

The internal representation is a nanosecond count, so readings saturate a
few hundred years after the epoch; far enough out for any test.
*/
#[derive(Debug)]
pub struct AdvancingClock {
    nanos: AtomicU64,
}

impl AdvancingClock {
    pub fn starting_at(start: Timestamp) -> Self {
        AdvancingClock {
            nanos: AtomicU64::new(saturating_nanos(start.to_unix())),
        }
    }

    pub fn advance(&self, interval: Duration) {
        self.nanos
            .fetch_add(saturating_nanos(interval), Ordering::SeqCst);
    }
}

impl Clock for AdvancingClock {
    fn now(&self) -> Option<Timestamp> {
        Some(Timestamp::from_unix(Duration::from_nanos(
            self.nanos.load(Ordering::SeqCst),
        )))
    }
}

fn saturating_nanos(interval: Duration) -> u64 {
    u64::try_from(interval.as_nanos()).unwrap_or(u64::MAX)
}

mod internal {
    use super::Timestamp;

    pub trait DispatchClock {
        fn dispatch_now(&self) -> Option<Timestamp>;
    }

    pub trait SealedClock {
        fn erase_clock(&self) -> crate::internal::Erased<&dyn DispatchClock>;
    }
}

/**
An object-safe [`Clock`].

A `dyn ErasedClock` can be treated as `impl Clock`.
*/
pub trait ErasedClock: internal::SealedClock {}

impl<T: Clock> ErasedClock for T {}

impl<T: Clock> internal::SealedClock for T {
    fn erase_clock(&self) -> crate::internal::Erased<&dyn internal::DispatchClock> {
        crate::internal::Erased(self)
    }
}

impl<T: Clock> internal::DispatchClock for T {
    fn dispatch_now(&self) -> Option<Timestamp> {
        self.now()
    }
}

impl<'a> Clock for dyn ErasedClock + 'a {
    fn now(&self) -> Option<Timestamp> {
        self.erase_clock().0.dispatch_now()
    }
}

impl<'a> Clock for dyn ErasedClock + Send + Sync + 'a {
    fn now(&self) -> Option<Timestamp> {
        (self as &(dyn ErasedClock + 'a)).now()
    }
}
