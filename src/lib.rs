/*!
UTC timestamps and pluggable clocks.

`timesource` is the single source of "now" for a system whose storage layer
requires timezone-aware values. Every [`Timestamp`] it produces is anchored
to UTC with an explicit designator; there is no code path that yields a
timezone-naive or local-offset value.

# Reading the current time

```
let now = timesource::now_utc()?;

// RFC 3339, always with a `Z`
println!("{now}");

// the same instant as a floating-point epoch offset
let secs = timesource::now_utc_epoch_seconds()?;

assert!((secs - now.to_unix_secs_f64()).abs() < 1.0);
# Ok::<(), timesource::ClockUnavailable>(())
```

A failed clock read surfaces as [`ClockUnavailable`]. No fallback value is
ever substituted; a wrong time would silently corrupt timestamp-dependent
logic downstream.

# Substituting time in tests

Code that takes a [`Clock`] instead of calling [`now_utc`] directly can be
driven deterministically:

```
use std::time::Duration;
use timesource::{AdvancingClock, Clock, Timestamp};

let clock = AdvancingClock::starting_at(Timestamp::EPOCH);

let before = clock.now().unwrap();
clock.advance(Duration::from_secs(60));
let after = clock.now().unwrap();

assert_eq!(Some(Duration::from_secs(60)), after.duration_since(before));
```
*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod clock;
pub mod empty;
pub mod timer;
pub mod timestamp;

#[cfg(feature = "std")]
mod system_clock;

pub use self::{
    clock::{AdvancingClock, Clock, ClockUnavailable, ErasedClock, FixedClock},
    empty::Empty,
    timer::Timer,
    timestamp::{ParseTimestampError, Timestamp},
};

#[cfg(feature = "std")]
pub use self::system_clock::SystemClock;

mod internal {
    pub struct Erased<T>(pub(crate) T);
}

/**
Read the current instant from the system clock, expressed in UTC.

Readings reflect true UTC ordering, subject only to adjustments of the
underlying system clock. The call is a pure read with no shared state; it can
be made concurrently from any number of threads.

Fails with [`ClockUnavailable`] if the host can't supply the current time.
*/
#[cfg(feature = "std")]
pub fn now_utc() -> Result<Timestamp, ClockUnavailable> {
    SystemClock::new().now().ok_or(ClockUnavailable)
}

/**
Read the current instant as a floating-point count of seconds since the Unix
epoch.

Numerically consistent with [`now_utc`] when called at effectively the same
moment.
*/
#[cfg(feature = "std")]
pub fn now_utc_epoch_seconds() -> Result<f64, ClockUnavailable> {
    now_utc().map(|now| now.to_unix_secs_f64())
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    use std::{thread, time::Duration};

    #[test]
    fn now_utc_is_monotonic() {
        let mut previous = now_utc().unwrap();

        for _ in 0..1_000 {
            let next = now_utc().unwrap();

            assert!(next >= previous);

            previous = next;
        }
    }

    #[test]
    fn now_utc_agrees_with_epoch_seconds() {
        let instant = now_utc().unwrap();
        let secs = now_utc_epoch_seconds().unwrap();

        assert!((secs - instant.to_unix_secs_f64()).abs() < 1.0);
    }

    #[test]
    fn now_utc_renders_with_utc_designator() {
        let rendered = now_utc().unwrap().to_string();

        assert!(rendered.ends_with('Z'), "{}", rendered);
    }

    #[test]
    fn readings_track_real_time() {
        let first = now_utc().unwrap();

        thread::sleep(Duration::from_millis(100));

        let second = now_utc().unwrap();

        let elapsed = second.duration_since(first).unwrap();

        assert!(elapsed >= Duration::from_millis(100), "{:?}", elapsed);
        // generous upper bound; CI schedulers stall
        assert!(elapsed < Duration::from_secs(10), "{:?}", elapsed);
    }

    #[test]
    fn concurrent_readings_are_all_utc() {
        let handles: Vec<_> = (0..4)
            .map(|_| thread::spawn(|| now_utc().unwrap().to_string()))
            .collect();

        for handle in handles {
            let rendered = handle.join().unwrap();

            assert!(rendered.ends_with('Z'), "{}", rendered);
        }
    }

    #[test]
    fn epoch_seconds_roundtrip_through_timestamp() {
        let instant = now_utc().unwrap();

        let restored = Timestamp::from_unix_secs_f64(instant.to_unix_secs_f64()).unwrap();

        let drift = if restored >= instant {
            restored.duration_since(instant).unwrap()
        } else {
            instant.duration_since(restored).unwrap()
        };

        assert!(drift < Duration::from_micros(1), "drift was {:?}", drift);
    }
}
