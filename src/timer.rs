/*!
The [`Timer`] type.

A [`Timer`] measures the wall-clock time that passes between its construction
and a call to [`Timer::elapsed`], using whatever [`Clock`] it was started
with.
*/

use core::time::Duration;

use crate::{clock::Clock, timestamp::Timestamp};

/**
A measure of elapsed wall-clock time over some [`Clock`].
*/
#[derive(Clone, Copy)]
pub struct Timer<C> {
    start: Option<Timestamp>,
    clock: C,
}

impl<C: Clock> Timer<C> {
    pub fn start(clock: C) -> Self {
        Timer {
            start: clock.now(),
            clock,
        }
    }

    /**
    The instant the timer started, if the clock produced one.
    */
    pub fn start_timestamp(&self) -> Option<Timestamp> {
        self.start
    }

    /**
    The time elapsed since the timer started.

    Returns `None` if either reading failed, or if the clock moved backwards
    between them.
    */
    pub fn elapsed(&self) -> Option<Duration> {
        match (self.start, self.clock.now()) {
            (Some(start), Some(end)) => end.duration_since(start),
            _ => None,
        }
    }

    /**
    Run `complete` with the elapsed time when the returned guard is dropped.
    */
    pub fn on_drop<F: FnOnce(Option<Duration>)>(self, complete: F) -> TimerGuard<C, F> {
        TimerGuard::new(self, complete)
    }
}

pub struct TimerGuard<C: Clock, F: FnOnce(Option<Duration>)> {
    timer: Timer<C>,
    on_drop: Option<F>,
}

impl<C: Clock, F: FnOnce(Option<Duration>)> TimerGuard<C, F> {
    pub fn new(timer: Timer<C>, on_drop: F) -> Self {
        TimerGuard {
            timer,
            on_drop: Some(on_drop),
        }
    }

    pub fn timer(&self) -> &Timer<C> {
        &self.timer
    }

    /**
    Complete the timer now instead of on drop.
    */
    pub fn complete(mut self, complete: impl FnOnce(Option<Duration>)) {
        let _ = self.on_drop.take();

        complete(self.timer.elapsed());
    }
}

impl<C: Clock, F: FnOnce(Option<Duration>)> Drop for TimerGuard<C, F> {
    fn drop(&mut self) {
        if let Some(on_drop) = self.on_drop.take() {
            (on_drop)(self.timer.elapsed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use core::cell::Cell;

    use crate::{clock::AdvancingClock, empty::Empty};

    #[test]
    fn elapsed_tracks_the_clock() {
        let clock = AdvancingClock::starting_at(Timestamp::EPOCH);
        let timer = Timer::start(&clock);

        assert_eq!(Some(Duration::ZERO), timer.elapsed());

        clock.advance(Duration::from_millis(250));

        assert_eq!(Some(Duration::from_millis(250)), timer.elapsed());
    }

    #[test]
    fn elapsed_is_none_without_a_reading() {
        let timer = Timer::start(Empty);

        assert_eq!(None, timer.start_timestamp());
        assert_eq!(None, timer.elapsed());
    }

    #[test]
    fn guard_completes_on_drop() {
        let clock = AdvancingClock::starting_at(Timestamp::EPOCH);

        let observed = Cell::new(None);

        let guard = Timer::start(&clock).on_drop(|elapsed| observed.set(elapsed));

        clock.advance(Duration::from_secs(1));

        drop(guard);

        assert_eq!(Some(Duration::from_secs(1)), observed.get());
    }

    #[test]
    fn guard_completes_once() {
        let clock = AdvancingClock::starting_at(Timestamp::EPOCH);

        let calls = Cell::new(0);

        let guard = Timer::start(&clock).on_drop(|_| calls.set(calls.get() + 1));

        guard.complete(|_| calls.set(calls.get() + 1));

        assert_eq!(1, calls.get());
    }
}
