use chrono::{DateTime, Utc};

use crate::energy::Resolution;

/// One clock advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Tick index, starting from 0.
    pub step: u64,
    /// Clock time before the advance.
    pub previous: DateTime<Utc>,
    /// Clock time after the advance.
    pub timestamp: DateTime<Utc>,
    /// Whole hours between `previous` and `timestamp`.
    pub window_hours: u32,
}

/// A simulation clock advancing calendar time in fixed steps.
///
/// The clock pairs a monotonically increasing timestamp with a step counter
/// and stops after a fixed number of ticks. Monthly steps follow the
/// calendar, so their window length varies.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use wind_sim::energy::Resolution;
/// use wind_sim::sim::clock::SimulationClock;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let mut clock = SimulationClock::new(start, Resolution::Hourly, 3);
/// let mut steps = Vec::new();
///
/// clock.run(|tick| steps.push(tick.step));
/// assert_eq!(steps, vec![0, 1, 2]);
/// assert_eq!(clock.now(), start + chrono::Duration::hours(3));
/// ```
#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Clock time at construction
    start: DateTime<Utc>,
    /// Current clock time
    current: DateTime<Utc>,
    /// Ticks completed so far
    step: u64,
    /// Total ticks to run
    total: u64,
    resolution: Resolution,
}

impl SimulationClock {
    /// Creates a new clock.
    ///
    /// # Arguments
    ///
    /// * `start` - Initial clock time
    /// * `resolution` - Step size
    /// * `total` - The total number of ticks the clock will run
    pub fn new(start: DateTime<Utc>, resolution: Resolution, total: u64) -> Self {
        Self {
            start,
            current: start,
            step: 0,
            total,
            resolution,
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.current
    }

    /// Ticks completed so far.
    pub fn steps_done(&self) -> u64 {
        self.step
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.total
    }

    /// Advances the clock by one step.
    ///
    /// # Returns
    ///
    /// * `Some(tick)` - The completed advance
    /// * `None` - If the clock has reached its total ticks or left chrono's range
    pub fn tick(&mut self) -> Option<Tick> {
        if self.is_finished() {
            return None;
        }
        let next = self.resolution.advance(self.current)?;
        let window_hours = u32::try_from((next - self.current).num_hours()).unwrap_or(u32::MAX);
        let tick = Tick {
            step: self.step,
            previous: self.current,
            timestamp: next,
            window_hours,
        };
        self.current = next;
        self.step += 1;
        Some(tick)
    }

    /// Runs a function for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_new_clock() {
        let clock = SimulationClock::new(start(), Resolution::Daily, 5);
        assert_eq!(clock.now(), start());
        assert_eq!(clock.steps_done(), 0);
        assert_eq!(clock.total(), 5);
    }

    #[test]
    fn test_tick() {
        let mut clock = SimulationClock::new(start(), Resolution::Hourly, 2);
        let first = clock.tick();
        assert_eq!(first.map(|t| (t.step, t.window_hours)), Some((0, 1)));
        assert_eq!(first.map(|t| t.previous), Some(start()));
        assert_eq!(clock.tick().map(|t| t.step), Some(1));
        assert_eq!(clock.tick(), None);
        assert!(clock.is_finished());
    }

    #[test]
    fn test_run() {
        let mut clock = SimulationClock::new(start(), Resolution::Weekly, 3);
        let mut windows = Vec::new();

        clock.run(|tick| windows.push(tick.window_hours));

        assert_eq!(windows, vec![168, 168, 168]);
        assert_eq!(clock.now(), start() + Duration::weeks(3));
    }

    #[test]
    fn test_empty_clock() {
        let mut clock = SimulationClock::new(start(), Resolution::Daily, 0);
        assert_eq!(clock.tick(), None);

        let mut was_called = false;
        clock.run(|_| was_called = true);
        assert!(!was_called);
    }

    #[test]
    fn monthly_windows_follow_calendar() {
        let mut clock = SimulationClock::new(start(), Resolution::Monthly, 2);
        let windows: Vec<u32> = std::iter::from_fn(|| clock.tick()).map(|t| t.window_hours).collect();
        // Jan 31 -> Feb 29 (leap year) -> Mar 29
        assert_eq!(windows, vec![29 * 24, 29 * 24]);
    }

    #[test]
    fn timestamps_strictly_increase() {
        let mut clock = SimulationClock::new(start(), Resolution::Daily, 10);
        let mut last = clock.now();
        while let Some(t) = clock.tick() {
            assert!(t.timestamp > last);
            last = t.timestamp;
        }
    }
}
