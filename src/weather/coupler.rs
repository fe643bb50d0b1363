//! Nearest-time, nearest-space weather lookups for grid cells.

use chrono::{DateTime, Duration, Utc};

use super::index::{CellSeries, WeatherIndex, any_within, nearest_in_time};
use super::types::{Parameter, ParameterValues, WeatherSample, WindowAverage};
use crate::energy::circular_mean_deg;
use crate::geo::GridCell;

/// Couples a sparse observation set to arbitrary grid cells and times.
///
/// A query at a cell with observations is answered from that cell's own
/// series. A cell with no observations at all falls back to the closest
/// indexed cell carrying the requested parameter. The fallback is resolved
/// per parameter, so one query time may draw speed and temperature from
/// different source cells.
#[derive(Debug, Clone)]
pub struct WeatherCoupler {
    index: WeatherIndex,
    max_time_distance: Option<Duration>,
}

impl WeatherCoupler {
    pub fn new(index: WeatherIndex) -> Self {
        Self {
            index,
            max_time_distance: None,
        }
    }

    /// Rejects matches further than `max` from the query time.
    pub fn with_max_time_distance(mut self, max: Duration) -> Self {
        self.max_time_distance = Some(max);
        self
    }

    pub fn index(&self) -> &WeatherIndex {
        &self.index
    }

    /// Value of `parameter` at `cell` closest in time to `timestamp`.
    pub fn lookup(&self, cell: GridCell, timestamp: DateTime<Utc>, parameter: Parameter) -> Option<f64> {
        match self.index.cell(&cell) {
            Some(series) => self.lookup_in(series, timestamp, parameter),
            None => self.nearest_cell_lookup(cell, timestamp, parameter),
        }
    }

    /// Lookup against the closest indexed cell that has any data for
    /// `parameter`. Equal distances resolve to the first cell in `(x, y)`
    /// order.
    pub fn nearest_cell_lookup(
        &self,
        cell: GridCell,
        timestamp: DateTime<Utc>,
        parameter: Parameter,
    ) -> Option<f64> {
        let series = self.nearest_series(cell, parameter)?;
        self.lookup_in(series, timestamp, parameter)
    }

    /// Returns `true` if any core parameter has an observation inside
    /// `[start, end]` at the cell that answers lookups for `cell`.
    ///
    /// Nearest-time lookups always find some value once a series exists;
    /// this tells whether the period itself was observed.
    pub fn covers_window(&self, cell: GridCell, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        Parameter::ALL.into_iter().any(|p| {
            self.source_series(cell, p)
                .is_some_and(|series| any_within(series.get(p), start, end))
        })
    }

    /// Series answering lookups of `parameter` at `cell`: the cell's own
    /// when it has any observations, else the nearest cell carrying it.
    fn source_series(&self, cell: GridCell, parameter: Parameter) -> Option<&CellSeries> {
        match self.index.cell(&cell) {
            Some(series) => Some(series),
            None => self.nearest_series(cell, parameter),
        }
    }

    fn nearest_series(&self, cell: GridCell, parameter: Parameter) -> Option<&CellSeries> {
        let mut best: Option<(u64, &CellSeries)> = None;
        for (candidate, series) in self.index.cells() {
            if !series.has(parameter) {
                continue;
            }
            let d = cell.distance_sq(candidate);
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, series));
            }
        }
        best.map(|(_, series)| series)
    }

    /// One independent lookup per core parameter.
    pub fn lookup_all(&self, cell: GridCell, timestamp: DateTime<Utc>) -> ParameterValues {
        let mut values = ParameterValues::default();
        for p in Parameter::ALL {
            values.set(p, self.lookup(cell, timestamp, p));
        }
        values
    }

    /// Averages the hourly points `end, end - 1h, ..` over `window_hours`.
    ///
    /// Only points with all three parameters count. Speed and temperature
    /// use arithmetic means, direction the circular mean. With no complete
    /// point in the window a single lookup at `end` is used instead, and
    /// `None` means even that was incomplete.
    pub fn average_over_window(
        &self,
        cell: GridCell,
        end: DateTime<Utc>,
        window_hours: u32,
    ) -> Option<WindowAverage> {
        let samples: Vec<WeatherSample> = (0..window_hours)
            .filter_map(|k| {
                let t = end - Duration::hours(i64::from(k));
                self.lookup_all(cell, t).to_sample()
            })
            .collect();

        if samples.is_empty() {
            return self.lookup_all(cell, end).to_sample().map(|sample| WindowAverage {
                sample,
                valid_samples: 0,
            });
        }

        let n = samples.len() as f64;
        let wind_speed_ms = samples.iter().map(|s| s.wind_speed_ms).sum::<f64>() / n;
        let temperature_c = samples.iter().map(|s| s.temperature_c).sum::<f64>() / n;
        let wind_direction_deg = circular_mean_deg(samples.iter().map(|s| s.wind_direction_deg))?;

        Some(WindowAverage {
            sample: WeatherSample {
                wind_speed_ms,
                wind_direction_deg,
                temperature_c,
            },
            valid_samples: samples.len(),
        })
    }

    fn lookup_in(&self, series: &CellSeries, timestamp: DateTime<Utc>, parameter: Parameter) -> Option<f64> {
        let hit = nearest_in_time(series.get(parameter), timestamp)?;
        if let Some(max) = self.max_time_distance {
            if (hit.timestamp - timestamp).abs() > max {
                return None;
            }
        }
        Some(hit.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::types::WeatherObservation;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn obs(x: usize, y: usize, hour: i64, parameter: Parameter, value: f64) -> WeatherObservation {
        WeatherObservation {
            station_id: format!("st-{x}-{y}"),
            cell: GridCell::new(x, y),
            timestamp: t0() + Duration::hours(hour),
            parameter,
            value,
        }
    }

    fn full_hour(x: usize, y: usize, hour: i64, speed: f64, dir: f64, temp: f64) -> Vec<WeatherObservation> {
        vec![
            obs(x, y, hour, Parameter::WindSpeed, speed),
            obs(x, y, hour, Parameter::WindDirection, dir),
            obs(x, y, hour, Parameter::Temperature, temp),
        ]
    }

    fn coupler(observations: Vec<WeatherObservation>) -> WeatherCoupler {
        WeatherCoupler::new(WeatherIndex::build(observations))
    }

    #[test]
    fn exact_match_round_trips() {
        let c = coupler(vec![
            obs(2, 2, 0, Parameter::WindSpeed, 6.25),
            obs(2, 2, 1, Parameter::WindSpeed, 7.5),
        ]);
        let v = c.lookup(GridCell::new(2, 2), t0() + Duration::hours(1), Parameter::WindSpeed);
        assert_eq!(v, Some(7.5));
    }

    #[test]
    fn missing_parameter_at_known_cell_is_none() {
        let c = coupler(vec![
            obs(2, 2, 0, Parameter::WindSpeed, 6.0),
            obs(9, 9, 0, Parameter::Temperature, 4.0),
        ]);
        // the cell has data, so no spatial fallback for the absent parameter
        assert_eq!(c.lookup(GridCell::new(2, 2), t0(), Parameter::Temperature), None);
    }

    #[test]
    fn empty_cell_falls_back_to_nearest_with_parameter() {
        let c = coupler(vec![
            obs(1, 0, 0, Parameter::Temperature, 3.0),
            obs(8, 0, 0, Parameter::WindSpeed, 11.0),
            obs(3, 0, 0, Parameter::WindSpeed, 9.0),
        ]);
        let cell = GridCell::new(0, 0);
        assert_eq!(c.lookup(cell, t0(), Parameter::WindSpeed), Some(9.0));
        assert_eq!(c.lookup(cell, t0(), Parameter::Temperature), Some(3.0));
        assert_eq!(c.lookup(cell, t0(), Parameter::WindDirection), None);
    }

    #[test]
    fn fallback_tie_takes_first_cell_in_order() {
        let c = coupler(vec![
            obs(7, 5, 0, Parameter::WindSpeed, 2.0),
            obs(3, 5, 0, Parameter::WindSpeed, 1.0),
        ]);
        assert_eq!(c.lookup(GridCell::new(5, 5), t0(), Parameter::WindSpeed), Some(1.0));
    }

    #[test]
    fn staleness_bound_rejects_distant_matches() {
        let c = coupler(vec![obs(0, 0, 0, Parameter::WindSpeed, 5.0)])
            .with_max_time_distance(Duration::hours(2));
        let cell = GridCell::new(0, 0);
        assert_eq!(c.lookup(cell, t0() + Duration::hours(2), Parameter::WindSpeed), Some(5.0));
        assert_eq!(c.lookup(cell, t0() + Duration::hours(3), Parameter::WindSpeed), None);
    }

    #[test]
    fn lookup_all_is_independent_per_parameter() {
        let mut data = full_hour(4, 4, 0, 8.0, 270.0, 10.0);
        data.push(obs(6, 6, 0, Parameter::WindSpeed, 1.0));
        let c = coupler(data);
        let values = c.lookup_all(GridCell::new(6, 7), t0());
        // (6, 6) is closer for speed, (4, 4) is the only source for the rest
        assert_eq!(values.get(Parameter::WindSpeed), Some(1.0));
        assert_eq!(values.get(Parameter::WindDirection), Some(270.0));
        assert_eq!(values.get(Parameter::Temperature), Some(10.0));
    }

    #[test]
    fn window_uses_circular_mean_for_direction() {
        let mut data = full_hour(0, 0, 0, 6.0, 350.0, 10.0);
        data.extend(full_hour(0, 0, 1, 8.0, 10.0, 12.0));
        let c = coupler(data);

        let avg = c
            .average_over_window(GridCell::new(0, 0), t0() + Duration::hours(1), 2)
            .expect("window average");
        assert_eq!(avg.valid_samples, 2);
        assert!((avg.sample.wind_speed_ms - 7.0).abs() < 1e-9);
        assert!((avg.sample.temperature_c - 11.0).abs() < 1e-9);
        let d = avg.sample.wind_direction_deg;
        assert!(d < 1e-6 || d > 360.0 - 1e-6, "direction {d} should be near north");
    }

    #[test]
    fn window_falls_back_to_single_point() {
        let mut data = full_hour(0, 0, 0, 6.0, 180.0, 10.0);
        // speed only in the window hours, so no point inside is complete
        data.push(obs(0, 0, 5, Parameter::WindSpeed, 9.0));
        let c = coupler(data).with_max_time_distance(Duration::hours(1));
        let end = t0() + Duration::hours(5);

        // direction and temperature are out of range at every point
        assert!(c.average_over_window(GridCell::new(0, 0), end, 3).is_none());

        let unbounded = coupler(vec![
            obs(0, 0, 0, Parameter::WindSpeed, 6.0),
            obs(0, 0, 0, Parameter::WindDirection, 180.0),
            obs(0, 0, 0, Parameter::Temperature, 10.0),
        ]);
        let avg = unbounded.average_over_window(GridCell::new(0, 0), t0(), 0);
        assert_eq!(avg.map(|a| a.valid_samples), Some(0));
        assert_eq!(avg.map(|a| a.sample.wind_speed_ms), Some(6.0));
    }

    #[test]
    fn coverage_checks_the_window_not_the_nearest_value() {
        let c = coupler(full_hour(2, 2, 0, 8.0, 270.0, 10.0));
        let cell = GridCell::new(2, 2);
        let at = |h: i64| t0() + Duration::hours(h);

        assert!(c.covers_window(cell, at(-1), at(0)));
        assert!(c.covers_window(cell, at(0), at(1)));
        assert!(!c.covers_window(cell, at(1), at(2)));
        // the nearest value is still returned outside the covered period
        assert_eq!(c.lookup(cell, at(2), Parameter::WindSpeed), Some(8.0));
    }

    #[test]
    fn coverage_follows_spatial_fallback() {
        let mut data = full_hour(2, 2, 0, 8.0, 270.0, 10.0);
        data.extend(full_hour(9, 9, 5, 8.0, 270.0, 10.0));
        let c = coupler(data);
        let at = |h: i64| t0() + Duration::hours(h);

        // (3, 3) has no data of its own and resolves to (2, 2)
        assert!(c.covers_window(GridCell::new(3, 3), at(0), at(1)));
        assert!(!c.covers_window(GridCell::new(3, 3), at(4), at(5)));
        assert!(c.covers_window(GridCell::new(8, 8), at(4), at(5)));
    }

    #[test]
    fn empty_index_yields_nothing() {
        let c = coupler(Vec::new());
        assert!(c.lookup(GridCell::new(0, 0), t0(), Parameter::WindSpeed).is_none());
        assert!(c.average_over_window(GridCell::new(0, 0), t0(), 6).is_none());
        assert!(!c.covers_window(GridCell::new(0, 0), t0(), t0()));
    }
}
