//! Cell- and parameter-partitioned weather time series.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::types::{Parameter, WeatherObservation};
use crate::geo::GridCell;

/// One value on a time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedValue {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Time-ordered series of every parameter observed in one cell.
#[derive(Debug, Clone, Default)]
pub struct CellSeries {
    series: [Vec<TimedValue>; 3],
}

impl CellSeries {
    /// Series for `parameter`, sorted by time. Equal timestamps keep
    /// their input order.
    pub fn get(&self, parameter: Parameter) -> &[TimedValue] {
        &self.series[parameter.index()]
    }

    pub fn has(&self, parameter: Parameter) -> bool {
        !self.series[parameter.index()].is_empty()
    }

    pub fn len(&self) -> usize {
        self.series.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only index from grid cell to per-parameter time series.
///
/// Built once from the raw observation set. Cells iterate in `(x, y)` order.
#[derive(Debug, Clone, Default)]
pub struct WeatherIndex {
    cells: BTreeMap<GridCell, CellSeries>,
    observations: usize,
}

impl WeatherIndex {
    /// Indexes observations by cell and parameter and sorts each series by
    /// time with a stable sort.
    pub fn build(observations: impl IntoIterator<Item = WeatherObservation>) -> Self {
        let mut cells: BTreeMap<GridCell, CellSeries> = BTreeMap::new();
        let mut count = 0;
        for obs in observations {
            cells.entry(obs.cell).or_default().series[obs.parameter.index()].push(TimedValue {
                timestamp: obs.timestamp,
                value: obs.value,
            });
            count += 1;
        }
        for series in cells.values_mut() {
            for s in &mut series.series {
                s.sort_by_key(|tv| tv.timestamp);
            }
        }
        Self {
            cells,
            observations: count,
        }
    }

    /// All observations at `cell`, if any were recorded there.
    pub fn cell(&self, cell: &GridCell) -> Option<&CellSeries> {
        self.cells.get(cell)
    }

    /// Indexed cells in `(x, y)` order.
    pub fn cells(&self) -> impl Iterator<Item = (&GridCell, &CellSeries)> {
        self.cells.iter()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn observation_count(&self) -> usize {
        self.observations
    }

    pub fn is_empty(&self) -> bool {
        self.observations == 0
    }

    /// Earliest and latest observation time across the index.
    pub fn time_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut span: Option<(DateTime<Utc>, DateTime<Utc>)> = None;
        for series in self.cells.values() {
            for s in &series.series {
                let (Some(first), Some(last)) = (s.first(), s.last()) else {
                    continue;
                };
                span = Some(match span {
                    None => (first.timestamp, last.timestamp),
                    Some((lo, hi)) => (lo.min(first.timestamp), hi.max(last.timestamp)),
                });
            }
        }
        span
    }
}

/// Finds the entry closest in time to `target` in a time-sorted series.
///
/// Binary search instead of a scan. On equal distance the earlier entry
/// wins, and among entries sharing a timestamp the first one in the series.
pub fn nearest_in_time(series: &[TimedValue], target: DateTime<Utc>) -> Option<&TimedValue> {
    let after = series.partition_point(|tv| tv.timestamp < target);

    let before = after.checked_sub(1).map(|i| {
        let ts = series[i].timestamp;
        series.partition_point(|tv| tv.timestamp < ts)
    });

    match (before, series.get(after)) {
        (None, None) => None,
        (None, Some(a)) => Some(a),
        (Some(b), None) => series.get(b),
        (Some(b), Some(a)) => {
            let b_entry = &series[b];
            let d_before = target - b_entry.timestamp;
            let d_after = a.timestamp - target;
            if d_before <= d_after { Some(b_entry) } else { Some(a) }
        }
    }
}

/// Returns `true` if a time-sorted series has an entry in `[start, end]`.
pub fn any_within(series: &[TimedValue], start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    let first = series.partition_point(|tv| tv.timestamp < start);
    series.get(first).is_some_and(|tv| tv.timestamp <= end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn tv(minutes: i64, value: f64) -> TimedValue {
        TimedValue {
            timestamp: t0() + Duration::minutes(minutes),
            value,
        }
    }

    fn obs(cell: GridCell, minutes: i64, parameter: Parameter, value: f64) -> WeatherObservation {
        WeatherObservation {
            station_id: "06180".into(),
            cell,
            timestamp: t0() + Duration::minutes(minutes),
            parameter,
            value,
        }
    }

    #[test]
    fn nearest_picks_closest() {
        let s = vec![tv(0, 1.0), tv(60, 2.0), tv(120, 3.0)];
        let at = |m| nearest_in_time(&s, t0() + Duration::minutes(m)).map(|v| v.value);
        assert_eq!(at(-30), Some(1.0));
        assert_eq!(at(50), Some(2.0));
        assert_eq!(at(60), Some(2.0));
        assert_eq!(at(500), Some(3.0));
    }

    #[test]
    fn tie_goes_to_earlier_entry() {
        let s = vec![tv(0, 1.0), tv(60, 2.0)];
        let v = nearest_in_time(&s, t0() + Duration::minutes(30)).map(|v| v.value);
        assert_eq!(v, Some(1.0));
    }

    #[test]
    fn duplicate_timestamps_resolve_to_first() {
        let s = vec![tv(0, 1.0), tv(0, 1.5), tv(60, 2.0), tv(60, 2.5)];
        let at = |m| nearest_in_time(&s, t0() + Duration::minutes(m)).map(|v| v.value);
        assert_eq!(at(10), Some(1.0));
        assert_eq!(at(60), Some(2.0));
        assert_eq!(at(90), Some(2.0));
    }

    #[test]
    fn empty_series() {
        assert!(nearest_in_time(&[], t0()).is_none());
        assert!(!any_within(&[], t0(), t0()));
    }

    #[test]
    fn any_within_is_inclusive() {
        let s = vec![tv(0, 1.0), tv(120, 2.0)];
        let at = |from, to| any_within(&s, t0() + Duration::minutes(from), t0() + Duration::minutes(to));
        assert!(at(0, 0));
        assert!(at(60, 120));
        assert!(!at(1, 119));
        assert!(!at(121, 600));
        assert!(at(-60, 0));
    }

    #[test]
    fn build_partitions_and_sorts() {
        let c = GridCell::new(3, 4);
        let idx = WeatherIndex::build(vec![
            obs(c, 120, Parameter::WindSpeed, 7.0),
            obs(c, 0, Parameter::WindSpeed, 5.0),
            obs(c, 60, Parameter::Temperature, 11.0),
            obs(GridCell::new(0, 0), 0, Parameter::WindDirection, 200.0),
        ]);
        assert_eq!(idx.cell_count(), 2);
        assert_eq!(idx.observation_count(), 4);

        let values: Vec<f64> = idx.cell(&c).unwrap().get(Parameter::WindSpeed).iter().map(|v| v.value).collect();
        assert_eq!(values, vec![5.0, 7.0]);
        assert!(idx.cell(&c).is_some_and(|s| !s.has(Parameter::WindDirection)));

        let order: Vec<GridCell> = idx.cells().map(|(c, _)| *c).collect();
        assert_eq!(order, vec![GridCell::new(0, 0), c]);
    }

    #[test]
    fn stable_sort_keeps_input_order_for_equal_times() {
        let c = GridCell::new(1, 1);
        let idx = WeatherIndex::build(vec![
            obs(c, 60, Parameter::WindSpeed, 9.0),
            obs(c, 0, Parameter::WindSpeed, 4.0),
            obs(c, 60, Parameter::WindSpeed, 8.0),
        ]);
        let values: Vec<f64> = idx.cell(&c).unwrap().get(Parameter::WindSpeed).iter().map(|v| v.value).collect();
        assert_eq!(values, vec![4.0, 9.0, 8.0]);
    }

    #[test]
    fn time_span_covers_all_series() {
        let idx = WeatherIndex::build(vec![
            obs(GridCell::new(0, 0), 30, Parameter::WindSpeed, 1.0),
            obs(GridCell::new(5, 5), -30, Parameter::Temperature, 1.0),
            obs(GridCell::new(5, 5), 300, Parameter::Temperature, 1.0),
        ]);
        assert_eq!(
            idx.time_span(),
            Some((t0() - Duration::minutes(30), t0() + Duration::minutes(300)))
        );
        assert!(WeatherIndex::default().time_span().is_none());
    }
}
