//! Wind power physics and temporal energy aggregation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc};
use serde::Serialize;

use crate::error::SimError;

/// Sea-level standard air density (kg/m³).
pub const STANDARD_AIR_DENSITY: f64 = 1.225;
/// 0 °C in kelvin.
const KELVIN_OFFSET: f64 = 273.15;
/// Default cut-in wind speed (m/s).
pub const DEFAULT_CUT_IN_MS: f64 = 3.0;
/// Default cut-out wind speed (m/s).
pub const DEFAULT_CUT_OUT_MS: f64 = 25.0;
/// Default rotor power coefficient.
pub const DEFAULT_POWER_COEFFICIENT: f64 = 0.4;

/// Calendar-aligned time resolution for clock steps and reporting buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Resolution {
    pub const NAMES: &[&str] = &["hourly", "daily", "weekly", "monthly"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hourly => "hourly",
            Resolution::Daily => "daily",
            Resolution::Weekly => "weekly",
            Resolution::Monthly => "monthly",
        }
    }

    /// Start of the calendar bucket containing `ts`.
    ///
    /// Daily buckets start at midnight UTC, weekly buckets on Monday (ISO
    /// week), monthly buckets on the first day of the month.
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = ts.date_naive();
        match self {
            Resolution::Hourly => midnight(date) + Duration::hours(i64::from(ts.hour())),
            Resolution::Daily => midnight(date),
            Resolution::Weekly => {
                let back = i64::from(date.weekday().num_days_from_monday());
                midnight(date - Duration::days(back))
            }
            Resolution::Monthly => {
                let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date);
                midnight(first)
            }
        }
    }

    /// Advances `ts` by one calendar unit.
    ///
    /// Monthly steps keep the day of month where possible and clamp to the
    /// last day otherwise (Jan 31 -> Feb 29 in a leap year). Returns `None`
    /// only when the result is out of chrono's range.
    pub fn advance(&self, ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Resolution::Hourly => ts.checked_add_signed(Duration::hours(1)),
            Resolution::Daily => ts.checked_add_signed(Duration::days(1)),
            Resolution::Weekly => ts.checked_add_signed(Duration::weeks(1)),
            Resolution::Monthly => ts.checked_add_months(Months::new(1)),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" | "h" => Ok(Resolution::Hourly),
            "daily" | "d" => Ok(Resolution::Daily),
            "weekly" | "w" => Ok(Resolution::Weekly),
            "monthly" | "m" => Ok(Resolution::Monthly),
            _ => Err(SimError::UnknownResolution(s.to_string())),
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::default()).and_utc()
}

/// Instantaneous power held for a duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSample {
    pub timestamp: DateTime<Utc>,
    pub power_kw: f64,
    /// Duration the power level applies for (hours).
    pub hours: f64,
}

/// Energy accumulated in one calendar bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyBucket {
    /// Bucket start (UTC).
    pub start: DateTime<Utc>,
    /// Energy in kilowatt-hours.
    pub energy_kwh: f64,
}

/// Converts wind and temperature samples into turbine power.
///
/// Power follows the standard rotor disk model
///
/// ```text
/// P = 0.5 * rho * A * v_eff^3 * Cp
/// ```
///
/// with `v_eff` the wind component along the rotor axis and `rho` a
/// temperature corrected air density. Output is zero outside
/// `[cut_in, cut_out)` and never exceeds rated capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyCalculator {
    /// Rotor diameter (m).
    pub rotor_diameter_m: f64,
    /// Rated capacity (kW).
    pub capacity_kw: f64,
    /// Direction the rotor faces (degrees, meteorological convention).
    pub azimuth_deg: f64,
    /// Fraction of wind power extracted by the rotor.
    pub power_coefficient: f64,
    /// Minimum effective wind speed that produces power (m/s).
    pub cut_in_ms: f64,
    /// Effective wind speed at which the turbine shuts down (m/s).
    pub cut_out_ms: f64,
    swept_area_m2: f64,
}

impl EnergyCalculator {
    /// Creates a calculator with the default 3-25 m/s operating envelope.
    ///
    /// # Arguments
    ///
    /// * `rotor_diameter_m` - Rotor diameter in meters
    /// * `capacity_kw` - Rated capacity in kW
    /// * `azimuth_deg` - Rotor orientation in degrees
    /// * `power_coefficient` - Rotor power coefficient (Cp)
    pub fn new(rotor_diameter_m: f64, capacity_kw: f64, azimuth_deg: f64, power_coefficient: f64) -> Self {
        let rotor_diameter_m = rotor_diameter_m.max(0.0);
        Self {
            rotor_diameter_m,
            capacity_kw: capacity_kw.max(0.0),
            azimuth_deg,
            power_coefficient: power_coefficient.max(0.0),
            cut_in_ms: DEFAULT_CUT_IN_MS,
            cut_out_ms: DEFAULT_CUT_OUT_MS,
            swept_area_m2: swept_area(rotor_diameter_m),
        }
    }

    /// Returns the calculator with a custom operating envelope.
    pub fn with_envelope(mut self, cut_in_ms: f64, cut_out_ms: f64) -> Self {
        self.cut_in_ms = cut_in_ms;
        self.cut_out_ms = cut_out_ms;
        self
    }

    /// Rotor disk area (m²).
    pub fn swept_area_m2(&self) -> f64 {
        self.swept_area_m2
    }

    /// Wind speed component along the rotor axis.
    ///
    /// Wind arriving more than 90° off axis contributes nothing.
    pub fn effective_wind_speed(&self, wind_speed_ms: f64, wind_direction_deg: f64) -> f64 {
        let theta = (wind_direction_deg - self.azimuth_deg).to_radians();
        wind_speed_ms * theta.cos().max(0.0)
    }

    /// Instantaneous power (kW) for one weather sample.
    ///
    /// Non-finite input yields 0.
    pub fn power(&self, wind_speed_ms: f64, wind_direction_deg: f64, temperature_c: f64) -> f64 {
        if !(wind_speed_ms.is_finite() && wind_direction_deg.is_finite() && temperature_c.is_finite()) {
            return 0.0;
        }
        let v = self.effective_wind_speed(wind_speed_ms, wind_direction_deg);
        if v < self.cut_in_ms || v >= self.cut_out_ms {
            return 0.0;
        }
        let rho = air_density(temperature_c);
        let watts = 0.5 * rho * self.swept_area_m2 * v.powi(3) * self.power_coefficient;
        (watts / 1000.0).clamp(0.0, self.capacity_kw)
    }

    /// Resamples a power series into calendar buckets of energy (kWh).
    ///
    /// Each sample contributes `power_kw * hours` to the bucket containing its
    /// timestamp. Buckets between the first and last sample are always
    /// present, with zero energy where nothing was produced. An empty input
    /// yields an empty series.
    pub fn energy_over_period(samples: &[PowerSample], resolution: Resolution) -> Vec<EnergyBucket> {
        let mut buckets: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
        for s in samples {
            *buckets.entry(resolution.bucket_start(s.timestamp)).or_insert(0.0) += s.power_kw * s.hours;
        }

        let (Some(first), Some(last)) = (
            buckets.keys().next().copied(),
            buckets.keys().next_back().copied(),
        ) else {
            return Vec::new();
        };

        let mut cursor = first;
        while cursor < last {
            buckets.entry(cursor).or_insert(0.0);
            match resolution.advance(cursor) {
                Some(next) => cursor = resolution.bucket_start(next),
                None => break,
            }
        }

        buckets
            .into_iter()
            .map(|(start, energy_kwh)| EnergyBucket { start, energy_kwh })
            .collect()
    }
}

/// Rotor disk area `pi * (d / 2)^2`.
pub fn swept_area(rotor_diameter_m: f64) -> f64 {
    std::f64::consts::PI * (rotor_diameter_m / 2.0).powi(2)
}

/// Ideal-gas density correction relative to sea-level standard air.
pub fn air_density(temperature_c: f64) -> f64 {
    STANDARD_AIR_DENSITY * (KELVIN_OFFSET / (temperature_c + KELVIN_OFFSET))
}

/// Wraps an angle into `[0, 360)`.
pub fn normalize_deg(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    if r >= 360.0 { 0.0 } else { r }
}

/// Circular mean of angles in degrees, normalized into `[0, 360)`.
///
/// Returns `None` for an empty input.
pub fn circular_mean_deg(angles: impl IntoIterator<Item = f64>) -> Option<f64> {
    let mut sum_sin = 0.0;
    let mut sum_cos = 0.0;
    let mut n = 0usize;
    for a in angles {
        let (s, c) = a.to_radians().sin_cos();
        sum_sin += s;
        sum_cos += c;
        n += 1;
    }
    (n > 0).then(|| normalize_deg(sum_sin.atan2(sum_cos).to_degrees()))
}
