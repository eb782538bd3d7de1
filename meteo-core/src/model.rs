use std::collections::BTreeMap;

use serde::Serialize;

use crate::time::{NullableTime, TimeValue};

/// Astronomical events delivered as timestamp series in the `daily` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SunEvent {
    Sunrise,
    Sunset,
}

impl SunEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SunEvent::Sunrise => "sunrise",
            SunEvent::Sunset => "sunset",
        }
    }

    pub const fn all() -> &'static [SunEvent] {
        &[SunEvent::Sunrise, SunEvent::Sunset]
    }

    /// Match a `daily` key against the known event names.
    pub fn from_key(key: &str) -> Option<SunEvent> {
        SunEvent::all().iter().copied().find(|e| e.as_str() == key)
    }
}

impl std::fmt::Display for SunEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single observation from a `current_weather` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeather {
    pub time: NullableTime,
    pub temperature: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    /// WMO weather interpretation code.
    pub weather_code: i32,
}

/// A decoded response.
///
/// Metric series mirror the source arrays one-to-one. Lengths are not
/// reconciled with the time index; use [`WeatherResult::check_alignment`] when
/// the caller depends on equal lengths.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WeatherResult {
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
    pub generation_time_ms: f64,
    pub utc_offset_seconds: i64,
    pub timezone: String,
    pub timezone_abbreviation: String,

    pub hourly_times: Vec<TimeValue>,
    pub hourly_metrics: BTreeMap<String, Vec<f64>>,

    pub daily_times: Vec<TimeValue>,
    pub daily_metrics: BTreeMap<String, Vec<f64>>,

    /// Only holds events the `daily` section actually contained.
    pub sun_times: BTreeMap<SunEvent, Vec<TimeValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_weather: Option<CurrentWeather>,
}

/// A series whose length differs from the time index it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Series '{series}' has {found} samples but its time index has {expected}")]
pub struct AlignmentError {
    pub series: String,
    pub expected: usize,
    pub found: usize,
}

impl WeatherResult {
    pub fn hourly_metric(&self, name: &str) -> Option<&[f64]> {
        self.hourly_metrics.get(name).map(Vec::as_slice)
    }

    pub fn daily_metric(&self, name: &str) -> Option<&[f64]> {
        self.daily_metrics.get(name).map(Vec::as_slice)
    }

    pub fn sun_times(&self, event: SunEvent) -> Option<&[TimeValue]> {
        self.sun_times.get(&event).map(Vec::as_slice)
    }

    /// Report the first series that is not index-aligned with its time array.
    pub fn check_alignment(&self) -> Result<(), AlignmentError> {
        let hourly = self
            .hourly_metrics
            .iter()
            .map(|(k, v)| (format!("hourly.{k}"), v.len(), self.hourly_times.len()));
        let daily = self
            .daily_metrics
            .iter()
            .map(|(k, v)| (format!("daily.{k}"), v.len(), self.daily_times.len()));
        let sun = self
            .sun_times
            .iter()
            .map(|(k, v)| (format!("daily.{k}"), v.len(), self.daily_times.len()));

        for (series, found, expected) in hourly.chain(daily).chain(sun) {
            if found != expected {
                return Err(AlignmentError { series, expected, found });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sun_event_from_key() {
        assert_eq!(SunEvent::from_key("sunrise"), Some(SunEvent::Sunrise));
        assert_eq!(SunEvent::from_key("sunset"), Some(SunEvent::Sunset));
        assert_eq!(SunEvent::from_key("daylight_duration"), None);
    }

    #[test]
    fn alignment_reports_short_series() {
        let t = TimeValue::from_ymd_hm(2024, 8, 30, 0, 0).unwrap();
        let mut res = WeatherResult {
            hourly_times: vec![t, t, t],
            ..Default::default()
        };
        res.hourly_metrics.insert("temperature_2m".into(), vec![1.0, 2.0, 3.0]);
        assert!(res.check_alignment().is_ok());

        res.hourly_metrics.insert("cloud_cover".into(), vec![1.0]);
        let err = res.check_alignment().unwrap_err();
        assert_eq!(err.series, "hourly.cloud_cover");
        assert_eq!(err.expected, 3);
        assert_eq!(err.found, 1);
    }

    #[test]
    fn empty_result_is_aligned() {
        assert!(WeatherResult::default().check_alignment().is_ok());
    }
}
