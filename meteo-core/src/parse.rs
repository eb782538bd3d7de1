//! Decoding of API response bodies into [`WeatherResult`].
//!
//! Decoding runs in two phases. The body is first read into generic JSON maps,
//! then each key of the `hourly` and `daily` sections is classified as the
//! reserved time index, a sun-event series, or a plain metric and projected
//! into the typed result.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::{
    error::DecodeError,
    model::{CurrentWeather, SunEvent, WeatherResult},
    time::{NullableTime, TimeLayout, TimeValue},
};

const TIME_KEY: &str = "time";

/// Which sections a decode entry point insists on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionPolicy {
    /// Every section is optional.
    AllOptional,
    /// At least one of `hourly` / `daily` must be present.
    RequireSeries,
}

/// Decode a forecast response. No section is required.
pub fn parse_forecast_body(body: &[u8]) -> Result<WeatherResult, DecodeError> {
    parse_body(body, SectionPolicy::AllOptional)
}

/// Decode a historical (archive) response, which must carry hourly or daily data.
pub fn parse_historical_body(body: &[u8]) -> Result<WeatherResult, DecodeError> {
    parse_body(body, SectionPolicy::RequireSeries)
}

pub fn parse_body(body: &[u8], policy: SectionPolicy) -> Result<WeatherResult, DecodeError> {
    let top: Map<String, Value> = serde_json::from_slice(body).map_err(DecodeError::InvalidJson)?;

    let hourly = section(&top, "hourly")?;
    let daily = section(&top, "daily")?;
    // Unit annotations only carry display strings; validate the shape and move on.
    section(&top, "hourly_units")?;
    section(&top, "daily_units")?;

    if policy == SectionPolicy::RequireSeries && hourly.is_none() && daily.is_none() {
        return Err(DecodeError::MissingRequiredSection);
    }

    let mut result = WeatherResult {
        latitude: number_or_zero(&top, "latitude")?,
        longitude: number_or_zero(&top, "longitude")?,
        elevation: number_or_zero(&top, "elevation")?,
        generation_time_ms: number_or_zero(&top, "generationtime_ms")?,
        utc_offset_seconds: integer_or_zero(&top, "utc_offset_seconds")?,
        timezone: string_or_empty(&top, "timezone")?,
        timezone_abbreviation: string_or_empty(&top, "timezone_abbreviation")?,
        ..Default::default()
    };

    if let Some(hourly) = hourly {
        for (key, value) in hourly {
            let path = format!("hourly.{key}");
            if key == TIME_KEY {
                result.hourly_times = time_series(&path, value, TimeLayout::DateHourMinute)?;
            } else {
                result.hourly_metrics.insert(key.clone(), number_series(&path, value)?);
            }
        }
        warn_on_mismatch("hourly", result.hourly_times.len(), &result.hourly_metrics);
    }

    if let Some(daily) = daily {
        for (key, value) in daily {
            let path = format!("daily.{key}");
            if key == TIME_KEY {
                result.daily_times = time_series(&path, value, TimeLayout::Date)?;
            } else if let Some(event) = SunEvent::from_key(key) {
                let times = time_series(&path, value, TimeLayout::DateHourMinute)?;
                result.sun_times.insert(event, times);
            } else {
                result.daily_metrics.insert(key.clone(), number_series(&path, value)?);
            }
        }
        warn_on_mismatch("daily", result.daily_times.len(), &result.daily_metrics);
    }

    match top.get("current_weather") {
        None | Some(Value::Null) => {}
        Some(current) => result.current_weather = Some(current_weather(current)?),
    }

    debug!(
        "Decoded response: {} hourly samples ({} metrics), {} daily samples ({} metrics), current weather: {}",
        result.hourly_times.len(),
        result.hourly_metrics.len(),
        result.daily_times.len(),
        result.daily_metrics.len(),
        result.current_weather.is_some(),
    );

    Ok(result)
}

fn section<'a>(
    top: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, DecodeError> {
    match top.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(shape(key, "object")),
    }
}

fn time_series(path: &str, value: &Value, layout: TimeLayout) -> Result<Vec<TimeValue>, DecodeError> {
    let items = value.as_array().ok_or_else(|| shape(path, "array of timestamp strings"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => TimeValue::parse(s, layout),
            _ => Err(shape(&format!("{path}[{i}]"), "timestamp string")),
        })
        .collect()
}

fn number_series(path: &str, value: &Value) -> Result<Vec<f64>, DecodeError> {
    let items = value.as_array().ok_or_else(|| shape(path, "array of numbers"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            // Missing samples keep their slot.
            Value::Null => Ok(f64::NAN),
            other => other
                .as_f64()
                .ok_or_else(|| shape(&format!("{path}[{i}]"), "number")),
        })
        .collect()
}

fn current_weather(value: &Value) -> Result<CurrentWeather, DecodeError> {
    let obj = value
        .as_object()
        .ok_or_else(|| shape("current_weather", "object"))?;

    let weather_code = match obj.get("weathercode") {
        None | Some(Value::Null) => 0,
        Some(v) => integral(v).ok_or_else(|| shape("current_weather.weathercode", "integer"))?,
    };

    Ok(CurrentWeather {
        time: NullableTime::from_json(
            "current_weather.time",
            obj.get(TIME_KEY),
            TimeLayout::DateHourMinute,
        )?,
        temperature: nested_number(obj, "temperature")?,
        wind_speed: nested_number(obj, "windspeed")?,
        wind_direction: nested_number(obj, "winddirection")?,
        weather_code,
    })
}

fn nested_number(obj: &Map<String, Value>, key: &str) -> Result<f64, DecodeError> {
    number_or_zero(obj, key).map_err(|_| shape(&format!("current_weather.{key}"), "number"))
}

fn number_or_zero(obj: &Map<String, Value>, key: &str) -> Result<f64, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => v.as_f64().ok_or_else(|| shape(key, "number")),
    }
}

fn integer_or_zero(obj: &Map<String, Value>, key: &str) -> Result<i64, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(v) => integral(v).ok_or_else(|| shape(key, "integer")),
    }
}

fn string_or_empty(obj: &Map<String, Value>, key: &str) -> Result<String, DecodeError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(shape(key, "string")),
    }
}

// Accepts `3` as well as `3.0`.
fn integral<T: TryFrom<i64>>(value: &Value) -> Option<T> {
    let n = match value.as_i64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 || f < i64::MIN as f64 || f > i64::MAX as f64 {
                return None;
            }
            f as i64
        }
    };
    T::try_from(n).ok()
}

fn shape(key: &str, expected: &'static str) -> DecodeError {
    DecodeError::InvalidShape {
        key: key.to_string(),
        expected,
    }
}

fn warn_on_mismatch(section: &str, expected: usize, metrics: &BTreeMap<String, Vec<f64>>) {
    for (name, values) in metrics {
        if values.len() != expected {
            warn!(
                "{section}.{name} has {} samples but {section}.time has {expected}",
                values.len()
            );
        }
    }
}
