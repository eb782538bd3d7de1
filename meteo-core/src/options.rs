use std::convert::TryFrom;

use crate::{
    error::ClientError,
    time::{TimeLayout, TimeValue},
};

/// Query parameters in the order they are sent.
pub type Query = Vec<(&'static str, String)>;

/// A validated coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ClientError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(ClientError::InvalidLocation { latitude, longitude });
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    fn push_query(&self, query: &mut Query) {
        query.push(("latitude", self.latitude.to_string()));
        query.push(("longitude", self.longitude.to_string()));
    }
}

macro_rules! unit_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub const fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = anyhow::Error;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                let lower = value.to_lowercase();
                $name::all()
                    .iter()
                    .copied()
                    .find(|u| u.as_str() == lower)
                    .ok_or_else(|| {
                        let supported: Vec<_> = $name::all().iter().map(|u| u.as_str()).collect();
                        anyhow::anyhow!(
                            "Unknown {} '{value}'. Supported: {}.",
                            $what,
                            supported.join(", ")
                        )
                    })
            }
        }

        impl TryFrom<String> for $name {
            type Error = anyhow::Error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                $name::try_from(value.as_str())
            }
        }

        impl From<$name> for &'static str {
            fn from(value: $name) -> Self {
                value.as_str()
            }
        }
    };
}

unit_enum!(TemperatureUnit, "temperature unit" {
    Celsius => "celsius",
    Fahrenheit => "fahrenheit",
});

unit_enum!(WindspeedUnit, "windspeed unit" {
    Kmh => "kmh",
    Ms => "ms",
    Mph => "mph",
    Kn => "kn",
});

unit_enum!(PrecipitationUnit, "precipitation unit" {
    Mm => "mm",
    Inch => "inch",
});

/// Unit and timezone settings shared by both endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOptions {
    pub temperature_unit: Option<TemperatureUnit>,
    pub windspeed_unit: Option<WindspeedUnit>,
    pub precipitation_unit: Option<PrecipitationUnit>,
    pub timezone: Option<String>,
}

impl UnitOptions {
    fn push_query(&self, query: &mut Query) {
        if let Some(u) = self.temperature_unit {
            query.push(("temperature_unit", u.to_string()));
        }
        if let Some(u) = self.windspeed_unit {
            query.push(("windspeed_unit", u.to_string()));
        }
        if let Some(u) = self.precipitation_unit {
            query.push(("precipitation_unit", u.to_string()));
        }
        if let Some(tz) = self.timezone.as_deref().filter(|tz| !tz.is_empty()) {
            query.push(("timezone", tz.to_string()));
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastOptions {
    pub units: UnitOptions,
    pub past_days: Option<u32>,
    pub current_weather: bool,
    pub start_hour: Option<TimeValue>,
    pub end_hour: Option<TimeValue>,
    pub hourly_metrics: Vec<String>,
    pub daily_metrics: Vec<String>,
}

impl ForecastOptions {
    pub fn to_query(&self, location: &Location) -> Result<Query, ClientError> {
        if let (Some(start), Some(end)) = (self.start_hour, self.end_hour) {
            check_range(start, end, TimeLayout::DateTime)?;
        }

        let mut query = Query::new();
        location.push_query(&mut query);
        self.units.push_query(&mut query);

        if let Some(days) = self.past_days {
            query.push(("past_days", days.to_string()));
        }
        if self.current_weather {
            query.push(("current_weather", "true".to_string()));
        }
        if let Some(start) = self.start_hour {
            query.push(("start_hour", start.format(TimeLayout::DateTime)));
        }
        if let Some(end) = self.end_hour {
            query.push(("end_hour", end.format(TimeLayout::DateTime)));
        }
        push_metrics(&mut query, "hourly", &self.hourly_metrics);
        push_metrics(&mut query, "daily", &self.daily_metrics);

        Ok(query)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalOptions {
    pub units: UnitOptions,
    pub start_date: TimeValue,
    pub end_date: TimeValue,
    pub hourly_metrics: Vec<String>,
    pub daily_metrics: Vec<String>,
}

impl HistoricalOptions {
    pub fn new(start_date: TimeValue, end_date: TimeValue) -> Self {
        Self {
            units: UnitOptions::default(),
            start_date,
            end_date,
            hourly_metrics: Vec::new(),
            daily_metrics: Vec::new(),
        }
    }

    pub fn to_query(&self, location: &Location) -> Result<Query, ClientError> {
        check_range(self.start_date, self.end_date, TimeLayout::Date)?;

        let mut query = Query::new();
        location.push_query(&mut query);
        self.units.push_query(&mut query);
        query.push(("start_date", self.start_date.format(TimeLayout::Date)));
        query.push(("end_date", self.end_date.format(TimeLayout::Date)));
        push_metrics(&mut query, "hourly", &self.hourly_metrics);
        push_metrics(&mut query, "daily", &self.daily_metrics);

        Ok(query)
    }
}

fn check_range(start: TimeValue, end: TimeValue, layout: TimeLayout) -> Result<(), ClientError> {
    if end < start {
        return Err(ClientError::InvalidOptions(format!(
            "end {} is before start {}",
            end.format(layout),
            start.format(layout)
        )));
    }
    Ok(())
}

fn push_metrics(query: &mut Query, key: &'static str, metrics: &[String]) {
    let names: Vec<&str> = metrics
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect();
    if !names.is_empty() {
        query.push((key, names.join(",")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> TimeValue {
        TimeValue::parse(s, TimeLayout::Date).unwrap()
    }

    #[test]
    fn location_bounds() {
        assert!(Location::new(52.3738, 4.8910).is_ok());
        assert!(Location::new(-90.0, 180.0).is_ok());
        assert!(matches!(
            Location::new(91.0, 0.0),
            Err(ClientError::InvalidLocation { .. })
        ));
        assert!(Location::new(0.0, -180.5).is_err());
        assert!(Location::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn unit_as_str_roundtrip() {
        for u in TemperatureUnit::all() {
            assert_eq!(TemperatureUnit::try_from(u.as_str()).unwrap(), *u);
        }
        for u in WindspeedUnit::all() {
            assert_eq!(WindspeedUnit::try_from(u.as_str()).unwrap(), *u);
        }
        assert_eq!(PrecipitationUnit::try_from("INCH").unwrap(), PrecipitationUnit::Inch);
    }

    #[test]
    fn unknown_unit_error() {
        let err = WindspeedUnit::try_from("furlongs").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown windspeed unit"));
        assert!(msg.contains("kmh, ms, mph, kn"));
    }

    #[test]
    fn historical_query() {
        let loc = Location::new(52.3738, 4.891).unwrap();
        let mut opts = HistoricalOptions::new(date("2023-05-01"), date("2023-06-01"));
        opts.units = UnitOptions {
            temperature_unit: Some(TemperatureUnit::Fahrenheit),
            windspeed_unit: Some(WindspeedUnit::Mph),
            precipitation_unit: Some(PrecipitationUnit::Inch),
            timezone: Some("US/Eastern".into()),
        };
        opts.hourly_metrics = vec!["cloudcover".into(), "relativehumidity_2m".into()];
        opts.daily_metrics = vec!["temperature_2m_max".into(), "sunrise".into()];

        let query = opts.to_query(&loc).unwrap();
        let expected: Query = vec![
            ("latitude", "52.3738".into()),
            ("longitude", "4.891".into()),
            ("temperature_unit", "fahrenheit".into()),
            ("windspeed_unit", "mph".into()),
            ("precipitation_unit", "inch".into()),
            ("timezone", "US/Eastern".into()),
            ("start_date", "2023-05-01".into()),
            ("end_date", "2023-06-01".into()),
            ("hourly", "cloudcover,relativehumidity_2m".into()),
            ("daily", "temperature_2m_max,sunrise".into()),
        ];
        assert_eq!(query, expected);
    }

    #[test]
    fn historical_rejects_reversed_range() {
        let loc = Location::new(0.0, 0.0).unwrap();
        let opts = HistoricalOptions::new(date("2023-06-01"), date("2023-05-01"));
        let err = opts.to_query(&loc).unwrap_err();
        assert!(err.to_string().contains("end 2023-05-01 is before start 2023-06-01"));
    }

    #[test]
    fn forecast_query_omits_unset_options() {
        let loc = Location::new(52.52, 13.419).unwrap();
        let query = ForecastOptions::default().to_query(&loc).unwrap();
        assert_eq!(
            query,
            vec![("latitude", "52.52".to_string()), ("longitude", "13.419".to_string())]
        );
    }

    #[test]
    fn forecast_query_uses_roundtrip_hours() {
        let loc = Location::new(52.52, 13.419).unwrap();
        let opts = ForecastOptions {
            current_weather: true,
            past_days: Some(2),
            start_hour: Some(TimeValue::parse("2021-08-28T00:00", TimeLayout::DateTime).unwrap()),
            end_hour: Some(TimeValue::parse("2021-08-28T12:00", TimeLayout::DateTime).unwrap()),
            hourly_metrics: vec!["temperature_2m".into(), " ".into()],
            ..Default::default()
        };

        let query = opts.to_query(&loc).unwrap();
        assert!(query.contains(&("current_weather", "true".into())));
        assert!(query.contains(&("past_days", "2".into())));
        assert!(query.contains(&("start_hour", "2021-08-28T00:00".into())));
        assert!(query.contains(&("end_hour", "2021-08-28T12:00".into())));
        assert!(query.contains(&("hourly", "temperature_2m".into())));
        assert!(!query.iter().any(|(k, _)| *k == "daily"));
    }
}
