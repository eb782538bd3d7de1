//! Core library for the `meteo` CLI.
//!
//! This crate defines:
//! - A timestamp codec for the API's date and date-hour-minute layouts
//! - Decoding of dynamically shaped forecast / archive responses
//! - Request options, an HTTP transport and a client tying them together
//! - Configuration handling
//!
//! It is used by `meteo-cli`, but the decoder can be used on its own with bodies
//! fetched by any other means.

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod options;
pub mod parse;
pub mod time;
pub mod transport;

pub use client::Client;
pub use config::{Config, Endpoints};
pub use error::{ClientError, DecodeError};
pub use model::{AlignmentError, CurrentWeather, SunEvent, WeatherResult};
pub use options::{
    ForecastOptions, HistoricalOptions, Location, PrecipitationUnit, TemperatureUnit, UnitOptions,
    WindspeedUnit,
};
pub use parse::{SectionPolicy, parse_body, parse_forecast_body, parse_historical_body};
pub use time::{NullableTime, TimeLayout, TimeValue};
pub use transport::{HttpTransport, Transport};
