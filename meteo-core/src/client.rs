use std::sync::Arc;

use log::debug;

use crate::{
    config::{Config, Endpoints},
    error::ClientError,
    model::WeatherResult,
    options::{ForecastOptions, HistoricalOptions, Location},
    parse::{parse_forecast_body, parse_historical_body},
    transport::{HttpTransport, Transport},
};

/// Issues forecast and historical requests and decodes the replies.
#[derive(Debug, Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
}

impl Client {
    /// Client for the public endpoints with default settings.
    pub fn new() -> Result<Self, ClientError> {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config.user_agent(), config.timeout())?;
        Ok(Self::with_transport(Arc::new(transport), config.endpoints()))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self { transport, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn forecast(
        &self,
        location: &Location,
        options: &ForecastOptions,
    ) -> Result<WeatherResult, ClientError> {
        let query = options.to_query(location)?;
        debug!("Requesting forecast for {location:?}");

        let body = self.transport.get(&self.endpoints.forecast, &query).await?;
        Ok(parse_forecast_body(&body)?)
    }

    pub async fn historical(
        &self,
        location: &Location,
        options: &HistoricalOptions,
    ) -> Result<WeatherResult, ClientError> {
        let query = options.to_query(location)?;
        debug!("Requesting history for {location:?}");

        let body = self.transport.get(&self.endpoints.archive, &query).await?;
        Ok(parse_historical_body(&body)?)
    }
}
