use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::debug;
use meteo_core::{
    Client, Config, ForecastOptions, HistoricalOptions, Location, TimeLayout, TimeValue,
    WeatherResult,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Open-Meteo forecasts and weather history")]
pub struct Cli {
    /// Log debug output (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by the data-fetching commands.
#[derive(Debug, Args)]
pub struct Query {
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: f64,

    /// Comma-separated hourly metrics, e.g. temperature_2m,cloudcover.
    #[arg(long, value_delimiter = ',')]
    pub hourly: Vec<String>,

    /// Comma-separated daily metrics, e.g. temperature_2m_max,sunrise.
    #[arg(long, value_delimiter = ',')]
    pub daily: Vec<String>,

    /// IANA timezone name, or "auto".
    #[arg(long)]
    pub timezone: Option<String>,

    /// Print the decoded result as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the forecast for a coordinate.
    Forecast {
        #[command(flatten)]
        query: Query,

        /// Include the current weather observation.
        #[arg(long)]
        current: bool,

        /// Also return this many past days.
        #[arg(long)]
        past_days: Option<u32>,
    },

    /// Show recorded weather for a date range.
    Historical {
        #[command(flatten)]
        query: Query,

        /// First day, YYYY-MM-DD.
        #[arg(long, value_parser = parse_date)]
        start: NaiveDate,

        /// Last day, YYYY-MM-DD.
        #[arg(long, value_parser = parse_date)]
        end: NaiveDate,
    },

    /// Show the config file location and effective settings.
    Config,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    TimeValue::parse(s, TimeLayout::Date)
        .map(|t| t.date())
        .map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        debug!("Effective configuration: {config:?}");

        match self.command {
            Command::Forecast { query, current, past_days } => {
                let location = Location::new(query.lat, query.lon)?;
                let mut units = config.unit_options();
                if query.timezone.is_some() {
                    units.timezone = query.timezone.clone();
                }

                let options = ForecastOptions {
                    units,
                    past_days,
                    current_weather: current,
                    hourly_metrics: query.hourly.clone(),
                    daily_metrics: query.daily.clone(),
                    ..Default::default()
                };

                let client = Client::from_config(&config)?;
                let result = client
                    .forecast(&location, &options)
                    .await
                    .context("Failed to fetch forecast")?;
                print_result(&result, query.json)?;
            }
            Command::Historical { query, start, end } => {
                let location = Location::new(query.lat, query.lon)?;
                let mut options = HistoricalOptions::new(start.into(), end.into());
                options.units = config.unit_options();
                if query.timezone.is_some() {
                    options.units.timezone = query.timezone.clone();
                }
                options.hourly_metrics = query.hourly.clone();
                options.daily_metrics = query.daily.clone();

                let client = Client::from_config(&config)?;
                let result = client
                    .historical(&location, &options)
                    .await
                    .context("Failed to fetch weather history")?;
                print_result(&result, query.json)?;
            }
            Command::Config => {
                println!("Config file: {}", Config::config_file_path()?.display());
                print!("{}", config.to_toml()?);
            }
        }

        Ok(())
    }
}

fn print_result(result: &WeatherResult, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
        println!("{text}");
    } else {
        print!("{}", summary(result));
    }
    Ok(())
}

/// Human-readable overview: location, current weather, then first/last samples.
pub fn summary(result: &WeatherResult) -> String {
    let mut out = format!(
        "Location: {:.4}, {:.4} ({} m), timezone {}\n",
        result.latitude,
        result.longitude,
        result.elevation,
        if result.timezone.is_empty() { "GMT" } else { result.timezone.as_str() },
    );

    if let Some(cw) = &result.current_weather {
        let when = cw
            .time
            .get()
            .map(|t| t.to_string())
            .unwrap_or_else(|| "unknown time".to_string());
        out.push_str(&format!(
            "Current ({when}): {} °, wind {} @ {}°, code {}\n",
            cw.temperature, cw.wind_speed, cw.wind_direction, cw.weather_code
        ));
    }

    if let Err(err) = result.check_alignment() {
        out.push_str(&format!("Warning: {err}\n"));
    }

    for (label, times, metrics) in [
        ("Hourly", &result.hourly_times, &result.hourly_metrics),
        ("Daily", &result.daily_times, &result.daily_metrics),
    ] {
        if times.is_empty() {
            continue;
        }
        let first = times.first().map(|t| t.to_string()).unwrap_or_default();
        let last = times.last().map(|t| t.to_string()).unwrap_or_default();
        out.push_str(&format!("{label}: {} samples, {first} .. {last}\n", times.len()));
        for (name, values) in metrics {
            let shown: Vec<String> = values.iter().take(6).map(|v| v.to_string()).collect();
            let more = if values.len() > 6 { ", ..." } else { "" };
            out.push_str(&format!("  {name}: [{}{more}]\n", shown.join(", ")));
        }
    }

    for (event, times) in &result.sun_times {
        let shown: Vec<String> = times.iter().take(3).map(|t| t.to_string()).collect();
        out.push_str(&format!("  {event}: {}\n", shown.join(", ")));
    }

    out
}
