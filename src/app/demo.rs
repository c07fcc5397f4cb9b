//! Random weather station stream, useful to try a dashboard end to end.

use crate::client::Client;
use crate::domain::{Attribute, AttributeType, ClientError, Record, Value, VirtualChannel};
use crate::sender::HttpSession;
use chrono::Utc;
use rand::Rng;
use std::pin::Pin;
use std::time::Duration;
use tracing::info;

pub const WEATHER_CHANNEL_ID: &str = "100";

pub fn weather_attributes() -> Vec<Attribute> {
    vec![
        Attribute::new("AbsDateTime", AttributeType::DateTime)
            .with_description("Absolute time UTC")
            .with_format("YYYY-MM-DDThh:mm:ss.ssssssZ")
            .with_soft_limits(None, None),
        Attribute::new("Temperature", AttributeType::Float32)
            .with_description("Temperature")
            .with_unit("°C")
            .with_format("%.2f"),
        Attribute::new("Pressure", AttributeType::Float32)
            .with_description("Atmospheric pressure")
            .with_unit("hPa")
            .with_format("%.0f"),
        Attribute::new("Humidity", AttributeType::Float32)
            .with_description("Humidity")
            .with_unit("%")
            .with_format("%.0f")
            .with_soft_limits(Some(0.0), None),
        Attribute::new("WindSpeed", AttributeType::Float32)
            .with_description("Wind speed")
            .with_unit("km/h")
            .with_format("%.2f"),
        Attribute::new("WindDegree", AttributeType::Uint16)
            .with_description("Wind degree")
            .with_unit("°")
            .with_format("%.0f")
            .with_soft_limits(Some(0.0), Some(360.0)),
        Attribute::new("Rain1h", AttributeType::Float32)
            .with_description("Rain volume in last hour")
            .with_unit("mm")
            .with_format("%.2f"),
        Attribute::new("WeatherDescription", AttributeType::String)
            .with_description("Weather description")
            .with_format("%s"),
    ]
}

pub fn weather_channel(attributes: &[Attribute]) -> VirtualChannel {
    VirtualChannel::new(
        WEATHER_CHANNEL_ID,
        attributes.iter().map(|a| a.identifier.clone()),
    )
    .with_name("Weather")
    .with_description("Just random test data")
    .with_properties(["STREAM", "PAR"])
}

/// One record with values for every attribute after `AbsDateTime`.
pub fn random_record() -> Record {
    let mut rng = rand::rng();
    let mut around = |mean: f64, spread: f64| mean + rng.random_range(-spread..=spread);

    let temperature = around(20.0, 1.0);
    let pressure = around(1013.25, 1.0);
    let humidity = around(0.5, 0.01);
    let wind_speed = around(11.0, 0.1);
    let rain = around(0.5, 0.5);

    Record::new(
        Utc::now(),
        vec![
            Value::from(temperature),
            Value::from(pressure),
            Value::from(humidity),
            Value::from(wind_speed),
            Value::from(rng.random_range(320_u16..=330)),
            Value::from(rain),
            Value::from("random weather"),
        ],
    )
}

/// Set up the weather schema and upload one random record per `interval` until Ctrl+C.
pub async fn run<S: HttpSession>(client: &Client<S>, interval: Duration) -> Result<(), ClientError> {
    let attributes = weather_attributes();
    let channel = weather_channel(&attributes);
    client.setup(&attributes, std::slice::from_ref(&channel)).await?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    stream_until(client, interval, shutdown).await?;
    Ok(())
}

/// Upload one random record per `interval` until `shutdown` resolves,
/// including while an upload is in flight.
async fn stream_until<S, F>(
    client: &Client<S>,
    interval: Duration,
    mut shutdown: Pin<&mut F>,
) -> Result<u64, ClientError>
where
    S: HttpSession,
    F: Future,
{
    let mut ticker = tokio::time::interval(interval);
    let mut uploads = 0_u64;

    loop {
        tokio::select! {
            _ = shutdown.as_mut() => {
                info!("Stopping demo after {} uploaded records", uploads);
                return Ok(uploads);
            }
            _ = ticker.tick() => {
                let records = [random_record()];
                let upload = client.upload_data(WEATHER_CHANNEL_ID, &records);
                tokio::select! {
                    _ = shutdown.as_mut() => {
                        info!("Stopping demo during upload after {} uploaded records", uploads);
                        return Ok(uploads);
                    }
                    summary = upload => uploads += summary?.records_accepted as u64,
                }
            }
        }
    }
}
