//! Request payload validation
//!
//! Sensor nodes are not strict about JSON types: some send numbers, some send
//! numeric strings. Both are accepted. Anything else is rejected here, before
//! a reading ever reaches a scorer.

use growguard_core::{parse_channel, Channel, ReadingError, ReadingResult, SensorReading};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Plant id recorded when a payload has none
pub const DEFAULT_PLANT_ID: &str = "Plant-1";

/// A validated ingestion payload
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingReading {
    pub reading: SensorReading,
    pub plant_id: String,
}

/// Parse and validate a raw request body
pub fn parse_body(body: &[u8]) -> ApiResult<IncomingReading> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON payload: {e}")))?;
    parse_payload(&value)
}

/// Validate a decoded JSON payload
pub fn parse_payload(value: &Value) -> ApiResult<IncomingReading> {
    let object = value
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Payload must be a JSON object".into()))?;

    let field = |channel: Channel| channel_value(channel, object.get(channel.name()));
    let reading = SensorReading::new(
        field(Channel::Temperature)?,
        field(Channel::Humidity)?,
        field(Channel::Ph)?,
    )?;

    let plant_id = match object.get("plant_id") {
        Some(Value::String(id)) if !id.trim().is_empty() => id.trim().to_owned(),
        Some(Value::Number(id)) => id.to_string(),
        _ => DEFAULT_PLANT_ID.to_owned(),
    };

    Ok(IncomingReading { reading, plant_id })
}

fn channel_value(channel: Channel, value: Option<&Value>) -> ReadingResult<f64> {
    match value {
        None | Some(Value::Null) => Err(ReadingError::MissingField { field: channel.name() }),
        Some(Value::Number(n)) => n
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(ReadingError::NonFinite { field: channel.name() }),
        Some(Value::String(s)) => parse_channel(channel, s),
        Some(_) => Err(ReadingError::NotNumeric { field: channel.name() }),
    }
}
