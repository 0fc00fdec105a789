//! Data transfer objects for web responses.

use serde::{Deserialize, Serialize};

use crate::domain::SensorState;

/// One station's sensor.
#[derive(Debug, Serialize)]
pub struct SensorResponse {
    /// Registry id of the station
    pub id: String,

    #[serde(flatten)]
    pub sensor: SensorState,
}

/// All configured sensors.
#[derive(Debug, Serialize)]
pub struct SensorListResponse {
    pub sensors: Vec<SensorResponse>,
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
