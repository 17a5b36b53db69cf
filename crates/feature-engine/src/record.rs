//! Flight Record

use serde::{Deserialize, Serialize};

/// One historical or requested flight, keyed by the source column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    /// Operating airline
    #[serde(rename = "OPERA")]
    pub airline: String,
    /// `I` (international) or `N` (national)
    #[serde(rename = "TIPOVUELO")]
    pub flight_type: String,
    /// Month of the flight, 1-12
    #[serde(rename = "MES")]
    pub month: i64,
    /// Scheduled departure, `YYYY-MM-DD HH:MM:SS`
    #[serde(rename = "Fecha-I")]
    pub scheduled_datetime: String,
    /// Actual departure, `YYYY-MM-DD HH:MM:SS`
    #[serde(rename = "Fecha-O")]
    pub actual_datetime: String,
    /// Destination code
    #[serde(rename = "SIGLADES")]
    pub destination: String,
    /// Day of the week
    #[serde(rename = "DIANOM")]
    pub day_name: String,
}
