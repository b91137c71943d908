/// Decode, classify and store one notification
use log::{debug, error, info, warn};

use crate::bluetooth::decoder::{decode, DecodeError, Reading};
use crate::bluetooth::Channel;
use crate::classifier::status_battery;
use crate::store::MetricStore;

/// Entry point for every producer task.
///
/// Returns true when the store was updated. Discarded payloads are logged
/// and leave the store untouched.
pub fn ingest(store: &MetricStore, channel: Channel, data: &[u8]) -> bool {
    let reading = match decode(channel, data) {
        Ok(reading) => reading,
        Err(e @ DecodeError::TooShort { .. }) => {
            warn!("Dropping notification: {}", e);
            return false;
        }
        Err(e @ DecodeError::InvalidSample { .. }) => {
            debug!("Dropping notification: {}", e);
            return false;
        }
    };

    log_reading(&reading);

    match store.apply_group(reading.channel().as_str(), &reading.samples()) {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to store {} reading: {}", channel, e);
            false
        }
    }
}

fn log_reading(reading: &Reading) {
    match reading {
        Reading::Gas(r) => debug!("TVOC: {:.0} ppb", r.tvoc_ppb),
        Reading::Environmental(r) => debug!(
            "Temperature: {:.1}°C, humidity: {:.0}%, pressure: {:.1} hPa",
            r.temperature, r.humidity, r.pressure_hpa
        ),
        Reading::Status(r) => info!("Battery: {:.0}% ({})", r.battery, status_battery(r.battery)),
        Reading::Particulate(r) => debug!(
            "PM1: {:.2}, PM2.5: {:.2}, PM4: {:.2}, PM10: {:.2} µg/m³",
            r.pm1, r.pm2_5, r.pm4, r.pm10
        ),
    }
}
