/// Atmotube characteristic payload decoding
///
/// Each notifying characteristic carries its own little-endian layout. The
/// decoders here are pure: they either return a typed reading or the reason
/// the payload was discarded, and never touch shared state.
use std::fmt;
use thiserror::Error;

use crate::models::{MetricName, Sample};

// Minimum payload lengths per channel
const GAS_MIN_LEN: usize = 2;
const ENVIRONMENTAL_MIN_LEN: usize = 8;
const STATUS_MIN_LEN: usize = 2;
const PARTICULATE_MIN_LEN: usize = 12;

/// Marks a particulate field as "no valid reading"
const PM_SENTINEL: u32 = 0xFF_FFFF;

/// Fixed-point scale shared by pressure, temperature and particulate fields
const CENTI: f64 = 100.0;

/// A notifying characteristic of the sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// SGPC3 volatile organic compounds
    Gas,
    /// BME280 humidity, pressure and temperature
    Environmental,
    /// Device status flags and battery level
    Status,
    /// SPS30 particulate matter
    Particulate,
}

impl Channel {
    pub const ALL: [Channel; 4] = [
        Channel::Gas,
        Channel::Environmental,
        Channel::Status,
        Channel::Particulate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Gas => "gas",
            Channel::Environmental => "environmental",
            Channel::Status => "status",
            Channel::Particulate => "particulate",
        }
    }

    pub fn min_len(&self) -> usize {
        match self {
            Channel::Gas => GAS_MIN_LEN,
            Channel::Environmental => ENVIRONMENTAL_MIN_LEN,
            Channel::Status => STATUS_MIN_LEN,
            Channel::Particulate => PARTICULATE_MIN_LEN,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a payload produced no update
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{channel} payload too short: expected at least {expected} bytes, got {actual}")]
    TooShort {
        channel: Channel,
        expected: usize,
        actual: usize,
    },
    #[error("{channel} payload carries the invalid-sample sentinel")]
    InvalidSample { channel: Channel },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasReading {
    pub tvoc_ppb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentalReading {
    pub humidity: f64,
    pub pressure_hpa: f64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReading {
    pub battery: f64,
}

/// Fields are listed in reporting order; the wire order is PM1, PM2.5, PM10, PM4
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticulateReading {
    pub pm1: f64,
    pub pm2_5: f64,
    pub pm4: f64,
    pub pm10: f64,
}

/// A validated reading from one notification
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Gas(GasReading),
    Environmental(EnvironmentalReading),
    Status(StatusReading),
    Particulate(ParticulateReading),
}

impl Reading {
    pub fn channel(&self) -> Channel {
        match self {
            Reading::Gas(_) => Channel::Gas,
            Reading::Environmental(_) => Channel::Environmental,
            Reading::Status(_) => Channel::Status,
            Reading::Particulate(_) => Channel::Particulate,
        }
    }

    /// The store group this reading updates, as (metric, value, unit) samples
    pub fn samples(&self) -> Vec<Sample> {
        match *self {
            Reading::Gas(r) => vec![Sample::new(MetricName::Tvoc, r.tvoc_ppb)],
            Reading::Environmental(r) => vec![
                Sample::new(MetricName::Humidity, r.humidity),
                Sample::new(MetricName::Pressure, r.pressure_hpa),
                Sample::new(MetricName::Temp, r.temperature),
            ],
            Reading::Status(r) => vec![Sample::new(MetricName::Battery, r.battery)],
            Reading::Particulate(r) => vec![
                Sample::new(MetricName::Pm1, r.pm1),
                Sample::new(MetricName::Pm2_5, r.pm2_5),
                Sample::new(MetricName::Pm4, r.pm4),
                Sample::new(MetricName::Pm10, r.pm10),
            ],
        }
    }
}

/// Decode a raw notification for the given channel
pub fn decode(channel: Channel, data: &[u8]) -> Result<Reading, DecodeError> {
    match channel {
        Channel::Gas => decode_gas(data).map(Reading::Gas),
        Channel::Environmental => decode_environmental(data).map(Reading::Environmental),
        Channel::Status => decode_status(data).map(Reading::Status),
        Channel::Particulate => decode_particulate(data).map(Reading::Particulate),
    }
}

/// SGPC3 payload
/// - Bytes 0-1: TVOC (unsigned 16-bit LE, ppb)
pub fn decode_gas(data: &[u8]) -> Result<GasReading, DecodeError> {
    check_len(Channel::Gas, data)?;
    let tvoc = u16::from_le_bytes([data[0], data[1]]);
    Ok(GasReading {
        tvoc_ppb: f64::from(tvoc),
    })
}

/// BME280 payload
/// - Byte 0: Humidity (unsigned 8-bit, %)
/// - Byte 1: unused
/// - Bytes 2-5: Pressure (unsigned 32-bit LE, Pa)
/// - Bytes 6-7: Temperature (unsigned 16-bit LE, 0.01°C)
pub fn decode_environmental(data: &[u8]) -> Result<EnvironmentalReading, DecodeError> {
    check_len(Channel::Environmental, data)?;
    let humidity = data[0];
    let pressure_pa = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);
    let temperature = u16::from_le_bytes([data[6], data[7]]);
    Ok(EnvironmentalReading {
        humidity: f64::from(humidity),
        pressure_hpa: f64::from(pressure_pa) / CENTI,
        temperature: f64::from(temperature) / CENTI,
    })
}

/// Status payload
/// - Byte 0: status flags (unused)
/// - Byte 1: Battery level (unsigned 8-bit, %)
pub fn decode_status(data: &[u8]) -> Result<StatusReading, DecodeError> {
    check_len(Channel::Status, data)?;
    Ok(StatusReading {
        battery: f64::from(data[1]),
    })
}

/// Particulate payload, four unsigned 24-bit LE fields in 0.01 µg/m³:
/// - Bytes 0-2: PM1
/// - Bytes 3-5: PM2.5
/// - Bytes 6-8: PM10
/// - Bytes 9-11: PM4
///
/// All four fields set to 0xFFFFFF means the sensor has no valid sample.
pub fn decode_particulate(data: &[u8]) -> Result<ParticulateReading, DecodeError> {
    check_len(Channel::Particulate, data)?;
    let pm1 = u24_le(&data[0..3]);
    let pm2_5 = u24_le(&data[3..6]);
    let pm10 = u24_le(&data[6..9]);
    let pm4 = u24_le(&data[9..12]);

    if [pm1, pm2_5, pm10, pm4].iter().all(|&v| v == PM_SENTINEL) {
        return Err(DecodeError::InvalidSample {
            channel: Channel::Particulate,
        });
    }

    Ok(ParticulateReading {
        pm1: f64::from(pm1) / CENTI,
        pm2_5: f64::from(pm2_5) / CENTI,
        pm4: f64::from(pm4) / CENTI,
        pm10: f64::from(pm10) / CENTI,
    })
}

fn check_len(channel: Channel, data: &[u8]) -> Result<(), DecodeError> {
    if data.len() < channel.min_len() {
        return Err(DecodeError::TooShort {
            channel,
            expected: channel.min_len(),
            actual: data.len(),
        });
    }
    Ok(())
}

// Caller guarantees exactly three bytes
fn u24_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], 0])
}

#[cfg(test)]
mod tests {
    use super::*;

    const PM_SAMPLE: [u8; 12] = [
        0x64, 0x00, 0x00, 0xC8, 0x00, 0x00, 0x2C, 0x01, 0x00, 0x90, 0x01, 0x00,
    ];

    #[test]
    fn test_decode_particulate_field_order() {
        let reading = decode_particulate(&PM_SAMPLE).unwrap();
        assert_eq!(reading.pm1, 1.0);
        assert_eq!(reading.pm2_5, 2.0);
        assert_eq!(reading.pm10, 3.0);
        assert_eq!(reading.pm4, 4.0);
    }

    #[test]
    fn test_decode_particulate_large_values() {
        // 0x0186A0 = 100000 -> 1000.00 µg/m³, exercises the third byte
        let data = [
            0xA0, 0x86, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ];
        let reading = decode_particulate(&data).unwrap();
        assert_eq!(reading.pm1, 1000.0);
        assert_eq!(reading.pm2_5, 0.0);
    }

    #[test]
    fn test_decode_particulate_sentinel() {
        let data = [0xFF; 12];
        assert_eq!(
            decode_particulate(&data),
            Err(DecodeError::InvalidSample {
                channel: Channel::Particulate
            })
        );
    }

    #[test]
    fn test_decode_particulate_partial_sentinel_is_kept() {
        let mut data = [0xFF; 12];
        data[9..12].copy_from_slice(&[0x90, 0x01, 0x00]);
        let reading = decode_particulate(&data).unwrap();
        assert_eq!(reading.pm4, 4.0);
        assert_eq!(reading.pm1, f64::from(PM_SENTINEL) / CENTI);
    }

    #[test]
    fn test_decode_particulate_short_buffer() {
        assert_eq!(
            decode_particulate(&PM_SAMPLE[..6]),
            Err(DecodeError::TooShort {
                channel: Channel::Particulate,
                expected: 12,
                actual: 6,
            })
        );
    }

    #[test]
    fn test_decode_environmental() {
        let data = [0x2D, 0x00, 0xA0, 0x86, 0x01, 0x00, 0xC4, 0x09];
        let reading = decode_environmental(&data).unwrap();
        assert_eq!(reading.humidity, 45.0);
        assert_eq!(reading.pressure_hpa, 1000.0);
        assert_eq!(reading.temperature, 25.0);
    }

    #[test]
    fn test_decode_environmental_ignores_trailing_bytes() {
        let data = [0x2D, 0x00, 0xA0, 0x86, 0x01, 0x00, 0xC4, 0x09, 0xAA, 0xBB];
        assert!(decode_environmental(&data).is_ok());
        assert!(decode_environmental(&data[..7]).is_err());
    }

    #[test]
    fn test_decode_gas_is_raw_ppb() {
        let reading = decode_gas(&[0xF4, 0x01]).unwrap();
        assert_eq!(reading.tvoc_ppb, 500.0);
        assert!(decode_gas(&[0xF4]).is_err());
    }

    #[test]
    fn test_decode_status_reads_second_byte() {
        let reading = decode_status(&[0x07, 0x55]).unwrap();
        assert_eq!(reading.battery, 85.0);
        assert!(decode_status(&[]).is_err());
    }

    #[test]
    fn test_reading_samples_follow_channel_group() {
        let reading = decode(Channel::Particulate, &PM_SAMPLE).unwrap();
        assert_eq!(reading.channel(), Channel::Particulate);
        let metrics: Vec<MetricName> = reading.samples().iter().map(|s| s.metric).collect();
        assert_eq!(
            metrics,
            vec![
                MetricName::Pm1,
                MetricName::Pm2_5,
                MetricName::Pm4,
                MetricName::Pm10
            ]
        );
        let pm10 = reading.samples()[3];
        assert_eq!(pm10.value, 3.0);
        assert_eq!(pm10.unit, "µg/m³");
    }

    #[test]
    fn test_error_messages() {
        let err = decode(Channel::Gas, &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "gas payload too short: expected at least 2 bytes, got 0"
        );
    }
}
