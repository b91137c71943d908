/// Threshold tables mapping physical values to status bands
///
/// Every breakpoint is inclusive on the lower band: a value sitting exactly
/// on a boundary gets the healthier of the two neighbouring bands.
use crate::models::{MetricName, StatusBand};

// Particulate breakpoints in µg/m³
const PM_FINE_OK_MAX: f64 = 12.0;
const PM_FINE_WARN_MAX: f64 = 35.4;
const PM10_OK_MAX: f64 = 54.0;
const PM10_WARN_MAX: f64 = 154.0;

// TVOC breakpoints in ppb
const TVOC_OK_MAX: f64 = 250.0;
const TVOC_WARN_MAX: f64 = 500.0;

// Below this the BME280 reading is not a real temperature
const TEMP_FLOOR: f64 = -100.0;

/// Classify a value for the given metric.
///
/// `bluetooth_connection` has no threshold table; its status comes straight
/// from the link layer, so it always classifies as `none` here.
pub fn classify(metric: MetricName, value: f64) -> StatusBand {
    if value.is_nan() {
        return StatusBand::None;
    }
    match metric {
        MetricName::Pm1 | MetricName::Pm2_5 | MetricName::Pm4 => status_pm_fine(value),
        MetricName::Pm10 => status_pm10(value),
        MetricName::Tvoc => status_tvoc(value),
        MetricName::Temp => status_temperature(value),
        MetricName::Humidity => status_humidity(value),
        MetricName::Pressure => status_pressure(value),
        MetricName::Battery => status_battery(value),
        MetricName::BluetoothConnection => StatusBand::None,
    }
}

/// PM1, PM2.5 and PM4 share one table
pub fn status_pm_fine(ugm3: f64) -> StatusBand {
    ascending(ugm3, PM_FINE_OK_MAX, PM_FINE_WARN_MAX)
}

pub fn status_pm10(ugm3: f64) -> StatusBand {
    ascending(ugm3, PM10_OK_MAX, PM10_WARN_MAX)
}

pub fn status_tvoc(ppb: f64) -> StatusBand {
    ascending(ppb, TVOC_OK_MAX, TVOC_WARN_MAX)
}

pub fn status_temperature(celsius: f64) -> StatusBand {
    if celsius <= TEMP_FLOOR {
        return StatusBand::None;
    }
    comfort_range(celsius, (18.0, 26.0), (14.0, 30.0))
}

pub fn status_humidity(percent: f64) -> StatusBand {
    if percent <= 0.0 {
        return StatusBand::None;
    }
    comfort_range(percent, (30.0, 60.0), (20.0, 70.0))
}

pub fn status_pressure(hpa: f64) -> StatusBand {
    if hpa <= 0.0 {
        return StatusBand::None;
    }
    comfort_range(hpa, (980.0, 1020.0), (950.0, 1050.0))
}

/// Battery only reads `none` below zero; an empty battery is critical
pub fn status_battery(percent: f64) -> StatusBand {
    match percent {
        p if p < 0.0 => StatusBand::None,
        p if p >= 50.0 => StatusBand::Ok,
        p if p >= 20.0 => StatusBand::Warn,
        _ => StatusBand::Critical,
    }
}

// Lower is better; zero or below means no reading
fn ascending(value: f64, ok_max: f64, warn_max: f64) -> StatusBand {
    match value {
        v if v <= 0.0 => StatusBand::None,
        v if v <= ok_max => StatusBand::Ok,
        v if v <= warn_max => StatusBand::Warn,
        _ => StatusBand::Critical,
    }
}

// Both ranges are closed; the warn range wraps the ok range on both sides
fn comfort_range(value: f64, ok: (f64, f64), warn: (f64, f64)) -> StatusBand {
    if value >= ok.0 && value <= ok.1 {
        StatusBand::Ok
    } else if value >= warn.0 && value <= warn.1 {
        StatusBand::Warn
    } else {
        StatusBand::Critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.0000001;

    #[test]
    fn test_fine_particulate_boundaries() {
        for metric in [MetricName::Pm1, MetricName::Pm2_5, MetricName::Pm4] {
            assert_eq!(classify(metric, 0.0), StatusBand::None);
            assert_eq!(classify(metric, -3.0), StatusBand::None);
            assert_eq!(classify(metric, 0.01), StatusBand::Ok);
            assert_eq!(classify(metric, 12.0), StatusBand::Ok);
            assert_eq!(classify(metric, 12.0 + EPS), StatusBand::Warn);
            assert_eq!(classify(metric, 35.4), StatusBand::Warn);
            assert_eq!(classify(metric, 35.4 + EPS), StatusBand::Critical);
        }
    }

    #[test]
    fn test_pm10_boundaries() {
        assert_eq!(classify(MetricName::Pm10, 0.0), StatusBand::None);
        assert_eq!(classify(MetricName::Pm10, 54.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Pm10, 54.0 + EPS), StatusBand::Warn);
        assert_eq!(classify(MetricName::Pm10, 154.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Pm10, 154.0 + EPS), StatusBand::Critical);
    }

    #[test]
    fn test_tvoc_boundaries() {
        assert_eq!(classify(MetricName::Tvoc, 0.0), StatusBand::None);
        assert_eq!(classify(MetricName::Tvoc, 1.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Tvoc, 250.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Tvoc, 250.0 + EPS), StatusBand::Warn);
        assert_eq!(classify(MetricName::Tvoc, 500.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Tvoc, 500.0 + EPS), StatusBand::Critical);
    }

    #[test]
    fn test_temperature_bands() {
        assert_eq!(classify(MetricName::Temp, -100.0), StatusBand::None);
        assert_eq!(classify(MetricName::Temp, -99.0), StatusBand::Critical);
        assert_eq!(classify(MetricName::Temp, 14.0 - EPS), StatusBand::Critical);
        assert_eq!(classify(MetricName::Temp, 14.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Temp, 18.0 - EPS), StatusBand::Warn);
        assert_eq!(classify(MetricName::Temp, 18.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Temp, 26.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Temp, 26.0 + EPS), StatusBand::Warn);
        assert_eq!(classify(MetricName::Temp, 30.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Temp, 30.0 + EPS), StatusBand::Critical);
        // Zero degrees is a real (cold) reading, not a missing one
        assert_eq!(classify(MetricName::Temp, 0.0), StatusBand::Critical);
    }

    #[test]
    fn test_humidity_bands() {
        assert_eq!(classify(MetricName::Humidity, 0.0), StatusBand::None);
        assert_eq!(classify(MetricName::Humidity, 10.0), StatusBand::Critical);
        assert_eq!(classify(MetricName::Humidity, 20.0 - EPS), StatusBand::Critical);
        assert_eq!(classify(MetricName::Humidity, 20.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Humidity, 30.0 - EPS), StatusBand::Warn);
        assert_eq!(classify(MetricName::Humidity, 30.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Humidity, 60.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Humidity, 60.0 + EPS), StatusBand::Warn);
        assert_eq!(classify(MetricName::Humidity, 70.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Humidity, 70.0 + EPS), StatusBand::Critical);
    }

    #[test]
    fn test_pressure_bands() {
        assert_eq!(classify(MetricName::Pressure, 0.0), StatusBand::None);
        assert_eq!(classify(MetricName::Pressure, 949.0), StatusBand::Critical);
        assert_eq!(classify(MetricName::Pressure, 950.0 - EPS), StatusBand::Critical);
        assert_eq!(classify(MetricName::Pressure, 950.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Pressure, 980.0 - EPS), StatusBand::Warn);
        assert_eq!(classify(MetricName::Pressure, 980.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Pressure, 1020.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Pressure, 1020.0 + EPS), StatusBand::Warn);
        assert_eq!(classify(MetricName::Pressure, 1050.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Pressure, 1050.0 + EPS), StatusBand::Critical);
    }

    #[test]
    fn test_battery_bands() {
        assert_eq!(classify(MetricName::Battery, -1.0), StatusBand::None);
        assert_eq!(classify(MetricName::Battery, 0.0), StatusBand::Critical);
        assert_eq!(classify(MetricName::Battery, 19.0), StatusBand::Critical);
        assert_eq!(classify(MetricName::Battery, 20.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Battery, 49.0), StatusBand::Warn);
        assert_eq!(classify(MetricName::Battery, 50.0), StatusBand::Ok);
        assert_eq!(classify(MetricName::Battery, 100.0), StatusBand::Ok);
    }

    #[test]
    fn test_nan_and_connection_are_unclassified() {
        for metric in MetricName::ALL {
            assert_eq!(classify(metric, f64::NAN), StatusBand::None);
        }
        assert_eq!(classify(MetricName::BluetoothConnection, 1.0), StatusBand::None);
    }
}
