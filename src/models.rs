use serde::Serialize;
use std::fmt;

/// Qualitative health band attached to every metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusBand {
    None,
    Ok,
    Warn,
    Critical,
}

impl StatusBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusBand::None => "none",
            StatusBand::Ok => "ok",
            StatusBand::Warn => "warn",
            StatusBand::Critical => "critical",
        }
    }
}

impl fmt::Display for StatusBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The ten metrics reported by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    Pm1,
    Pm2_5,
    Pm4,
    Pm10,
    Tvoc,
    Temp,
    Humidity,
    Pressure,
    Battery,
    BluetoothConnection,
}

impl MetricName {
    /// All metrics in reporting order
    pub const ALL: [MetricName; 10] = [
        MetricName::Pm1,
        MetricName::Pm2_5,
        MetricName::Pm4,
        MetricName::Pm10,
        MetricName::Tvoc,
        MetricName::Temp,
        MetricName::Humidity,
        MetricName::Pressure,
        MetricName::Battery,
        MetricName::BluetoothConnection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::Pm1 => "pm1",
            MetricName::Pm2_5 => "pm2_5",
            MetricName::Pm4 => "pm4",
            MetricName::Pm10 => "pm10",
            MetricName::Tvoc => "tvoc",
            MetricName::Temp => "temp",
            MetricName::Humidity => "humidity",
            MetricName::Pressure => "pressure",
            MetricName::Battery => "battery",
            MetricName::BluetoothConnection => "bluetooth_connection",
        }
    }

    /// Fixed unit reported alongside the metric's value
    pub fn unit(&self) -> &'static str {
        match self {
            MetricName::Pm1 | MetricName::Pm2_5 | MetricName::Pm4 | MetricName::Pm10 => "µg/m³",
            MetricName::Tvoc => "ppb",
            MetricName::Temp => "celsius",
            MetricName::Humidity | MetricName::Battery => "%",
            MetricName::Pressure => "hPa",
            MetricName::BluetoothConnection => "connected",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub name: &'static str,
    pub value: f64,
    pub unit: &'static str,
    pub status: StatusBand,
}

impl Metric {
    /// Startup value: zero reading, no status
    pub fn empty(name: MetricName) -> Self {
        Metric {
            name: name.as_str(),
            value: 0.0,
            unit: name.unit(),
            status: StatusBand::None,
        }
    }
}

/// One decoded value destined for the store, before classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub metric: MetricName,
    pub value: f64,
    pub unit: &'static str,
}

impl Sample {
    pub fn new(metric: MetricName, value: f64) -> Self {
        Sample {
            metric,
            value,
            unit: metric.unit(),
        }
    }
}

/// Point-in-time copy of every metric.
///
/// Field names are the JSON keys served to reporting clients, so the key set
/// is fixed at compile time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub pm1: Metric,
    pub pm2_5: Metric,
    pub pm4: Metric,
    pub pm10: Metric,
    pub tvoc: Metric,
    pub temp: Metric,
    pub humidity: Metric,
    pub pressure: Metric,
    pub battery: Metric,
    pub bluetooth_connection: Metric,
}

impl Default for Snapshot {
    fn default() -> Self {
        Snapshot {
            pm1: Metric::empty(MetricName::Pm1),
            pm2_5: Metric::empty(MetricName::Pm2_5),
            pm4: Metric::empty(MetricName::Pm4),
            pm10: Metric::empty(MetricName::Pm10),
            tvoc: Metric::empty(MetricName::Tvoc),
            temp: Metric::empty(MetricName::Temp),
            humidity: Metric::empty(MetricName::Humidity),
            pressure: Metric::empty(MetricName::Pressure),
            battery: Metric::empty(MetricName::Battery),
            bluetooth_connection: Metric::empty(MetricName::BluetoothConnection),
        }
    }
}

impl Snapshot {
    #[cfg(test)]
    pub fn get(&self, name: MetricName) -> &Metric {
        match name {
            MetricName::Pm1 => &self.pm1,
            MetricName::Pm2_5 => &self.pm2_5,
            MetricName::Pm4 => &self.pm4,
            MetricName::Pm10 => &self.pm10,
            MetricName::Tvoc => &self.tvoc,
            MetricName::Temp => &self.temp,
            MetricName::Humidity => &self.humidity,
            MetricName::Pressure => &self.pressure,
            MetricName::Battery => &self.battery,
            MetricName::BluetoothConnection => &self.bluetooth_connection,
        }
    }

    pub fn get_mut(&mut self, name: MetricName) -> &mut Metric {
        match name {
            MetricName::Pm1 => &mut self.pm1,
            MetricName::Pm2_5 => &mut self.pm2_5,
            MetricName::Pm4 => &mut self.pm4,
            MetricName::Pm10 => &mut self.pm10,
            MetricName::Tvoc => &mut self.tvoc,
            MetricName::Temp => &mut self.temp,
            MetricName::Humidity => &mut self.humidity,
            MetricName::Pressure => &mut self.pressure,
            MetricName::Battery => &mut self.battery,
            MetricName::BluetoothConnection => &mut self.bluetooth_connection,
        }
    }
}
