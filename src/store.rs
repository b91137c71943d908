/// Shared latest-value store for all reported metrics
use log::{debug, warn};
use std::sync::RwLock;
use thiserror::Error;

use crate::classifier::classify;
use crate::models::{Metric, MetricName, Sample, Snapshot, StatusBand};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("metric store lock poisoned")]
    Poisoned,
}

/// Holds the most recent value of every metric.
///
/// A single lock covers the whole set so a group written from one
/// notification is always observed together.
#[derive(Debug, Default)]
pub struct MetricStore {
    metrics: RwLock<Snapshot>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and write every sample of one group in a single critical section
    ///
    /// `bluetooth_connection` samples are skipped; that metric only changes
    /// through `set_connection_status`.
    pub fn apply_group(&self, group: &str, samples: &[Sample]) -> Result<(), StoreError> {
        // Classify before taking the lock
        let updates: Vec<(MetricName, Metric)> = samples
            .iter()
            .filter(|s| {
                if s.metric == MetricName::BluetoothConnection {
                    warn!("Ignoring {} sample in {} update", s.metric, group);
                    return false;
                }
                true
            })
            .map(|s| {
                (
                    s.metric,
                    Metric {
                        name: s.metric.as_str(),
                        value: s.value,
                        unit: s.unit,
                        status: classify(s.metric, s.value),
                    },
                )
            })
            .collect();
        let count = updates.len();

        let mut metrics = self.metrics.write().map_err(|_| StoreError::Poisoned)?;
        for (name, metric) in updates {
            *metrics.get_mut(name) = metric;
        }
        drop(metrics);

        debug!("Applied {} update ({} metrics)", group, count);
        Ok(())
    }

    /// Record the link state; value is 1.0 only when fully connected
    pub fn set_connection_status(&self, status: StatusBand) -> Result<(), StoreError> {
        let value = if status == StatusBand::Ok { 1.0 } else { 0.0 };
        let mut metrics = self.metrics.write().map_err(|_| StoreError::Poisoned)?;
        metrics.bluetooth_connection = Metric {
            name: MetricName::BluetoothConnection.as_str(),
            value,
            unit: MetricName::BluetoothConnection.unit(),
            status,
        };
        Ok(())
    }

    /// Independent copy of every metric, safe to serialize without the lock
    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let metrics = self.metrics.read().map_err(|_| StoreError::Poisoned)?;
        Ok(metrics.clone())
    }
}
