/// Bluetooth Low Energy discovery, connection and notification subscription
use bluer::{Adapter, AdapterEvent, Address, Device};
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, timeout, Duration};

use crate::bluetooth::{channel_for, Channel, ATMOTUBE_SERVICE_UUID};
use crate::config::MonitorConfig;
use crate::models::StatusBand;
use crate::pipeline::ingest;
use crate::store::MetricStore;

const SERVICES_RESOLVE_POLL_MS: u64 = 200;
const SERVICES_RESOLVE_ATTEMPTS: u32 = 50;
const RESCAN_INTERVAL_MS: u64 = 500;

/// A connected sensor with one producer task per subscribed channel
pub struct Subscription {
    device: Device,
    tasks: Vec<(Channel, JoinHandle<()>)>,
}

impl Subscription {
    pub fn channels(&self) -> Vec<Channel> {
        self.tasks.iter().map(|(channel, _)| *channel).collect()
    }

    /// Wait until every notification stream has ended
    pub async fn wait(self) {
        for (channel, handle) in self.tasks {
            if let Err(e) = handle.await {
                error!("{} producer task failed: {}", channel, e);
            }
        }
        info!("All notification streams closed for {}", self.device.address());
    }
}

fn report_connection(store: &MetricStore, status: StatusBand) {
    match store.set_connection_status(status) {
        Ok(()) => info!("Bluetooth connection status: {}", status),
        Err(e) => error!("Failed to record connection status {}: {}", status, e),
    }
}

/// Find, connect and subscribe to the configured Atmotube
///
/// Connection status moves through `critical` (searching), `warn`
/// (connected, subscribing) and `ok` (all channels subscribed). Any failure
/// along the way is returned to the caller; there is no retry.
pub async fn connect_to_atmotube(
    config: &MonitorConfig,
    store: Arc<MetricStore>,
) -> Result<Subscription, Box<dyn std::error::Error>> {
    // Initialize Bluetooth session
    let session = match bluer::Session::new().await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to create Bluetooth session: {}", e);
            return Err(e.into());
        }
    };

    // Get the default Bluetooth adapter
    let adapter = match session.default_adapter().await {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Failed to get default Bluetooth adapter: {}", e);
            return Err(e.into());
        }
    };

    // Ensure Bluetooth adapter is powered on
    if let Err(e) = adapter.set_powered(true).await {
        error!("Failed to power on adapter: {}", e);
        return Err(e.into());
    }

    report_connection(&store, StatusBand::Critical);

    info!("Searching for {}...", config.device_name);
    let device = match timeout(config.scan_timeout, find_device(&adapter, &config.device_name)).await
    {
        Ok(Ok(device)) => device,
        Ok(Err(e)) => return Err(e),
        Err(_) => {
            error!(
                "Device {} not found within {}s",
                config.device_name,
                config.scan_timeout.as_secs()
            );
            return Err(format!("Device {} not found", config.device_name).into());
        }
    };

    if let Err(e) = device.connect().await {
        error!("Failed to connect to {}: {}", device.address(), e);
        return Err(e.into());
    }
    info!("Connected to {}. Discovering services...", device.address());

    report_connection(&store, StatusBand::Warn);

    wait_for_services(&device).await?;

    let mut tasks = Vec::new();
    for service in device.services().await? {
        if service.uuid().await? != ATMOTUBE_SERVICE_UUID {
            continue;
        }

        for characteristic in service.characteristics().await? {
            let uuid = characteristic.uuid().await?;
            let channel = match channel_for(uuid) {
                Some(channel) => channel,
                None => {
                    info!("Unknown characteristic: {}", uuid);
                    continue;
                }
            };

            let notifications = match characteristic.notify().await {
                Ok(stream) => stream,
                Err(e) => {
                    error!("Failed to subscribe to {} notifications: {}", channel, e);
                    return Err(e.into());
                }
            };
            debug!("Subscribed to {} ({})", channel, uuid);

            let store = Arc::clone(&store);
            let handle = tokio::spawn(async move {
                let mut notifications = Box::pin(notifications);
                while let Some(data) = notifications.next().await {
                    ingest(&store, channel, &data);
                }
                warn!("{} notification stream ended", channel);
                report_connection(&store, StatusBand::Critical);
            });
            tasks.push((channel, handle));
        }
    }

    if tasks.is_empty() {
        return Err(format!("No Atmotube characteristics found on {}", device.address()).into());
    }

    let subscription = Subscription { device, tasks };
    let subscribed = subscription.channels();
    let missing: Vec<&str> = Channel::ALL
        .iter()
        .filter(|c| !subscribed.contains(*c))
        .map(|c| c.as_str())
        .collect();
    if !missing.is_empty() {
        warn!("Channels not offered by the device: {}", missing.join(", "));
    }

    report_connection(&store, StatusBand::Ok);
    Ok(subscription)
}

/// Run LE discovery until a device advertising `name` shows up
///
/// BlueZ may create the device object before its name arrives in a scan
/// response, so known addresses are re-checked on every rescan tick as well.
async fn find_device(adapter: &Adapter, name: &str) -> Result<Device, Box<dyn std::error::Error>> {
    let filter = bluer::DiscoveryFilter {
        transport: bluer::DiscoveryTransport::Le,
        ..Default::default()
    };

    // Apply the discovery filter (warn if it fails, but continue)
    if let Err(e) = adapter.set_discovery_filter(filter).await {
        warn!("Failed to set discovery filter: {}", e);
    }

    let events = adapter.discover_devices().await?;
    let mut events = Box::pin(events);
    let mut rescan = interval(Duration::from_millis(RESCAN_INTERVAL_MS));

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(AdapterEvent::DeviceAdded(addr)) => {
                    if let Some(device) = match_device(adapter, addr, name).await {
                        return Ok(device);
                    }
                }
                Some(_) => {}
                None => return Err("Discovery stopped before the device was found".into()),
            },
            _ = rescan.tick() => {
                for addr in adapter.device_addresses().await? {
                    if let Some(device) = match_device(adapter, addr, name).await {
                        return Ok(device);
                    }
                }
            }
        }
    }
}

/// Return the device at `addr` if it currently advertises `name`
async fn match_device(adapter: &Adapter, addr: Address, name: &str) -> Option<Device> {
    let device = adapter.device(addr).ok()?;
    match device.name().await {
        Ok(local_name) if name_matches(local_name.as_deref(), name) => {
            info!("Found: {} [{}]", name, addr);
            Some(device)
        }
        Ok(_) => None,
        Err(e) => {
            debug!("Failed to read name of {}: {}", addr, e);
            None
        }
    }
}

fn name_matches(local_name: Option<&str>, wanted: &str) -> bool {
    local_name.map_or(false, |local_name| local_name.trim() == wanted)
}

// BlueZ resolves GATT services asynchronously after connecting
async fn wait_for_services(device: &Device) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..SERVICES_RESOLVE_ATTEMPTS {
        if device.is_services_resolved().await? {
            return Ok(());
        }
        sleep(Duration::from_millis(SERVICES_RESOLVE_POLL_MS)).await;
    }
    Err(format!("Services of {} were not resolved", device.address()).into())
}
