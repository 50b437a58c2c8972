use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Notify;

use satel_channel::Channel;
use satel_core::ModuleCaps;
use satel_protocol::{encode_system_changes_request, list_from_bytes, NotifyEvent, NotifySource, Opcode, Request};

use crate::config::{MonitorConfig, ReconfigScope, Reconfigurer};

const MAX_SLEEP: Duration = Duration::from_secs(3600);

/// Drives `READ_SYSTEM_CHANGES` polling and per-zone/per-output refresh
/// reads on a single channel for as long as it stays open. Started on
/// `Connected`, stopped (by dropping or aborting its task) on
/// `Disconnected` — it holds no state that needs to survive a reconnect,
/// since a fresh connection starts diffing from scratch anyway.
pub struct ChangeMonitor {
    channel: Channel,
    config: Arc<Mutex<MonitorConfig>>,
    reconfig: Reconfigurer,
    resp_timeout: Duration,
    shutdown: Arc<Notify>,
    module_caps: Arc<Mutex<ModuleCaps>>,
}

impl ChangeMonitor {
    pub fn new(channel: Channel, resp_timeout: Duration) -> Self {
        Self {
            channel,
            config: Arc::new(Mutex::new(MonitorConfig::default())),
            reconfig: Reconfigurer::new(),
            resp_timeout,
            shutdown: Arc::new(Notify::new()),
            module_caps: Arc::new(Mutex::new(ModuleCaps::empty())),
        }
    }

    /// Builds a monitor over shared config/reconfig/shutdown/module-caps
    /// state — used across a reconnect, where the previous connection's
    /// monitor settings (poll interval, zone/output intervals, capability
    /// bits) must survive onto the fresh channel rather than resetting to
    /// defaults.
    pub fn with_shared_state(
        channel: Channel,
        resp_timeout: Duration,
        config: Arc<Mutex<MonitorConfig>>,
        reconfig: Reconfigurer,
        shutdown: Arc<Notify>,
        module_caps: Arc<Mutex<ModuleCaps>>,
    ) -> Self {
        Self { channel, config, reconfig, resp_timeout, shutdown, module_caps }
    }

    pub fn shared_config(&self) -> Arc<Mutex<MonitorConfig>> {
        self.config.clone()
    }

    pub fn shutdown_handle(&self) -> Arc<Notify> {
        self.shutdown.clone()
    }

    pub fn reconfigurer(&self) -> Reconfigurer {
        self.reconfig.clone()
    }

    pub fn config(&self) -> MonitorConfig {
        self.config.lock().clone()
    }

    /// Applies `mutate` to the shared config under a reconfiguration scope
    /// and signals the monitor task to recompute its sleep deadline.
    pub fn reconfigure(&self, mutate: impl FnOnce(&mut MonitorConfig)) {
        let scope: ReconfigScope = self.reconfig.scope();
        mutate(&mut self.config.lock());
        scope.mark_dirty();
    }

    pub fn set_poll_interval(&self, interval: Duration) {
        self.reconfigure(|c| c.poll_interval = interval);
    }

    /// Non-destructive merge: `0` removes monitoring for `zone`, any other
    /// duration sets/replaces it.
    pub fn set_zone_temperature_interval(&self, zone: u16, interval: Duration) {
        self.reconfigure(|c| {
            if interval.is_zero() {
                c.zone_intervals.remove(&zone);
            } else {
                c.zone_intervals.insert(zone, interval);
            }
        });
    }

    pub fn set_output_power_interval(&self, output: u16, interval: Duration) {
        self.reconfigure(|c| {
            if interval.is_zero() {
                c.output_intervals.remove(&output);
            } else {
                c.output_intervals.insert(output, interval);
            }
        });
    }

    /// Requests the task spawned via `run` to exit at its next wakeup.
    pub fn stop(&self) {
        self.shutdown.notify_one();
    }

    /// Runs until `stop()` is called or the channel closes. Intended to be
    /// spawned as its own task per connection lifetime.
    pub async fn run(self) {
        let mut next_poll: Option<Instant> = None;
        let mut zone_deadlines: HashMap<u16, Instant> = HashMap::new();
        let mut output_deadlines: HashMap<u16, Instant> = HashMap::new();

        loop {
            if !self.channel.is_open() {
                tracing::debug!("change monitor exiting, channel is no longer open");
                return;
            }

            let config = self.config.lock().clone();
            let now = Instant::now();

            if !config.poll_interval.is_zero() && next_poll.is_none() {
                next_poll = Some(now);
            }
            if config.poll_interval.is_zero() {
                next_poll = None;
            }
            for &zone in config.zone_intervals.keys() {
                zone_deadlines.entry(zone).or_insert(now);
            }
            zone_deadlines.retain(|zone, _| config.zone_intervals.contains_key(zone));
            for &output in config.output_intervals.keys() {
                output_deadlines.entry(output).or_insert(now);
            }
            output_deadlines.retain(|output, _| config.output_intervals.contains_key(output));

            let mut sleep_until = now + MAX_SLEEP;
            if let Some(deadline) = next_poll {
                sleep_until = sleep_until.min(deadline);
            }
            sleep_until = zone_deadlines.values().fold(sleep_until, |acc, &d| acc.min(d));
            sleep_until = output_deadlines.values().fold(sleep_until, |acc, &d| acc.min(d));

            let sleep_duration = sleep_until.saturating_duration_since(now);
            if sleep_duration.is_zero() {
                tracing::warn!("change monitor computed a zero sleep duration, proceeding without waiting");
            } else {
                tokio::select! {
                    _ = tokio::time::sleep(sleep_duration) => {}
                    _ = self.reconfig.wait_for_wakeup() => {}
                    _ = self.shutdown.notified() => {
                        tracing::debug!("change monitor stopped");
                        return;
                    }
                }
            }

            if !self.channel.is_open() {
                return;
            }

            let now = Instant::now();
            let config = self.config.lock().clone();

            if let Some(deadline) = next_poll {
                if now >= deadline {
                    self.poll_system_changes().await;
                    next_poll = Some(now + config.poll_interval);
                }
            }

            for (&zone, &interval) in &config.zone_intervals {
                if zone_deadlines.get(&zone).copied().unwrap_or(now) <= now {
                    self.poll_zone_temperature(zone).await;
                    zone_deadlines.insert(zone, now + interval);
                }
            }

            for (&output, &interval) in &config.output_intervals {
                if output_deadlines.get(&output).copied().unwrap_or(now) <= now {
                    self.poll_output_power(output).await;
                    output_deadlines.insert(output, now + interval);
                }
            }
        }
    }

    async fn poll_system_changes(&self) {
        let request = Request::new(Opcode::ReadSystemChanges, encode_system_changes_request(None));
        let response = self.channel.send_command(request, self.resp_timeout).await;
        if response.is_request_error() {
            tracing::debug!(?response.error_code, "system-changes poll failed, will retry next cycle");
            return;
        }

        let byte_32 = self.module_caps.lock().contains(ModuleCaps::BYTE_32);
        for changed in list_from_bytes(&response.payload, response.payload.len() * 8, false) {
            let Some(opcode) = Opcode::from_byte(changed as u8) else { continue };

            // Zones/outputs reads take a 0xFF selector byte when the module
            // supports the wider 256-member bitmap; every other refresh
            // takes an empty body.
            let source = NotifyEvent::from_opcode(opcode).map(|e| e.source());
            let wants_selector = byte_32 && matches!(source, Some(NotifySource::ZONES) | Some(NotifySource::OUTPUTS));
            let body = if wants_selector { vec![0xFF] } else { Vec::new() };

            let refresh = Request::new(opcode, body);
            let refreshed = self.channel.send_command(refresh, self.resp_timeout).await;
            if refreshed.is_request_error() {
                tracing::debug!(?opcode, "refresh read failed, will retry next cycle");
            }
        }
    }

    async fn poll_zone_temperature(&self, zone: u16) {
        let request = Request::new(Opcode::ReadZoneTemperature, vec![zone as u8]);
        let response = self.channel.send_command(request, self.resp_timeout).await;
        if response.is_request_error() {
            tracing::debug!(zone, "temperature poll failed, will retry next cycle");
        }
    }

    async fn poll_output_power(&self, output: u16) {
        let request = Request::new(Opcode::ReadOutputPower, vec![satel_protocol::output_to_byte(output)]);
        let response = self.channel.send_command(request, self.resp_timeout).await;
        if response.is_request_error() {
            tracing::debug!(output, "power poll failed, will retry next cycle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use satel_channel::ChannelEvent;
    use tokio::sync::mpsc;

    /// Scenario 6 from spec.md §8: a 2-second poll interval, a
    /// `READ_SYSTEM_CHANGES` response with only `READ_ZONES_VIOLATION`'s bit
    /// set, and exactly one refresh read of that opcode as a result.
    #[tokio::test]
    async fn poll_cycle_refreshes_only_the_changed_opcode() {
        let (client_tx, client_rx) = mpsc::unbounded_channel();
        let (server_tx, mut server_rx) = mpsc::unbounded_channel();
        let client = Channel::new(client_tx, Duration::from_secs(3600));
        let server = Channel::new(server_tx, Duration::from_secs(3600));
        let (client_halves, server_halves) = satel_transport::pair(4096);
        client.attach(client_halves.0, client_halves.1, None).await;
        server.attach(server_halves.0, server_halves.1, None).await;
        drop(client_rx);

        let fake_panel = tokio::spawn(async move {
            // First request: the system-changes poll. Reply with bit 0 set
            // (READ_ZONES_VIOLATION, opcode 0x00) in a one-byte bitmap.
            let changes = loop {
                match server_rx.recv().await {
                    Some(ChannelEvent::Notification { opcode: Opcode::ReadSystemChanges, .. }) => break true,
                    None => break false,
                    _ => continue,
                }
            };
            assert!(changes, "expected a READ_SYSTEM_CHANGES request");
            let reply = Request::new(Opcode::ReadSystemChanges, vec![0x01]);
            server.send_command(reply, Duration::from_millis(200)).await;

            // Second request: the refresh read the monitor issues for the
            // single changed opcode.
            let refreshed = loop {
                match server_rx.recv().await {
                    Some(ChannelEvent::Notification { opcode: Opcode::ReadZonesViolation, .. }) => break true,
                    None => break false,
                    _ => continue,
                }
            };
            assert!(refreshed, "expected a READ_ZONES_VIOLATION refresh read");
            let reply = Request::new(Opcode::ReadZonesViolation, vec![0x00; 16]);
            server.send_command(reply, Duration::from_millis(200)).await;
        });

        let monitor = ChangeMonitor::new(client.clone(), Duration::from_millis(200));
        monitor.set_poll_interval(Duration::from_millis(10));
        let stop_handle = monitor.shutdown_handle();
        let run_handle = tokio::spawn(monitor.run());

        tokio::time::timeout(Duration::from_secs(2), fake_panel)
            .await
            .expect("fake panel task timed out")
            .expect("fake panel task panicked");

        stop_handle.notify_one();
        tokio::time::timeout(Duration::from_secs(1), run_handle)
            .await
            .expect("monitor did not stop after shutdown")
            .expect("monitor task panicked");
    }

    /// Under `ModuleCaps::BYTE_32`, a zones refresh carries a single 0xFF
    /// selector byte instead of an empty body.
    #[tokio::test]
    async fn byte_32_module_widens_the_zones_refresh_with_a_selector_byte() {
        let (client_tx, client_rx) = mpsc::unbounded_channel();
        let (server_tx, mut server_rx) = mpsc::unbounded_channel();
        let client = Channel::new(client_tx, Duration::from_secs(3600));
        let server = Channel::new(server_tx, Duration::from_secs(3600));
        let (client_halves, server_halves) = satel_transport::pair(4096);
        client.attach(client_halves.0, client_halves.1, None).await;
        server.attach(server_halves.0, server_halves.1, None).await;
        drop(client_rx);

        let fake_panel = tokio::spawn(async move {
            loop {
                match server_rx.recv().await {
                    Some(ChannelEvent::Notification { opcode: Opcode::ReadSystemChanges, .. }) => break,
                    None => return,
                    _ => continue,
                }
            }
            let reply = Request::new(Opcode::ReadSystemChanges, vec![0x01]);
            server.send_command(reply, Duration::from_millis(200)).await;

            let payload = loop {
                match server_rx.recv().await {
                    Some(ChannelEvent::Notification { opcode: Opcode::ReadZonesViolation, payload }) => break payload,
                    None => return,
                    _ => continue,
                }
            };
            assert_eq!(payload, vec![0xFF], "expected the 0xFF selector byte under BYTE_32");
            let reply = Request::new(Opcode::ReadZonesViolation, vec![0x00; 32]);
            server.send_command(reply, Duration::from_millis(200)).await;
        });

        let monitor = ChangeMonitor::with_shared_state(
            client.clone(),
            Duration::from_millis(200),
            Arc::new(Mutex::new(MonitorConfig::default())),
            Reconfigurer::new(),
            Arc::new(Notify::new()),
            Arc::new(Mutex::new(ModuleCaps::BYTE_32)),
        );
        monitor.set_poll_interval(Duration::from_millis(10));
        let stop_handle = monitor.shutdown_handle();
        let run_handle = tokio::spawn(monitor.run());

        tokio::time::timeout(Duration::from_secs(2), fake_panel)
            .await
            .expect("fake panel task timed out")
            .expect("fake panel task panicked");

        stop_handle.notify_one();
        tokio::time::timeout(Duration::from_secs(1), run_handle)
            .await
            .expect("monitor did not stop after shutdown")
            .expect("monitor task panicked");
    }
}
