use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, Notify};

use satel_channel::{Channel, ChannelEvent, CloseSource, Response};
use satel_core::{ArmMode, FirstCodeAction, IntegraError, IntegraType, ModuleCaps};
use satel_diff::DiffEngine;
use satel_monitor::{ChangeMonitor, MonitorConfig, Reconfigurer};
use satel_protocol::{
    caps_for, decode_element_name, decode_event_record, decode_event_text, decode_integra_version,
    decode_module_version, decode_other_info, decode_rtc_and_status, decode_self_info, doors_to_bytes,
    encode_element_read_name, encode_event_pointer, encode_event_text_request, encode_rtc_set, encode_user_write,
    list_to_bytes, outputs_bitmap_len, parts_to_bytes, user_code_to_bytes, zones_bitmap_len, ElementKind, ElementName,
    EventRecord, EventText, IntegraCaps, IntegraVersion, ModuleVersion, NotifyEvent, NotifySource, Opcode, Request,
    RtcAndStatus, User, UserRights, UserType,
};
use satel_transport::TransportError;
use satel_troubles::TroublesDiffCache;

use crate::config::{ClientConfig, Endpoint, DEFAULT_TCP_PORT_ENCRYPTED};
use crate::event::ClientEvent;
use crate::status::ClientStatus;

/// Only ever applied to a connection attempt, never a mid-session read —
/// an I/O failure while establishing the transport reads as a refusal.
fn map_transport_err(e: TransportError) -> IntegraError {
    match e {
        TransportError::Timeout => IntegraError::ConnTimeout,
        TransportError::Io(_) => IntegraError::ConnRefused,
    }
}

struct Inner {
    config: ClientConfig,
    channel: Channel,
    status: Mutex<ClientStatus>,
    diff: Mutex<DiffEngine>,
    troubles_diff: Mutex<TroublesDiffCache>,
    caps: Mutex<Option<IntegraCaps>>,
    module_caps: Arc<Mutex<ModuleCaps>>,
    monitor_config: Arc<Mutex<MonitorConfig>>,
    reconfig: Reconfigurer,
    monitor_shutdown: Arc<Notify>,
    events_tx: mpsc::UnboundedSender<ClientEvent>,
    disconnect_requested: AtomicBool,
    reconnect_allowed: AtomicBool,
    /// Forces the encrypted port for as long as the supervisor is in its
    /// reconnecting regime — set on an involuntary close, cleared on a
    /// successful connect or an explicit [`Client::disconnect`]. Not a
    /// one-shot flag: a multi-attempt reconnect storm keeps using the
    /// encrypted port on every attempt, not just the first.
    force_encrypted: AtomicBool,
    disconnected_notify: Notify,
}

/// The panel client: owns one [`Channel`], a reconnect supervisor, a diff
/// engine, and typed request methods for every exec/read opcode. Cheap to
/// clone — every clone shares the same connection and background tasks.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

impl Client {
    /// Builds a client and starts its reconnect supervisor immediately.
    /// `config.auto_reconnect == false` still makes one connection attempt —
    /// it just won't retry after a failure or drop.
    pub fn new(config: ClientConfig) -> (Self, mpsc::UnboundedReceiver<ClientEvent>) {
        let (channel_events_tx, channel_events_rx) = mpsc::unbounded_channel();
        let channel = Channel::new(channel_events_tx, config.keep_alive);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let inner = Arc::new(Inner {
            config,
            channel,
            status: Mutex::new(ClientStatus::Disconnected),
            diff: Mutex::new(DiffEngine::new()),
            troubles_diff: Mutex::new(TroublesDiffCache::new()),
            caps: Mutex::new(None),
            module_caps: Arc::new(Mutex::new(ModuleCaps::empty())),
            monitor_config: Arc::new(Mutex::new(MonitorConfig::default())),
            reconfig: Reconfigurer::new(),
            monitor_shutdown: Arc::new(Notify::new()),
            events_tx,
            disconnect_requested: AtomicBool::new(false),
            reconnect_allowed: AtomicBool::new(true),
            force_encrypted: AtomicBool::new(false),
            disconnected_notify: Notify::new(),
        });

        tokio::spawn(Self::event_pump(inner.clone(), channel_events_rx));
        tokio::spawn(Self::supervisor(inner.clone()));

        (Self { inner }, events_rx)
    }

    pub fn status(&self) -> ClientStatus {
        *self.inner.status.lock()
    }

    pub fn caps(&self) -> Option<IntegraCaps> {
        *self.inner.caps.lock()
    }

    pub fn module_caps(&self) -> ModuleCaps {
        *self.inner.module_caps.lock()
    }

    /// Stops the supervisor from reconnecting and closes the channel.
    /// Call [`Client::reconnect_now`] to resume afterwards.
    pub async fn disconnect(&self) {
        self.inner.disconnect_requested.store(true, Ordering::SeqCst);
        self.inner.force_encrypted.store(false, Ordering::SeqCst);
        Self::set_status(&self.inner, ClientStatus::Disconnecting);
        self.inner.monitor_shutdown.notify_one();
        self.inner.channel.close(CloseSource::Caller).await;
    }

    /// Restarts the supervisor after an explicit [`Client::disconnect`].
    /// A no-op while already connected or reconnecting.
    pub fn reconnect_now(&self) {
        if self.status() != ClientStatus::Disconnected {
            return;
        }
        self.inner.disconnect_requested.store(false, Ordering::SeqCst);
        tokio::spawn(Self::supervisor(self.inner.clone()));
    }

    /// Sends a raw request and waits for its correlated response, converting
    /// a panel-rejected or timed-out request into an `Err`.
    pub async fn send(&self, request: Request) -> Result<Response, IntegraError> {
        let command = request.command as u8;
        let response = self.inner.channel.send_command(request, self.inner.config.resp_timeout).await;
        response.into_result(command)
    }

    async fn exec(&self, opcode: Opcode, payload: Vec<u8>) -> Result<(), IntegraError> {
        let request = Request::new(opcode, payload).with_broadcast(true);
        self.send(request).await.map(|_| ())
    }

    /// The scoped suppression mechanism from the error-handling policy:
    /// sends `request`, but a panel-rejected `RequestError` is logged and
    /// folded into `Ok(None)` rather than propagated, for speculative reads
    /// that are allowed to come back empty (probing whether an element,
    /// user, or event slot exists). Any other error kind — connection loss,
    /// timeout, transport failure — still propagates, since those aren't
    /// the panel telling us "no such thing", they're the channel telling us
    /// it couldn't ask at all.
    async fn send_speculative(&self, request: Request) -> Result<Option<Response>, IntegraError> {
        match self.send(request).await {
            Ok(response) => Ok(Some(response)),
            Err(IntegraError::RequestError { command, error_code }) => {
                tracing::debug!(command, error_code, "speculative request rejected by panel, treating as absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn code_bytes(&self, user_code: Option<&str>) -> [u8; 8] {
        let code = user_code.unwrap_or(&self.inner.config.user_code);
        let packed = user_code_to_bytes(code, &self.inner.config.prefix_code);
        let mut arr = [0xFFu8; 8];
        let len = packed.len().min(8);
        arr[..len].copy_from_slice(&packed[..len]);
        arr
    }

    fn code_and_bitmap(&self, user_code: Option<&str>, bitmap: &[u8]) -> Vec<u8> {
        let mut out = self.code_bytes(user_code).to_vec();
        out.extend_from_slice(bitmap);
        out
    }

    fn arm_payload(&self, user_code: Option<&str>, parts_bitmap: &[u8]) -> Vec<u8> {
        let mut out = self.code_and_bitmap(user_code, parts_bitmap);
        if self.module_caps().contains(ModuleCaps::ARM_NO_BYPASS) {
            out.push(0x80);
        }
        out
    }

    /// Widens to 32 bytes (256 outputs) when the module advertises
    /// [`ModuleCaps::BYTE_32`], 16 bytes otherwise.
    fn outputs_bitmap(&self, outputs: &[u16]) -> Vec<u8> {
        let bits = outputs_bitmap_len(self.module_caps()) * 8;
        list_to_bytes(outputs, bits, true)
    }

    /// Widens to 32 bytes (256 zones) when the module advertises
    /// [`ModuleCaps::BYTE_32`], 16 bytes otherwise.
    fn zones_bitmap(&self, zones: &[u16]) -> Vec<u8> {
        let bits = zones_bitmap_len(self.module_caps()) * 8;
        list_to_bytes(zones, bits, true)
    }

    pub async fn arm(&self, mode: ArmMode, parts: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let opcode = match mode {
            ArmMode::Mode0 => Opcode::ExecArmMode0,
            ArmMode::Mode1 => Opcode::ExecArmMode1,
            ArmMode::Mode2 => Opcode::ExecArmMode2,
            ArmMode::Mode3 => Opcode::ExecArmMode3,
        };
        let payload = self.arm_payload(user_code, &parts_to_bytes(parts));
        self.exec(opcode, payload).await
    }

    pub async fn force_arm(&self, mode: ArmMode, parts: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let opcode = match mode {
            ArmMode::Mode0 => Opcode::ExecForceArmMode0,
            ArmMode::Mode1 => Opcode::ExecForceArmMode1,
            ArmMode::Mode2 => Opcode::ExecForceArmMode2,
            ArmMode::Mode3 => Opcode::ExecForceArmMode3,
        };
        let payload = self.arm_payload(user_code, &parts_to_bytes(parts));
        self.exec(opcode, payload).await
    }

    pub async fn disarm(&self, parts: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let payload = self.code_and_bitmap(user_code, &parts_to_bytes(parts));
        self.exec(Opcode::ExecDisarm, payload).await
    }

    pub async fn clear_alarm(&self, parts: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let payload = self.code_and_bitmap(user_code, &parts_to_bytes(parts));
        self.exec(Opcode::ExecClearAlarm, payload).await
    }

    pub async fn bypass_set(&self, zones: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let payload = self.code_and_bitmap(user_code, &self.zones_bitmap(zones));
        self.exec(Opcode::ExecZonesBypassSet, payload).await
    }

    pub async fn bypass_unset(&self, zones: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let payload = self.code_and_bitmap(user_code, &self.zones_bitmap(zones));
        self.exec(Opcode::ExecZonesBypassUnset, payload).await
    }

    pub async fn outputs_on(&self, outputs: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let bitmap = self.outputs_bitmap(outputs);
        let payload = self.code_and_bitmap(user_code, &bitmap);
        self.exec(Opcode::ExecOutputsOn, payload).await
    }

    pub async fn outputs_off(&self, outputs: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let bitmap = self.outputs_bitmap(outputs);
        let payload = self.code_and_bitmap(user_code, &bitmap);
        self.exec(Opcode::ExecOutputsOff, payload).await
    }

    pub async fn outputs_switch(&self, outputs: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let bitmap = self.outputs_bitmap(outputs);
        let payload = self.code_and_bitmap(user_code, &bitmap);
        self.exec(Opcode::ExecOutputsSwitch, payload).await
    }

    pub async fn zones_isolate(&self, zones: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let payload = self.code_and_bitmap(user_code, &self.zones_bitmap(zones));
        self.exec(Opcode::ExecZonesIsolate, payload).await
    }

    pub async fn open_door(&self, doors: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        let payload = self.code_and_bitmap(user_code, &doors_to_bytes(doors));
        self.exec(Opcode::ExecOpenDoor, payload).await
    }

    pub async fn clear_trouble_memory(&self, user_code: Option<&str>) -> Result<(), IntegraError> {
        let payload = self.code_bytes(user_code).to_vec();
        self.exec(Opcode::ExecClearTroubleMemory, payload).await
    }

    /// The two-phase "1st code" workflow: presenting a single code either
    /// begins an arm/disarm sequence or cancels one already pending,
    /// completed on the keypad itself — this call only announces the intent
    /// byte over the channel.
    pub async fn enter_first_code(
        &self,
        action: FirstCodeAction,
        parts: &[u16],
        user_code: Option<&str>,
    ) -> Result<(), IntegraError> {
        let mut payload = self.code_and_bitmap(user_code, &parts_to_bytes(parts));
        payload.push(action as u8);
        self.exec(Opcode::ExecEnter1stCode, payload).await
    }

    /// Convenience wrapper: presents `user_code` to begin arming via the
    /// 1st-code workflow.
    pub async fn arm_confirm(&self, parts: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        self.enter_first_code(FirstCodeAction::Arming, parts, user_code).await
    }

    /// Convenience wrapper: presents `user_code` to cancel a pending 1st-code
    /// sequence.
    pub async fn cancel_first_code(&self, parts: &[u16], user_code: Option<&str>) -> Result<(), IntegraError> {
        self.enter_first_code(FirstCodeAction::Canceling, parts, user_code).await
    }

    pub async fn read_rtc(&self) -> Result<RtcAndStatus, IntegraError> {
        let response = self.send(Request::new(Opcode::ReadRtcAndStatus, Vec::new())).await?;
        decode_rtc_and_status(&response.payload).ok_or_else(|| IntegraError::ReadError("short RTC payload".into()))
    }

    pub async fn set_rtc(&self, year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Result<(), IntegraError> {
        let payload = encode_rtc_set(year, month, day, hour, minute, second).to_vec();
        self.exec(Opcode::ExecSetRtcClock, payload).await
    }

    /// Also refreshes the cached [`IntegraCaps`] from the decoded panel type.
    pub async fn read_integra_version(&self) -> Result<IntegraVersion, IntegraError> {
        let response = self.send(Request::new(Opcode::ReadIntegraVersion, Vec::new())).await?;
        let version = decode_integra_version(&response.payload)
            .ok_or_else(|| IntegraError::ReadError("short Integra version payload".into()))?;
        *self.inner.caps.lock() = Some(caps_for(IntegraType::from_byte(version.panel_type)));
        Ok(version)
    }

    /// Also refreshes the cached [`ModuleCaps`] for output/arm bitmap sizing.
    pub async fn read_module_version(&self, element_id: u8) -> Result<ModuleVersion, IntegraError> {
        let response = self.send(Request::new(Opcode::ReadModuleVersion, vec![element_id])).await?;
        let version = decode_module_version(&response.payload)
            .ok_or_else(|| IntegraError::ReadError("short module version payload".into()))?;
        *self.inner.module_caps.lock() = version.caps;
        Ok(version)
    }

    pub async fn read_event(&self, index: u32) -> Result<EventRecord, IntegraError> {
        let payload = encode_event_pointer(index).to_vec();
        let response = self.send(Request::new(Opcode::ExecReadEvent, payload)).await?;
        decode_event_record(&response.payload).ok_or_else(|| IntegraError::ReadError("short event record".into()))
    }

    pub async fn get_event_text(&self, code_full: u16, show_long: bool) -> Result<EventText, IntegraError> {
        let payload = encode_event_text_request(show_long, code_full).to_vec();
        let response = self.send(Request::new(Opcode::ExecGetEventText, payload)).await?;
        decode_event_text(&response.payload).ok_or_else(|| IntegraError::ReadError("short event text".into()))
    }

    pub async fn read_element_name(&self, kind: ElementKind, element_id: u8) -> Result<ElementName, IntegraError> {
        let payload = encode_element_read_name(kind, element_id).to_vec();
        let response = self.send(Request::new(Opcode::ElementReadName, payload)).await?;
        decode_element_name(&response.payload).ok_or_else(|| IntegraError::ReadError("short element name".into()))
    }

    /// Like [`Client::read_element_name`], but a panel rejection — the
    /// `OTHER_ERROR` code it returns for a non-existent element — is treated
    /// as absence rather than an error: returns `Ok(None)`.
    pub async fn read_element_name_optional(
        &self,
        kind: ElementKind,
        element_id: u8,
    ) -> Result<Option<ElementName>, IntegraError> {
        let payload = encode_element_read_name(kind, element_id).to_vec();
        let request = Request::new(Opcode::ElementReadName, payload);
        let Some(response) = self.send_speculative(request).await? else {
            return Ok(None);
        };
        decode_element_name(&response.payload)
            .map(Some)
            .ok_or_else(|| IntegraError::ReadError("short element name".into()))
    }

    /// Reads every id in `element_ids`, substituting
    /// [`ElementName::empty`] for any the panel rejects as absent — the
    /// element loader's job of turning a scanned id range into a dense,
    /// always-present-length table without aborting on the first gap.
    pub async fn read_element_names(
        &self,
        kind: ElementKind,
        element_ids: &[u8],
    ) -> Result<Vec<ElementName>, IntegraError> {
        let mut names = Vec::with_capacity(element_ids.len());
        for &id in element_ids {
            let name = self
                .read_element_name_optional(kind, id)
                .await?
                .unwrap_or_else(|| ElementName::empty(kind, id));
            names.push(name);
        }
        Ok(names)
    }

    pub async fn read_own_user_info(&self) -> Result<User, IntegraError> {
        let payload = self.code_bytes(None).to_vec();
        let response = self.send(Request::new(Opcode::UserReadSelfInfo, payload)).await?;
        decode_self_info(&response.payload).ok_or_else(|| IntegraError::ReadError("short user record".into()))
    }

    pub async fn read_user_info(&self, user_no: u8, user_code: Option<&str>) -> Result<User, IntegraError> {
        let mut payload = self.code_bytes(user_code).to_vec();
        payload.push(user_no);
        let response = self.send(Request::new(Opcode::UserReadOtherInfo, payload)).await?;
        decode_other_info(&response.payload).ok_or_else(|| IntegraError::ReadError("short user record".into()))
    }

    /// Creates a new user. Unlike [`Client::change_user`], the panel expects
    /// an explicit object number appended after the user record itself.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user(
        &self,
        user_no: u8,
        new_user_code: &str,
        phone_code: &str,
        parts: &[u16],
        user_type: UserType,
        rights: UserRights,
        time: u8,
        time_temp: u8,
        name: &str,
        object_no: u8,
        acting_user_code: Option<&str>,
    ) -> Result<(), IntegraError> {
        let mut payload = self.code_bytes(acting_user_code).to_vec();
        payload.extend(encode_user_write(
            user_no,
            new_user_code,
            phone_code,
            parts,
            user_type,
            rights,
            time,
            time_temp,
            name,
            Some(object_no),
        ));
        self.exec(Opcode::UserCreate, payload).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn change_user(
        &self,
        user_no: u8,
        new_user_code: &str,
        phone_code: &str,
        parts: &[u16],
        user_type: UserType,
        rights: UserRights,
        time: u8,
        time_temp: u8,
        name: &str,
        acting_user_code: Option<&str>,
    ) -> Result<(), IntegraError> {
        let mut payload = self.code_bytes(acting_user_code).to_vec();
        payload.extend(encode_user_write(
            user_no,
            new_user_code,
            phone_code,
            parts,
            user_type,
            rights,
            time,
            time_temp,
            name,
            None,
        ));
        self.exec(Opcode::UserChange, payload).await
    }

    pub async fn remove_user(&self, user_no: u8, user_code: Option<&str>) -> Result<(), IntegraError> {
        let mut payload = self.code_bytes(user_code).to_vec();
        payload.push(user_no);
        self.exec(Opcode::UserRemove, payload).await
    }

    fn reconfigure_monitor(&self, mutate: impl FnOnce(&mut MonitorConfig)) {
        let scope = self.inner.reconfig.scope();
        mutate(&mut self.inner.monitor_config.lock());
        scope.mark_dirty();
    }

    pub fn set_system_changes_poll_interval(&self, interval: Duration) {
        self.reconfigure_monitor(|c| c.poll_interval = interval);
    }

    /// Non-destructive merge: an interval of `0` stops monitoring `zone`.
    pub fn temp_monitor_set(&self, zone: u16, interval: Duration) {
        self.reconfigure_monitor(|c| {
            if interval.is_zero() {
                c.zone_intervals.remove(&zone);
            } else {
                c.zone_intervals.insert(zone, interval);
            }
        });
    }

    /// Non-destructive merge: an interval of `0` stops monitoring `output`.
    pub fn power_monitor_set(&self, output: u16, interval: Duration) {
        self.reconfigure_monitor(|c| {
            if interval.is_zero() {
                c.output_intervals.remove(&output);
            } else {
                c.output_intervals.insert(output, interval);
            }
        });
    }

    fn set_status(inner: &Arc<Inner>, status: ClientStatus) {
        *inner.status.lock() = status;
        let _ = inner.events_tx.send(ClientEvent::Status(status));
    }

    fn backoff_for(attempt: u32) -> Duration {
        let secs = 5f64 * 3f64.powi((attempt.saturating_sub(1)) as i32);
        Duration::from_secs_f64(secs.min(500.0))
    }

    /// For as long as the supervisor is reconnecting after an involuntary
    /// close, forces the encrypted port rather than the configured one, per
    /// the panel's own reconnection quirk. Every attempt in the storm uses
    /// the encrypted port, not just the first — it reverts to the
    /// configured port only once a connect succeeds or the caller
    /// disconnects explicitly.
    fn resolve_port(inner: &Arc<Inner>, configured: u16) -> u16 {
        if inner.force_encrypted.load(Ordering::SeqCst) {
            DEFAULT_TCP_PORT_ENCRYPTED
        } else {
            configured
        }
    }

    async fn try_connect(inner: &Arc<Inner>) -> Result<(), IntegraError> {
        match &inner.config.endpoint {
            Endpoint::Tcp { host, port } => {
                let port = Self::resolve_port(inner, *port);
                let (read, write) = satel_transport::connect_tcp(host, port, inner.config.conn_timeout)
                    .await
                    .map_err(map_transport_err)?;
                inner.channel.attach(read, write, inner.config.integration_key.as_deref()).await;
                Ok(())
            }
            Endpoint::Serial { device, baud } => {
                let (read, write) = satel_transport::connect_serial(device, *baud).map_err(map_transport_err)?;
                inner.channel.attach(read, write, inner.config.integration_key.as_deref()).await;
                Ok(())
            }
        }
    }

    /// Drives connect → run-until-disconnected → backoff → reconnect for as
    /// long as the configured retry policy allows.
    async fn supervisor(inner: Arc<Inner>) {
        let mut attempt: u32 = 0;
        loop {
            if inner.disconnect_requested.load(Ordering::SeqCst) {
                Self::set_status(&inner, ClientStatus::Disconnected);
                return;
            }
            Self::set_status(&inner, ClientStatus::Connecting);

            match Self::try_connect(&inner).await {
                Ok(()) => {
                    attempt = 0;
                    inner.force_encrypted.store(false, Ordering::SeqCst);
                    inner.diff.lock().reset();
                    inner.troubles_diff.lock().reset();
                    Self::set_status(&inner, ClientStatus::Connected);

                    let monitor = ChangeMonitor::with_shared_state(
                        inner.channel.clone(),
                        inner.config.resp_timeout,
                        inner.monitor_config.clone(),
                        inner.reconfig.clone(),
                        inner.monitor_shutdown.clone(),
                        inner.module_caps.clone(),
                    );
                    tokio::spawn(monitor.run());

                    inner.disconnected_notify.notified().await;

                    if inner.disconnect_requested.load(Ordering::SeqCst)
                        || !inner.config.auto_reconnect
                        || !inner.reconnect_allowed.load(Ordering::SeqCst)
                    {
                        Self::set_status(&inner, ClientStatus::Disconnected);
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "connection attempt failed");
                }
            }

            if inner.disconnect_requested.load(Ordering::SeqCst) {
                Self::set_status(&inner, ClientStatus::Disconnected);
                return;
            }

            attempt += 1;
            if inner.config.retries >= 0 && attempt as i32 > inner.config.retries {
                tracing::error!(attempts = attempt, "giving up after exhausting configured retries");
                Self::set_status(&inner, ClientStatus::Disconnected);
                return;
            }

            Self::set_status(&inner, ClientStatus::Reconnecting);
            tokio::time::sleep(Self::backoff_for(attempt)).await;
        }
    }

    /// Fans channel events out to callers, layering the diff engine and the
    /// troubles decoder on top of every notification.
    async fn event_pump(inner: Arc<Inner>, mut rx: mpsc::UnboundedReceiver<ChannelEvent>) {
        while let Some(event) = rx.recv().await {
            match event {
                ChannelEvent::Connected => {}
                ChannelEvent::Disconnected { reconnect_allowed } => {
                    inner.reconnect_allowed.store(reconnect_allowed, Ordering::SeqCst);
                    if reconnect_allowed {
                        inner.force_encrypted.store(true, Ordering::SeqCst);
                    }
                    inner.monitor_shutdown.notify_one();
                    inner.disconnected_notify.notify_one();
                }
                ChannelEvent::Notification { opcode, payload } => {
                    let _ = inner.events_tx.send(ClientEvent::Data { opcode, payload: payload.clone() });

                    let Some(notify_event) = NotifyEvent::from_opcode(opcode) else { continue };

                    let caps = *inner.caps.lock();
                    let source = notify_event.source();
                    let max_len = caps.and_then(|caps| {
                        if source == NotifySource::PARTS {
                            Some(caps.parts as usize / 8)
                        } else if source == NotifySource::ZONES {
                            Some(caps.zones as usize / 8)
                        } else if source == NotifySource::OUTPUTS {
                            Some(caps.outputs as usize / 8)
                        } else if source == NotifySource::DOORS {
                            Some(caps.doors() as usize / 8)
                        } else {
                            None
                        }
                    });

                    let changes = inner.diff.lock().update(notify_event, &payload, max_len);
                    if !changes.is_empty() {
                        let _ = inner.events_tx.send(ClientEvent::StateDelta { event: notify_event, changes });
                    }

                    if matches!(notify_event.source(), NotifySource::TROUBLES | NotifySource::TROUBLES_MEMORY) {
                        let regions = inner.troubles_diff.lock().update(notify_event, &payload);
                        let _ = inner.events_tx.send(ClientEvent::Troubles { event: notify_event, regions });
                    }
                }
            }
        }
    }
}
