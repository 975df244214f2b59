//! UDP transport: one socket, a receive task and an optional discovery task.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use lampctl_app::ports::{DiscoveryStream, LightTransport};
use lampctl_domain::error::LampError;
use lampctl_domain::id::DeviceId;
use lampctl_domain::light::{DeviceHandle, Hsbk, Power, StateReport};

use crate::config::LifxConfig;
use crate::error::LifxError;
use crate::protocol::{Header, Message, Packet, SERVICE_UDP};

const RECEIVE_BUFFER: usize = 1024;

struct Discovery {
    announcements: mpsc::Sender<DeviceHandle>,
    broadcaster: JoinHandle<()>,
}

struct Shared {
    socket: UdpSocket,
    config: LifxConfig,
    source: u32,
    sequence: AtomicU8,
    addresses: Mutex<HashMap<DeviceId, SocketAddr>>,
    reports: broadcast::Sender<StateReport>,
    discovery: Mutex<Option<Discovery>>,
}

impl Shared {
    async fn send(
        &self,
        target: u64,
        to: SocketAddr,
        message: Message,
        ack_required: bool,
        res_required: bool,
    ) -> Result<(), LifxError> {
        let packet = Packet {
            header: Header {
                source: self.source,
                target,
                ack_required,
                res_required,
                sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
            },
            message,
        };
        self.socket.send_to(&packet.encode(), to).await?;
        Ok(())
    }

    async fn handle(&self, packet: Packet, from: SocketAddr) {
        let device = DeviceId::from_raw(packet.header.target);
        match &packet.message {
            Message::StateService { service, port } if *service == SERVICE_UDP => {
                let addr = u16::try_from(*port)
                    .ok()
                    .filter(|p| *p != 0)
                    .map_or(from, |p| SocketAddr::new(from.ip(), p));
                self.remember(device, addr);
                tracing::debug!(%device, %addr, "LIFX service discovered");
                if let Err(err) = self
                    .send(packet.header.target, addr, Message::LightGet, false, true)
                    .await
                {
                    tracing::warn!(%device, error = %err, "failed to query discovered device");
                }
            }
            message @ Message::LightState { .. } => {
                self.remember(device, from);
                let Some(state) = message.bulb_state() else {
                    return;
                };
                self.announce(DeviceHandle::new(device, state.label.clone()));
                let _ = self.reports.send(StateReport { device, state });
            }
            Message::Acknowledgement => {
                tracing::debug!(%device, sequence = packet.header.sequence, "LIFX ack");
            }
            other => {
                tracing::debug!(%device, message_type = other.message_type(), "ignoring LIFX message");
            }
        }
    }

    /// Hand a device to the running discovery, if any.
    fn announce(&self, handle: DeviceHandle) {
        let discovery = self.lock_discovery();
        if let Some(discovery) = discovery.as_ref()
            && discovery.announcements.try_send(handle).is_err()
        {
            tracing::debug!("discovery stream full or closed");
        }
    }

    fn remember(&self, device: DeviceId, addr: SocketAddr) {
        self.addresses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(device, addr);
    }

    fn address_of(&self, device: &DeviceHandle) -> Result<SocketAddr, LifxError> {
        self.addresses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&device.id)
            .copied()
            .ok_or_else(|| LifxError::UnknownDevice(device.label.clone()))
    }

    fn lock_discovery(&self) -> MutexGuard<'_, Option<Discovery>> {
        self.discovery.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn receive_loop(shared: Arc<Shared>) {
    let mut buf = [0u8; RECEIVE_BUFFER];
    loop {
        let (len, from) = match shared.socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(err) => {
                tracing::warn!(error = %err, "LIFX receive failed");
                continue;
            }
        };
        match Packet::decode(&buf[..len]) {
            Ok(packet) => shared.handle(packet, from).await,
            Err(err) => tracing::debug!(%from, error = %err, "skipping malformed LIFX packet"),
        }
    }
}

async fn broadcast_loop(shared: Arc<Shared>) {
    let mut interval =
        tokio::time::interval(Duration::from_millis(shared.config.discovery_interval_ms));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        tracing::debug!(to = %shared.config.broadcast, "broadcasting LIFX discovery");
        if let Err(err) = shared
            .send(0, shared.config.broadcast, Message::GetService, false, true)
            .await
        {
            tracing::warn!(error = %err, "LIFX discovery broadcast failed");
        }
    }
}

/// Light transport speaking the LIFX LAN protocol.
///
/// Dropping the transport stops its background tasks.
pub struct LifxTransport {
    shared: Arc<Shared>,
    receiver: JoinHandle<()>,
}

impl LifxTransport {
    /// Bind the UDP socket and start receiving.
    ///
    /// # Errors
    ///
    /// Returns [`LifxError::Io`] if the socket cannot be bound or switched
    /// to broadcast mode.
    pub async fn bind(config: LifxConfig) -> Result<Self, LifxError> {
        let socket = UdpSocket::bind(config.bind).await?;
        socket.set_broadcast(true)?;
        tracing::info!(addr = %socket.local_addr()?, "LIFX transport bound");

        let (reports, _) = broadcast::channel(64);
        let shared = Arc::new(Shared {
            socket,
            config,
            source: std::process::id(),
            sequence: AtomicU8::new(0),
            addresses: Mutex::new(HashMap::new()),
            reports,
            discovery: Mutex::new(None),
        });
        let receiver = tokio::spawn(receive_loop(Arc::clone(&shared)));
        Ok(Self { shared, receiver })
    }

    /// Address of the local socket.
    ///
    /// # Errors
    ///
    /// Returns [`LifxError::Io`] if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, LifxError> {
        Ok(self.shared.socket.local_addr()?)
    }

    async fn send_to_device(
        &self,
        device: &DeviceHandle,
        message: Message,
        ack_required: bool,
        res_required: bool,
    ) -> Result<(), LampError> {
        let addr = self.shared.address_of(device)?;
        self.shared
            .send(device.id.as_raw(), addr, message, ack_required, res_required)
            .await?;
        Ok(())
    }
}

impl Drop for LifxTransport {
    fn drop(&mut self) {
        self.receiver.abort();
        if let Some(discovery) = self.shared.lock_discovery().take() {
            discovery.broadcaster.abort();
        }
    }
}

impl LightTransport for LifxTransport {
    async fn start_discovery(&self) -> Result<DiscoveryStream, LampError> {
        let (tx, rx) = mpsc::channel(64);
        let broadcaster = tokio::spawn(broadcast_loop(Arc::clone(&self.shared)));
        let previous = self.shared.lock_discovery().replace(Discovery {
            announcements: tx,
            broadcaster,
        });
        if let Some(previous) = previous {
            previous.broadcaster.abort();
        }
        tracing::debug!("LIFX discovery started");
        Ok(DiscoveryStream::new(rx))
    }

    async fn stop_discovery(&self) -> Result<(), LampError> {
        let discovery = self.shared.lock_discovery().take();
        if let Some(discovery) = discovery {
            discovery.broadcaster.abort();
            tracing::debug!("LIFX discovery stopped");
        }
        Ok(())
    }

    async fn set_power(&self, device: &DeviceHandle, power: Power) -> Result<(), LampError> {
        self.send_to_device(
            device,
            Message::LightSetPower {
                level: power.level(),
                duration_ms: 0,
            },
            true,
            false,
        )
        .await
    }

    async fn set_color(
        &self,
        device: &DeviceHandle,
        color: Hsbk,
        transition_ms: u32,
    ) -> Result<(), LampError> {
        self.send_to_device(
            device,
            Message::LightSetColor {
                color,
                duration_ms: transition_ms,
            },
            true,
            false,
        )
        .await
    }

    async fn request_state(&self, device: &DeviceHandle) -> Result<(), LampError> {
        self.send_to_device(device, Message::LightGet, false, true)
            .await
    }

    fn subscribe_states(&self) -> broadcast::Receiver<StateReport> {
        self.shared.reports.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    const MAC: u64 = 0x0000_ccbb_aa00_73d5;
    const WAIT: Duration = Duration::from_secs(2);

    /// A bulb on the loopback interface answering discovery and queries.
    struct FakeBulb {
        socket: UdpSocket,
    }

    impl FakeBulb {
        async fn bind() -> Self {
            Self {
                socket: UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap(),
            }
        }

        fn addr(&self) -> SocketAddr {
            self.socket.local_addr().unwrap()
        }

        async fn receive(&self) -> (Packet, SocketAddr) {
            let mut buf = [0u8; RECEIVE_BUFFER];
            let (len, from) = timeout(WAIT, self.socket.recv_from(&mut buf))
                .await
                .unwrap()
                .unwrap();
            (Packet::decode(&buf[..len]).unwrap(), from)
        }

        async fn reply(&self, to: SocketAddr, message: Message) {
            let packet = Packet {
                header: Header {
                    source: 0,
                    target: MAC,
                    ack_required: false,
                    res_required: false,
                    sequence: 0,
                },
                message,
            };
            self.socket.send_to(&packet.encode(), to).await.unwrap();
        }

        async fn reply_state(&self, to: SocketAddr, power: u16) {
            self.reply(
                to,
                Message::LightState {
                    color: Hsbk {
                        hue: 0,
                        saturation: 0,
                        brightness: 0x8000,
                        kelvin: 3500,
                    },
                    transition_hint: 0,
                    power,
                    label: "Kitchen".to_string(),
                },
            )
            .await;
        }
    }

    async fn transport_for(bulb: &FakeBulb) -> LifxTransport {
        LifxTransport::bind(LifxConfig {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            broadcast: bulb.addr(),
            discovery_interval_ms: 100,
        })
        .await
        .unwrap()
    }

    /// Walk the discovery handshake and return the announced handle.
    async fn discover(bulb: &FakeBulb, transport: &LifxTransport) -> (DeviceHandle, DiscoveryStream, SocketAddr) {
        let mut stream = transport.start_discovery().await.unwrap();

        let (packet, from) = bulb.receive().await;
        assert_eq!(packet.message, Message::GetService);
        assert_eq!(packet.header.target, 0);
        let port = u32::from(bulb.addr().port());
        bulb.reply(from, Message::StateService { service: SERVICE_UDP, port }).await;

        let (packet, from) = loop {
            let (packet, from) = bulb.receive().await;
            if packet.message == Message::LightGet {
                break (packet, from);
            }
        };
        assert_eq!(packet.header.target, MAC);
        bulb.reply_state(from, 0xffff).await;

        let handle = timeout(WAIT, stream.next()).await.unwrap().unwrap();
        (handle, stream, from)
    }

    #[tokio::test]
    async fn should_announce_device_after_discovery_handshake() {
        let bulb = FakeBulb::bind().await;
        let transport = transport_for(&bulb).await;

        let (handle, _stream, _) = discover(&bulb, &transport).await;

        assert_eq!(handle.id, DeviceId::from_raw(MAC));
        assert_eq!(handle.label, "Kitchen");
    }

    #[tokio::test]
    async fn should_publish_state_reports_for_queries() {
        let bulb = FakeBulb::bind().await;
        let transport = transport_for(&bulb).await;
        let (handle, _stream, _) = discover(&bulb, &transport).await;
        transport.stop_discovery().await.unwrap();

        let mut reports = transport.subscribe_states();
        transport.request_state(&handle).await.unwrap();
        let (packet, from) = loop {
            let (packet, from) = bulb.receive().await;
            if packet.message == Message::LightGet {
                break (packet, from);
            }
        };
        assert!(packet.header.res_required);
        bulb.reply_state(from, 0).await;

        let report = timeout(WAIT, reports.recv()).await.unwrap().unwrap();
        assert_eq!(report.device, handle.id);
        assert_eq!(report.state.power, Power::Off);
    }

    #[tokio::test]
    async fn should_send_power_to_known_device() {
        let bulb = FakeBulb::bind().await;
        let transport = transport_for(&bulb).await;
        let (handle, _stream, _) = discover(&bulb, &transport).await;
        transport.stop_discovery().await.unwrap();

        transport.set_power(&handle, Power::Off).await.unwrap();
        let packet = loop {
            let (packet, _) = bulb.receive().await;
            if matches!(packet.message, Message::LightSetPower { .. }) {
                break packet;
            }
        };

        assert!(packet.header.ack_required);
        assert_eq!(
            packet.message,
            Message::LightSetPower {
                level: 0,
                duration_ms: 0
            }
        );
    }

    #[tokio::test]
    async fn should_end_discovery_stream_when_stopped() {
        let bulb = FakeBulb::bind().await;
        let transport = transport_for(&bulb).await;
        let (_, mut stream, _) = discover(&bulb, &transport).await;

        transport.stop_discovery().await.unwrap();

        let next = timeout(WAIT, stream.next()).await.unwrap();
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn should_reject_control_for_unknown_device() {
        let bulb = FakeBulb::bind().await;
        let transport = transport_for(&bulb).await;
        let stranger = DeviceHandle::new(DeviceId::from_raw(1), "Attic");

        let err = transport.set_power(&stranger, Power::On).await.unwrap_err();

        assert!(matches!(err, LampError::Transport(_)));
    }

    #[tokio::test]
    async fn should_skip_malformed_datagrams() {
        let bulb = FakeBulb::bind().await;
        let transport = transport_for(&bulb).await;
        bulb.socket
            .send_to(&[1, 2, 3], transport.local_addr().unwrap())
            .await
            .unwrap();

        let (handle, _stream, _) = discover(&bulb, &transport).await;

        assert_eq!(handle.label, "Kitchen");
    }
}
