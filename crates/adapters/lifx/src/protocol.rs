//! LIFX LAN protocol codec.
//!
//! Pure functions over byte buffers; no socket involved. Every packet is a
//! 36-byte little-endian header followed by a message-specific payload:
//!
//! | Offset | Field | Type |
//! |--------|-------|------|
//! | 0–1 | Size (header + payload) | u16 LE |
//! | 2–3 | Protocol 1024, addressable `0x1000`, tagged `0x2000` | u16 LE |
//! | 4–7 | Source | u32 LE |
//! | 8–15 | Target (MAC in the low 6 bytes, 0 for all) | u64 LE |
//! | 16–21 | Reserved | |
//! | 22 | Flags: `res_required` bit 0, `ack_required` bit 1 | u8 |
//! | 23 | Sequence | u8 |
//! | 24–31 | Reserved | |
//! | 32–33 | Message type | u16 LE |
//! | 34–35 | Reserved | |

use lampctl_domain::light::{BulbState, Hsbk, Power};

use crate::error::PacketError;

pub const HEADER_LEN: usize = 36;
pub const PROTOCOL: u16 = 1024;

const PROTOCOL_MASK: u16 = 0x0fff;
const ADDRESSABLE: u16 = 0x1000;
const TAGGED: u16 = 0x2000;
const RES_REQUIRED: u8 = 0x01;
const ACK_REQUIRED: u8 = 0x02;
const LABEL_LEN: usize = 32;

/// Service number of the UDP service in `StateService`.
pub const SERVICE_UDP: u8 = 1;

const GET_SERVICE: u16 = 2;
const STATE_SERVICE: u16 = 3;
const ACKNOWLEDGEMENT: u16 = 45;
const LIGHT_GET: u16 = 101;
const LIGHT_SET_COLOR: u16 = 102;
const LIGHT_STATE: u16 = 107;
const LIGHT_SET_POWER: u16 = 117;

const STATE_SERVICE_LEN: usize = 5;
const SET_COLOR_LEN: usize = 13;
const LIGHT_STATE_LEN: usize = 52;
const SET_POWER_LEN: usize = 6;

/// Decoded packet header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub source: u32,
    /// Device the packet is for (or from); 0 addresses every device.
    pub target: u64,
    pub ack_required: bool,
    pub res_required: bool,
    pub sequence: u8,
}

/// The messages this adapter sends or understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    GetService,
    StateService { service: u8, port: u32 },
    Acknowledgement,
    LightGet,
    LightSetColor { color: Hsbk, duration_ms: u32 },
    LightState {
        color: Hsbk,
        /// Reserved field some firmwares fill with the last transition.
        transition_hint: u16,
        power: u16,
        label: String,
    },
    LightSetPower { level: u16, duration_ms: u32 },
}

impl Message {
    #[must_use]
    pub fn message_type(&self) -> u16 {
        match self {
            Self::GetService => GET_SERVICE,
            Self::StateService { .. } => STATE_SERVICE,
            Self::Acknowledgement => ACKNOWLEDGEMENT,
            Self::LightGet => LIGHT_GET,
            Self::LightSetColor { .. } => LIGHT_SET_COLOR,
            Self::LightState { .. } => LIGHT_STATE,
            Self::LightSetPower { .. } => LIGHT_SET_POWER,
        }
    }

    /// Bulb state carried by a `LightState`, if this is one.
    #[must_use]
    pub fn bulb_state(&self) -> Option<BulbState> {
        match self {
            Self::LightState {
                color,
                transition_hint,
                power,
                label,
            } => Some(BulbState {
                label: label.clone(),
                power: Power::from_level(*power),
                hue: color.hue,
                saturation: color.saturation,
                brightness: color.brightness,
                kelvin: color.kelvin,
                transition_ms: *transition_hint,
            }),
            _ => None,
        }
    }

    fn encode_payload(&self, buf: &mut Vec<u8>) {
        match self {
            Self::GetService | Self::Acknowledgement | Self::LightGet => {}
            Self::StateService { service, port } => {
                buf.push(*service);
                buf.extend_from_slice(&port.to_le_bytes());
            }
            Self::LightSetColor { color, duration_ms } => {
                buf.push(0);
                put_hsbk(buf, *color);
                buf.extend_from_slice(&duration_ms.to_le_bytes());
            }
            Self::LightState {
                color,
                transition_hint,
                power,
                label,
            } => {
                put_hsbk(buf, *color);
                buf.extend_from_slice(&transition_hint.to_le_bytes());
                buf.extend_from_slice(&power.to_le_bytes());
                let mut raw = [0u8; LABEL_LEN];
                let bytes = label.as_bytes();
                let len = bytes.len().min(LABEL_LEN);
                raw[..len].copy_from_slice(&bytes[..len]);
                buf.extend_from_slice(&raw);
                buf.extend_from_slice(&[0u8; 8]);
            }
            Self::LightSetPower { level, duration_ms } => {
                buf.extend_from_slice(&level.to_le_bytes());
                buf.extend_from_slice(&duration_ms.to_le_bytes());
            }
        }
    }

    fn decode(message_type: u16, payload: &[u8]) -> Result<Self, PacketError> {
        match message_type {
            GET_SERVICE => Ok(Self::GetService),
            ACKNOWLEDGEMENT => Ok(Self::Acknowledgement),
            LIGHT_GET => Ok(Self::LightGet),
            STATE_SERVICE => {
                expect_len("StateService", payload, STATE_SERVICE_LEN)?;
                Ok(Self::StateService {
                    service: payload[0],
                    port: u32_at(payload, 1),
                })
            }
            LIGHT_SET_COLOR => {
                expect_len("LightSetColor", payload, SET_COLOR_LEN)?;
                Ok(Self::LightSetColor {
                    color: hsbk_at(payload, 1),
                    duration_ms: u32_at(payload, 9),
                })
            }
            LIGHT_STATE => {
                expect_len("LightState", payload, LIGHT_STATE_LEN)?;
                let raw_label = &payload[12..12 + LABEL_LEN];
                let end = raw_label
                    .iter()
                    .position(|b| *b == 0)
                    .unwrap_or(LABEL_LEN);
                Ok(Self::LightState {
                    color: hsbk_at(payload, 0),
                    transition_hint: u16_at(payload, 8),
                    power: u16_at(payload, 10),
                    label: String::from_utf8_lossy(&raw_label[..end]).into_owned(),
                })
            }
            LIGHT_SET_POWER => {
                expect_len("LightSetPower", payload, SET_POWER_LEN)?;
                Ok(Self::LightSetPower {
                    level: u16_at(payload, 0),
                    duration_ms: u32_at(payload, 2),
                })
            }
            other => Err(PacketError::UnknownType(other)),
        }
    }
}

/// A header plus its message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: Header,
    pub message: Message,
}

impl Packet {
    /// Serialize to a datagram. A zero target is sent tagged.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        self.message.encode_payload(&mut payload);

        let size = u16::try_from(HEADER_LEN + payload.len()).unwrap_or(u16::MAX);
        let mut protocol = PROTOCOL | ADDRESSABLE;
        if self.header.target == 0 {
            protocol |= TAGGED;
        }
        let mut flags = 0;
        if self.header.res_required {
            flags |= RES_REQUIRED;
        }
        if self.header.ack_required {
            flags |= ACK_REQUIRED;
        }

        let mut buf = Vec::with_capacity(usize::from(size));
        buf.extend_from_slice(&size.to_le_bytes());
        buf.extend_from_slice(&protocol.to_le_bytes());
        buf.extend_from_slice(&self.header.source.to_le_bytes());
        buf.extend_from_slice(&self.header.target.to_le_bytes());
        buf.extend_from_slice(&[0u8; 6]);
        buf.push(flags);
        buf.push(self.header.sequence);
        buf.extend_from_slice(&[0u8; 8]);
        buf.extend_from_slice(&self.message.message_type().to_le_bytes());
        buf.extend_from_slice(&[0u8; 2]);
        buf.extend_from_slice(&payload);
        buf
    }

    /// Parse one datagram.
    ///
    /// # Errors
    ///
    /// Returns a [`PacketError`] when the datagram is truncated, declares a
    /// different size, uses another protocol, or carries a message type or
    /// payload this codec does not understand.
    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < HEADER_LEN {
            return Err(PacketError::TooShort { actual: data.len() });
        }
        let declared = usize::from(u16_at(data, 0));
        if declared != data.len() {
            return Err(PacketError::SizeMismatch {
                declared,
                actual: data.len(),
            });
        }
        let protocol = u16_at(data, 2) & PROTOCOL_MASK;
        if protocol != PROTOCOL {
            return Err(PacketError::Protocol(protocol));
        }

        let flags = data[22];
        let header = Header {
            source: u32_at(data, 4),
            target: u64::from_le_bytes([
                data[8], data[9], data[10], data[11], data[12], data[13], data[14], data[15],
            ]),
            ack_required: flags & ACK_REQUIRED != 0,
            res_required: flags & RES_REQUIRED != 0,
            sequence: data[23],
        };
        let message = Message::decode(u16_at(data, 32), &data[HEADER_LEN..])?;
        Ok(Self { header, message })
    }
}

fn expect_len(message: &'static str, payload: &[u8], expected: usize) -> Result<(), PacketError> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(PacketError::PayloadLength {
            message,
            expected,
            actual: payload.len(),
        })
    }
}

fn put_hsbk(buf: &mut Vec<u8>, color: Hsbk) {
    buf.extend_from_slice(&color.hue.to_le_bytes());
    buf.extend_from_slice(&color.saturation.to_le_bytes());
    buf.extend_from_slice(&color.brightness.to_le_bytes());
    buf.extend_from_slice(&color.kelvin.to_le_bytes());
}

fn hsbk_at(data: &[u8], offset: usize) -> Hsbk {
    Hsbk {
        hue: u16_at(data, offset),
        saturation: u16_at(data, offset + 2),
        brightness: u16_at(data, offset + 4),
        kelvin: u16_at(data, offset + 6),
    }
}

fn u16_at(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(target: u64) -> Header {
        Header {
            source: 0x1234_5678,
            target,
            ack_required: false,
            res_required: false,
            sequence: 7,
        }
    }

    fn kitchen_state() -> Message {
        Message::LightState {
            color: Hsbk {
                hue: 0x1000,
                saturation: 0xffff,
                brightness: 0x8000,
                kelvin: 3500,
            },
            transition_hint: 0,
            power: 0xffff,
            label: "Kitchen".to_string(),
        }
    }

    #[test]
    fn should_encode_tagged_discovery_broadcast() {
        let bytes = Packet {
            header: header(0),
            message: Message::GetService,
        }
        .encode();

        assert_eq!(bytes.len(), HEADER_LEN);
        assert_eq!(&bytes[0..2], &[36, 0]);
        assert_eq!(u16_at(&bytes, 2), PROTOCOL | ADDRESSABLE | TAGGED);
        assert_eq!(&bytes[4..8], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(&bytes[8..16], &[0; 8]);
        assert_eq!(bytes[23], 7);
        assert_eq!(u16_at(&bytes, 32), 2);
    }

    #[test]
    fn should_encode_addressed_set_power_with_ack_flag() {
        let bytes = Packet {
            header: Header {
                ack_required: true,
                ..header(0x0000_ccbb_aa00_73d5)
            },
            message: Message::LightSetPower {
                level: 0xffff,
                duration_ms: 0,
            },
        }
        .encode();

        assert_eq!(bytes.len(), 42);
        assert_eq!(u16_at(&bytes, 2), PROTOCOL | ADDRESSABLE);
        assert_eq!(&bytes[8..14], &[0xd5, 0x73, 0x00, 0xaa, 0xbb, 0xcc]);
        assert_eq!(bytes[22], ACK_REQUIRED);
        assert_eq!(u16_at(&bytes, 32), 117);
        assert_eq!(&bytes[36..], &[0xff, 0xff, 0, 0, 0, 0]);
    }

    #[test]
    fn should_lay_out_set_color_payload() {
        let bytes = Packet {
            header: header(1),
            message: Message::LightSetColor {
                color: Hsbk {
                    hue: 0x0102,
                    saturation: 0x0304,
                    brightness: 0x0506,
                    kelvin: 0x0708,
                },
                duration_ms: 3000,
            },
        }
        .encode();

        assert_eq!(
            &bytes[HEADER_LEN..],
            &[0, 0x02, 0x01, 0x04, 0x03, 0x06, 0x05, 0x08, 0x07, 0xb8, 0x0b, 0, 0]
        );
    }

    #[test]
    fn should_decode_light_state_into_bulb_state() {
        let bytes = Packet {
            header: header(42),
            message: kitchen_state(),
        }
        .encode();

        let packet = Packet::decode(&bytes).unwrap();
        assert_eq!(packet.header.target, 42);
        let state = packet.message.bulb_state().unwrap();
        assert_eq!(state.label, "Kitchen");
        assert_eq!(state.power, Power::On);
        assert_eq!(state.hue, 0x1000);
        assert_eq!(state.brightness, 0x8000);
        assert_eq!(state.kelvin, 3500);
    }

    #[test]
    fn should_truncate_long_labels_to_32_bytes() {
        let Message::LightState {
            color,
            transition_hint,
            power,
            ..
        } = kitchen_state()
        else {
            unreachable!()
        };
        let bytes = Packet {
            header: header(1),
            message: Message::LightState {
                color,
                transition_hint,
                power,
                label: "A".repeat(40),
            },
        }
        .encode();

        assert_eq!(bytes.len(), HEADER_LEN + LIGHT_STATE_LEN);
        let state = Packet::decode(&bytes).unwrap().message.bulb_state().unwrap();
        assert_eq!(state.label, "A".repeat(32));
    }

    #[test]
    fn should_decode_state_service_port() {
        let bytes = Packet {
            header: header(9),
            message: Message::StateService {
                service: SERVICE_UDP,
                port: 56700,
            },
        }
        .encode();

        assert_eq!(
            Packet::decode(&bytes).unwrap().message,
            Message::StateService {
                service: SERVICE_UDP,
                port: 56700
            }
        );
    }

    #[test]
    fn should_reject_truncated_datagram() {
        assert_eq!(
            Packet::decode(&[0u8; 10]),
            Err(PacketError::TooShort { actual: 10 })
        );
    }

    #[test]
    fn should_reject_size_mismatch() {
        let mut bytes = Packet {
            header: header(0),
            message: Message::GetService,
        }
        .encode();
        bytes.push(0);

        assert_eq!(
            Packet::decode(&bytes),
            Err(PacketError::SizeMismatch {
                declared: 36,
                actual: 37
            })
        );
    }

    #[test]
    fn should_reject_other_protocol_numbers() {
        let mut bytes = Packet {
            header: header(0),
            message: Message::GetService,
        }
        .encode();
        bytes[2] = 0x01;
        bytes[3] = 0x14;

        assert_eq!(Packet::decode(&bytes), Err(PacketError::Protocol(0x401)));
    }

    #[test]
    fn should_reject_unknown_message_type() {
        let mut bytes = Packet {
            header: header(0),
            message: Message::GetService,
        }
        .encode();
        bytes[32] = 0xff;

        assert_eq!(Packet::decode(&bytes), Err(PacketError::UnknownType(0xff)));
    }

    #[test]
    fn should_reject_short_light_state_payload() {
        let mut bytes = Packet {
            header: header(1),
            message: Message::LightGet,
        }
        .encode();
        bytes[32] = 107;
        bytes.extend_from_slice(&[0u8; 4]);
        bytes[0] = 40;

        assert_eq!(
            Packet::decode(&bytes),
            Err(PacketError::PayloadLength {
                message: "LightState",
                expected: 52,
                actual: 4
            })
        );
    }
}
