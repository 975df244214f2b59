//! # lampctl-adapter-lifx
//!
//! LIFX LAN adapter. Talks to bulbs over UDP on port 56700.
//!
//! ## How it works
//!
//! - Discovery broadcasts `GetService` on an interval. Each `StateService`
//!   reply records the bulb's address and is followed by a unicast
//!   `LightGet`; the `LightState` answer announces the bulb (MAC, label).
//! - Control messages (`LightSetPower`, `LightSetColor`) are sent unicast to
//!   the last address a bulb answered from.
//! - Every `LightState` received is published as a state report.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `lampctl-app` and `lampctl-domain`.

mod config;
mod error;
pub mod protocol;
mod transport;

pub use config::{LIFX_PORT, LifxConfig};
pub use error::{LifxError, PacketError};
pub use transport::LifxTransport;
