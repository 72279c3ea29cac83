//! SimpleBGC transport abstraction layer
//!
//! This crate defines the byte transport traits that the protocol codec
//! runs on. Platform code (a Linux TTY, a microcontroller UART, a test
//! double) implements them, so the same codec can talk to the gimbal
//! controller from any host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (gimbal control, tooling)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sbgc-protocol (framing, payloads)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  sbgc-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  IoTransport  │       │   Loopback    │
//! │ (embedded-io) │       │   (memory)    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`transport::TransportTx`], [`transport::TransportRx`] - Byte I/O
//! - [`transport::Transport`] - Both directions on one handle

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "embedded-io")]
pub mod io;
pub mod loopback;
pub mod serial;
pub mod transport;

// Re-export key types at crate root for convenience
#[cfg(feature = "embedded-io")]
pub use io::IoTransport;
pub use loopback::{LoopbackError, LoopbackTransport};
pub use serial::{DataBits, Parity, SerialConfig, StopBits};
pub use transport::{Transport, TransportRx, TransportTx};
