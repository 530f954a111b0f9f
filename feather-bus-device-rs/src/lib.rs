//! Async accessor for a single I2C device.
//!
//! [`I2cDevice`] binds an `embedded-hal-async` bus handle to a 7-bit
//! address. Construction probes the address and fails with
//! [`BusDeviceError::NoDevice`] if nothing acknowledges it; afterwards the
//! device forwards reads, writes and write-then-read transfers.
//!
//! # Quick start
//!
//! ```no_run
//! use feather_bus_device::{I2cDevice, ProbeMethod, TransferMode};
//!
//! # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
//! let mut dev = I2cDevice::with_options(i2c, 0x36, ProbeMethod::ReadByte, TransferMode::Split)
//!     .await
//!     .unwrap();
//! dev.write(&[0x01, 0x0A]).await.unwrap();
//! # }
//! ```
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations on the public
//!   types and log probe results.

#![no_std]

pub use device::{I2cDevice, ProbeMethod, TransferMode};
pub use error::BusDeviceError;

mod device;
mod error;
