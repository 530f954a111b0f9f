//! Error types for the I2C device accessor.

use core::fmt;

/// Errors that can occur when talking to an I2C device.
#[derive(Debug)]
pub enum BusDeviceError<E> {
    /// Underlying I2C bus error.
    I2c(E),

    /// Nothing acknowledged the address during the construction probe.
    NoDevice {
        /// 7-bit address that was probed.
        address: u8,
    },
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for BusDeviceError<E> {
    fn from(error: E) -> Self {
        BusDeviceError::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for BusDeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BusDeviceError::I2c(e) => write!(f, "I2C error: {:?}", e),
            BusDeviceError::NoDevice { address } => {
                write!(f, "No I2C device at address: {:#04x}", address)
            }
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for BusDeviceError<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            BusDeviceError::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            BusDeviceError::NoDevice { address } => {
                defmt::write!(f, "No I2C device at address: {=u8:#x}", address)
            }
        }
    }
}
