//! Single I2C device bound to a fixed address.
//!
//! [`I2cDevice`] pairs a bus with a 7-bit address, checks at construction
//! that something answers there, and forwards reads and writes. The only
//! decision it makes is how a write-then-read transfer is issued, and that
//! is fixed once when the device is built.

use embedded_hal_async::i2c::{Error as _, ErrorKind, I2c};

use crate::error::BusDeviceError;

/// How [`I2cDevice::write_then_read_into()`] puts bytes on the bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferMode {
    /// One transaction with a repeated START between the write and read
    /// phases (`I2c::write_read`).
    #[default]
    Combined,
    /// A complete write transaction followed by a separate read
    /// transaction. For devices that need a STOP, or time, between the
    /// two phases.
    Split,
}

/// How [`I2cDevice`] checks that a device is present at its address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeMethod {
    /// Zero-length write: START, address, STOP.
    #[default]
    EmptyWrite,
    /// Single-byte read, for controllers that reject empty writes.
    ReadByte,
}

/// An I2C device at a fixed address on an owned bus handle.
///
/// Pass a shared-bus device (for example from `embassy-embedded-hal`) to
/// put several devices on one bus.
///
/// # Example
///
/// ```no_run
/// use feather_bus_device::I2cDevice;
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut dev = I2cDevice::new(i2c, 0x3C).await.unwrap();
///
/// let mut id = [0u8; 1];
/// dev.write_then_read_into(&[0x0F], &mut id).await.unwrap();
/// # }
/// ```
pub struct I2cDevice<I2C> {
    i2c: I2C,
    address: u8,
    mode: TransferMode,
}

impl<I2C> I2cDevice<I2C>
where
    I2C: I2c,
{
    /// Probe `address` with an empty write and bind to it using
    /// [`TransferMode::Combined`].
    ///
    /// # Errors
    ///
    /// * [`BusDeviceError::NoDevice`] if the address is not acknowledged.
    /// * [`BusDeviceError::I2c`] on any other bus failure during the probe.
    pub async fn new(i2c: I2C, address: u8) -> Result<Self, BusDeviceError<I2C::Error>> {
        Self::with_options(i2c, address, ProbeMethod::default(), TransferMode::default()).await
    }

    /// Probe `address` using `probe` and bind to it with transfer mode `mode`.
    ///
    /// # Errors
    ///
    /// Same as [`new()`](Self::new).
    pub async fn with_options(
        mut i2c: I2C,
        address: u8,
        probe: ProbeMethod,
        mode: TransferMode,
    ) -> Result<Self, BusDeviceError<I2C::Error>> {
        let probed = match probe {
            ProbeMethod::EmptyWrite => i2c.write(address, &[]).await,
            ProbeMethod::ReadByte => {
                let mut scratch = [0u8; 1];
                i2c.read(address, &mut scratch).await
            }
        };

        if let Err(e) = probed {
            if let ErrorKind::NoAcknowledge(_) = e.kind() {
                #[cfg(feature = "defmt")]
                defmt::warn!("No I2C device at {=u8:#x}", address);
                return Err(BusDeviceError::NoDevice { address });
            }
            return Err(BusDeviceError::I2c(e));
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("I2C device found at {=u8:#x} ({})", address, mode);

        Ok(Self { i2c, address, mode })
    }

    /// 7-bit address this device is bound to.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Transfer mode chosen at construction.
    pub fn mode(&self) -> TransferMode {
        self.mode
    }

    /// Read `buf.len()` bytes from the device.
    pub async fn read_into(&mut self, buf: &mut [u8]) -> Result<(), BusDeviceError<I2C::Error>> {
        self.i2c.read(self.address, buf).await?;
        Ok(())
    }

    /// Write all of `buf` to the device.
    pub async fn write(&mut self, buf: &[u8]) -> Result<(), BusDeviceError<I2C::Error>> {
        self.i2c.write(self.address, buf).await?;
        Ok(())
    }

    /// Write `out`, then read `buf.len()` bytes into `buf`.
    ///
    /// Issued as one transaction or two according to [`mode()`](Self::mode).
    /// To send or fill only part of a buffer, pass a sub-slice.
    pub async fn write_then_read_into(
        &mut self,
        out: &[u8],
        buf: &mut [u8],
    ) -> Result<(), BusDeviceError<I2C::Error>> {
        match self.mode {
            TransferMode::Combined => {
                self.i2c.write_read(self.address, out, buf).await?;
            }
            TransferMode::Split => {
                self.i2c.write(self.address, out).await?;
                self.i2c.read(self.address, buf).await?;
            }
        }
        Ok(())
    }

    /// Give back the bus handle.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorType, NoAcknowledgeSource, Operation};
    use heapless::Vec;

    use super::*;

    const ADDR: u8 = 0x3C;

    #[derive(Debug, PartialEq)]
    enum Op {
        Write(Vec<u8, 8>),
        Read(usize),
    }

    /// Records every transaction; one device answers at `present`.
    struct FakeBus {
        present: u8,
        bus_fault: bool,
        response: u8,
        log: Vec<Vec<Op, 4>, 8>,
    }

    impl FakeBus {
        fn new(present: u8) -> Self {
            Self {
                present,
                bus_fault: false,
                response: 0xA5,
                log: Vec::new(),
            }
        }
    }

    impl ErrorType for FakeBus {
        type Error = ErrorKind;
    }

    impl I2c for FakeBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.bus_fault {
                return Err(ErrorKind::Bus);
            }
            if address != self.present {
                return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
            }

            let mut ops = Vec::new();
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => {
                        let mut written = Vec::new();
                        written.extend_from_slice(&bytes[..]).unwrap();
                        ops.push(Op::Write(written)).unwrap();
                    }
                    Operation::Read(buf) => {
                        buf.fill(self.response);
                        ops.push(Op::Read(buf.len())).unwrap();
                    }
                }
            }
            self.log.push(ops).unwrap();
            Ok(())
        }
    }

    fn write_op(bytes: &[u8]) -> Op {
        Op::Write(Vec::from_slice(bytes).unwrap())
    }

    #[test]
    fn new_probes_with_empty_write() {
        let dev = block_on(I2cDevice::new(FakeBus::new(ADDR), ADDR)).unwrap();
        assert_eq!(dev.address(), ADDR);
        assert_eq!(dev.mode(), TransferMode::Combined);

        let bus = dev.release();
        assert_eq!(bus.log.len(), 1);
        assert_eq!(bus.log[0].as_slice(), &[write_op(&[])]);
    }

    #[test]
    fn probe_can_read_instead() {
        let dev = block_on(I2cDevice::with_options(
            FakeBus::new(ADDR),
            ADDR,
            ProbeMethod::ReadByte,
            TransferMode::Split,
        ))
        .unwrap();

        let bus = dev.release();
        assert_eq!(bus.log[0].as_slice(), &[Op::Read(1)]);
    }

    #[test]
    fn missing_device_is_reported() {
        let result = block_on(I2cDevice::new(FakeBus::new(ADDR), 0x3D));
        assert!(matches!(
            result,
            Err(BusDeviceError::NoDevice { address: 0x3D })
        ));
    }

    #[test]
    fn other_probe_failures_pass_through() {
        let mut bus = FakeBus::new(ADDR);
        bus.bus_fault = true;
        let result = block_on(I2cDevice::new(bus, ADDR));
        assert!(matches!(result, Err(BusDeviceError::I2c(ErrorKind::Bus))));
    }

    #[test]
    fn read_and_write_forward_to_bus() {
        block_on(async {
            let mut dev = I2cDevice::new(FakeBus::new(ADDR), ADDR).await.unwrap();

            dev.write(&[0x00, 0xAF]).await.unwrap();
            let mut buf = [0u8; 3];
            dev.read_into(&mut buf).await.unwrap();
            assert_eq!(buf, [0xA5; 3]);

            let bus = dev.release();
            assert_eq!(bus.log[1].as_slice(), &[write_op(&[0x00, 0xAF])]);
            assert_eq!(bus.log[2].as_slice(), &[Op::Read(3)]);
        });
    }

    #[test]
    fn combined_mode_uses_one_transaction() {
        block_on(async {
            let mut dev = I2cDevice::new(FakeBus::new(ADDR), ADDR).await.unwrap();

            let mut buf = [0u8; 2];
            dev.write_then_read_into(&[0x0F], &mut buf).await.unwrap();
            assert_eq!(buf, [0xA5; 2]);

            let bus = dev.release();
            assert_eq!(bus.log.len(), 2);
            assert_eq!(bus.log[1].as_slice(), &[write_op(&[0x0F]), Op::Read(2)]);
        });
    }

    #[test]
    fn split_mode_uses_two_transactions() {
        block_on(async {
            let mut dev = I2cDevice::with_options(
                FakeBus::new(ADDR),
                ADDR,
                ProbeMethod::EmptyWrite,
                TransferMode::Split,
            )
            .await
            .unwrap();

            let mut buf = [0u8; 4];
            dev.write_then_read_into(&[0x01, 0x0A], &mut buf[..2])
                .await
                .unwrap();
            assert_eq!(buf, [0xA5, 0xA5, 0, 0]);

            let bus = dev.release();
            assert_eq!(bus.log.len(), 3);
            assert_eq!(bus.log[1].as_slice(), &[write_op(&[0x01, 0x0A])]);
            assert_eq!(bus.log[2].as_slice(), &[Op::Read(2)]);
        });
    }

    #[test]
    fn display_names_missing_address() {
        let err: BusDeviceError<ErrorKind> = BusDeviceError::NoDevice { address: 0x3c };
        let mut text: heapless::String<48> = heapless::String::new();
        core::fmt::write(&mut text, format_args!("{}", err)).unwrap();
        assert_eq!(text.as_str(), "No I2C device at address: 0x3c");
    }
}
