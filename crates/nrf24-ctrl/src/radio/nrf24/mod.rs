mod auto_ack;
pub(crate) mod bit_fields;
mod constants;
mod fifo;
mod init;
mod payload_length;
mod pipe;
mod radio;
mod status;
pub use constants::{commands, mnemonics, registers, timing};

use crate::{BusTransport, StatusFlags};
use bit_fields::Feature;

/// This struct implements the [`Esb*` traits](mod@crate::radio::prelude)
/// for the nRF24L01 transceiver on top of any [`BusTransport`].
///
/// Besides the trait methods, raw register access is exposed for the
/// settings the traits do not cover.
pub struct NrfController<T> {
    transport: T,
    status: StatusFlags,
    feature: Feature,
    payload_size: u8,
}

impl<T: BusTransport> NrfController<T> {
    /// Wrap `transport`. Nothing is sent until
    /// [`begin()`](fn@crate::radio::prelude::EsbInit::begin).
    pub fn new(transport: T) -> NrfController<T> {
        NrfController {
            transport,
            status: StatusFlags::new(),
            feature: Feature::new(),
            payload_size: mnemonics::MAX_PAYLOAD_SIZE,
        }
    }

    /// Consume the controller and give back the transport.
    pub fn free(self) -> T {
        self.transport
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Run one CSN-framed transaction starting with `command`.
    ///
    /// CSN is released even if the transport fails mid-frame.
    /// Returns the status byte clocked in with `command`.
    fn transaction<F>(&mut self, command: u8, body: F) -> Result<u8, T::Error>
    where
        F: FnOnce(&mut T) -> Result<(), T::Error>,
    {
        self.transport.set_chip_select(false)?;
        let result = self
            .transport
            .exchange_byte(command)
            .and_then(|status| body(&mut self.transport).map(|_| status));
        let released = self.transport.set_chip_select(true);
        let status = result?;
        released?;
        self.status = StatusFlags::from_bits(status);
        Ok(status)
    }

    /// Read `buf.len()` bytes starting at register `reg`.
    pub fn read_register(&mut self, reg: u8, buf: &mut [u8]) -> Result<u8, T::Error> {
        self.transaction(commands::R_REGISTER | (reg & commands::REGISTER_MASK), |bus| {
            for byte in buf.iter_mut() {
                *byte = bus.exchange_byte(commands::NOP)?;
            }
            Ok(())
        })
    }

    /// Write all of `data` starting at register `reg`.
    pub fn write_register(&mut self, reg: u8, data: &[u8]) -> Result<u8, T::Error> {
        self.transaction(commands::W_REGISTER | (reg & commands::REGISTER_MASK), |bus| {
            for byte in data {
                bus.exchange_byte(*byte)?;
            }
            Ok(())
        })
    }

    pub fn read_byte_register(&mut self, reg: u8) -> Result<u8, T::Error> {
        let mut buf = [0u8];
        self.read_register(reg, &mut buf)?;
        Ok(buf[0])
    }

    pub fn write_byte_register(&mut self, reg: u8, value: u8) -> Result<u8, T::Error> {
        self.write_register(reg, &[value])
    }

    /// Send a single-byte command and return the status byte.
    pub fn exec_command(&mut self, opcode: u8) -> Result<u8, T::Error> {
        self.transaction(opcode, |_| Ok(()))
    }

    /// Send a command followed by one `NOP`, returning `(status, response)`.
    pub fn exec_command_with_response(&mut self, opcode: u8) -> Result<(u8, u8), T::Error> {
        let mut response = 0u8;
        let status = self.transaction(opcode, |bus| {
            response = bus.exchange_byte(commands::NOP)?;
            Ok(())
        })?;
        Ok((status, response))
    }

    /// `(data_len, blank_len)` for a payload of `len` bytes.
    ///
    /// Static widths are padded with zeros up to the payload size.
    fn payload_framing(&self, len: usize) -> (usize, usize) {
        let size = self.payload_size as usize;
        let data_len = len.min(size);
        let blank_len = if self.feature.dynamic_payloads() {
            0
        } else {
            size - data_len
        };
        (data_len, blank_len)
    }

    fn write_payload_with(&mut self, command: u8, data: &[u8]) -> Result<u8, T::Error> {
        let (data_len, blank_len) = self.payload_framing(data.len());
        self.transaction(command, |bus| {
            for byte in &data[..data_len] {
                bus.exchange_byte(*byte)?;
            }
            for _ in 0..blank_len {
                bus.exchange_byte(0)?;
            }
            Ok(())
        })
    }

    /// Load `data` into the TX FIFO.
    pub fn write_payload(&mut self, data: &[u8]) -> Result<u8, T::Error> {
        self.write_payload_with(commands::W_TX_PAYLOAD, data)
    }

    /// Read the head of the RX FIFO into `buf`.
    ///
    /// At most the payload size is stored; padding of a static-width
    /// payload is clocked out and discarded.
    pub fn read_payload(&mut self, buf: &mut [u8]) -> Result<u8, T::Error> {
        let (data_len, blank_len) = self.payload_framing(buf.len());
        self.transaction(commands::R_RX_PAYLOAD, |bus| {
            for byte in buf[..data_len].iter_mut() {
                *byte = bus.exchange_byte(commands::NOP)?;
            }
            for _ in 0..blank_len {
                bus.exchange_byte(commands::NOP)?;
            }
            Ok(())
        })
    }
}
