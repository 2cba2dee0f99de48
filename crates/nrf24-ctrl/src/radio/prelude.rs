//! Traits grouping the controller's operations by concern.
//!
//! Import them all at once:
//!
//! ```
//! use nrf24_ctrl::radio::prelude::*;
//! ```

use crate::types::StatusFlags;

use super::RadioConfig;

/// Bring the chip to a known configuration.
pub trait EsbInit {
    type InitErrorType;

    /// Initialize the chip with [`RadioConfig::default()`].
    ///
    /// The chip needs about 5 milliseconds after power-on before it accepts
    /// commands; this delay is part of the sequence. Calling this again
    /// re-establishes the same state.
    fn begin(&mut self) -> Result<(), Self::InitErrorType>;

    /// Initialize the chip with the given `config`.
    ///
    /// The sequence powers the chip down, programs retries, RF setup, CRC,
    /// channel and auto-ack, disables dynamic payloads and all features,
    /// clears the event flags and flushes both FIFOs.
    fn begin_with_config(&mut self, config: &RadioConfig) -> Result<(), Self::InitErrorType>;
}

/// Data pipe addressing.
pub trait EsbPipe {
    type PipeErrorType;

    /// Set the transmit address.
    ///
    /// The same address is written to pipe 0 so the auto-ack reply from the
    /// receiver is accepted, and pipe 0's width is set to the payload size.
    fn open_writing_pipe(&mut self, address: &[u8; 5]) -> Result<(), Self::PipeErrorType>;

    /// Assign `address` to `child` and enable it for receiving.
    ///
    /// Pipes 0 and 1 store all 5 bytes. Pipes 2 - 5 store only `address[0]`
    /// and share the upper 4 bytes of pipe 1's address.
    ///
    /// Returns `false` (and touches nothing) if `child` is not in range [0, 5].
    fn open_reading_pipe(
        &mut self,
        child: u8,
        address: &[u8; 5],
    ) -> Result<bool, Self::PipeErrorType>;

    /// Disable `child` for receiving.
    ///
    /// `child` must be in range [0, 5]; larger values clear reserved bits of
    /// `EN_RXADDR`.
    fn close_reading_pipe(&mut self, child: u8) -> Result<(), Self::PipeErrorType>;
}

/// Payload widths.
pub trait EsbPayloadLength {
    type PayloadLengthErrorType;

    /// Enable or disable dynamic payload widths on all pipes.
    ///
    /// Disabling also disables ACK payloads, since those depend on
    /// dynamic widths. Does nothing if the feature is already in the
    /// requested state.
    fn set_dynamic_payload(&mut self, enable: bool) -> Result<(), Self::PayloadLengthErrorType>;

    /// Is the dynamic payload feature enabled?
    fn get_dynamic_payload(&self) -> bool;

    /// Width of the payload at the head of the RX FIFO.
    ///
    /// Returns 0 when dynamic payloads are disabled. A reported width above 32
    /// is a known silicon fault: the RX FIFO is flushed and 0 is returned.
    fn get_dynamic_payload_size(&mut self) -> Result<u8, Self::PayloadLengthErrorType>;

    /// Set the static payload size (clamped to 32).
    ///
    /// Takes effect on pipes opened afterwards.
    fn set_payload_size(&mut self, size: u8);

    /// The static payload size.
    fn payload_size(&self) -> u8;
}

/// Auto-acknowledgement with attached data.
pub trait EsbAutoAck {
    type AutoAckErrorType;

    /// Enable or disable ACK payloads.
    ///
    /// Enabling first enables dynamic payloads. Disabling clears only the
    /// ACK payload feature and leaves dynamic payloads on.
    fn set_ack_payloads(&mut self, enable: bool) -> Result<(), Self::AutoAckErrorType>;

    /// Is the ACK payload feature enabled?
    fn get_ack_payloads(&self) -> bool;

    /// Queue `buf` to ride on the ACK of the next packet received on `pipe`.
    ///
    /// Returns `false` if ACK payloads are disabled or `pipe` is not in
    /// range [0, 5].
    fn write_ack_payload(&mut self, pipe: u8, buf: &[u8]) -> Result<bool, Self::AutoAckErrorType>;
}

/// FIFO maintenance.
pub trait EsbFifo {
    type FifoErrorType;

    /// Discard all 3 levels of the RX FIFO.
    fn flush_rx(&mut self) -> Result<(), Self::FifoErrorType>;

    /// Discard all 3 levels of the TX FIFO.
    fn flush_tx(&mut self) -> Result<(), Self::FifoErrorType>;
}

/// Event flags and the IRQ line.
pub trait EsbStatus {
    type StatusErrorType;

    /// The [`StatusFlags`] cached from the latest transaction.
    fn status_flags(&self) -> StatusFlags;

    /// Configure which events pull the IRQ line low.
    ///
    /// Set a member of [`StatusFlags`] to `false` to mask that event.
    fn set_status_flags(&mut self, flags: StatusFlags) -> Result<(), Self::StatusErrorType>;

    /// Clear the events whose flags are `true` in `flags`.
    fn clear_status_flags(&mut self, flags: StatusFlags) -> Result<(), Self::StatusErrorType>;

    /// Refresh the cached status byte with a `NOP`.
    fn update(&mut self) -> Result<StatusFlags, Self::StatusErrorType>;
}

/// Transmit and receive.
pub trait EsbRadio {
    type RadioErrorType;

    /// Power up as a transmitter, load `buf` into the TX FIFO and raise CE.
    ///
    /// This does not wait for the transmission to complete; follow with
    /// [`EsbRadio::finish_write_sync()`].
    fn start_write(&mut self, buf: &[u8]) -> Result<(), Self::RadioErrorType>;

    /// Wait (bounded) for the transmission started by
    /// [`EsbRadio::start_write()`] to finish.
    ///
    /// Returns `true` only if the packet was acknowledged before the poll
    /// budget ran out. In every case CE is lowered, the event flags are
    /// cleared, the chip is powered down and the TX FIFO is flushed.
    fn finish_write_sync(&mut self) -> Result<bool, Self::RadioErrorType>;

    /// Power up as a receiver and raise CE.
    fn start_listening(&mut self) -> Result<(), Self::RadioErrorType>;

    /// Lower CE and power down.
    ///
    /// Stale ACK payloads are flushed from the TX FIFO when that feature
    /// is enabled.
    fn stop_listening(&mut self) -> Result<(), Self::RadioErrorType>;

    /// The pipe a received payload is waiting on, if any.
    fn is_message_available(&mut self) -> Result<Option<u8>, Self::RadioErrorType>;

    /// Read the head of the RX FIFO into `buf` and clear `RX_DR`.
    fn read_incoming(&mut self, buf: &mut [u8]) -> Result<(), Self::RadioErrorType>;
}
