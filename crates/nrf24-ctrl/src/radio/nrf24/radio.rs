use crate::radio::{
    prelude::{EsbAutoAck, EsbFifo, EsbRadio, EsbStatus},
    NrfController,
};
use crate::{BusTransport, StatusFlags};

use super::bit_fields::Config;
use super::{commands, mnemonics, registers, timing};

impl<T: BusTransport> EsbRadio for NrfController<T> {
    type RadioErrorType = T::Error;

    fn start_write(&mut self, buf: &[u8]) -> Result<(), Self::RadioErrorType> {
        let config = Config::from_bits(self.read_byte_register(registers::CONFIG)?)
            .with_power(true)
            .with_is_rx(false);
        self.write_byte_register(registers::CONFIG, config.into_bits())?;
        self.transport.delay_us(timing::TX_SETTLE_US);

        self.write_payload(buf)?;
        self.transport.set_chip_enable(true)?;
        Ok(())
    }

    fn finish_write_sync(&mut self) -> Result<bool, Self::RadioErrorType> {
        let mut attempts = timing::TX_POLL_LIMIT;
        let mut observe_tx = [0u8];
        while attempts > 0 {
            let status = self.read_register(registers::OBSERVE_TX, &mut observe_tx)?;
            if status & (mnemonics::TX_DS | mnemonics::MAX_RT) != 0 {
                break;
            }
            self.transport.delay_us(timing::TX_POLL_INTERVAL_US);
            attempts -= 1;
        }
        self.transport.set_chip_enable(false)?;

        // the status clocked in with this write is the one from before the clear
        let status = StatusFlags::from_bits(self.write_byte_register(
            registers::STATUS,
            mnemonics::TX_DS | mnemonics::MAX_RT,
        )?);
        let delivered = status.tx_ds() && attempts != 0;
        if attempts == 0 {
            warn!("transmission did not complete; retries observed: {}", observe_tx[0] & 0xF);
        } else if !delivered {
            debug!("transmission not acknowledged");
        }

        let config = Config::from_bits(self.read_byte_register(registers::CONFIG)?);
        self.write_byte_register(registers::CONFIG, config.with_power(false).into_bits())?;
        self.flush_tx()?;
        Ok(delivered)
    }

    fn start_listening(&mut self) -> Result<(), Self::RadioErrorType> {
        let config = Config::from_bits(self.read_byte_register(registers::CONFIG)?)
            .with_power(true)
            .with_is_rx(true);
        self.write_byte_register(registers::CONFIG, config.into_bits())?;
        self.clear_status_flags(StatusFlags::all_events())?;
        self.transport.set_chip_enable(true)?;
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<(), Self::RadioErrorType> {
        self.transport.set_chip_enable(false)?;
        self.transport.delay_us(timing::RX_TO_STANDBY_US);
        if self.get_ack_payloads() {
            self.flush_tx()?;
        }
        let config = Config::from_bits(self.read_byte_register(registers::CONFIG)?)
            .with_power(false)
            .with_is_rx(false);
        self.write_byte_register(registers::CONFIG, config.into_bits())?;
        Ok(())
    }

    fn is_message_available(&mut self) -> Result<Option<u8>, Self::RadioErrorType> {
        let status = StatusFlags::from_bits(self.exec_command(commands::NOP)?);
        if !status.rx_dr() {
            return Ok(None);
        }
        let pipe = status.rx_pipe();
        if pipe >= mnemonics::PIPE_COUNT {
            return Ok(None);
        }
        Ok(Some(pipe))
    }

    fn read_incoming(&mut self, buf: &mut [u8]) -> Result<(), Self::RadioErrorType> {
        self.read_payload(buf)?;
        self.clear_status_flags(StatusFlags::new().with_rx_dr(true))
    }
}
