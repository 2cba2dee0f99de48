use crate::radio::{prelude::EsbFifo, prelude::EsbPayloadLength, NrfController};
use crate::BusTransport;

use super::bit_fields::Feature;
use super::{commands, mnemonics, registers, timing};

impl<T: BusTransport> EsbPayloadLength for NrfController<T> {
    type PayloadLengthErrorType = T::Error;

    fn set_dynamic_payload(&mut self, enable: bool) -> Result<(), Self::PayloadLengthErrorType> {
        if enable == self.feature.dynamic_payloads() {
            return Ok(());
        }
        if enable {
            let feature = self.read_byte_register(registers::FEATURE)?;
            self.write_byte_register(registers::FEATURE, feature | mnemonics::EN_DPL)?;
            let dynpd = self.read_byte_register(registers::DYNPD)?;
            self.write_byte_register(registers::DYNPD, dynpd | mnemonics::DPL_ALL_PIPES)?;
            self.feature.set_dynamic_payloads(true);
        } else {
            // ACK payloads can't outlive dynamic payloads
            self.write_byte_register(registers::FEATURE, 0)?;
            self.write_byte_register(registers::DYNPD, 0)?;
            self.feature = Feature::new();
        }
        Ok(())
    }

    fn get_dynamic_payload(&self) -> bool {
        self.feature.dynamic_payloads()
    }

    fn get_dynamic_payload_size(&mut self) -> Result<u8, Self::PayloadLengthErrorType> {
        if !self.feature.dynamic_payloads() {
            return Ok(0);
        }
        let (_, width) = self.exec_command_with_response(commands::R_RX_PL_WID)?;
        if width > mnemonics::MAX_PAYLOAD_SIZE {
            warn!("corrupt payload width {}; flushing RX FIFO", width);
            self.flush_rx()?;
            self.transport.delay_us(timing::CORRUPT_WIDTH_RECOVERY_US);
            return Ok(0);
        }
        Ok(width)
    }

    fn set_payload_size(&mut self, size: u8) {
        self.payload_size = size.min(mnemonics::MAX_PAYLOAD_SIZE);
    }

    fn payload_size(&self) -> u8 {
        self.payload_size
    }
}
