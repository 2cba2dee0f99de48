use crate::radio::{prelude::EsbAutoAck, prelude::EsbPayloadLength, NrfController};
use crate::BusTransport;

use super::{commands, mnemonics, registers};

impl<T: BusTransport> EsbAutoAck for NrfController<T> {
    type AutoAckErrorType = T::Error;

    fn set_ack_payloads(&mut self, enable: bool) -> Result<(), Self::AutoAckErrorType> {
        if enable == self.feature.ack_payloads() {
            return Ok(());
        }
        if enable {
            if !self.feature.dynamic_payloads() {
                self.set_dynamic_payload(true)?;
            }
            let feature = self.read_byte_register(registers::FEATURE)?;
            self.write_byte_register(registers::FEATURE, feature | mnemonics::EN_ACK_PAY)?;
        } else {
            // leave dynamic payloads as they are
            let feature = self.read_byte_register(registers::FEATURE)?;
            self.write_byte_register(registers::FEATURE, feature & !mnemonics::EN_ACK_PAY)?;
        }
        self.feature.set_ack_payloads(enable);
        Ok(())
    }

    fn get_ack_payloads(&self) -> bool {
        self.feature.ack_payloads()
    }

    fn write_ack_payload(&mut self, pipe: u8, buf: &[u8]) -> Result<bool, Self::AutoAckErrorType> {
        if !self.feature.ack_payloads() || pipe >= mnemonics::PIPE_COUNT {
            return Ok(false);
        }
        self.write_payload_with(commands::W_ACK_PAYLOAD | pipe, buf)?;
        Ok(true)
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{commands, registers, EsbAutoAck};
    use crate::radio::prelude::{EsbInit, EsbPayloadLength};
    use crate::radio::NrfController;
    use crate::sim::SimulatedRadio;
    use crate::test::mk_radio;
    use std::vec;

    const W: u8 = commands::W_REGISTER;
    const EN_ACK_PAY: u8 = 1 << 1;
    const EN_DPL: u8 = 1 << 2;

    #[test]
    fn allow_ack_payloads() {
        let frames = [
            // dynamic payloads come first
            (vec![registers::FEATURE, 0xFF], vec![0x0E, 0]),
            (vec![W | registers::FEATURE, EN_DPL], vec![0x0E, 0]),
            (vec![registers::DYNPD, 0xFF], vec![0x0E, 0]),
            (vec![W | registers::DYNPD, 0x3F], vec![0x0E, 0]),
            (vec![registers::FEATURE, 0xFF], vec![0x0E, EN_DPL]),
            (
                vec![W | registers::FEATURE, EN_DPL | EN_ACK_PAY],
                vec![0x0E, 0],
            ),
            // write_ack_payload() on pipe 1 is not padded
            (
                vec![commands::W_ACK_PAYLOAD | 1, b'O', b'K'],
                vec![0x0E, 0, 0],
            ),
            // disable only the ACK payload feature
            (vec![registers::FEATURE, 0xFF], vec![0x0E, EN_DPL | EN_ACK_PAY]),
            (vec![W | registers::FEATURE, EN_DPL], vec![0x0E, 0]),
        ];
        let mocks = mk_radio(&[], &frames);
        let (mut radio, mut spi, mut ce_pin, mut csn_pin) = (mocks.0, mocks.1, mocks.2, mocks.3);
        radio.set_ack_payloads(true).unwrap();
        // do again for region coverage (should result in Ok non-op)
        radio.set_ack_payloads(true).unwrap();
        assert!(radio.get_ack_payloads());
        assert!(radio.get_dynamic_payload());
        // invalid pipe number (results in Ok non-op)
        assert!(!radio.write_ack_payload(6, b"OK").unwrap());
        assert!(radio.write_ack_payload(1, b"OK").unwrap());
        radio.set_ack_payloads(false).unwrap();
        assert!(!radio.get_ack_payloads());
        assert!(radio.get_dynamic_payload());
        // disabled (results in Ok non-op)
        assert!(!radio.write_ack_payload(1, b"OK").unwrap());
        spi.done();
        ce_pin.done();
        csn_pin.done();
    }

    #[test]
    fn ack_payloads_imply_dynamic_payloads() {
        let mut radio = NrfController::new(SimulatedRadio::new());
        radio.begin().unwrap();
        assert!(!radio.get_dynamic_payload());
        radio.set_ack_payloads(true).unwrap();
        assert!(radio.get_ack_payloads());
        assert!(radio.get_dynamic_payload());
        assert_eq!(radio.transport().register(registers::FEATURE), EN_DPL | EN_ACK_PAY);
        assert_eq!(radio.transport().register(registers::DYNPD), 0x3F);
    }

    #[test]
    fn ack_payload_is_queued_for_pipe() {
        let mut radio = NrfController::new(SimulatedRadio::new());
        radio.begin().unwrap();
        radio.set_ack_payloads(true).unwrap();
        let long = [b'x'; 40];
        assert!(radio.write_ack_payload(1, &long).unwrap());
        let queued = radio.transport().pending_ack_payloads();
        assert_eq!(queued.len(), 1);
        assert_eq!(queued[0].0, 1);
        // truncated to the payload size
        assert_eq!(queued[0].1.len(), 32);
    }
}
