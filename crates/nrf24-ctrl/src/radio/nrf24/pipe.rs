use crate::radio::{prelude::EsbPipe, NrfController};
use crate::BusTransport;

use super::{mnemonics, registers};

impl<T: BusTransport> EsbPipe for NrfController<T> {
    type PipeErrorType = T::Error;

    fn open_writing_pipe(&mut self, address: &[u8; 5]) -> Result<(), Self::PipeErrorType> {
        self.write_register(registers::RX_ADDR_P0, address)?;
        self.write_register(registers::TX_ADDR, address)?;
        self.write_byte_register(
            registers::RX_PW_P0,
            self.payload_size.min(mnemonics::MAX_PAYLOAD_SIZE),
        )?;
        Ok(())
    }

    fn open_reading_pipe(
        &mut self,
        child: u8,
        address: &[u8; 5],
    ) -> Result<bool, Self::PipeErrorType> {
        if child >= mnemonics::PIPE_COUNT {
            return Ok(false);
        }
        // pipes 2 - 5 only hold the LSByte
        let width = if child < 2 { address.len() } else { 1 };
        self.write_register(registers::RX_ADDR_P0 + child, &address[..width])?;
        self.write_byte_register(registers::RX_PW_P0 + child, self.payload_size)?;
        let enabled = self.read_byte_register(registers::EN_RXADDR)?;
        self.write_byte_register(registers::EN_RXADDR, enabled | (1 << child))?;
        Ok(true)
    }

    fn close_reading_pipe(&mut self, child: u8) -> Result<(), Self::PipeErrorType> {
        let enabled = self.read_byte_register(registers::EN_RXADDR)?;
        self.write_byte_register(registers::EN_RXADDR, enabled & !(1 << (child & 7)))?;
        Ok(())
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{registers, EsbPipe};
    use crate::radio::nrf24::commands;
    use crate::radio::prelude::EsbPayloadLength;
    use crate::radio::NrfController;
    use crate::sim::SimulatedRadio;
    use crate::test::mk_radio;
    use std::vec;

    const W: u8 = commands::W_REGISTER;

    #[test]
    fn open_writing_pipe() {
        let address = *b"54321";
        let mut rx_addr = vec![W | registers::RX_ADDR_P0];
        rx_addr.extend_from_slice(&address);
        let mut tx_addr = vec![W | registers::TX_ADDR];
        tx_addr.extend_from_slice(&address);
        let frames = [
            (rx_addr, vec![0x0E; 6]),
            (tx_addr, vec![0x0E; 6]),
            (vec![W | registers::RX_PW_P0, 32], vec![0x0E, 0]),
        ];
        let mocks = mk_radio(&[], &frames);
        let (mut radio, mut spi, mut ce_pin, mut csn_pin) = (mocks.0, mocks.1, mocks.2, mocks.3);
        radio.open_writing_pipe(&address).unwrap();
        spi.done();
        ce_pin.done();
        csn_pin.done();
    }

    #[test]
    fn open_reading_pipes() {
        let mut radio = NrfController::new(SimulatedRadio::new());
        radio.set_payload_size(12);
        assert!(radio.open_reading_pipe(1, b"65432").unwrap());
        assert!(radio.open_reading_pipe(3, b"Xzzzz").unwrap());
        let chip = radio.transport();
        assert_eq!(chip.rx_address(1), *b"65432");
        // pipe 3 borrows the upper bytes of pipe 1
        assert_eq!(chip.rx_address(3), *b"X5432");
        assert_eq!(chip.register(registers::RX_PW_P0 + 1), 12);
        assert_eq!(chip.register(registers::RX_PW_P0 + 3), 12);
        // pipes 0 and 1 are enabled out of reset
        assert_eq!(chip.register(registers::EN_RXADDR), 0x0B);
    }

    #[test]
    fn open_reading_pipe_out_of_range() {
        let mut radio = NrfController::new(SimulatedRadio::new());
        let before = radio.transport().register(registers::EN_RXADDR);
        assert!(!radio.open_reading_pipe(6, b"65432").unwrap());
        assert!(!radio.open_reading_pipe(0xFF, b"65432").unwrap());
        assert_eq!(radio.transport().register(registers::EN_RXADDR), before);
        assert!(radio.transport().transactions().is_empty());
    }

    #[test]
    fn close_reading_pipe() {
        let mut radio = NrfController::new(SimulatedRadio::new());
        radio.open_reading_pipe(4, b"4xxxx").unwrap();
        assert_eq!(radio.transport().register(registers::EN_RXADDR), 0x13);
        radio.close_reading_pipe(0).unwrap();
        radio.close_reading_pipe(4).unwrap();
        assert_eq!(radio.transport().register(registers::EN_RXADDR), 0x02);
    }

    #[test]
    fn writing_pipe_shares_pipe_zero() {
        let mut radio = NrfController::new(SimulatedRadio::new());
        radio.set_payload_size(40);
        radio.open_writing_pipe(b"00002").unwrap();
        let chip = radio.transport();
        assert_eq!(chip.tx_address(), *b"00002");
        assert_eq!(chip.rx_address(0), *b"00002");
        assert_eq!(chip.register(registers::RX_PW_P0), 32);
    }
}
