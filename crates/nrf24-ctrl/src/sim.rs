//! A register-level model of the nRF24L01 for host-side tests.
//!
//! [`SimulatedRadio`] implements [`BusTransport`] by decoding the CSN-framed
//! command stream the controller emits. It keeps a register file, the
//! address registers, 3-level FIFOs and a log of every transaction, and lets
//! a test decide how transmissions end or inject packets from a peer.
extern crate std;

use std::{collections::VecDeque, vec::Vec};

use crate::radio::{commands, mnemonics, registers};
use crate::{BusTransport, StatusFlags};

const FIFO_DEPTH: usize = 3;
const REGISTER_COUNT: usize = 0x1E;
const ADDRESS_WIDTH: usize = mnemonics::ADDRESS_WIDTH;

/// How a transmission started with CE ends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TxOutcome {
    /// The peer acknowledged the packet.
    Delivered,
    /// All retransmits went unanswered.
    MaxRetries,
    /// Neither `TX_DS` nor `MAX_RT` is ever raised.
    NoResponse,
}

/// Misuse of the bus detected by the model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimError {
    /// A byte was clocked while CSN was high.
    NotSelected,
    /// A fault requested with [`SimulatedRadio::fail_exchanges`].
    Injected,
}

pub struct SimulatedRadio {
    registers: [u8; REGISTER_COUNT],
    rx_address_p0: [u8; ADDRESS_WIDTH],
    rx_address_p1: [u8; ADDRESS_WIDTH],
    tx_address: [u8; ADDRESS_WIDTH],
    tx_fifo: VecDeque<Vec<u8>>,
    ack_fifo: VecDeque<(u8, Vec<u8>)>,
    rx_fifo: VecDeque<(u8, Vec<u8>)>,
    chip_enable: bool,
    selected: bool,
    frame: Vec<u8>,
    transactions: Vec<Vec<u8>>,
    transmitted: Vec<Vec<u8>>,
    acknowledged: Vec<(u8, Vec<u8>)>,
    elapsed_us: u64,
    /// Outcome of every transmission after `failures_before_delivery` is spent.
    pub tx_outcome: TxOutcome,
    /// Number of transmissions that end with `MAX_RT` before `tx_outcome` applies.
    pub failures_before_delivery: u32,
    /// ACK payload the peer returns with every delivered packet.
    pub ack_reply: Option<Vec<u8>>,
    /// Width reported by `R_RX_PL_WID` instead of the real one.
    pub width_override: Option<u8>,
    /// Make every [`BusTransport::exchange_byte()`] fail.
    pub fail_exchanges: bool,
}

impl Default for SimulatedRadio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedRadio {
    /// A chip in its power-on reset state.
    pub fn new() -> Self {
        let mut registers = [0u8; REGISTER_COUNT];
        registers[registers::CONFIG as usize] = 0x08;
        registers[registers::EN_AA as usize] = 0x3F;
        registers[registers::EN_RXADDR as usize] = 0x03;
        registers[registers::SETUP_AW as usize] = 0x03;
        registers[registers::SETUP_RETR as usize] = 0x03;
        registers[registers::RF_CH as usize] = 0x02;
        registers[registers::RF_SETUP as usize] = 0x0F;
        for (offset, value) in [0xC3u8, 0xC4, 0xC5, 0xC6].iter().enumerate() {
            registers[registers::RX_ADDR_P0 as usize + 2 + offset] = *value;
        }
        Self {
            registers,
            rx_address_p0: [0xE7; ADDRESS_WIDTH],
            rx_address_p1: [0xC2; ADDRESS_WIDTH],
            tx_address: [0xE7; ADDRESS_WIDTH],
            tx_fifo: VecDeque::new(),
            ack_fifo: VecDeque::new(),
            rx_fifo: VecDeque::new(),
            chip_enable: false,
            selected: false,
            frame: Vec::new(),
            transactions: Vec::new(),
            transmitted: Vec::new(),
            acknowledged: Vec::new(),
            elapsed_us: 0,
            tx_outcome: TxOutcome::Delivered,
            failures_before_delivery: 0,
            ack_reply: None,
            width_override: None,
            fail_exchanges: false,
        }
    }

    /// Current value of a single-byte register.
    ///
    /// `STATUS` holds only the event bits; `FIFO_STATUS` is derived from the FIFOs.
    pub fn register(&self, reg: u8) -> u8 {
        match reg {
            registers::FIFO_STATUS => self.fifo_status(),
            _ => self.registers.get(reg as usize).copied().unwrap_or(0),
        }
    }

    /// A copy of the register file.
    pub fn registers(&self) -> [u8; REGISTER_COUNT] {
        self.registers
    }

    /// Full receive address of `pipe`, as the chip matches it.
    pub fn rx_address(&self, pipe: u8) -> [u8; ADDRESS_WIDTH] {
        match pipe {
            0 => self.rx_address_p0,
            1 => self.rx_address_p1,
            _ => {
                let mut address = self.rx_address_p1;
                address[0] = self.registers[(registers::RX_ADDR_P0 + pipe) as usize];
                address
            }
        }
    }

    pub fn tx_address(&self) -> [u8; ADDRESS_WIDTH] {
        self.tx_address
    }

    pub fn chip_enabled(&self) -> bool {
        self.chip_enable
    }

    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    pub fn tx_fifo_len(&self) -> usize {
        self.tx_fifo.len()
    }

    pub fn rx_fifo_len(&self) -> usize {
        self.rx_fifo.len()
    }

    /// ACK payloads waiting for a packet, as `(pipe, payload)`.
    pub fn pending_ack_payloads(&self) -> Vec<(u8, Vec<u8>)> {
        self.ack_fifo.iter().cloned().collect()
    }

    /// Payloads that left the TX FIFO on the air, in order.
    pub fn transmitted(&self) -> &[Vec<u8>] {
        &self.transmitted
    }

    /// ACK payloads that were sent back to a peer, as `(pipe, payload)`.
    pub fn acknowledged(&self) -> &[(u8, Vec<u8>)] {
        &self.acknowledged
    }

    /// Every completed transaction (MOSI bytes, command first).
    pub fn transactions(&self) -> &[Vec<u8>] {
        &self.transactions
    }

    /// Number of completed transactions that started with `command`.
    pub fn count_commands(&self, command: u8) -> usize {
        self.transactions
            .iter()
            .filter(|frame| frame.first() == Some(&command))
            .count()
    }

    pub fn clear_log(&mut self) {
        self.transactions.clear();
    }

    /// Put a payload from `pipe` into the RX FIFO, as if received.
    ///
    /// Returns `false` if the RX FIFO is full.
    pub fn inject_rx(&mut self, pipe: u8, payload: &[u8]) -> bool {
        if self.rx_fifo.len() >= FIFO_DEPTH {
            return false;
        }
        self.rx_fifo.push_back((pipe, payload.to_vec()));
        self.registers[registers::STATUS as usize] |= mnemonics::RX_DR;
        true
    }

    /// A peer sends `payload` to `pipe`.
    ///
    /// Only accepted while listening with the pipe enabled. A queued ACK
    /// payload for `pipe` is consumed and recorded in
    /// [`SimulatedRadio::acknowledged()`].
    pub fn deliver(&mut self, pipe: u8, payload: &[u8]) -> bool {
        let config = self.registers[registers::CONFIG as usize];
        let listening = self.chip_enable
            && config & mnemonics::PWR_UP != 0
            && config & mnemonics::PRIM_RX != 0;
        let enabled = self.registers[registers::EN_RXADDR as usize] & (1 << pipe) != 0;
        if !listening || !enabled || !self.inject_rx(pipe, payload) {
            return false;
        }
        if let Some(index) = self.ack_fifo.iter().position(|(p, _)| *p == pipe) {
            if let Some(ack) = self.ack_fifo.remove(index) {
                self.acknowledged.push(ack);
            }
        }
        true
    }

    fn status_byte(&self) -> u8 {
        let rx_pipe = self
            .rx_fifo
            .front()
            .map_or(StatusFlags::RX_FIFO_EMPTY, |(pipe, _)| *pipe);
        let tx_full = self.tx_fifo.len() + self.ack_fifo.len() >= FIFO_DEPTH;
        (self.registers[registers::STATUS as usize] & StatusFlags::EVENTS)
            | (rx_pipe << 1)
            | tx_full as u8
    }

    fn fifo_status(&self) -> u8 {
        let tx_len = self.tx_fifo.len() + self.ack_fifo.len();
        let mut value = 0;
        if self.rx_fifo.is_empty() {
            value |= mnemonics::RX_EMPTY;
        }
        if self.rx_fifo.len() >= FIFO_DEPTH {
            value |= mnemonics::RX_FULL;
        }
        if tx_len == 0 {
            value |= mnemonics::TX_EMPTY;
        }
        if tx_len >= FIFO_DEPTH {
            value |= mnemonics::FIFO_TX_FULL;
        }
        value
    }

    fn read_register_byte(&self, reg: u8, index: usize) -> u8 {
        let address = match reg {
            registers::RX_ADDR_P0 => &self.rx_address_p0,
            registers::RX_ADDR_P1 => &self.rx_address_p1,
            registers::TX_ADDR => &self.tx_address,
            _ => return if index == 0 { self.register(reg) } else { 0 },
        };
        address.get(index).copied().unwrap_or(0)
    }

    fn write_register_byte(&mut self, reg: u8, index: usize, value: u8) {
        let address = match reg {
            registers::RX_ADDR_P0 => &mut self.rx_address_p0,
            registers::RX_ADDR_P1 => &mut self.rx_address_p1,
            registers::TX_ADDR => &mut self.tx_address,
            _ => {
                if index == 0 {
                    self.write_single_register(reg, value);
                }
                return;
            }
        };
        if let Some(byte) = address.get_mut(index) {
            *byte = value;
        }
    }

    fn write_single_register(&mut self, reg: u8, value: u8) {
        match reg {
            registers::STATUS => {
                // write 1 to clear
                self.registers[reg as usize] &= !(value & StatusFlags::EVENTS);
            }
            registers::OBSERVE_TX | registers::RPD | registers::FIFO_STATUS => (),
            _ => {
                if let Some(slot) = self.registers.get_mut(reg as usize) {
                    *slot = value;
                }
            }
        }
    }

    fn clock_data(&mut self, command: u8, index: usize, value: u8) -> u8 {
        match command {
            commands::R_RX_PL_WID => self.width_override.unwrap_or_else(|| {
                self.rx_fifo
                    .front()
                    .map_or(0, |(_, payload)| payload.len() as u8)
            }),
            commands::R_RX_PAYLOAD => self
                .rx_fifo
                .front()
                .and_then(|(_, payload)| payload.get(index).copied())
                .unwrap_or(0),
            c if c & 0xE0 == commands::R_REGISTER => {
                self.read_register_byte(c & commands::REGISTER_MASK, index)
            }
            c if c & 0xE0 == commands::W_REGISTER => {
                self.write_register_byte(c & commands::REGISTER_MASK, index, value);
                0
            }
            _ => 0,
        }
    }

    fn complete_frame(&mut self) {
        let frame = core::mem::take(&mut self.frame);
        let Some(&command) = frame.first() else {
            return;
        };
        match command {
            commands::W_TX_PAYLOAD => {
                if self.tx_fifo.len() + self.ack_fifo.len() < FIFO_DEPTH {
                    self.tx_fifo.push_back(frame[1..].to_vec());
                }
            }
            commands::R_RX_PAYLOAD => {
                if frame.len() > 1 {
                    self.rx_fifo.pop_front();
                }
            }
            commands::FLUSH_TX => {
                self.tx_fifo.clear();
                self.ack_fifo.clear();
            }
            commands::FLUSH_RX => self.rx_fifo.clear(),
            c if c & 0xF8 == commands::W_ACK_PAYLOAD => {
                let pipe = c & 0x07;
                if pipe < mnemonics::PIPE_COUNT
                    && self.tx_fifo.len() + self.ack_fifo.len() < FIFO_DEPTH
                {
                    self.ack_fifo.push_back((pipe, frame[1..].to_vec()));
                }
            }
            _ => (),
        }
        self.transactions.push(frame);
    }

    fn transmit(&mut self) {
        let config = self.registers[registers::CONFIG as usize];
        if config & mnemonics::PWR_UP == 0 || config & mnemonics::PRIM_RX != 0 {
            return;
        }
        let Some(payload) = self.tx_fifo.front().cloned() else {
            return;
        };
        let status = &mut self.registers[registers::STATUS as usize];
        if self.failures_before_delivery > 0 {
            self.failures_before_delivery -= 1;
            *status |= mnemonics::MAX_RT;
            return;
        }
        match self.tx_outcome {
            TxOutcome::Delivered => {
                *status |= mnemonics::TX_DS;
                self.tx_fifo.pop_front();
                self.transmitted.push(payload);
                if let Some(reply) = self.ack_reply.clone() {
                    self.inject_rx(0, &reply);
                }
            }
            TxOutcome::MaxRetries => *status |= mnemonics::MAX_RT,
            TxOutcome::NoResponse => (),
        }
    }
}

impl BusTransport for SimulatedRadio {
    type Error = SimError;

    fn exchange_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        if self.fail_exchanges {
            return Err(SimError::Injected);
        }
        if !self.selected {
            return Err(SimError::NotSelected);
        }
        self.frame.push(byte);
        if self.frame.len() == 1 {
            return Ok(self.status_byte());
        }
        let command = self.frame[0];
        Ok(self.clock_data(command, self.frame.len() - 2, byte))
    }

    fn set_chip_enable(&mut self, high: bool) -> Result<(), Self::Error> {
        let rising = high && !self.chip_enable;
        self.chip_enable = high;
        if rising {
            self.transmit();
        }
        Ok(())
    }

    fn set_chip_select(&mut self, high: bool) -> Result<(), Self::Error> {
        if high && self.selected {
            self.complete_frame();
        }
        self.selected = !high;
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += us as u64;
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::{SimError, SimulatedRadio};
    use crate::radio::prelude::{EsbFifo, EsbInit};
    use crate::radio::{commands, registers, NrfController};
    use crate::BusTransport;

    #[test]
    fn bytes_need_chip_select() {
        let mut chip = SimulatedRadio::new();
        assert_eq!(chip.exchange_byte(commands::NOP), Err(SimError::NotSelected));
        chip.set_chip_select(false).unwrap();
        assert_eq!(chip.exchange_byte(commands::NOP), Ok(0x0E));
        chip.set_chip_select(true).unwrap();
        assert_eq!(chip.transactions().len(), 1);
    }

    #[test]
    fn status_write_one_to_clear() {
        let mut chip = SimulatedRadio::new();
        chip.inject_rx(2, b"abc");
        chip.set_chip_select(false).unwrap();
        // status clocked in before the clear
        assert_eq!(
            chip.exchange_byte(commands::W_REGISTER | registers::STATUS),
            Ok(0x44)
        );
        chip.exchange_byte(0x40).unwrap();
        chip.set_chip_select(true).unwrap();
        assert_eq!(chip.register(registers::STATUS), 0);
        assert_eq!(chip.rx_fifo_len(), 1);
    }

    #[test]
    fn transport_fault_releases_chip_select() {
        let mut radio = NrfController::new(SimulatedRadio::new());
        radio.transport_mut().fail_exchanges = true;
        assert_eq!(radio.begin(), Err(SimError::Injected));
        assert_eq!(radio.flush_rx(), Err(SimError::Injected));
        radio.transport_mut().fail_exchanges = false;
        // CSN was released: a new transaction starts cleanly
        radio.flush_rx().unwrap();
        assert_eq!(radio.transport().count_commands(commands::FLUSH_RX), 1);
    }

    #[test]
    fn fifo_status_tracks_fifos() {
        let mut chip = SimulatedRadio::new();
        assert_eq!(chip.register(registers::FIFO_STATUS), 0x11);
        for _ in 0..3 {
            chip.inject_rx(0, b"x");
        }
        assert!(!chip.inject_rx(0, b"x"));
        assert_eq!(chip.register(registers::FIFO_STATUS), 0x12);
    }
}
