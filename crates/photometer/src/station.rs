//! The base station bridging a serial line to the sensor node.
use heapless::Vec;
use nrf24_ctrl::radio::{
    mnemonics,
    prelude::{EsbAutoAck, EsbInit, EsbPayloadLength, EsbPipe, EsbRadio},
    NrfController, RadioConfig,
};
use nrf24_ctrl::BusTransport;

use crate::response::{Response, Token, MAX_RESPONSE_LEN};

/// A command line, at most one payload long.
pub type Line = Vec<u8, MAX_RESPONSE_LEN>;

/// Settings of a [`BaseStation`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StationConfig {
    write_address: [u8; 5],
    read_address: [u8; 5],
    attempts: u8,
    radio: RadioConfig,
}

impl Default for StationConfig {
    /// Writes to `"00002"`, listens on pipe 1 at `"00001"`, 35 attempts per
    /// command.
    fn default() -> Self {
        Self {
            write_address: *b"00002",
            read_address: *b"00001",
            attempts: 35,
            radio: RadioConfig::default(),
        }
    }
}

impl StationConfig {
    pub const fn write_address(&self) -> &[u8; 5] {
        &self.write_address
    }

    pub fn with_write_address(self, address: [u8; 5]) -> Self {
        Self {
            write_address: address,
            ..self
        }
    }

    pub const fn read_address(&self) -> &[u8; 5] {
        &self.read_address
    }

    pub fn with_read_address(self, address: [u8; 5]) -> Self {
        Self {
            read_address: address,
            ..self
        }
    }

    pub const fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Transmissions tried per command. At least 1.
    pub fn with_attempts(self, attempts: u8) -> Self {
        Self {
            attempts: attempts.max(1),
            ..self
        }
    }

    pub const fn radio(&self) -> &RadioConfig {
        &self.radio
    }

    pub fn with_radio(self, radio: RadioConfig) -> Self {
        Self { radio, ..self }
    }
}

/// Sends command lines and reports the ACK payload the node answers with.
pub struct BaseStation<T> {
    radio: NrfController<T>,
    config: StationConfig,
}

impl<T: BusTransport> BaseStation<T> {
    pub fn new(radio: NrfController<T>, config: StationConfig) -> Self {
        Self { radio, config }
    }

    pub fn radio(&self) -> &NrfController<T> {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut NrfController<T> {
        &mut self.radio
    }

    pub fn free(self) -> NrfController<T> {
        self.radio
    }

    pub fn setup(&mut self) -> Result<(), T::Error> {
        self.radio.begin_with_config(&self.config.radio)?;
        self.radio.set_ack_payloads(true)?;
        self.radio.open_writing_pipe(&self.config.write_address)?;
        self.radio.open_reading_pipe(1, &self.config.read_address)?;
        Ok(())
    }

    /// Transmit `command` and return the ACK payload it was answered with.
    ///
    /// Replies `ERROR` if no attempt was acknowledged or the ACK carried no
    /// payload. An empty command is not sent.
    pub fn forward(&mut self, command: &[u8]) -> Result<Option<Response>, T::Error> {
        if command.is_empty() {
            return Ok(None);
        }
        let command = &command[..command.len().min(mnemonics::MAX_PAYLOAD_SIZE as usize)];
        let mut delivered = false;
        for attempt in 0..self.config.attempts {
            self.radio.start_write(command)?;
            if self.radio.finish_write_sync()? {
                trace!("delivered after {} attempts", attempt + 1);
                delivered = true;
                break;
            }
        }
        let acked = self.radio.is_message_available()?.is_some();
        if !(delivered && acked) {
            return Ok(Some(Token::Error.into()));
        }
        let width = usize::from(self.radio.get_dynamic_payload_size()?)
            .min(mnemonics::MAX_PAYLOAD_SIZE as usize);
        let mut buf = [0u8; mnemonics::MAX_PAYLOAD_SIZE as usize];
        self.radio.read_incoming(&mut buf[..width])?;
        let reply = match core::str::from_utf8(&buf[..width]) {
            Ok(text) => Response::format(format_args!("{}", text)),
            Err(_) => Token::Error.into(),
        };
        Ok(Some(reply))
    }
}

/// Splits a byte stream into lines ended by CR or LF.
///
/// A line is also cut once it fills a payload. Empty lines are skipped.
#[derive(Debug, Default)]
pub struct LineReader {
    line: Line,
}

impl LineReader {
    pub const fn new() -> Self {
        Self { line: Vec::new() }
    }

    /// Feed one received byte; returns a completed line.
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        if byte == b'\r' || byte == b'\n' {
            if self.line.is_empty() {
                return None;
            }
            return Some(core::mem::take(&mut self.line));
        }
        // a full line is handed out as soon as it fills up
        let _ = self.line.push(byte);
        if self.line.is_full() {
            return Some(core::mem::take(&mut self.line));
        }
        None
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{BaseStation, LineReader, StationConfig};
    use crate::response::{Response, Token};
    use nrf24_ctrl::radio::{commands, NrfController};
    use nrf24_ctrl::sim::{SimulatedRadio, TxOutcome};
    use std::{string::ToString, vec::Vec};

    fn mk_station(sim: SimulatedRadio) -> BaseStation<SimulatedRadio> {
        let mut station = BaseStation::new(NrfController::new(sim), StationConfig::default());
        station.setup().unwrap();
        station.radio_mut().transport_mut().clear_log();
        station
    }

    #[test]
    fn config_defaults() {
        let config = StationConfig::default().with_attempts(0);
        assert_eq!(config.attempts(), 1);
        assert_eq!(config.write_address(), b"00002");
        assert_eq!(config.read_address(), b"00001");
    }

    #[test]
    fn setup_opens_pipes() {
        let station = mk_station(SimulatedRadio::new());
        let sim = station.radio().transport();
        assert_eq!(sim.tx_address(), *b"00002");
        assert_eq!(sim.rx_address(0), *b"00002");
        assert_eq!(sim.rx_address(1), *b"00001");
    }

    #[test]
    fn reply_from_ack_payload() {
        let mut sim = SimulatedRadio::new();
        sim.ack_reply = Some(b"165.000000".to_vec());
        sim.failures_before_delivery = 2;
        let mut station = mk_station(sim);
        let reply = station.forward(b"meas_get_val").unwrap();
        assert_eq!(reply.map(|r| r.to_string()).as_deref(), Some("165.000000"));
        let sim = station.radio().transport();
        assert_eq!(sim.count_commands(commands::W_TX_PAYLOAD), 3);
        assert_eq!(sim.transmitted(), [b"meas_get_val".to_vec()]);
        assert_eq!(sim.rx_fifo_len(), 0);
    }

    #[test]
    fn no_ack_payload() {
        let mut station = mk_station(SimulatedRadio::new());
        assert_eq!(
            station.forward(b"nop").unwrap(),
            Some(Response::Token(Token::Error))
        );
        assert_eq!(station.radio().transport().count_commands(commands::W_TX_PAYLOAD), 1);
    }

    #[test]
    fn gives_up_after_all_attempts() {
        let mut sim = SimulatedRadio::new();
        sim.tx_outcome = TxOutcome::MaxRetries;
        sim.ack_reply = Some(b"OK".to_vec());
        let mut station = mk_station(sim);
        assert_eq!(
            station.forward(b"nop").unwrap(),
            Some(Response::Token(Token::Error))
        );
        let sim = station.radio().transport();
        assert_eq!(sim.count_commands(commands::W_TX_PAYLOAD), 35);
        assert!(sim.transmitted().is_empty());
    }

    #[test]
    fn empty_command_is_not_sent() {
        let mut station = mk_station(SimulatedRadio::new());
        assert_eq!(station.forward(b"").unwrap(), None);
        assert!(station.radio().transport().transactions().is_empty());
    }

    #[test]
    fn line_splitting() {
        let mut reader = LineReader::new();
        let mut lines = Vec::new();
        for byte in b"\r\nnop\r\nmeas_start\n".iter().chain([b'x'; 33].iter()) {
            if let Some(line) = reader.push(*byte) {
                lines.push(line.to_vec());
            }
        }
        assert_eq!(
            lines,
            [b"nop".to_vec(), b"meas_start".to_vec(), [b'x'; 32].to_vec()]
        );
        assert_eq!(reader.push(b'\n').map(|line| line.to_vec()), Some(b"x".to_vec()));
    }
}
