//! The sensor node's main loop.
use nrf24_ctrl::radio::{
    mnemonics,
    prelude::{EsbAutoAck, EsbInit, EsbPayloadLength, EsbPipe, EsbRadio, EsbStatus},
    NrfController, RadioConfig,
};
use nrf24_ctrl::{BusTransport, StatusFlags};

use crate::adc::AdcSampler;
use crate::latch::{IdleTimeout, Latch};
use crate::procedures::Procedures;
use crate::response::Response;
use crate::store::PersistentStore;

/// Low-power control of the MCU.
pub trait PowerControl {
    /// Power down until an external interrupt wakes the MCU.
    fn sleep(&mut self);
}

/// Radio settings of a [`SensorNode`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeConfig {
    write_address: [u8; 5],
    read_address: [u8; 5],
    radio: RadioConfig,
}

impl Default for NodeConfig {
    /// Writes to `"54321"`, listens on pipe 1 at `"65432"`.
    fn default() -> Self {
        Self {
            write_address: *b"54321",
            read_address: *b"65432",
            radio: RadioConfig::default(),
        }
    }
}

impl NodeConfig {
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

    pub const fn radio(&self) -> &RadioConfig {
        &self.radio
    }

    pub fn with_radio(self, radio: RadioConfig) -> Self {
        Self { radio, ..self }
    }
}

/// A photometer answering commands from a base station.
pub struct SensorNode<'a, T, A, S, P> {
    radio: NrfController<T>,
    procedures: Procedures<A, S>,
    power: P,
    config: NodeConfig,
    edge: &'a Latch,
    idle: &'a IdleTimeout,
}

impl<'a, T, A, S, P> SensorNode<'a, T, A, S, P>
where
    T: BusTransport,
    A: AdcSampler,
    S: PersistentStore,
    P: PowerControl,
{
    /// `edge` is raised by the radio's IRQ line, `idle` ticks once a second.
    pub fn new(
        radio: NrfController<T>,
        procedures: Procedures<A, S>,
        power: P,
        config: NodeConfig,
        edge: &'a Latch,
        idle: &'a IdleTimeout,
    ) -> Self {
        Self {
            radio,
            procedures,
            power,
            config,
            edge,
            idle,
        }
    }

    pub fn radio(&self) -> &NrfController<T> {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut NrfController<T> {
        &mut self.radio
    }

    pub fn procedures(&self) -> &Procedures<A, S> {
        &self.procedures
    }

    pub fn power(&self) -> &P {
        &self.power
    }

    /// Configure the radio, queue the first `OK` and start listening.
    ///
    /// Only received packets drive the IRQ line.
    pub fn setup(&mut self) -> Result<(), T::Error> {
        self.radio.begin_with_config(&self.config.radio)?;
        self.radio
            .set_status_flags(StatusFlags::new().with_rx_dr(true))?;
        self.radio.set_ack_payloads(true)?;
        self.radio.open_writing_pipe(&self.config.write_address)?;
        self.radio.open_reading_pipe(1, &self.config.read_address)?;
        self.procedures.prime(&mut self.radio)?;
        self.radio.start_listening()?;
        self.idle.reset();
        Ok(())
    }

    /// One iteration of the main loop.
    ///
    /// Returns the reply to a command received in this iteration.
    pub fn poll(&mut self) -> Result<Option<Response>, T::Error> {
        let mut handled = None;
        if self.radio.is_message_available()?.is_some() {
            let width = usize::from(self.radio.get_dynamic_payload_size()?)
                .min(mnemonics::MAX_PAYLOAD_SIZE as usize);
            let mut buf = [0u8; mnemonics::MAX_PAYLOAD_SIZE as usize];
            // always read, RX_DR holds the IRQ line low until cleared
            self.radio.read_incoming(&mut buf[..width])?;
            if width > 0 {
                handled = Some(
                    self.procedures
                        .handle_incoming_message(&mut self.radio, &buf[..width])?,
                );
            }
        }
        if self.edge.take() {
            self.idle.reset();
        }
        if self.idle.take_expired() {
            debug!("idle for {} s; sleeping", self.idle.limit());
            self.power.sleep();
            self.idle.reset();
        }
        Ok(handled)
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{NodeConfig, PowerControl, SensorNode};
    use crate::latch::{IdleTimeout, Latch};
    use crate::procedures::{ProcedureState, Procedures, ProceduresConfig};
    use crate::response::{Response, Token};
    use crate::store::{layout, MemoryStore};
    use crate::test::ScriptedAdc;
    use nrf24_ctrl::radio::{registers, NrfController};
    use nrf24_ctrl::sim::SimulatedRadio;
    use std::vec;

    #[derive(Default)]
    struct SleepCounter(u32);

    impl PowerControl for SleepCounter {
        fn sleep(&mut self) {
            self.0 += 1;
        }
    }

    type Node<'a> =
        SensorNode<'a, SimulatedRadio, ScriptedAdc, MemoryStore<{ layout::IMAGE_LEN }>, SleepCounter>;

    fn mk_node<'a>(edge: &'a Latch, idle: &'a IdleTimeout) -> Node<'a> {
        let procedures = Procedures::new(
            ScriptedAdc::new(&[]),
            MemoryStore::new(),
            ProceduresConfig::default(),
        )
        .unwrap();
        let mut node = SensorNode::new(
            NrfController::new(SimulatedRadio::new()),
            procedures,
            SleepCounter::default(),
            NodeConfig::default(),
            edge,
            idle,
        );
        node.setup().unwrap();
        node
    }

    #[test]
    fn setup_listens_with_ok_queued() {
        let (edge, idle) = (Latch::new(), IdleTimeout::default());
        let node = mk_node(&edge, &idle);
        let sim = node.radio().transport();
        assert!(sim.chip_enabled());
        assert_eq!(sim.rx_address(1), *b"65432");
        assert_eq!(sim.tx_address(), *b"54321");
        // power up, RX, 16-bit CRC, TX_DS and MAX_RT masked
        assert_eq!(sim.register(registers::CONFIG), 0x3F);
        assert_eq!(sim.pending_ack_payloads(), vec![(1, b"OK".to_vec())]);
    }

    #[test]
    fn command_and_drain() {
        let (edge, idle) = (Latch::new(), IdleTimeout::default());
        let mut node = mk_node(&edge, &idle);
        assert_eq!(node.poll().unwrap(), None);

        assert!(node
            .radio_mut()
            .transport_mut()
            .deliver(1, b"conf_set_gain_error:0:1.5"));
        assert_eq!(node.poll().unwrap(), Some(Response::Token(Token::Ok)));
        assert_eq!(node.procedures().state(), ProcedureState::AwaitNop);

        assert!(node.radio_mut().transport_mut().deliver(1, b"nop"));
        assert_eq!(node.poll().unwrap(), Some(Response::Token(Token::Ok)));
        assert_eq!(node.procedures().state(), ProcedureState::Default);

        let sim = node.radio().transport();
        // the primed OK rode on the first ACK, the command's OK on the second
        assert_eq!(
            sim.acknowledged(),
            [(1, b"OK".to_vec()), (1, b"OK".to_vec())]
        );
        assert_eq!(sim.rx_fifo_len(), 0);
        assert_eq!(sim.pending_ack_payloads().len(), 1);
    }

    #[test]
    fn idle_node_sleeps() {
        let (edge, idle) = (Latch::new(), IdleTimeout::new(2));
        let mut node = mk_node(&edge, &idle);
        idle.tick();
        edge.set();
        node.poll().unwrap();
        idle.tick();
        node.poll().unwrap();
        assert_eq!(node.power().0, 0);
        idle.tick();
        node.poll().unwrap();
        assert_eq!(node.power().0, 1);
        node.poll().unwrap();
        assert_eq!(node.power().0, 1);
    }

    #[test]
    fn corrupt_width_is_dropped() {
        let (edge, idle) = (Latch::new(), IdleTimeout::default());
        let mut node = mk_node(&edge, &idle);
        let sim = node.radio_mut().transport_mut();
        sim.width_override = Some(33);
        assert!(sim.deliver(1, b"nop"));
        assert_eq!(node.poll().unwrap(), None);
        let sim = node.radio().transport();
        assert_eq!(sim.rx_fifo_len(), 0);
        // RX_DR is cleared so the next packet raises the IRQ line again
        assert_eq!(sim.register(registers::STATUS) & 0x40, 0);
    }

    #[test]
    fn node_hears_after_dropped_payload() {
        let (edge, idle) = (Latch::new(), IdleTimeout::default());
        let mut node = mk_node(&edge, &idle);
        let sim = node.radio_mut().transport_mut();
        sim.width_override = Some(33);
        assert!(sim.deliver(1, b"nop"));
        assert_eq!(node.poll().unwrap(), None);

        let sim = node.radio_mut().transport_mut();
        sim.width_override = None;
        assert!(sim.deliver(1, b"int_ref_check_get"));
        assert_eq!(node.poll().unwrap(), Some(Response::Token(Token::False)));
        assert_eq!(node.radio().transport().register(registers::STATUS) & 0x40, 0);
    }
}
