//! The seam between [`NrfController`](crate::radio::NrfController) and the hardware.

use embedded_hal::{delay::DelayNs, digital::OutputPin, spi::SpiBus};

/// Byte-level access to the transceiver's 4-wire bus and its control lines.
///
/// The controller frames every transaction itself: CSN is driven low,
/// bytes are clocked one at a time with [`BusTransport::exchange_byte()`],
/// then CSN is driven high again.
pub trait BusTransport {
    type Error;

    /// Clock `byte` out on MOSI and return the byte clocked in on MISO.
    fn exchange_byte(&mut self, byte: u8) -> Result<u8, Self::Error>;

    /// Drive the CE line.
    fn set_chip_enable(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Drive the CSN line. The chip is selected while CSN is low.
    fn set_chip_select(&mut self, high: bool) -> Result<(), Self::Error>;

    /// Busy-wait for at least `us` microseconds.
    fn delay_us(&mut self, us: u32);
}

/// Faults reported by [`HalTransport`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Nrf24Error<SPI, DO> {
    /// Represents a SPI transaction error.
    Spi(SPI),
    /// Represents a DigitalOutput error.
    Gpo(DO),
}

/// A [`BusTransport`] built from `embedded-hal` peripherals.
///
/// Unlike an [`SpiDevice`](embedded_hal::spi::SpiDevice), the [`SpiBus`] passed
/// here does not own chip-select; the CSN pin is driven directly so that one
/// transaction can span many single-byte transfers.
pub struct HalTransport<SPI, DO, DELAY> {
    spi: SPI,
    csn_pin: DO,
    ce_pin: DO,
    delay_impl: DELAY,
    selected: bool,
}

impl<SPI, DO, DELAY> HalTransport<SPI, DO, DELAY>
where
    SPI: SpiBus,
    DO: OutputPin,
    DELAY: DelayNs,
{
    pub fn new(spi: SPI, csn_pin: DO, ce_pin: DO, delay_impl: DELAY) -> Self {
        Self {
            spi,
            csn_pin,
            ce_pin,
            delay_impl,
            selected: false,
        }
    }

    /// Give back the peripherals.
    pub fn release(self) -> (SPI, DO, DO, DELAY) {
        (self.spi, self.csn_pin, self.ce_pin, self.delay_impl)
    }
}

impl<SPI, DO, DELAY> BusTransport for HalTransport<SPI, DO, DELAY>
where
    SPI: SpiBus,
    DO: OutputPin,
    DELAY: DelayNs,
{
    type Error = Nrf24Error<SPI::Error, DO::Error>;

    fn exchange_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut buf = [byte];
        self.spi
            .transfer_in_place(&mut buf)
            .map_err(Nrf24Error::Spi)?;
        Ok(buf[0])
    }

    fn set_chip_enable(&mut self, high: bool) -> Result<(), Self::Error> {
        self.ce_pin.set_state(high.into()).map_err(Nrf24Error::Gpo)
    }

    fn set_chip_select(&mut self, high: bool) -> Result<(), Self::Error> {
        if high && self.selected {
            // the bus may still be shifting out the last byte
            self.spi.flush().map_err(Nrf24Error::Spi)?;
        }
        self.csn_pin.set_state(high.into()).map_err(Nrf24Error::Gpo)?;
        self.selected = !high;
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.delay_impl.delay_us(us);
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{BusTransport, HalTransport};
    use embedded_hal_mock::eh1::{
        delay::NoopDelay,
        digital::{Mock as PinMock, State, Transaction as PinTransaction},
        spi::{Mock as SpiMock, Transaction as SpiTransaction},
    };
    use std::vec;

    #[test]
    fn framed_exchange() {
        let spi_expectations = [
            SpiTransaction::transfer_in_place(vec![0x07], vec![0x0E]),
            SpiTransaction::transfer_in_place(vec![0xFF], vec![0x0E]),
            SpiTransaction::flush(),
        ];
        let csn_expectations = [
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
            PinTransaction::set(State::High),
        ];
        let ce_expectations = [PinTransaction::set(State::High)];
        let mut spi = SpiMock::new(&spi_expectations);
        let mut csn_pin = PinMock::new(&csn_expectations);
        let mut ce_pin = PinMock::new(&ce_expectations);
        let mut bus = HalTransport::new(spi.clone(), csn_pin.clone(), ce_pin.clone(), NoopDelay);

        // releasing an idle bus does not flush
        bus.set_chip_select(true).unwrap();
        bus.set_chip_select(false).unwrap();
        assert_eq!(bus.exchange_byte(0x07).unwrap(), 0x0E);
        assert_eq!(bus.exchange_byte(0xFF).unwrap(), 0x0E);
        bus.set_chip_select(true).unwrap();
        bus.set_chip_enable(true).unwrap();
        bus.delay_us(130);

        let (_spi, _csn, _ce, _delay) = bus.release();
        spi.done();
        csn_pin.done();
        ce_pin.done();
    }
}
