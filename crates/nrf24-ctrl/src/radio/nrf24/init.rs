use crate::radio::{prelude::EsbFifo, prelude::EsbInit, NrfController, RadioConfig};
use crate::{BusTransport, StatusFlags};

use super::bit_fields::{Config, Feature, RfSetup};
use super::{registers, timing};

impl<T: BusTransport> EsbInit for NrfController<T> {
    type InitErrorType = T::Error;

    fn begin(&mut self) -> Result<(), Self::InitErrorType> {
        self.begin_with_config(&RadioConfig::default())
    }

    fn begin_with_config(&mut self, config: &RadioConfig) -> Result<(), Self::InitErrorType> {
        self.transport.set_chip_select(true)?;
        self.transport.set_chip_enable(false)?;
        self.transport.delay_us(timing::POWER_ON_SETTLE_US);

        // power down before touching anything else
        let config_reg = Config::from_bits(self.read_byte_register(registers::CONFIG)?);
        self.write_byte_register(registers::CONFIG, config_reg.with_power(false).into_bits())?;

        self.write_byte_register(registers::SETUP_RETR, config.auto_retries.into_bits())?;

        let rf_setup = RfSetup::from_bits(self.read_byte_register(registers::RF_SETUP)?)
            .with_pa_level(config.pa_level())
            .with_data_rate(config.data_rate());
        self.write_byte_register(registers::RF_SETUP, rf_setup.into_bits())?;

        let config_reg = Config::from_bits(self.read_byte_register(registers::CONFIG)?)
            .with_crc_length(config.crc_length());
        self.write_byte_register(registers::CONFIG, config_reg.into_bits())?;

        self.write_byte_register(registers::DYNPD, 0)?;
        self.write_byte_register(registers::FEATURE, 0)?;
        self.feature = Feature::new();
        self.payload_size = config.payload_size();

        self.write_byte_register(registers::STATUS, StatusFlags::EVENTS)?;
        self.write_byte_register(registers::RF_CH, config.channel())?;
        self.write_byte_register(registers::EN_AA, config.auto_ack())?;

        self.flush_rx()?;
        self.flush_tx()?;
        debug!("radio initialized on channel {}", config.channel());
        Ok(())
    }
}
