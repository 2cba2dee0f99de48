use crate::radio::{prelude::EsbStatus, NrfController};
use crate::{BusTransport, StatusFlags};

use super::bit_fields::Config;
use super::{commands, registers};

impl<T: BusTransport> EsbStatus for NrfController<T> {
    type StatusErrorType = T::Error;

    fn status_flags(&self) -> StatusFlags {
        self.status
    }

    fn set_status_flags(&mut self, flags: StatusFlags) -> Result<(), Self::StatusErrorType> {
        let config = Config::from_bits(self.read_byte_register(registers::CONFIG)?)
            .with_mask_rx_dr(!flags.rx_dr())
            .with_mask_tx_ds(!flags.tx_ds())
            .with_mask_max_rt(!flags.max_rt());
        self.write_byte_register(registers::CONFIG, config.into_bits())?;
        Ok(())
    }

    fn clear_status_flags(&mut self, flags: StatusFlags) -> Result<(), Self::StatusErrorType> {
        self.write_byte_register(
            registers::STATUS,
            flags.into_bits() & StatusFlags::EVENTS,
        )?;
        Ok(())
    }

    fn update(&mut self) -> Result<StatusFlags, Self::StatusErrorType> {
        self.exec_command(commands::NOP)?;
        Ok(self.status)
    }
}
