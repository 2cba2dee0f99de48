use crate::radio::{prelude::EsbFifo, NrfController};
use crate::BusTransport;

use super::commands;

impl<T: BusTransport> EsbFifo for NrfController<T> {
    type FifoErrorType = T::Error;

    fn flush_rx(&mut self) -> Result<(), Self::FifoErrorType> {
        self.exec_command(commands::FLUSH_RX)?;
        Ok(())
    }

    fn flush_tx(&mut self) -> Result<(), Self::FifoErrorType> {
        self.exec_command(commands::FLUSH_TX)?;
        Ok(())
    }
}
