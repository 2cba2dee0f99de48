use bitfield_struct::bitfield;

use crate::{CrcLength, DataRate, PaLevel};

#[bitfield(u8, order = Msb)]
pub(crate) struct Config {
    #[bits(1)]
    _padding: u8,

    /// Keep "RX Data Ready" off the IRQ line.
    pub mask_rx_dr: bool,

    /// Keep "TX Data Sent" off the IRQ line.
    pub mask_tx_ds: bool,

    /// Keep "max retransmits" off the IRQ line.
    pub mask_max_rt: bool,

    #[bits(2, access = None)]
    crc: u8,

    pub power: bool,

    pub is_rx: bool,
}

impl Config {
    pub fn crc_length(&self) -> CrcLength {
        CrcLength::from_bits(self.into_bits())
    }

    pub fn with_crc_length(self, length: CrcLength) -> Self {
        Self::from_bits(self.into_bits() & !CrcLength::MASK | length.into_bits())
    }
}

#[bitfield(u8, order = Msb)]
#[derive(PartialEq, Eq)]
pub(crate) struct SetupRetry {
    /// The auto-retry delay code.
    #[bits(4)]
    pub ard: u8,

    /// The auto-retry count.
    #[bits(4)]
    pub arc: u8,
}

#[bitfield(u8, order = Msb)]
pub(crate) struct RfSetup {
    pub cont_wave: bool,

    #[bits(1)]
    _padding: u8,

    /// `RF_DR_LOW`, `PLL_LOCK` and `RF_DR_HIGH`
    #[bits(3, access = None)]
    data_rate: u8,

    #[bits(2, access = None)]
    pa_level: u8,

    pub lna_hcurr: bool,
}

impl RfSetup {
    pub fn data_rate(&self) -> DataRate {
        DataRate::from_bits(self.into_bits())
    }

    pub fn with_data_rate(self, data_rate: DataRate) -> Self {
        Self::from_bits(self.into_bits() & !DataRate::MASK | data_rate.into_bits())
    }

    pub fn pa_level(&self) -> PaLevel {
        PaLevel::from_bits(self.into_bits())
    }

    pub fn with_pa_level(self, level: PaLevel) -> Self {
        Self::from_bits(self.into_bits() & !PaLevel::MASK | level.into_bits())
    }
}

/// The `FEATURE` register. The controller also keeps one as its cache of
/// which features are on.
#[bitfield(u8, order = Msb)]
pub(crate) struct Feature {
    #[bits(5)]
    _padding: u8,

    pub dynamic_payloads: bool,

    pub ack_payloads: bool,

    pub dynamic_ack: bool,
}
