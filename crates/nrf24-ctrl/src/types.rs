//! Register-level value types shared by the controller and its users.

use core::{
    fmt::{Display, Formatter, Result},
    write,
};

use bitfield_struct::bitfield;

/// Power Amplifier level, written to the `RF_PWR` bits of `RF_SETUP`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PaLevel {
    /// -18 dBm
    Min,
    /// -12 dBm
    Low,
    /// -6 dBm
    High,
    /// 0 dBm
    Max,
}

impl PaLevel {
    pub(crate) const MASK: u8 = 0b110;

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            PaLevel::Min => 0,
            PaLevel::Low => 2,
            PaLevel::High => 4,
            PaLevel::Max => 6,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & Self::MASK {
            0 => PaLevel::Min,
            2 => PaLevel::Low,
            4 => PaLevel::High,
            _ => PaLevel::Max,
        }
    }
}

impl Display for PaLevel {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            PaLevel::Min => write!(f, "-18 dBm"),
            PaLevel::Low => write!(f, "-12 dBm"),
            PaLevel::High => write!(f, "-6 dBm"),
            PaLevel::Max => write!(f, "0 dBm"),
        }
    }
}

/// Over-the-air data rate, split across the `RF_DR_LOW` and `RF_DR_HIGH` bits.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataRate {
    /// 1 Mbps
    Mbps1,
    /// 2 Mbps
    Mbps2,
    /// 250 Kbps
    Kbps250,
}

impl DataRate {
    pub(crate) const MASK: u8 = 0x28;

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            DataRate::Mbps1 => 0,
            DataRate::Mbps2 => 0x08,
            DataRate::Kbps250 => 0x20,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & Self::MASK {
            0x08 => DataRate::Mbps2,
            0x20 => DataRate::Kbps250,
            _ => DataRate::Mbps1,
        }
    }
}

impl Display for DataRate {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            DataRate::Mbps1 => write!(f, "1 Mbps"),
            DataRate::Mbps2 => write!(f, "2 Mbps"),
            DataRate::Kbps250 => write!(f, "250 Kbps"),
        }
    }
}

/// Length of the CRC appended to every packet.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CrcLength {
    Disabled,
    Bit8,
    Bit16,
}

impl CrcLength {
    /// `EN_CRC` and `CRCO` in `CONFIG`.
    pub(crate) const MASK: u8 = 0b1100;

    pub(crate) const fn into_bits(self) -> u8 {
        match self {
            CrcLength::Disabled => 0,
            CrcLength::Bit8 => 0b1000,
            CrcLength::Bit16 => 0b1100,
        }
    }

    pub(crate) const fn from_bits(value: u8) -> Self {
        match value & Self::MASK {
            0b1000 => CrcLength::Bit8,
            0b1100 => CrcLength::Bit16,
            _ => CrcLength::Disabled,
        }
    }
}

impl Display for CrcLength {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            CrcLength::Disabled => write!(f, "disabled"),
            CrcLength::Bit8 => write!(f, "8 bit"),
            CrcLength::Bit16 => write!(f, "16 bit"),
        }
    }
}

/// The status byte the chip clocks out at the start of every transaction.
///
/// When used to configure the IRQ line, a `true` flag lets the matching event
/// pull the line low.
/// ```
/// use nrf24_ctrl::StatusFlags;
/// let only_rx = StatusFlags::new().with_rx_dr(true);
/// assert!(!only_rx.tx_ds());
/// ```
#[bitfield(u8, order = Msb)]
#[derive(PartialEq, Eq)]
pub struct StatusFlags {
    #[bits(1)]
    _padding: u8,

    /// RX Data Ready.
    pub rx_dr: bool,

    /// TX Data Sent (an ACK was received when auto-ack is on).
    pub tx_ds: bool,

    /// Maximum auto-retransmits reached without an ACK.
    pub max_rt: bool,

    /// Pipe of the payload at the head of the RX FIFO, or
    /// [`StatusFlags::RX_FIFO_EMPTY`].
    #[bits(3)]
    pub rx_pipe: u8,

    /// The TX FIFO has no free level.
    pub tx_full: bool,
}

impl StatusFlags {
    /// The write-1-to-clear event bits (`RX_DR`, `TX_DS`, `MAX_RT`).
    pub const EVENTS: u8 = 0x70;
    /// `RX_P_NO` value reported while the RX FIFO is empty.
    pub const RX_FIFO_EMPTY: u8 = 7;

    /// A value with all three event flags set.
    pub const fn all_events() -> Self {
        Self::from_bits(Self::EVENTS)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StatusFlags {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "StatusFlags rx_dr: {}, tx_ds: {}, max_rt: {}, rx_pipe: {}",
            self.rx_dr(),
            self.tx_ds(),
            self.max_rt(),
            self.rx_pipe()
        )
    }
}

impl Display for StatusFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(
            f,
            "StatusFlags rx_dr: {}, tx_ds: {}, max_rt: {}, rx_pipe: {}",
            self.rx_dr(),
            self.tx_ds(),
            self.max_rt(),
            self.rx_pipe()
        )
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::{CrcLength, DataRate, PaLevel, StatusFlags};
    use std::{format, string::ToString};

    #[test]
    fn status_flags_decode() {
        // RX_DR with a payload from pipe 1 at the head of the RX FIFO
        let flags = StatusFlags::from_bits(0x42);
        assert!(flags.rx_dr());
        assert!(!flags.tx_ds());
        assert!(!flags.max_rt());
        assert_eq!(flags.rx_pipe(), 1);
        assert!(!flags.tx_full());

        let idle = StatusFlags::from_bits(0x0E);
        assert_eq!(idle.rx_pipe(), StatusFlags::RX_FIFO_EMPTY);
        assert_eq!(StatusFlags::all_events().into_bits(), 0x70);
    }

    #[test]
    fn status_flags_display() {
        let flags = StatusFlags::new().with_tx_ds(true);
        assert_eq!(
            format!("{flags}"),
            "StatusFlags rx_dr: false, tx_ds: true, max_rt: false, rx_pipe: 0"
        );
    }

    #[test]
    fn register_values() {
        for level in [PaLevel::Min, PaLevel::Low, PaLevel::High, PaLevel::Max] {
            assert_eq!(PaLevel::from_bits(level.into_bits() | 1), level);
        }
        for rate in [DataRate::Mbps1, DataRate::Mbps2, DataRate::Kbps250] {
            assert_eq!(DataRate::from_bits(rate.into_bits() | 0x10), rate);
        }
        for crc in [CrcLength::Disabled, CrcLength::Bit8, CrcLength::Bit16] {
            assert_eq!(CrcLength::from_bits(crc.into_bits() | 3), crc);
        }
        assert_eq!(PaLevel::Max.to_string(), "0 dBm");
        assert_eq!(DataRate::Kbps250.to_string(), "250 Kbps");
        assert_eq!(CrcLength::Bit16.to_string(), "16 bit");
    }
}
