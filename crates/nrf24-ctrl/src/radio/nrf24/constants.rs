/// Register offsets for the nRF24L01.
pub mod registers {
    pub const CONFIG: u8 = 0x00;
    pub const EN_AA: u8 = 0x01;
    pub const EN_RXADDR: u8 = 0x02;
    pub const SETUP_AW: u8 = 0x03;
    pub const SETUP_RETR: u8 = 0x04;
    pub const RF_CH: u8 = 0x05;
    pub const RF_SETUP: u8 = 0x06;
    pub const STATUS: u8 = 0x07;
    pub const OBSERVE_TX: u8 = 0x08;
    pub const RPD: u8 = 0x09;
    /// `RX_ADDR_P0` .. `RX_ADDR_P5` are consecutive.
    pub const RX_ADDR_P0: u8 = 0x0A;
    pub const RX_ADDR_P1: u8 = 0x0B;
    pub const TX_ADDR: u8 = 0x10;
    /// `RX_PW_P0` .. `RX_PW_P5` are consecutive.
    pub const RX_PW_P0: u8 = 0x11;
    pub const FIFO_STATUS: u8 = 0x17;
    pub const DYNPD: u8 = 0x1C;
    pub const FEATURE: u8 = 0x1D;
}

/// SPI commands for the nRF24L01.
pub mod commands {
    pub const R_REGISTER: u8 = 0x00;
    pub const W_REGISTER: u8 = 0x20;
    /// Bits of a register command that hold the register offset.
    pub const REGISTER_MASK: u8 = 0x1F;
    pub const ACTIVATE: u8 = 0x50;
    pub const R_RX_PL_WID: u8 = 0x60;
    pub const R_RX_PAYLOAD: u8 = 0x61;
    pub const W_TX_PAYLOAD: u8 = 0xA0;
    /// OR'd with the pipe number.
    pub const W_ACK_PAYLOAD: u8 = 0xA8;
    pub const FLUSH_TX: u8 = 0xE1;
    pub const FLUSH_RX: u8 = 0xE2;
    pub const NOP: u8 = 0xFF;
}

/// Bit mnemonics and chip limits.
pub mod mnemonics {
    // CONFIG
    pub const MASK_RX_DR: u8 = 1 << 6;
    pub const MASK_TX_DS: u8 = 1 << 5;
    pub const MASK_MAX_RT: u8 = 1 << 4;
    pub const EN_CRC: u8 = 1 << 3;
    pub const CRCO: u8 = 1 << 2;
    pub const PWR_UP: u8 = 1 << 1;
    pub const PRIM_RX: u8 = 1;

    // STATUS
    pub const RX_DR: u8 = 1 << 6;
    pub const TX_DS: u8 = 1 << 5;
    pub const MAX_RT: u8 = 1 << 4;
    pub const TX_FULL: u8 = 1;

    // FIFO_STATUS
    pub const RX_EMPTY: u8 = 1;
    pub const RX_FULL: u8 = 1 << 1;
    pub const TX_EMPTY: u8 = 1 << 4;
    pub const FIFO_TX_FULL: u8 = 1 << 5;

    // FEATURE
    pub const EN_DPL: u8 = 1 << 2;
    pub const EN_ACK_PAY: u8 = 1 << 1;
    pub const EN_DYN_ACK: u8 = 1;

    /// `DYNPD` value enabling dynamic widths on all 6 pipes.
    pub const DPL_ALL_PIPES: u8 = 0x3F;

    pub const MAX_PAYLOAD_SIZE: u8 = 32;
    pub const PIPE_COUNT: u8 = 6;
    pub const ADDRESS_WIDTH: usize = 5;
}

/// Delays and poll budgets (microseconds unless noted).
pub mod timing {
    /// Settle time after power-on before the chip accepts commands.
    pub const POWER_ON_SETTLE_US: u32 = 5000;
    /// Standby to TX settle time.
    pub const TX_SETTLE_US: u32 = 150;
    /// Time for an in-flight ACK to finish before leaving RX mode.
    pub const RX_TO_STANDBY_US: u32 = 100;
    /// Recovery time after flushing a corrupt RX FIFO.
    pub const CORRUPT_WIDTH_RECOVERY_US: u32 = 2000;
    /// Number of `OBSERVE_TX` polls while waiting for a transmission to finish.
    pub const TX_POLL_LIMIT: u16 = 9000;
    pub const TX_POLL_INTERVAL_US: u32 = 2;
}
