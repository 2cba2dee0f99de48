use crate::radio::nrf24::bit_fields::SetupRetry;
use crate::radio::nrf24::mnemonics::MAX_PAYLOAD_SIZE;
use crate::{CrcLength, DataRate, PaLevel};

/// Settings applied by [`EsbInit::begin_with_config()`](fn@crate::radio::prelude::EsbInit::begin_with_config).
///
/// This struct follows a builder pattern:
/// ```
/// use nrf24_ctrl::radio::RadioConfig;
/// let config = RadioConfig::default().with_channel(42);
/// assert_eq!(config.channel(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadioConfig {
    pub(crate) auto_retries: SetupRetry,
    pa_level: PaLevel,
    data_rate: DataRate,
    crc_length: CrcLength,
    channel: u8,
    auto_ack: u8,
    payload_size: u8,
}

impl Default for RadioConfig {
    /// Instantiate a [`RadioConfig`] object with library defaults.
    ///
    /// | feature | default value |
    /// |--------:|:--------------|
    /// | [`RadioConfig::auto_retry_delay()`] | `8` (2250 µs) |
    /// | [`RadioConfig::auto_retry_count()`] | `15` |
    /// | [`RadioConfig::pa_level()`] | [`PaLevel::Max`] |
    /// | [`RadioConfig::data_rate()`] | [`DataRate::Mbps1`] |
    /// | [`RadioConfig::crc_length()`] | [`CrcLength::Bit16`] |
    /// | [`RadioConfig::channel()`] | `76` |
    /// | [`RadioConfig::auto_ack()`] | `0x3F` (enabled for pipes 0 - 5) |
    /// | [`RadioConfig::payload_size()`] | `32` |
    fn default() -> Self {
        Self {
            auto_retries: SetupRetry::new().with_ard(8).with_arc(15),
            pa_level: PaLevel::Max,
            data_rate: DataRate::Mbps1,
            crc_length: CrcLength::Bit16,
            channel: 76,
            auto_ack: 0x3F,
            payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl RadioConfig {
    /// The auto-retry delay code. The delay is `(code + 1) * 250` µs.
    pub const fn auto_retry_delay(&self) -> u8 {
        self.auto_retries.ard()
    }

    /// The number of automatic retransmits before `MAX_RT` is raised.
    pub const fn auto_retry_count(&self) -> u8 {
        self.auto_retries.arc()
    }

    /// Set the auto-retry `delay` code and `count`. Both are clamped to 15.
    pub fn with_auto_retries(self, delay: u8, count: u8) -> Self {
        let mut new_config = self;
        new_config.auto_retries = SetupRetry::new()
            .with_ard(delay.min(15))
            .with_arc(count.min(15));
        new_config
    }

    pub const fn pa_level(&self) -> PaLevel {
        self.pa_level
    }

    pub fn with_pa_level(self, level: PaLevel) -> Self {
        let mut new_config = self;
        new_config.pa_level = level;
        new_config
    }

    pub const fn data_rate(&self) -> DataRate {
        self.data_rate
    }

    pub fn with_data_rate(self, data_rate: DataRate) -> Self {
        let mut new_config = self;
        new_config.data_rate = data_rate;
        new_config
    }

    pub const fn crc_length(&self) -> CrcLength {
        self.crc_length
    }

    pub fn with_crc_length(self, length: CrcLength) -> Self {
        let mut new_config = self;
        new_config.crc_length = length;
        new_config
    }

    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Set the RF channel (offset in MHz from 2400 MHz). Clamped to 125.
    pub fn with_channel(self, channel: u8) -> Self {
        let mut new_config = self;
        new_config.channel = channel.min(125);
        new_config
    }

    /// Bit mask of pipes with auto-ack enabled.
    pub const fn auto_ack(&self) -> u8 {
        self.auto_ack
    }

    pub fn with_auto_ack(self, pipes: u8) -> Self {
        let mut new_config = self;
        new_config.auto_ack = pipes & 0x3F;
        new_config
    }

    pub const fn payload_size(&self) -> u8 {
        self.payload_size
    }

    /// Set the static payload size. Clamped to 32.
    pub fn with_payload_size(self, size: u8) -> Self {
        let mut new_config = self;
        new_config.payload_size = size.min(MAX_PAYLOAD_SIZE);
        new_config
    }
}
