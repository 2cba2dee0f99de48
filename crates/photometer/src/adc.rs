//! The ADC the photodiode and the supply check are sampled with.

/// An ADC input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcChannel {
    /// An external pin, measured against the supply.
    External(u8),
    /// The internal band-gap reference, measured against the supply.
    ///
    /// The raw reading rises as the supply voltage falls.
    InternalReference,
}

/// Single-conversion access to the ADC.
pub trait AdcSampler {
    type Error;

    /// Power the ADC and select `channel`.
    fn enable(&mut self, channel: AdcChannel);

    /// Power the ADC down.
    fn disable(&mut self);

    /// Run one conversion on the selected channel.
    fn read(&mut self) -> Result<u16, Self::Error>;
}
