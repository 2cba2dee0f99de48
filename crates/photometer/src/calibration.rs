//! Calibration data the measurement is corrected with.
//!
//! Both records have a fixed little-endian encoding, see [`crate::store::layout`].

use bitfield_struct::bitfield;

/// Number of calibration slots.
pub const CALIB_SLOTS: usize = 5;

/// Raw ADC counts the internal reference may drift above its calibrated value
/// before the supply counts as sagged.
pub const SAG_TOLERANCE: u16 = 4;

/// Presence flags of the [`CalibrationRecord`] fields.
#[bitfield(u8)]
#[derive(PartialEq, Eq)]
pub struct FieldFlags {
    pub wavelength: bool,
    pub gain_error: bool,
    pub zero_error: bool,
    #[bits(5)]
    _reserved: u8,
}

impl FieldFlags {
    /// Bits no field is assigned to. Erased storage reads back with these set.
    pub const RESERVED: u8 = 0b1111_1000;
}

/// One calibration slot. Every field may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CalibrationRecord {
    flags: FieldFlags,
    wavelength: u16,
    gain_error: f32,
    zero_error: i16,
}

impl CalibrationRecord {
    /// Encoded size in bytes.
    pub const ENCODED_LEN: usize = 9;

    pub const fn flags(&self) -> FieldFlags {
        self.flags
    }

    /// Informational tag, in nanometers.
    pub fn wavelength(&self) -> Option<u16> {
        self.flags.wavelength().then_some(self.wavelength)
    }

    pub fn gain_error(&self) -> Option<f32> {
        self.flags.gain_error().then_some(self.gain_error)
    }

    pub fn zero_error(&self) -> Option<i16> {
        self.flags.zero_error().then_some(self.zero_error)
    }

    pub fn set_wavelength(&mut self, value: Option<u16>) {
        self.flags.set_wavelength(value.is_some());
        self.wavelength = value.unwrap_or_default();
    }

    pub fn set_gain_error(&mut self, value: Option<f32>) {
        self.flags.set_gain_error(value.is_some());
        self.gain_error = value.unwrap_or_default();
    }

    pub fn set_zero_error(&mut self, value: Option<i16>) {
        self.flags.set_zero_error(value.is_some());
        self.zero_error = value.unwrap_or_default();
    }

    /// A record can correct a measurement once its gain and zero errors are set.
    pub fn is_complete(&self) -> bool {
        self.flags.gain_error() && self.flags.zero_error()
    }

    /// Encode as `flags, wavelength, gain_error, zero_error`.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let mut out = [0u8; Self::ENCODED_LEN];
        out[0] = self.flags.into_bits();
        out[1..3].copy_from_slice(&self.wavelength.to_le_bytes());
        out[3..7].copy_from_slice(&self.gain_error.to_le_bytes());
        out[7..9].copy_from_slice(&self.zero_error.to_le_bytes());
        out
    }

    /// Decode a record written by [`Self::to_bytes()`].
    ///
    /// A flags byte with reserved bits set decodes as an empty record.
    /// Values of absent fields are discarded.
    pub fn from_bytes(bytes: &[u8; Self::ENCODED_LEN]) -> Self {
        if bytes[0] & FieldFlags::RESERVED != 0 {
            return Self::default();
        }
        let flags = FieldFlags::from_bits(bytes[0]);
        let mut record = Self::default();
        if flags.wavelength() {
            record.set_wavelength(Some(u16::from_le_bytes([bytes[1], bytes[2]])));
        }
        if flags.gain_error() {
            record.set_gain_error(Some(f32::from_le_bytes([
                bytes[3], bytes[4], bytes[5], bytes[6],
            ])));
        }
        if flags.zero_error() {
            record.set_zero_error(Some(i16::from_le_bytes([bytes[7], bytes[8]])));
        }
        record
    }
}

/// Raw ADC reading of the internal band-gap reference, taken at a known good
/// supply voltage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InternalVoltageReference {
    pub value: Option<u16>,
}

impl InternalVoltageReference {
    /// Encoded size in bytes.
    pub const ENCODED_LEN: usize = 3;

    /// Is a reading of the reference taken now a sign of a sagging supply?
    ///
    /// Always `false` without a calibrated value.
    pub fn is_sagged(&self, sample: u16) -> bool {
        matches!(self.value, Some(calibrated) if sample > calibrated.saturating_add(SAG_TOLERANCE))
    }

    /// Encode as `present, value`.
    pub fn to_bytes(&self) -> [u8; Self::ENCODED_LEN] {
        let value = self.value.unwrap_or_default().to_le_bytes();
        [self.value.is_some() as u8, value[0], value[1]]
    }

    /// Only a presence byte of exactly 1 marks a stored value.
    pub fn from_bytes(bytes: &[u8; Self::ENCODED_LEN]) -> Self {
        Self {
            value: (bytes[0] == 1).then(|| u16::from_le_bytes([bytes[1], bytes[2]])),
        }
    }
}
