//! Non-volatile storage of the calibration data.

use crate::calibration::{CalibrationRecord, InternalVoltageReference, CALIB_SLOTS};

/// Byte-addressed non-volatile memory, such as an on-chip EEPROM.
pub trait PersistentStore {
    type Error;

    fn read_block(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), Self::Error>;

    fn write_block(&mut self, offset: u16, data: &[u8]) -> Result<(), Self::Error>;
}

/// Offsets of the records in the store.
pub mod layout {
    use crate::calibration::{CalibrationRecord, InternalVoltageReference, CALIB_SLOTS};

    pub const INT_REF_OFFSET: u16 = 0;
    pub const CALIB_OFFSET: u16 = INT_REF_OFFSET + InternalVoltageReference::ENCODED_LEN as u16;
    pub const IMAGE_LEN: usize =
        CALIB_OFFSET as usize + CALIB_SLOTS * CalibrationRecord::ENCODED_LEN;

    /// Offset of calibration slot `slot`.
    pub const fn calib_offset(slot: usize) -> u16 {
        CALIB_OFFSET + (slot * CalibrationRecord::ENCODED_LEN) as u16
    }
}

pub fn load_int_ref<S: PersistentStore>(
    store: &mut S,
) -> Result<InternalVoltageReference, S::Error> {
    let mut buf = [0u8; InternalVoltageReference::ENCODED_LEN];
    store.read_block(layout::INT_REF_OFFSET, &mut buf)?;
    Ok(InternalVoltageReference::from_bytes(&buf))
}

pub fn save_int_ref<S: PersistentStore>(
    store: &mut S,
    reference: &InternalVoltageReference,
) -> Result<(), S::Error> {
    store.write_block(layout::INT_REF_OFFSET, &reference.to_bytes())
}

pub fn load_calibration<S: PersistentStore>(
    store: &mut S,
) -> Result<[CalibrationRecord; CALIB_SLOTS], S::Error> {
    let mut records = [CalibrationRecord::default(); CALIB_SLOTS];
    let mut buf = [0u8; CalibrationRecord::ENCODED_LEN];
    for (slot, record) in records.iter_mut().enumerate() {
        store.read_block(layout::calib_offset(slot), &mut buf)?;
        *record = CalibrationRecord::from_bytes(&buf);
    }
    Ok(records)
}

/// Write the slots whose encoding differs from what is stored.
///
/// Returns the number of slots written.
pub fn save_calibration<S: PersistentStore>(
    store: &mut S,
    records: &[CalibrationRecord; CALIB_SLOTS],
) -> Result<usize, S::Error> {
    let mut stored = [0u8; CalibrationRecord::ENCODED_LEN];
    let mut written = 0;
    for (slot, record) in records.iter().enumerate() {
        let offset = layout::calib_offset(slot);
        let encoded = record.to_bytes();
        store.read_block(offset, &mut stored)?;
        if stored != encoded {
            store.write_block(offset, &encoded)?;
            written += 1;
        }
    }
    Ok(written)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MemoryStoreError {
    /// The access runs past the end of the memory.
    OutOfBounds,
    /// Writes are refused.
    ReadOnly,
}

/// A [`PersistentStore`] held in RAM. It starts out erased (all `0xFF`).
#[derive(Clone, Debug)]
pub struct MemoryStore<const N: usize = { layout::IMAGE_LEN }> {
    bytes: [u8; N],
    writes: usize,
    /// Refuse all writes with [`MemoryStoreError::ReadOnly`].
    pub read_only: bool,
}

impl<const N: usize> MemoryStore<N> {
    pub const fn new() -> Self {
        Self::from_bytes([0xFF; N])
    }

    pub const fn from_bytes(bytes: [u8; N]) -> Self {
        Self {
            bytes,
            writes: 0,
            read_only: false,
        }
    }

    pub const fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Number of successful `write_block()` calls.
    pub const fn writes(&self) -> usize {
        self.writes
    }

    fn range(offset: u16, len: usize) -> Result<core::ops::Range<usize>, MemoryStoreError> {
        let start = offset as usize;
        let end = start + len;
        if end > N {
            return Err(MemoryStoreError::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PersistentStore for MemoryStore<N> {
    type Error = MemoryStoreError;

    fn read_block(&mut self, offset: u16, buf: &mut [u8]) -> Result<(), Self::Error> {
        let range = Self::range(offset, buf.len())?;
        buf.copy_from_slice(&self.bytes[range]);
        Ok(())
    }

    fn write_block(&mut self, offset: u16, data: &[u8]) -> Result<(), Self::Error> {
        if self.read_only {
            return Err(MemoryStoreError::ReadOnly);
        }
        let range = Self::range(offset, data.len())?;
        self.bytes[range].copy_from_slice(data);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{
        layout, load_calibration, load_int_ref, save_calibration, save_int_ref, MemoryStore,
        MemoryStoreError, PersistentStore,
    };
    use crate::calibration::{CalibrationRecord, InternalVoltageReference, CALIB_SLOTS};

    #[test]
    fn layout_offsets() {
        assert_eq!(layout::CALIB_OFFSET, 3);
        assert_eq!(layout::calib_offset(4), 39);
        assert_eq!(layout::IMAGE_LEN, 48);
    }

    #[test]
    fn erased_store_loads_empty() {
        let mut store = MemoryStore::<{ layout::IMAGE_LEN }>::new();
        assert_eq!(load_int_ref(&mut store), Ok(InternalVoltageReference::default()));
        assert_eq!(
            load_calibration(&mut store),
            Ok([CalibrationRecord::default(); CALIB_SLOTS])
        );
    }

    #[test]
    fn only_changed_slots_are_written() {
        let mut store = MemoryStore::<{ layout::IMAGE_LEN }>::new();
        let mut records = [CalibrationRecord::default(); CALIB_SLOTS];
        // every erased slot differs from the encoding of an empty record
        assert_eq!(save_calibration(&mut store, &records), Ok(CALIB_SLOTS));
        assert_eq!(save_calibration(&mut store, &records), Ok(0));

        records[2].set_wavelength(Some(650));
        assert_eq!(save_calibration(&mut store, &records), Ok(1));
        assert_eq!(store.writes(), CALIB_SLOTS + 1);
        assert_eq!(&store.bytes()[21..24], &[1, 0x8A, 0x02]);
        assert_eq!(load_calibration(&mut store), Ok(records));
    }

    #[test]
    fn int_ref_persists() {
        let mut store = MemoryStore::<{ layout::IMAGE_LEN }>::new();
        let reference = InternalVoltageReference { value: Some(512) };
        save_int_ref(&mut store, &reference).unwrap();
        assert_eq!(&store.bytes()[..3], &[1, 0, 2]);
        assert_eq!(load_int_ref(&mut store), Ok(reference));
    }

    #[test]
    fn store_faults() {
        let mut store = MemoryStore::<4>::new();
        let mut buf = [0u8; 5];
        assert_eq!(store.read_block(0, &mut buf), Err(MemoryStoreError::OutOfBounds));
        assert_eq!(store.write_block(3, &[0, 0]), Err(MemoryStoreError::OutOfBounds));
        store.read_only = true;
        assert_eq!(store.write_block(0, &[0]), Err(MemoryStoreError::ReadOnly));
        assert_eq!(store.writes(), 0);
    }
}
