// bytes.rs - Backing byte storage shared by every container
//
// Owned storage is allocated as u64 words so the base address is always
// 8-byte aligned; typed views of any supported element kind can then be
// produced by plain casts. Caller storage is checked for the same alignment.

use super::StorageError;

/// Alignment every backing buffer must satisfy.
pub const STORAGE_ALIGNMENT: usize = 8;

pub(crate) enum ByteStore<'s> {
    Owned { words: Box<[u64]>, len: usize },
    Borrowed(&'s mut [u8]),
}

impl<'s> ByteStore<'s> {
    /// Allocate `len` zeroed bytes.
    pub fn zeroed(len: usize) -> Self {
        let words = vec![0u64; len.div_ceil(STORAGE_ALIGNMENT)].into_boxed_slice();
        ByteStore::Owned { words, len }
    }

    /// Adopt the first `required` bytes of caller storage.
    ///
    /// The bytes are used as they are; nothing is zeroed.
    pub fn adopt(storage: &'s mut [u8], required: usize) -> Result<Self, StorageError> {
        let address = storage.as_ptr() as usize;
        if address % STORAGE_ALIGNMENT != 0 {
            return Err(StorageError::StorageMisaligned {
                address,
                alignment: STORAGE_ALIGNMENT,
            });
        }
        if storage.len() < required {
            return Err(StorageError::StorageTooSmall {
                required,
                provided: storage.len(),
            });
        }
        Ok(ByteStore::Borrowed(&mut storage[..required]))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ByteStore::Owned { words, len } => &bytemuck::cast_slice(words)[..*len],
            ByteStore::Borrowed(bytes) => bytes,
        }
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        match self {
            ByteStore::Owned { words, len } => &mut bytemuck::cast_slice_mut(words)[..*len],
            ByteStore::Borrowed(bytes) => bytes,
        }
    }

    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, ByteStore::Borrowed(_))
    }

    pub fn zero(&mut self) {
        self.as_bytes_mut().fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_storage_is_aligned_and_zeroed() {
        let store = ByteStore::zeroed(13);
        let bytes = store.as_bytes();
        assert_eq!(bytes.len(), 13);
        assert_eq!(bytes.as_ptr() as usize % STORAGE_ALIGNMENT, 0);
        assert!(bytes.iter().all(|&b| b == 0));
        assert!(!store.is_borrowed());
    }

    #[test]
    fn adopt_rejects_short_storage() {
        let mut words = [0u64; 2];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut words);
        let err = ByteStore::adopt(bytes, 32).err();
        assert_eq!(
            err,
            Some(StorageError::StorageTooSmall {
                required: 32,
                provided: 16
            })
        );
    }

    #[test]
    fn adopt_rejects_misaligned_storage() {
        let mut words = [0u64; 4];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut words);
        let result = ByteStore::adopt(&mut bytes[1..], 8);
        assert!(matches!(
            result,
            Err(StorageError::StorageMisaligned { alignment: 8, .. })
        ));
    }

    #[test]
    fn adopt_trims_to_required_length() {
        let mut words = [0x0707_0707_0707_0707u64; 4];
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut words);
        let store = ByteStore::adopt(bytes, 12).unwrap();
        assert_eq!(store.as_bytes().len(), 12);
        assert!(store.is_borrowed());
        assert_eq!(store.as_bytes()[0], 7);
    }
}
