//! Fixed-length palette index array for one section.
//!
//! Each of the 4096 cells holds an index of `bits` bits (0, 4, 8 or 16).
//! All widths divide 64, so no entry straddles a word boundary.

use lattice_coords::BLOCKS_PER_SECTION;

/// Bit-packed palette indices for the cells of a section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackedIndices {
    words: Vec<u64>,
    bits: u8,
}

impl PackedIndices {
    /// All indices zero at the given width.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is not 0, 4, 8 or 16.
    pub fn new(bits: u8) -> Self {
        assert!(matches!(bits, 0 | 4 | 8 | 16), "unsupported index width {bits}");
        let words = if bits == 0 {
            0
        } else {
            BLOCKS_PER_SECTION / (64 / bits as usize)
        };
        Self {
            words: vec![0; words],
            bits,
        }
    }

    /// Smallest supported width able to address `palette_len` entries.
    pub fn bits_for(palette_len: usize) -> u8 {
        match palette_len {
            0 | 1 => 0,
            2..=16 => 4,
            17..=256 => 8,
            _ => 16,
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> u16 {
        if self.bits == 0 {
            return 0;
        }
        let (word, shift) = self.locate(index);
        ((self.words[word] >> shift) & self.mask()) as u16
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: u16) {
        if self.bits == 0 {
            debug_assert_eq!(value, 0, "zero-width array can only hold 0");
            return;
        }
        debug_assert!(u64::from(value) <= self.mask());
        let (word, shift) = self.locate(index);
        let mask = self.mask();
        self.words[word] = (self.words[word] & !(mask << shift)) | (u64::from(value) << shift);
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Copy of this array at a different width.
    pub fn resized(&self, bits: u8) -> Self {
        let mut resized = Self::new(bits);
        if self.bits != 0 && bits != 0 {
            for index in 0..BLOCKS_PER_SECTION {
                resized.set(index, self.get(index));
            }
        }
        resized
    }

    /// Bytes of backing storage.
    pub fn storage_bytes(&self) -> usize {
        self.words.len() * 8
    }

    #[inline]
    fn mask(&self) -> u64 {
        (1u64 << self.bits) - 1
    }

    #[inline]
    fn locate(&self, index: usize) -> (usize, u32) {
        debug_assert!(index < BLOCKS_PER_SECTION, "index {index} out of bounds");
        let per_word = 64 / self.bits as usize;
        (index / per_word, ((index % per_word) * self.bits as usize) as u32)
    }
}
