//! Packed light values and the arrays holding them.
//!
//! A cell stores two 4-bit channels in one byte: the high nibble is sky light,
//! the low nibble block (emitted) light.

use lattice_coords::{BLOCKS_PER_SECTION, COLUMNS_PER_CHUNK, InSectionPosition};

/// Packed light value: high nibble sky, low nibble block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LightLevel(pub u8);

impl LightLevel {
    /// Maximum level of either channel.
    pub const MAX: u8 = 15;
    pub const DARK: Self = Self(0);
    /// Both channels at maximum.
    pub const FULL_BRIGHT: Self = Self(0xFF);

    pub const fn new(sky: u8, block: u8) -> Self {
        Self(((sky & 0x0F) << 4) | (block & 0x0F))
    }

    #[inline]
    pub const fn sky(self) -> u8 {
        self.0 >> 4
    }

    #[inline]
    pub const fn block(self) -> u8 {
        self.0 & 0x0F
    }

    pub const fn with_sky(self, level: u8) -> Self {
        Self((self.0 & 0x0F) | ((level & 0x0F) << 4))
    }

    pub const fn with_block(self, level: u8) -> Self {
        Self((self.0 & 0xF0) | (level & 0x0F))
    }

    /// The brighter of the two channels.
    pub fn max_channel(self) -> u8 {
        self.sky().max(self.block())
    }
}

/// One of the two light channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Sky,
    Block,
}

impl Channel {
    #[inline]
    pub fn get(self, level: LightLevel) -> u8 {
        match self {
            Channel::Sky => level.sky(),
            Channel::Block => level.block(),
        }
    }

    #[inline]
    pub fn set(self, level: LightLevel, value: u8) -> LightLevel {
        match self {
            Channel::Sky => level.with_sky(value),
            Channel::Block => level.with_block(value),
        }
    }
}

/// Light of every cell in a section, indexed like [`InSectionPosition`].
#[derive(Clone, PartialEq, Eq)]
pub struct LightArray {
    data: Box<[u8; BLOCKS_PER_SECTION]>,
}

impl LightArray {
    pub fn new() -> Self {
        Self {
            data: Box::new([0; BLOCKS_PER_SECTION]),
        }
    }

    /// Wraps raw bytes received from the network. `None` unless exactly 4096.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let data: Box<[u8; BLOCKS_PER_SECTION]> = bytes.to_vec().into_boxed_slice().try_into().ok()?;
        Some(Self { data })
    }

    #[inline]
    pub fn get(&self, position: InSectionPosition) -> LightLevel {
        LightLevel(self.data[position.index()])
    }

    /// Stores `level`, returning `true` if the cell changed.
    #[inline]
    pub fn set(&mut self, position: InSectionPosition, level: LightLevel) -> bool {
        let cell = &mut self.data[position.index()];
        let changed = *cell != level.0;
        *cell = level.0;
        changed
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn is_dark(&self) -> bool {
        self.data.iter().all(|&cell| cell == 0)
    }
}

impl Default for LightArray {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LightArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lit = self.data.iter().filter(|&&cell| cell != 0).count();
        f.debug_struct("LightArray").field("lit_cells", &lit).finish()
    }
}

/// Which pseudo-section a [`BorderLight`] stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VerticalBorder {
    /// Just below the lowest section.
    Bottom,
    /// Just above the highest section.
    Top,
}

/// Per-column light of the layer just outside the chunk's vertical range.
///
/// Unknown borders read as full bright.
#[derive(Clone, PartialEq, Eq)]
pub struct BorderLight {
    data: Box<[u8; COLUMNS_PER_CHUNK]>,
}

impl BorderLight {
    pub fn full_bright() -> Self {
        Self {
            data: Box::new([LightLevel::FULL_BRIGHT.0; COLUMNS_PER_CHUNK]),
        }
    }

    /// Wraps raw bytes. `None` unless exactly 256.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let data: Box<[u8; COLUMNS_PER_CHUNK]> = bytes.to_vec().into_boxed_slice().try_into().ok()?;
        Some(Self { data })
    }

    #[inline]
    pub fn get(&self, xz_index: usize) -> LightLevel {
        LightLevel(self.data[xz_index])
    }

    #[inline]
    pub fn set(&mut self, xz_index: usize, level: LightLevel) {
        self.data[xz_index] = level.0;
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }
}

impl Default for BorderLight {
    fn default() -> Self {
        Self::full_bright()
    }
}

impl std::fmt::Debug for BorderLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BorderLight").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
