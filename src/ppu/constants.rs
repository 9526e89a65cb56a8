// PPU constants

/// Screen width in pixels
pub const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels
pub const SCREEN_HEIGHT: usize = 240;

/// Visible scanlines per frame
pub const VISIBLE_SCANLINES: u16 = 240;

/// Scanlines worth of CPU time spent inside VBlank
pub const VBLANK_SCANLINES: u16 = 20;

/// Size of one nametable in bytes (960 tiles + 64 attributes)
pub(crate) const NAMETABLE_SIZE: usize = 1024;

/// Number of logical nametables (the backing store holds all four)
pub(crate) const NAMETABLE_COUNT: usize = 4;

/// Offset of the attribute table within a nametable
pub(crate) const ATTRIBUTE_OFFSET: usize = 960;

/// Nametable width in tiles
pub(crate) const NAMETABLE_WIDTH: usize = 32;

/// Size of palette RAM in bytes
pub(crate) const PALETTE_SIZE: usize = 32;

/// Tile edge length in pixels
pub(crate) const TILE_SIZE: usize = 8;

/// Hard per-scanline sprite limit
pub(crate) const SPRITES_PER_LINE: usize = 8;

// ========================================
// Status register bits ($2002)
// ========================================

pub(crate) const STATUS_SPRITE_OVERFLOW: u8 = 0x20;
pub(crate) const STATUS_SPRITE_ZERO_HIT: u8 = 0x40;
pub(crate) const STATUS_VBLANK: u8 = 0x80;

// ========================================
// ctrl0 bits ($2000)
// ========================================

pub(crate) const CTRL0_NAMETABLE: u8 = 0x03;
pub(crate) const CTRL0_INCREMENT_32: u8 = 0x04;
pub(crate) const CTRL0_SPRITE_TABLE: u8 = 0x08;
pub(crate) const CTRL0_BACKGROUND_TABLE: u8 = 0x10;
pub(crate) const CTRL0_SPRITE_SIZE_8X16: u8 = 0x20;
pub(crate) const CTRL0_NMI_ON_VBLANK: u8 = 0x80;

// ========================================
// ctrl1 bits ($2001)
// ========================================

pub(crate) const CTRL1_BACKGROUND_LEFT: u8 = 0x02;
pub(crate) const CTRL1_SPRITES_LEFT: u8 = 0x04;
pub(crate) const CTRL1_BACKGROUND_ENABLE: u8 = 0x08;
pub(crate) const CTRL1_SPRITE_ENABLE: u8 = 0x10;
