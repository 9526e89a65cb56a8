// PPU module - 2C02 Picture Processing Unit
//
// A scanline-driven PPU. The emulator runs the CPU for a fixed cycle budget,
// then asks the PPU to draw one scanline; after the 240 visible lines come a
// post-render line, the VBlank window (where the NMI is raised), and the
// VBlank clear. Register traffic from the CPU arrives between scanlines,
// which is accurate enough for the scroll and status contracts games rely
// on: VBlank/NMI timing, sprite-0 hit, sprite overflow, and the shared
// $2005/$2006 write toggle.
//
// ## Register Map
//
// | Address | Name       | Access  | Description               |
// |---------|------------|---------|---------------------------|
// | $2000   | ctrl0      | Write   | control: NT select, increment, pattern tables, sprite size, NMI |
// | $2001   | ctrl1      | Write   | masks: greyscale, left-edge clips, enables, emphasis |
// | $2002   | status     | Read    | overflow, sprite-0 hit, VBlank |
// | $2003   | OAMADDR    | Write   | OAM address               |
// | $2004   | OAMDATA    | R/W     | OAM data, auto-advancing  |
// | $2005   | scroll     | Write x2| fine/coarse scroll into t |
// | $2006   | address    | Write x2| VRAM address into t, then v |
// | $2007   | data       | R/W     | VRAM data at v, buffered reads |
//
// Registers are mirrored through $3FFF; $4014 (OAM DMA) is handled on the
// bus because it reads CPU memory.

mod constants;
mod frame;
mod memory;
mod palette;
mod registers;
mod rendering;
mod scroll;

pub use constants::{SCREEN_HEIGHT, SCREEN_WIDTH, VBLANK_SCANLINES, VISIBLE_SCANLINES};
pub use frame::{FrameBuffer, INFO_BACKGROUND, INFO_SPRITE};
pub use palette::{palette_to_rgb, palette_to_rgba, NES_PALETTE};

use crate::cartridge::{MapperHandle, Mirroring};
use constants::*;

/// PPU state: register file, scroll machine, memories, and the frame buffer
pub struct Ppu {
    // Registers ($2000-$2003)
    /// $2000: nametable select (0-1), VRAM increment (2), sprite pattern
    /// table (3), background pattern table (4), sprite size (5), NMI on
    /// VBlank (7)
    ctrl0: u8,
    /// $2001: greyscale (0), left-edge clips (1-2), background enable (3),
    /// sprite enable (4), emphasis (5-7). Greyscale and emphasis are
    /// recorded but not applied to output.
    ctrl1: u8,
    /// $2002: sprite overflow (5), sprite-0 hit (6), VBlank (7)
    status: u8,
    /// $2003: OAM address
    oam_addr: u8,

    // Internal scroll state (loopy v/t/x plus the shared write toggle)
    /// Current VRAM address / scroll position (15 bits)
    v: u16,
    /// Temporary VRAM address: the programmed top-left scroll origin
    t: u16,
    /// Fine X scroll (3 bits)
    fine_x: u8,
    /// Shared first/second write toggle for $2005/$2006; a $2002 read resets it
    write_latch: bool,
    /// One-byte buffer delaying non-palette $2007 reads
    read_buffer: u8,

    // Memories
    /// Nametable backing store: all four tables, folded by mirroring
    nametables: [u8; NAMETABLE_SIZE * NAMETABLE_COUNT],
    /// 32 bytes of palette indices
    palette_ram: [u8; PALETTE_SIZE],
    /// Object attribute memory: 64 sprites x 4 bytes
    oam: [u8; 256],

    /// Nametable arrangement, adopted from the cartridge
    mirroring: Mirroring,
    /// CHR access, when a cartridge is inserted
    mapper: Option<MapperHandle>,

    // Output
    frame: FrameBuffer,
    /// Scanline currently being drawn (0-239)
    scanline: u16,
}

impl Ppu {
    /// Create a PPU in its power-on state (horizontal mirroring, no CHR)
    pub fn new() -> Self {
        Ppu {
            ctrl0: 0,
            ctrl1: 0,
            status: 0,
            oam_addr: 0,
            v: 0,
            t: 0,
            fine_x: 0,
            write_latch: false,
            read_buffer: 0,
            nametables: [0; NAMETABLE_SIZE * NAMETABLE_COUNT],
            palette_ram: [0; PALETTE_SIZE],
            oam: [0; 256],
            mirroring: Mirroring::Horizontal,
            mapper: None,
            frame: FrameBuffer::new(),
            scanline: 0,
        }
    }

    /// Reset registers, scroll state and memories to power-on values
    ///
    /// Mirroring and the mapper are cartridge properties and survive.
    pub fn reset(&mut self) {
        self.ctrl0 = 0;
        self.ctrl1 = 0;
        self.status = 0;
        self.oam_addr = 0;
        self.v = 0;
        self.t = 0;
        self.fine_x = 0;
        self.write_latch = false;
        self.read_buffer = 0;
        self.nametables = [0; NAMETABLE_SIZE * NAMETABLE_COUNT];
        self.palette_ram = [0; PALETTE_SIZE];
        self.oam = [0; 256];
        self.frame = FrameBuffer::new();
        self.scanline = 0;
    }

    /// Attach the cartridge's CHR side and adopt its mirroring
    pub fn set_mapper(&mut self, mapper: MapperHandle) {
        self.mirroring = mapper.borrow().mirroring();
        self.mapper = Some(mapper);
    }

    /// Override the mirroring arrangement (tests, mappers with latches)
    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    // ========================================
    // OAM
    // ========================================

    /// Bulk-load OAM from a DMA page
    ///
    /// Bytes land at the current OAM address onward, wrapping, which is the
    /// same path 256 consecutive $2004 writes would take.
    pub fn oam_dma(&mut self, data: &[u8; 256]) {
        for (i, &byte) in data.iter().enumerate() {
            self.oam[self.oam_addr.wrapping_add(i as u8) as usize] = byte;
        }
    }

    /// Read one OAM byte directly (presentation/debug use)
    pub fn read_oam(&self, addr: u8) -> u8 {
        self.oam[addr as usize]
    }

    /// Write one OAM byte directly
    pub fn write_oam(&mut self, addr: u8, data: u8) {
        self.oam[addr as usize] = data;
    }

    // ========================================
    // Frame lifecycle, driven by the emulator
    // ========================================

    /// Start a new frame
    ///
    /// Adopts the programmed scroll origin (t -> v) when either renderer is
    /// enabled, clears VBlank and both sprite flags, and wipes the frame to
    /// the universal background color.
    pub fn begin_frame(&mut self) {
        if self.rendering_enabled() {
            self.copy_t_to_v();
        }
        self.status &= !(STATUS_VBLANK | STATUS_SPRITE_ZERO_HIT | STATUS_SPRITE_OVERFLOW);
        self.scanline = 0;
        let backdrop = self.backdrop_color();
        self.frame.clear(backdrop);
    }

    /// Enter VBlank
    ///
    /// Sets the status bit and reports whether ctrl0 asks for an NMI; the
    /// emulator delivers it to the CPU.
    pub fn start_vblank(&mut self) -> bool {
        self.status |= STATUS_VBLANK;
        self.ctrl0 & CTRL0_NMI_ON_VBLANK != 0
    }

    /// Leave VBlank
    pub fn end_vblank(&mut self) {
        self.status &= !STATUS_VBLANK;
    }

    /// The finished frame: packed RGBA, row-major, top-left origin
    pub fn last_frame(&self) -> &[u8] {
        self.frame.data()
    }

    /// RGBA bytes of one output pixel
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        self.frame.pixel(x, y)
    }

    /// Scanline currently (or last) drawn
    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    // ========================================
    // ctrl0 / ctrl1 decoding
    // ========================================

    #[inline]
    pub(crate) fn rendering_enabled(&self) -> bool {
        self.ctrl1 & (CTRL1_BACKGROUND_ENABLE | CTRL1_SPRITE_ENABLE) != 0
    }

    #[inline]
    pub(crate) fn show_background(&self) -> bool {
        self.ctrl1 & CTRL1_BACKGROUND_ENABLE != 0
    }

    #[inline]
    pub(crate) fn show_sprites(&self) -> bool {
        self.ctrl1 & CTRL1_SPRITE_ENABLE != 0
    }

    /// Background pattern table base ($0000 or $1000)
    #[inline]
    pub(crate) fn background_pattern_base(&self) -> u16 {
        if self.ctrl0 & CTRL0_BACKGROUND_TABLE != 0 {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite pattern table base for 8x8 sprites
    #[inline]
    pub(crate) fn sprite_pattern_base(&self) -> u16 {
        if self.ctrl0 & CTRL0_SPRITE_TABLE != 0 {
            0x1000
        } else {
            0x0000
        }
    }

    /// Sprite height in pixels (8, or 16 with ctrl0 bit 5)
    #[inline]
    pub(crate) fn sprite_height(&self) -> usize {
        if self.ctrl0 & CTRL0_SPRITE_SIZE_8X16 != 0 {
            16
        } else {
            8
        }
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
