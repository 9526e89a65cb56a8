// PPU memory dispatch (the 14-bit VRAM space)
//
// $0000-$1FFF pattern tables (cartridge CHR via the mapper)
// $2000-$2FFF nametables, folded through the cartridge's mirroring
// $3000-$3EFF mirrors of the nametables
// $3F00-$3FFF palette RAM with its own aliasing

use super::constants::NAMETABLE_SIZE;
use super::Ppu;

impl Ppu {
    /// Resolve a nametable address ($2000-$2FFF) to a backing-store index
    ///
    /// The logical table (0-3) is mapped to a physical one by the
    /// cartridge's mirroring descriptor on every access; four-screen
    /// carts keep all four tables distinct.
    pub(crate) fn nametable_index(&self, addr: u16) -> usize {
        let addr = (addr & 0x0FFF) as usize;
        let logical = addr / NAMETABLE_SIZE;
        let offset = addr % NAMETABLE_SIZE;
        self.mirroring.physical_nametable(logical) * NAMETABLE_SIZE + offset
    }

    /// Resolve a palette address ($3F00-$3FFF) to an index into the 32 bytes
    ///
    /// $3F10/$3F14/$3F18/$3F1C alias $3F00/$3F04/$3F08/$3F0C: entry 0 of
    /// each sprite sub-palette is the universal background color.
    pub(crate) fn palette_index(&self, addr: u16) -> usize {
        let index = (addr & 0x001F) as usize;
        if index >= 16 && index % 4 == 0 {
            index - 16
        } else {
            index
        }
    }

    /// Read a CHR byte through the mapper (0 when no cartridge is present)
    pub(crate) fn chr_read(&self, addr: u16) -> u8 {
        match &self.mapper {
            Some(mapper) => mapper.borrow().ppu_read(addr & 0x1FFF),
            None => 0,
        }
    }

    /// Read a byte of PPU memory
    pub(crate) fn read_vram(&self, addr: u16) -> u8 {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => self.chr_read(addr),
            0x2000..=0x2FFF => self.nametables[self.nametable_index(addr)],
            0x3000..=0x3EFF => self.nametables[self.nametable_index(addr - 0x1000)],
            0x3F00..=0x3FFF => self.palette_ram[self.palette_index(addr)],
            _ => unreachable!(),
        }
    }

    /// Write a byte of PPU memory
    pub(crate) fn write_vram(&mut self, addr: u16, data: u8) {
        let addr = addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => {
                if let Some(mapper) = &self.mapper {
                    mapper.borrow_mut().ppu_write(addr, data);
                }
            }
            0x2000..=0x2FFF => {
                let index = self.nametable_index(addr);
                self.nametables[index] = data;
            }
            0x3000..=0x3EFF => {
                let index = self.nametable_index(addr - 0x1000);
                self.nametables[index] = data;
            }
            0x3F00..=0x3FFF => {
                let index = self.palette_index(addr);
                self.palette_ram[index] = data;
            }
            _ => unreachable!(),
        }
    }
}
