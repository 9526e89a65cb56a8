// Emulator module - the top-level coordinator
//
// Owns the CPU and the bus (which owns the PPU) and drives them through the
// frame contract: for each of the 240 visible scanlines, run the CPU for a
// fixed cycle budget and then draw the line; after the visible region, one
// more budget's worth of CPU time, VBlank on (with the NMI if the game asked
// for it), twenty budgets of VBlank time, VBlank off. The CPU cycle counter
// is the single source of time; nothing here sleeps or paces wall-clock.

mod config;

pub use config::{ConfigError, EmulatorConfig, QuirksConfig, TimingConfig, VideoConfig};

use crate::bus::Bus;
use crate::cartridge::MapperHandle;
use crate::cpu::Cpu;
use crate::debug::Debugger;
use crate::ppu::{VBLANK_SCANLINES, VISIBLE_SCANLINES};

/// Main emulator structure
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    config: EmulatorConfig,
    /// Frames completed since power-on
    frames: u64,
}

impl Emulator {
    /// Create an emulator with default configuration and no debugger
    pub fn new() -> Self {
        Self::with_config(EmulatorConfig::default())
    }

    /// Create an emulator with an explicit configuration
    pub fn with_config(config: EmulatorConfig) -> Self {
        let mut cpu = Cpu::new();
        cpu.set_jmp_indirect_page_bug(config.quirks.jmp_indirect_page_bug);
        Emulator {
            cpu,
            bus: Bus::new(),
            config,
            frames: 0,
        }
    }

    /// Create an emulator with a debugger attached to the bus
    ///
    /// Pass a `Box::new(Rc::clone(&shared))` of an `Rc<RefCell<...>>`
    /// debugger to keep inspecting it from outside while the core runs.
    pub fn with_debugger(debugger: Box<dyn Debugger>) -> Self {
        let config = EmulatorConfig::default();
        let mut cpu = Cpu::new();
        cpu.set_jmp_indirect_page_bug(config.quirks.jmp_indirect_page_bug);
        Emulator {
            cpu,
            bus: Bus::with_debugger(debugger),
            config,
            frames: 0,
        }
    }

    /// Insert a cartridge: PRG to the bus, CHR and mirroring to the PPU
    pub fn insert_cartridge(&mut self, mapper: MapperHandle) {
        self.bus.attach_mapper(mapper);
        log::info!("cartridge inserted");
    }

    /// Reset CPU and PPU to their power-on state
    ///
    /// PC is reloaded from the reset vector; cartridge wiring survives.
    pub fn reset(&mut self) {
        self.cpu
            .set_jmp_indirect_page_bug(self.config.quirks.jmp_indirect_page_bug);
        self.bus.ppu_mut().reset();
        self.cpu.reset(&mut self.bus);
        self.frames = 0;
    }

    /// Execute one CPU instruction, returning its cycle cost
    pub fn step(&mut self) -> u32 {
        self.cpu.step(&mut self.bus)
    }

    /// Run one full frame: 240 drawn scanlines plus the VBlank window
    pub fn draw_frame(&mut self) {
        let budget = self.config.timing.cpu_cycles_per_scanline;

        self.bus.ppu_mut().begin_frame();

        for line in 0..VISIBLE_SCANLINES {
            self.cpu.run(&mut self.bus, budget);
            self.bus.ppu_mut().render_scanline(line);
        }

        // Post-render line
        self.cpu.run(&mut self.bus, budget + 1);

        // VBlank onset; the NMI is taken only if ctrl0 asks for it
        if self.bus.ppu_mut().start_vblank() {
            self.cpu.nmi(&mut self.bus);
        }

        self.cpu.run(&mut self.bus, budget * VBLANK_SCANLINES as u64);

        self.bus.ppu_mut().end_vblank();
        self.frames += 1;
    }

    /// The last completed frame: 256*240*4 RGBA bytes, top-left origin
    pub fn last_frame(&self) -> &[u8] {
        self.bus.ppu().last_frame()
    }

    /// Frames completed since power-on (or the last reset)
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    // ========================================
    // Component access
    // ========================================

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
