// famicore - NES emulation core
// 6502 CPU interpreter, 2C02 PPU, and the memory bus that joins them.
//
// The core never talks to a window or an audio device: it runs CPU and PPU
// in lockstep one frame at a time and publishes a packed RGBA frame buffer
// for an external presenter. Cartridge, controllers and APU are external
// collaborators reached through the interfaces in `cartridge` and `bus`.

// Public modules
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod emulator;
pub mod ppu;

// Re-export main types for convenience
pub use bus::Bus;
pub use cartridge::{into_handle, FlatCartridge, Mapper, MapperHandle, Mirroring};
pub use cpu::Cpu;
pub use debug::{AccessKind, BreakpointDebugger, Debugger, MemoryAccess, NullDebugger};
pub use emulator::{ConfigError, Emulator, EmulatorConfig};
pub use ppu::Ppu;
