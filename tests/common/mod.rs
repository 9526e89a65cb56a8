// Common test utilities for the integration suites
//
// Builds a runnable system without any ROM files: a program image placed at
// $8000 with its reset vector wired, optionally on a real cartridge with
// CHR-RAM so PPU-side tests can upload tiles.

#![allow(dead_code)]

use famicore::{into_handle, Emulator, FlatCartridge, Mirroring};

/// Upper bound on instructions for run-until loops
pub const MAX_TEST_STEPS: u32 = 100_000;

/// Route core logging into the test harness (`RUST_LOG=trace` to see it)
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An emulator with `program` at $8000 (no cartridge, writable fallback)
pub fn system_with_program(program: &[u8]) -> Emulator {
    init_logging();
    let mut emulator = Emulator::new();
    emulator.bus_mut().load_program(program, 0x3FE0);
    emulator.bus_mut().write_u16(0xFFFC, 0x8000);
    emulator.reset();
    emulator
}

/// An emulator with `program` on a FlatCartridge (CHR-RAM available)
pub fn system_with_cartridge(program: &[u8], mirroring: Mirroring) -> Emulator {
    init_logging();
    let mut prg = vec![0u8; 0x8000];
    prg[..program.len()].copy_from_slice(program);
    // Reset vector inside the 32KB image: $FFFC -> offset $7FFC
    prg[0x7FFC] = 0x00;
    prg[0x7FFD] = 0x80;

    let mut emulator = Emulator::new();
    emulator.insert_cartridge(into_handle(FlatCartridge::new(prg, mirroring)));
    emulator.reset();
    emulator
}

/// Step until PC reaches `target` or the step budget runs out
///
/// Panics on timeout so a wrong branch shows up as a test failure, not a
/// hang.
pub fn run_until_pc(emulator: &mut Emulator, target: u16) {
    for _ in 0..MAX_TEST_STEPS {
        if emulator.cpu().pc == target {
            return;
        }
        emulator.step();
    }
    panic!(
        "PC never reached ${:04X} (stuck at ${:04X})",
        target,
        emulator.cpu().pc
    );
}
