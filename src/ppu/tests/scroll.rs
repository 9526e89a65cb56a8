//! Loopy v/t/x transitions

use super::*;

// ========================================
// Building t via $2005 / $2000
// ========================================

#[test]
fn test_scroll_first_write_sets_coarse_and_fine_x() {
    let mut ppu = Ppu::new();
    // X scroll $7D: coarse 15, fine 5
    ppu.write_register(SCROLL, 0x7D);
    assert_eq!(ppu.t & 0x001F, 15);
    assert_eq!(ppu.fine_x, 5);
    assert!(ppu.write_latch, "toggle flipped to second write");
}

#[test]
fn test_scroll_second_write_sets_coarse_and_fine_y() {
    let mut ppu = Ppu::new();
    ppu.write_register(SCROLL, 0x00);
    // Y scroll $5E: coarse 11, fine 6
    ppu.write_register(SCROLL, 0x5E);
    assert_eq!((ppu.t >> 5) & 0x1F, 11);
    assert_eq!((ppu.t >> 12) & 0x07, 6);
    assert!(!ppu.write_latch, "toggle back to first write");
}

#[test]
fn test_full_scroll_assembly() {
    // The classic worked example: NT 2, X=$7D, Y=$5E
    let mut ppu = Ppu::new();
    ppu.write_register(CTRL0, 0x02);
    ppu.write_register(SCROLL, 0x7D);
    ppu.write_register(SCROLL, 0x5E);
    assert_eq!(ppu.t, 0b110_10_01011_01111);
    assert_eq!(ppu.fine_x, 5);
}

// ========================================
// v movement during rendering
// ========================================

#[test]
fn test_begin_frame_copies_t_only_when_rendering() {
    let mut ppu = Ppu::new();
    set_vram_addr(&mut ppu, 0x2108); // v = t = $2108
    ppu.v = 0;

    ppu.begin_frame();
    assert_eq!(ppu.v, 0, "renderers disabled: v untouched");

    ppu.write_register(CTRL1, 0x08);
    ppu.begin_frame();
    assert_eq!(ppu.v, 0x2108, "background on: t adopted");
}

#[test]
fn test_horizontal_copy_restores_coarse_x_and_nt() {
    let mut ppu = Ppu::new();
    ppu.t = 0x041F; // horizontal NT + coarse X 31
    ppu.v = 0x7BE0; // everything else set, horizontal bits clear

    ppu.copy_horizontal_bits();
    assert_eq!(ppu.v, 0x7FFF, "only bits 0-4 and 10 arrive from t");
}

#[test]
fn test_coarse_x_increment() {
    let mut ppu = Ppu::new();
    ppu.v = 0;
    ppu.increment_coarse_x();
    assert_eq!(ppu.v, 1);
}

#[test]
fn test_coarse_x_wrap_switches_nametable() {
    let mut ppu = Ppu::new();
    ppu.v = 31; // coarse X at the right edge
    ppu.increment_coarse_x();
    assert_eq!(ppu.v & 0x001F, 0, "coarse X wraps");
    assert_eq!(ppu.v & 0x0400, 0x0400, "horizontal nametable flipped");

    ppu.v = 0x041F;
    ppu.increment_coarse_x();
    assert_eq!(ppu.v & 0x0400, 0, "flips back");
}

#[test]
fn test_fine_y_increment() {
    let mut ppu = Ppu::new();
    ppu.v = 0x0000;
    ppu.increment_fine_y();
    assert_eq!(ppu.v, 0x1000, "fine Y +1");
}

#[test]
fn test_fine_y_carry_into_coarse_y() {
    let mut ppu = Ppu::new();
    ppu.v = 0x7000; // fine Y 7, coarse Y 0
    ppu.increment_fine_y();
    assert_eq!(ppu.v & 0x7000, 0, "fine Y wrapped");
    assert_eq!((ppu.v >> 5) & 0x1F, 1, "coarse Y advanced");
}

#[test]
fn test_coarse_y_29_switches_vertical_nametable() {
    let mut ppu = Ppu::new();
    ppu.v = 0x7000 | (29 << 5);
    ppu.increment_fine_y();
    assert_eq!((ppu.v >> 5) & 0x1F, 0, "coarse Y reset");
    assert_eq!(ppu.v & 0x0800, 0x0800, "vertical nametable flipped");
}

#[test]
fn test_coarse_y_31_wraps_without_switch() {
    // Coarse Y 30/31 is only reachable by writing v through $2006; the
    // wrap must not flip the nametable
    let mut ppu = Ppu::new();
    ppu.v = 0x7000 | (31 << 5);
    ppu.increment_fine_y();
    assert_eq!((ppu.v >> 5) & 0x1F, 0);
    assert_eq!(ppu.v & 0x0800, 0, "no nametable switch from row 31");
}

#[test]
fn test_scanline_walk_is_idempotent_on_fine_x() {
    // 256 pixels = 32 exact tiles: after one background scanline the
    // working fine X is back where the x register points
    let mut ppu = ppu_with_chr(Mirroring::Horizontal);
    ppu.write_register(CTRL1, 0x08);
    ppu.write_register(SCROLL, 0x05); // fine X = 5
    ppu.write_register(SCROLL, 0x00);

    ppu.begin_frame();
    ppu.render_scanline(0);
    assert_eq!(ppu.fine_x, 5, "fine X register never drifts");
}

#[test]
fn test_next_2007_access_targets_v() {
    // After two $2006 writes, v == t and the next $2007 access uses exactly
    // that address
    let mut ppu = ppu_with_chr(Mirroring::Horizontal);
    set_vram_addr(&mut ppu, 0x2345);
    assert_eq!(ppu.v, ppu.t);

    ppu.write_register(DATA, 0x5C);
    assert_eq!(ppu.read_vram(0x2345), 0x5C);
}
