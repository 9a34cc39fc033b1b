use dotmatrix::GameBoy;

/// Build a blank ROM of `banks` 16 KiB banks with a valid header.
#[allow(dead_code)]
pub fn blank_rom(banks: usize, cart_type: u8, ram_size_code: u8) -> Vec<u8> {
    let mut rom = vec![0u8; banks.max(2) * 0x4000];
    rom[0x0134..0x0138].copy_from_slice(b"TEST");
    rom[0x0147] = cart_type;
    rom[0x0148] = (banks.max(2) / 2).trailing_zeros() as u8;
    rom[0x0149] = ram_size_code;
    fix_checksum(&mut rom);
    rom
}

/// Recompute the header checksum byte at 0x014D.
#[allow(dead_code)]
pub fn fix_checksum(rom: &mut [u8]) {
    let mut x = 0u8;
    for &b in &rom[0x0134..=0x014C] {
        x = x.wrapping_sub(b).wrapping_sub(1);
    }
    rom[0x014D] = x;
}

/// A ROM whose entry point spins in a tight `JR -2` loop.
#[allow(dead_code)]
pub fn spin_rom() -> Vec<u8> {
    let mut rom = blank_rom(2, 0x00, 0x00);
    rom[0x0100] = 0x18; // JR
    rom[0x0101] = 0xFE; // -2
    rom
}

#[allow(dead_code)]
pub fn load_gb(rom: Vec<u8>) -> GameBoy {
    let mut gb = GameBoy::new();
    gb.load_cartridge(rom).expect("test ROM should load");
    gb
}
