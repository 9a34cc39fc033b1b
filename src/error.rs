use thiserror::Error;

/// Reasons a ROM image can be rejected by [`crate::cartridge::Cartridge::load`].
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("ROM image too small: {len} bytes (minimum 32 KiB)")]
    TooSmall { len: usize },

    #[error("header checksum mismatch: computed {computed:#04X}, header has {stored:#04X}")]
    HeaderChecksum { computed: u8, stored: u8 },

    #[error("unsupported cartridge type {code:#04X}")]
    UnsupportedMapper { code: u8 },

    #[error("cartridge has no battery-backed RAM")]
    NoBattery,

    #[error("no cartridge loaded")]
    NoCartridge,
}

/// Reasons a save-state payload can be rejected by
/// [`crate::gameboy::GameBoy::load_state`].
#[derive(Debug, Error)]
pub enum StateError {
    #[error("malformed save state: {0}")]
    Malformed(String),

    #[error("save state version {found} not supported (this core reads version {expected})")]
    Version { expected: u32, found: u32 },

    #[error("save state does not match the loaded cartridge")]
    Incompatible,

    #[error("no cartridge loaded")]
    NoCartridge,
}

/// An execution fault raised by the CPU.
///
/// The eleven documented-undefined opcodes lock up real hardware; the core
/// surfaces them as a latched fault instead of guessing at semantics.
/// Once latched on the [`crate::gameboy::GameBoy`] facade, `run_frame` and
/// `step` become no-ops until the host resets or reloads.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("illegal opcode {opcode:#04X} at PC={pc:#06X}")]
pub struct Fault {
    pub opcode: u8,
    pub pc: u16,
}
