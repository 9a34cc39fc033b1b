//! Save-state format.
//!
//! Snapshots are explicit DTO structs serialized as JSON, so the payload
//! is self-describing and survives in-memory layout changes. A magic tag,
//! format version, and cartridge identity gate restoration.

use serde::{Deserialize, Serialize};

use crate::{
    apu::ApuState, cartridge::CartridgeState, cpu::CpuState, error::StateError,
    gameboy::GameBoy, input::InputState, mmu::BusState, ppu::PpuState, timer::TimerState,
};

const STATE_MAGIC: &str = "dotmatrix";
const STATE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct SaveState {
    magic: String,
    version: u32,
    cart: CartIdentity,
    cpu: CpuState,
    bus: BusState,
    timer: TimerState,
    input: InputState,
    ppu: PpuState,
    apu: ApuState,
    cartridge: CartridgeState,
}

/// Enough of the cartridge header to refuse restoring a state onto a
/// different ROM.
#[derive(Serialize, Deserialize, PartialEq, Eq)]
struct CartIdentity {
    title: String,
    header_checksum: u8,
    rom_len: usize,
}

pub(crate) fn save(gb: &GameBoy) -> Result<Vec<u8>, StateError> {
    let cart = gb.mmu.cart.as_ref().ok_or(StateError::NoCartridge)?;
    let (title, header_checksum, rom_len) = cart.identity();
    let state = SaveState {
        magic: STATE_MAGIC.to_string(),
        version: STATE_VERSION,
        cart: CartIdentity {
            title,
            header_checksum,
            rom_len,
        },
        cpu: gb.cpu.save_state(),
        bus: gb.mmu.save_state(),
        timer: gb.mmu.timer.save_state(),
        input: gb.mmu.input.save_state(),
        ppu: gb.mmu.ppu.save_state(),
        apu: gb.mmu.apu.save_state(),
        cartridge: cart.save_state(),
    };
    serde_json::to_vec(&state).map_err(|e| StateError::Malformed(e.to_string()))
}

pub(crate) fn load(gb: &mut GameBoy, bytes: &[u8]) -> Result<(), StateError> {
    let state: SaveState =
        serde_json::from_slice(bytes).map_err(|e| StateError::Malformed(e.to_string()))?;

    if state.magic != STATE_MAGIC {
        return Err(StateError::Malformed("bad magic".into()));
    }
    if state.version != STATE_VERSION {
        return Err(StateError::Version {
            expected: STATE_VERSION,
            found: state.version,
        });
    }

    let cart = gb.mmu.cart.as_mut().ok_or(StateError::NoCartridge)?;
    let (title, header_checksum, rom_len) = cart.identity();
    let identity = CartIdentity {
        title,
        header_checksum,
        rom_len,
    };
    if state.cart != identity {
        return Err(StateError::Incompatible);
    }

    // Each fallible section validates its shape before touching its own
    // state; identity and version were already checked above.
    cart.load_state(&state.cartridge)?;
    gb.mmu.load_state(&state.bus)?;
    gb.mmu.ppu.load_state(&state.ppu)?;
    gb.mmu.apu.load_state(&state.apu)?;
    gb.mmu.timer.load_state(&state.timer);
    gb.mmu.input.load_state(&state.input);
    gb.cpu.load_state(&state.cpu);
    Ok(())
}
