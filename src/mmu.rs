use serde::{Deserialize, Serialize};

use crate::{apu::Apu, cartridge::Cartridge, input::Input, ppu::Ppu, timer::Timer};

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;

/// The memory bus: owns internal memories and the memory-mapped devices,
/// and decodes 16-bit addresses to their owner.
///
/// The bus itself consumes no cycles; the CPU accounts for memory-access
/// timing in its per-instruction cycle costs, and [`Mmu::tick`] fans the
/// resulting cycle count out to the devices.
pub struct Mmu {
    pub cart: Option<Cartridge>,
    wram: [u8; WRAM_SIZE],
    hram: [u8; HRAM_SIZE],
    /// Interrupt flag (0xFF0F), low five bits; reads OR in the high bits.
    pub if_reg: u8,
    /// Interrupt enable (0xFFFF), low five bits.
    pub ie_reg: u8,
    // Serial data/control latches. Link-cable transfer is not emulated;
    // software can still write and read back the registers.
    sb: u8,
    sc: u8,
    pub ppu: Ppu,
    pub apu: Apu,
    pub timer: Timer,
    pub input: Input,
}

impl Mmu {
    pub fn new() -> Self {
        let mut timer = Timer::new();
        // Post-boot DIV phase.
        timer.div = 0xABCC;
        Self {
            cart: None,
            wram: [0; WRAM_SIZE],
            hram: [0; HRAM_SIZE],
            // V-blank was requested by the time the boot ROM hands over.
            if_reg: 0x01,
            ie_reg: 0,
            sb: 0,
            sc: 0x7E,
            ppu: Ppu::new(),
            apu: Apu::new(),
            timer,
            input: Input::new(),
        }
    }

    pub fn load_cart(&mut self, cart: Cartridge) {
        self.cart = Some(cart);
    }

    /// Pure byte read; never mutates machine state.
    pub fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                self.cart.as_ref().map(|c| c.read(addr)).unwrap_or(0xFF)
            }
            0x8000..=0x9FFF => {
                if self.ppu.vram_accessible() {
                    self.ppu.vram[(addr - 0x8000) as usize]
                } else {
                    0xFF
                }
            }
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize],
            // Echo RAM aliases work RAM.
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize],
            0xFE00..=0xFE9F => {
                if self.ppu.oam_accessible() {
                    self.ppu.oam[(addr - 0xFE00) as usize]
                } else {
                    0xFF
                }
            }
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00 => self.input.read(),
            0xFF01 => self.sb,
            0xFF02 => self.sc | 0x7E,
            0xFF04..=0xFF07 => self.timer.read(addr),
            0xFF0F => self.if_reg | 0xE0,
            0xFF10..=0xFF3F => self.apu.read_reg(addr),
            0xFF40..=0xFF4B => self.ppu.read_reg(addr),
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize],
            0xFFFF => self.ie_reg | 0xE0,
            _ => 0xFF,
        }
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        match addr {
            // ROM-range writes are bank-select control, routed to the MBC.
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                if let Some(cart) = self.cart.as_mut() {
                    cart.write(addr, val);
                }
            }
            0x8000..=0x9FFF => {
                if self.ppu.vram_accessible() {
                    self.ppu.vram[(addr - 0x8000) as usize] = val;
                }
            }
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize] = val,
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize] = val,
            0xFE00..=0xFE9F => {
                if self.ppu.oam_accessible() {
                    self.ppu.oam[(addr - 0xFE00) as usize] = val;
                }
            }
            0xFEA0..=0xFEFF => {}
            0xFF00 => self.input.write(val),
            0xFF01 => self.sb = val,
            0xFF02 => self.sc = val,
            0xFF04..=0xFF07 => self.timer.write(addr, val, &mut self.if_reg),
            0xFF0F => self.if_reg = val & 0x1F,
            0xFF10..=0xFF3F => self.apu.write_reg(addr, val),
            0xFF46 => self.oam_dma(val),
            0xFF40..=0xFF4B => self.ppu.write_reg(addr, val),
            // Boot-ROM overlay disable; the core starts post-boot, so the
            // overlay is never mapped in the first place.
            0xFF50 => {}
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = val,
            0xFFFF => self.ie_reg = val & 0x1F,
            _ => {}
        }
    }

    /// Reset the divider (DIV write or STOP).
    pub fn reset_div(&mut self) {
        self.timer.reset_div(&mut self.if_reg);
    }

    /// OAM DMA (0xFF46): copy 160 bytes from `val << 8` into the sprite
    /// table, taking effect atomically at the write instant.
    fn oam_dma(&mut self, val: u8) {
        self.ppu.dma = val;
        let base = (val as u16) << 8;
        for i in 0..0xA0u16 {
            let mut src = base.wrapping_add(i);
            // Sources above 0xDFFF read through the echo region.
            if src >= 0xE000 {
                src -= 0x2000;
            }
            self.ppu.oam[i as usize] = self.dma_read(src);
        }
    }

    /// Raw read used by the DMA engine, bypassing PPU access gating.
    fn dma_read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                self.cart.as_ref().map(|c| c.read(addr)).unwrap_or(0xFF)
            }
            0x8000..=0x9FFF => self.ppu.vram[(addr - 0x8000) as usize],
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize],
            _ => 0xFF,
        }
    }

    /// Fan a completed instruction's cycle count out to the devices, in
    /// the fixed order PPU, APU, timer, cartridge clock.
    pub fn tick(&mut self, cycles: u32) {
        self.ppu.step(cycles, &mut self.if_reg);
        self.apu.step(cycles);
        self.timer.step(cycles, &mut self.if_reg);
        if let Some(cart) = self.cart.as_mut() {
            cart.step_rtc(cycles);
        }
    }

    pub(crate) fn save_state(&self) -> BusState {
        BusState {
            wram: self.wram.to_vec(),
            hram: self.hram.to_vec(),
            if_reg: self.if_reg,
            ie_reg: self.ie_reg,
            sb: self.sb,
            sc: self.sc,
        }
    }

    pub(crate) fn load_state(&mut self, st: &BusState) -> Result<(), crate::StateError> {
        if st.wram.len() != WRAM_SIZE || st.hram.len() != HRAM_SIZE {
            return Err(crate::StateError::Malformed(
                "bus RAM section has wrong shape".into(),
            ));
        }
        self.wram.copy_from_slice(&st.wram);
        self.hram.copy_from_slice(&st.hram);
        self.if_reg = st.if_reg & 0x1F;
        self.ie_reg = st.ie_reg & 0x1F;
        self.sb = st.sb;
        self.sc = st.sc;
        Ok(())
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize)]
pub(crate) struct BusState {
    wram: Vec<u8>,
    hram: Vec<u8>,
    if_reg: u8,
    ie_reg: u8,
    sb: u8,
    sc: u8,
}
