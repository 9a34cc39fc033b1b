use crate::{
    cartridge::Cartridge,
    cpu::Cpu,
    error::{CartridgeError, Fault, StateError},
    input::Button,
    mmu::Mmu,
    ppu::FRAME_CYCLES,
    state,
};

/// The assembled machine: sole owner of every subsystem.
///
/// The frame loop calls [`Cpu::step`] for one instruction, then feeds the
/// returned cycle count to the PPU, APU, timer and cartridge clock via the
/// bus, until the PPU reports a completed frame.
pub struct GameBoy {
    pub cpu: Cpu,
    pub mmu: Mmu,
    fault: Option<Fault>,
}

impl GameBoy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            mmu: Mmu::new(),
            fault: None,
        }
    }

    /// Validate and load a ROM image, resetting the machine around it.
    pub fn load_cartridge(&mut self, bytes: Vec<u8>) -> Result<(), CartridgeError> {
        let cart = Cartridge::load(bytes)?;
        self.cpu = Cpu::new();
        self.mmu = Mmu::new();
        self.mmu.load_cart(cart);
        self.fault = None;
        Ok(())
    }

    /// Re-initialize all subsystems to the post-boot state, preserving the
    /// loaded cartridge. Battery-backed RAM and the RTC survive the reset;
    /// MBC banking state does not.
    pub fn reset(&mut self) {
        let mut cart = self.mmu.cart.take();
        if let Some(cart) = cart.as_mut() {
            cart.reset();
        }
        self.cpu = Cpu::new();
        self.mmu = Mmu::new();
        self.mmu.cart = cart;
        self.fault = None;
    }

    /// The latched CPU fault, if any. While set, `run_frame` and `step`
    /// are no-ops.
    pub fn fault(&self) -> Option<Fault> {
        self.fault
    }

    /// Advance the simulation until one complete frame has been produced
    /// (or, as a backstop, a full frame's worth of cycles has elapsed).
    /// Idempotent between frames; returns promptly and performs no I/O.
    pub fn run_frame(&mut self) {
        if self.fault.is_some() {
            return;
        }
        self.mmu.ppu.clear_frame_flag();

        let mut frame_cycles = 0u32;
        while frame_cycles < FRAME_CYCLES {
            let cycles = match self.cpu.step(&mut self.mmu) {
                Ok(cycles) => cycles,
                Err(fault) => {
                    log::warn!("core halted: {fault}");
                    self.fault = Some(fault);
                    return;
                }
            };
            self.mmu.tick(cycles);
            frame_cycles += cycles;
            if self.mmu.ppu.frame_ready() {
                break;
            }
        }
    }

    /// Advance by one CPU instruction; primarily for debugging. Returns
    /// the cycles consumed (0 while faulted).
    pub fn step(&mut self) -> u32 {
        if self.fault.is_some() {
            return 0;
        }
        match self.cpu.step(&mut self.mmu) {
            Ok(cycles) => {
                self.mmu.tick(cycles);
                cycles
            }
            Err(fault) => {
                log::warn!("core halted: {fault}");
                self.fault = Some(fault);
                0
            }
        }
    }

    /// Total clock cycles executed since power-on or the last reset.
    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Read-only view of the 160x144 RGBA framebuffer.
    pub fn framebuffer(&self) -> &[u8] {
        self.mmu.ppu.framebuffer()
    }

    /// Pull queued audio (interleaved stereo i16) into `out`; returns the
    /// number of samples written.
    pub fn audio_samples(&mut self, out: &mut [i16]) -> usize {
        self.mmu.apu.drain_samples(out)
    }

    /// Select the audio output sample rate (default 44100 Hz).
    pub fn set_sample_rate(&mut self, hz: u32) {
        self.mmu.apu.set_sample_rate(hz);
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.mmu
            .input
            .set_button(button, pressed, &mut self.mmu.if_reg);
    }

    /// Packed pressed-button byte (directions low nibble, actions high).
    pub fn buttons_state(&self) -> u8 {
        self.mmu.input.buttons_state()
    }

    /// External RAM contents for battery-backed saves; `None` when no
    /// cartridge is loaded or it declares no battery.
    pub fn battery_snapshot(&self) -> Option<Vec<u8>> {
        self.mmu.cart.as_ref().and_then(|c| c.battery_snapshot())
    }

    /// Restore battery-backed external RAM from a prior snapshot.
    pub fn restore_battery(&mut self, bytes: &[u8]) -> Result<(), CartridgeError> {
        match self.mmu.cart.as_mut() {
            Some(cart) => cart.restore_battery(bytes),
            None => Err(CartridgeError::NoCartridge),
        }
    }

    /// Serialize the full machine state. The payload is self-describing
    /// and round-trip lossless.
    pub fn save_state(&self) -> Result<Vec<u8>, StateError> {
        state::save(self)
    }

    /// Restore a state produced by [`GameBoy::save_state`] for the same
    /// cartridge.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        state::load(self, bytes)?;
        self.fault = None;
        Ok(())
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
