//! The TRS-80 MC-10 as one machine value.
//!
//! An MC6803 clocked at 0.89 MHz against NTSC video works out to 57 CPU
//! cycles per scanline and 262 scanlines per frame. The driver calls
//! [`Mc10::run_scanline`] in a loop; when the line counter wraps, the
//! VDG redraws the framebuffer from the control byte and shared RAM.

use motorola_6803::{Mc6803, State};
use motorola_6847::{FrameSink, Vdg};

use crate::bus::Mc10Bus;
use crate::config::{Mc10Config, Mc10Model};
use crate::keyboard::Mc10Key;
use crate::memory::{Mc10Memory, Memory20K, Memory32K, MemoryMcx128};
use crate::tape::{TapeDeck, TapeMotor};

/// NTSC scanlines per frame.
pub const SCANLINES_PER_FRAME: u16 = 262;

/// While the tape motor runs accelerated, render one frame in this many.
const RENDER_EVERY: u8 = 10;

/// Frames per motor-detect window, one second of emulated time.
const MOTOR_WINDOW_FRAMES: u8 = 60;

const BASIC_ROM_LEN: usize = 0x2000;
const MCX_ROM_LEN: usize = 0x4000;

/// What one scanline call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanlineEvent {
    /// CPU state after the line.
    pub state: State,
    /// This line completed a frame and the framebuffer was refreshed,
    /// unless tape acceleration skipped the render.
    pub frame_done: bool,
}

/// A complete MC-10.
pub struct Mc10 {
    cpu: Mc6803,
    bus: Mc10Bus,
    vdg: Vdg,
    model: Mc10Model,
    rom: Vec<u8>,
    mcx_rom: Option<Vec<u8>>,
    pub(crate) scanline: u16,
    /// Frames skipped since the last render under tape acceleration.
    pub(crate) frame_skip: u8,
    frames_in_window: u8,
}

fn build_memory(model: Mc10Model, has_mcx_rom: bool) -> Box<dyn Mc10Memory> {
    match model {
        Mc10Model::Ram20K => Box::new(Memory20K::new()),
        Mc10Model::Ram32K => Box::new(Memory32K::new()),
        Mc10Model::Mcx128 => {
            if has_mcx_rom {
                Box::new(MemoryMcx128::new())
            } else {
                // Nothing to map at $C000: behave as a plain 32K machine.
                Box::new(Memory32K::new())
            }
        }
    }
}

impl Mc10 {
    /// Build a machine and leave it in reset; the first scanline call
    /// fetches the reset vector.
    ///
    /// # Panics
    /// Panics on a mis-sized ROM image.
    #[must_use]
    pub fn new(config: &Mc10Config) -> Self {
        assert!(
            config.rom.len() == BASIC_ROM_LEN,
            "BASIC ROM must be exactly 8192 bytes, got {}",
            config.rom.len()
        );
        if let Some(mcx_rom) = &config.mcx_rom {
            assert!(
                mcx_rom.len() == MCX_ROM_LEN,
                "MCX ROM must be exactly 16384 bytes, got {}",
                mcx_rom.len()
            );
        }

        let memory = build_memory(config.model, config.mcx_rom.is_some());
        let mut mc10 = Self {
            cpu: Mc6803::new(),
            bus: Mc10Bus::new(memory),
            vdg: Vdg::new(),
            model: config.model,
            rom: config.rom.clone(),
            mcx_rom: config.mcx_rom.clone(),
            scanline: 0,
            frame_skip: 0,
            frames_in_window: 0,
        };
        mc10.install_roms();
        mc10
    }

    /// Power-cycle: fresh RAM and CPU, ROMs reinstalled, tape rewound.
    /// The loaded tape image and any held keys survive.
    pub fn reset(&mut self) {
        self.bus.memory = build_memory(self.model, self.mcx_rom.is_some());
        self.install_roms();
        self.bus.registers = [0; 0x20];
        self.bus.set_control_byte(0);
        self.bus.tape.rewind();
        self.cpu = Mc6803::new();
        self.scanline = 0;
        self.frame_skip = 0;
        self.frames_in_window = 0;
    }

    fn install_roms(&mut self) {
        // The 8K BASIC image appears at both $C000 and $E000.
        self.bus.memory.load_rom(0, &self.rom);
        self.bus.memory.load_rom(0x2000, &self.rom);
        if let Some(mcx_rom) = &self.mcx_rom {
            self.bus.memory.load_alternate_rom(mcx_rom);
        }
    }

    /// Run one scanline of CPU time. Completing line 262 wraps the
    /// counter, redraws the frame and reports `frame_done`.
    pub fn run_scanline(&mut self) -> ScanlineEvent {
        let state = self.cpu.run_scanline(&mut self.bus);
        self.scanline += 1;
        let frame_done = self.scanline == SCANLINES_PER_FRAME;
        if frame_done {
            self.scanline = 0;
            self.cpu.scanline_cycles = 0;
            self.end_frame();
        }
        ScanlineEvent { state, frame_done }
    }

    /// Run scanlines until a frame completes, returning the CPU state
    /// at the boundary.
    pub fn run_frame(&mut self) -> State {
        loop {
            let event = self.run_scanline();
            if event.frame_done {
                return event.state;
            }
        }
    }

    fn end_frame(&mut self) {
        self.frames_in_window += 1;
        if self.frames_in_window == MOTOR_WINDOW_FRAMES {
            self.frames_in_window = 0;
            self.bus.tape.clear_read_counter();
        }
        if self.bus.tape.motor() == TapeMotor::PlayingAccelerated {
            self.frame_skip += 1;
            if self.frame_skip < RENDER_EVERY {
                return;
            }
            self.frame_skip = 0;
        }
        self.vdg.render_frame(&self.bus, self.bus.control_byte);
    }

    pub fn press_key(&mut self, key: Mc10Key) {
        let (column, row) = key.matrix();
        self.bus.keyboard.set_key(column, row, true);
    }

    pub fn release_key(&mut self, key: Mc10Key) {
        let (column, row) = key.matrix();
        self.bus.keyboard.set_key(column, row, false);
    }

    pub fn release_all(&mut self) {
        self.bus.keyboard.release_all();
    }

    /// Put a tape image in the deck, rewound.
    ///
    /// # Panics
    /// Panics if the image exceeds 64K.
    pub fn load_tape(&mut self, image: &[u8]) {
        self.bus.tape.load(image);
    }

    /// Eject the tape.
    pub fn eject_tape(&mut self) {
        self.bus.tape.eject();
    }

    /// Rewind the tape to the start.
    pub fn rewind_tape(&mut self) {
        self.bus.tape.rewind();
    }

    /// Reference to the tape deck.
    #[must_use]
    pub fn tape(&self) -> &TapeDeck {
        &self.bus.tape
    }

    /// Beeper output level, bit 7 of the video control byte.
    #[must_use]
    pub fn beeper(&self) -> bool {
        self.bus.beeper()
    }

    /// The rendered frame (ARGB32).
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        self.vdg.framebuffer()
    }

    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        self.vdg.framebuffer_width()
    }

    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        self.vdg.framebuffer_height()
    }

    /// Hand the current frame to an external sink.
    pub fn present<S: FrameSink>(&self, sink: &mut S) {
        self.vdg.present(sink);
    }

    #[must_use]
    pub fn cpu(&self) -> &Mc6803 {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Mc6803 {
        &mut self.cpu
    }

    #[must_use]
    pub fn bus(&self) -> &Mc10Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Mc10Bus {
        &mut self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motorola_6803::Bus;

    /// 8K image: a branch-to-self at $E000 and the reset vector aimed
    /// at it.
    fn make_rom() -> Vec<u8> {
        let mut rom = vec![0; BASIC_ROM_LEN];
        rom[0] = 0x20; // BRA *
        rom[1] = 0xFE;
        rom[0x1FFE] = 0xE0;
        rom[0x1FFF] = 0x00;
        rom
    }

    fn make_mc10() -> Mc10 {
        Mc10::new(&Mc10Config::new(make_rom()))
    }

    #[test]
    fn frame_completes_after_262_scanlines() {
        let mut mc10 = make_mc10();
        for _ in 0..261 {
            let event = mc10.run_scanline();
            assert!(!event.frame_done);
        }
        let event = mc10.run_scanline();
        assert!(event.frame_done);
        assert_eq!(event.state, State::Executing);
    }

    #[test]
    fn reset_vector_starts_the_program() {
        let mut mc10 = make_mc10();
        mc10.run_scanline();
        let pc = mc10.cpu().regs.pc;
        assert!(pc == 0xE000 || pc == 0xE002, "pc = {pc:04X}");
    }

    #[test]
    fn rom_image_is_mirrored() {
        let mut mc10 = make_mc10();
        assert_eq!(mc10.bus_mut().read(0xC000), 0x20);
        assert_eq!(mc10.bus_mut().read(0xE000), 0x20);
        assert_eq!(mc10.bus_mut().read(0xDFFF), mc10.bus_mut().read(0xFFFF));
    }

    #[test]
    fn framebuffer_matches_the_raster() {
        let mc10 = make_mc10();
        assert_eq!(mc10.framebuffer_width(), 256);
        assert_eq!(mc10.framebuffer_height(), 192);
        assert_eq!(mc10.framebuffer().len(), 256 * 192);
    }

    #[test]
    fn frame_end_renders_video_ram() {
        let mut mc10 = make_mc10();
        let initial = mc10.framebuffer()[0];
        // An all-set semigraphics cell lights the whole top-left corner.
        mc10.bus_mut().write(0x4000, 0xFF);
        mc10.run_frame();
        assert_ne!(mc10.framebuffer()[0], initial);
    }

    #[test]
    fn program_output_reaches_the_framebuffer() {
        // LDAA #$FF, STAA $4000, BRA *
        let mut rom = vec![0; BASIC_ROM_LEN];
        rom[0..7].copy_from_slice(&[0x86, 0xFF, 0xB7, 0x40, 0x00, 0x20, 0xFE]);
        rom[0x1FFE] = 0xE0;
        rom[0x1FFF] = 0x00;

        let mut mc10 = Mc10::new(&Mc10Config::new(rom));
        let initial = mc10.framebuffer()[0];
        mc10.run_frame();
        assert_eq!(mc10.bus_mut().read(0x4000), 0xFF);
        assert_ne!(mc10.framebuffer()[0], initial);
    }

    #[test]
    fn keyboard_reaches_the_io_window() {
        let mut mc10 = make_mc10();
        mc10.press_key(Mc10Key::A);
        mc10.bus_mut().write(0x0002, !0x02);
        assert_eq!(mc10.bus_mut().read(0x9000), !0x01);

        mc10.release_all();
        assert_eq!(mc10.bus_mut().read(0x9000), 0xFF);
    }

    #[test]
    fn beeper_follows_control_bit_7() {
        let mut mc10 = make_mc10();
        assert!(!mc10.beeper());
        mc10.bus_mut().write(0x9000, 0x80);
        assert!(mc10.beeper());
        mc10.bus_mut().write(0x9000, 0x7F);
        assert!(!mc10.beeper());
    }

    #[test]
    fn accelerated_tape_renders_one_frame_in_ten() {
        let mut mc10 = make_mc10();
        let initial = mc10.framebuffer()[0];
        mc10.bus_mut().write(0x4000, 0xFF);
        mc10.load_tape(&[0x55; 2048]);
        mc10.bus_mut().tape.motor = TapeMotor::PlayingAccelerated;

        for _ in 0..9 {
            mc10.run_frame();
            assert_eq!(mc10.framebuffer()[0], initial);
        }
        mc10.run_frame();
        assert_ne!(mc10.framebuffer()[0], initial);
    }

    #[test]
    fn motor_detect_window_clears_once_a_second() {
        let mut mc10 = make_mc10();
        mc10.bus_mut().tape.read_counter = 7;
        for _ in 0..59 {
            mc10.run_frame();
        }
        assert_eq!(mc10.bus().tape.read_counter, 7);
        mc10.run_frame();
        assert_eq!(mc10.bus().tape.read_counter, 0);
    }

    #[test]
    fn reset_clears_ram_and_restarts() {
        let mut mc10 = make_mc10();
        mc10.run_frame();
        mc10.bus_mut().write(0x4200, 0xAA);
        mc10.bus_mut().write(0x9000, 0x80);

        mc10.reset();
        assert_eq!(mc10.bus_mut().read(0x4200), 0x00);
        assert!(!mc10.beeper());
        assert_eq!(mc10.cpu().state, State::Reset);

        mc10.run_scanline();
        assert_eq!(mc10.cpu().state, State::Executing);
        let pc = mc10.cpu().regs.pc;
        assert!(pc == 0xE000 || pc == 0xE002, "pc = {pc:04X}");
    }

    #[test]
    fn mcx_fallback_without_its_rom_is_a_32k_machine() {
        let config = Mc10Config {
            model: Mc10Model::Mcx128,
            rom: make_rom(),
            mcx_rom: None,
        };
        let mut mc10 = Mc10::new(&config);
        // RAM runs to the narrow I/O window, BASIC sits at $C000.
        mc10.bus_mut().write(0xBEFF, 0x42);
        assert_eq!(mc10.bus_mut().read(0xBEFF), 0x42);
        assert_eq!(mc10.bus_mut().read(0xC000), 0x20);
    }

    #[test]
    fn mcx_machine_boots_into_the_alternate_rom() {
        let config = Mc10Config {
            model: Mc10Model::Mcx128,
            rom: make_rom(),
            mcx_rom: Some(vec![0x42; MCX_ROM_LEN]),
        };
        let mut mc10 = Mc10::new(&config);
        assert_eq!(mc10.bus_mut().read(0xC000), 0x42);

        // The ROM-select register swaps Microcolor BASIC in.
        mc10.bus_mut().write(0xBF01, 0x01);
        assert_eq!(mc10.bus_mut().read(0xC000), 0x20);
    }

    #[test]
    #[should_panic(expected = "BASIC ROM must be exactly 8192 bytes")]
    fn mis_sized_rom_panics() {
        let _ = Mc10::new(&Mc10Config::new(vec![0; 0x1000]));
    }
}
