//! System bus: routes CPU accesses to memory, I/O and peripherals.
//!
//! Three address ranges never reach the memory map: the register page
//! ($0000-$001F, minus the timer block the CPU resolves itself), the
//! I/O window from `io_start` to $BFFF, and on the MCX-128 the two
//! mapping registers at the bottom of that window.

use motorola_6803::Bus;
use motorola_6847::VideoMemory;

use crate::keyboard::KeyboardState;
use crate::memory::Mc10Memory;
use crate::tape::TapeDeck;

/// Cassette input bit in the port 2 data register.
const CASSETTE_IN: u8 = 0x10;

/// MCX-128 bank-select register.
const BANK_SELECT: u16 = 0xBF00;
/// MCX-128 ROM-select register.
const ROM_SELECT: u16 = 0xBF01;

/// Start of video memory: the VDG shares the RAM at $4000.
const VIDEO_BASE: u16 = 0x4000;

/// The MC-10 system bus.
///
/// Reads in the I/O window return the keyboard row lines for the column
/// strobe last written to port 1 ($02). Writes there latch the video
/// control byte, whose bit 7 also drives the beeper. Port 2 ($03) is
/// assembled on read from the keyboard modifier lines and the cassette
/// input, so every BASIC tape poll lands in the tape deck.
pub struct Mc10Bus {
    pub memory: Box<dyn Mc10Memory>,
    pub keyboard: KeyboardState,
    pub tape: TapeDeck,
    /// Register page backing store.
    pub(crate) registers: [u8; 0x20],
    pub(crate) control_byte: u8,
    beeper: bool,
}

impl Mc10Bus {
    #[must_use]
    pub fn new(memory: Box<dyn Mc10Memory>) -> Self {
        Self {
            memory,
            keyboard: KeyboardState::new(),
            tape: TapeDeck::new(),
            registers: [0; 0x20],
            control_byte: 0,
            beeper: false,
        }
    }

    /// The last byte written into the I/O window. The VDG decodes it
    /// once per frame.
    #[must_use]
    pub fn control_byte(&self) -> u8 {
        self.control_byte
    }

    /// Beeper output level, bit 7 of the control byte.
    #[must_use]
    pub fn beeper(&self) -> bool {
        self.beeper
    }

    pub(crate) fn set_control_byte(&mut self, value: u8) {
        self.control_byte = value;
        self.beeper = value & 0x80 != 0;
    }

    fn register_read(&mut self, address: u16) -> u8 {
        match address {
            // Port 2: modifier rows for the current strobe, cassette
            // input on bit 4.
            0x0003 => {
                let lines = self.keyboard.read_modifiers(self.registers[2]);
                if self.tape.sample_bit() {
                    lines
                } else {
                    lines & !CASSETTE_IN
                }
            }
            _ => self.registers[address as usize],
        }
    }
}

impl Bus for Mc10Bus {
    fn read(&mut self, address: u16) -> u8 {
        if address < 0x0020 {
            return self.register_read(address);
        }
        if address >= self.memory.io_start() && address < 0xC000 {
            return self.keyboard.read_rows(self.registers[2]);
        }
        self.memory.read(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        if address < 0x0020 {
            self.registers[address as usize] = value;
            return;
        }
        if address >= self.memory.io_start() && address < 0xC000 {
            match address {
                BANK_SELECT => self.memory.write_bank_select(value),
                ROM_SELECT => self.memory.write_rom_select(value),
                _ => self.set_control_byte(value),
            }
            return;
        }
        self.memory.write(address, value);
    }
}

impl VideoMemory for Mc10Bus {
    fn video_read(&self, offset: u16) -> u8 {
        // Twelve address lines reach the video RAM, so the 6K display
        // modes fold back onto the 4K window at $4000.
        self.memory.read(VIDEO_BASE + (offset & 0x0FFF))
    }
}
