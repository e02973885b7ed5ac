//! MC6803 execution core.
//!
//! The interpreter retires whole instructions against a 57-cycle scanline
//! budget. The on-chip timer advances in lockstep with the retired cycle
//! counts, so a driver that calls [`Mc6803::run_scanline`] 262 times gets
//! one frame of emulated time with the timer interrupts landing on the
//! right lines.

use crate::Cc;
use crate::flags::{C, H, I, N, V, Z};
use crate::opcodes::{Mode, OPCODES};
use crate::registers::Registers;
use crate::timer::{TIMER_REG_FIRST, TIMER_REG_LAST, Timer};

/// Memory and I/O bus interface.
///
/// The CPU accesses everything outside its own register file through this
/// trait. Reads may have side effects (keyboard column selects, cassette
/// sampling), so both operations take `&mut self`. Addresses 0x08-0x0C are
/// never passed through: the CPU resolves its on-chip timer registers
/// internally before the bus sees the access.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);
}

/// CPU cycles in one video scanline.
pub const CYCLES_PER_SCANLINE: u32 = 57;

/// Timer overflow interrupt vector.
pub const VECTOR_OVERFLOW: u16 = 0xFFF2;
/// Output compare interrupt vector.
pub const VECTOR_COMPARE: u16 = 0xFFF4;
/// Software interrupt vector.
pub const VECTOR_SWI: u16 = 0xFFFA;
/// Reset vector.
pub const VECTOR_RESET: u16 = 0xFFFE;

/// Cycles charged for stacking a frame and vectoring to a service routine.
const INTERRUPT_CYCLES: u32 = 12;

/// Execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Executing instructions.
    Executing,
    /// Stopped by WAI. The timer keeps counting, and a pending enabled
    /// interrupt resumes execution through its vector.
    Halted,
    /// Reset requested; consumed at the top of the next scanline call.
    Reset,
    /// Stopped on an opcode with no defined behaviour. The offending
    /// opcode is recorded; only a reset recovers.
    Exception(u8),
}

/// The Motorola MC6803.
///
/// A 6801-family part: the 6800 programming model plus the D accumulator
/// pairing, an on-chip 16-bit free-running timer, and a handful of extra
/// instructions (ABX, MUL, PSHX/PULX, ASLD/LSRD, ADDD/SUBD/LDD/STD).
#[derive(Debug)]
pub struct Mc6803 {
    /// CPU registers.
    pub regs: Registers,

    /// On-chip timer/counter.
    pub timer: Timer,

    /// Current execution state.
    pub state: State,

    /// Cycles consumed against the current scanline budget. A value left
    /// over after a line ends is the next line's starting deficit.
    pub scanline_cycles: u32,
}

impl Default for Mc6803 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mc6803 {
    /// Create a new CPU in reset state. The first scanline call loads PC
    /// from the reset vector.
    #[must_use]
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            timer: Timer::new(),
            state: State::Reset,
            scanline_cycles: 0,
        }
    }

    /// Assert the reset line. The reset is consumed at the top of the
    /// next scanline call.
    pub fn request_reset(&mut self) {
        self.state = State::Reset;
    }

    /// Run one scanline worth of instructions.
    ///
    /// Whole instructions retire until the 57-cycle budget, including any
    /// deficit carried from the previous line, is consumed; the overrun
    /// becomes the next line's deficit. While halted the timer still
    /// advances 57 cycles, one at a time, and a pending enabled interrupt
    /// resumes execution within the same call. An exception returns
    /// immediately.
    pub fn run_scanline<B: Bus>(&mut self, bus: &mut B) -> State {
        self.check_reset(bus);

        loop {
            match self.state {
                State::Reset | State::Exception(_) => return self.state,

                State::Halted => {
                    for _ in 0..CYCLES_PER_SCANLINE {
                        self.timer.tick_one();
                    }
                    let Some(vector) = self.pending_vector() else {
                        return self.state;
                    };
                    // The WAI that halted us already stacked the frame.
                    self.regs.cc.set(I);
                    self.regs.pc = self.read_word(bus, vector);
                    self.state = State::Executing;
                }

                State::Executing => {
                    self.scanline_cycles += self.step(bus);
                    if self.scanline_cycles >= CYCLES_PER_SCANLINE {
                        self.scanline_cycles -= CYCLES_PER_SCANLINE;
                        return self.state;
                    }
                }
            }
        }
    }

    /// Deliver a pending enabled interrupt, then execute one instruction.
    /// Returns the cycle cost. Does nothing unless the CPU is executing.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.state != State::Executing {
            return 0;
        }

        let mut cycles = 0;
        if let Some(vector) = self.pending_vector() {
            self.push_frame(bus);
            self.regs.cc.set(I);
            self.regs.pc = self.read_word(bus, vector);
            cycles = INTERRUPT_CYCLES;
        }
        cycles + self.execute(bus)
    }

    /// Consume a requested reset: clear the scanline deficit, mask
    /// interrupts, and load PC from the reset vector.
    fn check_reset<B: Bus>(&mut self, bus: &mut B) {
        if self.state == State::Reset {
            self.scanline_cycles = 0;
            self.regs.cc.set(I);
            self.regs.pc = self.read_word(bus, VECTOR_RESET);
            self.state = State::Executing;
        }
    }

    /// Vector for the highest-priority pending enabled interrupt, if the
    /// interrupt mask allows one. Overflow wins over compare.
    fn pending_vector(&self) -> Option<u16> {
        if self.regs.cc.is_set(I) {
            return None;
        }
        if self.timer.overflow_irq_pending() {
            Some(VECTOR_OVERFLOW)
        } else if self.timer.compare_irq_pending() {
            Some(VECTOR_COMPARE)
        } else {
            None
        }
    }

    fn read<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        if (TIMER_REG_FIRST..=TIMER_REG_LAST).contains(&address) {
            self.timer.read(address)
        } else {
            bus.read(address)
        }
    }

    fn write<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        if (TIMER_REG_FIRST..=TIMER_REG_LAST).contains(&address) {
            self.timer.write(address, value);
        } else {
            bus.write(address, value);
        }
    }

    /// Read a big-endian word.
    fn read_word<B: Bus>(&mut self, bus: &mut B, address: u16) -> u16 {
        let hi = self.read(bus, address);
        let lo = self.read(bus, address.wrapping_add(1));
        u16::from(hi) << 8 | u16::from(lo)
    }

    /// Write a big-endian word.
    fn write_word<B: Bus>(&mut self, bus: &mut B, address: u16, value: u16) {
        self.write(bus, address, (value >> 8) as u8);
        self.write(bus, address.wrapping_add(1), value as u8);
    }

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let byte = self.read(bus, self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        byte
    }

    fn push_byte<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.push();
        self.write(bus, addr, value);
    }

    fn pop_byte<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.regs.pop();
        self.read(bus, addr)
    }

    /// Push a word, low byte first, matching the hardware frame layout.
    fn push_word<B: Bus>(&mut self, bus: &mut B, value: u16) {
        self.push_byte(bus, value as u8);
        self.push_byte(bus, (value >> 8) as u8);
    }

    fn pop_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let hi = self.pop_byte(bus);
        let lo = self.pop_byte(bus);
        u16::from(hi) << 8 | u16::from(lo)
    }

    /// Stack the 7-byte interrupt frame: PC, X, A, B, CC.
    fn push_frame<B: Bus>(&mut self, bus: &mut B) {
        let pc = self.regs.pc;
        let x = self.regs.x;
        self.push_word(bus, pc);
        self.push_word(bus, x);
        let a = self.regs.a;
        self.push_byte(bus, a);
        let b = self.regs.b;
        self.push_byte(bus, b);
        let cc = self.regs.cc.to_byte();
        self.push_byte(bus, cc);
    }

    /// Resolve the operand address for the given addressing mode,
    /// consuming operand bytes from the instruction stream.
    ///
    /// Modes without an operand fetch resolve to address zero; for the
    /// undocumented memory forms that address is actually used.
    fn effective_address<B: Bus>(&mut self, bus: &mut B, mode: Mode) -> u16 {
        match mode {
            Mode::Direct => u16::from(self.fetch(bus)),
            Mode::Indexed => {
                let offset = u16::from(self.fetch(bus));
                self.regs.x.wrapping_add(offset)
            }
            Mode::Extended => {
                let hi = self.fetch(bus);
                let lo = self.fetch(bus);
                u16::from(hi) << 8 | u16::from(lo)
            }
            Mode::Relative => {
                let offset = self.fetch(bus) as i8;
                self.regs.pc.wrapping_add_signed(i16::from(offset))
            }
            Mode::Immediate => {
                let addr = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                addr
            }
            Mode::Immediate16 => {
                let addr = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(2);
                addr
            }
            Mode::Inherent | Mode::Undocumented | Mode::Illegal => 0,
        }
    }

    /// Fetch, decode and execute one instruction. Returns the cycle cost
    /// from the descriptor table. The timer advances by that cost before
    /// the instruction's own bus traffic happens.
    fn execute<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let opcode = self.fetch(bus);
        let info = &OPCODES[usize::from(opcode)];
        let cycles = u32::from(info.cycles);

        self.timer.tick(cycles);

        let addr = self.effective_address(bus, info.mode);

        match opcode {
            // CLB (undocumented): clear B, flags untouched
            0x00 => self.regs.b = 0,

            // NOP
            0x01 => {}

            // SEXA (undocumented): A = 0xFF if carry else 0x00
            0x02 => self.regs.a = if self.regs.cc.is_set(C) { 0xFF } else { 0x00 },

            // SETA (undocumented)
            0x03 => self.regs.a = 0xFF,

            // LSRD
            0x04 => self.do_lsrd(),

            // ASLD
            0x05 => self.do_asld(),

            // TAP
            0x06 => self.regs.cc = Cc::from_byte(self.regs.a),

            // TPA
            0x07 => self.regs.a = self.regs.cc.to_byte(),

            // INX
            0x08 => {
                self.regs.x = self.regs.x.wrapping_add(1);
                self.regs.cc.set_if(Z, self.regs.x == 0);
            }

            // DEX
            0x09 => {
                self.regs.x = self.regs.x.wrapping_sub(1);
                self.regs.cc.set_if(Z, self.regs.x == 0);
            }

            // CLV
            0x0A => self.regs.cc.clear(V),

            // SEV
            0x0B => self.regs.cc.set(V),

            // CLC
            0x0C => self.regs.cc.clear(C),

            // SEC
            0x0D => self.regs.cc.set(C),

            // CLI
            0x0E => self.regs.cc.clear(I),

            // SEI
            0x0F => self.regs.cc.set(I),

            // SBA
            0x10 => self.regs.a = self.do_sub(self.regs.a, self.regs.b),

            // CBA
            0x11 => self.do_cmp(self.regs.a, self.regs.b),

            // TAB
            0x16 => self.regs.b = self.logic_flags(self.regs.a),

            // TBA
            0x17 => self.regs.a = self.logic_flags(self.regs.b),

            // DAA
            0x19 => self.do_daa(),

            // ABA
            0x1B => self.regs.a = self.do_add(self.regs.a, self.regs.b),

            // BRA
            0x20 => self.regs.pc = addr,

            // BRN
            0x21 => {}

            // BHI
            0x22 => {
                if !self.regs.cc.is_set(C) && !self.regs.cc.is_set(Z) {
                    self.regs.pc = addr;
                }
            }

            // BLS
            0x23 => {
                if self.regs.cc.is_set(C) || self.regs.cc.is_set(Z) {
                    self.regs.pc = addr;
                }
            }

            // BCC
            0x24 => {
                if !self.regs.cc.is_set(C) {
                    self.regs.pc = addr;
                }
            }

            // BCS
            0x25 => {
                if self.regs.cc.is_set(C) {
                    self.regs.pc = addr;
                }
            }

            // BNE
            0x26 => {
                if !self.regs.cc.is_set(Z) {
                    self.regs.pc = addr;
                }
            }

            // BEQ
            0x27 => {
                if self.regs.cc.is_set(Z) {
                    self.regs.pc = addr;
                }
            }

            // BVC
            0x28 => {
                if !self.regs.cc.is_set(V) {
                    self.regs.pc = addr;
                }
            }

            // BVS
            0x29 => {
                if self.regs.cc.is_set(V) {
                    self.regs.pc = addr;
                }
            }

            // BPL
            0x2A => {
                if !self.regs.cc.is_set(N) {
                    self.regs.pc = addr;
                }
            }

            // BMI
            0x2B => {
                if self.regs.cc.is_set(N) {
                    self.regs.pc = addr;
                }
            }

            // BGE
            0x2C => {
                if self.regs.cc.is_set(N) == self.regs.cc.is_set(V) {
                    self.regs.pc = addr;
                }
            }

            // BLT
            0x2D => {
                if self.regs.cc.is_set(N) != self.regs.cc.is_set(V) {
                    self.regs.pc = addr;
                }
            }

            // BGT
            0x2E => {
                if self.regs.cc.is_set(N) == self.regs.cc.is_set(V) && !self.regs.cc.is_set(Z) {
                    self.regs.pc = addr;
                }
            }

            // BLE
            0x2F => {
                if self.regs.cc.is_set(N) != self.regs.cc.is_set(V) || self.regs.cc.is_set(Z) {
                    self.regs.pc = addr;
                }
            }

            // TSX
            0x30 => self.regs.x = self.regs.sp.wrapping_add(1),

            // INS
            0x31 => self.regs.sp = self.regs.sp.wrapping_add(1),

            // PULA
            0x32 => self.regs.a = self.pop_byte(bus),

            // PULB
            0x33 => self.regs.b = self.pop_byte(bus),

            // DES
            0x34 => self.regs.sp = self.regs.sp.wrapping_sub(1),

            // TXS
            0x35 => self.regs.sp = self.regs.x.wrapping_sub(1),

            // PSHA
            0x36 => {
                let a = self.regs.a;
                self.push_byte(bus, a);
            }

            // PSHB
            0x37 => {
                let b = self.regs.b;
                self.push_byte(bus, b);
            }

            // PULX
            0x38 => self.regs.x = self.pop_word(bus),

            // RTS
            0x39 => self.regs.pc = self.pop_word(bus),

            // ABX
            0x3A => self.regs.x = self.regs.x.wrapping_add(u16::from(self.regs.b)),

            // RTI
            0x3B => {
                let cc = self.pop_byte(bus);
                self.regs.cc = Cc::from_byte(cc);
                self.regs.b = self.pop_byte(bus);
                self.regs.a = self.pop_byte(bus);
                self.regs.x = self.pop_word(bus);
                self.regs.pc = self.pop_word(bus);
            }

            // PSHX
            0x3C => {
                let x = self.regs.x;
                self.push_word(bus, x);
            }

            // MUL
            0x3D => {
                let product = u16::from(self.regs.a) * u16::from(self.regs.b);
                self.regs.set_d(product);
                self.regs.cc.set_if(C, product & 0x80 != 0);
            }

            // WAI
            0x3E => {
                self.push_frame(bus);
                self.state = State::Halted;
            }

            // SWI
            0x3F => {
                self.push_frame(bus);
                self.regs.cc.set(I);
                self.regs.pc = self.read_word(bus, VECTOR_SWI);
            }

            // NEGA
            0x40 => self.regs.a = self.do_neg(self.regs.a),

            // NGCA (undocumented)
            0x42 => self.regs.a = self.do_ngc(self.regs.a),

            // COMA
            0x43 => self.regs.a = self.do_com(self.regs.a),

            // LSRA
            0x44 => self.regs.a = self.do_lsr(self.regs.a),

            // RORA
            0x46 => self.regs.a = self.do_ror(self.regs.a),

            // ASRA
            0x47 => self.regs.a = self.do_asr(self.regs.a),

            // ASLA
            0x48 => self.regs.a = self.do_asl(self.regs.a),

            // ROLA
            0x49 => self.regs.a = self.do_rol(self.regs.a),

            // DECA
            0x4A => self.regs.a = self.do_dec(self.regs.a),

            // INCA
            0x4C => self.regs.a = self.do_inc(self.regs.a),

            // TSTA
            0x4D => self.do_tst(self.regs.a),

            // CLRA
            0x4F => self.regs.a = self.do_clr(),

            // NEGB
            0x50 => self.regs.b = self.do_neg(self.regs.b),

            // NGCB (undocumented)
            0x52 => self.regs.b = self.do_ngc(self.regs.b),

            // COMB
            0x53 => self.regs.b = self.do_com(self.regs.b),

            // LSRB
            0x54 => self.regs.b = self.do_lsr(self.regs.b),

            // RORB
            0x56 => self.regs.b = self.do_ror(self.regs.b),

            // ASRB
            0x57 => self.regs.b = self.do_asr(self.regs.b),

            // ASLB
            0x58 => self.regs.b = self.do_asl(self.regs.b),

            // ROLB
            0x59 => self.regs.b = self.do_rol(self.regs.b),

            // DECB
            0x5A => self.regs.b = self.do_dec(self.regs.b),

            // INCB
            0x5C => self.regs.b = self.do_inc(self.regs.b),

            // TSTB
            0x5D => self.do_tst(self.regs.b),

            // CLRB
            0x5F => self.regs.b = self.do_clr(),

            // NEG
            0x60 | 0x70 => {
                let byte = self.read(bus, addr);
                let result = self.do_neg(byte);
                self.write(bus, addr, result);
            }

            // NGC (undocumented; no operand fetch, so addr is 0x0000)
            0x62 | 0x72 => {
                let byte = self.read(bus, addr);
                let result = self.do_ngc(byte);
                self.write(bus, addr, result);
            }

            // COM
            0x63 | 0x73 => {
                let byte = self.read(bus, addr);
                let result = self.do_com(byte);
                self.write(bus, addr, result);
            }

            // LSR
            0x64 | 0x74 => {
                let byte = self.read(bus, addr);
                let result = self.do_lsr(byte);
                self.write(bus, addr, result);
            }

            // ASL (0x65 is an alias row)
            0x65 | 0x68 | 0x78 => {
                let byte = self.read(bus, addr);
                let result = self.do_asl(byte);
                self.write(bus, addr, result);
            }

            // ROR
            0x66 | 0x76 => {
                let byte = self.read(bus, addr);
                let result = self.do_ror(byte);
                self.write(bus, addr, result);
            }

            // ASR
            0x67 | 0x77 => {
                let byte = self.read(bus, addr);
                let result = self.do_asr(byte);
                self.write(bus, addr, result);
            }

            // ROL
            0x69 | 0x79 => {
                let byte = self.read(bus, addr);
                let result = self.do_rol(byte);
                self.write(bus, addr, result);
            }

            // DEC
            0x6A | 0x7A => {
                let byte = self.read(bus, addr);
                let result = self.do_dec(byte);
                self.write(bus, addr, result);
            }

            // INC
            0x6C | 0x7C => {
                let byte = self.read(bus, addr);
                let result = self.do_inc(byte);
                self.write(bus, addr, result);
            }

            // TST (no write-back)
            0x6D | 0x7D => {
                let byte = self.read(bus, addr);
                self.do_tst(byte);
            }

            // JMP
            0x6E | 0x7E => self.regs.pc = addr,

            // CLR
            0x6F | 0x7F => {
                let result = self.do_clr();
                self.write(bus, addr, result);
            }

            // SUBA
            0x80 | 0x90 | 0xA0 | 0xB0 => {
                let byte = self.read(bus, addr);
                self.regs.a = self.do_sub(self.regs.a, byte);
            }

            // CMPA
            0x81 | 0x91 | 0xA1 | 0xB1 => {
                let byte = self.read(bus, addr);
                self.do_cmp(self.regs.a, byte);
            }

            // SBCA
            0x82 | 0x92 | 0xA2 | 0xB2 => {
                let byte = self.read(bus, addr);
                self.regs.a = self.do_sbc(self.regs.a, byte);
            }

            // SUBD
            0x83 | 0x93 | 0xA3 | 0xB3 => {
                let word = self.read_word(bus, addr);
                self.do_subd(word);
            }

            // ANDA
            0x84 | 0x94 | 0xA4 | 0xB4 => {
                let byte = self.read(bus, addr);
                let result = self.regs.a & byte;
                self.regs.a = self.logic_flags(result);
            }

            // BITA
            0x85 | 0x95 | 0xA5 | 0xB5 => {
                let byte = self.read(bus, addr);
                let result = self.regs.a & byte;
                self.logic_flags(result);
            }

            // LDAA
            0x86 | 0x96 | 0xA6 | 0xB6 => {
                let byte = self.read(bus, addr);
                self.regs.a = self.logic_flags(byte);
            }

            // STAA
            0x97 | 0xA7 | 0xB7 => {
                let a = self.regs.a;
                self.write(bus, addr, a);
                self.logic_flags(a);
            }

            // EORA
            0x88 | 0x98 | 0xA8 | 0xB8 => {
                let byte = self.read(bus, addr);
                let result = self.regs.a ^ byte;
                self.regs.a = self.logic_flags(result);
            }

            // ADCA
            0x89 | 0x99 | 0xA9 | 0xB9 => {
                let byte = self.read(bus, addr);
                self.regs.a = self.do_adc(self.regs.a, byte);
            }

            // ORAA
            0x8A | 0x9A | 0xAA | 0xBA => {
                let byte = self.read(bus, addr);
                let result = self.regs.a | byte;
                self.regs.a = self.logic_flags(result);
            }

            // ADDA
            0x8B | 0x9B | 0xAB | 0xBB => {
                let byte = self.read(bus, addr);
                self.regs.a = self.do_add(self.regs.a, byte);
            }

            // CPX
            0x8C | 0x9C | 0xAC | 0xBC => {
                let word = self.read_word(bus, addr);
                self.do_cpx(word);
            }

            // BSR
            0x8D => {
                let pc = self.regs.pc;
                self.push_word(bus, pc);
                self.regs.pc = addr;
            }

            // LDS
            0x8E | 0x9E | 0xAE | 0xBE => {
                let word = self.read_word(bus, addr);
                self.regs.sp = word;
                self.logic_flags16(word);
            }

            // JSR
            0x9D | 0xAD | 0xBD => {
                let pc = self.regs.pc;
                self.push_word(bus, pc);
                self.regs.pc = addr;
            }

            // STS
            0x9F | 0xAF | 0xBF => {
                let sp = self.regs.sp;
                self.write_word(bus, addr, sp);
                self.logic_flags16(sp);
            }

            // SUBB
            0xC0 | 0xD0 | 0xE0 | 0xF0 => {
                let byte = self.read(bus, addr);
                self.regs.b = self.do_sub(self.regs.b, byte);
            }

            // CMPB
            0xC1 | 0xD1 | 0xE1 | 0xF1 => {
                let byte = self.read(bus, addr);
                self.do_cmp(self.regs.b, byte);
            }

            // SBCB
            0xC2 | 0xD2 | 0xE2 | 0xF2 => {
                let byte = self.read(bus, addr);
                self.regs.b = self.do_sbc(self.regs.b, byte);
            }

            // ADDD
            0xC3 | 0xD3 | 0xE3 | 0xF3 => {
                let word = self.read_word(bus, addr);
                self.do_addd(word);
            }

            // ANDB
            0xC4 | 0xD4 | 0xE4 | 0xF4 => {
                let byte = self.read(bus, addr);
                let result = self.regs.b & byte;
                self.regs.b = self.logic_flags(result);
            }

            // BITB
            0xC5 | 0xD5 | 0xE5 | 0xF5 => {
                let byte = self.read(bus, addr);
                let result = self.regs.b & byte;
                self.logic_flags(result);
            }

            // LDAB
            0xC6 | 0xD6 | 0xE6 | 0xF6 => {
                let byte = self.read(bus, addr);
                self.regs.b = self.logic_flags(byte);
            }

            // STAB
            0xD7 | 0xE7 | 0xF7 => {
                let b = self.regs.b;
                self.write(bus, addr, b);
                self.logic_flags(b);
            }

            // EORB
            0xC8 | 0xD8 | 0xE8 | 0xF8 => {
                let byte = self.read(bus, addr);
                let result = self.regs.b ^ byte;
                self.regs.b = self.logic_flags(result);
            }

            // ADCB
            0xC9 | 0xD9 | 0xE9 | 0xF9 => {
                let byte = self.read(bus, addr);
                self.regs.b = self.do_adc(self.regs.b, byte);
            }

            // ORAB
            0xCA | 0xDA | 0xEA | 0xFA => {
                let byte = self.read(bus, addr);
                let result = self.regs.b | byte;
                self.regs.b = self.logic_flags(result);
            }

            // ADDB
            0xCB | 0xDB | 0xEB | 0xFB => {
                let byte = self.read(bus, addr);
                self.regs.b = self.do_add(self.regs.b, byte);
            }

            // LDD
            0xCC | 0xDC | 0xEC | 0xFC => {
                let word = self.read_word(bus, addr);
                self.regs.set_d(word);
                self.logic_flags16(word);
            }

            // STD
            0xDD | 0xED | 0xFD => {
                let d = self.regs.d();
                self.write_word(bus, addr, d);
                self.logic_flags16(d);
            }

            // LDX
            0xCE | 0xDE | 0xEE | 0xFE => {
                let word = self.read_word(bus, addr);
                self.regs.x = word;
                self.logic_flags16(word);
            }

            // STX
            0xDF | 0xEF | 0xFF => {
                let x = self.regs.x;
                self.write_word(bus, addr, x);
                self.logic_flags16(x);
            }

            _ => self.state = State::Exception(opcode),
        }

        cycles
    }

    /// Addition flags and result. Carry in is 0 or 1.
    fn add_result(&mut self, op1: u8, op2: u8, carry: u8) -> u8 {
        let raw = u16::from(op1) + u16::from(op2) + u16::from(carry);
        let result = raw as u8;
        self.regs.cc.set_if(C, raw & 0x100 != 0);
        self.regs.cc.set_if(V, (op1 ^ result) & (op2 ^ result) & 0x80 != 0);
        self.regs.cc.set_if(H, ((op1 ^ op2) ^ result) & 0x10 != 0);
        self.regs.cc.update_nz(result);
        result
    }

    /// Subtraction flags and result. Borrow in is 0 or 1. Half carry is
    /// not touched: on the 6803 it is only meaningful after additions.
    fn sub_result(&mut self, op1: u8, op2: u8, borrow: u8) -> u8 {
        let raw = u16::from(op1)
            .wrapping_sub(u16::from(op2))
            .wrapping_sub(u16::from(borrow));
        let result = raw as u8;
        self.regs.cc.set_if(C, raw & 0x100 != 0);
        self.regs.cc.set_if(V, (op1 ^ result) & (!op2 ^ result) & 0x80 != 0);
        self.regs.cc.update_nz(result);
        result
    }

    fn do_add(&mut self, acc: u8, byte: u8) -> u8 {
        self.add_result(acc, byte, 0)
    }

    fn do_adc(&mut self, acc: u8, byte: u8) -> u8 {
        let carry = u8::from(self.regs.cc.is_set(C));
        self.add_result(acc, byte, carry)
    }

    fn do_sub(&mut self, acc: u8, byte: u8) -> u8 {
        self.sub_result(acc, byte, 0)
    }

    fn do_sbc(&mut self, acc: u8, byte: u8) -> u8 {
        let borrow = u8::from(self.regs.cc.is_set(C));
        self.sub_result(acc, byte, borrow)
    }

    fn do_cmp(&mut self, acc: u8, byte: u8) {
        self.sub_result(acc, byte, 0);
    }

    /// NEG: two's complement of the operand.
    fn do_neg(&mut self, byte: u8) -> u8 {
        self.sub_result(0, byte, 0)
    }

    /// NGC (undocumented): two's complement including the carry.
    fn do_ngc(&mut self, byte: u8) -> u8 {
        let borrow = u8::from(self.regs.cc.is_set(C));
        self.sub_result(0, byte, borrow)
    }

    fn do_com(&mut self, byte: u8) -> u8 {
        let result = !byte;
        self.regs.cc.set(C);
        self.regs.cc.clear(V);
        self.regs.cc.update_nz(result);
        result
    }

    fn do_clr(&mut self) -> u8 {
        self.regs.cc.clear(N);
        self.regs.cc.clear(V);
        self.regs.cc.clear(C);
        self.regs.cc.set(Z);
        0
    }

    fn do_tst(&mut self, byte: u8) {
        self.regs.cc.clear(V);
        self.regs.cc.clear(C);
        self.regs.cc.update_nz(byte);
    }

    fn do_inc(&mut self, byte: u8) -> u8 {
        let result = byte.wrapping_add(1);
        self.regs.cc.set_if(V, byte == 0x7F);
        self.regs.cc.update_nz(result);
        result
    }

    fn do_dec(&mut self, byte: u8) -> u8 {
        let result = byte.wrapping_sub(1);
        self.regs.cc.set_if(V, byte == 0x80);
        self.regs.cc.update_nz(result);
        result
    }

    /// V = N ^ C, the rule shared by every shift and rotate.
    fn set_shift_v(&mut self) {
        let n = self.regs.cc.is_set(N);
        let c = self.regs.cc.is_set(C);
        self.regs.cc.set_if(V, n != c);
    }

    fn do_asl(&mut self, byte: u8) -> u8 {
        let result = byte << 1;
        self.regs.cc.set_if(C, byte & 0x80 != 0);
        self.regs.cc.update_nz(result);
        self.set_shift_v();
        result
    }

    fn do_asr(&mut self, byte: u8) -> u8 {
        let result = (byte >> 1) | (byte & 0x80);
        self.regs.cc.set_if(C, byte & 0x01 != 0);
        self.regs.cc.update_nz(result);
        self.set_shift_v();
        result
    }

    fn do_lsr(&mut self, byte: u8) -> u8 {
        let result = byte >> 1;
        self.regs.cc.set_if(C, byte & 0x01 != 0);
        self.regs.cc.update_nz(result);
        self.set_shift_v();
        result
    }

    fn do_rol(&mut self, byte: u8) -> u8 {
        let carry = u8::from(self.regs.cc.is_set(C));
        let result = (byte << 1) | carry;
        self.regs.cc.set_if(C, byte & 0x80 != 0);
        self.regs.cc.update_nz(result);
        self.set_shift_v();
        result
    }

    fn do_ror(&mut self, byte: u8) -> u8 {
        let carry = u8::from(self.regs.cc.is_set(C));
        let result = (byte >> 1) | (carry << 7);
        self.regs.cc.set_if(C, byte & 0x01 != 0);
        self.regs.cc.update_nz(result);
        self.set_shift_v();
        result
    }

    fn do_lsrd(&mut self) {
        let d = self.regs.d();
        let result = d >> 1;
        self.regs.cc.set_if(C, d & 0x0001 != 0);
        self.regs.cc.update_nz16(result);
        self.set_shift_v();
        self.regs.set_d(result);
    }

    fn do_asld(&mut self) {
        let d = self.regs.d();
        let result = d << 1;
        self.regs.cc.set_if(C, d & 0x8000 != 0);
        self.regs.cc.update_nz16(result);
        self.set_shift_v();
        self.regs.set_d(result);
    }

    fn do_addd(&mut self, word: u16) {
        let acc = self.regs.d();
        let raw = u32::from(acc) + u32::from(word);
        let result = raw as u16;
        self.regs.cc.set_if(C, raw & 0x1_0000 != 0);
        self.regs.cc.set_if(V, (acc ^ result) & (word ^ result) & 0x8000 != 0);
        self.regs.cc.update_nz16(result);
        self.regs.set_d(result);
    }

    fn do_subd(&mut self, word: u16) {
        let acc = self.regs.d();
        let raw = u32::from(acc).wrapping_sub(u32::from(word));
        let result = raw as u16;
        self.regs.cc.set_if(C, raw & 0x1_0000 != 0);
        self.regs.cc.set_if(V, (acc ^ result) & (!word ^ result) & 0x8000 != 0);
        self.regs.cc.update_nz16(result);
        self.regs.set_d(result);
    }

    /// CPX sets N, Z and V only; carry is untouched.
    fn do_cpx(&mut self, word: u16) {
        let x = self.regs.x;
        let result = x.wrapping_sub(word);
        self.regs.cc.set_if(V, (x ^ result) & (!word ^ result) & 0x8000 != 0);
        self.regs.cc.update_nz16(result);
    }

    /// Decimal adjust A after a BCD addition. Carry accumulates: a set
    /// carry stays set through the adjust.
    fn do_daa(&mut self) {
        let a = self.regs.a;
        let high = a & 0xF0;
        let low = a & 0x0F;

        let mut adjusted = u16::from(a);
        if low > 0x09 || self.regs.cc.is_set(H) {
            adjusted += 0x06;
        }
        if high > 0x80 && low > 0x09 {
            adjusted += 0x60;
        } else if high > 0x90 || self.regs.cc.is_set(C) {
            adjusted += 0x60;
        }

        let result = adjusted as u8;
        self.regs.a = result;
        if adjusted & 0x100 != 0 {
            self.regs.cc.set(C);
        }
        self.regs.cc.clear(V);
        self.regs.cc.update_nz(result);
    }

    /// Loads, stores, transfers and logic ops: N and Z from the value,
    /// V cleared, C untouched.
    fn logic_flags(&mut self, value: u8) -> u8 {
        self.regs.cc.clear(V);
        self.regs.cc.update_nz(value);
        value
    }

    fn logic_flags16(&mut self, value: u16) {
        self.regs.cc.clear(V);
        self.regs.cc.update_nz16(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{TCSR_ETOI, TCSR_TOF};

    struct TestBus {
        mem: Vec<u8>,
    }

    impl Bus for TestBus {
        fn read(&mut self, address: u16) -> u8 {
            self.mem[usize::from(address)]
        }

        fn write(&mut self, address: u16, value: u8) {
            self.mem[usize::from(address)] = value;
        }
    }

    const ORIGIN: u16 = 0x4000;

    /// CPU ready to execute `program` at 0x4000, stack below 0x4FFF,
    /// reset vector pointing at the program.
    fn make_cpu(program: &[u8]) -> (Mc6803, TestBus) {
        let mut bus = TestBus {
            mem: vec![0; 0x1_0000],
        };
        bus.mem[0xFFFE] = (ORIGIN >> 8) as u8;
        bus.mem[0xFFFF] = ORIGIN as u8;
        let start = usize::from(ORIGIN);
        bus.mem[start..start + program.len()].copy_from_slice(program);

        let mut cpu = Mc6803::new();
        cpu.state = State::Executing;
        cpu.regs.pc = ORIGIN;
        cpu.regs.sp = 0x4FFF;
        (cpu, bus)
    }

    #[test]
    fn add_7f_plus_1_sets_overflow_not_carry() {
        // LDAA #$7F / ADDA #$01
        let (mut cpu, mut bus) = make_cpu(&[0x86, 0x7F, 0x8B, 0x01]);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.cc.is_set(V));
        assert!(!cpu.regs.cc.is_set(C));
        assert!(cpu.regs.cc.is_set(N));
        assert!(cpu.regs.cc.is_set(H));
    }

    #[test]
    fn add_ff_plus_1_sets_carry_and_zero_not_overflow() {
        // LDAA #$FF / ADDA #$01
        let (mut cpu, mut bus) = make_cpu(&[0x86, 0xFF, 0x8B, 0x01]);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0x00);
        assert!(cpu.regs.cc.is_set(C));
        assert!(cpu.regs.cc.is_set(Z));
        assert!(!cpu.regs.cc.is_set(V));
    }

    #[test]
    fn sub_borrow_sets_carry() {
        // LDAA #$00 / SUBA #$01
        let (mut cpu, mut bus) = make_cpu(&[0x86, 0x00, 0x80, 0x01]);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0xFF);
        assert!(cpu.regs.cc.is_set(C));
        assert!(cpu.regs.cc.is_set(N));
    }

    #[test]
    fn reset_vectors_pc_and_masks_interrupts() {
        let (mut cpu, mut bus) = make_cpu(&[0x01, 0x01, 0x01]);
        cpu.regs.pc = 0x1234;
        cpu.request_reset();
        cpu.run_scanline(&mut bus);
        assert_eq!(cpu.state, State::Executing);
        assert!(cpu.regs.cc.is_set(I));
        assert!(cpu.regs.pc > ORIGIN);
    }

    #[test]
    fn branch_to_self_consumes_whole_budget() {
        // BRA *: 3 cycles, 19 iterations fill the 57-cycle line exactly.
        let (mut cpu, mut bus) = make_cpu(&[0x20, 0xFE]);
        cpu.run_scanline(&mut bus);
        assert_eq!(cpu.regs.pc, ORIGIN);
        assert_eq!(cpu.scanline_cycles, 0);
    }

    #[test]
    fn scanline_overrun_carries_into_next_line() {
        // NOP is 2 cycles: 29 retire for 58 cycles, leaving a 1-cycle
        // deficit that shortens the next line.
        let (mut cpu, mut bus) = make_cpu(&[0x01; 0x100]);
        cpu.run_scanline(&mut bus);
        assert_eq!(cpu.regs.pc, ORIGIN + 29);
        assert_eq!(cpu.scanline_cycles, 1);

        cpu.run_scanline(&mut bus);
        assert_eq!(cpu.regs.pc, ORIGIN + 29 + 28);
        assert_eq!(cpu.scanline_cycles, 0);
    }

    #[test]
    fn illegal_opcode_raises_exception_and_sticks() {
        let (mut cpu, mut bus) = make_cpu(&[0x12, 0x01]);
        assert_eq!(cpu.run_scanline(&mut bus), State::Exception(0x12));

        let pc = cpu.regs.pc;
        assert_eq!(cpu.run_scanline(&mut bus), State::Exception(0x12));
        assert_eq!(cpu.regs.pc, pc);
    }

    #[test]
    fn reset_recovers_from_exception() {
        let (mut cpu, mut bus) = make_cpu(&[0x12]);
        cpu.run_scanline(&mut bus);
        assert!(matches!(cpu.state, State::Exception(_)));

        cpu.request_reset();
        cpu.run_scanline(&mut bus);
        assert_eq!(cpu.state, State::Executing);
    }

    #[test]
    fn swi_and_rti_round_trip() {
        // SWI / (vector target) RTI
        let (mut cpu, mut bus) = make_cpu(&[0x3F, 0x01]);
        bus.mem[0xFFFA] = 0x50;
        bus.mem[0xFFFB] = 0x00;
        bus.mem[0x5000] = 0x3B; // RTI

        let sp_before = cpu.regs.sp;
        cpu.regs.a = 0xAA;
        cpu.regs.b = 0xBB;
        cpu.regs.x = 0x1234;

        cpu.step(&mut bus);
        assert_eq!(cpu.regs.pc, 0x5000);
        assert!(cpu.regs.cc.is_set(I));
        assert_eq!(cpu.regs.sp, sp_before - 7);

        cpu.step(&mut bus);
        assert_eq!(cpu.regs.pc, ORIGIN + 1);
        assert_eq!(cpu.regs.sp, sp_before);
        assert!(!cpu.regs.cc.is_set(I));
        assert_eq!(cpu.regs.a, 0xAA);
        assert_eq!(cpu.regs.x, 0x1234);
    }

    #[test]
    fn wai_halts_until_timer_overflow() {
        // Enable the overflow interrupt, park the counter just below the
        // wrap, then WAI. The timer ticks while halted and the overflow
        // resumes execution through 0xFFF2.
        let (mut cpu, mut bus) = make_cpu(&[0x3E]);
        bus.mem[0xFFF2] = 0x60;
        bus.mem[0xFFF3] = 0x00;
        bus.mem[0x6000] = 0x01; // NOP at the service routine
        cpu.timer.tcsr = TCSR_ETOI;
        cpu.timer.counter = 0xFF00;

        let sp_before = cpu.regs.sp;
        cpu.step(&mut bus);
        assert_eq!(cpu.state, State::Halted);
        assert_eq!(cpu.regs.sp, sp_before - 7);

        // 0xFF (wrap distance) / 57 cycles per halted line.
        let mut lines = 0;
        while cpu.state == State::Halted {
            cpu.run_scanline(&mut bus);
            lines += 1;
            assert!(lines < 10, "timer overflow never woke the CPU");
        }

        assert_eq!(cpu.state, State::Executing);
        assert!(cpu.regs.cc.is_set(I));
        assert!(cpu.regs.pc >= 0x6000);
        // The frame stays stacked for the RTI at the end of the routine:
        // PC low at the highest address, then PC high, X, A, B, CC.
        assert_eq!(bus.mem[usize::from(sp_before)], ORIGIN as u8 + 1);
        assert_eq!(bus.mem[usize::from(sp_before) - 1], (ORIGIN >> 8) as u8);
    }

    #[test]
    fn timer_interrupt_pushes_frame_and_vectors() {
        let (mut cpu, mut bus) = make_cpu(&[0x01, 0x01]);
        bus.mem[0xFFF2] = 0x60;
        bus.mem[0xFFF3] = 0x00;
        bus.mem[0x6000] = 0x01;
        cpu.timer.tcsr = TCSR_ETOI | TCSR_TOF;

        let sp_before = cpu.regs.sp;
        let cycles = cpu.step(&mut bus);

        // 12 dispatch cycles plus the NOP fetched at the vector target.
        assert_eq!(cycles, 14);
        assert_eq!(cpu.regs.sp, sp_before - 7);
        assert_eq!(cpu.regs.pc, 0x6001);
        assert!(cpu.regs.cc.is_set(I));
        // PC low pushed first, at the highest address.
        assert_eq!(bus.mem[usize::from(sp_before)], ORIGIN as u8);
        assert_eq!(bus.mem[usize::from(sp_before) - 1], (ORIGIN >> 8) as u8);
    }

    #[test]
    fn undocumented_ngc_memory_form_hits_address_zero() {
        let (mut cpu, mut bus) = make_cpu(&[0x62]);
        bus.mem[0x0000] = 0x01;
        cpu.step(&mut bus);
        assert_eq!(bus.mem[0x0000], 0xFF);
        assert!(cpu.regs.cc.is_set(C));
        assert_eq!(cpu.regs.pc, ORIGIN + 1);
    }

    #[test]
    fn undocumented_accumulator_ops() {
        // SEC / SEXA / CLB
        let (mut cpu, mut bus) = make_cpu(&[0x0D, 0x02, 0x00]);
        cpu.regs.b = 0x55;
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0xFF);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.b, 0x00);
        // CLB leaves flags alone.
        assert!(!cpu.regs.cc.is_set(Z));
    }

    #[test]
    fn daa_adjusts_bcd_sum_and_accumulates_carry() {
        // LDAA #$99 / ADDA #$99 / DAA: 99+99 = 198, BCD 98 carry set.
        let (mut cpu, mut bus) = make_cpu(&[0x86, 0x99, 0x8B, 0x99, 0x19]);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0x32);
        assert!(cpu.regs.cc.is_set(C));
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0x98);
        assert!(cpu.regs.cc.is_set(C));
    }

    #[test]
    fn mul_sets_carry_from_result_bit_7() {
        let (mut cpu, mut bus) = make_cpu(&[0x3D]);
        cpu.regs.a = 0x0A;
        cpu.regs.b = 0x14;
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.d(), 200);
        assert!(cpu.regs.cc.is_set(C));
    }

    #[test]
    fn cpx_leaves_carry_untouched() {
        // SEC / CPX #$0001 with X = 0.
        let (mut cpu, mut bus) = make_cpu(&[0x0D, 0x8C, 0x00, 0x01]);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert!(cpu.regs.cc.is_set(C));
        assert!(cpu.regs.cc.is_set(N));
        assert!(!cpu.regs.cc.is_set(Z));
    }

    #[test]
    fn shift_overflow_tracks_n_xor_c() {
        // LDAA #$40 / ASLA: result 0x80, C clear, N set, so V set.
        let (mut cpu, mut bus) = make_cpu(&[0x86, 0x40, 0x48]);
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.a, 0x80);
        assert!(cpu.regs.cc.is_set(V));
        assert!(cpu.regs.cc.is_set(N));
        assert!(!cpu.regs.cc.is_set(C));
    }

    #[test]
    fn jsr_and_rts_round_trip() {
        // JSR $5000 / ... / (at 0x5000) RTS
        let (mut cpu, mut bus) = make_cpu(&[0xBD, 0x50, 0x00, 0x01]);
        bus.mem[0x5000] = 0x39;
        let sp_before = cpu.regs.sp;

        cpu.step(&mut bus);
        assert_eq!(cpu.regs.pc, 0x5000);
        assert_eq!(cpu.regs.sp, sp_before - 2);

        cpu.step(&mut bus);
        assert_eq!(cpu.regs.pc, ORIGIN + 3);
        assert_eq!(cpu.regs.sp, sp_before);
    }

    #[test]
    fn counter_reads_through_cpu_are_latched() {
        // STAA $09 forces the counter to 0xFFF8 and stages the high
        // byte; STAA $0A installs the pair. The later high-byte read
        // latches the low byte so the pair is coherent.
        let program = [
            0x86, 0x12, // LDAA #$12
            0x97, 0x09, // STAA $09
            0x86, 0x34, // LDAA #$34
            0x97, 0x0A, // STAA $0A   -> counter = 0x1234
            0x96, 0x09, // LDAA $09   -> ticks 3 first: counter = 0x1237
            0xD6, 0x0A, // LDAB $0A   -> latched low byte
        ];
        let (mut cpu, mut bus) = make_cpu(&program);
        for _ in 0..6 {
            cpu.step(&mut bus);
        }
        assert_eq!(cpu.regs.a, 0x12);
        assert_eq!(cpu.regs.b, 0x37);
    }

    #[test]
    fn halted_cpu_still_clocks_the_timer() {
        let (mut cpu, mut bus) = make_cpu(&[0x3E]);
        cpu.step(&mut bus);
        assert_eq!(cpu.state, State::Halted);

        let counter = cpu.timer.counter;
        cpu.run_scanline(&mut bus);
        assert_eq!(cpu.state, State::Halted);
        assert_eq!(cpu.timer.counter, counter + 57);
    }

    #[test]
    fn inx_dex_touch_only_zero_flag() {
        // SEC to give a flag that must survive, then DEX from 1 to 0.
        let (mut cpu, mut bus) = make_cpu(&[0x0D, 0x09, 0x08]);
        cpu.regs.x = 0x0001;
        cpu.step(&mut bus);
        cpu.step(&mut bus);
        assert_eq!(cpu.regs.x, 0x0000);
        assert!(cpu.regs.cc.is_set(Z));
        assert!(cpu.regs.cc.is_set(C));

        cpu.step(&mut bus);
        assert_eq!(cpu.regs.x, 0x0001);
        assert!(!cpu.regs.cc.is_set(Z));
    }
}
