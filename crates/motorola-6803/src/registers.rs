//! 6803 CPU registers.

use crate::Cc;

/// 6803 CPU register set.
///
/// The 6803 carries the 6800 programming model plus the 16-bit D pairing:
/// - A, B: 8-bit accumulators; together they form the 16-bit D (A is the
///   high byte)
/// - X: 16-bit index register
/// - SP: 16-bit stack pointer (points at the next free byte, grows downward)
/// - PC: 16-bit program counter
/// - CC: condition codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    /// Accumulator A (high byte of D).
    pub a: u8,
    /// Accumulator B (low byte of D).
    pub b: u8,
    /// Index register.
    pub x: u16,
    /// Stack pointer.
    pub sp: u16,
    /// Program counter.
    pub pc: u16,
    /// Condition codes.
    pub cc: Cc,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Create registers in power-on state. PC is loaded from the reset
    /// vector by the core, not here.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            b: 0,
            x: 0,
            sp: 0,
            pc: 0,
            cc: Cc::new(),
        }
    }

    /// The D accumulator: A and B as one 16-bit value, A on top.
    #[must_use]
    pub const fn d(&self) -> u16 {
        (self.a as u16) << 8 | self.b as u16
    }

    /// Split a 16-bit value back into A (high) and B (low).
    pub fn set_d(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.b = value as u8;
    }

    /// Push a value onto the stack, return the address written.
    ///
    /// The 6803 writes at SP and then decrements, so SP always points at
    /// the next free byte.
    pub fn push(&mut self) -> u16 {
        let addr = self.sp;
        self.sp = self.sp.wrapping_sub(1);
        addr
    }

    /// Pop a value from the stack, return the address to read.
    pub fn pop(&mut self) -> u16 {
        self.sp = self.sp.wrapping_add(1);
        self.sp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn d_pairs_a_high_b_low() {
        let mut regs = Registers::new();
        regs.a = 0x12;
        regs.b = 0x34;
        assert_eq!(regs.d(), 0x1234);

        regs.set_d(0xBEEF);
        assert_eq!(regs.a, 0xBE);
        assert_eq!(regs.b, 0xEF);
    }

    #[test]
    fn push_writes_then_decrements() {
        let mut regs = Registers::new();
        regs.sp = 0x4FFF;
        assert_eq!(regs.push(), 0x4FFF);
        assert_eq!(regs.sp, 0x4FFE);
    }

    #[test]
    fn pop_increments_then_reads() {
        let mut regs = Registers::new();
        regs.sp = 0x4FFE;
        assert_eq!(regs.pop(), 0x4FFF);
        assert_eq!(regs.sp, 0x4FFF);
    }

    #[test]
    fn stack_pointer_wraps() {
        let mut regs = Registers::new();
        regs.sp = 0x0000;
        assert_eq!(regs.push(), 0x0000);
        assert_eq!(regs.sp, 0xFFFF);
        assert_eq!(regs.pop(), 0x0000);
    }
}
