//! Motorola MC6803 CPU emulator.
//!
//! Whole-instruction interpreter paced by a 57-cycle scanline budget,
//! with the on-chip 16-bit timer/counter advancing in lockstep. The
//! timer's register window (0x08-0x0C) is resolved inside the CPU, so
//! the bus never sees those addresses.

mod cpu;
mod flags;
mod opcodes;
mod registers;
mod timer;

pub use cpu::{
    Bus, CYCLES_PER_SCANLINE, Mc6803, State, VECTOR_COMPARE, VECTOR_OVERFLOW, VECTOR_RESET,
    VECTOR_SWI,
};
pub use flags::{C, Cc, H, I, N, V, Z};
pub use opcodes::{Mode, OPCODES, OpcodeInfo};
pub use registers::Registers;
pub use timer::{
    TCSR_EICI, TCSR_EOCI, TCSR_ETOI, TCSR_ICF, TCSR_IEDG, TCSR_OCF, TCSR_OLVL, TCSR_TOF,
    TIMER_REG_FIRST, TIMER_REG_LAST, Timer,
};
