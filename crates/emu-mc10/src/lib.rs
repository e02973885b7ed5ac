//! Tandy TRS-80 MC-10 emulator.
//!
//! An MC6803 at 0.89 MHz shares its bus with an MC6847 VDG and up to 32K
//! of RAM, with the CPU's on-chip ports wired straight to the keyboard
//! matrix and cassette input. Emulated time advances one NTSC scanline
//! at a time: 57 CPU cycles per line, 262 lines per frame, one VDG
//! redraw at each frame boundary.

mod bus;
#[cfg(feature = "capture")]
pub mod capture;
mod config;
mod keyboard;
mod mc10;
mod memory;
pub mod snapshot;
mod tape;

pub use bus::Mc10Bus;
pub use config::{Mc10Config, Mc10Model};
pub use keyboard::{KeyboardState, Mc10Key};
pub use mc10::{Mc10, SCANLINES_PER_FRAME, ScanlineEvent};
pub use memory::{Mc10Memory, Memory20K, Memory32K, MemoryMcx128};
pub use tape::{TapeDeck, TapeKind, TapeMotor, classify};
