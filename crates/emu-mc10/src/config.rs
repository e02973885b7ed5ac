//! MC-10 model configuration.

/// Memory fit of the machine being emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mc10Model {
    /// Stock MC-10 with the 16K expansion pack: 20K of RAM ending at $8FFF.
    Ram20K,
    /// Third-party 32K expansion: RAM runs all the way to the I/O window
    /// at $BF00.
    Ram32K,
    /// MCX-128 cartridge: 32K layout plus low RAM at $0100-$3FFF, a
    /// swappable 4K auxiliary bank and an alternate 16K ROM.
    Mcx128,
}

/// Everything needed to build an [`crate::Mc10`].
#[derive(Debug, Clone)]
pub struct Mc10Config {
    pub model: Mc10Model,
    /// Microcolor BASIC image. Must be exactly 8K; the machine mirrors it
    /// at $C000 and $E000.
    pub rom: Vec<u8>,
    /// MCX BASIC image, exactly 16K. Only read by [`Mc10Model::Mcx128`];
    /// an MCX-128 without it behaves as a plain 32K machine.
    pub mcx_rom: Option<Vec<u8>>,
}

impl Mc10Config {
    /// A 20K machine around the given BASIC ROM.
    #[must_use]
    pub fn new(rom: Vec<u8>) -> Self {
        Self {
            model: Mc10Model::Ram20K,
            rom,
            mcx_rom: None,
        }
    }
}
