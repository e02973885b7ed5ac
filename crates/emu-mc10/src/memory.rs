//! MC-10 memory maps.
//!
//! The three machine fits differ only in how much RAM sits on the bus
//! and where the I/O window starts, so each is a separate implementation
//! behind the [`Mc10Memory`] trait. The CPU register page ($0000-$001F)
//! and the I/O window itself are resolved by the bus and never reach
//! these types.

/// Memory as seen from the system bus, minus the register page and the
/// I/O window.
pub trait Mc10Memory {
    /// Read a byte. Addresses below $20 never arrive here.
    fn read(&self, address: u16) -> u8;

    /// Write a byte. Writes to ROM and to unpopulated ranges drop.
    fn write(&mut self, address: u16, value: u8);

    /// First address of the I/O window. RAM ends here and ROM resumes
    /// at $C000.
    fn io_start(&self) -> u16;

    /// Copy a ROM image into the $C000-$FFFF region at the given offset.
    ///
    /// # Panics
    /// Panics if the image would overrun the 16K region.
    fn load_rom(&mut self, offset: usize, image: &[u8]);

    /// Install the alternate 16K ROM. Ignored outside the MCX-128.
    fn load_alternate_rom(&mut self, _image: &[u8]) {}

    /// Bank-select register write. Ignored outside the MCX-128.
    fn write_bank_select(&mut self, _value: u8) {}

    /// ROM-select register write. Ignored outside the MCX-128.
    fn write_rom_select(&mut self, _value: u8) {}

    /// Last value written to the bank-select register.
    fn bank_select(&self) -> u8 {
        0
    }

    /// Last value written to the ROM-select register.
    fn rom_select(&self) -> u8 {
        0
    }

    /// Backing bytes from $0020 up to the I/O window, in address order
    /// and unaffected by bank selection. Unpopulated ranges appear as
    /// $FF filler so the image covers the range contiguously.
    fn snapshot_ram(&self) -> Vec<u8>;

    /// Restore a [`Mc10Memory::snapshot_ram`] image.
    ///
    /// # Errors
    /// Rejects an image whose length does not match this memory fit.
    fn restore_ram(&mut self, data: &[u8]) -> Result<(), String>;

    /// The auxiliary 4K bank. Empty outside the MCX-128.
    fn aux_bank(&self) -> &[u8] {
        &[]
    }

    /// Restore the auxiliary 4K bank. Ignored outside the MCX-128.
    fn restore_aux_bank(&mut self, _data: &[u8]) {}
}

fn copy_rom(rom: &mut [u8; 0x4000], offset: usize, image: &[u8]) {
    assert!(
        offset + image.len() <= rom.len(),
        "ROM image of {} bytes at offset {offset} overruns the 16K region",
        image.len()
    );
    rom[offset..offset + image.len()].copy_from_slice(image);
}

/// Stock MC-10 with the 16K expansion pack.
///
/// - $0020-$00FF: CPU internal RAM
/// - $0100-$3FFF: unpopulated, the bus floats at the low address byte
/// - $4000-$8FFF: 20K RAM (internal 4K plus the pack)
/// - $9000-$BFFF: I/O window
/// - $C000-$FFFF: ROM, the 8K BASIC image mirrored twice
pub struct Memory20K {
    internal: [u8; 0xE0],
    ram: [u8; 0x5000],
    rom: [u8; 0x4000],
}

impl Memory20K {
    const SNAPSHOT_LEN: usize = 0x8FE0;

    #[must_use]
    pub fn new() -> Self {
        Self {
            internal: [0; 0xE0],
            ram: [0; 0x5000],
            rom: [0; 0x4000],
        }
    }
}

impl Default for Memory20K {
    fn default() -> Self {
        Self::new()
    }
}

impl Mc10Memory for Memory20K {
    fn read(&self, address: u16) -> u8 {
        match address {
            // Register page and I/O window: resolved by the bus.
            0x0000..0x0020 => 0x00,
            0x9000..0xC000 => 0xFF,
            0x0020..0x0100 => self.internal[address as usize - 0x20],
            0x0100..0x4000 => address as u8,
            0x4000..0x9000 => self.ram[address as usize - 0x4000],
            0xC000.. => self.rom[address as usize - 0xC000],
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0020..0x0100 => self.internal[address as usize - 0x20] = value,
            0x4000..0x9000 => self.ram[address as usize - 0x4000] = value,
            _ => {}
        }
    }

    fn io_start(&self) -> u16 {
        0x9000
    }

    fn load_rom(&mut self, offset: usize, image: &[u8]) {
        copy_rom(&mut self.rom, offset, image);
    }

    fn snapshot_ram(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(Self::SNAPSHOT_LEN);
        image.extend_from_slice(&self.internal);
        image.resize(0x3FE0, 0xFF);
        image.extend_from_slice(&self.ram);
        image
    }

    fn restore_ram(&mut self, data: &[u8]) -> Result<(), String> {
        if data.len() != Self::SNAPSHOT_LEN {
            return Err(format!(
                "RAM image is {} bytes, expected {}",
                data.len(),
                Self::SNAPSHOT_LEN
            ));
        }
        self.internal.copy_from_slice(&data[..0xE0]);
        self.ram.copy_from_slice(&data[0x3FE0..]);
        Ok(())
    }
}

/// MC-10 with a third-party 32K expansion.
///
/// Same map as [`Memory20K`] except RAM runs from $4000 to $BEFF and the
/// I/O window shrinks to $BF00-$BFFF.
pub struct Memory32K {
    internal: [u8; 0xE0],
    ram: [u8; 0x7F00],
    rom: [u8; 0x4000],
}

impl Memory32K {
    const SNAPSHOT_LEN: usize = 0xBEE0;

    #[must_use]
    pub fn new() -> Self {
        Self {
            internal: [0; 0xE0],
            ram: [0; 0x7F00],
            rom: [0; 0x4000],
        }
    }
}

impl Default for Memory32K {
    fn default() -> Self {
        Self::new()
    }
}

impl Mc10Memory for Memory32K {
    fn read(&self, address: u16) -> u8 {
        match address {
            0x0000..0x0020 => 0x00,
            0xBF00..0xC000 => 0xFF,
            0x0020..0x0100 => self.internal[address as usize - 0x20],
            0x0100..0x4000 => address as u8,
            0x4000..0xBF00 => self.ram[address as usize - 0x4000],
            0xC000.. => self.rom[address as usize - 0xC000],
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0020..0x0100 => self.internal[address as usize - 0x20] = value,
            0x4000..0xBF00 => self.ram[address as usize - 0x4000] = value,
            _ => {}
        }
    }

    fn io_start(&self) -> u16 {
        0xBF00
    }

    fn load_rom(&mut self, offset: usize, image: &[u8]) {
        copy_rom(&mut self.rom, offset, image);
    }

    fn snapshot_ram(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(Self::SNAPSHOT_LEN);
        image.extend_from_slice(&self.internal);
        image.resize(0x3FE0, 0xFF);
        image.extend_from_slice(&self.ram);
        image
    }

    fn restore_ram(&mut self, data: &[u8]) -> Result<(), String> {
        if data.len() != Self::SNAPSHOT_LEN {
            return Err(format!(
                "RAM image is {} bytes, expected {}",
                data.len(),
                Self::SNAPSHOT_LEN
            ));
        }
        self.internal.copy_from_slice(&data[..0xE0]);
        self.ram.copy_from_slice(&data[0x3FE0..]);
        Ok(())
    }
}

/// MCX-128 cartridge.
///
/// The 32K map gains RAM behind the previously unpopulated $0100-$3FFF
/// range, a 4K auxiliary bank that swaps over $4000-$4FFF, and a second
/// 16K ROM image. Two write-only registers in the I/O window control the
/// mapping: bank select at $BF00 (bit 0 set maps the auxiliary bank) and
/// ROM select at $BF01 (bit 0 set maps Microcolor BASIC instead of the
/// MCX image). The machine comes up with the MCX ROM mapped.
pub struct MemoryMcx128 {
    internal: [u8; 0xE0],
    low: [u8; 0x3F00],
    ram: [u8; 0x7F00],
    aux: [u8; 0x1000],
    basic: [u8; 0x4000],
    mcx: [u8; 0x4000],
    bank_select: u8,
    rom_select: u8,
}

impl MemoryMcx128 {
    const SNAPSHOT_LEN: usize = 0xBEE0;

    #[must_use]
    pub fn new() -> Self {
        Self {
            internal: [0; 0xE0],
            low: [0; 0x3F00],
            ram: [0; 0x7F00],
            aux: [0; 0x1000],
            basic: [0; 0x4000],
            mcx: [0; 0x4000],
            bank_select: 0,
            rom_select: 0,
        }
    }

    fn aux_mapped(&self) -> bool {
        self.bank_select & 0x01 != 0
    }
}

impl Default for MemoryMcx128 {
    fn default() -> Self {
        Self::new()
    }
}

impl Mc10Memory for MemoryMcx128 {
    fn read(&self, address: u16) -> u8 {
        match address {
            0x0000..0x0020 => 0x00,
            0xBF00..0xC000 => 0xFF,
            0x0020..0x0100 => self.internal[address as usize - 0x20],
            0x0100..0x4000 => self.low[address as usize - 0x100],
            0x4000..0x5000 if self.aux_mapped() => self.aux[address as usize - 0x4000],
            0x4000..0xBF00 => self.ram[address as usize - 0x4000],
            0xC000.. => {
                if self.rom_select & 0x01 == 0 {
                    self.mcx[address as usize - 0xC000]
                } else {
                    self.basic[address as usize - 0xC000]
                }
            }
        }
    }

    fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0020..0x0100 => self.internal[address as usize - 0x20] = value,
            0x0100..0x4000 => self.low[address as usize - 0x100] = value,
            0x4000..0x5000 if self.aux_mapped() => self.aux[address as usize - 0x4000] = value,
            0x4000..0xBF00 => self.ram[address as usize - 0x4000] = value,
            _ => {}
        }
    }

    fn io_start(&self) -> u16 {
        0xBF00
    }

    fn load_rom(&mut self, offset: usize, image: &[u8]) {
        copy_rom(&mut self.basic, offset, image);
    }

    fn load_alternate_rom(&mut self, image: &[u8]) {
        assert!(
            image.len() == 0x4000,
            "MCX ROM must be exactly 16384 bytes, got {}",
            image.len()
        );
        self.mcx.copy_from_slice(image);
    }

    fn write_bank_select(&mut self, value: u8) {
        self.bank_select = value & 0x01;
    }

    fn write_rom_select(&mut self, value: u8) {
        self.rom_select = value & 0x01;
    }

    fn bank_select(&self) -> u8 {
        self.bank_select
    }

    fn rom_select(&self) -> u8 {
        self.rom_select
    }

    fn snapshot_ram(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(Self::SNAPSHOT_LEN);
        image.extend_from_slice(&self.internal);
        image.extend_from_slice(&self.low);
        image.extend_from_slice(&self.ram);
        image
    }

    fn restore_ram(&mut self, data: &[u8]) -> Result<(), String> {
        if data.len() != Self::SNAPSHOT_LEN {
            return Err(format!(
                "RAM image is {} bytes, expected {}",
                data.len(),
                Self::SNAPSHOT_LEN
            ));
        }
        self.internal.copy_from_slice(&data[..0xE0]);
        self.low.copy_from_slice(&data[0xE0..0x3FE0]);
        self.ram.copy_from_slice(&data[0x3FE0..]);
        Ok(())
    }

    fn aux_bank(&self) -> &[u8] {
        &self.aux
    }

    fn restore_aux_bank(&mut self, data: &[u8]) {
        self.aux.copy_from_slice(data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ram_reads_back_what_was_written() {
        let mut memory = Memory20K::new();
        memory.write(0x4000, 0xAA);
        memory.write(0x8FFF, 0x55);
        memory.write(0x0020, 0x12);
        assert_eq!(memory.read(0x4000), 0xAA);
        assert_eq!(memory.read(0x8FFF), 0x55);
        assert_eq!(memory.read(0x0020), 0x12);
    }

    #[test]
    fn unpopulated_range_floats_at_the_low_address_byte() {
        let mut memory = Memory20K::new();
        memory.write(0x1234, 0xAA);
        assert_eq!(memory.read(0x1234), 0x34);
        assert_eq!(memory.read(0x0100), 0x00);
        assert_eq!(memory.read(0x3FFF), 0xFF);
    }

    #[test]
    fn rom_writes_are_ignored() {
        let mut memory = Memory32K::new();
        memory.load_rom(0, &[0x7E; 0x2000]);
        memory.write(0xC000, 0x00);
        assert_eq!(memory.read(0xC000), 0x7E);
    }

    #[test]
    fn rom_loads_at_an_offset() {
        let mut memory = Memory20K::new();
        memory.load_rom(0, &[0x11; 0x2000]);
        memory.load_rom(0x2000, &[0x22; 0x2000]);
        assert_eq!(memory.read(0xC000), 0x11);
        assert_eq!(memory.read(0xE000), 0x22);
    }

    #[test]
    #[should_panic(expected = "overruns the 16K region")]
    fn oversized_rom_image_panics() {
        let mut memory = Memory20K::new();
        memory.load_rom(0x2000, &[0; 0x2001]);
    }

    #[test]
    fn io_start_matches_the_fit() {
        assert_eq!(Memory20K::new().io_start(), 0x9000);
        assert_eq!(Memory32K::new().io_start(), 0xBF00);
        assert_eq!(MemoryMcx128::new().io_start(), 0xBF00);
    }

    #[test]
    fn ram_32k_runs_to_the_io_window() {
        let mut memory = Memory32K::new();
        memory.write(0xBEFF, 0x99);
        assert_eq!(memory.read(0xBEFF), 0x99);
    }

    #[test]
    fn mcx_low_ram_is_populated() {
        let mut memory = MemoryMcx128::new();
        memory.write(0x0100, 0x42);
        assert_eq!(memory.read(0x0100), 0x42);
    }

    #[test]
    fn mcx_bank_select_swaps_the_aux_window() {
        let mut memory = MemoryMcx128::new();
        memory.write(0x4000, 0x11);
        memory.write(0x5000, 0x33);

        memory.write_bank_select(0x01);
        assert_eq!(memory.read(0x4000), 0x00);
        memory.write(0x4000, 0x22);
        assert_eq!(memory.read(0x4000), 0x22);
        // Addresses past the 4K window stay on the main bank.
        assert_eq!(memory.read(0x5000), 0x33);

        memory.write_bank_select(0x00);
        assert_eq!(memory.read(0x4000), 0x11);
        assert_eq!(memory.aux_bank()[0], 0x22);
    }

    #[test]
    fn mcx_rom_select_swaps_the_images() {
        let mut memory = MemoryMcx128::new();
        memory.load_rom(0, &[0x11; 0x2000]);
        memory.load_alternate_rom(&[0x22; 0x4000]);

        // The MCX image is mapped at power-on.
        assert_eq!(memory.read(0xC000), 0x22);
        memory.write_rom_select(0x01);
        assert_eq!(memory.read(0xC000), 0x11);
        memory.write_rom_select(0x00);
        assert_eq!(memory.read(0xC000), 0x22);
    }

    #[test]
    #[should_panic(expected = "MCX ROM must be exactly 16384 bytes")]
    fn mis_sized_mcx_rom_panics() {
        let mut memory = MemoryMcx128::new();
        memory.load_alternate_rom(&[0; 0x2000]);
    }

    #[test]
    fn snapshot_round_trips_every_populated_range() {
        let mut memory = MemoryMcx128::new();
        memory.write(0x0020, 0xA1);
        memory.write(0x0100, 0xB2);
        memory.write(0x4000, 0xC3);
        memory.write(0xBEFF, 0xD4);

        let image = memory.snapshot_ram();
        assert_eq!(image.len(), 0xBEE0);

        let mut restored = MemoryMcx128::new();
        restored.restore_ram(&image).unwrap();
        assert_eq!(restored.read(0x0020), 0xA1);
        assert_eq!(restored.read(0x0100), 0xB2);
        assert_eq!(restored.read(0x4000), 0xC3);
        assert_eq!(restored.read(0xBEFF), 0xD4);
    }

    #[test]
    fn snapshot_fills_unpopulated_ranges() {
        let image = Memory20K::new().snapshot_ram();
        assert_eq!(image.len(), 0x8FE0);
        // $0100-$3FFF has no RAM behind it on this fit.
        assert_eq!(image[0xE0], 0xFF);
        assert_eq!(image[0x3FDF], 0xFF);
    }

    #[test]
    fn mis_sized_ram_image_is_rejected() {
        let mut memory = Memory20K::new();
        let err = memory.restore_ram(&[0; 16]).unwrap_err();
        assert!(err.contains("expected 36832"), "{err}");
    }
}
