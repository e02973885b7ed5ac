//! VDG mode decode.
//!
//! The control byte latched by the host machine drives mode selection: bit
//! 0x20 switches from alphanumeric to graphics, and in graphics the three
//! GM bits pick one of eight resolutions. In alphanumeric operation bit
//! 0x04 selects SemiGraphics6. SemiGraphics4 is never selected by the
//! control byte; it is chosen per display byte (bit 7 set).

/// Graphics/alpha select (A/G).
const MODE_GRAPHICS: u8 = 0x20;
/// GM0..GM2 resolution select bits.
const MODE_GM0: u8 = 0x10;
const MODE_GM1: u8 = 0x08;
const MODE_GM2: u8 = 0x04;
/// In alpha operation, selects SemiGraphics6 (A/S).
const MODE_SEMI: u8 = 0x04;

/// Colour set select bit of the control byte.
pub const CSS: u8 = 0x40;

/// Display modes of the MC6847.
///
/// All rows of the hardware mode table are present, although the MC-10
/// control register only reaches the internal alphanumerics, SemiGraphics6
/// and the eight graphics modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// 32x16 text from the internal character generator.
    AlphaInternal,
    /// 32x16 text from an external character ROM.
    AlphaExternal,
    /// 64x32 colour blocks, selected per byte in alpha operation.
    SemiGraphics4,
    /// 64x48 colour blocks.
    SemiGraphics6,
    SemiGraphics8,
    SemiGraphics12,
    SemiGraphics24,
    /// 64x64, four colours.
    Graphics1C,
    /// 128x64, two colours.
    Graphics1R,
    /// 128x64, four colours.
    Graphics2C,
    /// 128x96, two colours.
    Graphics2R,
    /// 128x96, four colours.
    Graphics3C,
    /// 128x192, two colours.
    Graphics3R,
    /// 128x192, four colours.
    Graphics6C,
    /// 256x192, two colours.
    Graphics6R,
    /// External DMA drives the data bus.
    Dma,
}

impl Mode {
    /// Framebuffer pixels per source pixel (per 2-bit group in the colour
    /// modes).
    #[must_use]
    pub const fn pixel_rep(self) -> usize {
        self.geometry().0
    }

    /// Framebuffer rows per source row.
    #[must_use]
    pub const fn row_rep(self) -> usize {
        self.geometry().1
    }

    /// Bytes of display memory the mode consumes.
    #[must_use]
    pub const fn window_bytes(self) -> usize {
        self.geometry().2
    }

    const fn geometry(self) -> (usize, usize, usize) {
        match self {
            Mode::AlphaInternal
            | Mode::AlphaExternal
            | Mode::SemiGraphics4
            | Mode::SemiGraphics6 => (1, 1, 512),
            Mode::SemiGraphics8 => (1, 1, 2048),
            Mode::SemiGraphics12 => (1, 1, 3072),
            Mode::SemiGraphics24 => (1, 1, 6144),
            Mode::Graphics1C => (4, 3, 1024),
            Mode::Graphics1R => (2, 3, 1024),
            Mode::Graphics2C => (2, 3, 2048),
            Mode::Graphics2R => (2, 2, 1536),
            Mode::Graphics3C => (2, 2, 3072),
            Mode::Graphics3R => (2, 1, 3072),
            Mode::Graphics6C => (2, 1, 6144),
            Mode::Graphics6R | Mode::Dma => (1, 1, 6144),
        }
    }
}

/// Decode the control byte into a display mode.
#[must_use]
pub fn mode_for(control_byte: u8) -> Mode {
    if control_byte & MODE_GRAPHICS != 0 {
        let mut gm = 0;
        if control_byte & MODE_GM0 != 0 {
            gm |= 0x01;
        }
        if control_byte & MODE_GM1 != 0 {
            gm |= 0x02;
        }
        if control_byte & MODE_GM2 != 0 {
            gm |= 0x04;
        }
        match gm {
            0x00 => Mode::Graphics1C,
            0x01 => Mode::Graphics1R,
            0x02 => Mode::Graphics2C,
            0x03 => Mode::Graphics2R,
            0x04 => Mode::Graphics3C,
            0x05 => Mode::Graphics3R,
            0x06 => Mode::Graphics6C,
            _ => Mode::Graphics6R,
        }
    } else if control_byte & MODE_SEMI != 0 {
        Mode::SemiGraphics6
    } else {
        Mode::AlphaInternal
    }
}

/// Colour set base index: 1 for the green set, 5 for the buff set.
#[must_use]
pub const fn colour_set_base(control_byte: u8) -> usize {
    if control_byte & CSS != 0 { 5 } else { 1 }
}
