//! Motorola MC6847 VDG (Video Display Generator).
//!
//! The VDG turns a window of display memory (512 bytes to 6 KB depending on
//! mode) into a fixed 256x192 raster. Mode selection comes from a control
//! byte latched by the host machine; within alphanumeric operation each
//! display byte can still pick SemiGraphics4 through its top bit.
//!
//! # Standalone IC
//!
//! This crate has no dependencies. Display memory is reached through the
//! [`VideoMemory`] trait and finished frames leave through [`FrameSink`],
//! keeping the chip decoupled from any particular machine.
//!
//! # Rendering model
//!
//! Rendering is whole-frame: `render_frame` decodes the control byte and
//! redraws the framebuffer from the memory window in one pass. Every mode
//! fills the same raster; the graphics modes expand their bytes with a
//! per-mode pixel and row replication factor, the character modes tile
//! 32x16 cells of 8x12 pixels.

mod font;
mod mode;
mod palette;

pub use mode::{CSS, Mode, colour_set_base, mode_for};
pub use palette::PALETTE;

/// Framebuffer dimensions.
pub const FB_WIDTH: u32 = 256;
pub const FB_HEIGHT: u32 = 192;

/// Character grid of the alphanumeric and semigraphics modes.
const CHAR_COLS: usize = 32;
const CHAR_ROWS: usize = 16;
/// Character cell size in framebuffer pixels.
const CELL_WIDTH: usize = 8;
const CELL_HEIGHT: usize = 12;

const ROW_PX: usize = FB_WIDTH as usize;

/// Read access to the display memory window.
///
/// Offsets are relative to the start of the window (0x4000 on the MC-10)
/// and stay below the active mode's window size, at most 6144 bytes.
pub trait VideoMemory {
    fn video_read(&self, offset: u16) -> u8;
}

/// Consumer of finished frames.
pub trait FrameSink {
    /// Accept one complete ARGB32 frame of `FB_WIDTH * FB_HEIGHT` pixels.
    fn put_frame(&mut self, pixels: &[u32]);
}

/// Motorola MC6847 VDG.
pub struct Vdg {
    /// ARGB32 framebuffer.
    framebuffer: Vec<u32>,
}

impl Vdg {
    #[must_use]
    pub fn new() -> Self {
        Self {
            framebuffer: vec![palette::BLACK; (FB_WIDTH * FB_HEIGHT) as usize],
        }
    }

    /// Redraw the full frame from the display window.
    ///
    /// The control byte selects the mode. SemiGraphics8/12/24 and DMA are
    /// not reachable from it, so those arms leave the frame untouched.
    pub fn render_frame<M: VideoMemory>(&mut self, memory: &M, control_byte: u8) {
        let mode = mode_for(control_byte);
        match mode {
            Mode::AlphaInternal | Mode::SemiGraphics4 => {
                self.render_alpha_semi4(memory, control_byte);
            }
            Mode::AlphaExternal | Mode::SemiGraphics6 => {
                self.render_semi6(memory, control_byte);
            }
            Mode::Graphics1C | Mode::Graphics2C | Mode::Graphics3C | Mode::Graphics6C => {
                self.render_colour_graphics(memory, mode, control_byte);
            }
            Mode::Graphics1R | Mode::Graphics2R | Mode::Graphics3R => {
                self.render_resolution_graphics(memory, mode, control_byte);
            }
            Mode::Graphics6R => self.render_artifact_mono(memory, control_byte),
            Mode::SemiGraphics8 | Mode::SemiGraphics12 | Mode::SemiGraphics24 | Mode::Dma => {}
        }
    }

    /// Hand the current frame to an external sink.
    pub fn present<S: FrameSink>(&self, sink: &mut S) {
        sink.put_frame(&self.framebuffer);
    }

    /// Reference to the framebuffer (ARGB32).
    #[must_use]
    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    #[must_use]
    pub fn framebuffer_width(&self) -> u32 {
        FB_WIDTH
    }

    #[must_use]
    pub fn framebuffer_height(&self) -> u32 {
        FB_HEIGHT
    }

    /// Alphanumeric internal, with SemiGraphics4 selected per byte.
    fn render_alpha_semi4<M: VideoMemory>(&mut self, memory: &M, control_byte: u8) {
        let (text_fg, text_bg) = if control_byte & CSS != 0 {
            (palette::LIGHT_ORANGE, palette::DARK_ORANGE)
        } else {
            (palette::GREEN, palette::BLACK)
        };

        let mut out = 0;
        for char_row in 0..CHAR_ROWS {
            let row_offset = char_row * CHAR_COLS;
            for cell_row in 0..CELL_HEIGHT {
                for col in 0..CHAR_COLS {
                    let code = memory.video_read((row_offset + col) as u16);
                    if code & 0x80 != 0 {
                        // Block colour comes from bits 4-6, not from CSS.
                        let fg = PALETTE[1 + usize::from((code >> 4) & 0x07)];
                        self.draw_cell_row(out, font::sg4_row(code, cell_row), fg, palette::BLACK);
                    } else {
                        let mut pattern = font::glyph_row(code, cell_row);
                        if code & 0x40 != 0 {
                            pattern = !pattern; // Inverse video
                        }
                        self.draw_cell_row(out, pattern, text_fg, text_bg);
                    }
                    out += CELL_WIDTH;
                }
            }
        }
    }

    /// SemiGraphics6 (also what external alphanumerics would select).
    fn render_semi6<M: VideoMemory>(&mut self, memory: &M, control_byte: u8) {
        let base = colour_set_base(control_byte);

        let mut out = 0;
        for char_row in 0..CHAR_ROWS {
            let row_offset = char_row * CHAR_COLS;
            for cell_row in 0..CELL_HEIGHT {
                for col in 0..CHAR_COLS {
                    let code = memory.video_read((row_offset + col) as u16);
                    if code & 0x80 != 0 {
                        let fg = PALETTE[usize::from(code >> 6) + base];
                        self.draw_cell_row(out, font::sg6_row(code, cell_row), fg, palette::BLACK);
                    } else {
                        // MC-10 wiring: without bit 7 the byte itself shows
                        // as a raw dot pattern in the green text shades.
                        self.draw_cell_row(out, code, palette::LIGHT_GREEN, palette::DARK_GREEN);
                    }
                    out += CELL_WIDTH;
                }
            }
        }
    }

    /// Two-colour graphics: each bit is foreground or black.
    fn render_resolution_graphics<M: VideoMemory>(
        &mut self,
        memory: &M,
        mode: Mode,
        control_byte: u8,
    ) {
        let fg = PALETTE[colour_set_base(control_byte)];
        let rep = mode.pixel_rep();
        let mut line = [palette::BLACK; ROW_PX];
        let mut x = 0;
        let mut y = 0;

        for offset in 0..mode.window_bytes() {
            let byte = memory.video_read(offset as u16);
            match byte {
                // Solid bytes take the fill path.
                0x00 => {
                    line[x..x + 8 * rep].fill(palette::BLACK);
                    x += 8 * rep;
                }
                0xFF => {
                    line[x..x + 8 * rep].fill(fg);
                    x += 8 * rep;
                }
                _ => {
                    for bit in 0..8 {
                        let px = if byte & (0x80 >> bit) != 0 {
                            fg
                        } else {
                            palette::BLACK
                        };
                        line[x..x + rep].fill(px);
                        x += rep;
                    }
                }
            }
            if x >= ROW_PX {
                y = self.emit_line(&line, y, mode.row_rep());
                x = 0;
            }
        }
    }

    /// Four-colour graphics: 2-bit groups select from the CSS colour set.
    fn render_colour_graphics<M: VideoMemory>(
        &mut self,
        memory: &M,
        mode: Mode,
        control_byte: u8,
    ) {
        let base = colour_set_base(control_byte);
        let rep = mode.pixel_rep();
        let mut line = [palette::BLACK; ROW_PX];
        let mut x = 0;
        let mut y = 0;

        for offset in 0..mode.window_bytes() {
            let byte = memory.video_read(offset as u16);
            for group in 0..4 {
                let colour = PALETTE[base + usize::from((byte >> (6 - 2 * group)) & 0x03)];
                line[x..x + rep].fill(colour);
                x += rep;
            }
            if x >= ROW_PX {
                y = self.emit_line(&line, y, mode.row_rep());
                x = 0;
            }
        }
    }

    /// Highest resolution, one bit per pixel. The MC-10 has no colour burst
    /// circuit, so this renders as plain monochrome rather than NTSC
    /// artifact colours.
    fn render_artifact_mono<M: VideoMemory>(&mut self, memory: &M, control_byte: u8) {
        let fg = PALETTE[colour_set_base(control_byte)];
        let mut line = [palette::BLACK; ROW_PX];
        let mut x = 0;
        let mut y = 0;

        for offset in 0..Mode::Graphics6R.window_bytes() {
            let byte = memory.video_read(offset as u16);
            for bit in 0..8 {
                line[x] = if byte & (0x80 >> bit) != 0 {
                    fg
                } else {
                    palette::BLACK
                };
                x += 1;
            }
            if x >= ROW_PX {
                y = self.emit_line(&line, y, 1);
                x = 0;
            }
        }
    }

    /// Write one 8-pixel cell row at `out`, MSB first.
    fn draw_cell_row(&mut self, out: usize, pattern: u8, fg: u32, bg: u32) {
        for bit in 0..CELL_WIDTH {
            self.framebuffer[out + bit] = if pattern & (0x80 >> bit) != 0 { fg } else { bg };
        }
    }

    /// Copy a finished line into the framebuffer `row_rep` times, returning
    /// the next output row.
    fn emit_line(&mut self, line: &[u32; ROW_PX], y: usize, row_rep: usize) -> usize {
        let mut y = y;
        for _ in 0..row_rep {
            self.framebuffer[y * ROW_PX..(y + 1) * ROW_PX].copy_from_slice(line);
            y += 1;
        }
        y
    }
}

impl Default for Vdg {
    fn default() -> Self {
        Self::new()
    }
}
