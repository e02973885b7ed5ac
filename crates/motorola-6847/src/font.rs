//! Internal character generator and semigraphics block patterns.
//!
//! The character ROM holds 64 glyphs indexed by the low six bits of the
//! display byte: `@`, the uppercase letters, four symbols, then space and
//! the digit/punctuation range. Each glyph is a 5x7 dot matrix placed in
//! columns 2-6 of an 8x12 cell, two blank rows above and three below.

/// 5x7 dot patterns, one row per byte (low five bits used).
const GLYPHS: [[u8; 7]; 64] = [
    [0b01110, 0b10001, 0b10101, 0b10111, 0b10110, 0b10000, 0b01110], // 0x00 '@'
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // 0x01 'A'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // 0x02 'B'
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // 0x03 'C'
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110], // 0x04 'D'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // 0x05 'E'
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // 0x06 'F'
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // 0x07 'G'
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // 0x08 'H'
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 0x09 'I'
    [0b00001, 0b00001, 0b00001, 0b00001, 0b00001, 0b10001, 0b01110], // 0x0A 'J'
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // 0x0B 'K'
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // 0x0C 'L'
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // 0x0D 'M'
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // 0x0E 'N'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // 0x0F 'O'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // 0x10 'P'
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // 0x11 'Q'
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // 0x12 'R'
    [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110], // 0x13 'S'
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // 0x14 'T'
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // 0x15 'U'
    [0b10001, 0b10001, 0b10001, 0b01010, 0b01010, 0b00100, 0b00100], // 0x16 'V'
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001], // 0x17 'W'
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // 0x18 'X'
    [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100], // 0x19 'Y'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // 0x1A 'Z'
    [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110], // 0x1B '['
    [0b00000, 0b10000, 0b01000, 0b00100, 0b00010, 0b00001, 0b00000], // 0x1C backslash
    [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110], // 0x1D ']'
    [0b00100, 0b01110, 0b10101, 0b00100, 0b00100, 0b00100, 0b00100], // 0x1E up arrow
    [0b00000, 0b00100, 0b01000, 0b11111, 0b01000, 0b00100, 0b00000], // 0x1F left arrow
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000], // 0x20 ' '
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100], // 0x21 '!'
    [0b01010, 0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000], // 0x22 '"'
    [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010], // 0x23 '#'
    [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100], // 0x24 '$'
    [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011], // 0x25 '%'
    [0b01000, 0b10100, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101], // 0x26 '&'
    [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000], // 0x27 '\''
    [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010], // 0x28 '('
    [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000], // 0x29 ')'
    [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000], // 0x2A '*'
    [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000], // 0x2B '+'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00110, 0b00100, 0b01000], // 0x2C ','
    [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000], // 0x2D '-'
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100], // 0x2E '.'
    [0b00000, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b00000], // 0x2F '/'
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0x30 '0'
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 0x31 '1'
    [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111], // 0x32 '2'
    [0b11111, 0b00010, 0b00100, 0b00110, 0b00001, 0b10001, 0b01110], // 0x33 '3'
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 0x34 '4'
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 0x35 '5'
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 0x36 '6'
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 0x37 '7'
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 0x38 '8'
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 0x39 '9'
    [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000], // 0x3A ':'
    [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000], // 0x3B ';'
    [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010], // 0x3C '<'
    [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000], // 0x3D '='
    [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000], // 0x3E '>'
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100], // 0x3F '?'
];

/// One 8-pixel row of a character cell, MSB leftmost.
pub(crate) fn glyph_row(code: u8, cell_row: usize) -> u8 {
    match cell_row {
        2..=8 => GLYPHS[usize::from(code & 0x3F)][cell_row - 2] << 1,
        _ => 0x00,
    }
}

/// One 8-pixel row of a SemiGraphics4 cell: a 2x2 block pattern from the
/// low nibble, each block 4 pixels wide and 6 rows tall. Bit 3 is the top
/// left block, bit 0 the bottom right.
pub(crate) fn sg4_row(code: u8, cell_row: usize) -> u8 {
    let (left, right) = if cell_row < 6 {
        (code & 0x08, code & 0x04)
    } else {
        (code & 0x02, code & 0x01)
    };
    let mut row = 0x00;
    if left != 0 {
        row |= 0xF0;
    }
    if right != 0 {
        row |= 0x0F;
    }
    row
}

/// One 8-pixel row of a SemiGraphics6 cell: a 2x3 block pattern from the
/// low six bits, each block 4 pixels wide and 4 rows tall. Bit 5 is the
/// top left block, bit 0 the bottom right.
pub(crate) fn sg6_row(code: u8, cell_row: usize) -> u8 {
    let pair = (code >> (4 - 2 * (cell_row / 4))) & 0x03;
    let mut row = 0x00;
    if pair & 0x02 != 0 {
        row |= 0xF0;
    }
    if pair & 0x01 != 0 {
        row |= 0x0F;
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_rows_blank_outside_the_dot_matrix() {
        for cell_row in [0, 1, 9, 10, 11] {
            assert_eq!(glyph_row(0x01, cell_row), 0x00); // 'A'
        }
        assert_ne!(glyph_row(0x01, 2), 0x00);
    }

    #[test]
    fn glyph_index_ignores_the_top_two_bits() {
        assert_eq!(glyph_row(0x41, 5), glyph_row(0x01, 5));
        assert_eq!(glyph_row(0x81, 5), glyph_row(0x01, 5));
    }

    #[test]
    fn sg4_blocks_follow_the_low_nibble() {
        // Bit 3: top left block only.
        assert_eq!(sg4_row(0x88, 0), 0xF0);
        assert_eq!(sg4_row(0x88, 5), 0xF0);
        assert_eq!(sg4_row(0x88, 6), 0x00);
        // Bit 0: bottom right block only.
        assert_eq!(sg4_row(0x81, 0), 0x00);
        assert_eq!(sg4_row(0x81, 11), 0x0F);
        // All four blocks.
        assert_eq!(sg4_row(0x8F, 3), 0xFF);
    }

    #[test]
    fn sg6_blocks_fill_three_bands() {
        // Bit 5: top left block only.
        assert_eq!(sg6_row(0xA0, 0), 0xF0);
        assert_eq!(sg6_row(0xA0, 3), 0xF0);
        assert_eq!(sg6_row(0xA0, 4), 0x00);
        // Bit 2: middle right block.
        assert_eq!(sg6_row(0x84, 5), 0x0F);
        // Bit 1: bottom left block.
        assert_eq!(sg6_row(0x82, 7), 0x00);
        assert_eq!(sg6_row(0x82, 8), 0xF0);
        assert_eq!(sg6_row(0x82, 11), 0xF0);
    }
}
