//! MC-10 keyboard matrix.
//!
//! The keyboard is an 8x7 matrix. Port 1 drives the column strobe
//! (active low), and a read anywhere in the I/O window returns the row
//! lines (also active low) for every selected column. Rows 0-5 carry the
//! typewriter keys; row 6 holds the three modifiers (control, break,
//! shift) and reads back through port 2 bit 1 instead of the window.

/// Row-6 bit in a [`Mc10Key::matrix`] position: the modifier row.
pub(crate) const MODIFIER_ROW: u8 = 0x40;

/// A key on the MC-10 keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mc10Key {
    // Row $01: @ A B C D E F G
    At,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    // Row $02: H I J K L M N O
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    // Row $04: P Q R S T U V W
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    // Row $08: X Y Z, enter, space
    X,
    Y,
    Z,
    Enter,
    Space,
    // Row $10: digits
    N0,
    N1,
    N2,
    N3,
    N4,
    N5,
    N6,
    N7,
    // Row $20: 8 9 : ; , - . /
    N8,
    N9,
    Colon,
    Semicolon,
    Comma,
    Minus,
    Period,
    Slash,
    // Row $40: modifiers, read through port 2
    Control,
    Break,
    Shift,
}

impl Mc10Key {
    /// The key's matrix position as `(column, row bit)`.
    #[must_use]
    pub const fn matrix(self) -> (usize, u8) {
        match self {
            Self::At => (0, 0x01),
            Self::A => (1, 0x01),
            Self::B => (2, 0x01),
            Self::C => (3, 0x01),
            Self::D => (4, 0x01),
            Self::E => (5, 0x01),
            Self::F => (6, 0x01),
            Self::G => (7, 0x01),
            Self::H => (0, 0x02),
            Self::I => (1, 0x02),
            Self::J => (2, 0x02),
            Self::K => (3, 0x02),
            Self::L => (4, 0x02),
            Self::M => (5, 0x02),
            Self::N => (6, 0x02),
            Self::O => (7, 0x02),
            Self::P => (0, 0x04),
            Self::Q => (1, 0x04),
            Self::R => (2, 0x04),
            Self::S => (3, 0x04),
            Self::T => (4, 0x04),
            Self::U => (5, 0x04),
            Self::V => (6, 0x04),
            Self::W => (7, 0x04),
            Self::X => (0, 0x08),
            Self::Y => (1, 0x08),
            Self::Z => (2, 0x08),
            Self::Enter => (6, 0x08),
            Self::Space => (7, 0x08),
            Self::N0 => (0, 0x10),
            Self::N1 => (1, 0x10),
            Self::N2 => (2, 0x10),
            Self::N3 => (3, 0x10),
            Self::N4 => (4, 0x10),
            Self::N5 => (5, 0x10),
            Self::N6 => (6, 0x10),
            Self::N7 => (7, 0x10),
            Self::N8 => (0, 0x20),
            Self::N9 => (1, 0x20),
            Self::Colon => (2, 0x20),
            Self::Semicolon => (3, 0x20),
            Self::Comma => (4, 0x20),
            Self::Minus => (5, 0x20),
            Self::Period => (6, 0x20),
            Self::Slash => (7, 0x20),
            Self::Control => (0, MODIFIER_ROW),
            Self::Break => (2, MODIFIER_ROW),
            Self::Shift => (7, MODIFIER_ROW),
        }
    }
}

/// Pressed-key state, as the ports see it.
///
/// Stored active high and inverted at read time, since the wire protocol
/// is active low in both directions.
#[derive(Debug, Default)]
pub struct KeyboardState {
    /// Row bits 0-5 per column, 1 = pressed.
    columns: [u8; 8],
    /// Modifier-row bit per column, 1 = pressed.
    modifiers: u8,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear one key at a matrix position. Out-of-range columns
    /// are ignored.
    pub fn set_key(&mut self, column: usize, row: u8, pressed: bool) {
        if column >= self.columns.len() {
            return;
        }
        if row == MODIFIER_ROW {
            if pressed {
                self.modifiers |= 1 << column;
            } else {
                self.modifiers &= !(1 << column);
            }
        } else if pressed {
            self.columns[column] |= row;
        } else {
            self.columns[column] &= !row;
        }
    }

    /// Release every key.
    pub fn release_all(&mut self) {
        self.columns = [0; 8];
        self.modifiers = 0;
    }

    /// Row lines for the given column strobe, as an I/O window read
    /// returns them. A zero bit in `strobe` selects that column; pressed
    /// keys pull their row line low.
    #[must_use]
    pub fn read_rows(&self, strobe: u8) -> u8 {
        let mut rows = 0;
        for (column, &keys) in self.columns.iter().enumerate() {
            if strobe & (1 << column) == 0 {
                rows |= keys;
            }
        }
        !rows
    }

    /// The port 2 input byte for the given column strobe: bit 1 low when
    /// a selected column's modifier key is down. Bit 2 is the serial
    /// input, which reads low with nothing attached.
    #[must_use]
    pub fn read_modifiers(&self, strobe: u8) -> u8 {
        let mut lines = 0x04;
        if self.modifiers & !strobe != 0 {
            lines |= 0x02;
        }
        !lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_keys_reads_all_rows_high() {
        let keyboard = KeyboardState::new();
        assert_eq!(keyboard.read_rows(0x00), 0xFF);
        assert_eq!(keyboard.read_rows(0xFF), 0xFF);
    }

    #[test]
    fn pressed_key_pulls_its_row_low_on_its_column() {
        let mut keyboard = KeyboardState::new();
        let (column, row) = Mc10Key::A.matrix();
        keyboard.set_key(column, row, true);

        // Column 1 selected: row bit 0 goes low.
        assert_eq!(keyboard.read_rows(!0x02), 0xFE);
        // Column 0 selected: nothing pressed there.
        assert_eq!(keyboard.read_rows(!0x01), 0xFF);
    }

    #[test]
    fn rows_accumulate_across_selected_columns() {
        let mut keyboard = KeyboardState::new();
        let (column, row) = Mc10Key::A.matrix();
        keyboard.set_key(column, row, true);
        let (column, row) = Mc10Key::H.matrix();
        keyboard.set_key(column, row, true);

        assert_eq!(keyboard.read_rows(0x00), !0x03);
    }

    #[test]
    fn released_key_reads_high_again() {
        let mut keyboard = KeyboardState::new();
        let (column, row) = Mc10Key::Enter.matrix();
        keyboard.set_key(column, row, true);
        assert_eq!(keyboard.read_rows(!0x40), !0x08);

        keyboard.set_key(column, row, false);
        assert_eq!(keyboard.read_rows(!0x40), 0xFF);
    }

    #[test]
    fn modifiers_read_through_port_2() {
        let mut keyboard = KeyboardState::new();
        assert_eq!(keyboard.read_modifiers(0x00), !0x04);

        let (column, row) = Mc10Key::Shift.matrix();
        keyboard.set_key(column, row, true);
        // Shift sits on column 7.
        assert_eq!(keyboard.read_modifiers(!0x80), !0x06);
        assert_eq!(keyboard.read_modifiers(!0x01), !0x04);

        keyboard.set_key(column, row, false);
        assert_eq!(keyboard.read_modifiers(!0x80), !0x04);
    }

    #[test]
    fn modifier_keys_do_not_touch_the_row_lines() {
        let mut keyboard = KeyboardState::new();
        let (column, row) = Mc10Key::Break.matrix();
        keyboard.set_key(column, row, true);
        assert_eq!(keyboard.read_rows(0x00), 0xFF);
    }

    #[test]
    fn release_all_clears_rows_and_modifiers() {
        let mut keyboard = KeyboardState::new();
        for key in [Mc10Key::Q, Mc10Key::N7, Mc10Key::Control] {
            let (column, row) = key.matrix();
            keyboard.set_key(column, row, true);
        }
        keyboard.release_all();

        assert_eq!(keyboard.read_rows(0x00), 0xFF);
        assert_eq!(keyboard.read_modifiers(0x00), !0x04);
    }

    #[test]
    fn out_of_range_column_is_ignored() {
        let mut keyboard = KeyboardState::new();
        keyboard.set_key(8, 0x01, true);
        assert_eq!(keyboard.read_rows(0x00), 0xFF);
    }
}
