//! Cassette tape codec.
//!
//! The MC-10 has no tape relay line; BASIC bit-bangs the cassette input
//! by polling port 2 in a tight loop. The deck plays a raw tape image
//! back one poll at a time and decides the motor is running by watching
//! how hard the port is being polled.
//!
//! Each data bit occupies one square-wave cell, low half then high half:
//! 8 polls for a 1 bit, 24 for a 0 bit. Bytes go out LSB first, eight
//! cells plus a single low poll before the next byte starts.

/// Polls per cell for a 1 bit (the high-frequency tone).
const ONE_BIT_POLLS: u32 = 8;
/// Polls per cell for a 0 bit.
const ZERO_BIT_POLLS: u32 = 24;
/// Port 2 polls inside one counter window that flip the motor on.
const MOTOR_ON_POLLS: u32 = 20_000;
/// Remaining bytes under which accelerated playback drops to normal
/// speed, so loaders that act on the last block see real-time bits.
const TAIL_BYTES: usize = 512;
/// Largest tape image the deck accepts.
const MAX_IMAGE_LEN: usize = 0x10000;

/// Tape motor state, inferred from polling pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TapeMotor {
    /// Not enough polling observed; the output idles high.
    #[default]
    Stopped,
    /// Rolling at normal speed.
    Playing,
    /// Rolling with the host skipping frame renders to shovel cycles at
    /// the load.
    PlayingAccelerated,
}

/// What a tape image most likely holds, and so which BASIC command
/// loads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapeKind {
    /// A BASIC listing, loaded with CLOAD.
    TextLoad,
    /// A machine-language program, loaded with CLOADM.
    BinaryLoad,
}

/// Guess what a tape image holds by counting BASIC-looking characters.
///
/// Leader bytes ($55) are skipped; letters, digits, `:` and `$` count as
/// printable. More than a third printable reads as a BASIC listing. The
/// guess is right often enough to pick a default load command, nothing
/// more.
#[must_use]
pub fn classify(image: &[u8]) -> TapeKind {
    let printable = image
        .iter()
        .map(|byte| byte.to_ascii_uppercase())
        .filter(|&c| {
            c != 0x55 && (c.is_ascii_uppercase() || c.is_ascii_digit() || c == b':' || c == b'$')
        })
        .count();
    if printable > image.len() / 3 {
        TapeKind::TextLoad
    } else {
        TapeKind::BinaryLoad
    }
}

/// A cassette deck holding one tape image.
#[derive(Debug, Default)]
pub struct TapeDeck {
    image: Vec<u8>,
    /// Next byte to play.
    pub(crate) cursor: usize,
    pub(crate) motor: TapeMotor,
    /// Bit cells left in the current byte, counted 9 down to 0. The
    /// ninth cell is cut short when the next byte is pulled.
    pub(crate) bit_index: u8,
    pub(crate) current_byte: u8,
    /// Length of the current cell in polls.
    pub(crate) threshold: u32,
    /// Polls consumed inside the current cell.
    pub(crate) poll_count: u32,
    /// Port 2 polls since the motor-detect window last opened.
    pub(crate) read_counter: u32,
    pub(crate) eof: bool,
}

impl TapeDeck {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new tape image and rewind.
    ///
    /// # Panics
    /// Panics if the image exceeds 64K.
    pub fn load(&mut self, image: &[u8]) {
        assert!(
            image.len() <= MAX_IMAGE_LEN,
            "tape image must be at most 65536 bytes, got {}",
            image.len()
        );
        self.image = image.to_vec();
        self.rewind();
    }

    /// Remove the loaded image.
    pub fn eject(&mut self) {
        self.image.clear();
        self.rewind();
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        !self.image.is_empty()
    }

    /// Rewind to the start of the image and reset the codec. The image
    /// itself stays loaded.
    pub fn rewind(&mut self) {
        self.cursor = 0;
        self.motor = TapeMotor::Stopped;
        self.bit_index = 0;
        self.current_byte = 0;
        self.threshold = 0;
        self.poll_count = 0;
        self.read_counter = 0;
        self.eof = false;
    }

    /// Guess the load command for the loaded image.
    #[must_use]
    pub fn classify(&self) -> TapeKind {
        classify(&self.image)
    }

    #[must_use]
    pub fn motor(&self) -> TapeMotor {
        self.motor
    }

    /// Whether playback has run off the end of the image.
    #[must_use]
    pub fn at_end(&self) -> bool {
        self.eof
    }

    /// Byte position within the image.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Reopen the motor-detect window. Called by the machine once a
    /// second of emulated time, so only sustained polling keeps the
    /// motor running.
    pub fn clear_read_counter(&mut self) {
        self.read_counter = 0;
    }

    /// Sample the cassette input level for one port 2 poll. `true` is
    /// the idle (high) level.
    pub fn sample_bit(&mut self) -> bool {
        self.read_counter += 1;
        if self.read_counter > MOTOR_ON_POLLS && self.motor == TapeMotor::Stopped && !self.eof {
            self.motor = TapeMotor::PlayingAccelerated;
        }
        if self.motor == TapeMotor::Stopped {
            return true;
        }

        if self.bit_index == 0 {
            match self.next_byte() {
                Some(byte) => {
                    self.current_byte = byte;
                    self.bit_index = 9;
                    self.threshold = 0;
                    self.poll_count = 0;
                }
                None => {
                    self.eof = true;
                    self.motor = TapeMotor::Stopped;
                    return true;
                }
            }
        }

        if self.poll_count == self.threshold {
            self.threshold = if self.current_byte & 0x01 != 0 {
                ONE_BIT_POLLS
            } else {
                ZERO_BIT_POLLS
            };
            self.poll_count = 0;
            self.current_byte >>= 1;
            self.bit_index -= 1;
        }

        let level = self.poll_count >= self.threshold / 2;
        self.poll_count += 1;
        level
    }

    fn next_byte(&mut self) -> Option<u8> {
        if self.cursor >= self.image.len() {
            return None;
        }
        if self.cursor + TAIL_BYTES >= self.image.len() {
            self.motor = TapeMotor::Playing;
        }
        let byte = self.image[self.cursor];
        self.cursor += 1;
        Some(byte)
    }
}
