//! MC6847 colour palette (ARGB32).
//!
//! The VDG produces black plus two four-colour sets selected by CSS, three
//! artifact shades seen on composite output, and the darker shades the
//! alphanumeric modes use for text. Indices match the colour codes in the
//! display byte layouts: the CSS=0 set starts at 1, the CSS=1 set at 5.

pub const BLACK: u32 = 0xFF00_0000;
pub const GREEN: u32 = 0xFF00_FF00;
pub const YELLOW: u32 = 0xFFFF_FF83;
pub const BLUE: u32 = 0xFF1B_16EB;
pub const RED: u32 = 0xFFC0_0E24;
pub const BUFF: u32 = 0xFFF0_F0F0;
pub const CYAN: u32 = 0xFF1D_9C5D;
pub const MAGENTA: u32 = 0xFFFD_25FF;
pub const ORANGE: u32 = 0xFFFE_420D;
pub const ARTIFACT_BLUE: u32 = 0xFF00_80FF;
pub const ARTIFACT_ORANGE: u32 = 0xFFFF_8000;
pub const ARTIFACT_GREEN: u32 = 0xFF00_8000;
pub const DARK_GREEN: u32 = 0xFF10_6010;
pub const DARK_ORANGE: u32 = 0xFF78_5020;
pub const LIGHT_GREEN: u32 = 0xFF28_E028;
pub const LIGHT_ORANGE: u32 = 0xFFF0_B040;

/// ARGB32 palette indexed by colour code.
pub const PALETTE: [u32; 16] = [
    BLACK,           // 0: Black
    GREEN,           // 1: Green (CSS=0 set)
    YELLOW,          // 2: Yellow
    BLUE,            // 3: Blue
    RED,             // 4: Red
    BUFF,            // 5: Buff (CSS=1 set)
    CYAN,            // 6: Cyan
    MAGENTA,         // 7: Magenta
    ORANGE,          // 8: Orange
    ARTIFACT_BLUE,   // 9: Artifact blue
    ARTIFACT_ORANGE, // 10: Artifact orange
    ARTIFACT_GREEN,  // 11: Artifact green
    DARK_GREEN,      // 12: Dark green (text background)
    DARK_ORANGE,     // 13: Dark orange (text background, CSS=1)
    LIGHT_GREEN,     // 14: Light green (text foreground)
    LIGHT_ORANGE,    // 15: Light orange (text foreground, CSS=1)
];
