//! 6803 condition code register (CC).
//!
//! The condition codes reflect the result of the last arithmetic or logic
//! operation and gate conditional branches and interrupt acceptance.

/// Carry flag - set on carry out of bit 7 (or borrow into it).
pub const C: u8 = 0x01;

/// Overflow flag - set if signed arithmetic overflowed.
pub const V: u8 = 0x02;

/// Zero flag - set if result is zero.
pub const Z: u8 = 0x04;

/// Negative flag - set if result has its sign bit set.
pub const N: u8 = 0x08;

/// Interrupt mask - when set, maskable interrupts are held off.
pub const I: u8 = 0x10;

/// Half carry - carry out of bit 3, consumed by DAA.
pub const H: u8 = 0x20;

/// Condition code register.
///
/// The six flags pack into the low six bits of a byte as %00HINZVC. That is
/// the layout TAP/TPA exchange with accumulator A and the layout pushed in
/// an interrupt stack frame; the top two bits always read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cc(pub u8);

impl Cc {
    /// Create a condition code register with all flags clear.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create condition codes from a packed byte; the top two bits are dropped.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self(value & 0x3F)
    }

    /// Get the packed byte as TPA and stacked frames see it.
    #[must_use]
    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Check if a flag is set.
    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// Set a flag.
    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    /// Clear a flag.
    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z from an 8-bit result.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }

    /// Update N and Z from a 16-bit result.
    pub fn update_nz16(&mut self, value: u16) {
        self.set_if(N, value & 0x8000 != 0);
        self.set_if(Z, value == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_byte_keeps_low_six_bits() {
        let cc = Cc::from_byte(0xFF);
        assert_eq!(cc.to_byte(), 0x3F);
        assert!(cc.is_set(C));
        assert!(cc.is_set(H));
    }

    #[test]
    fn set_if_sets_and_clears() {
        let mut cc = Cc::new();
        cc.set_if(Z, true);
        assert!(cc.is_set(Z));
        cc.set_if(Z, false);
        assert!(!cc.is_set(Z));
    }

    #[test]
    fn update_nz_tracks_sign_and_zero() {
        let mut cc = Cc::new();
        cc.update_nz(0x80);
        assert!(cc.is_set(N));
        assert!(!cc.is_set(Z));
        cc.update_nz(0x00);
        assert!(!cc.is_set(N));
        assert!(cc.is_set(Z));
    }
}
