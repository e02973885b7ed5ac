//! On-chip programmable timer.
//!
//! A free-running 16-bit counter, an output-compare register, and the timer
//! control/status register (TCSR). The counter advances once per CPU cycle;
//! crossing the compare value raises OCF and wrapping past $FFFF raises TOF.
//! Either flag, with its enable bit set and the I mask clear, interrupts the
//! CPU through the vectors at $FFF4 (OCF) and $FFF2 (TOF).
//!
//! The counter is held in a `u32` so that a whole instruction's cycles can
//! be added before the wrap check; it is masked back to 16 bits whenever it
//! overflows, so it never strays above $FFFF between instructions.

/// Output level bit, driven onto P21 on compare (unused here).
pub const TCSR_OLVL: u8 = 0x01;
/// Input capture edge select.
pub const TCSR_IEDG: u8 = 0x02;
/// Enable timer overflow interrupt.
pub const TCSR_ETOI: u8 = 0x04;
/// Enable output compare interrupt.
pub const TCSR_EOCI: u8 = 0x08;
/// Enable input capture interrupt.
pub const TCSR_EICI: u8 = 0x10;
/// Timer overflow flag: counter wrapped past $FFFF.
pub const TCSR_TOF: u8 = 0x20;
/// Output compare flag: counter reached the compare register.
pub const TCSR_OCF: u8 = 0x40;
/// Input capture flag (never raised; the MC-10 leaves P20 unwired).
pub const TCSR_ICF: u8 = 0x80;

/// First and last timer register addresses ($08 TCSR, $09/$0A counter,
/// $0B/$0C output compare).
pub const TIMER_REG_FIRST: u16 = 0x0008;
pub const TIMER_REG_LAST: u16 = 0x000C;

/// On-chip timer state.
#[derive(Debug, Clone)]
pub struct Timer {
    /// Free-running counter, masked to 16 bits on wrap.
    pub counter: u32,
    /// Output compare register.
    pub compare: u16,
    /// Timer control and status register.
    pub tcsr: u8,
    /// Counter low byte captured by a counter high read, handed out by the
    /// next counter low read.
    pub read_latch: Option<u8>,
    /// Counter high byte staged by a counter high write, combined by the
    /// next counter low write.
    pub write_latch: u8,
    /// Raw bytes last written to the compare registers, read back at
    /// $0B/$0C.
    pub compare_written: [u8; 2],
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Power-on state: counter zero, compare all-ones, everything disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: 0,
            compare: 0xFFFF,
            tcsr: 0,
            read_latch: None,
            write_latch: 0,
            compare_written: [0, 0],
        }
    }

    /// Advance the counter by one retired instruction's cycles.
    ///
    /// OCF is raised when the compare value lies inside the step, checked
    /// before the add so a wrap cannot hide the crossing.
    pub fn tick(&mut self, cycles: u32) {
        let compare = u32::from(self.compare);
        if self.counter < compare && self.counter + cycles >= compare {
            self.tcsr |= TCSR_OCF;
        }
        self.counter += cycles;
        if self.counter > 0xFFFF {
            self.counter &= 0xFFFF;
            self.tcsr |= TCSR_TOF;
        }
    }

    /// Advance the counter by a single cycle. Used while the CPU sits in
    /// WAI, where only an exact compare match raises OCF.
    pub fn tick_one(&mut self) {
        self.counter += 1;
        if self.counter == u32::from(self.compare) {
            self.tcsr |= TCSR_OCF;
        }
        if self.counter > 0xFFFF {
            self.counter &= 0xFFFF;
            self.tcsr |= TCSR_TOF;
        }
    }

    /// Read a timer register ($08-$0C).
    pub fn read(&mut self, address: u16) -> u8 {
        match address {
            0x0008 => self.tcsr,
            0x0009 => {
                // Reading the counter high byte acknowledges TOF and
                // latches the low byte so a following low read sees a
                // coherent 16-bit value.
                self.tcsr &= !TCSR_TOF;
                self.read_latch = Some(self.counter as u8);
                (self.counter >> 8) as u8
            }
            0x000A => match self.read_latch.take() {
                Some(low) => low,
                None => self.counter as u8,
            },
            0x000B => self.compare_written[0],
            0x000C => self.compare_written[1],
            _ => 0,
        }
    }

    /// Write a timer register ($08-$0C).
    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            // Flag bits (TOF/OCF/ICF) are read-only; only the low five
            // control bits take the written value.
            0x0008 => self.tcsr = (self.tcsr & 0xE0) | (value & 0x1F),
            0x0009 => {
                // A counter high write presets the counter to $FFF8 no
                // matter what was written; the byte itself is staged for
                // the following low write.
                self.counter = 0xFFF8;
                self.write_latch = value;
            }
            0x000A => {
                self.counter = u32::from(self.write_latch) << 8 | u32::from(value);
            }
            0x000B => {
                // Writing the compare high byte replaces the whole
                // register, clobbering the low byte.
                self.tcsr &= !TCSR_OCF;
                self.compare = u16::from(value) << 8;
                self.compare_written[0] = value;
            }
            0x000C => {
                self.tcsr &= !TCSR_OCF;
                self.compare |= u16::from(value);
                self.compare_written[1] = value;
            }
            _ => {}
        }
    }

    /// Timer overflow interrupt raised and enabled?
    #[must_use]
    pub const fn overflow_irq_pending(&self) -> bool {
        self.tcsr & TCSR_TOF != 0 && self.tcsr & TCSR_ETOI != 0
    }

    /// Output compare interrupt raised and enabled?
    #[must_use]
    pub const fn compare_irq_pending(&self) -> bool {
        self.tcsr & TCSR_OCF != 0 && self.tcsr & TCSR_EOCI != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_wraps_once_and_raises_tof() {
        let mut timer = Timer::new();
        timer.counter = 0xFFF0;
        timer.tick(0x20);
        assert_eq!(timer.counter, 0x0010);
        assert_ne!(timer.tcsr & TCSR_TOF, 0);
    }

    #[test]
    fn compare_crossing_raises_ocf() {
        let mut timer = Timer::new();
        timer.compare = 0x1000;
        timer.counter = 0x0FFE;
        timer.tick(5);
        assert_ne!(timer.tcsr & TCSR_OCF, 0);
    }

    #[test]
    fn compare_behind_counter_stays_quiet() {
        let mut timer = Timer::new();
        timer.compare = 0x1000;
        timer.counter = 0x1001;
        timer.tick(5);
        assert_eq!(timer.tcsr & TCSR_OCF, 0);
    }

    #[test]
    fn high_read_latches_low_byte() {
        let mut timer = Timer::new();
        timer.counter = 0x12FF;
        assert_eq!(timer.read(0x0009), 0x12);
        timer.tick(4);
        // The low read returns the latched byte even though the counter
        // has moved on.
        assert_eq!(timer.read(0x000A), 0xFF);
        // A second low read is live again.
        assert_eq!(timer.read(0x000A), 0x03);
    }

    #[test]
    fn high_read_acknowledges_tof() {
        let mut timer = Timer::new();
        timer.tcsr |= TCSR_TOF;
        timer.read(0x0009);
        assert_eq!(timer.tcsr & TCSR_TOF, 0);
    }

    #[test]
    fn counter_high_write_presets_fff8() {
        let mut timer = Timer::new();
        timer.write(0x0009, 0x34);
        assert_eq!(timer.counter, 0xFFF8);
        timer.write(0x000A, 0x56);
        assert_eq!(timer.counter, 0x3456);
    }

    #[test]
    fn compare_high_write_replaces_whole_register() {
        let mut timer = Timer::new();
        timer.write(0x000B, 0x12);
        timer.write(0x000C, 0x34);
        assert_eq!(timer.compare, 0x1234);
        timer.write(0x000B, 0x56);
        assert_eq!(timer.compare, 0x5600);
    }

    #[test]
    fn compare_writes_acknowledge_ocf() {
        let mut timer = Timer::new();
        timer.tcsr |= TCSR_OCF;
        timer.write(0x000B, 0x00);
        assert_eq!(timer.tcsr & TCSR_OCF, 0);
        timer.tcsr |= TCSR_OCF;
        timer.write(0x000C, 0x00);
        assert_eq!(timer.tcsr & TCSR_OCF, 0);
    }

    #[test]
    fn tcsr_write_preserves_flag_bits() {
        let mut timer = Timer::new();
        timer.tcsr = TCSR_TOF | TCSR_OCF;
        timer.write(0x0008, 0xFF);
        assert_eq!(timer.tcsr, TCSR_TOF | TCSR_OCF | 0x1F);
    }

    #[test]
    fn irq_pending_needs_flag_and_enable() {
        let mut timer = Timer::new();
        timer.tcsr = TCSR_TOF;
        assert!(!timer.overflow_irq_pending());
        timer.tcsr |= TCSR_ETOI;
        assert!(timer.overflow_irq_pending());

        timer.tcsr = TCSR_OCF;
        assert!(!timer.compare_irq_pending());
        timer.tcsr |= TCSR_EOCI;
        assert!(timer.compare_irq_pending());
    }
}
