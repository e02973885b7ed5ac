//! Static opcode descriptors.
//!
//! One entry per opcode byte: addressing mode, base cycle cost, and encoded
//! length. The execution core indexes this table straight off the fetched
//! byte; it never consults the length field for PC stepping (operand fetches
//! advance PC), but the length is kept for tracing and disassembly.

/// Addressing mode, which decides how the operand address is formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// No operand; the instruction works on registers.
    Inherent,
    /// One operand byte at PC.
    Immediate,
    /// Two operand bytes at PC (16-bit immediate).
    Immediate16,
    /// One byte operand giving an address in page zero.
    Direct,
    /// One byte unsigned offset added to X.
    Indexed,
    /// Two byte absolute address, high byte first.
    Extended,
    /// One byte signed offset from the PC after the operand fetch.
    Relative,
    /// Off-book opcode with defined behaviour but no operand fetch.
    Undocumented,
    /// Opcode with no defined behaviour; execution stops on it.
    Illegal,
}

/// Descriptor for one opcode.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    /// How the effective address is formed.
    pub mode: Mode,
    /// Cycle cost charged against the scanline budget.
    pub cycles: u8,
    /// Encoded instruction length in bytes.
    pub bytes: u8,
}

const fn op(mode: Mode, cycles: u8, bytes: u8) -> OpcodeInfo {
    OpcodeInfo {
        mode,
        cycles,
        bytes,
    }
}

const ILL: OpcodeInfo = op(Mode::Illegal, 0, 1);

/// Descriptor table indexed by opcode byte.
#[rustfmt::skip]
pub const OPCODES: [OpcodeInfo; 256] = [
    // 0x00-0x0F
    op(Mode::Undocumented, 2, 1), // 00 CLB (undocumented)
    op(Mode::Inherent, 2, 1),     // 01 NOP
    op(Mode::Undocumented, 2, 1), // 02 SEXA (undocumented)
    op(Mode::Undocumented, 2, 1), // 03 SETA (undocumented)
    op(Mode::Inherent, 3, 1),     // 04 LSRD
    op(Mode::Inherent, 3, 1),     // 05 ASLD
    op(Mode::Inherent, 2, 1),     // 06 TAP
    op(Mode::Inherent, 2, 1),     // 07 TPA
    op(Mode::Inherent, 3, 1),     // 08 INX
    op(Mode::Inherent, 3, 1),     // 09 DEX
    op(Mode::Inherent, 2, 1),     // 0A CLV
    op(Mode::Inherent, 2, 1),     // 0B SEV
    op(Mode::Inherent, 2, 1),     // 0C CLC
    op(Mode::Inherent, 2, 1),     // 0D SEC
    op(Mode::Inherent, 2, 1),     // 0E CLI
    op(Mode::Inherent, 2, 1),     // 0F SEI
    // 0x10-0x1F
    op(Mode::Inherent, 2, 1),     // 10 SBA
    op(Mode::Inherent, 2, 1),     // 11 CBA
    ILL,                          // 12
    ILL,                          // 13
    ILL,                          // 14
    ILL,                          // 15
    op(Mode::Inherent, 2, 1),     // 16 TAB
    op(Mode::Inherent, 2, 1),     // 17 TBA
    ILL,                          // 18
    op(Mode::Inherent, 2, 1),     // 19 DAA
    ILL,                          // 1A
    op(Mode::Inherent, 2, 1),     // 1B ABA
    ILL,                          // 1C
    ILL,                          // 1D
    ILL,                          // 1E
    ILL,                          // 1F
    // 0x20-0x2F
    op(Mode::Relative, 3, 2),     // 20 BRA
    op(Mode::Relative, 3, 2),     // 21 BRN
    op(Mode::Relative, 3, 2),     // 22 BHI
    op(Mode::Relative, 3, 2),     // 23 BLS
    op(Mode::Relative, 3, 2),     // 24 BCC
    op(Mode::Relative, 3, 2),     // 25 BCS
    op(Mode::Relative, 3, 2),     // 26 BNE
    op(Mode::Relative, 3, 2),     // 27 BEQ
    op(Mode::Relative, 3, 2),     // 28 BVC
    op(Mode::Relative, 3, 2),     // 29 BVS
    op(Mode::Relative, 3, 2),     // 2A BPL
    op(Mode::Relative, 3, 2),     // 2B BMI
    op(Mode::Relative, 3, 2),     // 2C BGE
    op(Mode::Relative, 3, 2),     // 2D BLT
    op(Mode::Relative, 3, 2),     // 2E BGT
    op(Mode::Relative, 3, 2),     // 2F BLE
    // 0x30-0x3F
    op(Mode::Inherent, 3, 1),     // 30 TSX
    op(Mode::Inherent, 3, 1),     // 31 INS
    op(Mode::Inherent, 4, 1),     // 32 PULA
    op(Mode::Inherent, 4, 1),     // 33 PULB
    op(Mode::Inherent, 3, 1),     // 34 DES
    op(Mode::Inherent, 3, 1),     // 35 TXS
    op(Mode::Inherent, 3, 1),     // 36 PSHA
    op(Mode::Inherent, 3, 1),     // 37 PSHB
    op(Mode::Inherent, 5, 1),     // 38 PULX
    op(Mode::Inherent, 5, 1),     // 39 RTS
    op(Mode::Inherent, 3, 1),     // 3A ABX
    op(Mode::Inherent, 10, 1),    // 3B RTI
    op(Mode::Inherent, 4, 1),     // 3C PSHX
    op(Mode::Inherent, 10, 1),    // 3D MUL
    op(Mode::Inherent, 9, 1),     // 3E WAI
    op(Mode::Inherent, 12, 1),    // 3F SWI
    // 0x40-0x4F
    op(Mode::Inherent, 2, 1),     // 40 NEGA
    ILL,                          // 41
    op(Mode::Undocumented, 2, 1), // 42 NGCA (undocumented)
    op(Mode::Inherent, 2, 1),     // 43 COMA
    op(Mode::Inherent, 2, 1),     // 44 LSRA
    ILL,                          // 45
    op(Mode::Inherent, 2, 1),     // 46 RORA
    op(Mode::Inherent, 2, 1),     // 47 ASRA
    op(Mode::Inherent, 2, 1),     // 48 ASLA
    op(Mode::Inherent, 2, 1),     // 49 ROLA
    op(Mode::Inherent, 2, 1),     // 4A DECA
    ILL,                          // 4B
    op(Mode::Inherent, 2, 1),     // 4C INCA
    op(Mode::Inherent, 2, 1),     // 4D TSTA
    ILL,                          // 4E
    op(Mode::Inherent, 2, 1),     // 4F CLRA
    // 0x50-0x5F
    op(Mode::Inherent, 2, 1),     // 50 NEGB
    ILL,                          // 51
    op(Mode::Undocumented, 2, 1), // 52 NGCB (undocumented)
    op(Mode::Inherent, 2, 1),     // 53 COMB
    op(Mode::Inherent, 2, 1),     // 54 LSRB
    ILL,                          // 55
    op(Mode::Inherent, 2, 1),     // 56 RORB
    op(Mode::Inherent, 2, 1),     // 57 ASRB
    op(Mode::Inherent, 2, 1),     // 58 ASLB
    op(Mode::Inherent, 2, 1),     // 59 ROLB
    op(Mode::Inherent, 2, 1),     // 5A DECB
    ILL,                          // 5B
    op(Mode::Inherent, 2, 1),     // 5C INCB
    op(Mode::Inherent, 2, 1),     // 5D TSTB
    ILL,                          // 5E
    op(Mode::Inherent, 2, 1),     // 5F CLRB
    // 0x60-0x6F
    op(Mode::Indexed, 6, 2),      // 60 NEG
    ILL,                          // 61
    op(Mode::Undocumented, 2, 1), // 62 NGC (undocumented)
    op(Mode::Indexed, 6, 2),      // 63 COM
    op(Mode::Indexed, 6, 2),      // 64 LSR
    op(Mode::Indexed, 6, 2),      // 65 ASL (undocumented alias of 68)
    op(Mode::Indexed, 6, 2),      // 66 ROR
    op(Mode::Indexed, 6, 2),      // 67 ASR
    op(Mode::Indexed, 6, 2),      // 68 ASL
    op(Mode::Indexed, 6, 2),      // 69 ROL
    op(Mode::Indexed, 6, 2),      // 6A DEC
    ILL,                          // 6B
    op(Mode::Indexed, 6, 2),      // 6C INC
    op(Mode::Indexed, 6, 2),      // 6D TST
    op(Mode::Indexed, 3, 2),      // 6E JMP
    op(Mode::Indexed, 6, 2),      // 6F CLR
    // 0x70-0x7F
    op(Mode::Extended, 6, 3),     // 70 NEG
    ILL,                          // 71
    op(Mode::Undocumented, 2, 1), // 72 NGC (undocumented)
    op(Mode::Extended, 6, 3),     // 73 COM
    op(Mode::Extended, 6, 3),     // 74 LSR
    ILL,                          // 75
    op(Mode::Extended, 6, 3),     // 76 ROR
    op(Mode::Extended, 6, 3),     // 77 ASR
    op(Mode::Extended, 6, 3),     // 78 ASL
    op(Mode::Extended, 6, 3),     // 79 ROL
    op(Mode::Extended, 6, 3),     // 7A DEC
    ILL,                          // 7B
    op(Mode::Extended, 6, 3),     // 7C INC
    op(Mode::Extended, 6, 3),     // 7D TST
    op(Mode::Extended, 3, 3),     // 7E JMP
    op(Mode::Extended, 6, 3),     // 7F CLR
    // 0x80-0x8F
    op(Mode::Immediate, 2, 2),    // 80 SUBA
    op(Mode::Immediate, 2, 2),    // 81 CMPA
    op(Mode::Immediate, 2, 2),    // 82 SBCA
    op(Mode::Immediate16, 4, 3),  // 83 SUBD
    op(Mode::Immediate, 2, 2),    // 84 ANDA
    op(Mode::Immediate, 2, 2),    // 85 BITA
    op(Mode::Immediate, 2, 2),    // 86 LDAA
    ILL,                          // 87
    op(Mode::Immediate, 2, 2),    // 88 EORA
    op(Mode::Immediate, 2, 2),    // 89 ADCA
    op(Mode::Immediate, 2, 2),    // 8A ORAA
    op(Mode::Immediate, 2, 2),    // 8B ADDA
    op(Mode::Immediate16, 4, 3),  // 8C CPX
    op(Mode::Relative, 6, 2),     // 8D BSR
    op(Mode::Immediate16, 3, 3),  // 8E LDS
    ILL,                          // 8F
    // 0x90-0x9F
    op(Mode::Direct, 3, 2),       // 90 SUBA
    op(Mode::Direct, 3, 2),       // 91 CMPA
    op(Mode::Direct, 3, 2),       // 92 SBCA
    op(Mode::Direct, 5, 2),       // 93 SUBD
    op(Mode::Direct, 3, 2),       // 94 ANDA
    op(Mode::Direct, 3, 2),       // 95 BITA
    op(Mode::Direct, 3, 2),       // 96 LDAA
    op(Mode::Direct, 3, 2),       // 97 STAA
    op(Mode::Direct, 3, 2),       // 98 EORA
    op(Mode::Direct, 3, 2),       // 99 ADCA
    op(Mode::Direct, 3, 2),       // 9A ORAA
    op(Mode::Direct, 3, 2),       // 9B ADDA
    op(Mode::Direct, 5, 2),       // 9C CPX
    op(Mode::Direct, 5, 2),       // 9D JSR
    op(Mode::Direct, 4, 2),       // 9E LDS
    op(Mode::Direct, 4, 2),       // 9F STS
    // 0xA0-0xAF
    op(Mode::Indexed, 4, 2),      // A0 SUBA
    op(Mode::Indexed, 4, 2),      // A1 CMPA
    op(Mode::Indexed, 4, 2),      // A2 SBCA
    op(Mode::Indexed, 6, 2),      // A3 SUBD
    op(Mode::Indexed, 4, 2),      // A4 ANDA
    op(Mode::Indexed, 4, 2),      // A5 BITA
    op(Mode::Indexed, 4, 2),      // A6 LDAA
    op(Mode::Indexed, 4, 2),      // A7 STAA
    op(Mode::Indexed, 4, 2),      // A8 EORA
    op(Mode::Indexed, 4, 2),      // A9 ADCA
    op(Mode::Indexed, 4, 2),      // AA ORAA
    op(Mode::Indexed, 4, 2),      // AB ADDA
    op(Mode::Indexed, 6, 2),      // AC CPX
    op(Mode::Indexed, 6, 2),      // AD JSR
    op(Mode::Indexed, 5, 2),      // AE LDS
    op(Mode::Indexed, 5, 2),      // AF STS
    // 0xB0-0xBF
    op(Mode::Extended, 4, 3),     // B0 SUBA
    op(Mode::Extended, 4, 3),     // B1 CMPA
    op(Mode::Extended, 4, 3),     // B2 SBCA
    op(Mode::Extended, 6, 3),     // B3 SUBD
    op(Mode::Extended, 4, 3),     // B4 ANDA
    op(Mode::Extended, 4, 3),     // B5 BITA
    op(Mode::Extended, 4, 3),     // B6 LDAA
    op(Mode::Extended, 4, 3),     // B7 STAA
    op(Mode::Extended, 4, 3),     // B8 EORA
    op(Mode::Extended, 4, 3),     // B9 ADCA
    op(Mode::Extended, 4, 3),     // BA ORAA
    op(Mode::Extended, 4, 3),     // BB ADDA
    op(Mode::Extended, 6, 3),     // BC CPX
    op(Mode::Extended, 6, 3),     // BD JSR
    op(Mode::Extended, 5, 3),     // BE LDS
    op(Mode::Extended, 5, 3),     // BF STS
    // 0xC0-0xCF
    op(Mode::Immediate, 2, 2),    // C0 SUBB
    op(Mode::Immediate, 2, 2),    // C1 CMPB
    op(Mode::Immediate, 2, 2),    // C2 SBCB
    op(Mode::Immediate16, 4, 3),  // C3 ADDD
    op(Mode::Immediate, 2, 2),    // C4 ANDB
    op(Mode::Immediate, 2, 2),    // C5 BITB
    op(Mode::Immediate, 2, 2),    // C6 LDAB
    ILL,                          // C7
    op(Mode::Immediate, 2, 2),    // C8 EORB
    op(Mode::Immediate, 2, 2),    // C9 ADCB
    op(Mode::Immediate, 2, 2),    // CA ORAB
    op(Mode::Immediate, 2, 2),    // CB ADDB
    op(Mode::Immediate16, 3, 3),  // CC LDD
    ILL,                          // CD
    op(Mode::Immediate16, 3, 3),  // CE LDX
    ILL,                          // CF
    // 0xD0-0xDF
    op(Mode::Direct, 3, 2),       // D0 SUBB
    op(Mode::Direct, 3, 2),       // D1 CMPB
    op(Mode::Direct, 3, 2),       // D2 SBCB
    op(Mode::Direct, 5, 2),       // D3 ADDD
    op(Mode::Direct, 3, 2),       // D4 ANDB
    op(Mode::Direct, 3, 2),       // D5 BITB
    op(Mode::Direct, 3, 2),       // D6 LDAB
    op(Mode::Direct, 3, 2),       // D7 STAB
    op(Mode::Direct, 3, 2),       // D8 EORB
    op(Mode::Direct, 3, 2),       // D9 ADCB
    op(Mode::Direct, 3, 2),       // DA ORAB
    op(Mode::Direct, 3, 2),       // DB ADDB
    op(Mode::Direct, 4, 2),       // DC LDD
    op(Mode::Direct, 4, 2),       // DD STD
    op(Mode::Direct, 4, 2),       // DE LDX
    op(Mode::Direct, 4, 2),       // DF STX
    // 0xE0-0xEF
    op(Mode::Indexed, 4, 2),      // E0 SUBB
    op(Mode::Indexed, 4, 2),      // E1 CMPB
    op(Mode::Indexed, 4, 2),      // E2 SBCB
    op(Mode::Indexed, 6, 2),      // E3 ADDD
    op(Mode::Indexed, 4, 2),      // E4 ANDB
    op(Mode::Indexed, 4, 2),      // E5 BITB
    op(Mode::Indexed, 4, 2),      // E6 LDAB
    op(Mode::Indexed, 4, 2),      // E7 STAB
    op(Mode::Indexed, 4, 2),      // E8 EORB
    op(Mode::Indexed, 4, 2),      // E9 ADCB
    op(Mode::Indexed, 4, 2),      // EA ORAB
    op(Mode::Indexed, 4, 2),      // EB ADDB
    op(Mode::Indexed, 5, 2),      // EC LDD
    op(Mode::Indexed, 5, 2),      // ED STD
    op(Mode::Indexed, 5, 2),      // EE LDX
    op(Mode::Indexed, 5, 2),      // EF STX
    // 0xF0-0xFF
    op(Mode::Extended, 4, 3),     // F0 SUBB
    op(Mode::Extended, 4, 3),     // F1 CMPB
    op(Mode::Extended, 4, 3),     // F2 SBCB
    op(Mode::Extended, 6, 3),     // F3 ADDD
    op(Mode::Extended, 4, 3),     // F4 ANDB
    op(Mode::Extended, 4, 3),     // F5 BITB
    op(Mode::Extended, 4, 3),     // F6 LDAB
    op(Mode::Extended, 4, 3),     // F7 STAB
    op(Mode::Extended, 4, 3),     // F8 EORB
    op(Mode::Extended, 4, 3),     // F9 ADCB
    op(Mode::Extended, 4, 3),     // FA ORAB
    op(Mode::Extended, 4, 3),     // FB ADDB
    op(Mode::Extended, 5, 3),     // FC LDD
    op(Mode::Extended, 5, 3),     // FD STD
    op(Mode::Extended, 5, 3),     // FE LDX
    op(Mode::Extended, 5, 3),     // FF STX
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_opcode() {
        assert_eq!(OPCODES.len(), 256);
    }

    #[test]
    fn illegal_rows_cost_nothing() {
        for (code, info) in OPCODES.iter().enumerate() {
            if info.mode == Mode::Illegal {
                assert_eq!(info.cycles, 0, "opcode {code:#04X}");
                assert_eq!(info.bytes, 1, "opcode {code:#04X}");
            }
        }
    }

    #[test]
    fn expected_illegal_set() {
        let illegal: Vec<usize> = OPCODES
            .iter()
            .enumerate()
            .filter(|(_, info)| info.mode == Mode::Illegal)
            .map(|(code, _)| code)
            .collect();
        assert_eq!(
            illegal,
            vec![
                0x12, 0x13, 0x14, 0x15, 0x18, 0x1A, 0x1C, 0x1D, 0x1E, 0x1F, 0x41, 0x45, 0x4B,
                0x4E, 0x51, 0x55, 0x5B, 0x5E, 0x61, 0x6B, 0x71, 0x75, 0x7B, 0x87, 0x8F, 0xC7,
                0xCD, 0xCF,
            ]
        );
    }

    #[test]
    fn undocumented_rows_fetch_no_operand() {
        for code in [0x00, 0x02, 0x03, 0x42, 0x52, 0x62, 0x72] {
            let info = &OPCODES[code];
            assert_eq!(info.mode, Mode::Undocumented, "opcode {code:#04X}");
            assert_eq!(info.bytes, 1, "opcode {code:#04X}");
            assert_eq!(info.cycles, 2, "opcode {code:#04X}");
        }
    }

    #[test]
    fn mode_operand_lengths_are_consistent() {
        for (code, info) in OPCODES.iter().enumerate() {
            let expected = match info.mode {
                Mode::Inherent | Mode::Undocumented | Mode::Illegal => 1,
                Mode::Immediate | Mode::Direct | Mode::Indexed | Mode::Relative => 2,
                Mode::Immediate16 | Mode::Extended => 3,
            };
            assert_eq!(info.bytes, expected, "opcode {code:#04X}");
        }
    }

    #[test]
    fn branches_take_three_cycles() {
        for code in 0x20..=0x2F {
            let info = &OPCODES[code];
            assert_eq!(info.mode, Mode::Relative);
            assert_eq!(info.cycles, 3);
        }
    }
}
