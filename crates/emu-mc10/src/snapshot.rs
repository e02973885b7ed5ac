//! Save states.
//!
//! A fixed-order little-endian record: a version word, the path and
//! filename of the loaded tape, the CPU and timer registers, video and
//! tape codec fields, then the whole RAM-bearing address range,
//! run-length compressed. Loads reject any other version outright
//! rather than migrate old saves. Tape data is not embedded; on success
//! the caller gets the stored path/filename back so it can re-open the
//! image.

use motorola_6803::{Cc, State};

use crate::mc10::Mc10;
use crate::tape::TapeMotor;

/// Format version written and accepted.
pub const SNAPSHOT_VERSION: u16 = 1;

/// Longest tape path or filename the record stores.
const MAX_NAME_LEN: usize = 160;

/// Spare bytes between the machine fields and the RAM image, so small
/// additions need no version bump.
const RESERVED_LEN: usize = 15;

/// Run-length escape byte.
const ESCAPE: u8 = 0xED;

/// Write the whole machine state to a byte record.
///
/// `tape_path` and `tape_name` identify the loaded tape image for the
/// host; pass empty strings when no tape is in the deck.
///
/// # Panics
/// Panics if either name exceeds 160 bytes.
#[must_use]
pub fn serialize(mc10: &Mc10, tape_path: &str, tape_name: &str) -> Vec<u8> {
    assert!(
        tape_path.len() <= MAX_NAME_LEN,
        "tape path must be at most 160 bytes, got {}",
        tape_path.len()
    );
    assert!(
        tape_name.len() <= MAX_NAME_LEN,
        "tape filename must be at most 160 bytes, got {}",
        tape_name.len()
    );

    let mut data = Vec::with_capacity(4096);
    data.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());
    put_string(&mut data, tape_path);
    put_string(&mut data, tape_name);

    let cpu = mc10.cpu();
    data.push(cpu.regs.a);
    data.push(cpu.regs.b);
    data.extend_from_slice(&cpu.regs.x.to_le_bytes());
    data.extend_from_slice(&cpu.regs.sp.to_le_bytes());
    data.extend_from_slice(&cpu.regs.pc.to_le_bytes());
    data.push(cpu.regs.cc.to_byte());
    let (state_tag, opcode) = encode_state(cpu.state);
    data.push(state_tag);
    data.push(opcode);
    data.extend_from_slice(&cpu.timer.counter.to_le_bytes());
    data.extend_from_slice(&cpu.timer.compare.to_le_bytes());
    data.extend_from_slice(&cpu.timer.compare_written);
    data.push(cpu.timer.tcsr);
    data.push(u8::from(cpu.timer.read_latch.is_some()));
    data.push(cpu.timer.read_latch.unwrap_or(0));
    data.push(cpu.timer.write_latch);
    data.extend_from_slice(&cpu.scanline_cycles.to_le_bytes());

    let bus = mc10.bus();
    data.push(bus.control_byte());
    data.push(mc10.frame_skip);

    let tape = &bus.tape;
    data.extend_from_slice(&(tape.cursor as u32).to_le_bytes());
    data.push(encode_motor(tape.motor));
    data.push(tape.bit_index);
    data.push(tape.current_byte);
    data.extend_from_slice(&tape.threshold.to_le_bytes());
    data.extend_from_slice(&tape.poll_count.to_le_bytes());
    data.extend_from_slice(&tape.read_counter.to_le_bytes());
    data.push(u8::from(tape.eof));

    data.extend_from_slice(&mc10.scanline.to_le_bytes());
    data.push(bus.memory.bank_select());
    data.push(bus.memory.rom_select());

    data.extend_from_slice(&[0; RESERVED_LEN]);

    let mut ram = Vec::with_capacity(bus.memory.io_start() as usize);
    ram.extend_from_slice(&bus.registers);
    ram.extend_from_slice(&bus.memory.snapshot_ram());
    ram.extend_from_slice(bus.memory.aux_bank());
    let compressed = compress_rle(&ram);
    data.extend_from_slice(&(compressed.len() as u32).to_le_bytes());
    data.extend_from_slice(&compressed);
    data
}

/// Restore a machine from a byte record.
///
/// The record must come from the same memory fit; a 20K save does not
/// load into a 32K machine. Returns the stored tape path and filename.
///
/// # Errors
/// Rejects a version other than [`SNAPSHOT_VERSION`], a truncated or
/// malformed record, and a RAM image of the wrong size. The machine is
/// untouched on any error.
pub fn deserialize(mc10: &mut Mc10, data: &[u8]) -> Result<(String, String), String> {
    let mut reader = Reader::new(data);
    let version = reader.u16()?;
    if version != SNAPSHOT_VERSION {
        return Err(format!(
            "unsupported save version {version}, expected {SNAPSHOT_VERSION}"
        ));
    }
    let tape_path = take_string(&mut reader)?;
    let tape_name = take_string(&mut reader)?;

    let a = reader.u8()?;
    let b = reader.u8()?;
    let x = reader.u16()?;
    let sp = reader.u16()?;
    let pc = reader.u16()?;
    let cc = reader.u8()?;
    let state_tag = reader.u8()?;
    let opcode = reader.u8()?;
    let state = decode_state(state_tag, opcode)?;
    let counter = reader.u32()?;
    let compare = reader.u16()?;
    let compare_written = [reader.u8()?, reader.u8()?];
    let tcsr = reader.u8()?;
    let latch_armed = reader.u8()?;
    let latch_value = reader.u8()?;
    let write_latch = reader.u8()?;
    let scanline_cycles = reader.u32()?;

    let control_byte = reader.u8()?;
    let frame_skip = reader.u8()?;

    let cursor = reader.u32()?;
    let motor = decode_motor(reader.u8()?)?;
    let bit_index = reader.u8()?;
    let current_byte = reader.u8()?;
    let threshold = reader.u32()?;
    let poll_count = reader.u32()?;
    let read_counter = reader.u32()?;
    let eof = reader.u8()? != 0;

    let scanline = reader.u16()?;
    let bank_select = reader.u8()?;
    let rom_select = reader.u8()?;

    reader.bytes(RESERVED_LEN)?;

    let compressed_len = reader.u32()? as usize;
    let compressed = reader.bytes(compressed_len)?;
    let expected =
        mc10.bus().memory.io_start() as usize + mc10.bus().memory.aux_bank().len();
    let ram = decompress_rle(compressed, expected)?;

    // Everything parsed and validated; apply.
    let cpu = mc10.cpu_mut();
    cpu.regs.a = a;
    cpu.regs.b = b;
    cpu.regs.x = x;
    cpu.regs.sp = sp;
    cpu.regs.pc = pc;
    cpu.regs.cc = Cc::from_byte(cc);
    cpu.state = state;
    cpu.timer.counter = counter;
    cpu.timer.compare = compare;
    cpu.timer.compare_written = compare_written;
    cpu.timer.tcsr = tcsr;
    cpu.timer.read_latch = (latch_armed != 0).then_some(latch_value);
    cpu.timer.write_latch = write_latch;
    cpu.scanline_cycles = scanline_cycles;

    let bus = mc10.bus_mut();
    bus.set_control_byte(control_byte);
    bus.registers.copy_from_slice(&ram[..0x20]);
    let io_start = bus.memory.io_start() as usize;
    bus.memory.restore_ram(&ram[0x20..io_start])?;
    bus.memory.restore_aux_bank(&ram[io_start..]);
    bus.memory.write_bank_select(bank_select);
    bus.memory.write_rom_select(rom_select);

    bus.tape.cursor = cursor as usize;
    bus.tape.motor = motor;
    bus.tape.bit_index = bit_index;
    bus.tape.current_byte = current_byte;
    bus.tape.threshold = threshold;
    bus.tape.poll_count = poll_count;
    bus.tape.read_counter = read_counter;
    bus.tape.eof = eof;

    mc10.scanline = scanline;
    mc10.frame_skip = frame_skip;

    Ok((tape_path, tape_name))
}

fn put_string(data: &mut Vec<u8>, value: &str) {
    data.extend_from_slice(&(value.len() as u16).to_le_bytes());
    data.extend_from_slice(value.as_bytes());
}

fn take_string(reader: &mut Reader) -> Result<String, String> {
    let len = usize::from(reader.u16()?);
    if len > MAX_NAME_LEN {
        return Err(format!(
            "stored name of {len} bytes exceeds the {MAX_NAME_LEN} byte limit"
        ));
    }
    let bytes = reader.bytes(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| "stored name is not valid UTF-8".to_string())
}

fn encode_state(state: State) -> (u8, u8) {
    match state {
        State::Executing => (0, 0),
        State::Halted => (1, 0),
        State::Reset => (2, 0),
        State::Exception(opcode) => (3, opcode),
    }
}

fn decode_state(tag: u8, opcode: u8) -> Result<State, String> {
    match tag {
        0 => Ok(State::Executing),
        1 => Ok(State::Halted),
        2 => Ok(State::Reset),
        3 => Ok(State::Exception(opcode)),
        other => Err(format!("save holds unknown CPU state tag {other}")),
    }
}

fn encode_motor(motor: TapeMotor) -> u8 {
    match motor {
        TapeMotor::Stopped => 0,
        TapeMotor::Playing => 1,
        TapeMotor::PlayingAccelerated => 2,
    }
}

fn decode_motor(tag: u8) -> Result<TapeMotor, String> {
    match tag {
        0 => Ok(TapeMotor::Stopped),
        1 => Ok(TapeMotor::Playing),
        2 => Ok(TapeMotor::PlayingAccelerated),
        other => Err(format!("save holds unknown tape motor tag {other}")),
    }
}

/// Bounds-checked little-endian reads over the record.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], String> {
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(format!("save truncated at byte {}", self.pos));
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, String> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, String> {
        let bytes = self.bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, String> {
        let bytes = self.bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }
}

fn compress_rle(source: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(source.len() / 4);
    let mut i = 0;
    while i < source.len() {
        let byte = source[i];
        let mut run = 1;
        while run < 255 && i + run < source.len() && source[i + run] == byte {
            run += 1;
        }
        let escape = if byte == ESCAPE { run >= 2 } else { run >= 5 };
        if escape {
            out.extend_from_slice(&[ESCAPE, ESCAPE, run as u8, byte]);
            i += run;
        } else if byte == ESCAPE {
            // A lone escape byte stays literal, and the byte after it
            // rides along so the decoder never sees a false pair.
            out.push(ESCAPE);
            i += 1;
            if i < source.len() {
                out.push(source[i]);
                i += 1;
            }
        } else {
            out.resize(out.len() + run, byte);
            i += run;
        }
    }
    out
}

fn decompress_rle(source: &[u8], expected: usize) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(expected);
    let mut i = 0;
    while i < source.len() {
        if i + 3 < source.len() && source[i] == ESCAPE && source[i + 1] == ESCAPE {
            let count = usize::from(source[i + 2]);
            let value = source[i + 3];
            out.resize(out.len() + count, value);
            i += 4;
        } else {
            out.push(source[i]);
            i += 1;
        }
    }
    if out.len() == expected {
        Ok(out)
    } else {
        Err(format!(
            "RAM image decompressed to {} bytes, expected {expected}",
            out.len()
        ))
    }
}
