// Portable wire format: length-prefixed little-endian serialization of
// the tail data and the instruction stream.
//
// All integers are written little-endian at a fixed width; the two
// length prefixes are 8 bytes. The program length counts logical
// instructions, not words -- the reader re-expands each instruction into
// its 1..=3 word group.

use std::io::{self, Read, Write};

use crate::instruction::{Instruction, Operation};
use crate::vm::Fst;
use crate::FstError;

fn map_eof(e: io::Error) -> FstError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        FstError::Truncated
    } else {
        FstError::Io(e)
    }
}

fn read_u8<R: Read>(r: &mut R) -> Result<u8, FstError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf).map_err(map_eof)?;
    Ok(buf[0])
}

fn read_u16<R: Read>(r: &mut R) -> Result<u16, FstError> {
    let mut buf = [0u8; 2];
    r.read_exact(&mut buf).map_err(map_eof)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u32<R: Read>(r: &mut R) -> Result<u32, FstError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf).map_err(map_eof)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_u64<R: Read>(r: &mut R) -> Result<u64, FstError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(map_eof)?;
    Ok(u64::from_le_bytes(buf))
}

fn read_len<R: Read>(r: &mut R) -> Result<usize, FstError> {
    let raw = read_u64(r)?;
    usize::try_from(raw).map_err(|_| FstError::InvalidLength(raw))
}

impl Fst {
    /// Number of logical instructions in the stream. Every logical
    /// instruction owns exactly one header word.
    fn logical_len(&self) -> usize {
        self.prog
            .iter()
            .filter(|word| matches!(word, Instruction::Header { .. }))
            .count()
    }

    fn require_value(&self, pc: usize) -> Result<i32, FstError> {
        match self.prog.get(pc) {
            Some(&Instruction::Value(v)) => Ok(v),
            _ => Err(FstError::MalformedProgram(pc)),
        }
    }

    fn require_ext_jump(&self, pc: usize) -> Result<i32, FstError> {
        match self.prog.get(pc) {
            Some(&Instruction::ExtendedJump(v)) => Ok(v),
            _ => Err(FstError::MalformedProgram(pc)),
        }
    }

    /// Serialize the transducer to `w` in the portable wire layout.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<(), FstError> {
        w.write_all(&(self.data.len() as u64).to_le_bytes())?;
        for &v in &self.data {
            w.write_all(&(v as u32).to_le_bytes())?;
        }
        w.write_all(&(self.logical_len() as u64).to_le_bytes())?;

        let mut pc = 0;
        while pc < self.prog.len() {
            let Instruction::Header { op, ch, jump } = self.prog[pc] else {
                return Err(FstError::MalformedProgram(pc));
            };
            w.write_all(&[op as u8, ch])?;
            pc += 1;
            match op {
                Operation::Accept | Operation::AcceptBreak => {
                    if ch == 1 {
                        let to = self.require_value(pc)?;
                        let from = self.require_value(pc + 1)?;
                        w.write_all(&(to as u32).to_le_bytes())?;
                        w.write_all(&(from as u32).to_le_bytes())?;
                        pc += 2;
                    }
                }
                Operation::Match | Operation::Break => {
                    w.write_all(&jump.to_le_bytes())?;
                    if jump == 0 {
                        let ext = self.require_ext_jump(pc)?;
                        w.write_all(&(ext as u32).to_le_bytes())?;
                        pc += 1;
                    }
                }
                Operation::Output | Operation::OutputBreak => {
                    w.write_all(&jump.to_le_bytes())?;
                    let out = self.require_value(pc)?;
                    w.write_all(&(out as u32).to_le_bytes())?;
                    pc += 1;
                    if jump == 0 {
                        let ext = self.require_ext_jump(pc)?;
                        w.write_all(&(ext as u32).to_le_bytes())?;
                        pc += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// Deserialize a transducer from `r`. The exact inverse of
    /// [`write_to`](Fst::write_to): the in-memory word stream round-trips
    /// identically.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, FstError> {
        let data_len = read_len(r)?;
        // The pre-allocation is capped so a corrupt header fails on read
        // rather than on reserve.
        let mut data: Vec<i32> = Vec::with_capacity(data_len.min(1 << 16));
        for _ in 0..data_len {
            data.push(read_u32(r)? as i32);
        }

        let prog_len = read_len(r)?;
        let mut prog: Vec<Instruction> = Vec::with_capacity(prog_len.min(1 << 16));
        for _ in 0..prog_len {
            let op = Operation::try_from(read_u8(r)?)?;
            let ch = read_u8(r)?;
            match op {
                Operation::Accept | Operation::AcceptBreak => {
                    prog.push(Instruction::Header { op, ch, jump: 0 });
                    if ch == 1 {
                        let to = read_u32(r)? as i32;
                        let from = read_u32(r)? as i32;
                        prog.push(Instruction::Value(to));
                        prog.push(Instruction::Value(from));
                    }
                }
                Operation::Match | Operation::Break => {
                    let jump = read_u16(r)?;
                    prog.push(Instruction::Header { op, ch, jump });
                    if jump == 0 {
                        prog.push(Instruction::ExtendedJump(read_u32(r)? as i32));
                    }
                }
                Operation::Output | Operation::OutputBreak => {
                    let jump = read_u16(r)?;
                    let out = read_u32(r)? as i32;
                    prog.push(Instruction::Header { op, ch, jump });
                    prog.push(Instruction::Value(out));
                    if jump == 0 {
                        prog.push(Instruction::ExtendedJump(read_u32(r)? as i32));
                    }
                }
            }
        }
        Ok(Fst { prog, data })
    }

    /// Serialize to an owned byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, FstError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Deserialize from a byte slice.
    pub fn from_bytes(mut data: &[u8]) -> Result<Self, FstError> {
        Self::read_from(&mut data)
    }
}
