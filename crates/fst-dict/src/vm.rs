// The FST virtual machine: program interpretation and the search surface.

use std::fmt;

use crate::instruction::{Instruction, Operation};

/// A compiled transducer: the instruction stream plus the tail-output
/// side table.
///
/// Immutable once built. Concurrent runs over one `Fst` are safe because
/// every run keeps its scratch state (`pc`, head, live outputs, captured
/// configurations) in locals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fst {
    pub prog: Vec<Instruction>,
    pub data: Vec<i32>,
}

/// A snapshot taken at each accept opcode passed during a run: program
/// counter, input head, and the outputs live at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub pc: usize,
    pub hd: usize,
    pub out: Vec<i32>,
}

impl Fst {
    fn ext_jump_at(&self, pc: usize) -> Option<usize> {
        match self.prog.get(pc) {
            Some(&Instruction::ExtendedJump(v)) => usize::try_from(v).ok(),
            _ => None,
        }
    }

    fn value_at(&self, pc: usize) -> Option<i32> {
        match self.prog.get(pc) {
            Some(&Instruction::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Drive the program over `input`, capturing a configuration at every
    /// accept opcode passed. Returns the captures and whether the run
    /// ended in an accepting state with the input fully consumed.
    ///
    /// A malformed program never panics; the run aborts and keeps what
    /// was captured up to that point.
    fn run(&self, input: &[u8]) -> (Vec<Configuration>, bool) {
        let mut snap: Vec<Configuration> = Vec::new();
        let mut outputs: Vec<i32> = Vec::new();
        let mut pc = 0usize;
        let mut hd = 0usize;

        while pc < self.prog.len() {
            let Instruction::Header { op, ch, jump } = self.prog[pc] else {
                return (snap, false);
            };
            match op {
                Operation::Match | Operation::Break => {
                    if hd == input.len() {
                        return (snap, false);
                    }
                    if input[hd] != ch {
                        if op == Operation::Break {
                            return (snap, false);
                        }
                        pc += if jump == 0 { 2 } else { 1 };
                        continue;
                    }
                    if jump > 0 {
                        pc += jump as usize;
                    } else {
                        let Some(ext) = self.ext_jump_at(pc + 1) else {
                            return (snap, false);
                        };
                        pc = pc + 1 + ext;
                    }
                    hd += 1;
                }
                Operation::Output | Operation::OutputBreak => {
                    if hd == input.len() {
                        return (snap, false);
                    }
                    if input[hd] != ch {
                        if op == Operation::OutputBreak {
                            return (snap, false);
                        }
                        pc += if jump == 0 { 3 } else { 2 };
                        continue;
                    }
                    let Some(out) = self.value_at(pc + 1) else {
                        return (snap, false);
                    };
                    outputs.push(out);
                    if jump > 0 {
                        pc += 1 + jump as usize;
                    } else {
                        let Some(ext) = self.ext_jump_at(pc + 2) else {
                            return (snap, false);
                        };
                        pc = pc + 2 + ext;
                    }
                    hd += 1;
                }
                Operation::Accept | Operation::AcceptBreak => {
                    let mut c = Configuration {
                        pc,
                        hd,
                        out: outputs.clone(),
                    };
                    if ch == 1 {
                        let (Some(to), Some(from)) = (self.value_at(pc + 1), self.value_at(pc + 2))
                        else {
                            return (snap, false);
                        };
                        let (Ok(from), Ok(to)) = (usize::try_from(from), usize::try_from(to))
                        else {
                            return (snap, false);
                        };
                        let Some(range) = self.data.get(from..to) else {
                            return (snap, false);
                        };
                        c.out.extend_from_slice(range);
                        pc += 2;
                    }
                    pc += 1;
                    snap.push(c);
                    if hd == input.len() {
                        return (snap, true);
                    }
                    if op == Operation::Accept {
                        // A leaf: nothing below this state can consume the
                        // rest of the input.
                        return (snap, false);
                    }
                }
            }
        }
        (snap, false)
    }

    /// Exact-match lookup: the outputs recorded for `input`, or an empty
    /// vector when `input` is not a key.
    pub fn search(&self, input: &[u8]) -> Vec<i32> {
        let (mut snap, accepted) = self.run(input);
        if !accepted {
            return Vec::new();
        }
        snap.pop().map(|c| c.out).unwrap_or_default()
    }

    /// Longest-prefix lookup: the byte length of the longest key that
    /// prefixes `input`, with its outputs. `None` when no key does.
    pub fn prefix_search(&self, input: &[u8]) -> Option<(usize, Vec<i32>)> {
        let (mut snap, _) = self.run(input);
        snap.pop().map(|c| (c.hd, c.out))
    }

    /// Every key that prefixes `input`, as (byte length, outputs), in
    /// order of increasing length.
    pub fn common_prefix_search(&self, input: &[u8]) -> Vec<(usize, Vec<i32>)> {
        let (snap, _) = self.run(input);
        snap.into_iter().map(|c| (c.hd, c.out)).collect()
    }
}

impl fmt::Display for Fst {
    /// Disassembly listing, one program word per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pc, word) in self.prog.iter().enumerate() {
            match *word {
                Instruction::Header { op, ch, jump } => {
                    writeln!(f, "{pc:4} {} {ch:#04x} {jump}", op.mnemonic())?;
                }
                Instruction::ExtendedJump(v) => writeln!(f, "{pc:4} jmp[{v}]")?,
                Instruction::Value(v) => writeln!(f, "{pc:4} [{v}]")?,
            }
        }
        if !self.data.is_empty() {
            writeln!(f, "data {:?}", self.data)?;
        }
        Ok(())
    }
}
