// Opcodes and the word shapes of the compiled instruction stream.

use crate::FstError;

/// Operation codes of the FST virtual machine.
///
/// The numeric values are part of the wire format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
    /// Final state with no outgoing transitions: snapshot and stop.
    Accept = 1,
    /// Final state with outgoing transitions: snapshot, then keep matching.
    AcceptBreak = 2,
    /// Conditional transition on one input byte.
    Match = 3,
    /// Like `Match`, but the last candidate at this state: a mismatch ends
    /// the run.
    Break = 4,
    /// Transition that also contributes an output value.
    Output = 5,
    /// Output-carrying transition; last candidate at this state.
    OutputBreak = 6,
}

impl Operation {
    /// Three-letter mnemonic used by the disassembly listing.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Operation::Accept => "ACC",
            Operation::AcceptBreak => "ACB",
            Operation::Match => "MTC",
            Operation::Break => "BRK",
            Operation::Output => "OUT",
            Operation::OutputBreak => "OUB",
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = FstError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Operation::Accept),
            2 => Ok(Operation::AcceptBreak),
            3 => Ok(Operation::Match),
            4 => Ok(Operation::Break),
            5 => Ok(Operation::Output),
            6 => Ok(Operation::OutputBreak),
            other => Err(FstError::InvalidOpcode(other)),
        }
    }
}

/// One 32-bit word of the program stream.
///
/// A `Header` names the operation, the input byte it matches and a 16-bit
/// relative jump; a jump field of 0 means the real distance is in the
/// `ExtendedJump` word of the same group. `Value` words carry edge outputs
/// and the tail-range indices of accept instructions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Header { op: Operation, ch: u8, jump: u16 },
    ExtendedJump(i32),
    Value(i32),
}
