//! Static dictionary over byte-string keys, built as a Minimal Acyclic
//! Subsequential Transducer (MAST) and executed as a compact bytecode
//! program.
//!
//! Keys map to one or more 32-bit outputs. The dictionary supports exact
//! lookup, longest-prefix lookup and enumeration of every key that is a
//! prefix of an input, and serializes to a portable little-endian byte
//! stream.
//!
//! # Architecture
//!
//! - [`state`] -- MAST node: transitions, edge outputs, tails, rolling hash
//! - [`mast`] -- incremental minimal-transducer construction from sorted pairs
//! - [`instruction`] -- opcodes and the three word shapes of the program
//! - [`compiler`] -- lowering the graph to the linear instruction stream
//! - [`vm`] -- the interpreter and the search surface
//! - [`format`] -- the portable wire format
//!
//! ```
//! use fst_dict::{build, Pair};
//!
//! let fst = build(vec![Pair::new("apple", 1), Pair::new("applet", 2)]).unwrap();
//! assert_eq!(fst.search(b"applet"), vec![2]);
//! assert_eq!(fst.prefix_search(b"applets"), Some((6, vec![2])));
//! ```

pub mod compiler;
pub mod format;
pub mod instruction;
pub mod mast;
pub mod state;
pub mod vm;

pub use instruction::{Instruction, Operation};
pub use mast::Mast;
pub use vm::{Configuration, Fst};

/// Error type for transducer construction and serialization.
///
/// The virtual machine itself never fails: a corrupt program aborts the
/// run and returns whatever configurations were captured up to that
/// point.
#[derive(Debug, thiserror::Error)]
pub enum FstError {
    /// A transition referred to a state whose code had not been emitted yet.
    #[error("undefined address for state {state} on input {input:#04x}")]
    UndefinedAddress { state: u32, input: u8 },
    /// An opcode outside the defined range was read.
    #[error("invalid opcode {0:#04x}")]
    InvalidOpcode(u8),
    /// The stream ended in the middle of a field.
    #[error("truncated stream")]
    Truncated,
    /// A length header that cannot be represented on this platform.
    #[error("length header out of range: {0}")]
    InvalidLength(u64),
    /// The in-memory instruction stream violates the word layout.
    #[error("malformed instruction stream at pc {0}")]
    MalformedProgram(usize),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An input record: a byte-string key and one 32-bit output.
///
/// Duplicate keys are legal; their outputs accumulate on the accepting
/// state and are all returned by a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub input: Vec<u8>,
    pub output: i32,
}

impl Pair {
    pub fn new(input: impl Into<Vec<u8>>, output: i32) -> Self {
        Self {
            input: input.into(),
            output,
        }
    }
}

/// Build a compiled transducer from `pairs`.
///
/// The pairs are sorted by key first, so callers may pass them in any
/// order.
pub fn build(mut pairs: Vec<Pair>) -> Result<Fst, FstError> {
    Mast::from_pairs(&mut pairs).compile()
}
