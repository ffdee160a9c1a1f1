// MAST node: transition and output tables, tail values, and the rolling
// hash consulted by the hash-cons dictionary.

use std::collections::BTreeSet;

use hashbrown::HashMap;

const TRANS_HASH_MAGIC: i64 = 1001;
const OUTPUT_HASH_MAGIC: i64 = 8191;

/// A single transducer state.
///
/// Frozen states live in the arena `Mast::states` and are addressed by
/// index; `trans` maps each input byte to such an index. While a state is
/// still on the builder's frontier its entries may point at other
/// frontier slots (recorded as [`State::FRONTIER`]); those entries are
/// overwritten with the frozen index when the suffix freezes and are
/// never read before that.
///
/// `hcode` is maintained incrementally on every mutation so the builder
/// can look the state up without rehashing the tables. Hash equality is
/// only a filter; [`PartialEq`] compares the tables themselves.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Arena index, assigned at freeze time. Frontier states keep 0.
    pub id: u32,
    pub trans: HashMap<u8, u32>,
    pub output: HashMap<u8, i32>,
    pub tail: BTreeSet<i32>,
    pub is_final: bool,
    pub hcode: i64,
}

impl State {
    /// Placeholder target for an edge whose child is still on the
    /// frontier. Its hash contribution is what makes freeze-time
    /// relinking consistent across structurally equal states.
    pub const FRONTIER: u32 = 0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Point `ch` at `next`, replacing any previous target.
    pub fn set_transition(&mut self, ch: u8, next: u32) {
        self.trans.insert(ch, next);
        self.hcode = self
            .hcode
            .wrapping_add((i64::from(ch) + i64::from(next)).wrapping_mul(TRANS_HASH_MAGIC));
    }

    /// Label edge `ch` with `out`. A zero output means "no contribution"
    /// and is not stored.
    pub fn set_output(&mut self, ch: u8, out: i32) {
        if out == 0 {
            return;
        }
        self.output.insert(ch, out);
        self.hcode = self
            .hcode
            .wrapping_add((i64::from(ch) + i64::from(out)).wrapping_mul(OUTPUT_HASH_MAGIC));
    }

    /// Clear the output label of edge `ch`, if any.
    pub fn remove_output(&mut self, ch: u8) {
        if let Some(&out) = self.output.get(&ch) {
            if out != 0 {
                self.hcode = self
                    .hcode
                    .wrapping_sub((i64::from(ch) + i64::from(out)).wrapping_mul(OUTPUT_HASH_MAGIC));
            }
            self.output.remove(&ch);
        }
    }

    pub fn add_tail(&mut self, t: i32) {
        self.tail.insert(t);
    }

    pub fn has_tail(&self) -> bool {
        !self.tail.is_empty()
    }

    /// Reset to an empty non-final state for reuse on the frontier. The
    /// id is left alone; frontier slots never carry a meaningful one.
    pub fn renew(&mut self) {
        self.trans.clear();
        self.output.clear();
        self.tail.clear();
        self.is_final = false;
        self.hcode = 0;
    }
}

impl PartialEq for State {
    /// Structural equality; `id` does not participate.
    fn eq(&self, other: &Self) -> bool {
        if self.hcode != other.hcode {
            return false;
        }
        if self.trans.len() != other.trans.len()
            || self.output.len() != other.output.len()
            || self.tail.len() != other.tail.len()
            || self.is_final != other.is_final
        {
            return false;
        }
        self.trans == other.trans && self.output == other.output && self.tail == other.tail
    }
}

impl Eq for State {}
