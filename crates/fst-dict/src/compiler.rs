// Lowering of the frozen MAST to the linear instruction stream.

use hashbrown::HashMap;

use crate::instruction::{Instruction, Operation};
use crate::mast::Mast;
use crate::vm::Fst;
use crate::FstError;

impl Mast {
    /// Lower the graph to a program for the FST virtual machine.
    ///
    /// States are emitted in freeze order, so every child's address is
    /// known before a parent refers to it; the finished stream is then
    /// reversed in place so execution runs parents-first from `pc == 0`.
    /// Edges are emitted in descending byte order, which after the
    /// reversal makes the machine try them in ascending order with the
    /// highest byte as the `Break` that ends the scan.
    pub fn compile(&self) -> Result<Fst, FstError> {
        let mut prog: Vec<Instruction> = Vec::new();
        let mut data: Vec<i32> = Vec::new();
        let mut addr_map: HashMap<u32, usize> = HashMap::with_capacity(self.states.len());

        for state in &self.states {
            let mut edges: Vec<u8> = state.trans.keys().copied().collect();
            edges.sort_unstable_by(|a, b| b.cmp(a));

            for (rank, &ch) in edges.iter().enumerate() {
                let next = state.trans[&ch];
                let out = state.output.get(&ch).copied().unwrap_or(0);
                let addr = *addr_map
                    .get(&next)
                    .ok_or(FstError::UndefinedAddress {
                        state: state.id,
                        input: ch,
                    })?;
                let mut jump = prog.len() - addr + 1;

                let op = match (out != 0, rank == 0) {
                    (true, true) => Operation::OutputBreak,
                    (true, false) => Operation::Output,
                    (false, true) => Operation::Break,
                    (false, false) => Operation::Match,
                };

                if jump > u16::MAX as usize {
                    prog.push(Instruction::ExtendedJump(jump as i32));
                    jump = 0;
                }
                if out != 0 {
                    prog.push(Instruction::Value(out));
                }
                prog.push(Instruction::Header {
                    op,
                    ch,
                    jump: jump as u16,
                });
            }

            if state.is_final {
                let tailed = state.has_tail();
                if tailed {
                    prog.push(Instruction::Value(data.len() as i32));
                    data.extend(state.tail.iter().copied());
                    prog.push(Instruction::Value(data.len() as i32));
                }
                let op = if state.trans.is_empty() {
                    Operation::Accept
                } else {
                    Operation::AcceptBreak
                };
                prog.push(Instruction::Header {
                    op,
                    ch: u8::from(tailed),
                    jump: 0,
                });
            }

            addr_map.insert(state.id, prog.len());
        }

        prog.reverse();
        Ok(Fst { prog, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;
    use crate::Pair;

    fn compile(entries: &[(&str, i32)]) -> Fst {
        let mut pairs: Vec<Pair> = entries.iter().map(|&(k, v)| Pair::new(k, v)).collect();
        Mast::from_pairs(&mut pairs).compile().unwrap()
    }

    #[test]
    fn single_pair_program_layout() {
        let fst = compile(&[("a", 1)]);
        assert_eq!(
            fst.prog,
            vec![
                Instruction::Header {
                    op: Operation::OutputBreak,
                    ch: b'a',
                    jump: 1,
                },
                Instruction::Value(1),
                Instruction::Header {
                    op: Operation::Accept,
                    ch: 0,
                    jump: 0,
                },
            ]
        );
        assert!(fst.data.is_empty());
    }

    #[test]
    fn chain_uses_plain_break_without_output() {
        let fst = compile(&[("ab", 1)]);
        assert_eq!(
            fst.prog,
            vec![
                Instruction::Header {
                    op: Operation::OutputBreak,
                    ch: b'a',
                    jump: 1,
                },
                Instruction::Value(1),
                Instruction::Header {
                    op: Operation::Break,
                    ch: b'b',
                    jump: 1,
                },
                Instruction::Header {
                    op: Operation::Accept,
                    ch: 0,
                    jump: 0,
                },
            ]
        );
    }

    #[test]
    fn duplicate_key_emits_tail_range() {
        let fst = compile(&[("k", 10), ("k", 20)]);
        assert_eq!(fst.data, vec![10, 20]);
        assert_eq!(
            fst.prog,
            vec![
                Instruction::Header {
                    op: Operation::Break,
                    ch: b'k',
                    jump: 1,
                },
                Instruction::Header {
                    op: Operation::Accept,
                    ch: 1,
                    jump: 0,
                },
                Instruction::Value(2),
                Instruction::Value(0),
            ]
        );
    }

    #[test]
    fn final_state_with_children_gets_accept_break() {
        let fst = compile(&[("a", 1), ("ab", 2)]);
        let has_accept_break = fst.prog.iter().any(|i| {
            matches!(
                i,
                Instruction::Header {
                    op: Operation::AcceptBreak,
                    ..
                }
            )
        });
        assert!(has_accept_break);
        // Execution starts at the root block, whose first word must be a
        // header, and the interior accept must come before its edges.
        assert!(matches!(fst.prog[0], Instruction::Header { .. }));
    }

    #[test]
    fn sibling_edges_use_match_then_break() {
        // Two outgoing edges: the lower byte must be tried first as a
        // Match-class op, the higher byte last as the Break-class op.
        let fst = compile(&[("ab", 1), ("cd", 2)]);
        let headers: Vec<(Operation, u8)> = fst
            .prog
            .iter()
            .filter_map(|i| match i {
                Instruction::Header { op, ch, .. } => Some((*op, *ch)),
                _ => None,
            })
            .collect();
        let a = headers
            .iter()
            .position(|&(op, ch)| ch == b'a' && op == Operation::Output)
            .expect("edge 'a' must be an Output header");
        let c = headers
            .iter()
            .position(|&(op, ch)| ch == b'c' && op == Operation::OutputBreak)
            .expect("edge 'c' must be an OutputBreak header");
        assert!(a < c);
    }

    #[test]
    fn missing_child_address_is_a_build_error() {
        let mut orphan = State::new();
        orphan.id = 0;
        orphan.set_transition(b'z', 99);
        let mast = Mast {
            states: vec![orphan],
            initial: 0,
        };
        let err = mast.compile().unwrap_err();
        assert!(matches!(
            err,
            FstError::UndefinedAddress {
                state: 0,
                input: b'z'
            }
        ));
    }

    #[test]
    fn tail_values_are_emitted_in_ascending_order() {
        let fst = compile(&[("k", 30), ("k", 10), ("k", 20)]);
        assert_eq!(fst.data, vec![10, 20, 30]);
    }
}
