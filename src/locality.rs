//! Locality Sets Builder (spec.md §4.1) and Escape Filter (§4.2).
//!
//! Grounded on `examples/original_source/DepAnalysis.cpp::runOnFunction`'s
//! first two `inst_iterator` passes: the first builds `localValues`/
//! `writtenValues`, the second erases call-argument and return operands
//! from `localValues`.

use std::collections::HashSet;

use crate::ir::{Function, Opcode, ValueId};

/// `(locals, written_locals)` from spec.md §3, frozen after escape
/// filtering. Pure, order-independent over the instruction stream.
#[derive(Debug, Default, Clone)]
pub struct LocalityState {
    pub locals: HashSet<ValueId>,
    pub written_locals: HashSet<ValueId>,
}

impl LocalityState {
    /// Builds the raw (pre-escape-filter) locality sets, per spec.md §4.1:
    /// declarations and value-bindings contribute to `locals`; only
    /// debug-located stores contribute to `written_locals` — a
    /// compiler-synthesized parameter-init store (no debug location) must
    /// not count as a write.
    pub fn build(func: &Function) -> Self {
        let mut locals = HashSet::new();
        let mut written_locals = HashSet::new();

        for id in func.instructions_in_order() {
            let inst = func.inst(id);
            match inst.opcode {
                Opcode::Declare => {
                    if let Some(addr) = inst.address_operand() {
                        locals.insert(addr);
                    }
                }
                Opcode::ValueBind => {
                    if let Some(v) = inst.bound_value() {
                        locals.insert(v);
                    }
                }
                Opcode::Store if inst.debug_loc.is_some() => {
                    if let Some(addr) = inst.address_operand() {
                        written_locals.insert(addr);
                    }
                }
                _ => {}
            }
        }

        Self {
            locals,
            written_locals,
        }
    }

    /// Escape Filter (spec.md §4.2): removes from `locals` any value passed
    /// as a call argument or returned from the function. This crate's IR
    /// models a `Call` instruction's operands as its argument list only (no
    /// distinct callee operand to exclude), which is exactly spec.md §9 Open
    /// Question 2's recommended stricter interpretation — "iterate argument
    /// operands only, not the callee operand" — applied by construction.
    pub fn apply_escape_filter(&mut self, func: &Function) {
        for id in func.instructions_in_order() {
            let inst = func.inst(id);
            match inst.opcode {
                Opcode::Call => {
                    for &arg in &inst.operands {
                        self.locals.remove(&arg);
                    }
                }
                Opcode::Return => {
                    if let Some(&ret) = inst.operands.first() {
                        self.locals.remove(&ret);
                    }
                }
                _ => {}
            }
        }
    }

    /// Convenience: build and immediately escape-filter, the order §4.1/§4.2
    /// always run in.
    pub fn compute(func: &Function) -> Self {
        let mut state = Self::build(func);
        state.apply_escape_filter(func);
        state
    }

    pub fn is_local(&self, v: ValueId) -> bool {
        self.locals.contains(&v)
    }

    pub fn is_written(&self, v: ValueId) -> bool {
        self.written_locals.contains(&v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DebugLoc, FunctionBuilder, Opcode};

    #[test]
    fn escape_filter_removes_call_argument() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let x = fb.value(Some("x"), None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 1)));
        fb.inst(entry, Opcode::Call, vec![x], Some(DebugLoc::new(1, 2, 1)));
        let func = fb.build();

        let state = LocalityState::compute(&func);
        assert!(!state.is_local(x));
    }

    #[test]
    fn escape_filter_removes_return_operand() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let x = fb.value(Some("x"), None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 1)));
        fb.inst(entry, Opcode::Return, vec![x], Some(DebugLoc::new(1, 2, 1)));
        let func = fb.build();

        let state = LocalityState::compute(&func);
        assert!(!state.is_local(x));
    }

    #[test]
    fn parameter_init_store_without_debug_loc_is_not_a_write() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let x = fb.value(Some("x.addr"), None);
        let v = fb.value(None, None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 1)));
        // compiler-synthesized parameter init: no debug location.
        fb.inst(entry, Opcode::Store, vec![v, x], None);
        let func = fb.build();

        let state = LocalityState::build(&func);
        assert!(state.locals.contains(&x));
        assert!(!state.written_locals.contains(&x));
    }

    #[test]
    fn debug_located_store_is_a_write() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let x = fb.value(Some("x"), None);
        let v = fb.value(None, None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 1)));
        fb.inst(
            entry,
            Opcode::Store,
            vec![v, x],
            Some(DebugLoc::new(1, 2, 5)),
        );
        let func = fb.build();

        let state = LocalityState::build(&func);
        assert!(state.written_locals.contains(&x));
    }
}
