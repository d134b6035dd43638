//! The typed, SSA-form instruction stream the analyzer consumes.
//!
//! This plays the role of the compiler front-end's IR that a real host
//! driver would supply (see the crate-level docs for the External
//! Collaborator boundary). [`FunctionBuilder`] exists so functions can be
//! constructed programmatically for tests without a real front-end.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Opaque handle to an IR value. Identity equality only; two distinct
    /// `ValueId`s are always distinct values, even if they carry the same
    /// name.
    pub struct ValueId;
    /// Opaque handle to an instruction.
    pub struct InstId;
    /// Opaque handle to a basic block.
    pub struct BlockId;
}

/// A value's static type, to the coarse granularity this analyzer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ty {
    Scalar,
    Pointer,
    Array,
    Struct,
    Aggregate,
}

/// Data carried by a [`ValueId`]. The name is advisory (may be absent or
/// compiler-synthesized, e.g. suffixed `.addr` for by-address aliases); only
/// the handle identity is load-bearing for the analysis itself.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValueData {
    pub name: Option<String>,
    pub ty: Option<Ty>,
}

pub type FileId = u32;
pub type ScopeId = u32;

/// Source location attached to an instruction, or absent for
/// compiler-synthesized instructions (e.g. parameter-init stores).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebugLoc {
    pub file: FileId,
    pub line: u32,
    pub col: u32,
    pub scope: ScopeId,
}

impl DebugLoc {
    pub fn new(file: FileId, line: u32, col: u32) -> Self {
        Self {
            file,
            line,
            col,
            scope: 0,
        }
    }
}

/// Coarse opcode categories; anything not relevant to the analyzer collapses
/// into `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// A `dbg.declare`-style variable declaration: binds a source name to an
    /// address value.
    Declare,
    /// A `dbg.value`-style value binding (SSA value, not an address).
    ValueBind,
    Store,
    Load,
    Call,
    Return,
    GetElementPtr,
    SignExtend,
    Alloca,
    Other,
}

/// A single IR instruction. Operands are ordered exactly as the front-end
/// emits them; for `Store` the address is operand 1 and the stored value is
/// operand 0, matching LLVM's `StoreInst` convention (this is the source of
/// spec's "operand index 1" rule for stores).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operands: Vec<ValueId>,
    pub block: BlockId,
    pub debug_loc: Option<DebugLoc>,
}

impl Instruction {
    /// The address operand of a store/load/declare, if any.
    pub fn address_operand(&self) -> Option<ValueId> {
        match self.opcode {
            Opcode::Store => self.operands.get(1).copied(),
            Opcode::Load => self.operands.get(0).copied(),
            Opcode::Declare => self.operands.get(0).copied(),
            _ => None,
        }
    }

    /// The bound value of a value-binding instruction.
    pub fn bound_value(&self) -> Option<ValueId> {
        match self.opcode {
            Opcode::ValueBind => self.operands.get(0).copied(),
            _ => None,
        }
    }

    pub fn is_store(&self) -> bool {
        matches!(self.opcode, Opcode::Store)
    }

    pub fn is_load(&self) -> bool {
        matches!(self.opcode, Opcode::Load)
    }

    pub fn is_memory_access(&self) -> bool {
        self.is_store() || self.is_load()
    }

    pub fn is_declare(&self) -> bool {
        matches!(self.opcode, Opcode::Declare)
    }

    /// Whether this instruction qualifies as an SL-CFG node: a debug-located
    /// store, load, or declaration (spec.md §4.4).
    pub fn is_slcfg_node(&self) -> bool {
        self.debug_loc.is_some() && (self.is_memory_access() || self.is_declare())
    }
}

/// An ordered sequence of instructions with a name and successor set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub name: String,
    pub insts: Vec<InstId>,
    pub successors: Vec<BlockId>,
}

impl BasicBlock {
    /// spec.md §4.4's `"for.end"` loop-exit-region sink rule and §9's
    /// `"for.cond"`/`"for.inc"` naming heuristics all key off substrings of
    /// the block name; see [`crate::naming`].
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A function: its basic blocks in program order, its instruction and value
/// arenas, and a unique entry block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    values: SlotMap<ValueId, ValueData>,
    insts: SlotMap<InstId, Instruction>,
    blocks: SlotMap<BlockId, BasicBlock>,
    block_order: Vec<BlockId>,
    entry: BlockId,
}

impl Function {
    pub fn entry(&self) -> BlockId {
        self.entry
    }

    pub fn value(&self, id: ValueId) -> &ValueData {
        &self.values[id]
    }

    pub fn inst(&self, id: InstId) -> &Instruction {
        &self.insts[id]
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }

    /// Blocks in program order, entry first.
    pub fn blocks_in_order(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.block_order.iter().copied()
    }

    /// All instructions, in program order (block order, then in-block
    /// order). This is the order spec.md §4.1 requires the locality scan to
    /// be order-independent *over*, but which the SL-CFG builder depends on.
    pub fn instructions_in_order(&self) -> impl Iterator<Item = InstId> + '_ {
        self.block_order
            .iter()
            .flat_map(move |&b| self.blocks[b].insts.iter().copied())
    }

    pub fn all_values(&self) -> impl Iterator<Item = ValueId> + '_ {
        self.values.keys()
    }

    /// Displayable, normalized variable name for an instruction's address
    /// operand, following the chain of `GetElementPtr`/`SignExtend`
    /// "pass-through" instructions down to the underlying declared name.
    /// Grounded on `DepAnalysis.cpp::getVarName`.
    pub fn var_name(&self, id: InstId) -> String {
        self.var_name_inner(id, &mut 0)
    }

    fn var_name_inner(&self, id: InstId, depth: &mut usize) -> String {
        *depth += 1;
        if *depth > self.insts.len().max(64) {
            return "?".to_string();
        }
        let inst = &self.insts[id];
        match inst.opcode {
            Opcode::Alloca | Opcode::Declare => {
                let addr = inst.address_operand();
                let name = addr.and_then(|v| self.values[v].name.clone());
                match name {
                    Some(n) => crate::naming::strip_addr_suffix(&n).to_string(),
                    None => "!".to_string(),
                }
            }
            Opcode::GetElementPtr | Opcode::SignExtend => {
                // Follow through to the base operand if it is itself an
                // instruction result; operand 0 is always the base.
                match self.defining_inst(inst.operands.first().copied()) {
                    Some(base) => self.var_name_inner(base, depth),
                    None => "?".to_string(),
                }
            }
            Opcode::Store | Opcode::Load => match inst.address_operand() {
                Some(addr) => {
                    if let Some(name) = self.values[addr].name.as_deref() {
                        crate::naming::strip_addr_suffix(name).to_string()
                    } else if let Some(def) = self.defining_inst(Some(addr)) {
                        format!("*{}", self.var_name_inner(def, depth))
                    } else {
                        "*?".to_string()
                    }
                }
                None => "?".to_string(),
            },
            _ => "n/a".to_string(),
        }
    }

    /// The un-normalized, un-chased name of an instruction's address
    /// operand: just `ValueData::name`, empty if absent. Used by the DOT
    /// edge-filter, instructions-info/ignoring dumps, and the depmap
    /// builder, all of which key on literal operand names rather than
    /// [`Self::var_name`]'s GEP/alloca-chase (grounded on
    /// `examples/original_source/PDG.cpp`'s direct
    /// `I->getOperand(...)->getName().str()` calls in `dumpToDot`,
    /// `dumpInstructionInfo`, and `getDPDepMap`, as opposed to its
    /// `nodeLabel`'s use of the chasing `getVarName`).
    pub fn raw_address_name(&self, id: InstId) -> String {
        self.inst(id)
            .address_operand()
            .and_then(|v| self.values[v].name.clone())
            .unwrap_or_default()
    }

    /// Best-effort: find the instruction (if any) that produced `value` as
    /// its address/bound operand. Used only for display purposes, never by
    /// the core analysis, so a linear scan is acceptable.
    fn defining_inst(&self, value: Option<ValueId>) -> Option<InstId> {
        let value = value?;
        self.instructions_in_order()
            .find(|&id| self.insts[id].address_operand() == Some(value))
    }
}

/// Builder for constructing [`Function`]s as test fixtures.
pub struct FunctionBuilder {
    name: String,
    values: SlotMap<ValueId, ValueData>,
    insts: SlotMap<InstId, Instruction>,
    blocks: SlotMap<BlockId, BasicBlock>,
    block_order: Vec<BlockId>,
    entry: Option<BlockId>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: SlotMap::with_key(),
            insts: SlotMap::with_key(),
            blocks: SlotMap::with_key(),
            block_order: Vec::new(),
            entry: None,
        }
    }

    pub fn value(&mut self, name: Option<&str>, ty: Option<Ty>) -> ValueId {
        self.values.insert(ValueData {
            name: name.map(str::to_owned),
            ty,
        })
    }

    /// Adds a block in program order; the first block added becomes entry
    /// unless [`Self::set_entry`] is called explicitly.
    pub fn block(&mut self, name: impl Into<String>) -> BlockId {
        let id = self.blocks.insert(BasicBlock {
            name: name.into(),
            insts: Vec::new(),
            successors: Vec::new(),
        });
        self.block_order.push(id);
        if self.entry.is_none() {
            self.entry = Some(id);
        }
        id
    }

    pub fn set_entry(&mut self, block: BlockId) {
        self.entry = Some(block);
    }

    pub fn add_successor(&mut self, from: BlockId, to: BlockId) {
        self.blocks[from].successors.push(to);
    }

    pub fn inst(
        &mut self,
        block: BlockId,
        opcode: Opcode,
        operands: Vec<ValueId>,
        debug_loc: Option<DebugLoc>,
    ) -> InstId {
        let id = self.insts.insert(Instruction {
            opcode,
            operands,
            block,
            debug_loc,
        });
        self.blocks[block].insts.push(id);
        id
    }

    pub fn build(self) -> Function {
        let entry = self.entry.expect("function must have at least one block");
        Function {
            name: self.name,
            values: self.values,
            insts: self.insts,
            blocks: self.blocks,
            block_order: self.block_order,
            entry,
        }
    }
}

/// A map from original-program file path to a compact numeric id, used only
/// by the depmap emitter (spec.md §6(e)).
pub type FileMap = HashMap<String, FileId>;
