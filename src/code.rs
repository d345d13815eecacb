//! `Code` (C4): an append-only, linearly-indexed container of [`Instruction`]s
//! plus the static validator, renumbering, nop compaction, and block/group
//! lookup routines that operate on it. This is the hard part of the IR: the
//! single forward pass in [`Code::check`] is the only place that enforces
//! V1-V9 from the design, and every other component (block navigation,
//! ClassDefinition, ContextAnalyzer) exists to be driven by it.

use std::collections::HashSet;
use std::mem::Discriminant;

use crate::block::{self, Block, BlockGroup, BlockGroupIter};
use crate::class_definition::{ClassDefinition, ClassDefinitionStack};
use crate::context::ContextAnalyzer;
use crate::error::ValidationError;
use crate::instruction::Instruction;
use crate::operation::Operation;
use crate::types::{Signature, Type};
use crate::variable::{Stack, Variable, VariableMap};

/// One frame of the validator's open-block stack. The root frame (`scope_id
/// == 0`, `head == None`) represents the file/script scope and is never
/// popped by a well-formed `Code`.
struct ActiveBlock {
    scope_id: i64,
    head: Option<usize>,
}

/// A sequence of instructions, indexed by position. Appending, replacing, and
/// validating a `Code` never requires anything beyond the instructions
/// themselves — no external type information or side tables.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Code {
    instructions: Vec<Instruction>,
}

impl Code {
    pub fn new() -> Self {
        Self {
            instructions: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instruction(&self, index: usize) -> &Instruction {
        &self.instructions[index]
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Appends `instruction`, assigning it `index == count` regardless of
    /// whatever index it was constructed with.
    pub fn append(&mut self, mut instruction: Instruction) -> usize {
        let index = self.instructions.len();
        instruction.set_index(index);
        self.instructions.push(instruction);
        index
    }

    /// Rewrites the instruction at `index`, preserving `index` on the
    /// replacement regardless of whatever index it was constructed with.
    ///
    /// # Panics
    /// If `index >= self.len()` — a caller bug, not a recoverable condition.
    pub fn replace(&mut self, index: usize, mut new: Instruction) {
        assert!(index < self.instructions.len(), "replace() index out of bounds");
        new.set_index(index);
        self.instructions[index] = new;
    }

    /// `Variable(max(allOutputs) + 1)`, or `Variable(0)` on an empty `Code`.
    pub fn next_free_variable(&self) -> Variable {
        self.instructions
            .iter()
            .flat_map(Instruction::all_outputs)
            .map(Variable::number)
            .max()
            .map_or(Variable::new(0), |max| Variable::new(max + 1))
    }

    /// Runs the single forward validation pass described in §4.4: definition
    /// visibility, context gating, block balance, for-loop header
    /// consistency, class-definition completeness, and final variable
    /// contiguity. Pure function of `self` — no mutation, no I/O.
    pub fn check(&self) -> Result<(), ValidationError> {
        let mut defined: VariableMap<i64> = VariableMap::new();
        let mut context_analyzer = ContextAnalyzer::new();
        let mut scope_counter: i64 = 0;
        let mut active_blocks: Stack<ActiveBlock> = Stack::new();
        active_blocks.push(ActiveBlock {
            scope_id: 0,
            head: None,
        });
        let mut active_scope_ids: HashSet<i64> = HashSet::from([0]);
        let mut for_loop_header_stack: Stack<usize> = Stack::new();
        let mut class_definitions: ClassDefinitionStack = Stack::new();
        let mut singular_seen: Stack<HashSet<Discriminant<Operation>>> = Stack::new();

        for (i, instr) in self.instructions.iter().enumerate() {
            log::trace!("validating instruction {i}: {}", instr.operation());

            if !instr.has_consistent_slot_layout() {
                return Err(ValidationError::MalformedInstructionSlots { index: i });
            }
            if instr.index() != i {
                return Err(ValidationError::WrongIndex {
                    expected: i,
                    got: instr.index(),
                });
            }
            let op = instr.operation();
            let starts = op.is_block_start();
            let ends = op.is_block_end();

            // (2) input visibility.
            for &input in instr.inputs() {
                match defined.get(input) {
                    None => return Err(ValidationError::VariableNeverDefined(input)),
                    Some(scope_id) => {
                        if !active_scope_ids.contains(scope_id) {
                            return Err(ValidationError::VariableNotVisible(input));
                        }
                    }
                }
            }

            // (3) required context.
            if !context_analyzer.context().contains(op.required_context()) {
                return Err(ValidationError::RequiredContextMissing {
                    index: i,
                    operation: op.clone(),
                });
            }

            // Singular-operation bookkeeping: a start-only op opens a new
            // group tracker; intermediate start-and-end ops check/insert
            // against it without disturbing it; an end-only op closes it.
            if starts && !ends {
                singular_seen.push(HashSet::new());
            }
            if op.is_singular() {
                let group = singular_seen
                    .top_mut()
                    .expect("singular op encountered with no open block group");
                if !group.insert(std::mem::discriminant(op)) {
                    return Err(ValidationError::DuplicateSingularOperation {
                        operation: op.clone(),
                    });
                }
            }

            // (4, 5) block-end handling: close the context frame and the
            // matching active block, verify the grammar, run closing
            // side-effects (for-loop header / class completeness).
            if ends {
                if active_blocks.len() <= 1 {
                    return Err(ValidationError::BlockEndWithNoOpenBlock {
                        index: i,
                        operation: op.clone(),
                    });
                }
                context_analyzer.pop();
                let closed = active_blocks.pop().expect("checked non-empty above");
                active_scope_ids.remove(&closed.scope_id);

                let head_index = closed.head.expect("non-root block always has a head");
                let head_op = self.instructions[head_index].operation();
                if !head_op.is_matching_end(op) {
                    return Err(ValidationError::BlockEndMismatch {
                        begin: head_op.clone(),
                        end: op.clone(),
                    });
                }

                if matches!(op, Operation::EndClass) {
                    let class = class_definitions
                        .pop()
                        .expect("EndClass with no open class");
                    if class.has_pending_methods() {
                        return Err(ValidationError::ClassMissingMethodDefinitions {
                            missing: class.pending_method_names(),
                        });
                    }
                }

                if !starts {
                    singular_seen
                        .pop()
                        .expect("end-only boundary always closes a singular group");
                }
            }

            // (6) define outer outputs under the scope active *before* any
            // new block this instruction opens.
            for &output in instr.outputs() {
                Self::define_variable(&mut defined, output, i, op, active_blocks.top().expect("root frame always present").scope_id)?;
            }

            // (7) block-start handling: open a new context frame and active
            // block, then run grammar-specific opening side-effects.
            if starts {
                scope_counter += 1;
                context_analyzer.push_for_block_start(
                    op.context_opened(),
                    op.propagates_surrounding_context() || op.resumes_surrounding_context(),
                );
                active_blocks.push(ActiveBlock {
                    scope_id: scope_counter,
                    head: Some(i),
                });
                active_scope_ids.insert(scope_counter);

                match op {
                    Operation::BeginForLoopCondition => {
                        if instr.inputs().len() != instr.inner_outputs().len() {
                            return Err(ValidationError::ForLoopHeaderInconsistent { index: i });
                        }
                        for_loop_header_stack.push(instr.inner_outputs().len());
                    }
                    Operation::BeginForLoopAfterthought => {
                        let expected = *for_loop_header_stack
                            .top()
                            .expect("afterthought with no open for-loop header");
                        if instr.inner_outputs().len() != expected {
                            return Err(ValidationError::ForLoopHeaderInconsistent { index: i });
                        }
                    }
                    Operation::BeginForLoopBody => {
                        let expected = for_loop_header_stack
                            .pop()
                            .expect("body with no open for-loop header");
                        if instr.inner_outputs().len() != expected {
                            return Err(ValidationError::ForLoopHeaderInconsistent { index: i });
                        }
                    }
                    Operation::BeginClass {
                        instance_properties,
                        methods,
                        has_superclass: _,
                    } => {
                        let constructor_signature = methods
                            .iter()
                            .find(|(name, _)| name == "constructor")
                            .map(|(_, sig)| sig.clone())
                            .unwrap_or_else(|| Signature::new(vec![], Type::Unknown));
                        // Superclass type resolution needs a ProgramTypes
                        // ledger this pure structural pass doesn't have; see
                        // DESIGN.md.
                        class_definitions.push(ClassDefinition::new(
                            instance_properties.clone(),
                            methods.clone(),
                            constructor_signature,
                            None,
                        ));
                    }
                    Operation::BeginMethod { .. } => {
                        let class = class_definitions
                            .top_mut()
                            .expect("BeginMethod requires an open class (gated by required_context)");
                        if class.next_method().is_none() {
                            return Err(ValidationError::ClassUnexpectedMethod { index: i });
                        }
                    }
                    _ => {}
                }
            }

            // (8) define inner outputs under the scope just opened (or -1
            // for a nop, same as outer outputs).
            let inner_scope = if op.is_nop() { -1 } else { scope_counter };
            for &output in instr.inner_outputs() {
                Self::define_variable(&mut defined, output, i, op, inner_scope)?;
            }
        }

        // (9) the file is over: every defined variable number must be a
        // prefix with no holes.
        if defined.has_holes() {
            return Err(ValidationError::VariableMapHasHoles);
        }

        log::debug!("validated {} instructions", self.instructions.len());
        Ok(())
    }

    fn define_variable(
        defined: &mut VariableMap<i64>,
        output: Variable,
        _index: usize,
        op: &Operation,
        scope_id: i64,
    ) -> Result<(), ValidationError> {
        if defined.contains(output) {
            return Err(ValidationError::VariableRedefined(output));
        }
        let number = output.number();
        if number > 0 && !defined.contains(Variable::new(number - 1)) {
            return Err(ValidationError::NonContiguousVariable {
                number,
                missing: number - 1,
            });
        }
        let scope_id = if op.is_nop() { -1 } else { scope_id };
        defined.insert(output, scope_id);
        Ok(())
    }

    pub fn is_statically_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Reassigns sequential numbers `0, 1, 2, ...` to every currently-defined
    /// output (in index order), substituting the mapping into every slot.
    /// Does not remove any instruction — use [`Code::remove_nops`] for that.
    pub fn renumber_variables(&mut self) {
        let mapping = self.build_renumbering(|_| true);
        for instr in &mut self.instructions {
            instr.remap_variables(&mapping);
        }
    }

    /// Filters out every `nop` instruction, then renumbers the survivors'
    /// variables so they stay contiguous — the two are one pass here since a
    /// nop's outputs were never visible to anything (V9) and so never need a
    /// mapping entry of their own.
    pub fn remove_nops(&mut self) {
        debug_assert!(self.is_statically_valid());

        let mapping = self.build_renumbering(|instr| !instr.is_nop());

        let mut kept = Vec::with_capacity(self.instructions.len());
        for mut instr in self.instructions.drain(..) {
            if instr.is_nop() {
                continue;
            }
            instr.remap_variables(&mapping);
            kept.push(instr);
        }
        for (index, instr) in kept.iter_mut().enumerate() {
            instr.set_index(index);
        }
        self.instructions = kept;

        debug_assert!(self.is_statically_valid());
    }

    /// `removeNops()` followed by `renumberVariables()`; idempotent once the
    /// `Code` is already nop-free and densely numbered.
    pub fn normalize(&mut self) {
        self.remove_nops();
        self.renumber_variables();
    }

    /// Builds an old-variable -> new-variable mapping by walking outputs in
    /// index order, assigning a fresh sequential number to each output of an
    /// instruction `include` accepts.
    fn build_renumbering(&self, include: impl Fn(&Instruction) -> bool) -> VariableMap<Variable> {
        let mut mapping = VariableMap::new();
        let mut next = 0u16;
        for instr in &self.instructions {
            if !include(instr) {
                continue;
            }
            for &old in instr.all_outputs() {
                mapping.insert(old, Variable::new(next));
                next += 1;
            }
        }
        mapping
    }

    /// # Panics
    /// If the instruction at `head` is not a block-start.
    pub fn block_starting_at(&self, head: usize) -> Block {
        Block {
            head,
            tail: block::block_end(self, head),
        }
    }

    /// # Panics
    /// If the instruction at `tail` is not a block-end.
    pub fn block_ending_at(&self, tail: usize) -> Block {
        Block {
            head: block::block_begin(self, tail),
            tail,
        }
    }

    /// # Panics
    /// If `head` is not a start-only boundary (start ∧ ¬end).
    pub fn block_group_started_by(&self, head: usize) -> BlockGroup {
        let op = self.instruction(head).operation();
        assert!(
            op.is_block_start() && !op.is_block_end(),
            "block_group_started_by() called on a non-start-only index"
        );
        block::collect_block_group_instructions(self, head)
    }

    /// The block group containing `instr`, found by walking backward to its
    /// start-only head.
    pub fn block_group_around(&self, instr: usize) -> BlockGroup {
        let head = block::block_group_head(self, instr);
        block::collect_block_group_instructions(self, head)
    }

    /// Ordering contract: inner groups before the groups that enclose them,
    /// earlier groups before later ones at the same depth.
    pub fn find_all_block_groups(&self) -> Vec<BlockGroup> {
        block::find_all_block_groups(self)
    }

    pub fn block_groups(&self) -> BlockGroupIter<'_> {
        BlockGroupIter::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{BinaryOperator, MethodKind};

    fn push(
        code: &mut Code,
        op: Operation,
        inputs: Vec<Variable>,
        outputs: Vec<Variable>,
        inner_outputs: Vec<Variable>,
    ) {
        let index = code.len();
        let instr = Instruction::new(index, op, inputs, outputs, inner_outputs).unwrap();
        code.append(instr);
    }

    /// S1: three straight-line instructions are valid; `nextFreeVariable`
    /// reports the next unused slot.
    #[test]
    fn s1_straight_line_arithmetic_is_valid() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::LoadInteger(2), vec![], vec![Variable::new(1)], vec![]);
        push(
            &mut code,
            Operation::BinaryOperation(BinaryOperator::Add),
            vec![Variable::new(0), Variable::new(1)],
            vec![Variable::new(2)],
            vec![],
        );

        assert!(code.is_statically_valid());
        assert_eq!(code.next_free_variable(), Variable::new(3));
    }

    /// S2: a variable defined inside an if-block is invisible afterward.
    #[test]
    fn s2_variable_defined_inside_if_is_not_visible_after() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginIf, vec![Variable::new(0)], vec![], vec![]);
        push(&mut code, Operation::LoadInteger(2), vec![], vec![Variable::new(1)], vec![]);
        push(&mut code, Operation::EndIf, vec![], vec![], vec![]);
        push(&mut code, Operation::TypeOf, vec![Variable::new(1)], vec![Variable::new(2)], vec![]);

        assert_eq!(
            code.check(),
            Err(ValidationError::VariableNotVisible(Variable::new(1)))
        );
    }

    /// S3: a mismatched block end is rejected.
    #[test]
    fn s3_mismatched_block_end_is_rejected() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginWhile, vec![Variable::new(0)], vec![], vec![]);
        push(&mut code, Operation::EndIf, vec![], vec![], vec![]);

        assert_eq!(
            code.check(),
            Err(ValidationError::BlockEndMismatch {
                begin: Operation::BeginWhile,
                end: Operation::EndIf,
            })
        );
    }

    fn method_sig() -> Signature {
        Signature::new(vec![], Type::Undefined)
    }

    /// S4: a class that defines every method it declares is valid; one that
    /// omits a declared method is rejected.
    #[test]
    fn s4_class_method_parity() {
        let begin_class = || Operation::BeginClass {
            instance_properties: vec![],
            methods: vec![("foo".to_string(), method_sig())],
            has_superclass: false,
        };
        let begin_method = || Operation::BeginMethod {
            name: "foo".to_string(),
            is_static: false,
            kind: MethodKind::Method,
            parameters: 0,
        };

        let mut complete = Code::new();
        push(&mut complete, begin_class(), vec![], vec![Variable::new(0)], vec![]);
        push(&mut complete, begin_method(), vec![], vec![], vec![]);
        push(&mut complete, Operation::EndMethod, vec![], vec![], vec![]);
        push(&mut complete, Operation::EndClass, vec![], vec![], vec![]);
        assert!(complete.is_statically_valid());

        let mut incomplete = Code::new();
        push(&mut incomplete, begin_class(), vec![], vec![Variable::new(0)], vec![]);
        push(&mut incomplete, Operation::EndClass, vec![], vec![], vec![]);
        assert_eq!(
            incomplete.check(),
            Err(ValidationError::ClassMissingMethodDefinitions {
                missing: vec!["foo".to_string()]
            })
        );
    }

    /// S5: `removeNops` drops nop instructions and compacts variable
    /// numbers so the result is again densely numbered.
    #[test]
    fn s5_remove_nops_compacts_numbering() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        push(
            &mut code,
            Operation::Nop {
                outputs: 1,
                inner_outputs: 0,
            },
            vec![],
            vec![Variable::new(1)],
            vec![],
        );
        push(&mut code, Operation::LoadInteger(3), vec![], vec![Variable::new(2)], vec![]);
        assert!(code.is_statically_valid());

        code.remove_nops();

        assert_eq!(code.len(), 2);
        assert_eq!(code.instruction(0).outputs(), &[Variable::new(0)]);
        assert_eq!(code.instruction(1).outputs(), &[Variable::new(1)]);
        assert!(matches!(code.instruction(1).operation(), Operation::LoadInteger(3)));
        assert!(code.is_statically_valid());
    }

    /// A nop's outputs are assigned scope -1 (V9) and so must never become
    /// visible to a later instruction, even though they still occupy a
    /// variable number for contiguity purposes.
    #[test]
    fn nop_outputs_are_never_visible_to_later_instructions() {
        let mut code = Code::new();
        push(
            &mut code,
            Operation::Nop {
                outputs: 1,
                inner_outputs: 0,
            },
            vec![],
            vec![Variable::new(0)],
            vec![],
        );
        push(&mut code, Operation::TypeOf, vec![Variable::new(0)], vec![Variable::new(1)], vec![]);

        assert_eq!(
            code.check(),
            Err(ValidationError::VariableNotVisible(Variable::new(0)))
        );
    }

    #[test]
    fn duplicate_default_switch_case_is_rejected() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadBoolean(true), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginSwitch, vec![Variable::new(0)], vec![], vec![]);
        push(&mut code, Operation::BeginSwitchDefaultCase, vec![], vec![], vec![]);
        push(&mut code, Operation::BeginSwitchDefaultCase, vec![], vec![], vec![]);
        push(&mut code, Operation::EndSwitch, vec![], vec![], vec![]);

        assert_eq!(
            code.check(),
            Err(ValidationError::DuplicateSingularOperation {
                operation: Operation::BeginSwitchDefaultCase
            })
        );
    }

    #[test]
    fn for_loop_header_mismatch_is_rejected() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(0), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginForLoopInit, vec![], vec![], vec![]);
        push(
            &mut code,
            Operation::BeginForLoopCondition,
            vec![Variable::new(0)],
            vec![],
            vec![Variable::new(1)],
        );
        push(
            &mut code,
            Operation::BeginForLoopAfterthought,
            vec![],
            vec![],
            vec![Variable::new(2), Variable::new(3)],
        );

        assert_eq!(
            code.check(),
            Err(ValidationError::ForLoopHeaderInconsistent { index: 3 })
        );
    }

    #[test]
    fn valid_for_loop_header_round_trips() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(0), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginForLoopInit, vec![], vec![], vec![]);
        push(
            &mut code,
            Operation::BeginForLoopCondition,
            vec![Variable::new(0)],
            vec![],
            vec![Variable::new(1)],
        );
        push(
            &mut code,
            Operation::BeginForLoopAfterthought,
            vec![],
            vec![],
            vec![Variable::new(2)],
        );
        push(
            &mut code,
            Operation::BeginForLoopBody,
            vec![],
            vec![],
            vec![Variable::new(3)],
        );
        push(&mut code, Operation::EndForLoop, vec![], vec![], vec![]);

        assert!(code.is_statically_valid());
    }

    #[test]
    fn non_contiguous_output_numbering_is_rejected() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::LoadInteger(2), vec![], vec![Variable::new(2)], vec![]);

        assert_eq!(
            code.check(),
            Err(ValidationError::NonContiguousVariable { number: 2, missing: 1 })
        );
    }

    #[test]
    fn redefining_a_variable_number_is_rejected() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::LoadInteger(2), vec![], vec![Variable::new(0)], vec![]);

        assert_eq!(
            code.check(),
            Err(ValidationError::VariableRedefined(Variable::new(0)))
        );
    }

    #[test]
    fn break_outside_loop_fails_context_check() {
        let mut code = Code::new();
        push(&mut code, Operation::Break, vec![], vec![], vec![]);

        assert!(matches!(
            code.check(),
            Err(ValidationError::RequiredContextMissing { .. })
        ));
    }

    #[test]
    fn break_inside_loop_is_valid() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadBoolean(true), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginWhile, vec![Variable::new(0)], vec![], vec![]);
        push(&mut code, Operation::Break, vec![], vec![], vec![]);
        push(&mut code, Operation::EndWhile, vec![], vec![], vec![]);

        assert!(code.is_statically_valid());
    }

    #[test]
    fn renumber_variables_is_idempotent_on_dense_code() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::LoadInteger(2), vec![], vec![Variable::new(1)], vec![]);

        code.renumber_variables();
        assert!(code.is_statically_valid());
        assert_eq!(code.instruction(0).outputs(), &[Variable::new(0)]);
        assert_eq!(code.instruction(1).outputs(), &[Variable::new(1)]);
    }

    #[test]
    fn normalize_is_idempotent_once_already_normal() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::LoadInteger(2), vec![], vec![Variable::new(1)], vec![]);
        code.normalize();
        let before = code.clone();
        code.normalize();
        assert_eq!(before.len(), code.len());
        assert!(code.is_statically_valid());
    }

    #[test]
    fn replace_preserves_index() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![]);
        let replacement =
            Instruction::new(99, Operation::LoadInteger(2), vec![], vec![Variable::new(0)], vec![]).unwrap();
        code.replace(0, replacement);
        assert_eq!(code.instruction(0).index(), 0);
    }
}
