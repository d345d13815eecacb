//! The instruction (C3): an [`Operation`] bound to a concrete slot layout of
//! variables, plus the index it occupies within its [`crate::code::Code`].

use crate::operation::Operation;
use crate::variable::Variable;

/// One opcode applied to concrete variables.
///
/// `variables` holds, in order, the instruction's inputs, then its regular
/// outputs, then its inner outputs (the loop/catch/method variables visible
/// only inside the block the instruction opens). The split points are
/// derived from [`Operation::arity`] rather than stored redundantly.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Instruction {
    index: usize,
    operation: Operation,
    variables: Vec<Variable>,
    num_inputs: usize,
    num_outputs: usize,
}

impl Instruction {
    /// Builds an instruction at `index`, validating `inputs`/`outputs`/
    /// `inner_outputs` against the operation's declared arity. Variadic
    /// operations accept any `inputs.len() >= operation.num_inputs()`.
    pub fn new(
        index: usize,
        operation: Operation,
        inputs: Vec<Variable>,
        outputs: Vec<Variable>,
        inner_outputs: Vec<Variable>,
    ) -> Result<Self, String> {
        let arity = operation.arity();

        let inputs_ok = if operation.is_variadic() {
            inputs.len() >= arity.num_inputs
        } else if operation.is_for_loop_header_stage() {
            // Header-stage input count tracks the loop's variable count,
            // which isn't known to the catalogue; `Code::check` enforces
            // that it matches this instruction's own inner-output count.
            true
        } else {
            inputs.len() == arity.num_inputs
        };
        if !inputs_ok {
            return Err(format!(
                "{operation} expects {} inputs, got {}",
                arity.num_inputs,
                inputs.len()
            ));
        }
        if outputs.len() != arity.num_outputs {
            return Err(format!(
                "{operation} expects {} outputs, got {}",
                arity.num_outputs,
                outputs.len()
            ));
        }
        if !operation.is_for_loop_header_stage() && inner_outputs.len() != arity.num_inner_outputs
        {
            return Err(format!(
                "{operation} expects {} inner outputs, got {}",
                arity.num_inner_outputs,
                inner_outputs.len()
            ));
        }

        let num_inputs = inputs.len();
        let num_outputs = outputs.len();
        let mut variables = inputs;
        variables.extend(outputs);
        variables.extend(inner_outputs);

        Ok(Self {
            index,
            operation,
            variables,
            num_inputs,
            num_outputs,
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether `num_inputs`/`num_outputs` are consistent with `variables`'
    /// length, i.e. whether `inputs()`/`outputs()`/`inner_outputs()` can
    /// slice it without panicking. Always true for an `Instruction` built
    /// via [`Instruction::new`]; only a decoded instruction that bypassed it
    /// can fail this.
    pub(crate) fn has_consistent_slot_layout(&self) -> bool {
        self.num_inputs <= self.variables.len()
            && self.num_inputs + self.num_outputs <= self.variables.len()
    }

    /// Only [`crate::code::Code::renumber_variables`] and block-shifting
    /// reindex instructions in place.
    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn inputs(&self) -> &[Variable] {
        &self.variables[..self.num_inputs]
    }

    pub fn outputs(&self) -> &[Variable] {
        &self.variables[self.num_inputs..self.num_inputs + self.num_outputs]
    }

    pub fn inner_outputs(&self) -> &[Variable] {
        &self.variables[self.num_inputs + self.num_outputs..]
    }

    /// All variables this instruction produces, outputs before inner
    /// outputs, matching their relative scope-opening order.
    pub fn all_outputs(&self) -> &[Variable] {
        &self.variables[self.num_inputs..]
    }

    pub fn all_variables(&self) -> &[Variable] {
        &self.variables
    }

    pub(crate) fn set_inputs(&mut self, inputs: Vec<Variable>) {
        let mut variables = inputs;
        self.num_inputs = variables.len();
        variables.extend_from_slice(self.outputs());
        variables.extend_from_slice(self.inner_outputs());
        self.variables = variables;
    }

    /// Rewrites every slot (inputs, outputs, inner outputs alike) through
    /// `mapping`, used by [`crate::code::Code::renumber_variables`] and
    /// [`crate::code::Code::remove_nops`] to relabel variable numbers in
    /// place without disturbing the input/output/inner-output split.
    pub(crate) fn remap_variables(&mut self, mapping: &crate::variable::VariableMap<Variable>) {
        for v in &mut self.variables {
            *v = *mapping
                .get(*v)
                .expect("renumbering references a variable with no mapping entry");
        }
    }

    /// Whether the mutation engine may rewrite this instruction's input
    /// slots in place without resizing them.
    pub fn is_input_mutable(&self) -> bool {
        !self.inputs().is_empty()
    }

    pub fn is_operation_mutable(&self) -> bool {
        self.operation.is_mutable()
    }

    /// Replaces this instruction with a placeholder `Nop` that preserves its
    /// output/inner-output counts so downstream slot indices remain valid,
    /// per V9's scope-(-1) rule for nop outputs.
    pub fn nop(&mut self) {
        let outputs = self.operation.num_outputs();
        let inner_outputs = self.operation.num_inner_outputs();
        self.operation = Operation::Nop {
            outputs,
            inner_outputs,
        };
        self.num_inputs = 0;
        self.variables = self.all_outputs().to_vec();
    }

    pub fn is_nop(&self) -> bool {
        self.operation.is_nop()
    }

    pub fn is_block_start(&self) -> bool {
        self.operation.is_block_start()
    }

    pub fn is_block_end(&self) -> bool {
        self.operation.is_block_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_layout_splits_by_arity() {
        let instr = Instruction::new(
            0,
            Operation::BeginForInLoop,
            vec![Variable::new(0)],
            vec![],
            vec![Variable::new(1)],
        )
        .unwrap();

        assert_eq!(instr.inputs(), &[Variable::new(0)]);
        assert!(instr.outputs().is_empty());
        assert_eq!(instr.inner_outputs(), &[Variable::new(1)]);
        assert_eq!(instr.all_outputs(), &[Variable::new(1)]);
    }

    #[test]
    fn wrong_input_count_is_rejected() {
        let result = Instruction::new(0, Operation::LoadUndefined, vec![Variable::new(0)], vec![Variable::new(1)], vec![]);
        assert!(result.is_err());
    }

    #[test]
    fn variadic_operation_accepts_extra_inputs() {
        let instr = Instruction::new(
            0,
            Operation::CallFunction,
            vec![Variable::new(0), Variable::new(1), Variable::new(2)],
            vec![Variable::new(3)],
            vec![],
        )
        .unwrap();
        assert_eq!(instr.inputs().len(), 3);
    }

    #[test]
    fn consistent_slot_layout_is_detected() {
        let instr = Instruction::new(0, Operation::LoadInteger(1), vec![], vec![Variable::new(0)], vec![])
            .unwrap();
        assert!(instr.has_consistent_slot_layout());

        let malformed = Instruction {
            index: 0,
            operation: Operation::LoadInteger(1),
            variables: vec![Variable::new(0)],
            num_inputs: 5,
            num_outputs: 1,
        };
        assert!(!malformed.has_consistent_slot_layout());
    }

    #[test]
    fn nop_preserves_output_slot_count() {
        let mut instr = Instruction::new(
            0,
            Operation::BeginPlainFunction { parameters: 2 },
            vec![],
            vec![Variable::new(0)],
            vec![Variable::new(1), Variable::new(2)],
        )
        .unwrap();
        instr.nop();
        assert!(instr.is_nop());
        assert!(instr.inputs().is_empty());
        assert_eq!(instr.all_outputs().len(), 3);
    }
}
