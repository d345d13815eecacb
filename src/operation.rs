//! The operation catalogue (C2): immutable, closed-world tagged variants
//! describing opcodes. The validator treats operations opaquely through the
//! flag/predicate methods below; it never down-casts.

use std::fmt;

use crate::context::Context;
use crate::types::Signature;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOperator {
    Neg,
    Plus,
    LogicalNot,
    BitwiseNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitwiseAnd,
    BitwiseOr,
    Xor,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    LogicalAnd,
    LogicalOr,
    NullishCoalesce,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Comparator {
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MethodKind {
    Method,
    Getter,
    Setter,
}

/// The arity of an operation: fixed input/output/inner-output counts, plus
/// the index at which variadic inputs begin (if any).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub num_inputs: usize,
    pub num_outputs: usize,
    pub num_inner_outputs: usize,
    pub first_variadic_input: Option<usize>,
}

impl Arity {
    const fn fixed(num_inputs: usize, num_outputs: usize, num_inner_outputs: usize) -> Self {
        Self {
            num_inputs,
            num_outputs,
            num_inner_outputs,
            first_variadic_input: None,
        }
    }

    const fn variadic(fixed_inputs: usize, num_outputs: usize) -> Self {
        Self {
            num_inputs: fixed_inputs,
            num_outputs,
            num_inner_outputs: 0,
            first_variadic_input: Some(fixed_inputs),
        }
    }
}

/// Immutable descriptor for an opcode. This is the closed sum referenced by
/// §4.2/§9 of the design: the control-flow grammar lives entirely in
/// [`Operation::is_matching_end`], so adding a construct never requires
/// touching the validator.
#[derive(Debug, Clone, Hash, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Operation {
    /// Placeholder left behind by minimization; its outputs are assigned
    /// scope -1 and are therefore never visible (V9).
    Nop {
        outputs: usize,
        inner_outputs: usize,
    },

    LoadInteger(i64),
    LoadBigInt(i64),
    /// Bit pattern of an `f64`, so the operation stays `Eq`/`Hash`.
    LoadFloat(u64),
    LoadString(String),
    LoadBoolean(bool),
    LoadUndefined,
    LoadNull,
    LoadThis,
    LoadArguments,
    LoadNewTarget,
    LoadRegExp {
        pattern: String,
        flags: String,
    },
    LoadBuiltin(String),

    CreateArray,
    CreateObject {
        property_names: Vec<String>,
    },
    CreateTemplateString {
        parts: Vec<String>,
    },

    LoadProperty(String),
    StoreProperty(String),
    DeleteProperty(String),
    LoadElement,
    StoreElement,
    LoadComputedProperty,
    StoreComputedProperty,

    UnaryOperation(UnaryOperator),
    BinaryOperation(BinaryOperator),
    CompareOperation(Comparator),
    /// Rebinds the value held by an existing variable. The variable's
    /// identity (its number) is unaffected — see [`crate::variable::Variable`].
    Reassign,
    Dup,
    TypeOf,
    InstanceOf,
    In,

    CallFunction,
    CallMethod(String),
    CallComputedMethod,
    Construct,
    CallSuperConstructor,
    CallSuperMethod(String),

    BeginIf,
    BeginElse,
    EndIf,

    BeginWhile,
    EndWhile,
    BeginDoWhile,
    EndDoWhile,

    BeginForLoopInit,
    BeginForLoopCondition,
    BeginForLoopAfterthought,
    BeginForLoopBody,
    EndForLoop,

    BeginForInLoop,
    EndForInLoop,
    BeginForOfLoop,
    EndForOfLoop,

    BeginTry,
    BeginCatch,
    BeginFinally,
    EndTryCatch,
    Throw,

    Break,
    Continue,
    Return,

    BeginBlockStatement,
    EndBlockStatement,
    BeginWith,
    EndWith,

    BeginSwitch,
    BeginSwitchCase,
    BeginSwitchDefaultCase,
    EndSwitch,

    BeginPlainFunction { parameters: usize },
    EndPlainFunction,
    BeginArrowFunction { parameters: usize },
    EndArrowFunction,
    BeginGeneratorFunction { parameters: usize },
    EndGeneratorFunction,
    BeginAsyncFunction { parameters: usize },
    EndAsyncFunction,
    BeginAsyncArrowFunction { parameters: usize },
    EndAsyncArrowFunction,
    BeginAsyncGeneratorFunction { parameters: usize },
    EndAsyncGeneratorFunction,

    Yield,
    YieldEach,
    Await,

    BeginClass {
        instance_properties: Vec<String>,
        methods: Vec<(String, Signature)>,
        has_superclass: bool,
    },
    BeginMethod {
        name: String,
        is_static: bool,
        kind: MethodKind,
        parameters: usize,
    },
    EndMethod,
    EndClass,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Nop { .. } => write!(f, "Nop"),
            Operation::LoadInteger(v) => write!(f, "LoadInteger({v})"),
            Operation::LoadBigInt(v) => write!(f, "LoadBigInt({v})"),
            Operation::LoadFloat(bits) => write!(f, "LoadFloat({})", f64::from_bits(*bits)),
            Operation::LoadString(s) => write!(f, "LoadString({s:?})"),
            Operation::LoadBoolean(b) => write!(f, "LoadBoolean({b})"),
            Operation::LoadUndefined => write!(f, "LoadUndefined"),
            Operation::LoadNull => write!(f, "LoadNull"),
            Operation::LoadThis => write!(f, "LoadThis"),
            Operation::LoadArguments => write!(f, "LoadArguments"),
            Operation::LoadNewTarget => write!(f, "LoadNewTarget"),
            Operation::LoadRegExp { pattern, flags } => {
                write!(f, "LoadRegExp(/{pattern}/{flags})")
            }
            Operation::LoadBuiltin(name) => write!(f, "LoadBuiltin({name})"),
            Operation::CreateArray => write!(f, "CreateArray"),
            Operation::CreateObject { property_names } => {
                write!(f, "CreateObject({})", property_names.join(", "))
            }
            Operation::CreateTemplateString { parts } => {
                write!(f, "CreateTemplateString({})", parts.join("${}"))
            }
            Operation::LoadProperty(name) => write!(f, "LoadProperty({name})"),
            Operation::StoreProperty(name) => write!(f, "StoreProperty({name})"),
            Operation::DeleteProperty(name) => write!(f, "DeleteProperty({name})"),
            Operation::LoadElement => write!(f, "LoadElement"),
            Operation::StoreElement => write!(f, "StoreElement"),
            Operation::LoadComputedProperty => write!(f, "LoadComputedProperty"),
            Operation::StoreComputedProperty => write!(f, "StoreComputedProperty"),
            Operation::UnaryOperation(op) => write!(f, "UnaryOperation({op:?})"),
            Operation::BinaryOperation(op) => write!(f, "BinaryOperation({op:?})"),
            Operation::CompareOperation(op) => write!(f, "CompareOperation({op:?})"),
            Operation::Reassign => write!(f, "Reassign"),
            Operation::Dup => write!(f, "Dup"),
            Operation::TypeOf => write!(f, "TypeOf"),
            Operation::InstanceOf => write!(f, "InstanceOf"),
            Operation::In => write!(f, "In"),
            Operation::CallFunction => write!(f, "CallFunction"),
            Operation::CallMethod(name) => write!(f, "CallMethod({name})"),
            Operation::CallComputedMethod => write!(f, "CallComputedMethod"),
            Operation::Construct => write!(f, "Construct"),
            Operation::CallSuperConstructor => write!(f, "CallSuperConstructor"),
            Operation::CallSuperMethod(name) => write!(f, "CallSuperMethod({name})"),
            Operation::BeginIf => write!(f, "BeginIf"),
            Operation::BeginElse => write!(f, "BeginElse"),
            Operation::EndIf => write!(f, "EndIf"),
            Operation::BeginWhile => write!(f, "BeginWhile"),
            Operation::EndWhile => write!(f, "EndWhile"),
            Operation::BeginDoWhile => write!(f, "BeginDoWhile"),
            Operation::EndDoWhile => write!(f, "EndDoWhile"),
            Operation::BeginForLoopInit => write!(f, "BeginForLoopInit"),
            Operation::BeginForLoopCondition => write!(f, "BeginForLoopCondition"),
            Operation::BeginForLoopAfterthought => write!(f, "BeginForLoopAfterthought"),
            Operation::BeginForLoopBody => write!(f, "BeginForLoopBody"),
            Operation::EndForLoop => write!(f, "EndForLoop"),
            Operation::BeginForInLoop => write!(f, "BeginForInLoop"),
            Operation::EndForInLoop => write!(f, "EndForInLoop"),
            Operation::BeginForOfLoop => write!(f, "BeginForOfLoop"),
            Operation::EndForOfLoop => write!(f, "EndForOfLoop"),
            Operation::BeginTry => write!(f, "BeginTry"),
            Operation::BeginCatch => write!(f, "BeginCatch"),
            Operation::BeginFinally => write!(f, "BeginFinally"),
            Operation::EndTryCatch => write!(f, "EndTryCatch"),
            Operation::Throw => write!(f, "Throw"),
            Operation::Break => write!(f, "Break"),
            Operation::Continue => write!(f, "Continue"),
            Operation::Return => write!(f, "Return"),
            Operation::BeginBlockStatement => write!(f, "BeginBlockStatement"),
            Operation::EndBlockStatement => write!(f, "EndBlockStatement"),
            Operation::BeginWith => write!(f, "BeginWith"),
            Operation::EndWith => write!(f, "EndWith"),
            Operation::BeginSwitch => write!(f, "BeginSwitch"),
            Operation::BeginSwitchCase => write!(f, "BeginSwitchCase"),
            Operation::BeginSwitchDefaultCase => write!(f, "BeginSwitchDefaultCase"),
            Operation::EndSwitch => write!(f, "EndSwitch"),
            Operation::BeginPlainFunction { parameters } => {
                write!(f, "BeginPlainFunction({parameters})")
            }
            Operation::EndPlainFunction => write!(f, "EndPlainFunction"),
            Operation::BeginArrowFunction { parameters } => {
                write!(f, "BeginArrowFunction({parameters})")
            }
            Operation::EndArrowFunction => write!(f, "EndArrowFunction"),
            Operation::BeginGeneratorFunction { parameters } => {
                write!(f, "BeginGeneratorFunction({parameters})")
            }
            Operation::EndGeneratorFunction => write!(f, "EndGeneratorFunction"),
            Operation::BeginAsyncFunction { parameters } => {
                write!(f, "BeginAsyncFunction({parameters})")
            }
            Operation::EndAsyncFunction => write!(f, "EndAsyncFunction"),
            Operation::BeginAsyncArrowFunction { parameters } => {
                write!(f, "BeginAsyncArrowFunction({parameters})")
            }
            Operation::EndAsyncArrowFunction => write!(f, "EndAsyncArrowFunction"),
            Operation::BeginAsyncGeneratorFunction { parameters } => {
                write!(f, "BeginAsyncGeneratorFunction({parameters})")
            }
            Operation::EndAsyncGeneratorFunction => write!(f, "EndAsyncGeneratorFunction"),
            Operation::Yield => write!(f, "Yield"),
            Operation::YieldEach => write!(f, "YieldEach"),
            Operation::Await => write!(f, "Await"),
            Operation::BeginClass { methods, .. } => {
                write!(
                    f,
                    "BeginClass({})",
                    methods
                        .iter()
                        .map(|(name, _)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Operation::BeginMethod { name, .. } => write!(f, "BeginMethod({name})"),
            Operation::EndMethod => write!(f, "EndMethod"),
            Operation::EndClass => write!(f, "EndClass"),
        }
    }
}

impl Operation {
    pub fn arity(&self) -> Arity {
        use Operation::*;
        match self {
            Nop {
                outputs,
                inner_outputs,
            } => Arity::fixed(0, *outputs, *inner_outputs),

            LoadInteger(_) | LoadBigInt(_) | LoadFloat(_) | LoadString(_) | LoadBoolean(_)
            | LoadUndefined | LoadNull | LoadThis | LoadArguments | LoadNewTarget
            | LoadRegExp { .. } | LoadBuiltin(_) => Arity::fixed(0, 1, 0),

            CreateArray => Arity::variadic(0, 1),
            CreateObject { .. } | CreateTemplateString { .. } => Arity::variadic(0, 1),

            LoadProperty(_) => Arity::fixed(1, 1, 0),
            StoreProperty(_) => Arity::fixed(2, 0, 0),
            DeleteProperty(_) => Arity::fixed(1, 1, 0),
            LoadElement | LoadComputedProperty => Arity::fixed(2, 1, 0),
            StoreElement | StoreComputedProperty => Arity::fixed(3, 0, 0),

            UnaryOperation(_) => Arity::fixed(1, 1, 0),
            BinaryOperation(_) | CompareOperation(_) => Arity::fixed(2, 1, 0),
            Reassign => Arity::fixed(2, 0, 0),
            Dup => Arity::fixed(1, 1, 0),
            TypeOf => Arity::fixed(1, 1, 0),
            InstanceOf | In => Arity::fixed(2, 1, 0),

            CallFunction => Arity::variadic(1, 1),
            CallMethod(_) => Arity::variadic(1, 1),
            CallComputedMethod => Arity::variadic(2, 1),
            Construct => Arity::variadic(1, 1),
            CallSuperConstructor => Arity::variadic(0, 0),
            CallSuperMethod(_) => Arity::variadic(0, 1),

            BeginIf => Arity::fixed(1, 0, 0),
            BeginElse | EndIf => Arity::fixed(0, 0, 0),

            BeginWhile => Arity::fixed(1, 0, 0),
            EndWhile => Arity::fixed(0, 0, 0),
            BeginDoWhile => Arity::fixed(0, 0, 0),
            EndDoWhile => Arity::fixed(1, 0, 0),

            BeginForLoopInit => Arity::fixed(0, 0, 0),
            BeginForLoopCondition | BeginForLoopAfterthought | BeginForLoopBody => {
                // Inputs carry the loop-variable copies from the previous
                // header stage; inner outputs rebind them for this stage.
                // The concrete count is only known per-instruction, so the
                // catalogue declares a minimum of zero and lets the
                // validator check `numInputs == numInnerOutputs` directly
                // against the instruction.
                Arity {
                    num_inputs: 0,
                    num_outputs: 0,
                    num_inner_outputs: 0,
                    first_variadic_input: None,
                }
            }
            EndForLoop => Arity::fixed(0, 0, 0),

            BeginForInLoop | BeginForOfLoop => Arity::fixed(1, 0, 1),
            EndForInLoop | EndForOfLoop => Arity::fixed(0, 0, 0),

            BeginTry => Arity::fixed(0, 0, 0),
            BeginCatch => Arity::fixed(0, 0, 1),
            BeginFinally | EndTryCatch => Arity::fixed(0, 0, 0),
            Throw => Arity::fixed(1, 0, 0),

            Break | Continue => Arity::fixed(0, 0, 0),
            Return => Arity::fixed(1, 0, 0),

            BeginBlockStatement | EndBlockStatement => Arity::fixed(0, 0, 0),
            BeginWith => Arity::fixed(1, 0, 0),
            EndWith => Arity::fixed(0, 0, 0),

            BeginSwitch => Arity::fixed(1, 0, 0),
            BeginSwitchCase => Arity::fixed(1, 0, 0),
            BeginSwitchDefaultCase | EndSwitch => Arity::fixed(0, 0, 0),

            BeginPlainFunction { parameters }
            | BeginArrowFunction { parameters }
            | BeginGeneratorFunction { parameters }
            | BeginAsyncFunction { parameters }
            | BeginAsyncArrowFunction { parameters }
            | BeginAsyncGeneratorFunction { parameters } => {
                Arity::fixed(0, 1, *parameters)
            }
            EndPlainFunction
            | EndArrowFunction
            | EndGeneratorFunction
            | EndAsyncFunction
            | EndAsyncArrowFunction
            | EndAsyncGeneratorFunction => Arity::fixed(0, 0, 0),

            Yield | YieldEach => Arity::fixed(1, 1, 0),
            Await => Arity::fixed(1, 1, 0),

            BeginClass { has_superclass, .. } => {
                Arity::fixed(usize::from(*has_superclass), 1, 0)
            }
            BeginMethod { parameters, .. } => Arity::fixed(0, 0, *parameters),
            EndMethod | EndClass => Arity::fixed(0, 0, 0),
        }
    }

    pub fn num_inputs(&self) -> usize {
        self.arity().num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.arity().num_outputs
    }

    pub fn num_inner_outputs(&self) -> usize {
        self.arity().num_inner_outputs
    }

    pub fn first_variadic_input(&self) -> Option<usize> {
        self.arity().first_variadic_input
    }

    pub fn is_variadic(&self) -> bool {
        self.first_variadic_input().is_some()
    }

    /// True for for-loop header stages whose `numInnerOutputs` must equal
    /// `numInputs` (V7), since the catalogue can't know the concrete loop
    /// variable count ahead of the instruction.
    pub fn is_for_loop_header_stage(&self) -> bool {
        matches!(
            self,
            Operation::BeginForLoopCondition
                | Operation::BeginForLoopAfterthought
                | Operation::BeginForLoopBody
        )
    }

    pub fn is_block_start(&self) -> bool {
        use Operation::*;
        matches!(
            self,
            BeginIf
                | BeginElse
                | BeginWhile
                | BeginDoWhile
                | BeginForLoopInit
                | BeginForLoopCondition
                | BeginForLoopAfterthought
                | BeginForLoopBody
                | BeginForInLoop
                | BeginForOfLoop
                | BeginTry
                | BeginCatch
                | BeginFinally
                | BeginBlockStatement
                | BeginWith
                | BeginSwitch
                | BeginSwitchCase
                | BeginSwitchDefaultCase
                | BeginPlainFunction { .. }
                | BeginArrowFunction { .. }
                | BeginGeneratorFunction { .. }
                | BeginAsyncFunction { .. }
                | BeginAsyncArrowFunction { .. }
                | BeginAsyncGeneratorFunction { .. }
                | BeginClass { .. }
                | BeginMethod { .. }
        )
    }

    pub fn is_block_end(&self) -> bool {
        use Operation::*;
        matches!(
            self,
            BeginElse
                | EndIf
                | EndWhile
                | EndDoWhile
                | BeginForLoopCondition
                | BeginForLoopAfterthought
                | BeginForLoopBody
                | EndForLoop
                | EndForInLoop
                | EndForOfLoop
                | BeginCatch
                | BeginFinally
                | EndTryCatch
                | EndBlockStatement
                | EndWith
                | BeginSwitchCase
                | BeginSwitchDefaultCase
                | EndSwitch
                | EndPlainFunction
                | EndArrowFunction
                | EndGeneratorFunction
                | EndAsyncFunction
                | EndAsyncArrowFunction
                | EndAsyncGeneratorFunction
                | EndMethod
                | EndClass
        )
    }

    /// The control-flow grammar, in one place (§9 design note): does `end`
    /// legally close the block opened by `start`?
    pub fn is_matching_end(&self, end: &Operation) -> bool {
        use Operation::*;
        matches!(
            (self, end),
            (BeginIf, BeginElse | EndIf)
                | (BeginElse, EndIf)
                | (BeginWhile, EndWhile)
                | (BeginDoWhile, EndDoWhile)
                | (BeginForLoopInit, BeginForLoopCondition)
                | (BeginForLoopCondition, BeginForLoopAfterthought)
                | (BeginForLoopAfterthought, BeginForLoopBody)
                | (BeginForLoopBody, EndForLoop)
                | (BeginForInLoop, EndForInLoop)
                | (BeginForOfLoop, EndForOfLoop)
                | (BeginTry, BeginCatch | BeginFinally | EndTryCatch)
                | (BeginCatch, BeginFinally | EndTryCatch)
                | (BeginFinally, EndTryCatch)
                | (BeginBlockStatement, EndBlockStatement)
                | (BeginWith, EndWith)
                | (BeginSwitch, BeginSwitchCase | BeginSwitchDefaultCase | EndSwitch)
                | (
                    BeginSwitchCase,
                    BeginSwitchCase | BeginSwitchDefaultCase | EndSwitch
                )
                | (BeginSwitchDefaultCase, BeginSwitchCase | EndSwitch)
                | (BeginPlainFunction { .. }, EndPlainFunction)
                | (BeginArrowFunction { .. }, EndArrowFunction)
                | (BeginGeneratorFunction { .. }, EndGeneratorFunction)
                | (BeginAsyncFunction { .. }, EndAsyncFunction)
                | (BeginAsyncArrowFunction { .. }, EndAsyncArrowFunction)
                | (BeginAsyncGeneratorFunction { .. }, EndAsyncGeneratorFunction)
                | (BeginClass { .. }, EndClass)
                | (BeginMethod { .. }, EndMethod)
        )
    }

    /// The context bit-set this operation opens inside the block it begins.
    /// Ignored for operations that are not block starts.
    pub fn context_opened(&self) -> Context {
        use Operation::*;
        match self {
            BeginWhile | BeginDoWhile | BeginForLoopBody | BeginForInLoop | BeginForOfLoop => {
                Context::LOOP
            }
            BeginTry | BeginCatch | BeginFinally => Context::TRY_BLOCK,
            BeginSwitch | BeginSwitchCase | BeginSwitchDefaultCase => Context::SWITCH_BLOCK,
            BeginWith => Context::WITH_STATEMENT,
            BeginPlainFunction { .. } | BeginArrowFunction { .. } => Context::FUNCTION,
            BeginGeneratorFunction { .. } => Context::FUNCTION | Context::GENERATOR_FUNCTION,
            BeginAsyncFunction { .. } | BeginAsyncArrowFunction { .. } => {
                Context::FUNCTION | Context::ASYNC_FUNCTION
            }
            BeginAsyncGeneratorFunction { .. } => {
                Context::FUNCTION | Context::GENERATOR_FUNCTION | Context::ASYNC_FUNCTION
            }
            BeginClass { .. } => Context::CLASS_BODY,
            BeginMethod { .. } => Context::FUNCTION | Context::CLASS_METHOD,
            _ => Context::empty(),
        }
    }

    /// The context this operation requires from its surrounding scope to be
    /// legally placed.
    pub fn required_context(&self) -> Context {
        use Operation::*;
        match self {
            Return => Context::FUNCTION,
            Yield | YieldEach => Context::GENERATOR_FUNCTION,
            Await => Context::ASYNC_FUNCTION,
            // Context membership is pure AND (subset check), so a single
            // bit-set can't express "loop or switch" directly. `break`
            // inside a switch with no enclosing loop is narrower here than
            // in real JS; see DESIGN.md "Resolved ambiguities", #7.
            Break | Continue => Context::LOOP,
            LoadArguments | LoadNewTarget => Context::FUNCTION,
            CallSuperConstructor | CallSuperMethod(_) => Context::CLASS_METHOD,
            BeginMethod { .. } => Context::CLASS_BODY,
            _ => Context::empty(),
        }
    }

    /// True iff the context opened by this block-start is unioned with the
    /// surrounding context, rather than replacing it outright.
    pub fn propagates_surrounding_context(&self) -> bool {
        use Operation::*;
        matches!(
            self,
            BeginIf
                | BeginElse
                | BeginWhile
                | BeginDoWhile
                | BeginForLoopInit
                | BeginForLoopCondition
                | BeginForLoopAfterthought
                | BeginForLoopBody
                | BeginForInLoop
                | BeginForOfLoop
                | BeginTry
                | BeginCatch
                | BeginFinally
                | BeginBlockStatement
                | BeginWith
                | BeginSwitch
        )
    }

    /// True iff, inside the block opened by this instruction, the context
    /// active two frames up (the scope active before the immediately
    /// enclosing block was opened) applies instead of any locally-opened
    /// context. Used by switch cases to restore the context that was active
    /// before `BeginSwitch`.
    pub fn resumes_surrounding_context(&self) -> bool {
        matches!(
            self,
            Operation::BeginSwitchCase | Operation::BeginSwitchDefaultCase
        )
    }

    /// At most one occurrence of this operation is legal per enclosing
    /// context; excess occurrences are dead code. Enforced at the validator
    /// level as an outright rejection (see DESIGN.md for why the softer
    /// "ignore all but the first" reading was not adopted).
    pub fn is_singular(&self) -> bool {
        matches!(self, Operation::BeginSwitchDefaultCase)
    }

    pub fn is_call(&self) -> bool {
        matches!(
            self,
            Operation::CallFunction
                | Operation::CallMethod(_)
                | Operation::CallComputedMethod
                | Operation::Construct
                | Operation::CallSuperConstructor
                | Operation::CallSuperMethod(_)
        )
    }

    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            Operation::Break | Operation::Continue | Operation::Return | Operation::Throw
        )
    }

    pub fn is_nop(&self) -> bool {
        matches!(self, Operation::Nop { .. })
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Operation::Nop { .. })
    }

    /// Whether the mutation engine may edit this operation's literal payload
    /// in place (an `Instruction`-level concern; this crate only classifies
    /// which operations carry mutable payloads).
    pub fn is_mutable(&self) -> bool {
        matches!(
            self,
            Operation::LoadInteger(_)
                | Operation::LoadBigInt(_)
                | Operation::LoadFloat(_)
                | Operation::LoadString(_)
                | Operation::LoadBoolean(_)
                | Operation::LoadRegExp { .. }
                | Operation::LoadBuiltin(_)
                | Operation::LoadProperty(_)
                | Operation::StoreProperty(_)
                | Operation::DeleteProperty(_)
                | Operation::CallMethod(_)
                | Operation::CallSuperMethod(_)
                | Operation::UnaryOperation(_)
                | Operation::BinaryOperation(_)
                | Operation::CompareOperation(_)
        )
    }
}
