//! A linear, typed, structurally-scoped intermediate representation for
//! JavaScript programs, built for a coverage-guided fuzzer's mutation and
//! minimization passes.
//!
//! A [`Program`] wraps validated [`Code`]: a flat, append-only vector of
//! [`Instruction`]s whose variables are numbered in definition order and
//! whose control-flow constructs (if/else, loops, try/catch, switch,
//! classes) are expressed as matched pairs of block-start and block-end
//! [`Operation`]s rather than a tree. [`Code::check`] is the single source
//! of truth for what makes an instruction stream well-formed; everything
//! else in this crate (block/group navigation, the context analyzer, class
//! definition tracking, the type ledger) either feeds that pass or consumes
//! its result.
//!
//! This crate owns the IR and its invariants only. Generating new code,
//! mutating existing code, lifting back to JavaScript source, and running a
//! target to collect runtime types are all downstream concerns with their
//! own crates.

pub mod block;
pub mod class_definition;
pub mod code;
pub mod context;
pub mod error;
pub mod instruction;
pub mod operation;
pub mod program;
pub mod types;
pub mod variable;
pub mod wire;

pub use block::{Block, BlockGroup, BlockGroupIter};
pub use class_definition::{ClassDefinition, ClassDefinitionStack};
pub use code::Code;
pub use context::{Context, ContextAnalyzer};
pub use error::{DecodeError, ValidationError};
pub use instruction::Instruction;
pub use operation::{Arity, BinaryOperator, Comparator, MethodKind, Operation, UnaryOperator};
pub use program::{Comments, Program, TypeCollectionStatus};
pub use types::{ProgramTypes, Signature, Type, TypeQuality};
pub use variable::{Stack, Variable, VariableMap, VariableSet};
pub use wire::{decode_program, encode_program, MAX_PARENT_DEPTH};
