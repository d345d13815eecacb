//! Structural validation errors (returned by [`crate::code::Code::check`])
//! and decoding errors (returned by [`crate::wire`]). Both are hand-written
//! enums with manual `Display`/`Error` impls — no `thiserror`, matching how
//! the rest of this dependency stack represents its own read-path errors.

use std::error;
use std::fmt;

use crate::operation::Operation;
use crate::variable::Variable;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An instruction's declared input/output slot counts don't fit its
    /// variable list. Only reachable via a hand-built `Instruction` or a
    /// decoded one that bypassed [`crate::instruction::Instruction::new`];
    /// checked first so every other pass can slice `inputs()`/`outputs()`/
    /// `inner_outputs()` without bounds-checking again.
    MalformedInstructionSlots {
        index: usize,
    },
    WrongIndex {
        expected: usize,
        got: usize,
    },
    VariableNeverDefined(Variable),
    VariableNotVisible(Variable),
    VariableRedefined(Variable),
    NonContiguousVariable {
        number: u16,
        missing: u16,
    },
    RequiredContextMissing {
        index: usize,
        operation: Operation,
    },
    BlockEndWithNoOpenBlock {
        index: usize,
        operation: Operation,
    },
    BlockEndMismatch {
        begin: Operation,
        end: Operation,
    },
    ForLoopHeaderInconsistent {
        index: usize,
    },
    ClassMissingMethodDefinitions {
        missing: Vec<String>,
    },
    ClassUnexpectedMethod {
        index: usize,
    },
    DuplicateSingularOperation {
        operation: Operation,
    },
    VariableMapHasHoles,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInstructionSlots { index } => write!(
                f,
                "instruction {index} has an input/output slot count inconsistent with its variable list"
            ),
            Self::WrongIndex { expected, got } => {
                write!(f, "instruction index {got} does not match its position {expected}")
            }
            Self::VariableNeverDefined(v) => write!(f, "variable {v} was never defined"),
            Self::VariableNotVisible(v) => write!(f, "variable {v} is not visible anymore"),
            Self::VariableRedefined(v) => write!(f, "variable {v} is already defined"),
            Self::NonContiguousVariable { number, missing } => write!(
                f,
                "variable numbering is not contiguous: v{number} defined before v{missing}"
            ),
            Self::RequiredContextMissing { index, operation } => write!(
                f,
                "{operation} at index {index} is not legal in the current context"
            ),
            Self::BlockEndWithNoOpenBlock { index, operation } => {
                write!(f, "{operation} at index {index} has no open block to end")
            }
            Self::BlockEndMismatch { begin, end } => {
                write!(f, "block end {end} does not match block start {begin}")
            }
            Self::ForLoopHeaderInconsistent { index } => {
                write!(f, "for-loop header is inconsistent at index {index}")
            }
            Self::ClassMissingMethodDefinitions { missing } => write!(
                f,
                "missing method definitions for [{}]",
                missing.join(", ")
            ),
            Self::ClassUnexpectedMethod { index } => write!(
                f,
                "BeginMethod at index {index} defines more methods than the class declared"
            ),
            Self::DuplicateSingularOperation { operation } => {
                write!(f, "more than one {operation} defined")
            }
            Self::VariableMapHasHoles => write!(f, "defined variables have holes after validation"),
        }
    }
}

impl error::Error for ValidationError {}

/// Errors surfaced while decoding a wire-format [`crate::program::Program`].
///
/// `postcard`'s derive-generated decoder is the only thing that ever reads
/// an opcode tag, variable number, or type-quality tag off the wire, and it
/// rejects all three the same way: a malformed or out-of-range encoding of
/// any of them surfaces as [`DecodeError::Postcard`], not a dedicated
/// variant. A dedicated variant would only be honest if something in this
/// crate actually distinguished those cases by decoding the tag by hand
/// before deserializing the payload, which nothing here does.
#[derive(Debug)]
pub enum DecodeError {
    Postcard(postcard::Error),
    NotStaticallyValid(ValidationError),
    ParentChainTooDeep,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Postcard(err) => err.fmt(f),
            Self::NotStaticallyValid(err) => {
                write!(f, "decoded code is not statically valid: {err}")
            }
            Self::ParentChainTooDeep => write!(f, "program parent chain exceeds depth limit"),
        }
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Postcard(err) => Some(err),
            Self::NotStaticallyValid(err) => Some(err),
            _ => None,
        }
    }
}

impl From<postcard::Error> for DecodeError {
    fn from(err: postcard::Error) -> Self {
        Self::Postcard(err)
    }
}
