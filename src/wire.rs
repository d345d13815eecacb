//! Binary encode/decode of a [`Program`], via `postcard`'s compact
//! `serde`-driven wire format. Decoding never trusts its input: every
//! program in the resulting parent chain is re-run through
//! [`crate::code::Code::check`], and the chain itself is depth-limited so a
//! crafted or corrupted blob can't recurse the decoder into a stack
//! overflow.

use crate::error::DecodeError;
use crate::program::Program;

/// Parent chains deeper than this are rejected rather than walked, per the
/// decoder depth limit a format that must tolerate adversarial input
/// (fuzzer corpora are exactly that) needs to enforce.
pub const MAX_PARENT_DEPTH: usize = 64;

/// Serializes `program` (and its entire parent chain) to a compact binary
/// buffer.
///
/// # Errors
/// Returns the underlying `postcard` error on a format failure.
pub fn encode_program(program: &Program) -> Result<Vec<u8>, DecodeError> {
    Ok(postcard::to_allocvec(program)?)
}

/// Decodes and statically re-validates `program`, walking its entire parent
/// chain.
///
/// # Errors
/// - [`DecodeError::Postcard`] if `bytes` isn't a valid encoding.
/// - [`DecodeError::ParentChainTooDeep`] if the chain exceeds
///   [`MAX_PARENT_DEPTH`].
/// - [`DecodeError::NotStaticallyValid`] if `program` or any ancestor fails
///   [`crate::code::Code::check`].
pub fn decode_program(bytes: &[u8]) -> Result<Program, DecodeError> {
    let program: Program = postcard::from_bytes(bytes)?;
    validate_chain(&program, 0)?;
    Ok(program)
}

fn validate_chain(program: &Program, depth: usize) -> Result<(), DecodeError> {
    if depth > MAX_PARENT_DEPTH {
        return Err(DecodeError::ParentChainTooDeep);
    }
    program
        .code()
        .check()
        .map_err(DecodeError::NotStaticallyValid)?;
    if let Some(parent) = program.parent() {
        validate_chain(parent, depth + 1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Code;
    use crate::instruction::Instruction;
    use crate::operation::Operation;
    use crate::variable::Variable;

    fn valid_program() -> Program {
        let mut code = Code::new();
        code.append(
            Instruction::new(0, Operation::LoadInteger(7), vec![], vec![Variable::new(0)], vec![])
                .unwrap(),
        );
        Program::new(code).unwrap()
    }

    #[test]
    fn round_trips_a_simple_program() {
        let program = valid_program();
        let bytes = encode_program(&program).unwrap();
        let decoded = decode_program(&bytes).unwrap();

        assert_eq!(decoded.id(), program.id());
        assert_eq!(decoded.code().len(), program.code().len());
    }

    #[test]
    fn round_trips_a_parent_chain() {
        let grandparent = valid_program();
        let parent = Program::with_parent(valid_program().code().clone(), grandparent).unwrap();
        let child = Program::with_parent(valid_program().code().clone(), parent).unwrap();

        let bytes = encode_program(&child).unwrap();
        let decoded = decode_program(&bytes).unwrap();
        assert_eq!(decoded.lineage_depth(), 2);
    }

    #[test]
    fn rejects_truncated_input() {
        let bytes = encode_program(&valid_program()).unwrap();
        let truncated = &bytes[..bytes.len() / 2];
        assert!(decode_program(truncated).is_err());
    }
}
