//! A [`Program`]: validated [`Code`] plus the side tables that travel with
//! it — collected types, free-form comments, and a lineage pointer back to
//! whatever program it was derived from.

use std::collections::HashMap;

use uuid::Uuid;

use crate::code::Code;
use crate::error::ValidationError;
use crate::types::ProgramTypes;

const HEADER_KEY: i64 = -1;
const FOOTER_KEY: i64 = -2;
const INSTRUCTION_KEY_OFFSET: i64 = 2;

/// How far type collection has progressed for a [`Program`]. Type
/// collection itself (running the target and recording observed types) is
/// out of scope for this crate; this only records where a program stands so
/// downstream tooling knows whether [`Program::types`] can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TypeCollectionStatus {
    /// No type information has been gathered for this program.
    NotAttempted,
    /// Collection ran and [`ProgramTypes`] reflects its result.
    Success,
    /// Collection ran but errored before reporting types; existing entries
    /// may be partial.
    Error,
    /// Collection was attempted but the target did not report back in time.
    Timeout,
}

/// Free-form text attached to a program: a header, a footer, and notes keyed
/// to individual instructions — all backed by one position-keyed map so the
/// wire format only has one record kind to carry.
///
/// Positions: the header lives at `-1`, the footer at `-2`, and the comment
/// for instruction `i` at `i + 2` — keeping every instruction's key positive
/// and distinct from the two sentinels regardless of how large the program
/// gets.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Comments {
    by_position: HashMap<i64, String>,
}

impl Comments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> Option<&str> {
        self.by_position.get(&HEADER_KEY).map(String::as_str)
    }

    pub fn set_header(&mut self, text: String) {
        self.by_position.insert(HEADER_KEY, text);
    }

    pub fn footer(&self) -> Option<&str> {
        self.by_position.get(&FOOTER_KEY).map(String::as_str)
    }

    pub fn set_footer(&mut self, text: String) {
        self.by_position.insert(FOOTER_KEY, text);
    }

    fn position_key(index: usize) -> i64 {
        i64::try_from(index).expect("instruction index fits in i64") + INSTRUCTION_KEY_OFFSET
    }

    /// Attaches `text` to instruction `index`, overwriting any comment
    /// already there.
    pub fn set_at(&mut self, index: usize, text: String) {
        self.by_position.insert(Self::position_key(index), text);
    }

    pub fn at(&self, index: usize) -> Option<&str> {
        self.by_position
            .get(&Self::position_key(index))
            .map(String::as_str)
    }
}

/// A validated instruction stream plus the bookkeeping that travels with it
/// between construction, mutation, and serialization.
///
/// `Program::new` is the only entry point and always re-validates: there is
/// no `unchecked_new`, because the crate has no use case (mutation engine,
/// corpus replay) in which constructing a `Program` from unchecked `Code` is
/// anything but a bug — unlike decoding, which has to tolerate untrusted
/// bytes and so earns its own error path in [`crate::wire`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Program {
    id: Uuid,
    code: Code,
    types: ProgramTypes,
    comments: Comments,
    type_collection_status: TypeCollectionStatus,
    parent: Option<Box<Program>>,
}

impl Program {
    /// Builds a program from `code`, assigning it a fresh random id.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found by [`Code::check`].
    pub fn new(code: Code) -> Result<Self, ValidationError> {
        code.check()?;
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            types: ProgramTypes::new(),
            comments: Comments::new(),
            type_collection_status: TypeCollectionStatus::NotAttempted,
            parent: None,
        })
    }

    /// Builds a program that records `parent` as the program it was derived
    /// from (e.g. by mutation). `parent` is validated independently of
    /// `code` — a Program's lineage is informational, not a re-derivation of
    /// validity.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found by [`Code::check`].
    pub fn with_parent(code: Code, parent: Program) -> Result<Self, ValidationError> {
        let mut program = Self::new(code)?;
        program.parent = Some(Box::new(parent));
        Ok(program)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn code(&self) -> &Code {
        &self.code
    }

    pub fn code_mut(&mut self) -> &mut Code {
        &mut self.code
    }

    pub fn types(&self) -> &ProgramTypes {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut ProgramTypes {
        &mut self.types
    }

    pub fn comments(&self) -> &Comments {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }

    pub fn type_collection_status(&self) -> TypeCollectionStatus {
        self.type_collection_status
    }

    pub fn set_type_collection_status(&mut self, status: TypeCollectionStatus) {
        self.type_collection_status = status;
    }

    pub fn parent(&self) -> Option<&Program> {
        self.parent.as_deref()
    }

    /// The number of ancestors reachable by following `parent` links,
    /// i.e. 0 for a program with no recorded lineage.
    pub fn lineage_depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.parent.as_deref();
        while let Some(p) = current {
            depth += 1;
            current = p.parent.as_deref();
        }
        depth
    }
}
