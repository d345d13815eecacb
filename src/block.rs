//! Block / BlockGroup navigation (C5): lightweight borrowing views over a
//! validated [`crate::code::Code`]. These never outlive the `Code` they
//! index into and never alias it mutably.

use crate::code::Code;

/// A matched `(head, tail)` pair: `head` is block-start, `tail` is the
/// matching block-end at the same nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub head: usize,
    pub tail: usize,
}

impl Block {
    pub fn size(&self) -> usize {
        self.tail - self.head + 1
    }
}

/// A complete control structure: the ordered boundary indices belonging to
/// one `if/else/end`, `try/catch/finally/end`, `switch/case*/end`, etc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockGroup {
    pub boundaries: Vec<usize>,
}

impl BlockGroup {
    pub fn num_blocks(&self) -> usize {
        self.boundaries.len().saturating_sub(1)
    }

    pub fn head(&self) -> usize {
        self.boundaries[0]
    }

    pub fn tail(&self) -> usize {
        *self.boundaries.last().expect("block group has a boundary")
    }
}

/// Forward scan from a block-start index, depth counter, to the matching
/// block-end at depth 0.
///
/// `head` itself is already counted as the opening `+1` (`depth` starts at
/// `1`), so the scan over the remaining instructions checks each one's
/// `-1` *before* its `+1`: a combined start-and-end boundary (`BeginElse`,
/// `BeginCatch`/`BeginFinally`, a switch case) must close the depth opened
/// by `head` rather than net to a no-op and be skipped past.
pub fn block_end(code: &Code, head: usize) -> usize {
    assert!(
        code.instruction(head).is_block_start(),
        "block_end() called on a non-block-start index"
    );
    let mut depth = 1usize;
    for i in (head + 1)..code.len() {
        let instr = code.instruction(i);
        if instr.is_block_end() {
            depth -= 1;
            if depth == 0 {
                return i;
            }
        }
        if instr.is_block_start() {
            depth += 1;
        }
    }
    panic!("block starting at {head} is never closed in a validated Code");
}

/// Symmetric backward scan from a block-end index to the matching
/// block-start at depth 0. Mirrors [`block_end`]: `tail` is already counted
/// (`depth` starts at `1`), and each preceding instruction's `-1`
/// (block-start) is checked before its `+1` (block-end) so a combined
/// boundary closes the depth rather than being skipped past.
pub fn block_begin(code: &Code, tail: usize) -> usize {
    assert!(
        code.instruction(tail).is_block_end(),
        "block_begin() called on a non-block-end index"
    );
    let mut depth = 1usize;
    for i in (0..tail).rev() {
        let instr = code.instruction(i);
        if instr.is_block_start() {
            depth -= 1;
            if depth == 0 {
                return i;
            }
        }
        if instr.is_block_end() {
            depth += 1;
        }
    }
    panic!("block ending at {tail} is never opened in a validated Code");
}

/// Backward scan from any boundary inside a block group to the start-only
/// op (start ∧ ¬end) that opens the whole group.
pub fn block_group_head(code: &Code, instr: usize) -> usize {
    let mut i = instr;
    loop {
        let op = code.instruction(i);
        if op.is_block_start() && !op.is_block_end() {
            return i;
        }
        i = block_begin(code, i);
    }
}

/// Forward scan from a group head, recording every boundary that is either
/// start-and-end at the group's outer depth, or the final end-only op.
pub fn collect_block_group_instructions(code: &Code, head: usize) -> BlockGroup {
    let mut boundaries = vec![head];
    let mut i = head;
    loop {
        let end = block_end(code, i);
        boundaries.push(end);
        let end_op = code.instruction(end);
        if end_op.is_block_end() && !end_op.is_block_start() {
            break;
        }
        i = end;
    }
    BlockGroup { boundaries }
}

/// One forward pass over the whole Code, emitting every block group it
/// finds in inner-before-enclosing, earlier-before-later order.
pub fn find_all_block_groups(code: &Code) -> Vec<BlockGroup> {
    let mut stack: Vec<Vec<usize>> = Vec::new();
    let mut groups = Vec::new();

    for i in 0..code.len() {
        let instr = code.instruction(i);
        let starts = instr.is_block_start();
        let ends = instr.is_block_end();

        match (starts, ends) {
            (true, false) => stack.push(vec![i]),
            (true, true) => {
                stack
                    .last_mut()
                    .expect("start-and-end boundary with no open group")
                    .push(i);
            }
            (false, true) => {
                let mut boundaries = stack.pop().expect("end-only boundary with no open group");
                boundaries.push(i);
                groups.push(BlockGroup { boundaries });
            }
            (false, false) => {}
        }
    }

    groups
}

/// Explicit iterator over block groups, for callers that want to walk the
/// block tree lazily rather than collect it all up front.
pub struct BlockGroupIter<'a> {
    code: &'a Code,
    next_index: usize,
}

impl<'a> BlockGroupIter<'a> {
    pub fn new(code: &'a Code) -> Self {
        Self {
            code,
            next_index: 0,
        }
    }
}

impl<'a> Iterator for BlockGroupIter<'a> {
    type Item = BlockGroup;

    fn next(&mut self) -> Option<BlockGroup> {
        while self.next_index < self.code.len() {
            let i = self.next_index;
            let instr = self.code.instruction(i);
            if instr.is_block_start() && !instr.is_block_end() {
                let group = collect_block_group_instructions(self.code, i);
                self.next_index = group.tail() + 1;
                return Some(group);
            }
            self.next_index += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Code;
    use crate::instruction::Instruction;
    use crate::operation::Operation;
    use crate::variable::Variable;

    fn push(code: &mut Code, op: Operation, inputs: Vec<Variable>, outputs: Vec<Variable>) {
        let index = code.len();
        let instr = Instruction::new(index, op, inputs, outputs, vec![]).unwrap();
        code.append(instr);
    }

    fn push_inner(code: &mut Code, op: Operation, inner_outputs: Vec<Variable>) {
        let index = code.len();
        let instr = Instruction::new(index, op, vec![], vec![], inner_outputs).unwrap();
        code.append(instr);
    }

    fn if_else_end_code() -> Code {
        let mut code = Code::new();
        push(&mut code, Operation::LoadBoolean(true), vec![], vec![Variable::new(0)]);
        push(&mut code, Operation::BeginIf, vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginElse, vec![], vec![]);
        push(&mut code, Operation::EndIf, vec![], vec![]);
        code
    }

    fn try_catch_finally_code() -> Code {
        let mut code = Code::new();
        push(&mut code, Operation::BeginTry, vec![], vec![]);
        push_inner(&mut code, Operation::BeginCatch, vec![Variable::new(0)]);
        push(&mut code, Operation::BeginFinally, vec![], vec![]);
        push(&mut code, Operation::EndTryCatch, vec![], vec![]);
        code
    }

    fn switch_with_cases_code() -> Code {
        let mut code = Code::new();
        push(&mut code, Operation::LoadInteger(0), vec![], vec![Variable::new(0)]);
        push(&mut code, Operation::BeginSwitch, vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginSwitchCase, vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginSwitchDefaultCase, vec![], vec![]);
        push(&mut code, Operation::EndSwitch, vec![], vec![]);
        code
    }

    /// The body between `BeginIf` and `BeginElse` is its own `Block`
    /// (head=1, tail=2), distinct from the `Block` between `BeginElse` and
    /// `EndIf` (head=2, tail=3) — a combined start-and-end boundary must
    /// stop a `block_end`/`block_begin` scan, not be skipped past.
    #[test]
    fn block_end_and_block_begin_are_symmetric() {
        let code = if_else_end_code();
        let end = block_end(&code, 1);
        assert_eq!(end, 2);
        assert_eq!(block_begin(&code, end), 1);
    }

    #[test]
    fn find_all_block_groups_collects_if_else() {
        let code = if_else_end_code();
        let groups = find_all_block_groups(&code);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].boundaries, vec![1, 2, 3]);
        assert_eq!(groups[0].num_blocks(), 2);
    }

    #[test]
    fn block_group_iter_matches_find_all() {
        let code = if_else_end_code();
        let via_iter: Vec<_> = BlockGroupIter::new(&code).collect();
        assert_eq!(via_iter, find_all_block_groups(&code));
    }

    #[test]
    fn nested_groups_emit_inner_before_enclosing() {
        let mut code = Code::new();
        push(&mut code, Operation::LoadBoolean(true), vec![], vec![Variable::new(0)]);
        push(&mut code, Operation::BeginIf, vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::BeginWhile, vec![Variable::new(0)], vec![]);
        push(&mut code, Operation::EndWhile, vec![], vec![]);
        push(&mut code, Operation::EndIf, vec![], vec![]);

        let groups = find_all_block_groups(&code);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].boundaries, vec![2, 3]);
        assert_eq!(groups[1].boundaries, vec![1, 4]);
    }

    /// `collect_block_group_instructions` (reached via `block_group_started_by`,
    /// `block_group_around`, and `BlockGroupIter`) must agree with the
    /// independently-implemented `find_all_block_groups` on every boundary,
    /// including the intermediate start-and-end ones, for if/else,
    /// try/catch/finally, and switch-with-cases alike.
    fn assert_group_navigation_agrees(code: &Code) {
        let expected = find_all_block_groups(code);
        for group in &expected {
            assert_eq!(
                collect_block_group_instructions(code, group.head()).boundaries,
                group.boundaries
            );
            assert_eq!(
                block_group_head(code, group.tail()),
                group.head()
            );
            for &boundary in &group.boundaries {
                assert_eq!(
                    block_group_head(code, boundary),
                    group.head(),
                    "boundary {boundary} should resolve back to group head {}",
                    group.head()
                );
            }
        }

        let via_iter: Vec<_> = BlockGroupIter::new(code).collect();
        assert_eq!(via_iter, expected);
    }

    #[test]
    fn if_else_group_navigation_agrees_with_find_all() {
        assert_group_navigation_agrees(&if_else_end_code());
    }

    #[test]
    fn try_catch_finally_group_navigation_agrees_with_find_all() {
        let code = try_catch_finally_code();
        let groups = find_all_block_groups(&code);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].boundaries, vec![0, 1, 2, 3]);
        assert_eq!(groups[0].num_blocks(), 3);

        assert_group_navigation_agrees(&code);
    }

    #[test]
    fn switch_with_cases_group_navigation_agrees_with_find_all() {
        let code = switch_with_cases_code();
        let groups = find_all_block_groups(&code);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].boundaries, vec![1, 2, 3, 4]);
        assert_eq!(groups[0].num_blocks(), 3);

        assert_group_navigation_agrees(&code);
    }
}
