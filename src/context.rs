//! Execution context tracking (C6). Contexts are bit-sets: an operation's
//! `requiredContext` must be a subset of the currently active context, and
//! blocks compose new contexts either by unioning with whatever context is
//! already active, or by replacing it outright.

use bitflags::bitflags;

use crate::variable::Stack;

bitflags! {
    /// Which language constructs are legal at the current point in the
    /// instruction stream. Composed by union; membership is a bit-and.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct Context: u32 {
        /// Top-level script context. Always present at depth 0.
        const SCRIPT            = 1 << 0;
        const FUNCTION          = 1 << 1;
        const GENERATOR_FUNCTION = 1 << 2;
        const ASYNC_FUNCTION    = 1 << 3;
        const CLASS_BODY        = 1 << 4;
        const CLASS_METHOD      = 1 << 5;
        const SWITCH_BLOCK      = 1 << 6;
        const LOOP              = 1 << 7;
        const WITH_STATEMENT    = 1 << 8;
        const TRY_BLOCK         = 1 << 9;
    }
}

/// Scans the instruction stream and reports the currently-active execution
/// context, maintained as a stack of bit-sets (one frame per open block).
#[derive(Debug, Clone)]
pub struct ContextAnalyzer {
    stack: Stack<Context>,
}

impl Default for ContextAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextAnalyzer {
    pub fn new() -> Self {
        let mut stack = Stack::new();
        stack.push(Context::SCRIPT);
        Self { stack }
    }

    /// The context visible to the instruction about to be checked.
    pub fn context(&self) -> Context {
        *self.stack.top().expect("root context frame always present")
    }

    /// Applies a block-end: pops the innermost context frame, revealing
    /// whatever was active immediately outside the block that just closed.
    pub fn pop(&mut self) -> Context {
        let popped = self
            .stack
            .pop()
            .expect("pop() called with no open context frame");
        popped
    }

    /// Applies a block-start. Call this *after* [`Self::pop`] when the same
    /// instruction is both a block-end and a block-start (e.g. `else`,
    /// `catch`, a switch case): the frame revealed by that pop is then the
    /// "surrounding" context this new block composes against.
    ///
    /// `unions_with_surrounding` covers both
    /// `propagatesSurroundingContext` and `resumesSurroundingContext`: in
    /// both cases the new frame is `surrounding | opened`. The two remain
    /// distinct flags on [`crate::operation::Operation`] because they
    /// document different intents (continuing the same construct vs.
    /// restoring the context from before a sibling construct), but they
    /// compute the same thing here — there's exactly one "currently
    /// revealed" frame to compose against, not a deeper ancestor to walk to.
    pub fn push_for_block_start(&mut self, opened: Context, unions_with_surrounding: bool) -> Context {
        let new_context = if unions_with_surrounding {
            self.context() | opened
        } else {
            opened
        };
        self.stack.push(new_context);
        new_context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_context_is_script() {
        let analyzer = ContextAnalyzer::new();
        assert_eq!(analyzer.context(), Context::SCRIPT);
    }

    #[test]
    fn propagating_block_unions_with_surrounding() {
        let mut analyzer = ContextAnalyzer::new();
        let pushed = analyzer.push_for_block_start(Context::LOOP, true);
        assert_eq!(pushed, Context::SCRIPT | Context::LOOP);
        assert_eq!(analyzer.context(), Context::SCRIPT | Context::LOOP);
    }

    #[test]
    fn non_propagating_block_replaces_context() {
        let mut analyzer = ContextAnalyzer::new();
        analyzer.push_for_block_start(Context::LOOP, true);
        let pushed = analyzer.push_for_block_start(Context::FUNCTION, false);
        assert_eq!(pushed, Context::FUNCTION);
    }

    #[test]
    fn combined_start_and_end_pops_then_composes_against_revealed_frame() {
        let mut analyzer = ContextAnalyzer::new();
        // SCRIPT -> FUNCTION (propagates) -> BeginIf opens nothing new, but
        // still must see FUNCTION once it reveals the frame below itself.
        analyzer.push_for_block_start(Context::FUNCTION, true);
        analyzer.push_for_block_start(Context::empty(), true); // BeginIf
        assert_eq!(analyzer.context(), Context::SCRIPT | Context::FUNCTION);

        // BeginElse: pop the BeginIf frame, then compose against what's
        // revealed (the FUNCTION frame), same as a plain propagate would.
        analyzer.pop();
        let pushed = analyzer.push_for_block_start(Context::empty(), true);
        assert_eq!(pushed, Context::SCRIPT | Context::FUNCTION);
    }

    #[test]
    fn pop_restores_previous_frame() {
        let mut analyzer = ContextAnalyzer::new();
        analyzer.push_for_block_start(Context::LOOP, true);
        analyzer.pop();
        assert_eq!(analyzer.context(), Context::SCRIPT);
    }
}
