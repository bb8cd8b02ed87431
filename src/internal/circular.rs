//! Per-session construction state and the resolution stack.

use std::cell::RefCell;

use crate::key::StackFrame;
use crate::registration::AnyArc;

/// Construction state of one provider inside one session. A provider with no
/// entry has not been visited yet.
#[derive(Clone)]
pub(crate) enum SlotState {
    /// Constructor arguments are being resolved; the provider is on the stack
    Pending,
    /// Constructed; later requests in the session share this instance
    Resolved(AnyArc),
    /// Could not be constructed; later requests yield `None` without a new report
    Failed,
}

/// Stack of frames currently being resolved, root first.
pub(crate) struct ResolutionStack {
    frames: RefCell<Vec<StackFrame>>,
}

impl ResolutionStack {
    pub(crate) fn new(root: StackFrame) -> Self {
        Self {
            frames: RefCell::new(vec![root]),
        }
    }

    pub(crate) fn push(&self, frame: StackFrame) {
        self.frames.borrow_mut().push(frame);
    }

    /// Pops the innermost frame. The root frame stays.
    pub(crate) fn pop(&self) {
        let mut frames = self.frames.borrow_mut();
        debug_assert!(frames.len() > 1, "popping the root frame");
        if frames.len() > 1 {
            frames.pop();
        }
    }

    /// Innermost frame.
    pub(crate) fn current(&self) -> Option<StackFrame> {
        self.frames.borrow().last().cloned()
    }

    /// Frame that requested the innermost one.
    pub(crate) fn parent(&self) -> Option<StackFrame> {
        let frames = self.frames.borrow();
        frames.len().checked_sub(2).and_then(|i| frames.get(i).cloned())
    }

    pub(crate) fn snapshot(&self) -> Vec<StackFrame> {
        self.frames.borrow().clone()
    }

    pub(crate) fn depth(&self) -> usize {
        self.frames.borrow().len()
    }
}
