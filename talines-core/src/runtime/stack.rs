//! Per-thread nesting stack of constructions in progress.
//!
//! A construction pushes a frame for as long as its bodies run; nested
//! constructions made from inside a body see a non-empty stack. Frames are
//! popped by `StackGuard` on every exit path, errors and panics included.

use std::cell::RefCell;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
struct Frame {
    name: String,
    compat: bool,
}

thread_local! {
    static STACK: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

/// Pops its frame on drop. Not `Send`: it must die on the thread that
/// pushed it.
#[derive(Debug)]
pub struct StackGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        STACK.with(|s| {
            s.borrow_mut().pop();
        });
    }
}

pub(crate) fn enter(name: &str, compat: bool) -> StackGuard {
    STACK.with(|s| {
        s.borrow_mut().push(Frame {
            name: name.to_string(),
            compat,
        })
    });
    StackGuard {
        _not_send: PhantomData,
    }
}

/// Number of constructions in progress on this thread.
pub fn depth() -> usize {
    STACK.with(|s| s.borrow().len())
}

pub fn is_top_level() -> bool {
    depth() == 0
}

/// Names of the constructions in progress, outermost first.
pub fn path() -> Vec<String> {
    STACK.with(|s| s.borrow().iter().map(|f| f.name.clone()).collect())
}

/// Compatibility mode of the innermost construction in progress.
pub(crate) fn enclosing_compat() -> Option<bool> {
    STACK.with(|s| s.borrow().last().map(|f| f.compat))
}
