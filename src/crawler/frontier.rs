//! Crawl worklist
//!
//! The frontier is a stack: the target pushed last is processed next. Pushing
//! a page's children with `extend_in_order` puts the first child on top, so
//! popping visits children in document order and finishes each child's own
//! subtree before its next sibling, i.e. a depth-first walk without
//! recursion.

use crate::state::CrawlTarget;

#[derive(Debug, Default)]
pub struct Frontier {
    stack: Vec<CrawlTarget>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: CrawlTarget) {
        self.stack.push(target);
    }

    /// Pushes `targets` so that the first one is popped first
    pub fn extend_in_order(&mut self, targets: Vec<CrawlTarget>) {
        self.stack.extend(targets.into_iter().rev());
    }

    pub fn pop(&mut self) -> Option<CrawlTarget> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
