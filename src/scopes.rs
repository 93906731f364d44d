//! Lexical scope frames for `let`-bound identifiers.

use crate::types::{Map, Value};

/// A stack of scope frames. Frames are pushed by the `let` built-in around
/// evaluation of its expression reference and popped afterwards; field
/// lookup consults frames innermost-first when the current object does not
/// carry the requested key.
#[derive(Debug, Default)]
pub struct Scopes {
    stack: Vec<Map>,
}

impl Scopes {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push_scope(&mut self, frame: Map) {
        self.stack.push(frame);
    }

    pub fn pop_scope(&mut self) -> Option<Map> {
        self.stack.pop()
    }

    pub fn get_value(&self, identifier: &str) -> Option<&Value> {
        self.stack
            .iter()
            .rev()
            .find_map(|frame| frame.get(identifier))
    }
}
