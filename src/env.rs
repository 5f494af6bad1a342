//! The variable environment.
//!
//! One flat `name -> value` map per compilation. There is no lexical scoping:
//! `@var` writes are visible to every later expression until overwritten or
//! the document ends. Repeat frames record their own write-sets separately
//! (see [`crate::frames`]); the environment itself is always global reads,
//! last write wins.

use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct VarEnv {
    bindings: HashMap<String, String>,
}

impl VarEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: String) {
        self.bindings.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
