// SPDX-License-Identifier: MIT OR Apache-2.0
//! Typed name/value store local to a timeline.

use crate::error::{Result, TimelineError};
use indexmap::IndexMap;
use std::any::Any;
use std::fmt;

/// Timeline-local variables, readable from callbacks
#[derive(Default)]
pub struct Vars {
    values: IndexMap<String, Box<dyn Any>>,
}

impl Vars {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value
    pub fn set<T: Any>(&mut self, name: impl Into<String>, value: T) {
        self.values.insert(name.into(), Box::new(value));
    }

    /// Get a variable by name and type
    pub fn get<T: Any>(&self, name: &str) -> Result<&T> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| TimelineError::VarNotDefined(name.to_string()))?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| TimelineError::VarTypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Check if a variable is defined
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Variable names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no variables are defined
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Vars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_set_and_get() {
        let mut vars = Vars::new();
        vars.set("speed", 2.5_f32);
        vars.set("label", String::from("intro"));
        assert_eq!(*vars.get::<f32>("speed").unwrap(), 2.5);
        assert_eq!(vars.get::<String>("label").unwrap(), "intro");
        assert_eq!(vars.names().collect::<Vec<_>>(), vec!["speed", "label"]);
        assert!(vars.contains("speed"));
        assert!(!vars.contains("missing"));
    }

    #[test]
    fn test_undefined_and_mismatch() {
        let mut vars = Vars::new();
        vars.set("speed", 2.5_f32);

        let err = vars.get::<f32>("missing").unwrap_err();
        assert!(matches!(err, TimelineError::VarNotDefined(ref name) if name == "missing"));

        let err = vars.get::<i32>("speed").unwrap_err();
        assert!(matches!(err, TimelineError::VarTypeMismatch { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_overwrite_keeps_order() {
        let mut vars = Vars::new();
        vars.set("a", 1_u32);
        vars.set("b", 2_u32);
        vars.set("a", 3_u32);
        assert_eq!(vars.len(), 2);
        assert_eq!(*vars.get::<u32>("a").unwrap(), 3);
        assert_eq!(vars.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
