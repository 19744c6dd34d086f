//! Bound argument lists.

use std::any::{type_name, Any};
use std::str::FromStr;

use crate::container::Instance;
use crate::controller::ActionError;
use crate::routing::ParamValue;

/// One bound argument.
#[derive(Debug)]
pub enum Argument {
    /// A raw routed or queried value, exactly as routing produced it.
    Value(ParamValue),
    /// An instance produced by a model binder.
    Instance(Instance),
    Absent,
}

/// Arguments for one action call, in declaration order.
#[derive(Debug, Default)]
pub struct Arguments {
    entries: Vec<(String, Argument)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, argument: Argument) {
        self.entries.push((name.into(), argument));
    }

    pub fn with(mut self, name: impl Into<String>, argument: Argument) -> Self {
        self.push(name, argument);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Argument> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, argument)| argument)
    }

    pub fn is_absent(&self, name: &str) -> bool {
        matches!(self.get(name), None | Some(Argument::Absent))
    }

    pub fn value(&self, name: &str) -> Result<&ParamValue, ActionError> {
        match self.get(name) {
            Some(Argument::Value(value)) => Ok(value),
            Some(Argument::Instance(_)) => Err(ActionError::ArgumentType {
                name: name.to_string(),
                expected: "routed value",
            }),
            None | Some(Argument::Absent) => Err(ActionError::MissingArgument(name.to_string())),
        }
    }

    pub fn str(&self, name: &str) -> Result<&str, ActionError> {
        self.value(name)?.as_str().ok_or_else(|| ActionError::ArgumentType {
            name: name.to_string(),
            expected: "string",
        })
    }

    pub fn list(&self, name: &str) -> Result<&[String], ActionError> {
        self.value(name)?.as_list().ok_or_else(|| ActionError::ArgumentType {
            name: name.to_string(),
            expected: "list",
        })
    }

    /// Parse a scalar argument. Binding itself never coerces; actions that
    /// want a number ask for one here.
    pub fn parse<T: FromStr>(&self, name: &str) -> Result<T, ActionError> {
        self.str(name)?.parse().map_err(|_| ActionError::ArgumentType {
            name: name.to_string(),
            expected: type_name::<T>(),
        })
    }

    /// Move a bound instance out of the list.
    pub fn take<T: Any>(&mut self, name: &str) -> Result<T, ActionError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, argument)| argument)
            .ok_or_else(|| ActionError::MissingArgument(name.to_string()))?;

        match std::mem::replace(slot, Argument::Absent) {
            Argument::Instance(instance) => match instance.downcast::<T>() {
                Ok(value) => Ok(*value),
                Err(instance) => {
                    *slot = Argument::Instance(instance);
                    Err(ActionError::ArgumentType {
                        name: name.to_string(),
                        expected: type_name::<T>(),
                    })
                }
            },
            Argument::Absent => Err(ActionError::MissingArgument(name.to_string())),
            other => {
                *slot = other;
                Err(ActionError::ArgumentType {
                    name: name.to_string(),
                    expected: type_name::<T>(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Arguments {
        Arguments::new()
            .with("id", Argument::Value("42".into()))
            .with("tags", Argument::Value(ParamValue::List(vec!["a".into()])))
            .with("count", Argument::Instance(Box::new(7_u32)))
            .with("extra", Argument::Absent)
    }

    #[test]
    fn test_value_accessors() {
        let args = args();
        assert_eq!(args.len(), 4);
        assert_eq!(args.str("id").unwrap(), "42");
        assert_eq!(args.parse::<u64>("id").unwrap(), 42);
        assert_eq!(args.list("tags").unwrap(), ["a".to_string()]);
        assert!(matches!(args.str("tags"), Err(ActionError::ArgumentType { .. })));
        assert!(matches!(args.str("extra"), Err(ActionError::MissingArgument(_))));
        assert!(args.is_absent("extra"));
        assert!(args.is_absent("nope"));
    }

    #[test]
    fn test_take_instance() {
        let mut args = args();
        assert!(matches!(args.take::<String>("count"), Err(ActionError::ArgumentType { .. })));
        assert_eq!(args.take::<u32>("count").unwrap(), 7);
        assert!(matches!(args.take::<u32>("count"), Err(ActionError::MissingArgument(_))));
        assert!(matches!(args.take::<u32>("id"), Err(ActionError::ArgumentType { .. })));
        assert_eq!(args.str("id").unwrap(), "42");
    }
}
