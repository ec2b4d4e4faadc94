use crate::error::{Error, Result};

use std::fmt;

use serde_yaml::Value;

/// An invocation argument as it arrives from an untyped source.
///
/// Chaincode only takes strings; everything else is rejected by
/// [`validate`] before a proposal is built.
#[derive(Clone, Debug, PartialEq)]
pub enum Argument {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Null,
    /// Structured value, kept in its source rendering.
    Other(String),
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::String(s) => write!(f, "{:?}", s),
            Argument::Integer(i) => write!(f, "{}", i),
            Argument::Float(x) => write!(f, "{}", x),
            Argument::Bool(b) => write!(f, "{}", b),
            Argument::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            Argument::Null => f.write_str("null"),
            Argument::Other(rendered) => f.write_str(rendered),
        }
    }
}

impl From<&str> for Argument {
    fn from(s: &str) -> Self {
        Argument::String(s.to_string())
    }
}

impl From<String> for Argument {
    fn from(s: String) -> Self {
        Argument::String(s)
    }
}

impl From<&String> for Argument {
    fn from(s: &String) -> Self {
        Argument::String(s.clone())
    }
}

impl From<i64> for Argument {
    fn from(i: i64) -> Self {
        Argument::Integer(i)
    }
}

impl From<f64> for Argument {
    fn from(x: f64) -> Self {
        Argument::Float(x)
    }
}

impl From<bool> for Argument {
    fn from(b: bool) -> Self {
        Argument::Bool(b)
    }
}

impl From<Vec<u8>> for Argument {
    fn from(bytes: Vec<u8>) -> Self {
        Argument::Bytes(bytes)
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        value.map_or(Argument::Null, Into::into)
    }
}

impl From<Value> for Argument {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Argument::Null,
            Value::Bool(b) => Argument::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Argument::Integer(i),
                None => n.as_f64().map_or(Argument::Other(n.to_string()), Argument::Float),
            },
            Value::String(s) => Argument::String(s),
            Value::Tagged(tagged) => Argument::from(tagged.value),
            structured => Argument::Other(
                serde_yaml::to_string(&structured)
                    .map(|s| s.trim_end().to_string())
                    .unwrap_or_else(|_| "<unrenderable>".to_string()),
            ),
        }
    }
}

/// Checks that every argument is a string.
///
/// On failure the error lists every offending argument, not just the
/// first, in argument order.
pub fn validate(args: &[Argument]) -> Result<Vec<String>> {
    let offending: Vec<String> = args
        .iter()
        .filter(|arg| !matches!(arg, Argument::String(_)))
        .map(ToString::to_string)
        .collect();
    if !offending.is_empty() {
        return Err(Error::InvalidArgument(offending.join(", ")));
    }
    Ok(args
        .iter()
        .filter_map(|arg| match arg {
            Argument::String(s) => Some(s.clone()),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod args_test {
    use super::*;

    #[test]
    fn strings_pass_in_order() {
        let args: Vec<Argument> = vec!["a".into(), "b".into(), String::from("c").into()];
        assert_eq!(validate(&args).unwrap(), vec!["a", "b", "c"]);
        assert!(validate(&[]).unwrap().is_empty());
    }

    #[test]
    fn every_offender_is_listed() {
        let args = vec![
            Argument::from("arg1"),
            Argument::from(3.142),
            Argument::Null,
            Argument::from(true),
            Argument::from(42i64),
        ];
        let e = validate(&args).unwrap_err();
        assert!(matches!(e, Error::InvalidArgument(_)));
        assert_eq!(
            e.to_string(),
            "Transaction parameters must be strings: 3.142, null, true, 42"
        );
    }

    #[test]
    fn literal_forms() {
        assert_eq!(Argument::from("arg1").to_string(), "\"arg1\"");
        assert_eq!(Argument::from(vec![1u8, 2, 3]).to_string(), "<3 bytes>");
        assert_eq!(Argument::from(None::<&str>).to_string(), "null");
    }

    #[test]
    fn yaml_values_map_to_arguments() {
        let values: Vec<Value> =
            serde_yaml::from_str("[hello, 3, 2.5, null, false, [1, 2]]").unwrap();
        let args: Vec<Argument> = values.into_iter().map(Argument::from).collect();
        assert_eq!(args[0], Argument::String("hello".to_string()));
        assert_eq!(args[1], Argument::Integer(3));
        assert_eq!(args[2], Argument::Float(2.5));
        assert_eq!(args[3], Argument::Null);
        assert_eq!(args[4], Argument::Bool(false));
        assert!(matches!(args[5], Argument::Other(_)));
    }
}
