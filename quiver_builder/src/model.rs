use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::api::FileMode;
use crate::constant::COMMAND_NAME_DEST;
use crate::error::DefinitionError;

/// The number of values an argument consumes.
///
/// Options derive their arity from their kind (see [`OptKind`](crate::OptKind)).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Nargs {
    /// Precisely one value.
    #[default]
    One,
    /// Every remaining positional value.
    Variadic,
}

impl TryFrom<i64> for Nargs {
    type Error = DefinitionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Nargs::One),
            -1 => Ok(Nargs::Variadic),
            _ => Err(DefinitionError::InvalidNargs(value)),
        }
    }
}

impl std::fmt::Display for Nargs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Nargs::One => write!(f, "1"),
            Nargs::Variadic => write!(f, "-1"),
        }
    }
}

/// An open file produced by [`Type::file`](crate::Type::file).
///
/// The handle is shared so that the parsed [`Values`] may be cloned.
#[derive(Debug, Clone)]
pub struct FileValue {
    path: PathBuf,
    mode: FileMode,
    handle: Arc<File>,
}

impl FileValue {
    pub(crate) fn new(path: PathBuf, mode: FileMode, handle: File) -> Self {
        Self {
            path,
            mode,
            handle: Arc::new(handle),
        }
    }

    /// The path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The mode the file was opened with.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// The open file handle.
    pub fn handle(&self) -> &File {
        &self.handle
    }
}

impl PartialEq for FileValue {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.mode == other.mode
    }
}

/// A typed value, as produced by a [`Type`](crate::Type) conversion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value (ex: an omitted option without a default).
    #[default]
    None,
    /// A string.
    Str(String),
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// The name of an enumeration member.
    Member(String),
    /// A date and time (without timezone).
    DateTime(NaiveDateTime),
    /// A filesystem path.
    Path(PathBuf),
    /// An open file.
    File(FileValue),
    /// The values of a variadic argument, append option, or list default.
    List(Vec<Value>),
}

impl Value {
    /// Whether this is [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// The string of a [`Value::Str`] or [`Value::Member`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) | Value::Member(value) => Some(value),
            _ => None,
        }
    }

    /// The boolean of a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The integer of a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The number of a [`Value::Float`], widening a [`Value::Int`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            Value::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    /// The date and time of a [`Value::DateTime`].
    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match self {
            Value::DateTime(value) => Some(value),
            _ => None,
        }
    }

    /// The path of a [`Value::Path`] or [`Value::File`].
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(value) => Some(value),
            Value::File(file) => Some(file.path()),
            _ => None,
        }
    }

    /// The file of a [`Value::File`].
    pub fn as_file(&self) -> Option<&FileValue> {
        match self {
            Value::File(value) => Some(value),
            _ => None,
        }
    }

    /// The items of a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(values) => Some(values),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Value::Path(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// The parsed values of one command, keyed by destination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Values {
    inner: HashMap<String, Value>,
}

impl Values {
    pub(crate) fn insert(&mut self, dest: &str, value: Value) {
        // The empty destination never stores.
        if !dest.is_empty() {
            self.inner.insert(dest.to_string(), value);
        }
    }

    pub(crate) fn get_mut(&mut self, dest: &str) -> Option<&mut Value> {
        self.inner.get_mut(dest)
    }

    /// The value stored under `dest`.
    pub fn get(&self, dest: &str) -> Option<&Value> {
        self.inner.get(dest)
    }

    /// Whether anything is stored under `dest`.
    pub fn contains(&self, dest: &str) -> bool {
        self.inner.contains_key(dest)
    }

    /// See [`Value::as_str`].
    pub fn get_str(&self, dest: &str) -> Option<&str> {
        self.get(dest).and_then(Value::as_str)
    }

    /// See [`Value::as_bool`].
    pub fn get_bool(&self, dest: &str) -> Option<bool> {
        self.get(dest).and_then(Value::as_bool)
    }

    /// See [`Value::as_int`].
    pub fn get_int(&self, dest: &str) -> Option<i64> {
        self.get(dest).and_then(Value::as_int)
    }

    /// See [`Value::as_float`].
    pub fn get_float(&self, dest: &str) -> Option<f64> {
        self.get(dest).and_then(Value::as_float)
    }

    /// See [`Value::as_path`].
    pub fn get_path(&self, dest: &str) -> Option<&Path> {
        self.get(dest).and_then(Value::as_path)
    }

    /// See [`Value::as_file`].
    pub fn get_file(&self, dest: &str) -> Option<&FileValue> {
        self.get(dest).and_then(Value::as_file)
    }

    /// See [`Value::as_list`].
    pub fn get_list(&self, dest: &str) -> Option<&[Value]> {
        self.get(dest).and_then(Value::as_list)
    }

    /// The sub-command name captured by a super-command, if any.
    pub fn command_name(&self) -> Option<&str> {
        self.get_str(COMMAND_NAME_DEST)
    }

    /// The number of stored destinations.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate the `(destination, value)` pairs, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.inner.iter().map(|(dest, value)| (dest.as_str(), value))
    }

    /// Unwrap into the underlying map.
    pub fn into_inner(self) -> HashMap<String, Value> {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, Some(Nargs::One))]
    #[case(-1, Some(Nargs::Variadic))]
    #[case(0, None)]
    #[case(2, None)]
    #[case(-2, None)]
    fn nargs_try_from(#[case] raw: i64, #[case] expected: Option<Nargs>) {
        match expected {
            Some(nargs) => {
                assert_eq!(Nargs::try_from(raw).unwrap(), nargs);
                assert_eq!(nargs.to_string(), raw.to_string());
            }
            None => {
                assert_eq!(
                    Nargs::try_from(raw).unwrap_err(),
                    DefinitionError::InvalidNargs(raw)
                );
            }
        }
    }

    #[test]
    fn value_from() {
        assert_eq!(Value::from("a"), Value::Str("a".to_string()));
        assert_eq!(Value::from(vec![1i64, 2]), Value::List(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(Value::from(None::<bool>), Value::None);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }

    #[test]
    fn values_empty_dest() {
        // Setup
        let mut values = Values::default();

        // Execute
        values.insert("", Value::Bool(true));
        values.insert("abc", Value::Int(1));

        // Verify
        assert_eq!(values.len(), 1);
        assert!(!values.contains(""));
        assert_eq!(values.get_int("abc"), Some(1));
        assert_eq!(values.get_float("abc"), Some(1.0));
        assert_eq!(values.get_str("abc"), None);
    }

    #[test]
    fn values_command_name() {
        let mut values = Values::default();
        assert_eq!(values.command_name(), None);

        values.insert(COMMAND_NAME_DEST, Value::from("run"));
        assert_eq!(values.command_name(), Some("run"));
    }
}
