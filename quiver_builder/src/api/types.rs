use std::cmp::Ordering;
use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::format::{Fixed, Item, StrftimeItems};
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{ConversionError, DefinitionError};
use crate::model::{FileValue, Value};

const TRUE_WORDS: [&str; 6] = ["t", "true", "y", "yes", "on", "1"];
const FALSE_WORDS: [&str; 6] = ["f", "false", "n", "no", "off", "0"];
const DEFAULT_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// How a [`Type::file`] opens its path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Open an existing file for reading.
    #[default]
    Read,
    /// Create (or truncate) a file for writing.
    Write,
    /// Create (or extend) a file for appending.
    Append,
}

/// The checks applied by the path types.
///
/// Apart from `exists`, checks only apply to paths that exist.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathPolicy {
    exists: bool,
    readable: bool,
    writable: bool,
    executable: bool,
}

impl PathPolicy {
    /// Require the path to exist.
    pub fn exists(mut self) -> Self {
        self.exists = true;
        self
    }

    /// Require the path to be readable.
    pub fn readable(mut self) -> Self {
        self.readable = true;
        self
    }

    /// Require the path to be writable.
    pub fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    /// Require the path to be executable.
    pub fn executable(mut self) -> Self {
        self.executable = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Any,
    Directory,
    File,
}

#[derive(Debug, Clone, PartialEq)]
enum TypeKind {
    Str,
    Bool,
    Int {
        base: u32,
    },
    Float,
    IntRange {
        min: Option<i64>,
        max: Option<i64>,
        clamp: bool,
    },
    FloatRange {
        min: Option<f64>,
        max: Option<f64>,
        clamp: bool,
    },
    Choice {
        choices: Vec<String>,
        case_sensitive: bool,
    },
    IntChoice {
        choices: Vec<i64>,
    },
    Enum {
        members: Vec<String>,
        case_sensitive: bool,
    },
    IntEnum {
        members: Vec<(String, i64)>,
    },
    DateTime {
        formats: Vec<String>,
    },
    File {
        mode: FileMode,
    },
    Path {
        entry: EntryKind,
        policy: PathPolicy,
    },
}

/// The value converter of an argument or option.
///
/// A closed set of conversions, each constructed (and validated) through its own constructor.
/// Every conversion is pure, except for the file and path types which consult the filesystem.
///
/// ### Example
/// ```
/// # use quiver_builder as quiver;
/// use quiver::{Type, Value};
///
/// let hex = Type::int(16).unwrap();
/// assert_eq!(hex.convert_str("ff").unwrap(), Value::Int(255));
/// assert!(hex.convert_str("zz").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    kind: TypeKind,
}

impl Default for Type {
    fn default() -> Self {
        Type::string()
    }
}

impl Type {
    fn of(kind: TypeKind) -> Self {
        Self { kind }
    }

    /// Strings, as-is.
    pub fn string() -> Self {
        Type::of(TypeKind::Str)
    }

    /// Booleans: `t/true/y/yes/on/1` and `f/false/n/no/off/0`, in any case.
    pub fn bool() -> Self {
        Type::of(TypeKind::Bool)
    }

    /// Integers in `base` (`2..=36`), or `0` to infer the base from a `0x`/`0o`/`0b` prefix.
    pub fn int(base: u32) -> Result<Self, DefinitionError> {
        if base == 0 || (2..=36).contains(&base) {
            Ok(Type::of(TypeKind::Int { base }))
        } else {
            Err(DefinitionError::InvalidType(format!(
                "Require 2 <= base <= 36 or base == 0, got {base}."
            )))
        }
    }

    /// Floating point numbers.
    pub fn float() -> Self {
        Type::of(TypeKind::Float)
    }

    /// Base 10 integers within the (inclusive) bounds.
    /// With `clamp`, out of range values are moved to the nearest bound rather than rejected.
    pub fn int_range(
        min: Option<i64>,
        max: Option<i64>,
        clamp: bool,
    ) -> Result<Self, DefinitionError> {
        if let (Some(low), Some(high)) = (min, max) {
            if low > high {
                return Err(DefinitionError::InvalidType(format!(
                    "Require min <= max, got {low} > {high}."
                )));
            }
        }

        Ok(Type::of(TypeKind::IntRange { min, max, clamp }))
    }

    /// Floating point numbers within the (inclusive) bounds.
    /// With `clamp`, out of range values are moved to the nearest bound rather than rejected.
    pub fn float_range(
        min: Option<f64>,
        max: Option<f64>,
        clamp: bool,
    ) -> Result<Self, DefinitionError> {
        if let (Some(low), Some(high)) = (min, max) {
            if low > high {
                return Err(DefinitionError::InvalidType(format!(
                    "Require min <= max, got {low} > {high}."
                )));
            }
        }

        Ok(Type::of(TypeKind::FloatRange { min, max, clamp }))
    }

    /// One of a fixed set of strings.
    pub fn choice<S: Into<String>>(
        choices: impl IntoIterator<Item = S>,
        case_sensitive: bool,
    ) -> Result<Self, DefinitionError> {
        let choices: Vec<String> = choices.into_iter().map(Into::into).collect();

        if choices.is_empty() {
            return Err(DefinitionError::InvalidType(
                "Require at least one choice.".to_string(),
            ));
        }

        Ok(Type::of(TypeKind::Choice {
            choices,
            case_sensitive,
        }))
    }

    /// One of a fixed set of integers.
    pub fn int_choice(choices: impl IntoIterator<Item = i64>) -> Result<Self, DefinitionError> {
        let choices: Vec<i64> = choices.into_iter().collect();

        if choices.is_empty() {
            return Err(DefinitionError::InvalidType(
                "Require at least one choice.".to_string(),
            ));
        }

        Ok(Type::of(TypeKind::IntChoice { choices }))
    }

    /// A member of an enumeration, selected by name.
    /// Converts into [`Value::Member`].
    pub fn enumeration<S: Into<String>>(
        members: impl IntoIterator<Item = S>,
        case_sensitive: bool,
    ) -> Result<Self, DefinitionError> {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();

        if members.is_empty() {
            return Err(DefinitionError::InvalidType(
                "Require at least one member.".to_string(),
            ));
        }

        Ok(Type::of(TypeKind::Enum {
            members,
            case_sensitive,
        }))
    }

    /// A member of an integer enumeration, selected by its integer value.
    /// Converts into [`Value::Member`].
    pub fn int_enumeration<S: Into<String>>(
        members: impl IntoIterator<Item = (S, i64)>,
    ) -> Result<Self, DefinitionError> {
        let members: Vec<(String, i64)> = members
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();

        if members.is_empty() {
            return Err(DefinitionError::InvalidType(
                "Require at least one member.".to_string(),
            ));
        }

        Ok(Type::of(TypeKind::IntEnum { members }))
    }

    /// Dates and times, trying each `strftime` format in order.
    /// Date-only formats produce midnight of that date.
    pub fn datetime<S: Into<String>>(
        formats: impl IntoIterator<Item = S>,
    ) -> Result<Self, DefinitionError> {
        let formats: Vec<String> = formats.into_iter().map(Into::into).collect();

        if formats.is_empty() {
            return Err(DefinitionError::InvalidType(
                "Require at least one format.".to_string(),
            ));
        }

        for format in &formats {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(DefinitionError::InvalidType(format!(
                    "'{format}' is not a valid datetime format."
                )));
            }

            // Values carry no timezone, so offset/zone specifiers cannot be rendered back.
            if StrftimeItems::new(format).any(|item| is_zoned(&item)) {
                return Err(DefinitionError::InvalidType(format!(
                    "'{format}' has timezone specifiers; datetimes are timezone-naive."
                )));
            }
        }

        Ok(Type::of(TypeKind::DateTime { formats }))
    }

    /// Dates and times in the ISO-like formats `%Y-%m-%d`, `%Y-%m-%dT%H:%M:%S` and `%Y-%m-%d %H:%M:%S`.
    pub fn iso_datetime() -> Self {
        Type::of(TypeKind::DateTime {
            formats: DEFAULT_DATETIME_FORMATS
                .iter()
                .map(|format| format.to_string())
                .collect(),
        })
    }

    /// Files, opened in `mode` upon conversion.
    ///
    /// Defaults are not opened until they are needed (when the declaration does not occur).
    pub fn file(mode: FileMode) -> Self {
        Type::of(TypeKind::File { mode })
    }

    /// Filesystem paths of any kind.
    pub fn path(policy: PathPolicy) -> Self {
        Type::of(TypeKind::Path {
            entry: EntryKind::Any,
            policy,
        })
    }

    /// Filesystem paths which, when they exist, are directories.
    pub fn dir_path(policy: PathPolicy) -> Self {
        Type::of(TypeKind::Path {
            entry: EntryKind::Directory,
            policy,
        })
    }

    /// Filesystem paths which, when they exist, are regular files.
    pub fn file_path(policy: PathPolicy) -> Self {
        Type::of(TypeKind::Path {
            entry: EntryKind::File,
            policy,
        })
    }

    /// Convert a value which is not a string.
    ///
    /// Fails with [`ConversionError::InvalidType`] when the value is not of this type's kind.
    pub fn convert(&self, value: &Value) -> Result<Value, ConversionError> {
        let invalid = || {
            ConversionError::invalid_type(format!(
                "{} is not a valid {}.",
                describe(value),
                self.kind_name()
            ))
        };

        match (&self.kind, value) {
            (TypeKind::Str, Value::Str(_))
            | (TypeKind::Bool, Value::Bool(_))
            | (TypeKind::Int { .. }, Value::Int(_))
            | (TypeKind::Float, Value::Float(_))
            | (TypeKind::DateTime { .. }, Value::DateTime(_))
            | (TypeKind::File { .. }, Value::File(_)) => Ok(value.clone()),
            (TypeKind::Float, Value::Int(number)) => Ok(Value::Float(*number as f64)),
            (TypeKind::IntRange { min, max, clamp }, Value::Int(number)) => {
                bound(*number, *min, *max, *clamp).map(Value::Int)
            }
            (TypeKind::FloatRange { min, max, clamp }, Value::Float(number)) => {
                bound(*number, *min, *max, *clamp).map(Value::Float)
            }
            (TypeKind::FloatRange { min, max, clamp }, Value::Int(number)) => {
                bound(*number as f64, *min, *max, *clamp).map(Value::Float)
            }
            (
                TypeKind::Choice {
                    choices,
                    case_sensitive,
                },
                Value::Str(text) | Value::Member(text),
            ) => select(choices, text, *case_sensitive)
                .map(|choice| Value::Str(choice.clone()))
                .ok_or_else(|| not_one_of(text, choices)),
            (TypeKind::IntChoice { choices }, Value::Int(number)) => {
                if choices.contains(number) {
                    Ok(Value::Int(*number))
                } else {
                    let rendered: Vec<String> = choices.iter().map(i64::to_string).collect();
                    Err(not_one_of(&number.to_string(), &rendered))
                }
            }
            (
                TypeKind::Enum {
                    members,
                    case_sensitive,
                },
                Value::Str(text) | Value::Member(text),
            ) => select(members, text, *case_sensitive)
                .map(|member| Value::Member(member.clone()))
                .ok_or_else(|| ConversionError::conversion(format!("'{text}' is not a valid member."))),
            (TypeKind::IntEnum { members }, Value::Int(number)) => members
                .iter()
                .find(|(_, value)| value == number)
                .map(|(name, _)| Value::Member(name.clone()))
                .ok_or_else(|| ConversionError::conversion(format!("'{number}' is not a valid member."))),
            (TypeKind::IntEnum { members }, Value::Member(name)) => members
                .iter()
                .find(|(member, _)| member == name)
                .map(|(name, _)| Value::Member(name.clone()))
                .ok_or_else(|| ConversionError::conversion(format!("'{name}' is not a valid member."))),
            (TypeKind::Path { entry, policy }, Value::Path(path)) => {
                check_path(path, *entry, policy)?;
                Ok(Value::Path(path.clone()))
            }
            _ => Err(invalid()),
        }
    }

    /// Convert a command line token.
    ///
    /// Fails with [`ConversionError::Conversion`] when the token cannot be converted.
    pub fn convert_str(&self, value: &str) -> Result<Value, ConversionError> {
        match &self.kind {
            TypeKind::Str => Ok(Value::Str(value.to_string())),
            TypeKind::Bool => {
                let lowered = value.to_lowercase();

                if TRUE_WORDS.contains(&lowered.as_str()) {
                    Ok(Value::Bool(true))
                } else if FALSE_WORDS.contains(&lowered.as_str()) {
                    Ok(Value::Bool(false))
                } else {
                    Err(ConversionError::conversion(format!(
                        "'{value}' is not a valid bool."
                    )))
                }
            }
            TypeKind::Int { base } => parse_int(value, *base)
                .map(Value::Int)
                .ok_or_else(|| invalid_int(value, *base)),
            TypeKind::Float => parse_float(value).map(Value::Float),
            TypeKind::IntRange { .. } => {
                let number = parse_int(value, 10).ok_or_else(|| invalid_int(value, 10))?;
                self.convert(&Value::Int(number))
                    .map_err(ConversionError::into_conversion)
            }
            TypeKind::FloatRange { .. } => {
                let number = parse_float(value)?;
                self.convert(&Value::Float(number))
                    .map_err(ConversionError::into_conversion)
            }
            TypeKind::Choice { .. } | TypeKind::Enum { .. } => self
                .convert(&Value::Str(value.to_string()))
                .map_err(ConversionError::into_conversion),
            TypeKind::IntChoice { .. } | TypeKind::IntEnum { .. } => {
                let number = parse_int(value, 10).ok_or_else(|| invalid_int(value, 10))?;
                self.convert(&Value::Int(number))
                    .map_err(ConversionError::into_conversion)
            }
            TypeKind::DateTime { formats } => parse_datetime(value, formats)
                .map(Value::DateTime)
                .ok_or_else(|| {
                    let rendered: Vec<String> =
                        formats.iter().map(|format| format!("'{format}'")).collect();
                    ConversionError::conversion(format!(
                        "'{value}' does not match the formats {}.",
                        rendered.join(", ")
                    ))
                }),
            TypeKind::File { mode } => open_file(Path::new(value), *mode),
            TypeKind::Path { entry, policy } => {
                let path = PathBuf::from(value);
                check_path(&path, *entry, policy)?;
                Ok(Value::Path(path))
            }
        }
    }

    /// Convert a default or constant value at definition time.
    ///
    /// Strings go through [`Type::convert_str`], everything else through [`Type::convert`].
    /// Failures are always reported as [`ConversionError::Conversion`].
    /// Files are not opened here; their path is kept until [`Type::realize`].
    pub fn safe_convert(&self, value: &Value) -> Result<Value, ConversionError> {
        match (&self.kind, value) {
            (_, Value::None) => Ok(Value::None),
            (TypeKind::File { .. }, Value::Str(path)) => Ok(Value::Path(PathBuf::from(path))),
            (TypeKind::File { .. }, Value::Path(path)) => Ok(Value::Path(path.clone())),
            (_, Value::Str(text)) => self.convert_str(text),
            (_, other) => self
                .convert(other)
                .map_err(ConversionError::into_conversion),
        }
    }

    /// Complete the conversion of a value produced by [`Type::safe_convert`].
    ///
    /// Opens deferred files; everything else is returned as-is.
    pub(crate) fn realize(&self, value: Value) -> Result<Value, ConversionError> {
        match (&self.kind, value) {
            (TypeKind::File { mode }, Value::Path(path)) => open_file(&path, *mode),
            (_, Value::List(items)) => Ok(Value::List(
                items
                    .into_iter()
                    .map(|item| self.realize(item))
                    .collect::<Result<Vec<Value>, ConversionError>>()?,
            )),
            (_, value) => Ok(value),
        }
    }

    /// Render a value the way a user would type it.
    pub fn format(&self, value: &Value) -> String {
        match (&self.kind, value) {
            (_, Value::None) => String::default(),
            (TypeKind::Int { base }, Value::Int(number)) if *base != 0 && *base != 10 => {
                to_radix(*number, *base)
            }
            (TypeKind::IntEnum { members }, Value::Member(name)) => members
                .iter()
                .find(|(member, _)| member == name)
                .map(|(_, number)| number.to_string())
                .unwrap_or_else(|| name.clone()),
            (TypeKind::DateTime { formats }, Value::DateTime(datetime)) => match formats.first() {
                Some(format) => {
                    let mut rendered = String::default();
                    match write!(rendered, "{}", datetime.format(format)) {
                        Ok(()) => rendered,
                        Err(_) => datetime.to_string(),
                    }
                }
                None => datetime.to_string(),
            },
            (_, Value::Str(text) | Value::Member(text)) => text.clone(),
            (_, Value::Bool(flag)) => flag.to_string(),
            (_, Value::Int(number)) => number.to_string(),
            (_, Value::Float(number)) => number.to_string(),
            (_, Value::DateTime(datetime)) => datetime.to_string(),
            (_, Value::Path(path)) => path.display().to_string(),
            (_, Value::File(file)) => file.path().display().to_string(),
            (_, Value::List(items)) => items
                .iter()
                .map(|item| self.format(item))
                .collect::<Vec<String>>()
                .join(" "),
        }
    }

    /// The display hint for a value of this type, if it has one.
    pub fn metavar(&self) -> Option<String> {
        match &self.kind {
            TypeKind::Str => None,
            TypeKind::Bool => Some("BOOLEAN".to_string()),
            TypeKind::Int { .. } | TypeKind::IntRange { .. } => Some("INTEGER".to_string()),
            TypeKind::Float | TypeKind::FloatRange { .. } => Some("FLOAT".to_string()),
            TypeKind::Choice { choices, .. } => Some(format!("{{{}}}", choices.join(","))),
            TypeKind::IntChoice { choices } => Some(format!(
                "{{{}}}",
                choices
                    .iter()
                    .map(i64::to_string)
                    .collect::<Vec<String>>()
                    .join(",")
            )),
            TypeKind::Enum { members, .. } => Some(format!("{{{}}}", members.join(","))),
            TypeKind::IntEnum { members } => Some(format!(
                "{{{}}}",
                members
                    .iter()
                    .map(|(_, number)| number.to_string())
                    .collect::<Vec<String>>()
                    .join(",")
            )),
            TypeKind::DateTime { formats } => Some(format!("[{}]", formats.join("|"))),
            TypeKind::File { .. } => Some("FILE".to_string()),
            TypeKind::Path { entry, .. } => Some(
                match entry {
                    EntryKind::Any => "PATH",
                    EntryKind::Directory => "DIRECTORY",
                    EntryKind::File => "FILE",
                }
                .to_string(),
            ),
        }
    }

    fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::Str => "str",
            TypeKind::Bool => "bool",
            TypeKind::Int { .. } | TypeKind::IntRange { .. } | TypeKind::IntChoice { .. } => "int",
            TypeKind::Float | TypeKind::FloatRange { .. } => "float",
            TypeKind::Choice { .. } => "choice",
            TypeKind::Enum { .. } | TypeKind::IntEnum { .. } => "member",
            TypeKind::DateTime { .. } => "datetime",
            TypeKind::File { .. } => "file",
            TypeKind::Path { .. } => "path",
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::None => "none".to_string(),
        Value::Str(text) | Value::Member(text) => format!("'{text}'"),
        Value::Bool(flag) => flag.to_string(),
        Value::Int(number) => number.to_string(),
        Value::Float(number) => number.to_string(),
        Value::DateTime(datetime) => datetime.to_string(),
        Value::Path(path) => format!("'{}'", path.display()),
        Value::File(file) => format!("'{}'", file.path().display()),
        Value::List(items) => format!(
            "[{}]",
            items
                .iter()
                .map(describe)
                .collect::<Vec<String>>()
                .join(", ")
        ),
    }
}

fn select<'a>(candidates: &'a [String], text: &str, case_sensitive: bool) -> Option<&'a String> {
    if case_sensitive {
        candidates.iter().find(|candidate| *candidate == text)
    } else {
        let lowered = text.to_lowercase();
        candidates
            .iter()
            .find(|candidate| candidate.to_lowercase() == lowered)
    }
}

fn not_one_of(text: &str, candidates: &[String]) -> ConversionError {
    let rendered: Vec<String> = candidates
        .iter()
        .map(|candidate| format!("'{candidate}'"))
        .collect();
    ConversionError::conversion(format!("'{text}' is not one of {}.", rendered.join(", ")))
}

fn bound<T: PartialOrd + Copy + std::fmt::Display>(
    value: T,
    min: Option<T>,
    max: Option<T>,
    clamp: bool,
) -> Result<T, ConversionError> {
    let below = match min {
        Some(low) => (ordering(value, low)? == Ordering::Less).then_some(low),
        None => None,
    };
    let above = match max {
        Some(high) => (ordering(value, high)? == Ordering::Greater).then_some(high),
        None => None,
    };

    match (below, above) {
        (Some(low), _) if clamp => Ok(low),
        (_, Some(high)) if clamp => Ok(high),
        (None, None) => Ok(value),
        _ => {
            let range = match (min, max) {
                (Some(low), Some(high)) => format!("{low} <= x <= {high}"),
                (Some(low), None) => format!("x >= {low}"),
                (None, Some(high)) => format!("x <= {high}"),
                (None, None) => unreachable!("internal error - unbounded range cannot be violated"),
            };
            Err(ConversionError::conversion(format!(
                "{value} is not in the range {range}."
            )))
        }
    }
}

fn ordering<T: PartialOrd + std::fmt::Display>(
    value: T,
    limit: T,
) -> Result<Ordering, ConversionError> {
    value
        .partial_cmp(&limit)
        .ok_or_else(|| ConversionError::conversion(format!("{value} is not comparable to {limit}.")))
}

fn invalid_int(value: &str, base: u32) -> ConversionError {
    if base == 0 || base == 10 {
        ConversionError::conversion(format!("'{value}' is not a valid int."))
    } else {
        ConversionError::conversion(format!("'{value}' is not a valid int with base {base}."))
    }
}

// Integer literals: optional sign, optional radix prefix (matching the base), `_` between digits.
fn parse_int(value: &str, base: u32) -> Option<i64> {
    let text = value.trim();
    let (negative, text) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let lowered = text.to_ascii_lowercase();
    let prefixed = |prefix: &str| lowered.starts_with(prefix);
    let (radix, digits) = match base {
        0 if prefixed("0x") => (16, &text[2..]),
        0 if prefixed("0o") => (8, &text[2..]),
        0 if prefixed("0b") => (2, &text[2..]),
        0 => (10, text),
        16 if prefixed("0x") => (16, &text[2..]),
        8 if prefixed("0o") => (8, &text[2..]),
        2 if prefixed("0b") => (2, &text[2..]),
        _ => (base, text),
    };
    // A prefix may be directly followed by an underscore (ex: `0x_ff`).
    let digits = if digits.len() < text.len() {
        digits.strip_prefix('_').unwrap_or(digits)
    } else {
        digits
    };

    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || !digits.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return None;
    }

    let digits: String = digits.chars().filter(|c| *c != '_').collect();

    // Base 0 decimals cannot have leading zeros, which would be ambiguous with octal.
    if base == 0 && radix == 10 && digits.starts_with('0') && digits.chars().any(|c| c != '0') {
        return None;
    }

    let signed = if negative {
        format!("-{digits}")
    } else {
        digits
    };
    i64::from_str_radix(&signed, radix).ok()
}

fn parse_float(value: &str) -> Result<f64, ConversionError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ConversionError::conversion(format!("'{value}' is not a valid float.")))
}

fn is_zoned(item: &Item) -> bool {
    matches!(
        item,
        Item::Fixed(
            Fixed::TimezoneName
                | Fixed::TimezoneOffset
                | Fixed::TimezoneOffsetColon
                | Fixed::TimezoneOffsetDoubleColon
                | Fixed::TimezoneOffsetTripleColon
                | Fixed::TimezoneOffsetColonZ
                | Fixed::TimezoneOffsetZ
                | Fixed::RFC2822
                | Fixed::RFC3339
        )
    )
}

fn parse_datetime(value: &str, formats: &[String]) -> Option<NaiveDateTime> {
    formats.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(value, format)
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(value, format)
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })
    })
}

fn to_radix(number: i64, base: u32) -> String {
    let mut magnitude = number.unsigned_abs();
    let mut digits = Vec::default();

    loop {
        let digit = (magnitude % base as u64) as u32;
        digits.push(std::char::from_digit(digit, base).unwrap_or('?'));
        magnitude /= base as u64;

        if magnitude == 0 {
            break;
        }
    }

    if number < 0 {
        digits.push('-');
    }

    digits.iter().rev().collect()
}

fn open_file(path: &Path, mode: FileMode) -> Result<Value, ConversionError> {
    let opened = match mode {
        FileMode::Read => File::open(path),
        FileMode::Write => File::create(path),
        FileMode::Append => OpenOptions::new().append(true).create(true).open(path),
    };

    opened
        .map(|handle| Value::File(FileValue::new(path.to_path_buf(), mode, handle)))
        .map_err(|error| {
            ConversionError::conversion(format!(
                "Could not open file '{}': {error}.",
                path.display()
            ))
        })
}

fn check_path(path: &Path, entry: EntryKind, policy: &PathPolicy) -> Result<(), ConversionError> {
    let display = path.display();
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(_) if policy.exists => {
            return Err(ConversionError::conversion(format!(
                "Path '{display}' does not exist."
            )));
        }
        // Nothing more to check for a path which does not exist.
        Err(_) => return Ok(()),
    };

    match entry {
        EntryKind::Directory if !metadata.is_dir() => {
            return Err(ConversionError::conversion(format!(
                "Path '{display}' is not a directory."
            )));
        }
        EntryKind::File if !metadata.is_file() => {
            return Err(ConversionError::conversion(format!(
                "Path '{display}' is not a file."
            )));
        }
        _ => {}
    };

    if policy.readable {
        let readable = if metadata.is_dir() {
            fs::read_dir(path).is_ok()
        } else {
            File::open(path).is_ok()
        };

        if !readable {
            return Err(ConversionError::conversion(format!(
                "Path '{display}' is not readable."
            )));
        }
    }

    if policy.writable && metadata.permissions().readonly() {
        return Err(ConversionError::conversion(format!(
            "Path '{display}' is not writable."
        )));
    }

    if policy.executable && !is_executable(&metadata) {
        return Err(ConversionError::conversion(format!(
            "Path '{display}' is not executable."
        )));
    }

    Ok(())
}

#[cfg(unix)]
fn is_executable(metadata: &fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &fs::Metadata) -> bool {
    true
}
