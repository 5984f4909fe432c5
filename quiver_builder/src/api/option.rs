use crate::api::declaration::{check_dest, infer_dest, parse_decls};
use crate::api::Type;
use crate::constant::*;
use crate::error::{ConversionError, DefinitionError, Interrupt, Signal, UsageError};
use crate::model::{Value, Values};

/// The behaviour of an [`Opt`]: its arity and what an occurrence stores.
#[derive(Debug, Clone, PartialEq)]
pub enum OptKind {
    /// Takes one value, storing the last occurrence.
    Store,
    /// Takes no value, storing a constant.
    Flag {
        /// The value stored upon occurrence.
        constant: Value,
    },
    /// Takes one value, accumulating every occurrence into a list.
    Append,
    /// Takes no value, counting the occurrences.
    Count,
    /// Takes no value; the "on" keys store `true`, the "off" keys store `false`.
    OnOff {
        /// The long keys which turn the option off.
        off_long_keys: Vec<String>,
        /// The short keys which turn the option off.
        off_short_keys: Vec<String>,
    },
    /// Takes no value, raising a signal rather than storing.
    Signal(Signal),
}

impl OptKind {
    /// The number of values consumed per occurrence.
    pub fn nargs(&self) -> usize {
        match self {
            OptKind::Store | OptKind::Append => 1,
            OptKind::Flag { .. } | OptKind::Count | OptKind::OnOff { .. } | OptKind::Signal(_) => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variant {
    Store,
    Flag,
    Append,
    Count,
    OnOff,
    Signal(Signal),
}

/// An option.
///
/// Immutable once built; parsing only ever reads it.
///
/// ### Example
/// ```
/// # use quiver_builder as quiver;
/// use quiver::{Opt, Type};
///
/// let option = Opt::builder(["-n", "--line-count"])
///     .ty(Type::int(10).unwrap())
///     .default(10i64)
///     .help("The number of lines.")
///     .build()
///     .unwrap();
/// assert_eq!(option.dest(), "line_count");
/// assert_eq!(option.format_decls(), "-n, --line-count");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Opt {
    kind: OptKind,
    dest: String,
    long_keys: Vec<String>,
    short_keys: Vec<String>,
    required: bool,
    ty: Type,
    default: Value,
    hidden: bool,
    show_default: bool,
    metavar: Option<String>,
    help: String,
}

/// Configures an [`Opt`].
#[derive(Debug, Clone)]
pub struct OptBuilder {
    variant: Variant,
    decls: Vec<String>,
    off_decls: Vec<String>,
    dest: Option<String>,
    required: bool,
    ty: Option<Type>,
    default: Option<Value>,
    constant: Option<Value>,
    hidden: bool,
    show_default: bool,
    metavar: Option<String>,
    help: String,
}

fn owned<S: Into<String>>(decls: impl IntoIterator<Item = S>) -> Vec<String> {
    decls.into_iter().map(Into::into).collect()
}

impl OptBuilder {
    fn new(variant: Variant, decls: Vec<String>) -> Self {
        Self {
            variant,
            decls,
            off_decls: Vec::default(),
            dest: None,
            required: false,
            ty: None,
            default: None,
            constant: None,
            hidden: false,
            show_default: false,
            metavar: None,
            help: String::default(),
        }
    }

    /// Store under `dest` rather than the destination implied by the keys.
    /// The empty destination disables storing altogether.
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest.replace(dest.into());
        self
    }

    /// Make this option required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The value converter.
    pub fn ty(mut self, ty: Type) -> Self {
        self.ty.replace(ty);
        self
    }

    /// The value used when the option is omitted.
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default.replace(default.into());
        self
    }

    /// The value stored upon occurrence (flags only).
    pub fn constant(mut self, constant: impl Into<Value>) -> Self {
        self.constant.replace(constant.into());
        self
    }

    /// Exclude this option from help.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Show the default value in help.
    pub fn show_default(mut self) -> Self {
        self.show_default = true;
        self
    }

    /// The display name of the value.
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar.replace(metavar.into());
        self
    }

    /// Document the option.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Build the option, validating the keys, destination, default and constant.
    pub fn build(self) -> Result<Opt, DefinitionError> {
        let OptBuilder {
            variant,
            decls,
            off_decls,
            dest,
            required,
            ty,
            default,
            constant,
            hidden,
            show_default,
            metavar,
            help,
        } = self;
        let (long_keys, short_keys) = parse_decls(&decls)?;
        let name = format_keys(&short_keys, &long_keys);

        if constant.is_some() && variant != Variant::Flag {
            return Err(DefinitionError::InvalidDeclaration(format!(
                "Option {name} does not take a constant."
            )));
        }

        if ty.is_some() && matches!(variant, Variant::Count | Variant::OnOff | Variant::Signal(_)) {
            return Err(DefinitionError::InvalidDeclaration(format!(
                "Option {name} does not take a type."
            )));
        }

        if required && matches!(variant, Variant::Signal(_)) {
            return Err(DefinitionError::InvalidDeclaration(format!(
                "Option {name} cannot be required."
            )));
        }

        let dest = match (variant, dest) {
            (Variant::Signal(_), _) => String::default(),
            (_, Some(dest)) => check_dest(&dest)?,
            (_, None) => infer_dest(&long_keys, &short_keys)?,
        };
        let custom_ty = ty.is_some();
        let ty = match (variant, ty) {
            (_, Some(ty)) => ty,
            (Variant::Flag | Variant::OnOff, None) => Type::bool(),
            (Variant::Count, None) => Type::int(10)?,
            (_, None) => Type::string(),
        };
        let convert = |what: &'static str, value: &Value| {
            ty.safe_convert(value)
                .map_err(|source| DefinitionError::InvalidValue {
                    what,
                    name: name.clone(),
                    source,
                })
        };
        let default = match (variant, default) {
            (Variant::Signal(_), _) => Value::None,
            (Variant::Flag, None) if custom_ty => Value::None,
            (Variant::Flag | Variant::OnOff, None) => Value::Bool(false),
            (Variant::Count, None) => Value::Int(0),
            (Variant::Append, None) => Value::List(Vec::default()),
            (Variant::Append, Some(Value::List(items))) => Value::List(
                items
                    .iter()
                    .map(|item| convert("default", item))
                    .collect::<Result<Vec<Value>, _>>()?,
            ),
            (Variant::Append, Some(item)) => Value::List(vec![convert("default", &item)?]),
            (_, Some(default)) => convert("default", &default)?,
            (_, None) => Value::None,
        };
        let kind = match variant {
            Variant::Store => OptKind::Store,
            Variant::Flag => OptKind::Flag {
                constant: convert("constant", &constant.unwrap_or(Value::Bool(true)))?,
            },
            Variant::Append => OptKind::Append,
            Variant::Count => OptKind::Count,
            Variant::OnOff => {
                let (off_long_keys, off_short_keys) = parse_decls(&off_decls)?;
                OptKind::OnOff {
                    off_long_keys,
                    off_short_keys,
                }
            }
            Variant::Signal(signal) => OptKind::Signal(signal),
        };

        Ok(Opt {
            kind,
            dest,
            long_keys,
            short_keys,
            required,
            ty,
            default,
            hidden,
            show_default,
            metavar,
            help,
        })
    }
}

fn format_keys(short_keys: &[String], long_keys: &[String]) -> String {
    short_keys
        .iter()
        .chain(long_keys.iter())
        .cloned()
        .collect::<Vec<String>>()
        .join(", ")
}

impl Opt {
    /// Start configuring an option which takes one value.
    pub fn builder<S: Into<String>>(decls: impl IntoIterator<Item = S>) -> OptBuilder {
        OptBuilder::new(Variant::Store, owned(decls))
    }

    /// Start configuring a flag: an option which stores a constant (default: `true`, otherwise `false`).
    pub fn flag<S: Into<String>>(decls: impl IntoIterator<Item = S>) -> OptBuilder {
        OptBuilder::new(Variant::Flag, owned(decls))
    }

    /// Start configuring an option which may be repeated, accumulating its values into a list.
    pub fn append<S: Into<String>>(decls: impl IntoIterator<Item = S>) -> OptBuilder {
        OptBuilder::new(Variant::Append, owned(decls))
    }

    /// Start configuring an option which counts its occurrences (ex: `-vvv`).
    pub fn count<S: Into<String>>(decls: impl IntoIterator<Item = S>) -> OptBuilder {
        OptBuilder::new(Variant::Count, owned(decls))
    }

    /// Start configuring a pair of linked flags sharing one destination (ex: `--color`/`--no-color`).
    pub fn on_off<S: Into<String>, T: Into<String>>(
        on_decls: impl IntoIterator<Item = S>,
        off_decls: impl IntoIterator<Item = T>,
    ) -> OptBuilder {
        let mut builder = OptBuilder::new(Variant::OnOff, owned(on_decls));
        builder.off_decls = owned(off_decls);
        builder
    }

    /// Start configuring an option which raises `signal` upon occurrence.
    pub fn signal<S: Into<String>>(
        decls: impl IntoIterator<Item = S>,
        signal: Signal,
    ) -> OptBuilder {
        OptBuilder::new(Variant::Signal(signal), owned(decls))
    }

    /// The conventional `-h, --help` option.
    pub fn help() -> OptBuilder {
        Opt::signal(["-h", "--help"], Signal::Help).help(HELP_MESSAGE)
    }

    /// The conventional `-V, --version` option.
    pub fn version() -> OptBuilder {
        Opt::signal(["-V", "--version"], Signal::Version).help(VERSION_MESSAGE)
    }

    /// What an occurrence does.
    pub fn kind(&self) -> &OptKind {
        &self.kind
    }

    /// The destination (empty when this option never stores).
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// The keys (ex: `--name`) which turn this option on.
    pub fn long_keys(&self) -> &[String] {
        &self.long_keys
    }

    /// The keys (ex: `-n`) which turn this option on.
    pub fn short_keys(&self) -> &[String] {
        &self.short_keys
    }

    /// Every key, paired with whether it is an "off" key.
    pub fn keys(&self) -> impl Iterator<Item = (&str, bool)> {
        let on = self
            .long_keys
            .iter()
            .chain(self.short_keys.iter())
            .map(|key| (key.as_str(), false));
        let off: Vec<(&str, bool)> = match &self.kind {
            OptKind::OnOff {
                off_long_keys,
                off_short_keys,
            } => off_long_keys
                .iter()
                .chain(off_short_keys.iter())
                .map(|key| (key.as_str(), true))
                .collect(),
            _ => Vec::default(),
        };
        on.chain(off)
    }

    /// The number of values consumed per occurrence.
    pub fn nargs(&self) -> usize {
        self.kind.nargs()
    }

    /// Whether the option must occur.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The value converter.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The (converted) default.
    pub fn default(&self) -> &Value {
        &self.default
    }

    /// Whether the option is excluded from help.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The help text.
    pub fn help_text(&self) -> &str {
        &self.help
    }

    /// The keys as shown in help: short keys before long keys (ex: `-n, --name`).
    /// The "off" keys of an on/off option follow a `/`.
    pub fn format_decls(&self) -> String {
        let on = format_keys(&self.short_keys, &self.long_keys);

        match &self.kind {
            OptKind::OnOff {
                off_long_keys,
                off_short_keys,
            } => format!("{on} / {}", format_keys(off_short_keys, off_long_keys)),
            _ => on,
        }
    }

    /// The display name of the value, if this option takes one.
    pub fn show_metavar(&self) -> Option<String> {
        if self.nargs() == 0 {
            return None;
        }

        self.metavar
            .clone()
            .or_else(|| self.ty.metavar())
            .or_else(|| {
                if self.dest.is_empty() {
                    Some("VALUE".to_string())
                } else {
                    Some(self.dest.to_uppercase())
                }
            })
    }

    /// The default rendered for help, when configured to be shown.
    pub fn show_default(&self) -> Option<String> {
        match &self.default {
            _ if !self.show_default => None,
            Value::None => None,
            Value::List(items) if items.is_empty() => None,
            default => Some(self.ty.format(default)),
        }
    }

    fn invalid(&self, name: String, source: ConversionError) -> UsageError {
        UsageError::InvalidOptionValue { name, source }
    }

    /// Convert and store the value given to `key`.
    /// An append option restarts its list upon its `first` occurrence.
    pub(crate) fn store(
        &self,
        values: &mut Values,
        token: &str,
        key: &str,
        first: bool,
    ) -> Result<(), UsageError> {
        let value = self
            .ty
            .convert_str(token)
            .map_err(|source| self.invalid(format!("'{key}'"), source))?;

        match &self.kind {
            OptKind::Store => values.insert(&self.dest, value),
            OptKind::Append => match values.get_mut(&self.dest) {
                Some(Value::List(items)) if !first => items.push(value),
                _ => values.insert(&self.dest, Value::List(vec![value])),
            },
            _ => unreachable!("internal error - option without values cannot store a value"),
        };

        Ok(())
    }

    /// Store the constant of a value-less option.
    /// A count option restarts upon its `first` occurrence; a signal option interrupts.
    pub(crate) fn store_const(
        &self,
        values: &mut Values,
        off: bool,
        first: bool,
    ) -> Result<(), Interrupt> {
        match &self.kind {
            OptKind::Flag { constant } => {
                let value = self
                    .ty
                    .realize(constant.clone())
                    .map_err(|source| self.invalid(self.format_decls(), source))?;
                values.insert(&self.dest, value);
            }
            OptKind::Count => {
                let count = match values.get(&self.dest) {
                    Some(Value::Int(count)) if !first => *count,
                    _ => 0,
                };
                values.insert(&self.dest, Value::Int(count + 1));
            }
            OptKind::OnOff { .. } => values.insert(&self.dest, Value::Bool(!off)),
            OptKind::Signal(signal) => return Err(Interrupt::Signal(*signal)),
            OptKind::Store | OptKind::Append => {
                unreachable!("internal error - option with values cannot store a constant")
            }
        };

        Ok(())
    }

    pub(crate) fn store_default(&self, values: &mut Values) -> Result<(), UsageError> {
        if let OptKind::Signal(_) = self.kind {
            return Ok(());
        }

        let value = self
            .ty
            .realize(self.default.clone())
            .map_err(|source| self.invalid(self.format_decls(), source))?;
        values.insert(&self.dest, value);
        Ok(())
    }
}
