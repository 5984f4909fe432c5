use crate::api::declaration::{check_dest, check_reserved};
use crate::api::Type;
use crate::constant::SHORT_PREFIX;
use crate::error::{ConversionError, DefinitionError, UsageError};
use crate::model::{Nargs, Value, Values};

/// A positional argument.
///
/// Immutable once built; parsing only ever reads it.
///
/// ### Example
/// ```
/// # use quiver_builder as quiver;
/// use quiver::{Argument, Nargs, Type};
///
/// let argument = Argument::builder("count")
///     .ty(Type::int(10).unwrap())
///     .nargs(Nargs::Variadic)
///     .help("The counts to sum.")
///     .build()
///     .unwrap();
/// assert_eq!(argument.dest(), "count");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    decl: String,
    dest: String,
    nargs: Nargs,
    required: bool,
    ty: Type,
    default: Value,
    hidden: bool,
    show_default: bool,
    metavar: Option<String>,
    help: String,
}

/// Configures an [`Argument`].
#[derive(Debug, Clone)]
pub struct ArgumentBuilder {
    decl: String,
    dest: Option<String>,
    nargs: Nargs,
    required: bool,
    ty: Type,
    default: Value,
    hidden: bool,
    show_default: bool,
    metavar: Option<String>,
    help: String,
}

impl ArgumentBuilder {
    /// Store under `dest` rather than the destination implied by the declaration.
    /// The empty destination disables storing altogether.
    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest.replace(dest.into());
        self
    }

    /// The number of values this argument consumes.
    pub fn nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = nargs;
        self
    }

    /// Make this argument required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// The value converter (default: [`Type::string`]).
    pub fn ty(mut self, ty: Type) -> Self {
        self.ty = ty;
        self
    }

    /// The value used when the argument is omitted.
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    /// Exclude this argument from help.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Show the default value in help.
    pub fn show_default(mut self) -> Self {
        self.show_default = true;
        self
    }

    /// The display name of the value (default: the upper-cased declaration).
    pub fn metavar(mut self, metavar: impl Into<String>) -> Self {
        self.metavar.replace(metavar.into());
        self
    }

    /// Document the argument.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Build the argument, validating the declaration, destination and default.
    pub fn build(self) -> Result<Argument, DefinitionError> {
        let ArgumentBuilder {
            decl,
            dest,
            nargs,
            required,
            ty,
            default,
            hidden,
            show_default,
            metavar,
            help,
        } = self;

        if decl.is_empty() {
            return Err(DefinitionError::InvalidDeclaration(
                "No argument defined.".to_string(),
            ));
        }

        check_reserved(&decl)?;

        if decl.starts_with(SHORT_PREFIX) {
            return Err(DefinitionError::InvalidDeclaration(format!(
                "Argument must not start with '{SHORT_PREFIX}', got '{decl}'."
            )));
        }

        let dest = match dest {
            Some(dest) => check_dest(&dest)?,
            None => check_dest(&decl)?,
        };
        let invalid_default = |source| DefinitionError::InvalidValue {
            what: "default",
            name: format!("'{decl}'"),
            source,
        };
        let default = match (nargs, default) {
            (Nargs::One, default) => ty.safe_convert(&default).map_err(invalid_default)?,
            (Nargs::Variadic, Value::None) => Value::List(Vec::default()),
            (Nargs::Variadic, Value::List(items)) => Value::List(
                items
                    .iter()
                    .map(|item| ty.safe_convert(item))
                    .collect::<Result<Vec<Value>, _>>()
                    .map_err(invalid_default)?,
            ),
            (Nargs::Variadic, item) => {
                Value::List(vec![ty.safe_convert(&item).map_err(invalid_default)?])
            }
        };

        Ok(Argument {
            decl,
            dest,
            nargs,
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

impl Argument {
    /// Start configuring a positional argument.
    /// Its destination is implied by `decl` (with `-` translated into `_`).
    pub fn builder(decl: impl Into<String>) -> ArgumentBuilder {
        ArgumentBuilder {
            decl: decl.into(),
            dest: None,
            nargs: Nargs::One,
            required: false,
            ty: Type::default(),
            default: Value::None,
            hidden: false,
            show_default: false,
            metavar: None,
            help: String::default(),
        }
    }

    /// A plain single-value string argument.
    pub fn new(decl: impl Into<String>) -> Result<Self, DefinitionError> {
        Argument::builder(decl).build()
    }

    /// The declaration.
    pub fn decl(&self) -> &str {
        &self.decl
    }

    /// The destination (empty when this argument never stores).
    pub fn dest(&self) -> &str {
        &self.dest
    }

    /// The number of values consumed.
    pub fn nargs(&self) -> Nargs {
        self.nargs
    }

    /// Whether the argument must occur.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The value converter.
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The (converted) default.
    /// Variadic arguments always have a list default.
    pub fn default(&self) -> &Value {
        &self.default
    }

    /// Whether the argument is excluded from help.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// The declaration, as shown in help.
    pub fn format_decl(&self) -> String {
        self.decl.clone()
    }

    /// The display name of the value, as shown in usage.
    pub fn show_metavar(&self) -> String {
        match &self.metavar {
            Some(metavar) => metavar.clone(),
            None => self.decl.to_uppercase().replace('-', "_"),
        }
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

    fn invalid(&self, source: ConversionError) -> UsageError {
        UsageError::InvalidArgumentValue {
            name: format!("'{}'", self.format_decl()),
            source,
        }
    }

    /// Convert and store one positional token.
    /// Variadic arguments accumulate every token.
    pub(crate) fn store(&self, values: &mut Values, token: &str) -> Result<(), UsageError> {
        let value = self
            .ty
            .convert_str(token)
            .map_err(|source| self.invalid(source))?;

        match self.nargs {
            Nargs::One => values.insert(&self.dest, value),
            Nargs::Variadic => match values.get_mut(&self.dest) {
                Some(Value::List(items)) => items.push(value),
                _ => values.insert(&self.dest, Value::List(vec![value])),
            },
        };

        Ok(())
    }

    pub(crate) fn store_default(&self, values: &mut Values) -> Result<(), UsageError> {
        let value = self
            .ty
            .realize(self.default.clone())
            .map_err(|source| self.invalid(source))?;
        values.insert(&self.dest, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults() {
        // Setup & Execute
        let argument = Argument::new("file-name").unwrap();

        // Verify
        assert_eq!(argument.decl(), "file-name");
        assert_eq!(argument.dest(), "file_name");
        assert_eq!(argument.nargs(), Nargs::One);
        assert!(!argument.is_required());
        assert!(!argument.is_hidden());
        assert_eq!(argument.default(), &Value::None);
        assert_eq!(argument.show_metavar(), "FILE_NAME");
        assert_eq!(argument.show_default(), None);
    }

    #[rstest]
    #[case("")]
    #[case("-abc")]
    #[case("<abc>")]
    #[case("a'b")]
    fn invalid_decl(#[case] decl: &str) {
        assert_matches!(
            Argument::new(decl),
            Err(DefinitionError::InvalidDeclaration(_))
        );
    }

    #[test]
    fn invalid_dest() {
        assert_matches!(
            Argument::new("2nd"),
            Err(DefinitionError::InvalidDestination(_))
        );
        assert_matches!(
            Argument::builder("x").dest("a b").build(),
            Err(DefinitionError::InvalidDestination(_))
        );
        assert_eq!(Argument::builder("2nd").dest("").build().unwrap().dest(), "");
    }

    #[rstest]
    #[case(Nargs::One, Value::None, Value::None)]
    #[case(Nargs::One, Value::from("7"), Value::Int(7))]
    #[case(Nargs::One, Value::Int(7), Value::Int(7))]
    #[case(Nargs::Variadic, Value::None, Value::List(vec![]))]
    #[case(Nargs::Variadic, Value::from("7"), Value::List(vec![Value::Int(7)]))]
    #[case(Nargs::Variadic, Value::from(vec!["1", "2"]), Value::List(vec![Value::Int(1), Value::Int(2)]))]
    fn default_conversion(#[case] nargs: Nargs, #[case] default: Value, #[case] expected: Value) {
        let argument = Argument::builder("n")
            .nargs(nargs)
            .ty(Type::int(10).unwrap())
            .default(default)
            .build()
            .unwrap();
        assert_eq!(argument.default(), &expected);
    }

    #[test]
    fn default_invalid() {
        let error = Argument::builder("n")
            .ty(Type::int(10).unwrap())
            .default("seven")
            .build()
            .unwrap_err();
        assert_eq!(
            error,
            DefinitionError::InvalidValue {
                what: "default",
                name: "'n'".to_string(),
                source: ConversionError::Conversion("'seven' is not a valid int.".to_string()),
            }
        );
    }

    #[test]
    fn store_variadic() {
        // Setup
        let argument = Argument::builder("items")
            .nargs(Nargs::Variadic)
            .build()
            .unwrap();
        let mut values = Values::default();

        // Execute
        argument.store(&mut values, "a").unwrap();
        argument.store(&mut values, "b").unwrap();

        // Verify
        assert_eq!(
            values.get("items"),
            Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
        );
    }

    #[test]
    fn store_invalid() {
        let argument = Argument::builder("n")
            .ty(Type::int(10).unwrap())
            .build()
            .unwrap();
        let mut values = Values::default();

        let error = argument.store(&mut values, "x").unwrap_err();

        assert_eq!(
            error.to_string(),
            "Invalid value for argument 'n'. 'x' is not a valid int."
        );
        assert!(values.is_empty());
    }

    #[test]
    fn show() {
        let argument = Argument::builder("n")
            .ty(Type::int(16).unwrap())
            .default(255i64)
            .metavar("NUMBER")
            .show_default()
            .build()
            .unwrap();
        assert_eq!(argument.show_metavar(), "NUMBER");
        assert_eq!(argument.show_default(), Some("ff".to_string()));
    }
}
