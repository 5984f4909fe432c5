use crate::api::{ArgumentGroup, OptionGroup};
use crate::constant::*;
use crate::error::{Interrupt, UsageError};
use crate::model::Values;
use crate::parser::context::{Context, Layout, NodeTree};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// What positional tokens mean to the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Positional tokens are dispatched to the declared arguments.
    Command,
    /// The first positional token names a sub-command; parsing stops there.
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    PositionalOnly,
}

/// The outcome of a completed parse.
#[derive(Debug, PartialEq)]
pub(crate) struct Parsed {
    pub(crate) values: Values,
    // The tokens following a super-command's sub-command name, untouched.
    pub(crate) remained: Vec<String>,
}

/// A single-pass tokenizer over a command's declarations.
///
/// The parser itself is stateless: every call to [`Parser::parse`] builds its own [`Context`].
#[derive(Debug)]
pub(crate) struct Parser<'a> {
    argument_groups: &'a [ArgumentGroup],
    option_groups: &'a [OptionGroup],
    layout: &'a Layout,
    mode: Mode,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(
        argument_groups: &'a [ArgumentGroup],
        option_groups: &'a [OptionGroup],
        layout: &'a Layout,
        mode: Mode,
    ) -> Self {
        Self {
            argument_groups,
            option_groups,
            layout,
            mode,
        }
    }

    pub(crate) fn parse(&self, argv: &[&str]) -> Result<Parsed, Interrupt> {
        let tree = NodeTree::new(self.argument_groups, self.option_groups);
        let mut context = Context::new(argv, tree);
        let mut state = State::Normal;

        while let Some(token) = context.next_token() {
            match state {
                State::Normal if is_separator(token) => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        debug!("Separator seen, switching to positional-only.");
                    }

                    state = State::PositionalOnly;
                }
                State::Normal if is_long_option(token) => self.long_option(&mut context, token)?,
                State::Normal if is_short_option(token) => {
                    self.short_option(&mut context, token)?
                }
                State::Normal | State::PositionalOnly => {
                    if self.mode == Mode::Super {
                        #[cfg(feature = "tracing_debug")]
                        {
                            debug!("Handing off at sub-command '{token}'.");
                        }

                        context.capture_command();
                        break;
                    }

                    self.argument(&mut context, token)?;
                }
            }
        }

        let remained = context.remaining();
        let values = context.finalize()?;
        Ok(Parsed { values, remained })
    }

    fn argument(&self, context: &mut Context, token: &str) -> Result<(), UsageError> {
        let position = context.next_argument(self.layout)?;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Dispatching '{token}' to argument at {position:?}.");
        }

        context.store_argument(position, token)
    }

    fn long_option(&self, context: &mut Context, token: &str) -> Result<(), Interrupt> {
        match token.split_once('=') {
            // --key=value
            Some((key, value)) => {
                let slot = self.layout.lookup(key)?;

                if context.option(slot).nargs() == 0 {
                    return Err(UsageError::TooManyOptionValues(key.to_string()).into());
                }

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Option '{key}' resolved with attached value.");
                }

                context.store_option(slot, value, key)?;
            }
            // --key [value]
            None => {
                let slot = self.layout.lookup(token)?;

                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Option '{token}' resolved.");
                }

                if context.option(slot).nargs() == 0 {
                    context.store_const(slot)?;
                } else {
                    let value = context
                        .next_token()
                        .ok_or_else(|| UsageError::TooFewOptionValues(token.to_string()))?;
                    context.store_option(slot, value, token)?;
                }
            }
        }

        Ok(())
    }

    fn short_option(&self, context: &mut Context, token: &str) -> Result<(), Interrupt> {
        let cluster = &token[SHORT_PREFIX.len()..];

        for (offset, character) in cluster.char_indices() {
            let key = format!("{SHORT_PREFIX}{character}");
            let slot = self.layout.lookup(&key)?;

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Option '{key}' resolved from cluster '{token}'.");
            }

            if context.option(slot).nargs() == 0 {
                context.store_const(slot)?;
                continue;
            }

            // The first value-taking option consumes the rest of the token (-ovalue), or else the next token.
            let attached = &cluster[offset + character.len_utf8()..];
            let value = if attached.is_empty() {
                context
                    .next_token()
                    .ok_or_else(|| UsageError::TooFewOptionValues(key.clone()))?
            } else {
                attached
            };
            context.store_option(slot, value, &key)?;
            break;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Argument, GroupKind, Opt, Type};
    use crate::error::{ConversionError, Signal};
    use crate::model::{Nargs, Value};
    use rand::seq::SliceRandom;
    use rand::thread_rng;
    use rstest::rstest;

    struct Fixture {
        argument_groups: Vec<ArgumentGroup>,
        option_groups: Vec<OptionGroup>,
        layout: Layout,
    }

    impl Fixture {
        fn new(argument_groups: Vec<ArgumentGroup>, option_groups: Vec<OptionGroup>) -> Self {
            let layout = Layout::new(&argument_groups, &option_groups).unwrap();
            Self {
                argument_groups,
                option_groups,
                layout,
            }
        }

        fn parse(&self, argv: &[&str]) -> Result<Parsed, Interrupt> {
            Parser::new(
                &self.argument_groups,
                &self.option_groups,
                &self.layout,
                Mode::Command,
            )
            .parse(argv)
        }

        fn parse_values(&self, argv: &[&str]) -> Result<Values, Interrupt> {
            self.parse(argv).map(|parsed| parsed.values)
        }

        fn hand_off(&self, argv: &[&str]) -> Result<Parsed, Interrupt> {
            Parser::new(&[], &self.option_groups, &self.layout, Mode::Super).parse(argv)
        }
    }

    fn options() -> OptionGroup {
        OptionGroup::new("Options")
            .add(Opt::help().build().unwrap())
            .add(Opt::flag(["-a"]).build().unwrap())
            .add(Opt::flag(["-b"]).build().unwrap())
            .add(Opt::builder(["-o", "--output"]).build().unwrap())
            .add(Opt::builder(["-n", "--name"]).build().unwrap())
            .add(Opt::append(["-t", "--tag"]).build().unwrap())
            .add(Opt::count(["-v", "--verbose"]).build().unwrap())
            .add(
                Opt::on_off(["--color"], ["--no-color"])
                    .build()
                    .unwrap(),
            )
    }

    fn simple() -> Fixture {
        Fixture::new(
            vec![ArgumentGroup::new("Arguments").add(
                Argument::builder("files")
                    .nargs(Nargs::Variadic)
                    .build()
                    .unwrap(),
            )],
            vec![options()],
        )
    }

    #[test]
    fn empty_defaults() {
        // Setup
        let fixture = simple();

        // Execute
        let parsed = fixture.parse(empty::slice()).unwrap();

        // Verify
        let values = parsed.values;
        assert_eq!(values.get("files"), Some(&Value::List(vec![])));
        assert_eq!(values.get_bool("a"), Some(false));
        assert_eq!(values.get_bool("b"), Some(false));
        assert_eq!(values.get("output"), Some(&Value::None));
        assert_eq!(values.get("tag"), Some(&Value::List(vec![])));
        assert_eq!(values.get_int("verbose"), Some(0));
        assert_eq!(values.get_bool("color"), Some(false));
        assert!(parsed.remained.is_empty());
    }

    #[rstest]
    #[case(vec!["-h"])]
    #[case(vec!["--help"])]
    #[case(vec!["-h", "--unknown-garbage"])]
    #[case(vec!["-ah", "--unknown-garbage"])]
    #[case(vec!["x", "-vh", "-z"])]
    fn help_signal(#[case] tokens: Vec<&str>) {
        let fixture = simple();

        let result = fixture.parse(&tokens);

        assert_eq!(result, Err(Interrupt::Signal(Signal::Help)));
    }

    #[test]
    fn short_cluster() {
        // Setup
        let fixture = simple();

        // Execute
        let values = fixture.parse_values(&["-abofoo"]).unwrap();

        // Verify
        assert_eq!(values.get_bool("a"), Some(true));
        assert_eq!(values.get_bool("b"), Some(true));
        assert_eq!(values.get_str("output"), Some("foo"));
    }

    #[test]
    fn short_cluster_first_value_option_wins() {
        let fixture = simple();

        let values = fixture.parse_values(&["-aonb"]).unwrap();

        assert_eq!(values.get_bool("a"), Some(true));
        assert_eq!(values.get_str("output"), Some("nb"));
        assert_eq!(values.get("name"), Some(&Value::None));
        assert_eq!(values.get_bool("b"), Some(false));
    }

    #[rstest]
    #[case(vec!["-o", "foo"])]
    #[case(vec!["-ofoo"])]
    #[case(vec!["--output", "foo"])]
    #[case(vec!["--output=foo"])]
    #[case(vec!["--output=bar", "--output", "foo"])]
    fn option_value_forms(#[case] tokens: Vec<&str>) {
        let fixture = simple();

        let values = fixture.parse_values(&tokens).unwrap();

        assert_eq!(values.get_str("output"), Some("foo"));
    }

    #[rstest]
    #[case(vec!["--output=a=b"], "a=b")]
    #[case(vec!["--output="], "")]
    #[case(vec!["--output", "--name"], "--name")]
    #[case(vec!["-o", "-a"], "-a")]
    #[case(vec!["-o", "--"], "--")]
    fn option_value_verbatim(#[case] tokens: Vec<&str>, #[case] expected: &str) {
        let fixture = simple();

        let values = fixture.parse_values(&tokens).unwrap();

        assert_eq!(values.get_str("output"), Some(expected));
    }

    #[rstest]
    #[case(vec!["--output"], UsageError::TooFewOptionValues("--output".to_string()))]
    #[case(vec!["-o"], UsageError::TooFewOptionValues("-o".to_string()))]
    #[case(vec!["-abo"], UsageError::TooFewOptionValues("-o".to_string()))]
    #[case(vec!["--color=yes"], UsageError::TooManyOptionValues("--color".to_string()))]
    #[case(vec!["--help=1"], UsageError::TooManyOptionValues("--help".to_string()))]
    #[case(vec!["--colour"], UsageError::UnknownOption("--colour".to_string()))]
    #[case(vec!["-x"], UsageError::UnknownOption("-x".to_string()))]
    #[case(vec!["-ax"], UsageError::UnknownOption("-x".to_string()))]
    #[case(vec!["-5"], UsageError::UnknownOption("-5".to_string()))]
    fn option_errors(#[case] tokens: Vec<&str>, #[case] expected: UsageError) {
        let fixture = simple();

        let result = fixture.parse(&tokens);

        assert_eq!(result, Err(Interrupt::Usage(expected)));
    }

    #[test]
    fn separator() {
        // Setup
        let fixture = simple();

        // Execute
        let values = fixture.parse_values(&["-a", "--", "-x", "--", "--name"]).unwrap();

        // Verify
        assert_eq!(values.get_bool("a"), Some(true));
        assert_eq!(values.get("files"), Some(&Value::from(vec!["-x", "--", "--name"])));
        assert_eq!(values.get("name"), Some(&Value::None));
    }

    #[rstest]
    #[case(vec!["-"], vec!["-"])]
    #[case(vec!["a", "-a", "b"], vec!["a", "b"])]
    #[case(vec!["--", "-x"], vec!["-x"])]
    fn variadic(#[case] tokens: Vec<&str>, #[case] expected: Vec<&str>) {
        let fixture = simple();

        let values = fixture.parse_values(&tokens).unwrap();

        assert_eq!(values.get("files"), Some(&Value::from(expected)));
    }

    #[test]
    fn append_and_count() {
        let fixture = simple();

        let values = fixture
            .parse_values(&["--tag", "a", "-v", "-tb", "-vv", "--verbose"])
            .unwrap();

        assert_eq!(values.get("tag"), Some(&Value::from(vec!["a", "b"])));
        assert_eq!(values.get_int("verbose"), Some(4));
    }

    #[rstest]
    #[case(vec!["--color"], true)]
    #[case(vec!["--no-color"], false)]
    #[case(vec!["--no-color", "--color"], true)]
    #[case(vec!["--color", "--no-color"], false)]
    fn on_off(#[case] tokens: Vec<&str>, #[case] expected: bool) {
        let fixture = simple();

        let values = fixture.parse_values(&tokens).unwrap();

        assert_eq!(values.get_bool("color"), Some(expected));
    }

    #[test]
    fn positional_arguments() {
        // Setup
        let fixture = Fixture::new(
            vec![
                ArgumentGroup::new("Input").add(
                    Argument::builder("count")
                        .ty(Type::int(10).unwrap())
                        .required()
                        .build()
                        .unwrap(),
                ),
                ArgumentGroup::new("Output").add(Argument::builder("target").default("out").build().unwrap()),
            ],
            vec![],
        );

        // Execute & Verify
        let values = fixture.parse_values(&["3"]).unwrap();
        assert_eq!(values.get_int("count"), Some(3));
        assert_eq!(values.get_str("target"), Some("out"));

        let values = fixture.parse_values(&["3", "x"]).unwrap();
        assert_eq!(values.get_str("target"), Some("x"));

        assert_eq!(
            fixture.parse(&["3", "x", "y"]),
            Err(UsageError::TooManyArguments.into())
        );
        assert_eq!(
            fixture.parse(empty::slice()),
            Err(UsageError::TooFewArguments.into())
        );
        assert_eq!(
            fixture.parse(&["three"]),
            Err(UsageError::InvalidArgumentValue {
                name: "'count'".to_string(),
                source: ConversionError::Conversion("'three' is not a valid int.".to_string()),
            }
            .into())
        );
    }

    #[test]
    fn invalid_option_value() {
        let fixture = Fixture::new(
            vec![],
            vec![OptionGroup::new("Options").add(
                Opt::builder(["-n", "--number"])
                    .ty(Type::int(16).unwrap())
                    .build()
                    .unwrap(),
            )],
        );

        assert_eq!(
            fixture.parse_values(&["-nff"]).unwrap().get_int("number"),
            Some(255)
        );
        assert_eq!(
            fixture.parse(&["--number=zz"]),
            Err(UsageError::InvalidOptionValue {
                name: "'--number'".to_string(),
                source: ConversionError::Conversion(
                    "'zz' is not a valid int with base 16.".to_string()
                ),
            }
            .into())
        );
    }

    #[test]
    fn exactly_one_random_order() {
        // Setup
        let fixture = Fixture::new(
            vec![],
            vec![OptionGroup::new("Target")
                .constraint(GroupKind::ExactlyOne)
                .add(Opt::flag(["--x"]).build().unwrap())
                .add(Opt::flag(["--y"]).build().unwrap())],
        );
        let mut tokens = vec!["--x", "--x", "--x", "--x"];

        // Execute & Verify
        for _ in 0..10 {
            tokens.shuffle(&mut thread_rng());
            assert!(fixture.parse(&tokens).is_ok());
        }

        tokens.push("--y");
        for _ in 0..10 {
            tokens.shuffle(&mut thread_rng());
            assert_matches!(
                fixture.parse(&tokens),
                Err(Interrupt::Usage(UsageError::Group { actual: 2, .. }))
            );
        }

        assert_matches!(
            fixture.parse(empty::slice()),
            Err(Interrupt::Usage(UsageError::Group { actual: 0, .. }))
        );
    }

    fn pair() -> Fixture {
        Fixture::new(
            vec![ArgumentGroup::new("Pair")
                .constraint(GroupKind::All)
                .add(Argument::builder("source").build().unwrap())
                .add(Argument::builder("target").build().unwrap())],
            vec![options()],
        )
    }

    #[rstest]
    #[case(vec![], 0)]
    #[case(vec!["x"], 1)]
    #[case(vec!["-a", "x", "-b"], 1)]
    fn argument_group_all_violated(#[case] tokens: Vec<&str>, #[case] count: usize) {
        // Setup
        let fixture = pair();

        // Execute
        let result = fixture.parse(&tokens);

        // Verify
        assert_matches!(
            result,
            Err(Interrupt::Usage(UsageError::Group { title, kind: GroupKind::All, size: 2, actual }))
                if title == "Pair" && actual == count
        );
    }

    #[test]
    fn argument_group_all_satisfied() {
        // Setup
        let fixture = pair();

        // Execute
        let values = fixture.parse_values(&["x", "-a", "y"]).unwrap();

        // Verify
        assert_eq!(values.get_str("source"), Some("x"));
        assert_eq!(values.get_str("target"), Some("y"));
        assert_eq!(values.get_bool("a"), Some(true));
    }

    #[test]
    fn argument_group_variadic_counts_once() {
        // Setup
        let fixture = Fixture::new(
            vec![
                ArgumentGroup::new("Head").add(Argument::builder("head").build().unwrap()),
                ArgumentGroup::new("Rest").constraint(GroupKind::ExactlyOne).add(
                    Argument::builder("rest")
                        .nargs(Nargs::Variadic)
                        .build()
                        .unwrap(),
                ),
            ],
            vec![],
        );

        // Execute
        let values = fixture.parse_values(&["h", "a", "b", "c"]).unwrap();

        // Verify
        assert_eq!(values.get_str("head"), Some("h"));
        assert_eq!(
            values.get("rest"),
            Some(&Value::List(vec![
                Value::from("a"),
                Value::from("b"),
                Value::from("c"),
            ]))
        );
        assert_matches!(
            fixture.parse(&["h"]),
            Err(Interrupt::Usage(UsageError::Group { actual: 0, .. }))
        );
    }

    #[test]
    fn repeated_parses_independent() {
        let fixture = simple();

        let first = fixture.parse_values(&["-a", "--tag", "x", "f"]).unwrap();
        let second = fixture.parse_values(&["-b"]).unwrap();

        assert_eq!(first.get_bool("a"), Some(true));
        assert_eq!(first.get("tag"), Some(&Value::from(vec!["x"])));
        assert_eq!(second.get_bool("a"), Some(false));
        assert_eq!(second.get_bool("b"), Some(true));
        assert_eq!(second.get("tag"), Some(&Value::List(vec![])));
        assert_eq!(second.get("files"), Some(&Value::List(vec![])));
    }

    #[rstest]
    #[case(vec!["-a", "run", "--fast", "x"], vec!["--fast", "x"])]
    #[case(vec!["run"], vec![])]
    #[case(vec!["--", "run", "-a"], vec!["-a"])]
    #[case(vec!["-o", "run", "stop", "--", "y"], vec!["--", "y"])]
    fn super_hand_off(#[case] tokens: Vec<&str>, #[case] remained: Vec<&str>) {
        let fixture = simple();

        let parsed = fixture.hand_off(&tokens).unwrap();

        let expected_name = if tokens[0] == "-o" { "stop" } else { "run" };
        assert_eq!(parsed.values.command_name(), Some(expected_name));
        assert_eq!(parsed.remained, remained);
    }

    #[test]
    fn super_hand_off_options_first() {
        let fixture = simple();

        let parsed = fixture.hand_off(&["-a", "run", "-b"]).unwrap();

        assert_eq!(parsed.values.get_bool("a"), Some(true));
        assert_eq!(parsed.values.get_bool("b"), Some(false));
        assert_eq!(parsed.remained, vec!["-b"]);
    }

    #[test]
    fn super_missing_command() {
        let fixture = simple();

        let parsed = fixture.hand_off(&["-a"]).unwrap();

        assert_eq!(parsed.values.command_name(), None);
        assert!(parsed.remained.is_empty());
    }
}
