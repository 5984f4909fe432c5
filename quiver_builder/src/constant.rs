pub(crate) const LONG_PREFIX: &str = "--";
pub(crate) const SHORT_PREFIX: &str = "-";
pub(crate) const SEPARATOR: &str = "--";

// Quotes and angle brackets would break the rendered usage lines.
pub(crate) const RESERVED_CHARACTERS: [char; 4] = ['"', '\'', '<', '>'];

/// The destination under which a super-command stores the name of the selected sub-command.
///
/// It is not a valid identifier, so it can never collide with a declared destination.
pub const COMMAND_NAME_DEST: &str = "<command_name>";

pub(crate) const HELP_MESSAGE: &str = "Show help information and exit.";
pub(crate) const VERSION_MESSAGE: &str = "Show version information and exit.";

pub(crate) const DEFINITION_EXIT_CODE: i32 = 129;
pub(crate) const USAGE_EXIT_CODE: i32 = 137;
pub(crate) const GROUP_USAGE_EXIT_CODE: i32 = 138;
pub(crate) const SIGNAL_EXIT_CODE: i32 = 0;

/// Whether the token is precisely the positional-only separator `--`.
pub fn is_separator(token: &str) -> bool {
    token == SEPARATOR
}

/// Whether the token has the shape of a long option (`--` followed by at least one character).
pub fn is_long_option(token: &str) -> bool {
    token.starts_with(LONG_PREFIX) && token.len() > LONG_PREFIX.len()
}

/// Whether the token has the shape of a short option (`-` followed by at least one character).
///
/// Long options also satisfy this shape; test for [`is_long_option`] first.
pub fn is_short_option(token: &str) -> bool {
    token.starts_with(SHORT_PREFIX) && token.len() > SHORT_PREFIX.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("--", true, false, true)]
    #[case("-", false, false, false)]
    #[case("--a", false, true, true)]
    #[case("--abc=1", false, true, true)]
    #[case("-a", false, false, true)]
    #[case("-abc", false, false, true)]
    #[case("abc", false, false, false)]
    #[case("", false, false, false)]
    fn token_shapes(
        #[case] token: &str,
        #[case] separator: bool,
        #[case] long: bool,
        #[case] short: bool,
    ) {
        assert_eq!(is_separator(token), separator);
        assert_eq!(is_long_option(token), long);
        assert_eq!(is_short_option(token), short);
    }
}
