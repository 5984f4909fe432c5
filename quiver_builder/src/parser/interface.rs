#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The output sink of a [`TerminalPrinter`](crate::TerminalPrinter).
pub trait UserInterface {
    /// Print one line of regular output (help, version).
    fn print(&self, message: String);

    /// Print one line of error output.
    fn print_error(&self, message: String);
}

/// A [`UserInterface`] over stdout/stderr.
#[derive(Debug, Default)]
pub struct ConsoleInterface {}

impl UserInterface for ConsoleInterface {
    fn print(&self, message: String) {
        println!("{message}");
    }

    fn print_error(&self, message: String) {
        eprintln!("{message}");
    }
}

// We'll target 95% of the total width, to ensure the renderer doesn't literally use the full space.
const TARGET_TOTAL_FACTOR: f64 = 0.95;

// Let's assume the average word length is 5.
// Then 17 is a good minimum, because it allows precisely 3 words with a space between them.
pub(crate) const MINIMUM_MIDDLE_WIDTH: usize = 17;

fn width(text: &str) -> usize {
    text.chars().count()
}

/// Renders two columns: a fixed-width left column, and a wrapped middle column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnRenderer {
    indent: usize,
    padding: usize,
    left: usize,
    middle: usize,
}

impl ColumnRenderer {
    /// Produce a renderer based off the provided widths.
    /// This renderer will use a heuristic to chose the middle width.
    pub(crate) fn guided(
        indent: usize,
        padding: usize,
        left: usize,
        middle: usize,
        total_width: usize,
    ) -> Self {
        let non_middle = indent + left + padding;
        let target_total_width = (total_width as f64 * TARGET_TOTAL_FACTOR) as usize;
        let guided_middle = std::cmp::max(middle, MINIMUM_MIDDLE_WIDTH);

        if guided_middle + non_middle <= target_total_width {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} and middle fit within the target total {target_total_width}.  Selecting middle: {guided_middle}.");
            }

            Self::new(indent, padding, left, guided_middle)
        } else if non_middle < total_width {
            let calculated_middle = std::cmp::max(total_width - non_middle, MINIMUM_MIDDLE_WIDTH);

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} fit within the total {total_width}.  Selecting middle: {calculated_middle}.");
            }

            Self::new(indent, padding, left, calculated_middle)
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Columns {non_middle} do not fit within the total {total_width}.  Selecting middle: {MINIMUM_MIDDLE_WIDTH}.");
            }

            Self::new(indent, padding, left, MINIMUM_MIDDLE_WIDTH)
        }
    }

    /// Produce a renderer based off the provided widths.
    /// The middle must be at least 2 wide (so we can hyphenate).
    pub(crate) fn new(indent: usize, padding: usize, left: usize, middle: usize) -> Self {
        Self {
            indent,
            padding,
            left,
            middle: std::cmp::max(middle, 2),
        }
    }

    pub(crate) fn render(&self, left: &str, middle: &str) -> Vec<String> {
        let ColumnRenderer {
            indent,
            padding,
            left: left_width,
            middle: middle_width,
        } = *self;
        let mut out = Vec::default();

        for (i, part) in chunk(middle, middle_width).iter().enumerate() {
            let left = if i == 0 { left } else { "" };
            out.push(format!(
                "{:indent$}{:left_width$}{:padding$}{part}",
                "", left, ""
            ));
        }

        if out.is_empty() {
            out.push(format!("{:indent$}{left}", ""));
        }

        out
    }
}

fn chunk(paragraph: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::default();
    let mut current = String::default();

    for word in paragraph.split_whitespace() {
        if current.is_empty() {
            hyphenate(width, &mut lines, &mut current, word);
        } else if self::width(&current) + self::width(word) < width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            hyphenate(width, &mut lines, &mut current, word);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

fn hyphenate(width: usize, lines: &mut Vec<String>, current: &mut String, word: &str) {
    let characters: Vec<char> = word.chars().collect();
    let increment = width - 1;
    let mut left = 0;

    while left + width < characters.len() {
        let piece: String = characters[left..left + increment].iter().collect();
        lines.push(format!("{piece}-"));
        left += increment;
    }

    current.extend(&characters[left..]);
}


#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn column_renderer_simple() {
        let cr = ColumnRenderer::new(0, 4, 5, 23);

        assert_eq!(
            cr.render("abc", "something"),
            vec!["abc      something".to_string()]
        );
        assert_eq!(
            cr.render("abc", "  something  "),
            vec!["abc      something".to_string()]
        );
        assert_eq!(
            cr.render("abc12", "something pieces full"),
            vec!["abc12    something pieces full".to_string()]
        );
        assert_eq!(
            cr.render("abc", "something pieces full more stuff"),
            vec![
                "abc      something pieces full".to_string(),
                "         more stuff".to_string(),
            ]
        );
        assert_eq!(
            cr.render("abc", "something pieces fullest more stuff extra     "),
            vec![
                "abc      something pieces".to_string(),
                "         fullest more stuff".to_string(),
                "         extra".to_string(),
            ]
        );
    }

    #[test]
    fn column_renderer_middle_overflow() {
        let cr = ColumnRenderer::new(0, 4, 5, 23);

        assert_eq!(
            cr.render("abc", "somethingxpiecesxfuller"),
            vec!["abc      somethingxpiecesxfuller".to_string()]
        );
        assert_eq!(
            cr.render("abc", "somethingxpiecesxfullerandthenwecontinueforalongtime"),
            vec![
                "abc      somethingxpiecesxfulle-".to_string(),
                "         randthenwecontinuefora-".to_string(),
                "         longtime".to_string(),
            ]
        );
    }

    #[test]
    fn column_renderer_middle_empty() {
        let cr = ColumnRenderer::new(2, 2, 5, 20);

        assert_eq!(cr.render("abc", ""), vec!["  abc".to_string()]);
        assert_eq!(cr.render("abc", "   "), vec!["  abc".to_string()]);
    }

    #[test]
    fn column_renderer_indent() {
        let cr = ColumnRenderer::new(2, 2, 5, 10);

        assert_eq!(
            cr.render("abc", "one two three"),
            vec!["  abc    one two".to_string(), "         three".to_string()]
        );
    }

    #[test]
    fn column_renderer_unicode() {
        let cr = ColumnRenderer::new(0, 1, 3, 4);

        assert_eq!(
            cr.render("é", "ééééé"),
            vec!["é   ééé-".to_string(), "    éé".to_string()]
        );
    }

    #[rstest]
    #[case(100, 31)]
    #[case(60, 31)]
    #[case(40, 21)]
    #[case(30, 17)]
    #[case(10, 17)]
    fn column_renderer_guided(#[case] total: usize, #[case] expected: usize) {
        let cr = ColumnRenderer::guided(2, 2, 15, 31, total);

        assert_eq!(cr, ColumnRenderer::new(2, 2, 15, expected));
    }

    #[test]
    fn column_renderer_guided_small_middle() {
        let cr = ColumnRenderer::guided(2, 2, 15, 3, 100);

        assert_eq!(cr, ColumnRenderer::new(2, 2, 15, MINIMUM_MIDDLE_WIDTH));
    }
}
