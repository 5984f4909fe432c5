use crate::api::{Argument, Opt};
use crate::error::UsageError;

/// The occurrence constraint of a group, checked against the number of distinct members which occurred.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// No constraint.
    #[default]
    Any,
    /// Every member must occur.
    All,
    /// No member may occur.
    None,
    /// At least one member must occur.
    AtLeastOne,
    /// At most one member may occur (mutual exclusion).
    AtMostOne,
    /// Precisely one member must occur.
    ExactlyOne,
}

impl GroupKind {
    /// Whether `occurred` distinct members (out of `size`) satisfy the constraint.
    pub fn check(&self, size: usize, occurred: usize) -> bool {
        match self {
            GroupKind::Any => true,
            GroupKind::All => occurred == size,
            GroupKind::None => occurred == 0,
            GroupKind::AtLeastOne => occurred >= 1,
            GroupKind::AtMostOne => occurred <= 1,
            GroupKind::ExactlyOne => occurred == 1,
        }
    }

    pub(crate) fn expectation(&self, size: usize) -> String {
        match self {
            GroupKind::Any => "any number of members".to_string(),
            GroupKind::All => format!("all {size} members"),
            GroupKind::None => "no members".to_string(),
            GroupKind::AtLeastOne => "at least 1 member".to_string(),
            GroupKind::AtMostOne => "at most 1 member".to_string(),
            GroupKind::ExactlyOne => "exactly 1 member".to_string(),
        }
    }
}

fn check(title: &str, kind: GroupKind, size: usize, actual: usize) -> Result<(), UsageError> {
    if kind.check(size, actual) {
        Ok(())
    } else {
        Err(UsageError::Group {
            title: title.to_string(),
            kind,
            size,
            actual,
        })
    }
}

/// An ordered group of positional arguments.
///
/// Arguments are matched in the order of their groups, then their order within the group.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentGroup {
    title: String,
    kind: GroupKind,
    hidden: bool,
    arguments: Vec<Argument>,
}

impl ArgumentGroup {
    /// Create an (unconstrained) argument group.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: GroupKind::Any,
            hidden: false,
            arguments: Vec::default(),
        }
    }

    /// Constrain the number of distinct arguments which may occur.
    pub fn constraint(mut self, kind: GroupKind) -> Self {
        self.kind = kind;
        self
    }

    /// Exclude this group from help.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Add an argument to the end of the group.
    pub fn add(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// The title, as shown in help.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The occurrence constraint.
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Whether the group is excluded from help.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The arguments, in order.
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub(crate) fn check(&self, occurred: usize) -> Result<(), UsageError> {
        check(&self.title, self.kind, self.arguments.len(), occurred)
    }
}

/// A group of options.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionGroup {
    title: String,
    kind: GroupKind,
    hidden: bool,
    options: Vec<Opt>,
}

impl OptionGroup {
    /// Create an (unconstrained) option group.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            kind: GroupKind::Any,
            hidden: false,
            options: Vec::default(),
        }
    }

    /// Constrain the number of distinct options which may occur.
    pub fn constraint(mut self, kind: GroupKind) -> Self {
        self.kind = kind;
        self
    }

    /// Exclude this group from help.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Add an option to the group.
    pub fn add(mut self, option: Opt) -> Self {
        self.options.push(option);
        self
    }

    /// The title, as shown in help.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The occurrence constraint.
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Whether the group is excluded from help.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// The options, in order.
    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    pub(crate) fn check(&self, occurred: usize) -> Result<(), UsageError> {
        check(&self.title, self.kind, self.options.len(), occurred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(GroupKind::Any, 2, 0, true)]
    #[case(GroupKind::Any, 2, 2, true)]
    #[case(GroupKind::All, 2, 2, true)]
    #[case(GroupKind::All, 2, 1, false)]
    #[case(GroupKind::None, 2, 0, true)]
    #[case(GroupKind::None, 2, 1, false)]
    #[case(GroupKind::AtLeastOne, 2, 0, false)]
    #[case(GroupKind::AtLeastOne, 2, 2, true)]
    #[case(GroupKind::AtMostOne, 2, 1, true)]
    #[case(GroupKind::AtMostOne, 2, 2, false)]
    #[case(GroupKind::ExactlyOne, 2, 0, false)]
    #[case(GroupKind::ExactlyOne, 2, 1, true)]
    #[case(GroupKind::ExactlyOne, 2, 2, false)]
    fn group_kind_check(
        #[case] kind: GroupKind,
        #[case] size: usize,
        #[case] occurred: usize,
        #[case] expected: bool,
    ) {
        assert_eq!(kind.check(size, occurred), expected);
    }

    #[test]
    fn option_group_check() {
        // Setup
        let group = OptionGroup::new("Mode")
            .constraint(GroupKind::AtMostOne)
            .add(Opt::flag(["--fast"]).build().unwrap())
            .add(Opt::flag(["--slow"]).build().unwrap());

        // Execute
        let error = group.check(2).unwrap_err();

        // Verify
        assert!(group.check(1).is_ok());
        assert_eq!(
            error,
            UsageError::Group {
                title: "Mode".to_string(),
                kind: GroupKind::AtMostOne,
                size: 2,
                actual: 2,
            }
        );
        assert_eq!(
            error.to_string(),
            "Group 'Mode' requires at most 1 member, got 2."
        );
    }

    #[test]
    fn argument_group_default() {
        let group = ArgumentGroup::new("Arguments").add(Argument::new("a").unwrap());
        assert_eq!(group.kind(), GroupKind::Any);
        assert!(!group.is_hidden());
        assert!(group.check(0).is_ok());
        assert_eq!(group.arguments().len(), 1);
    }
}
