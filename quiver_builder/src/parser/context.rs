use std::collections::{HashMap, HashSet};

use crate::api::{Argument, ArgumentGroup, Opt, OptionGroup};
use crate::constant::COMMAND_NAME_DEST;
use crate::error::{DefinitionError, Interrupt, UsageError};
use crate::model::{Nargs, Value, Values};

/// Where an option key resolves to: the option's group and index, and whether it is an "off" key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) group: usize,
    pub(crate) index: usize,
    pub(crate) off: bool,
}

/// The immutable, pre-computed shape of a command's declarations.
///
/// Built (and validated) once when the command is built, then shared by every parse.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Layout {
    // (group, index) of each argument, flattened in declaration order.
    positions: Vec<(usize, usize)>,
    keys: HashMap<String, Slot>,
}

fn claim<'a>(dests: &mut HashSet<&'a str>, dest: &'a str) -> Result<(), DefinitionError> {
    if !dest.is_empty() && !dests.insert(dest) {
        return Err(DefinitionError::DuplicateDestination(dest.to_string()));
    }

    Ok(())
}

impl Layout {
    pub(crate) fn new(
        argument_groups: &[ArgumentGroup],
        option_groups: &[OptionGroup],
    ) -> Result<Self, DefinitionError> {
        let mut positions = Vec::default();
        let mut keys = HashMap::default();
        let mut dests = HashSet::default();

        for (group, argument_group) in argument_groups.iter().enumerate() {
            for (index, argument) in argument_group.arguments().iter().enumerate() {
                claim(&mut dests, argument.dest())?;
                positions.push((group, index));
            }
        }

        for (group, option_group) in option_groups.iter().enumerate() {
            for (index, option) in option_group.options().iter().enumerate() {
                claim(&mut dests, option.dest())?;

                for (key, off) in option.keys() {
                    if keys
                        .insert(key.to_string(), Slot { group, index, off })
                        .is_some()
                    {
                        return Err(DefinitionError::DuplicateOption(key.to_string()));
                    }
                }
            }
        }

        Ok(Self { positions, keys })
    }

    pub(crate) fn position(&self, position: usize) -> Option<(usize, usize)> {
        self.positions.get(position).copied()
    }

    pub(crate) fn lookup(&self, key: &str) -> Result<Slot, UsageError> {
        self.keys
            .get(key)
            .copied()
            .ok_or_else(|| UsageError::UnknownOption(key.to_string()))
    }
}

/// The per-parse occurrence state of one group's members.
#[derive(Debug)]
pub(crate) struct GroupNode {
    occurred: Vec<bool>,
    num_occurred: usize,
}

impl GroupNode {
    fn new(size: usize) -> Self {
        Self {
            occurred: vec![false; size],
            num_occurred: 0,
        }
    }

    fn occurred(&self, index: usize) -> bool {
        self.occurred[index]
    }

    /// Mark the member as occurred.
    /// Only its first occurrence counts towards the group.
    fn occur(&mut self, index: usize) {
        if !self.occurred[index] {
            self.occurred[index] = true;
            self.num_occurred += 1;
        }
    }
}

/// The mutable overlay for one parse: occurrence state parallel to the (borrowed) declarations.
#[derive(Debug)]
pub(crate) struct NodeTree<'a> {
    argument_groups: &'a [ArgumentGroup],
    option_groups: &'a [OptionGroup],
    arguments: Vec<GroupNode>,
    options: Vec<GroupNode>,
}

impl<'a> NodeTree<'a> {
    pub(crate) fn new(argument_groups: &'a [ArgumentGroup], option_groups: &'a [OptionGroup]) -> Self {
        Self {
            argument_groups,
            option_groups,
            arguments: argument_groups
                .iter()
                .map(|group| GroupNode::new(group.arguments().len()))
                .collect(),
            options: option_groups
                .iter()
                .map(|group| GroupNode::new(group.options().len()))
                .collect(),
        }
    }

    pub(crate) fn argument(&self, (group, index): (usize, usize)) -> &'a Argument {
        &self.argument_groups[group].arguments()[index]
    }

    pub(crate) fn option(&self, slot: Slot) -> &'a Opt {
        &self.option_groups[slot.group].options()[slot.index]
    }

    fn store_argument(
        &mut self,
        values: &mut Values,
        position: (usize, usize),
        token: &str,
    ) -> Result<(), UsageError> {
        self.argument(position).store(values, token)?;
        self.arguments[position.0].occur(position.1);
        Ok(())
    }

    fn store_option(
        &mut self,
        values: &mut Values,
        slot: Slot,
        token: &str,
        key: &str,
    ) -> Result<(), UsageError> {
        let first = !self.options[slot.group].occurred(slot.index);
        self.option(slot).store(values, token, key, first)?;
        self.options[slot.group].occur(slot.index);
        Ok(())
    }

    fn store_const(&mut self, values: &mut Values, slot: Slot) -> Result<(), Interrupt> {
        let first = !self.options[slot.group].occurred(slot.index);
        self.option(slot).store_const(values, slot.off, first)?;
        self.options[slot.group].occur(slot.index);
        Ok(())
    }

    /// Fill in the defaults of everything which did not occur, then check the group constraints.
    fn finalize(&self, values: &mut Values) -> Result<(), UsageError> {
        for (group, node) in self.argument_groups.iter().zip(&self.arguments) {
            for (index, argument) in group.arguments().iter().enumerate() {
                if !node.occurred(index) {
                    if argument.is_required() {
                        return Err(UsageError::TooFewArguments);
                    }

                    argument.store_default(values)?;
                }
            }
        }

        for (group, node) in self.option_groups.iter().zip(&self.options) {
            for (index, option) in group.options().iter().enumerate() {
                if !node.occurred(index) {
                    if option.is_required() {
                        return Err(UsageError::MissingOption(option.format_decls()));
                    }

                    option.store_default(values)?;
                }
            }
        }

        for (group, node) in self.argument_groups.iter().zip(&self.arguments) {
            group.check(node.num_occurred)?;
        }

        for (group, node) in self.option_groups.iter().zip(&self.options) {
            group.check(node.num_occurred)?;
        }

        Ok(())
    }
}

/// The state of one parse: the token cursor, the argument position, the node tree and the output values.
#[derive(Debug)]
pub(crate) struct Context<'a, 't> {
    argv: &'t [&'t str],
    index: usize,
    current: Option<&'t str>,
    position: usize,
    tree: NodeTree<'a>,
    values: Values,
}

impl<'a, 't> Context<'a, 't> {
    pub(crate) fn new(argv: &'t [&'t str], tree: NodeTree<'a>) -> Self {
        Self {
            argv,
            index: 0,
            current: None,
            position: 0,
            tree,
            values: Values::default(),
        }
    }

    /// Advance the cursor, returning the new current token.
    pub(crate) fn next_token(&mut self) -> Option<&'t str> {
        self.current = self.argv.get(self.index).copied();

        if self.current.is_some() {
            self.index += 1;
        }

        self.current
    }

    /// The token most recently returned by [`Context::next_token`].
    pub(crate) fn current_token(&self) -> Option<&'t str> {
        self.current
    }

    /// The tokens after the cursor.
    pub(crate) fn remaining(&self) -> Vec<String> {
        self.argv[self.index..]
            .iter()
            .map(|token| token.to_string())
            .collect()
    }

    pub(crate) fn option(&self, slot: Slot) -> &'a Opt {
        self.tree.option(slot)
    }

    /// The argument which receives the next positional token.
    /// A variadic argument keeps the position, absorbing every subsequent positional token.
    pub(crate) fn next_argument(&mut self, layout: &Layout) -> Result<(usize, usize), UsageError> {
        let position = layout
            .position(self.position)
            .ok_or(UsageError::TooManyArguments)?;

        if self.tree.argument(position).nargs() == Nargs::One {
            self.position += 1;
        }

        Ok(position)
    }

    pub(crate) fn store_argument(
        &mut self,
        position: (usize, usize),
        token: &str,
    ) -> Result<(), UsageError> {
        self.tree.store_argument(&mut self.values, position, token)
    }

    pub(crate) fn store_option(&mut self, slot: Slot, token: &str, key: &str) -> Result<(), UsageError> {
        self.tree.store_option(&mut self.values, slot, token, key)
    }

    pub(crate) fn store_const(&mut self, slot: Slot) -> Result<(), Interrupt> {
        self.tree.store_const(&mut self.values, slot)
    }

    /// Store the current token as the sub-command name.
    pub(crate) fn capture_command(&mut self) {
        if let Some(name) = self.current_token() {
            self.values
                .insert(COMMAND_NAME_DEST, Value::Str(name.to_string()));
        }
    }

    pub(crate) fn finalize(self) -> Result<Values, UsageError> {
        let Context {
            tree, mut values, ..
        } = self;
        tree.finalize(&mut values)?;
        Ok(values)
    }
}
