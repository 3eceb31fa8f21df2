//! Command registry and line dispatcher
//!
//! Commands are registered once at startup. Dispatching a line only splits
//! it on whitespace and looks the first token up: running the command is left
//! to the caller, which matches on the [`CommandKind`] of the returned
//! [`Invocation`].

use core::fmt;

use heapless::{FnvIndexMap, Vec};

use crate::config::{MAX_ARGS, MAX_BINDINGS};

/// Handler attached to a command name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// Change the TX frequency
    SetTxFreq,
    /// Start/Stop continuous transmission
    Tx,
    /// Hardware reset of the radio
    Reset,
    /// List commands
    Help,
}

/// Registration record of a console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandBinding {
    pub name: &'static str,
    pub help: &'static str,
    /// Reported when the arguments are missing or invalid
    pub usage: &'static str,
    pub requires_args: bool,
    pub kind: CommandKind,
}

/// Error while populating the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// A command with the same name is already registered
    Duplicate(&'static str),
    /// No room left for another command
    Full,
}

/// Error reported on the console for a bad command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CliError {
    UnknownCommand,
    MissingArgument { usage: &'static str },
    InvalidArgument { usage: &'static str },
    TooManyArguments { usage: &'static str },
}

impl CliError {
    /// Text printed on the console
    pub fn message(&self) -> &'static str {
        match self {
            CliError::UnknownCommand => "unknown command",
            CliError::MissingArgument { usage } |
            CliError::InvalidArgument { usage } |
            CliError::TooManyArguments { usage } => usage,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A command line resolved against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub binding: &'a CommandBinding,
    pub args: Vec<&'a str, MAX_ARGS>,
}

impl<'a> Invocation<'a> {
    pub fn kind(&self) -> CommandKind {
        self.binding.kind
    }

    /// Argument by index (0-based, command name excluded)
    pub fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args.get(idx).copied()
    }

    /// Return the single argument of the command
    pub fn single_arg(&self) -> Result<&'a str, CliError> {
        match self.args.as_slice() {
            [arg] => Ok(*arg),
            [] => Err(CliError::MissingArgument { usage: self.binding.usage }),
            _ => Err(CliError::TooManyArguments { usage: self.binding.usage }),
        }
    }
}

/// Name to command mapping, iterated in registration order
pub struct Registry {
    bindings: FnvIndexMap<&'static str, CommandBinding, MAX_BINDINGS>,
}

impl Registry {
    pub fn new() -> Self {
        Self { bindings: FnvIndexMap::new() }
    }

    /// Add a command
    pub fn register(&mut self, binding: CommandBinding) -> Result<(), RegistryError> {
        if self.bindings.contains_key(binding.name) {
            return Err(RegistryError::Duplicate(binding.name));
        }
        self.bindings
            .insert(binding.name, binding)
            .map_err(|_| RegistryError::Full)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CommandBinding> {
        self.bindings.get(name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// All commands in registration order
    pub fn iter(&self) -> impl Iterator<Item = &CommandBinding> {
        self.bindings.values()
    }

    /// Resolve a command line.
    /// Returns `Ok(None)` on a blank line.
    pub fn dispatch<'a>(&'a self, line: &'a str) -> Result<Option<Invocation<'a>>, CliError> {
        let mut tokens = line.split_whitespace();
        let Some(name) = tokens.next() else {
            return Ok(None);
        };
        let binding = self.get(name).ok_or(CliError::UnknownCommand)?;
        let mut args = Vec::new();
        for token in tokens {
            args.push(token)
                .map_err(|_| CliError::TooManyArguments { usage: binding.usage })?;
        }
        if binding.requires_args && args.is_empty() {
            return Err(CliError::MissingArgument { usage: binding.usage });
        }
        Ok(Some(Invocation { binding, args }))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
