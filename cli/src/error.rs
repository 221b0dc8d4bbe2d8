//! Command execution errors.

use flagbind_core::BindError;
use thiserror::Error;

/// Errors raised while resolving and executing a command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// The first positional token named no subcommand and the parent is
    /// not runnable.
    #[error("unknown command {name:?} for {parent:?}")]
    UnknownCommand {
        /// The token that matched no subcommand.
        name: String,
        /// The command it was looked up under.
        parent: String,
    },
    /// A flag token matched no flag on the target command or any of its
    /// ancestors' persistent flags.
    #[error("unknown flag {name:?} for command {command:?}")]
    UnknownFlag {
        /// The flag name as written, without dashes.
        name: String,
        /// The command the flag was applied to.
        command: String,
    },
    /// A non-boolean flag reached the end of the argument list without a
    /// value token.
    #[error("flag {name:?} needs a value")]
    MissingValue {
        /// The flag missing its value.
        name: String,
    },
    /// A flag marked required was never supplied.
    #[error("required flag {name:?} not set")]
    MissingRequiredFlag {
        /// The missing flag.
        name: String,
    },
    /// The resolved command has no run function and no matching child.
    #[error("command {command:?} is not runnable")]
    NotRunnable {
        /// The command that cannot run.
        command: String,
    },
    /// A binding or token-application failure from the engine.
    #[error(transparent)]
    Bind(#[from] BindError),
    /// The command's run function failed.
    #[error("command failed: {0}")]
    Run(#[source] Box<dyn std::error::Error + Send + Sync>),
}
