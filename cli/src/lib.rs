//! Command-tree hosting for bound inputs.
//!
//! This crate puts [`flagbind_core`] bindings on a command line: a
//! [`Command`] tree names the commands an application exposes, each
//! runnable command owns a bound input, and [`execute`] resolves argv
//! against the tree, applying flags (including ancestors' persistent
//! flags), positional arguments, and required-flag checks before running
//! the target.
//!
//! # Examples
//!
//! ```
//! use flagbind_cli::{Command, Outcome, execute};
//! use flagbind_core::{Bindable, BindError, FieldCollector};
//!
//! #[derive(Default)]
//! struct GetOpts {
//!     id: String,
//! }
//!
//! impl Bindable for GetOpts {
//!     fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
//!         fields.bind("id", &mut self.id, "arg,id,object id,0")
//!     }
//! }
//!
//! let mut root = Command::new("app").child(
//!     Command::new("get")
//!         .short("Fetch an object")
//!         .bind(GetOpts::default(), |opts| {
//!             assert_eq!(opts.id, "obj-1");
//!             Ok(())
//!         })
//!         .unwrap(),
//! );
//!
//! let argv = vec!["get".to_string(), "obj-1".to_string()];
//! assert!(matches!(execute(&mut root, &argv).unwrap(), Outcome::Ran));
//! ```

mod command;
mod error;
mod exec;
mod help;
mod token;

pub use command::Command;
pub use error::CliError;
pub use exec::{Outcome, execute};
pub use help::render;
pub use token::FlagToken;
