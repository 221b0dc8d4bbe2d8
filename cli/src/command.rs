//! Command tree.
//!
//! A [`Command`] is a node in the tree the executor walks: a name and help
//! texts, child commands, and optionally a bound input whose flags and
//! positional arguments the command accepts. Binding happens at tree
//! construction time, so a malformed annotation surfaces before any
//! command line is parsed.
//!
//! # Examples
//!
//! ```
//! use flagbind_cli::Command;
//! use flagbind_core::{Bindable, BindError, FieldCollector};
//!
//! #[derive(Default)]
//! struct StartOpts {
//!     port: u16,
//! }
//!
//! impl Bindable for StartOpts {
//!     fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
//!         fields.bind("port", &mut self.port, "flag,port,listen port,p")
//!     }
//! }
//!
//! let root = Command::new("node")
//!     .short("Manage the local node")
//!     .child(
//!         Command::new("start")
//!             .short("Start the node")
//!             .bind(StartOpts::default(), |opts| {
//!                 println!("listening on {}", opts.port);
//!                 Ok(())
//!             })
//!             .unwrap(),
//!     );
//! assert_eq!(root.find("start").unwrap().name(), "start");
//! ```

use std::error::Error;

use flagbind_core::{Bindable, BindError, Binder, Flagger, Registry};

/// Type-erased access to a command's bound input.
pub(crate) trait BoundInput {
    fn registry(&self) -> &Registry;
    fn set_flag(&mut self, name: &str, token: &str) -> Result<(), BindError>;
    fn apply_args(&mut self, tokens: &[String]) -> Result<(), BindError>;
    fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>>;
    fn command_line(&mut self) -> Vec<String>;
}

struct Bound<S: Bindable> {
    binder: Binder<S>,
    run: Box<dyn FnMut(&mut S) -> Result<(), Box<dyn Error + Send + Sync>>>,
}

impl<S: Bindable> BoundInput for Bound<S> {
    fn registry(&self) -> &Registry {
        self.binder.registry()
    }

    fn set_flag(&mut self, name: &str, token: &str) -> Result<(), BindError> {
        self.binder.set_flag(name, token)
    }

    fn apply_args(&mut self, tokens: &[String]) -> Result<(), BindError> {
        self.binder.apply_args(tokens)
    }

    fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        (self.run)(self.binder.input_mut())
    }

    fn command_line(&mut self) -> Vec<String> {
        self.binder.command_line()
    }
}

/// A node in the command tree.
pub struct Command {
    name: String,
    use_line: String,
    short: String,
    long: String,
    example: String,
    aliases: Vec<String>,
    hidden: bool,
    pub(crate) children: Vec<Command>,
    pub(crate) state: Option<Box<dyn BoundInput>>,
}

impl Command {
    /// Creates a command named `name` with no children and no bound input.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Command {
            use_line: name.clone(),
            name,
            short: String::new(),
            long: String::new(),
            example: String::new(),
            aliases: Vec::new(),
            hidden: false,
            children: Vec::new(),
            state: None,
        }
    }

    /// Sets the one-line usage, e.g. `"get <id>"`.
    pub fn use_line(mut self, use_line: impl Into<String>) -> Self {
        self.use_line = use_line.into();
        self
    }

    /// Sets the short help description.
    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = short.into();
        self
    }

    /// Sets the long help description.
    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = long.into();
        self
    }

    /// Sets the example block shown in help output.
    pub fn example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    /// Adds an alternative name the command also answers to.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Hides the command from help output.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Adds a child command.
    pub fn child(mut self, child: Command) -> Self {
        self.children.push(child);
        self
    }

    /// Binds `input` to this command and installs its run function.
    ///
    /// # Errors
    ///
    /// Any declaration problem in `input` fails here, before execution.
    pub fn bind<S, F>(self, input: S, run: F) -> Result<Self, BindError>
    where
        S: Bindable + 'static,
        F: FnMut(&mut S) -> Result<(), Box<dyn Error + Send + Sync>> + 'static,
    {
        self.bind_custom(input, None, run)
    }

    /// Like [`Command::bind`], consulting `flagger` for non-builtin types.
    pub fn bind_custom<S, F>(
        mut self,
        input: S,
        flagger: Option<Box<dyn Flagger>>,
        run: F,
    ) -> Result<Self, BindError>
    where
        S: Bindable + 'static,
        F: FnMut(&mut S) -> Result<(), Box<dyn Error + Send + Sync>> + 'static,
    {
        let binder = Binder::bind_custom(input, flagger)?;
        self.state = Some(Box::new(Bound {
            binder,
            run: Box::new(run),
        }));
        Ok(self)
    }

    /// The command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The one-line usage.
    pub fn usage_line(&self) -> &str {
        &self.use_line
    }

    /// The short help description.
    pub fn short_help(&self) -> &str {
        &self.short
    }

    /// The long help description.
    pub fn long_help(&self) -> &str {
        &self.long
    }

    /// The example block.
    pub fn example_text(&self) -> &str {
        &self.example
    }

    /// Whether the command is hidden from help output.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether the command has a run function.
    pub fn is_runnable(&self) -> bool {
        self.state.is_some()
    }

    /// The child commands.
    pub fn children(&self) -> &[Command] {
        &self.children
    }

    /// Finds a direct child by name or alias.
    pub fn find(&self, name: &str) -> Option<&Command> {
        self.children
            .iter()
            .find(|c| c.name == name || c.aliases.iter().any(|a| a == name))
    }

    pub(crate) fn find_mut_index(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.name == name || c.aliases.iter().any(|a| a == name))
    }

    /// The bound-flag registry, when the command has bound input.
    pub fn registry(&self) -> Option<&Registry> {
        self.state.as_ref().map(|s| s.registry())
    }

    /// Reconstructs the command line for the bound input's current values.
    pub fn command_line(&mut self) -> Option<Vec<String>> {
        self.state.as_mut().map(|s| s.command_line())
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("children", &self.children)
            .field("runnable", &self.state.is_some())
            .finish()
    }
}
