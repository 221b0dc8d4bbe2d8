//! Declarative binding of struct fields to command-line flags and
//! positional arguments.
//!
//! An input struct declares its bindings by implementing [`Bindable`]:
//! each field is pushed into a [`FieldCollector`] together with a compact
//! annotation string describing how it appears on the command line.
//! [`Binder::bind`] validates the declarations, catalogs them in a
//! [`Registry`], and then parses command-line tokens straight into the
//! struct's fields.
//!
//! Annotations look like struct tags:
//!
//! - `"flag,<name>,<usage>,<shorthand>,<persistent>,<required>,<hidden>"`
//! - `"arg,<name>,<usage>,<order>"`
//!
//! Trailing attributes may be omitted; an empty annotation leaves the
//! field unbound.
//!
//! # Examples
//!
//! ```
//! use flagbind_core::{Bindable, BindError, Binder, FieldCollector};
//!
//! #[derive(Default)]
//! struct Opts {
//!     password: String,
//!     no_cert: bool,
//!     domains: Vec<String>,
//! }
//!
//! impl Bindable for Opts {
//!     fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
//!         fields.bind(
//!             "password",
//!             &mut self.password,
//!             "flag,password,password for the user's key,x",
//!         )?;
//!         fields.bind(
//!             "no_cert",
//!             &mut self.no_cert,
//!             "flag,no-cert,do not verify server certificates",
//!         )?;
//!         fields.bind("domains", &mut self.domains, "arg,domains,domains to probe,0")
//!     }
//! }
//!
//! let mut binder = Binder::bind(Opts::default()).unwrap();
//! binder.set_flag("no-cert", "true").unwrap();
//! binder.apply_args(&["a.example".to_string(), "b.example".to_string()]).unwrap();
//!
//! let opts = binder.into_input();
//! assert!(opts.no_cert);
//! assert_eq!(opts.domains, ["a.example", "b.example"]);
//! ```
//!
//! Types outside the builtin set either implement [`FlagValue`] and are
//! bound with [`FieldCollector::bind_value`], or are claimed by a custom
//! [`Flagger`] passed to [`Binder::bind_custom`].

mod binder;
mod collect;
mod dispatch;
mod error;
mod registry;
mod spec;
mod value;

pub use binder::Binder;
pub use collect::{Bindable, FieldCollector};
pub use dispatch::{Flagged, Flagger};
pub use error::{BindError, ValueError};
pub use registry::{BoundFlag, Registry};
pub use spec::{ArgSpec, FieldSpec, FlagSpec, parse_spec};
pub use value::FlagValue;
