//! The binding engine.
//!
//! A [`Binder`] owns a [`Bindable`] input and its bind-time [`Registry`].
//! Binding runs one collect pass to validate the declarations and record
//! every flag and argument; later mutation passes (setting a flag,
//! applying positional tokens) re-collect so that the handles borrow the
//! input only for the duration of the pass.
//!
//! # Examples
//!
//! ```
//! use flagbind_core::{Bindable, BindError, Binder, FieldCollector};
//!
//! #[derive(Default)]
//! struct Opts {
//!     id: String,
//!     replicas: i64,
//! }
//!
//! impl Bindable for Opts {
//!     fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
//!         fields.bind("id", &mut self.id, "flag,id,content id,i,,true")?;
//!         fields.bind("replicas", &mut self.replicas, "flag,replicas,copy count")
//!     }
//! }
//!
//! let mut binder = Binder::bind(Opts::default()).unwrap();
//! binder.set_flag("id", "iq__1234").unwrap();
//! binder.set_flag("replicas", "3").unwrap();
//! assert_eq!(binder.input().id, "iq__1234");
//! assert_eq!(binder.input().replicas, 3);
//! assert_eq!(binder.command_line(), ["--id", "iq__1234", "--replicas", "3"]);
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::collect::{Bindable, FieldCollector, RawField};
use crate::dispatch::{Flagger, Handle, resolve};
use crate::error::BindError;
use crate::registry::{BoundFlag, Registry};
use crate::spec::FieldSpec;

/// Binds an input's fields and applies command-line values to them.
pub struct Binder<S: Bindable> {
    input: S,
    flagger: Option<Box<dyn Flagger>>,
    registry: Registry,
}

fn collect_fields<'a, S: Bindable>(input: &'a mut S) -> Result<Vec<RawField<'a>>, BindError> {
    let mut collector = FieldCollector::new();
    input.collect(&mut collector)?;
    Ok(collector.resolve())
}

impl<S: Bindable> Binder<S> {
    /// Binds `input` using only the builtin type conversions.
    ///
    /// # Errors
    ///
    /// Any declaration problem fails the whole bind: malformed
    /// annotations, unsupported field types, duplicate names or
    /// shorthands, and inconsistent argument ordering.
    pub fn bind(input: S) -> Result<Self, BindError> {
        Binder::bind_custom(input, None)
    }

    /// Binds `input`, consulting `flagger` for non-builtin field types.
    pub fn bind_custom(mut input: S, flagger: Option<Box<dyn Flagger>>) -> Result<Self, BindError> {
        let registry = {
            let fields = collect_fields(&mut input)?;
            let mut registry = Registry::new();
            let mut args = Vec::new();
            for field in fields {
                let RawField { spec, target, decl, .. } = field;
                let handle = resolve(spec.name(), target, flagger.as_deref())?;
                let value_type = handle.value.type_name();
                let default = handle.value.render();
                match spec {
                    FieldSpec::Flag(f) => registry.insert_flag(BoundFlag::from_flag(
                        f,
                        value_type,
                        default,
                        handle.csv_slice,
                    ))?,
                    FieldSpec::Arg(a) => args.push((
                        decl,
                        BoundFlag::from_arg(a, value_type, default, handle.csv_slice),
                    )),
                }
            }
            args.sort_by_key(|(decl, _)| *decl);
            registry.set_args(args.into_iter().map(|(_, a)| a).collect())?;
            registry.finalize()?;
            registry
        };
        debug!(
            flags = registry.flags().count(),
            args = registry.args().len(),
            "Bound input"
        );
        Ok(Binder {
            input,
            flagger,
            registry,
        })
    }

    /// Sets the flag `name` from a command-line token.
    ///
    /// # Errors
    ///
    /// [`BindError::NotBound`] when no flag of that name was registered,
    /// [`BindError::InvalidValue`] when the token does not parse.
    pub fn set_flag(&mut self, name: &str, token: &str) -> Result<(), BindError> {
        if self.registry.flag(name).is_none() {
            return Err(BindError::NotBound {
                name: name.to_string(),
            });
        }
        let Binder { input, flagger, .. } = self;
        let fields = collect_fields(input)?;
        for field in fields {
            if field.spec.is_arg() || field.spec.name() != name {
                continue;
            }
            let mut handle = resolve(name, field.target, flagger.as_deref())?;
            return handle.value.set(token).map_err(|source| BindError::InvalidValue {
                field: name.to_string(),
                token: token.to_string(),
                source,
            });
        }
        Err(BindError::NotBound {
            name: name.to_string(),
        })
    }

    /// Applies positional tokens to the bound arguments, in order.
    ///
    /// Empty tokens leave their slot untouched, tokens beyond the last
    /// slot are ignored, and when the last slot is a slice the surplus
    /// tokens collapse into it as a comma-separated list.
    pub fn apply_args(&mut self, tokens: &[String]) -> Result<(), BindError> {
        let Binder { input, flagger, registry } = self;
        let slots = registry.args();
        if slots.is_empty() || tokens.is_empty() {
            return Ok(());
        }

        let fields = collect_fields(input)?;
        let mut handles: HashMap<String, Handle<'_>> = HashMap::new();
        for field in fields {
            if !field.spec.is_arg() {
                continue;
            }
            let name = field.spec.name().to_string();
            let handle = resolve(&name, field.target, flagger.as_deref())?;
            handles.insert(name, handle);
        }

        let variadic_tail = slots
            .last()
            .map(|s| s.csv_slice && tokens.len() > slots.len())
            .unwrap_or(false);

        for (i, slot) in slots.iter().enumerate() {
            let token;
            let token = if variadic_tail && i == slots.len() - 1 {
                token = tokens[i..].join(",");
                token.as_str()
            } else if let Some(t) = tokens.get(i) {
                t.as_str()
            } else {
                break;
            };
            if token.is_empty() {
                continue;
            }
            debug!(arg = %slot.name, token, "Applying positional argument");
            let handle = handles
                .get_mut(&slot.name)
                .ok_or_else(|| BindError::NotBound {
                    name: slot.name.clone(),
                })?;
            handle
                .value
                .set(token)
                .map_err(|source| BindError::InvalidValue {
                    field: slot.name.clone(),
                    token: token.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Reconstructs the command line that would reproduce the current
    /// values: flags in name order, then positional arguments.
    pub fn command_line(&mut self) -> Vec<String> {
        let mut rendered: HashMap<String, Option<String>> = HashMap::new();
        {
            let Binder { input, flagger, .. } = self;
            if let Ok(fields) = collect_fields(input) {
                for field in fields {
                    let name = field.spec.name().to_string();
                    if let Ok(handle) = resolve(&name, field.target, flagger.as_deref()) {
                        rendered.insert(name, handle.value.render());
                    }
                }
            }
        }
        let mut out = Vec::new();
        for flag in self.registry.flags() {
            let value = rendered.get(&flag.name).cloned().flatten();
            out.extend(flag.cmd_string(value.as_deref()));
        }
        for arg in self.registry.args() {
            let value = rendered.get(&arg.name).cloned().flatten();
            out.extend(arg.cmd_string(value.as_deref()));
        }
        out
    }

    /// The bound input.
    pub fn input(&self) -> &S {
        &self.input
    }

    /// The bound input, mutably.
    pub fn input_mut(&mut self) -> &mut S {
        &mut self.input
    }

    /// Consumes the binder and returns the input.
    pub fn into_input(self) -> S {
        self.input
    }

    /// The bind-time registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
