//! Bound-flag registry.
//!
//! The registry is the bind-time catalog of everything an input exposes:
//! each flag and positional argument, its attributes, its value type, and
//! its default rendering. Lookups drive flag application and help output;
//! [`BoundFlag::cmd_string`] reconstructs the command-line form of a
//! value for logging and replay.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::error::BindError;
use crate::spec::{ArgSpec, FlagSpec};

/// A flag or positional argument registered by a bind pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundFlag {
    /// Bound name.
    pub name: String,
    /// One-letter shorthand, empty for none.
    pub shorthand: String,
    /// Usage text.
    pub usage: String,
    /// Whether the flag must be supplied.
    pub required: bool,
    /// Whether the flag is visible to descendant commands.
    pub persistent: bool,
    /// Whether the flag is hidden from help output.
    pub hidden: bool,
    /// Position for positional arguments, always set once registered.
    pub arg_order: Option<usize>,
    /// Metadata strings carried from the annotation.
    pub annotations: Vec<String>,
    /// Value type vocabulary name, e.g. `"bool"` or `"stringSlice"`.
    pub value_type: String,
    /// Rendering of the value at bind time, `None` when unset.
    pub default: Option<String>,
    /// Whether this entry is a positional argument.
    pub is_arg: bool,
    /// Whether trailing positional tokens may collapse into this value.
    pub csv_slice: bool,
}

impl BoundFlag {
    pub(crate) fn from_flag(spec: FlagSpec, value_type: &str, default: Option<String>, csv_slice: bool) -> Self {
        BoundFlag {
            name: spec.name,
            shorthand: spec.shorthand,
            usage: spec.usage,
            required: spec.required,
            persistent: spec.persistent,
            hidden: spec.hidden,
            arg_order: None,
            annotations: spec.annotations,
            value_type: value_type.to_string(),
            default,
            is_arg: false,
            csv_slice,
        }
    }

    pub(crate) fn from_arg(spec: ArgSpec, value_type: &str, default: Option<String>, csv_slice: bool) -> Self {
        BoundFlag {
            name: spec.name,
            shorthand: String::new(),
            usage: spec.usage,
            required: false,
            persistent: false,
            hidden: false,
            arg_order: spec.order,
            annotations: spec.annotations,
            value_type: value_type.to_string(),
            default,
            is_arg: true,
            csv_slice,
        }
    }

    /// Reconstructs the command-line tokens that would produce `value`.
    ///
    /// An unset or empty value yields no tokens. Boolean flags render as
    /// `--name` when true and `--name=false` when false; other flags
    /// yield the name token followed by the value token; positional
    /// arguments yield the bare value.
    ///
    /// # Examples
    ///
    /// ```
    /// use flagbind_core::{Bindable, BindError, Binder, FieldCollector};
    ///
    /// struct Opts { force: bool }
    /// impl Bindable for Opts {
    ///     fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
    ///         fields.bind("force", &mut self.force, "flag,force,overwrite")
    ///     }
    /// }
    ///
    /// let binder = Binder::bind(Opts { force: true }).unwrap();
    /// let flag = binder.registry().flag("force").unwrap();
    /// assert_eq!(flag.cmd_string(Some("true")), ["--force"]);
    /// assert_eq!(flag.cmd_string(Some("false")), ["--force=false"]);
    /// assert!(flag.cmd_string(None).is_empty());
    /// ```
    pub fn cmd_string(&self, value: Option<&str>) -> Vec<String> {
        let value = match value {
            Some(v) if !v.is_empty() => v,
            _ => return Vec::new(),
        };
        if self.is_arg {
            return vec![value.to_string()];
        }
        if self.value_type == "bool" {
            return if value == "false" {
                vec![format!("--{}=false", self.name)]
            } else {
                vec![format!("--{}", self.name)]
            };
        }
        vec![format!("--{}", self.name), value.to_string()]
    }
}

/// Catalog of the flags and positional arguments bound from one input.
///
/// Flags are kept in name order; positional arguments in their final
/// application order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Registry {
    flags: BTreeMap<String, BoundFlag>,
    args: Vec<BoundFlag>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Registry::default()
    }

    pub(crate) fn insert_flag(&mut self, flag: BoundFlag) -> Result<(), BindError> {
        if self.flags.contains_key(&flag.name) {
            return Err(BindError::DuplicateName {
                name: flag.name,
            });
        }
        self.flags.insert(flag.name.clone(), flag);
        Ok(())
    }

    /// Installs the positional arguments, deciding their final order.
    ///
    /// Argument names must be unique, and distinct from every flag
    /// name. Either every argument carries an explicit order or none
    /// does. Explicit orders must form a permutation of `0..n`; without
    /// them the declaration order is kept. Each argument's `arg_order`
    /// is rewritten to its final position.
    pub(crate) fn set_args(&mut self, mut args: Vec<BoundFlag>) -> Result<(), BindError> {
        let mut names: HashSet<&str> = HashSet::new();
        for a in &args {
            if self.flags.contains_key(&a.name) || !names.insert(&a.name) {
                return Err(BindError::DuplicateName {
                    name: a.name.clone(),
                });
            }
        }

        let explicit = args.iter().filter(|a| a.arg_order.is_some()).count();
        if explicit != 0 && explicit != args.len() {
            let unordered = args
                .iter()
                .find(|a| a.arg_order.is_none())
                .map(|a| a.name.clone())
                .unwrap_or_default();
            return Err(BindError::InvalidOrdering {
                field: unordered,
                reason: "either all arguments specify an order or none does".to_string(),
            });
        }
        if explicit == args.len() && !args.is_empty() {
            let mut seen = vec![false; args.len()];
            for a in &args {
                let order = a.arg_order.unwrap_or(0);
                if order >= args.len() {
                    return Err(BindError::InvalidOrdering {
                        field: a.name.clone(),
                        reason: format!("order {order} out of range 0..{}", args.len()),
                    });
                }
                if seen[order] {
                    return Err(BindError::InvalidOrdering {
                        field: a.name.clone(),
                        reason: format!("order {order} used twice"),
                    });
                }
                seen[order] = true;
            }
            args.sort_by_key(|a| a.arg_order.unwrap_or(0));
        }
        for (i, a) in args.iter_mut().enumerate() {
            a.arg_order = Some(i);
        }
        self.args = args;
        Ok(())
    }

    /// Validates cross-flag constraints after every entry is registered.
    pub(crate) fn finalize(&self) -> Result<(), BindError> {
        let mut shorthands: HashMap<&str, &str> = HashMap::new();
        for flag in self.flags.values() {
            if flag.shorthand.is_empty() {
                continue;
            }
            if let Some(first) = shorthands.insert(&flag.shorthand, &flag.name) {
                return Err(BindError::DuplicateShorthand {
                    shorthand: flag.shorthand.clone(),
                    first: first.to_string(),
                    second: flag.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Looks up a flag by name.
    pub fn flag(&self, name: &str) -> Option<&BoundFlag> {
        self.flags.get(name)
    }

    /// Looks up a flag by its one-letter shorthand.
    pub fn flag_by_shorthand(&self, shorthand: &str) -> Option<&BoundFlag> {
        self.flags.values().find(|f| f.shorthand == shorthand)
    }

    /// All flags in name order.
    pub fn flags(&self) -> impl Iterator<Item = &BoundFlag> {
        self.flags.values()
    }

    /// All positional arguments in application order.
    pub fn args(&self) -> &[BoundFlag] {
        &self.args
    }

    /// Serializes the registry as pretty-printed JSON, for dumping a
    /// command's surface to tooling or test fixtures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
