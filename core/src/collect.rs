//! Field collection.
//!
//! A [`Bindable`] input declares its bound fields by pushing them into a
//! [`FieldCollector`]. Nested groups are visited through [`FieldCollector::nest`],
//! which records the nesting depth so that a field redeclared by an inner
//! group is shadowed by the outer one, the way embedded declarations
//! shadow in most struct-walking binders.
//!
//! # Examples
//!
//! ```
//! use flagbind_core::{Bindable, BindError, FieldCollector};
//!
//! #[derive(Default)]
//! struct Common {
//!     verbose: bool,
//! }
//!
//! impl Bindable for Common {
//!     fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
//!         fields.bind("verbose", &mut self.verbose, "flag,verbose,log more,v")
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Opts {
//!     common: Common,
//!     id: String,
//! }
//!
//! impl Bindable for Opts {
//!     fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError> {
//!         fields.nest("common", &mut self.common)?;
//!         fields.bind("id", &mut self.id, "arg,id,content id,0")
//!     }
//! }
//! ```

use std::any::Any;
use std::collections::HashMap;

use crate::error::BindError;
use crate::spec::{FieldSpec, parse_spec};
use crate::value::FlagValue;

/// An input whose fields can be bound to flags and positional arguments.
pub trait Bindable {
    /// Declares the bound fields of `self`.
    ///
    /// Implementations call [`FieldCollector::bind`] for each field and
    /// [`FieldCollector::nest`] for each nested group, in declaration
    /// order. Declaration order matters: it breaks ties when positional
    /// arguments carry no explicit order.
    fn collect<'a>(&'a mut self, fields: &mut FieldCollector<'a>) -> Result<(), BindError>;
}

/// Storage reference for a collected field.
pub(crate) enum Target<'a> {
    /// A builtin-typed field, matched by runtime type probing.
    Dynamic(&'a mut dyn Any),
    /// A field that carries its own conversion.
    Value(&'a mut dyn FlagValue),
}

/// A collected field before name resolution.
pub(crate) struct RawField<'a> {
    pub spec: FieldSpec,
    pub target: Target<'a>,
    pub depth: usize,
    pub decl: usize,
}

/// Accumulates field declarations during a [`Bindable::collect`] pass.
pub struct FieldCollector<'a> {
    fields: Vec<RawField<'a>>,
    depth: usize,
    decl: usize,
}

impl<'a> FieldCollector<'a> {
    pub(crate) fn new() -> Self {
        FieldCollector {
            fields: Vec::new(),
            depth: 0,
            decl: 0,
        }
    }

    fn push(&mut self, field: &str, tag: &str, meta: &str, target: Target<'a>) -> Result<(), BindError> {
        if let Some(spec) = parse_spec(field, tag, meta)? {
            self.fields.push(RawField {
                spec,
                target,
                depth: self.depth,
                decl: self.decl,
            });
        }
        self.decl += 1;
        Ok(())
    }

    /// Binds a builtin-typed field under annotation `tag`.
    ///
    /// The value's type is resolved at bind time against the builtin set
    /// (scalars, their `Vec`s, `IpAddr`, `Duration`, and the optional
    /// scalars) or against a custom [`Flagger`](crate::Flagger).
    pub fn bind<T: Any>(&mut self, field: &str, value: &'a mut T, tag: &str) -> Result<(), BindError> {
        self.bind_with_meta(field, value, tag, "")
    }

    /// Like [`FieldCollector::bind`] with a sibling metadata list.
    pub fn bind_with_meta<T: Any>(
        &mut self,
        field: &str,
        value: &'a mut T,
        tag: &str,
        meta: &str,
    ) -> Result<(), BindError> {
        self.push(field, tag, meta, Target::Dynamic(value))
    }

    /// Binds a field that supplies its own [`FlagValue`] conversion.
    pub fn bind_value<V: FlagValue>(
        &mut self,
        field: &str,
        value: &'a mut V,
        tag: &str,
    ) -> Result<(), BindError> {
        self.bind_value_with_meta(field, value, tag, "")
    }

    /// Like [`FieldCollector::bind_value`] with a sibling metadata list.
    pub fn bind_value_with_meta<V: FlagValue>(
        &mut self,
        field: &str,
        value: &'a mut V,
        tag: &str,
        meta: &str,
    ) -> Result<(), BindError> {
        self.push(field, tag, meta, Target::Value(value))
    }

    /// Collects the fields of a nested group one level deeper.
    pub fn nest<G: Bindable>(&mut self, _field: &str, group: &'a mut G) -> Result<(), BindError> {
        self.depth += 1;
        let res = group.collect(self);
        self.depth -= 1;
        self.decl += 1;
        res
    }

    /// Like [`FieldCollector::nest`] for an optional group.
    ///
    /// # Errors
    ///
    /// [`BindError::UninitializedNesting`] when the group is `None`; a
    /// nested group must be allocated before binding.
    pub fn nest_opt<G: Bindable>(
        &mut self,
        field: &str,
        group: Option<&'a mut G>,
    ) -> Result<(), BindError> {
        match group {
            Some(g) => self.nest(field, g),
            None => Err(BindError::UninitializedNesting {
                field: field.to_string(),
            }),
        }
    }

    /// Resolves shadowing and returns the surviving fields.
    ///
    /// For each name the shallowest declaration wins. Two declarations of
    /// the same name at the same surviving depth are both kept here and
    /// rejected later as a duplicate. Output is ordered by name, then by
    /// declaration order.
    pub(crate) fn resolve(self) -> Vec<RawField<'a>> {
        let mut min_depth: HashMap<String, usize> = HashMap::new();
        for f in &self.fields {
            min_depth
                .entry(f.spec.name().to_string())
                .and_modify(|d| *d = (*d).min(f.depth))
                .or_insert(f.depth);
        }
        let mut kept: Vec<RawField<'a>> = self
            .fields
            .into_iter()
            .filter(|f| min_depth.get(f.spec.name()) == Some(&f.depth))
            .collect();
        kept.sort_by(|a, b| {
            a.spec
                .name()
                .cmp(b.spec.name())
                .then(a.decl.cmp(&b.decl))
        });
        kept
    }
}
