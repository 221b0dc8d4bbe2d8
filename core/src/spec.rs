//! Binding annotation parsing.
//!
//! A field is bound by an annotation string of the form
//! `"<kind>,<name>,<usage>,<trailing...>"` where the kind token is `flag`,
//! `arg`, or empty (which defaults to `arg`). Trailing attributes may be
//! omitted from the right:
//!
//! - flag trailing fields: `shorthand, persistent, required, hidden`
//! - arg trailing fields: `order`
//!
//! A sibling metadata list (`"v1,v2,..."`) can be attached verbatim for
//! downstream consumers; the engine does not interpret it.
//!
//! # Examples
//!
//! ```
//! use flagbind_core::{FieldSpec, parse_spec};
//!
//! let spec = parse_spec("Id", "flag,id,content id,i,true,true", "")
//!     .unwrap()
//!     .unwrap();
//! match spec {
//!     FieldSpec::Flag(f) => {
//!         assert_eq!(f.name, "id");
//!         assert_eq!(f.usage, "content id");
//!         assert_eq!(f.shorthand, "i");
//!         assert!(f.persistent);
//!         assert!(f.required);
//!         assert!(!f.hidden);
//!     }
//!     FieldSpec::Arg(_) => unreachable!(),
//! }
//!
//! // Name defaults to the field name when omitted.
//! let spec = parse_spec("Token", "arg", "").unwrap().unwrap();
//! assert_eq!(spec.name(), "Token");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::BindError;

/// Specification of a flag binding.
///
/// Parsed from `"flag,<name>,<usage>,<shorthand>,<persistent>,<required>,<hidden>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagSpec {
    /// Flag name (defaults to the struct field name).
    pub name: String,
    /// Usage text shown in help output.
    pub usage: String,
    /// One-letter shorthand, or empty for none.
    pub shorthand: String,
    /// Whether the flag is visible to every descendant command.
    pub persistent: bool,
    /// Whether the flag must be supplied on the command line.
    pub required: bool,
    /// Whether the flag is hidden from help output.
    pub hidden: bool,
    /// Free-form metadata strings attached by the sibling annotation.
    pub annotations: Vec<String>,
}

/// Specification of a positional-argument binding.
///
/// Parsed from `"arg,<name>,<usage>,<order>"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgSpec {
    /// Argument name (defaults to the struct field name).
    pub name: String,
    /// Usage text shown in help output.
    pub usage: String,
    /// Explicit position on the command line, or `None` for unordered.
    ///
    /// A malformed (non-integer or negative) order value degrades to
    /// `None` rather than failing the parse; ordering mistakes that
    /// matter are still rejected at registry finalization.
    pub order: Option<usize>,
    /// Free-form metadata strings attached by the sibling annotation.
    pub annotations: Vec<String>,
}

/// A parsed binding annotation: either a flag or a positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldSpec {
    /// A named command-line option.
    Flag(FlagSpec),
    /// A value supplied by position.
    Arg(ArgSpec),
}

impl FieldSpec {
    /// Returns the bound name (flag or argument).
    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Flag(f) => &f.name,
            FieldSpec::Arg(a) => &a.name,
        }
    }

    /// Returns the usage text.
    pub fn usage(&self) -> &str {
        match self {
            FieldSpec::Flag(f) => &f.usage,
            FieldSpec::Arg(a) => &a.usage,
        }
    }

    /// Returns the attached metadata strings.
    pub fn annotations(&self) -> &[String] {
        match self {
            FieldSpec::Flag(f) => &f.annotations,
            FieldSpec::Arg(a) => &a.annotations,
        }
    }

    /// Returns true for positional-argument specs.
    pub fn is_arg(&self) -> bool {
        matches!(self, FieldSpec::Arg(_))
    }
}

/// Parses a boolean attribute token.
///
/// Accepts the canonical set `1, t, T, TRUE, true, True, 0, f, F, FALSE,
/// false, False`; anything else is rejected.
pub(crate) fn parse_bool_token(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

// A kind token must be letters/digits or the punctuation set allowed in
// tags; anything else degrades to the default kind.
fn is_valid_kind(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_alphanumeric() || "!#$%&()*+-./:<=>?@[]^_{|}~ ".contains(c))
}

fn split_trimmed(s: &str) -> Vec<String> {
    s.split(',').map(|p| p.trim().to_string()).collect()
}

fn opt_at<'a>(opts: &'a [String], i: usize) -> &'a str {
    opts.get(i).map(String::as_str).unwrap_or("")
}

/// Parses a binding annotation into a [`FieldSpec`].
///
/// Returns `Ok(None)` when the field carries no binding: an empty tag, the
/// `-` tag, or an unrecognized kind token all mean "skip this field".
///
/// `field` is the struct field name, used when the annotation omits the
/// name. `meta` is the sibling metadata list (may be empty).
///
/// # Errors
///
/// [`BindError::MalformedAnnotation`] when a flag shorthand is longer than
/// one letter.
///
/// # Examples
///
/// ```
/// use flagbind_core::parse_spec;
///
/// assert!(parse_spec("X", "", "").unwrap().is_none());
/// assert!(parse_spec("X", "-", "").unwrap().is_none());
/// assert!(parse_spec("X", "json", "").unwrap().is_none()); // unknown kind
/// assert!(parse_spec("X", "flag,x,usage,xy", "").is_err()); // bad shorthand
/// ```
pub fn parse_spec(field: &str, tag: &str, meta: &str) -> Result<Option<FieldSpec>, BindError> {
    if tag.is_empty() || tag == "-" {
        return Ok(None);
    }

    let (mut kind, opts) = match tag.find(',') {
        Some(idx) => (&tag[..idx], split_trimmed(&tag[idx + 1..])),
        None => (tag, Vec::new()),
    };
    if !is_valid_kind(kind) {
        kind = "";
    }

    let name = match opt_at(&opts, 0) {
        "" => field.to_string(),
        n => n.to_string(),
    };
    let usage = opt_at(&opts, 1).to_string();

    let meta = meta.trim();
    let annotations = if meta.is_empty() {
        Vec::new()
    } else {
        split_trimmed(meta)
    };

    match kind {
        // empty kind defaults to 'arg'
        "" | "arg" => {
            let order = opt_at(&opts, 2)
                .parse::<i64>()
                .ok()
                .and_then(|o| usize::try_from(o).ok());
            Ok(Some(FieldSpec::Arg(ArgSpec {
                name,
                usage,
                order,
                annotations,
            })))
        }
        "flag" => {
            let shorthand = opt_at(&opts, 2).to_string();
            if shorthand.chars().count() > 1 {
                return Err(BindError::MalformedAnnotation {
                    field: field.to_string(),
                    tag: tag.to_string(),
                    reason: format!("shorthand {shorthand:?} must be a single letter"),
                });
            }
            let persistent = parse_bool_token(opt_at(&opts, 3)).unwrap_or(false);
            let required = parse_bool_token(opt_at(&opts, 4)).unwrap_or(false);
            let hidden = parse_bool_token(opt_at(&opts, 5)).unwrap_or(false);
            Ok(Some(FieldSpec::Flag(FlagSpec {
                name,
                usage,
                shorthand,
                persistent,
                required,
                hidden,
                annotations,
            })))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag_with_all_attributes() {
        let spec = parse_spec("Ips", "flag,ips,peer ips,i,true,true", "")
            .unwrap()
            .unwrap();
        assert_eq!(
            spec,
            FieldSpec::Flag(FlagSpec {
                name: "ips".to_string(),
                usage: "peer ips".to_string(),
                shorthand: "i".to_string(),
                persistent: true,
                required: true,
                hidden: false,
                annotations: Vec::new(),
            })
        );
    }

    #[test]
    fn test_parse_flag_defaults_name_to_field() {
        let spec = parse_spec("Stringval", "flag", "").unwrap().unwrap();
        assert_eq!(
            spec,
            FieldSpec::Flag(FlagSpec {
                name: "Stringval".to_string(),
                ..FlagSpec::default()
            })
        );
    }

    #[test]
    fn test_parse_arg_with_order() {
        let spec = parse_spec("Ip", "arg,id,node ip,2", "").unwrap().unwrap();
        assert_eq!(
            spec,
            FieldSpec::Arg(ArgSpec {
                name: "id".to_string(),
                usage: "node ip".to_string(),
                order: Some(2),
                annotations: Vec::new(),
            })
        );
    }

    #[test]
    fn test_empty_kind_defaults_to_arg() {
        let spec = parse_spec("Path", ",path,a path", "").unwrap().unwrap();
        assert!(spec.is_arg());
        assert_eq!(spec.name(), "path");
    }

    #[test]
    fn test_malformed_order_degrades_to_unordered() {
        let spec = parse_spec("Id", "arg,id,usage,abc", "").unwrap().unwrap();
        match spec {
            FieldSpec::Arg(a) => assert_eq!(a.order, None),
            FieldSpec::Flag(_) => unreachable!(),
        }
        // negative orders behave like unordered too
        let spec = parse_spec("Id", "arg,id,usage,-5", "").unwrap().unwrap();
        match spec {
            FieldSpec::Arg(a) => assert_eq!(a.order, None),
            FieldSpec::Flag(_) => unreachable!(),
        }
    }

    #[test]
    fn test_unknown_kind_means_no_binding() {
        assert_eq!(parse_spec("Q", "json", "").unwrap(), None);
        assert_eq!(parse_spec("Q", "", "").unwrap(), None);
        assert_eq!(parse_spec("Q", "-", "").unwrap(), None);
    }

    #[test]
    fn test_meta_annotations_attached_verbatim() {
        let spec = parse_spec("Int", "flag", " one, two ").unwrap().unwrap();
        assert_eq!(spec.annotations(), ["one", "two"]);
    }

    #[test]
    fn test_multi_letter_shorthand_is_malformed() {
        let err = parse_spec("Id", "flag,id,usage,id", "").unwrap_err();
        assert!(matches!(err, BindError::MalformedAnnotation { .. }));
    }

    #[test]
    fn test_attribute_bool_tokens() {
        assert_eq!(parse_bool_token("TRUE"), Some(true));
        assert_eq!(parse_bool_token("0"), Some(false));
        assert_eq!(parse_bool_token("yes"), None);
        // unparsable booleans silently default to false
        let spec = parse_spec("Id", "flag,id,usage,,yes", "").unwrap().unwrap();
        match spec {
            FieldSpec::Flag(f) => assert!(!f.persistent),
            FieldSpec::Arg(_) => unreachable!(),
        }
    }
}
