//! Command-line token classification.
//!
//! Splits raw argv tokens into long flags, short flags, and bare words
//! before execution decides what each one binds to. Only the syntactic
//! shape is decided here; whether a flag exists, and whether it takes a
//! value, is the executor's business.

/// The syntactic shape of one argv token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagToken<'a> {
    /// `--`, terminating flag parsing.
    Terminator,
    /// `--name` or `--name=value`.
    Long {
        /// Flag name without the dashes.
        name: &'a str,
        /// Inline value after `=`, when present.
        value: Option<&'a str>,
    },
    /// `-x` or `-x=value`.
    Short {
        /// The shorthand letter.
        name: &'a str,
        /// Inline value after `=`, when present.
        value: Option<&'a str>,
    },
    /// Anything else: a subcommand name or positional value. A lone `-`
    /// is a bare token too, conventionally meaning stdin.
    Bare(&'a str),
}

impl<'a> FlagToken<'a> {
    /// Classifies a raw argv token.
    pub fn parse(token: &'a str) -> Self {
        if token == "--" {
            return FlagToken::Terminator;
        }
        if let Some(body) = token.strip_prefix("--") {
            let (name, value) = split_inline(body);
            return FlagToken::Long { name, value };
        }
        if let Some(body) = token.strip_prefix('-') {
            if body.is_empty() || body.starts_with(|c: char| c.is_ascii_digit()) {
                // "-" and negative numbers are values, not flags
                return FlagToken::Bare(token);
            }
            let (name, value) = split_inline(body);
            return FlagToken::Short { name, value };
        }
        FlagToken::Bare(token)
    }
}

fn split_inline(body: &str) -> (&str, Option<&str>) {
    match body.find('=') {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_tokens() {
        assert_eq!(
            FlagToken::parse("--verbose"),
            FlagToken::Long { name: "verbose", value: None }
        );
        assert_eq!(
            FlagToken::parse("--port=8080"),
            FlagToken::Long { name: "port", value: Some("8080") }
        );
        assert_eq!(
            FlagToken::parse("--empty="),
            FlagToken::Long { name: "empty", value: Some("") }
        );
    }

    #[test]
    fn test_short_tokens() {
        assert_eq!(
            FlagToken::parse("-v"),
            FlagToken::Short { name: "v", value: None }
        );
        assert_eq!(
            FlagToken::parse("-p=8080"),
            FlagToken::Short { name: "p", value: Some("8080") }
        );
    }

    #[test]
    fn test_bare_tokens() {
        assert_eq!(FlagToken::parse("status"), FlagToken::Bare("status"));
        assert_eq!(FlagToken::parse("-"), FlagToken::Bare("-"));
        assert_eq!(FlagToken::parse("-42"), FlagToken::Bare("-42"));
        assert_eq!(FlagToken::parse("--"), FlagToken::Terminator);
    }
}
