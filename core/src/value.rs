//! Value conversion between command-line tokens and typed storage.
//!
//! [`FlagValue`] is the seam between the binding engine and concrete field
//! types: anything that can parse itself from a token and render itself
//! back can be bound. Implementations are provided for the usual scalars,
//! `Vec<T>` of those scalars, `IpAddr`, `Duration`, and the optional
//! variants used to distinguish "never set" from "set to the default".
//!
//! # Examples
//!
//! ```
//! use flagbind_core::FlagValue;
//!
//! let mut port: u16 = 0;
//! port.set("8080").unwrap();
//! assert_eq!(port, 8080);
//! assert_eq!(port.type_name(), "uint16");
//! assert_eq!(port.render().as_deref(), Some("8080"));
//!
//! let mut hosts: Vec<String> = Vec::new();
//! hosts.set("a,b,c").unwrap();
//! assert_eq!(hosts, ["a", "b", "c"]);
//! assert!(hosts.is_slice());
//! ```

use std::net::IpAddr;
use std::time::Duration;

use crate::error::ValueError;

/// A value that can be set from a command-line token and rendered back.
///
/// The `type_name` follows the conventional flag-library type vocabulary
/// (`"string"`, `"bool"`, `"int64"`, `"stringSlice"`, ...). Repeatable
/// values use a `Slice` suffix, which is what [`FlagValue::is_slice`]
/// keys on by default.
pub trait FlagValue {
    /// Parses `token` and stores the result.
    fn set(&mut self, token: &str) -> Result<(), ValueError>;

    /// Renders the current value, or `None` when the value is unset.
    ///
    /// Unset means an empty slice or an optional that was never set; a
    /// scalar always renders.
    fn render(&self) -> Option<String>;

    /// The value's type vocabulary name.
    fn type_name(&self) -> &'static str;

    /// Whether the value accepts comma-separated repetition.
    fn is_slice(&self) -> bool {
        self.type_name().ends_with("Slice")
    }
}

impl<V: FlagValue + ?Sized> FlagValue for &mut V {
    fn set(&mut self, token: &str) -> Result<(), ValueError> {
        (**self).set(token)
    }

    fn render(&self) -> Option<String> {
        (**self).render()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn is_slice(&self) -> bool {
        (**self).is_slice()
    }
}

/// Token-level parse and render for a single element.
///
/// Drives the blanket [`FlagValue`] impls for scalars and `Vec<T>`.
pub(crate) trait Token: Sized {
    const KIND: &'static str;
    const SLICE_KIND: &'static str;
    /// Whether slice elements are trimmed before parsing. String and
    /// numeric slices keep whitespace so that parse errors surface.
    const TRIM_ELEMENTS: bool;

    fn from_token(token: &str) -> Result<Self, ValueError>;
    fn to_token(&self) -> String;
}

impl Token for String {
    const KIND: &'static str = "string";
    const SLICE_KIND: &'static str = "stringSlice";
    const TRIM_ELEMENTS: bool = false;

    fn from_token(token: &str) -> Result<Self, ValueError> {
        Ok(token.to_string())
    }

    fn to_token(&self) -> String {
        self.clone()
    }
}

impl Token for bool {
    const KIND: &'static str = "bool";
    const SLICE_KIND: &'static str = "boolSlice";
    const TRIM_ELEMENTS: bool = true;

    fn from_token(token: &str) -> Result<Self, ValueError> {
        crate::spec::parse_bool_token(token).ok_or_else(|| ValueError::invalid("bool", token))
    }

    fn to_token(&self) -> String {
        self.to_string()
    }
}

macro_rules! numeric_token {
    ($($ty:ty => $kind:literal, $slice:literal;)*) => {$(
        impl Token for $ty {
            const KIND: &'static str = $kind;
            const SLICE_KIND: &'static str = $slice;
            const TRIM_ELEMENTS: bool = false;

            fn from_token(token: &str) -> Result<Self, ValueError> {
                token.parse().map_err(|_| ValueError::invalid($kind, token))
            }

            fn to_token(&self) -> String {
                self.to_string()
            }
        }
    )*};
}

numeric_token! {
    i8 => "int8", "int8Slice";
    i16 => "int16", "int16Slice";
    i32 => "int32", "int32Slice";
    i64 => "int64", "int64Slice";
    isize => "int", "intSlice";
    u8 => "uint8", "uint8Slice";
    u16 => "uint16", "uint16Slice";
    u32 => "uint32", "uint32Slice";
    u64 => "uint64", "uint64Slice";
    usize => "uint", "uintSlice";
    f32 => "float32", "float32Slice";
    f64 => "float64", "float64Slice";
}

impl Token for IpAddr {
    const KIND: &'static str = "ip";
    const SLICE_KIND: &'static str = "ipSlice";
    const TRIM_ELEMENTS: bool = true;

    fn from_token(token: &str) -> Result<Self, ValueError> {
        token.parse().map_err(|_| ValueError::invalid("ip", token))
    }

    fn to_token(&self) -> String {
        self.to_string()
    }
}

impl Token for Duration {
    const KIND: &'static str = "duration";
    const SLICE_KIND: &'static str = "durationSlice";
    const TRIM_ELEMENTS: bool = true;

    fn from_token(token: &str) -> Result<Self, ValueError> {
        parse_duration(token).ok_or_else(|| ValueError::invalid("duration", token))
    }

    fn to_token(&self) -> String {
        format_duration(*self)
    }
}

// A blanket `impl<T: Token> FlagValue for T` would conflict with the
// `&mut V` forwarder above (E0119), so the scalar impls are expanded
// per concrete type instead.
macro_rules! scalar_value {
    ($($ty:ty),* $(,)?) => {$(
        impl FlagValue for $ty {
            fn set(&mut self, token: &str) -> Result<(), ValueError> {
                *self = <$ty as Token>::from_token(token)?;
                Ok(())
            }

            fn render(&self) -> Option<String> {
                Some(self.to_token())
            }

            fn type_name(&self) -> &'static str {
                <$ty as Token>::KIND
            }
        }
    )*};
}

scalar_value!(
    String, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, IpAddr, Duration,
);

impl<T: Token> FlagValue for Vec<T> {
    /// Parses a comma-separated token list, replacing the stored
    /// elements (so a bound default does not leak into the user's
    /// value). The whole token is rejected when any element fails to
    /// parse, leaving the stored value intact.
    fn set(&mut self, token: &str) -> Result<(), ValueError> {
        let mut parsed = Vec::new();
        for elem in token.split(',') {
            let elem = if T::TRIM_ELEMENTS { elem.trim() } else { elem };
            parsed.push(T::from_token(elem)?);
        }
        *self = parsed;
        Ok(())
    }

    fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(
            self.iter()
                .map(Token::to_token)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    fn type_name(&self) -> &'static str {
        T::SLICE_KIND
    }
}

macro_rules! optional_value {
    ($($ty:ty),*) => {$(
        impl FlagValue for Option<$ty> {
            fn set(&mut self, token: &str) -> Result<(), ValueError> {
                *self = Some(<$ty as Token>::from_token(token)?);
                Ok(())
            }

            fn render(&self) -> Option<String> {
                self.as_ref().map(Token::to_token)
            }

            fn type_name(&self) -> &'static str {
                <$ty as Token>::KIND
            }
        }
    )*};
}

optional_value!(bool, i32, i64, String);

/// Parses a duration literal such as `"300ms"`, `"1.5h"`, or `"2h45m"`.
///
/// Units are `ns`, `us` (or `µs`), `ms`, `s`, `m`, and `h`. The bare
/// literal `"0"` is accepted; negative durations are not.
pub(crate) fn parse_duration(s: &str) -> Option<Duration> {
    if s == "0" {
        return Some(Duration::ZERO);
    }
    if s.is_empty() || s.starts_with('-') || s.starts_with('+') {
        return None;
    }

    let mut rest = s;
    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        if digits == 0 {
            return None;
        }
        let number: f64 = rest[..digits].parse().ok()?;
        rest = &rest[digits..];

        let (unit_nanos, unit_len) = if rest.starts_with("ns") {
            (1.0, 2)
        } else if rest.starts_with("us") {
            (1e3, 2)
        } else if rest.starts_with("µs") {
            (1e3, "µs".len())
        } else if rest.starts_with("ms") {
            (1e6, 2)
        } else if rest.starts_with('s') {
            (1e9, 1)
        } else if rest.starts_with('m') {
            (60.0 * 1e9, 1)
        } else if rest.starts_with('h') {
            (3600.0 * 1e9, 1)
        } else {
            return None;
        };
        rest = &rest[unit_len..];

        let nanos = number * unit_nanos;
        if !nanos.is_finite() || nanos < 0.0 {
            return None;
        }
        total += Duration::from_nanos(nanos.round() as u64);
    }
    Some(total)
}

/// Renders a duration in the same vocabulary [`parse_duration`] accepts:
/// sub-second values use the largest integral unit, longer values use
/// `XhYmZs` with insignificant leading components omitted.
pub(crate) fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }
    let nanos = d.as_nanos();
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return trim_fraction(nanos as f64 / 1e3, "µs");
    }
    if nanos < 1_000_000_000 {
        return trim_fraction(nanos as f64 / 1e6, "ms");
    }

    let total_secs = d.as_secs();
    let frac = d.subsec_nanos() as f64 / 1e9;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = (total_secs % 60) as f64 + frac;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if mins > 0 || hours > 0 {
        out.push_str(&format!("{mins}m"));
    }
    out.push_str(&trim_fraction(secs, "s"));
    out
}

fn trim_fraction(v: f64, unit: &str) -> String {
    let s = format!("{v:.9}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    format!("{s}{unit}")
}
