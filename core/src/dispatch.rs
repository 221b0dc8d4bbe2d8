//! Type dispatch.
//!
//! Maps a collected field's storage to a [`FlagValue`] handle. A custom
//! [`Flagger`] is consulted first so applications can claim types before
//! the builtin set sees them; the builtin chain then probes the scalar,
//! optional, and slice types the crate converts natively.

use std::any::{Any, TypeId};
use std::net::IpAddr;
use std::time::Duration;

use crate::collect::Target;
use crate::error::BindError;
use crate::value::FlagValue;

/// Claims field types the builtin chain does not know.
///
/// A `Flagger` is consulted for every dynamically-typed field before the
/// builtin probes run. When [`Flagger::binds`] returns true the flagger
/// owns the field: returning `None` from [`Flagger::flag`] then fails
/// the bind rather than falling back to the builtins.
pub trait Flagger {
    /// Whether this flagger handles values of `type_id`.
    fn binds(&self, type_id: TypeId) -> bool;

    /// Produces a conversion handle borrowing `value`.
    fn flag<'a>(&self, value: &'a mut dyn Any) -> Option<Flagged<'a>>;
}

/// A conversion handle produced by a [`Flagger`].
pub struct Flagged<'a> {
    /// The conversion wrapping the claimed field.
    pub value: Box<dyn FlagValue + 'a>,
    /// Whether positional application may collapse trailing tokens into
    /// this value as a comma-separated list.
    pub csv_slice: bool,
}

/// A resolved field handle, ready to parse tokens into its storage.
pub(crate) struct Handle<'a> {
    pub value: Box<dyn FlagValue + 'a>,
    pub csv_slice: bool,
}

fn probe<'a, T: Any + FlagValue>(
    field: &str,
    value: &'a mut dyn Any,
) -> Result<Handle<'a>, BindError> {
    match value.downcast_mut::<T>() {
        Some(v) => {
            let csv_slice = v.is_slice();
            Ok(Handle {
                value: Box::new(v),
                csv_slice,
            })
        }
        None => Err(BindError::unsupported(field, "type probe mismatch")),
    }
}

macro_rules! probe_chain {
    ($field:expr, $value:expr; $($ty:ty),* $(,)?) => {
        $(
            if (*$value).is::<$ty>() {
                return probe::<$ty>($field, $value);
            }
        )*
    };
}

/// Resolves a field target to a conversion handle.
pub(crate) fn resolve<'a>(
    field: &str,
    target: Target<'a>,
    flagger: Option<&dyn Flagger>,
) -> Result<Handle<'a>, BindError> {
    let value = match target {
        Target::Value(v) => {
            let csv_slice = v.is_slice();
            return Ok(Handle {
                value: Box::new(v),
                csv_slice,
            });
        }
        Target::Dynamic(v) => v,
    };

    if let Some(flagger) = flagger {
        if flagger.binds((*value).type_id()) {
            return match flagger.flag(value) {
                Some(Flagged { value, csv_slice }) => Ok(Handle { value, csv_slice }),
                None => Err(BindError::unsupported(field, "custom flagger declined")),
            };
        }
    }

    probe_chain!(field, value;
        String, bool,
        i8, i16, i32, i64, isize,
        u8, u16, u32, u64, usize,
        f32, f64,
        IpAddr, Duration,
        Option<bool>, Option<i32>, Option<i64>, Option<String>,
        Vec<String>, Vec<bool>,
        Vec<i32>, Vec<i64>, Vec<u32>, Vec<u64>, Vec<f64>,
        Vec<IpAddr>, Vec<Duration>,
    );

    Err(BindError::unsupported(field, "no conversion for this type"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValueError;

    #[test]
    fn test_builtin_probe_resolves_scalars_and_slices() {
        let mut n: u64 = 0;
        let mut h = resolve("n", Target::Dynamic(&mut n), None).unwrap();
        h.value.set("99").unwrap();
        assert!(!h.csv_slice);
        drop(h);
        assert_eq!(n, 99);

        let mut v: Vec<String> = Vec::new();
        let h = resolve("v", Target::Dynamic(&mut v), None).unwrap();
        assert!(h.csv_slice);
    }

    #[test]
    fn test_unknown_type_is_unsupported() {
        struct Weird;
        let mut w = Weird;
        let err = resolve("w", Target::Dynamic(&mut w), None).err().unwrap();
        assert!(matches!(err, BindError::UnsupportedType { .. }));
    }

    struct HexValue(u32);

    impl FlagValue for HexValue {
        fn set(&mut self, token: &str) -> Result<(), ValueError> {
            self.0 = u32::from_str_radix(token.trim_start_matches("0x"), 16)
                .map_err(|_| ValueError::invalid("hex", token))?;
            Ok(())
        }

        fn render(&self) -> Option<String> {
            Some(format!("0x{:x}", self.0))
        }

        fn type_name(&self) -> &'static str {
            "hex"
        }
    }

    struct HexFlagger;

    impl Flagger for HexFlagger {
        fn binds(&self, type_id: TypeId) -> bool {
            type_id == TypeId::of::<HexValue>()
        }

        fn flag<'a>(&self, value: &'a mut dyn Any) -> Option<Flagged<'a>> {
            let v = value.downcast_mut::<HexValue>()?;
            Some(Flagged {
                value: Box::new(v),
                csv_slice: false,
            })
        }
    }

    #[test]
    fn test_flagger_claims_type_before_builtins() {
        let mut hex = HexValue(0);
        let mut h = resolve("hex", Target::Dynamic(&mut hex), Some(&HexFlagger)).unwrap();
        h.value.set("0xff").unwrap();
        drop(h);
        assert_eq!(hex.0, 255);

        // a claimed builtin goes to the flagger too, and stays claimed
        struct GreedyFlagger;
        impl Flagger for GreedyFlagger {
            fn binds(&self, type_id: TypeId) -> bool {
                type_id == TypeId::of::<String>()
            }
            fn flag<'a>(&self, _value: &'a mut dyn Any) -> Option<Flagged<'a>> {
                None
            }
        }
        let mut s = String::new();
        let err = resolve("s", Target::Dynamic(&mut s), Some(&GreedyFlagger))
            .err()
            .unwrap();
        assert!(matches!(err, BindError::UnsupportedType { .. }));
    }
}
