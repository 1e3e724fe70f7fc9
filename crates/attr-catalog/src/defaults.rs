//! Per-kind default values and the numeric limits derived from them.

use crate::types::{ScalarKind, ScalarValue};
use serde::Serialize;

pub const DEFAULT_BOOL: bool = true;
pub const DEFAULT_SHORT: i16 = 123;
pub const DEFAULT_FLOAT: f32 = 1.23;
pub const DEFAULT_DOUBLE: f64 = 1.23;
pub const DEFAULT_STRING: &str = "hello";
pub const DEFAULT_UCHAR: u8 = 123;

/// Number of elements a synthesized spectrum default carries, and the row
/// length of a synthesized image default.
pub const DEFAULT_DIM_X: usize = 3;
/// Number of rows in a synthesized image default.
pub const DEFAULT_DIM_Y: usize = 3;

/// Range, alarm and warning thresholds for a configurable numeric attribute.
/// Outer = range, middle = alarm, inner = warning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NumericDefaults {
    pub range: (f64, f64),
    pub alarm: (f64, f64),
    pub warning: (f64, f64),
}

impl NumericDefaults {
    /// Derive the three nested threshold pairs from a (positive) default
    /// value: range at 10x, alarm at 5x, warning at 3x.
    fn derived_from(default: f64) -> Self {
        Self {
            range: (-10.0 * default, 10.0 * default),
            alarm: (-5.0 * default, 5.0 * default),
            warning: (-3.0 * default, 3.0 * default),
        }
    }
}

/// Limits row for the short (int16) kind.
pub fn short_defaults() -> NumericDefaults {
    NumericDefaults::derived_from(f64::from(DEFAULT_SHORT))
}

/// Limits row shared by the float and double kinds.
pub fn float_defaults() -> NumericDefaults {
    NumericDefaults::derived_from(DEFAULT_DOUBLE)
}

/// Catalog default for one element of the given kind.
pub fn default_scalar(kind: ScalarKind) -> ScalarValue {
    match kind {
        ScalarKind::Bool => ScalarValue::Bool(DEFAULT_BOOL),
        ScalarKind::Short => ScalarValue::Short(DEFAULT_SHORT),
        ScalarKind::Float => ScalarValue::Float(DEFAULT_FLOAT),
        ScalarKind::Double => ScalarValue::Double(DEFAULT_DOUBLE),
        ScalarKind::Str => ScalarValue::Str(DEFAULT_STRING.to_string()),
        ScalarKind::UChar => ScalarValue::UChar(DEFAULT_UCHAR),
    }
}
