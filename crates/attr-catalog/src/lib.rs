//! attr-catalog: typed attribute schema for the mock control-system device
//!
//! This crate owns the static half of the device model: scalar kinds, shaped
//! typed values, quality flags, the per-kind defaults table, and the immutable
//! catalog of attribute descriptors built once at startup. The runtime half
//! (stored values, state machine, commands) lives in the `mock-device` crate.

mod types;
pub use types::{
    AttrAccess, AttrShape, AttrValue, Quality, ScalarKind, ScalarValue, Timestamp, ValueError,
};

mod defaults;
pub use defaults::{
    default_scalar, float_defaults, short_defaults, NumericDefaults, DEFAULT_BOOL, DEFAULT_DIM_X,
    DEFAULT_DIM_Y, DEFAULT_DOUBLE, DEFAULT_FLOAT, DEFAULT_SHORT, DEFAULT_STRING, DEFAULT_UCHAR,
};

mod catalog;
pub use catalog::{
    AttributeCatalog, AttributeKind, DOUBLE_SCALAR, FLOAT_SCALAR, IMAGE_MAX_X, IMAGE_MAX_Y,
    MIXED_CASE, SHORT_SCALAR, SHORT_SCALAR_RO, SPECTRUM_MAX_LEN,
};
