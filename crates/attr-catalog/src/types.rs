use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Attribute-level status flag, independent of the value itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Quality {
    Valid,
    Invalid,
    Changing,
    Alarm,
    Warning,
}

impl Default for Quality {
    fn default() -> Self {
        Self::Valid
    }
}

impl Quality {
    /// Lenient name lookup: unrecognised names (including empty) fall back to
    /// `Valid` rather than failing.
    pub fn parse_lenient(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "valid" => Self::Valid,
            "invalid" => Self::Invalid,
            "changing" => Self::Changing,
            "alarm" => Self::Alarm,
            "warning" => Self::Warning,
            _ => Self::Valid,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Changing => "CHANGING",
            Self::Alarm => "ALARM",
            Self::Warning => "WARNING",
        };
        write!(f, "{name}")
    }
}

/// Read-only vs read-write access on an attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrAccess {
    ReadOnly,
    ReadWrite,
}

/// Element type of an attribute.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Bool,
    Short,
    Float,
    Double,
    Str,
    UChar,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "boolean",
            Self::Short => "short",
            Self::Float => "float",
            Self::Double => "double",
            Self::Str => "string",
            Self::UChar => "uchar",
        };
        write!(f, "{name}")
    }
}

/// Rank of an attribute, with declared maxima for the non-scalar shapes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrShape {
    Scalar,
    Spectrum { max_len: usize },
    Image { max_x: usize, max_y: usize },
}

impl fmt::Display for AttrShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => write!(f, "scalar"),
            Self::Spectrum { max_len } => write!(f, "spectrum[{max_len}]"),
            Self::Image { max_x, max_y } => write!(f, "image[{max_x}x{max_y}]"),
        }
    }
}

/// One typed element of an attribute value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Short(i16),
    Float(f32),
    Double(f64),
    Str(String),
    UChar(u8),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Short(_) => ScalarKind::Short,
            Self::Float(_) => ScalarKind::Float,
            Self::Double(_) => ScalarKind::Double,
            Self::Str(_) => ScalarKind::Str,
            Self::UChar(_) => ScalarKind::UChar,
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
impl From<i16> for ScalarValue {
    fn from(v: i16) -> Self {
        Self::Short(v)
    }
}
impl From<f32> for ScalarValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}
impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}
impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}
impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}
impl From<u8> for ScalarValue {
    fn from(v: u8) -> Self {
        Self::UChar(v)
    }
}

/// A full attribute value: one scalar, a rank-1 spectrum, or a rank-2 image
/// stored row-major as a vector of equally long rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Scalar(ScalarValue),
    Spectrum(Vec<ScalarValue>),
    Image(Vec<Vec<ScalarValue>>),
}

impl AttrValue {
    pub fn scalar(v: impl Into<ScalarValue>) -> Self {
        Self::Scalar(v.into())
    }

    pub fn spectrum<T: Into<ScalarValue>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::Spectrum(values.into_iter().map(Into::into).collect())
    }

    pub fn image<R, T>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = T>,
        T: Into<ScalarValue>,
    {
        Self::Image(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }
}

/// Why a written value was rejected against a catalogued attribute kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum ValueError {
    #[error("expected a scalar value")]
    ExpectedScalar,
    #[error("expected a spectrum value")]
    ExpectedSpectrum,
    #[error("expected an image value")]
    ExpectedImage,
    #[error("element type does not match the declared kind")]
    KindMismatch,
    #[error("spectrum exceeds the declared maximum length")]
    SpectrumTooLong,
    #[error("image exceeds the declared maximum dimensions")]
    ImageTooLarge,
    #[error("image rows must all have the same length")]
    RaggedImage,
}

/// Wall-clock timestamp attached to every attribute reading.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timestamp(pub OffsetDateTime);

impl Timestamp {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// RFC 3339 rendering, if the instant is representable.
    pub fn to_rfc3339(&self) -> Option<String> {
        self.0
            .format(&time::format_description::well_known::Rfc3339)
            .ok()
    }
}
