//! The immutable attribute catalog: every attribute the device exposes, with
//! its shape, element kind, access mode, unit and numeric limits. Built once
//! at startup; runtime state lives elsewhere.

use crate::defaults::{
    default_scalar, float_defaults, short_defaults, NumericDefaults, DEFAULT_DIM_X, DEFAULT_DIM_Y,
};
use crate::types::{AttrAccess, AttrShape, AttrValue, ScalarKind, ScalarValue, ValueError};
use std::collections::HashMap;

/// Declared maximum length of spectrum attributes.
pub const SPECTRUM_MAX_LEN: usize = 4096;
/// Declared maximum row length of image attributes.
pub const IMAGE_MAX_X: usize = 256;
/// Declared maximum row count of image attributes.
pub const IMAGE_MAX_Y: usize = 256;

/// The three numeric scalars with a configurable range.
pub const SHORT_SCALAR: &str = "short_scalar";
pub const FLOAT_SCALAR: &str = "float_scalar";
pub const DOUBLE_SCALAR: &str = "double_scalar";
/// The one read-only attribute whose quality can be driven by command.
pub const SHORT_SCALAR_RO: &str = "short_scalar_ro";
/// Exists purely so clients can prove they treat attribute names
/// case-sensitively; always reads as the literal string "MIXEDcase".
pub const MIXED_CASE: &str = "MIXEDcase";

const MM: &str = "mm";
const NO_UNIT: &str = "";

/// Immutable descriptor for one attribute.
#[derive(Clone, Debug)]
pub struct AttributeKind {
    name: &'static str,
    shape: AttrShape,
    value_type: ScalarKind,
    access: AttrAccess,
    unit: &'static str,
    limits: Option<NumericDefaults>,
    literal: Option<&'static str>,
}

impl AttributeKind {
    fn scalar(name: &'static str, kind: ScalarKind, unit: &'static str) -> Self {
        Self {
            name,
            shape: AttrShape::Scalar,
            value_type: kind,
            access: AttrAccess::ReadWrite,
            unit,
            limits: None,
            literal: None,
        }
    }

    fn spectrum(name: &'static str, kind: ScalarKind, unit: &'static str) -> Self {
        Self {
            shape: AttrShape::Spectrum {
                max_len: SPECTRUM_MAX_LEN,
            },
            ..Self::scalar(name, kind, unit)
        }
    }

    fn image(name: &'static str, kind: ScalarKind, unit: &'static str) -> Self {
        Self {
            shape: AttrShape::Image {
                max_x: IMAGE_MAX_X,
                max_y: IMAGE_MAX_Y,
            },
            ..Self::scalar(name, kind, unit)
        }
    }

    fn read_only(mut self) -> Self {
        self.access = AttrAccess::ReadOnly;
        self
    }

    fn with_limits(mut self, limits: NumericDefaults) -> Self {
        self.limits = Some(limits);
        self
    }

    fn with_literal(mut self, literal: &'static str) -> Self {
        self.literal = Some(literal);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> AttrShape {
        self.shape
    }

    pub fn value_type(&self) -> ScalarKind {
        self.value_type
    }

    pub fn access(&self) -> AttrAccess {
        self.access
    }

    pub fn is_writable(&self) -> bool {
        self.access == AttrAccess::ReadWrite
    }

    pub fn unit(&self) -> &'static str {
        self.unit
    }

    pub fn limits(&self) -> Option<&NumericDefaults> {
        self.limits.as_ref()
    }

    /// The catalog default for this attribute, replicated to its declared
    /// shape: one element for scalars, DIMX elements for spectra, DIMX x DIMY
    /// for images. This is what an unwritten attribute reads as.
    pub fn synthesized_default(&self) -> AttrValue {
        let element = match self.literal {
            Some(text) => ScalarValue::Str(text.to_string()),
            None => default_scalar(self.value_type),
        };
        match self.shape {
            AttrShape::Scalar => AttrValue::Scalar(element),
            AttrShape::Spectrum { .. } => AttrValue::Spectrum(vec![element; DEFAULT_DIM_X]),
            AttrShape::Image { .. } => {
                AttrValue::Image(vec![vec![element; DEFAULT_DIM_X]; DEFAULT_DIM_Y])
            }
        }
    }

    /// Validate a candidate value against this kind's element type, shape and
    /// declared maxima.
    pub fn check_value(&self, value: &AttrValue) -> Result<(), ValueError> {
        match (self.shape, value) {
            (AttrShape::Scalar, AttrValue::Scalar(element)) => {
                self.check_element(element)?;
                Ok(())
            }
            (AttrShape::Spectrum { max_len }, AttrValue::Spectrum(elements)) => {
                if elements.len() > max_len {
                    return Err(ValueError::SpectrumTooLong);
                }
                for element in elements {
                    self.check_element(element)?;
                }
                Ok(())
            }
            (AttrShape::Image { max_x, max_y }, AttrValue::Image(rows)) => {
                if rows.len() > max_y {
                    return Err(ValueError::ImageTooLarge);
                }
                let width = rows.first().map(Vec::len).unwrap_or(0);
                if width > max_x {
                    return Err(ValueError::ImageTooLarge);
                }
                for row in rows {
                    if row.len() != width {
                        return Err(ValueError::RaggedImage);
                    }
                    for element in row {
                        self.check_element(element)?;
                    }
                }
                Ok(())
            }
            (AttrShape::Scalar, _) => Err(ValueError::ExpectedScalar),
            (AttrShape::Spectrum { .. }, _) => Err(ValueError::ExpectedSpectrum),
            (AttrShape::Image { .. }, _) => Err(ValueError::ExpectedImage),
        }
    }

    fn check_element(&self, element: &ScalarValue) -> Result<(), ValueError> {
        if element.kind() == self.value_type {
            Ok(())
        } else {
            Err(ValueError::KindMismatch)
        }
    }
}

/// Name-keyed table of every [`AttributeKind`], in declaration order.
#[derive(Clone, Debug)]
pub struct AttributeCatalog {
    kinds: Vec<AttributeKind>,
    by_name: HashMap<&'static str, usize>,
}

impl AttributeCatalog {
    /// Build the standard catalog of the mock device.
    pub fn standard() -> Self {
        use ScalarKind::{Bool, Double, Float, Short, Str, UChar};

        let mut catalog = Self {
            kinds: Vec::new(),
            by_name: HashMap::new(),
        };

        catalog.insert(AttributeKind::scalar("boolean_scalar", Bool, NO_UNIT));
        catalog.insert(AttributeKind::scalar(SHORT_SCALAR, Short, MM).with_limits(short_defaults()));
        catalog.insert(AttributeKind::scalar("short_scalar_nu", Short, NO_UNIT));
        catalog.insert(AttributeKind::scalar(SHORT_SCALAR_RO, Short, MM).read_only());
        catalog.insert(AttributeKind::scalar(FLOAT_SCALAR, Float, MM).with_limits(float_defaults()));
        catalog
            .insert(AttributeKind::scalar(DOUBLE_SCALAR, Double, MM).with_limits(float_defaults()));
        catalog.insert(AttributeKind::scalar("string_scalar", Str, NO_UNIT));
        catalog.insert(AttributeKind::scalar("uchar_scalar", UChar, MM));
        catalog.insert(
            AttributeKind::scalar(MIXED_CASE, Str, NO_UNIT)
                .read_only()
                .with_literal(MIXED_CASE),
        );

        catalog.insert(AttributeKind::spectrum("boolean_spectrum", Bool, NO_UNIT));
        catalog.insert(AttributeKind::spectrum("short_spectrum", Short, MM));
        catalog.insert(AttributeKind::spectrum("float_spectrum", Float, MM));
        catalog.insert(AttributeKind::spectrum("double_spectrum", Double, MM));
        catalog.insert(AttributeKind::spectrum("string_spectrum", Str, NO_UNIT));
        catalog.insert(AttributeKind::spectrum("uchar_spectrum", UChar, MM));

        catalog.insert(AttributeKind::image("boolean_image", Bool, NO_UNIT));
        catalog.insert(AttributeKind::image("short_image", Short, MM));
        catalog.insert(AttributeKind::image("double_image", Double, MM));
        catalog.insert(AttributeKind::image("float_image", Float, MM));

        tracing::debug!("attribute catalog built with {} entries", catalog.len());
        catalog
    }

    fn insert(&mut self, kind: AttributeKind) {
        self.by_name.insert(kind.name, self.kinds.len());
        self.kinds.push(kind);
    }

    /// Case-sensitive lookup by attribute name.
    pub fn lookup(&self, name: &str) -> Option<&AttributeKind> {
        self.by_name.get(name).map(|&idx| &self.kinds[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeKind> {
        self.kinds.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.iter().map(|kind| kind.name)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Quality;

    #[test]
    fn standard_catalog_has_nineteen_attributes() {
        let catalog = AttributeCatalog::standard();
        assert_eq!(catalog.len(), 19);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let catalog = AttributeCatalog::standard();
        assert!(catalog.lookup(MIXED_CASE).is_some());
        assert!(catalog.lookup("mixedcase").is_none());
        assert!(catalog.lookup("MIXEDCASE").is_none());
        assert!(catalog.lookup("no_such_attribute").is_none());
    }

    #[test]
    fn configurable_scalars_carry_limits() {
        let catalog = AttributeCatalog::standard();
        for name in [SHORT_SCALAR, FLOAT_SCALAR, DOUBLE_SCALAR] {
            let kind = catalog.lookup(name).unwrap();
            assert!(kind.limits().is_some(), "{name} should carry limits");
        }
        // Everything else has none.
        let with_limits = catalog.iter().filter(|k| k.limits().is_some()).count();
        assert_eq!(with_limits, 3);
    }

    #[test]
    fn float_and_double_share_one_limits_row() {
        let catalog = AttributeCatalog::standard();
        let float = catalog.lookup(FLOAT_SCALAR).unwrap().limits().copied();
        let double = catalog.lookup(DOUBLE_SCALAR).unwrap().limits().copied();
        assert_eq!(float, double);
    }

    #[test]
    fn ro_and_nu_suffixes_mirror_the_base_attribute() {
        let catalog = AttributeCatalog::standard();
        let base = catalog.lookup(SHORT_SCALAR).unwrap();
        let ro = catalog.lookup(SHORT_SCALAR_RO).unwrap();
        let nu = catalog.lookup("short_scalar_nu").unwrap();

        assert_eq!(ro.value_type(), base.value_type());
        assert!(!ro.is_writable());
        assert_eq!(nu.value_type(), base.value_type());
        assert_eq!(nu.unit(), "");
        assert_eq!(base.unit(), "mm");
    }

    #[test]
    fn scalar_default_synthesis() {
        let catalog = AttributeCatalog::standard();
        let kind = catalog.lookup(SHORT_SCALAR).unwrap();
        assert_eq!(
            kind.synthesized_default(),
            AttrValue::Scalar(ScalarValue::Short(123))
        );
    }

    #[test]
    fn spectrum_default_repeats_dimx_times() {
        let catalog = AttributeCatalog::standard();
        let kind = catalog.lookup("double_spectrum").unwrap();
        assert_eq!(
            kind.synthesized_default(),
            AttrValue::spectrum([1.23f64, 1.23, 1.23])
        );
    }

    #[test]
    fn image_default_is_dimx_by_dimy() {
        let catalog = AttributeCatalog::standard();
        let kind = catalog.lookup("boolean_image").unwrap();
        match kind.synthesized_default() {
            AttrValue::Image(rows) => {
                assert_eq!(rows.len(), DEFAULT_DIM_Y);
                for row in rows {
                    assert_eq!(row.len(), DEFAULT_DIM_X);
                    assert!(row.iter().all(|v| *v == ScalarValue::Bool(true)));
                }
            }
            other => panic!("expected an image default, got {other:?}"),
        }
    }

    #[test]
    fn mixed_case_reads_as_its_own_name() {
        let catalog = AttributeCatalog::standard();
        let kind = catalog.lookup(MIXED_CASE).unwrap();
        assert_eq!(
            kind.synthesized_default(),
            AttrValue::Scalar(ScalarValue::Str("MIXEDcase".to_string()))
        );
    }

    #[test]
    fn value_checks_accept_matching_shapes() {
        let catalog = AttributeCatalog::standard();
        let spectrum = catalog.lookup("short_spectrum").unwrap();
        assert!(spectrum
            .check_value(&AttrValue::spectrum([1i16, 2, 3, 4]))
            .is_ok());
        let image = catalog.lookup("float_image").unwrap();
        assert!(image
            .check_value(&AttrValue::image([[1.0f32, 2.0], [3.0, 4.0]]))
            .is_ok());
    }

    #[test]
    fn value_checks_reject_wrong_kind_and_shape() {
        let catalog = AttributeCatalog::standard();
        let scalar = catalog.lookup(SHORT_SCALAR).unwrap();
        assert_eq!(
            scalar.check_value(&AttrValue::scalar(1.5f64)),
            Err(ValueError::KindMismatch)
        );
        assert_eq!(
            scalar.check_value(&AttrValue::spectrum([1i16])),
            Err(ValueError::ExpectedScalar)
        );

        let image = catalog.lookup("short_image").unwrap();
        assert_eq!(
            image.check_value(&AttrValue::image([vec![1i16, 2], vec![3i16]])),
            Err(ValueError::RaggedImage)
        );
        assert_eq!(
            image.check_value(&AttrValue::scalar(1i16)),
            Err(ValueError::ExpectedImage)
        );
    }

    #[test]
    fn value_checks_enforce_declared_maxima() {
        let catalog = AttributeCatalog::standard();
        let spectrum = catalog.lookup("uchar_spectrum").unwrap();
        let too_long = AttrValue::Spectrum(vec![ScalarValue::UChar(0); SPECTRUM_MAX_LEN + 1]);
        assert_eq!(
            spectrum.check_value(&too_long),
            Err(ValueError::SpectrumTooLong)
        );
    }

    #[test]
    fn quality_default_is_valid() {
        assert_eq!(Quality::default(), Quality::Valid);
    }
}
