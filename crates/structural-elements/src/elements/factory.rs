//! Element factory: resolves the element kind from the topological dimension.
//!
//! The kind is decided once at construction; everything downstream matches
//! on the closed [`ElementKind`] enum.

use super::{ElementGeometry, StructuralElement};
use crate::basis::LagrangeBasis;
use crate::config::ElementConfig;
use crate::error::{ElementError, Result};
use crate::property::ElementProperty;
use crate::quadrature::BasisProvider;
use crate::scalar::FieldScalar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Structural element family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Beams and bars
    Line,
    /// Plates and shells
    Surface,
    /// Continuum solids
    Solid,
}

impl ElementKind {
    pub fn from_dimension(dim: usize) -> Result<Self> {
        match dim {
            1 => Ok(ElementKind::Line),
            2 => Ok(ElementKind::Surface),
            3 => Ok(ElementKind::Solid),
            other => Err(ElementError::UnsupportedDimension(other)),
        }
    }

    pub fn dim(&self) -> usize {
        match self {
            ElementKind::Line => 1,
            ElementKind::Surface => 2,
            ElementKind::Solid => 3,
        }
    }
}

/// Create a structural element for an element of dimension `dim`
///
/// # Arguments
/// * `dim` - topological dimension of the mesh element
/// * `geometry` - global nodes, side boundary ids and subdomain id
/// * `basis` - shape functions and quadrature for the element type
/// * `property` - property card of the element section
/// * `config` - formulation options
///
/// # Errors
/// `UnsupportedDimension` for any dimension other than 1, 2 or 3.
pub fn build_structural_element<T: FieldScalar>(
    dim: usize,
    geometry: ElementGeometry,
    basis: Arc<dyn BasisProvider>,
    property: Arc<dyn ElementProperty>,
    config: ElementConfig,
) -> Result<StructuralElement<T>> {
    let kind = ElementKind::from_dimension(dim)?;
    StructuralElement::new(kind, geometry, basis, property, config)
}

/// Same as [`build_structural_element`] with the reference Lagrange basis
/// and the quadrature order from `config`
pub fn build_with_lagrange_basis<T: FieldScalar>(
    dim: usize,
    geometry: ElementGeometry,
    property: Arc<dyn ElementProperty>,
    config: ElementConfig,
) -> Result<StructuralElement<T>> {
    let basis = LagrangeBasis::for_dimension(dim, config.quadrature_order)?;
    build_structural_element(dim, geometry, Arc::new(basis), property, config)
}
