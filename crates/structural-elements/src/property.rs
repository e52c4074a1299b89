//! Element property cards.
//!
//! The element only consumes what a card exposes: an inertia field, the
//! lumped-mass flag, the 1-D orientation vector and the thermal resultant.
//! [`SectionProperty`] is a plain implementation built from constants.

use crate::field::FieldFunction;
use nalgebra::{DMatrix, DVector, Vector3};

pub trait ElementProperty: Send + Sync {
    /// 6×6 inertia matrix per unit length/area/volume, ordered like the
    /// nodal components `[u, v, w, θx, θy, θz]`
    fn inertia_matrix(&self) -> FieldFunction<DMatrix<f64>>;

    /// Use a diagonal (lumped) mass approximation
    fn if_diagonal_mass_matrix(&self) -> bool;

    /// Reference vector fixing the local y-axis of 1-D elements
    fn y_vector(&self) -> Option<Vector3<f64>> {
        None
    }

    /// Direct-stress resultant per unit temperature rise: 1 entry for lines,
    /// `[Nx, Ny, Nxy]` for surfaces, Voigt order for solids
    fn thermal_expansion_resultant(&self) -> Option<FieldFunction<DVector<f64>>> {
        None
    }
}

/// Section card with spatially uniform properties
#[derive(Debug, Clone)]
pub struct SectionProperty {
    pub inertia: DMatrix<f64>,
    pub lumped_mass: bool,
    pub y_vector: Option<Vector3<f64>>,
    pub thermal_resultant: Option<DVector<f64>>,
}

impl SectionProperty {
    pub fn new(inertia: DMatrix<f64>) -> Self {
        Self {
            inertia,
            lumped_mass: false,
            y_vector: None,
            thermal_resultant: None,
        }
    }

    /// Inertia of a beam section: `ρA` on translations, `ρJ`, `ρIyy`, `ρIzz`
    /// on rotations
    pub fn beam(density: f64, area: f64, iyy: f64, izz: f64, y_vector: Vector3<f64>) -> Self {
        let diag = [area, area, area, iyy + izz, iyy, izz].map(|v| density * v);
        Self {
            inertia: DMatrix::from_diagonal(&DVector::from_row_slice(&diag)),
            lumped_mass: false,
            y_vector: Some(y_vector),
            thermal_resultant: None,
        }
    }

    /// Inertia of a plate of constant thickness
    pub fn plate(density: f64, thickness: f64) -> Self {
        let m = density * thickness;
        let i = density * thickness.powi(3) / 12.0;
        let diag = [m, m, m, i, i, 0.0];
        Self::new(DMatrix::from_diagonal(&DVector::from_row_slice(&diag)))
    }

    /// Solid continuum: translational density only
    pub fn solid(density: f64) -> Self {
        let diag = [density, density, density, 0.0, 0.0, 0.0];
        Self::new(DMatrix::from_diagonal(&DVector::from_row_slice(&diag)))
    }

    pub fn with_lumped_mass(mut self, lumped: bool) -> Self {
        self.lumped_mass = lumped;
        self
    }

    pub fn with_thermal_resultant(mut self, resultant: DVector<f64>) -> Self {
        self.thermal_resultant = Some(resultant);
        self
    }
}

impl ElementProperty for SectionProperty {
    fn inertia_matrix(&self) -> FieldFunction<DMatrix<f64>> {
        FieldFunction::constant("inertia", self.inertia.clone())
    }

    fn if_diagonal_mass_matrix(&self) -> bool {
        self.lumped_mass
    }

    fn y_vector(&self) -> Option<Vector3<f64>> {
        self.y_vector
    }

    fn thermal_expansion_resultant(&self) -> Option<FieldFunction<DVector<f64>>> {
        self.thermal_resultant
            .clone()
            .map(|r| FieldFunction::constant("thermal_resultant", r))
    }
}
