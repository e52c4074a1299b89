//! Structural finite-element residual and Jacobian assembly.
//!
//! Element-level building blocks for a nonlinear structural solver:
//! - inertial residual with lumped or consistent mass
//! - surface pressure, small-disturbance aerodynamic pressure and thermal loads
//! - local frames for beams and shells with local/global rotation of results
//! - a generic element over real (`f64`) and complex (`Complex64`) scalars
//!
//! The solver owns the mesh, the global storage and the nonlinear iteration.
//! [`assembly::ElementAssembler`] is a reference element loop over dense
//! global storage.

pub mod assembly;
pub mod basis;
pub mod boundary_conditions;
pub mod config;
pub mod elements;
pub mod error;
pub mod field;
pub mod frame;
pub mod operator;
pub mod property;
pub mod quadrature;
pub mod scalar;

pub use assembly::{AssembledSystem, ElementAssembler, ElementEntry, GlobalState};
pub use basis::{LagrangeBasis, LagrangeShape};
pub use boundary_conditions::{
    BoundaryCondition, BoundaryConditionMap, BoundaryId, ConditionKind, SubdomainId,
};
pub use config::{AssemblyConfig, ElementConfig};
pub use elements::{
    ElementGeometry, ElementKind, LoadSurface, StructuralElement, build_structural_element,
    build_with_lagrange_basis,
};
pub use error::{ElementError, Result};
pub use field::FieldFunction;
pub use frame::LocalFrame;
pub use operator::BlockOperator;
pub use property::{ElementProperty, SectionProperty};
pub use quadrature::{BasisProvider, QuadratureData, QuadraturePoint};
pub use scalar::{FieldScalar, ScalarKind};
