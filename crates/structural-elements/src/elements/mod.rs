//! Structural element: state, local frame and residual routines.
//!
//! One generic implementation serves lines, surfaces and solids for both the
//! real and the complex scalar. Each node carries six components
//! `[u, v, w, θx, θy, θz]`, stored blocked by component: DOF
//! `c * n_nodes + i` is component `c` of node `i`.
//!
//! The residual routines live in their own files:
//! - [`transform`]: local ↔ global rotations
//! - [`inertia`]: lumped and consistent inertial residual
//! - [`loads`]: surface pressure, small-disturbance pressure, thermal load
//! - [`dispatch`]: boundary-condition dispatch over side and subdomain ids
//! - [`factory`]: element construction by dimension

use crate::boundary_conditions::{BoundaryId, SubdomainId};
use crate::config::ElementConfig;
use crate::error::{ElementError, Result};
use crate::frame::LocalFrame;
use crate::property::ElementProperty;
use crate::quadrature::{BasisProvider, QuadratureData, QuadraturePoint};
use crate::scalar::FieldScalar;
use nalgebra::{DMatrix, DVector, Point3};
use std::sync::Arc;

pub mod dispatch;
pub mod factory;
pub mod inertia;
pub mod loads;
pub mod transform;

pub use factory::{ElementKind, build_structural_element, build_with_lagrange_basis};
pub use loads::LoadSurface;

/// Components per node
pub const N_COMPONENTS: usize = 6;

/// Mesh data of one element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementGeometry {
    /// Global nodal coordinates
    pub nodes: Vec<Point3<f64>>,
    /// Boundary ids attached to each side; missing trailing sides have none
    pub side_boundary_ids: Vec<Vec<BoundaryId>>,
    pub subdomain_id: SubdomainId,
}

impl ElementGeometry {
    pub fn new(nodes: Vec<Point3<f64>>, subdomain_id: SubdomainId) -> Self {
        Self {
            nodes,
            side_boundary_ids: Vec::new(),
            subdomain_id,
        }
    }

    /// Tag `side` with boundary `id`
    pub fn with_side_boundary(mut self, side: usize, id: BoundaryId) -> Self {
        if self.side_boundary_ids.len() <= side {
            self.side_boundary_ids.resize(side + 1, Vec::new());
        }
        self.side_boundary_ids[side].push(id);
        self
    }
}

/// Structural element generic over the analysis scalar
///
/// Global state vectors are supplied through the `set_*` methods; the element
/// keeps a local-frame copy of each that the residual routines read.
pub struct StructuralElement<T: FieldScalar> {
    kind: ElementKind,
    frame: LocalFrame,
    geometry: ElementGeometry,
    local_nodes: Vec<Point3<f64>>,
    quadrature: QuadratureData,
    basis: Arc<dyn BasisProvider>,
    property: Arc<dyn ElementProperty>,
    config: ElementConfig,
    time: f64,

    sol: DVector<T>,
    vel: DVector<T>,
    accel: DVector<T>,
    base_sol: DVector<T>,

    local_sol: DVector<T>,
    local_vel: DVector<T>,
    local_accel: DVector<T>,
    local_base_sol: DVector<T>,
}

impl<T: FieldScalar> StructuralElement<T> {
    /// Build the local frame and the interior quadrature of an element
    ///
    /// # Errors
    /// `InvalidConfig` for a bad configuration, `DimensionMismatch` if the
    /// basis and the geometry disagree on the node count, the side count or
    /// the number of tabulated shape functions, and any frame or quadrature
    /// error.
    pub fn new(
        kind: ElementKind,
        mut geometry: ElementGeometry,
        basis: Arc<dyn BasisProvider>,
        property: Arc<dyn ElementProperty>,
        config: ElementConfig,
    ) -> Result<Self> {
        config.validate()?;
        ElementError::check_len("element nodes", basis.n_nodes(), geometry.nodes.len())?;
        if geometry.side_boundary_ids.len() > basis.n_sides() {
            return Err(ElementError::DimensionMismatch {
                context: "side boundary ids",
                expected: basis.n_sides(),
                found: geometry.side_boundary_ids.len(),
            });
        }
        geometry.side_boundary_ids.resize(basis.n_sides(), Vec::new());

        let y_vector = property.y_vector();
        let frame = LocalFrame::build(kind.dim(), &geometry.nodes, y_vector.as_ref())?;
        let local_nodes: Vec<_> = geometry
            .nodes
            .iter()
            .map(|p| frame.local_coordinates(p))
            .collect();
        let quadrature = basis.element_quadrature(&local_nodes)?;
        ElementError::check_len(
            "quadrature shape functions",
            geometry.nodes.len(),
            quadrature.n_shape,
        )?;

        let n_dofs = N_COMPONENTS * geometry.nodes.len();
        let zeros = DVector::<T>::zeros(n_dofs);

        Ok(Self {
            kind,
            frame,
            geometry,
            local_nodes,
            quadrature,
            basis,
            property,
            config,
            time: 0.0,
            sol: zeros.clone(),
            vel: zeros.clone(),
            accel: zeros.clone(),
            base_sol: zeros.clone(),
            local_sol: zeros.clone(),
            local_vel: zeros.clone(),
            local_accel: zeros.clone(),
            local_base_sol: zeros,
        })
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.kind.dim()
    }

    pub fn frame(&self) -> &LocalFrame {
        &self.frame
    }

    pub fn geometry(&self) -> &ElementGeometry {
        &self.geometry
    }

    /// Nodal coordinates in the local frame
    pub fn local_nodes(&self) -> &[Point3<f64>] {
        &self.local_nodes
    }

    pub fn quadrature(&self) -> &QuadratureData {
        &self.quadrature
    }

    pub fn config(&self) -> &ElementConfig {
        &self.config
    }

    pub fn n_nodes(&self) -> usize {
        self.geometry.nodes.len()
    }

    pub fn n_dofs(&self) -> usize {
        N_COMPONENTS * self.n_nodes()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Time at which all field functions are evaluated
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn set_solution(&mut self, sol: &DVector<T>, is_sensitivity: bool) -> Result<()> {
        let local = self.localize_state(sol, is_sensitivity)?;
        self.sol.clone_from(sol);
        self.local_sol = local;
        Ok(())
    }

    pub fn set_velocity(&mut self, vel: &DVector<T>, is_sensitivity: bool) -> Result<()> {
        let local = self.localize_state(vel, is_sensitivity)?;
        self.vel.clone_from(vel);
        self.local_vel = local;
        Ok(())
    }

    pub fn set_acceleration(&mut self, accel: &DVector<T>, is_sensitivity: bool) -> Result<()> {
        let local = self.localize_state(accel, is_sensitivity)?;
        self.accel.clone_from(accel);
        self.local_accel = local;
        Ok(())
    }

    /// Base (pre-stress) solution
    pub fn set_base_solution(&mut self, sol: &DVector<T>, is_sensitivity: bool) -> Result<()> {
        let local = self.localize_state(sol, is_sensitivity)?;
        self.base_sol.clone_from(sol);
        self.local_base_sol = local;
        Ok(())
    }

    pub fn solution(&self) -> &DVector<T> {
        &self.sol
    }

    pub fn velocity(&self) -> &DVector<T> {
        &self.vel
    }

    pub fn acceleration(&self) -> &DVector<T> {
        &self.accel
    }

    pub fn base_solution(&self) -> &DVector<T> {
        &self.base_sol
    }

    pub fn local_solution(&self) -> &DVector<T> {
        &self.local_sol
    }

    pub fn local_velocity(&self) -> &DVector<T> {
        &self.local_vel
    }

    pub fn local_acceleration(&self) -> &DVector<T> {
        &self.local_accel
    }

    pub fn local_base_solution(&self) -> &DVector<T> {
        &self.local_base_sol
    }

    fn localize_state(&self, global: &DVector<T>, is_sensitivity: bool) -> Result<DVector<T>> {
        if is_sensitivity {
            return Err(ElementError::SensitivityUnsupported);
        }
        self.transform_vector_to_local(global)
    }

    /// Global location of a quadrature point
    pub(crate) fn global_point(&self, qp: &QuadraturePoint) -> Point3<f64> {
        self.frame.global_coordinates(&qp.xyz)
    }

    /// Add a local-frame vector into global storage, rotating if needed
    pub(crate) fn add_local_vector(&self, f: &mut DVector<T>, local: &DVector<T>) -> Result<()> {
        if self.frame.requires_transform() {
            *f += self.transform_vector_to_global(local)?;
        } else {
            *f += local;
        }
        Ok(())
    }

    /// Add a local-frame matrix into global storage, rotating if needed
    pub(crate) fn add_local_matrix(&self, jac: &mut DMatrix<T>, local: &DMatrix<T>) -> Result<()> {
        if self.frame.requires_transform() {
            *jac += self.transform_matrix_to_global(local)?;
        } else {
            *jac += local;
        }
        Ok(())
    }

    pub(crate) fn check_vector(&self, context: &'static str, f: &DVector<T>) -> Result<()> {
        ElementError::check_len(context, self.n_dofs(), f.len())
    }

    pub(crate) fn check_matrix(&self, context: &'static str, m: &DMatrix<T>) -> Result<()> {
        ElementError::check_len(context, self.n_dofs(), m.nrows())?;
        ElementError::check_len(context, self.n_dofs(), m.ncols())
    }
}
