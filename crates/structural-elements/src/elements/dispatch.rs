//! Routing of registered boundary conditions to the load residuals.

use super::{LoadSurface, StructuralElement};
use crate::boundary_conditions::{BoundaryCondition, BoundaryConditionMap, ConditionKind};
use crate::error::{ElementError, Result};
use crate::scalar::FieldScalar;
use nalgebra::{DMatrix, DVector};

impl<T: FieldScalar> StructuralElement<T> {
    /// Evaluate every condition registered on the boundary ids of the
    /// element sides
    ///
    /// Surface pressure and small-disturbance pressure are integrated over
    /// the side; Dirichlet conditions are left to the solver.
    ///
    /// # Returns
    /// Whether any contribution added a Jacobian (only if requested).
    ///
    /// # Errors
    /// `NotImplemented` for any other condition kind, or the first error of a
    /// load routine.
    pub fn side_external_residual(
        &self,
        request_jacobian: bool,
        f: &mut DVector<T>,
        jac: &mut DMatrix<T>,
        bcs: &BoundaryConditionMap,
    ) -> Result<bool> {
        let mut calculate_jac = false;

        for (side, ids) in self.geometry.side_boundary_ids.iter().enumerate() {
            for &id in ids {
                for bc in bcs.equal_range(id) {
                    calculate_jac |= self.side_condition(request_jacobian, f, jac, side, bc)?;
                }
            }
        }
        Ok(request_jacobian && calculate_jac)
    }

    /// Evaluate every condition registered on the element subdomain id
    ///
    /// Pressures use the face form; temperature produces the thermal load.
    ///
    /// # Errors
    /// As for [`side_external_residual`](Self::side_external_residual).
    pub fn volume_external_residual(
        &self,
        request_jacobian: bool,
        f: &mut DVector<T>,
        jac: &mut DMatrix<T>,
        bcs: &BoundaryConditionMap,
    ) -> Result<bool> {
        let mut calculate_jac = false;

        for bc in bcs.equal_range(self.geometry.subdomain_id) {
            calculate_jac |= match bc.kind() {
                ConditionKind::SurfacePressure => {
                    self.surface_pressure_residual(request_jacobian, f, jac, LoadSurface::Face, bc)?
                }
                ConditionKind::SmallDisturbanceMotion => self
                    .small_disturbance_surface_pressure_residual(
                        request_jacobian,
                        f,
                        jac,
                        LoadSurface::Face,
                        bc,
                    )?,
                ConditionKind::Temperature => self.thermal_residual(request_jacobian, f, jac, bc)?,
                ConditionKind::Dirichlet => false,
                other => return Err(not_implemented(other, "volume")),
            };
        }
        Ok(request_jacobian && calculate_jac)
    }

    fn side_condition(
        &self,
        request_jacobian: bool,
        f: &mut DVector<T>,
        jac: &mut DMatrix<T>,
        side: usize,
        bc: &BoundaryCondition,
    ) -> Result<bool> {
        let surface = LoadSurface::Side(side);
        match bc.kind() {
            ConditionKind::SurfacePressure => {
                self.surface_pressure_residual(request_jacobian, f, jac, surface, bc)
            }
            ConditionKind::SmallDisturbanceMotion => self
                .small_disturbance_surface_pressure_residual(request_jacobian, f, jac, surface, bc),
            ConditionKind::Dirichlet => Ok(false),
            other => Err(not_implemented(other, "side")),
        }
    }
}

fn not_implemented(kind: ConditionKind, location: &str) -> ElementError {
    ElementError::NotImplemented(format!("{:?} as a {} condition", kind, location))
}
