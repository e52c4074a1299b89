//! External load residuals: surface pressure, small-disturbance pressure and
//! thermal load.
//!
//! Pressure loads are integrated either over one side of the element, using
//! the outward side normal, or over the element itself (the face form, for
//! lines and surfaces loaded on their mid-plane). The face form uses the
//! local normal `n[dim] = -1`: local `-y` for lines, local `-z` for surfaces.
//!
//! All loads are formed in the element frame and rotated before they are
//! added to the caller's global vector. None of them depend on the state, so
//! they never contribute a Jacobian.

use super::{N_COMPONENTS, StructuralElement};
use crate::boundary_conditions::BoundaryCondition;
use crate::error::{ElementError, Result};
use crate::operator::BlockOperator;
use crate::quadrature::QuadratureData;
use crate::scalar::FieldScalar;
use nalgebra::{DMatrix, DVector, Point3, Vector3};
use std::borrow::Cow;

/// Where a pressure load acts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSurface {
    /// Side `n` of the element, with its outward normal
    Side(usize),
    /// The element mid-plane (lines and surfaces only)
    Face,
}

impl<T: FieldScalar> StructuralElement<T> {
    /// Pressure `p` acting along the surface normal: `f += ∫ Bᵗ (p n) dA`
    ///
    /// Reads the real field `"pressure"`.
    ///
    /// # Errors
    /// `FollowerForces` if follower forces are enabled, `InvalidGeometry` for
    /// the face form on a solid, and any field lookup error.
    ///
    /// # Returns
    /// Always `false`: the load does not depend on the state.
    pub fn surface_pressure_residual(
        &self,
        request_jacobian: bool,
        f: &mut DVector<T>,
        jac: &mut DMatrix<T>,
        surface: LoadSurface,
        bc: &BoundaryCondition,
    ) -> Result<bool> {
        self.check_load_outputs(request_jacobian, f, jac)?;
        let pressure = bc.get::<f64>("pressure")?;

        self.integrate_surface_load(f, surface, |point, normal| {
            let p = pressure.eval(point, self.time);
            Ok(T::lift_vector3(&(normal * p)))
        })?;
        Ok(false)
    }

    /// Pressure perturbation about a steady state:
    /// `force = p · dn + dp · n`
    ///
    /// Reads `"pressure"` (real steady pressure), `"dpressure"` (pressure
    /// perturbation) and `"dnormal"` (normal perturbation), the last two in
    /// the analysis scalar.
    ///
    /// # Errors
    /// Same as [`surface_pressure_residual`](Self::surface_pressure_residual).
    pub fn small_disturbance_surface_pressure_residual(
        &self,
        request_jacobian: bool,
        f: &mut DVector<T>,
        jac: &mut DMatrix<T>,
        surface: LoadSurface,
        bc: &BoundaryCondition,
    ) -> Result<bool> {
        self.check_load_outputs(request_jacobian, f, jac)?;
        let pressure = bc.get::<f64>("pressure")?;
        let dpressure = bc.get::<T>("dpressure")?;
        let dnormal = bc.get::<Vector3<T>>("dnormal")?;

        self.integrate_surface_load(f, surface, |point, normal| {
            let p = T::lift(pressure.eval(point, self.time));
            let dp = dpressure.eval(point, self.time);
            let dn = dnormal.eval(point, self.time);
            Ok(dn * p + T::lift_vector3(normal) * dp)
        })?;
        Ok(false)
    }

    /// Thermal load from a temperature rise over the reference:
    /// `f -= ∫ B_εᵗ (N_α ΔT) dV`
    ///
    /// `N_α` is the property card's thermal expansion resultant; `B_ε` maps
    /// the in-plane displacements to direct strains (`u,x` for lines,
    /// `[u,x, v,y, u,y + v,x]` for surfaces, Voigt order for solids).
    ///
    /// # Errors
    /// `MissingProperty` if the card has no thermal resultant,
    /// `InvalidGeometry` if the basis did not provide shape-function
    /// gradients, and any field lookup error.
    pub fn thermal_residual(
        &self,
        request_jacobian: bool,
        f: &mut DVector<T>,
        jac: &mut DMatrix<T>,
        bc: &BoundaryCondition,
    ) -> Result<bool> {
        self.check_vector("thermal residual", f)?;
        if request_jacobian {
            self.check_matrix("thermal jacobian", jac)?;
        }
        let resultant = self
            .property
            .thermal_expansion_resultant()
            .ok_or(ElementError::MissingProperty("thermal expansion resultant"))?;
        let temperature = bc.get::<f64>("temperature")?;
        let reference = bc.get::<f64>("ref_temperature")?;

        let n = self.n_nodes();
        let dim = self.dim();
        let n_strain = strain_components(dim);
        let mut f_local = DVector::<f64>::zeros(self.n_dofs());

        for qp in &self.quadrature.points {
            let dphi = qp.dphi.as_ref().ok_or_else(|| {
                ElementError::InvalidGeometry(
                    "quadrature has no shape function gradients".to_string(),
                )
            })?;
            ElementError::check_len("shape function gradient columns", dim, dphi.ncols())?;

            let point = self.global_point(qp);
            let delta_t = temperature.eval(&point, self.time) - reference.eval(&point, self.time);
            let stress = resultant.eval(&point, self.time) * delta_t;
            ElementError::check_len("thermal expansion resultant", n_strain, stress.len())?;

            let b_strain = strain_operator(dim, n, dphi);
            f_local -= b_strain.tr_mul(&stress) * qp.jxw;
        }

        self.add_local_vector(f, &T::lift_vector(&f_local))?;
        Ok(false)
    }

    fn check_load_outputs(
        &self,
        request_jacobian: bool,
        f: &DVector<T>,
        jac: &DMatrix<T>,
    ) -> Result<()> {
        if self.config.follower_forces {
            return Err(ElementError::FollowerForces { request_jacobian });
        }
        self.check_vector("load residual", f)?;
        if request_jacobian {
            self.check_matrix("load jacobian", jac)?;
        }
        Ok(())
    }

    fn load_quadrature(&self, surface: LoadSurface) -> Result<Cow<'_, QuadratureData>> {
        match surface {
            LoadSurface::Side(side) => {
                let quadrature = self.basis.side_quadrature(&self.local_nodes, side)?;
                ElementError::check_len(
                    "side shape functions",
                    self.n_nodes(),
                    quadrature.n_shape,
                )?;
                Ok(Cow::Owned(quadrature))
            }
            LoadSurface::Face if self.dim() < 3 => Ok(Cow::Borrowed(&self.quadrature)),
            LoadSurface::Face => Err(ElementError::InvalidGeometry(
                "face pressure requires a line or surface element".to_string(),
            )),
        }
    }

    /// Integrate a point force `force_at(global point, local normal)` over
    /// `surface` and add it to `f`
    fn integrate_surface_load<F>(
        &self,
        f: &mut DVector<T>,
        surface: LoadSurface,
        force_at: F,
    ) -> Result<()>
    where
        F: Fn(&Point3<f64>, &Vector3<f64>) -> Result<Vector3<T>>,
    {
        let quadrature = self.load_quadrature(surface)?;
        let mut face_normal = Vector3::zeros();
        if self.dim() < 3 {
            face_normal[self.dim()] = -1.0;
        }

        let mut op = BlockOperator::new(N_COMPONENTS, DVector::zeros(self.n_nodes()));
        let mut f_local = DVector::zeros(self.n_dofs());
        let mut point_load = DVector::zeros(N_COMPONENTS);

        for qp in &quadrature.points {
            let normal = match surface {
                LoadSurface::Side(side) => qp.normal.ok_or_else(|| {
                    ElementError::InvalidGeometry(format!(
                        "side {} quadrature has no normals",
                        side
                    ))
                })?,
                LoadSurface::Face => face_normal,
            };
            let force = force_at(&self.global_point(qp), &normal)?;
            point_load.fixed_rows_mut::<3>(0).copy_from(&force);

            op.reinit(N_COMPONENTS, &qp.phi);
            f_local += op.vector_mult_transpose(&point_load)? * T::lift(qp.jxw);
        }

        self.add_local_vector(f, &f_local)
    }
}

fn strain_components(dim: usize) -> usize {
    match dim {
        1 => 1,
        2 => 3,
        _ => 6,
    }
}

/// Direct strain operator `B_ε` (`n_strain × 6n`)
fn strain_operator(dim: usize, n: usize, dphi: &DMatrix<f64>) -> DMatrix<f64> {
    let mut b = DMatrix::zeros(strain_components(dim), N_COMPONENTS * n);
    // (strain row, displacement component, derivative direction)
    let terms: &[(usize, usize, usize)] = match dim {
        1 => &[(0, 0, 0)],
        2 => &[(0, 0, 0), (1, 1, 1), (2, 0, 1), (2, 1, 0)],
        _ => &[
            (0, 0, 0),
            (1, 1, 1),
            (2, 2, 2),
            (3, 0, 1),
            (3, 1, 0),
            (4, 1, 2),
            (4, 2, 1),
            (5, 2, 0),
            (5, 0, 2),
        ],
    };
    for &(row, component, direction) in terms {
        for i in 0..n {
            b[(row, component * n + i)] += dphi[(i, direction)];
        }
    }
    b
}
