//! Inertial residual `f = M · ẍ` and its tangent w.r.t. the acceleration.

use super::{N_COMPONENTS, StructuralElement};
use crate::error::{ElementError, Result};
use crate::operator::BlockOperator;
use crate::scalar::FieldScalar;
use nalgebra::{DMatrix, DVector};

impl<T: FieldScalar> StructuralElement<T> {
    /// Add the inertial force to `f` and, on request, the mass matrix to
    /// `jac_xddot`
    ///
    /// With a lumped property card the inertia matrix is sampled once at the
    /// first quadrature point and every node receives `vol / n_nodes` of each
    /// diagonal entry. Otherwise the consistent mass `∫ Bᵗ M B dV` is
    /// integrated. `jac_xdot` and `jac` are part of the residual signature but
    /// receive nothing.
    ///
    /// # Returns
    /// `request_jacobian`
    pub fn inertial_residual(
        &self,
        request_jacobian: bool,
        f: &mut DVector<T>,
        jac_xddot: &mut DMatrix<T>,
        jac_xdot: &mut DMatrix<T>,
        jac: &mut DMatrix<T>,
    ) -> Result<bool> {
        self.check_vector("inertial residual", f)?;
        if request_jacobian {
            self.check_matrix("inertial jac_xddot", jac_xddot)?;
            self.check_matrix("inertial jac_xdot", jac_xdot)?;
            self.check_matrix("inertial jac", jac)?;
        }

        let (f_local, mass) = if self.property.if_diagonal_mass_matrix() {
            self.lumped_inertia()?
        } else {
            self.consistent_inertia(request_jacobian)?
        };

        self.add_local_vector(f, &f_local)?;
        if request_jacobian {
            self.add_local_matrix(jac_xddot, &mass)?;
        }
        Ok(request_jacobian)
    }

    fn lumped_inertia(&self) -> Result<(DVector<T>, DMatrix<T>)> {
        let n = self.n_nodes();
        let qp = self.quadrature.points.first().ok_or_else(|| {
            ElementError::InvalidGeometry("element quadrature has no points".to_string())
        })?;

        let inertia = self
            .property
            .inertia_matrix()
            .eval(&self.global_point(qp), self.time);
        check_inertia(&inertia)?;

        let vol = self.quadrature.total_weight() / n as f64;
        let mut mass = DMatrix::zeros(self.n_dofs(), self.n_dofs());
        for c in 0..N_COMPONENTS {
            for i in 0..n {
                let idx = c * n + i;
                mass[(idx, idx)] = T::lift(vol * inertia[(c, c)]);
            }
        }

        let f_local = &mass * &self.local_accel;
        Ok((f_local, mass))
    }

    fn consistent_inertia(&self, request_jacobian: bool) -> Result<(DVector<T>, DMatrix<T>)> {
        let inertia_field = self.property.inertia_matrix();
        let mut op = BlockOperator::new(N_COMPONENTS, DVector::zeros(self.n_nodes()));
        let mut f_local = DVector::zeros(self.n_dofs());
        let mut mass = DMatrix::zeros(self.n_dofs(), self.n_dofs());

        for qp in &self.quadrature.points {
            let inertia = inertia_field.eval(&self.global_point(qp), self.time);
            check_inertia(&inertia)?;

            op.reinit(N_COMPONENTS, &qp.phi);
            let m = T::lift_matrix(&inertia);
            let jxw = T::lift(qp.jxw);

            let point_force = &m * op.vector_mult(&self.local_accel)?;
            f_local += op.vector_mult_transpose(&point_force)? * jxw;
            if request_jacobian {
                let mb = op.left_multiply(&m)?;
                mass += op.right_multiply_transpose(&mb)? * jxw;
            }
        }
        Ok((f_local, mass))
    }
}

fn check_inertia(m: &DMatrix<f64>) -> Result<()> {
    ElementError::check_len("inertia matrix rows", N_COMPONENTS, m.nrows())?;
    ElementError::check_len("inertia matrix columns", N_COMPONENTS, m.ncols())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::basis::LagrangeBasis;
    use crate::config::ElementConfig;
    use crate::elements::{ElementGeometry, ElementKind};
    use crate::property::SectionProperty;
    use nalgebra::Point3;
    use num_complex::Complex64;
    use std::sync::Arc;

    fn zeros(n: usize) -> (DVector<f64>, DMatrix<f64>, DMatrix<f64>, DMatrix<f64>) {
        (
            DVector::zeros(n),
            DMatrix::zeros(n, n),
            DMatrix::zeros(n, n),
            DMatrix::zeros(n, n),
        )
    }

    /// Sum of the translational x-block of the mass matrix
    fn total_x_mass(m: &DMatrix<f64>, n_nodes: usize) -> f64 {
        let mut total = 0.0;
        for i in 0..n_nodes {
            for j in 0..n_nodes {
                total += m[(i, j)];
            }
        }
        total
    }

    #[test]
    fn lumped_mass_total_is_volume_times_inertia() {
        let card = SectionProperty::plate(1000.0, 0.02).with_lumped_mass(true);
        let el: StructuralElement<f64> = plate(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 1.5, 0.0),
                Point3::new(0.0, 1.5, 0.0),
            ],
            card,
        );
        let (mut f, mut m, mut c, mut k) = zeros(24);

        assert!(el.inertial_residual(true, &mut f, &mut m, &mut c, &mut k).unwrap());
        // area 3, ρh = 20
        assert!((total_x_mass(&m, 4) - 60.0).abs() < 1e-10);
        assert_eq!(c.norm(), 0.0);
        assert_eq!(k.norm(), 0.0);

        // off-diagonal entries stay empty
        assert_eq!(m[(0, 1)], 0.0);
    }

    #[test]
    fn lumped_mass_independent_of_quadrature_refinement() {
        let nodes = vec![Point3::origin(), Point3::new(4.0, 0.0, 0.0)];
        let card = Arc::new(steel_beam().with_lumped_mass(true));

        let mut totals = Vec::new();
        for order in 1..=4 {
            let basis = Arc::new(LagrangeBasis::for_dimension(1, order).unwrap());
            let el = StructuralElement::<f64>::new(
                ElementKind::Line,
                ElementGeometry::new(nodes.clone(), 0),
                basis,
                card.clone(),
                ElementConfig::default(),
            )
            .unwrap();

            let (mut f, mut m, mut c, mut k) = zeros(12);
            el.inertial_residual(true, &mut f, &mut m, &mut c, &mut k).unwrap();
            totals.push(total_x_mass(&m, 2));
        }
        // ρA L = 78.5 * 4
        for total in totals {
            assert!((total - 314.0).abs() < 1e-9);
        }
    }

    #[test]
    fn consistent_mass_is_symmetric_and_conserves_mass() {
        let el: StructuralElement<f64> = beam(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            steel_beam(),
        );
        let (mut f, mut m, mut c, mut k) = zeros(12);

        el.inertial_residual(true, &mut f, &mut m, &mut c, &mut k).unwrap();
        assert!((&m - m.transpose()).norm() < 1e-10 * m.norm());

        // rigid translation along global x: total force = ρA L a
        let mut accel = DVector::zeros(12);
        accel[0] = 1.0;
        accel[1] = 1.0;
        let mut el = el;
        el.set_acceleration(&accel, false).unwrap();

        let (mut f, mut m, mut c, mut k) = zeros(12);
        el.inertial_residual(false, &mut f, &mut m, &mut c, &mut k).unwrap();
        let length = 2f64.sqrt();
        assert!((f[0] + f[1] - 78.5 * length).abs() < 1e-9);
        assert!((f[2] + f[3]).abs() < 1e-9);
        assert_eq!(m.norm(), 0.0);
    }

    #[test]
    fn residual_matches_tangent_times_acceleration() {
        let mut el: StructuralElement<Complex64> = beam(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
            SectionProperty::beam(2700.0, 0.02, 1e-6, 2e-6, nalgebra::Vector3::x()),
        );
        let accel = DVector::from_fn(12, |i, _| Complex64::new(i as f64, 1.0));
        el.set_acceleration(&accel, false).unwrap();

        let mut f = DVector::zeros(12);
        let mut m = DMatrix::zeros(12, 12);
        let mut c = DMatrix::zeros(12, 12);
        let mut k = DMatrix::zeros(12, 12);
        assert!(el.inertial_residual(true, &mut f, &mut m, &mut c, &mut k).unwrap());

        assert!((&f - &m * &accel).norm() < 1e-9 * f.norm());
    }

    #[test]
    fn rejects_wrong_output_sizes() {
        let el: StructuralElement<f64> =
            beam(Point3::origin(), Point3::new(1.0, 0.0, 0.0), steel_beam());
        let (mut f, mut m, mut c, _) = zeros(12);
        let mut small = DMatrix::zeros(6, 6);

        assert!(el.inertial_residual(true, &mut f, &mut m, &mut c, &mut small).is_err());
        // sizes of unused tangents are not checked without a Jacobian request
        assert!(el.inertial_residual(false, &mut f, &mut m, &mut c, &mut small).is_ok());
    }
}
