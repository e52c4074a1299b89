//! Interpolation operator for blocked nodal fields.
//!
//! For `w` field components and `n` shape functions the nodal DOF vector is
//! blocked by component: entry `j * n + i` is component `j` at node `i`. The
//! operator `B` (`w × w·n`) interpolates it at a point,
//!
//! ```text
//! B[j, j*n + i] = φ_i
//! ```
//!
//! so `Bᵗ` scatters a point quantity back onto the nodes with the Galerkin
//! test-function weights. `B` is never formed; each product below works on
//! the shape-function values directly.

use crate::error::{ElementError, Result};
use crate::scalar::FieldScalar;
use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, PartialEq)]
pub struct BlockOperator {
    n_fields: usize,
    phi: DVector<f64>,
}

impl BlockOperator {
    pub fn new(n_fields: usize, phi: DVector<f64>) -> Self {
        Self { n_fields, phi }
    }

    /// Reuse the operator for another quadrature point
    pub fn reinit(&mut self, n_fields: usize, phi: &DVector<f64>) {
        self.n_fields = n_fields;
        self.phi.clone_from(phi);
    }

    pub fn n_fields(&self) -> usize {
        self.n_fields
    }

    pub fn n_shape(&self) -> usize {
        self.phi.len()
    }

    /// Number of columns of `B`
    pub fn n_dofs(&self) -> usize {
        self.n_fields * self.phi.len()
    }

    /// `M · B` for `M` of size `r × w`; returns `r × w·n`
    pub fn left_multiply<T: FieldScalar>(&self, m: &DMatrix<T>) -> Result<DMatrix<T>> {
        ElementError::check_len("left_multiply columns", self.n_fields, m.ncols())?;
        let n = self.n_shape();
        let mut out = DMatrix::zeros(m.nrows(), self.n_dofs());

        for j in 0..self.n_fields {
            for i in 0..n {
                let phi = T::lift(self.phi[i]);
                for r in 0..m.nrows() {
                    out[(r, j * n + i)] = m[(r, j)] * phi;
                }
            }
        }
        Ok(out)
    }

    /// `Bᵗ · M` for `M` of size `w × c`; returns `w·n × c`
    pub fn right_multiply_transpose<T: FieldScalar>(&self, m: &DMatrix<T>) -> Result<DMatrix<T>> {
        ElementError::check_len("right_multiply_transpose rows", self.n_fields, m.nrows())?;
        let n = self.n_shape();
        let mut out = DMatrix::zeros(self.n_dofs(), m.ncols());

        for j in 0..self.n_fields {
            for i in 0..n {
                let phi = T::lift(self.phi[i]);
                for c in 0..m.ncols() {
                    out[(j * n + i, c)] = phi * m[(j, c)];
                }
            }
        }
        Ok(out)
    }

    /// `Bᵗ · v` for `v` of length `w`; returns length `w·n`
    pub fn vector_mult_transpose<T: FieldScalar>(&self, v: &DVector<T>) -> Result<DVector<T>> {
        ElementError::check_len("vector_mult_transpose", self.n_fields, v.len())?;
        let n = self.n_shape();
        let mut out = DVector::zeros(self.n_dofs());

        for j in 0..self.n_fields {
            for i in 0..n {
                out[j * n + i] = T::lift(self.phi[i]) * v[j];
            }
        }
        Ok(out)
    }

    /// `B · q` for `q` of length `w·n`; interpolates the field at the point
    pub fn vector_mult<T: FieldScalar>(&self, q: &DVector<T>) -> Result<DVector<T>> {
        ElementError::check_len("vector_mult", self.n_dofs(), q.len())?;
        let n = self.n_shape();

        Ok(DVector::from_fn(self.n_fields, |j, _| {
            (0..n).fold(T::lift(0.0), |acc, i| acc + T::lift(self.phi[i]) * q[j * n + i])
        }))
    }
}
