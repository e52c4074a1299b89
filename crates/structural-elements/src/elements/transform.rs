//! Rotation of element vectors and matrices between the local and the
//! global frame.
//!
//! The element rotation `E` applies the frame rotation `T` to the
//! translations `[u, v, w]` and again to the rotations `[θx, θy, θz]` of
//! every node. `E` is block diagonal per node, so it is applied in place on
//! 3-vectors gathered from the blocked layout rather than formed as a
//! `6n × 6n` matrix.

use super::{N_COMPONENTS, StructuralElement};
use crate::error::{ElementError, Result};
use crate::scalar::FieldScalar;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};

/// Apply `r` to the translation and rotation triplets of every node
fn rotate_blocks<T: FieldScalar>(r: &Matrix3<T>, n_nodes: usize, v: &mut DVector<T>) {
    for offset in [0, 3] {
        for i in 0..n_nodes {
            let idx = |c: usize| (offset + c) * n_nodes + i;
            let rotated = r * Vector3::new(v[idx(0)], v[idx(1)], v[idx(2)]);
            for c in 0..3 {
                v[idx(c)] = rotated[c];
            }
        }
    }
}

/// `E · M`, rotating every column of `m`
fn rotate_columns<T: FieldScalar>(r: &Matrix3<T>, n_nodes: usize, m: &DMatrix<T>) -> DMatrix<T> {
    let mut out = m.clone();
    for c in 0..m.ncols() {
        let mut column = m.column(c).into_owned();
        rotate_blocks(r, n_nodes, &mut column);
        out.set_column(c, &column);
    }
    out
}

/// `E · v` for a vector in the blocked six-component layout
pub fn rotate_vector<T: FieldScalar>(
    rotation: &Matrix3<f64>,
    v: &DVector<T>,
) -> Result<DVector<T>> {
    let n_nodes = blocked_nodes(v.len())?;
    let mut out = v.clone();
    rotate_blocks(&rotation.map(T::lift), n_nodes, &mut out);
    Ok(out)
}

/// `E · M · Eᵗ` for a square matrix in the blocked six-component layout
pub fn rotate_matrix<T: FieldScalar>(
    rotation: &Matrix3<f64>,
    m: &DMatrix<T>,
) -> Result<DMatrix<T>> {
    ElementError::check_len("matrix transform (square)", m.nrows(), m.ncols())?;
    let n_nodes = blocked_nodes(m.nrows())?;
    let r = rotation.map(T::lift);

    // (E · (E · M)ᵗ)ᵗ = E · M · Eᵗ
    let em = rotate_columns(&r, n_nodes, m);
    Ok(rotate_columns(&r, n_nodes, &em.transpose()).transpose())
}

fn blocked_nodes(len: usize) -> Result<usize> {
    if len % N_COMPONENTS != 0 {
        return Err(ElementError::DimensionMismatch {
            context: "six-component blocked layout",
            expected: N_COMPONENTS * (len / N_COMPONENTS + 1),
            found: len,
        });
    }
    Ok(len / N_COMPONENTS)
}

impl<T: FieldScalar> StructuralElement<T> {
    /// Global-frame vector to the element frame: `Eᵗ · v`
    pub fn transform_vector_to_local(&self, global: &DVector<T>) -> Result<DVector<T>> {
        self.check_vector("transform_vector_to_local", global)?;
        if !self.frame.requires_transform() {
            return Ok(global.clone());
        }
        rotate_vector(&self.frame.rotation().transpose(), global)
    }

    /// Element-frame vector to the global frame: `E · v`
    pub fn transform_vector_to_global(&self, local: &DVector<T>) -> Result<DVector<T>> {
        self.check_vector("transform_vector_to_global", local)?;
        if !self.frame.requires_transform() {
            return Ok(local.clone());
        }
        rotate_vector(&self.frame.rotation(), local)
    }

    /// Element-frame matrix to the global frame: `E · M · Eᵗ`
    pub fn transform_matrix_to_global(&self, local: &DMatrix<T>) -> Result<DMatrix<T>> {
        self.check_matrix("transform_matrix_to_global", local)?;
        if !self.frame.requires_transform() {
            return Ok(local.clone());
        }
        rotate_matrix(&self.frame.rotation(), local)
    }
}
