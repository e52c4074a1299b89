//! Element-attached local coordinate frames.
//!
//! Lines and surfaces are formulated in a frame whose x-axis follows the
//! element (and whose z-axis is the surface normal for surfaces). The frame
//! stores the rotation `T` whose columns are the local axes expressed in
//! global coordinates, so `x_global = origin + T * x_local`.
//!
//! Solids need no reduction: their frame is the global one.

use crate::error::{ElementError, Result};
use nalgebra::{Matrix3, Point3, Vector3};

const GEOMETRY_TOL: f64 = 1e-12;

/// Local frame of a 1-D, 2-D or 3-D element
#[derive(Debug, Clone, PartialEq)]
pub enum LocalFrame {
    /// Beam/bar: x along the element, y from the orientation vector
    Line {
        origin: Point3<f64>,
        rotation: Matrix3<f64>,
    },
    /// Plate/shell: x along the first edge, z along the normal
    Surface {
        origin: Point3<f64>,
        rotation: Matrix3<f64>,
    },
    /// Solid: identity
    Solid,
}

impl LocalFrame {
    /// Build the frame for an element of topological dimension `dim`
    ///
    /// # Arguments
    /// * `dim` - element dimension (1, 2 or 3)
    /// * `nodes` - global nodal coordinates
    /// * `y_reference` - orientation vector, required for lines
    ///
    /// # Errors
    /// `UnsupportedDimension` for any other dimension, `InvalidGeometry` for
    /// missing nodes, zero length/area or a reference vector parallel to the
    /// element axis.
    pub fn build(
        dim: usize,
        nodes: &[Point3<f64>],
        y_reference: Option<&Vector3<f64>>,
    ) -> Result<Self> {
        match dim {
            1 => Self::line(nodes, y_reference),
            2 => Self::surface(nodes),
            3 => Ok(LocalFrame::Solid),
            other => Err(ElementError::UnsupportedDimension(other)),
        }
    }

    fn line(nodes: &[Point3<f64>], y_reference: Option<&Vector3<f64>>) -> Result<Self> {
        if nodes.len() < 2 {
            return Err(ElementError::InvalidGeometry(format!(
                "line element requires at least 2 nodes, got {}",
                nodes.len()
            )));
        }
        let y_ref = y_reference.ok_or_else(|| {
            ElementError::InvalidGeometry("line element requires an orientation vector".to_string())
        })?;

        let axis = nodes[1] - nodes[0];
        let length = axis.norm();
        if length < GEOMETRY_TOL {
            return Err(ElementError::InvalidGeometry("line element has zero length".to_string()));
        }
        let ex = axis / length;

        let ez = ex.cross(y_ref);
        let ez_norm = ez.norm();
        if ez_norm < GEOMETRY_TOL * y_ref.norm().max(1.0) {
            return Err(ElementError::InvalidGeometry(
                "orientation vector is parallel to the element axis".to_string(),
            ));
        }
        let ez = ez / ez_norm;
        let ey = ez.cross(&ex);

        Ok(LocalFrame::Line {
            origin: nodes[0],
            rotation: Matrix3::from_columns(&[ex, ey, ez]),
        })
    }

    fn surface(nodes: &[Point3<f64>]) -> Result<Self> {
        if nodes.len() < 3 {
            return Err(ElementError::InvalidGeometry(format!(
                "surface element requires at least 3 nodes, got {}",
                nodes.len()
            )));
        }

        let v1 = nodes[1] - nodes[0];
        let v2 = nodes[2] - nodes[0];
        let length = v1.norm();
        let normal = v1.cross(&v2);
        let area = normal.norm();
        if length < GEOMETRY_TOL || area < GEOMETRY_TOL * length {
            return Err(ElementError::InvalidGeometry(
                "surface element has degenerate geometry (zero normal)".to_string(),
            ));
        }

        let ex = v1 / length;
        let ez = normal / area;
        let ey = ez.cross(&ex);

        Ok(LocalFrame::Surface {
            origin: nodes[0],
            rotation: Matrix3::from_columns(&[ex, ey, ez]),
        })
    }

    /// Topological dimension this frame was built for
    pub fn dim(&self) -> usize {
        match self {
            LocalFrame::Line { .. } => 1,
            LocalFrame::Surface { .. } => 2,
            LocalFrame::Solid => 3,
        }
    }

    /// Rotation `T` (local axes as columns)
    pub fn rotation(&self) -> Matrix3<f64> {
        match self {
            LocalFrame::Line { rotation, .. } | LocalFrame::Surface { rotation, .. } => *rotation,
            LocalFrame::Solid => Matrix3::identity(),
        }
    }

    /// Whether results must be rotated before entering global storage
    pub fn requires_transform(&self) -> bool {
        !matches!(self, LocalFrame::Solid)
    }

    /// Map a point given in the local frame to global coordinates
    pub fn global_coordinates(&self, local: &Point3<f64>) -> Point3<f64> {
        match self {
            LocalFrame::Line { origin, rotation } | LocalFrame::Surface { origin, rotation } => {
                origin + rotation * local.coords
            }
            LocalFrame::Solid => *local,
        }
    }

    /// Map a global point into the local frame
    pub fn local_coordinates(&self, global: &Point3<f64>) -> Point3<f64> {
        match self {
            LocalFrame::Line { origin, rotation } | LocalFrame::Surface { origin, rotation } => {
                Point3::from(rotation.transpose() * (global - origin))
            }
            LocalFrame::Solid => *global,
        }
    }
}
