//! Reference Lagrange basis for 2-node lines, 4-node quadrilaterals and
//! 8-node hexahedra.
//!
//! All three are tensor-product elements on `[-1, 1]^dim` with
//!
//! ```text
//! N_i(ξ) = Π_k (1 + ξ_k ξ_ik) / 2^dim
//! ```
//!
//! Node ordering:
//! ```text
//!  Edge2:  0 -------- 1          Quad4:  3 -------- 2
//!         ξ=-1      ξ=+1                 |          |
//!                                        |          |
//!                                        0 -------- 1
//!
//!  Hex8:     7----------6
//!           /|         /|
//!          4----------5 |
//!          | 3--------|-2
//!          |/         |/
//!          0----------1
//! ```
//!
//! Sides follow the usual numbering: line sides are the end points, quad
//! sides the edges `0-1, 1-2, 2-3, 3-0`, hex sides the faces `ζ=-1, η=-1,
//! ξ=+1, η=+1, ξ=-1, ζ=+1`. Side normals point away from the element
//! centroid.
//!
//! Line and quadrilateral nodes are given in the element's local frame, so a
//! quadrilateral must lie in its local x-y plane; warped quadrilaterals are
//! rejected.

use crate::error::{ElementError, Result};
use crate::quadrature::{BasisProvider, QuadratureData, QuadraturePoint, gauss_legendre};
use nalgebra::{DMatrix, DVector, Matrix2, Matrix3, Point3, Vector3};

const JACOBIAN_TOL: f64 = 1e-14;
const PLANAR_TOL: f64 = 1e-10;

/// Natural coordinates of the element nodes
const EDGE2_NODES: [[f64; 3]; 2] = [[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
const QUAD4_NODES: [[f64; 3]; 4] = [
    [-1.0, -1.0, 0.0],
    [1.0, -1.0, 0.0],
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
];
const HEX8_NODES: [[f64; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

/// (fixed natural axis, fixed value) of each side
const EDGE2_SIDES: [(usize, f64); 2] = [(0, -1.0), (0, 1.0)];
const QUAD4_SIDES: [(usize, f64); 4] = [(1, -1.0), (0, 1.0), (1, 1.0), (0, -1.0)];
const HEX8_SIDES: [(usize, f64); 6] = [
    (2, -1.0),
    (1, -1.0),
    (0, 1.0),
    (1, 1.0),
    (0, -1.0),
    (2, 1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagrangeShape {
    Edge2,
    Quad4,
    Hex8,
}

impl LagrangeShape {
    pub fn dim(&self) -> usize {
        match self {
            LagrangeShape::Edge2 => 1,
            LagrangeShape::Quad4 => 2,
            LagrangeShape::Hex8 => 3,
        }
    }

    fn reference_nodes(&self) -> &'static [[f64; 3]] {
        match self {
            LagrangeShape::Edge2 => &EDGE2_NODES,
            LagrangeShape::Quad4 => &QUAD4_NODES,
            LagrangeShape::Hex8 => &HEX8_NODES,
        }
    }

    fn sides(&self) -> &'static [(usize, f64)] {
        match self {
            LagrangeShape::Edge2 => &EDGE2_SIDES,
            LagrangeShape::Quad4 => &QUAD4_SIDES,
            LagrangeShape::Hex8 => &HEX8_SIDES,
        }
    }

    /// Shape function values at natural coordinates `xi`
    pub fn shape_functions(&self, xi: &[f64; 3]) -> DVector<f64> {
        let dim = self.dim();
        let scale = 0.5f64.powi(dim as i32);
        let nodes = self.reference_nodes();

        DVector::from_fn(nodes.len(), |i, _| {
            (0..dim).map(|k| 1.0 + xi[k] * nodes[i][k]).product::<f64>() * scale
        })
    }

    /// Derivatives w.r.t. the natural coordinates, `n × dim`
    pub fn shape_derivatives(&self, xi: &[f64; 3]) -> DMatrix<f64> {
        let dim = self.dim();
        let scale = 0.5f64.powi(dim as i32);
        let nodes = self.reference_nodes();

        DMatrix::from_fn(nodes.len(), dim, |i, m| {
            let others: f64 = (0..dim)
                .filter(|&k| k != m)
                .map(|k| 1.0 + xi[k] * nodes[i][k])
                .product();
            nodes[i][m] * others * scale
        })
    }
}

/// Lagrange basis with a tensor Gauss rule of `order` points per direction
#[derive(Debug, Clone, PartialEq)]
pub struct LagrangeBasis {
    shape: LagrangeShape,
    order: usize,
}

impl LagrangeBasis {
    pub fn new(shape: LagrangeShape, order: usize) -> Result<Self> {
        gauss_legendre(order)?;
        Ok(Self { shape, order })
    }

    /// Default basis for an element of dimension `dim`
    pub fn for_dimension(dim: usize, order: usize) -> Result<Self> {
        let shape = match dim {
            1 => LagrangeShape::Edge2,
            2 => LagrangeShape::Quad4,
            3 => LagrangeShape::Hex8,
            other => return Err(ElementError::UnsupportedDimension(other)),
        };
        Self::new(shape, order)
    }

    pub fn shape(&self) -> LagrangeShape {
        self.shape
    }

    /// Node count, and for quadrilaterals flatness in the local x-y plane
    fn check_nodes(&self, nodes: &[Point3<f64>]) -> Result<()> {
        ElementError::check_len("element node count", self.n_nodes(), nodes.len())?;
        if self.shape == LagrangeShape::Quad4 {
            let size = nodes.iter().map(|p| p.coords.amax()).fold(0.0, f64::max);
            if let Some(p) = nodes.iter().find(|p| p.z.abs() > PLANAR_TOL * size) {
                return Err(ElementError::InvalidGeometry(format!(
                    "quadrilateral is not planar: local node at z = {:e}",
                    p.z
                )));
            }
        }
        Ok(())
    }

    /// Tensor-product Gauss points in `dims` directions: (ξ, weight)
    fn tensor_rule(&self, dims: usize) -> Result<Vec<([f64; 3], f64)>> {
        let rule = gauss_legendre(self.order)?;
        let mut points = vec![([0.0; 3], 1.0)];
        for k in 0..dims {
            points = points
                .into_iter()
                .flat_map(|(xi, w)| {
                    rule.iter().map(move |&(x, wx)| {
                        let mut next = xi;
                        next[k] = x;
                        (next, w * wx)
                    })
                })
                .collect();
        }
        Ok(points)
    }

    /// Position and tangent vectors `dx/dξ_m` (as columns) at `xi`
    fn interpolate(
        &self,
        nodes: &[Point3<f64>],
        xi: &[f64; 3],
    ) -> (Point3<f64>, DVector<f64>, DMatrix<f64>, DMatrix<f64>) {
        let phi = self.shape.shape_functions(xi);
        let dphi = self.shape.shape_derivatives(xi);

        let mut x = Vector3::zeros();
        let mut tangents = DMatrix::zeros(3, self.shape.dim());
        for (i, node) in nodes.iter().enumerate() {
            x += node.coords * phi[i];
            for m in 0..self.shape.dim() {
                for r in 0..3 {
                    tangents[(r, m)] += node.coords[r] * dphi[(i, m)];
                }
            }
        }
        (Point3::from(x), phi, dphi, tangents)
    }

    /// Determinant of the mapping and natural-to-local gradient transform
    fn local_gradients(
        &self,
        dphi: &DMatrix<f64>,
        tangents: &DMatrix<f64>,
    ) -> Result<(f64, DMatrix<f64>)> {
        match self.shape {
            LagrangeShape::Edge2 => {
                // line elements lie on their local x-axis
                let dx = tangents[(0, 0)];
                if dx.abs() < JACOBIAN_TOL {
                    return Err(ElementError::InvalidGeometry(
                        "line element is not aligned with its local x-axis".to_string(),
                    ));
                }
                Ok((dx.abs(), dphi / dx))
            }
            LagrangeShape::Quad4 => {
                let j = Matrix2::new(
                    tangents[(0, 0)],
                    tangents[(0, 1)],
                    tangents[(1, 0)],
                    tangents[(1, 1)],
                );
                let det = j.determinant();
                let inv = j.try_inverse().filter(|_| det > JACOBIAN_TOL).ok_or_else(|| {
                    ElementError::InvalidGeometry(format!("non-positive Jacobian {:e}", det))
                })?;
                let inv = DMatrix::from_fn(2, 2, |r, c| inv[(r, c)]);
                Ok((det, dphi * inv))
            }
            LagrangeShape::Hex8 => {
                let j = Matrix3::from_fn(|r, c| tangents[(r, c)]);
                let det = j.determinant();
                let inv = j.try_inverse().filter(|_| det > JACOBIAN_TOL).ok_or_else(|| {
                    ElementError::InvalidGeometry(format!("non-positive Jacobian {:e}", det))
                })?;
                let inv = DMatrix::from_fn(3, 3, |r, c| inv[(r, c)]);
                Ok((det, dphi * inv))
            }
        }
    }
}

impl BasisProvider for LagrangeBasis {
    fn n_nodes(&self) -> usize {
        self.shape.reference_nodes().len()
    }

    fn n_sides(&self) -> usize {
        self.shape.sides().len()
    }

    fn element_quadrature(&self, nodes: &[Point3<f64>]) -> Result<QuadratureData> {
        self.check_nodes(nodes)?;

        let mut points = Vec::new();
        for (xi, w) in self.tensor_rule(self.shape.dim())? {
            let (xyz, phi, dphi, tangents) = self.interpolate(nodes, &xi);
            let (det, gradients) = self.local_gradients(&dphi, &tangents)?;
            points.push(QuadraturePoint {
                xyz,
                jxw: w * det,
                phi,
                normal: None,
                dphi: Some(gradients),
            });
        }
        QuadratureData::new(self.n_nodes(), points)
    }

    fn side_quadrature(&self, nodes: &[Point3<f64>], side: usize) -> Result<QuadratureData> {
        self.check_nodes(nodes)?;
        let &(axis, value) = self.shape.sides().get(side).ok_or_else(|| {
            ElementError::InvalidGeometry(format!(
                "side {} out of range for {:?} ({} sides)",
                side,
                self.shape,
                self.n_sides()
            ))
        })?;

        let centroid = nodes.iter().map(|p| p.coords).sum::<Vector3<f64>>() / nodes.len() as f64;
        let free: Vec<usize> = (0..self.shape.dim()).filter(|&k| k != axis).collect();

        let mut points = Vec::new();
        for (mut xi, w) in self.tensor_rule(free.len())? {
            // spread the rule coordinates onto the free axes
            let rule_coords = xi;
            xi = [0.0; 3];
            for (slot, &k) in free.iter().enumerate() {
                xi[k] = rule_coords[slot];
            }
            xi[axis] = value;

            let (xyz, phi, _, tangents) = self.interpolate(nodes, &xi);
            let column =
                |m: usize| Vector3::new(tangents[(0, m)], tangents[(1, m)], tangents[(2, m)]);

            let (raw_normal, measure) = match free.as_slice() {
                [] => {
                    let t = column(axis);
                    (t, 1.0)
                }
                [a] => {
                    let t = column(*a);
                    let surface = column(0).cross(&column(1));
                    (t.cross(&surface), t.norm())
                }
                [a, b] => {
                    let n = column(*a).cross(&column(*b));
                    let measure = n.norm();
                    (n, measure)
                }
                _ => unreachable!("at most two free axes on a side"),
            };

            let length = raw_normal.norm();
            if length < JACOBIAN_TOL {
                return Err(ElementError::InvalidGeometry(format!(
                    "side {} has a degenerate normal",
                    side
                )));
            }
            let mut normal = raw_normal / length;
            if normal.dot(&(xyz.coords - centroid)) < 0.0 {
                normal = -normal;
            }

            points.push(QuadraturePoint {
                xyz,
                jxw: w * measure,
                phi,
                normal: Some(normal),
                dphi: None,
            });
        }
        QuadratureData::new(self.n_nodes(), points)
    }
}
