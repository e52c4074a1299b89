//! Quadrature snapshots and the basis-provider contract.
//!
//! A basis provider tabulates shape functions on an element (or one of its
//! sides) whose nodes are given in the element's local frame. The result is an
//! immutable [`QuadratureData`] consumed read-only by the residual routines.

use crate::error::{ElementError, Result};
use nalgebra::{DMatrix, DVector, Point3, Vector3};

/// Values tabulated at one quadrature point
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraturePoint {
    /// Location in the element local frame
    pub xyz: Point3<f64>,
    /// Integration weight times the mapping Jacobian
    pub jxw: f64,
    /// Shape-function values, one per element node
    pub phi: DVector<f64>,
    /// Outward unit normal (side quadrature only)
    pub normal: Option<Vector3<f64>>,
    /// Shape-function gradients w.r.t. the local coordinates, `n × dim`
    pub dphi: Option<DMatrix<f64>>,
}

/// All quadrature points of an element or a side
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureData {
    pub n_shape: usize,
    pub points: Vec<QuadraturePoint>,
}

impl QuadratureData {
    pub fn new(n_shape: usize, points: Vec<QuadraturePoint>) -> Result<Self> {
        for qp in &points {
            ElementError::check_len("shape function values", n_shape, qp.phi.len())?;
        }
        Ok(Self { n_shape, points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of all `JxW`: the element length, area or volume
    pub fn total_weight(&self) -> f64 {
        self.points.iter().map(|qp| qp.jxw).sum()
    }
}

/// Shape-function and quadrature tabulation for one element type
pub trait BasisProvider: Send + Sync {
    /// Number of nodes (shape functions)
    fn n_nodes(&self) -> usize;

    /// Number of sides (points for lines, edges for surfaces, faces for solids)
    fn n_sides(&self) -> usize;

    /// Quadrature over the element interior
    fn element_quadrature(&self, nodes: &[Point3<f64>]) -> Result<QuadratureData>;

    /// Quadrature over `side`, with outward normals and full-element shape
    /// functions
    fn side_quadrature(&self, nodes: &[Point3<f64>], side: usize) -> Result<QuadratureData>;
}

/// Gauss–Legendre points and weights on [-1, 1]
///
/// # Errors
/// `InvalidConfig` unless `n_points` is between 1 and 4.
pub fn gauss_legendre(n_points: usize) -> Result<&'static [(f64, f64)]> {
    static G1: [(f64, f64); 1] = [(0.0, 2.0)];
    static G2: [(f64, f64); 2] = [
        (-0.577_350_269_189_625_8, 1.0),
        (0.577_350_269_189_625_8, 1.0),
    ];
    static G3: [(f64, f64); 3] = [
        (-0.774_596_669_241_483_4, 0.555_555_555_555_555_6),
        (0.0, 0.888_888_888_888_888_9),
        (0.774_596_669_241_483_4, 0.555_555_555_555_555_6),
    ];
    static G4: [(f64, f64); 4] = [
        (-0.861_136_311_594_052_6, 0.347_854_845_137_453_9),
        (-0.339_981_043_584_856_3, 0.652_145_154_862_546_1),
        (0.339_981_043_584_856_3, 0.652_145_154_862_546_1),
        (0.861_136_311_594_052_6, 0.347_854_845_137_453_9),
    ];

    match n_points {
        1 => Ok(&G1),
        2 => Ok(&G2),
        3 => Ok(&G3),
        4 => Ok(&G4),
        n => Err(ElementError::InvalidConfig(format!(
            "Gauss-Legendre rule with {} points is not tabulated",
            n
        ))),
    }
}
