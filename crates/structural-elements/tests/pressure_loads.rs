//! Integration tests for pressure loads on beam and plate elements
//! Checks resultant forces against closed-form totals

use nalgebra::{DMatrix, DVector, Point3, Vector3};
use std::sync::Arc;
use structural_elements::{
    BoundaryCondition, ElementConfig, ElementError, ElementGeometry, ElementProperty, FieldFunction,
    LoadSurface, SectionProperty, StructuralElement, build_with_lagrange_basis,
};

fn beam_element(a: Point3<f64>, b: Point3<f64>, y_vector: Vector3<f64>) -> StructuralElement<f64> {
    let card: Arc<dyn ElementProperty> =
        Arc::new(SectionProperty::beam(7850.0, 0.01, 2e-6, 3e-6, y_vector));
    build_with_lagrange_basis(
        1,
        ElementGeometry::new(vec![a, b], 1),
        card,
        ElementConfig::default(),
    )
    .unwrap()
}

/// Sum of the translational components over all nodes
fn force_resultant(f: &DVector<f64>, n_nodes: usize) -> Vector3<f64> {
    Vector3::from_fn(|c, _| (0..n_nodes).map(|i| f[c * n_nodes + i]).sum::<f64>())
}

fn face_pressure(el: &StructuralElement<f64>, p: f64) -> DVector<f64> {
    let bc = BoundaryCondition::surface_pressure(FieldFunction::constant("pressure", p));
    let n = el.n_dofs();
    let mut f = DVector::zeros(n);
    let mut jac = DMatrix::zeros(n, n);
    let has_jac = el
        .surface_pressure_residual(true, &mut f, &mut jac, LoadSurface::Face, &bc)
        .unwrap();
    assert!(!has_jac);
    f
}

#[test]
fn test_beam_face_pressure_resultant() {
    // Beam of length L under uniform pressure p:
    // resultant |F| = p L, perpendicular to the beam axis
    let length = 2.5;
    let p = 400.0;
    let el = beam_element(Point3::origin(), Point3::new(length, 0.0, 0.0), Vector3::z());

    let f = face_pressure(&el, p);
    let resultant = force_resultant(&f, 2);

    println!("Resultant: {:?}", resultant);
    assert!((resultant.norm() - p * length).abs() < 1e-9);
    assert!(resultant.x.abs() < 1e-9);
}

#[test]
fn test_inclined_beam_face_pressure_resultant() {
    // Same load on a beam inclined in the x-z plane: the global resultant
    // keeps magnitude p L and stays normal to the beam axis
    let length: f64 = 3.0;
    let p = 150.0;
    let axis = Vector3::new(1.0, 0.0, 1.0).normalize();
    let end = Point3::from(axis * length);
    let el = beam_element(Point3::origin(), end, Vector3::y());

    let f = face_pressure(&el, p);
    let resultant = force_resultant(&f, 2);

    assert!((resultant.norm() - p * length).abs() < 1e-9);
    assert!(resultant.dot(&axis).abs() < 1e-9);

    // the face normal is minus the local y-axis
    let ey = el.frame().rotation().column(1).into_owned();
    assert!((resultant + ey * (p * length)).norm() < 1e-9);
}

#[test]
fn test_pressure_residual_is_linear_in_magnitude() {
    let nodes = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.5),
        Point3::new(2.0, 1.0, 0.5),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let card: Arc<dyn ElementProperty> = Arc::new(SectionProperty::plate(2700.0, 0.004));
    let el: StructuralElement<f64> = build_with_lagrange_basis(
        2,
        ElementGeometry::new(nodes, 1),
        card,
        ElementConfig::default(),
    )
    .unwrap();

    let f1 = face_pressure(&el, 1.0);
    let f3 = face_pressure(&el, 3.0);
    assert!(f1.norm() > 0.0);
    assert!((&f3 - &f1 * 3.0).norm() < 1e-12);

    let f_neg = face_pressure(&el, -1.0);
    assert!((&f_neg + &f1).norm() < 1e-12);
}

#[test]
fn test_plate_pressure_total_equals_pressure_times_area() {
    // 2 x 1 plate rotated out of the global x-y plane
    let nodes = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
        Point3::new(0.0, 2.0, 1.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let card: Arc<dyn ElementProperty> = Arc::new(SectionProperty::plate(2700.0, 0.004));
    let el: StructuralElement<f64> = build_with_lagrange_basis(
        2,
        ElementGeometry::new(nodes, 1),
        card,
        ElementConfig::default(),
    )
    .unwrap();

    let f = face_pressure(&el, 5.0);
    let resultant = force_resultant(&f, 4);

    // local z = (0,2,0) x (0,2,1) = +x, load acts along -x
    assert!((resultant - Vector3::new(-10.0, 0.0, 0.0)).norm() < 1e-10);
}

#[test]
fn test_follower_forces_abort() {
    let card: Arc<dyn ElementProperty> =
        Arc::new(SectionProperty::beam(7850.0, 0.01, 2e-6, 3e-6, Vector3::z()));
    let config = ElementConfig {
        follower_forces: true,
        ..ElementConfig::default()
    };
    let el: StructuralElement<f64> = build_with_lagrange_basis(
        1,
        ElementGeometry::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)], 1),
        card,
        config,
    )
    .unwrap();

    let bc = BoundaryCondition::surface_pressure(FieldFunction::constant("pressure", 1.0));
    let mut f = DVector::zeros(12);
    let mut jac = DMatrix::zeros(12, 12);

    let err = el
        .surface_pressure_residual(true, &mut f, &mut jac, LoadSurface::Side(0), &bc)
        .unwrap_err();
    assert!(matches!(err, ElementError::FollowerForces { request_jacobian: true }));
    assert!(err.is_contract_violation());
}
