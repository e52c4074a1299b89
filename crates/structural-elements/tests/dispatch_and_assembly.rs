//! Integration tests for boundary-condition dispatch, complex
//! small-disturbance loads and the element assembly driver

use nalgebra::{DMatrix, DVector, Point3, Vector3};
use num_complex::Complex64;
use std::sync::Arc;
use structural_elements::{
    AssemblyConfig, BoundaryCondition, BoundaryConditionMap, ConditionKind, ElementAssembler,
    ElementConfig, ElementEntry, ElementError, ElementGeometry, ElementProperty, FieldFunction,
    GlobalState, SectionProperty, StructuralElement, build_with_lagrange_basis,
};

fn plate_card() -> Arc<dyn ElementProperty> {
    Arc::new(SectionProperty::plate(2700.0, 0.002))
}

/// Unit square plate with side 1 (edge x = 1) tagged with boundary id 7
fn tagged_plate<T: structural_elements::FieldScalar>() -> StructuralElement<T> {
    let nodes = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let geometry = ElementGeometry::new(nodes, 4).with_side_boundary(1, 7);
    build_with_lagrange_basis(2, geometry, plate_card(), ElementConfig::default()).unwrap()
}

fn pressure(p: f64) -> Arc<BoundaryCondition> {
    Arc::new(BoundaryCondition::surface_pressure(FieldFunction::constant("pressure", p)))
}

#[test]
fn test_side_dispatch_only_loads_matching_ids() {
    let el: StructuralElement<f64> = tagged_plate();

    let mut bcs = BoundaryConditionMap::new();
    bcs.insert(7, pressure(3.0));
    let mut f = DVector::zeros(24);
    let mut jac = DMatrix::zeros(24, 24);
    let has_jac = el.side_external_residual(true, &mut f, &mut jac, &bcs).unwrap();

    assert!(!has_jac);
    assert!(f.norm() > 0.0);
    // edge x = 1 has unit length, outward normal +x
    let fx: f64 = (0..4).map(|i| f[i]).sum();
    assert!((fx - 3.0).abs() < 1e-12);

    let mut unrelated = BoundaryConditionMap::new();
    unrelated.insert(8, pressure(3.0));
    let mut f = DVector::zeros(24);
    el.side_external_residual(true, &mut f, &mut jac, &unrelated).unwrap();
    assert!(f.iter().all(|&v| v == 0.0));
}

#[test]
fn test_dirichlet_conditions_contribute_nothing() {
    let el: StructuralElement<f64> = tagged_plate();

    let mut bcs = BoundaryConditionMap::new();
    bcs.insert(7, Arc::new(BoundaryCondition::dirichlet()));
    bcs.insert(4, Arc::new(BoundaryCondition::dirichlet()));
    let mut f = DVector::zeros(24);
    let mut jac = DMatrix::zeros(24, 24);

    assert!(!el.side_external_residual(true, &mut f, &mut jac, &bcs).unwrap());
    assert!(!el.volume_external_residual(true, &mut f, &mut jac, &bcs).unwrap());
    assert_eq!(f.norm(), 0.0);
    assert_eq!(jac.norm(), 0.0);
}

#[test]
fn test_volume_thermal_and_pressure_together() {
    let card: Arc<dyn ElementProperty> = Arc::new(
        SectionProperty::plate(2700.0, 0.002)
            .with_thermal_resultant(DVector::from_vec(vec![50.0, 50.0, 0.0])),
    );
    let nodes = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
    ];
    let el: StructuralElement<f64> = build_with_lagrange_basis(
        2,
        ElementGeometry::new(nodes, 4),
        card,
        ElementConfig::default(),
    )
    .unwrap();

    let mut bcs = BoundaryConditionMap::new();
    bcs.insert(4, pressure(1.0));
    bcs.insert(
        4,
        Arc::new(BoundaryCondition::temperature(
            FieldFunction::constant("temperature", 310.0),
            FieldFunction::constant("ref_temperature", 300.0),
        )),
    );
    let mut f = DVector::zeros(24);
    let mut jac = DMatrix::zeros(24, 24);
    el.volume_external_residual(false, &mut f, &mut jac, &bcs).unwrap();

    // thermal forces are self-equilibrated in-plane, pressure acts along -z
    let fx: f64 = (0..4).map(|i| f[i]).sum();
    let fy: f64 = (4..8).map(|i| f[i]).sum();
    let fz: f64 = (8..12).map(|i| f[i]).sum();
    assert!(fx.abs() < 1e-10);
    assert!(fy.abs() < 1e-10);
    assert!((fz + 1.0).abs() < 1e-12);
    // uniform expansion: node 0 is pushed towards -x in the residual sense
    assert!(f[0] > 0.0);
}

#[test]
fn test_complex_small_disturbance_on_side() {
    let el: StructuralElement<Complex64> = tagged_plate();
    let omega = 2.0;

    let mut bc = BoundaryCondition::new(ConditionKind::SmallDisturbanceMotion);
    bc.add_field("pressure", FieldFunction::constant("p0", 10.0));
    bc.add_field(
        "dpressure",
        FieldFunction::new("dp", move |x: &Point3<f64>, _t: f64| Complex64::new(0.0, omega * x.y)),
    );
    bc.add_field(
        "dnormal",
        FieldFunction::constant(
            "dn",
            Vector3::new(
                Complex64::default(),
                Complex64::new(0.01, 0.0),
                Complex64::default(),
            ),
        ),
    );

    let mut bcs = BoundaryConditionMap::new();
    bcs.insert(7, Arc::new(bc));
    let mut f = DVector::zeros(24);
    let mut jac = DMatrix::zeros(24, 24);
    assert!(!el.side_external_residual(true, &mut f, &mut jac, &bcs).unwrap());

    // along x = 1: dp n = i ω y x̂ integrates to i ω / 2; p dn = 0.1 ŷ
    let fx: Complex64 = (0..4).map(|i| f[i]).sum();
    let fy: Complex64 = (4..8).map(|i| f[i]).sum();
    assert!((fx - Complex64::new(0.0, omega / 2.0)).norm() < 1e-12);
    assert!((fy - Complex64::new(0.1, 0.0)).norm() < 1e-12);
}

#[test]
fn test_assembled_mass_of_plate_strip() {
    // Two plates sharing an edge; consistent translational mass sums to ρ h A
    let card = plate_card();
    let make = |x0: f64, ids: [usize; 4]| {
        let nodes = vec![
            Point3::new(x0, 0.0, 0.0),
            Point3::new(x0 + 1.0, 0.0, 0.0),
            Point3::new(x0 + 1.0, 1.0, 0.0),
            Point3::new(x0, 1.0, 0.0),
        ];
        let el = build_with_lagrange_basis::<f64>(
            2,
            ElementGeometry::new(nodes, 4),
            card.clone(),
            ElementConfig::default(),
        )
        .unwrap();
        ElementEntry::with_node_ids(el, &ids).unwrap()
    };
    let mut elements = vec![make(0.0, [0, 1, 4, 3]), make(1.0, [1, 2, 5, 4])];

    let assembler = ElementAssembler::new(AssemblyConfig {
        parallel: true,
        verbose: true,
        ..AssemblyConfig::default()
    });
    let state = GlobalState::zeros(6 * 6);
    let system = assembler.assemble(&mut elements, &state, true).unwrap();

    assert!(system.has_jacobian);
    let mut total_x = 0.0;
    for a in 0..6 {
        for b in 0..6 {
            total_x += system.jac_xddot[(6 * a, 6 * b)];
        }
    }
    // ρ h = 5.4, A = 2
    assert!((total_x - 10.8).abs() < 1e-9);
    assert!(system.residual.iter().all(|&v| v == 0.0));
}

#[test]
fn test_unsupported_condition_aborts_assembly() {
    let mut side = BoundaryConditionMap::new();
    side.insert(7, Arc::new(BoundaryCondition::new(ConditionKind::PistonTheory)));
    let assembler = ElementAssembler::new(AssemblyConfig::default())
        .with_conditions(side, BoundaryConditionMap::new());

    let el: StructuralElement<f64> = tagged_plate();
    let mut elements = vec![ElementEntry::with_node_ids(el, &[0, 1, 2, 3]).unwrap()];
    let result = assembler.assemble(&mut elements, &GlobalState::zeros(24), false);

    match result {
        Err(err @ ElementError::NotImplemented(_)) => assert!(err.is_contract_violation()),
        other => panic!("expected NotImplemented, got {:?}", other.map(|s| s.has_jacobian)),
    }
}
