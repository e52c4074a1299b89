//! Boundary conditions and loads attached to boundary or subdomain ids.
//!
//! A condition is a kind tag plus a bag of named field functions. Fields are
//! looked up by name and by value type, so the same condition can serve a
//! real and a complex analysis:
//! - `"pressure"`: `f64`
//! - `"dpressure"`: the analysis scalar (`f64` or `Complex64`)
//! - `"dnormal"`: `Vector3` of the analysis scalar
//! - `"temperature"`, `"ref_temperature"`: `f64`

use crate::error::{ElementError, Result};
use crate::field::FieldFunction;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Boundary id of an element side
pub type BoundaryId = i32;

/// Subdomain id of an element
pub type SubdomainId = i32;

/// Type of boundary condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionKind {
    /// Pressure normal to the loaded surface
    SurfacePressure,
    /// Temperature field producing thermal stresses
    Temperature,
    /// Pressure linearized about a steady aerodynamic state
    SmallDisturbanceMotion,
    /// Prescribed displacement, enforced by the solver
    Dirichlet,
    /// Piston-theory aerodynamic pressure
    PistonTheory,
    /// Concentrated nodal load
    PointLoad,
}

type AnyField = Arc<dyn Any + Send + Sync>;

/// A boundary condition: a kind and its named field functions
#[derive(Clone)]
pub struct BoundaryCondition {
    kind: ConditionKind,
    fields: HashMap<String, AnyField>,
}

impl BoundaryCondition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            fields: HashMap::new(),
        }
    }

    /// Surface pressure with a real pressure field
    pub fn surface_pressure(pressure: FieldFunction<f64>) -> Self {
        Self::new(ConditionKind::SurfacePressure).with_field("pressure", pressure)
    }

    /// Thermal load with current and reference temperature fields
    pub fn temperature(temperature: FieldFunction<f64>, reference: FieldFunction<f64>) -> Self {
        Self::new(ConditionKind::Temperature)
            .with_field("temperature", temperature)
            .with_field("ref_temperature", reference)
    }

    pub fn dirichlet() -> Self {
        Self::new(ConditionKind::Dirichlet)
    }

    pub fn kind(&self) -> ConditionKind {
        self.kind
    }

    /// Register a field under `name`, replacing any previous field of that name
    pub fn add_field<V: 'static>(&mut self, name: impl Into<String>, field: FieldFunction<V>) {
        self.fields.insert(name.into(), Arc::new(field));
    }

    pub fn with_field<V: 'static>(
        mut self,
        name: impl Into<String>,
        field: FieldFunction<V>,
    ) -> Self {
        self.add_field(name, field);
        self
    }

    /// Get the field `name` with value type `V`
    ///
    /// # Errors
    /// `MissingField` if the name is absent, `FieldTypeMismatch` if it was
    /// registered with a different value type.
    pub fn get<V: 'static>(&self, name: &str) -> Result<&FieldFunction<V>> {
        let field = self
            .fields
            .get(name)
            .ok_or_else(|| ElementError::MissingField(name.to_string()))?;

        field
            .downcast_ref::<FieldFunction<V>>()
            .ok_or_else(|| ElementError::FieldTypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<V>(),
            })
    }
}

impl fmt::Debug for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.fields.keys().collect();
        names.sort();
        f.debug_struct("BoundaryCondition")
            .field("kind", &self.kind)
            .field("fields", &names)
            .finish()
    }
}

/// Multi-valued map from boundary (or subdomain) id to conditions
#[derive(Debug, Clone, Default)]
pub struct BoundaryConditionMap {
    entries: BTreeMap<i32, Vec<Arc<BoundaryCondition>>>,
}

impl BoundaryConditionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: i32, condition: Arc<BoundaryCondition>) {
        self.entries.entry(id).or_default().push(condition);
    }

    /// All conditions registered against `id`, in insertion order
    pub fn equal_range(&self, id: i32) -> &[Arc<BoundaryCondition>] {
        self.entries.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
