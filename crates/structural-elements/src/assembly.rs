//! Element loop driver.
//!
//! Scatters a global state onto every element, evaluates the inertial and
//! external residuals and adds the element contributions into dense global
//! storage:
//! - `residual`: sum of all element residuals
//! - `jac_xddot`: derivative w.r.t. the acceleration (mass matrix)
//! - `jac_xdot`, `jac`: derivatives w.r.t. velocity and solution
//!
//! ## Parallel evaluation
//!
//! With `AssemblyConfig::parallel` the element loop runs on the rayon pool.
//! Each worker folds its elements into a private system and the partial
//! systems are summed in the reduction, so global storage is never shared
//! between threads.

use crate::boundary_conditions::BoundaryConditionMap;
use crate::config::AssemblyConfig;
use crate::elements::{N_COMPONENTS, StructuralElement};
use crate::error::{ElementError, Result};
use crate::scalar::FieldScalar;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// An element and its global DOF map
///
/// `dofs[k]` is the global index of element DOF `k` (blocked layout).
pub struct ElementEntry<T: FieldScalar> {
    pub element: StructuralElement<T>,
    pub dofs: Vec<usize>,
}

impl<T: FieldScalar> ElementEntry<T> {
    pub fn new(element: StructuralElement<T>, dofs: Vec<usize>) -> Result<Self> {
        ElementError::check_len("element DOF map", element.n_dofs(), dofs.len())?;
        Ok(Self { element, dofs })
    }

    /// Element whose node `i` owns global DOFs `6 * node_ids[i] .. 6 * node_ids[i] + 6`
    pub fn with_node_ids(element: StructuralElement<T>, node_ids: &[usize]) -> Result<Self> {
        ElementError::check_len("element node ids", element.n_nodes(), node_ids.len())?;
        let n = node_ids.len();
        let mut dofs = vec![0; element.n_dofs()];
        for c in 0..N_COMPONENTS {
            for (i, &node) in node_ids.iter().enumerate() {
                dofs[c * n + i] = N_COMPONENTS * node + c;
            }
        }
        Self::new(element, dofs)
    }

    fn gather(&self, global: &DVector<T>) -> Result<DVector<T>> {
        let mut local = DVector::zeros(self.dofs.len());
        for (k, &dof) in self.dofs.iter().enumerate() {
            local[k] = *global.get(dof).ok_or(ElementError::DofOutOfRange {
                index: dof,
                len: global.len(),
            })?;
        }
        Ok(local)
    }
}

/// Global state handed to every element
#[derive(Debug, Clone)]
pub struct GlobalState<T: FieldScalar> {
    pub solution: DVector<T>,
    pub velocity: DVector<T>,
    pub acceleration: DVector<T>,
    pub time: f64,
}

impl<T: FieldScalar> GlobalState<T> {
    pub fn zeros(n_dofs: usize) -> Self {
        Self {
            solution: DVector::zeros(n_dofs),
            velocity: DVector::zeros(n_dofs),
            acceleration: DVector::zeros(n_dofs),
            time: 0.0,
        }
    }

    pub fn n_dofs(&self) -> usize {
        self.solution.len()
    }
}

/// Assembled residual and tangents
#[derive(Debug, Clone)]
pub struct AssembledSystem<T: FieldScalar> {
    pub residual: DVector<T>,
    pub jac: DMatrix<T>,
    pub jac_xdot: DMatrix<T>,
    pub jac_xddot: DMatrix<T>,
    /// Whether any element produced a tangent
    pub has_jacobian: bool,
}

impl<T: FieldScalar> AssembledSystem<T> {
    pub fn zeros(n_dofs: usize) -> Self {
        Self {
            residual: DVector::zeros(n_dofs),
            jac: DMatrix::zeros(n_dofs, n_dofs),
            jac_xdot: DMatrix::zeros(n_dofs, n_dofs),
            jac_xddot: DMatrix::zeros(n_dofs, n_dofs),
            has_jacobian: false,
        }
    }

    fn merge(mut self, other: Self) -> Self {
        self.residual += other.residual;
        self.jac += other.jac;
        self.jac_xdot += other.jac_xdot;
        self.jac_xddot += other.jac_xddot;
        self.has_jacobian |= other.has_jacobian;
        self
    }

    fn scatter(&mut self, dofs: &[usize], local: &AssembledSystem<T>) {
        for (a, &ga) in dofs.iter().enumerate() {
            self.residual[ga] += local.residual[a];
        }
        if local.has_jacobian {
            for (a, &ga) in dofs.iter().enumerate() {
                for (b, &gb) in dofs.iter().enumerate() {
                    self.jac[(ga, gb)] += local.jac[(a, b)];
                    self.jac_xdot[(ga, gb)] += local.jac_xdot[(a, b)];
                    self.jac_xddot[(ga, gb)] += local.jac_xddot[(a, b)];
                }
            }
        }
        self.has_jacobian |= local.has_jacobian;
    }
}

/// Runs the element residual routines over a set of elements
#[derive(Debug, Clone, Default)]
pub struct ElementAssembler {
    pub config: AssemblyConfig,
    /// Conditions keyed by side boundary id
    pub side_conditions: BoundaryConditionMap,
    /// Conditions keyed by element subdomain id
    pub volume_conditions: BoundaryConditionMap,
}

impl ElementAssembler {
    pub fn new(config: AssemblyConfig) -> Self {
        Self {
            config,
            side_conditions: BoundaryConditionMap::new(),
            volume_conditions: BoundaryConditionMap::new(),
        }
    }

    pub fn with_conditions(
        mut self,
        side: BoundaryConditionMap,
        volume: BoundaryConditionMap,
    ) -> Self {
        self.side_conditions = side;
        self.volume_conditions = volume;
        self
    }

    /// Assemble the global residual (and tangents on request)
    ///
    /// # Errors
    /// The first element error aborts the assembly.
    pub fn assemble<T: FieldScalar>(
        &self,
        elements: &mut [ElementEntry<T>],
        state: &GlobalState<T>,
        request_jacobian: bool,
    ) -> Result<AssembledSystem<T>> {
        let n_dofs = state.n_dofs();
        ElementError::check_len("global velocity", n_dofs, state.velocity.len())?;
        ElementError::check_len("global acceleration", n_dofs, state.acceleration.len())?;

        if self.config.verbose {
            eprintln!(
                "Assembling {} elements ({} global DOFs, {:?} scalar, {})",
                elements.len(),
                n_dofs,
                T::KIND,
                if self.config.parallel { "parallel" } else { "serial" }
            );
        }

        let system = if self.config.parallel {
            elements
                .par_iter_mut()
                .try_fold(
                    || AssembledSystem::zeros(n_dofs),
                    |mut acc, entry| {
                        let local = self.evaluate(entry, state, request_jacobian)?;
                        acc.scatter(&entry.dofs, &local);
                        Ok::<_, ElementError>(acc)
                    },
                )
                .try_reduce(|| AssembledSystem::zeros(n_dofs), |a, b| Ok(a.merge(b)))?
        } else {
            let mut acc = AssembledSystem::zeros(n_dofs);
            for entry in elements.iter_mut() {
                let local = self.evaluate(entry, state, request_jacobian)?;
                acc.scatter(&entry.dofs, &local);
            }
            acc
        };

        if self.config.verbose {
            eprintln!(
                "  Residual norm: {:.6e}, jacobian: {}",
                system.residual.norm(),
                if system.has_jacobian { "assembled" } else { "none" }
            );
        }
        Ok(system)
    }

    /// Set state on one element and evaluate all its residual routines
    fn evaluate<T: FieldScalar>(
        &self,
        entry: &mut ElementEntry<T>,
        state: &GlobalState<T>,
        request_jacobian: bool,
    ) -> Result<AssembledSystem<T>> {
        let sol = entry.gather(&state.solution)?;
        let vel = entry.gather(&state.velocity)?;
        let accel = entry.gather(&state.acceleration)?;

        let element = &mut entry.element;
        element.set_time(state.time);
        element.set_solution(&sol, false)?;
        element.set_velocity(&vel, false)?;
        element.set_acceleration(&accel, false)?;

        let mut local = AssembledSystem::zeros(element.n_dofs());
        let mut has_jac = element.inertial_residual(
            request_jacobian,
            &mut local.residual,
            &mut local.jac_xddot,
            &mut local.jac_xdot,
            &mut local.jac,
        )?;
        has_jac |= element.side_external_residual(
            request_jacobian,
            &mut local.residual,
            &mut local.jac,
            &self.side_conditions,
        )?;
        has_jac |= element.volume_external_residual(
            request_jacobian,
            &mut local.residual,
            &mut local.jac,
            &self.volume_conditions,
        )?;
        local.has_jacobian = has_jac;
        Ok(local)
    }
}
