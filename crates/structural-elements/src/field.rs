//! Field functions evaluated at a physical point and time.

use nalgebra::Point3;
use std::fmt;
use std::sync::Arc;

type FieldFn<V> = dyn Fn(&Point3<f64>, f64) -> V + Send + Sync;

/// A named, pure function of (global point, time)
///
/// Cloning shares the underlying closure.
pub struct FieldFunction<V> {
    name: String,
    func: Arc<FieldFn<V>>,
}

impl<V> FieldFunction<V> {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Point3<f64>, f64) -> V + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn eval(&self, point: &Point3<f64>, time: f64) -> V {
        (self.func)(point, time)
    }
}

impl<V: Clone + Send + Sync + 'static> FieldFunction<V> {
    /// Field with the same value everywhere and at all times
    pub fn constant(name: impl Into<String>, value: V) -> Self {
        Self::new(name, move |_: &Point3<f64>, _: f64| value.clone())
    }
}

impl<V> Clone for FieldFunction<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<V> fmt::Debug for FieldFunction<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldFunction")
            .field("name", &self.name)
            .field("value_type", &std::any::type_name::<V>())
            .finish()
    }
}
