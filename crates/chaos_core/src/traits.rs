use num_traits::Float;
use std::fmt::Debug;

/// Numeric type the integrators are generic over. Kernels instantiate it with `f64`.
pub trait Scalar: Float + Debug + 'static {}

impl<T: Float + Debug + 'static> Scalar for T {}

/// An autonomous system: either a vector field (flows) or a recurrence (maps).
///
/// None of the chaos systems in this crate depend on time explicitly, so the
/// evaluation only sees the state.
pub trait DynamicalSystem<T: Scalar> {
    /// Number of state components.
    fn dimension(&self) -> usize;

    /// Writes `dx/dt` (flow) or `x_{n+1}` (map) for state `x` into `out`.
    fn apply(&self, x: &[T], out: &mut [T]);
}

/// A stepping scheme that advances a state in place.
pub trait Steppable<T: Scalar> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, state: &mut [T], dt: T);
}

/// A parameter struct that knows how to run its own kernel.
///
/// Implemented by the typed parameter variants whose kernel needs no render
/// context. Budget-capped kernels run with their default caps here;
/// [`crate::kernels::compute`] applies the caps from its settings instead.
pub trait Kernel {
    type Output;

    fn run(&self) -> Self::Output;
}
