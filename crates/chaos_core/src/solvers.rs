use crate::traits::{DynamicalSystem, Scalar, Steppable};

/// Classic Runge-Kutta 4th Order Solver
pub struct RK4<T: Scalar> {
    k1: Vec<T>,
    k2: Vec<T>,
    k3: Vec<T>,
    k4: Vec<T>,
    tmp: Vec<T>,
}

impl<T: Scalar> RK4<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            k1: vec![T::zero(); dim],
            k2: vec![T::zero(); dim],
            k3: vec![T::zero(); dim],
            k4: vec![T::zero(); dim],
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for RK4<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, state: &mut [T], dt: T) {
        let two = T::one() + T::one();
        let half_dt = dt / two;
        let sixth_dt = dt / (two + two + two);

        // k1 = f(y)
        system.apply(state, &mut self.k1);

        // k2 = f(y + dt/2 * k1)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + half_dt * self.k1[i];
        }
        system.apply(&self.tmp, &mut self.k2);

        // k3 = f(y + dt/2 * k2)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + half_dt * self.k2[i];
        }
        system.apply(&self.tmp, &mut self.k3);

        // k4 = f(y + dt * k3)
        for i in 0..state.len() {
            self.tmp[i] = state[i] + dt * self.k3[i];
        }
        system.apply(&self.tmp, &mut self.k4);

        // y_next = y + dt/6 * (k1 + 2k2 + 2k3 + k4)
        for i in 0..state.len() {
            state[i] = state[i]
                + sixth_dt * (self.k1[i] + two * self.k2[i] + two * self.k3[i] + self.k4[i]);
        }
    }
}

/// Forward Euler: `y_next = y + dt * f(y)`.
///
/// Only the Lorenz kernel uses this; its visual tuning assumes the Euler
/// trajectory at the default step size.
pub struct Euler<T: Scalar> {
    slope: Vec<T>,
}

impl<T: Scalar> Euler<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            slope: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for Euler<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, state: &mut [T], dt: T) {
        system.apply(state, &mut self.slope);
        for i in 0..state.len() {
            state[i] = state[i] + dt * self.slope[i];
        }
    }
}

/// Discrete Map Stepper
/// Evaluates x_{n+1} = f(x_n); `dt` is ignored.
pub struct DiscreteMap<T: Scalar> {
    tmp: Vec<T>,
}

impl<T: Scalar> DiscreteMap<T> {
    pub fn new(dim: usize) -> Self {
        Self {
            tmp: vec![T::zero(); dim],
        }
    }
}

impl<T: Scalar> Steppable<T> for DiscreteMap<T> {
    fn step(&mut self, system: &impl DynamicalSystem<T>, state: &mut [T], _dt: T) {
        system.apply(state, &mut self.tmp);
        state.copy_from_slice(&self.tmp);
    }
}
