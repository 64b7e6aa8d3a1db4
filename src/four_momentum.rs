use approx::{AbsDiffEq, RelativeEq};
use nalgebra::Vector3;
use std::ops::Sub;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FourMomentum {
    pub e: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
}

impl FourMomentum {
    //! A Lorentz four-vector of the form $`(E, \overrightarrow{p})`$ where $E$ is the energy and
    //! $`\overrightarrow{p}`$ is the momentum, in the lab frame of the event record.
    //!
    //! # Examples
    //! ```
    //! use nusyst_reweight::prelude::*;
    //!
    //! let probe = FourMomentum::new(3.0, 0.0, 0.0, 3.0);
    //! let lepton = FourMomentum::new(2.2, 0.3, 0.1, 2.0);
    //! let transfer = probe - lepton;
    //! assert!((transfer.e - 0.8).abs() < 1e-12);
    //! ```

    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        //! Create a new [`FourMomentum`] from energy and momentum components.
        //!
        //! Components are listed in the order $` (E, p_x, p_y, p_z) `$
        Self { e, px, py, pz }
    }

    pub fn momentum(&self) -> Vector3<f64> {
        //! Extract the 3-momentum as a [`nalgebra::Vector3<f64>`]
        Vector3::new(self.px, self.py, self.pz)
    }

    pub fn p(&self) -> f64 {
        //! Magnitude of the 3-momentum, $`|\overrightarrow{p}|`$.
        self.momentum().norm()
    }
}

impl Sub for FourMomentum {
    type Output = FourMomentum;
    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            e: self.e - rhs.e,
            px: self.px - rhs.px,
            py: self.py - rhs.py,
            pz: self.pz - rhs.pz,
        }
    }
}

impl AbsDiffEq for FourMomentum {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.e.abs_diff_eq(&other.e, epsilon)
            && self.px.abs_diff_eq(&other.px, epsilon)
            && self.py.abs_diff_eq(&other.py, epsilon)
            && self.pz.abs_diff_eq(&other.pz, epsilon)
    }
}

impl RelativeEq for FourMomentum {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.e.relative_eq(&other.e, epsilon, max_relative)
            && self.px.relative_eq(&other.px, epsilon, max_relative)
            && self.py.relative_eq(&other.py, epsilon, max_relative)
            && self.pz.relative_eq(&other.pz, epsilon, max_relative)
    }
}
