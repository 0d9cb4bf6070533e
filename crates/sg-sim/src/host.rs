//! Prescribed resolved flows.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use sg_core::units::Velocity;
use sg_core::{Real, ScalarField, Vector, VectorField};
use sg_fvm::{fvc, FaceFlux};
use sg_les::TurbulenceHost;
use sg_mesh::Mesh;

use crate::case::FluidDef;
use crate::error::{SimError, SimResult};

/// Analytic velocity field sampled at cell centres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowProfile {
    /// `U = velocity`
    Uniform { velocity: [Real; 3] },
    /// `U = (rate y, 0, 0)`
    Shear { rate: Real },
    /// `U = (-rate x, 0, 0)`
    Compression { rate: Real },
    /// Two-dimensional Taylor-Green vortex with period `wavelength` in x and y.
    TaylorGreen { amplitude: Real, wavelength: Real },
}

impl FlowProfile {
    /// Uniform flow along `x`.
    pub fn uniform_x(speed: Velocity) -> Self {
        FlowProfile::Uniform {
            velocity: [speed.value, 0.0, 0.0],
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        let finite = match *self {
            FlowProfile::Uniform { velocity } => velocity.iter().all(|v| v.is_finite()),
            FlowProfile::Shear { rate } | FlowProfile::Compression { rate } => rate.is_finite(),
            FlowProfile::TaylorGreen {
                amplitude,
                wavelength,
            } => {
                if !(wavelength.is_finite() && wavelength > 0.0) {
                    return Err(SimError::config("taylor_green wavelength must be positive"));
                }
                amplitude.is_finite() && wavelength.is_finite()
            }
        };
        if finite {
            Ok(())
        } else {
            Err(SimError::config("flow parameters must be finite"))
        }
    }

    pub fn velocity_at(&self, x: &Vector) -> Vector {
        match *self {
            FlowProfile::Uniform { velocity } => Vector::from(velocity),
            FlowProfile::Shear { rate } => Vector::new(rate * x.y, 0.0, 0.0),
            FlowProfile::Compression { rate } => Vector::new(-rate * x.x, 0.0, 0.0),
            FlowProfile::TaylorGreen {
                amplitude,
                wavelength,
            } => {
                let k = 2.0 * PI / wavelength;
                let (sx, cx) = (k * x.x).sin_cos();
                let (sy, cy) = (k * x.y).sin_cos();
                Vector::new(amplitude * sx * cy, -amplitude * cx * sy, 0.0)
            }
        }
    }
}

/// Single-phase host with a frozen velocity field and constant properties.
pub struct PrescribedFlowHost {
    alpha: ScalarField,
    rho: ScalarField,
    u: VectorField,
    phi: FaceFlux,
    alpha_rho_phi: FaceFlux,
    nu: ScalarField,
}

impl PrescribedFlowHost {
    pub fn new(mesh: &Mesh, profile: &FlowProfile, fluid: &FluidDef) -> SimResult<Self> {
        profile.validate()?;
        fluid.validate()?;

        let n = mesh.n_cells();
        let u = VectorField::new(
            "U",
            mesh.cell_centres()
                .iter()
                .map(|c| profile.velocity_at(c))
                .collect(),
        );
        let phi = fvc::flux(mesh, &u);
        let rho_f = FaceFlux::uniform("rho", mesh, fluid.density);
        Ok(Self {
            alpha: ScalarField::uniform("alpha", n, 1.0),
            rho: ScalarField::uniform("rho", n, fluid.density),
            alpha_rho_phi: phi.scaled("alphaRhoPhi", &rho_f),
            phi,
            u,
            nu: ScalarField::uniform("nu", n, fluid.nu),
        })
    }
}

impl TurbulenceHost for PrescribedFlowHost {
    fn alpha(&self) -> &ScalarField {
        &self.alpha
    }

    fn rho(&self) -> &ScalarField {
        &self.rho
    }

    fn velocity(&self) -> &VectorField {
        &self.u
    }

    fn phi(&self) -> &FaceFlux {
        &self.phi
    }

    fn alpha_rho_phi(&self) -> &FaceFlux {
        &self.alpha_rho_phi
    }

    fn nu(&self) -> &ScalarField {
        &self.nu
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sg_core::units::{kgpm3, m2ps, mps};
    use sg_mesh::CartesianSpec;

    fn fluid() -> FluidDef {
        FluidDef::new(kgpm3(1.2), m2ps(1.5e-5))
    }

    #[test]
    fn taylor_green_is_discretely_solenoidal() {
        let mesh = CartesianSpec::new([12, 12, 1], [2.0 * PI, 2.0 * PI, 0.5])
            .with_periodic([true, true, false])
            .build()
            .unwrap();
        let profile = FlowProfile::TaylorGreen {
            amplitude: 1.0,
            wavelength: 2.0 * PI,
        };
        let host = PrescribedFlowHost::new(&mesh, &profile, &fluid()).unwrap();
        let div = fvc::div(&mesh, host.phi());
        assert!(div.iter().all(|d| d.abs() < 1e-12));
    }

    #[test]
    fn mass_flux_carries_density() {
        let mesh = CartesianSpec::new([3, 1, 1], [3.0, 1.0, 1.0]).build().unwrap();
        let profile = FlowProfile::uniform_x(mps(2.0));
        let host = PrescribedFlowHost::new(&mesh, &profile, &fluid()).unwrap();
        for (phi, rho_phi) in host.phi().internal.iter().zip(&host.alpha_rho_phi().internal) {
            assert_eq!(*phi, 2.0);
            assert!((rho_phi - 2.4).abs() < 1e-12);
        }
    }

    #[test]
    fn rejects_bad_wavelength() {
        let profile = FlowProfile::TaylorGreen {
            amplitude: 1.0,
            wavelength: 0.0,
        };
        assert!(profile.validate().is_err());
    }
}
