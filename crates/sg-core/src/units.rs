// sg-core/src/units.rs

use uom::si::f64::{
    AvailableEnergy as UomAvailableEnergy, DiffusionCoefficient as UomDiffusionCoefficient,
    Length as UomLength, MassDensity as UomMassDensity, Time as UomTime,
    Velocity as UomVelocity,
};

// Public canonical unit types (SI, f64)
pub type Density = UomMassDensity;
/// Kinematic viscosity (m^2/s), dimensionally a diffusion coefficient.
pub type KinViscosity = UomDiffusionCoefficient;
pub type Length = UomLength;
/// Turbulent kinetic energy per unit mass (m^2/s^2 == J/kg).
pub type SpecificEnergy = UomAvailableEnergy;
pub type Time = UomTime;
pub type Velocity = UomVelocity;

#[inline]
pub fn kgpm3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn m2ps(v: f64) -> KinViscosity {
    use uom::si::diffusion_coefficient::square_meter_per_second;
    KinViscosity::new::<square_meter_per_second>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn jpkg(v: f64) -> SpecificEnergy {
    use uom::si::available_energy::joule_per_kilogram;
    SpecificEnergy::new::<joule_per_kilogram>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _rho = kgpm3(1.2);
        let _nu = m2ps(1.5e-5);
        let _l = m(2.0);
        let _k = jpkg(0.1);
        let _dt = s(0.1);
        let _u = mps(3.0);
    }

    #[test]
    fn kinematic_viscosity_is_length_times_velocity() {
        let nu: KinViscosity = m(0.5) * mps(3.0e-5);
        assert!((nu.value - m2ps(1.5e-5).value).abs() < 1e-18);
    }

    #[test]
    fn specific_energy_is_velocity_squared() {
        let u = mps(2.0);
        let k: SpecificEnergy = u * u;
        assert!((k.value - 4.0).abs() < 1e-12);
    }
}
