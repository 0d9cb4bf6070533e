//! Dynamic model coefficients from the Germano identity.
//!
//! Each coefficient is a least-squares fit between grid-scale and
//! test-filter-scale quantities. Numerator and denominator are smoothed
//! with the face-area neighbourhood average before dividing, and every
//! denominator is floored, so the results are finite for any input.

use sg_core::{
    dev, double_dot, rectify, sqr_vector, strain_magnitude, Field, FieldValue, ScalarField,
    TensorField, VectorField, SMALL, VSMALL,
};
use sg_fvm::fvc;
use sg_mesh::Mesh;

use crate::filter::LesFilter;

/// Inputs shared by all coefficient evaluations in one correction.
#[derive(Clone, Copy)]
pub struct CoefficientEngine<'a> {
    mesh: &'a Mesh,
    filter: &'a dyn LesFilter,
    delta: &'a ScalarField,
    rho: &'a ScalarField,
    u: &'a VectorField,
}

impl<'a> CoefficientEngine<'a> {
    pub fn new(
        mesh: &'a Mesh,
        filter: &'a dyn LesFilter,
        delta: &'a ScalarField,
        rho: &'a ScalarField,
        u: &'a VectorField,
    ) -> Self {
        Self {
            mesh,
            filter,
            delta,
            rho,
            u,
        }
    }

    fn filter_scalar(&self, f: &ScalarField) -> ScalarField {
        self.filter.filter_scalar(self.mesh, self.delta, f)
    }

    fn filter_vector(&self, f: &VectorField) -> VectorField {
        self.filter.filter_vector(self.mesh, self.delta, f)
    }

    fn filter_tensor(&self, f: &TensorField) -> TensorField {
        self.filter.filter_tensor(self.mesh, self.delta, f)
    }

    fn per_cell<T, F>(&self, name: &str, f: F) -> Field<T>
    where
        T: Copy + Send + Sync,
        F: Fn(usize) -> T + Sync + Send,
    {
        fvc::gather(self.mesh, name, f)
    }

    /// Resolved kinetic energy between grid and test-filter scales,
    /// `0.5 (filter(|U|^2) - |filter(U)|^2)`. Not floored.
    pub fn subgrid_energy(&self) -> ScalarField {
        let mag_sqr_u_f = self.filter_scalar(&self.u.mag_sqr("magSqr(U)"));
        let u_f = self.filter_vector(self.u);
        mag_sqr_u_f.zip_map(&u_f, "KK", |a, uf| 0.5 * (a - uf.norm_squared()))
    }

    /// Eddy-viscosity coefficient `cD` for the strain-rate field `sij`.
    ///
    /// Favre-filtered: the test-scale strain is `filter(rho S)/filter(rho)`
    /// and the Leonard stress is built from `rho U`.
    pub fn c_d(&self, sij: &TensorField) -> ScalarField {
        let rho = self.rho;
        let delta = self.delta;

        let rho_f = self.filter_scalar(rho);
        let d_filter = self
            .filter_tensor(&sij.scale_by(rho, "rhoSij"))
            .divide_by(&rho_f, "Dfilter");

        let rho_u = self.u.scale_by(rho, "rhoU");
        let rho_u_f = self.filter_vector(&rho_u);
        let resolved = rho_u.zip_map(rho, "sqr(rhoU)/rho", |ru, r| sqr_vector(ru) / *r);
        let filtered = self.per_cell("sqr(filter(rhoU))/filter(rho)", |c| {
            sqr_vector(&rho_u_f[c]) / rho_f[c]
        });
        let lij = self
            .filter_tensor(&resolved)
            .zip_map(&filtered, "Lij", |a, b| a - b);

        let bij = self.per_cell("Bij", |c| {
            let d = d_filter[c];
            let test_width = 2.0 * delta[c];
            -2.0 * test_width * test_width * rho_f[c] * strain_magnitude(&d) * dev(&d)
        });
        let aij = self.per_cell("Aij", |c| {
            let s = sij[c];
            -2.0 * delta[c] * delta[c] * rho[c] * strain_magnitude(&s) * dev(&s)
        });
        let mij = bij.zip_map(&self.filter_tensor(&aij), "Mij", |b, a| b - a);

        let lm = lij.zip_map(&mij, "LijMij", |l, m| double_dot(&dev(l), m));
        let mm = mij.map("MklMkl", |m| double_dot(m, m));

        let lm_avg = fvc::average(self.mesh, &lm);
        let mm_avg = fvc::average(self.mesh, &mm);
        lm_avg.zip_map(&mm_avg, "cD", |lm, mm| lm.max(0.0) / mm.max(SMALL))
    }

    /// Isotropic coefficient `cI` for the symmetric tensor field `tij`.
    pub fn c_i(&self, tij: &TensorField) -> ScalarField {
        let kk = self.subgrid_energy();
        let t_f = self.filter_tensor(tij);
        let mag_sqr_t_f = self.filter_scalar(&tij.mag_sqr("magSqr(T)"));
        let mm = self.per_cell("mm", |c| {
            self.delta[c] * self.delta[c] * (4.0 * t_f[c].mag_sqr() - mag_sqr_t_f[c])
        });

        let kk_mm = kk.zip_map(&mm, "KKmm", |k, m| k * m);
        let mut mmmm = fvc::average(self.mesh, &mm.map("magSqr(mm)", |m| m * m));
        mmmm.max_with(VSMALL);
        fvc::average(self.mesh, &kk_mm).zip_map(&mmmm, "cI", |num, den| num / den)
    }

    /// Raw dissipation coefficient before rectification.
    ///
    /// `filter(nuEff (filter(|D|^2) - |filter(D)|^2)) / filter(KK^1.5 / (2 delta))`
    /// with the denominator floored at `VSMALL`.
    pub fn dissipation_ratio(
        &self,
        d: &TensorField,
        kk: &ScalarField,
        nu_eff: &ScalarField,
    ) -> ScalarField {
        let mag_sqr_d_f = self.filter_scalar(&d.mag_sqr("magSqr(D)"));
        let d_f = self.filter_tensor(d);
        let resolved = self.per_cell("nuEffVarD", |c| {
            nu_eff[c] * (mag_sqr_d_f[c] - d_f[c].mag_sqr())
        });
        let scale = self.per_cell("KK^1.5/(2delta)", |c| {
            kk[c].max(0.0).powf(1.5) / (2.0 * self.delta[c])
        });

        let num = self.filter_scalar(&resolved);
        let den = self.filter_scalar(&scale);
        num.zip_map(&den, "CeRaw", |n, d| n / d.max(VSMALL))
    }

    /// Dissipation coefficient `Ce`, with negative ratios set to zero.
    pub fn c_e(&self, d: &TensorField, kk: &ScalarField, nu_eff: &ScalarField) -> ScalarField {
        self.dissipation_ratio(d, kk, nu_eff).map("Ce", |ce| rectify(*ce))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SimpleFilter;
    use sg_core::{symm, Tensor, Vector};
    use sg_mesh::CartesianSpec;

    struct Flow {
        spec: CartesianSpec,
        mesh: Mesh,
        delta: ScalarField,
        rho: ScalarField,
        u: VectorField,
    }

    impl Flow {
        fn new(u: impl Fn(Vector) -> Vector) -> Self {
            let spec = CartesianSpec::new([16, 1, 1], [16.0, 1.0, 1.0]);
            let mesh = spec.build().unwrap();
            let n = mesh.n_cells();
            let u = VectorField::new("U", mesh.cell_centres().iter().map(|c| u(*c)).collect());
            Self {
                spec,
                mesh,
                delta: ScalarField::uniform("delta", n, 1.0),
                rho: ScalarField::uniform("rho", n, 1.0),
                u,
            }
        }

        fn engine<'a>(&'a self, filter: &'a dyn LesFilter) -> CoefficientEngine<'a> {
            CoefficientEngine::new(&self.mesh, filter, &self.delta, &self.rho, &self.u)
        }

        fn strain(&self) -> TensorField {
            fvc::grad_vector(&self.mesh, &self.u).map("Sij", symm)
        }

        fn interior(&self) -> impl Iterator<Item = usize> + '_ {
            (5..=10).map(|i| self.spec.cell_index([i, 0, 0]))
        }
    }

    #[test]
    fn uniform_flow_has_zero_cd() {
        let flow = Flow::new(|_| Vector::new(1.0, 0.0, 0.0));
        let cd = flow.engine(&SimpleFilter).c_d(&flow.strain());
        assert!(cd.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn compression_matches_hand_derivation() {
        let flow = Flow::new(|x| Vector::new(-x.x, 0.0, 0.0));
        let cd = flow.engine(&SimpleFilter).c_d(&flow.strain());
        let expected = 2.0_f64.sqrt() / 72.0;
        for cell in flow.interior() {
            assert!(
                (cd[cell] - expected).abs() < 1e-10,
                "cell {cell}: {} vs {expected}",
                cd[cell]
            );
        }
    }

    #[test]
    fn coefficients_are_idempotent() {
        let flow = Flow::new(|x| Vector::new((0.7 * x.x).sin(), 0.2 * x.x, 0.0));
        let engine = flow.engine(&SimpleFilter);
        let s = flow.strain();
        let kk = engine.subgrid_energy();
        let nu_eff = ScalarField::uniform("nuEff", flow.mesh.n_cells(), 1e-3);
        assert_eq!(engine.c_d(&s), engine.c_d(&s));
        assert_eq!(engine.c_i(&s), engine.c_i(&s));
        assert_eq!(engine.c_e(&s, &kk, &nu_eff), engine.c_e(&s, &kk, &nu_eff));
    }

    #[test]
    fn zero_strain_keeps_cd_finite() {
        let flow = Flow::new(|x| Vector::new((0.3 * x.x).cos(), 0.0, 0.0));
        let zero = TensorField::zeros("Sij", flow.mesh.n_cells());
        let cd = flow.engine(&SimpleFilter).c_d(&zero);
        assert!(cd.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn ce_floor_with_zero_energy() {
        let flow = Flow::new(|_| Vector::zeros());
        let n = flow.mesh.n_cells();
        let engine = flow.engine(&SimpleFilter);
        let d = TensorField::zeros("D", n);
        let kk = ScalarField::zeros("KK", n);
        let nu_eff = ScalarField::uniform("nuEff", n, 1e-5);
        let ce = engine.c_e(&d, &kk, &nu_eff);
        assert!(ce.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn ce_rectifies_negative_ratios_only() {
        let flow = Flow::new(|x| Vector::new((0.9 * x.x).sin(), 0.0, 0.0));
        let n = flow.mesh.n_cells();
        let engine = flow.engine(&SimpleFilter);
        let d = flow.strain().map("D", dev);
        let mut kk = engine.subgrid_energy();
        kk.max_with(SMALL);

        let positive = ScalarField::uniform("nuEff", n, 1e-3);
        let raw = engine.dissipation_ratio(&d, &kk, &positive);
        let ce = engine.c_e(&d, &kk, &positive);
        assert!(raw.iter().any(|r| *r > 0.0));
        for cell in 0..n {
            assert_eq!(ce[cell], raw[cell].max(0.0));
        }

        let negative = ScalarField::uniform("nuEff", n, -1e-3);
        let ce = engine.c_e(&d, &kk, &negative);
        assert!(ce.iter().all(|c| *c == 0.0));
    }

    #[test]
    fn ci_is_finite_for_vanishing_tensor() {
        let flow = Flow::new(|x| Vector::new(x.x, 0.0, 0.0));
        let zero = TensorField::uniform("T", flow.mesh.n_cells(), Tensor::zeros());
        let ci = flow.engine(&SimpleFilter).c_i(&zero);
        assert!(ci.all_finite());
    }
}
