//! Mercator projection, ellipsoidal form with a standard parallel.
//!
//! forward: x = Re·k₀·(λ - λ₀), y = -Re·k₀·ln t(φ)
//! inverse: λ = λ₀ + x/(Re·k₀), φ from t' = exp(-y/(Re·k₀)) by iteration
//!
//! k₀ = cos(φ₀)/sqrt(1 - e²·sin²φ₀), t per Snyder.

use std::f64::consts::FRAC_PI_2;

use log::warn;

use crate::error::ProjError;
use crate::mapping::Mapping;
use crate::proj::snyder::{msfn, phi_from_ts, tsfn};
use crate::proj::{Projection, ProjectionBase};

/// How close (radians) a latitude may come to a pole before the forward
/// transform is considered asymptotic.
const POLE_EPSILON: f64 = 1.7e-8; // about a microdegree

pub struct Mercator {
    base: ProjectionBase,
    center_longitude: f64,
    center_latitude_deg: f64,
    scale_factor: f64,
}

impl Mercator {
    pub fn new(mapping: Mapping, allow_defaults: bool) -> Result<Self, ProjError> {
        let mut base = ProjectionBase::from_mapping(mapping)?;

        let center_longitude_deg = base.center_longitude_degrees(allow_defaults)?;
        let center_latitude_deg = base.center_latitude_degrees(allow_defaults)?;

        let center_longitude = base.internal_longitude(center_longitude_deg);
        let center_latitude = base.internal_latitude(center_latitude_deg);

        let e2 = base.eccentricity() * base.eccentricity();
        let scale_factor = msfn(center_latitude, e2);

        Ok(Self {
            base,
            center_longitude,
            center_latitude_deg,
            scale_factor,
        })
    }
}

impl Projection for Mercator {
    fn base(&self) -> &ProjectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ProjectionBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "Mercator"
    }

    fn set_ground(&mut self, lat: f64, lon: f64) -> bool {
        self.base.store_ground(lat, lon);
        let Some((phi, lam)) = self.base.ground_to_internal(lat, lon) else {
            self.base.set_good(false);
            return false;
        };
        // y is asymptotic at the poles.
        if FRAC_PI_2 - phi.abs() < POLE_EPSILON {
            self.base.set_good(false);
            return false;
        }
        let ak = self.base.equatorial_radius() * self.scale_factor;
        let e = self.base.eccentricity();
        let x = ak * (lam - self.center_longitude);
        let y = -ak * tsfn(phi, e).ln();
        self.base.set_computed_xy(x, y);
        true
    }

    fn set_coordinate(&mut self, x: f64, y: f64) -> bool {
        self.base.set_xy(x, y);
        if !x.is_finite() || !y.is_finite() {
            self.base.set_good(false);
            return false;
        }
        let ak = self.base.equatorial_radius() * self.scale_factor;
        let ts = (-y / ak).exp();
        let Some(phi) = phi_from_ts(ts, self.base.eccentricity()) else {
            warn!("Mercator inverse failed to converge at (x, y) = ({x}, {y})");
            self.base.set_good(false);
            return false;
        };
        let lam = self.center_longitude + x / ak;
        self.base.internal_to_ground(phi, lam);
        true
    }

    fn true_scale_latitude(&self) -> f64 {
        self.center_latitude_deg
    }

    fn is_equatorial_cylindrical(&self) -> bool {
        true
    }

    fn mapping(&self) -> Mapping {
        let mut out = self.base.core_mapping();
        self.base.copy_option(&mut out, "CenterLatitude");
        self.base.copy_option(&mut out, "CenterLongitude");
        out
    }

    fn mapping_latitudes(&self) -> Mapping {
        let mut out = Mapping::new();
        self.base.copy_option(&mut out, "MinimumLatitude");
        self.base.copy_option(&mut out, "MaximumLatitude");
        self.base.copy_option(&mut out, "CenterLatitude");
        out
    }

    fn mapping_longitudes(&self) -> Mapping {
        let mut out = Mapping::new();
        self.base.copy_option(&mut out, "MinimumLongitude");
        self.base.copy_option(&mut out, "MaximumLongitude");
        self.base.copy_option(&mut out, "CenterLongitude");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Clarke 1866, Snyder's Mercator worked example.
    fn clarke_mapping() -> Mapping {
        let mut m = Mapping::new();
        m.insert("ProjectionName", "Mercator");
        m.insert("EquatorialRadius", 6378206.4);
        m.insert("PolarRadius", 6356583.8);
        m.insert("LatitudeType", "Planetographic");
        m.insert("LongitudeDirection", "PositiveEast");
        m.insert("LongitudeDomain", 180_i64);
        m.insert("MinimumLatitude", -60.0);
        m.insert("MaximumLatitude", 60.0);
        m.insert("MinimumLongitude", -180.0);
        m.insert("MaximumLongitude", -30.0);
        m.insert("CenterLatitude", 0.0);
        m.insert("CenterLongitude", -180.0);
        m
    }

    #[test]
    fn test_forward_snyder_example() {
        // Snyder PP 1395, p. 266: φ = 35°, λ = -75°, λ₀ = -180°.
        let mut proj = Mercator::new(clarke_mapping(), false).unwrap();
        assert!(proj.set_ground(35.0, -75.0));
        assert_relative_eq!(proj.x_coord(), 11_688_673.7, epsilon = 0.5);
        assert_relative_eq!(proj.y_coord(), 4_139_145.6, epsilon = 0.5);
    }

    #[test]
    fn test_round_trip_within_a_millimetre() {
        let mut proj = Mercator::new(clarke_mapping(), false).unwrap();
        let cases: &[(f64, f64)] = &[
            (35.0, -75.0),
            (0.0, -179.0),
            (-55.125, -44.0),
            (80.0, -100.0),
        ];
        for &(lat, lon) in cases {
            assert!(proj.set_ground(lat, lon), "forward failed at ({lat}, {lon})");
            let (x, y) = (proj.x_coord(), proj.y_coord());
            assert!(proj.set_coordinate(x, y));
            assert!(proj.set_ground(proj.latitude(), proj.longitude()));
            assert_relative_eq!(proj.x_coord(), x, epsilon = 1e-3);
            assert_relative_eq!(proj.y_coord(), y, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_pole_asymptote_fails() {
        let mut proj = Mercator::new(clarke_mapping(), false).unwrap();
        assert!(!proj.set_ground(89.9999999, 0.0));
        assert!(!proj.is_good());
        assert!(!proj.set_ground(-90.0, 0.0));
        // Just off the asymptotic band still projects.
        assert!(proj.set_ground(89.99, 0.0));
    }

    #[test]
    fn test_scale_factor_from_standard_parallel() {
        let mut m = clarke_mapping();
        m.insert("CenterLatitude", 40.0);
        let mut proj = Mercator::new(m, false).unwrap();
        // x shrinks by k0 relative to the equatorial-parallel case.
        let mut equatorial = Mercator::new(clarke_mapping(), false).unwrap();
        assert!(proj.set_ground(0.0, -90.0));
        assert!(equatorial.set_ground(0.0, -90.0));
        let e2 = proj.base().eccentricity().powi(2);
        let k0 = msfn(40.0_f64.to_radians(), e2);
        assert_relative_eq!(proj.x_coord(), equatorial.x_coord() * k0, epsilon = 1e-6);
        assert_relative_eq!(proj.true_scale_latitude(), 40.0);
    }

    #[test]
    fn test_is_equatorial_cylindrical() {
        let proj = Mercator::new(clarke_mapping(), false).unwrap();
        assert!(proj.is_equatorial_cylindrical());
    }

    #[test]
    fn test_mapping_echo_includes_centers() {
        let proj = Mercator::new(clarke_mapping(), false).unwrap();
        let echo = proj.mapping();
        assert!(echo.contains("CenterLatitude"));
        assert!(echo.contains("CenterLongitude"));
        assert!(echo.contains("EquatorialRadius"));
        assert_relative_eq!(proj.mapping_latitudes().real("CenterLatitude").unwrap(), 0.0);
    }
}
