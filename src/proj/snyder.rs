//! Snyder's auxiliary functions for ellipsoidal projections
//! (Map Projections — A Working Manual, USGS PP 1395).

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Iteration cap for the t → φ inversion.
const PHI_ITERATIONS: usize = 15;

/// Convergence tolerance for the t → φ inversion, radians.
const PHI_TOLERANCE: f64 = 1.0e-12;

/// Snyder's t(φ): tan(π/4 - φ/2) · [(1 + e·sinφ)/(1 - e·sinφ)]^(e/2).
///
/// Monotone decreasing from +∞ at the south pole to 0 at the north pole.
pub(crate) fn tsfn(phi: f64, e: f64) -> f64 {
    let sin_phi = phi.sin();
    (FRAC_PI_4 - phi / 2.0).tan() * ((1.0 + e * sin_phi) / (1.0 - e * sin_phi)).powf(e / 2.0)
}

/// Snyder's m(φ): cosφ / sqrt(1 - e²·sin²φ).
pub(crate) fn msfn(phi: f64, e2: f64) -> f64 {
    let sin_phi = phi.sin();
    phi.cos() / (1.0 - e2 * sin_phi * sin_phi).sqrt()
}

/// Invert t(φ) for φ by fixed-point iteration. None when the iteration
/// fails to converge within its bound.
pub(crate) fn phi_from_ts(ts: f64, e: f64) -> Option<f64> {
    let mut phi = FRAC_PI_2 - 2.0 * ts.atan();
    for _ in 0..PHI_ITERATIONS {
        let con = e * phi.sin();
        let next = FRAC_PI_2 - 2.0 * (ts * ((1.0 - con) / (1.0 + con)).powf(e / 2.0)).atan();
        if (next - phi).abs() < PHI_TOLERANCE {
            return Some(next);
        }
        phi = next;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Clarke 1866 first eccentricity.
    const E: f64 = 0.082_271_9;

    #[test]
    fn test_tsfn_reference_points() {
        // Snyder's Mercator example: t(35°) on Clarke 1866.
        let t = tsfn(35.0_f64.to_radians(), E);
        assert_relative_eq!(t, 0.522_593_5, epsilon = 5e-6);
        // Equator: t = 1 exactly.
        assert_relative_eq!(tsfn(0.0, E), 1.0, epsilon = 1e-15);
        // North pole: t = 0.
        assert_relative_eq!(tsfn(FRAC_PI_2, E), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_msfn_reference_points() {
        assert_relative_eq!(msfn(0.0, E * E), 1.0, epsilon = 1e-15);
        assert_relative_eq!(msfn(FRAC_PI_2, E * E), 0.0, epsilon = 1e-12);
        // Spherical case degenerates to cosφ.
        assert_relative_eq!(
            msfn(0.5, 0.0),
            0.5_f64.cos(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn test_phi_from_ts_round_trip() {
        for lat_deg in [-85.0_f64, -45.0, -1.0, 0.0, 20.0, 60.0, 89.0] {
            let phi = lat_deg.to_radians();
            let ts = tsfn(phi, E);
            let back = phi_from_ts(ts, E).unwrap();
            assert_relative_eq!(back, phi, epsilon = 1e-11);
        }
    }

    #[test]
    fn test_phi_from_ts_spherical() {
        // With e = 0 the first estimate is exact.
        let phi = 0.7;
        let ts = tsfn(phi, 0.0);
        assert_relative_eq!(phi_from_ts(ts, 0.0).unwrap(), phi, epsilon = 1e-12);
    }
}
