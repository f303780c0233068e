//! Latitude, longitude, and radius helpers shared by every projection.
//!
//! Latitudes and longitudes are degrees at this boundary; the projections
//! work in radians internally. The domain normalizers accept any finite
//! input magnitude and are idempotent bit-for-bit: a value already inside
//! the closed target interval is returned untouched, so an inverse landing
//! exactly on 0 or 360 stays put.

use crate::error::ProjError;
use crate::mapping::LongitudeDomain;

/// Tolerance on `|lat| <= 90` checks, in degrees.
const LATITUDE_EPSILON: f64 = 1.0e-10;

fn check_latitude(lat: f64) -> Result<(), ProjError> {
    if !lat.is_finite() || lat.abs() > 90.0 + LATITUDE_EPSILON {
        return Err(ProjError::InvalidAngle(format!(
            "latitude [{lat}] is outside the range of [-90:90]"
        )));
    }
    Ok(())
}

fn check_radii(equatorial: f64, polar: f64) -> Result<(), ProjError> {
    if !equatorial.is_finite() || equatorial <= 0.0 {
        return Err(ProjError::InvalidRadius(format!(
            "equatorial radius [{equatorial}] must be greater than zero"
        )));
    }
    if !polar.is_finite() || polar <= 0.0 {
        return Err(ProjError::InvalidRadius(format!(
            "polar radius [{polar}] must be greater than zero"
        )));
    }
    Ok(())
}

/// tan-scaling core of the latitude conversions. `ratio` is squared
/// (Re/Rp)² one way, (Rp/Re)² the other. The poles and the equator are
/// fixed points.
fn scale_latitude(lat: f64, ratio: f64) -> f64 {
    if lat.abs() >= 90.0 {
        return lat;
    }
    (lat.to_radians().tan() * ratio).atan().to_degrees()
}

pub(crate) fn centric_to_graphic(lat: f64, equatorial: f64, polar: f64) -> f64 {
    scale_latitude(lat, (equatorial / polar) * (equatorial / polar))
}

pub(crate) fn graphic_to_centric(lat: f64, equatorial: f64, polar: f64) -> f64 {
    scale_latitude(lat, (polar / equatorial) * (polar / equatorial))
}

/// Convert a planetocentric latitude (degrees) to planetographic.
pub fn to_planetographic(lat: f64, equatorial: f64, polar: f64) -> Result<f64, ProjError> {
    check_latitude(lat)?;
    check_radii(equatorial, polar)?;
    Ok(centric_to_graphic(lat, equatorial, polar))
}

/// Convert a planetographic latitude (degrees) to planetocentric.
pub fn to_planetocentric(lat: f64, equatorial: f64, polar: f64) -> Result<f64, ProjError> {
    check_latitude(lat)?;
    check_radii(equatorial, polar)?;
    Ok(graphic_to_centric(lat, equatorial, polar))
}

/// Tolerance (degrees) for treating a longitude as sitting on a domain
/// endpoint rather than wrapping it to the far side.
const ENDPOINT_EPSILON: f64 = 1.0e-9;

/// Normalize a longitude into the 0 to 360 domain.
///
/// Values already in [0, 360] pass through unchanged (both endpoints are
/// representable), as do values within rounding distance of an endpoint:
/// an inverse transform that lands at 360 + 1 ulp must stay at 360, not
/// wrap to 0. Everything else wraps into [0, 360).
pub fn to_360_domain(lon: f64) -> f64 {
    if (0.0..=360.0).contains(&lon)
        || lon.abs() < ENDPOINT_EPSILON
        || (lon - 360.0).abs() < ENDPOINT_EPSILON
    {
        lon
    } else {
        lon.rem_euclid(360.0)
    }
}

/// Normalize a longitude into the -180 to 180 domain.
///
/// Values already in [-180, 180] pass through unchanged; everything else
/// wraps into [-180, 180).
pub fn to_180_domain(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

fn to_domain(lon: f64, domain: LongitudeDomain) -> f64 {
    match domain {
        LongitudeDomain::Domain180 => to_180_domain(lon),
        LongitudeDomain::Domain360 => to_360_domain(lon),
    }
}

/// Convert a positive-west longitude into the positive-east direction,
/// normalized to the given domain.
pub fn to_positive_east(lon: f64, domain: LongitudeDomain) -> f64 {
    to_domain(-lon, domain)
}

/// Convert a positive-east longitude into the positive-west direction,
/// normalized to the given domain.
pub fn to_positive_west(lon: f64, domain: LongitudeDomain) -> f64 {
    to_domain(-lon, domain)
}

/// Spheroid radius at the given latitude (degrees), in the units of the
/// radii: Re·Rp / sqrt((Rp·cosφ)² + (Re·sinφ)²).
pub fn local_radius(lat: f64, equatorial: f64, polar: f64) -> Result<f64, ProjError> {
    check_latitude(lat)?;
    check_radii(equatorial, polar)?;
    if equatorial - polar < f64::EPSILON {
        return Ok(equatorial);
    }
    let phi = lat.to_radians();
    let a = polar * phi.cos();
    let b = equatorial * phi.sin();
    Ok(equatorial * polar / (a * a + b * b).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Mars radii, metres.
    const RE: f64 = 3396190.0;
    const RP: f64 = 3376200.0;

    #[test]
    fn test_latitude_conversions_round_trip() {
        for lat in [-90.0, -66.0, -25.5, 0.0, 10.0, 45.0, 89.9, 90.0] {
            let graphic = to_planetographic(lat, RE, RP).unwrap();
            let back = to_planetocentric(graphic, RE, RP).unwrap();
            assert_relative_eq!(back, lat, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_graphic_exceeds_centric_in_magnitude() {
        // Flattening pushes planetographic latitudes poleward.
        let graphic = to_planetographic(45.0, RE, RP).unwrap();
        assert!(graphic > 45.0);
        assert!(graphic < 46.0);
    }

    #[test]
    fn test_conversions_identity_on_sphere() {
        for lat in [-90.0, -30.0, 0.0, 30.0, 90.0] {
            assert_relative_eq!(to_planetographic(lat, 1.0, 1.0).unwrap(), lat);
            assert_relative_eq!(to_planetocentric(lat, 1.0, 1.0).unwrap(), lat);
        }
    }

    #[test]
    fn test_invalid_latitude_rejected() {
        assert!(to_planetographic(90.1, RE, RP).is_err());
        assert!(to_planetocentric(-91.0, RE, RP).is_err());
        assert!(to_planetographic(f64::NAN, RE, RP).is_err());
    }

    #[test]
    fn test_invalid_radius_rejected() {
        assert!(to_planetographic(10.0, 0.0, RP).is_err());
        assert!(to_planetographic(10.0, RE, -1.0).is_err());
        assert!(local_radius(10.0, f64::INFINITY, RP).is_err());
    }

    #[test]
    fn test_to_360_domain() {
        assert_relative_eq!(to_360_domain(-10.0), 350.0);
        assert_relative_eq!(to_360_domain(370.0), 10.0);
        assert_relative_eq!(to_360_domain(-270.0), 90.0);
        assert_relative_eq!(to_360_domain(720.0 + 45.0), 45.0);
        // Endpoints stick.
        assert_eq!(to_360_domain(0.0), 0.0);
        assert_eq!(to_360_domain(360.0), 360.0);
        // A rounding hair past an endpoint sticks too instead of wrapping
        // to the far side of the domain.
        let hair_past = 360.0 + 5.0e-12;
        assert_eq!(to_360_domain(hair_past), hair_past);
        let hair_under = -5.0e-12;
        assert_eq!(to_360_domain(hair_under), hair_under);
    }

    #[test]
    fn test_to_180_domain() {
        assert_relative_eq!(to_180_domain(190.0), -170.0);
        assert_relative_eq!(to_180_domain(-190.0), 170.0);
        assert_relative_eq!(to_180_domain(350.0), -10.0);
        assert_eq!(to_180_domain(180.0), 180.0);
        assert_eq!(to_180_domain(-180.0), -180.0);
    }

    #[test]
    fn test_domain_normalization_idempotent_bit_for_bit() {
        let cases = [
            -1.0e10, -54321.125, -360.0, -359.9, -180.0, -0.0, 0.0, 1.5, 179.999, 180.0,
            359.999, 360.0, 361.0, 1234.5, 9.87e9,
        ];
        for lon in cases {
            let once = to_360_domain(lon);
            assert_eq!(once.to_bits(), to_360_domain(once).to_bits());
            let once = to_180_domain(lon);
            assert_eq!(once.to_bits(), to_180_domain(once).to_bits());
        }
    }

    #[test]
    fn test_positive_east_west() {
        assert_relative_eq!(to_positive_east(100.0, LongitudeDomain::Domain360), 260.0);
        assert_relative_eq!(to_positive_west(260.0, LongitudeDomain::Domain360), 100.0);
        assert_relative_eq!(to_positive_east(100.0, LongitudeDomain::Domain180), -100.0);
        assert_relative_eq!(to_positive_west(-100.0, LongitudeDomain::Domain180), 100.0);
    }

    #[test]
    fn test_local_radius() {
        assert_relative_eq!(local_radius(0.0, RE, RP).unwrap(), RE);
        assert_relative_eq!(local_radius(90.0, RE, RP).unwrap(), RP);
        assert_relative_eq!(local_radius(-90.0, RE, RP).unwrap(), RP);
        let mid = local_radius(45.0, RE, RP).unwrap();
        assert!(mid < RE && mid > RP);
        // Spheres short-circuit to the equatorial radius.
        assert_relative_eq!(local_radius(37.0, 1.0, 1.0).unwrap(), 1.0);
    }
}
