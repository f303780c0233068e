//! Robinson projection. Spherical, pseudocylindrical, defined by Robinson's
//! published coefficient tables rather than closed-form equations.
//!
//! forward: x = 0.8487·Re·X(|φ|)·(λ - λ₀), y = ±1.3523·Re·Y(|φ|)
//! where X and Y interpolate the tables with Stirling's central-difference
//! formula to second order. The inverse recovers φ from y by Newton
//! refinement against the forward interpolation, then λ from x.

use log::warn;

use crate::error::ProjError;
use crate::mapping::Mapping;
use crate::proj::{Projection, ProjectionBase, XyRange};

/// X-length ratios in 5° steps. The leading entry is the -5° row so the
/// three-point Stirling stencil is centered even at the equator.
const XLR: [f64; 20] = [
    0.9986, 1.0000, 0.9986, 0.9954, 0.9900, 0.9822, 0.9730, 0.9600, 0.9427, 0.9216, 0.8962,
    0.8679, 0.8350, 0.7986, 0.7597, 0.7186, 0.6732, 0.6213, 0.5722, 0.5322,
];

/// Parallel-spacing ratios, same layout as [`XLR`].
const PR: [f64; 20] = [
    -0.0620, 0.0000, 0.0620, 0.1240, 0.1860, 0.2480, 0.3100, 0.3720, 0.4340, 0.4958, 0.5571,
    0.6176, 0.6769, 0.7346, 0.7903, 0.8435, 0.8936, 0.9394, 0.9761, 1.0000,
];

const X_SCALE: f64 = 0.8487;
const Y_SCALE: f64 = 1.3523;

/// Highest valid stencil start: rows i, i+1, i+2 must stay in the table.
const MAX_INDEX: usize = 17;

const NEWTON_ITERATIONS: usize = 75;

/// Convergence tolerance on |y₁ - y|, projection units.
const NEWTON_TOLERANCE: f64 = 1.0e-5;

/// Longitudes past this magnitude (degrees) are numeric garbage.
const LONGITUDE_LIMIT: f64 = 1.0e10;

const EPSLN: f64 = 1.0e-10;

/// Table row and fractional offset for a latitude in degrees.
fn table_index(lat_deg: f64) -> Option<(usize, f64)> {
    let steps = lat_deg.abs() / 5.0;
    let index = (steps - EPSLN).max(0.0) as usize;
    if index > MAX_INDEX {
        return None;
    }
    Some((index, steps - index as f64))
}

/// Stirling's central-difference interpolation, second order, over the rows
/// starting at `index`.
fn stirling(table: &[f64; 20], index: usize, p: f64) -> f64 {
    table[index + 1]
        + p * (table[index + 2] - table[index]) / 2.0
        + p * p * (table[index + 2] - 2.0 * table[index + 1] + table[index]) / 2.0
}

pub struct Robinson {
    base: ProjectionBase,
    center_longitude: f64,
}

impl Robinson {
    pub fn new(mapping: Mapping, allow_defaults: bool) -> Result<Self, ProjError> {
        let mut base = ProjectionBase::from_mapping(mapping)?;
        let center_longitude_deg = base.center_longitude_degrees(allow_defaults)?;
        let center_longitude = base.internal_longitude(center_longitude_deg);
        Ok(Self {
            base,
            center_longitude,
        })
    }

    /// Forward y for a latitude in degrees, unsigned table evaluation.
    fn parallel_y(&self, lat_deg: f64) -> Option<f64> {
        let (index, p) = table_index(lat_deg)?;
        let y = Y_SCALE * self.base.equatorial_radius() * stirling(&PR, index, p);
        Some(if lat_deg < 0.0 { -y } else { y })
    }
}

impl Projection for Robinson {
    fn base(&self) -> &ProjectionBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ProjectionBase {
        &mut self.base
    }

    fn name(&self) -> &'static str {
        "Robinson"
    }

    fn set_ground(&mut self, lat: f64, lon: f64) -> bool {
        self.base.store_ground(lat, lon);
        let Some((phi, lam)) = self.base.ground_to_internal(lat, lon) else {
            self.base.set_good(false);
            return false;
        };
        let lat_deg = phi.to_degrees();
        let Some((index, p)) = table_index(lat_deg) else {
            self.base.set_good(false);
            return false;
        };
        let radius = self.base.equatorial_radius();
        let x = X_SCALE * radius * stirling(&XLR, index, p) * (lam - self.center_longitude);
        let mut y = Y_SCALE * radius * stirling(&PR, index, p);
        if lat_deg < 0.0 {
            y = -y;
        }
        self.base.set_computed_xy(x, y);
        true
    }

    fn set_coordinate(&mut self, x: f64, y: f64) -> bool {
        self.base.set_xy(x, y);
        if !x.is_finite() || !y.is_finite() {
            self.base.set_good(false);
            return false;
        }
        let radius = self.base.equatorial_radius();
        let yy = y / (Y_SCALE * radius);
        if yy.abs() > 1.0 + EPSLN {
            // Beyond the pole rows of the table.
            self.base.set_good(false);
            return false;
        }

        // First estimate: invert the Stirling series around the row the
        // scaled y falls in, stepping down when the local inversion
        // undershoots the row.
        let mut index = ((yy.abs() * 90.0 / 5.0) - EPSLN).max(0.0) as usize;
        index = index.clamp(1, MAX_INDEX);
        let mut phi_deg;
        loop {
            let u = PR[index + 2] - PR[index];
            let v = PR[index + 2] - 2.0 * PR[index + 1] + PR[index];
            let t = 2.0 * (yy.abs() - PR[index + 1]) / u;
            let c = v / u;
            let p = t * (1.0 - c * t * (1.0 - 2.0 * c * t));
            if p >= 0.0 || index == 1 {
                phi_deg = (p + index as f64) * 5.0;
                if y < 0.0 {
                    phi_deg = -phi_deg;
                }
                break;
            }
            index -= 1;
            if index == 0 {
                warn!("Robinson inverse estimate walked off the table at y = {y}");
                self.base.set_good(false);
                return false;
            }
        }

        // Newton refinement against the forward parallel spacing.
        let mut iterations = 0;
        loop {
            let Some(y1) = self.parallel_y(phi_deg) else {
                self.base.set_good(false);
                return false;
            };
            phi_deg -= 90.0 * (y1 - y) / (Y_SCALE * radius);
            iterations += 1;
            if iterations > NEWTON_ITERATIONS {
                warn!("Robinson inverse failed to converge at (x, y) = ({x}, {y})");
                self.base.set_good(false);
                return false;
            }
            if (y1 - y).abs() <= NEWTON_TOLERANCE {
                break;
            }
        }

        let Some((index, p)) = table_index(phi_deg) else {
            self.base.set_good(false);
            return false;
        };
        let lam =
            self.center_longitude + x / (X_SCALE * radius * stirling(&XLR, index, p));
        if lam.to_degrees().abs() > LONGITUDE_LIMIT {
            self.base.set_good(false);
            return false;
        }
        self.base.internal_to_ground(phi_deg.to_radians(), lam);
        true
    }

    fn xy_range(&mut self) -> Option<XyRange> {
        let range = *self.base.ground_range()?;
        self.base.reset_xy_bounds();
        self.probe_ground_corners(&range);
        // The parallels are longest at the equator.
        if self.base.in_latitude_range(0.0) {
            self.xy_range_check(0.0, range.min_lon);
            self.xy_range_check(0.0, range.max_lon);
        }
        self.base.xy_bounds()
    }

    fn mapping(&self) -> Mapping {
        let mut out = self.base.core_mapping();
        self.base.copy_option(&mut out, "CenterLongitude");
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
