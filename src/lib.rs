//! Planetary map projections.
//!
//! Forward and inverse transforms between planetary latitude/longitude and
//! planar (x, y) map coordinates, configured from a label-style "Mapping"
//! group. Projections are created through [`proj::factory`] and driven
//! through the [`Projection`](proj::Projection) trait:
//!
//! ```
//! use planetproj::{create, Mapping, Projection};
//!
//! let mut mapping = Mapping::new();
//! mapping.insert("ProjectionName", "Sinusoidal");
//! mapping.insert("EquatorialRadius", 3396190.0);
//! mapping.insert("PolarRadius", 3376200.0);
//! mapping.insert("LatitudeType", "Planetocentric");
//! mapping.insert("LongitudeDirection", "PositiveEast");
//! mapping.insert("LongitudeDomain", 360_i64);
//! mapping.insert("MinimumLatitude", 10.0);
//! mapping.insert("MaximumLatitude", 35.0);
//! mapping.insert("MinimumLongitude", 219.0);
//! mapping.insert("MaximumLongitude", 236.0);
//!
//! let mut proj = create(mapping, true).unwrap();
//! assert!(proj.set_ground(22.0, 225.0));
//! let (x, y) = (proj.x_coord(), proj.y_coord());
//! assert!(proj.set_coordinate(x, y));
//! let bounds = proj.xy_range().unwrap();
//! assert!(bounds.min_x < bounds.max_x);
//! ```

pub mod angle;
pub mod error;
pub mod mapping;
pub mod proj;

pub use error::ProjError;
pub use mapping::{LatitudeType, LongitudeDirection, LongitudeDomain, MapValue, Mapping};
pub use proj::factory::{create, Registry};
pub use proj::{GroundRange, Projection, ProjectionBase, XyRange};
