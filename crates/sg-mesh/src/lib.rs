//! sg-mesh: face-addressed finite-volume mesh for sgsflow.
//!
//! Provides:
//! - Owner/neighbour face addressing with precomputed interpolation weights
//! - Compact cell -> face adjacency for per-cell gathers
//! - Incremental builder with validation
//! - Cartesian box generator with per-axis periodicity
//!
//! # Example
//!
//! ```
//! use sg_mesh::CartesianSpec;
//!
//! let mesh = CartesianSpec::new([4, 4, 1], [1.0, 1.0, 0.25]).build().unwrap();
//! assert_eq!(mesh.n_cells(), 16);
//! ```

pub mod builder;
pub mod cartesian;
pub mod error;
pub mod mesh;
pub(crate) mod validate;

pub use builder::MeshBuilder;
pub use cartesian::CartesianSpec;
pub use error::{MeshError, MeshResult};
pub use mesh::{BoundaryFace, FaceRef, InternalFace, Mesh};
