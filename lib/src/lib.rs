//! ontomap compiles a schema expressed as graph triples into a typed object
//! model (a `TypeRegistry` of flattened class and property descriptors) and
//! maps triple data into and out of that model: importing collections into
//! an `ObjectGraph` of validated entities, and exporting populations back
//! to triples.

pub mod consts;
pub mod entity;
pub mod errors;
pub mod graph;
pub mod mapper;
pub mod options;
pub mod property;
pub mod registry;
pub mod schema;
pub mod transform;
pub mod util;

pub use entity::Entity;
pub use graph::ObjectGraph;
pub use options::Strictness;
pub use property::{PropertySet, PropertyValue};
pub use registry::TypeRegistry;
pub use util::TripleCollection;

/// Initializes logging for the ontomap library.
///
/// This function checks for the `ONTOMAP_LOG` environment variable. If it is
/// set, `RUST_LOG` is set to its value. `ONTOMAP_LOG` takes precedence over
/// `RUST_LOG`. The logger initialization (e.g., `env_logger::init()`) must be
/// called after this function for the log level to take effect.
pub fn init_logging() {
    if let Ok(log_level) = std::env::var("ONTOMAP_LOG") {
        std::env::set_var("RUST_LOG", log_level);
    }
}
