//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod actuator;
pub mod document_store;
pub mod reading_source;
pub mod resolver;
pub mod secret_store;

pub use actuator::Actuator;
pub use document_store::{DocumentStore, StoreConnection};
pub use reading_source::ReadingSource;
pub use resolver::{ActuatorResolver, SensorResolver};
pub use secret_store::SecretStore;
