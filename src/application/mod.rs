//! Application wiring.

pub mod service_factory;

pub use service_factory::ServiceFactory;
