//! Gateway implementations

mod builder;
mod embedded;

pub use builder::{Doorman, DoormanBuilder};
pub use embedded::EmbeddedGateway;
