pub mod error;
pub mod logger;
pub mod metrics;

pub use error::EngineError;
pub use logger::init_logger;
pub use metrics::{Metrics, Timer};
