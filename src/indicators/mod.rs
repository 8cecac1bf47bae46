pub mod engine;
pub mod error;

pub mod momentum;
pub mod trend;
pub mod volatility;

pub use engine::{compute, IndicatorEngine, IndicatorState};
pub use error::IndicatorError;
