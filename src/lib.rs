pub mod artifacts;
pub mod config;
pub mod encoder;
pub mod error;
pub mod features;
pub mod invoke;
pub mod logging;
pub mod model;
pub mod request;
pub mod state;

pub use error::{LoadError, PredictError, RequestError};
pub use invoke::{PredictionResponse, PredictionResult, PredictorContext, infer, predict};
