//! End-to-end pipelines: training from a raw CSV to persisted artifacts,
//! and single-record inference from those artifacts.

pub mod predict;
pub mod train;

pub use predict::{PredictPipeline, StudentRecord};
pub use train::{TrainPipeline, TrainReport};
