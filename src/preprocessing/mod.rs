//! Feature preprocessing
//!
//! Fixed transform for the student performance schema: numeric columns are
//! median-imputed and standard-scaled; categorical columns are mode-imputed,
//! one-hot encoded with a stable column ordering, and scaled by standard
//! deviation only. Fit once on training data, then applied unchanged to
//! test and inference tables.

mod encoder;
mod imputer;
mod pipeline;
mod scaler;

pub use encoder::OneHotEncoder;
pub use imputer::{CategoricalImputer, NumericImputer};
pub use pipeline::Preprocessor;
pub use scaler::StandardScaler;
