//! Scalers, regressors and the prediction dispatcher

pub mod forest;
pub mod inference;
pub mod loader;
pub mod network;
pub mod scaler;

use crate::error::Result;
use ndarray::ArrayView2;

pub use forest::TreeEnsemble;
pub use inference::Predictor;
pub use loader::ArtifactStore;
pub use network::OnnxNetwork;
pub use scaler::{Scaler, ScalerPair};

/// A fitted regressor with a single output.
///
/// Takes already-scaled rows and returns one scaled prediction per row.
pub trait Regressor {
    fn predict(&mut self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>>;

    /// Feature count declared by the artifact, when it records one
    fn n_features(&self) -> Option<usize>;
}
