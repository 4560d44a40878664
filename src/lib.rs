pub mod error;
pub mod math;
pub mod activation;
pub mod layers;

// Convenience re-exports
pub use error::{NnError, NnResult};
pub use math::matrix::Matrix;
pub use activation::activation::{activate_matrix, gradient_matrix, Activation};
pub use layers::{Layer, LayerSpec, MaxPoolLayer, PoolAlignment};
