pub mod maxpool;
pub mod spec;

pub use maxpool::{MaxPoolLayer, PoolAlignment};
pub use spec::LayerSpec;

use crate::error::NnResult;
use crate::math::matrix::Matrix;

/// Call contract shared by every layer kind driven by an outer training loop.
///
/// A layer caches whatever `backward` needs during `forward`; `backward` is
/// only meaningful between one `forward` and the next.
pub trait Layer {
    fn name(&self) -> &'static str;

    /// Consumes `input`, caches it, and returns the freshly computed output.
    fn forward(&mut self, input: Matrix) -> NnResult<&Matrix>;

    /// Adds this layer's input gradient into `prev_delta`, reading the delta
    /// the caller stored in the layer after `forward`.
    fn backward(&mut self, prev_delta: &mut Matrix) -> NnResult<()>;

    fn update(&mut self, rate: f64, momentum: f64, decay: f64);

    /// Upstream gradient buffer, shaped like the last output.
    fn delta_mut(&mut self) -> Option<&mut Matrix>;
}
