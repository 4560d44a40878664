use log::{debug, trace, warn};
use serde::{Serialize, Deserialize};

use crate::error::{NnError, NnResult};
use crate::math::matrix::Matrix;
use super::Layer;

/// Where the pooling window sits relative to its nominal input position.
///
/// - `Centered` — both passes offset the window by `(size - 1) / 2`, so
///   backward re-scans exactly the elements forward compared.
/// - `Legacy`   — backward offsets by `size / 2` instead. For odd `size` this
///   is identical to `Centered`; for even `size` the backward window is
///   shifted one element up and left and may miss the forward maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolAlignment {
    #[default]
    Centered,
    Legacy,
}

/// Spatial max pooling over a batch of `channels x height x width` samples.
///
/// Each input row is one sample laid out channel-major
/// (`c * height * width + y * width + x`). Output positions are taken every
/// `stride` elements along both axes, giving
/// `outw = (width - 1) / stride + 1` and `outh = (height - 1) / stride + 1`.
/// Windows hanging over the image edge only compare their in-bounds elements.
#[derive(Debug)]
pub struct MaxPoolLayer {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub size: usize,
    pub stride: usize,
    pub alignment: PoolAlignment,
    input: Option<Matrix>,
    output: Option<Matrix>,
    delta: Option<Matrix>,
}

impl MaxPoolLayer {
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        size: usize,
        stride: usize,
    ) -> NnResult<MaxPoolLayer> {
        Self::with_alignment(width, height, channels, size, stride, PoolAlignment::default())
    }

    pub fn with_alignment(
        width: usize,
        height: usize,
        channels: usize,
        size: usize,
        stride: usize,
        alignment: PoolAlignment,
    ) -> NnResult<MaxPoolLayer> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(NnError::InvalidConfig(format!(
                "maxpool input must be non-empty, got {channels}x{height}x{width}"
            )));
        }
        if size == 0 {
            return Err(NnError::InvalidConfig("maxpool window size must be at least 1".into()));
        }
        if stride == 0 {
            return Err(NnError::InvalidConfig("maxpool stride must be at least 1".into()));
        }

        debug!(
            "maxpool: {channels}x{height}x{width}, size {size}, stride {stride}, {alignment:?} alignment"
        );

        Ok(MaxPoolLayer {
            width,
            height,
            channels,
            size,
            stride,
            alignment,
            input: None,
            output: None,
            delta: None,
        })
    }

    pub fn output_width(&self) -> usize {
        (self.width - 1) / self.stride + 1
    }

    pub fn output_height(&self) -> usize {
        (self.height - 1) / self.stride + 1
    }

    /// Columns expected in every input row.
    pub fn input_cols(&self) -> usize {
        self.channels * self.height * self.width
    }

    pub fn output_cols(&self) -> usize {
        self.channels * self.output_height() * self.output_width()
    }

    /// Input cached by the last `forward`.
    pub fn input(&self) -> Option<&Matrix> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&Matrix> {
        self.output.as_ref()
    }

    pub fn delta(&self) -> Option<&Matrix> {
        self.delta.as_ref()
    }

    /// Replaces the upstream delta wholesale. It must match the cached output.
    pub fn set_delta(&mut self, delta: Matrix) -> NnResult<()> {
        let output = self.output.as_ref().ok_or(NnError::NotForwarded(self.name()))?;
        delta.ensure_shape(output.rows(), output.cols())?;
        self.delta = Some(delta);
        Ok(())
    }

    fn forward_center(&self) -> usize {
        (self.size - 1) / 2
    }

    fn backward_center(&self) -> usize {
        match self.alignment {
            PoolAlignment::Centered => self.forward_center(),
            PoolAlignment::Legacy => self.size / 2,
        }
    }

    /// Index of output position `(h, w)` of channel `c` within one output row.
    fn output_index(&self, c: usize, h: usize, w: usize) -> usize {
        let outw = self.output_width();
        c * outw * self.output_height() + (h / self.stride) * outw + w / self.stride
    }

    /// In-bounds plane indices of the window anchored at `(h, w)`, in
    /// row-major window order. Out-of-bounds candidates are skipped.
    fn window(&self, h: usize, w: usize, center: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.size)
            .flat_map(move |a| (0..self.size).map(move |b| (a, b)))
            .filter_map(move |(a, b)| {
                let y = (h + a).checked_sub(center)?;
                let x = (w + b).checked_sub(center)?;
                (y < self.height && x < self.width).then(|| y * self.width + x)
            })
    }

    /// Top-left corners of every output position, in output order.
    fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.height)
            .step_by(self.stride)
            .flat_map(move |h| (0..self.width).step_by(self.stride).map(move |w| (h, w)))
    }
}

impl Layer for MaxPoolLayer {
    fn name(&self) -> &'static str {
        "maxpool"
    }

    fn forward(&mut self, input: Matrix) -> NnResult<&Matrix> {
        input.ensure_shape(input.rows(), self.input_cols())?;

        let plane_len = self.height * self.width;
        let center = self.forward_center();
        let mut output = Matrix::zeros(input.rows(), self.output_cols())?;
        let delta = Matrix::zeros(input.rows(), self.output_cols())?;

        for n in 0..input.rows() {
            let sample = input.row(n);
            let out_row = output.row_mut(n);

            for c in 0..self.channels {
                let plane = &sample[c * plane_len..(c + 1) * plane_len];

                for (h, w) in self.positions() {
                    // The anchor itself is always in bounds and seeds the max.
                    let mut max = plane[h * self.width + w];
                    for i in self.window(h, w, center) {
                        if plane[i] > max {
                            max = plane[i];
                        }
                    }
                    out_row[self.output_index(c, h, w)] = max;
                }
            }
        }

        debug!(
            "{}: forward {}x{} -> {}x{}",
            self.name(), input.rows(), input.cols(), output.rows(), output.cols()
        );

        self.input = Some(input);
        self.delta = Some(delta);
        Ok(&*self.output.insert(output))
    }

    fn backward(&mut self, prev_delta: &mut Matrix) -> NnResult<()> {
        let (Some(input), Some(output), Some(delta)) =
            (self.input.as_ref(), self.output.as_ref(), self.delta.as_ref())
        else {
            return Err(NnError::NotForwarded(self.name()));
        };
        prev_delta.ensure_shape(input.rows(), input.cols())?;
        delta.ensure_shape(output.rows(), output.cols())?;

        let plane_len = self.height * self.width;
        let center = self.backward_center();
        let mut dropped = 0usize;

        for n in 0..input.rows() {
            let sample = input.row(n);
            let out_row = output.row(n);
            let delta_row = delta.row(n);
            let prev_row = prev_delta.row_mut(n);

            for c in 0..self.channels {
                let base = c * plane_len;
                let plane = &sample[base..base + plane_len];

                for (h, w) in self.positions() {
                    let o = self.output_index(c, h, w);
                    let max = out_row[o];

                    // First match in scan order wins ties. Overlapping windows
                    // may pick the same element, so contributions accumulate.
                    match self.window(h, w, center).find(|&i| plane[i] == max) {
                        Some(i) => prev_row[base + i] += delta_row[o],
                        None => dropped += 1,
                    }
                }
            }
        }

        if dropped > 0 {
            warn!(
                "{}: {dropped} output position(s) had no matching input in the backward window; \
                 their delta was not propagated",
                self.name()
            );
        }
        debug!("{}: backward into {}x{}", self.name(), prev_delta.rows(), prev_delta.cols());

        Ok(())
    }

    fn update(&mut self, _rate: f64, _momentum: f64, _decay: f64) {
        trace!("{}: no parameters to update", self.name());
    }

    fn delta_mut(&mut self) -> Option<&mut Matrix> {
        self.delta.as_mut()
    }
}
