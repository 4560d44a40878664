//! Max-pooling behaviour through the public `Layer` contract.

use strided_nn::*;

/// Reference max over the in-bounds part of a window, computed independently
/// with signed coordinates.
fn brute_force_max(plane: &[f64], width: usize, height: usize, h: usize, w: usize, size: usize) -> f64 {
    let center = ((size - 1) / 2) as i64;
    let mut best = f64::NEG_INFINITY;
    for a in 0..size as i64 {
        for b in 0..size as i64 {
            let y = h as i64 + a - center;
            let x = w as i64 + b - center;
            if y >= 0 && y < height as i64 && x >= 0 && x < width as i64 {
                best = best.max(plane[y as usize * width + x as usize]);
            }
        }
    }
    best
}

#[test]
fn forward_matches_brute_force_on_edges_and_corners() {
    for &(width, height, size, stride) in &[(5, 4, 3, 2), (7, 7, 4, 3), (3, 6, 5, 1), (4, 4, 2, 2)] {
        let channels = 2;
        let mut layer = MaxPoolLayer::new(width, height, channels, size, stride).unwrap();
        let input = Matrix::random(3, channels * width * height).unwrap();
        let snapshot = input.clone();
        let out = layer.forward(input).unwrap().clone();

        let outw = layer.output_width();
        let outh = layer.output_height();
        assert_eq!((out.rows(), out.cols()), (3, channels * outw * outh));

        for n in 0..3 {
            for c in 0..channels {
                let plane = &snapshot.row(n)[c * width * height..(c + 1) * width * height];
                for oy in 0..outh {
                    for ox in 0..outw {
                        let expected = brute_force_max(plane, width, height, oy * stride, ox * stride, size);
                        assert_eq!(out.get(n, c * outw * outh + oy * outw + ox), expected);
                    }
                }
            }
        }
    }
}

#[test]
fn channels_and_samples_do_not_bleed() {
    // Two samples, two 2x2 channels, one window per channel.
    let mut layer = MaxPoolLayer::new(2, 2, 2, 2, 2).unwrap();
    let input = Matrix::from_vec(
        2,
        8,
        vec![
            1.0, 2.0, 3.0, 4.0, -1.0, -2.0, -3.0, -4.0, //
            9.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 8.0,
        ],
    )
    .unwrap();
    let out = layer.forward(input).unwrap();
    assert_eq!(out.as_slice(), &[4.0, -1.0, 9.0, 8.0]);

    layer.set_delta(Matrix::from_vec(2, 2, vec![0.1, 0.2, 0.3, 0.4]).unwrap()).unwrap();
    let mut prev = Matrix::zeros(2, 8).unwrap();
    layer.backward(&mut prev).unwrap();
    assert_eq!(
        prev.as_slice(),
        &[0.0, 0.0, 0.0, 0.1, 0.2, 0.0, 0.0, 0.0, 0.3, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.4]
    );
}

#[test]
fn non_overlapping_backward_conserves_delta_mass() {
    let mut layer = MaxPoolLayer::new(6, 5, 3, 2, 2).unwrap();
    let input = Matrix::random(4, layer.input_cols()).unwrap();
    layer.forward(input).unwrap();

    let upstream = Matrix::random(4, layer.output_cols()).unwrap();
    let expected = upstream.sum();
    layer.set_delta(upstream).unwrap();

    let mut prev = Matrix::zeros(4, layer.input_cols()).unwrap();
    layer.backward(&mut prev).unwrap();
    assert!((prev.sum() - expected).abs() < 1e-9);
}

#[test]
fn overlapping_windows_sum_their_deltas() {
    // 3x3 image with the peak in the middle; 3x3 windows at stride 2 all
    // reach it, so every output position routes its delta there.
    let mut layer = MaxPoolLayer::new(3, 3, 1, 3, 2).unwrap();
    let mut data = vec![0.0; 9];
    data[4] = 10.0;
    let out = layer.forward(Matrix::from_vec(1, 9, data).unwrap()).unwrap();
    assert_eq!(out.as_slice(), &[10.0; 4]);

    layer.set_delta(Matrix::from_vec(1, 4, vec![1.0, 2.0, 3.0, 4.0]).unwrap()).unwrap();
    let mut prev = Matrix::zeros(1, 9).unwrap();
    layer.backward(&mut prev).unwrap();
    assert_eq!(prev.get(0, 4), 10.0);
    assert_eq!(prev.sum(), 10.0);
}

#[test]
fn forward_replaces_every_cached_buffer() {
    let mut layer = MaxPoolLayer::new(2, 2, 1, 2, 2).unwrap();
    layer.forward(Matrix::from_vec(1, 4, vec![1.0, 5.0, 3.0, 2.0]).unwrap()).unwrap();
    layer.delta_mut().unwrap().as_mut_slice()[0] = 4.0;

    layer.forward(Matrix::from_vec(2, 4, vec![0.0; 8]).unwrap()).unwrap();
    assert_eq!(layer.input().unwrap().rows(), 2);
    assert_eq!(layer.output().unwrap().as_slice(), &[0.0, 0.0]);
    assert_eq!(layer.delta().unwrap().as_slice(), &[0.0, 0.0]);
}

#[test]
fn rejected_forward_keeps_previous_state() {
    let mut layer = MaxPoolLayer::new(2, 2, 1, 2, 2).unwrap();
    layer.forward(Matrix::from_vec(1, 4, vec![1.0, 5.0, 3.0, 2.0]).unwrap()).unwrap();

    assert!(layer.forward(Matrix::zeros(1, 3).unwrap()).is_err());
    assert_eq!(layer.output().unwrap().as_slice(), &[5.0]);
}

#[test]
fn odd_windows_align_identically_in_both_modes() {
    let input = Matrix::random(2, 25).unwrap();
    let upstream = Matrix::random(2, 9).unwrap();

    let run = |alignment| {
        let mut layer = MaxPoolLayer::with_alignment(5, 5, 1, 3, 2, alignment).unwrap();
        layer.forward(input.clone()).unwrap();
        layer.set_delta(upstream.clone()).unwrap();
        let mut prev = Matrix::zeros(2, 25).unwrap();
        layer.backward(&mut prev).unwrap();
        prev
    };

    assert_eq!(run(PoolAlignment::Centered), run(PoolAlignment::Legacy));
}
