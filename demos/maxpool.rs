use strided_nn::{activate_matrix, gradient_matrix, Activation, Layer, LayerSpec, Matrix, NnResult};

fn main() -> NnResult<()> {
    // Two 4x4 single-channel samples, pooled 2x2 with stride 2.
    let spec = LayerSpec::from_json_str(
        r#"{"type":"max_pool","width":4,"height":4,"channels":1,"size":2,"stride":2}"#,
    )
    .map_err(|e| strided_nn::NnError::InvalidConfig(e.to_string()))?;
    let mut pool = spec.build()?;

    let mut input = Matrix::random(2, 16)?;
    activate_matrix(&mut input, Activation::Relu);
    let activated = input.clone();

    let output = pool.forward(input)?.clone();
    println!("pooled output ({}x{}):", output.rows(), output.cols());
    for i in 0..output.rows() {
        println!("  {:?}", output.row(i));
    }

    // Pretend the loss sent back a gradient of 1 for every pooled value.
    if let Some(delta) = pool.delta_mut() {
        delta.as_mut_slice().iter_mut().for_each(|d| *d = 1.0);
    }
    let mut prev_delta = Matrix::zeros(2, 16)?;
    pool.backward(&mut prev_delta)?;
    gradient_matrix(&activated, Activation::Relu, &mut prev_delta)?;
    pool.update(0.01, 0.9, 0.0005);

    println!("gradient reaching the ReLU input:");
    for i in 0..prev_delta.rows() {
        println!("  {:?}", prev_delta.row(i));
    }

    let mut logits = Matrix::from_vec(1, 4, vec![2.0, 1.0, 0.1, -1.0])?;
    activate_matrix(&mut logits, Activation::Softmax);
    println!("softmax: {:?}", logits.row(0));

    Ok(())
}
