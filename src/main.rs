// This binary crate is intentionally minimal.
// All layer logic lives in the library (src/lib.rs and its modules).
// Run the demo with:
//   cargo run --example maxpool
fn main() {
    println!("strided-nn: activation transforms and max pooling over row-major matrices.");
    println!("Run `cargo run --example maxpool` to see a forward/backward pass.");
}
