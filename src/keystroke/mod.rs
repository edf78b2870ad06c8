/// Text to press/release event compilation.
pub mod compiler;
