pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Everything here is `impl Interpreter`; only the place type is shared
pub(crate) use assign::Place;
