//! Core positioning algorithms

pub mod geometry;
pub mod least_squares;
pub mod solver;
pub mod trilateration;

pub use least_squares::LeastSquaresMultilateration;
pub use solver::{Fix, LaterationSolver, SolveReport};
pub use trilateration::Trilateration;
