// Record processing: pure transforms applied between fetch and write

pub mod processing;

pub use processing::normalize;
