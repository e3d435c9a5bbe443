//! Fix validation: coordinate normalization and accuracy policy

pub mod accuracy;
pub mod coordinates;

pub use accuracy::{AccuracyPolicy, AccuracyBand, is_accurate_enough, describe_accuracy};
pub use coordinates::{CoordinateValidator, round_coordinate};
