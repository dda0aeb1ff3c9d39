//! Training: the two-term variational loss and the epoch/fit drivers.

pub mod loss;
pub mod run;
