//! FIFO payment allocation, shared by the crop and loan payment paths.

mod allocation;

pub use allocation::{allocate, Allocation, PaymentError};
