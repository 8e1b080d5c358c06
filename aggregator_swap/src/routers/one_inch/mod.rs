pub mod one_inch;
pub mod requests;
pub mod responses;

pub use one_inch::OneInchProvider;
