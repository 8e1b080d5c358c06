pub mod approval;
pub mod executor;
pub mod gas;
pub mod permit;
pub mod receipt;
