pub mod ci;
pub mod continuation;
pub mod data;
pub mod plan;
