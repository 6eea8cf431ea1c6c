pub mod mqtt;
pub mod pipeline;
