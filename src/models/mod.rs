pub mod analytics;
pub mod claim;
pub mod distribution;
pub mod poap;
