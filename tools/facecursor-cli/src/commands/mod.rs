pub mod config;
pub mod fit;
pub mod replay;
pub mod threshold;
