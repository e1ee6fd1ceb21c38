mod core;
mod gateway;
mod generation;
mod persistence;

pub use core::Config;
pub use gateway::GatewayConfig;
pub use generation::GenerationConfig;
pub use persistence::PersistenceConfig;
