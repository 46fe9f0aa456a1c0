pub mod config;
pub mod controller;
pub mod devices;
pub mod notices;
pub mod services;
pub mod session;
pub mod state;

pub use config::ClientConfig;
pub use controller::WalletController;
