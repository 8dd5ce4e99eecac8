pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod models;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
