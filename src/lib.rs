#[cfg(target_os = "espidf")]
pub mod ble;
pub mod bt;
pub mod config;
pub mod error;
pub mod event_loop;
pub mod gap;
pub mod gatts;
pub mod peripheral;
pub mod stack;

#[cfg(target_os = "espidf")]
pub use esp_idf_svc as svc;
