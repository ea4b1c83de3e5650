//! Infrastructure layer - concrete transports and configuration

pub mod config;
pub mod transport;

pub use config::AdapterConfig;
pub use transport::{SimulatorConfig, SimulatorTransport, TcpTransport, TcpTransportConfig};
pub use transport::{TransportFactory, TransportType};
