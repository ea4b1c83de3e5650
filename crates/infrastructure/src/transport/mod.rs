mod simulator;
mod tcp;

pub use simulator::{SimulatorConfig, SimulatorTransport};
pub use tcp::{TcpTransport, TcpTransportConfig};

use serde::{Deserialize, Serialize};

use domain::AdapterError;
use domain::driver::DeviceTransport;

/// Transport selector used by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TransportType {
    #[default]
    Tcp,
    Simulator,
}

/// Factory for creating device transports
pub struct TransportFactory;

impl TransportFactory {
    /// Create a transport from type tag and transport-specific configuration
    pub fn create(
        transport_type: TransportType,
        config: serde_json::Value,
    ) -> Result<Box<dyn DeviceTransport>, AdapterError> {
        match transport_type {
            TransportType::Tcp => {
                let tcp_config: TcpTransportConfig = serde_json::from_value(config)
                    .map_err(|e| {
                        AdapterError::InvalidConfig(format!("Invalid TCP config: {}", e))
                    })?;
                Ok(Box::new(TcpTransport::new(tcp_config)) as Box<dyn DeviceTransport>)
            }
            TransportType::Simulator => {
                let sim_config: SimulatorConfig = serde_json::from_value(config)
                    .map_err(|e| {
                        AdapterError::InvalidConfig(format!("Invalid Simulator config: {}", e))
                    })?;
                Ok(Box::new(SimulatorTransport::new(sim_config)) as Box<dyn DeviceTransport>)
            }
        }
    }
}
