use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use domain::AdapterError;
use domain::driver::{ConnectionState, DeviceTransport};

/// TCP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcpTransportConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_max_connect_attempts")]
    pub max_connect_attempts: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
    #[serde(default = "default_connect_settle_ms")]
    pub connect_settle_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_max_connect_attempts() -> u32 {
    30
}
fn default_retry_backoff_ms() -> u64 {
    500
}
fn default_connect_settle_ms() -> u64 {
    1000
}
fn default_read_timeout_ms() -> u64 {
    1000
}

impl TcpTransportConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            max_connect_attempts: default_max_connect_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            connect_settle_ms: default_connect_settle_ms(),
            read_timeout_ms: default_read_timeout_ms(),
        }
    }
}

/// Persistent TCP connection to the lift.
///
/// Exclusive ownership of the socket stays here; callers share the
/// transport behind one mutex and never close or reopen the stream
/// themselves.
pub struct TcpTransport {
    config: TcpTransportConfig,
    stream: Option<TcpStream>,
    state: ConnectionState,
    cancel: CancellationToken,
}

impl TcpTransport {
    pub fn new(config: TcpTransportConfig) -> Self {
        Self {
            config,
            stream: None,
            state: ConnectionState::Disconnected,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that aborts a connect-retry loop in progress
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn mark_broken(&mut self, reason: String) -> AdapterError {
        self.stream = None;
        self.state = ConnectionState::Failed;
        tracing::warn!(host = %self.config.host, port = self.config.port, %reason, "Connection broken");
        AdapterError::ConnectionLost(reason)
    }
}

#[async_trait]
impl DeviceTransport for TcpTransport {
    async fn connect(&mut self) -> Result<(), AdapterError> {
        self.stream = None;
        self.state = ConnectionState::Connecting;

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let mut attempt: u32 = 1;

        loop {
            match TcpStream::connect(&addr).await {
                Ok(stream) => {
                    // Give the lift controller time to register the session
                    // before the first frame goes out
                    sleep(Duration::from_millis(self.config.connect_settle_ms)).await;
                    let _ = stream.set_nodelay(true);
                    self.stream = Some(stream);
                    self.state = ConnectionState::Connected;
                    tracing::info!(%addr, attempt, "Connected to device");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(%addr, attempt, error = %e, "Connection attempt failed");
                    if attempt >= self.config.max_connect_attempts {
                        self.state = ConnectionState::Failed;
                        return Err(AdapterError::ConnectionExhausted {
                            attempts: attempt,
                            reason: e.to_string(),
                        });
                    }
                    attempt += 1;

                    tokio::select! {
                        _ = self.cancel.cancelled() => {
                            tracing::info!(%addr, "Connect retry cancelled");
                            self.state = ConnectionState::Disconnected;
                            return Err(AdapterError::Cancelled);
                        }
                        _ = sleep(Duration::from_millis(self.config.retry_backoff_ms)) => {}
                    }
                }
            }
        }
    }

    async fn disconnect(&mut self) -> Result<(), AdapterError> {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                tracing::warn!(error = %e, "Error shutting down socket");
            }
        }
        self.state = ConnectionState::Disconnected;
        tracing::info!(host = %self.config.host, port = self.config.port, "Disconnected from device");
        Ok(())
    }

    async fn read(&mut self) -> Result<Option<Vec<u8>>, AdapterError> {
        let read_window = Duration::from_millis(self.config.read_timeout_ms);
        let stream = self.stream.as_mut().ok_or(AdapterError::NotConnected)?;

        let mut buffer = vec![0u8; 1024];
        match timeout(read_window, stream.read(&mut buffer)).await {
            // Window elapsed with no data; the connection is still valid
            Err(_) => Ok(None),
            Ok(Ok(0)) => Err(self.mark_broken("Peer closed the connection".to_string())),
            Ok(Ok(n)) => Ok(Some(buffer[..n].to_vec())),
            Ok(Err(e)) => Err(self.mark_broken(format!("Read error: {}", e))),
        }
    }

    async fn write(&mut self, frame: &[u8]) -> Result<(), AdapterError> {
        let stream = self.stream.as_mut().ok_or(AdapterError::NotConnected)?;

        if let Err(e) = stream.write_all(frame).await {
            return Err(self.mark_broken(format!("Write error: {}", e)));
        }
        if let Err(e) = stream.flush().await {
            return Err(self.mark_broken(format!("Flush error: {}", e)));
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn connection_state(&self) -> ConnectionState {
        self.state
    }

    fn transport_type(&self) -> &str {
        "TCP"
    }
}
