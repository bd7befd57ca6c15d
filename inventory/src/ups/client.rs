// File: inventory/src/ups/client.rs
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::parse;
use crate::config::UpsTarget;
use crate::constants::nut;
use crate::errors::SourceError;
use crate::sources::{UpsSnapshot, UpsSource, UpsVariables};

/// NUT client. Every command opens and closes its own connection.
pub struct NutClient {
    socket_timeout: Duration,
}

impl NutClient {
    pub fn new() -> Self {
        Self {
            socket_timeout: nut::SOCKET_TIMEOUT,
        }
    }

    pub fn with_timeout(socket_timeout: Duration) -> Self {
        Self { socket_timeout }
    }

    fn target_name(host: &str, port: u16) -> String {
        format!("{}:{}", host, port)
    }

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, SourceError> {
        let target = Self::target_name(host, port);
        match timeout(self.socket_timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) => Err(SourceError::ConnectionFailed {
                target,
                reason: e.to_string(),
            }),
            Err(_) => Err(SourceError::Timeout {
                target,
                operation: "connecting".to_string(),
            }),
        }
    }

    /// Send one command and read until the response is complete or the
    /// daemon closes the connection
    async fn command(&self, host: &str, port: u16, command: &str) -> Result<String, SourceError> {
        let target = Self::target_name(host, port);
        let mut stream = self.connect(host, port).await?;
        debug!("NUT {} <- {}", target, command);

        stream
            .write_all(format!("{}\n", command).as_bytes())
            .await
            .map_err(|e| SourceError::ConnectionFailed {
                target: target.clone(),
                reason: e.to_string(),
            })?;

        let mut response = Vec::new();
        let mut chunk = vec![0u8; nut::READ_CHUNK_SIZE];
        loop {
            let read = match timeout(self.socket_timeout, stream.read(&mut chunk)).await {
                Ok(Ok(read)) => read,
                Ok(Err(e)) => {
                    return Err(SourceError::ConnectionFailed {
                        target,
                        reason: e.to_string(),
                    })
                }
                Err(_) => {
                    return Err(SourceError::Timeout {
                        target,
                        operation: command.to_string(),
                    })
                }
            };
            if read == 0 {
                break;
            }
            response.extend_from_slice(&chunk[..read]);
            if parse::is_complete(&String::from_utf8_lossy(&response)) {
                break;
            }
        }

        // Best effort; the daemon tolerates abrupt disconnects
        let _ = stream.write_all(b"LOGOUT\n").await;
        let _ = stream.shutdown().await;

        let response = String::from_utf8_lossy(&response).into_owned();
        if let Some(detail) = parse::error_reply(&response) {
            return Err(SourceError::InvalidResponse {
                target,
                reason: format!("{} rejected: {}", command, detail),
            });
        }
        Ok(response)
    }

    pub async fn list_devices(&self, host: &str, port: u16) -> Result<Vec<(String, String)>, SourceError> {
        let response = self.command(host, port, "LIST UPS").await?;
        Ok(parse::parse_devices(&parse::split_lines(&response)))
    }

    /// Parsed variables, or None when the device reported none
    pub async fn list_variables(
        &self,
        host: &str,
        port: u16,
        ups_name: &str,
    ) -> Result<Option<UpsVariables>, SourceError> {
        let response = self
            .command(host, port, &format!("LIST VAR {}", ups_name))
            .await?;
        let variables = parse::parse_variables(&parse::split_lines(&response));
        if variables.is_empty() {
            return Ok(None);
        }
        Ok(Some(parse::variables_from_map(&variables)))
    }

    pub async fn list_clients(&self, host: &str, port: u16, ups_name: &str) -> Result<Vec<String>, SourceError> {
        let response = self
            .command(host, port, &format!("LIST CLIENT {}", ups_name))
            .await?;
        Ok(parse::parse_clients(&parse::split_lines(&response)))
    }
}

impl Default for NutClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpsSource for NutClient {
    async fn fetch_all(&self, target: &UpsTarget) -> Result<Vec<UpsSnapshot>, SourceError> {
        let devices = match &target.ups_name {
            Some(name) => vec![(name.clone(), String::new())],
            None => self.list_devices(&target.host, target.port).await?,
        };

        let mut snapshots = Vec::with_capacity(devices.len());
        for (ups_name, description) in devices {
            let variables = match self.list_variables(&target.host, target.port, &ups_name).await {
                Ok(variables) => variables,
                Err(e) if e.is_unreachable() => return Err(e),
                Err(e) => {
                    warn!("No variables for UPS {} on {}: {}", ups_name, target.host, e);
                    None
                }
            };

            let clients = match self.list_clients(&target.host, target.port, &ups_name).await {
                Ok(clients) => clients,
                Err(e) if e.is_unreachable() => return Err(e),
                Err(e) => {
                    warn!("No clients for UPS {} on {}: {}", ups_name, target.host, e);
                    Vec::new()
                }
            };

            snapshots.push(UpsSnapshot {
                ups_name,
                description,
                variables,
                clients,
            });
        }

        info!("Read {} UPS devices from {}", snapshots.len(), target.host);
        Ok(snapshots)
    }
}
