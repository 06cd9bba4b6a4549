//! TCP Listener
//!
//! Accepts connections and hands each one to its own task. The accept loop
//! never waits on a connection: as soon as a socket is handed off, the next
//! `accept()` is issued. There is no cap on open connections.

use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::storage::StorageEngine;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tracing::{error, info};

/// A bound FrameKV server.
pub struct Server {
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
}

impl Server {
    /// Binds the listener. The storage engine is shared by every connection.
    pub async fn bind(addr: impl ToSocketAddrs, storage: Arc<StorageEngine>) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            storage,
            stats: Arc::new(ConnectionStats::new()),
        })
    }

    /// Returns the address the listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Returns the shared connection statistics.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Accepts connections forever.
    pub async fn run(self) {
        let Server {
            listener,
            storage,
            stats,
        } = self;

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    // Create a command handler for this connection
                    let handler = CommandHandler::new(Arc::clone(&storage));
                    let stats = Arc::clone(&stats);

                    // Spawn a task to handle this connection
                    tokio::spawn(handle_connection(stream, addr, handler, stats));
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Accepts connections until `shutdown` completes.
    ///
    /// Connections already in flight keep running on their own tasks.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) {
        tokio::select! {
            _ = self.run() => {}
            _ = shutdown => {
                info!("Shutdown signal received, no longer accepting connections");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::net::TcpStream;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = Server::bind("127.0.0.1:0", Arc::new(StorageEngine::new()))
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_accepts_many_connections() {
        let server = Server::bind("127.0.0.1:0", Arc::new(StorageEngine::new()))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let stats = server.stats();
        tokio::spawn(server.run());

        // Idle clients do not hold up the accept loop
        let mut clients = Vec::new();
        for _ in 0..8 {
            clients.push(TcpStream::connect(addr).await.unwrap());
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 8);
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 8);

        drop(clients);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stats.active_connections.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_run_until_stops_accepting() {
        let server = Server::bind("127.0.0.1:0", Arc::new(StorageEngine::new()))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        let stats = server.stats();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let task = tokio::spawn(server.run_until(async {
            let _ = shutdown_rx.await;
        }));

        let before = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();

        // The listener is gone once `run_until` returns
        assert!(TcpStream::connect(addr).await.is_err());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(stats.connections_accepted.load(Ordering::Relaxed), 1);
        drop(before);
    }
}
