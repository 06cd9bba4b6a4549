//! Request Dispatch
//!
//! Maps a decoded [`Request`] onto the storage engine and builds the
//! [`Response`] the connection sends back.
//!
//! | Request              | Outcome              | Response                              |
//! |----------------------|----------------------|---------------------------------------|
//! | `Get { key }`        | found                | `Message(value)`                      |
//! | `Get { key }`        | missing              | `Error("Key not found in DB.")`       |
//! | `Set { key, value }` | stored               | `Ok("Operation completed.")`          |
//! | `Set { key, value }` | storage fault        | `Error("Operation failed: <reason>")` |

use crate::protocol::response::KEY_NOT_FOUND;
use crate::protocol::{Request, Response};
use crate::storage::{StorageEngine, StoreError};
use bytes::Bytes;
use std::sync::Arc;
use tracing::{trace, warn};

/// Executes requests against the shared storage engine.
#[derive(Debug, Clone)]
pub struct CommandHandler {
    /// The storage engine
    storage: Arc<StorageEngine>,
}

impl CommandHandler {
    /// Creates a new command handler with the given storage engine.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self { storage }
    }

    /// Executes a request and returns the response.
    pub fn execute(&self, request: Request) -> Response {
        match request {
            Request::Get { key } => self.cmd_get(key),
            Request::Set { key, value } => self.cmd_set(key, value),
        }
    }

    fn cmd_get(&self, key: Bytes) -> Response {
        match self.storage.get(&key) {
            Some(value) => {
                trace!(key = ?key, len = value.len(), "GET hit");
                Response::message(value)
            }
            None => {
                trace!(key = ?key, "GET miss");
                Response::error(KEY_NOT_FOUND)
            }
        }
    }

    fn cmd_set(&self, key: Bytes, value: Bytes) -> Response {
        match self.storage.set(key.clone(), value) {
            Ok(created) => {
                trace!(key = ?key, created, "SET");
                Response::ok()
            }
            Err(e) => {
                warn!(key = ?key, error = %e, "SET failed");
                set_failed(&e)
            }
        }
    }
}

fn set_failed(err: &StoreError) -> Response {
    Response::error(format!("Operation failed: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> (CommandHandler, Arc<StorageEngine>) {
        let storage = Arc::new(StorageEngine::new());
        (CommandHandler::new(Arc::clone(&storage)), storage)
    }

    #[test]
    fn test_get_missing_key() {
        let (handler, _) = handler();
        let response = handler.execute(Request::Get {
            key: Bytes::from("hello"),
        });
        assert_eq!(response, Response::error("Key not found in DB."));
    }

    #[test]
    fn test_set_then_get() {
        let (handler, storage) = handler();

        let response = handler.execute(Request::Set {
            key: Bytes::from("a"),
            value: Bytes::from("b"),
        });
        assert_eq!(response, Response::Ok("Operation completed.".to_string()));
        assert_eq!(storage.get(&Bytes::from("a")), Some(Bytes::from("b")));

        let response = handler.execute(Request::Get {
            key: Bytes::from("a"),
        });
        assert_eq!(response, Response::message(Bytes::from("b")));
    }

    #[test]
    fn test_last_write_wins() {
        let (handler, _) = handler();

        for value in ["v1", "v2", "v3"] {
            handler.execute(Request::Set {
                key: Bytes::from("k"),
                value: Bytes::from(value),
            });
        }

        let response = handler.execute(Request::Get {
            key: Bytes::from("k"),
        });
        assert_eq!(response, Response::message(Bytes::from("v3")));
    }

    #[test]
    fn test_set_failure_reply() {
        let err = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let response = set_failed(&StoreError::from(err));

        assert!(response.is_error());
        let wire = response.serialize();
        assert!(wire.starts_with(b"[NOK] : Operation failed: out of memory: "));
    }
}
