//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones y las encola en el pool de workers
//! 3. Lee y parsea requests HTTP en cada worker
//! 4. Responde con una ruta registrada o un archivo estático

pub mod connection;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::ConnectionContext;
pub use tcp::{Server, ServerError, ServerState, ShutdownHandle};
