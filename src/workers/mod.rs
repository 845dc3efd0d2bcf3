//! # Workers
//!
//! Pool de threads de tamaño fijo que ejecuta el manejo de cada conexión.
//! Acota la concurrencia: nunca hay más de N conexiones procesándose a la vez.

pub mod pool;

pub use pool::{PoolError, Task, TaskHandle, WorkerPool, DEFAULT_POOL_SIZE};
