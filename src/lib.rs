//! # telar
//! src/lib.rs
//!
//! Servidor HTTP/1.x concurrente implementado desde cero sobre sockets
//! bloqueantes: un thread acepta conexiones y un pool fijo de workers las
//! atiende.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Headers, parsing de requests y serialización de responses
//! - `router`: Rutas exactas (path + métodos) hacia handlers
//! - `workers`: Pool de threads con cola FIFO
//! - `server`: Accept loop, manejo de conexiones y ciclo de vida
//! - `files`: Archivos estáticos y detección de content type
//! - `templates`: Templates con placeholders `{{ clave }}`
//! - `context`: Une configuración, archivos, templates y router
//! - `config` y `logging`: Configuración CLI/entorno y subscriber de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use telar::config::Config;
//! use telar::context::Context;
//!
//! let context = Context::new("mi-sitio", Config::default()).unwrap();
//! let mut server = context.create_server();
//! server.run().unwrap();
//! ```

pub mod config;
pub mod context;
pub mod files;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
pub mod templates;
pub mod workers;
