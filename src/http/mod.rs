//! # Módulo HTTP
//!
//! Este módulo implementa el protocolo HTTP/1.x desde cero. Incluye:
//!
//! - Mapa de headers con claves únicas
//! - Parsing de requests
//! - Construcción y serialización de responses
//! - Status codes y content types
//!
//! ## Soporte del protocolo
//!
//! Es deliberadamente limitado:
//! - Sin chunked transfer encoding
//! - Sin keep-alive ni pipelining: una respuesta por conexión
//! - `HTTP/2.0` se acepta como etiqueta en el request line, nada más
//!
//! ### Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! sec-ch-ua-platform: "Linux"\r\n
//! \r\n
//! ```

pub mod content_type;
pub mod header;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;

// Re-exportamos los tipos principales para facilitar su uso
pub use content_type::{ContentType, ContentTypeError};
pub use header::{Header, HeaderError};
pub use parser::{parse_request, ParseError};
pub use request::{ClientPlatform, HttpVersion, Method, Request};
pub use response::Response;
pub use status::StatusCode;
