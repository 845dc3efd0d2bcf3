//! # Manejo de Conexiones
//! src/server/connection.rs
//!
//! Lo que hace un worker con cada conexión aceptada:
//!
//! ```text
//! read (hasta \r\n\r\n, EOF o max_request_size)
//!   → parse → router ─(sin ruta)→ archivo estático ─(no existe)→ 404
//!   → write (un solo envío) → close
//! ```
//!
//! El body se lee solo si llegó junto con los headers; no se mira
//! `Content-Length`.

use crate::files::{resolve_static_path, FileServer};
use crate::http::parser::find_header_end;
use crate::http::{parse_request, Request, Response, StatusCode};
use crate::router::Router;
use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{event, Level};

const READ_CHUNK: usize = 4096;

/// Estado compartido (solo lectura) por todas las conexiones
#[derive(Clone)]
pub struct ConnectionContext {
    pub router: Arc<Router>,
    pub files: Arc<FileServer>,
    pub static_root: PathBuf,
    pub max_request_size: usize,
}

/// Atiende una conexión completa y la cierra
///
/// Si el peer no manda nada, se cierra sin responder.
pub fn handle_connection(mut stream: TcpStream, ctx: &ConnectionContext) -> io::Result<()> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let buffer = read_request(&mut stream, ctx.max_request_size)?;
    if buffer.is_empty() {
        event!(Level::DEBUG, peer = %peer, "connection closed without data");
        return Ok(());
    }

    let response = respond(&buffer, ctx);

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    event!(
        Level::INFO,
        peer = %peer,
        status = response.status().as_u16(),
        bytes = response.body().len(),
        "response sent"
    );

    Ok(())
}

/// Lee hasta ver el fin de los headers, EOF o `max` bytes
///
/// Nunca lee más de `max` bytes.
pub fn read_request<R: Read>(reader: &mut R, max: usize) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(READ_CHUNK.min(max));
    let mut chunk = [0u8; READ_CHUNK];

    while buffer.len() < max {
        let want = chunk.len().min(max - buffer.len());

        let n = match reader.read(&mut chunk[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        buffer.extend_from_slice(&chunk[..n]);

        if find_header_end(&buffer).is_some() {
            break;
        }
    }

    Ok(buffer)
}

/// Genera la respuesta para los bytes de un request
pub fn respond(buffer: &[u8], ctx: &ConnectionContext) -> Response {
    match parse_request(buffer) {
        Ok(request) => {
            log_request(&request);
            dispatch(&request, ctx)
        }
        Err(e) => {
            event!(Level::WARN, error = %e, "malformed request");
            Response::bad_request()
        }
    }
}

/// Ruta registrada o, si no hay, archivo estático
fn dispatch(request: &Request, ctx: &ConnectionContext) -> Response {
    let path = request.path();
    let method = request.method();

    let routed = panic::catch_unwind(AssertUnwindSafe(|| {
        ctx.router.handle_request(path, method, request)
    }));

    match routed {
        Ok(Some(response)) => response,
        Ok(None) => serve_static(path, ctx),
        Err(_) => {
            event!(Level::ERROR, path, method = %method, "route handler panicked");
            Response::internal_error()
        }
    }
}

fn serve_static(path: &str, ctx: &ConnectionContext) -> Response {
    let Some(file_path) = resolve_static_path(&ctx.static_root, path) else {
        event!(Level::WARN, path, "path escapes static root");
        return Response::not_found();
    };

    match ctx.files.serve_file(&file_path) {
        Some(file) => Response::new(StatusCode::Ok, file.contents, file.content_type),
        None => Response::not_found(),
    }
}

fn log_request(request: &Request) {
    event!(
        Level::DEBUG,
        method = %request.method(),
        path = request.path(),
        version = request.version().as_str(),
        host = request.remote_host(),
        platform = request.client_platform().as_str(),
        user_agent = request.user_agent(),
        "request received"
    );

    for (name, value) in request.headers().iter() {
        event!(Level::TRACE, header = name, value, "request header");
    }
}
