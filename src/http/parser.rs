//! # Parser de Requests HTTP/1.x
//! src/http/parser.rs
//!
//! Convierte el buffer crudo leído del socket en un [`Request`].
//!
//! ## Algoritmo
//!
//! 1. Separar el buffer en el primer `\r\n\r\n` (headers / body). Si no hay
//!    separador, todo el buffer son headers y el body queda vacío.
//! 2. Tokenizar la primera línea: `METHOD PATH VERSION`.
//! 3. Reescribir `/` a `/index.html`.
//! 4. Parsear los headers: `Host`, `User-Agent` y `sec-ch-ua-platform`
//!    van a campos propios, el resto al mapa de headers.

use super::header::HeaderError;
use super::request::{ClientPlatform, HttpVersion, Method, Request};
use super::Header;
use thiserror::Error;
use tracing::{event, Level};

const HEADER_KEY_HOST: &str = "Host";
const HEADER_KEY_USER_AGENT: &str = "User-Agent";
const HEADER_KEY_CLIENT_PLATFORM: &str = "sec-ch-ua-platform";

const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Buffer vacío o solo espacios
    #[error("empty request")]
    Empty,

    /// La primera línea no tiene method, path y version
    #[error("invalid request line")]
    InvalidRequestLine,

    #[error("invalid method: {0}")]
    InvalidMethod(String),

    #[error("invalid HTTP version: {0}")]
    InvalidVersion(String),

    #[error("invalid client platform: {0}")]
    InvalidClientPlatform(String),

    /// Header repetido en el request
    #[error(transparent)]
    Header(#[from] HeaderError),
}

/// Posición del fin de headers (`\r\n\r\n`) dentro del buffer
pub fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

/// Parsea un request desde bytes
///
/// # Ejemplo
///
/// ```
/// use telar::http::parser::parse_request;
/// use telar::http::Method;
///
/// let request = parse_request(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n").unwrap();
///
/// assert_eq!(request.method(), Method::GET);
/// assert_eq!(request.path(), "/index.html");
/// assert_eq!(request.remote_host(), "localhost");
/// ```
pub fn parse_request(buffer: &[u8]) -> Result<Request, ParseError> {
    let (head, body) = split_head_and_body(buffer);

    // Los headers son texto; bytes no-UTF8 se reemplazan y acaban
    // fallando en la validación del request line o del header
    let head = String::from_utf8_lossy(head);

    if head.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut lines = head.split('\n');
    let request_line = lines.next().unwrap_or_default();

    let mut tokens = request_line.split_whitespace();
    let (method_token, path, version_token) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(method), Some(path), Some(version)) => (method, path, version),
        _ => return Err(ParseError::InvalidRequestLine),
    };

    let method = Method::from_token(method_token)
        .ok_or_else(|| ParseError::InvalidMethod(method_token.to_string()))?;
    let version = HttpVersion::from_token(version_token)
        .ok_or_else(|| ParseError::InvalidVersion(version_token.to_string()))?;

    // Por defecto se sirve index.html cuando piden la raíz
    let path = if path == "/" {
        event!(Level::DEBUG, "path is root, serving /index.html");
        "/index.html"
    } else {
        path
    };

    let mut request = Request::new(method, version, path);
    parse_headers(lines, &mut request)?;
    request.set_body(body.to_vec());

    Ok(request)
}

/// Separa headers y body en el primer `\r\n\r\n`
fn split_head_and_body(buffer: &[u8]) -> (&[u8], &[u8]) {
    match find_header_end(buffer) {
        Some(pos) => (&buffer[..pos], &buffer[pos + HEADER_TERMINATOR.len()..]),
        None => (buffer, &[]),
    }
}

/// Parsea las líneas de header y actualiza el request
///
/// Las líneas sin `:` se ignoran. Los nombres no se normalizan.
fn parse_headers<'a>(
    lines: impl Iterator<Item = &'a str>,
    request: &mut Request,
) -> Result<(), ParseError> {
    let mut headers = Header::new();

    for line in lines {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            break;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim_matches(' ');

        match key {
            HEADER_KEY_HOST => request.set_remote_host(value),
            HEADER_KEY_USER_AGENT => request.set_user_agent(value),
            HEADER_KEY_CLIENT_PLATFORM => {
                let platform = parse_client_platform(value)?;
                request.set_client_platform(platform);
            }
            _ => headers.add(key, value)?,
        }
    }

    request.set_headers(headers);
    Ok(())
}

/// Mapea el header de plataforma, quitando comillas y `\r` final
fn parse_client_platform(value: &str) -> Result<ClientPlatform, ParseError> {
    let cleaned = clean_header_value(value);
    ClientPlatform::from_hint(cleaned)
        .ok_or_else(|| ParseError::InvalidClientPlatform(cleaned.to_string()))
}

fn clean_header_value(value: &str) -> &str {
    let value = value.strip_suffix('\r').unwrap_or(value);
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let request = parse_request(b"GET /about.html HTTP/1.0\r\n\r\n").unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.version(), HttpVersion::Http10);
        assert_eq!(request.path(), "/about.html");
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_every_method_token() {
        let tokens = [
            ("GET", Method::GET),
            ("POST", Method::POST),
            ("PUT", Method::PUT),
            ("PATCH", Method::PATCH),
            ("DELETE", Method::DELETE),
            ("HEAD", Method::HEAD),
            ("OPTIONS", Method::OPTIONS),
        ];

        for (token, expected) in tokens {
            let raw = format!("{} /x HTTP/1.1\r\n\r\n", token);
            let request = parse_request(raw.as_bytes()).unwrap();
            assert_eq!(request.method(), expected);
        }
    }

    #[test]
    fn test_invalid_method() {
        let result = parse_request(b"BREW /pot HTTP/1.1\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::InvalidMethod("BREW".to_string()));

        // Sensible a mayúsculas
        let result = parse_request(b"get / HTTP/1.1\r\n\r\n");
        assert!(matches!(result, Err(ParseError::InvalidMethod(_))));
    }

    #[test]
    fn test_versions() {
        let request = parse_request(b"GET /a HTTP/2.0\r\n\r\n").unwrap();
        assert_eq!(request.version(), HttpVersion::Http20);

        let result = parse_request(b"GET /a HTTP/3\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::InvalidVersion("HTTP/3".to_string()));
    }

    #[test]
    fn test_root_rewritten_to_index() {
        let request = parse_request(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/index.html");
    }

    #[test]
    fn test_special_headers() {
        let raw = b"GET / HTTP/1.1\r\n\
            Host: localhost:8080\r\n\
            User-Agent: curl/8.0\r\n\
            sec-ch-ua-platform: \"Linux\"\r\n\
            Accept: */*\r\n\r\n";
        let request = parse_request(raw).unwrap();

        assert_eq!(request.remote_host(), "localhost:8080");
        assert_eq!(request.user_agent(), "curl/8.0");
        assert_eq!(request.client_platform(), ClientPlatform::Linux);

        // Solo Accept queda en el mapa
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("Accept"), Some("*/*"));
        assert_eq!(request.header("Host"), None);
    }

    #[test]
    fn test_header_value_trimmed() {
        let request = parse_request(b"GET /a HTTP/1.1\r\nX-Test:    spaced   \r\n\r\n").unwrap();
        assert_eq!(request.header("X-Test"), Some("spaced"));
    }

    #[test]
    fn test_invalid_client_platform() {
        let raw = b"GET / HTTP/1.1\r\nsec-ch-ua-platform: \"Plan9\"\r\n\r\n";
        let result = parse_request(raw);
        assert_eq!(
            result.unwrap_err(),
            ParseError::InvalidClientPlatform("Plan9".to_string())
        );
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let raw = b"GET / HTTP/1.1\r\nAccept: a\r\nAccept: b\r\n\r\n";
        let result = parse_request(raw);
        assert_eq!(
            result.unwrap_err(),
            ParseError::Header(HeaderError::DuplicateKey("Accept".to_string()))
        );
    }

    #[test]
    fn test_body_after_blank_line() {
        let raw = b"POST /form HTTP/1.1\r\nContent-Type: text/plain\r\n\r\nhello=world";
        let request = parse_request(raw).unwrap();

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.body(), b"hello=world");
    }

    #[test]
    fn test_no_terminator_means_no_body() {
        let request = parse_request(b"GET /a HTTP/1.1\r\nHost: h\r\n").unwrap();

        assert_eq!(request.remote_host(), "h");
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_lines_without_colon_are_skipped() {
        let request = parse_request(b"GET /a HTTP/1.1\r\ngarbage\r\nX-Ok: 1\r\n\r\n").unwrap();
        assert_eq!(request.headers().all_keys(), vec!["X-Ok".to_string()]);
    }

    #[test]
    fn test_empty_and_short_requests() {
        assert_eq!(parse_request(b"").unwrap_err(), ParseError::Empty);
        assert_eq!(parse_request(b"  \r\n").unwrap_err(), ParseError::Empty);
        assert_eq!(parse_request(b"GET\r\n\r\n").unwrap_err(), ParseError::InvalidRequestLine);
    }

    #[test]
    fn test_find_header_end() {
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n\r\nbody"), Some(14));
        assert_eq!(find_header_end(b"GET / HTTP/1.1\r\n"), None);
    }
}
