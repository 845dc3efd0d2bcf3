//! # Requests HTTP
//! src/http/request.rs
//!
//! Tipos que describen un request ya parseado: método, versión del
//! protocolo, plataforma del cliente y el propio `Request`.
//!
//! El parsing desde bytes vive en [`crate::http::parser`].

use super::Header;
use std::fmt;

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
    HEAD,
    OPTIONS,
}

impl Method {
    /// Parsea el token del request line. `None` si no es un método conocido.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            _ => None,
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Versión del protocolo declarada en el request line
///
/// `HTTP/2.0` se acepta solo como etiqueta: no hay framing binario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    Http10,
    Http11,
    Http20,
}

impl HttpVersion {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "HTTP/1.0" => Some(HttpVersion::Http10),
            "HTTP/1.1" => Some(HttpVersion::Http11),
            "HTTP/2.0" => Some(HttpVersion::Http20),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Http10 => "HTTP/1.0",
            HttpVersion::Http11 => "HTTP/1.1",
            HttpVersion::Http20 => "HTTP/2.0",
        }
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plataforma del cliente según el header `sec-ch-ua-platform`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClientPlatform {
    Windows,
    MacOs,
    Linux,
    Android,
    Ios,
    ChromeOs,
    /// Valor por defecto cuando el cliente no envía la pista
    #[default]
    Unknown,
}

impl ClientPlatform {
    /// Mapea el valor ya limpio del header (sin comillas)
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint {
            "Windows" => Some(ClientPlatform::Windows),
            "macOS" => Some(ClientPlatform::MacOs),
            "Linux" => Some(ClientPlatform::Linux),
            "Android" => Some(ClientPlatform::Android),
            "iOS" => Some(ClientPlatform::Ios),
            "ChromeOS" => Some(ClientPlatform::ChromeOs),
            "Unknown" => Some(ClientPlatform::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientPlatform::Windows => "Windows",
            ClientPlatform::MacOs => "macOS",
            ClientPlatform::Linux => "Linux",
            ClientPlatform::Android => "Android",
            ClientPlatform::Ios => "iOS",
            ClientPlatform::ChromeOs => "ChromeOS",
            ClientPlatform::Unknown => "Unknown",
        }
    }
}

/// Representa un request HTTP parseado
///
/// Se crea una vez por conexión. Solo host, user-agent y plataforma se
/// completan después de construirlo, durante el parsing de headers.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    version: HttpVersion,

    /// Path efectivo (`/` ya reescrito a `/index.html`)
    path: String,

    /// Valor del header `Host`
    remote_host: String,

    user_agent: String,
    client_platform: ClientPlatform,

    /// Headers que no tienen campo propio
    headers: Header,

    /// Bytes después de la línea vacía (lo que haya llegado en el buffer)
    body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, version: HttpVersion, path: &str) -> Self {
        Self {
            method,
            version,
            path: path.to_string(),
            remote_host: String::new(),
            user_agent: String::new(),
            client_platform: ClientPlatform::Unknown,
            headers: Header::new(),
            body: Vec::new(),
        }
    }

    // === Setters usados por el parser ===

    pub fn set_remote_host(&mut self, host: &str) {
        self.remote_host = host.to_string();
    }

    pub fn set_user_agent(&mut self, agent: &str) {
        self.user_agent = agent.to_string();
    }

    pub fn set_client_platform(&mut self, platform: ClientPlatform) {
        self.client_platform = platform;
    }

    pub(crate) fn set_headers(&mut self, headers: Header) {
        self.headers = headers;
    }

    pub(crate) fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn remote_host(&self) -> &str {
        &self.remote_host
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn client_platform(&self) -> ClientPlatform {
        self.client_platform
    }

    pub fn headers(&self) -> &Header {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_tokens() {
        for method in [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::HEAD,
            Method::OPTIONS,
        ] {
            assert_eq!(Method::from_token(method.as_str()), Some(method));
        }
        assert_eq!(Method::from_token("get"), None);
        assert_eq!(Method::from_token("CONNECT"), None);
    }

    #[test]
    fn test_version_tokens() {
        assert_eq!(HttpVersion::from_token("HTTP/1.0"), Some(HttpVersion::Http10));
        assert_eq!(HttpVersion::from_token("HTTP/2.0"), Some(HttpVersion::Http20));
        assert_eq!(HttpVersion::from_token("HTTP/3"), None);
    }

    #[test]
    fn test_platform_hints() {
        assert_eq!(ClientPlatform::from_hint("macOS"), Some(ClientPlatform::MacOs));
        assert_eq!(ClientPlatform::from_hint("Unknown"), Some(ClientPlatform::Unknown));
        assert_eq!(ClientPlatform::from_hint("BeOS"), None);
    }

    #[test]
    fn test_new_request_defaults() {
        let request = Request::new(Method::GET, HttpVersion::Http10, "/bob");

        assert_eq!(request.path(), "/bob");
        assert_eq!(request.remote_host(), "");
        assert_eq!(request.client_platform(), ClientPlatform::Unknown);
        assert!(request.headers().is_empty());
    }
}
