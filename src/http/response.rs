//! # Construcción de Respuestas HTTP
//!
//! Este módulo proporciona una API para construir respuestas HTTP
//! y convertirlas a bytes para enviar al cliente.
//!
//! ## Formato en el cable
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```
//!
//! La status line siempre dice `HTTP/1.1`, sin importar la versión del
//! request. Los headers que agregue un handler van después de
//! `Content-Length`.

use super::{ContentType, Header, HeaderError, StatusCode};

/// Body fijo para recursos que no existen
pub const NOT_FOUND_BODY: &str = "<html><body><h1>404 Page Not Found</h1></body></html>";

/// Body fijo para requests malformados
pub const BAD_REQUEST_BODY: &str = "<html><body><h1>400 Bad Request</h1></body></html>";

/// Body fijo para fallos internos (p. ej. un handler que hizo panic)
pub const INTERNAL_ERROR_BODY: &str =
    "<html><body><h1>500 Internal Server Error</h1></body></html>";

/// Representa una respuesta HTTP completa
///
/// La crea un handler (o el fallback de archivos estáticos) y el servidor
/// la consume una sola vez al serializarla.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Header,
    body: Vec<u8>,
    content_type: ContentType,
}

impl Response {
    /// Crea una respuesta con status, body y content type
    ///
    /// # Ejemplo
    /// ```
    /// use telar::http::{ContentType, Response, StatusCode};
    ///
    /// let response = Response::new(StatusCode::Ok, "<h1>Hola</h1>", ContentType::TextHtml);
    /// assert_eq!(response.body(), b"<h1>Hola</h1>");
    /// ```
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>, content_type: ContentType) -> Self {
        Self {
            status,
            headers: Header::new(),
            body: body.into(),
            content_type,
        }
    }

    /// Respuesta HTML con status arbitrario
    pub fn html(status: StatusCode, body: &str) -> Self {
        Self::new(status, body, ContentType::TextHtml)
    }

    /// 404 con el body fijo
    pub fn not_found() -> Self {
        Self::html(StatusCode::NotFound, NOT_FOUND_BODY)
    }

    /// 400 con el body fijo
    pub fn bad_request() -> Self {
        Self::html(StatusCode::BadRequest, BAD_REQUEST_BODY)
    }

    /// 500 con el body fijo
    pub fn internal_error() -> Self {
        Self::html(StatusCode::InternalServerError, INTERNAL_ERROR_BODY)
    }

    /// Agrega un header extra (versión builder)
    ///
    /// # Errores
    ///
    /// Falla si el header ya estaba en la respuesta.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, HeaderError> {
        self.headers.add(name, value)?;
        Ok(self)
    }

    /// Reemplaza el mapa de headers completo
    pub fn set_headers(&mut self, headers: Header) {
        self.headers = headers;
    }

    /// Genera la status line y los headers, terminando en la línea vacía
    pub fn head(&self) -> String {
        let mut head = format!(
            "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\n",
            self.status,
            self.content_type.as_str(),
            self.body.len()
        );

        for (name, value) in self.headers.iter() {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }

        head.push_str("\r\n");
        head
    }

    /// Convierte la respuesta a bytes listos para un único envío
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = self.head();
        let mut bytes = Vec::with_capacity(head.len() + self.body.len());
        bytes.extend_from_slice(head.as_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Header {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_response() {
        let response = Response::new(StatusCode::Ok, "Hello", ContentType::TextPlain);

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.content_type(), ContentType::TextPlain);
        assert!(response.headers().is_empty());
        assert_eq!(response.body(), b"Hello");
    }

    #[test]
    fn test_to_bytes() {
        let response = Response::new(StatusCode::Ok, "Test", ContentType::TextPlain);
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 4\r\n\r\nTest"
        );
    }

    #[test]
    fn test_content_length_counts_bytes() {
        // 'ñ' ocupa dos bytes en UTF-8
        let response = Response::html(StatusCode::Ok, "ñ");
        assert!(response.head().contains("Content-Length: 2\r\n"));
    }

    #[test]
    fn test_binary_body() {
        let binary = vec![0x89, 0x50, 0x4E, 0x47, 0x00, 0xFF];
        let response = Response::new(StatusCode::Ok, binary.clone(), ContentType::ImagePng);
        let bytes = response.to_bytes();

        assert!(bytes.ends_with(&binary));
        assert!(response.head().contains("Content-Type: image/png\r\n"));
    }

    #[test]
    fn test_empty_body() {
        let response = Response::new(StatusCode::NoContent, Vec::new(), ContentType::TextPlain);
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert!(text.contains("Content-Length: 0\r\n"));
        assert!(text.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_extra_headers_after_length() {
        let response = Response::html(StatusCode::Ok, "x")
            .with_header("X-Served-By", "telar")
            .unwrap();
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.contains("Content-Length: 1\r\nX-Served-By: telar\r\n\r\nx"));
    }

    #[test]
    fn test_duplicate_extra_header() {
        let response = Response::html(StatusCode::Ok, "x")
            .with_header("X-A", "1")
            .unwrap();
        assert!(response.with_header("X-A", "2").is_err());
    }

    #[test]
    fn test_fixed_error_pages() {
        let not_found = Response::not_found();
        assert_eq!(not_found.status(), StatusCode::NotFound);
        assert_eq!(not_found.body(), NOT_FOUND_BODY.as_bytes());
        assert_eq!(not_found.content_type(), ContentType::TextHtml);

        assert_eq!(Response::bad_request().status(), StatusCode::BadRequest);
        assert_eq!(Response::internal_error().status(), StatusCode::InternalServerError);
    }
}
