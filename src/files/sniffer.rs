//! # Detección de Content Type
//! src/files/sniffer.rs
//!
//! Determina el MIME de un archivo en tres pasos:
//!
//! 1. Tabla de extensiones conocidas (más la base opcional del usuario)
//! 2. Magic numbers en los primeros bytes del archivo
//! 3. Fallback: `text/plain` si es UTF-8 válido, si no
//!    `application/octet-stream`
//!
//! El sniffer es inmutable después de construirse, así que se comparte
//! entre workers con un `Arc` sin lock.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;

/// Bytes que se leen para reconocer el formato
const SNIFF_LEN: u64 = 512;

/// Extensiones que no necesitan inspección
const KNOWN_EXTENSIONS: &[(&str, &str)] = &[
    ("ico", "image/x-icon"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("svg", "image/svg+xml"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/plain"),
    ("css", "text/css"),
    ("js", "text/javascript"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
];

/// Errores al cargar la base de content types
#[derive(Debug, Error)]
pub enum SnifferError {
    #[error("failed to read content database {path}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid content database {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Formato del archivo de base de datos
///
/// ```json
/// { "extensions": { "md": "text/plain", "wasm": "application/octet-stream" } }
/// ```
#[derive(Debug, Default, Deserialize)]
struct ContentDatabase {
    #[serde(default)]
    extensions: HashMap<String, String>,
}

/// Detector de MIME por extensión y contenido
#[derive(Debug, Clone)]
pub struct ContentSniffer {
    extensions: HashMap<String, String>,
}

impl Default for ContentSniffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentSniffer {
    /// Sniffer con la tabla de extensiones incorporada
    pub fn new() -> Self {
        let extensions = KNOWN_EXTENSIONS
            .iter()
            .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
            .collect();

        Self { extensions }
    }

    /// Sniffer que además carga extensiones desde un JSON
    ///
    /// Las entradas de la base reemplazan a las incorporadas.
    pub fn with_database(path: &Path) -> Result<Self, SnifferError> {
        let content = std::fs::read_to_string(path).map_err(|source| SnifferError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let database: ContentDatabase =
            serde_json::from_str(&content).map_err(|source| SnifferError::Parse {
                path: path.display().to_string(),
                source,
            })?;

        let mut sniffer = Self::new();
        for (ext, mime) in database.extensions {
            sniffer.extensions.insert(ext.to_ascii_lowercase(), mime);
        }

        Ok(sniffer)
    }

    /// MIME de un archivo en disco
    ///
    /// Solo lee el archivo si la extensión no es conocida.
    pub fn determine_content_type(&self, path: &Path) -> io::Result<String> {
        if let Some(mime) = self.mime_for_extension(path) {
            return Ok(mime.to_string());
        }

        let mut head = Vec::with_capacity(SNIFF_LEN as usize);
        File::open(path)?.take(SNIFF_LEN).read_to_end(&mut head)?;

        Ok(sniff_bytes(&head).to_string())
    }

    /// MIME registrado para la extensión del path
    pub fn mime_for_extension(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.extensions.get(&ext).map(String::as_str)
    }
}

/// Reconoce el formato por sus primeros bytes
pub fn sniff_bytes(head: &[u8]) -> &'static str {
    let starts = |magic: &[u8]| head.starts_with(magic);
    let at = |offset: usize, magic: &[u8]| {
        head.get(offset..offset + magic.len()) == Some(magic)
    };

    if starts(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if starts(b"\xFF\xD8\xFF") {
        "image/jpeg"
    } else if starts(b"GIF87a") || starts(b"GIF89a") {
        "image/gif"
    } else if starts(b"RIFF") && at(8, b"WEBP") {
        "image/webp"
    } else if starts(b"RIFF") && at(8, b"WAVE") {
        "audio/wav"
    } else if starts(b"BM") {
        "image/bmp"
    } else if starts(b"\x00\x00\x01\x00") {
        "image/x-icon"
    } else if starts(b"%PDF-") {
        "application/pdf"
    } else if starts(b"PK\x03\x04") {
        "application/zip"
    } else if starts(b"\x1F\x8B") {
        "application/gzip"
    } else if starts(b"OggS") {
        "audio/ogg"
    } else if at(4, b"ftyp") {
        "video/mp4"
    } else if starts(b"wOFF") {
        "font/woff"
    } else if starts(b"wOF2") {
        "font/woff2"
    } else if looks_like_html(head) {
        "text/html"
    } else if is_text(head) {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

fn looks_like_html(head: &[u8]) -> bool {
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start().to_ascii_lowercase();
    text.starts_with("<!doctype html") || text.starts_with("<html")
}

/// UTF-8 válido y sin bytes NUL. El corte a 512 bytes puede partir un
/// carácter multibyte al final, eso no descarta el texto.
fn is_text(head: &[u8]) -> bool {
    if head.contains(&0) {
        return false;
    }

    match std::str::from_utf8(head) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}
