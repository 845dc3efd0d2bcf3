//! # Archivos Estáticos
//! src/files/mod.rs
//!
//! Sirve archivos desde el directorio de sitios estáticos. Es el fallback
//! del servidor cuando ninguna ruta registrada coincide con el request.

pub mod sniffer;

pub use sniffer::{sniff_bytes, ContentSniffer, SnifferError};

use crate::http::ContentType;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::{event, Level};

/// Contenido de un archivo listo para responder
#[derive(Debug, Clone, PartialEq)]
pub struct FileData {
    pub contents: Vec<u8>,
    pub content_type: ContentType,
}

#[derive(Debug, Error)]
pub enum FileError {
    #[error("i/o error on {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("unsupported content type for {path}: {mime}")]
    UnknownContentType { path: String, mime: String },
}

/// Servidor de archivos estáticos
#[derive(Debug, Clone, Default)]
pub struct FileServer {
    sniffer: ContentSniffer,
}

impl FileServer {
    pub fn new(sniffer: ContentSniffer) -> Self {
        Self { sniffer }
    }

    /// Lee un archivo y detecta su content type
    ///
    /// Retorna `None` si no existe, si no se puede leer o si su MIME no
    /// tiene representación en [`ContentType`]. Cada caso queda en el log.
    pub fn serve_file(&self, path: impl AsRef<Path>) -> Option<FileData> {
        let path = path.as_ref();

        if !path.is_file() {
            event!(Level::WARN, path = %path.display(), "file not found");
            return None;
        }

        let content_type = match self.determine_content_type(path) {
            Ok(content_type) => content_type,
            Err(e) => {
                event!(Level::ERROR, path = %path.display(), error = %e, "could not determine content type");
                return None;
            }
        };

        match std::fs::read(path) {
            Ok(contents) => {
                event!(
                    Level::DEBUG,
                    path = %path.display(),
                    content_type = %content_type,
                    bytes = contents.len(),
                    "serving file"
                );
                Some(FileData {
                    contents,
                    content_type,
                })
            }
            Err(e) => {
                event!(Level::ERROR, path = %path.display(), error = %e, "failed to read file");
                None
            }
        }
    }

    /// Content type de un archivo según el sniffer
    pub fn determine_content_type(&self, path: &Path) -> Result<ContentType, FileError> {
        let mime = self
            .sniffer
            .determine_content_type(path)
            .map_err(|source| FileError::Io {
                path: path.display().to_string(),
                source,
            })?;

        mime.parse().map_err(|_| FileError::UnknownContentType {
            path: path.display().to_string(),
            mime,
        })
    }
}

/// Path en disco para el path de un request
///
/// Se quita la `/` inicial y se concatena a `root`. Retorna `None` si el
/// path intenta salir de `root` con `..`.
pub fn resolve_static_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = Path::new(request_path.trim_start_matches('/'));

    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return None;
    }

    Some(root.join(relative))
}
