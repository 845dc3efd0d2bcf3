//! # Templates
//! src/templates.rs
//!
//! Renderiza archivos del directorio de templates reemplazando
//! placeholders `{{ clave }}` con valores de un objeto JSON.
//!
//! ```text
//! <h1>Hola {{ name }}</h1>   +   {"name": "Ada"}   →   <h1>Hola Ada</h1>
//! ```
//!
//! Las claves con punto (`{{ user.name }}`) recorren objetos anidados.

use crate::files::FileServer;
use crate::http::{Response, StatusCode};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{event, Level};

/// Argumentos planos para un template
pub type TemplateArguments = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unable to find template '{0}'")]
    NotFound(String),

    #[error("render error: {0}")]
    RenderFailed(String),
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\s*([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\s*\}\}")
            .unwrap_or_else(|e| unreachable!("invalid placeholder regex: {}", e))
    })
}

/// Renderizador de templates
#[derive(Debug, Clone)]
pub struct Templater {
    templates_dir: PathBuf,
    files: Arc<FileServer>,
}

impl Templater {
    pub fn new(templates_dir: impl Into<PathBuf>, files: Arc<FileServer>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
            files,
        }
    }

    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Renderiza `templates_dir + filename` con argumentos planos
    ///
    /// La respuesta es 200 con el content type del archivo.
    pub fn render(&self, filename: &str, args: &TemplateArguments) -> Result<Response, TemplateError> {
        let data: Map<String, Value> = args
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();

        self.render_value(filename, &Value::Object(data))
    }

    /// Renderiza con un valor JSON arbitrario como contexto
    pub fn render_value(&self, filename: &str, data: &Value) -> Result<Response, TemplateError> {
        let path = self.templates_dir.join(filename);

        let file = self
            .files
            .serve_file(&path)
            .ok_or_else(|| TemplateError::NotFound(path.display().to_string()))?;

        let source = String::from_utf8(file.contents)
            .map_err(|_| TemplateError::RenderFailed(format!("{} is not valid UTF-8", filename)))?;

        let rendered = render_str(&source, data)?;
        event!(Level::DEBUG, template = filename, bytes = rendered.len(), "template rendered");

        Ok(Response::new(StatusCode::Ok, rendered, file.content_type))
    }
}

/// Sustituye los placeholders de `source` con valores de `data`
///
/// # Errores
///
/// `TemplateError::RenderFailed` si algún placeholder no tiene valor.
pub fn render_str(source: &str, data: &Value) -> Result<String, TemplateError> {
    let mut missing = None;

    let rendered = placeholder().replace_all(source, |caps: &Captures| {
        let key = &caps[1];
        match lookup(data, key) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| key.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(key) => Err(TemplateError::RenderFailed(format!("variable '{}' not found", key))),
        None => Ok(rendered.into_owned()),
    }
}

fn lookup(data: &Value, key: &str) -> Option<String> {
    let pointer = format!("/{}", key.replace('.', "/"));

    match data.pointer(&pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => Some(String::new()),
        other => Some(other.to_string()),
    }
}
