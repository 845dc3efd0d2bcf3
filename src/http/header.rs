//! # Mapa de Headers
//! src/http/header.rs
//!
//! Almacén clave/valor usado por requests y responses.
//!
//! A diferencia de un `HashMap` normal, insertar una clave que ya existe
//! falla: los headers duplicados que llegan por el socket se rechazan,
//! nunca se mezclan ni se sobrescriben.

use std::collections::BTreeMap;
use thiserror::Error;

/// Errores del mapa de headers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// La clave ya estaba registrada
    #[error("duplicate header: {0}")]
    DuplicateKey(String),
}

/// Par nombre/valor tal como llegó
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderEntry {
    name: String,
    value: String,
}

/// Mapa de headers con claves únicas
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    values: BTreeMap<String, HeaderEntry>,
}

impl Header {
    /// Crea un mapa vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un header
    ///
    /// # Errores
    ///
    /// Retorna `HeaderError::DuplicateKey` si la clave ya existe. El valor
    /// original se conserva.
    ///
    /// # Ejemplo
    /// ```
    /// use telar::http::Header;
    ///
    /// let mut header = Header::new();
    /// header.add("Accept", "text/html").unwrap();
    /// assert!(header.add("Accept", "*/*").is_err());
    /// assert_eq!(header.get("Accept"), Some("text/html"));
    /// ```
    pub fn add(&mut self, key: &str, value: &str) -> Result<(), HeaderError> {
        if self.values.contains_key(key) {
            return Err(HeaderError::DuplicateKey(key.to_string()));
        }

        self.values.insert(
            key.to_string(),
            HeaderEntry {
                name: key.to_string(),
                value: value.to_string(),
            },
        );
        Ok(())
    }

    /// Obtiene el valor de un header, `None` si no existe
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|entry| entry.value.as_str())
    }

    /// Todas las claves (ordenadas por el mapa interno)
    pub fn all_keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Itera pares `(nombre, valor)`
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .values()
            .map(|entry| (entry.name.as_str(), entry.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
