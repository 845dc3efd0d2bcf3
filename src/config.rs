//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración de telar desde argumentos CLI y variables de entorno.
//! Se lee una sola vez al arrancar.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./telar --port 8080 \
//!   --static-dir ./static_websites \
//!   --templates-dir ./templates \
//!   --workers 4
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! TELAR_PORT=8080 TELAR_LOG_LEVEL=info ./telar
//! ```

use crate::logging::{LogSettings, LOG_LEVELS};
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

/// Errores de validación
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("workers must be >= 1")]
    InvalidWorkers,

    #[error("max request size must be > 0")]
    InvalidMaxRequestSize,

    #[error("unknown log level '{0}' (expected one of: trace, debug, info, warn, error, critical)")]
    InvalidLogLevel(String),

    #[error("static directory must not be empty")]
    EmptyStaticDir,
}

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "telar")]
#[command(about = "Servidor HTTP/1.x concurrente de sitios estáticos")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "8080", env = "TELAR_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "TELAR_HOST")]
    pub host: String,

    /// Raíz de los sitios estáticos
    #[arg(long = "static-dir", default_value = "./static_websites", env = "TELAR_STATIC_DIR")]
    pub static_dir: String,

    /// Directorio de templates
    #[arg(long = "templates-dir", default_value = "./templates", env = "TELAR_TEMPLATES_DIR")]
    pub templates_dir: String,

    /// Base JSON de extensiones → MIME (opcional)
    #[arg(long = "content-db", env = "TELAR_CONTENT_DB")]
    pub content_db: Option<String>,

    // === Concurrencia ===

    /// Número de workers que atienden conexiones
    #[arg(short, long, default_value = "4", env = "TELAR_WORKERS")]
    pub workers: usize,

    /// Máximo de bytes que se leen de un request
    #[arg(long = "max-request-size", default_value = "30000", env = "TELAR_MAX_REQUEST_SIZE")]
    pub max_request_size: usize,

    // === Logging ===

    /// Nivel mínimo: trace, debug, info, warn, error, critical
    #[arg(long = "log-level", default_value = "debug", env = "TELAR_LOG_LEVEL")]
    pub log_level: String,

    /// Escribir el log en la consola
    #[arg(
        long = "log-to-console",
        default_value = "true",
        action = clap::ArgAction::Set,
        env = "TELAR_LOG_TO_CONSOLE"
    )]
    pub log_to_console: bool,

    /// Archivo de log (append)
    #[arg(long = "log-file", env = "TELAR_LOG_FILE")]
    pub log_file: Option<String>,
}

impl Config {
    /// Crea la configuración parseando argumentos CLI y entorno
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use telar::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }

        if self.max_request_size == 0 {
            return Err(ConfigError::InvalidMaxRequestSize);
        }

        if self.static_dir.is_empty() {
            return Err(ConfigError::EmptyStaticDir);
        }

        let level = self.log_level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        Ok(())
    }

    /// Copia con los directorios terminados en `/`
    ///
    /// Así el path efectivo de un archivo es `static_dir + path`.
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.static_dir = with_trailing_slash(&self.static_dir);
        config.templates_dir = with_trailing_slash(&self.templates_dir);
        config
    }

    /// Parámetros para `logging::init`
    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            level: self.log_level.to_ascii_lowercase(),
            console: self.log_to_console,
            file: self.log_file.as_ref().map(PathBuf::from),
        }
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║                 telar Server Configuration                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Max request:  {} bytes", self.max_request_size);
        println!();
        println!("📁 Content:");
        println!("   Static dir:   {}", self.static_dir);
        println!("   Templates:    {}", self.templates_dir);
        match &self.content_db {
            Some(db) => println!("   Content DB:   {}", db),
            None => println!("   Content DB:   built-in table"),
        }
        println!();
        println!("👷 Workers:      {}", self.workers);
        println!();
        println!("📝 Logging:");
        println!("   Level:        {}", self.log_level);
        println!("   Console:      {}", if self.log_to_console { "on" } else { "off" });
        match &self.log_file {
            Some(file) => println!("   File:         {}", file),
            None => println!("   File:         disabled"),
        }
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            static_dir: "./static_websites".to_string(),
            templates_dir: "./templates".to_string(),
            content_db: None,
            workers: 4,
            max_request_size: 30_000,
            log_level: "debug".to_string(),
            log_to_console: true,
            log_file: None,
        }
    }
}

fn with_trailing_slash(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{}/", dir)
    }
}
