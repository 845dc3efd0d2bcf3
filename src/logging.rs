//! # Logging
//! src/logging.rs
//!
//! Subscriber global de `tracing` con salida a consola y, opcionalmente, a
//! un archivo en modo append. Cinco severidades: debug, info, warn, error
//! y critical. `tracing` no tiene nivel critical, así que [`critical!`]
//! emite un evento ERROR con el campo `critical = true`.
//!
//! El filtro sale de la configuración y `RUST_LOG` lo reemplaza si está
//! definido.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Niveles aceptados en la configuración
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "critical"];

/// Evento de severidad crítica
///
/// ```
/// telar::critical!(port = 8080, "listener died");
/// ```
#[macro_export]
macro_rules! critical {
    ($($arg:tt)+) => {
        ::tracing::event!(::tracing::Level::ERROR, critical = true, $($arg)+)
    };
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Destinos y nivel del log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub console: bool,
    pub file: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            console: true,
            file: None,
        }
    }
}

/// Directiva de `EnvFilter` para un nivel de la configuración
pub fn filter_directive(level: &str) -> &'static str {
    match level.to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" | "critical" => "error",
        _ => "info",
    }
}

/// Construye el subscriber sin instalarlo
///
/// # Errores
///
/// Falla si no se puede abrir el archivo de log.
pub fn build_subscriber(
    settings: &LogSettings,
) -> Result<impl Subscriber + Send + Sync + 'static, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&settings.level)));

    let console = settings
        .console
        .then(|| fmt::layer().with_target(false).with_thread_names(true));

    let file = match &settings.file {
        Some(path) => {
            let writer = open_log_file(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_thread_names(true)
                    .with_writer(Mutex::new(writer)),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file))
}

/// Instala el subscriber global
///
/// Retorna `Ok(false)` si ya había uno instalado; no es un error para que
/// varios servidores en el mismo proceso convivan.
pub fn init(settings: &LogSettings) -> Result<bool, LoggingError> {
    let subscriber = build_subscriber(settings)?;
    Ok(subscriber.try_init().is_ok())
}

fn open_log_file(path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggingError::OpenFile {
            path: path.display().to_string(),
            source,
        })
}
