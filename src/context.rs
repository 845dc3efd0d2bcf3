//! # Contexto de la Aplicación
//! src/context.rs
//!
//! Junta las piezas que comparten el servidor y los handlers: la
//! configuración normalizada, el servidor de archivos, el templater y el
//! router. Las rutas se registran aquí antes de crear el servidor.
//!
//! ```no_run
//! use telar::config::Config;
//! use telar::context::Context;
//! use telar::http::{Method, Response, StatusCode};
//!
//! let mut context = Context::new("demo", Config::default()).unwrap();
//! context.router_mut().add_route("/ping", &[Method::GET], |_req| {
//!     Response::html(StatusCode::Ok, "pong")
//! });
//!
//! let mut server = context.create_server();
//! server.run().unwrap();
//! ```

use crate::config::Config;
use crate::files::{ContentSniffer, FileServer, SnifferError};
use crate::router::Router;
use crate::server::Server;
use crate::templates::Templater;
use std::path::Path;
use std::sync::Arc;
use tracing::{event, Level};

pub struct Context {
    name: String,
    config: Config,
    files: Arc<FileServer>,
    templater: Arc<Templater>,
    router: Router,
}

impl Context {
    /// Crea el contexto
    ///
    /// # Errores
    ///
    /// Falla si hay base de content types configurada y no se puede cargar.
    pub fn new(name: &str, config: Config) -> Result<Self, SnifferError> {
        let config = config.normalized();

        let sniffer = match &config.content_db {
            Some(db) => ContentSniffer::with_database(Path::new(db))?,
            None => ContentSniffer::new(),
        };

        let files = Arc::new(FileServer::new(sniffer));
        let templater = Arc::new(Templater::new(&config.templates_dir, Arc::clone(&files)));

        event!(
            Level::DEBUG,
            app = name,
            static_dir = %config.static_dir,
            templates_dir = %config.templates_dir,
            "context created"
        );

        Ok(Self {
            name: name.to_string(),
            config,
            files,
            templater,
            router: Router::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuración con directorios normalizados
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn files(&self) -> Arc<FileServer> {
        Arc::clone(&self.files)
    }

    /// Templater compartible con los handlers
    pub fn templater(&self) -> Arc<Templater> {
        Arc::clone(&self.templater)
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Congela el router y construye el servidor
    pub fn create_server(self) -> Server {
        event!(Level::INFO, app = %self.name, routes = self.router.len(), "creating server");
        Server::new(&self.config, Arc::new(self.router), self.files)
    }
}
