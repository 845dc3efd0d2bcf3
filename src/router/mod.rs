//! # Registro de Rutas
//! src/router/mod.rs
//!
//! Mapea paths exactos a un conjunto de métodos permitidos y un handler.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router ─(path + método registrados)→ Handler → Response
//!                  └─(cualquier otro caso)──────→ None (fallback a archivos)
//! ```
//!
//! No hay wildcards ni parámetros en el path: lo que no esté registrado
//! exactamente cae al servidor de archivos estáticos. "Ruta inexistente" y
//! "método no permitido" son indistinguibles para quien llama.
//!
//! El router se llena antes de arrancar el servidor y luego se comparte
//! como `Arc<Router>` de solo lectura entre los workers.

use crate::http::{Method, Request, Response};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

/// Tipo de función handler
///
/// Un handler recibe un Request y retorna una Response. Puede capturar el
/// estado que necesite (p. ej. un `Arc<Templater>`).
pub type Handler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// Entrada registrada para un path
#[derive(Clone)]
pub struct RouteEntry {
    /// Métodos permitidos, en el orden en que se registraron
    methods: Vec<Method>,
    handler: Handler,
}

impl RouteEntry {
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    fn allows(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }
}

/// Router que mapea paths a handlers
#[derive(Default, Clone)]
pub struct Router {
    routes: HashMap<String, RouteEntry>,
}

impl Router {
    /// Crea un router vacío
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (o reemplaza) la ruta para `path`
    ///
    /// Si el path ya estaba registrado, gana el último registro.
    ///
    /// # Ejemplo
    /// ```
    /// use telar::router::Router;
    /// use telar::http::{Method, Response, StatusCode};
    ///
    /// let mut router = Router::new();
    /// router.add_route("/hello", &[Method::GET], |_req| {
    ///     Response::html(StatusCode::Ok, "<h1>Hello</h1>")
    /// });
    ///
    /// assert!(router.is_valid_route("/hello", Method::GET));
    /// ```
    pub fn add_route<F>(&mut self, path: &str, methods: &[Method], handler: F)
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        let entry = RouteEntry {
            methods: methods.to_vec(),
            handler: Arc::new(handler),
        };

        if self.routes.insert(path.to_string(), entry).is_some() {
            event!(Level::WARN, path, "route registered twice, replacing previous handler");
        } else {
            event!(Level::DEBUG, path, ?methods, "route registered");
        }
    }

    /// `true` si existe una entrada para `path` que permite `method`
    pub fn is_valid_route(&self, path: &str, method: Method) -> bool {
        self.lookup(path, method).is_some()
    }

    /// Ejecuta el handler si la ruta y el método coinciden
    ///
    /// Retorna `None` cuando no hay ruta o el método no está permitido.
    pub fn handle_request(&self, path: &str, method: Method, request: &Request) -> Option<Response> {
        self.lookup(path, method).map(|entry| (entry.handler)(request))
    }

    /// Entrada registrada para un path, sin mirar el método
    pub fn route(&self, path: &str) -> Option<&RouteEntry> {
        self.routes.get(path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    fn lookup(&self, path: &str, method: Method) -> Option<&RouteEntry> {
        self.routes.get(path).filter(|entry| entry.allows(method))
    }
}
