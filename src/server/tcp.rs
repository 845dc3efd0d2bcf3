//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Un thread acepta conexiones y las encola en el pool de workers; el
//! accept loop nunca espera a que se procese un request.
//!
//! ## Estados
//!
//! ```text
//! Created → Bound → Listening → Running → ShutdownRequested → Stopped
//! ```
//!
//! `std::net::TcpListener::bind` hace bind y listen en una sola llamada, así
//! que `bind()` pasa por Bound y termina en Listening. El backlog es el
//! del sistema.
//!
//! El shutdown es cooperativo: el flag se revisa después de cada accept, así
//! que el servidor se detiene cuando llega la siguiente conexión.

use super::connection::{handle_connection, ConnectionContext};
use crate::config::Config;
use crate::critical;
use crate::files::FileServer;
use crate::router::Router;
use crate::workers::{PoolError, WorkerPool};
use std::fmt;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{event, Level};

/// Estado del ciclo de vida del servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Created,
    Bound,
    Listening,
    Running,
    ShutdownRequested,
    Stopped,
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Created => "created",
            ServerState::Bound => "bound",
            ServerState::Listening => "listening",
            ServerState::Running => "running",
            ServerState::ShutdownRequested => "shutdown requested",
            ServerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    /// No se pudo crear, enlazar o poner a escuchar el socket
    #[error("failed to bind {address}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    /// `accept()` falló; el servidor completo se detiene
    #[error("accept failed")]
    Accept(#[source] io::Error),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("operation not valid in state '{0}'")]
    InvalidState(ServerState),
}

/// Permite pedir el shutdown desde otro thread
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    requested: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Marca el shutdown; se aplica cuando vuelva el accept en curso
    pub fn request_shutdown(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// Servidor HTTP/1.x concurrente
pub struct Server {
    address: String,
    workers: usize,
    state: ServerState,
    listener: Option<TcpListener>,
    local_addr: Option<SocketAddr>,
    shutdown: ShutdownHandle,
    connection: Arc<ConnectionContext>,
}

impl Server {
    /// Crea el servidor sin abrir ningún socket
    ///
    /// El router ya debe tener todas sus rutas: a partir de aquí es de
    /// solo lectura.
    pub fn new(config: &Config, router: Arc<Router>, files: Arc<FileServer>) -> Self {
        let connection = ConnectionContext {
            router,
            files,
            static_root: PathBuf::from(&config.static_dir),
            max_request_size: config.max_request_size,
        };

        Self {
            address: config.address(),
            workers: config.workers,
            state: ServerState::Created,
            listener: None,
            local_addr: None,
            shutdown: ShutdownHandle::default(),
            connection: Arc::new(connection),
        }
    }

    /// Abre el socket: Created → Bound → Listening
    pub fn bind(&mut self) -> Result<SocketAddr, ServerError> {
        if self.state != ServerState::Created {
            return Err(ServerError::InvalidState(self.state));
        }

        let listener = TcpListener::bind(&self.address).map_err(|source| {
            critical!(address = %self.address, error = %source, "failed to bind listener");
            ServerError::Bind {
                address: self.address.clone(),
                source,
            }
        })?;
        self.state = ServerState::Bound;

        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            address: self.address.clone(),
            source,
        })?;

        self.listener = Some(listener);
        self.local_addr = Some(local_addr);
        self.state = ServerState::Listening;

        event!(Level::INFO, address = %local_addr, "server listening");
        Ok(local_addr)
    }

    /// Acepta conexiones hasta que se pida el shutdown
    ///
    /// Si el servidor no estaba enlazado, llama a `bind()` primero. Al
    /// salir cierra el listener y espera a que el pool termine las
    /// conexiones encoladas.
    pub fn run(&mut self) -> Result<(), ServerError> {
        if self.state == ServerState::Created {
            self.bind()?;
        }

        if self.state != ServerState::Listening {
            return Err(ServerError::InvalidState(self.state));
        }

        let listener = self
            .listener
            .take()
            .ok_or(ServerError::InvalidState(self.state))?;

        let mut pool = WorkerPool::new(self.workers)?;
        self.state = ServerState::Running;
        event!(Level::INFO, workers = self.workers, "server running");

        let result = self.accept_loop(&listener, &pool);

        if self.shutdown.is_requested() {
            self.state = ServerState::ShutdownRequested;
            event!(Level::INFO, "shutdown requested, draining connections");
        }

        drop(listener);
        pool.shutdown();
        self.state = ServerState::Stopped;
        event!(Level::INFO, "server stopped");

        result
    }

    fn accept_loop(&self, listener: &TcpListener, pool: &WorkerPool) -> Result<(), ServerError> {
        while !self.shutdown.is_requested() {
            let (stream, peer) = listener.accept().map_err(|e| {
                critical!(error = %e, "accept failed, stopping server");
                ServerError::Accept(e)
            })?;

            event!(Level::DEBUG, peer = %peer, "connection accepted");

            let ctx = Arc::clone(&self.connection);
            let queued = pool.enqueue(move || {
                if let Err(e) = handle_connection(stream, &ctx) {
                    event!(Level::ERROR, peer = %peer, error = %e, "connection error");
                }
            });

            if let Err(e) = queued {
                event!(Level::ERROR, error = %e, "could not enqueue connection");
                return Err(e.into());
            }
        }

        Ok(())
    }

    /// Handle para pedir el shutdown desde otro thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Atajo de `shutdown_handle().request_shutdown()`
    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    /// Dirección real del socket, disponible después de `bind()`
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

#[cfg(test)]
mod more_server_tests {
    use super::*;
    use crate::http::{Method, Response, StatusCode};
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread;

    fn test_config() -> Config {
        let static_dir = std::env::temp_dir().join(format!("telar-server-{}", std::process::id()));
        std::fs::create_dir_all(&static_dir).unwrap();
        std::fs::write(static_dir.join("index.html"), "<h1>inicio</h1>").unwrap();

        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: static_dir.display().to_string(),
            workers: 2,
            ..Config::default()
        }
    }

    fn test_server() -> Server {
        let mut router = Router::new();
        router.add_route("/myroute", &[Method::GET, Method::PUT], |_req| {
            Response::html(StatusCode::Ok, "<title>I am a teapot</title>")
        });

        Server::new(&test_config(), Arc::new(router), Arc::new(FileServer::default()))
    }

    fn get(addr: SocketAddr, request: &[u8]) -> String {
        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(request).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }

    #[test]
    fn test_state_transitions() {
        let mut server = test_server();
        assert_eq!(server.state(), ServerState::Created);
        assert!(server.local_addr().is_none());

        let addr = server.bind().unwrap();
        assert_eq!(server.state(), ServerState::Listening);
        assert_eq!(server.local_addr(), Some(addr));
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_bind_twice_is_invalid() {
        let mut server = test_server();
        server.bind().unwrap();

        assert!(matches!(
            server.bind(),
            Err(ServerError::InvalidState(ServerState::Listening))
        ));
    }

    #[test]
    fn test_bind_error() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = test_config();
        config.port = taken.local_addr().unwrap().port();

        let mut server = Server::new(&config, Arc::new(Router::new()), Arc::new(FileServer::default()));
        assert!(matches!(server.bind(), Err(ServerError::Bind { .. })));
        assert_eq!(server.state(), ServerState::Created);
    }

    #[test]
    fn test_run_serves_and_stops() {
        let mut server = test_server();
        let addr = server.bind().unwrap();
        let shutdown = server.shutdown_handle();

        let t = thread::spawn(move || {
            server.run().unwrap();
            server.state()
        });

        let text = get(addr, b"GET /myroute HTTP/1.1\r\n\r\n");
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("teapot"));

        let text = get(addr, b"GET / HTTP/1.0\r\n\r\n");
        assert!(text.contains("<h1>inicio</h1>"));

        // El accept bloqueado necesita una conexión para ver el flag
        shutdown.request_shutdown();
        let _ = TcpStream::connect(addr);

        assert_eq!(t.join().unwrap(), ServerState::Stopped);
    }

    #[test]
    fn test_run_after_stop_is_invalid() {
        let mut server = test_server();
        let addr = server.bind().unwrap();
        server.request_shutdown();

        let t = thread::spawn(move || {
            server.run().unwrap();
            let again = server.run();
            (server.state(), again)
        });

        let _ = TcpStream::connect(addr);

        let (state, again) = t.join().unwrap();
        assert_eq!(state, ServerState::Stopped);
        assert!(matches!(again, Err(ServerError::InvalidState(ServerState::Stopped))));
    }

    #[test]
    fn test_shutdown_handle_is_shared() {
        let server = test_server();
        let a = server.shutdown_handle();
        let b = a.clone();

        assert!(!a.is_requested());
        b.request_shutdown();
        assert!(a.is_requested());
    }
}
