//! Tests de integración para el servidor HTTP
//! tests/integration_test.rs
//!
//! Cada test levanta su propio servidor en un puerto efímero, habla con él
//! por TCP y lo detiene al final.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use telar::config::Config;
use telar::context::Context;
use telar::http::{ContentType, Method, Request, Response, StatusCode};
use telar::server::{ServerState, ShutdownHandle};
use telar::templates::TemplateArguments;

const NOT_FOUND_BODY: &str = "<html><body><h1>404 Page Not Found</h1></body></html>";
const BAD_REQUEST_BODY: &str = "<html><body><h1>400 Bad Request</h1></body></html>";

/// Servidor corriendo en un thread aparte
struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    thread: Option<JoinHandle<ServerState>>,
}

impl TestServer {
    fn stop(mut self) -> ServerState {
        self.shutdown.request_shutdown();
        // Despertar el accept bloqueado
        let _ = TcpStream::connect(self.addr);
        self.thread.take().unwrap().join().unwrap()
    }
}

fn site_dir(name: &str) -> PathBuf {
    let root = std::env::temp_dir().join(format!("telar-it-{}-{}", name, std::process::id()));
    let site = root.join("site");
    let templates = root.join("templates");
    std::fs::create_dir_all(site.join("img")).unwrap();
    std::fs::create_dir_all(&templates).unwrap();

    std::fs::write(site.join("index.html"), "<h1>Bienvenido</h1>").unwrap();
    std::fs::write(site.join("notes.txt"), "just text").unwrap();
    std::fs::write(site.join("img/logo.png"), b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();
    std::fs::write(site.join("img/raw"), b"GIF89a\x01\0\x01\0").unwrap();
    std::fs::write(site.join("myroute"), "static myroute").unwrap();
    std::fs::write(templates.join("hello.html"), "<p>Hola {{ name }} desde {{ platform }}</p>").unwrap();

    root
}

fn start_server(name: &str) -> TestServer {
    let root = site_dir(name);
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        static_dir: root.join("site").display().to_string(),
        templates_dir: root.join("templates").display().to_string(),
        workers: 4,
        ..Config::default()
    };

    let mut context = Context::new(name, config).unwrap();
    let templater = context.templater();

    let router = context.router_mut();
    router.add_route("/myroute", &[Method::GET, Method::PUT], |req: &Request| {
        Response::new(
            StatusCode::Ok,
            format!("<title>I am a teapot</title>{}", req.method()),
            ContentType::TextHtml,
        )
    });
    router.add_route("/hello", &[Method::GET], move |req: &Request| {
        let mut args = TemplateArguments::new();
        args.insert("name".to_string(), "Ada".to_string());
        args.insert("platform".to_string(), req.client_platform().as_str().to_string());
        templater.render("hello.html", &args).unwrap_or_else(|_| Response::internal_error())
    });
    router.add_route("/echo", &[Method::POST], |req: &Request| {
        Response::new(StatusCode::Ok, req.body().to_vec(), ContentType::TextPlain)
    });

    let mut server = context.create_server();
    let addr = server.bind().unwrap();
    let shutdown = server.shutdown_handle();

    let thread = thread::spawn(move || {
        server.run().unwrap();
        server.state()
    });

    TestServer {
        addr,
        shutdown,
        thread: Some(thread),
    }
}

/// Helper: envía bytes crudos y retorna la response completa
fn send_raw(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(5))).unwrap();
    stream.set_write_timeout(Some(Duration::from_secs(5))).unwrap();

    stream.write_all(request).unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    response
}

fn send(addr: SocketAddr, request: &str) -> String {
    String::from_utf8_lossy(&send_raw(addr, request.as_bytes())).into_owned()
}

fn header_value<'a>(response: &'a str, name: &str) -> Option<&'a str> {
    let head = response.split("\r\n\r\n").next()?;
    head.lines()
        .skip(1)
        .filter_map(|line| line.split_once(": "))
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.trim_end())
}

fn body(response: &str) -> &str {
    response.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("")
}

// ==================== Static files ====================

#[test]
fn test_static_file_served_with_sniffed_type() {
    let server = start_server("static");

    let response = send(server.addr, "GET /notes.txt HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(header_value(&response, "Content-Type"), Some("text/plain"));
    assert_eq!(header_value(&response, "Content-Length"), Some("9"));
    assert_eq!(body(&response), "just text");

    let response = send_raw(server.addr, b"GET /img/logo.png HTTP/1.0\r\n\r\n");
    let text = String::from_utf8_lossy(&response);
    assert!(text.contains("Content-Type: image/png\r\n"));
    assert!(response.ends_with(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"));

    // Sin extensión: se reconoce por los magic bytes
    let response = send(server.addr, "GET /img/raw HTTP/1.0\r\n\r\n");
    assert_eq!(header_value(&response, "Content-Type"), Some("image/gif"));

    assert_eq!(server.stop(), ServerState::Stopped);
}

#[test]
fn test_root_is_index() {
    let server = start_server("root");

    let response = send(server.addr, "GET / HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(header_value(&response, "Content-Type"), Some("text/html"));
    assert_eq!(body(&response), "<h1>Bienvenido</h1>");

    server.stop();
}

#[test]
fn test_missing_file_is_404() {
    let server = start_server("missing");

    let response = send(server.addr, "GET /does-not-exist.html HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    assert_eq!(header_value(&response, "Content-Type"), Some("text/html"));
    assert_eq!(body(&response), NOT_FOUND_BODY);

    server.stop();
}

// ==================== Routes ====================

#[test]
fn test_registered_route() {
    let server = start_server("route");

    let response = send(server.addr, "GET /myroute HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(body(&response).contains("I am a teapot"));
    assert!(body(&response).ends_with("GET"));

    let response = send(server.addr, "PUT /myroute HTTP/1.1\r\n\r\n");
    assert!(body(&response).ends_with("PUT"));

    server.stop();
}

#[test]
fn test_disallowed_method_falls_back_to_static() {
    let server = start_server("fallback");

    // DELETE no está permitido en /myroute: se busca el archivo, no hay 405
    let response = send(server.addr, "DELETE /myroute HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body(&response), "static myroute");

    server.stop();
}

#[test]
fn test_template_route() {
    let server = start_server("template");

    let response = send(
        server.addr,
        "GET /hello HTTP/1.1\r\nsec-ch-ua-platform: \"Linux\"\r\n\r\n",
    );
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    assert_eq!(body(&response), "<p>Hola Ada desde Linux</p>");

    server.stop();
}

#[test]
fn test_body_in_same_packet_reaches_handler() {
    let server = start_server("echo");

    let response = send(server.addr, "POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello");
    assert_eq!(header_value(&response, "Content-Type"), Some("text/plain"));
    assert_eq!(body(&response), "hello");

    server.stop();
}

// ==================== Errors ====================

#[test]
fn test_bad_method_is_400() {
    let server = start_server("badmethod");

    let response = send(server.addr, "BREW /pot HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert_eq!(body(&response), BAD_REQUEST_BODY);

    // El worker sigue vivo después del error
    let response = send(server.addr, "GET / HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));

    server.stop();
}

#[test]
fn test_bad_version_and_platform_are_400() {
    let server = start_server("badversion");

    let response = send(server.addr, "GET / HTTP/3.0\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    let response = send(server.addr, "GET / HTTP/1.1\r\nsec-ch-ua-platform: \"BeOS\"\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));

    server.stop();
}

#[test]
fn test_traversal_outside_root_is_404() {
    let server = start_server("traversal");

    let response = send(server.addr, "GET /../templates/hello.html HTTP/1.1\r\n\r\n");
    assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));

    server.stop();
}

// ==================== Concurrency ====================

#[test]
fn test_concurrent_clients() {
    let server = start_server("concurrent");
    let addr = server.addr;

    let clients: Vec<_> = (0..16)
        .map(|i| {
            thread::spawn(move || {
                let path = if i % 2 == 0 { "/myroute" } else { "/notes.txt" };
                send(addr, &format!("GET {} HTTP/1.1\r\n\r\n", path))
            })
        })
        .collect();

    for client in clients {
        let response = client.join().unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
    }

    assert_eq!(server.stop(), ServerState::Stopped);
}
