//! # telar - Entry Point
//! src/main.rs
//!
//! Lee la configuración, instala el logging, registra las rutas de ejemplo
//! y corre el servidor hasta que falle.

use anyhow::Context as _;
use std::sync::Arc;
use telar::config::Config;
use telar::context::Context;
use telar::http::{ContentType, Method, Request, Response, StatusCode};
use telar::templates::{TemplateArguments, TemplateError, Templater};
use tracing::{event, Level};

const TEAPOT_PAGE: &str = "<html><head><title>I am a teapot</title></head>\
<body><h1>I am a teapot</h1><p>This response comes from a registered route.</p></body></html>";

fn main() {
    let config = Config::new();

    if let Err(e) = run(config) {
        telar::critical!(error = ?e, "fatal error");
        eprintln!("💥 Error fatal: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    telar::logging::init(&config.log_settings()).context("failed to initialize logging")?;
    config.print_summary();

    let mut context = Context::new("telar", config).context("failed to load content database")?;
    let templater = context.templater();

    let router = context.router_mut();
    router.add_route("/myroute", &[Method::GET, Method::PUT], teapot_handler);
    router.add_route("/hello", &[Method::GET], move |req| hello_handler(&templater, req));

    let mut server = context.create_server();
    server.run().context("server stopped with an error")?;

    Ok(())
}

fn teapot_handler(_req: &Request) -> Response {
    Response::new(StatusCode::Ok, TEAPOT_PAGE, ContentType::TextHtml)
}

fn hello_handler(templater: &Arc<Templater>, req: &Request) -> Response {
    let mut args = TemplateArguments::new();
    args.insert("host".to_string(), req.remote_host().to_string());
    args.insert("platform".to_string(), req.client_platform().as_str().to_string());
    args.insert("user_agent".to_string(), req.user_agent().to_string());

    match templater.render("hello.html", &args) {
        Ok(response) => response,
        Err(TemplateError::NotFound(path)) => {
            event!(Level::WARN, template = %path, "template missing");
            Response::not_found()
        }
        Err(e) => {
            event!(Level::ERROR, error = %e, "template rendering failed");
            Response::internal_error()
        }
    }
}
