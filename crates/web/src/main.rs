mod api;

use anyhow::{anyhow, Context};
use packsim_core::Session;
use packsim_data::{AppConfig, JsonCatalog};
use std::sync::Arc;
use std::thread;
use tiny_http::{Header, Request, Response, Server, StatusCode};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = serve() {
        log::error!("{err:#}");
        std::process::exit(1);
    }
}

fn serve() -> anyhow::Result<()> {
    let config = AppConfig::load(None)?;
    let session = Session::new(config.open_catalog()?, config.slot_table()?)
        .with_max_quantity(config.max_quantity);
    let session = Arc::new(session);
    let server = Arc::new(
        Server::http(&config.bind).map_err(|err| anyhow!("bind {}: {err}", config.bind))?,
    );
    log::info!("pack simulator listening on http://{}", config.bind);

    let workers: Vec<_> = (0..config.workers.max(1))
        .map(|idx| {
            let server = Arc::clone(&server);
            let session = Arc::clone(&session);
            thread::Builder::new()
                .name(format!("http-{idx}"))
                .spawn(move || worker(&server, &session))
                .context("spawn worker")
        })
        .collect::<anyhow::Result<_>>()?;
    for handle in workers {
        if handle.join().is_err() {
            log::error!("worker thread panicked");
        }
    }
    Ok(())
}

fn worker(server: &Server, session: &Session<JsonCatalog>) {
    loop {
        match server.recv() {
            Ok(request) => {
                if let Err(err) = handle_request(request, session) {
                    log::warn!("request error: {err:#}");
                }
            }
            Err(err) => {
                log::error!("accept failed: {err}");
                break;
            }
        }
    }
}

fn handle_request(mut request: Request, session: &Session<JsonCatalog>) -> anyhow::Result<()> {
    let method = request.method().as_str().to_ascii_uppercase();
    let url = request.url().to_string();
    let too_long = request
        .body_length()
        .is_some_and(|len| len as u64 > api::MAX_BODY_BYTES);
    let reply = if too_long {
        api::body_too_large(api::MAX_BODY_BYTES)
    } else {
        match api::read_body(request.as_reader(), api::MAX_BODY_BYTES) {
            Ok(body) => api::route(session, &method, &url, &body),
            Err(reply) => reply,
        }
    };
    log::debug!("{method} {url} -> {}", reply.status);
    respond_json(request, reply)
}

fn respond_json(request: Request, reply: api::ApiReply) -> anyhow::Result<()> {
    let body = serde_json::to_vec(&reply.body)?;
    let response = Response::from_data(body)
        .with_status_code(StatusCode(reply.status))
        .with_header(header("Content-Type", "application/json")?)
        .with_header(header("Access-Control-Allow-Origin", "*")?)
        .with_header(header("Access-Control-Allow-Headers", "Content-Type")?);
    request.respond(response)?;
    Ok(())
}

fn header(name: &str, value: &str) -> anyhow::Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header {name}"))
}
