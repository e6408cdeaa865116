use crate::config::Config;
use crate::db::init_db;
use crate::db::magic_links::purge_stale_links;
use crate::responses::error_to_response;
use crate::router::handle;
use crate::state::AppState;
use crate::util::now_unix;
use astra::{Request, Server};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod forms;
mod handlers;
mod mailer;
mod responses;
mod router;
mod services;
mod spreadsheets;
mod state;
mod templates;
mod util;

#[cfg(test)]
mod tests;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration failed");
            std::process::exit(1);
        }
    };

    let addr = config.bind_addr;
    let workers = config.max_workers;
    let schema_path = config.schema_path.clone();
    let state = AppState::new(config);

    if let Err(e) = init_db(&state.db, &schema_path) {
        error!(error = %e, "database initialization failed");
        std::process::exit(1);
    }
    match state.db.with_conn(|conn| purge_stale_links(conn, now_unix())) {
        Ok(purged) => info!(purged, "stale sign-in links removed"),
        Err(e) => warn!(error = %e, "could not purge sign-in links"),
    }

    info!(%addr, workers, "starting server");
    let server = Server::bind(&addr).max_workers(workers);

    let result = server.serve(move |req: Request, _info| {
        let started = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let resp = match handle(req, &state) {
            Ok(resp) => resp,
            Err(err) => error_to_response(err, &path),
        };

        info!(
            %method,
            %path,
            status = resp.status().as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request"
        );
        resp
    });

    if let Err(e) = result {
        error!(error = %e, "server ended with error");
    }

    info!("server shut down");
}
