#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the LODES explorer.
//!
//! Serves the REST API for querying CBSAs and filtered block group
//! feature collections, plus the static map frontend. All queries run
//! against a read-only SQLite database populated by the ingestion CLI;
//! the server itself never writes.

mod handlers;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, middleware, web};

/// Simple round-robin pool of read-only SQLite connections.
///
/// `rusqlite::Connection` is `Send` but not `Sync`, so each connection is
/// wrapped in a `Mutex`. The pool hands out connections round-robin via
/// an atomic counter, allowing concurrent queries on different
/// connections.
pub struct SqlitePool {
    connections: Vec<Mutex<rusqlite::Connection>>,
    next: AtomicUsize,
}

impl SqlitePool {
    /// Opens `size` read-only connections to the SQLite file at `path`.
    ///
    /// # Panics
    ///
    /// Panics if any connection fails to open.
    #[must_use]
    pub fn new(path: &Path, size: usize) -> Self {
        let connections = (0..size)
            .map(|_| {
                let conn = lodes_explorer_database::open_read_only(path)
                    .expect("Failed to open SQLite connection for pool");
                Mutex::new(conn)
            })
            .collect();
        Self {
            connections,
            next: AtomicUsize::new(0),
        }
    }

    /// Acquires the next connection from the pool (round-robin).
    ///
    /// # Panics
    ///
    /// Panics if the `Mutex` is poisoned.
    pub fn acquire(&self) -> std::sync::MutexGuard<'_, rusqlite::Connection> {
        let idx = self.next.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        self.connections[idx]
            .lock()
            .expect("SQLite pool mutex poisoned")
    }
}

/// Shared application state.
pub struct AppState {
    /// Pool of read-only SQLite connections.
    pub pool: Arc<SqlitePool>,
}

/// Starts the LODES explorer API server.
///
/// Opens the SQLite database named by `LODES_DB` (default `lodes.db`) and
/// binds to `BIND_ADDR`:`PORT` (default `127.0.0.1:8000`). This is a
/// regular async function — the caller provides the async runtime (e.g.
/// via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the SQLite database cannot be opened.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let db_path = std::env::var("LODES_DB").unwrap_or_else(|_| "lodes.db".to_string());
    log::info!("Opening SQLite database at {db_path}...");
    let pool = SqlitePool::new(Path::new(&db_path), 4);

    let state = web::Data::new(AppState {
        pool: Arc::new(pool),
    });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .route("/health", web::get().to(handlers::health))
            .service(api_scope())
            // Serve frontend static files
            .service(Files::new("/", "frontend").index_file("index.html"))
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .route("/", web::get().to(handlers::api_index))
        .route("/cbsas", web::get().to(handlers::cbsas))
        .route("/cbsa/{cbsa_code}", web::get().to(handlers::cbsa))
        // The map frontend sends both verbs for filtered queries.
        .route(
            "/blockgroups/filtered",
            web::get().to(handlers::blockgroups_filtered),
        )
        .route(
            "/blockgroups/filtered",
            web::post().to(handlers::blockgroups_filtered),
        )
        .route(
            "/blockgroups/{cbsa_code}",
            web::get().to(handlers::blockgroups),
        )
        .route("/filters", web::get().to(handlers::filters))
}
