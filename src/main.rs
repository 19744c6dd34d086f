//! MVC dispatch host.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http server ──▶ Dispatcher ──▶ Router ──▶ ControllerSpec
//!                    (request id,                                   │
//!                     trace, timeout)                               ▼
//!                                    container scope ◀── controller instance
//!                                          │
//!                                          ▼
//!                                    ActionResolver ──▶ binders ──▶ action
//!                                                                     │
//!     Client Response ◀──────────────────── normalize ◀───────────────┘
//! ```
//!
//! Commands:
//! - `serve`: run the HTTP host
//! - `routes`: print the route table in match order
//! - `match <PATH>`: show which route and parameters a path produces

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use mvc_dispatch::config::{load_config, MvcConfig};
use mvc_dispatch::controller::{controller_class_name, Action, ControllerBuilder, ControllerSpec};
use mvc_dispatch::observability::{logging, metrics};
use mvc_dispatch::routing::defaults;
use mvc_dispatch::{HttpServer, MvcApp};

#[derive(Parser)]
#[command(name = "mvc-dispatch")]
#[command(about = "MVC request dispatch host", long_about = None)]
struct Cli {
    /// Configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve HTTP requests
    Serve,
    /// List routes in match order
    Routes,
    /// Route a path and print the resulting parameters
    Match {
        path: String,
        #[arg(short, long)]
        query: Option<String>,
    },
}

#[derive(Default)]
struct HomeController;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MvcConfig::default(),
    };
    logging::init(&config.observability.log_filter);

    tracing::info!(
        namespace = %config.namespace,
        home = %config.home.display(),
        routes = config.routes.len(),
        "mvc-dispatch v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let app = build_app(config)?;

    match cli.command {
        Commands::Serve => serve(app).await?,
        Commands::Routes => {
            for route in app.dispatcher().router().routes() {
                let defaults: Vec<String> = route
                    .defaults()
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                println!("{:<16} {:<40} {}", route.name(), route.pattern(), defaults.join(" "));
            }
        }
        Commands::Match { path, query } => {
            let router = app.dispatcher().router();
            match router.route(&path, query.as_deref()) {
                Ok(parameters) => {
                    let spec = ControllerSpec::locate(app.dispatcher().namespace(), parameters);
                    println!("controller: {}", spec.controller_class());
                    println!("action:     {}", spec.action());
                    for (name, value) in spec.parameters() {
                        println!("  {name} = {value}");
                    }
                }
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

/// Build the application, with a welcome controller and a catch-all route
/// when the configuration defines no routes.
fn build_app(config: MvcConfig) -> Result<MvcApp, Box<dyn std::error::Error>> {
    let welcome = config.routes.is_empty();
    let home_class = controller_class_name(&config.namespace, "home");
    let mut builder = MvcApp::builder(config);

    if welcome {
        builder = builder
            .route(
                "default",
                "/{controller}/{action}/{id}",
                defaults([("controller", "home"), ("action", "index"), ("id", "")]),
            )
            .controller(
                ControllerBuilder::new(home_class, |_| Ok(HomeController))
                    .action(Action::new("index"), |_: &mut HomeController, _| {
                        Ok("mvc-dispatch is running")
                    })
                    .build(),
            );
    }

    Ok(builder.build()?)
}

async fn serve(app: MvcApp) -> Result<(), Box<dyn std::error::Error>> {
    let config = app.config();
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(&app).run(listener).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
