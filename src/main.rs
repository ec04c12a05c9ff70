use axum::Router;
use clap::Parser;
use dirindex::{ServeIndex, View};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::fs;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

// --- Configuration ---
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The root directory to serve listings for
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    root_dir: PathBuf,

    /// The network address to bind to
    #[arg(short, long, value_name = "ADDR", default_value = "127.0.0.1:3000")]
    bind_addr: SocketAddr,

    /// Include dotfile entries in listings
    #[arg(long)]
    hidden: bool,

    /// Render per-entry file-type icons
    #[arg(long)]
    icons: bool,

    /// Listing layout: "tiles" or "details"
    #[arg(long, value_name = "VIEW", default_value = "tiles")]
    view: View,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let absolute_root_dir = match fs::canonicalize(&args.root_dir).await {
        Ok(path) => path,
        Err(e) => {
            error!(
                "Failed to resolve root directory '{}': {}. Exiting.",
                args.root_dir.display(),
                e
            );
            eprintln!(
                "Error: Failed to resolve root directory '{}': {}",
                args.root_dir.display(),
                e
            );
            std::process::exit(1);
        }
    };

    if !absolute_root_dir.is_dir() {
        error!(
            "Root path '{}' is not a directory. Exiting.",
            absolute_root_dir.display()
        );
        eprintln!(
            "Error: Root path '{}' is not a directory.",
            absolute_root_dir.display()
        );
        std::process::exit(1);
    }

    info!(
        "Serving directory listings from: {}",
        absolute_root_dir.display()
    );
    info!("Listening on: {}", args.bind_addr);

    // Directory paths get a listing; everything else falls through to the
    // static-file service over the same root.
    let serve_index = ServeIndex::new(&absolute_root_dir)
        .show_hidden(args.hidden)
        .icons(args.icons)
        .view(args.view)
        .fallback(ServeDir::new(&absolute_root_dir));

    let cors = CorsLayer::new()
        .allow_methods([http::Method::GET, http::Method::HEAD])
        .allow_origin(Any);

    let app = Router::new()
        .fallback_service(serve_index)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = match tokio::net::TcpListener::bind(args.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to address {}: {}", args.bind_addr, e);
            eprintln!("Error: Failed to bind to address {}: {}", args.bind_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
