//! WebSocket server for the sockline console client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin sockline-server
//! cargo run --bin sockline-server -- --host 0.0.0.0 --port 3000 --echo
//! ```

use clap::Parser;

use sockline_server::ui::Server;
use sockline_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "sockline-server")]
#[command(about = "WebSocket server with broadcast counters", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Echo plain text messages back to their sender
    #[arg(long)]
    echo: bool,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_CRATE_NAME"), "debug");

    let args = Args::parse();

    if let Err(e) = Server::new(args.echo).run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
