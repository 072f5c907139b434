//! Interactive WebSocket console client.
//!
//! Connects to a WebSocket endpoint, prints every message it receives, and
//! sends each line typed at the prompt. Type `q` (or the `--quit` line) to quit.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin sockline-client
//! cargo run --bin sockline-client -- --url ws://127.0.0.1:3000/socket
//! ```

use clap::Parser;

use sockline_client::{ClientConfig, config};
use sockline_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "sockline-client")]
#[command(about = "Interactive WebSocket console client", long_about = None)]
struct Args {
    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = config::DEFAULT_URL)]
    url: String,

    /// Input line that ends the session (matched exactly)
    #[arg(short = 'q', long = "quit", default_value = config::DEFAULT_QUIT_SENTINEL)]
    quit_sentinel: String,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        ClientConfig::new(args.url).with_quit_sentinel(args.quit_sentinel)
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_CRATE_NAME"), "info");

    let args = Args::parse();

    // Run the client
    // The session has already printed the error
    if sockline_client::run_client(args.into()).await.is_err() {
        std::process::exit(1);
    }
}
