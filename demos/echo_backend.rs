//! Tiny TCP echo server for trying the balancer by hand.
//!
//! ```text
//! cargo run --example echo_backend -- --port 9001
//! cargo run --example echo_backend -- --port 9002
//! cargo run
//! ```

use clap::Parser;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    #[arg(short, long, default_value_t = 9001)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let listener = TcpListener::bind(("127.0.0.1", args.port)).await?;
    tracing::info!(port = args.port, "Echo backend listening");

    loop {
        let (mut socket, peer) = listener.accept().await?;
        tokio::spawn(async move {
            let (mut rd, mut wr) = socket.split();
            match tokio::io::copy(&mut rd, &mut wr).await {
                Ok(bytes) => tracing::info!(peer_addr = %peer, bytes, "Echoed"),
                Err(e) => tracing::warn!(peer_addr = %peer, error = %e, "Echo failed"),
            }
            let _ = wr.shutdown().await;
        });
    }
}
