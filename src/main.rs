#[tokio::main]
async fn main() {
    if let Err(e) = game_reviews_be::start_server().await {
        tracing::error!("Server failed: {}", e);
        eprintln!("Server failed: {e}");
        std::process::exit(1);
    }
}
