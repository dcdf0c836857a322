#[tokio::main]
async fn main() -> std::io::Result<()> {
    flight_server::run_with_config().await
}
