use store_server::{Config, Server, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() {
    print_banner();

    // .env 仅开发环境存在，缺失时静默跳过
    let _ = dotenv::dotenv();

    let config = Config::from_env();

    let log_dir = config.log_dir();
    let _ = std::fs::create_dir_all(&log_dir);
    init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        log_dir.to_str(),
    );

    tracing::info!(
        environment = %config.environment,
        port = config.http_port,
        "Starting store server"
    );

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!(error = %e, "Server exited with error");
        std::process::exit(1);
    }
}
