use log::error;
use santa_solver::config::Config;
use santa_solver::server;

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.log_filter.as_str())).init();

    if let Err(e) = server::run_server(config).await {
        error!("Server stopped: {}", e);
        std::process::exit(1);
    }
}
