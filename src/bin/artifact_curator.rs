use argh::FromArgs;
use artifact_curator::{Config, GeminiClient, Session, server};
use std::sync::Arc;

// defaults for the server
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;

#[derive(FromArgs)]
/// Describe historical artifacts from an uploaded image and/or a prompt.
struct CuratorArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: CuratorArgs = argh::from_env();

    // a missing key stops the process before the listener binds
    let config = Config::from_env().inspect_err(|e| log::error!("{e}"))?;
    log::info!("Using model {}", config.model);

    let session = Arc::new(Session::new(GeminiClient::new(config)));
    let app = server::router(session);

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    log::info!("🏺 Starting the artifact curator");
    log::info!("🔥 Listening on: http://{}", addr);
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
