use blog_api::{AppState, Config, Db, app};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    dotenvy::dotenv().ok();

    if let Err(e) = run().await {
        error!("Server failed: {:?}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env().map_err(|e| format!("{:?}", e))?;

    let db = match &config.db_path {
        Some(path) => Db::open(path).map_err(|e| format!("{:?}", e))?,
        None => Db::in_memory(),
    };

    if config.jwt_secret.is_some() {
        info!("Strict mode: writes require a signed bearer token");
    }

    let state = AppState::new(db, config.jwt_secret.clone());

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("JSON Server is running on http://{}", addr);
    info!("API Endpoints:");
    info!("  GET    /health           - Health check");
    info!("  POST   /login            - Login");
    info!("  GET    /users            - List users (?email=)");
    info!("  POST   /users            - Register");
    info!("  GET    /users/:id        - Get user");
    info!("  PUT    /users/:id        - Replace user");
    info!("  GET    /posts            - List posts (?userId=)");
    info!("  POST   /posts            - Create post");
    info!("  GET    /posts/:id        - Get post");
    info!("  PUT    /posts/:id        - Replace post");
    info!("  DELETE /posts/:id        - Delete post");

    axum::serve(listener, app(state)).await?;

    Ok(())
}
