use specmint::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    specmint::init_tracing();

    let config = AppConfig::load("dev")?;
    let addr: String = config.get_or("app.addr", "0.0.0.0:3000".to_string())?;

    tracing::info!(profile = config.profile(), "Starting users API");
    users_api::app(config)?.serve(&addr).await?;
    Ok(())
}
