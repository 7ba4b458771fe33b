use anyhow::Context;
use cms_service::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;
    init_tracing(&config);

    let pool = create_pool(&config.database)
        .await
        .context("connecting to PostgreSQL")?;

    if config.database.run_migrations {
        run_migrations(&pool).await.context("running migrations")?;
    }

    let app = router::build(AppState::new(config.clone(), pool.clone()));
    Server::new(config).serve(app).await?;

    pool.close().await;
    tracing::info!("Database pool closed");
    Ok(())
}
