use zen_shop_api::{
    config::AppConfig,
    db::{MIGRATOR, create_pool, seed_demo_data},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env();

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    MIGRATOR.run(&pool).await?;

    seed_demo_data(&pool).await?;

    println!("Seed completed for {}", config.database_url);
    Ok(())
}
