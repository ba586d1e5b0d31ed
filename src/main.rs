use estimate_recon::{io, logging, router, AppConfig, AppState};
use std::path::Path;
use tower::ServiceBuilder;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置并初始化日志
    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);
    info!("Starting server with config: {:?}", config);

    // 构建引擎组件
    let state = AppState::new(&config)?;

    // 初始化价格目录
    if let Some(path) = &config.catalog.seed_observations {
        let observations = io::csv::read_observations(Path::new(path))?;
        let report = state.catalog.rebuild(&observations, &config.catalog.region).await?;
        info!(
            "Catalog seeded from {}: {} entries for '{}'",
            path, report.entries, report.region
        );
    } else {
        info!("No seed observations configured; catalog starts empty");
    }

    // 构建路由
    let app = router(state).layer(ServiceBuilder::new());

    // 启动服务
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/extract          - cell grids -> work items");
    info!("  POST /api/extract/xlsx     - xlsx upload -> work items");
    info!("  POST /api/verify           - contractor items -> verdict");
    info!("  POST /api/estimate         - requested works -> priced estimate");
    info!("  POST /api/catalog/rebuild  - observations -> catalog");
    info!("  GET  /api/catalog          - catalog entries by region");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
