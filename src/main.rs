use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use glucose_relay::{
    AppState,
    cache::GlucoseStore,
    config::Config,
    librelink::{GlucoseFetcher, LibreLinkClient},
    nightscout::NightscoutUploader,
    router, scheduler,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    // 厂商接口客户端
    let client =
        LibreLinkClient::new(config.vendor.clone()).expect("Failed to build vendor HTTP client");
    if config.vendor.proxy.is_some() {
        tracing::info!("Routing vendor requests through configured proxy");
    }

    // 设置应用状态
    let store = Arc::new(GlucoseStore::new());
    let state = AppState::new(config.clone(), store.clone());

    // 启动定时轮询
    let mut fetcher = GlucoseFetcher::new(client, store);
    if let Some(nightscout) = &config.nightscout {
        let uploader =
            NightscoutUploader::new(nightscout).expect("Failed to build Nightscout HTTP client");
        tracing::info!("Uploading readings to Nightscout at {}", nightscout.url);
        fetcher = fetcher.with_uploader(uploader);
    }
    let _poller = scheduler::spawn(fetcher, config.poll_interval());

    let app = router::create_router(state);

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Failed to start server");
}
