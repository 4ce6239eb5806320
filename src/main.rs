// region:    --- Imports
use axum::extract::DefaultBodyLimit;
use market_sync_service::config::Config;
use market_sync_service::handlers::{self, AppState};
use market_sync_service::market::Repositories;
use market_sync_service::storage::{InMemoryStore, PostgresStore, SharedStore};
use market_sync_service::sync::{EventConsumer, EventLog, SyncLoop};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 설정 로드
    let config = Config::from_env()?;

    // 저장소 선택
    let store: SharedStore = match &config.database_url {
        Some(database_url) => {
            let postgres = PostgresStore::connect(database_url, config.max_connections).await?;
            if let Err(e) = postgres.initialize_database().await {
                error!("{:<12} --> 데이터베이스 초기화 실패: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> 데이터베이스 초기화 성공", "Main");
            Arc::new(postgres)
        }
        None => {
            warn!(
                "{:<12} --> DATABASE_URL 없음, 메모리 저장소 사용",
                "Main"
            );
            Arc::new(InMemoryStore::new())
        }
    };

    let repos = Repositories::new(Arc::clone(&store));

    // 변경 피드 소비 시작
    let events = EventLog::default();
    let event_consumer = EventConsumer::new(&repos.feed, events.clone());
    tokio::spawn(event_consumer.start());

    // 원장 동기화 루프 시작
    let sync = SyncLoop::new(Arc::clone(&store), config.sync_interval).start();
    let state = AppState::new(repos, sync.subscribe(), events);

    // 테스트 페이지를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // 라우터 설정
    let routes_all = handlers::routes(state)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행
    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    sync.stop();
    Ok(())
}
// endregion: --- Main
