use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use board_server::board::BoardRegistry;
use board_server::config::BoardConfig;
use board_server::schedule::{Backend, MockScheduleSource, ScheduleClient};
use board_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .init();

    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    // Mock data replaces the schedule endpoint entirely when configured.
    let (backend, stations) = match &config.mock_schedule_dir {
        Some(dir) => match MockScheduleSource::new(dir) {
            Ok(mock) => {
                let stations = mock.available_stations();
                info!(dir = %dir.display(), stations = stations.len(), "serving mock schedules");
                (Backend::Mock(mock), stations)
            }
            Err(e) => {
                error!(error = %e, "failed to load mock schedules");
                return ExitCode::FAILURE;
            }
        },
        None => match ScheduleClient::new(config.schedule.clone()) {
            Ok(client) => {
                info!(base_url = %config.schedule.base_url, "polling schedule endpoint");
                (Backend::Http(client), Vec::new())
            }
            Err(e) => {
                error!(error = %e, "failed to create schedule client");
                return ExitCode::FAILURE;
            }
        },
    };

    let boards = Arc::new(
        BoardRegistry::new(Arc::new(backend), config.board_settings())
            .with_idle_timeout(config.board_idle),
    );
    let reaper = boards.spawn_reaper();

    let state = AppState::new(boards.clone(), config.page_refresh_secs).with_stations(stations);
    let app = create_router(state, &config.static_dir);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.bind_addr, error = %e, "failed to bind");
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %config.bind_addr, "departure boards listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await;

    reaper.abort();
    boards.shutdown().await;

    match served {
        Ok(()) => {
            info!("shut down");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "server error");
            ExitCode::FAILURE
        }
    }
}
