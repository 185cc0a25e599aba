use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use portico_api::{app, AppState, Sessions};
use portico_core::pricing::PricingConfig;
use portico_flow::{FlowRules, FlowServices, PollConfig};
use portico_hardware::{CardHardware, HardwareClient, MockHardware};
use portico_pms::{MockFallback, MockPms, PmsApi, PmsClient, PmsHttpClient};
use portico_store::{app_config::Config, AuthStore, LanguageStore, PropertyStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portico_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!("Starting Portico kiosk gateway on port {}", config.server.port);

    let data_dir = config.kiosk.data_dir.clone();
    let property_store = Arc::new(PropertyStore::new(&data_dir));
    let language_store = Arc::new(LanguageStore::new(&data_dir));
    let auth_store = Arc::new(AuthStore::new(&data_dir));

    let (pms, http): (Arc<dyn PmsApi>, Option<Arc<PmsHttpClient>>) = if config.pms.mock_only {
        tracing::warn!("running fully mocked, no PMS backend will be contacted");
        (Arc::new(MockPms::new()), None)
    } else {
        let hook_store = auth_store.clone();
        let http = Arc::new(
            PmsHttpClient::new(
                &config.pms.base_url,
                Duration::from_secs(config.pms.timeout_seconds),
            )?
            .with_unauthorized_hook(move || {
                if let Err(e) = hook_store.clear() {
                    tracing::warn!(error = %e, "failed to drop persisted token");
                }
            }),
        );
        if let Some(token) = auth_store.get() {
            http.set_token(token).await;
        }

        let client = Arc::new(PmsClient::new(http.clone()));
        let pms: Arc<dyn PmsApi> = if config.pms.mock_fallback {
            Arc::new(MockFallback::new(client))
        } else {
            client
        };
        (pms, Some(http))
    };

    let hardware: Arc<dyn CardHardware> = if config.hardware.mock {
        Arc::new(MockHardware::new())
    } else {
        Arc::new(HardwareClient::new(
            &config.hardware.base_url,
            Duration::from_secs(config.hardware.timeout_seconds),
        )?)
    };

    let rules = FlowRules {
        pricing: PricingConfig {
            estimated_tax_rate: config.kiosk.estimated_tax_rate,
            fixed_fees: config.kiosk.fixed_fees,
        },
        payment_poll: PollConfig {
            interval: Duration::from_millis(config.kiosk.payment_poll_interval_ms),
            timeout: Duration::from_millis(config.kiosk.payment_poll_timeout_ms),
        },
        dispense_stage_delay: Duration::from_millis(config.kiosk.dispense_stage_delay_ms),
    };

    let state = AppState {
        services: Arc::new(FlowServices {
            pms,
            hardware,
            rules,
        }),
        property_store,
        language_store,
        auth_store,
        sessions: Arc::new(Sessions::default()),
        default_organization_id: config.kiosk.default_organization_id.clone(),
        http,
    };

    let idle_timeout = Duration::from_secs(config.kiosk.session_idle_timeout_seconds);
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            let evicted = sessions.evict_idle(idle_timeout).await;
            if evicted > 0 {
                tracing::info!(evicted, "dropped abandoned flow sessions");
            }
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}
