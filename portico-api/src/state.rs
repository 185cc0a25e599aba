use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use portico_core::context::{Capabilities, PropertyContext};
use portico_flow::{CheckInFlow, FlowServices, LostCardFlow, ReservationFlow};
use portico_store::{AuthStore, LanguageStore, PropertyStore};
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use crate::error::AppError;

struct Entry<F> {
    flow: Arc<Mutex<F>>,
    touched: Instant,
}

/// In-memory flow sessions, keyed by UUID. One guest, one session.
///
/// Sessions end on `finish` or an explicit delete from the shell, but a
/// kiosk runs unattended and guests walk away mid-wizard; a periodic
/// [`Sessions::evict_idle`] sweep drops anything untouched past the
/// configured idle bound. Every accessor refreshes the touch timestamp.
#[derive(Default)]
pub struct Sessions {
    checkin: RwLock<HashMap<Uuid, Entry<CheckInFlow>>>,
    reservation: RwLock<HashMap<Uuid, Entry<ReservationFlow>>>,
    lostcard: RwLock<HashMap<Uuid, Entry<LostCardFlow>>>,
}

macro_rules! session_accessors {
    ($get:ident, $insert:ident, $remove:ident, $field:ident, $flow:ty) => {
        pub async fn $get(&self, id: &Uuid) -> Result<Arc<Mutex<$flow>>, AppError> {
            let mut map = self.$field.write().await;
            match map.get_mut(id) {
                Some(entry) => {
                    entry.touched = Instant::now();
                    Ok(entry.flow.clone())
                }
                None => Err(AppError::SessionNotFound),
            }
        }

        pub async fn $insert(&self, flow: $flow) -> Uuid {
            let id = flow.id;
            self.$field.write().await.insert(
                id,
                Entry {
                    flow: Arc::new(Mutex::new(flow)),
                    touched: Instant::now(),
                },
            );
            id
        }

        pub async fn $remove(&self, id: &Uuid) -> Option<Arc<Mutex<$flow>>> {
            self.$field.write().await.remove(id).map(|e| e.flow)
        }
    };
}

async fn sweep<F>(map: &RwLock<HashMap<Uuid, Entry<F>>>, idle_after: Duration) -> usize {
    let mut map = map.write().await;
    let before = map.len();
    map.retain(|_, entry| entry.touched.elapsed() < idle_after);
    before - map.len()
}

impl Sessions {
    session_accessors!(checkin_get, checkin_insert, checkin_remove, checkin, CheckInFlow);
    session_accessors!(
        reservation_get,
        reservation_insert,
        reservation_remove,
        reservation,
        ReservationFlow
    );
    session_accessors!(lostcard_get, lostcard_insert, lostcard_remove, lostcard, LostCardFlow);

    /// Drop every session idle for longer than `idle_after`. Returns how
    /// many sessions were evicted.
    pub async fn evict_idle(&self, idle_after: Duration) -> usize {
        sweep(&self.checkin, idle_after).await
            + sweep(&self.reservation, idle_after).await
            + sweep(&self.lostcard, idle_after).await
    }
}

#[derive(Clone)]
pub struct AppState {
    pub services: Arc<FlowServices>,
    pub property_store: Arc<PropertyStore>,
    pub language_store: Arc<LanguageStore>,
    pub auth_store: Arc<AuthStore>,
    pub sessions: Arc<Sessions>,
    pub default_organization_id: String,
    /// Live HTTP client handle for token provisioning; absent when the
    /// kiosk runs fully mocked.
    pub http: Option<Arc<portico_pms::PmsHttpClient>>,
}

impl AppState {
    /// The property context every kiosk call runs under. No usable
    /// selection means the shell is redirected to property setup.
    pub fn property_context(&self) -> Result<PropertyContext, AppError> {
        self.property_store
            .resolve_context(None)
            .ok_or(AppError::PropertyNotConfigured)
    }

    pub fn capabilities(&self) -> Capabilities {
        self.property_store.capabilities()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDLE_BOUND: Duration = Duration::from_secs(30 * 60);

    fn flow() -> CheckInFlow {
        CheckInFlow::start(
            PropertyContext::new("PROP1", "ORG1"),
            &Capabilities::default(),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_sessions_are_evicted() {
        let sessions = Sessions::default();
        let id = sessions.checkin_insert(flow()).await;

        tokio::time::advance(IDLE_BOUND + Duration::from_secs(1)).await;
        assert_eq!(sessions.evict_idle(IDLE_BOUND).await, 1);
        assert!(sessions.checkin_get(&id).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_active_sessions_survive_the_sweep() {
        let sessions = Sessions::default();
        let older = sessions.checkin_insert(flow()).await;

        tokio::time::advance(Duration::from_secs(20 * 60)).await;
        let newer = sessions.checkin_insert(flow()).await;
        // Reading a session counts as activity.
        sessions.checkin_get(&older).await.unwrap();

        tokio::time::advance(Duration::from_secs(15 * 60)).await;
        assert_eq!(sessions.evict_idle(IDLE_BOUND).await, 0);
        assert!(sessions.checkin_get(&older).await.is_ok());
        assert!(sessions.checkin_get(&newer).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_eviction_spans_all_flow_kinds() {
        let sessions = Sessions::default();
        sessions.checkin_insert(flow()).await;
        let lost = LostCardFlow::start(
            PropertyContext::new("PROP1", "ORG1"),
            &Capabilities::default(),
        )
        .unwrap();
        sessions.lostcard_insert(lost).await;

        tokio::time::advance(IDLE_BOUND + Duration::from_secs(1)).await;
        assert_eq!(sessions.evict_idle(IDLE_BOUND).await, 2);
    }
}
