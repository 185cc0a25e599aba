use std::fs;
use std::path::{Path, PathBuf};

use portico_core::context::{Capabilities, PropertyContext};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::StoreResult;

const KIOSK_FILE: &str = "kiosk_property.json";
const LEGACY_FILE: &str = "property-storage.json";

/// Kiosk property configuration, written once at setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub property_id: String,
    pub organization_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kiosk_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_property_id: Option<String>,
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Raw property record from the listing endpoint, kept for display.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_property: Option<Value>,
}

impl PropertyConfig {
    pub fn context(&self) -> PropertyContext {
        PropertyContext {
            property_id: self.property_id.clone(),
            organization_id: self.organization_id.clone(),
            external_property_id: self.external_property_id.clone(),
        }
    }
}

/// File-backed property store with the legacy fallback chain.
///
/// Lookup order: kiosk file, then the legacy persisted UI store blob.
/// Malformed files are skipped with a warning, never fatal; all writes go
/// through [`PropertyStore::save`].
pub struct PropertyStore {
    dir: PathBuf,
}

impl PropertyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn save(&self, config: &PropertyConfig) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(KIOSK_FILE);
        fs::write(&path, serde_json::to_vec_pretty(config)?)?;
        tracing::info!(property_id = %config.property_id, "property configuration saved");
        Ok(())
    }

    pub fn load(&self) -> Option<PropertyConfig> {
        read_json(&self.dir.join(KIOSK_FILE)).and_then(|value| {
            match serde_json::from_value::<PropertyConfig>(value) {
                Ok(config) if !config.property_id.is_empty() => Some(config),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(error = %e, "malformed kiosk property file, skipping");
                    None
                }
            }
        })
    }

    /// The legacy UI shell persisted its selection as a wrapped state blob.
    fn load_legacy(&self) -> Option<PropertyContext> {
        let value = read_json(&self.dir.join(LEGACY_FILE))?;
        let selected = value.get("state")?.get("selectedProperty")?;

        let property_id = selected.get("id")?.as_str()?.to_string();
        let organization_id = selected.get("organizationId")?.as_str()?.to_string();
        if property_id.is_empty() || organization_id.is_empty() {
            return None;
        }

        Some(PropertyContext {
            property_id,
            organization_id,
            external_property_id: selected
                .get("externalId")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }

    /// Resolve the property context for a service call.
    ///
    /// `None` means the kiosk has no usable property selection and must be
    /// sent back through property setup.
    pub fn resolve_context(&self, explicit: Option<&PropertyContext>) -> Option<PropertyContext> {
        if let Some(ctx) = explicit {
            return Some(ctx.clone());
        }
        if let Some(config) = self.load() {
            return Some(config.context());
        }
        self.load_legacy()
    }

    /// Organization id for the property-listing call, falling back to the
    /// configured default when nothing is persisted.
    pub fn resolve_organization(&self, default_organization_id: &str) -> String {
        self.resolve_context(None)
            .map(|ctx| ctx.organization_id)
            .unwrap_or_else(|| default_organization_id.to_string())
    }

    pub fn capabilities(&self) -> Capabilities {
        self.load().map(|c| c.capabilities).unwrap_or_default()
    }
}

fn read_json(path: &Path) -> Option<Value> {
    let text = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable store file, skipping");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store() -> (TempDir, PropertyStore) {
        let dir = TempDir::new().unwrap();
        let store = PropertyStore::new(dir.path());
        (dir, store)
    }

    fn config() -> PropertyConfig {
        PropertyConfig {
            property_id: "PROP-A".to_string(),
            organization_id: "ORG-A".to_string(),
            kiosk_id: Some("KIOSK-1".to_string()),
            external_property_id: None,
            capabilities: Capabilities::default(),
            selected_property: None,
        }
    }

    #[test]
    fn test_kiosk_file_wins() {
        let (dir, store) = store();
        store.save(&config()).unwrap();
        fs::write(
            dir.path().join(LEGACY_FILE),
            json!({ "state": { "selectedProperty": { "id": "PROP-LEGACY", "organizationId": "ORG-L" } } })
                .to_string(),
        )
        .unwrap();

        let ctx = store.resolve_context(None).unwrap();
        assert_eq!(ctx.property_id, "PROP-A");
    }

    #[test]
    fn test_malformed_kiosk_file_falls_through_to_legacy() {
        let (dir, store) = store();
        fs::write(dir.path().join(KIOSK_FILE), "{not json").unwrap();
        fs::write(
            dir.path().join(LEGACY_FILE),
            json!({ "state": { "selectedProperty": { "id": "PROP-LEGACY", "organizationId": "ORG-L" } } })
                .to_string(),
        )
        .unwrap();

        let ctx = store.resolve_context(None).unwrap();
        assert_eq!(ctx.property_id, "PROP-LEGACY");
        assert_eq!(ctx.organization_id, "ORG-L");
    }

    #[test]
    fn test_empty_store_yields_default_organization() {
        let (_dir, store) = store();
        assert!(store.resolve_context(None).is_none());
        assert_eq!(store.resolve_organization("ORG-DEFAULT"), "ORG-DEFAULT");
    }

    #[test]
    fn test_explicit_context_wins_over_files() {
        let (_dir, store) = store();
        store.save(&config()).unwrap();

        let explicit = PropertyContext::new("PROP-X", "ORG-X");
        let ctx = store.resolve_context(Some(&explicit)).unwrap();
        assert_eq!(ctx.property_id, "PROP-X");
    }
}
