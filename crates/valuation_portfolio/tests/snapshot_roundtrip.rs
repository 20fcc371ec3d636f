//! Snapshot persistence.

use tempfile::tempdir;
use valuation_core::types::SiteId;
use valuation_models::{Site, SiteType};
use valuation_portfolio::reference::site_ids;
use valuation_portfolio::{valuate, ConfigSnapshot, PortfolioState, ShareParams};

fn edited_state() -> PortfolioState {
    PortfolioState::reference()
        .with_site_added(Site::with_defaults(
            "new-cloud",
            "New IREN Cloud Site",
            SiteType::IrenCloud,
        ))
        .and_then(|s| s.with_site_toggled(&SiteId::new(site_ids::SWEETWATER_2)))
        .and_then(|s| s.with_gpu_type_added("h200", 30_000.0, 2.4))
        .map(|s| {
            s.with_share_params(ShareParams {
                use_direct_shares: true,
                direct_shares: 500.0,
                ..ShareParams::default()
            })
        })
        .expect("edits apply")
}

#[test]
fn test_state_survives_file_round_trip() {
    let dir = tempdir().expect("temp dir");
    let path = dir.path().join("portfolio.json");

    let state = edited_state();
    ConfigSnapshot::from(&state).save(&path).expect("save");
    let restored = ConfigSnapshot::load(&path)
        .and_then(ConfigSnapshot::into_state)
        .expect("load");

    assert_eq!(restored, state);
    assert_eq!(valuate(&restored), valuate(&state));
}

#[test]
fn test_json_uses_site_type_names() {
    let json = ConfigSnapshot::from(&PortfolioState::reference())
        .to_json_pretty()
        .expect("serialise");
    assert!(json.contains("\"type\": \"IREN Cloud\""));
    assert!(json.contains("\"type\": \"Hyperscaler IaaS\""));
    assert!(json.contains("\"selectedScenario\": \"2026-h18-sw1\""));
    assert!(json.contains("\"gpuHourlyRates\""));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempdir().expect("temp dir");
    let result = ConfigSnapshot::load(dir.path().join("absent.json"));
    assert!(matches!(result, Err(valuation_portfolio::SnapshotError::Io(_))));
}
