use std::path::PathBuf;

use gcmp_core::Environment;
use gcmp_engine::StageState;
use gcmp_sources::SnapshotSource;

use super::*;

fn config() -> AppConfig {
    AppConfig {
        env: Environment::Test,
        log_level: "info".to_string(),
        api_base_url: None,
        snapshot_path: PathBuf::from("./config/demo.yaml"),
        request_timeout_secs: 30,
        user_agent: "gcmp-test/0.1".to_string(),
        max_retries: 0,
        retry_backoff_base_ms: 0,
        search_radius_km: 10.0,
        search_limit: 20,
        store_display_limit: 6,
        match_policy: MatchPolicy::FallbackToCatalog,
    }
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["gcmp"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_stores_command() {
    let cli = Cli::try_parse_from(["gcmp", "stores", "M5V 3A8"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Stores {
            ref postal_code,
            radius_km: None,
            limit: None,
        }) if postal_code == "M5V 3A8"
    ));
}

#[test]
fn parses_stores_with_radius_and_limit() {
    let cli = Cli::try_parse_from([
        "gcmp",
        "stores",
        "K1A0B1",
        "--radius-km",
        "25",
        "--limit",
        "3",
    ])
    .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Stores {
            radius_km: Some(r),
            limit: Some(3),
            ..
        }) if (r - 25.0).abs() < f64::EPSILON
    ));
}

#[test]
fn parses_search_with_postal_and_strict() {
    let cli = Cli::try_parse_from(["gcmp", "search", "milk", "--postal", "M5V 3A8", "--strict"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Search {
            ref query,
            postal: Some(ref p),
            strict: true,
        }) if query == "milk" && p == "M5V 3A8"
    ));
}

#[test]
fn parses_compare_command() {
    let cli = Cli::try_parse_from(["gcmp", "compare", "milk_organic_valley_1l"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Compare { ref product_id, postal: None }) if product_id == "milk_organic_valley_1l"
    ));
}

#[test]
fn shop_pick_defaults_to_first_result() {
    let cli =
        Cli::try_parse_from(["gcmp", "shop", "M5V 3A8", "milk"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Shop { pick: 1, .. })));
}

#[test]
fn shop_requires_query() {
    assert!(Cli::try_parse_from(["gcmp", "shop", "M5V 3A8"]).is_err());
}

#[test]
fn radius_override_is_capped() {
    let mut config = config();
    let command = Commands::Stores {
        postal_code: "M5V 3A8".to_string(),
        radius_km: Some(120.0),
        limit: Some(2),
    };
    apply_overrides(&mut config, &command).expect("valid overrides");
    assert!((config.search_radius_km - MAX_SEARCH_RADIUS_KM).abs() < f64::EPSILON);
    assert_eq!(config.store_display_limit, 2);
}

#[test]
fn non_positive_radius_is_rejected() {
    let mut config = config();
    let command = Commands::Stores {
        postal_code: "M5V 3A8".to_string(),
        radius_km: Some(0.0),
        limit: None,
    };
    assert!(apply_overrides(&mut config, &command).is_err());
}

#[test]
fn strict_flag_sets_match_policy() {
    let mut config = config();
    let command = Commands::Search {
        query: "milk".to_string(),
        postal: None,
        strict: true,
    };
    apply_overrides(&mut config, &command).expect("valid overrides");
    assert_eq!(config.match_policy, MatchPolicy::Strict);
}

fn strict_demo_session() -> (Arc<Backend>, commands::Session) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/demo.yaml");
    let snapshot = gcmp_core::load_snapshot(&path).expect("demo snapshot should load");
    let backend = Arc::new(Backend::Snapshot(SnapshotSource::new(snapshot)));
    let session = ComparisonSession::with_options(
        Arc::clone(&backend),
        Arc::clone(&backend),
        Arc::clone(&backend),
        SessionOptions {
            match_policy: MatchPolicy::Strict,
        },
    );
    (backend, session)
}

#[tokio::test]
async fn compare_resolves_product_by_id_under_strict_policy() {
    let (backend, session) = strict_demo_session();

    let product = commands::resolve_product(&session, &backend, "milk_lactantia_2l").await;

    assert_eq!(product.name, "Lactantia 2% Milk 2L");
    assert_eq!(product.brand.as_deref(), Some("Lactantia"));
    let view = session.view();
    assert_eq!(view.search.state, StageState::NotStarted);
    assert!(view.message.is_none());
}

#[tokio::test]
async fn compare_falls_back_to_bare_product_for_unknown_id() {
    let (backend, session) = strict_demo_session();

    let product = commands::resolve_product(&session, &backend, "caviar_beluga").await;

    assert_eq!(product.id, "caviar_beluga");
    assert_eq!(product.name, "caviar_beluga");
    assert!(product.best_price.is_none());
}
