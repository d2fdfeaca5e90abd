//! End-to-end status polls against an in-memory daemon.

use assert_matches::assert_matches;
use serde_json::json;

use mn_status::test_utils::{MockDaemon, outpoint};
use mn_status::{Error, Mode, Network, Outcome, StatusEngine, StatusRecord};

const LEGACY_ROW: &str = "ENABLED 70208 XpjStRH8SgA6PjgebtPZqCa9y7hLXP767n 1508859148 \
                          5432 1508857640 761839 52.14.1.1:9999";

fn legacy_vin(c: char, index: u32) -> String {
    format!("CTxIn(COutPoint({}, {}), scriptSig=)", c.to_string().repeat(64), index)
}

/// A synced mainnet daemon whose masternode reports `status` for the
/// collateral `aa..aa-1`, listed with `row`.
fn daemon(status: &str, row: &str) -> MockDaemon {
    let vin = outpoint('a', 1);
    MockDaemon::new()
        .with_governance_info(10, 16616)
        .with_sync(true)
        .with_chain("main")
        .with_reply("masternode status", json!({ "vin": legacy_vin('a', 1), "status": status }))
        .with_reply(&format!("masternodelist full {}", vin), json!({ vin: row }))
}

fn report(outcome: Outcome) -> StatusRecord {
    match outcome {
        Outcome::Reported(record) => record,
        other => panic!("expected a report, got {:?}", other),
    }
}

#[test]
fn test_started_and_enabled_is_healthy() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW);
    let record = report(StatusEngine::new(&rpc).run(Mode::Full).unwrap());

    let report = record.report().unwrap();
    assert_eq!(report.status_ok, 1.0);
    assert_eq!(report.vin.as_deref(), Some(outpoint('a', 1).as_str()));
    assert_eq!(report.queue_status, "ENABLED");
    assert_eq!(report.network, Network::Mainnet);

    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["status_message"], "Masternode successfully started");
    assert_eq!(value["network"], "mainnet");
}

#[test]
fn test_structured_outpoint_is_used() {
    let vin = outpoint('b', 0);
    let rpc = MockDaemon::new()
        .with_governance_info(10, 16616)
        .with_chain("main")
        .with_reply(
            "masternode status",
            json!({
                "outpoint": vin,
                "service": "52.14.1.1:9999",
                "status": "Masternode successfully started",
            }),
        )
        .with_reply(
            &format!("masternodelist full {}", vin),
            json!({ vin.clone(): "ENABLED XpjStRH8SgA6PjgebtPZqCa9y7hLXP767n 0 0 52.14.1.1:9999" }),
        );

    let record = report(StatusEngine::new(&rpc).run(Mode::StatusOnly).unwrap());
    assert_eq!(record.report().unwrap().vin.as_deref(), Some(vin.as_str()));
    assert_eq!(record.status_ok(), 1.0);
}

#[test]
fn test_null_collateral_reports_no_vin() {
    let sentinel = format!("CTxIn(COutPoint({}, 4294967295), coinbase )", "0".repeat(64));
    let rpc = MockDaemon::new()
        .with_governance_info(10, 16616)
        .with_chain("main")
        .with_reply(
            "masternode status",
            json!({ "vin": sentinel, "status": "Not capable masternode: Hot node, waiting for remote activation." }),
        );

    let record = report(StatusEngine::new(&rpc).run(Mode::StatusOnly).unwrap());
    let report = record.report().unwrap();
    assert_eq!(report.vin, None);
    assert_eq!(report.queue_status, "");
    assert_eq!(report.status_ok, 0.0);
    assert!(rpc.calls().iter().all(|call| !call.starts_with("masternodelist")));
}

#[test]
fn test_started_but_pre_enabled_is_unhealthy() {
    let row = LEGACY_ROW.replacen("ENABLED", "PRE_ENABLED", 1);
    let rpc = daemon("Masternode successfully started", &row);
    let record = report(StatusEngine::new(&rpc).run(Mode::Full).unwrap());
    assert_eq!(record.report().unwrap().queue_status, "PRE_ENABLED");
    assert_eq!(record.status_ok(), 0.0);
}

#[test]
fn test_enabled_but_not_started_is_unhealthy() {
    let rpc = daemon("Ready", LEGACY_ROW);
    let record = report(StatusEngine::new(&rpc).run(Mode::Full).unwrap());
    assert_eq!(record.report().unwrap().queue_status, "ENABLED");
    assert_eq!(record.status_ok(), 0.0);
}

#[test]
fn test_vin_missing_from_list_gives_empty_queue_status() {
    let rpc = MockDaemon::new()
        .with_governance_info(10, 16616)
        .with_chain("main")
        .with_reply(
            "masternode status",
            json!({ "vin": legacy_vin('c', 3), "status": "Masternode successfully started" }),
        )
        .with_reply(&format!("masternodelist full {}", outpoint('c', 3)), json!({}));

    let record = report(StatusEngine::new(&rpc).run(Mode::StatusOnly).unwrap());
    assert_eq!(record.report().unwrap().queue_status, "");
    assert_eq!(record.status_ok(), 0.0);
}

#[test]
fn test_daemon_error_after_probe_gives_empty_record() {
    let rpc = MockDaemon::new()
        .with_governance_info(10, 16616)
        .with_sync(true)
        .with_rpc_error("masternode status", -32603, "This is not a masternode");

    let record = report(StatusEngine::new(&rpc).run(Mode::Full).unwrap());
    assert!(record.is_empty());
    assert_eq!(serde_json::to_string(&record).unwrap(), "{}");
}

#[test]
fn test_transport_failure_mid_poll_is_returned() {
    let rpc = MockDaemon::new()
        .with_governance_info(10, 16616)
        .with_transport_error("masternode status");

    let result = StatusEngine::new(&rpc).run(Mode::StatusOnly);
    assert_matches!(result, Err(Error::Rpc(ref e)) if e.is_transport());
}

#[test]
fn test_probe_failure_is_connect_error() {
    let rpc = MockDaemon::new().with_transport_error("getgovernanceinfo");

    let err = StatusEngine::new(&rpc).run(Mode::Full).unwrap_err();
    assert_matches!(err, Error::Connect(_));
    assert!(err.to_string().starts_with("Cannot connect to dashd."));
    assert_eq!(rpc.calls(), vec!["getgovernanceinfo"]);
}

#[test]
fn test_probe_rejected_by_daemon_is_connect_error() {
    let rpc = MockDaemon::new().with_rpc_error("getgovernanceinfo", -28, "Loading block index...");
    assert_matches!(StatusEngine::new(&rpc).run(Mode::StatusOnly), Err(Error::Connect(_)));
}

#[test]
fn test_unsynced_daemon_stops_full_poll() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW).with_sync(false);

    let outcome = StatusEngine::new(&rpc).run(Mode::Full).unwrap();
    assert_matches!(outcome, Outcome::Unsynced(ref state) if !state.is_synced());
    assert_eq!(rpc.call_count("masternode status"), 0);
}

#[test]
fn test_status_only_skips_sync_gate() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW).with_sync(false);

    let record = report(StatusEngine::new(&rpc).run(Mode::StatusOnly).unwrap());
    assert_eq!(record.status_ok(), 1.0);
    assert_eq!(rpc.call_count("mnsync status"), 0);
}

#[test]
fn test_testnet_label() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW).with_chain("test");
    let record = report(StatusEngine::new(&rpc).run(Mode::Full).unwrap());
    assert_eq!(record.network(), Some(Network::Testnet));
    assert_eq!(serde_json::to_value(&record).unwrap()["network"], "testnet");
}

#[test]
fn test_poll_call_sequence() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW);
    StatusEngine::new(&rpc).run(Mode::Full).unwrap();

    assert_eq!(
        rpc.calls(),
        vec![
            "getgovernanceinfo".to_string(),
            "mnsync status".to_string(),
            "masternode status".to_string(),
            format!("masternodelist full {}", outpoint('a', 1)),
            "getblockchaininfo".to_string(),
        ]
    );
}

#[test]
fn test_is_masternode() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW);
    assert!(StatusEngine::new(&rpc).is_masternode().unwrap());

    let rpc = MockDaemon::new().with_rpc_error("masternode status", -32603, "not a masternode");
    assert!(!StatusEngine::new(&rpc).is_masternode().unwrap());

    let rpc = MockDaemon::new().with_transport_error("masternode status");
    assert_matches!(StatusEngine::new(&rpc).is_masternode(), Err(Error::Rpc(_)));
}

#[test]
fn test_current_block_hash() {
    let hash = "00000000000000112e41e4b3afda8b233b8cc07c532d2eac5de097b68358c43e";
    let rpc = MockDaemon::new()
        .with_reply("getblockcount", json!(761839))
        .with_reply("getblockhash 761839", json!(hash));
    assert_eq!(StatusEngine::new(&rpc).current_block_hash().unwrap(), hash);
}

#[test]
fn test_malformed_vin_reports_null_but_current_vin_fails() {
    let rpc = MockDaemon::new()
        .with_governance_info(10, 16616)
        .with_chain("main")
        .with_reply(
            "masternode status",
            json!({ "vin": "CTxIn(garbage)", "status": "Masternode successfully started" }),
        );

    let record = report(StatusEngine::new(&rpc).run(Mode::StatusOnly).unwrap());
    assert_eq!(record.report().unwrap().vin, None);
    assert_eq!(record.status_ok(), 0.0);

    assert_matches!(StatusEngine::new(&rpc).current_vin(), Err(Error::Parse(_)));
}

#[test]
fn test_sync_state_error_in_full_mode_gives_empty_record() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW).with_rpc_error(
        "mnsync status",
        -32603,
        "internal error",
    );

    let record = report(StatusEngine::new(&rpc).run(Mode::Full).unwrap());
    assert!(record.is_empty());
    assert_eq!(rpc.call_count("masternode status"), 0);
}

#[test]
fn test_sync_state_transport_failure_is_returned() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW)
        .with_transport_error("mnsync status");

    let result = StatusEngine::new(&rpc).run(Mode::Full);
    assert_matches!(result, Err(Error::Rpc(ref e)) if e.is_transport());
}

#[test]
fn test_masternode_list_error_gives_empty_record() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW).with_rpc_error(
        &format!("masternodelist full {}", outpoint('a', 1)),
        -32603,
        "internal error",
    );

    let record = report(StatusEngine::new(&rpc).run(Mode::Full).unwrap());
    assert!(record.is_empty());
}

#[test]
fn test_blockchain_info_error_gives_empty_record() {
    let rpc = daemon("Masternode successfully started", LEGACY_ROW).with_rpc_error(
        "getblockchaininfo",
        -32603,
        "internal error",
    );

    let record = report(StatusEngine::new(&rpc).run(Mode::Full).unwrap());
    assert!(record.is_empty());
    assert_eq!(record.status_ok(), 0.0);
}

#[test]
fn test_connect_seeds_governance_snapshot() {
    let rpc = MockDaemon::new()
        .with_governance_info(10, 16616)
        .with_reply("masternode count enabled", json!(120))
        .with_reply("getblockcount", json!(20000));

    let governance = StatusEngine::new(&rpc).connect().unwrap();
    assert_eq!(governance.governance_quorum().unwrap(), 12);
    assert_eq!(governance.current_last_superblock_height().unwrap(), 16616);
    assert_eq!(governance.current_next_superblock_height().unwrap(), 33232);
    assert_eq!(rpc.call_count("getgovernanceinfo"), 1);
}
