//! End-to-end reconciliation against mock Cloudflare and Telegram APIs.

use dns_failover::config::CloudflareConfig;
use dns_failover::dns::{CloudflareClient, DnsError, DnsRecordStore};
use dns_failover::failover::Outcome;
use dns_failover::lifecycle::build_with_prober;

mod common;

use common::{MockCloudflare, MockTelegram, ScriptedProber, CF_TOKEN, ZONE};

fn seed_zone(cf: &MockCloudflare) {
    cf.add_record(ZONE, "r1", "api.example.com", "A", "192.0.2.1");
    cf.add_record(ZONE, "r2", "www.example.com", "A", "198.51.100.7");
    cf.add_record(ZONE, "r3", "api.example.com", "AAAA", "2001:db8::1");
}

#[tokio::test]
async fn test_switch_then_revert_end_to_end() {
    let cf = MockCloudflare::new();
    seed_zone(&cf);
    let tg = MockTelegram::new();
    let cf_base = cf.start().await;
    let tg_base = tg.start().await;
    let dir = tempfile::tempdir().unwrap();

    let config = common::daemon_config(&cf_base, Some(&tg_base), dir.path());
    let prober = ScriptedProber::new();
    prober.set_latency("192.0.2.1", false);
    let daemon = build_with_prober(&config, &common::credentials(&config), prober.clone()).unwrap();

    // Two failures only warn.
    for _ in 0..2 {
        let report = daemon.reconciler.run_cycle().await;
        assert_eq!(report.names, 1);
        assert!(matches!(report.outcomes[..], [Outcome::Warning { .. }]));
    }
    assert!(cf.patches().is_empty());

    // Third failure switches to the next pool member.
    let report = daemon.reconciler.run_cycle().await;
    assert!(matches!(report.outcomes[..], [Outcome::Switched { .. }]));
    assert_eq!(report.active_failovers, 1);
    assert_eq!(cf.content("r1").as_deref(), Some("192.0.2.2"));
    assert_eq!(cf.content("r2").as_deref(), Some("198.51.100.7"));

    let state = daemon.store.get("api.example.com").unwrap();
    assert_eq!(state.original_endpoint.address.to_string(), "192.0.2.1");
    assert_eq!(state.active_endpoint.map(|e| e.address.to_string()).as_deref(), Some("192.0.2.2"));

    // Original recovers: the next cycle probes the alternate, then reverts.
    prober.set_latency("192.0.2.1", true);
    let report = daemon.reconciler.run_cycle().await;
    assert!(matches!(report.outcomes.last(), Some(Outcome::Reverted { checks: 3, .. })));
    assert_eq!(report.active_failovers, 0);
    assert_eq!(cf.content("r1").as_deref(), Some("192.0.2.1"));
    assert_eq!(
        cf.patches(),
        vec![
            ("r1".to_string(), "192.0.2.2".to_string()),
            ("r1".to_string(), "192.0.2.1".to_string()),
        ]
    );

    let state = daemon.store.get("api.example.com").unwrap();
    assert!(state.active_endpoint.is_none());
    assert!(state.restored);

    // Change batches go out before status batches, to the configured chat.
    let texts = tg.texts();
    assert!(texts.iter().any(|t| t.contains("switched to 192.0.2.2")));
    assert!(texts.iter().any(|t| t.contains("Reverted to original IP after 3 successful")));
    assert!(tg.messages().iter().all(|m| m.get("chat_id").map(String::as_str) == Some("42")));
    assert!(tg.messages().iter().all(|m| m.get("parse_mode").map(String::as_str) == Some("HTML")));
    let last_two = &texts[texts.len() - 2..];
    assert!(last_two[0].contains("Reverted"));
    assert!(last_two[1].contains("TCP: Success"));
}

#[tokio::test]
async fn test_state_survives_restart() {
    let cf = MockCloudflare::new();
    seed_zone(&cf);
    let cf_base = cf.start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::daemon_config(&cf_base, None, dir.path());
    let prober = ScriptedProber::new();
    prober.set_connectivity("192.0.2.1", false);

    {
        let daemon = build_with_prober(&config, &common::credentials(&config), prober.clone()).unwrap();
        daemon.reconciler.run_cycle().await;
        daemon.reconciler.run_cycle().await;
    }

    let daemon = build_with_prober(&config, &common::credentials(&config), prober.clone()).unwrap();
    let state = daemon.store.get("api.example.com").unwrap();
    assert_eq!(state.connectivity_failures, 2);
    assert_eq!(state.latency_failures, 0);

    let report = daemon.reconciler.run_cycle().await;
    assert!(matches!(report.outcomes[0], Outcome::Switched { .. }));
    assert_eq!(cf.content("r1").as_deref(), Some("192.0.2.2"));
}

#[tokio::test]
async fn test_upstream_failures_do_not_stop_the_cycle() {
    let cf = MockCloudflare::new();
    seed_zone(&cf);
    let tg = MockTelegram::new();
    let cf_base = cf.start().await;
    let tg_base = tg.start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = common::daemon_config(&cf_base, Some(&tg_base), dir.path());
    let prober = ScriptedProber::new();
    prober.set_latency("192.0.2.1", false);
    let daemon = build_with_prober(&config, &common::credentials(&config), prober).unwrap();

    tg.fail(true);
    cf.fail_patches(true);
    for _ in 0..3 {
        daemon.reconciler.run_cycle().await;
    }
    let state = daemon.store.get("api.example.com").unwrap();
    assert!(state.active_endpoint.is_none());
    assert_eq!(state.latency_failures, 3);
    assert_eq!(cf.content("r1").as_deref(), Some("192.0.2.1"));

    // Both upstreams back: the saturated counter switches immediately.
    tg.fail(false);
    cf.fail_patches(false);
    let report = daemon.reconciler.run_cycle().await;
    assert!(matches!(report.outcomes[..], [Outcome::Switched { .. }]));
    assert_eq!(cf.content("r1").as_deref(), Some("192.0.2.2"));
    assert_eq!(tg.texts().len(), 1);
}

#[tokio::test]
async fn test_cloudflare_listing_follows_pagination() {
    let cf = MockCloudflare::new();
    for i in 1..=5 {
        cf.add_record(ZONE, &format!("r{i}"), &format!("h{i}.example.com"), "A", &format!("192.0.2.{i}"));
    }
    cf.add_record(ZONE, "txt", "example.com", "TXT", "v=spf1 -all");
    cf.add_record("other-zone", "x1", "x.example.org", "A", "192.0.2.9");
    let base = cf.start().await;

    let config = CloudflareConfig {
        api_base: base,
        per_page: 2,
        ..CloudflareConfig::default()
    };
    let client = CloudflareClient::new(&config, CF_TOKEN).unwrap();

    let records = client.list_a_records(ZONE).await.unwrap();
    let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["h1.example.com", "h2.example.com", "h3.example.com", "h4.example.com", "h5.example.com"]
    );
    assert_eq!(cf.list_calls(), 3);
}

#[tokio::test]
async fn test_cloudflare_rejects_bad_token() {
    let cf = MockCloudflare::new();
    seed_zone(&cf);
    let base = cf.start().await;
    let config = CloudflareConfig {
        api_base: base,
        ..CloudflareConfig::default()
    };
    let client = CloudflareClient::new(&config, "wrong").unwrap();

    let err = client.list_a_records(ZONE).await.unwrap_err();
    assert!(matches!(err, DnsError::Status { status: 403, .. }));

    let err = client
        .set_a_record(ZONE, "r1", "api.example.com", "192.0.2.2".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DnsError::Status { status: 403, .. }));
    assert_eq!(cf.content("r1").as_deref(), Some("192.0.2.1"));
}

#[tokio::test]
async fn test_unknown_record_is_an_error() {
    let cf = MockCloudflare::new();
    let base = cf.start().await;
    let config = CloudflareConfig {
        api_base: base,
        ..CloudflareConfig::default()
    };
    let client = CloudflareClient::new(&config, CF_TOKEN).unwrap();

    let err = client
        .set_a_record(ZONE, "missing", "api.example.com", "192.0.2.2".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, DnsError::Status { status: 404, .. }));
}
