//! Contract Test: Authority Construction
//!
//! Constraints verified:
//! - Both clients exist and share one session
//! - The session is released exactly once, through any handle
//! - Missing required keys fail with their message, logged once
//! - No plugin escapes a failed client build

mod common;

use common::*;
use janitor_core::channel::{Channel, ChannelRef};
use janitor_core::plugins::{AuthorityBuilder, Plugin, get_authority};
use janitor_core::traits::same_session;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn authority_clients_share_one_session() {
    let (logs, _guard) = LogCapture::install();
    let factory = MockClientFactory::new();
    let rrsets: ChannelRef = Channel::shared();

    let plugin = get_authority(&authority_config(), Arc::clone(&rrsets), &factory)
        .expect("authority builds");

    assert!(Arc::ptr_eq(plugin.rrset_channel(), &rrsets));
    assert_eq!(plugin.dns_zone(), "example.com.");
    assert_eq!(plugin.cleanup_timeout(), Duration::from_secs(60));
    assert!(same_session(plugin.crm_client().session(), plugin.gce_client().session()));
    assert!(same_session(plugin.session(), plugin.crm_client().session()));

    // one physical session
    assert_eq!(factory.sessions.lock().unwrap().len(), 1);
    assert!(logs.errors().is_empty());
}

#[tokio::test]
async fn closing_one_client_session_releases_shared_session() {
    let factory = MockClientFactory::new();
    let plugin = AuthorityBuilder::new(&authority_config(), Channel::shared(), &factory)
        .build()
        .expect("authority builds");

    assert!(plugin.crm_client().session().close().await);
    assert!(plugin.gce_client().session().is_closed());
    assert!(!plugin.close().await);

    let session = Arc::clone(&factory.sessions.lock().unwrap()[0]);
    assert_eq!(session.releases(), 1);
}

#[tokio::test]
async fn plugin_close_releases_once() {
    let factory = MockClientFactory::new();
    let plugin = get_authority(&authority_config(), Channel::shared(), &factory)
        .expect("authority builds");

    assert!(plugin.close().await);
    assert!(!plugin.close().await);
    assert!(plugin.session().is_closed());

    let session = Arc::clone(&factory.sessions.lock().unwrap()[0]);
    assert_eq!(session.releases(), 1);
}

#[test]
fn missing_required_keys_raise_config_error() {
    let cases = [
        ("keyfile", "The path to a Service Account JSON keyfile is required "),
        ("dns_zone", "The absolute DNS zone, i.e. \"example.com.\", is required "),
    ];

    for (key, exp_msg) in cases {
        let (logs, _guard) = LogCapture::install();
        let factory = MockClientFactory::new();

        let err = get_authority(&authority_config().without(key), Channel::shared(), &factory)
            .expect_err("construction fails");

        assert!(err.is_config());
        assert!(err.to_string().starts_with(exp_msg), "{key}: {err}");
        assert!(factory.sessions.lock().unwrap().is_empty());
        assert_eq!(logs.errors().len(), 1, "{key}");
    }
}

#[test]
fn client_failure_returns_no_plugin() {
    let (logs, _guard) = LogCapture::install();
    let factory = MockClientFactory::new().failing_clients();

    let result = get_authority(&authority_config(), Channel::shared(), &factory);

    assert!(result.is_err());
    assert_eq!(factory.calls(), 1);
    assert_eq!(logs.errors().len(), 1);
}
