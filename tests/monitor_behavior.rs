//! Monitor lifecycle scenarios: lookup policy, dial policy, and the live
//! read/publish loop against a stub receiver on a real socket.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::time::timeout;

use common::{RecordingPublisher, StaticLookup};
use micbridge::config::Config;
use micbridge::lookup::Device;
use micbridge::monitor::Monitor;
use micbridge::protocol::derive::HOURS_MINUTES_KEY;

fn test_config() -> Config {
    let mut config = Config::default();
    config.service.building = "BLDG".to_string();
    config.service.room = "101".to_string();
    config.service.system_id = "TEST-SYSTEM".to_string();
    config.lookup.retry_seconds = 0;
    config.receiver.dial_timeout_seconds = 1;
    config
}

#[tokio::test]
async fn ambiguous_lookup_reports_once_and_never_dials() {
    let lookup = StaticLookup::new(vec![
        Device {
            name: "RCV-A".to_string(),
            // Closed ports: a dial attempt would fail and produce a second
            // report, which the assertion below would catch.
            address: "127.0.0.1:9".to_string(),
        },
        Device {
            name: "RCV-B".to_string(),
            address: "127.0.0.1:9".to_string(),
        },
    ]);
    let publisher = RecordingPublisher::new();
    let monitor = Monitor::new(&test_config(), lookup, publisher.clone());

    timeout(Duration::from_secs(5), monitor.run())
        .await
        .expect("monitor should terminate on ambiguity")
        .expect("run");

    let errors = publisher.errors();
    assert_eq!(errors.len(), 1, "expected exactly one report, got {:?}", errors);
    let (identity, message) = &errors[0];
    assert_eq!(identity, "TEST-SYSTEM");
    assert!(
        message.contains("detected 2 receivers"),
        "unexpected report: {}",
        message
    );
    assert!(publisher.events().is_empty());
}

#[tokio::test]
async fn no_devices_is_a_silent_terminal_noop() {
    let lookup = StaticLookup::new(vec![]);
    let publisher = RecordingPublisher::new();
    let monitor = Monitor::new(&test_config(), lookup, publisher.clone());

    timeout(Duration::from_secs(5), monitor.run())
        .await
        .expect("monitor should terminate with no devices")
        .expect("run");

    assert!(publisher.errors().is_empty());
    assert!(publisher.events().is_empty());
}

#[tokio::test]
async fn transient_lookup_failures_are_retried() {
    let lookup = StaticLookup::failing_first(vec![], 2);
    let publisher = RecordingPublisher::new();
    let monitor = Monitor::new(&test_config(), lookup.clone(), publisher.clone());

    timeout(Duration::from_secs(5), monitor.run())
        .await
        .expect("monitor should terminate after retries resolve")
        .expect("run");

    assert_eq!(lookup.call_count(), 3, "two failures then one success");
    // Transient lookup faults are never escalated to the error transport.
    assert!(publisher.errors().is_empty());
}

#[tokio::test]
async fn dial_failure_reports_against_the_device_and_stops() {
    let lookup = StaticLookup::new(vec![Device {
        name: "RCV-1".to_string(),
        address: "127.0.0.1:9".to_string(), // discard port, nothing listens
    }]);
    let publisher = RecordingPublisher::new();
    let monitor = Monitor::new(&test_config(), lookup, publisher.clone());

    timeout(Duration::from_secs(5), monitor.run())
        .await
        .expect("monitor should terminate on dial failure")
        .expect("run");

    let errors = publisher.errors();
    assert_eq!(errors.len(), 1, "expected exactly one report, got {:?}", errors);
    let (identity, message) = &errors[0];
    assert_eq!(identity, "RCV-1");
    assert!(
        message.contains("could not connect to device"),
        "unexpected report: {}",
        message
    );
}

#[tokio::test]
async fn live_feed_publishes_events_in_wire_order() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("addr").to_string();

    // Stub receiver: one client, a burst of frames, then hold the socket
    // open so the monitor idles on the next read.
    let feeder = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        socket
            .write_all(
                b"REP 1 BATT 45 minutes>HEARTBEAT OK>REP 1 BATT 4 volts>REP 1 TX_PWR OFF>",
            )
            .await
            .expect("write frames");
        tokio::time::sleep(Duration::from_secs(60)).await;
    });

    let lookup = StaticLookup::new(vec![Device {
        name: "RCV-1".to_string(),
        address,
    }]);
    let publisher = RecordingPublisher::new();
    let monitor = Monitor::new(&test_config(), lookup, publisher.clone());
    let running = tokio::spawn(async move { monitor.run().await });

    timeout(Duration::from_secs(5), publisher.wait_for_events(4))
        .await
        .expect("expected 4 published events before timeout");

    let events = publisher.events();
    assert_eq!(events[0].key, "minutes");
    assert_eq!(events[0].value, "45");
    assert_eq!(events[0].device.device_id(), "BLDG-101-MIC1");

    assert_eq!(events[1].key, HOURS_MINUTES_KEY);
    assert_eq!(events[1].value, "0:45");

    assert_eq!(events[2].key, "battery level");
    assert_eq!(events[2].value, "4");

    assert_eq!(events[3].key, "power");
    assert_eq!(events[3].value, "OFF");

    // The malformed battery frame was reported but did not stop the loop.
    let errors = publisher.errors();
    assert_eq!(errors.len(), 1, "expected one extraction report, got {:?}", errors);
    assert!(errors[0].1.contains("problem reading receiver string"));

    running.abort();
    feeder.abort();
}
