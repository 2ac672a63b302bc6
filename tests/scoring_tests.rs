// Target scorer tests: rule arithmetic over snapshot + peers.

mod common;

use std::collections::BTreeMap;

use hostwatch::config::ScoringConfig;
use hostwatch::consumers::scoring::TargetScorer;
use hostwatch::discovery::Peer;

fn peers() -> Vec<Peer> {
    vec![
        Peer {
            address: "192.168.1.7".into(),
            identifier: "08:00:27:53:8b:dc".into(),
        },
        Peer {
            address: "192.168.1.9".into(),
            identifier: "a4:2b:b0:c9:2e:40".into(),
        },
    ]
}

fn config(installed: &[(&str, &str)], latest: &[(&str, &str)]) -> ScoringConfig {
    ScoringConfig {
        installed_versions: installed
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        latest_versions: latest
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        ..ScoringConfig::default()
    }
}

#[test]
fn test_outdated_software_and_headroom_each_add_points() {
    let scorer = TargetScorer::new(&config(
        &[("python3", "3.10.1"), ("bash", "5.2.21")],
        &[("python3", "3.12.0"), ("bash", "5.2.21")],
    ));
    // cpu 10% < 70 and mem 20% < 80: both headroom rules fire
    let snapshot = common::system_snapshot(1000, Some(10.0), Some(20.0), Some(30.0));
    let targets = scorer.score(&snapshot, &peers());
    assert_eq!(targets.len(), 2);
    // one outdated package (20) + cpu headroom (20) + mem headroom (20)
    assert!(targets.iter().all(|t| t.score == 60));
    assert_eq!(targets[0].outdated.len(), 1);
    assert!(targets[0].outdated[0].contains("python3"));
}

#[test]
fn test_busy_host_earns_no_headroom_points() {
    let scorer = TargetScorer::new(&config(
        &[("python3", "3.10.1")],
        &[("python3", "3.12.0")],
    ));
    let snapshot = common::system_snapshot(1000, Some(95.0), Some(95.0), Some(30.0));
    let targets = scorer.score(&snapshot, &peers());
    assert!(targets.iter().all(|t| t.score == 20));
}

#[test]
fn test_zero_scoring_peers_are_dropped() {
    let scorer = TargetScorer::new(&config(&[], &[]));
    let snapshot = common::system_snapshot(1000, Some(95.0), Some(95.0), Some(30.0));
    assert!(scorer.score(&snapshot, &peers()).is_empty());
}

#[test]
fn test_unavailable_readings_earn_no_points() {
    let scorer = TargetScorer::new(&config(&[], &[]));
    // cpu unavailable must not count as "low usage"
    let snapshot = common::system_snapshot(1000, None, Some(20.0), Some(30.0));
    let targets = scorer.score(&snapshot, &peers());
    assert!(targets.iter().all(|t| t.score == 20), "mem headroom only");
}

#[test]
fn test_up_to_date_software_is_not_outdated() {
    let scorer = TargetScorer::new(&config(
        &[("bash", "5.2.21")],
        &[("bash", "5.2.21")],
    ));
    let snapshot = common::system_snapshot(1000, Some(95.0), Some(95.0), Some(30.0));
    assert!(scorer.score(&snapshot, &peers()).is_empty());
}
