// Source tests: socket table parsing, filesystem watch sampling, neighbor
// table parsing.

use hostwatch::discovery::parse_arp_table;
use hostwatch::sources::proc_net::{parse_tcp_table, summarize};
use hostwatch::sources::{Fragment, FsWatchSource, MetricSource, SourceError};

const TCP_TABLE: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 0100007F:0CEA 00000000:0000 0A 00000000:00000000 00:00000000 00000000   993        0 12345 1 0000000000000000 100 0 0 10 0
   1: 0B01A8C0:C350 05010A0A:01BB 01 00000000:00000000 00:00000000 00000000  1000        0 12346 1 0000000000000000 20 4 30 10 -1
   2: garbage line that cannot parse
   3: 00000000:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 12347 1 0000000000000000 100 0 0 10 0
";

#[test]
fn test_parse_tcp_table_decodes_addresses_and_states() {
    let entries = parse_tcp_table(TCP_TABLE);
    assert_eq!(entries.len(), 3, "unparseable line skipped");
    assert_eq!(entries[0].local_addr, "127.0.0.1:3306");
    assert_eq!(entries[0].state, 0x0A);
    assert_eq!(entries[1].local_addr, "192.168.1.11:50000");
    assert_eq!(entries[1].remote_addr, "10.10.1.5:443");
    assert_eq!(entries[1].state, 0x01);
}

#[test]
fn test_summarize_splits_listeners_and_connections() {
    let (open_ports, connections) = summarize(&parse_tcp_table(TCP_TABLE));
    assert_eq!(open_ports, vec![3306, 8080]);
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0].remote_addr.as_deref(), Some("10.10.1.5:443"));
    assert_eq!(connections[0].state, "established");
}

const ARP_TABLE: &str = "IP address       HW type     Flags       HW address            Mask     Device
192.168.1.1      0x1         0x2         a4:2b:b0:c9:2e:40     *        eth0
192.168.1.50     0x1         0x0         00:00:00:00:00:00     *        eth0
192.168.1.7      0x1         0x2         08:00:27:53:8b:dc     *        eth0
192.168.1.7      0x1         0x2         08:00:27:53:8b:dc     *        wlan0
";

#[test]
fn test_parse_arp_table_keeps_complete_unique_entries() {
    let peers = parse_arp_table(ARP_TABLE);
    assert_eq!(peers.len(), 2, "incomplete and duplicate entries dropped");
    assert_eq!(peers[0].address, "192.168.1.1");
    assert_eq!(peers[0].identifier, "a4:2b:b0:c9:2e:40");
    assert_eq!(peers[1].address, "192.168.1.7");
}

#[tokio::test]
async fn test_fswatch_samples_tracked_files() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.conf"), b"one").unwrap();
    std::fs::write(dir.path().join("b.conf"), b"two").unwrap();
    std::fs::create_dir(dir.path().join("subdir")).unwrap();

    let source = FsWatchSource::new(&[dir.path().to_string_lossy().into_owned()]);
    let Fragment::Filesystem(fragment) = source.sample().await.unwrap() else {
        panic!("fswatch must yield a filesystem fragment");
    };
    assert_eq!(fragment.mtimes.len(), 2, "directories are not tracked");
    assert!(fragment.mtimes.keys().any(|k| k.ends_with("a.conf")));
    assert!(fragment.mtimes.values().all(|mtime| *mtime > 0));
}

#[tokio::test]
async fn test_fswatch_missing_roots_is_structural() {
    let source = FsWatchSource::new(&["/nonexistent/hostwatch-test".into()]);
    match source.sample().await {
        Err(SourceError::Unsupported(_)) => {}
        other => panic!("expected Unsupported, got {:?}", other.map(|f| f.kind())),
    }
}

#[tokio::test]
async fn test_fswatch_no_roots_yields_empty_fragment() {
    let source = FsWatchSource::new(&[]);
    let Fragment::Filesystem(fragment) = source.sample().await.unwrap() else {
        panic!("fswatch must yield a filesystem fragment");
    };
    assert!(fragment.mtimes.is_empty());
}
