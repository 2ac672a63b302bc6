// /proc/net/tcp parsing: listening ports and established connections.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use crate::models::ConnectionStat;

const STATE_ESTABLISHED: u8 = 0x01;
const STATE_LISTEN: u8 = 0x0A;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpEntry {
    pub local_addr: String,
    pub local_port: u16,
    pub remote_addr: String,
    pub state: u8,
}

/// Parse the IPv4 socket table format of /proc/net/tcp. Unparseable lines
/// are skipped; the kernel writes this file, so a bad line is noise, not an
/// error worth failing the sample over.
pub fn parse_tcp_table(content: &str) -> Vec<TcpEntry> {
    let mut entries = Vec::new();
    for line in content.lines().skip(1) {
        let mut fields = line.split_whitespace();
        let _sl = fields.next();
        let (Some(local), Some(remote), Some(state_hex)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        let (Some((local_addr, local_port)), Some((remote_addr, remote_port))) =
            (parse_hex_addr(local), parse_hex_addr(remote))
        else {
            continue;
        };
        let Ok(state) = u8::from_str_radix(state_hex, 16) else {
            continue;
        };
        entries.push(TcpEntry {
            local_addr: format!("{}:{}", local_addr, local_port),
            local_port,
            remote_addr: format!("{}:{}", remote_addr, remote_port),
            state,
        });
    }
    entries
}

/// Split parsed entries into (listening ports, established connections).
pub fn summarize(entries: &[TcpEntry]) -> (Vec<u16>, Vec<ConnectionStat>) {
    let open_ports: BTreeSet<u16> = entries
        .iter()
        .filter(|e| e.state == STATE_LISTEN)
        .map(|e| e.local_port)
        .collect();
    let connections: Vec<ConnectionStat> = entries
        .iter()
        .filter(|e| e.state == STATE_ESTABLISHED)
        .map(|e| ConnectionStat {
            local_addr: e.local_addr.clone(),
            remote_addr: Some(e.remote_addr.clone()),
            state: "established".into(),
        })
        .collect();
    (open_ports.into_iter().collect(), connections)
}

/// Decode "0100007F:0CEA" into ("127.0.0.1", 3306-style port). The address
/// half is a little-endian hex u32.
fn parse_hex_addr(s: &str) -> Option<(String, u16)> {
    let (addr_hex, port_hex) = s.split_once(':')?;
    if addr_hex.len() != 8 {
        return None;
    }
    let raw = u32::from_str_radix(addr_hex, 16).ok()?;
    let port = u16::from_str_radix(port_hex, 16).ok()?;
    let ip = Ipv4Addr::from(raw.swap_bytes());
    Some((ip.to_string(), port))
}
