//! UDP broadcast discovery of N4 devices.

use std::collections::HashMap;
use std::time::Duration;

use log::{info, warn};
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::error::KetraError;

const DISCOVERY_PORT: u16 = 4934;
const DISCOVERY_ATTEMPTS: u32 = 5;
const LISTEN_WINDOW: Duration = Duration::from_secs(1);

/// Discover an N4 device given its serial number.
///
/// Broadcasts a probe and listens for `key=value` replies, up to a bounded
/// number of attempts. Returns the address of the device whose `serial`
/// line matches.
pub async fn discover_n4_device(serial_number: &str) -> Result<String, KetraError> {
    info!("Discovering N4 with serial number {serial_number}");
    let socket = UdpSocket::bind(("0.0.0.0", 0)).await?;
    socket.set_broadcast(true)?;

    let mut buf = [0u8; 1024];
    for _ in 0..DISCOVERY_ATTEMPTS {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if let Err(e) = socket
            .send_to(b"*", ("255.255.255.255", DISCOVERY_PORT))
            .await
        {
            warn!("Failed to discover N4, socket error {e}");
            continue;
        }

        let deadline = Instant::now() + LISTEN_WINDOW;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match tokio::time::timeout(remaining, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, addr))) => {
                    let response = parse_discovery_reply(&buf[..len]);
                    if response.get("serial").map(String::as_str) == Some(serial_number) {
                        let address = addr.ip().to_string();
                        info!("Found N4 at address {address}");
                        return Ok(address);
                    }
                }
                Ok(Err(e)) => {
                    warn!("Failed to receive discovery reply: {e}");
                    break;
                }
                // listen window elapsed, try another broadcast
                Err(_) => break,
            }
        }
    }
    Err(KetraError::DeviceNotFound(serial_number.to_owned()))
}

/// Replies are lines of `key=value` pairs; lines without a `=` are dropped.
fn parse_discovery_reply(data: &[u8]) -> HashMap<String, String> {
    String::from_utf8_lossy(data)
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_owned(), value.trim().to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_lines_parse_into_a_map() {
        let reply = b"serial=KP00001485\nmodel=N4\nfirmware=1.2.3\n";
        let parsed = parse_discovery_reply(reply);
        assert_eq!(parsed.get("serial").unwrap(), "KP00001485");
        assert_eq!(parsed.get("model").unwrap(), "N4");
        assert_eq!(parsed.len(), 3);
    }

    #[test]
    fn garbage_lines_are_ignored() {
        let reply = b"hello\nserial = KP1 \n";
        let parsed = parse_discovery_reply(reply);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed.get("serial").unwrap(), "KP1");
    }
}
