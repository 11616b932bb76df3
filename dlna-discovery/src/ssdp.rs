//! SSDP (Simple Service Discovery Protocol) socket for device presence
//!
//! This module provides the internal SSDP socket used by the discovery
//! listener. It binds the standard SSDP port, joins the multicast group so
//! NOTIFY announcements are received, and also carries outgoing M-SEARCH
//! requests whose unicast responses arrive on the same socket. It is not
//! part of the public API.

use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use crate::error::{DiscoveryError, Result};
use crate::DiscoveryEvent;

const SSDP_MULTICAST_ADDR: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
const SSDP_PORT: u16 = 1900;

/// SSDP socket bound to the multicast group
pub(crate) struct SsdpSocket {
    socket: UdpSocket,
}

impl SsdpSocket {
    /// Bind the SSDP port, join the multicast group, and arm a read timeout
    /// so the receive loop can observe shutdown requests.
    pub fn new(read_timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, SSDP_PORT))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind SSDP port: {}", e)))?;

        socket
            .join_multicast_v4(&SSDP_MULTICAST_ADDR, &Ipv4Addr::UNSPECIFIED)
            .map_err(|e| {
                DiscoveryError::NetworkError(format!("Failed to join multicast group: {}", e))
            })?;

        socket
            .set_read_timeout(Some(read_timeout))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set read timeout: {}", e)))?;

        socket
            .set_multicast_loop_v4(true)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast loop: {}", e)))?;

        Ok(Self { socket })
    }

    /// Send an M-SEARCH request for the given search target
    pub fn search(&self, search_target: &str, mx: u32) -> Result<()> {
        let request = format!(
            "M-SEARCH * HTTP/1.1\r\n\
             HOST: {}:{}\r\n\
             MAN: \"ssdp:discover\"\r\n\
             MX: {}\r\n\
             ST: {}\r\n\
             USER-AGENT: dlna-sdk/1.0 UPnP/1.0\r\n\
             \r\n",
            SSDP_MULTICAST_ADDR,
            SSDP_PORT,
            mx.max(1),
            search_target
        );

        let addr = SocketAddr::from((SSDP_MULTICAST_ADDR, SSDP_PORT));
        self.socket
            .send_to(request.as_bytes(), addr)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to send M-SEARCH: {}", e)))?;

        Ok(())
    }

    /// Receive one datagram and parse it into a discovery event.
    ///
    /// Returns `Ok(None)` for datagrams that are not of interest (other
    /// control points' M-SEARCH traffic, unparseable payloads) and for
    /// read timeouts, so the caller's loop stays simple.
    pub fn recv_event(&self, buf: &mut [u8]) -> std::io::Result<Option<DiscoveryEvent>> {
        match self.socket.recv_from(buf) {
            Ok((size, _)) => {
                let Ok(text) = std::str::from_utf8(&buf[..size]) else {
                    return Ok(None);
                };
                Ok(parse_datagram(text))
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Parse an SSDP datagram into a discovery event
fn parse_datagram(text: &str) -> Option<DiscoveryEvent> {
    let first_line = text.lines().next()?.trim().to_ascii_uppercase();

    if first_line.starts_with("HTTP/") && first_line.contains(" 200 ") {
        // Unicast response to our M-SEARCH
        let location = find_header(text, "LOCATION:")?;
        return Some(DiscoveryEvent::Alive { location });
    }

    if first_line.starts_with("NOTIFY ") {
        let nts = find_header(text, "NTS:")?.to_ascii_lowercase();
        if nts == "ssdp:alive" {
            let location = find_header(text, "LOCATION:")?;
            return Some(DiscoveryEvent::Alive { location });
        }
        if nts == "ssdp:byebye" {
            let usn = find_header(text, "USN:")?;
            return Some(DiscoveryEvent::ByeBye {
                udn: udn_from_usn(&usn),
            });
        }
    }

    None
}

fn find_header(text: &str, header: &str) -> Option<String> {
    text.lines()
        .find_map(|line| extract_header_value(line.trim(), header))
}

/// Extract header value from a line like "HEADER: value"
fn extract_header_value(line: &str, header: &str) -> Option<String> {
    if line.len() > header.len() && line[..header.len()].eq_ignore_ascii_case(header) {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}

/// The UDN is the USN up to the first "::" separator, e.g.
/// "uuid:abc::urn:schemas-upnp-org:device:MediaServer:1" -> "uuid:abc"
fn udn_from_usn(usn: &str) -> String {
    match usn.find("::") {
        Some(pos) => usn[..pos].to_string(),
        None => usn.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let response = "HTTP/1.1 200 OK\r\n\
            CACHE-CONTROL: max-age=1800\r\n\
            LOCATION: http://192.168.1.50:8200/rootDesc.xml\r\n\
            ST: urn:schemas-upnp-org:device:MediaServer:1\r\n\
            USN: uuid:4d696e69-444c::urn:schemas-upnp-org:device:MediaServer:1\r\n\
            \r\n";

        assert_eq!(
            parse_datagram(response),
            Some(DiscoveryEvent::Alive {
                location: "http://192.168.1.50:8200/rootDesc.xml".to_string()
            })
        );
    }

    #[test]
    fn test_parse_notify_alive() {
        let notify = "NOTIFY * HTTP/1.1\r\n\
            HOST: 239.255.255.250:1900\r\n\
            NT: urn:schemas-upnp-org:device:MediaServer:1\r\n\
            NTS: ssdp:alive\r\n\
            LOCATION: http://10.0.0.5:80/desc.xml\r\n\
            USN: uuid:abc::urn:schemas-upnp-org:device:MediaServer:1\r\n\
            \r\n";

        assert_eq!(
            parse_datagram(notify),
            Some(DiscoveryEvent::Alive {
                location: "http://10.0.0.5:80/desc.xml".to_string()
            })
        );
    }

    #[test]
    fn test_parse_notify_byebye() {
        let notify = "NOTIFY * HTTP/1.1\r\n\
            HOST: 239.255.255.250:1900\r\n\
            NT: urn:schemas-upnp-org:device:MediaServer:1\r\n\
            NTS: ssdp:byebye\r\n\
            USN: uuid:abc::urn:schemas-upnp-org:device:MediaServer:1\r\n\
            \r\n";

        assert_eq!(
            parse_datagram(notify),
            Some(DiscoveryEvent::ByeBye {
                udn: "uuid:abc".to_string()
            })
        );
    }

    #[test]
    fn test_parse_notify_alive_missing_location() {
        let notify = "NOTIFY * HTTP/1.1\r\n\
            NT: urn:schemas-upnp-org:device:MediaServer:1\r\n\
            NTS: ssdp:alive\r\n\
            USN: uuid:abc\r\n\
            \r\n";

        assert_eq!(parse_datagram(notify), None);
    }

    #[test]
    fn test_parse_msearch_from_other_control_point() {
        let msearch = "M-SEARCH * HTTP/1.1\r\n\
            HOST: 239.255.255.250:1900\r\n\
            MAN: \"ssdp:discover\"\r\n\
            ST: ssdp:all\r\n\
            \r\n";

        assert_eq!(parse_datagram(msearch), None);
    }

    #[test]
    fn test_parse_headers_case_insensitive() {
        let response = "HTTP/1.1 200 OK\r\n\
            location: http://192.168.1.50:8200/rootDesc.xml\r\n\
            st: urn:schemas-upnp-org:device:MediaServer:1\r\n\
            usn: uuid:x\r\n\
            \r\n";

        assert_eq!(
            parse_datagram(response),
            Some(DiscoveryEvent::Alive {
                location: "http://192.168.1.50:8200/rootDesc.xml".to_string()
            })
        );
    }

    #[test]
    fn test_udn_from_usn() {
        assert_eq!(
            udn_from_usn("uuid:abc::urn:schemas-upnp-org:device:MediaServer:1"),
            "uuid:abc"
        );
        assert_eq!(udn_from_usn("uuid:abc"), "uuid:abc");
    }

    #[test]
    fn test_extract_header_value() {
        assert_eq!(
            extract_header_value("LOCATION: http://example.com", "LOCATION:"),
            Some("http://example.com".to_string())
        );
        assert_eq!(extract_header_value("OTHER: value", "LOCATION:"), None);
        assert_eq!(extract_header_value("LOCATION:", "LOCATION:"), None);
    }
}
