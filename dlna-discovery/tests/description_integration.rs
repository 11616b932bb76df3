//! Integration tests for device description fetch and resolution.
//!
//! These tests serve description documents from a local HTTP mock so the
//! fetch-then-resolve pipeline runs end-to-end without real devices on the
//! network.

use std::time::Duration;

use mockito::Server;
use rstest::rstest;

use dlna_discovery::{resolve_devices, DescriptionClient, DeviceClass};

fn media_server_xml(service_version: u8) -> String {
    format!(
        r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:MediaServer:1</deviceType>
    <friendlyName>Living Room NAS</friendlyName>
    <manufacturer>Synology</manufacturer>
    <UDN>uuid:4d696e69-444c-164e-9d41-001c42f0a410</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:ContentDirectory:{service_version}</serviceType>
        <controlURL>/ctl/ContentDir</controlURL>
      </service>
    </serviceList>
  </device>
</root>"#
    )
}

const ROUTER_XML: &str = r#"<?xml version="1.0"?>
<root xmlns="urn:schemas-upnp-org:device-1-0">
  <device>
    <deviceType>urn:schemas-upnp-org:device:InternetGatewayDevice:1</deviceType>
    <friendlyName>Router</friendlyName>
    <UDN>uuid:router-1</UDN>
    <serviceList>
      <service>
        <serviceType>urn:schemas-upnp-org:service:WANIPConnection:1</serviceType>
        <controlURL>/ctl/wan</controlURL>
      </service>
    </serviceList>
  </device>
</root>"#;

fn client() -> DescriptionClient {
    DescriptionClient::new(Duration::from_secs(3)).expect("Failed to build HTTP client")
}

/// Fetch a served description and resolve it; the relative control URL
/// must resolve against the description's own location.
#[test]
fn test_fetch_and_resolve_media_server() {
    let mut server = Server::new();
    let mock = server
        .mock("GET", "/rootDesc.xml")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(media_server_xml(1))
        .create();

    let location = format!("{}/rootDesc.xml", server.url());
    let xml = client().fetch(&location).expect("Fetch failed");
    let devices = resolve_devices(&xml, &location).expect("Resolution failed");

    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].udn, "uuid:4d696e69-444c-164e-9d41-001c42f0a410");
    assert_eq!(devices[0].friendly_name, "Living Room NAS");
    assert_eq!(devices[0].location, format!("{}/ctl/ContentDir", server.url()));
    assert_eq!(devices[0].class, DeviceClass::MediaServer);

    mock.assert();
}

/// Servers advertise different ContentDirectory versions; all resolve.
#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
fn test_service_version_is_irrelevant(#[case] version: u8) {
    let devices = resolve_devices(&media_server_xml(version), "http://10.0.0.5:80/desc.xml")
        .expect("Resolution failed");
    assert_eq!(devices.len(), 1);
}

/// A fetched description without a browsable service resolves to nothing.
#[test]
fn test_fetch_and_resolve_unsupported_device() {
    let mut server = Server::new();
    server
        .mock("GET", "/desc.xml")
        .with_status(200)
        .with_header("content-type", "text/xml")
        .with_body(ROUTER_XML)
        .create();

    let location = format!("{}/desc.xml", server.url());
    let xml = client().fetch(&location).expect("Fetch failed");
    let devices = resolve_devices(&xml, &location).expect("Resolution failed");

    assert!(devices.is_empty());
}

/// HTTP failures surface as errors from the fetch, never as panics.
#[test]
fn test_fetch_missing_document() {
    let mut server = Server::new();
    server.mock("GET", "/desc.xml").with_status(404).create();

    // A 404 still has a readable (empty) body; the description is fetched
    // but resolves to an error downstream
    let location = format!("{}/desc.xml", server.url());
    let xml = client().fetch(&location).expect("Fetch failed");
    assert!(resolve_devices(&xml, &location).is_err());
}

/// Connection-level failures are reported as errors.
#[test]
fn test_fetch_unreachable_host() {
    let result = client().fetch("http://127.0.0.1:1/desc.xml");
    assert!(result.is_err());
}
