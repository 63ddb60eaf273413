// ABOUTME: Parser for the engine CLI's textual port column.
// ABOUTME: Handles "0.0.0.0:8080->80/tcp, :::8080->80/tcp" style input.

use crate::model::{PortMapping, Protocol};

const DEFAULT_HOST_IP: &str = "0.0.0.0";

/// Parse a comma-separated port column into mappings.
///
/// Only published mappings (`host->container`) are returned. Exposed-only
/// entries, ranges and malformed segments are skipped.
pub fn parse_ports(input: &str) -> Vec<PortMapping> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|segment| {
            let parsed = parse_segment(segment);
            if parsed.is_none() {
                if segment.contains("->") {
                    tracing::warn!(segment, "dropping malformed port mapping");
                } else {
                    tracing::debug!(segment, "skipping unpublished port");
                }
            }
            parsed
        })
        .collect()
}

fn parse_segment(segment: &str) -> Option<PortMapping> {
    let (host, container) = segment.split_once("->")?;

    let (host_ip, host_port) = match host.rsplit_once(':') {
        Some((ip, port)) => (ip.trim_start_matches('[').trim_end_matches(']'), port),
        None => ("", host),
    };
    let host_port: u16 = host_port.trim().parse().ok()?;

    let (container_port, protocol) = match container.split_once('/') {
        Some((port, proto)) => (port, Protocol::parse(proto)?),
        None => (container, Protocol::Tcp),
    };
    let container_port: u16 = container_port.trim().parse().ok()?;

    let host_ip = if host_ip.trim().is_empty() {
        DEFAULT_HOST_IP
    } else {
        host_ip.trim()
    };

    Some(PortMapping {
        host_ip: Some(host_ip.to_string()),
        container_port,
        host_port: Some(host_port),
        protocol,
    })
}
