//! Parser for the INFO stats payload

use vigil_cache_core::StoreInfo;

/// Extract the health-relevant fields from a raw INFO response.
///
/// INFO is line-oriented `field:value` text with `# Section` headers and
/// CRLF line endings. Unknown fields are ignored.
pub(crate) fn parse_info(raw: &str) -> StoreInfo {
    let mut info = StoreInfo::default();

    for line in raw.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((field, value)) = line.split_once(':') else {
            continue;
        };
        match field {
            "redis_version" => info.version = Some(value.to_string()),
            "uptime_in_seconds" => info.uptime_secs = value.parse().ok(),
            "connected_clients" => info.connected_clients = value.parse().ok(),
            "used_memory" => info.used_memory_bytes = value.parse().ok(),
            "keyspace_hits" => info.keyspace_hits = value.parse().ok(),
            "keyspace_misses" => info.keyspace_misses = value.parse().ok(),
            _ => {}
        }
    }

    info
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# Server\r\n\
        redis_version:7.2.4\r\n\
        uptime_in_seconds:86400\r\n\
        \r\n\
        # Clients\r\n\
        connected_clients:3\r\n\
        \r\n\
        # Memory\r\n\
        used_memory:1048576\r\n\
        used_memory_human:1.00M\r\n\
        \r\n\
        # Stats\r\n\
        keyspace_hits:900\r\n\
        keyspace_misses:100\r\n";

    #[test]
    fn test_parses_selected_fields() {
        let info = parse_info(SAMPLE);
        assert_eq!(info.version.as_deref(), Some("7.2.4"));
        assert_eq!(info.uptime_secs, Some(86400));
        assert_eq!(info.connected_clients, Some(3));
        assert_eq!(info.used_memory_bytes, Some(1_048_576));
        assert_eq!(info.keyspace_hits, Some(900));
        assert_eq!(info.keyspace_misses, Some(100));
        assert!((info.hit_ratio().unwrap() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_garbage_lines_are_ignored() {
        let info = parse_info("nonsense\r\nuptime_in_seconds:notanumber\r\n");
        assert_eq!(info, StoreInfo::default());
    }
}
