use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

use crate::builder::TestbedMap;
use crate::verify;

/// One device description from an inventory file: a loosely-typed mapping of
/// field name to candidate value
pub type InventoryEntry = Map<String, Value>;

/// Load an inventory file: a JSON array of device objects
pub fn load_inventory(path: &Path) -> Result<Vec<InventoryEntry>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading inventory {}", path.display()))?;
    let entries: Vec<InventoryEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing inventory {}", path.display()))?;
    Ok(entries)
}

/// Apply every inventory entry to the map, committing one record per entry
pub fn build_from_inventory(map: &mut TestbedMap, entries: &[InventoryEntry]) -> Result<()> {
    for (idx, entry) in entries.iter().enumerate() {
        apply_entry(map, entry).with_context(|| format!("inventory entry {idx}"))?;
    }
    Ok(())
}

/// Stage one inventory entry and commit it.
///
/// `sid` is staged first and must be present and numeric; role tags must be
/// known. Every other field is staged best-effort: a value that fails its
/// validator is warned about and left unset, and an unrecognized field name
/// is skipped with a warning.
pub fn apply_entry(map: &mut TestbedMap, entry: &InventoryEntry) -> Result<()> {
    let Some(sid) = entry.get("sid") else {
        bail!("entry has no sid field");
    };
    map.set_sid(&scalar_to_string(sid))?;

    if let Some(role) = entry.get("role") {
        match role {
            Value::String(tag) => map.add_role(tag)?,
            Value::Array(tags) => {
                for tag in tags {
                    let Some(tag) = tag.as_str() else {
                        bail!("role entries must be strings, got {tag}");
                    };
                    map.add_role(tag)?;
                }
            }
            other => bail!("role must be a string or a list of strings, got {other}"),
        }
    }

    for (name, value) in entry {
        if name == "sid" || name == "role" {
            continue;
        }
        stage_field(map, name, value);
    }

    map.commit()?;
    Ok(())
}

/// String form of a scalar value: JSON strings unquoted, everything else in
/// its literal JSON rendering (so a numeric sid becomes its digit string)
fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Integer form of a value for the prefix-length setters. Non-integers map
/// to -1, which no mask validator accepts.
fn as_int(v: &Value) -> i64 {
    if verify::is_int(v) {
        v.as_i64().unwrap_or(-1)
    } else {
        -1
    }
}

/// Dispatch a single field assignment by name. Validation verdicts are
/// already surfaced by the setters; entries are best-effort past sid/role.
fn stage_field(map: &mut TestbedMap, name: &str, value: &Value) {
    let text = scalar_to_string(value);
    match name {
        "ansible_host" => {
            map.set_ansible_host(&text);
        }
        "contact" => {
            map.set_contact(&text);
        }
        "location" => {
            map.set_location(&text);
        }
        "hostname" => {
            map.set_hostname(&text);
        }
        "username" => {
            map.set_username(&text);
        }
        "password" => {
            map.set_password(&text);
        }
        "mgmt_ip" => {
            map.set_mgmt_ip(&text);
        }
        "mgmt_ip_prefixlen" => {
            map.set_mgmt_ip_prefixlen(as_int(value));
        }
        "mgmt_ipv6" => {
            map.set_mgmt_ipv6(&text);
        }
        "mgmt_ipv6_prefixlen" => {
            map.set_mgmt_ipv6_prefixlen(as_int(value));
        }
        "gateway" => {
            map.set_gateway(&text);
        }
        "nameserver" => {
            map.set_nameserver(&text);
        }
        "dns_server1" => {
            map.set_dns_server1(&text);
        }
        "dns_server2" => {
            map.set_dns_server2(&text);
        }
        "ntp_server1" => {
            map.set_ntp_server1(&text);
        }
        "ntp_server2" => {
            map.set_ntp_server2(&text);
        }
        "ts_ip1" => {
            map.set_ts_ip1(&text);
        }
        "ts_port1" => {
            map.set_ts_port1(&text);
        }
        "ts_ip2" => {
            map.set_ts_ip2(&text);
        }
        "ts_port2" => {
            map.set_ts_port2(&text);
        }
        "ts_password1" => {
            map.set_ts_password1(&text);
        }
        "ts_password2" => {
            map.set_ts_password2(&text);
        }
        // deprecated aliases; same slots as ts_ip/ts_port
        "console_ip1" => {
            map.set_console_ip1(&text);
        }
        "console_port1" => {
            map.set_console_port1(&text);
        }
        "console_ip2" => {
            map.set_console_ip2(&text);
        }
        "console_port2" => {
            map.set_console_port2(&text);
        }
        "apc_ip1" => {
            map.set_apc_ip1(&text);
        }
        "apc_ip2" => {
            map.set_apc_ip2(&text);
        }
        "apc_ip3" => {
            map.set_apc_ip3(&text);
        }
        "apc_ip4" => {
            map.set_apc_ip4(&text);
        }
        "apc_outlet1" => {
            map.set_apc_outlet1(&text);
        }
        "apc_outlet2" => {
            map.set_apc_outlet2(&text);
        }
        "apc_outlet3" => {
            map.set_apc_outlet3(&text);
        }
        "apc_outlet4" => {
            map.set_apc_outlet4(&text);
        }
        unknown => {
            tracing::warn!("Ignoring unrecognized field {unknown:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(v: Value) -> InventoryEntry {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_apply_entry_commits_record() {
        let mut map = TestbedMap::new();
        let e = entry(json!({
            "sid": 301,
            "hostname": "tor-301",
            "mgmt_ip": "172.29.167.208",
            "mgmt_ip_prefixlen": 24,
            "role": ["leaf", "vtep"],
            "ts_port1": "2033",
            "apc_outlet1": 23
        }));
        apply_entry(&mut map, &e).unwrap();

        let record = map.get(301).unwrap();
        assert_eq!(record.hostname.as_deref(), Some("tor-301"));
        assert_eq!(record.mgmt_ip.as_deref(), Some("172.29.167.208"));
        assert_eq!(record.mgmt_ip_prefixlen, Some(24));
        assert_eq!(record.role, vec!["leaf".to_string(), "vtep".to_string()]);
        assert_eq!(record.ts_port1.as_deref(), Some("2033"));
        assert_eq!(record.apc_outlet1, Some(23));
    }

    #[test]
    fn test_string_mask_is_rejected_as_non_integer() {
        let mut map = TestbedMap::new();
        let e = entry(json!({"sid": "301", "mgmt_ip_prefixlen": "24"}));
        apply_entry(&mut map, &e).unwrap();
        assert_eq!(map.get(301).unwrap().mgmt_ip_prefixlen, None);
    }

    #[test]
    fn test_missing_sid_is_fatal() {
        let mut map = TestbedMap::new();
        let e = entry(json!({"hostname": "tor-301"}));
        assert!(apply_entry(&mut map, &e).is_err());
        assert!(map.records().is_empty());
    }

    #[test]
    fn test_unknown_role_is_fatal() {
        let mut map = TestbedMap::new();
        let e = entry(json!({"sid": 301, "role": "not_a_role"}));
        assert!(apply_entry(&mut map, &e).is_err());
    }

    #[test]
    fn test_single_role_string_accepted() {
        let mut map = TestbedMap::new();
        let e = entry(json!({"sid": 301, "role": "spine"}));
        apply_entry(&mut map, &e).unwrap();
        assert_eq!(map.get(301).unwrap().role, vec!["spine".to_string()]);
    }

    #[test]
    fn test_unrecognized_field_is_skipped() {
        let mut map = TestbedMap::new();
        let e = entry(json!({"sid": 301, "flux_capacitance": "1.21"}));
        apply_entry(&mut map, &e).unwrap();
        assert!(map.get(301).is_some());
    }

    #[test]
    fn test_build_from_inventory() {
        let mut map = TestbedMap::new();
        let entries = vec![
            entry(json!({"sid": 301, "hostname": "tor-301"})),
            entry(json!({"sid": 102, "hostname": "spine-102", "role": "spine"})),
        ];
        build_from_inventory(&mut map, &entries).unwrap();
        assert_eq!(map.records().len(), 2);
    }
}
