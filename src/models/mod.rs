use serde::{Deserialize, Serialize};

/// Closed vocabulary of device role tags.
///
/// Downstream automation switches exhaustively on these, so an unknown tag
/// is a hard rejection rather than a best-effort coercion.
pub mod device_role {
    pub const ALL: &[&str] = &[
        "bgp_external",
        "bgw",
        "border_gateway",
        "core",
        "dc",
        "dci",
        "fanout",
        "labserver",
        "leaf",
        "mgmt",
        "pim_rp",
        "spine",
        "sspine",
        "super_spine",
        "termserver",
        "tgen",
        "tgen_core",
        "tgen_dc",
        "tgen_dci",
        "tgen_spine",
        "tgen_tier1",
        "tgen_tier2",
        "tgen_tor",
        "tier1",
        "tier2",
        "tier3",
        "tier4",
        "tor",
        "vpc_peer",
        "vtep",
    ];

    pub fn is_valid(role: &str) -> bool {
        ALL.contains(&role)
    }
}

/// DeviceRecord is the persisted descriptor for one testbed device, keyed
/// by switch ID in the testbed map. Every field except the key is optional;
/// absent fields are omitted from the serialized record, never written as
/// null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub sid: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ansible_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mgmt_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mgmt_ip_prefixlen: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mgmt_ipv6: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mgmt_ipv6_prefixlen: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    // Deprecated: use dns_server1/dns_server2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nameserver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_server1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_server2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntp_server1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ntp_server2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub role: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_ip1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_port1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_ip2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_port2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_password1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts_password2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apc_ip1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apc_ip2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apc_ip3: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apc_ip4: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apc_outlet1: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apc_outlet2: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apc_outlet3: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apc_outlet4: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_role_membership() {
        assert!(device_role::is_valid("leaf"));
        assert!(device_role::is_valid("vtep"));
        assert!(device_role::is_valid("tgen_tier2"));
        assert!(!device_role::is_valid("not_a_role"));
        assert!(!device_role::is_valid("Leaf"));
        assert!(!device_role::is_valid(""));
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let record = DeviceRecord {
            sid: 301,
            hostname: Some("tor-301".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["sid"], 301);
        assert_eq!(json["hostname"], "tor-301");
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("mgmt_ip"));
        assert!(!obj.contains_key("role"));
    }
}
