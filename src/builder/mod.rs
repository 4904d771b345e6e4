use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::models::{device_role, DeviceRecord};
use crate::verify;

/// Staged field values for the device currently being described.
/// `None` is the unset sentinel: either never assigned, or assigned a value
/// that failed validation.
#[derive(Debug, Default)]
struct Draft {
    sid: Option<u32>,
    ansible_host: Option<String>,
    contact: Option<String>,
    location: Option<String>,
    hostname: Option<String>,
    mgmt_ip: Option<String>,
    mgmt_ip_prefixlen: Option<u8>,
    mgmt_ipv6: Option<String>,
    mgmt_ipv6_prefixlen: Option<u8>,
    gateway: Option<String>,
    nameserver: Option<String>,
    dns_server1: Option<String>,
    dns_server2: Option<String>,
    ntp_server1: Option<String>,
    ntp_server2: Option<String>,
    username: Option<String>,
    password: Option<String>,
    role: BTreeSet<String>,
    ts_ip1: Option<String>,
    ts_port1: Option<String>,
    ts_ip2: Option<String>,
    ts_port2: Option<String>,
    ts_password1: Option<String>,
    ts_password2: Option<String>,
    apc_ip1: Option<String>,
    apc_ip2: Option<String>,
    apc_ip3: Option<String>,
    apc_ip4: Option<String>,
    apc_outlet1: Option<u32>,
    apc_outlet2: Option<u32>,
    apc_outlet3: Option<u32>,
    apc_outlet4: Option<u32>,
}

/// Stage a unicast IPv4 address into a slot. On failure the slot is cleared
/// and a warning is emitted; the caller sees the verdict in the return value.
fn stage_ipv4(slot: &mut Option<String>, field: &str, x: &str) -> bool {
    if verify::is_ipv4_unicast(x) {
        *slot = Some(x.to_string());
        return true;
    }
    tracing::warn!("Invalid {field} {x:?}. Leaving {field} unset");
    *slot = None;
    false
}

/// Stage a 4-digit terminal server console port into a slot
fn stage_console_port(slot: &mut Option<String>, field: &str, x: &str) -> bool {
    if verify::is_console_port(x) {
        *slot = Some(x.to_string());
        return true;
    }
    tracing::warn!("Invalid {field} {x:?}. Leaving {field} unset");
    *slot = None;
    false
}

/// Stage a digit-only APC outlet number into a slot
fn stage_outlet(slot: &mut Option<u32>, field: &str, x: &str) -> bool {
    if verify::is_digits(x) {
        if let Ok(outlet) = x.parse::<u32>() {
            *slot = Some(outlet);
            return true;
        }
    }
    tracing::warn!("Invalid {field} {x:?}. Leaving {field} unset");
    *slot = None;
    false
}

/// TestbedMap accumulates per-device descriptors and persists them as a
/// single JSON document keyed by switch ID.
///
/// Usage is a repeated build/commit cycle: stage a switch ID with
/// [`set_sid`](Self::set_sid), stage any number of fields, then
/// [`commit`](Self::commit). Committing merges the staged fields into the
/// map and resets the staging area for the next device. [`save`](Self::save)
/// writes the whole map once at the end.
///
/// Field setters validate on assignment. A failed validation never errors;
/// the field is left unset and a warning is logged, so a best-effort record
/// still gets committed. The two exceptions are the switch ID (the merge
/// key) and role tags (a closed taxonomy): those fail hard.
#[derive(Debug, Default)]
pub struct TestbedMap {
    draft: Draft,
    records: BTreeMap<u32, DeviceRecord>,
    output: Option<PathBuf>,
}

impl TestbedMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The committed records, keyed by switch ID
    pub fn records(&self) -> &BTreeMap<u32, DeviceRecord> {
        &self.records
    }

    /// Look up a committed record by switch ID
    pub fn get(&self, sid: u32) -> Option<&DeviceRecord> {
        self.records.get(&sid)
    }

    /// Stage the switch ID for the device being described. The switch ID is
    /// the merge key, so a non-numeric value is an error rather than a
    /// warn-and-unset downgrade.
    pub fn set_sid(&mut self, x: &str) -> Result<()> {
        if !verify::is_digits(x) {
            bail!("expected digits for switch ID, got {x:?}");
        }
        let sid = x
            .parse::<u32>()
            .with_context(|| format!("switch ID {x:?} out of range"))?;
        self.draft.sid = Some(sid);
        Ok(())
    }

    /// Ansible inventory name for the device
    pub fn set_ansible_host(&mut self, x: &str) -> bool {
        self.draft.ansible_host = Some(x.to_string());
        true
    }

    /// Free-form contact info (phone, email); usable as snmp contact
    pub fn set_contact(&mut self, x: &str) -> bool {
        self.draft.contact = Some(x.to_string());
        true
    }

    /// Free-form location info (row, rack); usable as snmp location
    pub fn set_location(&mut self, x: &str) -> bool {
        self.draft.location = Some(x.to_string());
        true
    }

    pub fn set_hostname(&mut self, x: &str) -> bool {
        self.draft.hostname = Some(x.to_string());
        true
    }

    pub fn set_username(&mut self, x: &str) -> bool {
        self.draft.username = Some(x.to_string());
        true
    }

    pub fn set_password(&mut self, x: &str) -> bool {
        self.draft.password = Some(x.to_string());
        true
    }

    /// Management interface IPv4 address (usually mgmt0)
    pub fn set_mgmt_ip(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.mgmt_ip, "mgmt_ip", x)
    }

    /// Prefix length for the management IPv4 address
    pub fn set_mgmt_ip_prefixlen(&mut self, x: i64) -> bool {
        if verify::is_ipv4_mask(x) {
            self.draft.mgmt_ip_prefixlen = Some(x as u8);
            return true;
        }
        tracing::warn!("Invalid mgmt_ip_prefixlen {x}. Leaving mgmt_ip_prefixlen unset");
        self.draft.mgmt_ip_prefixlen = None;
        false
    }

    /// Management interface IPv6 address (usually mgmt0)
    pub fn set_mgmt_ipv6(&mut self, x: &str) -> bool {
        if verify::is_ipv6_unicast(x) {
            self.draft.mgmt_ipv6 = Some(x.to_string());
            return true;
        }
        tracing::warn!("Invalid mgmt_ipv6 {x:?}. Leaving mgmt_ipv6 unset");
        self.draft.mgmt_ipv6 = None;
        false
    }

    /// Prefix length for the management IPv6 address
    pub fn set_mgmt_ipv6_prefixlen(&mut self, x: i64) -> bool {
        if verify::is_ipv6_mask(x) {
            self.draft.mgmt_ipv6_prefixlen = Some(x as u8);
            return true;
        }
        tracing::warn!("Invalid mgmt_ipv6_prefixlen {x}. Leaving mgmt_ipv6_prefixlen unset");
        self.draft.mgmt_ipv6_prefixlen = None;
        false
    }

    /// IPv4 gateway for the management address
    pub fn set_gateway(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.gateway, "gateway", x)
    }

    /// Deprecated: use [`set_dns_server1`](Self::set_dns_server1) and
    /// [`set_dns_server2`](Self::set_dns_server2)
    pub fn set_nameserver(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.nameserver, "nameserver", x)
    }

    pub fn set_dns_server1(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.dns_server1, "dns_server1", x)
    }

    pub fn set_dns_server2(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.dns_server2, "dns_server2", x)
    }

    pub fn set_ntp_server1(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.ntp_server1, "ntp_server1", x)
    }

    pub fn set_ntp_server2(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.ntp_server2, "ntp_server2", x)
    }

    /// Add a role tag to the accumulating role set for this device. Each
    /// call adds; it does not replace. Unknown tags are an error because a
    /// silently dropped role would leave the record inconsistent with the
    /// caller's intent.
    pub fn add_role(&mut self, x: &str) -> Result<()> {
        if !device_role::is_valid(x) {
            bail!(
                "{x:?} is not a valid role. Expected one of {}",
                device_role::ALL.join(",")
            );
        }
        self.draft.role.insert(x.to_string());
        Ok(())
    }

    /// Drop a previously staged role tag, if present
    pub fn remove_role(&mut self, x: &str) {
        self.draft.role.remove(x);
    }

    /// Currently staged role tags
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.draft.role.iter().map(String::as_str)
    }

    /// IP address of the terminal server for the device's 1st console port
    pub fn set_ts_ip1(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.ts_ip1, "ts_ip1", x)
    }

    /// 1st console port for the device on its terminal server
    pub fn set_ts_port1(&mut self, x: &str) -> bool {
        stage_console_port(&mut self.draft.ts_port1, "ts_port1", x)
    }

    /// IP address of the terminal server for the device's 2nd console port
    pub fn set_ts_ip2(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.ts_ip2, "ts_ip2", x)
    }

    /// 2nd console port for the device on its terminal server
    pub fn set_ts_port2(&mut self, x: &str) -> bool {
        stage_console_port(&mut self.draft.ts_port2, "ts_port2", x)
    }

    /// Terminal server password for the device's 1st console
    pub fn set_ts_password1(&mut self, x: &str) -> bool {
        self.draft.ts_password1 = Some(x.to_string());
        true
    }

    /// Terminal server password for the device's 2nd console
    pub fn set_ts_password2(&mut self, x: &str) -> bool {
        self.draft.ts_password2 = Some(x.to_string());
        true
    }

    /// Deprecated: use [`set_ts_ip1`](Self::set_ts_ip1). Writes the same
    /// underlying slot.
    pub fn set_console_ip1(&mut self, x: &str) -> bool {
        self.set_ts_ip1(x)
    }

    /// Deprecated: use [`set_ts_port1`](Self::set_ts_port1). Writes the same
    /// underlying slot.
    pub fn set_console_port1(&mut self, x: &str) -> bool {
        self.set_ts_port1(x)
    }

    /// Deprecated: use [`set_ts_ip2`](Self::set_ts_ip2). Writes the same
    /// underlying slot.
    pub fn set_console_ip2(&mut self, x: &str) -> bool {
        self.set_ts_ip2(x)
    }

    /// Deprecated: use [`set_ts_port2`](Self::set_ts_port2). Writes the same
    /// underlying slot.
    pub fn set_console_port2(&mut self, x: &str) -> bool {
        self.set_ts_port2(x)
    }

    /// IP address of the APC controller whose outlet feeds PS1 on the device
    pub fn set_apc_ip1(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.apc_ip1, "apc_ip1", x)
    }

    pub fn set_apc_ip2(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.apc_ip2, "apc_ip2", x)
    }

    pub fn set_apc_ip3(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.apc_ip3, "apc_ip3", x)
    }

    pub fn set_apc_ip4(&mut self, x: &str) -> bool {
        stage_ipv4(&mut self.draft.apc_ip4, "apc_ip4", x)
    }

    /// APC outlet number corresponding to apc_ip1
    pub fn set_apc_outlet1(&mut self, x: &str) -> bool {
        stage_outlet(&mut self.draft.apc_outlet1, "apc_outlet1", x)
    }

    pub fn set_apc_outlet2(&mut self, x: &str) -> bool {
        stage_outlet(&mut self.draft.apc_outlet2, "apc_outlet2", x)
    }

    pub fn set_apc_outlet3(&mut self, x: &str) -> bool {
        stage_outlet(&mut self.draft.apc_outlet3, "apc_outlet3", x)
    }

    pub fn set_apc_outlet4(&mut self, x: &str) -> bool {
        stage_outlet(&mut self.draft.apc_outlet4, "apc_outlet4", x)
    }

    /// Commit the staged fields for the current device into the map.
    ///
    /// Only fields that are actually set get written, so committing a draft
    /// that omits a field never clears a previously committed value for the
    /// same switch ID. The staging area is reset unconditionally, switch ID
    /// and role set included; the next device starts from a clean draft.
    ///
    /// Returns the switch ID the record was committed under.
    pub fn commit(&mut self) -> Result<u32> {
        let Some(sid) = self.draft.sid else {
            bail!("no switch ID staged. Call set_sid() before commit()");
        };
        let draft = std::mem::take(&mut self.draft);
        let record = self.records.entry(sid).or_insert_with(|| DeviceRecord {
            sid,
            ..Default::default()
        });

        if let Some(v) = draft.ansible_host {
            record.ansible_host = Some(v);
        }
        if let Some(v) = draft.contact {
            record.contact = Some(v);
        }
        if let Some(v) = draft.location {
            record.location = Some(v);
        }
        if let Some(v) = draft.hostname {
            record.hostname = Some(v);
        }
        if let Some(v) = draft.mgmt_ip {
            record.mgmt_ip = Some(v);
        }
        if let Some(v) = draft.mgmt_ip_prefixlen {
            record.mgmt_ip_prefixlen = Some(v);
        }
        if let Some(v) = draft.mgmt_ipv6 {
            record.mgmt_ipv6 = Some(v);
        }
        if let Some(v) = draft.mgmt_ipv6_prefixlen {
            record.mgmt_ipv6_prefixlen = Some(v);
        }
        if let Some(v) = draft.gateway {
            record.gateway = Some(v);
        }
        if let Some(v) = draft.nameserver {
            record.nameserver = Some(v);
        }
        if let Some(v) = draft.dns_server1 {
            record.dns_server1 = Some(v);
        }
        if let Some(v) = draft.dns_server2 {
            record.dns_server2 = Some(v);
        }
        if let Some(v) = draft.ntp_server1 {
            record.ntp_server1 = Some(v);
        }
        if let Some(v) = draft.ntp_server2 {
            record.ntp_server2 = Some(v);
        }
        if let Some(v) = draft.username {
            record.username = Some(v);
        }
        if let Some(v) = draft.password {
            record.password = Some(v);
        }
        if !draft.role.is_empty() {
            // the persisted form is list-like; BTreeSet gives a stable order
            record.role = draft.role.into_iter().collect();
        }
        if let Some(v) = draft.ts_ip1 {
            record.ts_ip1 = Some(v);
        }
        if let Some(v) = draft.ts_port1 {
            record.ts_port1 = Some(v);
        }
        if let Some(v) = draft.ts_ip2 {
            record.ts_ip2 = Some(v);
        }
        if let Some(v) = draft.ts_port2 {
            record.ts_port2 = Some(v);
        }
        if let Some(v) = draft.ts_password1 {
            record.ts_password1 = Some(v);
        }
        if let Some(v) = draft.ts_password2 {
            record.ts_password2 = Some(v);
        }
        if let Some(v) = draft.apc_ip1 {
            record.apc_ip1 = Some(v);
        }
        if let Some(v) = draft.apc_ip2 {
            record.apc_ip2 = Some(v);
        }
        if let Some(v) = draft.apc_ip3 {
            record.apc_ip3 = Some(v);
        }
        if let Some(v) = draft.apc_ip4 {
            record.apc_ip4 = Some(v);
        }
        if let Some(v) = draft.apc_outlet1 {
            record.apc_outlet1 = Some(v);
        }
        if let Some(v) = draft.apc_outlet2 {
            record.apc_outlet2 = Some(v);
        }
        if let Some(v) = draft.apc_outlet3 {
            record.apc_outlet3 = Some(v);
        }
        if let Some(v) = draft.apc_outlet4 {
            record.apc_outlet4 = Some(v);
        }

        tracing::debug!("committed record for sid {sid}");
        Ok(sid)
    }

    /// Set the destination file for [`save`](Self::save)
    pub fn set_output<P: AsRef<Path>>(&mut self, path: P) {
        self.output = Some(path.as_ref().to_path_buf());
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Write the full map to the configured output file as JSON. Top-level
    /// keys are the decimal string form of each switch ID.
    pub fn save(&self) -> Result<()> {
        if self.records.is_empty() {
            bail!("nothing to save. Commit at least one device first");
        }
        let Some(path) = &self.output else {
            bail!("no output file configured. Call set_output() before save()");
        };
        let json =
            serde_json::to_string_pretty(&self.records).context("serializing testbed map")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        tracing::info!(
            "wrote {} device records to {}",
            self.records.len(),
            path.display()
        );
        Ok(())
    }
}
