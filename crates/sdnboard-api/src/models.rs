// Controller wire types
//
// Shapes exactly as the controller serves them. The same endpoint is
// served in two shapes in some deployments (plain string arrays vs.
// object arrays); each shape gets its own type and its own client method
// instead of an untagged union.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Datapath id ─────────────────────────────────────────────────────

/// OpenFlow datapath (switch) identifier.
///
/// The controller emits it as a JSON number in topology and host maps but
/// as a decimal string when it is a map key (`/ports`, `/thresholds`).
/// Deserialization accepts both; serialization always writes a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Dpid(pub u64);

impl Dpid {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Dpid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Dpid {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for Dpid {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl Serialize for Dpid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

struct DpidVisitor;

impl Visitor<'_> for DpidVisitor {
    type Value = Dpid;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a datapath id as an unsigned integer or decimal string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Dpid, E> {
        Ok(Dpid(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Dpid, E> {
        u64::try_from(v)
            .map(Dpid)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Dpid, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for Dpid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DpidVisitor)
    }
}

// ── Hosts ───────────────────────────────────────────────────────────

/// Rich `/connected_ips` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedIp {
    pub ip: String,
    #[serde(default)]
    pub hostname: String,
    /// ISO-8601 timestamp as sent by the controller.
    #[serde(default)]
    pub last_seen: Option<String>,
}

/// Rich `/blocked_ips` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedIp {
    pub ip: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub blocked_at: Option<String>,
}

/// `/host_to_switch` row: which switch port a host IP was learned on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostAttachment {
    pub ip: String,
    pub switch: Dpid,
    pub port: u32,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct IpRequest<'a> {
    pub ip: &'a str,
}

// ── Ports ───────────────────────────────────────────────────────────

/// Flat `/ports` row (service-port deployments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePort {
    pub port: u16,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub protocol: String,
    #[serde(default)]
    pub blocked: bool,
}

/// One physical port as described by the switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortDesc {
    pub port_no: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub hw_addr: String,
}

/// Per-switch `/ports` entry (OpenFlow deployments).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchPortInventory {
    #[serde(default)]
    pub all_ports: Vec<PortDesc>,
    #[serde(default)]
    pub blocked_ports: Vec<u32>,
}

/// Full per-switch `/ports` response, ordered by datapath id.
pub type PortInventory = BTreeMap<Dpid, SwitchPortInventory>;

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ServicePortRequest {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct SwitchPortRequest {
    pub dpid: Dpid,
    pub port_no: u32,
}

// ── Thresholds ──────────────────────────────────────────────────────

/// One `/thresholds` row for a single port of a switch.
///
/// Threshold values arrive as JSON numbers or as decimal strings,
/// depending on how the controller app stored them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEntry {
    pub port: u32,
    #[serde(deserialize_with = "number_or_string")]
    pub threshold: f64,
    #[serde(default, deserialize_with = "optional_number_or_string")]
    pub max_threshold: Option<f64>,
}

/// An `f64` that deserializes from a JSON number or a decimal string.
struct LenientNumber(f64);

struct LenientNumberVisitor;

impl Visitor<'_> for LenientNumberVisitor {
    type Value = LenientNumber;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a decimal string")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<LenientNumber, E> {
        Ok(LenientNumber(v))
    }

    #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LenientNumber, E> {
        Ok(LenientNumber(v as f64))
    }

    #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LenientNumber, E> {
        Ok(LenientNumber(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LenientNumber, E> {
        v.trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(LenientNumber)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for LenientNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(LenientNumberVisitor)
    }
}

fn number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    LenientNumber::deserialize(deserializer).map(|n| n.0)
}

fn optional_number_or_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Option::<LenientNumber>::deserialize(deserializer).map(|n| n.map(|n| n.0))
}

/// Full `/thresholds` response, ordered by datapath id.
pub type ThresholdTable = BTreeMap<Dpid, Vec<ThresholdEntry>>;

/// One element of the `POST /threshold` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdUpdate {
    pub switch: Dpid,
    pub port: u32,
    #[serde(serialize_with = "serialize_number")]
    pub threshold: f64,
}

/// Integral values go out as JSON integers (`42`, not `42.0`), which is
/// what the controller's parser and the browser client both produce.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        #[allow(clippy::as_conversions, clippy::cast_possible_truncation)]
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

// ── Topology ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchDesc {
    pub dpid: Dpid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDesc {
    pub mac: String,
    #[serde(default)]
    pub ip: Option<String>,
    pub dpid: Dpid,
    pub port: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkDesc {
    pub src: Dpid,
    pub dst: Dpid,
    pub src_port: u32,
    pub dst_port: u32,
}

/// `/topology` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub switches: Vec<SwitchDesc>,
    #[serde(default)]
    pub hosts: Vec<HostDesc>,
    #[serde(default)]
    pub links: Vec<LinkDesc>,
}

// ── Token login ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dpid_accepts_number_and_string() {
        let a: Dpid = serde_json::from_value(json!(7)).unwrap();
        let b: Dpid = serde_json::from_value(json!("7")).unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_value::<Dpid>(json!("s7")).is_err());
        assert!(serde_json::from_value::<Dpid>(json!(-1)).is_err());
    }

    #[test]
    fn dpid_map_keys_sort_numerically() {
        let table: ThresholdTable = serde_json::from_value(json!({
            "10": [{"port": 1, "threshold": 5.0}],
            "2": [{"port": 1, "threshold": 5.0, "max_threshold": 9.0}],
        }))
        .unwrap();
        let keys: Vec<u64> = table.keys().map(|d| d.get()).collect();
        assert_eq!(keys, vec![2, 10]);
        assert_eq!(table[&Dpid(2)][0].max_threshold, Some(9.0));
        assert_eq!(table[&Dpid(10)][0].max_threshold, None);
    }

    #[test]
    fn threshold_values_accept_numbers_and_strings() {
        let table: ThresholdTable = serde_json::from_value(json!({
            "1": [
                {"port": 1, "threshold": "12.5", "max_threshold": "100"},
                {"port": 2, "threshold": 7, "max_threshold": null},
                {"port": 3, "threshold": " 3 "}
            ]
        }))
        .unwrap();
        let rows = &table[&Dpid(1)];
        assert_eq!(rows[0].threshold, 12.5);
        assert_eq!(rows[0].max_threshold, Some(100.0));
        assert_eq!(rows[1].threshold, 7.0);
        assert_eq!(rows[1].max_threshold, None);
        assert_eq!(rows[2].threshold, 3.0);

        let bad = serde_json::from_value::<ThresholdEntry>(json!({"port": 1, "threshold": "high"}));
        assert!(bad.is_err());
    }

    #[test]
    fn threshold_update_writes_integral_values_as_integers() {
        let body = serde_json::to_value(vec![ThresholdUpdate {
            switch: Dpid(1),
            port: 2,
            threshold: 42.0,
        }])
        .unwrap();
        assert_eq!(body, json!([{"switch": 1, "port": 2, "threshold": 42}]));

        let frac = serde_json::to_value(ThresholdUpdate {
            switch: Dpid(1),
            port: 2,
            threshold: 0.5,
        })
        .unwrap();
        assert_eq!(frac["threshold"], json!(0.5));
    }

    #[test]
    fn connected_ip_uses_camel_case_fields() {
        let row: ConnectedIp = serde_json::from_value(json!({
            "ip": "10.0.0.1",
            "hostname": "h1",
            "lastSeen": "2024-06-15T10:30:00Z"
        }))
        .unwrap();
        assert_eq!(row.last_seen.as_deref(), Some("2024-06-15T10:30:00Z"));
    }
}
