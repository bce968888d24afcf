//! Resource family catalogue.

use serde::{Deserialize, Serialize};

/// A named group of same-shaped records in the configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    ResourceGroups,
    KeyManagement,
    ObjectStorage,
    Vpcs,
    SecurityGroups,
    VirtualPrivateEndpoints,
    SshKeys,
    Vsi,
    Clusters,
    VpnGateways,
    TransitGateways,
    Appid,
    SecretsManager,
    F5Vsi,
    AccessGroups,
    EventStreams,
    LoadBalancers,
    CbrZones,
    CbrRules,
    VpnServers,
    Dns,
    RoutingTables,
    Icd,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::ResourceGroups => "resource_groups",
            Family::KeyManagement => "key_management",
            Family::ObjectStorage => "object_storage",
            Family::Vpcs => "vpcs",
            Family::SecurityGroups => "security_groups",
            Family::VirtualPrivateEndpoints => "virtual_private_endpoints",
            Family::SshKeys => "ssh_keys",
            Family::Vsi => "vsi",
            Family::Clusters => "clusters",
            Family::VpnGateways => "vpn_gateways",
            Family::TransitGateways => "transit_gateways",
            Family::Appid => "appid",
            Family::SecretsManager => "secrets_manager",
            Family::F5Vsi => "f5_vsi",
            Family::AccessGroups => "access_groups",
            Family::EventStreams => "event_streams",
            Family::LoadBalancers => "load_balancers",
            Family::CbrZones => "cbr_zones",
            Family::CbrRules => "cbr_rules",
            Family::VpnServers => "vpn_servers",
            Family::Dns => "dns",
            Family::RoutingTables => "routing_tables",
            Family::Icd => "icd",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|f| f.as_str() == s)
    }

    pub fn all() -> Vec<Self> {
        let mut all = Self::core();
        all.extend(Self::optional());
        all
    }

    /// Families that must be present in every document.
    pub fn core() -> Vec<Self> {
        vec![
            Family::ResourceGroups,
            Family::KeyManagement,
            Family::ObjectStorage,
            Family::Vpcs,
            Family::SecurityGroups,
            Family::VirtualPrivateEndpoints,
            Family::SshKeys,
            Family::Vsi,
            Family::Clusters,
            Family::VpnGateways,
            Family::TransitGateways,
        ]
    }

    /// Families initialized to an empty array when absent.
    pub fn optional() -> Vec<Self> {
        vec![
            Family::Appid,
            Family::SecretsManager,
            Family::F5Vsi,
            Family::AccessGroups,
            Family::EventStreams,
            Family::LoadBalancers,
            Family::CbrZones,
            Family::CbrRules,
            Family::VpnServers,
            Family::Dns,
            Family::RoutingTables,
            Family::Icd,
        ]
    }

    pub fn is_optional(&self) -> bool {
        Self::optional().contains(self)
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Singleton sections synthesized with a canonical shape when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Atracker,
    Scc,
    IamAccountSettings,
    Logdna,
    Sysdig,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Atracker => "atracker",
            Section::Scc => "scc",
            Section::IamAccountSettings => "iam_account_settings",
            Section::Logdna => "logdna",
            Section::Sysdig => "sysdig",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Section::Atracker,
            Section::Scc,
            Section::IamAccountSettings,
            Section::Logdna,
            Section::Sysdig,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_round_trip_names() {
        for family in Family::all() {
            assert_eq!(Family::from_str(family.as_str()), Some(family));
        }
        assert_eq!(Family::from_str("power"), None);
    }

    #[test]
    fn test_core_and_optional_are_disjoint() {
        for family in Family::core() {
            assert!(!family.is_optional(), "{} listed twice", family);
        }
        assert_eq!(Family::all().len(), 23);
    }
}
