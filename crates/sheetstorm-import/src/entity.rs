//! Entity schema table
//!
//! The six record kinds an imported sheet can target, and for each of them
//! a closed field enum carrying the fixed, ordered field list.
//!
//! - [`EntityType`]: the tagged union of target entities
//! - [`EntityField`]: per-entity field enum with its [`FieldSpec`] table
//! - [`FieldKey`]: any entity's field, for string-driven callers

use crate::normalize::{ImportBatch, NormalizedRecord};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

/// Backend record kind an imported sheet is mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// Timeline events
    TimelineEvents,
    /// Compromised hosts
    Hosts,
    /// Compromised accounts
    Accounts,
    /// Network indicators of compromise
    NetworkIocs,
    /// Host-based indicators of compromise
    HostIocs,
    /// Malware and attacker tools
    Malware,
}

impl EntityType {
    /// All entity types in their fixed display order
    pub const ALL: [EntityType; 6] = [
        EntityType::TimelineEvents,
        EntityType::Hosts,
        EntityType::Accounts,
        EntityType::NetworkIocs,
        EntityType::HostIocs,
        EntityType::Malware,
    ];

    /// Wire name used by the backend
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::TimelineEvents => "timeline_events",
            EntityType::Hosts => "hosts",
            EntityType::Accounts => "accounts",
            EntityType::NetworkIocs => "network_iocs",
            EntityType::HostIocs => "host_iocs",
            EntityType::Malware => "malware",
        }
    }

    /// Human-readable name
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            EntityType::TimelineEvents => "Timeline Events",
            EntityType::Hosts => "Compromised Hosts",
            EntityType::Accounts => "Compromised Accounts",
            EntityType::NetworkIocs => "Network IOCs",
            EntityType::HostIocs => "Host IOCs",
            EntityType::Malware => "Malware / Tools",
        }
    }

    /// Ordered field list of this entity, as dynamic keys
    #[must_use]
    pub fn fields(&self) -> Vec<FieldSpec<FieldKey>> {
        match self {
            EntityType::TimelineEvents => erase::<TimelineEventField>(),
            EntityType::Hosts => erase::<HostField>(),
            EntityType::Accounts => erase::<AccountField>(),
            EntityType::NetworkIocs => erase::<NetworkIocField>(),
            EntityType::HostIocs => erase::<HostIocField>(),
            EntityType::Malware => erase::<MalwareField>(),
        }
    }

    /// Required fields only, in field order
    #[must_use]
    pub fn required_fields(&self) -> Vec<FieldKey> {
        self.fields()
            .into_iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.field)
            .collect()
    }
}

fn erase<F: EntityField>() -> Vec<FieldSpec<FieldKey>> {
    F::specs().iter().map(|spec| spec.erase()).collect()
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = UnknownEntity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityType::ALL
            .into_iter()
            .find(|entity| entity.as_str() == s)
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}

/// Unrecognized entity wire name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type: {0}")]
pub struct UnknownEntity(pub String);

/// One field of an entity's schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldSpec<F> {
    /// The field itself
    pub field: F,
    /// Wire key
    pub key: &'static str,
    /// Display label
    pub label: &'static str,
    /// Whether every record must carry a value for it
    pub required: bool,
}

impl<F: EntityField> FieldSpec<F> {
    /// Same spec addressed by [`FieldKey`]
    #[inline]
    #[must_use]
    pub fn erase(&self) -> FieldSpec<FieldKey> {
        FieldSpec {
            field: self.field.into_key(),
            key: self.key,
            label: self.label,
            required: self.required,
        }
    }
}

/// Field enum of a single entity type
///
/// Implemented only by the six generated field enums. Each implementation
/// knows its entity, its ordered [`FieldSpec`] table, and where its records
/// live inside an [`ImportBatch`], so typed code never touches another
/// entity's bucket.
pub trait EntityField:
    Copy + Eq + Ord + Hash + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Entity this field belongs to
    const ENTITY: EntityType;

    /// Fixed ordered field table
    fn specs() -> &'static [FieldSpec<Self>];

    /// Wire key of this field
    fn key(self) -> &'static str;

    /// Lift into the entity-tagged key
    fn into_key(self) -> FieldKey;

    /// Narrow from the entity-tagged key
    fn from_key(key: FieldKey) -> Option<Self>;

    /// This entity's records in a batch
    fn bucket(batch: &ImportBatch) -> &[NormalizedRecord<Self>];

    /// Mutable access to this entity's records in a batch
    fn bucket_mut(batch: &mut ImportBatch) -> &mut Vec<NormalizedRecord<Self>>;

    /// Spec of this field
    #[must_use]
    fn spec(self) -> &'static FieldSpec<Self> {
        let specs = Self::specs();
        // Every variant appears exactly once in its own table.
        specs
            .iter()
            .find(|spec| spec.field == self)
            .unwrap_or(&specs[0])
    }

    /// Required fields of this entity
    #[must_use]
    fn required() -> Vec<Self> {
        Self::specs()
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.field)
            .collect()
    }

    /// Look up a field by wire key
    #[must_use]
    fn from_wire(key: &str) -> Option<Self> {
        Self::specs()
            .iter()
            .find(|spec| spec.key == key)
            .map(|spec| spec.field)
    }
}

macro_rules! entity_fields {
    (
        $(#[$meta:meta])*
        $name:ident => $entity:ident, $tag:ident, $bucket:ident {
            $( $variant:ident = $key:literal, $label:literal, $required:literal; )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl $name {
            const SPECS: &'static [FieldSpec<$name>] = &[
                $(
                    FieldSpec {
                        field: $name::$variant,
                        key: $key,
                        label: $label,
                        required: $required,
                    },
                )+
            ];
        }

        impl EntityField for $name {
            const ENTITY: EntityType = EntityType::$entity;

            fn specs() -> &'static [FieldSpec<Self>] {
                Self::SPECS
            }

            fn key(self) -> &'static str {
                match self {
                    $( $name::$variant => $key, )+
                }
            }

            fn into_key(self) -> FieldKey {
                FieldKey::$tag(self)
            }

            fn from_key(key: FieldKey) -> Option<Self> {
                match key {
                    FieldKey::$tag(field) => Some(field),
                    _ => None,
                }
            }

            fn bucket(batch: &ImportBatch) -> &[NormalizedRecord<Self>] {
                &batch.$bucket
            }

            fn bucket_mut(batch: &mut ImportBatch) -> &mut Vec<NormalizedRecord<Self>> {
                &mut batch.$bucket
            }
        }

        impl From<$name> for FieldKey {
            fn from(field: $name) -> Self {
                FieldKey::$tag(field)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }
    };
}

entity_fields! {
    /// Timeline event fields
    TimelineEventField => TimelineEvents, TimelineEvent, timeline_events {
        Timestamp = "timestamp", "Timestamp", true;
        Activity = "activity", "Activity", true;
        Hostname = "hostname", "Hostname", false;
        Source = "source", "Source", false;
        MitreTactic = "mitre_tactic", "MITRE Tactic", false;
        MitreTechnique = "mitre_technique", "MITRE Technique", false;
    }
}

entity_fields! {
    /// Compromised host fields
    HostField => Hosts, Host, hosts {
        Hostname = "hostname", "Hostname", true;
        IpAddress = "ip_address", "IP Address", false;
        SystemType = "system_type", "System Type", false;
        OsVersion = "os_version", "OS Version", false;
        Evidence = "evidence", "Evidence", false;
        FirstSeen = "first_seen", "First Seen", false;
        ContainmentStatus = "containment_status", "Containment Status", false;
    }
}

entity_fields! {
    /// Compromised account fields
    AccountField => Accounts, Account, accounts {
        AccountName = "account_name", "Account Name", true;
        DatetimeSeen = "datetime_seen", "Date/Time Seen", false;
        Password = "password", "Password", false;
        HostSystem = "host_system", "Host System", false;
        AccountType = "account_type", "Account Type", false;
        Domain = "domain", "Domain", false;
        Sid = "sid", "SID", false;
        IsPrivileged = "is_privileged", "Privileged", false;
    }
}

entity_fields! {
    /// Network indicator fields
    NetworkIocField => NetworkIocs, NetworkIoc, network_iocs {
        DnsIp = "dns_ip", "DNS/IP", true;
        Timestamp = "timestamp", "Timestamp", false;
        Protocol = "protocol", "Protocol", false;
        Port = "port", "Port", false;
        Direction = "direction", "Direction", false;
        Description = "description", "Description", false;
        SourceHost = "source_host", "Source Host", false;
    }
}

entity_fields! {
    /// Host-based indicator fields
    HostIocField => HostIocs, HostIoc, host_iocs {
        ArtifactValue = "artifact_value", "Artifact Value", true;
        ArtifactType = "artifact_type", "Artifact Type", false;
        Host = "host", "Host", false;
        Datetime = "datetime", "Date/Time", false;
        Notes = "notes", "Notes", false;
    }
}

entity_fields! {
    /// Malware and tool fields
    MalwareField => Malware, Malware, malware {
        FileName = "file_name", "File Name", true;
        FilePath = "file_path", "File Path", false;
        Md5 = "md5", "MD5", false;
        Sha256 = "sha256", "SHA256", false;
        Sha512 = "sha512", "SHA512", false;
        Hash = "hash", "Hash", false;
        FileSize = "file_size", "File Size", false;
        CreationTime = "creation_time", "Creation Time", false;
        ModificationTime = "modification_time", "Modification Time", false;
        Host = "host", "Host", false;
        IsTool = "is_tool", "Is Tool", false;
        Description = "description", "Description", false;
    }
}

/// A field of any entity, tagged by entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    /// Timeline event field
    TimelineEvent(TimelineEventField),
    /// Host field
    Host(HostField),
    /// Account field
    Account(AccountField),
    /// Network IOC field
    NetworkIoc(NetworkIocField),
    /// Host IOC field
    HostIoc(HostIocField),
    /// Malware field
    Malware(MalwareField),
}

impl FieldKey {
    /// Resolve a wire key within an entity's schema
    #[must_use]
    pub fn parse(entity: EntityType, key: &str) -> Option<Self> {
        match entity {
            EntityType::TimelineEvents => TimelineEventField::from_wire(key).map(Self::from),
            EntityType::Hosts => HostField::from_wire(key).map(Self::from),
            EntityType::Accounts => AccountField::from_wire(key).map(Self::from),
            EntityType::NetworkIocs => NetworkIocField::from_wire(key).map(Self::from),
            EntityType::HostIocs => HostIocField::from_wire(key).map(Self::from),
            EntityType::Malware => MalwareField::from_wire(key).map(Self::from),
        }
    }

    /// Entity this field belongs to
    #[must_use]
    pub fn entity(&self) -> EntityType {
        match self {
            FieldKey::TimelineEvent(_) => EntityType::TimelineEvents,
            FieldKey::Host(_) => EntityType::Hosts,
            FieldKey::Account(_) => EntityType::Accounts,
            FieldKey::NetworkIoc(_) => EntityType::NetworkIocs,
            FieldKey::HostIoc(_) => EntityType::HostIocs,
            FieldKey::Malware(_) => EntityType::Malware,
        }
    }

    /// Wire key
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.spec().key
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.spec().label
    }

    /// Whether the field is required
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.spec().required
    }

    fn spec(&self) -> FieldSpec<FieldKey> {
        match *self {
            FieldKey::TimelineEvent(f) => f.spec().erase(),
            FieldKey::Host(f) => f.spec().erase(),
            FieldKey::Account(f) => f.spec().erase(),
            FieldKey::NetworkIoc(f) => f.spec().erase(),
            FieldKey::HostIoc(f) => f.spec().erase(),
            FieldKey::Malware(f) => f.spec().erase(),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity(), self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_wire_names_round_trip() {
        for entity in EntityType::ALL {
            assert_eq!(entity.as_str().parse::<EntityType>().unwrap(), entity);
            let json = serde_json::to_string(&entity).unwrap();
            assert_eq!(json, format!("\"{}\"", entity.as_str()));
        }
        assert!("timeline".parse::<EntityType>().is_err());
    }

    #[test]
    fn each_entity_has_a_required_field() {
        for entity in EntityType::ALL {
            assert!(!entity.required_fields().is_empty(), "{entity} has no required field");
        }
    }

    #[test]
    fn hosts_only_require_hostname() {
        assert_eq!(
            EntityType::Hosts.required_fields(),
            vec![FieldKey::Host(HostField::Hostname)]
        );
        assert_eq!(HostField::required(), vec![HostField::Hostname]);
    }

    #[test]
    fn field_order_is_fixed() {
        let keys: Vec<_> = HostField::specs().iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                "hostname",
                "ip_address",
                "system_type",
                "os_version",
                "evidence",
                "first_seen",
                "containment_status"
            ]
        );
    }

    #[test]
    fn field_keys_are_scoped_to_entity() {
        let key = FieldKey::parse(EntityType::Hosts, "hostname").unwrap();
        assert_eq!(key, FieldKey::Host(HostField::Hostname));
        assert_eq!(key.entity(), EntityType::Hosts);
        assert!(key.is_required());
        assert_eq!(key.to_string(), "hosts.hostname");

        assert!(FieldKey::parse(EntityType::Hosts, "activity").is_none());
        assert_eq!(HostField::from_key(key), Some(HostField::Hostname));
        assert_eq!(
            TimelineEventField::from_key(key),
            None,
            "host key must not narrow to a timeline field"
        );
    }

    #[test]
    fn field_serializes_as_wire_key() {
        let json = serde_json::to_string(&MalwareField::FileName).unwrap();
        assert_eq!(json, "\"file_name\"");
        assert_eq!(MalwareField::FileName.spec().label, "File Name");
    }
}
