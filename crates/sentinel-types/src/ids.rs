//! Type-safe identifier wrappers for dispatch-simulation entities.
//!
//! Entities created locally (cases, emergencies) use UUID v7 (time-ordered)
//! wrappers. Citizens and evidence keep the display-string identifiers the
//! generative service and the fabricator issue (`CIT-10042`, `EV-3`), and
//! dispatch calls use a millisecond-derived numeric id so ordering and
//! dedup fall out of comparison.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Generates a newtype wrapper around a display [`String`] identifier.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

define_uuid_id! {
    /// Unique identifier for a generated investigation case.
    CaseId
}

define_uuid_id! {
    /// Unique identifier for an emergency interrupt event.
    EmergencyId
}

define_string_id! {
    /// Display identifier for a citizen record (`CIT-10042` for fabricated
    /// citizens; generated suspects keep whatever id the service issued).
    CitizenId
}

define_string_id! {
    /// Display identifier for a logged evidence entry.
    EvidenceId
}

/// Numeric identifier for a pending dispatch call.
///
/// Derived from a millisecond timestamp at synthesis time; the queue
/// manager guarantees strict monotonic growth so ids double as dedup keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct DispatchCallId(pub u64);

impl DispatchCallId {
    /// Return the inner numeric value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for DispatchCallId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DispatchCallId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_distinct_types() {
        let case = CaseId::new();
        let emergency = EmergencyId::new();
        assert_ne!(case.into_inner(), Uuid::nil());
        assert_ne!(emergency.into_inner(), Uuid::nil());
    }

    #[test]
    fn citizen_id_serializes_transparently() {
        let id = CitizenId::from("CIT-10007");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"CIT-10007\""));
    }

    #[test]
    fn dispatch_call_ids_order_numerically() {
        let earlier = DispatchCallId(1_700_000_000_000);
        let later = DispatchCallId(1_700_000_000_001);
        assert!(earlier < later);
    }

    #[test]
    fn case_id_roundtrip_serde() {
        let original = CaseId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<CaseId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }
}
