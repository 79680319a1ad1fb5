//! Domain primitives shared by the catalog, the history store and settings.
//!
//! Identifiers are newtypes so an engine id can never be confused with any
//! other UUID flowing through the system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::constants::ENGINE_ID_NAMESPACE;

/// Stable identifier of a search engine.
///
/// Identifiers are name-based (version 3) UUIDs over
/// `"<namespace>:<catalog index>"`, so they survive reinstalls without being
/// written down as literals anywhere.
///
/// # Examples
///
/// ```rust
/// use bettersearch::domain::EngineId;
///
/// let first = EngineId::from_index(0);
/// assert_eq!(first, EngineId::from_index(0));
/// assert_ne!(first, EngineId::from_index(1));
/// assert_eq!(first.to_string().parse::<EngineId>().unwrap(), first);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineId(Uuid);

impl EngineId {
    /// Derives the identifier of the engine at `index` in the built-in catalog.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        let digest = md5::compute(format!("{ENGINE_ID_NAMESPACE}:{index}"));
        Self(uuid::Builder::from_md5_bytes(digest.0).into_uuid())
    }

    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EngineId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Returned when a stored or requested theme index is outside `0..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Value {0} is not allowed for theme")]
pub struct InvalidTheme(pub i64);

/// Colour scheme preference of the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Follow the system setting.
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn index(self) -> i64 {
        match self {
            Self::Auto => 0,
            Self::Light => 1,
            Self::Dark => 2,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl TryFrom<i64> for Theme {
    type Error = InvalidTheme;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Auto),
            1 => Ok(Self::Light),
            2 => Ok(Self::Dark),
            other => Err(InvalidTheme(other)),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.index(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_ids_are_deterministic_and_distinct() {
        let ids: Vec<EngineId> = (0..11).map(EngineId::from_index).collect();
        for (i, a) in ids.iter().enumerate() {
            assert_eq!(*a, EngineId::from_index(i));
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn engine_ids_are_name_based_v3() {
        let id = EngineId::from_index(4);
        assert_eq!(id.as_uuid().get_version_num(), 3);
        assert_eq!(id.as_uuid().get_variant(), uuid::Variant::RFC4122);
    }

    #[test]
    fn engine_ids_match_previously_issued_values() {
        assert_eq!(
            EngineId::from_index(0).to_string(),
            "64a83380-e362-3471-aaa4-a606c5e5a985"
        );
        assert_eq!(
            EngineId::from_index(4).to_string(),
            "918b985e-6c19-37bf-b40f-28b7c702cb18"
        );
        assert_eq!(
            EngineId::from_index(10).to_string(),
            "98cefaca-d03f-3f75-9314-7b2577338d76"
        );
    }

    #[test]
    fn engine_id_serializes_as_string() {
        let id = EngineId::from_index(2);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: EngineId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn theme_accepts_only_known_indices() {
        assert_eq!(Theme::try_from(0), Ok(Theme::Auto));
        assert_eq!(Theme::try_from(1), Ok(Theme::Light));
        assert_eq!(Theme::try_from(2), Ok(Theme::Dark));
        assert_eq!(Theme::try_from(3), Err(InvalidTheme(3)));
        assert_eq!(Theme::try_from(-1), Err(InvalidTheme(-1)));
    }

    #[test]
    fn theme_round_trips_through_index() {
        for theme in [Theme::Auto, Theme::Light, Theme::Dark] {
            assert_eq!(Theme::try_from(theme.index()), Ok(theme));
        }
    }
}
