//! Fully-qualified collection names and the tags used by polymorphic references.

use serde::Serialize;

const TYPE_PREFIX: &str = "PavonisInteractive.TerraInvicta.";

pub const FACTION: &str = "PavonisInteractive.TerraInvicta.TIFactionState";
pub const PLAYER: &str = "PavonisInteractive.TerraInvicta.TIPlayerState";
pub const COUNCILOR: &str = "PavonisInteractive.TerraInvicta.TICouncilorState";
pub const HAB: &str = "PavonisInteractive.TerraInvicta.TIHabState";
pub const HAB_SITE: &str = "PavonisInteractive.TerraInvicta.TIHabSiteState";
pub const SPACE_BODY: &str = "PavonisInteractive.TerraInvicta.TISpaceBodyState";
pub const CONTROL_POINT: &str = "PavonisInteractive.TerraInvicta.TIControlPoint";
pub const NATION: &str = "PavonisInteractive.TerraInvicta.TINationState";
pub const FEDERATION: &str = "PavonisInteractive.TerraInvicta.TIFederationState";
pub const FLEET: &str = "PavonisInteractive.TerraInvicta.TISpaceFleetState";
pub const ORBIT: &str = "PavonisInteractive.TerraInvicta.TIOrbitState";
pub const REGION: &str = "PavonisInteractive.TerraInvicta.TIRegionState";

/// Collection a polymorphic reference points into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionTag {
    Faction,
    Player,
    Councilor,
    Hab,
    HabSite,
    SpaceBody,
    ControlPoint,
    Nation,
    Federation,
    Fleet,
    Orbit,
    Region,
    /// A type the views do not project.
    Other(String),
    /// The reference carried no type tag.
    Untagged,
}

impl CollectionTag {
    /// Maps a `$type` tag onto a collection. Assembly qualifiers
    /// (`Type, Assembly-CSharp`) are ignored.
    #[must_use]
    pub fn from_type_name(type_name: &str) -> Self {
        let name = type_name.split(',').next().unwrap_or_default().trim();
        match name {
            FACTION => Self::Faction,
            PLAYER => Self::Player,
            COUNCILOR => Self::Councilor,
            HAB => Self::Hab,
            HAB_SITE => Self::HabSite,
            SPACE_BODY => Self::SpaceBody,
            CONTROL_POINT => Self::ControlPoint,
            NATION => Self::Nation,
            FEDERATION => Self::Federation,
            FLEET => Self::Fleet,
            ORBIT => Self::Orbit,
            REGION => Self::Region,
            "" => Self::Untagged,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn collection_key(&self) -> Option<&'static str> {
        match self {
            Self::Faction => Some(FACTION),
            Self::Player => Some(PLAYER),
            Self::Councilor => Some(COUNCILOR),
            Self::Hab => Some(HAB),
            Self::HabSite => Some(HAB_SITE),
            Self::SpaceBody => Some(SPACE_BODY),
            Self::ControlPoint => Some(CONTROL_POINT),
            Self::Nation => Some(NATION),
            Self::Federation => Some(FEDERATION),
            Self::Fleet => Some(FLEET),
            Self::Orbit => Some(ORBIT),
            Self::Region => Some(REGION),
            Self::Other(_) | Self::Untagged => None,
        }
    }

    /// Short type name without the publisher namespace, for log lines.
    #[must_use]
    pub fn short_name(&self) -> &str {
        match self {
            Self::Other(name) => name.strip_prefix(TYPE_PREFIX).unwrap_or(name),
            Self::Untagged => "untagged",
            tagged => tagged
                .collection_key()
                .and_then(|key| key.strip_prefix(TYPE_PREFIX))
                .unwrap_or_default(),
        }
    }
}
