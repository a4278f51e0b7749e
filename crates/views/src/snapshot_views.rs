use crate::collections;
use crate::{build_view, CollectionTag, Record, Result, TaggedRef, View};
use tias_snapshot::SnapshotStore;

/// Every collection the evaluator reads, built once per evaluation.
#[derive(Debug, Clone, Default)]
pub struct SnapshotViews {
    pub factions: View,
    pub players: View,
    pub councilors: View,
    pub habs: View,
    pub hab_sites: View,
    pub space_bodies: View,
    pub control_points: View,
    pub nations: View,
    pub federations: View,
    pub fleets: View,
    pub orbits: View,
    pub regions: View,
}

impl SnapshotViews {
    pub fn build(store: &SnapshotStore) -> Result<Self> {
        let views = Self {
            factions: build_view(store, collections::FACTION)?,
            players: build_view(store, collections::PLAYER)?,
            councilors: build_view(store, collections::COUNCILOR)?,
            habs: build_view(store, collections::HAB)?,
            hab_sites: build_view(store, collections::HAB_SITE)?,
            space_bodies: build_view(store, collections::SPACE_BODY)?,
            control_points: build_view(store, collections::CONTROL_POINT)?,
            nations: build_view(store, collections::NATION)?,
            federations: build_view(store, collections::FEDERATION)?,
            fleets: build_view(store, collections::FLEET)?,
            orbits: build_view(store, collections::ORBIT)?,
            regions: build_view(store, collections::REGION)?,
        };
        log::debug!(
            "Views built: {} factions, {} habs, {} fleets, {} nations",
            views.factions.len(),
            views.habs.len(),
            views.fleets.len(),
            views.nations.len()
        );
        Ok(views)
    }

    /// Dispatch table from a reference tag to the view it points into.
    #[must_use]
    pub fn view_for(&self, tag: &CollectionTag) -> Option<&View> {
        match tag {
            CollectionTag::Faction => Some(&self.factions),
            CollectionTag::Player => Some(&self.players),
            CollectionTag::Councilor => Some(&self.councilors),
            CollectionTag::Hab => Some(&self.habs),
            CollectionTag::HabSite => Some(&self.hab_sites),
            CollectionTag::SpaceBody => Some(&self.space_bodies),
            CollectionTag::ControlPoint => Some(&self.control_points),
            CollectionTag::Nation => Some(&self.nations),
            CollectionTag::Federation => Some(&self.federations),
            CollectionTag::Fleet => Some(&self.fleets),
            CollectionTag::Orbit => Some(&self.orbits),
            CollectionTag::Region => Some(&self.regions),
            CollectionTag::Other(_) | CollectionTag::Untagged => None,
        }
    }

    /// Resolves a polymorphic reference through its tag. Untagged or
    /// unknown references never resolve.
    #[must_use]
    pub fn resolve_tagged(&self, record: &Record, field_path: &str) -> Option<TaggedRef> {
        let tagged = record.tagged_reference(field_path)?;
        let Some(view) = self.view_for(&tagged.tag) else {
            log::debug!(
                "Reference {}.{field_path} points into {}; not followed",
                record.key(),
                tagged.tag.short_name()
            );
            return None;
        };
        view.contains(tagged.key).then_some(tagged)
    }
}
