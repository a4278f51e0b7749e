//! # TIAS Views
//!
//! Typed, read-only views over one snapshot store.
//!
//! Each collection row is decoded once into a [`View`] (`EntityKey → Record`).
//! References between collections are followed with [`resolve`], which treats
//! null and dangling references as "no relation". Polymorphic references carry
//! a [`CollectionTag`] and are dispatched through [`SnapshotViews::view_for`].
//!
//! ```no_run
//! use std::path::Path;
//! use tias_snapshot::SnapshotStore;
//! use tias_views::{DerivedViews, SnapshotViews};
//!
//! fn main() -> tias_views::Result<()> {
//!     let store = SnapshotStore::open(Path::new("build/savegame_2027-08-01.db"))?;
//!     let views = SnapshotViews::build(&store)?;
//!     let derived = DerivedViews::build(&views)?;
//!     for hab in &derived.holdings.habs {
//!         println!("hab {hab} orbits {}", derived.hab_body_name(*hab));
//!     }
//!     Ok(())
//! }
//! ```

pub mod collections;
mod derived;
mod entity;
mod error;
mod snapshot_views;
mod view;

pub use collections::CollectionTag;
pub use derived::{
    councilor_hab_locations, fleet_body_names, hab_body_names, is_real_nation, player_faction,
    player_federations, real_member_count, DerivedViews, PlayerFaction, PlayerHoldings,
};
pub use entity::{EntityKey, Record, TaggedRef};
pub use error::{Result, ViewError};
pub use snapshot_views::SnapshotViews;
pub use view::{build_view, resolve, View};
