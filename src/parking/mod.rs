//! Parking entity hierarchy.
//!
//! ```text
//! ParkingLot → Area → Floor → ParkingSpace
//! ```
//!
//! Each kind knows its id field, its upstream resource and its default
//! columns, which is everything the hierarchical table needs to nest it.

pub mod client;

use std::fmt;
use std::str::FromStr;

use crate::tree::{ColumnDef, TableLevel};

pub use client::GatewayClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    ParkingLot,
    Area,
    Floor,
    ParkingSpace,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::ParkingLot,
        EntityKind::Area,
        EntityKind::Floor,
        EntityKind::ParkingSpace,
    ];

    /// Entity type name, as used in expansion keys.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::ParkingLot => "ParkingLot",
            EntityKind::Area => "Area",
            EntityKind::Floor => "Floor",
            EntityKind::ParkingSpace => "ParkingSpace",
        }
    }

    pub fn id_key(&self) -> &'static str {
        match self {
            EntityKind::ParkingLot => "parkingLotId",
            EntityKind::Area => "areaId",
            EntityKind::Floor => "floorId",
            EntityKind::ParkingSpace => "parkingSpaceId",
        }
    }

    /// Upstream collection path.
    pub fn resource(&self) -> &'static str {
        match self {
            EntityKind::ParkingLot => "parking-lots",
            EntityKind::Area => "areas",
            EntityKind::Floor => "floors",
            EntityKind::ParkingSpace => "parking-spaces",
        }
    }

    pub fn child(&self) -> Option<EntityKind> {
        match self {
            EntityKind::ParkingLot => Some(EntityKind::Area),
            EntityKind::Area => Some(EntityKind::Floor),
            EntityKind::Floor => Some(EntityKind::ParkingSpace),
            EntityKind::ParkingSpace => None,
        }
    }

    pub fn parent(&self) -> Option<EntityKind> {
        EntityKind::ALL.into_iter().find(|k| k.child() == Some(*self))
    }

    pub fn columns(&self) -> Vec<ColumnDef> {
        let id = ColumnDef::new(self.id_key(), "ID");
        match self {
            EntityKind::ParkingLot => vec![
                id,
                ColumnDef::new("name", "Tên bãi đỗ"),
                ColumnDef::new("address", "Địa chỉ"),
            ],
            EntityKind::Area => vec![
                id,
                ColumnDef::new("name", "Tên khu vực"),
                ColumnDef::new("vehicleType", "Loại xe"),
            ],
            EntityKind::Floor => vec![
                id,
                ColumnDef::new("name", "Tên tầng"),
                ColumnDef::new("capacity", "Sức chứa"),
            ],
            EntityKind::ParkingSpace => vec![
                id,
                ColumnDef::new("code", "Mã chỗ"),
                ColumnDef::new("status", "Trạng thái"),
            ],
        }
    }

    /// Table level for this kind with `depth` nested child levels below it.
    pub fn level(&self, depth: usize) -> TableLevel {
        let level = TableLevel::new(self.columns());
        match self.child() {
            Some(child) if depth > 0 => {
                level.with_child(child.name(), self.id_key(), child.level(depth - 1))
            }
            _ => level,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity type `{0}`")]
pub struct UnknownEntity(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntity;

    /// Accepts type names and resource paths, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.name().to_lowercase() == wanted || k.resource() == wanted)
            .ok_or_else(|| UnknownEntity(s.to_string()))
    }
}
