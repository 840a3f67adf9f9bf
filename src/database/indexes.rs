//! Collection names and the unique keys every store backend enforces.

pub const CITIES: &str = "cities";
pub const ORGANISATIONS: &str = "organisations";
pub const HOSTELS: &str = "hostels";
pub const BLOCKS: &str = "blocks";
pub const ROOM_COMPONENTS: &str = "room_components";
pub const ROOM_TYPES: &str = "room_types";
pub const ORGANISATION_PROFILES: &str = "organisation_profiles";
pub const HOSTEL_PROFILES: &str = "hostel_profiles";
pub const BLOCK_PROFILES: &str = "block_profiles";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueIndex {
    pub collection: &'static str,
    pub field: &'static str,
}

impl UniqueIndex {
    /// Postgres index name, also used to map constraint violations back to a field
    pub fn name(&self) -> String {
        format!("documents_{}_{}_key", self.collection, self.field.to_ascii_lowercase())
    }
}

pub const UNIQUE_INDEXES: &[UniqueIndex] = &[
    UniqueIndex { collection: CITIES, field: "slug" },
    UniqueIndex { collection: ORGANISATIONS, field: "joinCode" },
    UniqueIndex { collection: ORGANISATION_PROFILES, field: "organisationId" },
    UniqueIndex { collection: HOSTEL_PROFILES, field: "hostelId" },
    UniqueIndex { collection: HOSTEL_PROFILES, field: "slug" },
    UniqueIndex { collection: BLOCK_PROFILES, field: "blockId" },
];

pub fn unique_fields(collection: &str) -> impl Iterator<Item = &'static str> + '_ {
    UNIQUE_INDEXES
        .iter()
        .filter(move |index| index.collection == collection)
        .map(|index| index.field)
}

pub fn index_by_name(name: &str) -> Option<&'static UniqueIndex> {
    UNIQUE_INDEXES.iter().find(|index| index.name() == name)
}
