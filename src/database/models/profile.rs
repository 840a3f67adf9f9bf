//! Public-facing profile documents, one per organisation, hostel or block.
//!
//! Profile content is free-form; the service only reads a few paths out of it.

use serde_json::Value;

use crate::database::indexes::{
    BLOCKS, BLOCK_PROFILES, HOSTELS, HOSTEL_PROFILES, ORGANISATIONS, ORGANISATION_PROFILES,
};
use crate::database::Document;
use crate::filter::filter_where::lookup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    Organisation,
    Hostel,
    Block,
}

impl ProfileKind {
    pub fn collection(&self) -> &'static str {
        match self {
            ProfileKind::Organisation => ORGANISATION_PROFILES,
            ProfileKind::Hostel => HOSTEL_PROFILES,
            ProfileKind::Block => BLOCK_PROFILES,
        }
    }

    /// Field holding the parent id; unique within the collection
    pub fn parent_key(&self) -> &'static str {
        match self {
            ProfileKind::Organisation => "organisationId",
            ProfileKind::Hostel => "hostelId",
            ProfileKind::Block => "blockId",
        }
    }

    pub fn parent_collection(&self) -> &'static str {
        match self {
            ProfileKind::Organisation => ORGANISATIONS,
            ProfileKind::Hostel => HOSTELS,
            ProfileKind::Block => BLOCKS,
        }
    }

    pub fn parent_label(&self) -> &'static str {
        match self {
            ProfileKind::Organisation => "Organisation",
            ProfileKind::Hostel => "Hostel",
            ProfileKind::Block => "Block",
        }
    }
}

/// Read-only view of the hostel profile fields the service acts on.
/// Fields of the wrong type read as absent.
#[derive(Debug, Clone, Copy)]
pub struct HostelProfileFields<'a>(pub &'a Document);

impl<'a> HostelProfileFields<'a> {
    fn text(&self, path: &str) -> Option<&'a str> {
        lookup(self.0, path)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn display_name(&self) -> Option<&'a str> {
        self.text("basicInfo.name")
    }

    pub fn banner_public_id(&self) -> Option<&'a str> {
        self.text("media.banner.publicId")
    }
}
