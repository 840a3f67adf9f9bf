//! Refuse deletion of a parent while dependent documents still reference it.
//!
//! The count and the delete are separate store calls; a child inserted in
//! between is not seen.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::indexes::{BLOCKS, CITIES, HOSTELS, ORGANISATIONS, ROOM_COMPONENTS, ROOM_TYPES};
use crate::database::repository::id_filter;
use crate::database::{DatabaseError, Document, DocumentStore};
use crate::error::ApiError;
use crate::filter::Filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    City,
    Organisation,
    Hostel,
    Block,
    RoomComponent,
    RoomType,
}

impl EntityKind {
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::City => CITIES,
            EntityKind::Organisation => ORGANISATIONS,
            EntityKind::Hostel => HOSTELS,
            EntityKind::Block => BLOCKS,
            EntityKind::RoomComponent => ROOM_COMPONENTS,
            EntityKind::RoomType => ROOM_TYPES,
        }
    }

    /// Lowercase singular, as used in messages
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::City => "city",
            EntityKind::Organisation => "organisation",
            EntityKind::Hostel => "hostel",
            EntityKind::Block => "block",
            EntityKind::RoomComponent => "room component",
            EntityKind::RoomType => "room type",
        }
    }

    /// Key in `blockingCounts`
    pub fn plural_key(&self) -> &'static str {
        match self {
            EntityKind::City => "cities",
            EntityKind::Organisation => "organisations",
            EntityKind::Hostel => "hostels",
            EntityKind::Block => "blocks",
            EntityKind::RoomComponent => "roomComponents",
            EntityKind::RoomType => "roomTypes",
        }
    }

    fn not_found(&self) -> String {
        let label = self.label();
        let mut chars = label.chars();
        match chars.next() {
            Some(first) => format!("{}{} not found", first.to_uppercase(), chars.as_str()),
            None => "Not found".to_string(),
        }
    }
}

/// Dependent collections checked before `parent` may go, in reporting order
fn dependents(parent: EntityKind, id: Uuid) -> Vec<(EntityKind, Value)> {
    match parent {
        EntityKind::Organisation => vec![(EntityKind::Hostel, json!({ "organisationId": id }))],
        EntityKind::City => vec![(EntityKind::Hostel, json!({ "cityId": id }))],
        EntityKind::Hostel => vec![
            (EntityKind::Block, json!({ "hostelId": id })),
            (EntityKind::RoomType, json!({ "hostelId": id })),
            (EntityKind::RoomComponent, json!({ "hostelId": id })),
        ],
        EntityKind::Block => vec![
            (EntityKind::RoomType, json!({ "blockId": id })),
            (EntityKind::RoomComponent, json!({ "blockId": id })),
        ],
        EntityKind::RoomComponent => vec![(EntityKind::RoomType, json!({ "components": id }))],
        EntityKind::RoomType => vec![],
    }
}

#[derive(Debug, Clone)]
pub struct DeletionCheck {
    pub parent: EntityKind,
    pub counts: Vec<(EntityKind, u64)>,
}

impl DeletionCheck {
    pub fn allowed(&self) -> bool {
        self.counts.iter().all(|(_, count)| *count == 0)
    }

    pub fn blocking_counts(&self) -> BTreeMap<String, u64> {
        self.counts
            .iter()
            .map(|(kind, count)| (kind.plural_key().to_string(), *count))
            .collect()
    }

    pub fn first_blocker(&self) -> Option<(EntityKind, u64)> {
        self.counts.iter().copied().find(|(_, count)| *count > 0)
    }

    /// `None` when deletion is allowed
    pub fn to_error(&self) -> Option<ApiError> {
        let (child, count) = self.first_blocker()?;
        let (message, count_key) = match (self.parent, child) {
            (EntityKind::RoomComponent, EntityKind::RoomType) => (
                format!(
                    "Cannot delete component. It is used by {} room type(s). Remove it from those room types first.",
                    count
                ),
                "roomTypesUsingComponent".to_string(),
            ),
            (parent, child) => (
                format!(
                    "Cannot delete {parent}. There are {count} {child}(s) associated with this {parent}. Please delete all {child}s first.",
                    parent = parent.label(),
                    child = child.label(),
                    count = count
                ),
                format!("{}Count", camel(child.label())),
            ),
        };
        Some(ApiError::DependencyBlocked {
            message,
            count_key,
            count,
            blocking_counts: self.blocking_counts(),
        })
    }
}

fn camel(label: &str) -> String {
    let mut out = String::new();
    let mut upper = false;
    for c in label.chars() {
        if c == ' ' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

pub async fn can_delete(
    store: &dyn DocumentStore,
    parent: EntityKind,
    id: Uuid,
) -> Result<DeletionCheck, DatabaseError> {
    let mut counts = Vec::new();
    for (child, conditions) in dependents(parent, id) {
        let count = store.count(child.collection(), &Filter::from_where(conditions)?).await?;
        counts.push((child, count));
    }
    Ok(DeletionCheck { parent, counts })
}

/// 404 when missing, `DependencyBlocked` while children exist, otherwise delete
pub async fn delete_guarded(
    store: &dyn DocumentStore,
    parent: EntityKind,
    id: Uuid,
) -> Result<Document, ApiError> {
    let filter = id_filter(id)?;
    if store.count(parent.collection(), &filter).await? == 0 {
        return Err(ApiError::not_found(parent.not_found()));
    }

    let check = can_delete(store, parent, id).await?;
    if let Some(err) = check.to_error() {
        warn!("Refused to delete {} {}: {}", parent.label(), id, err);
        return Err(err);
    }

    let deleted = store
        .delete_one(parent.collection(), &filter)
        .await?
        .ok_or_else(|| ApiError::not_found(parent.not_found()))?;
    info!("Deleted {} {}", parent.label(), id);
    Ok(deleted)
}
