//! Publish-eligibility derivation.
//!
//! Given a set of items, their resolved sync statuses and the pending
//! curations, computes which items are publishable, which only need a
//! metadata push, and whether slot quota or an in-flight review blocks the
//! submission. The output is purely advisory; submission itself is the
//! orchestrator's job.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::{Item, ItemCuration, SyncStatus};

/// The combined action a publish submission would perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishAction {
    /// Nothing to submit
    None,
    /// Only new items to publish
    Publish,
    /// Only changed items to push
    PushChanges,
    /// Both new and changed items
    PublishAndPushChanges,
}

impl PublishAction {
    /// Whether the action would consume publish slots.
    pub fn implies_publishing(&self) -> bool {
        matches!(self, Self::Publish | Self::PublishAndPushChanges)
    }
}

/// A hard precondition preventing submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishBlock {
    /// A prior change is still under review; publishing must wait
    UnderReview {
        /// Items that have never been reviewed and are waiting on the slot
        items_trying_to_publish: usize,
    },
    /// The fixed slot quota does not cover the submission
    NotEnoughSlots,
}

/// Derived publish eligibility for a set of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishPlan {
    /// What a submission would do
    pub action: PublishAction,
    /// Item ids that would be published for the first time
    pub to_publish: Vec<String>,
    /// Item ids whose changes would be pushed
    pub to_push_changes: Vec<String>,
    /// Blocking condition, if any
    pub block: Option<PublishBlock>,
}

impl PublishPlan {
    /// Whether the plan can actually be submitted.
    pub fn is_submittable(&self) -> bool {
        self.block.is_none() && self.action != PublishAction::None
    }
}

/// Pushing changes is disallowed while a prior change for the same item is
/// still under review.
pub fn is_allowed_to_push_changes(
    status: Option<SyncStatus>,
    pending_curation: Option<&ItemCuration>,
) -> bool {
    status == Some(SyncStatus::Unsynced) && pending_curation.is_none()
}

/// Items that would be published for the first time.
pub fn items_to_publish<'a>(
    items: &'a [Item],
    statuses: &HashMap<String, SyncStatus>,
) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|item| statuses.get(&item.id) == Some(&SyncStatus::Unpublished))
        .collect()
}

/// Items whose local changes are eligible for a push.
pub fn items_with_changes<'a>(
    items: &'a [Item],
    statuses: &HashMap<String, SyncStatus>,
    curations: &[ItemCuration],
) -> Vec<&'a Item> {
    items
        .iter()
        .filter(|item| {
            is_allowed_to_push_changes(
                statuses.get(&item.id).copied(),
                pending_curation_for(curations, &item.id),
            )
        })
        .collect()
}

/// The slot gate: enough fixed-quota slots, or the paid on-demand flow.
///
/// The payments-enabled flow bypasses the fixed quota entirely since slots
/// are bought on demand.
pub fn has_enough_slots(slots: u64, item_count: usize, payments_enabled: bool) -> bool {
    slots >= item_count as u64 || slots > 0 || payments_enabled
}

/// Compute the full publish plan for a set of items.
pub fn publish_plan(
    items: &[Item],
    statuses: &HashMap<String, SyncStatus>,
    curations: &[ItemCuration],
    slots: u64,
    payments_enabled: bool,
) -> PublishPlan {
    let to_publish: Vec<String> = items_to_publish(items, statuses)
        .into_iter()
        .map(|item| item.id.clone())
        .collect();
    let to_push_changes: Vec<String> = items_with_changes(items, statuses, curations)
        .into_iter()
        .map(|item| item.id.clone())
        .collect();

    let action = match (!to_publish.is_empty(), !to_push_changes.is_empty()) {
        (true, true) => PublishAction::PublishAndPushChanges,
        (true, false) => PublishAction::Publish,
        (false, true) => PublishAction::PushChanges,
        (false, false) => PublishAction::None,
    };

    let has_pending_curations = curations.iter().any(|c| c.is_pending());
    let block = if has_pending_curations
        && (action.implies_publishing() || action == PublishAction::None)
    {
        // Items with no curation row at all are the ones stuck in the queue
        let items_trying_to_publish = items
            .iter()
            .filter(|item| !curations.iter().any(|c| c.item_id == item.id))
            .count();
        Some(PublishBlock::UnderReview {
            items_trying_to_publish,
        })
    } else if action.implies_publishing() && !has_enough_slots(slots, items.len(), payments_enabled)
    {
        Some(PublishBlock::NotEnoughSlots)
    } else {
        None
    };

    PublishPlan {
        action,
        to_publish,
        to_push_changes,
        block,
    }
}

fn pending_curation_for<'a>(curations: &'a [ItemCuration], item_id: &str) -> Option<&'a ItemCuration> {
    curations
        .iter()
        .find(|c| c.item_id == item_id && c.is_pending())
}
