use crate::domain::application::{ApplicationId, ApplicationStatus, JobApplication};
use crate::domain::position::generate_key_between;
use crate::domain::sorting::project;
use crate::error::{KisekiError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which half of the target card the pointer was over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Above,
    Below,
}

/// Where a card was dropped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DropTarget {
    /// Empty space in a column
    Column { status: ApplicationStatus },
    /// On top of another card
    Card {
        status: ApplicationStatus,
        card_id: ApplicationId,
        edge: Edge,
    },
}

impl DropTarget {
    pub fn status(&self) -> ApplicationStatus {
        match self {
            Self::Column { status } | Self::Card { status, .. } => *status,
        }
    }
}

/// A completed drag: which card, and where it landed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragGesture {
    pub card_id: ApplicationId,
    pub target: DropTarget,
}

impl DragGesture {
    pub fn onto_column(card_id: impl Into<ApplicationId>, status: ApplicationStatus) -> Self {
        Self {
            card_id: card_id.into(),
            target: DropTarget::Column { status },
        }
    }

    pub fn onto_card(
        card_id: impl Into<ApplicationId>,
        status: ApplicationStatus,
        target_card: impl Into<ApplicationId>,
        edge: Edge,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            target: DropTarget::Card {
                status,
                card_id: target_card.into(),
                edge,
            },
        }
    }
}

/// Resolved insertion point within the target column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    End,
    /// Index the card occupies once its old slot is removed
    Index(usize),
}

impl Placement {
    pub fn target_index(&self) -> Option<usize> {
        match self {
            Self::End => None,
            Self::Index(index) => Some(*index),
        }
    }
}

/// Insertion slot and the keys bounding it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    pub index: usize,
    pub lower: Option<&'a str>,
    pub upper: Option<&'a str>,
}

/// Outcome of planning a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReorderPlan {
    /// The card would land where it already is
    Unchanged,
    Move {
        card_id: ApplicationId,
        status: ApplicationStatus,
        index: usize,
        position: String,
    },
}

impl ReorderPlan {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Turns a gesture into a placement, or `None` when the drop is a no-op.
///
/// Indices on the screen are computed with the dragged card still in its
/// column. For a same-column drop every index after the card's current
/// slot is shifted down by one to account for the card leaving it.
pub fn resolve_drop(cards: &[JobApplication], gesture: &DragGesture) -> Result<Option<Placement>> {
    let dragged = find_card(cards, &gesture.card_id)?;
    let status = gesture.target.status().ensure_specified()?;

    let visible = project(cards, status);
    let current = if dragged.status == status {
        visible.iter().position(|card| card.id == dragged.id)
    } else {
        None
    };

    let target_index = match &gesture.target {
        DropTarget::Column { .. } => None,
        DropTarget::Card { card_id, edge, .. } => {
            match visible.iter().position(|card| &card.id == card_id) {
                Some(index) => Some(match edge {
                    Edge::Above => index,
                    Edge::Below => index + 1,
                }),
                None => {
                    debug!(
                        target_card = %card_id,
                        status = status.as_db_str(),
                        "drop target card not in column, placing at end"
                    );
                    None
                }
            }
        }
    };

    match (target_index, current) {
        (None, Some(current)) if current + 1 == visible.len() => Ok(None),
        (None, _) => Ok(Some(Placement::End)),
        (Some(raw), Some(current)) => {
            let index = if raw > current { raw - 1 } else { raw };
            if index == current {
                Ok(None)
            } else {
                Ok(Some(Placement::Index(index)))
            }
        }
        (Some(raw), None) => Ok(Some(Placement::Index(raw))),
    }
}

/// Finds the slot a card would occupy in `status`.
///
/// The column is projected without `dragged_id`. With no `target_index` the
/// slot is past the last card; an index at or past the end is clamped. A
/// slot above a card with an empty key moves down past the run of empty
/// keys, so the upper bound is always a real key.
pub fn find_slot<'a>(
    cards: &'a [JobApplication],
    dragged_id: Option<&ApplicationId>,
    status: ApplicationStatus,
    target_index: Option<usize>,
) -> Slot<'a> {
    let column: Vec<&JobApplication> = project(cards, status)
        .into_iter()
        .filter(|card| Some(&card.id) != dragged_id)
        .collect();

    let mut index = target_index.map_or(column.len(), |i| i.min(column.len()));
    if column
        .get(index)
        .is_some_and(|card| card.position.is_empty())
    {
        // Empty keys sort before every real key, so nothing fits above them
        index = column
            .iter()
            .take_while(|card| card.position.is_empty())
            .count();
    }
    let lower = index
        .checked_sub(1)
        .and_then(|i| column.get(i).copied())
        .and_then(position_key);
    let upper = column.get(index).copied().and_then(position_key);

    Slot {
        index,
        lower,
        upper,
    }
}

/// Computes the new position key for `dragged_id` dropped into `status`.
///
/// `target_index` is the index the card should have after its previous
/// occurrence has been removed from the column; `None` means the end.
pub fn plan_position(
    cards: &[JobApplication],
    dragged_id: &ApplicationId,
    status: ApplicationStatus,
    target_index: Option<usize>,
) -> Result<String> {
    find_card(cards, dragged_id)?;
    let slot = find_slot(cards, Some(dragged_id), status, target_index);
    generate_key_between(slot.lower, slot.upper)
}

/// Key for a brand new card placed at the end of `status`
pub fn position_at_end(cards: &[JobApplication], status: ApplicationStatus) -> Result<String> {
    let slot = find_slot(cards, None, status, None);
    generate_key_between(slot.lower, None)
}

/// Resolves a gesture and computes the resulting key in one step.
///
/// The gesture is resolved into a column slot, and the slot's neighbours
/// bound the new key. Only the dragged card's key changes.
pub fn plan_drop(cards: &[JobApplication], gesture: &DragGesture) -> Result<ReorderPlan> {
    let Some(placement) = resolve_drop(cards, gesture)? else {
        debug!(card = %gesture.card_id, "drop leaves card in place");
        return Ok(ReorderPlan::Unchanged);
    };

    let status = gesture.target.status();
    let slot = find_slot(cards, Some(&gesture.card_id), status, placement.target_index());
    let position = generate_key_between(slot.lower, slot.upper)?;

    debug!(
        card = %gesture.card_id,
        status = status.as_db_str(),
        index = slot.index,
        position = %position,
        "planned drop"
    );

    Ok(ReorderPlan::Move {
        card_id: gesture.card_id.clone(),
        status,
        index: slot.index,
        position,
    })
}

fn find_card<'a>(cards: &'a [JobApplication], id: &ApplicationId) -> Result<&'a JobApplication> {
    cards
        .iter()
        .find(|card| &card.id == id && !card.is_deleted())
        .ok_or_else(|| KisekiError::UnknownCard(id.to_string()))
}

/// Cards created before ordering existed carry an empty key; as a lower bound it is open
fn position_key(card: &JobApplication) -> Option<&str> {
    Some(card.position.as_str()).filter(|key| !key.is_empty())
}
