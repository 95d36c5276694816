use crate::domain::application::{ApplicationStatus, JobApplication};
use crate::domain::board::Column;
use std::cmp::Ordering;

/// Orders two cards by position key, byte-wise.
///
/// Equal keys can appear after concurrent inserts into the same slot from
/// different clients; those fall back to id order so every client renders
/// the same sequence.
pub fn compare_position(a: &JobApplication, b: &JobApplication) -> Ordering {
    a.position
        .as_bytes()
        .cmp(b.position.as_bytes())
        .then_with(|| a.id.cmp(&b.id))
}

/// Returns the cards of one column in display order
///
/// # Examples
/// ```
/// use kiseki_core::domain::sorting::project;
/// use kiseki_core::{ApplicationId, ApplicationStatus, JobApplication, NewApplication};
///
/// let cards = vec![
///     JobApplication::new(
///         ApplicationId::from("b"),
///         NewApplication::new("Globex", "SRE", ApplicationStatus::Applied).with_position("a1"),
///     ),
///     JobApplication::new(
///         ApplicationId::from("a"),
///         NewApplication::new("Acme", "Dev", ApplicationStatus::Applied).with_position("a0"),
///     ),
/// ];
///
/// let column = project(&cards, ApplicationStatus::Applied);
/// assert_eq!(column[0].company, "Acme");
/// ```
pub fn project(cards: &[JobApplication], status: ApplicationStatus) -> Vec<&JobApplication> {
    let mut column: Vec<&JobApplication> = cards
        .iter()
        .filter(|card| card.status == status && !card.is_deleted())
        .collect();
    column.sort_by(|a, b| compare_position(a, b));
    column
}

/// Projects every configured column, keeping configuration order
pub fn project_board<'a>(
    cards: &'a [JobApplication],
    columns: &[Column],
) -> Vec<(Column, Vec<&'a JobApplication>)> {
    columns
        .iter()
        .map(|column| (column.clone(), project(cards, column.status)))
        .collect()
}
