//! Drag-and-drop reordering
//!
//! Admins reorder categories and resources by dragging one item over
//! another. The drop lands above or below the target depending on which half
//! of the target the pointer is over. After a move, positions are renumbered
//! densely from zero and only the rows whose position changed are reported
//! for persistence.

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

/// An item with a sortable position.
pub trait Positioned {
    /// Stable item id.
    fn item_id(&self) -> &str;

    /// Current position.
    fn position(&self) -> i32;

    /// Overwrite the position.
    fn set_position(&mut self, position: i32);
}

/// Where a dragged item lands relative to its target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DropPosition {
    /// Before the target
    Above,
    /// After the target
    Below,
}

impl DropPosition {
    /// Decide the drop position from the pointer's offset within the target.
    ///
    /// The upper half of the target drops above it.
    ///
    /// ```
    /// use library_catalog::DropPosition;
    ///
    /// assert_eq!(DropPosition::from_pointer(10, 40), DropPosition::Above);
    /// assert_eq!(DropPosition::from_pointer(30, 40), DropPosition::Below);
    /// ```
    pub fn from_pointer(offset: u32, height: u32) -> Self {
        if u64::from(offset) * 2 < u64::from(height) {
            DropPosition::Above
        } else {
            DropPosition::Below
        }
    }
}

/// A position change to persist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionUpdate {
    /// Item id
    pub id: String,
    /// New position
    pub position: i32,
}

/// Move `dragged_id` next to `target_id` and renumber the list.
///
/// Returns the updates for items whose position changed. Dropping an item on
/// itself is a no-op.
///
/// # Errors
///
/// `ItemNotFound` if either id is not in `items`
pub fn move_item<T: Positioned>(
    items: &mut Vec<T>,
    dragged_id: &str,
    target_id: &str,
    drop: DropPosition,
) -> CatalogResult<Vec<PositionUpdate>> {
    let from = index_of(items, dragged_id)?;
    let target = index_of(items, target_id)?;

    if from == target {
        return Ok(Vec::new());
    }

    let item = items.remove(from);
    let target = if from < target { target - 1 } else { target };
    let insert_at = match drop {
        DropPosition::Above => target,
        DropPosition::Below => target + 1,
    };
    items.insert(insert_at, item);

    Ok(renumber(items))
}

/// Renumber `items` densely from zero, returning the changed positions.
pub fn renumber<T: Positioned>(items: &mut [T]) -> Vec<PositionUpdate> {
    let mut updates = Vec::new();
    for (index, item) in items.iter_mut().enumerate() {
        let position = index as i32;
        if item.position() != position {
            item.set_position(position);
            updates.push(PositionUpdate {
                id: item.item_id().to_string(),
                position,
            });
        }
    }
    updates
}

fn index_of<T: Positioned>(items: &[T], id: &str) -> CatalogResult<usize> {
    items
        .iter()
        .position(|item| item.item_id() == id)
        .ok_or_else(|| CatalogError::ItemNotFound(id.to_string()))
}

/// In-progress drag state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSession {
    dragged: Option<String>,
    hover: Option<(String, DropPosition)>,
}

impl DragSession {
    /// Creates an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin dragging an item, discarding any previous drag.
    pub fn start(&mut self, id: impl Into<String>) {
        self.dragged = Some(id.into());
        self.hover = None;
    }

    /// Record the current hover target.
    pub fn hover(&mut self, target_id: impl Into<String>, drop: DropPosition) {
        if self.dragged.is_some() {
            self.hover = Some((target_id.into(), drop));
        }
    }

    /// Abandon the drag.
    pub fn cancel(&mut self) {
        self.dragged = None;
        self.hover = None;
    }

    /// Check if a drag is in progress.
    pub fn is_active(&self) -> bool {
        self.dragged.is_some()
    }

    /// Id of the item being dragged.
    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    /// Drop the dragged item at the last hover target.
    ///
    /// The session is reset whether or not the drop succeeds. A drag with no
    /// hover target moves nothing.
    ///
    /// # Errors
    ///
    /// `NoActiveDrag` if no drag was started, or `ItemNotFound` from
    /// [`move_item`]
    pub fn finish<T: Positioned>(&mut self, items: &mut Vec<T>) -> CatalogResult<Vec<PositionUpdate>> {
        let dragged = self.dragged.take().ok_or(CatalogError::NoActiveDrag)?;
        match self.hover.take() {
            Some((target, drop)) => move_item(items, &dragged, &target, drop),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Row {
        id: String,
        position: i32,
    }

    impl Positioned for Row {
        fn item_id(&self) -> &str {
            &self.id
        }
        fn position(&self) -> i32 {
            self.position
        }
        fn set_position(&mut self, position: i32) {
            self.position = position;
        }
    }

    fn rows(ids: &[&str]) -> Vec<Row> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| Row {
                id: id.to_string(),
                position: i as i32,
            })
            .collect()
    }

    fn ids(items: &[Row]) -> Vec<&str> {
        items.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_move_down_below() {
        let mut items = rows(&["a", "b", "c", "d"]);
        let updates = move_item(&mut items, "a", "c", DropPosition::Below).unwrap();

        assert_eq!(ids(&items), vec!["b", "c", "a", "d"]);
        assert_eq!(updates.len(), 3);
        assert!(!updates.iter().any(|u| u.id == "d"));
    }

    #[test]
    fn test_move_down_above() {
        let mut items = rows(&["a", "b", "c", "d"]);
        move_item(&mut items, "a", "c", DropPosition::Above).unwrap();
        assert_eq!(ids(&items), vec!["b", "a", "c", "d"]);
    }

    #[test]
    fn test_move_up_above() {
        let mut items = rows(&["a", "b", "c", "d"]);
        let updates = move_item(&mut items, "d", "b", DropPosition::Above).unwrap();

        assert_eq!(ids(&items), vec!["a", "d", "b", "c"]);
        assert_eq!(
            updates,
            vec![
                PositionUpdate { id: "d".into(), position: 1 },
                PositionUpdate { id: "b".into(), position: 2 },
                PositionUpdate { id: "c".into(), position: 3 },
            ]
        );
    }

    #[test]
    fn test_drop_on_self_is_noop() {
        let mut items = rows(&["a", "b"]);
        let updates = move_item(&mut items, "a", "a", DropPosition::Below).unwrap();
        assert!(updates.is_empty());
        assert_eq!(ids(&items), vec!["a", "b"]);
    }

    #[test]
    fn test_unknown_item() {
        let mut items = rows(&["a", "b"]);
        assert_eq!(
            move_item(&mut items, "zzz", "a", DropPosition::Above),
            Err(CatalogError::ItemNotFound("zzz".into()))
        );
    }

    #[test]
    fn test_renumber_fills_gaps() {
        let mut items = vec![
            Row { id: "a".into(), position: 0 },
            Row { id: "b".into(), position: 5 },
            Row { id: "c".into(), position: 9 },
        ];
        let updates = renumber(&mut items);
        assert_eq!(updates.len(), 2);
        assert_eq!(items[2].position, 2);
    }

    #[test]
    fn test_drag_session_lifecycle() {
        let mut items = rows(&["a", "b", "c"]);
        let mut session = DragSession::new();

        assert_eq!(session.finish(&mut items), Err(CatalogError::NoActiveDrag));

        session.start("c");
        session.hover("a", DropPosition::Above);
        assert!(session.is_active());
        session.finish(&mut items).unwrap();

        assert_eq!(ids(&items), vec!["c", "a", "b"]);
        assert!(!session.is_active());
    }

    #[test]
    fn test_cancel_and_hover_without_drag() {
        let mut session = DragSession::new();
        session.hover("a", DropPosition::Below);
        assert_eq!(session, DragSession::default());

        session.start("a");
        session.cancel();
        assert!(session.dragged().is_none());
    }

    #[test]
    fn test_pointer_halves() {
        assert_eq!(DropPosition::from_pointer(0, 10), DropPosition::Above);
        assert_eq!(DropPosition::from_pointer(5, 10), DropPosition::Below);
        assert_eq!(DropPosition::from_pointer(0, 0), DropPosition::Below);
    }

    proptest! {
        #[test]
        fn prop_move_keeps_dense_permutation(
            len in 2usize..12,
            from in 0usize..12,
            to in 0usize..12,
            below in any::<bool>(),
        ) {
            let names: Vec<String> = (0..len).map(|i| format!("r{}", i)).collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let mut items = rows(&refs);
            let drop = if below { DropPosition::Below } else { DropPosition::Above };

            move_item(&mut items, &names[from % len], &names[to % len], drop).unwrap();

            prop_assert_eq!(items.len(), len);
            for (i, item) in items.iter().enumerate() {
                prop_assert_eq!(item.position, i as i32);
            }
            let mut sorted: Vec<&str> = ids(&items);
            sorted.sort_unstable();
            let mut expected = refs.clone();
            expected.sort_unstable();
            prop_assert_eq!(sorted, expected);
        }
    }
}
