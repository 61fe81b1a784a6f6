//! Paginated query results.

use super::id::{EntityId, Keyed};

/// One page of a paginated query result: the entities plus the total
/// count across all pages.
///
/// This is the value type most caches store per
/// [`QueryKey`](crate::cache::QueryKey). The helpers below cover the three
/// structural updates optimistic patches perform: inserting or replacing
/// an entity, removing one, and swapping a placeholder id for the
/// server-assigned one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    /// The entities on this page.
    pub items: Vec<T>,
    /// Total number of entities across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// Creates a page from items and an overall count.
    #[must_use]
    pub const fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// An empty page with a zero count.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T: Keyed> Page<T> {
    /// Inserts the entity, or replaces the existing one with the same id.
    ///
    /// The total count grows only on insert.
    pub fn upsert(&mut self, entity: T) {
        match self.items.iter_mut().find(|item| item.id() == entity.id()) {
            Some(existing) => *existing = entity,
            None => {
                self.items.push(entity);
                self.total += 1;
            }
        }
    }

    /// Removes and returns the entity with the given id, shrinking the
    /// total count. Absent ids leave the page untouched.
    pub fn remove(&mut self, id: &EntityId) -> Option<T> {
        let position = self.items.iter().position(|item| item.id() == id)?;
        self.total = self.total.saturating_sub(1);
        Some(self.items.remove(position))
    }

    /// Rewrites the id of the entity currently identified by
    /// `placeholder`. Returns `false` if no such entity is on the page.
    ///
    /// Used during success reconciliation when the server's id for an
    /// optimistically created entity arrives.
    pub fn replace_id(&mut self, placeholder: &EntityId, server: EntityId) -> bool {
        match self.items.iter_mut().find(|item| item.id() == placeholder) {
            Some(entity) => {
                *entity.id_mut() = server;
                true
            }
            None => false,
        }
    }

    /// Finds an entity by id.
    #[must_use]
    pub fn find(&self, id: &EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Returns `true` if an entity with this id is on the page.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.find(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct Row {
        id: EntityId,
        label: &'static str,
    }

    impl Row {
        const fn new(id: EntityId, label: &'static str) -> Self {
            Self { id, label }
        }
    }

    impl Keyed for Row {
        fn id(&self) -> &EntityId {
            &self.id
        }

        fn id_mut(&mut self) -> &mut EntityId {
            &mut self.id
        }
    }

    #[rstest]
    fn upsert_inserts_and_grows_the_count() {
        let mut page = Page::empty();
        page.upsert(Row::new(EntityId::Server(1), "first"));
        page.upsert(Row::new(EntityId::Server(2), "second"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 2);
    }

    #[rstest]
    fn upsert_replaces_without_growing_the_count() {
        let mut page = Page::empty();
        page.upsert(Row::new(EntityId::Server(1), "before"));
        page.upsert(Row::new(EntityId::Server(1), "after"));
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].label, "after");
    }

    #[rstest]
    fn remove_shrinks_the_count() {
        let mut page = Page::new(vec![Row::new(EntityId::Server(1), "only")], 1);
        let removed = page.remove(&EntityId::Server(1));
        assert_eq!(removed.map(|row| row.label), Some("only"));
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[rstest]
    fn remove_of_absent_id_is_a_no_op() {
        let mut page = Page::new(vec![Row::new(EntityId::Server(1), "kept")], 1);
        assert!(page.remove(&EntityId::Server(99)).is_none());
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[rstest]
    fn replace_id_swaps_placeholder_for_server_id() {
        let placeholder = EntityId::Placeholder(1);
        let mut page = Page::new(vec![Row::new(placeholder, "fresh")], 1);

        assert!(page.replace_id(&placeholder, EntityId::Server(40)));
        assert!(page.contains(&EntityId::Server(40)));
        assert!(!page.contains(&placeholder));
    }

    #[rstest]
    fn replace_id_of_absent_placeholder_returns_false() {
        let mut page: Page<Row> = Page::empty();
        assert!(!page.replace_id(&EntityId::Placeholder(1), EntityId::Server(1)));
    }
}
