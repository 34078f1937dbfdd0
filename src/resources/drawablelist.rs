//! Copy-on-write collection of drawables shared by the canvas, the render
//! thread and the animation disposal thread.
//!
//! Readers grab an immutable snapshot (`Arc<Vec<_>>`) and iterate it without
//! holding any lock. Writers take a short write lock and use
//! [`Arc::make_mut`]: the vector is cloned only while a snapshot is still
//! alive, so a reader never observes a partially updated list.

use std::sync::{Arc, PoisonError, RwLock};

use crate::components::drawable::Drawable;

/// Shared handle to a drawable living in the scene.
pub type DrawableRef = Arc<dyn Drawable>;

/// Ordered, thread-safe drawable list. Cloning shares the same list.
#[derive(Clone, Default)]
pub struct DrawableList {
    items: Arc<RwLock<Arc<Vec<DrawableRef>>>>,
}

/// Identity comparison that ignores vtable pointers.
pub fn same_drawable<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl DrawableList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stable view of the current contents, in insertion order.
    pub fn snapshot(&self) -> Arc<Vec<DrawableRef>> {
        Arc::clone(&self.items.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn contains<T: ?Sized>(&self, target: &Arc<T>) -> bool {
        self.snapshot().iter().any(|d| same_drawable(d, target))
    }

    /// Append at the end (top of the paint order). No duplicate check.
    pub fn push(&self, drawable: DrawableRef) {
        let mut guard = self.items.write().unwrap_or_else(PoisonError::into_inner);
        Arc::make_mut(&mut *guard).push(drawable);
    }

    /// Remove `target` by identity. Returns `false` if it was not present.
    pub fn remove<T: ?Sized>(&self, target: &Arc<T>) -> bool {
        self.remove_first_where(|d| same_drawable(d, target)).is_some()
    }

    /// Remove the first drawable matching `pred` and return it.
    pub fn remove_first_where<F>(&self, pred: F) -> Option<DrawableRef>
    where
        F: Fn(&DrawableRef) -> bool,
    {
        let mut guard = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let index = guard.iter().position(pred)?;
        Some(Arc::make_mut(&mut *guard).remove(index))
    }

    /// Remove every drawable matching `pred`. Returns how many were removed.
    pub fn remove_all_where<F>(&self, pred: F) -> usize
    where
        F: Fn(&DrawableRef) -> bool,
    {
        let mut guard = self.items.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.iter().any(&pred) {
            return 0;
        }
        let items = Arc::make_mut(&mut *guard);
        let before = items.len();
        items.retain(|d| !pred(d));
        before - items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::drawable::Visibility;
    use crate::resources::pixmap::Surface;

    struct Dummy {
        visibility: Visibility,
    }

    impl Dummy {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                visibility: Visibility::default(),
            })
        }
    }

    impl Drawable for Dummy {
        fn paint(&self, _surface: &mut dyn Surface) {}
        fn visibility(&self) -> &Visibility {
            &self.visibility
        }
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let list = DrawableList::new();
        let a = Dummy::new();
        let b = Dummy::new();
        list.push(a.clone());
        list.push(b.clone());
        let snap = list.snapshot();
        assert!(same_drawable(&snap[0], &a));
        assert!(same_drawable(&snap[1], &b));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let list = DrawableList::new();
        list.push(Dummy::new());
        let stranger = Dummy::new();
        assert!(!list.remove(&stranger));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_twice_only_removes_once() {
        let list = DrawableList::new();
        let a = Dummy::new();
        list.push(a.clone());
        assert!(list.remove(&a));
        assert!(!list.remove(&a));
        assert!(list.is_empty());
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutation() {
        let list = DrawableList::new();
        let a = Dummy::new();
        list.push(a.clone());
        let before = list.snapshot();
        list.remove(&a);
        list.push(Dummy::new());
        list.push(Dummy::new());
        assert_eq!(before.len(), 1);
        assert!(same_drawable(&before[0], &a));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_remove_all_where_counts() {
        let list = DrawableList::new();
        let keep = Dummy::new();
        let drop_a = Dummy::new();
        let drop_b = Dummy::new();
        list.push(drop_a.clone());
        list.push(keep.clone());
        list.push(drop_b.clone());
        let removed =
            list.remove_all_where(|d| same_drawable(d, &drop_a) || same_drawable(d, &drop_b));
        assert_eq!(removed, 2);
        assert!(list.contains(&keep));
        assert_eq!(list.remove_all_where(|_| false), 0);
    }
}
