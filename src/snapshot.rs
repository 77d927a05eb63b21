use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// One producer invocation's result, in the order the producer returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Items<I> {
    items: Vec<I>,
}

impl<I> Items<I> {
    pub(crate) fn new(items: Vec<I>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&I> {
        self.items.get(position)
    }

    pub fn first(&self) -> Option<&I> {
        self.items.first()
    }

    pub fn find<F>(&self, predicate: F) -> Option<&I>
    where
        F: Fn(&I) -> bool,
    {
        self.items.iter().find(|item| predicate(item))
    }

    pub fn position<F>(&self, predicate: F) -> Option<usize>
    where
        F: Fn(&I) -> bool,
    {
        self.items.iter().position(predicate)
    }

    pub fn contains(&self, item: &I) -> bool
    where
        I: PartialEq,
    {
        self.items.contains(item)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, I> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[I] {
        &self.items
    }
}

impl<'a, I> IntoIterator for &'a Items<I> {
    type IntoIter = std::slice::Iter<'a, I>;
    type Item = &'a I;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A snapshot together with the key index built from it. Both are created at once and never patched afterwards.
#[derive(Debug, Clone)]
pub struct IndexedItems<I, K> {
    items: Arc<Items<I>>,
    // Key -> position in items. Later positions win on duplicate keys.
    index: HashMap<K, usize>,
}

impl<I, K> IndexedItems<I, K>
where
    K: Hash + Eq + Clone,
{
    pub(crate) fn build<F>(items: Vec<I>, key_of: F) -> (Self, Vec<K>)
    where
        F: Fn(&I) -> K,
    {
        let mut index = HashMap::with_capacity(items.len());
        let mut duplicates = Vec::new();
        for (position, item) in items.iter().enumerate() {
            let key = key_of(item);
            if index.insert(key.clone(), position).is_some() {
                duplicates.push(key);
            }
        }
        (
            Self {
                items: Arc::new(Items::new(items)),
                index,
            },
            duplicates,
        )
    }

    pub fn items(&self) -> &Items<I> {
        &self.items
    }

    pub(crate) fn shared_items(&self) -> Arc<Items<I>> {
        Arc::clone(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_by_key<Q>(&self, key: &Q) -> Option<&I>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(key).and_then(|position| self.items.get(*position))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Distinct keys ordered by the position of the item they resolve to.
    pub fn keys(&self) -> Vec<&K> {
        let mut keys = self.index.iter().collect::<Vec<_>>();
        keys.sort_by_key(|(_, position)| **position);
        keys.into_iter().map(|(key, _)| key).collect()
    }
}

/// Owned iterator over a single snapshot. Holding it keeps that snapshot alive even if the container is invalidated
/// or refreshed in the meantime.
#[derive(Debug)]
pub struct ItemsIter<I> {
    items: Arc<Items<I>>,
    next:  usize,
}

impl<I> ItemsIter<I> {
    pub(crate) fn new(items: Arc<Items<I>>) -> Self {
        Self { items, next: 0 }
    }
}

impl<I> Iterator for ItemsIter<I>
where
    I: Clone,
{
    type Item = I;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.get(self.next).cloned();
        if item.is_some() {
            self.next += 1;
        }
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl<I> ExactSizeIterator for ItemsIter<I> where I: Clone {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_last_wins() {
        let (indexed, duplicates) = IndexedItems::build(vec![("a", 1), ("b", 2), ("a", 3)], |(k, _)| k.to_string());
        assert_eq!(indexed.len(), 3);
        assert_eq!(indexed.get_by_key("a"), Some(&("a", 3)));
        assert_eq!(indexed.get_by_key("b"), Some(&("b", 2)));
        assert!(!indexed.contains_key("c"));
        assert_eq!(duplicates, vec!["a".to_string()]);
        assert_eq!(indexed.keys(), vec![&"b".to_string(), &"a".to_string()]);
    }

    #[test]
    fn test_items_lookups() {
        let items = Items::new(vec!["a", "b", "c"]);
        assert_eq!(items.first(), Some(&"a"));
        assert_eq!(items.find(|i| *i > "a"), Some(&"b"));
        assert_eq!(items.position(|i| *i == "c"), Some(2));
        assert!(items.contains(&"b"));
        assert!(!items.contains(&"d"));
        assert_eq!(Items::<u8>::new(vec![]).first(), None);
    }

    #[test]
    fn test_items_iter() {
        let items = Arc::new(Items::new(vec![1, 2, 3]));
        let iter = ItemsIter::new(Arc::clone(&items));
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(items.iter().sum::<i32>(), 6);
    }
}
