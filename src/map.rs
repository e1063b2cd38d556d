use crate::{
    bounds::Bounds,
    error::{Error, Result},
    iter::{Cursor, CursorMut, Iter, Keys, Values},
    order::{Increment, Key, KeyComparator, Natural},
    submap::{SubMap, SubMapMut, SubMapRef},
    tree::Tree,
};
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Formatter},
    mem,
};

/// A sorted map from primitive keys to primitive values, stored as a
/// threaded red-black tree.
///
/// get, insert and remove run in O(log(N)) time. Iteration steps through
/// thread links in O(1) amortized time per entry, and the first and last
/// entries are cached. Keys are ordered by the comparator `C`, which defaults
/// to the key type's natural order.
///
/// Lookups that miss return `None`, or for the `*_or_default` and `put`
/// family, the map's default return value (zero unless configured).
///
/// # Examples
/// ```
/// use rbtree_primitive_map::RbTreeMap;
///
/// let mut m = RbTreeMap::<i32, f32>::new();
/// m.insert(5, 0.5);
/// m.insert(3, 0.3);
/// m.insert(8, 0.8);
///
/// assert_eq!(m.get(3), Some(0.3));
/// assert_eq!(m.get(4), None);
/// assert_eq!(m.get_or_default(4), 0.0);
/// assert_eq!(m.first_key(), Ok(3));
///
/// for (k, v) in &m {
///     println!("key {}, val: {}", k, v)
/// }
/// ```
pub struct RbTreeMap<K, V, C = Natural> {
    tree: Tree<K, V, C>,
    default_value: V,
}

impl<K, V, C> Clone for RbTreeMap<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Clone,
{
    fn clone(&self) -> Self {
        RbTreeMap {
            tree: self.tree.clone(),
            default_value: self.default_value.clone(),
        }
    }
}

impl<K, V> Default for RbTreeMap<K, V, Natural>
where
    K: Key,
    V: Copy + Default,
{
    fn default() -> Self {
        RbTreeMap::new()
    }
}

impl<K, V, C> Debug for RbTreeMap<K, V, C>
where
    K: Copy + Debug,
    V: Copy + Debug,
    C: KeyComparator<K>,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C> PartialEq for RbTreeMap<K, V, C>
where
    K: Copy + Debug + PartialEq,
    V: Copy + PartialEq,
    C: KeyComparator<K>,
{
    fn eq(&self, other: &RbTreeMap<K, V, C>) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K, V, C> Eq for RbTreeMap<K, V, C>
where
    K: Copy + Debug + Eq,
    V: Copy + Eq,
    C: KeyComparator<K>,
{
}

impl<K, V> FromIterator<(K, V)> for RbTreeMap<K, V, Natural>
where
    K: Key,
    V: Copy + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut m = RbTreeMap::new();
        m.extend(iter);
        m
    }
}

impl<K, V, C> Extend<(K, V)> for RbTreeMap<K, V, C>
where
    K: Copy + Debug,
    V: Copy,
    C: KeyComparator<K>,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a RbTreeMap<K, V, C>
where
    K: Copy + Debug,
    V: Copy,
    C: KeyComparator<K>,
{
    type Item = (K, V);
    type IntoIter = Iter<'a, K, V, C>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> RbTreeMap<K, V, Natural>
where
    K: Key,
    V: Copy + Default,
{
    /// Create a new empty map in natural key order
    pub fn new() -> Self {
        RbTreeMap::with_comparator(Natural)
    }

    /// Build a map from entries that are strictly ascending in natural
    /// order. This runs in O(N) and yields a perfectly balanced tree, which
    /// makes it much faster than inserting the entries one by one.
    ///
    /// # Examples
    /// ```
    /// use rbtree_primitive_map::{Error, RbTreeMap};
    ///
    /// let m = RbTreeMap::<i64, f64>::from_sorted((0..1000).map(|k| (k, k as f64))).unwrap();
    /// assert_eq!(m.len(), 1000);
    /// assert_eq!(m.get(500), Some(500.0));
    ///
    /// let err = RbTreeMap::<i64, f64>::from_sorted(vec![(2, 0.0), (1, 0.0)]);
    /// assert_eq!(err.err(), Some(Error::Unsorted { index: 1 }));
    /// ```
    pub fn from_sorted<I: IntoIterator<Item = (K, V)>>(elts: I) -> Result<Self> {
        RbTreeMap::from_sorted_with(Natural, elts)
    }
}

impl<K, V, C> RbTreeMap<K, V, C>
where
    K: Copy + Debug,
    V: Copy + Default,
    C: KeyComparator<K>,
{
    /// Create a new empty map ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        RbTreeMap {
            tree: Tree::new(cmp),
            default_value: V::default(),
        }
    }

    /// Build a map from entries that are strictly ascending under `cmp`, in
    /// O(N).
    pub fn from_sorted_with<I: IntoIterator<Item = (K, V)>>(cmp: C, elts: I) -> Result<Self> {
        let tree = Tree::from_sorted(cmp, elts.into_iter().collect())?;
        Ok(RbTreeMap {
            tree,
            default_value: V::default(),
        })
    }
}

impl<K, V, C> RbTreeMap<K, V, C>
where
    K: Copy + Debug,
    V: Copy,
    C: KeyComparator<K>,
{
    pub(crate) fn tree(&self) -> &Tree<K, V, C> {
        &self.tree
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree<K, V, C> {
        &mut self.tree
    }

    /// the comparator that orders this map
    pub fn comparator(&self) -> &C {
        self.tree.comparator()
    }

    /// the value returned by the `*_or_default` family and by `put`,
    /// `add_to` when a key is absent
    pub fn default_return_value(&self) -> V {
        self.default_value
    }

    pub fn set_default_return_value(&mut self, v: V) {
        self.default_value = v
    }

    /// builder form of `set_default_return_value`
    pub fn with_default_return_value(mut self, v: V) -> Self {
        self.default_value = v;
        self
    }

    /// get the number of entries in the map O(1)
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.len() == 0
    }

    /// remove every entry
    pub fn clear(&mut self) {
        self.tree.clear()
    }

    /// lookup the value bound to k. Runs in O(log(N)) time and constant
    /// space.
    pub fn get(&self, k: K) -> Option<V> {
        self.tree.find(k).map(|id| self.tree.value(id))
    }

    /// like `get`, but a miss returns the default return value
    pub fn get_or_default(&self, k: K) -> V {
        self.get(k).unwrap_or(self.default_value)
    }

    pub fn get_mut(&mut self, k: K) -> Option<&mut V> {
        let id = self.tree.find(k)?;
        Some(self.tree.value_mut(id))
    }

    pub fn contains_key(&self, k: K) -> bool {
        self.tree.find(k).is_some()
    }

    /// O(N) scan for a value
    pub fn contains_value(&self, v: V) -> bool
    where
        V: PartialEq,
    {
        self.values().any(|x| x == v)
    }

    /// Bind k to v, returning the previous binding if there was one.
    pub fn insert(&mut self, k: K, v: V) -> Option<V> {
        let (id, created) = self.tree.find_or_insert(k, v);
        if created {
            None
        } else {
            Some(mem::replace(self.tree.value_mut(id), v))
        }
    }

    /// like `insert`, but returns the default return value if k was unbound
    pub fn put(&mut self, k: K, v: V) -> V {
        self.insert(k, v).unwrap_or(self.default_value)
    }

    /// Bind k to v only if k is unbound. Returns the existing value
    /// otherwise, leaving it in place.
    pub fn insert_if_absent(&mut self, k: K, v: V) -> Option<V> {
        let (id, created) = self.tree.find_or_insert(k, v);
        if created {
            None
        } else {
            Some(self.tree.value(id))
        }
    }

    /// Return the value bound to k, binding it to `f(k)` first if k is
    /// unbound. Makes a single descent either way.
    pub fn compute_if_absent<F: FnOnce(K) -> V>(&mut self, k: K, f: F) -> V {
        let (id, created) = self.tree.find_or_insert(k, self.default_value);
        if created {
            *self.tree.value_mut(id) = f(k);
        }
        self.tree.value(id)
    }

    /// Bind k to v if k is unbound, otherwise to `f(old, v)`. Returns the
    /// new value.
    ///
    /// # Examples
    /// ```
    /// use rbtree_primitive_map::RbTreeMap;
    ///
    /// let mut m = RbTreeMap::<char, i32>::new();
    /// for c in "abracadabra".chars() {
    ///     m.merge(c, 1, |a, b| a + b);
    /// }
    /// assert_eq!(m.get('a'), Some(5));
    /// assert_eq!(m.get('r'), Some(2));
    /// ```
    pub fn merge<F: FnOnce(V, V) -> V>(&mut self, k: K, v: V, f: F) -> V {
        let (id, created) = self.tree.find_or_insert(k, v);
        if !created {
            let merged = f(self.tree.value(id), v);
            *self.tree.value_mut(id) = merged;
        }
        self.tree.value(id)
    }

    /// Add `incr` to the value bound to k, treating an unbound key as bound
    /// to the default return value. Returns the value before the addition.
    /// Integer values wrap on overflow.
    ///
    /// # Examples
    /// ```
    /// use rbtree_primitive_map::RbTreeMap;
    ///
    /// let mut counts = RbTreeMap::<i64, i64>::new();
    /// assert_eq!(counts.add_to(7, 2), 0);
    /// assert_eq!(counts.add_to(7, 3), 2);
    /// assert_eq!(counts.get(7), Some(5));
    ///
    /// let mut wrapping = RbTreeMap::<i32, u8>::new();
    /// wrapping.insert(1, 255);
    /// assert_eq!(wrapping.add_to(1, 1), 255);
    /// assert_eq!(wrapping.get(1), Some(0));
    /// ```
    pub fn add_to(&mut self, k: K, incr: V) -> V
    where
        V: Increment,
    {
        let (id, _) = self.tree.find_or_insert(k, self.default_value);
        let old = self.tree.value(id);
        *self.tree.value_mut(id) = old.increment(incr);
        old
    }

    /// Rebind k to v only if k is bound, returning the old value.
    pub fn replace(&mut self, k: K, v: V) -> Option<V> {
        let id = self.tree.find(k)?;
        Some(mem::replace(self.tree.value_mut(id), v))
    }

    /// like `replace`, but a miss returns the default return value
    pub fn replace_or_default(&mut self, k: K, v: V) -> V {
        self.replace(k, v).unwrap_or(self.default_value)
    }

    /// Remove the binding for k, returning its value. Removing an unbound
    /// key changes nothing. Runs in O(log(N)) time.
    pub fn remove(&mut self, k: K) -> Option<V> {
        self.tree.remove(k)
    }

    /// like `remove`, but a miss returns the default return value
    pub fn remove_or_default(&mut self, k: K) -> V {
        self.remove(k).unwrap_or(self.default_value)
    }

    /// the smallest key, O(1)
    pub fn first_key(&self) -> Result<K> {
        self.tree.first().map(|id| self.tree.key(id)).ok_or(Error::EmptyMap)
    }

    /// the largest key, O(1)
    pub fn last_key(&self) -> Result<K> {
        self.tree.last().map(|id| self.tree.key(id)).ok_or(Error::EmptyMap)
    }

    pub fn first_entry(&self) -> Option<(K, V)> {
        self.tree.first().map(|id| self.tree.entry(id))
    }

    pub fn last_entry(&self) -> Option<(K, V)> {
        self.tree.last().map(|id| self.tree.entry(id))
    }

    /// remove and return the entry with the smallest key
    pub fn pop_first(&mut self) -> Result<(K, V)> {
        let (k, v) = self.first_entry().ok_or(Error::EmptyMap)?;
        self.tree.remove(k);
        Ok((k, v))
    }

    /// remove and return the entry with the largest key
    pub fn pop_last(&mut self) -> Result<(K, V)> {
        let (k, v) = self.last_entry().ok_or(Error::EmptyMap)?;
        self.tree.remove(k);
        Ok((k, v))
    }

    /// iterate over all entries in ascending key order
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter::new(&self.tree, &Bounds::unbounded())
    }

    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V, C> {
        Values(self.iter())
    }

    /// Iterate over the entries whose keys sort after k, in ascending order.
    /// Positions itself in O(log(N)) time, the same way `cursor_from` does.
    ///
    /// # Examples
    /// ```
    /// use rbtree_primitive_map::RbTreeMap;
    ///
    /// let m: RbTreeMap<i32, i32> = (0..10).map(|k| (k * 2, k)).collect();
    /// assert_eq!(m.keys_from(7).collect::<Vec<_>>(), vec![8, 10, 12, 14, 16, 18]);
    /// assert_eq!(m.values_from(16).collect::<Vec<_>>(), vec![9]);
    /// ```
    pub fn iter_from(&self, k: K) -> Iter<'_, K, V, C> {
        Iter::new_from(&self.tree, &Bounds::unbounded(), k)
    }

    pub fn keys_from(&self, k: K) -> Keys<'_, K, V, C> {
        Keys(self.iter_from(k))
    }

    pub fn values_from(&self, k: K) -> Values<'_, K, V, C> {
        Values(self.iter_from(k))
    }

    /// a cursor positioned before the first entry
    pub fn cursor(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(&self.tree, Bounds::unbounded())
    }

    /// A cursor positioned just after k: stepping forward yields the first
    /// key greater than k, stepping back the greatest key less than or equal
    /// to k. Runs in O(log(N)) time.
    pub fn cursor_from(&self, k: K) -> Cursor<'_, K, V, C> {
        Cursor::new_at(&self.tree, Bounds::unbounded(), k)
    }

    pub fn cursor_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::new(&mut self.tree, Bounds::unbounded())
    }

    pub fn cursor_mut_from(&mut self, k: K) -> CursorMut<'_, K, V, C> {
        CursorMut::new_at(&mut self.tree, Bounds::unbounded(), k)
    }

    fn range_check(&self, from: K, to: K) -> Result<()> {
        if self.tree.comparator().compare(from, to) == Ordering::Greater {
            tracing::debug!(from = ?from, to = ?to, "rejected inverted range");
            Err(Error::InvalidRange {
                from: format!("{:?}", from),
                to: format!("{:?}", to),
            })
        } else {
            Ok(())
        }
    }

    /// a live view of the keys strictly less than `to`
    pub fn head_map(&self, to: K) -> SubMapRef<'_, K, V, C> {
        SubMap::new(self, Bounds { lower: None, upper: Some(to) })
    }

    /// a live view of the keys greater than or equal to `from`
    pub fn tail_map(&self, from: K) -> SubMapRef<'_, K, V, C> {
        SubMap::new(self, Bounds { lower: Some(from), upper: None })
    }

    /// A live view of the keys in `[from, to)`. Fails if `from` sorts after
    /// `to`.
    ///
    /// # Examples
    /// ```
    /// use rbtree_primitive_map::RbTreeMap;
    ///
    /// let m: RbTreeMap<i32, i32> = (1..=10).map(|k| (k, 0)).collect();
    /// let sub = m.sub_map(3, 7).unwrap();
    /// assert_eq!(sub.keys().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
    /// assert!(m.sub_map(7, 3).is_err());
    /// ```
    pub fn sub_map(&self, from: K, to: K) -> Result<SubMapRef<'_, K, V, C>> {
        self.range_check(from, to)?;
        Ok(SubMap::new(self, Bounds { lower: Some(from), upper: Some(to) }))
    }

    pub fn head_map_mut(&mut self, to: K) -> SubMapMut<'_, K, V, C> {
        SubMap::new(self, Bounds { lower: None, upper: Some(to) })
    }

    pub fn tail_map_mut(&mut self, from: K) -> SubMapMut<'_, K, V, C> {
        SubMap::new(self, Bounds { lower: Some(from), upper: None })
    }

    /// A live read/write view of the keys in `[from, to)`.
    ///
    /// # Examples
    /// ```
    /// use rbtree_primitive_map::{Error, RbTreeMap};
    ///
    /// let mut m: RbTreeMap<i32, i32> = (1..=10).map(|k| (k, 0)).collect();
    /// let mut sub = m.sub_map_mut(3, 7).unwrap();
    /// assert_eq!(sub.insert(3, 33), Ok(Some(0)));
    /// assert!(matches!(sub.insert(10, 1), Err(Error::OutOfRange { .. })));
    /// sub.clear();
    /// assert_eq!(m.keys().collect::<Vec<_>>(), vec![1, 2, 7, 8, 9, 10]);
    /// ```
    pub fn sub_map_mut(&mut self, from: K, to: K) -> Result<SubMapMut<'_, K, V, C>> {
        self.range_check(from, to)?;
        Ok(SubMap::new(self, Bounds { lower: Some(from), upper: Some(to) }))
    }
}

impl<K, V, C> RbTreeMap<K, V, C>
where
    K: Copy + Debug,
    V: Copy,
    C: KeyComparator<K>,
{
    #[allow(dead_code)]
    pub(crate) fn invariant(&self) {
        self.tree.invariant()
    }
}

#[cfg(feature = "serde")]
impl<K, V, C> serde::Serialize for RbTreeMap<K, V, C>
where
    K: serde::Serialize + Copy + Debug,
    V: serde::Serialize + Copy,
    C: KeyComparator<K>,
{
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(&k, &v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct RbTreeMapVisitor<K, V, C>(std::marker::PhantomData<(K, V, C)>);

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::de::Visitor<'de> for RbTreeMapVisitor<K, V, C>
where
    K: serde::Deserialize<'de> + Copy + Debug,
    V: serde::Deserialize<'de> + Copy + Default,
    C: KeyComparator<K> + Default,
{
    type Value = RbTreeMap<K, V, C>;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let cmp = C::default();
        let mut elts = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(kv) = access.next_entry()? {
            elts.push(kv);
        }
        // maps written by `serialize` are already in order
        let sorted = elts
            .windows(2)
            .all(|w: &[(K, V)]| cmp.compare(w[0].0, w[1].0) == Ordering::Less);
        if sorted {
            RbTreeMap::from_sorted_with(cmp, elts).map_err(serde::de::Error::custom)
        } else {
            let mut m = RbTreeMap::with_comparator(cmp);
            m.extend(elts);
            Ok(m)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::Deserialize<'de> for RbTreeMap<K, V, C>
where
    K: serde::Deserialize<'de> + Copy + Debug,
    V: serde::Deserialize<'de> + Copy + Default,
    C: KeyComparator<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(RbTreeMapVisitor(std::marker::PhantomData))
    }
}

macro_rules! primitive_maps {
    ($kname:ident: $k:ty => $($vname:ident: $v:ty),*) => {
        paste::paste! {
            $(
                #[doc = concat!(
                    "A red-black tree map from `", stringify!($k),
                    "` keys to `", stringify!($v), "` values."
                )]
                pub type [<$kname 2 $vname RbTreeMap>]<C = Natural> = RbTreeMap<$k, $v, C>;
            )*
        }
    };
}

macro_rules! all_primitive_maps {
    ($($kname:ident: $k:ty),*) => {
        $(
            primitive_maps!($kname: $k =>
                Int: i32, Long: i64, Short: i16, Byte: i8,
                Char: char, Float: f32, Double: f64, Boolean: bool);
        )*
    };
}

all_primitive_maps!(
    Int: i32, Long: i64, Short: i16, Byte: i8,
    Char: char, Float: f32, Double: f64, Boolean: bool
);

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn roundtrip_keeps_order_and_values() {
        let m: RbTreeMap<i32, f64> = (0..100).map(|k| (k * 3, k as f64 / 2.0)).collect();
        let json = serde_json::to_string(&m).unwrap();
        let back: RbTreeMap<i32, f64> = serde_json::from_str(&json).unwrap();
        back.invariant();
        assert_eq!(back, m);
    }

    #[test]
    fn unsorted_input_is_inserted() {
        let json = r#"{"5": 1, "1": 2, "3": 3}"#;
        let m: RbTreeMap<i64, i64> = serde_json::from_str(json).unwrap();
        m.invariant();
        assert_eq!(m.keys().collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn empty_map() {
        let m: RbTreeMap<i32, i32> = serde_json::from_str("{}").unwrap();
        assert!(m.is_empty());
        assert_eq!(serde_json::to_string(&m).unwrap(), "{}");
    }
}
