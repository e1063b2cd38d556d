use crate::{
    bounds::Bounds,
    error::{Error, Result},
    node::{Arena, Color, Dir, Link, Node, NodeId},
    order::KeyComparator,
};
use arrayvec::ArrayVec;
use std::{cmp::Ordering, fmt::Debug};

// a red-black tree holding at most 2^32 nodes is at most 64 levels deep.
// deletion records the successor walk on top of the descent and may grow the
// path by one during a sibling rotation.
const MAX_DEPTH: usize = 72;

/// the nodes a descent passed through and the side it took at each
type Path = ArrayVec<(NodeId, Dir), MAX_DEPTH>;

/// A threaded red-black tree. Absent children are replaced by links to the
/// in-order neighbours, so stepping forward or backward never needs a parent
/// pointer or a stack.
#[derive(Clone)]
pub(crate) struct Tree<K, V, C> {
    arena: Arena<K, V>,
    root: Option<NodeId>,
    first: Option<NodeId>,
    last: Option<NodeId>,
    len: usize,
    cmp: C,
}

impl<K, V, C> Tree<K, V, C>
where
    K: Copy,
    V: Copy,
    C: KeyComparator<K>,
{
    pub(crate) fn new(cmp: C) -> Self {
        Tree {
            arena: Arena::new(),
            root: None,
            first: None,
            last: None,
            len: 0,
            cmp,
        }
    }

    /// Build a balanced tree from strictly ascending entries in O(n).
    ///
    /// Entries are split at the median recursively. Every level but the
    /// deepest is full, so all nodes are black except the deepest level,
    /// which is red when it is not full.
    pub(crate) fn from_sorted(cmp: C, items: Vec<(K, V)>) -> Result<Self> {
        if let Some(i) = items
            .windows(2)
            .position(|w| cmp.compare(w[0].0, w[1].0) != Ordering::Less)
        {
            return Err(Error::Unsorted { index: i + 1 });
        }
        let n = items.len();
        let mut arena = Arena::with_capacity(n);
        let ids: Vec<NodeId> = items
            .into_iter()
            .map(|(k, v)| arena.alloc(Node::new(k, v, None, None)))
            .collect();
        for (i, id) in ids.iter().enumerate() {
            let node = &mut arena[*id];
            node.left = Link::Thread(i.checked_sub(1).map(|p| ids[p]));
            node.right = Link::Thread(ids.get(i + 1).copied());
        }
        let levels = (usize::BITS - n.leading_zeros()) as usize;
        let red_level = if (n + 1).is_power_of_two() {
            None
        } else {
            Some(levels - 1)
        };
        let root = Self::build(&mut arena, &ids, 0, red_level);
        tracing::trace!(len = n, "bulk loaded tree");
        Ok(Tree {
            arena,
            root,
            first: ids.first().copied(),
            last: ids.last().copied(),
            len: n,
            cmp,
        })
    }

    fn build(
        arena: &mut Arena<K, V>,
        ids: &[NodeId],
        depth: usize,
        red_level: Option<usize>,
    ) -> Option<NodeId> {
        if ids.is_empty() {
            return None;
        }
        let mid = ids.len() / 2;
        let id = ids[mid];
        if let Some(l) = Self::build(arena, &ids[..mid], depth + 1, red_level) {
            arena[id].left = Link::Child(l);
        }
        if let Some(r) = Self::build(arena, &ids[mid + 1..], depth + 1, red_level) {
            arena[id].right = Link::Child(r);
        }
        arena[id].color = if red_level == Some(depth) {
            Color::Red
        } else {
            Color::Black
        };
        Some(id)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn comparator(&self) -> &C {
        &self.cmp
    }

    #[inline]
    pub(crate) fn first(&self) -> Option<NodeId> {
        self.first
    }

    #[inline]
    pub(crate) fn last(&self) -> Option<NodeId> {
        self.last
    }

    #[inline]
    pub(crate) fn key(&self, id: NodeId) -> K {
        self.arena[id].key
    }

    #[inline]
    pub(crate) fn value(&self, id: NodeId) -> V {
        self.arena[id].value
    }

    #[inline]
    pub(crate) fn entry(&self, id: NodeId) -> (K, V) {
        let n = &self.arena[id];
        (n.key, n.value)
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, id: NodeId) -> &mut V {
        &mut self.arena[id].value
    }

    pub(crate) fn clear(&mut self) {
        tracing::trace!(len = self.len, "clearing tree");
        self.arena.clear();
        self.root = None;
        self.first = None;
        self.last = None;
        self.len = 0;
    }

    /// the node holding `k`
    pub(crate) fn find(&self, k: K) -> Option<NodeId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let n = &self.arena[id];
            cur = match self.cmp.compare(k, n.key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => n.left.child(),
                Ordering::Greater => n.right.child(),
            };
        }
        None
    }

    /// the node holding `k`, or else the last node on the search path for
    /// `k`, which is either its predecessor or its successor
    pub(crate) fn locate(&self, k: K) -> Option<NodeId> {
        let mut id = self.root?;
        loop {
            let n = &self.arena[id];
            let next = match self.cmp.compare(k, n.key) {
                Ordering::Equal => return Some(id),
                Ordering::Less => n.left.child(),
                Ordering::Greater => n.right.child(),
            };
            match next {
                Some(c) => id = c,
                None => return Some(id),
            }
        }
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        while let Link::Child(l) = self.arena[id].left {
            id = l
        }
        id
    }

    fn rightmost(&self, mut id: NodeId) -> NodeId {
        while let Link::Child(r) = self.arena[id].right {
            id = r
        }
        id
    }

    /// in-order successor
    #[inline]
    pub(crate) fn next(&self, id: NodeId) -> Option<NodeId> {
        match self.arena[id].right {
            Link::Thread(succ) => succ,
            Link::Child(r) => Some(self.leftmost(r)),
        }
    }

    /// in-order predecessor
    #[inline]
    pub(crate) fn prev(&self, id: NodeId) -> Option<NodeId> {
        match self.arena[id].left {
            Link::Thread(pred) => pred,
            Link::Child(l) => Some(self.rightmost(l)),
        }
    }

    /// the smallest node inside `bounds`
    pub(crate) fn first_in(&self, bounds: &Bounds<K>) -> Option<NodeId> {
        let e = match bounds.lower {
            None => self.first?,
            Some(lower) => {
                let e = self.locate(lower)?;
                if self.cmp.compare(self.key(e), lower) == Ordering::Less {
                    self.next(e)?
                } else {
                    e
                }
            }
        };
        if bounds.too_high(&self.cmp, self.key(e)) {
            None
        } else {
            Some(e)
        }
    }

    /// the largest node inside `bounds`
    pub(crate) fn last_in(&self, bounds: &Bounds<K>) -> Option<NodeId> {
        let e = match bounds.upper {
            None => self.last?,
            Some(upper) => {
                let e = self.locate(upper)?;
                if self.cmp.compare(self.key(e), upper) != Ordering::Less {
                    self.prev(e)?
                } else {
                    e
                }
            }
        };
        if bounds.too_low(&self.cmp, self.key(e)) {
            None
        } else {
            Some(e)
        }
    }

    #[inline]
    pub(crate) fn next_in(&self, id: NodeId, bounds: &Bounds<K>) -> Option<NodeId> {
        self.next(id)
            .filter(|n| !bounds.too_high(&self.cmp, self.key(*n)))
    }

    #[inline]
    pub(crate) fn prev_in(&self, id: NodeId, bounds: &Bounds<K>) -> Option<NodeId> {
        self.prev(id)
            .filter(|n| !bounds.too_low(&self.cmp, self.key(*n)))
    }

    /// The neighbours of `k` inside `bounds`: the largest node `<= k` and
    /// the smallest node `> k`.
    pub(crate) fn seek(&self, bounds: &Bounds<K>, k: K) -> (Option<NodeId>, Option<NodeId>) {
        let first = match self.first_in(bounds) {
            None => return (None, None),
            Some(first) => first,
        };
        if self.cmp.compare(k, self.key(first)) == Ordering::Less {
            return (None, Some(first));
        }
        let last = self.last_in(bounds);
        if let Some(last) = last {
            if self.cmp.compare(k, self.key(last)) != Ordering::Less {
                return (Some(last), None);
            }
        }
        match self.locate(k) {
            None => (None, None),
            Some(e) => {
                if self.cmp.compare(self.key(e), k) != Ordering::Greater {
                    (Some(e), self.next(e))
                } else {
                    (self.prev(e), Some(e))
                }
            }
        }
    }

    #[inline]
    fn is_red(&self, id: NodeId) -> bool {
        self.arena[id].is_red()
    }

    #[inline]
    fn is_red_link(&self, link: Link) -> bool {
        match link {
            Link::Child(id) => self.is_red(id),
            Link::Thread(_) => false,
        }
    }

    fn swap_colors(&mut self, a: NodeId, b: NodeId) {
        let ca = self.arena[a].color;
        self.arena[a].color = self.arena[b].color;
        self.arena[b].color = ca;
    }

    /// Rotate the `dir` child of `x` up into `x`'s place and return it. The
    /// caller relinks the returned node into `x`'s former parent.
    fn rotate(&mut self, x: NodeId, dir: Dir) -> NodeId {
        let y = self.arena[x].link(dir).real();
        let inner = match self.arena[y].link(dir.flip()) {
            Link::Child(c) => Link::Child(c),
            Link::Thread(_) => Link::Thread(Some(y)),
        };
        self.arena[x].set_link(dir, inner);
        self.arena[y].set_link(dir.flip(), Link::Child(x));
        y
    }

    fn replace_child(&mut self, parent: Option<(NodeId, Dir)>, id: NodeId) {
        match parent {
            None => self.root = Some(id),
            Some((p, dir)) => self.arena[p].set_link(dir, Link::Child(id)),
        }
    }

    #[inline]
    fn parent_at(path: &Path, i: usize) -> Option<(NodeId, Dir)> {
        i.checked_sub(1).map(|i| path[i])
    }

    /// Return the node holding `k`, inserting `(k, v)` if it is absent. The
    /// flag is true if the node was created. An existing node keeps its
    /// value; callers read or overwrite it through the returned id.
    pub(crate) fn find_or_insert(&mut self, k: K, v: V) -> (NodeId, bool) {
        let mut p = match self.root {
            Some(root) => root,
            None => {
                let id = self.arena.alloc(Node::new(k, v, None, None));
                self.arena[id].color = Color::Black;
                self.root = Some(id);
                self.first = Some(id);
                self.last = Some(id);
                self.len = 1;
                return (id, true);
            }
        };
        let mut path = Path::new();
        let e = loop {
            let dir = match self.cmp.compare(k, self.arena[p].key) {
                Ordering::Equal => return (p, false),
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
            };
            path.push((p, dir));
            match (dir, self.arena[p].link(dir)) {
                (_, Link::Child(c)) => p = c,
                (Dir::Right, Link::Thread(succ)) => {
                    let e = self.arena.alloc(Node::new(k, v, Some(p), succ));
                    if succ.is_none() {
                        self.last = Some(e)
                    }
                    self.arena[p].right = Link::Child(e);
                    break e;
                }
                (Dir::Left, Link::Thread(pred)) => {
                    let e = self.arena.alloc(Node::new(k, v, pred, Some(p)));
                    if pred.is_none() {
                        self.first = Some(e)
                    }
                    self.arena[p].left = Link::Child(e);
                    break e;
                }
            }
        };
        self.len += 1;
        self.insert_fixup(&path);
        (e, true)
    }

    // path[i] is the parent of the red node being fixed and records the side
    // that node hangs on
    fn insert_fixup(&mut self, path: &Path) {
        let mut i = path.len() - 1;
        while i > 0 && self.is_red(path[i].0) {
            let (g, side) = path[i - 1];
            let (x, xdir) = path[i];
            match self.arena[g].link(side.flip()) {
                Link::Child(uncle) if self.is_red(uncle) => {
                    self.arena[x].color = Color::Black;
                    self.arena[uncle].color = Color::Black;
                    self.arena[g].color = Color::Red;
                    if i < 3 {
                        break;
                    }
                    i -= 2;
                }
                _ => {
                    let y = if xdir == side {
                        x
                    } else {
                        let y = self.rotate(x, xdir);
                        self.arena[g].set_link(side, Link::Child(y));
                        y
                    };
                    self.arena[g].color = Color::Red;
                    self.arena[y].color = Color::Black;
                    let top = self.rotate(g, side);
                    self.replace_child(Self::parent_at(path, i - 1), top);
                    break;
                }
            }
        }
        if let Some(root) = self.root {
            self.arena[root].color = Color::Black
        }
    }

    /// Remove `k`, returning its value. A missing key changes nothing.
    pub(crate) fn remove(&mut self, k: K) -> Option<V> {
        let mut path = Path::new();
        let mut p = self.root?;
        loop {
            let dir = match self.cmp.compare(k, self.arena[p].key) {
                Ordering::Equal => break,
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
            };
            path.push((p, dir));
            p = self.arena[p].link(dir).child()?;
        }
        let removed = self.arena[p];
        if removed.left == Link::Thread(None) {
            self.first = self.next(p)
        }
        if removed.right == Link::Thread(None) {
            self.last = self.prev(p)
        }
        let parent = path.last().copied();
        match removed.right {
            Link::Thread(succ) => match removed.left {
                Link::Thread(pred) => match parent {
                    None => self.root = None,
                    Some((q, Dir::Right)) => self.arena[q].right = Link::Thread(succ),
                    Some((q, Dir::Left)) => self.arena[q].left = Link::Thread(pred),
                },
                Link::Child(l) => {
                    let pred = self.rightmost(l);
                    self.arena[pred].right = Link::Thread(succ);
                    self.replace_child(parent, l);
                }
            },
            Link::Child(mut r) => {
                if self.arena[r].left.is_thread() {
                    // the right child is the successor, promote it
                    self.arena[r].left = removed.left;
                    if let Link::Child(l) = removed.left {
                        let pred = self.rightmost(l);
                        self.arena[pred].right = Link::Thread(Some(r));
                    }
                    self.replace_child(parent, r);
                    self.swap_colors(r, p);
                    path.push((r, Dir::Right));
                } else {
                    let j = path.len();
                    // replaced by the successor once it is known
                    path.push((p, Dir::Right));
                    let s = loop {
                        path.push((r, Dir::Left));
                        let s = self.arena[r].left.real();
                        if self.arena[s].left.is_thread() {
                            break s;
                        }
                        r = s;
                    };
                    self.arena[r].left = match self.arena[s].right {
                        Link::Thread(_) => Link::Thread(Some(s)),
                        child => child,
                    };
                    self.arena[s].left = removed.left;
                    if let Link::Child(l) = removed.left {
                        let pred = self.rightmost(l);
                        self.arena[pred].right = Link::Thread(Some(s));
                    }
                    self.arena[s].right = removed.right;
                    self.swap_colors(s, p);
                    path[j] = (s, Dir::Right);
                    self.replace_child(parent, s);
                }
            }
        }
        if self.arena[p].color == Color::Black {
            self.remove_fixup(&mut path);
        }
        self.arena.release(p);
        self.len -= 1;
        Some(removed.value)
    }

    // the subtree on side path[i - 1].1 of path[i - 1].0 is one black node
    // short
    fn remove_fixup(&mut self, path: &mut Path) {
        let mut i = path.len();
        while i > 0 {
            let (q, dir) = path[i - 1];
            if let Link::Child(x) = self.arena[q].link(dir) {
                if self.is_red(x) {
                    self.arena[x].color = Color::Black;
                    break;
                }
            }
            let other = dir.flip();
            let mut w = self.arena[q].link(other).real();
            if self.is_red(w) {
                self.arena[w].color = Color::Black;
                self.arena[q].color = Color::Red;
                let top = self.rotate(q, other);
                self.replace_child(Self::parent_at(path, i - 1), top);
                // q moved one level down, below w
                if i == path.len() {
                    path.push((q, dir))
                } else {
                    path[i] = (q, dir)
                }
                path[i - 1] = (w, dir);
                i += 1;
                w = self.arena[q].link(other).real();
            }
            let near = self.arena[w].link(dir);
            let far = self.arena[w].link(other);
            if !self.is_red_link(near) && !self.is_red_link(far) {
                self.arena[w].color = Color::Red;
            } else {
                if !self.is_red_link(far) {
                    let y = near.real();
                    self.arena[y].color = Color::Black;
                    self.arena[w].color = Color::Red;
                    w = self.rotate(w, dir);
                    self.arena[q].set_link(other, Link::Child(w));
                }
                self.arena[w].color = self.arena[q].color;
                self.arena[q].color = Color::Black;
                let far = self.arena[w].link(other).real();
                self.arena[far].color = Color::Black;
                let top = self.rotate(q, other);
                self.replace_child(Self::parent_at(path, i - 1), top);
                break;
            }
            i -= 1;
        }
        if let Some(root) = self.root {
            self.arena[root].color = Color::Black
        }
    }

    /// number of levels
    #[allow(dead_code)]
    pub(crate) fn height(&self) -> usize {
        fn go<K, V>(arena: &Arena<K, V>, link: Link) -> usize {
            match link {
                Link::Thread(_) => 0,
                Link::Child(id) => {
                    let n = &arena[id];
                    1 + go(arena, n.left).max(go(arena, n.right))
                }
            }
        }
        self.root.map_or(0, |r| go(&self.arena, Link::Child(r)))
    }
}

impl<K, V, C> Tree<K, V, C>
where
    K: Copy + Debug,
    V: Copy,
    C: KeyComparator<K>,
{
    // returns the black height of the subtree, appending its nodes in order
    fn check_subtree(&self, id: NodeId, order: &mut Vec<NodeId>) -> usize {
        let n = self.arena[id];
        let side = |link: Link, order: &mut Vec<NodeId>| match link {
            Link::Thread(_) => 0,
            Link::Child(c) => {
                if n.is_red() && self.is_red(c) {
                    panic!("red node {:?} has a red child {:?}", n.key, self.key(c))
                }
                self.check_subtree(c, order)
            }
        };
        let lh = side(n.left, order);
        order.push(id);
        let rh = side(n.right, order);
        if lh != rh {
            panic!("black height differs below {:?}: {} vs {}", n.key, lh, rh)
        }
        lh + if n.is_red() { 0 } else { 1 }
    }

    #[allow(dead_code)]
    pub(crate) fn invariant(&self) {
        let mut order = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            if self.is_red(root) {
                panic!("root {:?} is red", self.key(root))
            }
            self.check_subtree(root, &mut order);
        }
        if order.len() != self.len {
            panic!("len is wrong {} vs {}", self.len, order.len())
        }
        if self.arena.slots() - self.arena.free_slots() != self.len {
            panic!(
                "arena holds {} live slots for {} entries",
                self.arena.slots() - self.arena.free_slots(),
                self.len
            )
        }
        for w in order.windows(2) {
            if self.cmp.compare(self.key(w[0]), self.key(w[1])) != Ordering::Less {
                panic!(
                    "keys out of order {:?} before {:?}",
                    self.key(w[0]),
                    self.key(w[1])
                )
            }
        }
        for (i, id) in order.iter().copied().enumerate() {
            let pred = i.checked_sub(1).map(|p| order[p]);
            let succ = order.get(i + 1).copied();
            let n = &self.arena[id];
            if let Link::Thread(t) = n.left {
                if t != pred {
                    panic!("left thread of {:?} is not its predecessor", n.key)
                }
            }
            if let Link::Thread(t) = n.right {
                if t != succ {
                    panic!("right thread of {:?} is not its successor", n.key)
                }
            }
            if self.prev(id) != pred || self.next(id) != succ {
                panic!("stepping from {:?} skips a neighbour", n.key)
            }
        }
        if self.first != order.first().copied() {
            panic!("cached first entry is wrong")
        }
        if self.last != order.last().copied() {
            panic!("cached last entry is wrong")
        }
        let bound = 2.0 * ((self.len + 1) as f64).log2();
        let h = self.height();
        if h as f64 > bound + 1e-9 {
            panic!("tree is unbalanced: height {} for {} entries", h, self.len)
        }
    }
}
