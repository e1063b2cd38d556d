use std::ops::{Index, IndexMut};

/// Index of a node in its tree's arena. Ids stay valid until the node is
/// removed; rotations and removals of other nodes never move a node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

/// The side of a node a descent went to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    #[inline]
    pub(crate) fn flip(self) -> Dir {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// One side of a node. A `Thread` replaces an absent child and points at the
/// in-order neighbour on that side: the predecessor for a left thread, the
/// successor for a right thread. `Thread(None)` marks the first (left) or
/// last (right) node of the tree.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Link {
    Child(NodeId),
    Thread(Option<NodeId>),
}

impl Link {
    #[inline]
    pub(crate) fn child(self) -> Option<NodeId> {
        match self {
            Link::Child(id) => Some(id),
            Link::Thread(_) => None,
        }
    }

    #[inline]
    pub(crate) fn is_thread(self) -> bool {
        matches!(self, Link::Thread(_))
    }

    /// the child behind this link, for places where balance guarantees one
    #[inline]
    pub(crate) fn real(self) -> NodeId {
        match self {
            Link::Child(id) => id,
            Link::Thread(_) => unreachable!("thread found where the tree must have a child"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) left: Link,
    pub(crate) right: Link,
    pub(crate) color: Color,
}

impl<K, V> Node<K, V> {
    /// a red node with the given threads on both sides
    pub(crate) fn new(key: K, value: V, pred: Option<NodeId>, succ: Option<NodeId>) -> Self {
        Node {
            key,
            value,
            left: Link::Thread(pred),
            right: Link::Thread(succ),
            color: Color::Red,
        }
    }

    #[inline]
    pub(crate) fn link(&self, dir: Dir) -> Link {
        match dir {
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_link(&mut self, dir: Dir, link: Link) {
        match dir {
            Dir::Left => self.left = link,
            Dir::Right => self.right = link,
        }
    }

    #[inline]
    pub(crate) fn is_red(&self) -> bool {
        self.color == Color::Red
    }
}

/// Node storage. Removed slots go on a free list and are handed out again by
/// the next allocation, so ids of live nodes never change.
#[derive(Clone, Debug)]
pub(crate) struct Arena<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Arena {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Arena {
            nodes: Vec::with_capacity(n),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id.index()] = node;
                id
            }
            None => {
                let id = u32::try_from(self.nodes.len())
                    .map(NodeId)
                    .unwrap_or_else(|_| panic!("tree node capacity exceeded"));
                self.nodes.push(node);
                id
            }
        }
    }

    pub(crate) fn release(&mut self, id: NodeId) {
        self.free.push(id)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }

    /// number of slots, live or free
    #[allow(dead_code)]
    pub(crate) fn slots(&self) -> usize {
        self.nodes.len()
    }

    #[allow(dead_code)]
    pub(crate) fn free_slots(&self) -> usize {
        self.free.len()
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K, V> {
        &self.nodes[id.index()]
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.nodes[id.index()]
    }
}
