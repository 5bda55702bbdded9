//! Recency-ordered intrusive list backing the cache.
//!
//! Nodes live in an arena of slots and link to each other through slot
//! indices rather than references, so links stay valid when the arena
//! vector grows. Vacated slots are recycled through a free list.

/// Node in the recency list
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Doubly-linked list in MRU (head) to LRU (tail) order
pub(crate) struct RecencyList<K, V> {
    nodes: Vec<Option<Node<K, V>>>,
    free_list: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn head(&self) -> Option<usize> {
        self.head
    }

    pub(crate) fn tail(&self) -> Option<usize> {
        self.tail
    }

    /// Insert a new entry at the head and return its slot
    pub(crate) fn push_head(&mut self, key: K, value: V) -> usize {
        let idx = self.alloc_slot();
        self.nodes[idx] = Some(Node {
            key,
            value,
            prev: None,
            next: self.head,
        });

        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }

        self.head = Some(idx);
        if self.tail.is_none() {
            self.tail = Some(idx);
        }
        self.len += 1;
        idx
    }

    /// Relink an existing entry as the head
    pub(crate) fn move_to_head(&mut self, idx: usize) {
        if self.head == Some(idx) {
            return; // Already at head
        }

        self.detach(idx);

        if let Some(node) = &mut self.nodes[idx] {
            node.next = self.head;
        }
        if let Some(head_idx) = self.head {
            if let Some(head) = &mut self.nodes[head_idx] {
                head.prev = Some(idx);
            }
        }
        self.head = Some(idx);
    }

    /// Unlink and take the entry at `idx`, recycling its slot
    pub(crate) fn remove(&mut self, idx: usize) -> Option<(K, V)> {
        self.detach(idx);
        let node = self.nodes[idx].take()?;
        self.free_list.push(idx);
        self.len -= 1;
        Some((node.key, node.value))
    }

    /// Remove and return the LRU entry
    pub(crate) fn pop_tail(&mut self) -> Option<(K, V)> {
        let tail_idx = self.tail?;
        self.remove(tail_idx)
    }

    pub(crate) fn peek(&self, idx: usize) -> Option<(&K, &V)> {
        self.nodes[idx].as_ref().map(|node| (&node.key, &node.value))
    }

    pub(crate) fn value(&self, idx: usize) -> Option<&V> {
        self.nodes[idx].as_ref().map(|node| &node.value)
    }

    pub(crate) fn value_mut(&mut self, idx: usize) -> Option<&mut V> {
        self.nodes[idx].as_mut().map(|node| &mut node.value)
    }

    /// Iterate entries from head (MRU) to tail (LRU)
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            next: self.head,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Fix up neighbor and endpoint links around `idx` without freeing it
    fn detach(&mut self, idx: usize) {
        let (prev, next) = match &self.nodes[idx] {
            Some(node) => (node.prev, node.next),
            None => return,
        };

        match prev {
            Some(prev_idx) => {
                if let Some(prev_node) = &mut self.nodes[prev_idx] {
                    prev_node.next = next;
                }
            }
            None => {
                self.head = next;
            }
        }

        match next {
            Some(next_idx) => {
                if let Some(next_node) = &mut self.nodes[next_idx] {
                    next_node.prev = prev;
                }
            }
            None => {
                self.tail = prev;
            }
        }

        if let Some(node) = &mut self.nodes[idx] {
            node.prev = None;
            node.next = None;
        }
    }

    fn alloc_slot(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(None);
            idx
        }
    }
}

pub(crate) struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    next: Option<usize>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = self.list.nodes[idx].as_ref()?;
        self.next = node.next;
        Some((&node.key, &node.value))
    }
}
