//! Specialized collection types
//!
//! [`LinkPool`] is an arena of doubly-linked list nodes. A node ("link")
//! carries one value and can be threaded into at most one list at a time.
//! Because links live in the pool rather than inside a list, a node keeps
//! its identity when it moves between lists, and unlinking a known handle is
//! O(1).

use slotmap::{new_key_type, SlotMap};
use thiserror::Error;

new_key_type! {
    /// Stable handle to a link node
    pub struct LinkId;

    /// Stable handle to a list header
    pub struct ListId;
}

/// Errors raised by list operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListError {
    /// The link is already threaded into a list
    #[error("Link is already owned by a list")]
    AlreadyLinked,

    /// Positional access past the end of the list
    #[error("Index {index} is out of range for a list of {len} elements")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current list length
        len: usize,
    },

    /// The link handle is stale
    #[error("Link handle does not exist")]
    InvalidLink,

    /// The list handle is stale
    #[error("List handle does not exist")]
    InvalidList,
}

#[derive(Debug)]
struct Link<T> {
    value: T,
    prev: Option<LinkId>,
    next: Option<LinkId>,
    owner: Option<ListId>,
}

#[derive(Debug, Default)]
struct ListHeader {
    head: Option<LinkId>,
    tail: Option<LinkId>,
    len: usize,
}

/// Arena of list headers and link nodes
#[derive(Debug)]
pub struct LinkPool<T> {
    links: SlotMap<LinkId, Link<T>>,
    lists: SlotMap<ListId, ListHeader>,
}

impl<T> LinkPool<T> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            links: SlotMap::with_key(),
            lists: SlotMap::with_key(),
        }
    }

    /// Allocate a new, empty list
    pub fn create_list(&mut self) -> ListId {
        self.lists.insert(ListHeader::default())
    }

    /// Unlink every node of a list and release its header
    pub fn destroy_list(&mut self, list: ListId) -> Result<(), ListError> {
        self.clear(list)?;
        self.lists.remove(list);
        Ok(())
    }

    /// Allocate a detached link carrying `value`
    pub fn create_link(&mut self, value: T) -> LinkId {
        self.links.insert(Link {
            value,
            prev: None,
            next: None,
            owner: None,
        })
    }

    /// Unlink (if needed) and release a link, returning its value
    pub fn destroy_link(&mut self, link: LinkId) -> Option<T> {
        if let Some(list) = self.owner(link) {
            self.remove(list, link);
        }
        self.links.remove(link).map(|l| l.value)
    }

    /// Value carried by a link
    pub fn value(&self, link: LinkId) -> Option<&T> {
        self.links.get(link).map(|l| &l.value)
    }

    /// Mutable value carried by a link
    pub fn value_mut(&mut self, link: LinkId) -> Option<&mut T> {
        self.links.get_mut(link).map(|l| &mut l.value)
    }

    /// List currently owning the link
    pub fn owner(&self, link: LinkId) -> Option<ListId> {
        self.links.get(link).and_then(|l| l.owner)
    }

    /// Following link in its list
    pub fn next(&self, link: LinkId) -> Option<LinkId> {
        self.links.get(link).and_then(|l| l.next)
    }

    /// Preceding link in its list
    pub fn prev(&self, link: LinkId) -> Option<LinkId> {
        self.links.get(link).and_then(|l| l.prev)
    }

    /// First link of a list
    pub fn first(&self, list: ListId) -> Option<LinkId> {
        self.lists.get(list).and_then(|h| h.head)
    }

    /// Last link of a list
    pub fn last(&self, list: ListId) -> Option<LinkId> {
        self.lists.get(list).and_then(|h| h.tail)
    }

    /// Number of links in a list (0 for a stale handle)
    pub fn len(&self, list: ListId) -> usize {
        self.lists.get(list).map_or(0, |h| h.len)
    }

    /// Whether a list has no links
    pub fn is_empty(&self, list: ListId) -> bool {
        self.len(list) == 0
    }

    /// Whether `link` is threaded into `list`
    pub fn contains(&self, list: ListId, link: LinkId) -> bool {
        self.owner(link) == Some(list)
    }

    /// Thread `link` into `list` so that it ends up at `index`
    ///
    /// `None` appends. Head and tail inserts are O(1); interior inserts walk
    /// from the head.
    pub fn insert(&mut self, list: ListId, link: LinkId, index: Option<usize>) -> Result<(), ListError> {
        let len = self.lists.get(list).ok_or(ListError::InvalidList)?.len;
        let node = self.links.get(link).ok_or(ListError::InvalidLink)?;
        if node.owner.is_some() {
            return Err(ListError::AlreadyLinked);
        }

        let index = index.unwrap_or(len);
        if index > len {
            return Err(ListError::IndexOutOfRange { index, len });
        }

        // The node currently at `index` becomes our successor.
        let next = if index == len {
            None
        } else {
            Some(self.link_at(list, index)?)
        };
        let prev = match next {
            Some(n) => self.links[n].prev,
            None => self.lists[list].tail,
        };

        {
            let node = &mut self.links[link];
            node.prev = prev;
            node.next = next;
            node.owner = Some(list);
        }

        match prev {
            Some(p) => self.links[p].next = Some(link),
            None => self.lists[list].head = Some(link),
        }
        match next {
            Some(n) => self.links[n].prev = Some(link),
            None => self.lists[list].tail = Some(link),
        }

        self.lists[list].len += 1;
        Ok(())
    }

    /// Append `link` to `list`
    pub fn push_back(&mut self, list: ListId, link: LinkId) -> Result<(), ListError> {
        self.insert(list, link, None)
    }

    /// Unlink `link` from `list` in O(1)
    ///
    /// A link that is not owned by `list` is left untouched.
    pub fn remove(&mut self, list: ListId, link: LinkId) -> LinkId {
        if !self.contains(list, link) {
            return link;
        }

        let (prev, next) = {
            let node = &mut self.links[link];
            let pair = (node.prev, node.next);
            node.prev = None;
            node.next = None;
            node.owner = None;
            pair
        };

        match prev {
            Some(p) => self.links[p].next = next,
            None => self.lists[list].head = next,
        }
        match next {
            Some(n) => self.links[n].prev = prev,
            None => self.lists[list].tail = prev,
        }

        self.lists[list].len -= 1;
        link
    }

    /// Unlink every node of a list
    pub fn clear(&mut self, list: ListId) -> Result<(), ListError> {
        let mut cursor = self.lists.get(list).ok_or(ListError::InvalidList)?.head;
        while let Some(link) = cursor {
            let node = &mut self.links[link];
            cursor = node.next;
            node.prev = None;
            node.next = None;
            node.owner = None;
        }

        self.lists[list] = ListHeader::default();
        Ok(())
    }

    /// Position of `link` in `list`
    pub fn index_of(&self, list: ListId, link: LinkId) -> Option<usize> {
        if !self.contains(list, link) {
            return None;
        }
        self.iter(list).position(|(id, _)| id == link)
    }

    /// Link at a position
    pub fn link_at(&self, list: ListId, index: usize) -> Result<LinkId, ListError> {
        let len = self.lists.get(list).ok_or(ListError::InvalidList)?.len;
        self.iter(list)
            .nth(index)
            .map(|(id, _)| id)
            .ok_or(ListError::IndexOutOfRange { index, len })
    }

    /// Front-to-back iteration over `(link, value)` pairs
    pub fn iter(&self, list: ListId) -> Iter<'_, T> {
        Iter {
            pool: self,
            cursor: self.first(list),
            reverse: false,
        }
    }

    /// Back-to-front iteration over `(link, value)` pairs
    pub fn iter_rev(&self, list: ListId) -> Iter<'_, T> {
        Iter {
            pool: self,
            cursor: self.last(list),
            reverse: true,
        }
    }

    /// Front-to-back iteration over the values only
    pub fn values(&self, list: ListId) -> impl Iterator<Item = &T> + '_ {
        self.iter(list).map(|(_, value)| value)
    }
}

impl<T: Clone> LinkPool<T> {
    /// Copy the values of a list into a fresh buffer
    pub fn snapshot(&self, list: ListId) -> Vec<T> {
        let mut buffer = Vec::with_capacity(self.len(list));
        buffer.extend(self.values(list).cloned());
        buffer
    }
}

impl<T> Default for LinkPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the links of one list
pub struct Iter<'a, T> {
    pool: &'a LinkPool<T>,
    cursor: Option<LinkId>,
    reverse: bool,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (LinkId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.pool.links.get(id)?;
        self.cursor = if self.reverse { node.prev } else { node.next };
        Some((id, &node.value))
    }
}
