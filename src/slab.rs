use std::mem;
use std::num::NonZeroUsize;
use std::ops::{Index, IndexMut};

#[cfg(test)]
use static_assertions::const_assert_eq;

/// A stable handle to an occupied entry of a `Slab`
///
/// Stores the index plus one so that `Option<Ptr>`, which is how nodes link to each other, is no
/// larger than a `usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ptr(NonZeroUsize);

#[cfg(test)]
const_assert_eq!(mem::size_of::<Option<Ptr>>(), mem::size_of::<usize>());

impl Ptr {
    #[inline]
    fn from_index(index: usize) -> Self {
        // A `Vec` never holds more than `isize::MAX` entries, so this cannot saturate
        Ptr(NonZeroUsize::MIN.saturating_add(index))
    }

    #[inline]
    fn index(self) -> usize {
        self.0.get() - 1
    }
}

#[derive(Debug, Clone)]
enum Entry<T> {
    Occupied(T),
    /// Link to the next vacant entry, forming a stack of freed slots
    Vacant(Option<Ptr>),
}

/// Node storage for a tree: a `Vec` whose removed entries are recycled by later pushes
///
/// A `Ptr` returned by `push` keeps referring to the same value until that value is removed, no
/// matter how often the slab grows. Removing never shifts other entries.
#[derive(Debug, Clone)]
pub struct Slab<T> {
    entries: Vec<Entry<T>>,
    /// Most recently freed entry, if any
    next_vacant: Option<Ptr>,
    vacant: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_vacant: None,
            vacant: 0,
        }
    }
}

impl<T> Slab<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Returns the number of occupied entries
    pub fn len(&self) -> usize {
        self.entries.len() - self.vacant
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Returns the value at `ptr`, or `None` if that entry has been removed
    pub fn get(&self, ptr: Ptr) -> Option<&T> {
        match self.entries.get(ptr.index())? {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    pub fn get_mut(&mut self, ptr: Ptr) -> Option<&mut T> {
        match self.entries.get_mut(ptr.index())? {
            Entry::Occupied(value) => Some(value),
            Entry::Vacant(_) => None,
        }
    }

    /// Stores `value` in the most recently freed entry, or at the end if nothing is free
    pub fn push(&mut self, value: T) -> Ptr {
        let ptr = match self.next_vacant {
            Some(ptr) => ptr,
            None => {
                self.entries.push(Entry::Occupied(value));
                return Ptr::from_index(self.entries.len() - 1);
            },
        };

        let entry = &mut self.entries[ptr.index()];
        self.next_vacant = match mem::replace(entry, Entry::Occupied(value)) {
            Entry::Vacant(next) => next,
            Entry::Occupied(_) => unreachable!("bug: occupied entry {:?} on the free list", ptr),
        };
        self.vacant -= 1;

        ptr
    }

    /// Takes the value at `ptr` out of the slab, leaving the entry free for reuse
    ///
    /// Returns `None` if the entry was already removed. Capacity is unchanged.
    pub fn remove(&mut self, ptr: Ptr) -> Option<T> {
        let entry = self.entries.get_mut(ptr.index())?;
        if let Entry::Vacant(_) = entry {
            return None;
        }

        let value = match mem::replace(entry, Entry::Vacant(self.next_vacant)) {
            Entry::Occupied(value) => value,
            Entry::Vacant(_) => unreachable!(),
        };
        self.next_vacant = Some(ptr);
        self.vacant += 1;

        // Once nothing is occupied the free list is useless, start over from index 0
        if self.is_empty() {
            self.clear();
        }

        Some(value)
    }

    /// Drops every value, keeping the allocation. Every outstanding `Ptr` becomes dangling.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_vacant = None;
        self.vacant = 0;
    }

    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional)
    }

    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit()
    }
}

impl<T> Index<Ptr> for Slab<T> {
    type Output = T;

    fn index(&self, ptr: Ptr) -> &T {
        match self.get(ptr) {
            Some(value) => value,
            None => panic!("bug: dangling pointer {:?} into slab", ptr),
        }
    }
}

impl<T> IndexMut<Ptr> for Slab<T> {
    fn index_mut(&mut self, ptr: Ptr) -> &mut T {
        match self.get_mut(ptr) {
            Some(value) => value,
            None => panic!("bug: dangling pointer {:?} into slab", ptr),
        }
    }
}
