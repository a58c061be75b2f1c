/// Move the element at `from` to `to`, shifting the elements in between by one.
///
/// Returns `None` when `from == to` so the caller can skip replacing its list.
/// Panics if either index is outside `0..list.len()`.
#[track_caller]
pub fn reorder<T: Clone>(list: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    assert!(
        from < list.len() && to < list.len(),
        "reorder indices {from} -> {to} out of range 0..{}",
        list.len()
    );
    if from == to {
        return None;
    }

    let mut next = list.to_vec();
    let moved = next.remove(from);
    next.insert(to, moved);
    Some(next)
}

/// The end of a drag gesture over the meal list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropGesture {
    pub source: usize,

    /// Slot the item was released over; `None` when dropped outside the list.
    pub destination: Option<usize>,
}

impl DropGesture {
    pub fn new(source: usize, destination: Option<usize>) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// The `(from, to)` move this gesture asks for, if it asks for one.
    pub fn resolve(&self) -> Option<(usize, usize)> {
        match self.destination {
            Some(to) if to != self.source => Some((self.source, to)),
            _ => None,
        }
    }
}
