/// Skip/take window over an already filtered and sorted sequence.
/// `take: None` reads to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub skip: usize,
    pub take: Option<usize>,
}

impl Pagination {
    pub fn new(skip: usize, take: Option<usize>) -> Self {
        Self { skip, take }
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        if self.skip == 0 && self.take.is_none_or(|take| take >= items.len()) {
            return items;
        }
        items
            .into_iter()
            .skip(self.skip)
            .take(self.take.unwrap_or(usize::MAX))
            .collect()
    }

    /// Size of the window over a sequence of `total` items.
    pub fn window_len(&self, total: usize) -> usize {
        let rest = total.saturating_sub(self.skip);
        self.take.map_or(rest, |take| rest.min(take))
    }

    /// Number of leading items needed to fill the window, if bounded.
    pub fn end(&self) -> Option<usize> {
        self.take.map(|take| self.skip.saturating_add(take))
    }
}

pub fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Vec<T> {
    pagination.apply(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_clamped() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(paginate(items.clone(), Pagination::new(2, Some(3))), vec![2, 3, 4]);
        assert_eq!(paginate(items.clone(), Pagination::new(8, Some(5))), vec![8, 9]);
        assert!(paginate(items.clone(), Pagination::new(12, None)).is_empty());
        assert_eq!(paginate(items.clone(), Pagination::default()), items);
        assert!(paginate(items, Pagination::new(0, Some(0))).is_empty());
    }

    #[test]
    fn repeated_window_is_idempotent() {
        let items: Vec<u32> = (0..10).collect();
        for n in 0..=10 {
            let window = Pagination::new(0, Some(n));
            let once = paginate(items.clone(), window);
            assert_eq!(paginate(once.clone(), window), once);
        }
    }

    #[test]
    fn window_len_matches_apply() {
        for total in 0..8usize {
            for skip in 0..5 {
                for take in [None, Some(0), Some(2), Some(10)] {
                    let window = Pagination::new(skip, take);
                    let items: Vec<usize> = (0..total).collect();
                    assert_eq!(window.window_len(total), window.apply(items).len());
                }
            }
        }
    }
}
