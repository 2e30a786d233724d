use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::{FieldValue, Model, field::resolve_field};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending = 1,
    Descending = -1,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

pub type Comparator = Arc<dyn Fn(&FieldValue, &FieldValue) -> Ordering + Send + Sync>;

#[derive(Clone)]
pub enum SortBy {
    Direction(SortDirection),
    Comparator(Comparator),
}

impl From<SortDirection> for SortBy {
    fn from(direction: SortDirection) -> Self {
        SortBy::Direction(direction)
    }
}

#[derive(Clone)]
pub struct SortField {
    pub sort: SortBy,
    pub priority: i32,
}

impl SortField {
    fn compare(&self, a: &FieldValue, b: &FieldValue) -> Ordering {
        match &self.sort {
            SortBy::Direction(direction) => direction.apply(a.compare(b)),
            SortBy::Comparator(comparator) => comparator(a, b),
        }
    }
}

/// Multi-field sort order.
///
/// Fields are compared by priority, highest first; within one priority the
/// field declared first decides. The first non-equal comparison wins and a
/// full tie keeps the incoming order.
#[derive(Clone, Default)]
pub struct Sort {
    fields: Vec<(String, SortField)>,
}

impl fmt::Debug for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.fields
                    .iter()
                    .map(|(name, field)| (name, field.priority)),
            )
            .finish()
    }
}

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how `name` is sorted, replacing an earlier entry for that field.
    pub fn field(mut self, name: impl Into<String>, sort: impl Into<SortBy>, priority: i32) -> Self {
        let name = name.into();
        let field = SortField {
            sort: sort.into(),
            priority,
        };
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    pub fn asc(self, name: impl Into<String>) -> Self {
        self.field(name, SortDirection::Ascending, 0)
    }

    pub fn desc(self, name: impl Into<String>) -> Self {
        self.field(name, SortDirection::Descending, 0)
    }

    pub fn comparator<F>(self, name: impl Into<String>, comparator: F, priority: i32) -> Self
    where
        F: Fn(&FieldValue, &FieldValue) -> Ordering + Send + Sync + 'static,
    {
        self.field(name, SortBy::Comparator(Arc::new(comparator)), priority)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Stable sort by the declared fields, highest priority first.
    pub fn apply<T: Model>(&self, items: Vec<T>) -> Vec<T> {
        if self.fields.is_empty() {
            return items;
        }

        // 优先级高的字段先比较，同优先级保持声明顺序
        let mut order: Vec<&(String, SortField)> = self.fields.iter().collect();
        order.sort_by(|(_, a), (_, b)| b.priority.cmp(&a.priority));

        // 每条记录只取一次字段值
        let mut keyed: Vec<(Vec<FieldValue>, T)> = items
            .into_iter()
            .map(|item| {
                let keys = order
                    .iter()
                    .map(|(name, _)| resolve_field(&item, name))
                    .collect();
                (keys, item)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| {
            order
                .iter()
                .zip(a.iter().zip(b.iter()))
                .map(|((_, field), (a, b))| field.compare(a, b))
                .find(|ordering| ordering.is_ne())
                .unwrap_or(Ordering::Equal)
        });

        keyed.into_iter().map(|(_, item)| item).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Metadata, Model};

    #[derive(Clone, PartialEq, ::prost::Message, crate::Model)]
    #[model(collection = "runners")]
    struct Runner {
        #[meta]
        #[prost(message, optional, tag = "1")]
        meta: Option<Metadata>,

        #[prost(string, tag = "2")]
        name: String,

        #[prost(uint32, tag = "3")]
        team: u32,

        #[prost(double, tag = "4")]
        time: f64,

        #[prost(uint32, optional, tag = "5")]
        rank: Option<u32>,

        #[model(skip)]
        #[prost(message, optional, tag = "6")]
        pacer: Option<Metadata>,
    }

    fn runner(name: &str, team: u32, time: f64) -> Runner {
        Runner {
            meta: None,
            name: name.to_string(),
            team,
            time,
            rank: None,
            pacer: None,
        }
    }

    fn ranked(name: &str, rank: Option<u32>) -> Runner {
        Runner {
            rank,
            ..runner(name, 0, 0.0)
        }
    }

    /// Small deterministic generator so the larger cases need no extra crate.
    fn lcg(seed: &mut u64) -> u64 {
        *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        *seed >> 33
    }

    fn names(runners: &[Runner]) -> Vec<&str> {
        runners.iter().map(|r| r.name.as_str()).collect()
    }

    fn field_u64(runner: &Runner, name: &str) -> u64 {
        match runner.field(name) {
            Some(FieldValue::UInt(value)) => value,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn single_field_ascending_is_stable() {
        let sorted = Sort::new().asc("team").apply(vec![
            runner("a", 2, 1.0),
            runner("b", 1, 1.0),
            runner("c", 2, 1.0),
            runner("d", 1, 1.0),
        ]);
        assert_eq!(names(&sorted), vec!["b", "d", "a", "c"]);
        assert!(sorted.windows(2).all(|w| field_u64(&w[0], "team") <= field_u64(&w[1], "team")));
    }

    #[test]
    fn higher_priority_decides_first() {
        let sort = Sort::new()
            .field("time", SortDirection::Ascending, 0)
            .field("team", SortDirection::Descending, 1);
        let sorted = sort.apply(vec![
            runner("a", 1, 9.5),
            runner("b", 2, 10.1),
            runner("c", 1, 9.1),
            runner("d", 2, 9.9),
        ]);
        assert_eq!(names(&sorted), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn first_declared_field_wins_within_a_priority() {
        let sort = Sort::new().asc("team").desc("time");
        let sorted = sort.apply(vec![
            runner("a", 2, 1.0),
            runner("b", 1, 1.0),
            runner("c", 1, 3.0),
        ]);
        assert_eq!(names(&sorted), vec!["c", "b", "a"]);
    }

    #[test]
    fn custom_comparator() {
        let by_length = Sort::new().comparator(
            "name",
            |a, b| match (a, b) {
                (FieldValue::Str(a), FieldValue::Str(b)) => a.len().cmp(&b.len()),
                _ => Ordering::Equal,
            },
            0,
        );
        let sorted = by_length.apply(vec![
            runner("ccc", 0, 0.0),
            runner("a", 0, 0.0),
            runner("bb", 0, 0.0),
        ]);
        assert_eq!(names(&sorted), vec!["a", "bb", "ccc"]);
    }

    #[test]
    fn empty_sort_keeps_order() {
        let sorted = Sort::new().apply(vec![runner("z", 0, 0.0), runner("a", 0, 0.0)]);
        assert_eq!(names(&sorted), vec!["z", "a"]);
    }

    #[test]
    fn missing_values_sort_first_and_the_rest_stays_ordered() {
        let sorted = Sort::new().asc("rank").apply(vec![
            ranked("a", Some(3)),
            ranked("b", None),
            ranked("c", Some(1)),
        ]);
        assert_eq!(names(&sorted), vec!["b", "c", "a"]);

        let mut seed = 7;
        let runners: Vec<Runner> = (0..2000)
            .map(|i| {
                let roll = lcg(&mut seed);
                let rank = (roll % 3 != 0).then_some((roll % 500) as u32);
                ranked(&i.to_string(), rank)
            })
            .collect();
        let sorted = Sort::new().asc("rank").apply(runners);
        let ranks: Vec<Option<u32>> = sorted.iter().map(|r| r.rank).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));

        let sorted = Sort::new().desc("rank").apply(sorted);
        let ranks: Vec<Option<u32>> = sorted.iter().map(|r| r.rank).collect();
        assert!(ranks.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn nan_times_sort_after_every_number() {
        let mut seed = 11;
        let runners: Vec<Runner> = (0..2000)
            .map(|i| {
                let roll = lcg(&mut seed);
                let time = if roll % 4 == 0 {
                    f64::NAN
                } else {
                    (roll % 1000) as f64 / 10.0 - 20.0
                };
                runner(&i.to_string(), 0, time)
            })
            .collect();

        let sorted = Sort::new().asc("time").apply(runners);
        let split = sorted
            .iter()
            .position(|r| r.time.is_nan())
            .unwrap_or(sorted.len());
        assert!(split > 0);
        assert!(sorted[split..].iter().all(|r| r.time.is_nan()));
        assert!(sorted[..split].windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn unknown_fields_resolve_to_null_and_keep_order() {
        let input = vec![runner("z", 2, 1.0), runner("a", 1, 2.0), runner("m", 3, 0.5)];
        let sorted = Sort::new().asc("nickname").apply(input);
        assert_eq!(names(&sorted), vec!["z", "a", "m"]);

        let sorted = Sort::new()
            .field("nickname", SortDirection::Descending, 5)
            .asc("team")
            .apply(sorted);
        assert_eq!(names(&sorted), vec!["a", "z", "m"]);
    }

    #[test]
    fn skipped_fields_are_hidden_but_patchable() {
        assert_eq!(Runner::field_names(), vec!["name", "team", "time", "rank"]);

        let mut item = runner("a", 1, 1.0);
        assert_eq!(item.field("pacer"), None);
        assert_eq!(item.field("rank"), Some(FieldValue::Null));

        let pacer = crate::new_metadata();
        item.apply_patch(RunnerPatch::new().pacer(pacer.clone()).rank(4u32));
        assert_eq!(item.pacer, Some(pacer));
        assert_eq!(item.rank, Some(4));
        assert_eq!(item.name, "a");

        // 被跳过的字段对所有记录都视为 null
        let sorted = Sort::new()
            .asc("pacer")
            .apply(vec![item, runner("b", 0, 0.0)]);
        assert_eq!(names(&sorted), vec!["a", "b"]);
    }

    #[test]
    fn redeclaring_a_field_replaces_it() {
        let sort = Sort::new().asc("team").desc("team");
        let sorted = sort.apply(vec![runner("a", 1, 0.0), runner("b", 2, 0.0)]);
        assert_eq!(names(&sorted), vec!["b", "a"]);
    }
}
