use std::ops::ControlFlow;
use std::sync::Arc;

use log::debug;

use crate::{
    Datastore, Error, FilterExpr, Model, Pagination, Sort, StorageAdapter, ValueStream,
    filter::Predicate,
};

/// Read query: filter, then sort, then paginate.
///
/// Every query is a full scan of the collection unless an id is given, in
/// which case the record is read directly and the filter still applies.
pub struct Get<T, A> {
    store: Datastore<T, A>,
    filter: Option<Predicate<T>>,
    id: Option<String>,
    sort: Sort,
    pagination: Pagination,
}

impl<T: Model, A: StorageAdapter> Get<T, A> {
    pub(crate) fn new(store: Datastore<T, A>) -> Self {
        Self {
            store,
            filter: None,
            id: None,
            sort: Sort::default(),
            pagination: Pagination::default(),
        }
    }

    pub fn filter<F>(self, f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicate(Arc::new(f))
    }

    pub fn where_<F>(self, f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter(f)
    }

    pub fn predicate(mut self, predicate: Predicate<T>) -> Self {
        self.filter = Some(predicate);
        self
    }

    pub fn matching(self, expr: FilterExpr<T>) -> Self {
        self.predicate(expr.compile())
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn order_by(self, sort: Sort) -> Self {
        self.sort(sort)
    }

    pub fn paginate(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.pagination.skip = skip;
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.pagination.take = Some(take);
        self
    }

    pub async fn run(&self) -> Result<Vec<T>, Error> {
        let matched = self.collect(None).await?;
        let total = matched.len();
        let window = self.pagination.apply(self.sort.apply(matched));
        debug!(
            "get {}: {} of {} matching records",
            T::collection(),
            window.len(),
            total
        );
        Ok(window)
    }

    pub async fn result(&self) -> Result<Vec<T>, Error> {
        self.run().await
    }

    /// First record of the window, or `None`. Without a sort the scan stops
    /// as soon as that record is known.
    pub async fn first(&self) -> Result<Option<T>, Error> {
        if !self.sort.is_empty() {
            return Ok(self.run().await?.into_iter().next());
        }
        let head = self.collect(Some(self.pagination.skip.saturating_add(1))).await?;
        let first = self.pagination.apply(head).into_iter().next();
        debug!(
            "get {} first: {}",
            T::collection(),
            first.as_ref().and_then(|item| item.id()).unwrap_or("none")
        );
        Ok(first)
    }

    pub async fn one(&self) -> Result<Option<T>, Error> {
        self.first().await
    }

    pub async fn last(&self) -> Result<Option<T>, Error> {
        Ok(self.run().await?.pop())
    }

    /// Number of records in the paginated window.
    pub async fn count(&self) -> Result<usize, Error> {
        let matched = self.collect(self.pagination.end()).await?;
        let count = self.pagination.window_len(matched.len());
        debug!("get {} count: {}", T::collection(), count);
        Ok(count)
    }

    /// Filtered records in key order as they are scanned. Sort and
    /// pagination are not applied.
    pub fn stream(&self) -> ValueStream<T> {
        let filter = match (&self.id, &self.filter) {
            (None, filter) => filter.clone(),
            (Some(id), filter) => {
                let id = id.clone();
                let filter = filter.clone();
                Some(Arc::new(move |item: &T| {
                    item.id() == Some(id.as_str()) && filter.as_ref().is_none_or(|f| f(item))
                }) as Predicate<T>)
            }
        };
        self.store.values(filter)
    }

    fn passes(&self, item: &T) -> bool {
        self.filter.as_ref().is_none_or(|filter| filter(item))
    }

    /// Matching records in key order, stopping once `limit` are found.
    async fn collect(&self, limit: Option<usize>) -> Result<Vec<T>, Error> {
        if let Some(id) = &self.id {
            let item = self.store.read(id).await?;
            return Ok(item.into_iter().filter(|item| self.passes(item)).collect());
        }

        let mut matched = Vec::new();
        if limit == Some(0) {
            return Ok(matched);
        }
        self.store
            .values(self.filter.clone())
            .consume(|item| {
                matched.push(item);
                if limit.is_some_and(|limit| matched.len() >= limit) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await?;
        Ok(matched)
    }
}
