use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use log::trace;

use crate::{
    Error, Model,
    adapter::{KvPair, KvStream},
    codec::decode_record,
    filter::Predicate,
    utils::{id_from_key, is_valid_id},
};

/// How a [`ValueStream`] finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Ended,
    Failed(String),
}

enum StreamState {
    Active,
    Terminal(Outcome),
}

/// Decoded, filtered view over one adapter scan.
///
/// The stream is either active or terminal. Once terminal it delivers no
/// more records, and every later call returns the recorded outcome at once
/// instead of waiting on the exhausted source.
pub struct ValueStream<T> {
    source: KvStream,
    prefix: String,
    filter: Option<Predicate<T>>,
    state: StreamState,
}

impl<T: Model> ValueStream<T> {
    pub fn new(source: KvStream, prefix: impl Into<String>) -> Self {
        Self {
            source,
            prefix: prefix.into(),
            filter: None,
            state: StreamState::Active,
        }
    }

    pub fn with_filter(mut self, filter: Option<Predicate<T>>) -> Self {
        self.filter = filter;
        self
    }

    pub fn set_filter(&mut self, filter: Predicate<T>) {
        self.filter = Some(filter);
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, StreamState::Terminal(_))
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.state {
            StreamState::Active => None,
            StreamState::Terminal(outcome) => Some(outcome),
        }
    }

    pub fn stop(&mut self) {
        if !self.is_terminal() {
            trace!("value stream over {} stopped early", self.prefix);
            self.state = StreamState::Terminal(Outcome::Ended);
        }
    }

    /// Next record that passes the filter, or `None` once the scan ended.
    pub async fn next_record(&mut self) -> Result<Option<T>, Error> {
        loop {
            // 进入终态后不再读取数据源
            match &self.state {
                StreamState::Terminal(Outcome::Ended) => return Ok(None),
                StreamState::Terminal(Outcome::Failed(reason)) => {
                    return Err(Error::StreamFailed(reason.clone()));
                }
                StreamState::Active => {}
            }

            let pair = match self.source.next().await {
                None => {
                    self.state = StreamState::Terminal(Outcome::Ended);
                    return Ok(None);
                }
                Some(Err(err)) => return Err(self.fail(err)),
                Some(Ok(pair)) => pair,
            };

            let item = match self.decode(pair) {
                Ok(Some(item)) => item,
                Ok(None) => continue,
                Err(err) => return Err(self.fail(err)),
            };

            if self.filter.as_ref().is_none_or(|filter| filter(&item)) {
                return Ok(Some(item));
            }
        }
    }

    /// Feeds every passing record to `on_record` until the scan ends or the
    /// callback breaks. Returns the number of records delivered.
    pub async fn consume<F>(&mut self, mut on_record: F) -> Result<usize, Error>
    where
        F: FnMut(T) -> ControlFlow<()>,
    {
        let mut delivered = 0;
        while let Some(item) = self.next_record().await? {
            delivered += 1;
            if on_record(item).is_break() {
                self.stop();
                break;
            }
        }
        Ok(delivered)
    }

    /// Like [`consume`](Self::consume), awaiting the callback before the next
    /// record is read. Only the adapter's own page is buffered.
    pub async fn consume_async<F, Fut>(&mut self, mut on_record: F) -> Result<usize, Error>
    where
        F: FnMut(T) -> Fut,
        Fut: Future<Output = Result<ControlFlow<()>, Error>>,
    {
        let mut delivered = 0;
        while let Some(item) = self.next_record().await? {
            delivered += 1;
            if on_record(item).await?.is_break() {
                self.stop();
                break;
            }
        }
        Ok(delivered)
    }

    pub async fn until_end(&mut self) -> Result<(), Error> {
        while self.next_record().await?.is_some() {}
        Ok(())
    }

    pub fn into_stream(mut self) -> Pin<Box<dyn Stream<Item = Result<T, Error>> + Send>> {
        Box::pin(try_stream! {
            while let Some(item) = self.next_record().await? {
                yield item;
            }
        })
    }

    fn decode(&self, pair: KvPair) -> Result<Option<T>, Error> {
        let id = id_from_key(&self.prefix, pair.key)?;
        // 更深一层的键属于嵌套集合，跳过
        if !is_valid_id(&id) {
            trace!("value stream over {} skipped {}", self.prefix, id);
            return Ok(None);
        }
        decode_record(&id, &pair.value).map(Some)
    }

    fn fail(&mut self, err: Error) -> Error {
        self.state = StreamState::Terminal(Outcome::Failed(err.to_string()));
        err
    }
}
