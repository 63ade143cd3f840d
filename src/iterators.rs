//! Lazy iterator combinators over run histories.
//!
//! - [`MergeSorted`]: k-way merge of several newest-first histories
//! - [`Limit`]: counting limit-while, stops for good at the first rejection

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::iter::FusedIterator;

use crate::domain::{Run, Runs};

/// Head of one merge source waiting to be emitted
struct Pending<'a, R> {
    run: &'a R,
    timestamp: i64,
    source: usize,
}

impl<R> PartialEq for Pending<'_, R> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R> Eq for Pending<'_, R> {}

impl<R> PartialOrd for Pending<'_, R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R> Ord for Pending<'_, R> {
    // Max-heap: latest timestamp wins, ties go to the lower source index.
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Merges newest-first run iterators into one newest-first iterator.
///
/// Holds at most one pending run per source; a source is only advanced after
/// its pending run has been emitted.
pub struct MergeSorted<'a, R> {
    sources: Vec<Runs<'a, R>>,
    heap: BinaryHeap<Pending<'a, R>>,
}

impl<'a, R: Run> MergeSorted<'a, R> {
    pub fn new(sources: Vec<Runs<'a, R>>) -> Self {
        let mut merge = Self {
            heap: BinaryHeap::with_capacity(sources.len()),
            sources,
        };
        for source in 0..merge.sources.len() {
            merge.advance(source);
        }
        merge
    }

    fn advance(&mut self, source: usize) {
        if let Some(run) = self.sources[source].next() {
            self.heap.push(Pending {
                run,
                timestamp: run.timestamp_ms(),
                source,
            });
        }
    }
}

impl<'a, R: Run> Iterator for MergeSorted<'a, R> {
    type Item = &'a R;

    fn next(&mut self) -> Option<&'a R> {
        let Pending { run, source, .. } = self.heap.pop()?;
        self.advance(source);
        Some(run)
    }
}

/// Yields items while `predicate(index, item)` holds.
///
/// `index` is the number of items already yielded. Once the predicate
/// rejects an item the iterator is exhausted, even if later items would pass.
pub struct Limit<I, P> {
    inner: I,
    predicate: P,
    index: usize,
    done: bool,
}

impl<I, P> Limit<I, P> {
    pub fn new(inner: I, predicate: P) -> Self {
        Self {
            inner,
            predicate,
            index: 0,
            done: false,
        }
    }
}

impl<I, P> Iterator for Limit<I, P>
where
    I: Iterator,
    P: FnMut(usize, &I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Some(item) if (self.predicate)(self.index, &item) => {
                self.index += 1;
                Some(item)
            }
            _ => {
                self.done = true;
                None
            }
        }
    }
}

impl<I, P> FusedIterator for Limit<I, P>
where
    I: Iterator,
    P: FnMut(usize, &I::Item) -> bool,
{
}
