//! Runs one pipeline stage over every glyph with bounded concurrency.

use std::{collections::BTreeMap, panic::AssertUnwindSafe};

use iconir::types::GlyphName;
use log::{debug, error, trace};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::Error;

/// A fixed size worker pool for one stage.
///
/// [`StagePool::run`] returns only once every item has finished, which is what
/// makes a stage a barrier.
pub struct StagePool {
    name: &'static str,
    pool: ThreadPool,
}

impl StagePool {
    pub fn new(name: &'static str, concurrency: usize) -> Result<StagePool, Error> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .build()
            .map_err(|e| Error::ThreadPool(e.to_string()))?;
        Ok(StagePool { name, pool })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn concurrency(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Apply `work` to every item, at most [`StagePool::concurrency`] at a time.
    ///
    /// Each item gets its own result; a failing or panicking item doesn't
    /// affect the others. Results are keyed by glyph name.
    pub fn run<I, O, E, F, P>(
        &self,
        items: Vec<(GlyphName, I)>,
        work: F,
        on_panic: P,
    ) -> BTreeMap<GlyphName, Result<O, E>>
    where
        I: Send,
        O: Send,
        E: Send,
        F: Fn(&GlyphName, I) -> Result<O, E> + Sync,
        P: Fn(String) -> E + Sync,
    {
        let expected = items.len();
        debug!("{}: {} items, {} workers", self.name, expected, self.concurrency());

        let (send, recv) = crossbeam_channel::unbounded::<(GlyphName, Result<O, E>)>();
        self.pool.scope(|scope| {
            for (name, item) in items {
                let send = send.clone();
                let work = &work;
                let on_panic = &on_panic;
                let stage = self.name;
                scope.spawn(move |_| {
                    trace!("{stage}: start {name}");
                    // work must not share mutable state between items
                    let result =
                        match std::panic::catch_unwind(AssertUnwindSafe(|| work(&name, item))) {
                            Ok(result) => result,
                            Err(err) => {
                                let msg = get_panic_message(err);
                                error!("{stage}: {name} panicked: {msg}");
                                Err(on_panic(msg))
                            }
                        };
                    if let Err(e) = send.send((name.clone(), result)) {
                        error!("Unable to write {name} to completion channel: {e}");
                    }
                });
            }
        });
        drop(send);

        let results: BTreeMap<_, _> = recv.iter().collect();
        debug_assert_eq!(expected, results.len());
        results
    }
}

fn get_panic_message(msg: Box<dyn std::any::Any + Send + 'static>) -> String {
    match msg.downcast_ref::<&'static str>() {
        Some(s) => s.to_string(),
        None => match msg.downcast_ref::<String>() {
            Some(s) => s.to_owned(),
            None => "Box<dyn Any>".to_owned(),
        },
    }
}
