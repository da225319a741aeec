//! Instrumentation Module
//!
//! Wraps an operation with a chain of [`CallHook`]s that record facts about
//! each invocation in the key-value store, and reads those records back.
//!
//! # Hook order
//!
//! Every hook's `before` runs in chain order, then the operation, then every
//! hook's `after` in reverse chain order. `after` hooks only run when the
//! operation succeeds. The default chain is `[CountCalls, CallHistory]`, so
//! the counter is bumped once per call and the history brackets the
//! delegated call.
//!
//! # Known limitations
//!
//! - Counting is fail-open: a call that fails after its `before` hooks ran is
//!   still counted, and its input stays recorded without an output.
//! - Nothing locks across the hooks and the operation. Two concurrent calls of
//!   the same operation may append their outputs in a different order than
//!   their inputs, so `inputs[i]` and `outputs[i]` are only guaranteed to
//!   belong together for sequential callers.

mod call_log;
mod hooks;

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::{render_args, Value};
use crate::error::Result;
use crate::store::{KvStore, SharedStore};

pub use call_log::{replay, CallLog, CallRecord};
pub use hooks::{inputs_key, outputs_key, CallHistory, CountCalls};

// == Invocation ==
/// What a hook sees of a single call.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Stable name of the instrumented operation, e.g. `Cache.store`
    pub identity: &'a str,
    /// Positional arguments rendered as a tuple literal
    pub args: &'a str,
}

// == Call Hook ==
/// A before/after interceptor around an instrumented operation.
#[async_trait]
pub trait CallHook: Send + Sync {
    /// A name for logging.
    fn name(&self) -> &'static str;

    /// Runs before the operation is invoked.
    async fn before(&self, _store: &dyn KvStore, _call: &Invocation<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs after the operation returned successfully, with its rendered output.
    async fn after(
        &self,
        _store: &dyn KvStore,
        _call: &Invocation<'_>,
        _output: &str,
    ) -> Result<()> {
        Ok(())
    }
}

// == Instrumentation ==
/// An ordered hook chain bound to a store.
#[derive(Clone)]
pub struct Instrumentation {
    store: SharedStore,
    hooks: Vec<Arc<dyn CallHook>>,
}

impl Instrumentation {
    /// Creates the default chain: call counting outermost, call history innermost.
    pub fn new(store: SharedStore) -> Self {
        Self::with_hooks(store, vec![Arc::new(CountCalls), Arc::new(CallHistory)])
    }

    /// Creates a chain from hooks listed outermost first.
    pub fn with_hooks(store: SharedStore, hooks: Vec<Arc<dyn CallHook>>) -> Self {
        Self { store, hooks }
    }

    /// Names of the hooks in chain order.
    pub fn hook_names(&self) -> Vec<&'static str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    /// Invokes `op` under the hook chain.
    ///
    /// A failure from `op` is returned unchanged after the `before` hooks have
    /// already taken effect. A failure from a hook aborts the call with that
    /// error.
    pub async fn call<T, F, Fut>(&self, identity: &str, args: &[Value], op: F) -> Result<T>
    where
        T: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let rendered_args = render_args(args);
        let call = Invocation {
            identity,
            args: &rendered_args,
        };
        let store = self.store.as_ref();

        for hook in &self.hooks {
            debug!(hook = hook.name(), identity, "before");
            hook.before(store, &call).await?;
        }

        let output = match op().await {
            Ok(output) => output,
            Err(err) => {
                warn!(identity, error = %err, "Instrumented call failed");
                return Err(err);
            }
        };

        let rendered_output = output.to_string();
        for hook in self.hooks.iter().rev() {
            debug!(hook = hook.name(), identity, "after");
            hook.after(store, &call, &rendered_output).await?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::store::MemoryStore;
    use std::sync::Mutex;

    /// Records the order in which hook stages run.
    struct Tracer {
        label: &'static str,
        events: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl CallHook for Tracer {
        fn name(&self) -> &'static str {
            self.label
        }

        async fn before(&self, _store: &dyn KvStore, _call: &Invocation<'_>) -> Result<()> {
            self.events.lock().unwrap().push(format!("{}:before", self.label));
            Ok(())
        }

        async fn after(
            &self,
            _store: &dyn KvStore,
            _call: &Invocation<'_>,
            output: &str,
        ) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:after:{output}", self.label));
            Ok(())
        }
    }

    fn memory() -> (MemoryStore, SharedStore) {
        let memory = MemoryStore::new();
        let shared: SharedStore = Arc::new(memory.clone());
        (memory, shared)
    }

    #[test]
    fn test_default_chain_order() {
        let (_, store) = memory();
        let instrumentation = Instrumentation::new(store);
        assert_eq!(instrumentation.hook_names(), vec!["count_calls", "call_history"]);
    }

    #[tokio::test]
    async fn test_hooks_wrap_in_onion_order() {
        let (_, store) = memory();
        let events = Arc::new(Mutex::new(Vec::new()));
        let instrumentation = Instrumentation::with_hooks(
            store,
            vec![
                Arc::new(Tracer {
                    label: "outer",
                    events: events.clone(),
                }),
                Arc::new(Tracer {
                    label: "inner",
                    events: events.clone(),
                }),
            ],
        );

        let result = instrumentation
            .call("Op.run", &[], || async { Ok::<_, CacheError>(7) })
            .await
            .unwrap();

        assert_eq!(result, 7);
        assert_eq!(
            *events.lock().unwrap(),
            vec!["outer:before", "inner:before", "inner:after:7", "outer:after:7"]
        );
    }

    #[tokio::test]
    async fn test_after_hooks_skipped_on_failure() {
        let (_, store) = memory();
        let events = Arc::new(Mutex::new(Vec::new()));
        let instrumentation = Instrumentation::with_hooks(
            store,
            vec![Arc::new(Tracer {
                label: "only",
                events: events.clone(),
            })],
        );

        let result = instrumentation
            .call("Op.fail", &[], || async {
                Err::<u32, _>(CacheError::Backend("boom".to_string()))
            })
            .await;

        assert!(matches!(result, Err(CacheError::Backend(msg)) if msg == "boom"));
        assert_eq!(*events.lock().unwrap(), vec!["only:before"]);
    }

    #[tokio::test]
    async fn test_failed_call_is_counted_and_leaves_unpaired_input() {
        let (_, store) = memory();
        let instrumentation = Instrumentation::new(store.clone());

        instrumentation
            .call("Op.flaky", &[Value::from(1)], || async { Ok::<_, CacheError>("one") })
            .await
            .unwrap();
        let failed = instrumentation
            .call("Op.flaky", &[Value::from(2)], || async {
                Err::<&str, _>(CacheError::Backend("boom".to_string()))
            })
            .await;
        assert!(failed.is_err());

        assert_eq!(store.get("Op.flaky").await.unwrap(), Some(b"2".to_vec()));
        let inputs = store.lrange(&inputs_key("Op.flaky"), 0, -1).await.unwrap();
        let outputs = store.lrange(&outputs_key("Op.flaky"), 0, -1).await.unwrap();
        assert_eq!(inputs, vec![b"(1,)".to_vec(), b"(2,)".to_vec()]);
        assert_eq!(outputs, vec![b"one".to_vec()]);
    }
}
