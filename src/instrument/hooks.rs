//! Built-in hooks: call counting and call history.

use async_trait::async_trait;

use crate::error::Result;
use crate::instrument::{CallHook, Invocation};
use crate::store::KvStore;

/// Key of the list holding the rendered inputs of `identity`.
pub fn inputs_key(identity: &str) -> String {
    format!("{identity}:inputs")
}

/// Key of the list holding the rendered outputs of `identity`.
pub fn outputs_key(identity: &str) -> String {
    format!("{identity}:outputs")
}

// == Count Calls ==
/// Increments the counter stored under the operation's identity on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountCalls;

#[async_trait]
impl CallHook for CountCalls {
    fn name(&self) -> &'static str {
        "count_calls"
    }

    async fn before(&self, store: &dyn KvStore, call: &Invocation<'_>) -> Result<()> {
        store.incr(call.identity).await?;
        Ok(())
    }
}

// == Call History ==
/// Appends each call's inputs before it runs and its output after it succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallHistory;

#[async_trait]
impl CallHook for CallHistory {
    fn name(&self) -> &'static str {
        "call_history"
    }

    async fn before(&self, store: &dyn KvStore, call: &Invocation<'_>) -> Result<()> {
        store
            .rpush(&inputs_key(call.identity), call.args.as_bytes())
            .await?;
        Ok(())
    }

    async fn after(&self, store: &dyn KvStore, call: &Invocation<'_>, output: &str) -> Result<()> {
        store
            .rpush(&outputs_key(call.identity), output.as_bytes())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_history_key_names() {
        assert_eq!(inputs_key("Cache.store"), "Cache.store:inputs");
        assert_eq!(outputs_key("Cache.store"), "Cache.store:outputs");
    }

    #[tokio::test]
    async fn test_count_calls_increments_identity_key() {
        let store = MemoryStore::new();
        let call = Invocation {
            identity: "Cache.store",
            args: "('a',)",
        };

        CountCalls.before(&store, &call).await.unwrap();
        CountCalls.before(&store, &call).await.unwrap();
        CountCalls.after(&store, &call, "ignored").await.unwrap();

        assert_eq!(store.get("Cache.store").await.unwrap(), Some(b"2".to_vec()));
    }

    #[tokio::test]
    async fn test_call_history_appends_inputs_and_outputs() {
        let store = MemoryStore::new();
        let call = Invocation {
            identity: "Cache.store",
            args: "('a',)",
        };

        CallHistory.before(&store, &call).await.unwrap();
        CallHistory.after(&store, &call, "key-1").await.unwrap();

        assert_eq!(
            store.lrange("Cache.store:inputs", 0, -1).await.unwrap(),
            vec![b"('a',)".to_vec()]
        );
        assert_eq!(
            store.lrange("Cache.store:outputs", 0, -1).await.unwrap(),
            vec![b"key-1".to_vec()]
        );
        assert_eq!(store.get("Cache.store").await.unwrap(), None);
    }
}
