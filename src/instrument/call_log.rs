//! Replay: rebuilds a call log from what the instrumentation hooks recorded.

use std::fmt;

use serde::Serialize;

use crate::cache::{decode_integer, decode_text};
use crate::error::{CacheError, Result};
use crate::instrument::{inputs_key, outputs_key};
use crate::store::KvStore;

// == Call Record ==
/// One completed call: its rendered inputs and output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallRecord {
    pub input: String,
    pub output: String,
}

// == Call Log ==
/// Everything recorded for one identity, earliest call first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallLog {
    /// The instrumented operation
    pub identity: String,
    /// Counter value; `None` when the operation was never called
    pub calls: Option<u64>,
    /// Paired input/output entries
    pub entries: Vec<CallRecord>,
}

impl CallLog {
    /// Number of recorded calls, zero when never called.
    pub fn call_count(&self) -> u64 {
        self.calls.unwrap_or(0)
    }
}

impl fmt::Display for CallLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was called {} times:", self.identity, self.call_count())?;
        for entry in &self.entries {
            write!(f, "\n{}(*{}) -> {}", self.identity, entry.input, entry.output)?;
        }
        Ok(())
    }
}

// == Replay ==
/// Reads the counter and history of `identity` without modifying either.
///
/// Inputs and outputs are paired by index up to the shorter list, so the
/// input of a call that failed (recorded without an output) is left out when
/// it is the last one.
pub async fn replay(store: &dyn KvStore, identity: &str) -> Result<CallLog> {
    let calls = match store.get(identity).await? {
        Some(raw) => {
            let count = decode_integer(raw)?;
            let count = u64::try_from(count)
                .map_err(|_| CacheError::Coercion(format!("negative call count: {count}")))?;
            Some(count)
        }
        None => None,
    };

    let inputs = store.lrange(&inputs_key(identity), 0, -1).await?;
    let outputs = store.lrange(&outputs_key(identity), 0, -1).await?;

    let entries = inputs
        .into_iter()
        .zip(outputs)
        .map(|(input, output)| {
            Ok(CallRecord {
                input: decode_text(input)?,
                output: decode_text(output)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CallLog {
        identity: identity.to_string(),
        calls,
        entries,
    })
}
