// src/core/commands/list/logic.rs

use crate::core::CitrineError;
use crate::core::storage::data_types::{DataValue, StoredValue};
use crate::core::storage::db::ExecutionContext;
use bytes::Bytes;
use std::collections::VecDeque;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum PushDirection {
    Left,
    Right,
}

/// The outcome of a push: the resulting list length and how many of the
/// pushed values were handed directly to blocked clients.
pub(crate) struct PushOutcome {
    pub len: usize,
    pub consumed_by_waiters: usize,
}

/// Shared logic for `LPUSH` and `RPUSH`.
///
/// The ordered source sequence is the argument list for `RPUSH` and the
/// reversed argument list for `LPUSH`. Waiter handoff and the append of the
/// remainder happen in one critical section: waiters (which can only exist
/// while the list is empty) receive the leading values in FIFO order, and
/// whatever they did not consume lands in the list.
pub(crate) fn list_push_logic(
    ctx: &mut ExecutionContext<'_>,
    key: &Bytes,
    values: &[Bytes],
    direction: PushDirection,
) -> Result<PushOutcome, CitrineError> {
    let ordered: Vec<Bytes> = match direction {
        PushDirection::Right => values.to_vec(),
        PushDirection::Left => values.iter().rev().cloned().collect(),
    };

    let state = ctx.state.clone();
    let guard = ctx.get_single_shard_context_mut()?;

    // Type-check before touching any waiter so a WRONGTYPE push has no effect.
    if let Some(entry) = guard.peek_live(key)
        && !matches!(entry.data, DataValue::List(_))
    {
        return Err(CitrineError::WrongType);
    }

    let consumed = state.blocker_manager.notify_and_consume_for_push(key, &ordered);
    let remainder = &ordered[consumed..];

    let len = guard.set_or_update(
        key,
        || StoredValue::new(DataValue::List(VecDeque::new())),
        |stored| {
            let DataValue::List(list) = &mut stored.data else {
                return Err(CitrineError::WrongType);
            };
            match direction {
                PushDirection::Right => {
                    for value in remainder {
                        list.push_back(value.clone());
                    }
                }
                PushDirection::Left => {
                    // `ordered` is already reversed; prepending the remainder
                    // block keeps its internal order ahead of the old head.
                    for value in remainder.iter().rev() {
                        list.push_front(value.clone());
                    }
                }
            }
            Ok(list.len())
        },
    )?;

    Ok(PushOutcome {
        len,
        consumed_by_waiters: consumed,
    })
}
