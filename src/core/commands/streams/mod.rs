// src/core/commands/streams/mod.rs

pub mod xadd;
pub mod xrange;
pub mod xread;

pub use xadd::XAdd;
pub use xrange::XRange;
pub use xread::XRead;

use crate::core::RespValue;
use crate::core::storage::stream::StreamEntry;

/// Formats a single stream entry into the `[id, [field, value, ...]]` array
/// shape shared by `XRANGE` and `XREAD` replies.
pub(crate) fn format_entry(entry: &StreamEntry) -> RespValue {
    let mut fields_array = Vec::with_capacity(entry.fields.len() * 2);
    for (field, value) in &entry.fields {
        fields_array.push(RespValue::BulkString(field.clone()));
        fields_array.push(RespValue::BulkString(value.clone()));
    }
    RespValue::Array(vec![
        RespValue::BulkString(entry.id.to_string().into()),
        RespValue::Array(fields_array),
    ])
}
