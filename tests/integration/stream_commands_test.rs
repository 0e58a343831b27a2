// tests/integration/stream_commands_test.rs

//! Integration tests for non-blocking stream commands.
//! Tests: XADD, XRANGE, XREAD

use super::test_helpers::{TestContext, bulk};
use citrine::core::{CitrineError, RespValue};

/// Builds the `[id, [field, value, ...]]` reply shape for assertions.
fn entry(id: &str, pairs: &[&str]) -> RespValue {
    RespValue::Array(vec![
        bulk(id),
        RespValue::Array(pairs.iter().map(|p| bulk(p)).collect()),
    ])
}

#[tokio::test]
async fn test_xadd_returns_resolved_id() {
    let ctx = TestContext::new();
    let result = ctx.cmd(&["XADD", "s", "1-1", "a", "1"]).await.unwrap();
    assert_eq!(result, bulk("1-1"));
}

#[tokio::test]
async fn test_xadd_rejects_equal_or_smaller_id() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "1-1", "a", "1"]).await.unwrap();

    let err = ctx.cmd(&["XADD", "s", "1-1", "b", "2"]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "ERR The ID specified in XADD is equal or smaller than the target stream top item"
    );

    // The auto-sequence form picks the next free sequence instead.
    let result = ctx.cmd(&["XADD", "s", "1-*", "c", "3"]).await.unwrap();
    assert_eq!(result, bulk("1-2"));
}

#[tokio::test]
async fn test_xadd_rejects_zero_id() {
    let ctx = TestContext::new();
    let err = ctx.cmd(&["XADD", "s", "0-0", "a", "1"]).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "ERR The ID specified in XADD must be greater than 0-0"
    );
    // The rejected first append must not leave an empty stream behind.
    assert_eq!(
        ctx.cmd(&["TYPE", "s"]).await.unwrap(),
        RespValue::SimpleString("none".into())
    );
}

#[tokio::test]
async fn test_xadd_auto_ids_are_increasing() {
    let ctx = TestContext::new();
    let first = ctx.cmd(&["XADD", "s", "*", "a", "1"]).await.unwrap();
    let second = ctx.cmd(&["XADD", "s", "*", "b", "2"]).await.unwrap();

    let (RespValue::BulkString(first), RespValue::BulkString(second)) = (first, second) else {
        panic!("expected bulk string ids");
    };
    let first: citrine::core::storage::stream::StreamId =
        std::str::from_utf8(&first).unwrap().parse().unwrap();
    let second: citrine::core::storage::stream::StreamId =
        std::str::from_utf8(&second).unwrap().parse().unwrap();
    assert!(second > first);
}

#[tokio::test]
async fn test_xadd_on_wrong_type() {
    let ctx = TestContext::new();
    ctx.cmd(&["SET", "s", "v"]).await.unwrap();
    let err = ctx.cmd(&["XADD", "s", "*", "a", "1"]).await.unwrap_err();
    assert!(matches!(err, CitrineError::WrongType));
}

#[tokio::test]
async fn test_xrange_full_and_sub_ranges() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "1-1", "a", "1"]).await.unwrap();
    ctx.cmd(&["XADD", "s", "2-1", "b", "2"]).await.unwrap();
    ctx.cmd(&["XADD", "s", "3-1", "c", "3"]).await.unwrap();

    let all = ctx.cmd(&["XRANGE", "s", "-", "+"]).await.unwrap();
    assert_eq!(
        all,
        RespValue::Array(vec![
            entry("1-1", &["a", "1"]),
            entry("2-1", &["b", "2"]),
            entry("3-1", &["c", "3"]),
        ])
    );

    // Bounds between existing ids select only what falls inside them.
    let middle = ctx.cmd(&["XRANGE", "s", "2-0", "2-1"]).await.unwrap();
    assert_eq!(middle, RespValue::Array(vec![entry("2-1", &["b", "2"])]));
}

#[tokio::test]
async fn test_xrange_missing_key_is_empty() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.cmd(&["XRANGE", "missing", "-", "+"]).await.unwrap(),
        RespValue::Array(vec![])
    );
}

#[tokio::test]
async fn test_xadd_xrange_round_trip_preserves_order() {
    let ctx = TestContext::new();
    for ms in 1..=5 {
        let id = format!("{ms}-0");
        ctx.cmd(&["XADD", "s", &id, "seq", &ms.to_string()])
            .await
            .unwrap();
    }

    let RespValue::Array(entries) = ctx.cmd(&["XRANGE", "s", "-", "+"]).await.unwrap() else {
        panic!("expected array reply");
    };
    assert_eq!(entries.len(), 5);
    for (i, e) in entries.iter().enumerate() {
        assert_eq!(
            *e,
            entry(
                &format!("{}-0", i + 1),
                &["seq", &(i + 1).to_string()]
            )
        );
    }
}

#[tokio::test]
async fn test_xread_returns_entries_after_id() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "1-1", "a", "1"]).await.unwrap();
    ctx.cmd(&["XADD", "s", "2-1", "b", "2"]).await.unwrap();

    let result = ctx
        .cmd(&["XREAD", "STREAMS", "s", "1-1"])
        .await
        .unwrap();
    assert_eq!(
        result,
        RespValue::Array(vec![RespValue::Array(vec![
            bulk("s"),
            RespValue::Array(vec![entry("2-1", &["b", "2"])]),
        ])])
    );
}

#[tokio::test]
async fn test_xread_multiple_streams_groups_per_key() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s1", "1-1", "a", "1"]).await.unwrap();
    ctx.cmd(&["XADD", "s2", "2-1", "b", "2"]).await.unwrap();

    let result = ctx
        .cmd(&["XREAD", "STREAMS", "s1", "s2", "0-0", "0-0"])
        .await
        .unwrap();
    assert_eq!(
        result,
        RespValue::Array(vec![
            RespValue::Array(vec![
                bulk("s1"),
                RespValue::Array(vec![entry("1-1", &["a", "1"])]),
            ]),
            RespValue::Array(vec![
                bulk("s2"),
                RespValue::Array(vec![entry("2-1", &["b", "2"])]),
            ]),
        ])
    );
}

#[tokio::test]
async fn test_xread_with_nothing_newer_is_null() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "1-1", "a", "1"]).await.unwrap();

    let result = ctx.cmd(&["XREAD", "STREAMS", "s", "1-1"]).await.unwrap();
    assert_eq!(result, RespValue::Null);

    // Absent keys contribute no group either.
    let result = ctx
        .cmd(&["XREAD", "STREAMS", "missing", "0-0"])
        .await
        .unwrap();
    assert_eq!(result, RespValue::Null);
}

#[tokio::test]
async fn test_xread_skips_keys_without_new_entries() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s1", "1-1", "a", "1"]).await.unwrap();
    ctx.cmd(&["XADD", "s2", "2-1", "b", "2"]).await.unwrap();

    // Only s2 has entries past the requested id.
    let result = ctx
        .cmd(&["XREAD", "STREAMS", "s1", "s2", "1-1", "0-0"])
        .await
        .unwrap();
    assert_eq!(
        result,
        RespValue::Array(vec![RespValue::Array(vec![
            bulk("s2"),
            RespValue::Array(vec![entry("2-1", &["b", "2"])]),
        ])])
    );
}

#[tokio::test]
async fn test_stream_entry_keeps_duplicate_fields() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "1-1", "f", "1", "f", "2"])
        .await
        .unwrap();

    let result = ctx.cmd(&["XRANGE", "s", "-", "+"]).await.unwrap();
    assert_eq!(
        result,
        RespValue::Array(vec![entry("1-1", &["f", "1", "f", "2"])])
    );
}
