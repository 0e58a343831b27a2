// tests/integration/list_commands_test.rs

//! Integration tests for non-blocking list commands.
//! Tests: RPUSH, LPUSH, LRANGE, LLEN, LPOP

use super::test_helpers::{TestContext, bulk, bulk_array};
use citrine::core::{CitrineError, RespValue};

#[tokio::test]
async fn test_rpush_appends_in_order() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.cmd(&["RPUSH", "q", "a"]).await.unwrap(),
        RespValue::Integer(1)
    );
    assert_eq!(
        ctx.cmd(&["RPUSH", "q", "b", "c"]).await.unwrap(),
        RespValue::Integer(3)
    );
    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "0", "-1"]).await.unwrap(),
        bulk_array(&["a", "b", "c"])
    );
}

#[tokio::test]
async fn test_lpush_reverses_argument_order() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.cmd(&["LPUSH", "q", "1", "2", "3"]).await.unwrap(),
        RespValue::Integer(3)
    );
    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "0", "-1"]).await.unwrap(),
        bulk_array(&["3", "2", "1"])
    );
}

#[tokio::test]
async fn test_lpush_prepends_to_existing_list() {
    let ctx = TestContext::new();
    ctx.cmd(&["RPUSH", "q", "x"]).await.unwrap();
    ctx.cmd(&["LPUSH", "q", "a", "b"]).await.unwrap();
    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "0", "-1"]).await.unwrap(),
        bulk_array(&["b", "a", "x"])
    );
}

#[tokio::test]
async fn test_lrange_negative_indices() {
    let ctx = TestContext::new();
    ctx.cmd(&["RPUSH", "q", "a", "b", "c", "d"]).await.unwrap();

    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "-2", "-1"]).await.unwrap(),
        bulk_array(&["c", "d"])
    );
    // A start resolving below zero clamps to the head.
    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "-100", "1"]).await.unwrap(),
        bulk_array(&["a", "b"])
    );
    // A stop beyond the tail clamps to the tail.
    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "2", "100"]).await.unwrap(),
        bulk_array(&["c", "d"])
    );
}

#[tokio::test]
async fn test_lrange_empty_results() {
    let ctx = TestContext::new();
    ctx.cmd(&["RPUSH", "q", "a", "b"]).await.unwrap();

    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "1", "0"]).await.unwrap(),
        RespValue::Array(vec![])
    );
    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "5", "10"]).await.unwrap(),
        RespValue::Array(vec![])
    );
    assert_eq!(
        ctx.cmd(&["LRANGE", "missing", "0", "-1"]).await.unwrap(),
        RespValue::Array(vec![])
    );
}

#[tokio::test]
async fn test_llen() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.cmd(&["LLEN", "missing"]).await.unwrap(),
        RespValue::Integer(0)
    );
    ctx.cmd(&["RPUSH", "q", "a", "b", "c"]).await.unwrap();
    assert_eq!(ctx.cmd(&["LLEN", "q"]).await.unwrap(), RespValue::Integer(3));

    ctx.cmd(&["SET", "s", "v"]).await.unwrap();
    let err = ctx.cmd(&["LLEN", "s"]).await.unwrap_err();
    assert!(matches!(err, CitrineError::WrongType));
}

#[tokio::test]
async fn test_lpop_bare_pops_head() {
    let ctx = TestContext::new();
    ctx.cmd(&["RPUSH", "q", "a", "b"]).await.unwrap();

    assert_eq!(ctx.cmd(&["LPOP", "q"]).await.unwrap(), bulk("a"));
    assert_eq!(ctx.cmd(&["LPOP", "q"]).await.unwrap(), bulk("b"));
    // The emptied list stays behind, and further pops return null.
    assert_eq!(ctx.cmd(&["LPOP", "q"]).await.unwrap(), RespValue::Null);
    assert_eq!(
        ctx.cmd(&["TYPE", "q"]).await.unwrap(),
        RespValue::SimpleString("list".into())
    );
}

#[tokio::test]
async fn test_lpop_count_clamps_to_length() {
    let ctx = TestContext::new();
    ctx.cmd(&["RPUSH", "q", "a", "b", "c"]).await.unwrap();

    assert_eq!(
        ctx.cmd(&["LPOP", "q", "2"]).await.unwrap(),
        bulk_array(&["a", "b"])
    );
    assert_eq!(
        ctx.cmd(&["LPOP", "q", "10"]).await.unwrap(),
        bulk_array(&["c"])
    );
}

#[tokio::test]
async fn test_lpop_missing_key_returns_null() {
    let ctx = TestContext::new();
    assert_eq!(ctx.cmd(&["LPOP", "missing"]).await.unwrap(), RespValue::Null);
    assert_eq!(
        ctx.cmd(&["LPOP", "missing", "3"]).await.unwrap(),
        RespValue::Null
    );
}

#[tokio::test]
async fn test_lrange_roundtrip_full_list() {
    let ctx = TestContext::new();
    let items = ["x0", "x1", "x2", "x3", "x4"];
    let mut args = vec!["RPUSH", "q"];
    args.extend_from_slice(&items);
    ctx.cmd(&args).await.unwrap();

    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "0", "-1"]).await.unwrap(),
        bulk_array(&items)
    );
    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "1", "3"]).await.unwrap(),
        bulk_array(&["x1", "x2", "x3"])
    );
}
