// tests/integration/blocking_test.rs

//! Integration tests for blocking operations.
//! Tests: BLPOP, XREAD (blocking)

use super::test_helpers::{TestContext, bulk, bulk_array};
use citrine::core::RespValue;
use std::time::{Duration, Instant};
use tokio::time::sleep;

// ===== BLPOP Tests =====

#[tokio::test]
async fn test_blpop_immediate_success() {
    let ctx = TestContext::new();
    ctx.cmd(&["RPUSH", "mylist", "value1", "value2"]).await.unwrap();

    // BLPOP should return immediately with the head.
    let result = ctx.cmd(&["BLPOP", "mylist", "1"]).await.unwrap();
    assert_eq!(result, bulk_array(&["mylist", "value1"]));

    // The remaining element is still in the list.
    let result = ctx.cmd(&["LRANGE", "mylist", "0", "-1"]).await.unwrap();
    assert_eq!(result, bulk_array(&["value2"]));
}

#[tokio::test]
async fn test_blpop_timeout() {
    let ctx = TestContext::new();

    let start = Instant::now();
    let result = ctx.cmd(&["BLPOP", "mylist", "0.1"]).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result, RespValue::Null);
    assert!(elapsed >= Duration::from_millis(90));
    assert!(elapsed < Duration::from_millis(500));
}

#[tokio::test]
async fn test_rpush_wakes_blpop_and_keeps_remainder() {
    let ctx = TestContext::new();

    let blocked = ctx.clone();
    let blpop_task =
        tokio::spawn(async move { blocked.cmd(&["BLPOP", "mylist", "5"]).await });

    // Give the BLPOP time to register its waiter.
    sleep(Duration::from_millis(50)).await;

    // The push hands the first value to the waiter; with a woken waiter the
    // reply is the integer 1 rather than the list length.
    let push_reply = ctx.cmd(&["RPUSH", "mylist", "a", "b"]).await.unwrap();
    assert_eq!(push_reply, RespValue::Integer(1));

    let result = blpop_task.await.unwrap().unwrap();
    assert_eq!(result, bulk_array(&["mylist", "a"]));

    // The value the waiter did not consume landed in the list.
    let result = ctx.cmd(&["LRANGE", "mylist", "0", "-1"]).await.unwrap();
    assert_eq!(result, bulk_array(&["b"]));
}

#[tokio::test]
async fn test_lpush_wakes_blpop_with_reversed_head() {
    let ctx = TestContext::new();

    let blocked = ctx.clone();
    let blpop_task =
        tokio::spawn(async move { blocked.cmd(&["BLPOP", "mylist", "5"]).await });

    sleep(Duration::from_millis(50)).await;
    ctx.cmd(&["LPUSH", "mylist", "1", "2"]).await.unwrap();

    // LPUSH's handoff source is the reversed argument list, so the waiter
    // receives what would have become the head.
    let result = blpop_task.await.unwrap().unwrap();
    assert_eq!(result, bulk_array(&["mylist", "2"]));

    let result = ctx.cmd(&["LRANGE", "mylist", "0", "-1"]).await.unwrap();
    assert_eq!(result, bulk_array(&["1"]));
}

#[tokio::test]
async fn test_blpop_waiters_are_woken_fifo() {
    let ctx = TestContext::new();

    let first = ctx.clone();
    let first_task = tokio::spawn(async move { first.cmd(&["BLPOP", "q", "5"]).await });
    sleep(Duration::from_millis(50)).await;

    let second = ctx.clone();
    let second_task = tokio::spawn(async move { second.cmd(&["BLPOP", "q", "5"]).await });
    sleep(Duration::from_millis(50)).await;

    // One push satisfies both waiters in registration order.
    ctx.cmd(&["RPUSH", "q", "v1", "v2"]).await.unwrap();

    let first_result = first_task.await.unwrap().unwrap();
    let second_result = second_task.await.unwrap().unwrap();
    assert_eq!(first_result, bulk_array(&["q", "v1"]));
    assert_eq!(second_result, bulk_array(&["q", "v2"]));

    // Everything went to waiters; the list holds nothing.
    assert_eq!(ctx.cmd(&["LLEN", "q"]).await.unwrap(), RespValue::Integer(0));
}

#[tokio::test]
async fn test_blpop_timed_out_waiter_does_not_steal_later_push() {
    let ctx = TestContext::new();

    // This BLPOP gives up before the push arrives.
    assert_eq!(
        ctx.cmd(&["BLPOP", "q", "0.05"]).await.unwrap(),
        RespValue::Null
    );

    // A later push must land in the list, not vanish into the dead waiter.
    ctx.cmd(&["RPUSH", "q", "x"]).await.unwrap();
    assert_eq!(
        ctx.cmd(&["LRANGE", "q", "0", "-1"]).await.unwrap(),
        bulk_array(&["x"])
    );
}

// ===== Blocking XREAD Tests =====

#[tokio::test]
async fn test_xread_block_woken_by_xadd() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "1-1", "old", "entry"]).await.unwrap();

    let blocked = ctx.clone();
    let xread_task = tokio::spawn(async move {
        blocked
            .cmd(&["XREAD", "BLOCK", "5000", "STREAMS", "s", "$"])
            .await
    });

    sleep(Duration::from_millis(50)).await;
    ctx.cmd(&["XADD", "s", "2-1", "k", "v"]).await.unwrap();

    // The reply carries only the delivered entry, not the pre-existing one.
    let result = xread_task.await.unwrap().unwrap();
    assert_eq!(
        result,
        RespValue::Array(vec![RespValue::Array(vec![
            bulk("s"),
            RespValue::Array(vec![RespValue::Array(vec![
                bulk("2-1"),
                RespValue::Array(vec![bulk("k"), bulk("v")]),
            ])]),
        ])])
    );
}

#[tokio::test]
async fn test_xread_block_timeout_returns_null() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "1-1", "a", "1"]).await.unwrap();

    let start = Instant::now();
    let result = ctx
        .cmd(&["XREAD", "BLOCK", "100", "STREAMS", "s", "$"])
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result, RespValue::Null);
    assert!(elapsed >= Duration::from_millis(90));
}

#[tokio::test]
async fn test_xread_block_on_absent_key_with_dollar() {
    let ctx = TestContext::new();

    let blocked = ctx.clone();
    let xread_task = tokio::spawn(async move {
        blocked
            .cmd(&["XREAD", "BLOCK", "5000", "STREAMS", "fresh", "$"])
            .await
    });

    sleep(Duration::from_millis(50)).await;
    ctx.cmd(&["XADD", "fresh", "1-1", "k", "v"]).await.unwrap();

    let result = xread_task.await.unwrap().unwrap();
    assert_eq!(
        result,
        RespValue::Array(vec![RespValue::Array(vec![
            bulk("fresh"),
            RespValue::Array(vec![RespValue::Array(vec![
                bulk("1-1"),
                RespValue::Array(vec![bulk("k"), bulk("v")]),
            ])]),
        ])])
    );
}

#[tokio::test]
async fn test_xread_block_returns_immediately_when_data_exists() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "1-1", "a", "1"]).await.unwrap();
    ctx.cmd(&["XADD", "s", "2-1", "b", "2"]).await.unwrap();

    let start = Instant::now();
    let result = ctx
        .cmd(&["XREAD", "BLOCK", "5000", "STREAMS", "s", "1-1"])
        .await
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(100));

    assert_eq!(
        result,
        RespValue::Array(vec![RespValue::Array(vec![
            bulk("s"),
            RespValue::Array(vec![RespValue::Array(vec![
                bulk("2-1"),
                RespValue::Array(vec![bulk("b"), bulk("2")]),
            ])]),
        ])])
    );
}

#[tokio::test]
async fn test_xread_block_multiple_keys_first_delivery_wins() {
    let ctx = TestContext::new();

    let blocked = ctx.clone();
    let xread_task = tokio::spawn(async move {
        blocked
            .cmd(&["XREAD", "BLOCK", "5000", "STREAMS", "s1", "s2", "$", "$"])
            .await
    });

    sleep(Duration::from_millis(50)).await;
    ctx.cmd(&["XADD", "s2", "1-1", "k", "v"]).await.unwrap();

    // The reply contains the single group for the stream that fired.
    let result = xread_task.await.unwrap().unwrap();
    assert_eq!(
        result,
        RespValue::Array(vec![RespValue::Array(vec![
            bulk("s2"),
            RespValue::Array(vec![RespValue::Array(vec![
                bulk("1-1"),
                RespValue::Array(vec![bulk("k"), bulk("v")]),
            ])]),
        ])])
    );
}

#[tokio::test]
async fn test_xadd_only_wakes_waiters_below_watermark() {
    let ctx = TestContext::new();
    ctx.cmd(&["XADD", "s", "5-0", "a", "1"]).await.unwrap();

    // Watermark 10-0 is ahead of anything XADD will append here.
    let blocked = ctx.clone();
    let xread_task = tokio::spawn(async move {
        blocked
            .cmd(&["XREAD", "BLOCK", "300", "STREAMS", "s", "10-0"])
            .await
    });

    sleep(Duration::from_millis(50)).await;
    ctx.cmd(&["XADD", "s", "6-0", "b", "2"]).await.unwrap();

    // 6-0 is not past the watermark, so the reader times out.
    let result = xread_task.await.unwrap().unwrap();
    assert_eq!(result, RespValue::Null);
}
