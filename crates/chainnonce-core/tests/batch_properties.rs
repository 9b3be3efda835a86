//! End-to-end batch properties through a scripted transport.
//!
//! The mock answers each batch from a closure so every test can shape the
//! node's behaviour (errors, drops, reordering, junk ids) per request.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use chainnonce_core::{
    build_nonce_requests, reconcile_nonces, BatchCaller, BatchConfig, BlockRef, DecodeError,
    JsonRpcError, JsonRpcRequest, JsonRpcResponse, NonceParams, RpcId, RpcTransport,
    TransportError,
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

type Responder = dyn Fn(Vec<JsonRpcRequest>) -> Vec<JsonRpcResponse> + Send + Sync;

struct ScriptedTransport {
    respond: Box<Responder>,
}

impl ScriptedTransport {
    fn new<F>(f: F) -> Arc<Self>
    where
        F: Fn(Vec<JsonRpcRequest>) -> Vec<JsonRpcResponse> + Send + Sync + 'static,
    {
        Arc::new(Self { respond: Box::new(f) })
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        (self.respond)(vec![req])
            .pop()
            .ok_or_else(|| TransportError::Other("no response".into()))
    }

    async fn send_batch(
        &self,
        reqs: Vec<JsonRpcRequest>,
    ) -> Result<Vec<JsonRpcResponse>, TransportError> {
        Ok((self.respond)(reqs))
    }

    fn url(&self) -> &str {
        "scripted"
    }
}

struct DownTransport;

#[async_trait]
impl RpcTransport for DownTransport {
    async fn send(&self, _req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        Err(TransportError::Http("connection refused".into()))
    }

    fn url(&self) -> &str {
        "down"
    }
}

fn id_num(id: &RpcId) -> u64 {
    match id {
        RpcId::Number(n) => *n,
        other => panic!("unexpected id {other}"),
    }
}

fn queries(n: usize) -> Vec<NonceParams> {
    (0..n)
        .map(|i| NonceParams::new(format!("0x{:040x}", i + 1), BlockRef::Number(100)))
        .collect()
}

fn node_error(message: &str) -> JsonRpcError {
    JsonRpcError {
        code: -32000,
        message: message.into(),
        data: None,
    }
}

// ─── Worked examples ──────────────────────────────────────────────────────────────

#[test]
fn request_shape_for_single_entry() {
    let map = BTreeMap::from([(
        RpcId::Number(7),
        NonceParams::new("0xabc", "0x10".parse().unwrap()),
    )]);
    let reqs = build_nonce_requests(&map);
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].id, RpcId::Number(7));
    assert_eq!(reqs[0].method, "eth_getTransactionCount");
    assert_eq!(reqs[0].params, vec![json!("0xabc"), json!("0x10")]);
}

#[test]
fn mixed_batch_from_raw_json() {
    let map = BTreeMap::from([
        (RpcId::Number(1), NonceParams::new("0x01", BlockRef::Latest)),
        (RpcId::Number(2), NonceParams::new("0x02", BlockRef::Latest)),
    ]);
    let responses: Vec<JsonRpcResponse> = serde_json::from_value(json!([
        { "jsonrpc": "2.0", "id": 1, "result": "0x1" },
        { "jsonrpc": "2.0", "id": 2, "error": { "code": -32000, "message": "x" } }
    ]))
    .unwrap();

    let out = reconcile_nonces(responses, &map);
    assert_eq!(out.successes.len(), 1);
    assert_eq!(out.successes[0].id, RpcId::Number(1));
    assert_eq!(out.successes[0].value, 1);
    assert_eq!(out.errors.len(), 1);
    assert_eq!(out.errors[0].id, RpcId::Number(2));
    assert_eq!(out.errors[0].error, DecodeError::Rpc(node_error("x")));
}

// ─── Invariants through BatchCaller ───────────────────────────────────────────

#[tokio::test]
async fn complete_and_disjoint_when_every_id_answers() {
    // Every third id fails at the node; the rest succeed. Responses come back reversed.
    let transport = ScriptedTransport::new(|reqs| {
        reqs.into_iter()
            .rev()
            .map(|r| {
                let n = id_num(&r.id);
                if n % 3 == 0 {
                    JsonRpcResponse::failure(r.id, node_error("nonce unavailable"))
                } else {
                    JsonRpcResponse::success(r.id, json!(format!("0x{:x}", n * 10)))
                }
            })
            .collect()
    });
    let caller = BatchCaller::new(transport, BatchConfig::default().max_batch_size(4));

    let out = caller.transaction_counts(queries(10)).await.unwrap();

    assert_eq!(out.successes.len() + out.errors.len(), 10);
    let ok: HashSet<_> = out.successes.iter().map(|s| s.id.clone()).collect();
    let bad: HashSet<_> = out.errors.iter().map(|e| e.id.clone()).collect();
    assert!(ok.is_disjoint(&bad));
    assert_eq!(bad, [3u64, 6, 9].into_iter().map(RpcId::Number).collect::<HashSet<_>>());
    for rec in &out.successes {
        assert_eq!(rec.value, id_num(&rec.id) * 10);
        assert_eq!(rec.params.address, format!("0x{:040x}", id_num(&rec.id)));
    }
}

#[tokio::test]
async fn dropped_ids_are_excluded_and_others_intact() {
    let transport = ScriptedTransport::new(|reqs| {
        reqs.into_iter()
            .filter(|r| id_num(&r.id) != 2)
            .map(|r| {
                let n = id_num(&r.id);
                JsonRpcResponse::success(r.id, json!(format!("0x{n:x}")))
            })
            .collect()
    });
    let caller = BatchCaller::default_for(transport);
    let map = chainnonce_core::number_queries(queries(3));

    let out = caller
        .call::<chainnonce_core::GetTransactionCount>(&map)
        .await
        .unwrap();

    assert_eq!(out.len(), 2);
    assert!(out.errors.is_empty());
    assert_eq!(out.missing_ids(&map), vec![RpcId::Number(2)]);
    let values: Vec<_> = out.successes.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![1, 3]);
}

#[tokio::test]
async fn malformed_and_foreign_entries_are_isolated() {
    let transport = ScriptedTransport::new(|reqs| {
        let mut out: Vec<JsonRpcResponse> = reqs
            .into_iter()
            .map(|r| match id_num(&r.id) {
                1 => JsonRpcResponse::success(r.id, json!("0x2a")),
                2 => JsonRpcResponse::success(r.id, json!({ "nonce": 1 })),
                3 => serde_json::from_value(json!({ "jsonrpc": "2.0", "id": 3 })).unwrap(),
                n => JsonRpcResponse::success(r.id, json!(format!("0x{n:x}"))),
            })
            .collect();
        // A stale id from some other batch, and a duplicate of id 1.
        out.insert(0, JsonRpcResponse::success(99u64, json!("0x63")));
        out.push(JsonRpcResponse::success(1u64, json!("0xbad")));
        out
    });
    let caller = BatchCaller::default_for(transport);

    let out = caller.transaction_counts(queries(4)).await.unwrap();

    assert_eq!(out.len(), 4);
    let ok: Vec<_> = out.successes.iter().map(|s| (id_num(&s.id), s.value)).collect();
    assert_eq!(ok, vec![(1, 42), (4, 4)]);
    assert!(matches!(out.errors[0].error, DecodeError::InvalidResult { .. }));
    assert_eq!(out.errors[0].id, RpcId::Number(2));
    assert_eq!(out.errors[1].error, DecodeError::MissingResult);
    assert!(out.errors.iter().all(|e| e.params.is_some()));
}

#[tokio::test]
async fn nonstandard_error_payloads_are_still_accounted_for() {
    let transport = ScriptedTransport::new(|reqs| {
        reqs.into_iter()
            .map(|r| {
                let entry = match id_num(&r.id) {
                    2 => json!({ "jsonrpc": "2.0", "id": 2, "error": "execution reverted" }),
                    3 => json!({ "jsonrpc": "2.0", "id": 3, "error": { "code": -32000 } }),
                    4 => json!({ "jsonrpc": 2, "id": 4, "result": "0x4" }),
                    n => json!({ "jsonrpc": "2.0", "id": n, "result": format!("0x{n:x}") }),
                };
                JsonRpcResponse::from_entry(entry).unwrap()
            })
            .collect()
    });
    let caller = BatchCaller::new(transport, BatchConfig::default().max_batch_size(3));
    let map = chainnonce_core::number_queries(queries(5));

    let out = caller
        .call::<chainnonce_core::GetTransactionCount>(&map)
        .await
        .unwrap();

    assert_eq!(out.successes.len() + out.errors.len(), map.len());
    assert!(out.missing_ids(&map).is_empty());
    let ok: Vec<_> = out.successes.iter().map(|s| id_num(&s.id)).collect();
    assert_eq!(ok, vec![1, 5]);
    let bad: Vec<_> = out.errors.iter().map(|e| id_num(&e.id)).collect();
    assert_eq!(bad, vec![2, 3, 4]);
    assert_eq!(
        out.errors[0].error,
        DecodeError::NonStandardRpc(json!("execution reverted"))
    );
    assert!(out.errors.iter().all(|e| e.error.is_node_error()));
    assert_eq!(out.errors[1].params.as_ref(), map.get(&RpcId::Number(3)));
}

#[tokio::test]
async fn string_ids_round_trip() {
    let transport = ScriptedTransport::new(|reqs| {
        reqs.into_iter()
            .map(|r| JsonRpcResponse::success(r.id, json!("0x7")))
            .collect()
    });
    let caller = BatchCaller::default_for(transport);
    let map = BTreeMap::from([
        (RpcId::from("alice"), NonceParams::new("0x0a", BlockRef::Pending)),
        (RpcId::from("bob"), NonceParams::new("0x0b", BlockRef::Pending)),
    ]);

    let out = caller
        .call::<chainnonce_core::GetTransactionCount>(&map)
        .await
        .unwrap();

    let ids: Vec<_> = out.successes.iter().map(|s| s.id.to_string()).collect();
    assert_eq!(ids, vec!["alice", "bob"]);
    assert_eq!(out.successes[1].params, map[&RpcId::from("bob")]);
}

#[tokio::test]
async fn transport_failure_fails_the_batch() {
    let caller = BatchCaller::default_for(Arc::new(DownTransport));
    let err = caller.transaction_counts(queries(2)).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn parallel_path_gives_same_classification() {
    let respond = |reqs: Vec<JsonRpcRequest>| -> Vec<JsonRpcResponse> {
        reqs.into_iter()
            .map(|r| {
                let n = id_num(&r.id);
                if n % 5 == 0 {
                    JsonRpcResponse::failure(r.id, node_error("busy"))
                } else {
                    JsonRpcResponse::success(r.id, json!(format!("0x{n:x}")))
                }
            })
            .collect()
    };
    let seq = BatchCaller::new(
        ScriptedTransport::new(respond),
        BatchConfig::default().max_batch_size(0),
    );
    let par = BatchCaller::new(
        ScriptedTransport::new(respond),
        BatchConfig::default().max_batch_size(0).parallel_threshold(1),
    );

    let a = seq.transaction_counts(queries(200)).await.unwrap();
    let b = par.transaction_counts(queries(200)).await.unwrap();

    assert_eq!(a, b);
    assert_eq!(a.errors.len(), 40);
}
