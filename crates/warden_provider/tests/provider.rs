//! End-to-end tests of the verifying provider against an in-process mock
//! upstream serving a deterministically constructed chain fixture.

use std::{collections::HashMap, sync::Arc, time::Duration};

use alloy_consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{
    address, keccak256, Address, Bloom, BloomInput, Bytes, Signature, TxKind, B256, B64, U256, U64,
};
use alloy_rpc_types_eth::{EIP1186AccountProofResponse, EIP1186StorageProof, Transaction};
use alloy_serde::JsonStorageKey;
use alloy_trie::{proof::ProofRetainer, HashBuilder, Nibbles};
use axum::{routing::post, Json, Router};
use tokio::runtime;
use warden_eth::{
    account::TrieAccount,
    block::{BlobGas, BlockHeader},
    block_spec::{BlockSpec, BlockTag},
    filter::LogFilterOptions,
    trie::ordered_trie_root,
    KECCAK_EMPTY, KECCAK_NULL_RLP, KECCAK_RLP_EMPTY_ARRAY,
};
use warden_eth::receipt::ExecutionReceipt;
use warden_provider::{MethodInvocation, Provider, ProviderConfig};
use warden_rpc_eth::{Block, CallRequest, TransactionReceipt};

const EOA: Address = address!("0x1a0dfd0252700c79fc54269577bbeed16773f17a");
const CONTRACT: Address = address!("0x5fbdb2315678afecb367f032d93f642f64180aa3");
const EOA_BALANCE: u64 = 0x60e74857f86c4;

/// Returns the value of storage slot 0.
const CONTRACT_CODE: [u8; 11] = [
    0x60, 0x00, 0x54, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
];

const BASE_NUMBER: u64 = 1000;

/// A deterministic two-block chain with one EOA, one contract and one
/// log-emitting transaction, plus every upstream response derived from it.
struct Fixture {
    base_hash: B256,
    child_hash: B256,
    blocks: HashMap<u64, serde_json::Value>,
    blocks_by_hash: HashMap<B256, serde_json::Value>,
    proofs: HashMap<Address, serde_json::Value>,
    codes: HashMap<Address, String>,
    access_list: serde_json::Value,
    logs: serde_json::Value,
    receipts: Vec<TransactionReceipt>,
    transaction_hash: B256,
    raw_transaction: Bytes,
    /// Whether `eth_getBlockReceipts` answers with "method not found".
    block_receipts_unsupported: bool,
}

fn single_leaf_proof(key: B256, value: Vec<u8>) -> (B256, Vec<Bytes>) {
    let nibbles = Nibbles::unpack(key);
    let retainer = ProofRetainer::new(vec![nibbles.clone()]);
    let mut builder = HashBuilder::default().with_proof_retainer(retainer);
    builder.add_leaf(nibbles, &value);
    let root = builder.root();
    let proof = builder
        .take_proof_nodes()
        .into_nodes_sorted()
        .into_iter()
        .map(|(_, node)| node)
        .collect();
    (root, proof)
}

fn fixture() -> Fixture {
    // Storage trie of the contract: slot 0 holds 0xcafe.
    let slot_value = U256::from(0xcafeu64);
    let (storage_root, slot_proof) = single_leaf_proof(
        keccak256(B256::ZERO),
        alloy_rlp::encode_fixed_size(&slot_value).to_vec(),
    );

    let eoa_account = TrieAccount {
        nonce: 7,
        balance: U256::from(EOA_BALANCE),
        storage_root: KECCAK_NULL_RLP,
        code_hash: KECCAK_EMPTY,
    };
    let contract_account = TrieAccount {
        nonce: 1,
        balance: U256::ZERO,
        storage_root,
        code_hash: keccak256(CONTRACT_CODE),
    };

    // Account trie with both accounts, retaining the proof paths of the two
    // accounts and of the (absent) zero address used as default caller.
    let mut leaves = vec![
        (Nibbles::unpack(keccak256(EOA)), alloy_rlp::encode(&eoa_account)),
        (
            Nibbles::unpack(keccak256(CONTRACT)),
            alloy_rlp::encode(&contract_account),
        ),
    ];
    leaves.sort_by(|a, b| a.0.cmp(&b.0));

    let targets = vec![
        Nibbles::unpack(keccak256(EOA)),
        Nibbles::unpack(keccak256(CONTRACT)),
        Nibbles::unpack(keccak256(Address::ZERO)),
    ];
    let mut builder =
        HashBuilder::default().with_proof_retainer(ProofRetainer::from_iter(targets));
    for (path, value) in &leaves {
        builder.add_leaf(path.clone(), value);
    }
    let state_root = builder.root();
    let account_nodes = builder.take_proof_nodes();
    let account_proof_for = |address: Address| -> Vec<Bytes> {
        account_nodes
            .matching_nodes_sorted(&Nibbles::unpack(keccak256(address)))
            .into_iter()
            .map(|(_, node)| node)
            .collect()
    };

    // One legacy transaction emitting one log.
    let transaction = TxLegacy {
        chain_id: Some(1),
        nonce: 7,
        gas_price: 1,
        gas_limit: 21_000,
        to: TxKind::Call(CONTRACT),
        value: U256::ZERO,
        input: Bytes::new(),
    };
    let signature = Signature::new(U256::from(1u64), U256::from(1u64), false);
    let envelope = TxEnvelope::Legacy(transaction.into_signed(signature));
    let raw_transaction: Bytes = envelope.encoded_2718().into();
    let transaction_hash = keccak256(&raw_transaction);
    let transactions_root = ordered_trie_root([&raw_transaction]);

    let log_topic = B256::repeat_byte(0x77);
    let log_data = Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]);
    let log_inner = alloy_primitives::Log::new_unchecked(
        CONTRACT,
        vec![log_topic],
        log_data.clone(),
    );

    let mut bloom = Bloom::ZERO;
    bloom.accrue(BloomInput::Raw(CONTRACT.as_slice()));
    bloom.accrue(BloomInput::Raw(log_topic.as_slice()));

    let execution_receipt = ExecutionReceipt {
        status: true,
        cumulative_gas_used: 21_000,
        logs_bloom: bloom,
        logs: vec![log_inner.clone()],
        transaction_type: 0,
    };
    let receipts_root = ordered_trie_root([execution_receipt.encoded()]);

    let base_header = BlockHeader {
        parent_hash: B256::repeat_byte(0x0f),
        ommers_hash: KECCAK_RLP_EMPTY_ARRAY,
        beneficiary: Address::ZERO,
        state_root,
        transactions_root,
        receipts_root,
        logs_bloom: bloom,
        difficulty: U256::ZERO,
        number: BASE_NUMBER,
        gas_limit: 30_000_000,
        gas_used: 21_000,
        timestamp: 1_700_000_000,
        extra_data: Bytes::new(),
        mix_hash: B256::ZERO,
        nonce: B64::ZERO,
        base_fee_per_gas: Some(7),
        withdrawals_root: Some(KECCAK_NULL_RLP),
        blob_gas: Some(BlobGas {
            gas_used: 0,
            excess_gas: 0,
        }),
        parent_beacon_block_root: Some(B256::ZERO),
        requests_hash: None,
    };
    let base_hash = base_header.hash();

    let child_header = BlockHeader {
        parent_hash: base_hash,
        number: BASE_NUMBER + 1,
        timestamp: base_header.timestamp + 12,
        ..base_header.clone()
    };
    let child_hash = child_header.hash();

    let rpc_block = |header: &BlockHeader, hash: B256| -> serde_json::Value {
        let rpc_transaction = Transaction {
            inner: alloy_consensus::transaction::Recovered::new_unchecked(envelope.clone(), EOA),
            block_hash: Some(hash),
            block_number: Some(header.number),
            transaction_index: Some(0),
            effective_gas_price: Some(1),
        };

        let block = Block::<Transaction> {
            hash: Some(hash),
            parent_hash: header.parent_hash,
            sha3_uncles: header.ommers_hash,
            state_root: header.state_root,
            transactions_root: header.transactions_root,
            receipts_root: header.receipts_root,
            number: Some(header.number),
            gas_used: header.gas_used,
            gas_limit: header.gas_limit,
            extra_data: header.extra_data.clone(),
            logs_bloom: header.logs_bloom,
            timestamp: header.timestamp,
            difficulty: header.difficulty,
            total_difficulty: None,
            uncles: Vec::new(),
            transactions: vec![rpc_transaction],
            size: 0,
            mix_hash: Some(header.mix_hash),
            nonce: Some(header.nonce),
            base_fee_per_gas: header.base_fee_per_gas.map(U256::from),
            miner: Some(header.beneficiary),
            withdrawals: Some(Vec::new()),
            withdrawals_root: header.withdrawals_root,
            blob_gas_used: header.blob_gas.as_ref().map(|blob_gas| blob_gas.gas_used),
            excess_blob_gas: header.blob_gas.as_ref().map(|blob_gas| blob_gas.excess_gas),
            parent_beacon_block_root: header.parent_beacon_block_root,
            requests_hash: None,
        };
        serde_json::to_value(block).expect("block serializes")
    };

    let proof_response = |address: Address,
                          account: Option<&TrieAccount>,
                          storage: Vec<EIP1186StorageProof>|
     -> serde_json::Value {
        let response = EIP1186AccountProofResponse {
            address,
            balance: account.map_or(U256::ZERO, |account| account.balance),
            nonce: account.map_or(0, |account| account.nonce),
            // Absent accounts are reported with all-zero hashes, as some
            // upstreams do.
            code_hash: account.map_or(B256::ZERO, |account| account.code_hash),
            storage_hash: account.map_or(B256::ZERO, |account| account.storage_root),
            account_proof: account_proof_for(address),
            storage_proof: storage,
        };
        serde_json::to_value(response).expect("proof serializes")
    };

    let rpc_log = alloy_rpc_types_eth::Log {
        inner: log_inner,
        block_hash: Some(base_hash),
        block_number: Some(BASE_NUMBER),
        block_timestamp: None,
        transaction_hash: Some(transaction_hash),
        transaction_index: Some(0),
        log_index: Some(0),
        removed: false,
    };

    let receipt = TransactionReceipt {
        transaction_hash,
        transaction_index: 0,
        block_hash: Some(base_hash),
        block_number: Some(BASE_NUMBER),
        from: EOA,
        to: Some(CONTRACT),
        gas_used: Some(21_000),
        cumulative_gas_used: 21_000,
        contract_address: None,
        logs: vec![rpc_log.clone()],
        logs_bloom: bloom,
        status: Some(U64::from(1)),
        root: None,
        transaction_type: Some(0),
        effective_gas_price: Some(1),
    };

    Fixture {
        base_hash,
        child_hash,
        blocks: HashMap::from([
            (BASE_NUMBER, rpc_block(&base_header, base_hash)),
            (BASE_NUMBER + 1, rpc_block(&child_header, child_hash)),
        ]),
        blocks_by_hash: HashMap::from([
            (base_hash, rpc_block(&base_header, base_hash)),
            (child_hash, rpc_block(&child_header, child_hash)),
        ]),
        proofs: HashMap::from([
            (
                EOA,
                proof_response(EOA, Some(&eoa_account), Vec::new()),
            ),
            (
                CONTRACT,
                proof_response(
                    CONTRACT,
                    Some(&contract_account),
                    vec![EIP1186StorageProof {
                        key: JsonStorageKey::Hash(B256::ZERO),
                        value: slot_value,
                        proof: slot_proof,
                    }],
                ),
            ),
            (Address::ZERO, proof_response(Address::ZERO, None, Vec::new())),
        ]),
        codes: HashMap::from([
            (EOA, "0x".to_string()),
            (CONTRACT, format!("0x{}", alloy_primitives::hex::encode(CONTRACT_CODE))),
            (Address::ZERO, "0x".to_string()),
        ]),
        access_list: serde_json::json!({
            "accessList": [
                { "address": CONTRACT, "storageKeys": [B256::ZERO] }
            ],
            "gasUsed": "0x0"
        }),
        logs: serde_json::json!([rpc_log]),
        receipts: vec![receipt],
        transaction_hash,
        raw_transaction,
        block_receipts_unsupported: false,
    }
}

fn respond_one(fixture: &Fixture, envelope: &serde_json::Value) -> serde_json::Value {
    let id = envelope["id"].clone();
    let method = envelope["method"].as_str().unwrap_or_default();
    let params = &envelope["params"];

    let parse_number = |raw: &serde_json::Value| {
        raw.as_str()
            .and_then(|raw| raw.strip_prefix("0x"))
            .and_then(|raw| u64::from_str_radix(raw, 16).ok())
    };

    let result: Result<serde_json::Value, (i16, String)> = match method {
        "eth_blockNumber" => Ok(serde_json::json!(format!("0x{:x}", BASE_NUMBER + 1))),
        "eth_chainId" => Ok(serde_json::json!("0x1")),
        "eth_getBlockByNumber" => {
            let number = parse_number(&params[0]).unwrap_or_default();
            Ok(fixture
                .blocks
                .get(&number)
                .cloned()
                .unwrap_or(serde_json::Value::Null))
        }
        "eth_getBlockByHash" => {
            let hash: B256 = params[0].as_str().unwrap_or_default().parse().unwrap();
            Ok(fixture
                .blocks_by_hash
                .get(&hash)
                .cloned()
                .unwrap_or(serde_json::Value::Null))
        }
        "eth_getProof" => {
            let address: Address = params[0].as_str().unwrap_or_default().parse().unwrap();
            fixture
                .proofs
                .get(&address)
                .cloned()
                .ok_or((-32000, format!("no proof fixture for {address}")))
        }
        "eth_getCode" => {
            let address: Address = params[0].as_str().unwrap_or_default().parse().unwrap();
            fixture
                .codes
                .get(&address)
                .map(|code| serde_json::json!(code))
                .ok_or((-32000, format!("no code fixture for {address}")))
        }
        "eth_createAccessList" => Ok(fixture.access_list.clone()),
        "eth_getLogs" => Ok(fixture.logs.clone()),
        "eth_getBlockReceipts" => {
            if fixture.block_receipts_unsupported {
                Err((-32601, "the method eth_getBlockReceipts does not exist".to_string()))
            } else {
                Ok(serde_json::to_value(&fixture.receipts).expect("receipts serialize"))
            }
        }
        "eth_getTransactionReceipt" => {
            let hash: B256 = params[0].as_str().unwrap_or_default().parse().unwrap();
            Ok(fixture
                .receipts
                .iter()
                .find(|receipt| receipt.transaction_hash == hash)
                .map(|receipt| serde_json::to_value(receipt).expect("receipt serializes"))
                .unwrap_or(serde_json::Value::Null))
        }
        // A lying upstream: announces a hash unrelated to the submitted
        // transaction.
        "eth_sendRawTransaction" => Ok(serde_json::to_value(B256::repeat_byte(0x66)).unwrap()),
        other => Err((-32601, format!("method not found: {other}"))),
    };

    match result {
        Ok(result) => serde_json::json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err((code, message)) => serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": code, "message": message }
        }),
    }
}

async fn start_upstream(fixture: Arc<Fixture>) -> String {
    let app = Router::new().route(
        "/",
        post(move |Json(body): Json<serde_json::Value>| {
            let fixture = fixture.clone();
            async move {
                let response = match &body {
                    serde_json::Value::Array(envelopes) => serde_json::Value::Array(
                        envelopes
                            .iter()
                            .map(|envelope| respond_one(&fixture, envelope))
                            .collect(),
                    ),
                    envelope => respond_one(&fixture, envelope),
                };
                Json(response)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    url
}

async fn provider_for(fixture: Arc<Fixture>) -> Provider {
    let url = start_upstream(fixture.clone()).await;
    let config = ProviderConfig::new(url, BASE_NUMBER, fixture.base_hash);
    Provider::new(runtime::Handle::current(), config).expect("provider construction")
}

fn latest() -> Option<BlockSpec> {
    Some(BlockSpec::latest())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn chain_id_and_net_version_come_from_config() -> anyhow::Result<()> {
    // No upstream traffic is involved.
    let config = ProviderConfig::new("http://127.0.0.1:9".to_string(), 1, B256::ZERO);
    let provider = Provider::new(runtime::Handle::current(), config)?;

    let chain_id = provider
        .handle_request(MethodInvocation::ChainId(()))
        .await?;
    assert_eq!(chain_id, serde_json::json!("0x1"));

    let network_id = provider
        .handle_request(MethodInvocation::NetVersion(()))
        .await?;
    assert_eq!(network_id, serde_json::json!("1"));

    let number = provider
        .handle_request(MethodInvocation::BlockNumber(()))
        .await?;
    assert_eq!(number, serde_json::json!("0x1"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn account_state_is_served_from_verified_proofs() -> anyhow::Result<()> {
    let provider = provider_for(Arc::new(fixture())).await;

    let balance = provider
        .handle_request(MethodInvocation::GetBalance(EOA, latest()))
        .await?;
    assert_eq!(balance, serde_json::json!("0x60e74857f86c4"));

    let nonce = provider
        .handle_request(MethodInvocation::GetTransactionCount(EOA, latest()))
        .await?;
    assert_eq!(nonce, serde_json::json!("0x7"));

    // An externally owned account has no code.
    let code = provider
        .handle_request(MethodInvocation::GetCode(EOA, latest()))
        .await?;
    assert_eq!(code, serde_json::json!("0x"));

    let code = provider
        .handle_request(MethodInvocation::GetCode(CONTRACT, latest()))
        .await?;
    assert_eq!(
        code,
        serde_json::json!(format!(
            "0x{}",
            alloy_primitives::hex::encode(CONTRACT_CODE)
        ))
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tampered_account_proof_is_fatal() -> anyhow::Result<()> {
    let mut tampered = fixture();
    {
        let proof = tampered.proofs.get_mut(&EOA).unwrap();
        let nodes = proof["accountProof"].as_array_mut().unwrap();
        let node = nodes[0].as_str().unwrap().to_string();
        // Flip one nibble inside the first proof node.
        let mut bytes = alloy_primitives::hex::decode(&node)?;
        let middle = bytes.len() / 2;
        bytes[middle] ^= 0x01;
        nodes[0] = serde_json::json!(format!("0x{}", alloy_primitives::hex::encode(bytes)));
    }

    let provider = provider_for(Arc::new(tampered)).await;
    let error = provider
        .handle_request(MethodInvocation::GetBalance(EOA, latest()))
        .await
        .expect_err("tampered proof must never verify");
    assert_eq!(error.error_code(), -32603);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn call_runs_against_materialized_proven_state() -> anyhow::Result<()> {
    let provider = provider_for(Arc::new(fixture())).await;

    let request = CallRequest {
        to: Some(CONTRACT),
        ..CallRequest::default()
    };
    let result = provider
        .handle_request(MethodInvocation::Call(request.clone(), latest()))
        .await?;
    assert_eq!(
        result,
        serde_json::json!(format!("0x{}{:04x}", "00".repeat(30), 0xcafe))
    );

    let estimate = provider
        .handle_request(MethodInvocation::EstimateGas(request, latest()))
        .await?;
    let gas = u64::from_str_radix(
        estimate.as_str().unwrap().trim_start_matches("0x"),
        16,
    )?;
    assert!(gas >= 21_000);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn future_block_request_waits_for_the_head() -> anyhow::Result<()> {
    let fixture = Arc::new(fixture());
    let provider = provider_for(fixture.clone()).await;

    let pending = {
        let provider = provider.clone();
        tokio::spawn(async move {
            provider
                .handle_request(MethodInvocation::GetBlockByNumber(
                    BlockSpec::Number(BASE_NUMBER + 1),
                    false,
                ))
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!pending.is_finished(), "request must wait for the head");

    provider.update_trusted_head(fixture.child_hash, BASE_NUMBER + 1);

    let block = tokio::time::timeout(Duration::from_secs(5), pending).await???;
    assert_eq!(
        block["hash"],
        serde_json::json!(fixture.child_hash.to_string())
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn logs_are_verified_down_to_the_receipt_trie() -> anyhow::Result<()> {
    let provider = provider_for(Arc::new(fixture())).await;

    let logs = provider
        .handle_request(MethodInvocation::GetLogs(LogFilterOptions::default()))
        .await?;
    assert_eq!(logs.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn logs_survive_the_per_transaction_receipt_fallback() -> anyhow::Result<()> {
    let mut fixture = fixture();
    fixture.block_receipts_unsupported = true;
    let provider = provider_for(Arc::new(fixture)).await;

    let logs = provider
        .handle_request(MethodInvocation::GetLogs(LogFilterOptions::default()))
        .await?;
    assert_eq!(logs.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn altered_log_data_is_fatal() -> anyhow::Result<()> {
    let mut tampered = fixture();
    tampered.logs[0]["data"] = serde_json::json!("0xffffffff");

    let provider = provider_for(Arc::new(tampered)).await;
    let error = provider
        .handle_request(MethodInvocation::GetLogs(LogFilterOptions::default()))
        .await
        .expect_err("a log absent from the verified receipt must be rejected");
    assert_eq!(error.error_code(), -32603);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn send_raw_transaction_returns_the_locally_computed_hash() -> anyhow::Result<()> {
    let fixture = Arc::new(fixture());
    let provider = provider_for(fixture.clone()).await;

    // The mock upstream lies about the submitted transaction's hash; the
    // caller still receives the hash of what was actually sent.
    let result = provider
        .handle_request(MethodInvocation::SendRawTransaction(
            fixture.raw_transaction.clone(),
        ))
        .await?;
    assert_eq!(
        result,
        serde_json::json!(fixture.transaction_hash.to_string())
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn receipt_membership_is_verified_and_unverified_fields_zeroed() -> anyhow::Result<()> {
    let fixture = Arc::new(fixture());
    let provider = provider_for(fixture.clone()).await;

    let receipt = provider
        .handle_request(MethodInvocation::GetTransactionReceipt(
            fixture.transaction_hash,
        ))
        .await?;

    assert_eq!(
        receipt["blockHash"],
        serde_json::json!(fixture.base_hash.to_string())
    );
    assert_eq!(receipt["gasUsed"], serde_json::json!("0x0"));
    assert_eq!(receipt["logs"], serde_json::json!([]));

    // A receipt for an unknown transaction is null, not an error.
    let missing = provider
        .handle_request(MethodInvocation::GetTransactionReceipt(B256::repeat_byte(
            0x99,
        )))
        .await?;
    assert_eq!(missing, serde_json::Value::Null);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unsupported_tags_and_far_blocks_are_invalid_params() -> anyhow::Result<()> {
    let provider = provider_for(Arc::new(fixture())).await;

    for tag in [
        BlockTag::Pending,
        BlockTag::Earliest,
        BlockTag::Safe,
        BlockTag::Finalized,
    ] {
        let error = provider
            .handle_request(MethodInvocation::GetBalance(
                EOA,
                Some(BlockSpec::Tag(tag)),
            ))
            .await
            .expect_err("tag is unsupported");
        assert_eq!(error.error_code(), -32602);
    }

    let error = provider
        .handle_request(MethodInvocation::GetBalance(
            EOA,
            Some(BlockSpec::Number(BASE_NUMBER + 100)),
        ))
        .await
        .expect_err("far-future block is rejected, not awaited");
    assert_eq!(error.error_code(), -32602);
    Ok(())
}
