//! Fee relayer API 客户端测试
//!
//! 使用记录请求的传输层，验证 URL、请求体以及响应和错误的解析


use sol_fee_relayer::api::{
    ApiClient, DeviceType, Environment, ErrorType, FeeRelayerApi, HttpMethod, OperationType,
    RelayTransactionParam, RequestType, StatsInfo, TransferSolParams,
};
use sol_fee_relayer::common::RelayError;
use sol_fee_relayer::constants::USDC_MINT;
use sol_fee_relayer::relay::{RelayProgram, UsageStatus};
use solana_sdk::hash::Hash;
use solana_sdk::message::Message;
use solana_sdk::signature::Signature;
use std::sync::Arc;
use test_helpers::*;

const BASE_URL: &str = "https://fee-relayer.test";

fn client(responses: Vec<(u16, &str)>, version: u32) -> (ApiClient<Arc<RecordingTransport>>, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::new(responses));
    let client = ApiClient::with_transport(transport.clone(), BASE_URL.to_string(), version);
    (client, transport)
}

fn stats() -> StatsInfo {
    StatsInfo::new(OperationType::Transfer, DeviceType::Web, Environment::Release)
}

fn relay_param() -> RelayTransactionParam {
    let ix = RelayProgram::default().transfer_sol_instruction(&OWNER, &FEE_PAYER, 10_000);
    let message = Message::new_with_blockhash(&[ix], Some(&FEE_PAYER), &Hash::new_unique());
    RelayTransactionParam::from_message(&message, &[(OWNER, Signature::default())], stats()).unwrap()
}

// ===== GET =====

#[tokio::test]
async fn test_fee_payer_pubkey_json_string() {
    let body = format!("\"{FEE_PAYER}\"");
    let (client, transport) = client(vec![(200, &body)], 1);

    assert_eq!(client.get_fee_payer_pubkey().await.unwrap(), FEE_PAYER.to_string());

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, HttpMethod::Get);
    assert_eq!(request.url, format!("{BASE_URL}/fee_payer/pubkey"));
}

#[tokio::test]
async fn test_fee_payer_pubkey_plain_text() {
    let body = format!("{FEE_PAYER}\n");
    let (client, _) = client(vec![(200, &body)], 1);
    assert_eq!(client.get_fee_payer_pubkey().await.unwrap(), FEE_PAYER.to_string());
}

#[tokio::test]
async fn test_version_prefix() {
    let body = format!("\"{FEE_PAYER}\"");
    let (client, transport) = client(vec![(200, &body)], 2);

    client.get_fee_payer_pubkey().await.unwrap();
    assert_eq!(transport.last_request().unwrap().url, format!("{BASE_URL}/v2/fee_payer/pubkey"));
}

#[tokio::test]
async fn test_invalid_base_url() {
    let transport = Arc::new(RecordingTransport::new(vec![]));
    let client = ApiClient::with_transport(transport.clone(), "not a url".to_string(), 1);

    let err = client.get_fee_payer_pubkey().await.unwrap_err();
    assert!(matches!(err, RelayError::InvalidUrl(_)));
    assert!(transport.requests.lock().is_empty());
}

#[tokio::test]
async fn test_free_fee_limits_to_usage_status() {
    let body = serde_json::to_string(&serde_json::json!({
        "authority": OWNER.to_bytes().to_vec(),
        "limits": {
            "use_free_fee": true,
            "max_fee_amount": 10_000_000u64,
            "max_fee_count": 100,
            "max_token_account_creation_amount": 10_000_000u64,
            "max_token_account_creation_count": 30,
            "period": {"secs": 86_400, "nanos": 0}
        },
        "processed_fee": {"total_fee_amount": 30_000, "fee_count": 3, "rent_count": 1}
    }))
    .unwrap();
    let (client, transport) = client(vec![(200, &body)], 1);

    let usage = client.get_usage_status(&OWNER).await.unwrap();
    assert_eq!(usage, UsageStatus::new(100, 3, 10_000_000, 30_000));
    assert_eq!(transport.last_request().unwrap().url, format!("{BASE_URL}/free_fee_limits/{OWNER}"));
}

#[tokio::test]
async fn test_fee_token_data() {
    let body = serde_json::to_string(&serde_json::json!({
        "name": "USD Coin",
        "code": "USDC",
        "mint": USDC_MINT.to_string(),
        "account": FEE_PAYER.to_string(),
        "exchange_rate": 20.5
    }))
    .unwrap();
    let (client, transport) = client(vec![(200, &body)], 1);

    let data = client.fee_token_data(&USDC_MINT).await.unwrap();
    assert_eq!(data.code, "USDC");
    assert_eq!(data.exchange_rate, 20.5);
    assert_eq!(transport.last_request().unwrap().url, format!("{BASE_URL}/fee_token_data/{USDC_MINT}"));
}

// ===== 错误 =====

#[tokio::test]
async fn test_structured_server_error() {
    let body = r#"{"code": 6, "message": "Not enough balance", "data": {"NotEnoughBalance": {"expected": 10, "found": 1}}}"#;
    let (client, _) = client(vec![(400, body)], 1);

    match client.get_free_fee_limits(&OWNER).await.unwrap_err() {
        RelayError::Server(err) => {
            assert_eq!(err.code, 6);
            assert_eq!(err.error_type(), Some(ErrorType::NotEnoughBalance));
            let dict = err.data.as_ref().and_then(|d| d.data.as_ref()).and_then(|d| d.dict()).unwrap();
            assert_eq!(dict.get("expected"), Some(&10));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_error_is_unknown() {
    let (client, _) = client(vec![(502, "<html>bad gateway</html>")], 1);
    let err = client.get_fee_payer_pubkey().await.unwrap_err();
    assert!(matches!(err, RelayError::Unknown));
}

#[tokio::test]
async fn test_transport_failure_is_propagated() {
    // 没有预设响应时传输层返回错误
    let (client, _) = client(vec![], 1);
    assert!(client.fee_token_data(&USDC_MINT).await.is_err());
}

#[tokio::test]
async fn test_fee_payer_pubkey_invalid_utf8_is_unknown() {
    let transport = Arc::new(RecordingTransport::with_raw_body(200, vec![0xff, 0xfe, 0xfd]));
    let client = ApiClient::with_transport(transport, BASE_URL.to_string(), 1);

    let err = client.get_fee_payer_pubkey().await.unwrap_err();
    assert!(matches!(err, RelayError::Unknown));
}

// ===== POST =====

#[tokio::test]
async fn test_relay_transaction_request() {
    let (client, transport) = client(vec![(200, "[\"5sig\"]")], 1);
    let param = relay_param();

    let signature = client.send_transaction(&RequestType::RelayTransaction(param.clone())).await.unwrap();
    assert_eq!(signature, "5sig");

    let request = transport.last_request().unwrap();
    assert_eq!(request.method, HttpMethod::Post);
    assert_eq!(request.url, format!("{BASE_URL}/relay_transaction"));

    let body: serde_json::Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["pubkeys"][0], FEE_PAYER.to_string());
    assert_eq!(body["blockhash"], param.blockhash);
    assert_eq!(body["info"]["device_type"], serde_json::to_value(DeviceType::Web).unwrap());
    let owner_index = param.pubkeys.iter().position(|k| *k == OWNER.to_string()).unwrap();
    assert_eq!(body["signatures"][owner_index.to_string()], Signature::default().to_string());
}

#[tokio::test]
async fn test_sign_relay_transaction_returns_signature() {
    let (client, transport) = client(vec![(200, r#"{"signature": "3feePayerSig", "transaction": "AQID"}"#)], 1);

    let signature = client
        .send_transaction(&RequestType::SignRelayTransaction(relay_param()))
        .await
        .unwrap();
    assert_eq!(signature, "3feePayerSig");
    assert_eq!(transport.last_request().unwrap().url, format!("{BASE_URL}/sign_relay_transaction"));
}

#[tokio::test]
async fn test_transfer_sol_body_keys() {
    let (client, transport) = client(vec![(200, "\"4transfer\"")], 2);
    let params = TransferSolParams::new(
        &OWNER,
        &FEE_PAYER,
        1_000_000,
        &Signature::default(),
        Hash::default().to_string(),
        DeviceType::Android,
        Some("1.0.0".to_string()),
        Environment::Dev,
    );

    let signature = client.send_transaction(&RequestType::TransferSol(params)).await.unwrap();
    assert_eq!(signature, "4transfer");

    let request = transport.last_request().unwrap();
    assert_eq!(request.url, format!("{BASE_URL}/v2/transfer_sol"));
    let body: serde_json::Value = serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["sender_pubkey"], OWNER.to_string());
    assert_eq!(body["recipient_pubkey"], FEE_PAYER.to_string());
    assert_eq!(body["lamports"], 1_000_000);
    assert_eq!(body["info"]["currency"], "SOL");
}

#[tokio::test]
async fn test_bare_signature_falls_back_to_plain_text() {
    let (client, _) = client(vec![(200, "5bareSignature\n")], 1);

    let signature = client.send_transaction(&RequestType::RelayTransaction(relay_param())).await.unwrap();
    assert_eq!(signature, "5bareSignature");
}

#[tokio::test]
async fn test_send_transaction_invalid_utf8_is_unknown() {
    let transport = Arc::new(RecordingTransport::with_raw_body(200, vec![0x80, 0x81, b'"']));
    let client = ApiClient::with_transport(transport.clone(), BASE_URL.to_string(), 1);

    let err = client
        .send_transaction(&RequestType::RelayTransaction(relay_param()))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Unknown));
    assert_eq!(transport.requests.lock().len(), 1);
}

#[tokio::test]
async fn test_client_error_logs() {
    let body = r#"{"code": 6, "message": "simulation failed", "data": {"ClientError": ["RPC response error -32002: Transaction simulation failed; [\"Program 11111111111111111111111111111111 invoke [1]\", \"Transfer: insufficient lamports 19266, need 2039280\", \"Program 11111111111111111111111111111111 failed: custom program error: 0x1\"]"]}}"#;
    let (client, _) = client(vec![(500, body)], 1);

    let err = match client.send_transaction(&RequestType::RelayTransaction(relay_param())).await {
        Err(RelayError::Server(err)) => err,
        other => panic!("unexpected result: {other:?}"),
    };
    let client_error = err.client_error().unwrap();
    assert_eq!(client_error.program_logs.len(), 3);
    assert_eq!(client_error.error_log.as_deref(), Some("insufficient lamports 19266, need 2039280"));
    assert_eq!(
        client_error.error_type,
        Some(sol_fee_relayer::api::ClientErrorType::InsufficientFunds)
    );
}

#[test]
fn test_unknown_signer_is_rejected() {
    let ix = RelayProgram::default().transfer_sol_instruction(&OWNER, &FEE_PAYER, 10_000);
    let message = Message::new(&[ix], Some(&FEE_PAYER));
    let stranger = solana_sdk::pubkey::Pubkey::new_unique();

    let err = RelayTransactionParam::from_message(&message, &[(stranger, Signature::default())], stats()).unwrap_err();
    assert!(matches!(err, RelayError::InvalidSignature(pk) if pk == stranger));
}
