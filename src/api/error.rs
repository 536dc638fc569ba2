//! Fee relayer 服务端错误
//!
//! 非 2xx 响应体的格式：
//!
//! ```json
//! {"code": 6, "message": "...", "data": {"ClientError": ["RPC response error -32002: ..."]}}
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// 程序日志匹配："Program ..." 或 "Transfer: ..."
static PROGRAM_LOG_REGEX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r#""(?:Program|Transfer:) [^"]+""#).ok());

const ERROR_PREFIXES: [&str; 3] =
    ["Program failed to complete: ", "Program log: Error: ", "Transfer: insufficient lamports "];

const CONNECTION_CLOSED: &str = "connection closed before message completed";

/// Error kinds reported by the relay server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    ParseHashError,
    ParsePubkeyError,
    ParseKeypairError,
    ParseSignatureError,
    WrongSignature,
    SignerError,
    ClientError,
    ProgramError,
    TooSmallAmount,
    NotEnoughBalance,
    NotEnoughTokenBalance,
    DecimalsMismatch,
    TokenAccountNotFound,
    IncorrectAccountOwner,
    TokenMintMismatch,
    UnsupportedRecipientAddress,
    FeeCalculatorNotFound,
    NotEnoughOutAmount,
    UnknownSwapProgramId,
    Unknown,
}

impl ErrorType {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "ParseHashError" => ErrorType::ParseHashError,
            "ParsePubkeyError" => ErrorType::ParsePubkeyError,
            "ParseKeypairError" => ErrorType::ParseKeypairError,
            "ParseSignatureError" => ErrorType::ParseSignatureError,
            "WrongSignature" => ErrorType::WrongSignature,
            "SignerError" => ErrorType::SignerError,
            "ClientError" => ErrorType::ClientError,
            "ProgramError" => ErrorType::ProgramError,
            "TooSmallAmount" => ErrorType::TooSmallAmount,
            "NotEnoughBalance" => ErrorType::NotEnoughBalance,
            "NotEnoughTokenBalance" => ErrorType::NotEnoughTokenBalance,
            "DecimalsMismatch" => ErrorType::DecimalsMismatch,
            "TokenAccountNotFound" => ErrorType::TokenAccountNotFound,
            "IncorrectAccountOwner" => ErrorType::IncorrectAccountOwner,
            "TokenMintMismatch" => ErrorType::TokenMintMismatch,
            "UnsupportedRecipientAddress" => ErrorType::UnsupportedRecipientAddress,
            "FeeCalculatorNotFound" => ErrorType::FeeCalculatorNotFound,
            "NotEnoughOutAmount" => ErrorType::NotEnoughOutAmount,
            "UnknownSwapProgramId" => ErrorType::UnknownSwapProgramId,
            _ => ErrorType::Unknown,
        }
    }
}

/// Payload attached to an error type
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ErrorData {
    Array(Vec<String>),
    Dict(HashMap<String, u64>),
    Other(serde_json::Value),
}

impl ErrorData {
    pub fn array(&self) -> Option<&[String]> {
        match self {
            ErrorData::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn dict(&self) -> Option<&HashMap<String, u64>> {
        match self {
            ErrorData::Dict(map) => Some(map),
            _ => None,
        }
    }
}

/// `{"<ErrorType>": <data>}`, a single-key object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub error_type: ErrorType,
    pub data: Option<ErrorData>,
}

impl<'de> Deserialize<'de> for ErrorDetail {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = HashMap::<String, Option<ErrorData>>::deserialize(deserializer)?;
        let (code, data) = map.into_iter().next().unwrap_or_else(|| ("Unknown".to_string(), None));
        Ok(ErrorDetail { error_type: ErrorType::from_code(&code), data })
    }
}

/// Structured error returned by the relay server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct FeeRelayerError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientErrorType {
    InsufficientFunds,
    MaximumNumberOfInstructionsAllowedExceeded,
    ConnectionClosedBeforeMessageCompleted,
    GivenPoolTokenAmountResultsInZeroTradingTokens,
    SwapInstructionExceedsDesiredSlippageLimit,
}

impl ClientErrorType {
    pub fn description(&self) -> &'static str {
        match self {
            ClientErrorType::InsufficientFunds => "Insufficient funds",
            ClientErrorType::MaximumNumberOfInstructionsAllowedExceeded => {
                "Exceeded maximum number of instructions allowed"
            }
            ClientErrorType::ConnectionClosedBeforeMessageCompleted => {
                "Connection closed before message completed"
            }
            ClientErrorType::GivenPoolTokenAmountResultsInZeroTradingTokens => {
                "Given pool token amount results in zero trading tokens"
            }
            ClientErrorType::SwapInstructionExceedsDesiredSlippageLimit => {
                "Swap instruction exceeds desired slippage limit"
            }
        }
    }

    fn from_log(log: &str) -> Option<Self> {
        if log.contains("exceeded maximum number of instructions allowed") {
            Some(ClientErrorType::MaximumNumberOfInstructionsAllowedExceeded)
        } else if log.contains("insufficient funds") || log.contains("insufficient lamports") {
            Some(ClientErrorType::InsufficientFunds)
        } else if log.contains("Given pool token amount results in zero trading tokens") {
            Some(ClientErrorType::GivenPoolTokenAmountResultsInZeroTradingTokens)
        } else if log.contains("Swap instruction exceeds desired slippage limit") {
            Some(ClientErrorType::SwapInstructionExceedsDesiredSlippageLimit)
        } else {
            None
        }
    }
}

/// Program logs pulled out of a `ClientError` payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    pub program_logs: Vec<String>,
    pub error_type: Option<ClientErrorType>,
    /// The failing log line with its prefix removed
    pub error_log: Option<String>,
}

impl FeeRelayerError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }

    pub fn unknown() -> Self {
        Self::new(-1, "Unknown error")
    }

    pub fn error_type(&self) -> Option<ErrorType> {
        self.data.as_ref().map(|d| d.error_type)
    }

    /// Parse the simulation logs of a `ClientError`. `None` for other error types or
    /// when the payload carries no logs.
    pub fn client_error(&self) -> Option<ClientError> {
        let detail = self.data.as_ref()?;
        if detail.error_type != ErrorType::ClientError {
            return None;
        }

        if self.message.contains(CONNECTION_CLOSED) {
            return Some(ClientError {
                program_logs: Vec::new(),
                error_type: Some(ClientErrorType::ConnectionClosedBeforeMessageCompleted),
                error_log: Some(CONNECTION_CLOSED.to_string()),
            });
        }

        let raw = detail.data.as_ref()?.array()?.first()?;
        let program_logs: Vec<String> = match PROGRAM_LOG_REGEX.as_ref() {
            Some(re) => re.find_iter(raw).map(|m| m.as_str().replace('"', "")).collect(),
            None => Vec::new(),
        };

        let error_log = program_logs
            .iter()
            .find(|log| ERROR_PREFIXES.iter().any(|prefix| log.starts_with(prefix)))
            .cloned();
        let error_type = error_log.as_deref().and_then(ClientErrorType::from_log);
        let error_log = error_log.map(|log| {
            log.replace("Program failed to complete: ", "")
                .replace("Program log: Error: ", "")
                .replace("Transfer: ", "")
        });

        Some(ClientError { program_logs, error_type, error_log })
    }
}
