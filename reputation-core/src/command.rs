//! JSON call surface
//!
//! Requests and responses exchanged with hosts that embed the state machine
//! behind a remote-procedure or line-based interface. Addresses travel as
//! plain strings; failures carry the stable rejection code.
//!
//! ```text
//! {"method":"register_user","caller":"0xA"}
//! {"status":"registered","address":"0xA","sequence":1}
//!
//! {"method":"initiate_transaction","caller":"0xM","buyer":"0xA","seller":"0xB"}
//! {"status":"transaction_initiated","id":1}
//! ```

use crate::{
    machine::ReputationStateMachine,
    types::{Address, Transaction, TransactionId},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Code reported for requests that could not be decoded
pub const INVALID_REQUEST: &str = "invalid_request";

/// Code reported for failures that are not caller rejections
pub const INTERNAL_ERROR: &str = "internal";

/// Inbound call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Request {
    /// Register the caller
    RegisterUser {
        /// Calling identity
        caller: String,
    },

    /// Record a transaction
    InitiateTransaction {
        /// Calling marketplace
        caller: String,
        /// Buyer identity
        buyer: String,
        /// Seller identity
        seller: String,
    },

    /// List registered users
    GetAllUsers,

    /// Number of transactions
    GetTransactionCount,

    /// Fetch one transaction
    GetTransaction {
        /// Transaction id
        id: u64,
    },

    /// Registration lookup
    IsRegistered {
        /// Address to look up
        address: String,
    },

    /// Prometheus text exposition of the node counters
    GetMetrics,
}

/// Outbound result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    /// Caller registered
    Registered {
        /// Registered address
        address: String,
        /// Registration order
        sequence: u64,
    },

    /// Transaction recorded
    TransactionInitiated {
        /// New transaction id
        id: u64,
    },

    /// Registered users in registration order
    Users {
        /// Addresses
        users: Vec<String>,
    },

    /// Transaction count
    TransactionCount {
        /// Number of transactions
        count: u64,
    },

    /// Transaction lookup result
    Transaction {
        /// Record, if the id exists
        transaction: Option<Transaction>,
    },

    /// Registration lookup result
    Registration {
        /// Address looked up
        address: String,
        /// Whether it is registered
        registered: bool,
    },

    /// Rendered metrics
    Metrics {
        /// Prometheus text format
        text: String,
    },

    /// Call failed
    Error {
        /// Stable failure code
        kind: String,
        /// Human-readable detail
        message: String,
    },
}

impl Response {
    fn from_error(err: &Error) -> Self {
        let kind = err
            .rejection_kind()
            .map(|kind| kind.as_str())
            .unwrap_or(INTERNAL_ERROR);

        Response::Error {
            kind: kind.to_string(),
            message: err.to_string(),
        }
    }

    fn invalid_request(message: impl ToString) -> Self {
        Response::Error {
            kind: INVALID_REQUEST.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the call failed
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}

/// Addresses arriving over the wire lose surrounding whitespace here and
/// nowhere else.
fn address(value: String) -> Address {
    Address::new(value.trim())
}

/// Execute a request against the state machine
pub fn dispatch(machine: &ReputationStateMachine, request: Request) -> Response {
    match request {
        Request::RegisterUser { caller } => match machine.register_user(address(caller)) {
            Ok(identity) => Response::Registered {
                address: identity.address.to_string(),
                sequence: identity.sequence,
            },
            Err(err) => Response::from_error(&err),
        },

        Request::InitiateTransaction {
            caller,
            buyer,
            seller,
        } => match machine.initiate_transaction(
            address(caller),
            address(buyer),
            address(seller),
        ) {
            Ok(id) => Response::TransactionInitiated { id: id.value() },
            Err(err) => Response::from_error(&err),
        },

        Request::GetAllUsers => Response::Users {
            users: machine
                .get_all_users()
                .into_iter()
                .map(|address| address.to_string())
                .collect(),
        },

        Request::GetTransactionCount => Response::TransactionCount {
            count: machine.get_transaction_count(),
        },

        Request::GetTransaction { id } => Response::Transaction {
            transaction: machine.get_transaction(TransactionId::new(id)),
        },

        Request::IsRegistered { address: value } => {
            let address = address(value);
            Response::Registration {
                registered: machine.is_registered(&address),
                address: address.to_string(),
            }
        }

        Request::GetMetrics => match machine.metrics().gather_text() {
            Ok(text) => Response::Metrics { text },
            Err(err) => Response::from_error(&Error::from(err)),
        },
    }
}

/// Decode one JSON request, execute it and encode the response
///
/// Malformed input produces an `invalid_request` error response.
pub fn handle_line(machine: &ReputationStateMachine, line: &str) -> Result<String> {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => dispatch(machine, request),
        Err(err) => {
            tracing::debug!(error = %err, "Malformed request");
            Response::invalid_request(err)
        }
    };

    Ok(serde_json::to_string(&response)?)
}

/// Serve newline-delimited requests until the reader is exhausted
///
/// Every non-blank line gets exactly one response line. A line that is not
/// valid UTF-8 is answered with `invalid_request` and the loop keeps going.
/// Returns the number of requests answered.
pub async fn serve<R, W>(
    machine: &ReputationStateMachine,
    mut reader: R,
    mut writer: W,
) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut answered = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let mut response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(machine, line)?,
            Err(err) => {
                tracing::debug!(error = %err, "Request is not valid UTF-8");
                serde_json::to_string(&Response::invalid_request(format!(
                    "request is not valid UTF-8: {}",
                    err
                )))?
            }
        };

        response.push('\n');
        writer.write_all(response.as_bytes()).await?;
        writer.flush().await?;
        answered += 1;
    }

    Ok(answered)
}
