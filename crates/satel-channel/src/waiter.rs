use tokio::sync::oneshot;

use satel_core::IntegraError;
use satel_protocol::{Opcode, ResponseErrorCode};

/// A response delivered either by the panel or synthesized locally (a
/// timeout, or a transport error that fired while a request was in
/// flight).
#[derive(Debug, Clone)]
pub struct Response {
    pub opcode: Opcode,
    pub payload: Vec<u8>,
    pub error_code: Option<ResponseErrorCode>,
}

impl Response {
    pub fn from_frame(opcode: Opcode, payload: Vec<u8>) -> Self {
        let error_code = (opcode == Opcode::ReadResult)
            .then(|| payload.first().copied())
            .flatten()
            .map(|b| ResponseErrorCode::from_code(b as u16));
        Self { opcode, payload, error_code }
    }

    pub fn no_response(command: Opcode) -> Self {
        Self {
            opcode: command,
            payload: Vec::new(),
            error_code: Some(ResponseErrorCode::NoResponse),
        }
    }

    /// `true` when this is a `READ_RESULT` with a code other than
    /// `CommandAccepted`/`NoError`, i.e. the panel rejected the request.
    pub fn is_request_error(&self) -> bool {
        matches!(
            self.error_code,
            Some(code) if !matches!(code, ResponseErrorCode::NoError | ResponseErrorCode::CommandAccepted)
        )
    }

    pub fn into_result(self, command: u8) -> Result<Response, IntegraError> {
        match self.error_code {
            Some(ResponseErrorCode::NoResponse) => Err(IntegraError::NoResponse),
            Some(code) if self.is_request_error() => Err(IntegraError::RequestError {
                command,
                error_code: code as u16,
            }),
            _ => Ok(self),
        }
    }
}

/// One outstanding caller waiting for a specific opcode (or, for
/// `result_allowed` requests, also a `READ_RESULT`).
pub struct Waiter {
    pub expected: Opcode,
    pub result_allowed: bool,
    tx: oneshot::Sender<Response>,
}

impl Waiter {
    pub fn new(expected: Opcode, result_allowed: bool, tx: oneshot::Sender<Response>) -> Self {
        Self { expected, result_allowed, tx }
    }

    pub fn matches(&self, opcode: Opcode) -> bool {
        opcode == self.expected || (self.result_allowed && opcode == Opcode::ReadResult)
    }

    pub fn complete(self, response: Response) {
        let _ = self.tx.send(response);
    }

    /// Used when the channel closes with this waiter still pending:
    /// completes it with a synthetic error rather than leaving it dangling.
    pub fn fail_transport(self) {
        let _ = self.tx.send(Response {
            opcode: self.expected,
            payload: Vec::new(),
            error_code: Some(ResponseErrorCode::NoResponse),
        });
    }
}
