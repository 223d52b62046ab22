//! The JSON envelope every svcgen command prints: `{success, data | error}`,
//! plus the mapping from error codes to process exit codes.

use serde::Serialize;
use svcgen::error::Hint;
use svcgen::{Error, ErrorCode, Result};

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
                retryable: err.retryable,
            }),
        }
    }
}

/// Write one envelope to stdout. A closed pipe (`svcgen ... | head`) is not an error.
fn emit<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    use std::io::{ErrorKind, Write};

    let payload = response.to_json()?;
    match writeln!(std::io::stdout().lock(), "{}", payload) {
        Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        )),
        _ => Ok(()),
    }
}

/// Print a command's JSON value, or its error, as the svcgen envelope.
pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => emit(&CliResponse::success(data)),
        Err(err) => emit(&CliResponse::<()>::from_error(&err)),
    }
}

/// Turn a handler's `(output, exit_code)` into a JSON value and the process exit code.
///
/// Errors take their exit code from [`exit_code_for_error`]; an output that
/// can't be serialized is an internal failure (exit 1).
pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    let (data, exit_code) = match result {
        Ok(pair) => pair,
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            return (Err(err), exit_code);
        }
    };

    match serde_json::to_value(data) {
        Ok(value) => (Ok(value), exit_code),
        Err(e) => (
            Err(Error::internal_json(
                e.to_string(),
                Some("serialize command output".to_string()),
            )),
            1,
        ),
    }
}

/// Exit codes: 2 bad input or config, 4 missing template/tool/service or
/// anchor, 20 git or build tool failure, 1 internal.
pub fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigMissingKey
        | ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationMissingArgument
        | ErrorCode::ValidationInvalidArgument
        | ErrorCode::ValidationInvalidJson => 2,

        ErrorCode::TemplateNotFound
        | ErrorCode::ToolNotFound
        | ErrorCode::ServiceNotFound
        | ErrorCode::ServiceAlreadyExists
        | ErrorCode::CompositionAnchorMissing => 4,

        ErrorCode::GitCommandFailed | ErrorCode::BuildToolFailed => 20,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError
        | ErrorCode::InternalUnexpected => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_envelope_carries_code_and_hints() {
        let err = Error::template_not_found("User", "services/user");
        let json = serde_json::to_value(CliResponse::<()>::from_error(&err)).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "precondition.template_not_found");
        assert!(json["error"]["hints"].is_array());
        assert!(json.get("data").is_none());
    }

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(exit_code_for_error(ErrorCode::ValidationInvalidArgument), 2);
        assert_eq!(exit_code_for_error(ErrorCode::TemplateNotFound), 4);
        assert_eq!(exit_code_for_error(ErrorCode::BuildToolFailed), 20);
        assert_eq!(exit_code_for_error(ErrorCode::InternalIoError), 1);
    }

    #[test]
    fn mapped_error_keeps_exit_code() {
        let (result, code) =
            map_cmd_result_to_json::<()>(Err(Error::service_not_found("Order", "services/order")));
        assert!(result.is_err());
        assert_eq!(code, 4);
    }

    #[test]
    fn mapped_output_keeps_handler_exit_code() {
        let (result, code) = map_cmd_result_to_json(Ok((vec!["order"], 1)));
        assert_eq!(result.unwrap(), serde_json::json!(["order"]));
        assert_eq!(code, 1);
    }
}
