// Error classification and input validation for the command line

use crate::pipeline::PipelineError;

/// Exit code for invalid input, missing records and failed moves
pub const EXIT_USER_ERROR: i32 = 1;
/// Exit code for database corruption, I/O failures and other internal faults
pub const EXIT_INTERNAL_ERROR: i32 = 2;

/// Decide the exit code for an error returned from `run`.
///
/// Input errors from the pipeline (unknown lead, move in flight) are user
/// errors. Backend failures are internal when a rusqlite or I/O error sits
/// anywhere in their cause chain, as is any other such error.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(pipeline_err) = err.downcast_ref::<PipelineError>() {
        if !pipeline_err.is_remote() {
            return EXIT_USER_ERROR;
        }
    }
    let internal = err.chain().any(|cause| {
        cause.is::<rusqlite::Error>() || cause.is::<std::io::Error>()
    });
    if internal {
        EXIT_INTERNAL_ERROR
    } else {
        EXIT_USER_ERROR
    }
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate a phone number: digits with optional leading '+' and separators
pub fn validate_phone(phone: &str) -> Result<(), String> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    let allowed = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || c == ' ' || c == '-' || c == '(' || c == ')' || (c == '+' && i == 0));
    if allowed && digits >= 6 {
        Ok(())
    } else {
        Err(format!("Invalid phone number: '{}'", phone))
    }
}
