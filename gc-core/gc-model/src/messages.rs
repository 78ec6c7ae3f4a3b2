//! Serial console messages.
//!
//! Hosts match on these strings; do not translate or reformat them.

pub const MSG_START: &str = "start";
pub const MSG_WAIT: &str = "wait";
pub const MSG_OK: &str = "ok";
pub const MSG_RESEND: &str = "Resend: ";
pub const MSG_ECHO_PREFIX: &str = "echo:";
pub const MSG_ERROR_PREFIX: &str = "Error:";

pub const MSG_ERR_LINE_NO: &str = "Line Number is not Last Line Number+1, Last Line: ";
pub const MSG_ERR_CHECKSUM_MISMATCH: &str = "checksum mismatch, Last Line: ";
pub const MSG_ERR_NO_CHECKSUM: &str = "No Checksum with line number, Last Line: ";
pub const MSG_ERR_NO_LINENUMBER_WITH_CHECKSUM: &str = "No Line Number with checksum, Last Line: ";
pub const MSG_ERR_STOPPED: &str = "Printer stopped due to errors. Fix the error and use M999 to restart. (Temperature is reset. Set it after restarting)";
pub const MSG_ERR_KILLED: &str = "Printer halted. killed() called!!";
