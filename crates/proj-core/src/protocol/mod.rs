//! Protocol module containing the command types, framing, and response trimming.

pub mod command;
pub mod frame;
pub mod response;

pub use command::{Command, Source, SourceParseError};
pub use frame::{encode_command, MAX_FRAME_LEN};
pub use response::trim_response;
