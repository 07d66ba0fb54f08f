//! One module per subcommand.

pub mod ask;
pub mod chat;
pub mod ingest;
pub mod reset;
pub mod search;
pub mod status;
