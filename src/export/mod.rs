//! Export module: replays confirmed recipes against a recipe import API

mod pusher;

pub use pusher::{build_import_client, ExportSummary, Exporter, PushOutcome, IMPORT_TIMEOUT};
