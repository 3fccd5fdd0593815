//! Library side of the `kk-validator` binary: logging setup and the
//! load / ingest / validate / export stages.

pub mod logging;
pub mod pipeline;
