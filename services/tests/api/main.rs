//! HTTP tests for the full router.

mod common;
mod feed;
mod upload;
