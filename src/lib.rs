//! httppost - minimal HTTP/1.1 POST client
//!
//! This crate POSTs the contents of a local file (optionally bracketed by a
//! header file and a footer file) to an HTTP server and streams the response
//! body to a file or standard output. Response framing is parsed by hand,
//! supporting both `Content-Length` and chunked transfer encoding.

pub mod config;
pub mod http;
pub mod net;
