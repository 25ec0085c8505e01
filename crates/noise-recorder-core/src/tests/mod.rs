#![allow(clippy::unwrap_used)]

mod capture;
mod session;
mod support;
