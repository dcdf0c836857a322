// Interface adapters: HTTP surface and file-backed collaborators.

pub mod handlers;
pub mod http;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod storage;
