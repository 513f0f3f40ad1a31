//! reqwest-backed collaborators for `mws-seed`.
//!
//! [`HttpBackend`] talks to the shell server:
//! * `POST /mws/` allocates a resource
//! * `POST /mws/{res_id}/keep-alive` refreshes it
//! * `POST <script>` with `{res_id}` runs an initialization script
//! * `GET <url>` fetches remote seed JSON
//! * `POST /init/load_json` with `{res_id, collections}` bulk-loads the dataset

pub mod client;
pub mod config;

pub use client::HttpBackend;
pub use config::ServerConfig;
