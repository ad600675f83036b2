pub mod auth;
pub mod credentials;
pub mod download;
pub mod export;
pub mod generation;
pub mod http;
pub mod projects;

pub use auth::HttpAuthAdapter;
pub use credentials::FileCredentialStore;
pub use download::FsDownloadSink;
pub use export::HttpExportAdapter;
pub use generation::HttpGenerationAdapter;
pub use http::ApiClient;
pub use projects::HttpProjectsAdapter;
