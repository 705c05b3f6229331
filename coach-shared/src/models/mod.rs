//! Models exchanged with the support backend and held by the client.

pub mod chat;
pub mod documents;
pub mod errors;
pub mod resources;
pub mod status;

pub use chat::{
    ChatMessage, ChatRequest, ChatResponse, LoadingId, Sender, Source, Transcript, cap_sources,
};
pub use documents::{ClearDocumentsResponse, DocumentCountResponse, HealthResponse, UploadResponse};
pub use errors::ErrorDetail;
pub use resources::{Resource, ResourceCatalog, ResourceCategory, ResourceType};
pub use status::{Notice, NoticeKind, ProviderSelection, SUCCESS_NOTICE_TTL, StatusBadge};
