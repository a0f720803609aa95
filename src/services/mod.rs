pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, ProfileUpdate};
pub use auth_service_impl::StoreAuthService;

pub mod generation;
pub use generation::GenerationService;

pub mod video;
pub use video::{JobSnapshot, VideoAdService, VideoPhase};
