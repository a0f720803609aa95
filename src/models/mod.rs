pub mod account;
pub mod artifact;

pub use account::{Account, SessionUser};
pub use artifact::{GenerationInputs, GenerationResult, ImageData, VideoResult};
