pub mod limits {

    /// Stored story results per user, newest first.
    pub const MAX_STORED_STORIES: usize = 4;

    /// Stored video results per user, newest first.
    pub const MAX_STORED_VIDEOS: usize = 1;
}

pub mod tables {

    pub const ACCOUNTS: &str = "accounts";

    pub const STORIES: &str = "stories";

    pub const VIDEOS: &str = "videos";

    pub const SESSION: &str = "session";
}

pub mod models {

    pub const STORY: &str = "gemini-2.5-flash";

    pub const IMAGE_EDIT: &str = "gemini-2.5-flash-image-preview";

    pub const VIDEO: &str = "veo-2.0-generate-001";
}
