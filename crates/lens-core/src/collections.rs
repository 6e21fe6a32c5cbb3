//! Document collection names
//!
//! Kept in one place so route handlers and stores agree on spelling.

/// User profile documents, keyed `user_<uid>`
pub const USERS: &str = "users";

/// Recording session documents
pub const SESSIONS: &str = "sessions";

/// Transcript documents, linked to sessions via `sessionId`
pub const TRANSCRIPTS: &str = "transcripts";

/// Base64-encoded audio payloads with optional expiry
pub const AUDIO_FILES: &str = "audioFiles";
