//! Common/shared messages across commands

pub struct CommonMessages {
    // ============================================================================
    // Command Output
    // ============================================================================
    pub setup_complete: &'static str,
    pub push_uploading: &'static str,
    pub response_status: &'static str,

    // ============================================================================
    // Error Messages
    // ============================================================================
    pub error_generic: &'static str,
    pub warning_generic: &'static str,
}

pub const COMMON_MESSAGES: CommonMessages = CommonMessages {
    // Command Output
    setup_complete: "✅ Using Nexus repository {url}",
    push_uploading: "📦 Uploading {file} to {url}",
    response_status: "{status}",

    // Error Messages
    error_generic: "❌ Error: {error}",
    warning_generic: "⚠️  Warning: {warning}",
};
