//! Credential setup messages (encryption, URL, sign-in)

pub struct CredentialMessages {
    // ============================================================================
    // Encryption
    // ============================================================================
    pub encryption_prompt: &'static str,
    pub encryption_disabled: &'static str,

    // ============================================================================
    // Repository URL
    // ============================================================================
    pub url_header: &'static str,
    pub url_prompt: &'static str,
    pub url_stored: &'static str,
    pub url_invalid: &'static str,

    // ============================================================================
    // Sign-in
    // ============================================================================
    pub sign_in_header: &'static str,
    pub username_prompt: &'static str,
    pub password_prompt: &'static str,
    pub credentials_stored: &'static str,
    pub credentials_deleted: &'static str,
    pub credentials_session_only: &'static str,
}

pub const CREDENTIAL_MESSAGES: CredentialMessages = CredentialMessages {
    // Encryption
    encryption_prompt: "Enter your Nexus encryption credentials (no prompt)",
    encryption_disabled: "Your Nexus credentials are no longer encrypted in {path}",

    // Repository URL
    url_header: "Enter the URL of the rubygems repository on a Nexus server",
    url_prompt: "URL",
    url_stored: "The Nexus URL has been stored in {path}",
    url_invalid: "no URL given",

    // Sign-in
    sign_in_header: "Enter your Nexus credentials",
    username_prompt: "Username",
    password_prompt: "Password",
    credentials_stored: "Your Nexus credentials has been stored in {path}",
    credentials_deleted: "Your Nexus credentials has been deleted from {path}",
    credentials_session_only: "Your Nexus credentials will only be used for this session",
};
