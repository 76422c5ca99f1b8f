//! The setup flow: encryption passphrase, repository URL, sign-in

use crate::prompt::Prompter;
use crate::proxy::{Lookup, ProxyResolver, ProxySetting};
use crate::request::RequestBuilder;
use crate::session::Session;
use nexus_config::{
    open, Authorization, ConfigRecord, EncryptedConfigStore, Store, StoreLocation,
    HTTP_PROXY_FIELD, URL_FIELD,
};
use nexus_core::{NexusError, Result};
use nexus_messages::{msg, MESSAGES};
use tracing::{debug, info};
use url::Url;

/// Flags that steer [`CredentialManager::setup`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupOptions {
    /// Ask for URL and credentials again, whatever is stored.
    pub clear: bool,
    /// Ask for the password on every run and stop storing it.
    pub force_password: bool,
    /// Ask for an encryption passphrase even if the record isn't encrypted yet.
    pub encrypt: bool,
}

/// Owns the session of one invocation and drives the setup prompts.
pub struct CredentialManager<P: Prompter> {
    options: SetupOptions,
    session: Session,
    prompter: P,
    env: Box<dyn Lookup>,
}

impl<P: Prompter> CredentialManager<P> {
    /// Open the store at `location` without a passphrase.
    pub fn new(
        location: StoreLocation,
        options: SetupOptions,
        prompter: P,
        env: Box<dyn Lookup>,
    ) -> Result<Self> {
        let store = open(&location, None)?;
        Ok(Self {
            options,
            session: Session::new(location, store),
            prompter,
            env,
        })
    }

    /// Bring the session to a usable state, prompting only where needed.
    ///
    /// The guards are checked in order and any subset may fire. An invalid
    /// URL aborts before the authorization is touched.
    pub fn setup(&mut self) -> Result<()> {
        if self.options.encrypt || self.session.store.is_encrypted() {
            self.prompt_encryption()?;
        }

        if !self.session.store.has(URL_FIELD) || self.options.clear {
            self.configure_url()?;
        }

        if let Some(url) = self.url()? {
            self.use_proxy(&url)?;
        }

        if !self.session.store.has("authorization")
            || self.options.clear
            || self.always_prompt_password()?
        {
            self.sign_in()?;
        }

        debug!(
            scope = ?self.session.location.scope,
            proxy = self.session.proxy.is_some(),
            "Setup complete"
        );
        Ok(())
    }

    /// Ask for the passphrase and reopen the store with it.
    pub fn prompt_encryption(&mut self) -> Result<()> {
        let passphrase = self
            .prompter
            .ask_secret(MESSAGES.credentials.encryption_prompt)?;
        self.session.store = open(&self.session.location, Some(&passphrase))?;
        Ok(())
    }

    /// Ask for the repository URL and store it without trailing slash.
    pub fn configure_url(&mut self) -> Result<()> {
        self.prompter.notify(MESSAGES.credentials.url_header);
        let answer = self.prompter.ask(MESSAGES.credentials.url_prompt)?;
        let answer = answer.trim();

        let has_host = Url::parse(answer)
            .ok()
            .is_some_and(|url| url.host_str().is_some_and(|host| !host.is_empty()));
        if !has_host {
            return Err(NexusError::UserInput(
                MESSAGES.credentials.url_invalid.to_string(),
            ));
        }

        self.session
            .store
            .set(URL_FIELD, answer.trim_end_matches('/'))?;
        let path = self.session.location.config_path.display().to_string();
        self.prompter
            .notify(&msg!(MESSAGES.credentials.url_stored, path = path));
        info!(scope = ?self.session.location.scope, "Stored Nexus URL");
        Ok(())
    }

    /// Resolve the proxy for `url` and keep it for the rest of the session.
    pub fn use_proxy(&mut self, url: &str) -> Result<()> {
        let setting = self
            .session
            .store
            .get(HTTP_PROXY_FIELD)?
            .and_then(|value| ProxySetting::parse(&value));
        let resolver = ProxyResolver::new(self.env.as_ref(), setting);
        self.session.proxy = resolver.resolve(url)?;
        Ok(())
    }

    /// Whether credentials are asked for on every run.
    pub fn always_prompt_password(&self) -> Result<bool> {
        if self.options.force_password {
            return Ok(true);
        }
        Ok(self.session.store.authorization()?.is_always_prompt())
    }

    /// Ask for username and password and update the stored authorization.
    ///
    /// Two empty answers delete the stored credentials. In always-prompt
    /// mode they leave the store alone, apart from writing the always-prompt
    /// marker when `--password` was given. Credentials entered in that mode
    /// live in the session only.
    pub fn sign_in(&mut self) -> Result<()> {
        let always_prompt = self.always_prompt_password()?;

        self.prompter.notify(MESSAGES.credentials.sign_in_header);
        let username = self.prompter.ask(MESSAGES.credentials.username_prompt)?;
        let password = self
            .prompter
            .ask_secret(MESSAGES.credentials.password_prompt)?;
        let path = self.session.store.secrets_path().display().to_string();

        if username.is_empty() && password.is_empty() {
            if always_prompt {
                if self.options.force_password {
                    self.session
                        .store
                        .set_authorization(Authorization::AlwaysPrompt)?;
                }
                return Ok(());
            }
            self.session.store.set_authorization(Authorization::None)?;
            self.session.transient_authorization = None;
            self.prompter
                .notify(&msg!(MESSAGES.credentials.credentials_deleted, path = path));
            info!("Deleted stored Nexus credentials");
            return Ok(());
        }

        let token = Authorization::basic(&username, &password);
        if always_prompt {
            if self.options.force_password {
                self.session
                    .store
                    .set_authorization(Authorization::AlwaysPrompt)?;
            }
            self.session.transient_authorization = Some(token);
            self.prompter
                .notify(MESSAGES.credentials.credentials_session_only);
        } else {
            self.session.store.set_authorization(token)?;
            self.prompter
                .notify(&msg!(MESSAGES.credentials.credentials_stored, path = path));
            info!("Stored Nexus credentials");
        }
        Ok(())
    }

    /// Ask for the passphrase and rewrite the record without encryption.
    pub fn disable_encryption(&mut self) -> Result<()> {
        if !self.session.store.is_encrypted() {
            return Ok(());
        }
        let passphrase = self
            .prompter
            .ask_secret(MESSAGES.credentials.encryption_prompt)?;
        let location = &self.session.location;
        let record = ConfigRecord::open(
            &location.config_path,
            location.scope.as_deref(),
            location.secrets_path.as_deref(),
        )?;
        let plain = EncryptedConfigStore::new(record, &passphrase)?.into_plain()?;
        self.session.store = Box::new(plain);

        let path = self.session.store.secrets_path().display().to_string();
        self.prompter
            .notify(&msg!(MESSAGES.credentials.encryption_disabled, path = path));
        Ok(())
    }

    /// Stored repository URL, never with a trailing slash.
    pub fn url(&self) -> Result<Option<String>> {
        Ok(self
            .session
            .store
            .get(URL_FIELD)?
            .map(|url| url.trim_end_matches('/').to_string()))
    }

    /// Authorization in effect for this session.
    pub fn authorization(&self) -> Result<Authorization> {
        match &self.session.transient_authorization {
            Some(authorization) => Ok(authorization.clone()),
            None => self.session.store.authorization(),
        }
    }

    /// Request builder bound to the stored URL, proxy and authorization.
    pub fn request_builder(&self, verbosity: u8) -> Result<RequestBuilder> {
        let url = self
            .url()?
            .ok_or_else(|| NexusError::Config("no Nexus URL configured".into()))?;
        Ok(RequestBuilder::new(url)
            .with_authorization(self.authorization()?)
            .with_proxy(self.session.proxy.clone())
            .with_verbosity(verbosity))
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &dyn Store {
        self.session.store.as_ref()
    }

    pub fn options(&self) -> SetupOptions {
        self.options
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }
}
