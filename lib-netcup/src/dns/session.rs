use serde::de::IgnoredAny;
use std::fmt;
use std::future::Future;

use super::errors::HookErrors;
use super::http_request::Transport;
use super::types::{Action, LoginData, LoginParams, LogoutParams};

/// An API session id. Only a short prefix is ever printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Session(String);

impl Session {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(6).collect();
        write!(f, "{prefix}…")
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({self})")
    }
}

/// Owns the transport and hands it out only inside a logged-in scope.
#[derive(Debug, Clone)]
pub struct SessionManager {
    transport: Transport,
}

impl SessionManager {
    pub fn new(transport: Transport) -> Self {
        SessionManager { transport }
    }

    /// Logs in, runs `operation`, logs out.
    ///
    /// Logout runs whether or not `operation` succeeded. An error from `operation` wins
    /// over an error from logout; a failed login returns before `operation` runs.
    pub async fn with_session<'a, T, F, Fut>(
        &'a self,
        domain: &str,
        operation: F,
    ) -> Result<T, HookErrors>
    where
        F: FnOnce(&'a Transport, Session) -> Fut,
        Fut: Future<Output = Result<T, HookErrors>>,
    {
        let session = self.login().await?;
        tracing::debug!(domain, session = %session, "Session opened");

        let result = operation(&self.transport, session.clone()).await;
        let logout = self.logout(&session).await;

        match (result, logout) {
            (Ok(value), Ok(())) => {
                tracing::debug!(domain, session = %session, "Session closed");
                Ok(value)
            }
            (Ok(_), Err(logout_err)) => Err(logout_err),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(logout_err)) => {
                tracing::warn!(
                    domain,
                    session = %session,
                    error = %logout_err,
                    "Logout failed after an earlier error"
                );
                Err(err)
            }
        }
    }

    async fn login(&self) -> Result<Session, HookErrors> {
        let params = LoginParams {
            apipassword: self.transport.credentials().api_password(),
        };
        let data: LoginData = self.transport.send(Action::Login, &params).await?;
        if data.apisessionid.is_empty() {
            return Err(HookErrors::MissingResponseData {
                action: Action::Login.to_string(),
                field: "apisessionid",
            });
        }
        Ok(Session(data.apisessionid))
    }

    async fn logout(&self, session: &Session) -> Result<(), HookErrors> {
        let params = LogoutParams {
            apisessionid: session.as_str(),
        };
        let _: IgnoredAny = self.transport.send(Action::Logout, &params).await?;
        Ok(())
    }
}
