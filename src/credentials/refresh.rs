// src/credentials/refresh.rs
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{debug, info, warn};
use std::fmt;
use std::io;
use std::process::Command;
use std::sync::Arc;

use super::path::FieldPath;
use crate::error::{KubeConfigError, Result};
use crate::kubeconfig::{AuthProviderConfig, User};

/// Captured result of one credential helper run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelperOutput {
    /// Exit code, `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl HelperOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn status(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "no exit code (terminated by signal)".to_string(),
        }
    }

    fn diagnostics(&self) -> String {
        let mut out = self.stdout.trim().to_string();
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(stderr);
        }
        out
    }
}

/// Runs a credential helper command line and waits for it to finish.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str) -> io::Result<HelperOutput>;
}

/// Hands the command line to the platform shell, which splits it into argv.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner;

impl CommandRunner for ShellCommandRunner {
    fn run(&self, command: &str) -> io::Result<HelperOutput> {
        let output = if cfg!(windows) {
            Command::new("cmd").args(["/C", command]).output()?
        } else {
            Command::new("sh").args(["-c", command]).output()?
        };

        Ok(HelperOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Produces bearer tokens for a user, refreshing expired auth-provider
/// tokens through the configured helper.
#[derive(Clone)]
pub struct TokenRefresher {
    runner: Arc<dyn CommandRunner>,
    clock: Clock,
}

impl Default for TokenRefresher {
    fn default() -> Self {
        Self::new(ShellCommandRunner)
    }
}

impl fmt::Debug for TokenRefresher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRefresher").finish_non_exhaustive()
    }
}

impl TokenRefresher {
    pub fn new(runner: impl CommandRunner + 'static) -> Self {
        Self {
            runner: Arc::new(runner),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Returns the `Authorization` header value for `user`, if any.
    ///
    /// The auth-provider token is resolved first (refreshing it when its
    /// expiry has passed), then a static `user.token` overrides it.
    pub fn authorization_token(&self, user: &mut User) -> Result<Option<String>> {
        let mut token = None;

        if let Some(config) = user.auth_provider.as_mut().and_then(|p| p.config.as_mut()) {
            token = self.provider_token(&user.name, config)?;
        }

        if let Some(static_token) = user.token.as_deref().filter(|t| !t.is_empty()) {
            debug!("Using static token of user {}", user.name);
            token = Some(bearer(static_token));
        }

        Ok(token)
    }

    fn provider_token(&self, user: &str, config: &mut AuthProviderConfig) -> Result<Option<String>> {
        if let Some(expiry) = config.expiry.as_deref().filter(|e| !e.is_empty()) {
            match parse_expiry(expiry) {
                Some(expires_at) if expires_at < (self.clock)() => {
                    return self.refresh(user, config).map(Some);
                }
                Some(_) => {}
                None => warn!(
                    "Cannot parse token expiry {:?} of user {}, treating token as valid",
                    expiry, user
                ),
            }
        }

        Ok(config.access_token.as_deref().filter(|t| !t.is_empty()).map(bearer))
    }

    fn refresh(&self, user: &str, config: &mut AuthProviderConfig) -> Result<String> {
        let command = config
            .command_line()
            .ok_or_else(|| KubeConfigError::ExpiredCredential {
                user: user.to_string(),
            })?;
        let token_key = config
            .token_key
            .as_deref()
            .ok_or_else(|| KubeConfigError::malformed("no token-key configured"))?;
        let path = FieldPath::parse(token_key)?;

        info!(
            "Token of user {} expired, running {}",
            user,
            config.cmd_path.as_deref().unwrap_or_default()
        );
        let output = self
            .runner
            .run(&command)
            .map_err(|e| KubeConfigError::io(command.as_str(), e))?;

        if !output.success() {
            return Err(KubeConfigError::RefreshCommand {
                command,
                status: output.status(),
                output: output.diagnostics(),
            });
        }

        let response: serde_json::Value = serde_json::from_str(&output.stdout)
            .map_err(|e| KubeConfigError::malformed(format!("helper output is not JSON: {}", e)))?;
        let token = path.extract_string(&response)?;

        config.access_token = Some(token.clone());
        debug!("Stored refreshed token for user {}", user);

        Ok(bearer(&token))
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Parses an auth-provider expiry timestamp.
///
/// Accepts RFC 3339, RFC 2822, and a zone-less `YYYY-MM-DD HH:MM:SS` (with
/// either a space or `T` separator) taken as UTC.
pub fn parse_expiry(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_rfc2822(value) {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
