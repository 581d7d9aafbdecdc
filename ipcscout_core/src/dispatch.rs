use crate::catalog::ComponentKind;
use crate::command::{self, CommandError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("{kind} invocation requires {field}")]
    MissingField {
        kind: ComponentKind,
        field: &'static str,
    },

    #[error("{kind} invocation takes at most one extra, got {count}")]
    TooManyExtras { kind: ComponentKind, count: usize },

    #[error("Extra keys must not be empty")]
    EmptyExtraKey,

    #[error("Target not found: {0}")]
    NotFound(String),

    #[error("Security denial: {0}")]
    SecurityDenied(String),

    #[error("Invocation failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Parameters collected for a single invocation. Consumed by
/// [`Dispatcher::dispatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InvocationRequest {
    pub target_package: String,
    /// Component class for activities and services; the authority for
    /// providers.
    pub target_component: Option<String>,
    pub action: Option<String>,
    pub category: Option<String>,
    pub data_uri: Option<String>,
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
    /// Broadcasts are only delivered to receivers holding this.
    pub permission: Option<String>,
    /// Provider method name.
    pub method: Option<String>,
}

impl InvocationRequest {
    pub fn new(target_package: impl Into<String>) -> Self {
        Self {
            target_package: target_package.into(),
            ..Self::default()
        }
    }

    pub fn component(mut self, component: impl Into<String>) -> Self {
        self.target_component = Some(component.into());
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn data_uri(mut self, uri: impl Into<String>) -> Self {
        self.data_uri = Some(uri.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }
}

/// A validated request, shaped for exactly one kind of entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Invocation {
    StartActivity {
        package: String,
        component: String,
        action: Option<String>,
        category: Option<String>,
        extras: BTreeMap<String, String>,
    },
    StartService {
        package: String,
        component: String,
        action: Option<String>,
        data_uri: Option<String>,
        extra: Option<(String, String)>,
    },
    SendBroadcast {
        action: String,
        permission: Option<String>,
        extra: Option<(String, String)>,
    },
    CallProvider {
        authority: String,
        method: String,
    },
}

impl Invocation {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Invocation::StartActivity { .. } => ComponentKind::Activity,
            Invocation::StartService { .. } => ComponentKind::Service,
            Invocation::SendBroadcast { .. } => ComponentKind::Receiver,
            Invocation::CallProvider { .. } => ComponentKind::Provider,
        }
    }
}

/// Performs an invocation on the host platform.
pub trait ComponentInvoker: Send + Sync {
    fn invoke(&self, invocation: &Invocation) -> Result<(), InvocationError>;
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(
    value: Option<String>,
    kind: ComponentKind,
    field: &'static str,
) -> Result<String, InvocationError> {
    non_empty(value).ok_or(InvocationError::MissingField { kind, field })
}

fn single_extra(
    extras: BTreeMap<String, String>,
    kind: ComponentKind,
) -> Result<Option<(String, String)>, InvocationError> {
    if extras.len() > 1 {
        return Err(InvocationError::TooManyExtras {
            kind,
            count: extras.len(),
        });
    }
    Ok(extras.into_iter().next())
}

/// Routes invocation requests to a [`ComponentInvoker`] by component kind.
pub struct Dispatcher<'a> {
    invoker: &'a dyn ComponentInvoker,
}

impl<'a> Dispatcher<'a> {
    pub fn new(invoker: &'a dyn ComponentInvoker) -> Self {
        Self { invoker }
    }

    /// Validates `request` against what `kind` needs.
    pub fn build(
        kind: ComponentKind,
        request: InvocationRequest,
    ) -> Result<Invocation, InvocationError> {
        if request.extras.keys().any(|k| k.trim().is_empty()) {
            return Err(InvocationError::EmptyExtraKey);
        }

        let invocation = match kind {
            ComponentKind::Activity => Invocation::StartActivity {
                component: required(request.target_component, kind, "a target component")?,
                package: request.target_package,
                action: non_empty(request.action),
                category: non_empty(request.category),
                extras: request.extras,
            },
            ComponentKind::Service => Invocation::StartService {
                component: required(request.target_component, kind, "a target component")?,
                package: request.target_package,
                action: non_empty(request.action),
                data_uri: non_empty(request.data_uri),
                extra: single_extra(request.extras, kind)?,
            },
            ComponentKind::Receiver => Invocation::SendBroadcast {
                action: required(request.action, kind, "an action")?,
                permission: non_empty(request.permission),
                extra: single_extra(request.extras, kind)?,
            },
            ComponentKind::Provider => Invocation::CallProvider {
                authority: required(request.target_component, kind, "an authority")?,
                method: required(request.method, kind, "a method name")?,
            },
        };
        Ok(invocation)
    }

    /// Builds and performs one invocation. Every failure is logged and
    /// reported as `false`.
    pub fn dispatch(&self, kind: ComponentKind, request: InvocationRequest) -> bool {
        let invocation = match Self::build(kind, request) {
            Ok(invocation) => invocation,
            Err(e) => {
                warn!(%kind, error = %e, "rejected invocation request");
                return false;
            }
        };

        match self.invoker.invoke(&invocation) {
            Ok(()) => {
                info!(%kind, "invocation delivered");
                true
            }
            Err(e) => {
                warn!(%kind, error = %e, "invocation failed");
                false
            }
        }
    }
}

/// Invokes components through activity-manager and content command lines,
/// e.g. with the prefix `adb shell`.
#[derive(Debug, Clone)]
pub struct CommandInvoker {
    prefix: Vec<String>,
    timeout: Duration,
    shell_quote: bool,
}

/// Lines `am` and `content` print when a call did not go through. Echoed
/// intents (`Starting: Intent { act=... }`) never match.
fn is_failure_line(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("Error")
        || line.starts_with("Exception")
        || line.starts_with("Security exception")
        || line
            .split_whitespace()
            .next()
            .is_some_and(|token| token.trim_end_matches(':').ends_with("Exception"))
}

impl CommandInvoker {
    pub fn new(prefix: Vec<String>, timeout: Duration) -> Self {
        Self {
            prefix,
            timeout,
            shell_quote: false,
        }
    }

    /// Quote every argument after the prefix, for prefixes such as
    /// `adb shell` that hand the command line to a shell.
    pub fn shell_quoted(mut self, shell_quote: bool) -> Self {
        self.shell_quote = shell_quote;
        self
    }

    pub fn render(&self, invocation: &Invocation) -> Vec<String> {
        let mut argv = self.prefix.clone();
        let quote = self.shell_quote;
        let mut push = |args: &[&str]| {
            argv.extend(args.iter().map(|a| {
                if quote {
                    command::shell_quote(a)
                } else {
                    a.to_string()
                }
            }))
        };

        match invocation {
            Invocation::StartActivity {
                package,
                component,
                action,
                category,
                extras,
            } => {
                let target = format!("{package}/{component}");
                push(&["am", "start", "-n", target.as_str()]);
                if let Some(action) = action {
                    push(&["-a", action.as_str()]);
                }
                if let Some(category) = category {
                    push(&["-c", category.as_str()]);
                }
                for (key, value) in extras {
                    push(&["--es", key.as_str(), value.as_str()]);
                }
            }
            Invocation::StartService {
                package,
                component,
                action,
                data_uri,
                extra,
            } => {
                let target = format!("{package}/{component}");
                push(&["am", "startservice", "-n", target.as_str()]);
                if let Some(action) = action {
                    push(&["-a", action.as_str()]);
                }
                if let Some(uri) = data_uri {
                    push(&["-d", uri.as_str()]);
                }
                if let Some((key, value)) = extra {
                    push(&["--es", key.as_str(), value.as_str()]);
                }
            }
            Invocation::SendBroadcast {
                action,
                permission,
                extra,
            } => {
                push(&["am", "broadcast", "-a", action.as_str()]);
                if let Some((key, value)) = extra {
                    push(&["--es", key.as_str(), value.as_str()]);
                }
                if let Some(permission) = permission {
                    push(&["--receiver-permission", permission.as_str()]);
                }
            }
            Invocation::CallProvider { authority, method } => {
                let uri = format!("content://{authority}");
                push(&["content", "call", "--uri", uri.as_str()]);
                push(&["--method", method.as_str()]);
            }
        }
        argv
    }

    fn classify(text: &str) -> InvocationError {
        let message = text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("no output")
            .to_string();
        if text.contains("SecurityException") || text.contains("Permission Denial") {
            InvocationError::SecurityDenied(message)
        } else if text.contains("does not exist")
            || text.contains("Unable to find")
            || text.contains("Could not find")
            || text.contains("Unknown authority")
        {
            InvocationError::NotFound(message)
        } else {
            InvocationError::Failed(message)
        }
    }
}

impl ComponentInvoker for CommandInvoker {
    fn invoke(&self, invocation: &Invocation) -> Result<(), InvocationError> {
        let argv = self.render(invocation);
        let cmd = command::build_command(&argv)?;
        let output = command::run_with_timeout(cmd, self.timeout)?;

        let combined = output.combined();
        if !output.success() {
            return Err(Self::classify(&combined));
        }
        // `am` reports most failures on stdout with exit status 0
        let failures: Vec<&str> = combined.lines().filter(|l| is_failure_line(l)).collect();
        if !failures.is_empty() {
            return Err(Self::classify(&failures.join("\n")));
        }
        Ok(())
    }
}
