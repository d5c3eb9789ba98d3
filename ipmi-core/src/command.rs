//! ipmitool invocation building and argument sanitization.

use crate::connection::ConnectionDescriptor;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Marker substituted for secrets in displayed command lines.
pub const REDACTED: &str = "REDACTED";

/// ipmitool flag that precedes the password.
pub const PASSWORD_FLAG: &str = "-P";

/// A fully built invocation.
///
/// `sensitive` records which argument positions hold secrets. It is only
/// consulted when the command is displayed; execution always uses `args`.
#[derive(Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute (`ipmitool`, or `sudo` when elevated)
    pub program: String,

    /// Command-line arguments
    pub args: Vec<String>,

    sensitive: BTreeSet<usize>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new(), sensitive: BTreeSet::new() }
    }

    /// Append an argument.
    pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append an argument that must never be displayed.
    pub fn secret_arg(&mut self, arg: impl Into<String>) -> &mut Self {
        self.sensitive.insert(self.args.len());
        self.args.push(arg.into());
        self
    }

    /// Arguments with every secret replaced by [`REDACTED`].
    pub fn redacted_args(&self) -> Vec<String> {
        let mut args = sanitize_args(&self.args);
        for &index in &self.sensitive {
            if let Some(arg) = args.get_mut(index) {
                *arg = REDACTED.to_string();
            }
        }
        args
    }

    /// Program plus redacted arguments, space separated.
    pub fn display(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.redacted_args())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("program", &self.program)
            .field("args", &self.redacted_args())
            .finish()
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Return a copy of `args` with the value after every `-P` replaced by
/// [`REDACTED`]. The input is left untouched.
pub fn sanitize_args<S: AsRef<str>>(args: &[S]) -> Vec<String> {
    let mut sanitized = Vec::with_capacity(args.len());
    let mut redact_next = false;

    for arg in args {
        let arg = arg.as_ref();
        if redact_next {
            sanitized.push(REDACTED.to_string());
        } else {
            sanitized.push(arg.to_string());
        }
        redact_next = !redact_next && arg == PASSWORD_FLAG;
    }

    sanitized
}

/// Builds ipmitool argument vectors from a connection descriptor.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    /// Path to the ipmitool binary.
    tool: String,
    use_sudo: bool,
    privilege: String,
    hex_key: String,
    sdr_cache: Option<PathBuf>,
}

impl CommandBuilder {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            use_sudo: false,
            privilege: String::new(),
            hex_key: String::new(),
            sdr_cache: None,
        }
    }

    /// Privilege level passed with `-L`.
    pub fn privilege(mut self, privilege: Option<&str>) -> Self {
        self.privilege = privilege.unwrap_or_default().to_string();
        self
    }

    /// Hex encryption key passed with `-y`.
    pub fn hex_key(mut self, hex_key: Option<&str>) -> Self {
        self.hex_key = hex_key.unwrap_or_default().to_string();
        self
    }

    /// Run the tool through `sudo`.
    pub fn sudo(mut self, use_sudo: bool) -> Self {
        self.use_sudo = use_sudo;
        self
    }

    /// Read sensor definitions from a local SDR cache file (`-S`).
    pub fn sdr_cache(mut self, path: Option<&Path>) -> Self {
        self.sdr_cache = path.map(Path::to_path_buf);
        self
    }

    /// Build the invocation for `subcommand` against `conn`.
    ///
    /// Each flag is emitted only when its source value is non-empty, in the
    /// order `-H -U -P -I [-p] -L [-y] [-S]`, followed by the sub-command.
    pub fn build(&self, conn: &ConnectionDescriptor, subcommand: &[&str]) -> CommandSpec {
        let mut spec = if self.use_sudo {
            let mut spec = CommandSpec::new("sudo");
            spec.arg(&self.tool);
            spec
        } else {
            CommandSpec::new(&self.tool)
        };

        if let Some(host) = conn.host.as_deref().filter(|h| !h.is_empty()) {
            spec.arg("-H").arg(host);
        }
        if !conn.username.is_empty() {
            spec.arg("-U").arg(&conn.username);
        }
        if !conn.password.is_empty() {
            spec.arg(PASSWORD_FLAG).secret_arg(&conn.password);
        }
        if !conn.interface.is_empty() {
            spec.arg("-I").arg(&conn.interface);
        }
        if let Some(port) = conn.port {
            spec.arg("-p").arg(port.to_string());
        }
        if !self.privilege.is_empty() {
            spec.arg("-L").arg(&self.privilege);
        }
        if !self.hex_key.is_empty() {
            spec.arg("-y").secret_arg(&self.hex_key);
        }
        if let Some(cache) = &self.sdr_cache {
            spec.arg("-S").arg(cache.to_string_lossy());
        }

        spec.args(subcommand.iter().copied());
        spec
    }
}
