//! Locating external executables on the search path.

use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use kickstart_core::{
    application::ports::{CommandInvocation, CommandRunner, ToolInfo, ToolProbe},
    domain::ToolRequirement,
};
use semver::Version;
use tracing::{debug, instrument};

use crate::process::ProcessRunner;

const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Probe that scans `PATH` and asks tools for `--version` when a range
/// must be checked.
#[derive(Debug, Clone)]
pub struct SystemToolProbe {
    search_path: Option<OsString>,
    runner: ProcessRunner,
}

impl SystemToolProbe {
    /// Probe the process's own `PATH`.
    pub fn new() -> Self {
        Self {
            search_path: std::env::var_os("PATH"),
            runner: ProcessRunner::new(),
        }
    }

    /// Probe an explicit search path instead of `PATH`.
    pub fn with_search_path(search_path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(search_path.into()),
            runner: ProcessRunner::new(),
        }
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        std::env::split_paths(search_path)
            .flat_map(|dir| candidates(&dir, name))
            .find(|candidate| is_executable(candidate))
    }

    fn version_of(&self, path: &Path) -> Option<Version> {
        let invocation = CommandInvocation {
            program: path.display().to_string(),
            args: vec!["--version".into()],
            cwd: std::env::temp_dir(),
            timeout: VERSION_PROBE_TIMEOUT,
        };
        let output = self.runner.run(&invocation).ok()?;
        parse_version(&output.stdout).or_else(|| parse_version(&output.stderr))
    }
}

impl Default for SystemToolProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolProbe for SystemToolProbe {
    #[instrument(skip(self), fields(tool = %tool))]
    fn probe(&self, tool: &ToolRequirement) -> Option<ToolInfo> {
        let path = self.locate(tool.name())?;
        let version = tool
            .version_req()
            .and_then(|_| self.version_of(&path));
        debug!(path = %path.display(), version = ?version, "Tool found");
        Some(ToolInfo { path, version })
    }
}

fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    #[cfg(windows)]
    {
        vec![dir.join(name), dir.join(format!("{name}.exe"))]
    }
    #[cfg(not(windows))]
    {
        vec![dir.join(name)]
    }
}

fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Pull the first dotted version out of `--version` output.
///
/// `git version 2.43.0`, `Docker version 24.0.7, build afdd53b`, `v18.17.0`
/// and `go1.21.0` all parse. Two-part versions are padded to `x.y.0`.
pub fn parse_version(output: &str) -> Option<Version> {
    output.split_whitespace().find_map(|token| {
        let numeric: String = token
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        let parts: Vec<u64> = numeric
            .split('.')
            .filter(|p| !p.is_empty())
            .take(3)
            .map(str::parse::<u64>)
            .collect::<Result<_, _>>()
            .ok()?;
        match parts.as_slice() {
            [major, minor] => Some(Version::new(*major, *minor, 0)),
            [major, minor, patch] => Some(Version::new(*major, *minor, *patch)),
            _ => None,
        }
    })
}

/// Probe answering from a fixed table, for tests.
#[derive(Debug, Clone, Default)]
pub struct FakeToolProbe {
    tools: HashMap<String, Option<Version>>,
}

impl FakeToolProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` available, optionally reporting a version.
    pub fn with_tool(mut self, name: &str, version: Option<&str>) -> Self {
        let version = version.and_then(parse_version);
        self.tools.insert(name.to_string(), version);
        self
    }
}

impl ToolProbe for FakeToolProbe {
    fn probe(&self, tool: &ToolRequirement) -> Option<ToolInfo> {
        self.tools.get(tool.name()).map(|version| ToolInfo {
            path: PathBuf::from("/usr/bin").join(tool.name()),
            version: version.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_version_banners() {
        assert_eq!(parse_version("git version 2.43.0"), Some(Version::new(2, 43, 0)));
        assert_eq!(
            parse_version("Docker version 24.0.7, build afdd53b"),
            Some(Version::new(24, 0, 7))
        );
        assert_eq!(parse_version("v18.17.0\n"), Some(Version::new(18, 17, 0)));
        assert_eq!(parse_version("Python 3.11"), Some(Version::new(3, 11, 0)));
        assert_eq!(
            parse_version("go version go1.21.0 linux/amd64"),
            Some(Version::new(1, 21, 0))
        );
        assert_eq!(
            parse_version("git version 2.39.3.windows.1"),
            Some(Version::new(2, 39, 3))
        );
        assert_eq!(parse_version("no digits here"), None);
    }

    #[test]
    fn fake_probe_reports_configured_tools() {
        let probe = FakeToolProbe::new().with_tool("node", Some("v20.1.0"));
        let info = probe.probe(&"node >=18".parse().unwrap()).unwrap();
        assert_eq!(info.version, Some(Version::new(20, 1, 0)));
        assert!(probe.probe(&ToolRequirement::binary("git")).is_none());
    }

    #[test]
    fn empty_search_path_finds_nothing() {
        let probe = SystemToolProbe::with_search_path("");
        assert!(probe.probe(&ToolRequirement::binary("sh")).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn finds_executables_and_ignores_plain_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::TempDir::new().unwrap();
        let tool = dir.path().join("mytool");
        std::fs::write(&tool, "#!/bin/sh\necho mytool 1.4.2\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(dir.path().join("notatool"), "").unwrap();

        let probe = SystemToolProbe::with_search_path(dir.path());
        let info = probe.probe(&"mytool >=1.4".parse().unwrap()).unwrap();
        assert_eq!(info.path, tool);
        assert_eq!(info.version, Some(Version::new(1, 4, 2)));

        assert!(probe.probe(&ToolRequirement::binary("notatool")).is_none());
    }
}
