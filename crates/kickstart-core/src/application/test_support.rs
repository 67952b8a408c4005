//! In-crate fakes for service tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};

use crate::application::{
    ApplicationError,
    ports::{
        Clock, CommandInvocation, CommandOutput, CommandRunner, ConfigStorage, Filesystem,
        ScriptStore, TemplateRenderer,
    },
};
use crate::domain::{ConfigEntry, DomainError, RenderContext, ScriptDefinition};
use crate::error::KickstartResult;

#[derive(Debug, Default)]
struct FsState {
    files: BTreeMap<PathBuf, String>,
    dirs: BTreeSet<PathBuf>,
    executables: BTreeSet<PathBuf>,
    read_only: BTreeSet<PathBuf>,
    corrupt_writes: BTreeSet<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeFs {
    state: Arc<Mutex<FsState>>,
}

impl FakeFs {
    pub fn with_root(root: &str) -> Self {
        let fs = Self::default();
        fs.mkdir(root);
        fs
    }

    pub fn mkdir(&self, path: &str) {
        let mut state = self.state.lock().unwrap();
        let mut current = PathBuf::new();
        for c in Path::new(path).components() {
            current.push(c);
            state.dirs.insert(current.clone());
        }
    }

    pub fn put(&self, path: &str, content: &str) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(PathBuf::from(path), content.to_string());
    }

    pub fn read(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().files.get(Path::new(path)).cloned()
    }

    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    pub fn is_executable(&self, path: &str) -> bool {
        self.state.lock().unwrap().executables.contains(Path::new(path))
    }

    /// Copies into this directory fail.
    pub fn make_read_only(&self, dir: &str) {
        self.state.lock().unwrap().read_only.insert(PathBuf::from(dir));
    }

    /// Writes to this path land with different content.
    pub fn corrupt_writes_to(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .corrupt_writes
            .insert(PathBuf::from(path));
    }
}

impl Filesystem for FakeFs {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.state.lock().unwrap().dirs.contains(path)
    }

    fn read_to_string(&self, path: &Path) -> KickstartResult<String> {
        self.state
            .lock()
            .unwrap()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| {
                ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "no such file".into(),
                }
                .into()
            })
    }

    fn write_file(&self, path: &Path, content: &str) -> KickstartResult<()> {
        let mut state = self.state.lock().unwrap();
        let body = if state.corrupt_writes.contains(path) {
            format!("{content}\n# mangled")
        } else {
            content.to_string()
        };
        state.files.insert(path.to_path_buf(), body);
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> KickstartResult<()> {
        let mut state = self.state.lock().unwrap();
        let mut current = PathBuf::new();
        for c in path.components() {
            current.push(c);
            state.dirs.insert(current.clone());
        }
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> KickstartResult<()> {
        let mut state = self.state.lock().unwrap();
        if to.parent().is_some_and(|p| state.read_only.contains(p)) {
            return Err(ApplicationError::FilesystemError {
                path: to.to_path_buf(),
                reason: "permission denied".into(),
            }
            .into());
        }
        let content = state.files.get(from).cloned().ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: from.to_path_buf(),
                reason: "no such file".into(),
            }
        })?;
        state.files.insert(to.to_path_buf(), content);
        Ok(())
    }

    fn set_permissions(&self, path: &Path, executable: bool) -> KickstartResult<()> {
        let mut state = self.state.lock().unwrap();
        if executable {
            state.executables.insert(path.to_path_buf());
        } else {
            state.executables.remove(path);
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> KickstartResult<()> {
        let mut state = self.state.lock().unwrap();
        state.dirs.retain(|p| !p.starts_with(path));
        state.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakeStorage {
    pub entries: Mutex<Vec<ConfigEntry>>,
}

impl FakeStorage {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        let entries = pairs
            .iter()
            .map(|(k, v)| ConfigEntry {
                key: k.parse().unwrap(),
                value: v.to_string(),
            })
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

impl ConfigStorage for FakeStorage {
    fn load(&self) -> KickstartResult<Vec<ConfigEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    fn save(&self, entries: &[ConfigEntry]) -> KickstartResult<()> {
        *self.entries.lock().unwrap() = entries.to_vec();
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from("memory")
    }
}

impl<T: ConfigStorage> ConfigStorage for Arc<T> {
    fn load(&self) -> KickstartResult<Vec<ConfigEntry>> {
        self.as_ref().load()
    }

    fn save(&self, entries: &[ConfigEntry]) -> KickstartResult<()> {
        self.as_ref().save(entries)
    }

    fn location(&self) -> PathBuf {
        self.as_ref().location()
    }
}

/// Records invocations and answers with a canned output.
#[derive(Debug, Clone, Default)]
pub struct FakeRunner {
    pub calls: Arc<Mutex<Vec<CommandInvocation>>>,
    pub fail_with: Option<i32>,
    pub time_out: bool,
}

impl FakeRunner {
    pub fn programs(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|c| c.display()).collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, invocation: &CommandInvocation) -> KickstartResult<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());
        if self.time_out {
            return Err(ApplicationError::CommandTimedOut {
                command: invocation.display(),
                timeout_secs: invocation.timeout.as_secs(),
            }
            .into());
        }
        Ok(CommandOutput {
            status: Some(self.fail_with.unwrap_or(0)),
            stdout: String::new(),
            stderr: if self.fail_with.is_some() {
                "boom".into()
            } else {
                String::new()
            },
        })
    }
}

pub struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .and_then(|d| d.and_hms_opt(9, 26, 53))
            .unwrap()
    }
}

pub struct ContextRenderer;

impl TemplateRenderer for ContextRenderer {
    fn render(&self, body: &str, context: &RenderContext) -> KickstartResult<String> {
        Ok(context.render(body)?)
    }
}

#[derive(Default)]
pub struct FakeStore {
    scripts: Mutex<Vec<ScriptDefinition>>,
}

impl FakeStore {
    pub fn of(definitions: Vec<ScriptDefinition>) -> Self {
        Self {
            scripts: Mutex::new(definitions),
        }
    }
}

impl ScriptStore for FakeStore {
    fn get(&self, name: &str) -> KickstartResult<ScriptDefinition> {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.name() == name)
            .cloned()
            .ok_or_else(|| DomainError::UnknownScript { name: name.into() }.into())
    }

    fn list(&self) -> KickstartResult<Vec<ScriptDefinition>> {
        Ok(self.scripts.lock().unwrap().clone())
    }

    fn insert(&self, definition: ScriptDefinition) -> KickstartResult<()> {
        self.scripts.lock().unwrap().push(definition);
        Ok(())
    }

    fn contains(&self, name: &str) -> bool {
        self.scripts.lock().unwrap().iter().any(|d| d.name() == name)
    }
}
