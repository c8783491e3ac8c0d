use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use tracing::{debug, error, trace, warn};

use crate::{
    error::{EwwError, PublishError},
    objects::Snapshot,
};

/// Somewhere a snapshot can be written to.
pub trait Sink {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), PublishError>;
}

/// Writes the snapshot as JSON to a fixed path.
///
/// The document is written to a hidden sibling file and renamed over the target, so a
/// reader sees either the previous or the new document, never a partial one.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "niri_status.json".to_owned());
        let tmp_path = path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(format!(".{file_name}.tmp"));
        Self { path, tmp_path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_error(path: &Path, source: std::io::Error) -> PublishError {
        PublishError::Write {
            path: path.display().to_string(),
            source,
        }
    }
}

impl Sink for FileSink {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), PublishError> {
        let contents = serde_json::to_vec(snapshot)?;

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| Self::write_error(dir, e))?;
        }

        fs::write(&self.tmp_path, &contents).map_err(|e| Self::write_error(&self.tmp_path, e))?;
        if let Err(e) = fs::rename(&self.tmp_path, &self.path) {
            let _ = fs::remove_file(&self.tmp_path);
            return Err(Self::write_error(&self.path, e));
        }

        trace!(path = %self.path.display(), bytes = contents.len(), "Wrote status file");
        Ok(())
    }
}

/// Pushes the snapshot into an eww variable with `eww update`.
#[derive(Debug, Clone)]
pub struct Eww {
    pub binary: String,
    pub var: String,
}

impl Eww {
    pub fn new(var: impl Into<String>) -> Result<Self, EwwError> {
        let output = Command::new("which").arg("eww").output()?.stdout;
        let eww_path = String::from_utf8_lossy(&output).trim_end().to_owned();

        if eww_path.is_empty() || !Path::new(&eww_path).exists() {
            error!("eww executable not found. If it can't be found by \"which\" there is probably something wrong.");
            return Err(EwwError::NoEwwExecutable);
        }

        Ok(Self {
            binary: eww_path,
            var: var.into(),
        })
    }

    pub fn set_var(&self, val: &str) -> Result<(), EwwError> {
        let success = Command::new(&self.binary)
            .arg("update")
            .arg(format!("{}={val}", self.var))
            .spawn()?
            .wait()?
            .success();
        if success {
            debug!("Updated eww variable \"{}\"", self.var);
            Ok(())
        } else {
            Err(EwwError::UpdateFailed(self.var.clone()))
        }
    }
}

impl Sink for Eww {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), PublishError> {
        let json = serde_json::to_string(snapshot)?;
        self.set_var(&json)?;
        Ok(())
    }
}

/// Fans a snapshot out to every configured sink.
#[derive(Default)]
pub struct Publisher {
    sinks: Vec<Box<dyn Sink + Send>>,
}

impl Publisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: impl Sink + Send + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl Sink for Publisher {
    /// Every sink is tried; the first failure is returned after the rest were attempted.
    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), PublishError> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.publish(snapshot) {
                match first_error {
                    None => first_error = Some(e),
                    Some(_) => warn!("Additional sink failed: {e}"),
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
