use crate::aggregate::Location;
use crate::error::{Result, SupersearchError};
use log::{debug, info};
use std::process::Command;

/// Opens a resolved search hit somewhere the user can read it.
#[cfg_attr(test, mockall::automock)]
pub trait FileOpener {
    fn open(&self, location: &Location) -> Result<()>;
}

/// Opens files with a configured editor command, or with the platform's
/// default program when no editor is configured.
#[derive(Debug, Clone, Default)]
pub struct SystemOpener {
    editor: Option<String>,
}

impl SystemOpener {
    pub fn new(editor: Option<String>) -> Self {
        Self {
            editor: editor.filter(|e| !e.trim().is_empty()),
        }
    }
}

impl FileOpener for SystemOpener {
    fn open(&self, location: &Location) -> Result<()> {
        let open_error = |source: Box<dyn std::error::Error + Send + Sync>| SupersearchError::Open {
            path: location.path.clone(),
            source,
        };

        match &self.editor {
            Some(template) => {
                let argv = editor_command(template, location);
                let (program, args) = argv
                    .split_first()
                    .ok_or_else(|| open_error("empty editor command".into()))?;
                debug!("Launching editor: {argv:?}");
                let status = Command::new(program)
                    .args(args)
                    .status()
                    .map_err(|e| open_error(Box::new(e)))?;
                if !status.success() {
                    return Err(open_error(format!("editor exited with {status}").into()));
                }
            }
            None => {
                open::that(&location.path).map_err(|e| open_error(Box::new(e)))?;
            }
        }

        info!("Opened {}", location.path.display());
        Ok(())
    }
}

/// Splits an editor template on whitespace and fills in `{path}`, `{line}`
/// and `{column}`. A template without `{path}` gets the path appended.
pub fn editor_command(template: &str, location: &Location) -> Vec<String> {
    let path = location.path.display().to_string();
    let mut has_path = false;
    let mut argv: Vec<String> = template
        .split_whitespace()
        .map(|part| {
            has_path |= part.contains("{path}");
            part.replace("{path}", &path)
                .replace("{line}", &location.line.to_string())
                .replace("{column}", &location.column.to_string())
        })
        .collect();
    if !has_path {
        argv.push(path);
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn location() -> Location {
        Location {
            path: PathBuf::from("/data/notes.txt"),
            line: 12,
            column: 3,
        }
    }

    #[test]
    fn test_editor_template_placeholders() {
        let argv = editor_command("code -g {path}:{line}:{column}", &location());
        assert_eq!(argv, vec!["code", "-g", "/data/notes.txt:12:3"]);
    }

    #[test]
    fn test_editor_template_without_path() {
        let argv = editor_command("vim +{line}", &location());
        assert_eq!(argv, vec!["vim", "+12", "/data/notes.txt"]);
    }

    #[test]
    fn test_blank_editor_means_system_default() {
        let opener = SystemOpener::new(Some("   ".to_string()));
        assert!(opener.editor.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_editor_is_an_error() {
        let opener = SystemOpener::new(Some("false".to_string()));
        let err = opener.open(&location()).unwrap_err();
        assert!(matches!(err, SupersearchError::Open { .. }));
    }
}
