//! Command templates with shell-quoted positional substitution.

use std::path::{Path, PathBuf};
use thiserror::Error;

use super::traits::ProcessRunner;

/// Errors produced while rendering a command template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template references an argument that was not supplied.
    #[error("Placeholder {{{index}}} has no argument ({supplied} supplied)")]
    MissingArgument { index: usize, supplied: usize },

    /// A brace that does not open a valid `{N}` placeholder.
    #[error("Invalid placeholder at byte {position} in command template")]
    InvalidPlaceholder { position: usize },
}

/// A command line with `{N}` placeholders.
///
/// `{{` and `}}` render as literal braces. Pipelines (`a | b`) are allowed;
/// the template is handed to `sh -c` after substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    template: String,
}

/// A fully rendered command line ready to launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    line: String,
    programs: Vec<String>,
}

impl CommandTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// The leading program of every pipeline stage.
    pub fn programs(&self) -> Vec<String> {
        pipeline_programs(&self.template)
    }

    /// Programs of this template that `runner` cannot launch.
    pub fn missing_programs<R: ProcessRunner + ?Sized>(&self, runner: &R) -> Vec<String> {
        self.programs()
            .into_iter()
            .filter(|p| !runner.is_available(p))
            .collect()
    }

    /// Substitutes shell-quoted `args` into the template.
    pub fn render<S: AsRef<str>>(&self, args: &[S]) -> Result<CommandLine, TemplateError> {
        let mut line = String::with_capacity(self.template.len() + 64);
        let bytes = self.template.as_bytes();
        let mut i = 0;
        let mut literal_start = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    line.push_str(&self.template[literal_start..i]);
                    line.push('{');
                    i += 2;
                    literal_start = i;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    line.push_str(&self.template[literal_start..i]);
                    line.push('}');
                    i += 2;
                    literal_start = i;
                }
                b'{' => {
                    let digits_len = bytes[i + 1..]
                        .iter()
                        .take_while(|b| b.is_ascii_digit())
                        .count();
                    let close = i + 1 + digits_len;
                    if digits_len == 0 || bytes.get(close) != Some(&b'}') {
                        return Err(TemplateError::InvalidPlaceholder { position: i });
                    }
                    let index: usize = self.template[i + 1..close]
                        .parse()
                        .map_err(|_| TemplateError::InvalidPlaceholder { position: i })?;
                    let arg = args.get(index).ok_or(TemplateError::MissingArgument {
                        index,
                        supplied: args.len(),
                    })?;

                    line.push_str(&self.template[literal_start..i]);
                    line.push_str(&quote(arg.as_ref()));
                    i = close + 1;
                    literal_start = i;
                }
                b'}' => return Err(TemplateError::InvalidPlaceholder { position: i }),
                _ => i += 1,
            }
        }
        line.push_str(&self.template[literal_start..]);

        Ok(CommandLine {
            line,
            programs: self.programs(),
        })
    }
}

impl CommandLine {
    /// Wraps an already-quoted command line.
    pub fn raw(line: impl Into<String>) -> Self {
        let line = line.into();
        let programs = pipeline_programs(&line);
        Self { line, programs }
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }

    /// Programs that must exist for this command to launch.
    pub fn programs(&self) -> &[String] {
        &self.programs
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.line)
    }
}

fn pipeline_programs(command: &str) -> Vec<String> {
    command
        .split('|')
        .filter_map(|stage| stage.split_whitespace().next())
        .filter(|program| !program.starts_with('{'))
        .map(str::to_string)
        .collect()
}

/// Quotes `arg` for a POSIX shell.
///
/// Strings made only of safe characters pass through unchanged; everything
/// else is wrapped in single quotes with embedded quotes escaped.
pub fn quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let safe = arg
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b"@%+=:,./_-".contains(&b));
    if safe {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r#"'"'"'"#))
}

/// Resolves a program name against `PATH`.
///
/// Names containing a `/` are checked directly.
pub fn which(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = Path::new(program);
        return is_executable(path).then(|| path.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_safe_passthrough() {
        assert_eq!(quote("/music/album/01.flac"), "/music/album/01.flac");
        assert_eq!(quote("v0"), "v0");
    }

    #[test]
    fn test_quote_special_characters() {
        assert_eq!(quote(""), "''");
        assert_eq!(quote("My Album"), "'My Album'");
        assert_eq!(quote("a;rm -rf /"), "'a;rm -rf /'");
        assert_eq!(quote("it's"), r#"'it'"'"'s'"#);
        assert_eq!(quote("$(whoami)"), "'$(whoami)'");
    }

    #[test]
    fn test_render_substitutes_quoted_args() {
        let template = CommandTemplate::new("ffmpeg -i {0} -acodec alac {1}");
        let line = template
            .render(&["/in/01 Song.flac", "/out/01 Song.m4a"])
            .unwrap();
        assert_eq!(
            line.as_str(),
            "ffmpeg -i '/in/01 Song.flac' -acodec alac '/out/01 Song.m4a'"
        );
        assert_eq!(line.programs(), &["ffmpeg".to_string()]);
    }

    #[test]
    fn test_render_reuses_and_reorders_placeholders() {
        let template = CommandTemplate::new("echo {1} {0} {1}");
        let line = template.render(&["a", "b"]).unwrap();
        assert_eq!(line.as_str(), "echo b a b");
    }

    #[test]
    fn test_render_literal_braces() {
        let template = CommandTemplate::new("echo {{}} {0}");
        let line = template.render(&["x"]).unwrap();
        assert_eq!(line.as_str(), "echo {} x");
    }

    #[test]
    fn test_render_missing_argument() {
        let template = CommandTemplate::new("cp {0} {1}");
        let err = template.render(&["only-one"]).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingArgument {
                index: 1,
                supplied: 1
            }
        );
    }

    #[test]
    fn test_render_invalid_placeholder() {
        assert!(CommandTemplate::new("echo {x}").render(&["a"]).is_err());
        assert!(CommandTemplate::new("echo {0").render(&["a"]).is_err());
        assert!(CommandTemplate::new("echo }").render(&["a"]).is_err());
    }

    #[test]
    fn test_render_keeps_utf8_literals() {
        let template = CommandTemplate::new("echo « {0} »");
        let line = template.render(&["ok"]).unwrap();
        assert_eq!(line.as_str(), "echo « ok »");
    }

    #[test]
    fn test_pipeline_programs() {
        let template = CommandTemplate::new("flac --decode --stdout {0} | lame -V 0 - {1}");
        assert_eq!(template.programs(), vec!["flac".to_string(), "lame".to_string()]);
    }

    #[test]
    fn test_quoted_pipe_in_argument_does_not_add_programs() {
        let template = CommandTemplate::new("cat {0}");
        let line = template.render(&["a | b"]).unwrap();
        assert_eq!(line.programs(), &["cat".to_string()]);
    }

    #[test]
    fn test_which_finds_shell() {
        assert!(which("sh").is_some());
        assert!(which("definitely-not-a-real-program-xyz").is_none());
        assert!(which("/definitely/not/here").is_none());
    }
}
