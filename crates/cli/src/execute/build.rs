use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use braid_transpile::{Error, LineError, Options, Output, Transpiler};

use crate::args::BuildCommand;
use crate::Braid;

impl Braid {
    pub(crate) fn execute_build(&mut self, cmd: BuildCommand) -> Result<i32, anyhow::Error> {
        if cmd.output.is_some() && cmd.files.len() > 1 {
            return Err(anyhow!("--output requires a single input file"));
        }

        let transpiler = Transpiler::new(Options {
            interactive: cmd.interactive,
            record_vars: cmd.record,
            package: cmd.package.clone(),
        });

        let mut status = 0;

        for path in &cmd.files {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;

            let out = transpiler.transpile(&source);
            tracing::debug!(
                path = %path.display(),
                errors = out.errors.len(),
                "translated"
            );

            self.print_errors(path, &source, &out)?;

            // The depth check failing is the one error that shows up
            // in the exit status; the partial file is still written.
            if !out.balanced {
                status = 1;
            }

            let target = output_path(path, cmd.output.as_deref());
            match target {
                Some(target) => {
                    fs::write(&target, out.code.as_bytes())
                        .with_context(|| format!("writing {}", target.display()))?;
                }
                None => {
                    std::io::stdout().write_all(out.code.as_bytes())?;
                }
            }
        }

        Ok(status)
    }

    fn print_errors(
        &self,
        path: &Path,
        source: &str,
        out: &Output,
    ) -> Result<(), anyhow::Error> {
        if out.errors.is_empty() {
            return Ok(());
        }

        let file = SimpleFile::new(path.display().to_string(), source);
        let writer = StandardStream::stderr(if self.colors {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        });
        let config = term::Config::default();

        for err in &out.errors {
            let diagnostic = diagnostic_for(err, source);
            term::emit(&mut writer.lock(), &config, &file, &diagnostic)?;
        }

        Ok(())
    }
}

/// The byte range of an error inside the whole source, from its line
/// number and in-line position.
fn diagnostic_for(err: &LineError, source: &str) -> Diagnostic<()> {
    let line_start: usize = source
        .lines()
        .take(err.line.saturating_sub(1))
        .map(|l| l.len() + 1)
        .sum();
    let line_len = source.lines().nth(err.line.saturating_sub(1)).map_or(0, str::len);

    let range = match &err.error {
        Error::Lex { pos, text } => {
            let start = line_start + (*pos as usize).saturating_sub(1);
            start..start + text.len().max(1)
        }
        _ => line_start..line_start + line_len,
    };

    Diagnostic::error()
        .with_message(err.error.to_string())
        .with_labels(vec![Label::primary((), range)])
}

fn output_path(input: &Path, output: Option<&Path>) -> Option<PathBuf> {
    match output {
        Some(p) if p == Path::new("-") => None,
        Some(p) => Some(p.to_path_buf()),
        None => Some(input.with_extension("go")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn output_paths() {
        assert_eq!(
            output_path(Path::new("x/y.bd"), None),
            Some(PathBuf::from("x/y.go"))
        );
        assert_eq!(
            output_path(Path::new("y.bd"), Some(Path::new("out.go"))),
            Some(PathBuf::from("out.go"))
        );
        assert_eq!(output_path(Path::new("y.bd"), Some(Path::new("-"))), None);
    }
}
