use rustyline::{DefaultEditor, error::ReadlineError};

use crate::{
    diagnostics::{ReckonerError, Result},
    runtime::Interpreter,
    stdlib,
};

pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new() -> Self {
        Self::with_interpreter(Interpreter::new())
    }

    pub fn with_interpreter(interpreter: Interpreter) -> Self {
        Self { interpreter }
    }

    fn handle_command(&self, command: &str) -> bool {
        match command {
            ":quit" | ":exit" => return false,
            ":help" => println!("{}", stdlib::help_text(self.interpreter.environment())),
            ":vars" => {
                for (name, value) in self.interpreter.environment().variables() {
                    println!("{name} = {value}");
                }
            }
            other => match other.strip_prefix(":unset ") {
                Some(name) => {
                    if self.interpreter.environment().remove_variable(name.trim()).is_none() {
                        eprintln!("no variable named `{}`", name.trim());
                    }
                }
                None => eprintln!("unknown command `{other}`"),
            },
        }
        true
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().map_err(|err| {
            ReckonerError::from(std::io::Error::new(std::io::ErrorKind::Other, err))
        })?;
        let prompt = self.interpreter.context().prompt.clone();
        loop {
            match editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();
                    if trimmed.starts_with(':') {
                        if !self.handle_command(trimmed) {
                            break;
                        }
                        continue;
                    }
                    match self.interpreter.eval_line(trimmed) {
                        Ok((Some(name), value)) => println!("{name} = {value}"),
                        Ok((None, value)) => println!("{value}"),
                        Err(ReckonerError::Diagnostic(diag)) => {
                            eprintln!("{:?}: {}", diag.kind, diag.to_reply());
                        }
                        Err(other) => eprintln!("error: {other}"),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    return Err(ReckonerError::from(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        err,
                    )));
                }
            }
        }
        Ok(())
    }
}
