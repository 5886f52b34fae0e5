use std::process::{Child, Command, Stdio};

/// Best-effort pronunciation output.
///
/// `speak` must return immediately: failures are logged, never surfaced, and
/// a new call cancels whatever is still playing before starting over.
pub trait AudioAnnouncer {
    fn speak(&mut self, text: &str);
}

/// Default speech program for the platform.
pub fn default_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak"
    }
}

/// Announcer that hands the text to an external speech command as its last
/// argument, e.g. `say` or `espeak -v en`.
#[derive(Debug)]
pub struct CommandAnnouncer {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandAnnouncer {
    /// Parse a whitespace-separated command line. Returns `None` when the
    /// command is empty.
    pub fn new(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(|s| s.to_string());
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            child: None,
        })
    }

    fn cancel(&mut self) {
        if let Some(mut child) = self.child.take() {
            match child.try_wait() {
                Ok(Some(_)) => {}
                _ => {
                    let _ = child.kill();
                    let _ = child.wait();
                }
            }
        }
    }
}

impl AudioAnnouncer for CommandAnnouncer {
    fn speak(&mut self, text: &str) {
        self.cancel();

        match Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => self.child = Some(child),
            Err(err) => {
                log::warn!("speech command `{}` failed to start: {err}", self.program);
            }
        }
    }
}

impl Drop for CommandAnnouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Announcer that says nothing. Used when sound is off or no speech command
/// is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAnnouncer;

impl AudioAnnouncer for NullAnnouncer {
    fn speak(&mut self, _text: &str) {}
}
