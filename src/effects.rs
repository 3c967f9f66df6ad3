// effects.rs - Side effects of a click: the sound and the external page
use std::process::{Command, Stdio};

use crate::loaders::SoundClip;
use crate::traits::{Navigator, SoundPlayer};

/// Plays clips through an external audio player
#[derive(Debug, Clone)]
pub struct CommandSoundPlayer {
    command: Vec<String>,
}

impl CommandSoundPlayer {
    /// `command` is the program and its leading arguments; the clip path is appended
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl SoundPlayer for CommandSoundPlayer {
    fn play(&mut self, clip: &SoundClip) {
        let path = clip.path.display().to_string();
        spawn_player(&self.command, &path);
    }
}

type Opener = fn(&str) -> std::io::Result<()>;

/// Opens URLs in the default browser
#[derive(Debug, Clone, Copy)]
pub struct SystemNavigator {
    opener: Opener,
}

impl SystemNavigator {
    pub fn new() -> Self {
        Self::with_opener(|url| open::that_detached(url))
    }

    pub fn with_opener(opener: Opener) -> Self {
        Self { opener }
    }
}

impl Default for SystemNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for SystemNavigator {
    fn open(&mut self, url: &str) {
        log::info!("Opening {}", url);
        if let Err(e) = (self.opener)(url) {
            log::warn!("Failed to open {}: {}", url, e);
        }
    }
}

/// Stand-in when sound is disabled
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentPlayer;

impl SoundPlayer for SilentPlayer {
    fn play(&mut self, clip: &SoundClip) {
        log::debug!("Sound disabled, skipping {}", clip.path.display());
    }
}

fn build_command(command: &[String], last_arg: &str) -> Option<Command> {
    let (program, args) = command.split_first()?;
    let mut cmd = Command::new(program);
    cmd.args(args)
        .arg(last_arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Some(cmd)
}

/// Start the player and reap it on a background thread
fn spawn_player(command: &[String], clip: &str) {
    let Some(mut cmd) = build_command(command, clip) else {
        log::warn!("No sound player configured");
        return;
    };

    match cmd.spawn() {
        Ok(mut child) => {
            let reaper = std::thread::Builder::new()
                .name("sound-reaper".to_string())
                .spawn(move || match child.wait() {
                    Ok(status) if !status.success() => {
                        log::warn!("Sound player exited with {}", status)
                    }
                    Ok(_) => {}
                    Err(e) => log::warn!("Sound player could not be awaited: {}", e),
                });
            if let Err(e) = reaper {
                log::warn!("Could not start reaper thread: {}", e);
            }
        }
        Err(e) => log::warn!("Failed to launch sound player {:?}: {}", command[0], e),
    }
}
