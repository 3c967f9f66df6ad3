use crate::loaders::SoundClip;

/// Plays a loaded clip without blocking the caller
pub trait SoundPlayer {
    fn play(&mut self, clip: &SoundClip);
}

/// Opens an external page without blocking the caller
pub trait Navigator {
    fn open(&mut self, url: &str);
}
