mod audio_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;

pub(crate) use {audio_config::AudioConfig, behaviour_config::BehaviourConfig, config::Config};

pub(crate) const DEFAULT_PUSH_TO_TALK: bool = true;
pub(crate) const DEFAULT_SAVE_RECORDINGS: bool = true;
pub(crate) const DEFAULT_NOTICE_TIMEOUT_MS: u32 = 5_000;

pub(crate) fn default_fft_size() -> usize {
    voxnote_core::DEFAULT_FFT_SIZE
}

pub(crate) fn default_push_to_talk() -> bool {
    DEFAULT_PUSH_TO_TALK
}

pub(crate) fn default_save_recordings() -> bool {
    DEFAULT_SAVE_RECORDINGS
}

pub(crate) fn default_notice_timeout_ms() -> u32 {
    DEFAULT_NOTICE_TIMEOUT_MS
}
