//! Auditioning tones and ambience alongside a running session.

use std::sync::Arc;

use reposo_core::{NoiseProfile, ToneParams, asset_id_from_path, clamp_volume};

use crate::Result;
use crate::backend::AudioBackend;
use crate::noise_engine::NoiseEngine;
use crate::options::EngineOptions;
use crate::tone_engine::ToneEngine;

/// A private tone engine and noise engine for UI previews.
///
/// Nothing here touches the session's engines, so a preview can play over
/// (or without) a running session.
#[derive(Debug)]
pub struct Previewer {
    tone: ToneEngine,
    noise: NoiseEngine,
    preview_volume: f32,
}

impl Previewer {
    /// Previewer with default options.
    pub fn new(backend: Arc<dyn AudioBackend>) -> Self {
        Self::with_options(backend, EngineOptions::default())
    }

    /// Previewer with explicit options.
    pub fn with_options(backend: Arc<dyn AudioBackend>, options: EngineOptions) -> Self {
        let preview_volume = clamp_volume(options.preview_volume);
        Self {
            tone: ToneEngine::with_label("preview-tone", Arc::clone(&backend), options.clone()),
            noise: NoiseEngine::with_label("preview-noise", backend, options),
            preview_volume,
        }
    }

    /// Play `params` on the preview tone engine, updating it live if a preview
    /// is already sounding.
    pub fn preview_tone(&self, params: &ToneParams) -> Result<()> {
        self.tone.load(params)?;
        self.tone.start()
    }

    /// Stop the tone preview with the usual short fade.
    pub fn stop_tone_preview(&self) {
        self.tone.stop();
    }

    /// Play the ambience an asset path resolves to, at
    /// [`EngineOptions::preview_volume`].
    ///
    /// Directories and the extension are stripped before keyword matching.
    /// Any ambience preview already playing is stopped first.
    pub fn preview_ambience(&self, asset_path: &str) -> Result<NoiseProfile> {
        self.stop_preview();
        let id = match asset_id_from_path(asset_path) {
            "" => asset_path,
            id => id,
        };
        let profile = self.noise.set_profile_from_asset_id(Some(id));
        self.noise.set_volume(self.preview_volume);
        tracing::debug!(asset = asset_path, profile = %profile, "ambience preview");
        self.noise.start()?;
        Ok(profile)
    }

    /// Stop the ambience preview.
    pub fn stop_preview(&self) {
        self.noise.stop();
    }

    /// Preview tone engine.
    pub fn tone(&self) -> &ToneEngine {
        &self.tone
    }

    /// Preview ambience engine.
    pub fn noise(&self) -> &NoiseEngine {
        &self.noise
    }

    /// Release both preview engines.
    pub fn release(&self) {
        self.tone.release();
        self.noise.release();
    }
}
