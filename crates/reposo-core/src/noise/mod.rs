//! Coloured noise and procedural ambience.
//!
//! White noise from a seeded [`Pcg32`](rand_pcg::Pcg32) is shaped sample by
//! sample according to a [`NoiseProfile`]:
//!
//! | Profile    | Shaping                                                    |
//! |------------|------------------------------------------------------------|
//! | Pink       | Kellet 7-term 1/f filter                                   |
//! | Brown      | clamped integrator × 3.5                                   |
//! | RainLight  | pink minus its low-pass, sparse droplets                   |
//! | RainHeavy  | pink + low-pass blend, rare decaying brown thunder         |
//! | Wind       | brown through a 0.004 one-pole                             |
//! | Ocean      | brown through a 0.0025 one-pole, 0.1 Hz swell              |
//! | Forest     | quiet brown bed, cricket chirps, frog croaks               |
//! | River      | two-band pink flow, 0.25 Hz LFO, bubble pops               |

pub mod filters;
pub mod generator;
pub mod profile;
pub mod transient;

pub use filters::{BrownIntegrator, Lowpass, PinkFilter};
pub use generator::{NoiseGenerator, Shaper};
pub use profile::{NoiseProfile, ParseNoiseProfileError, asset_id_from_path};
pub use transient::{Burst, EventShape, TransientEvent};
