//! Style compositor: one draw-plan core and its two adapters.
//!
//! [`plan::plan_caption`] resolves every drawing decision. [`cpu::CpuCompositor`] rasterizes the
//! plan over video frames for export; [`preview::preview_node`] turns it into declarative CSS
//! for a live overlay.

pub(crate) mod backend;
pub(crate) mod blur;
pub(crate) mod composite;
pub(crate) mod cpu;
pub(crate) mod fonts;
pub(crate) mod plan;
pub(crate) mod preview;
