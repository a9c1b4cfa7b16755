//! Render-target assembly.
//!
//! A [`FramebufferBuilder`] collects color attachments (optionally pinned to a
//! slot), one depth attachment and an optional stencil. `assemble()` checks the
//! set and reports a [`Completeness`]; `build()` moves the textures into a
//! [`Framebuffer`] only when the set is complete.
//!
//! Slot assignment: when every color attachment names a distinct slot, those
//! slots are used. Otherwise slots are assigned sequentially from 0 in
//! insertion order.

mod assemble;

pub use assemble::{
    assign_slots, Attachment, Completeness, Framebuffer, FramebufferBuilder, Incomplete,
    StencilSource, MAX_COLOR_ATTACHMENTS,
};
