//! Completion callback dispatch.

use arbor_scene::{AttachmentId, SceneHost};

use crate::error::CallbackError;
use crate::registry::ComponentInfo;

/// Invokes the completion callback `name` on `owner` with the values that
/// were just assigned.
///
/// Single-valued members pass a one-element slice.
///
/// # Errors
///
/// Returns [`CallbackError::Missing`] for an unknown callback name,
/// [`CallbackError::UnknownOwner`] for a vanished owner, or whatever error
/// the callback itself reports.
pub fn dispatch<H: SceneHost + ?Sized>(
    host: &mut H,
    info: &ComponentInfo,
    owner: AttachmentId,
    name: &str,
    values: &[AttachmentId],
) -> Result<(), CallbackError> {
    if !info.has_callback(name) {
        return Err(CallbackError::Missing {
            name: name.to_string(),
        });
    }
    let component = host
        .component_mut(owner)
        .ok_or(CallbackError::UnknownOwner(owner))?;
    info.invoke_callback(name, component, values)
}
